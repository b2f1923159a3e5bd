// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Turning sequences of [`RegisterOp`]s into as few bus transfers as possible.
//!
//! The sensor auto-increments the register address within a transfer, so writes to neighbouring
//! registers can share a single transfer (a burst). Order is always preserved: a burst only ever
//! grows by the op that immediately follows it in the sequence.
use core::iter::Peekable;
use core::slice;

use arrayvec::ArrayVec;

use crate::register::{Address, RegisterOp};

/// The most register data a single burst carries, not counting the two address bytes.
pub const MAX_BURST_PAYLOAD: usize = 30;

const ADDRESS_LENGTH: usize = 2;

/// A run of register writes to consecutive addresses, ready to be sent as one transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Burst {
    address: Address,
    /// Address bytes followed by the payload, exactly as sent on the bus.
    frame: ArrayVec<u8, { MAX_BURST_PAYLOAD + ADDRESS_LENGTH }>,
    /// The address just past the last byte of the payload.
    next: Option<Address>,
}

impl Burst {
    fn new(op: &RegisterOp) -> Self {
        let mut frame = ArrayVec::new();
        frame.extend(op.address().as_bytes());
        frame.extend(op.value_bytes());
        Self {
            address: op.address(),
            frame,
            next: op.end_address(),
        }
    }

    /// Append `op` if it starts where this burst ends and there is room for it.
    fn try_push(&mut self, op: &RegisterOp) -> bool {
        let value = op.value_bytes();
        if self.next != Some(op.address()) || self.frame.remaining_capacity() < value.len() {
            return false;
        }
        self.frame.extend(value);
        self.next = op.end_address();
        true
    }

    /// The register address the burst starts at.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The register data, without the address.
    pub fn payload(&self) -> &[u8] {
        &self.frame[ADDRESS_LENGTH..]
    }

    /// The complete transfer: the big-endian register address followed by the payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }
}

/// Iterator over the bursts for a sequence, created by [`coalesce`].
#[derive(Clone, Debug)]
pub struct Bursts<'a> {
    ops: Peekable<slice::Iter<'a, RegisterOp>>,
}

impl<'a> Iterator for Bursts<'a> {
    type Item = Burst;

    fn next(&mut self) -> Option<Self::Item> {
        let mut burst = Burst::new(self.ops.next()?);
        while let Some(op) = self.ops.peek() {
            if !burst.try_push(op) {
                break;
            }
            self.ops.next();
        }
        Some(burst)
    }
}

/// Group `sequence` into bursts, keeping the original order of writes.
pub fn coalesce(sequence: &[RegisterOp]) -> Bursts<'_> {
    Bursts {
        ops: sequence.iter().peekable(),
    }
}

/// Something that can put a [`Burst`] on the wire.
pub trait BurstWrite {
    type Error;

    fn write_burst(&mut self, burst: &Burst) -> Result<(), Self::Error>;
}

/// Write every op in `sequence`, in order, coalescing where possible.
///
/// The first failed transfer ends the call; nothing after it is attempted.
pub fn write_sequence<W>(writer: &mut W, sequence: &[RegisterOp]) -> Result<(), W::Error>
where
    W: BurstWrite + ?Sized,
{
    coalesce(sequence).try_for_each(|burst| writer.write_burst(&burst))
}
