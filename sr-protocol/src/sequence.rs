//! Sequence Number Handling
//!
//! Selective Repeat numbers packets modulo a small sequence space of
//! `2 * window_size`. This module provides the sequence number type and the
//! modular arithmetic used by both the send and receive windows.

use std::fmt;

/// Sequence number inside a [`SeqSpace`]
///
/// The value is always smaller than the modulus of the space that produced
/// it. On the wire it travels as an `i32` header field.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct SeqNum(u32);

impl SeqNum {
    /// The first sequence number of every session
    pub const ZERO: SeqNum = SeqNum(0);

    /// Get the raw sequence number value
    #[inline]
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Value as carried in a packet header field
    #[inline]
    pub fn as_field(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Debug for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeqNum({})", self.0)
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Circular sequence space of a given modulus
///
/// Selective Repeat needs a modulus of at least twice the window size so that
/// a retransmitted packet from the previous window can never be mistaken for
/// a new packet of the current one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SeqSpace {
    modulus: u32,
}

impl SeqSpace {
    /// Sequence space sized for a Selective Repeat window
    ///
    /// `window_size` must be non-zero and small enough for the doubled value
    /// to fit in a `u32`; [`WindowConfig`](crate::WindowConfig) checks both.
    pub(crate) fn for_window(window_size: usize) -> Self {
        debug_assert!(window_size > 0);
        SeqSpace {
            modulus: (window_size as u32) * 2,
        }
    }

    /// Number of distinct sequence numbers
    #[inline]
    pub fn modulus(self) -> u32 {
        self.modulus
    }

    /// Build a sequence number, wrapping `value` into the space
    #[inline]
    pub fn seq(self, value: u32) -> SeqNum {
        SeqNum(value % self.modulus)
    }

    /// Interpret a header field as a sequence number
    ///
    /// Returns `None` for the sentinel and for anything outside the space.
    pub fn from_field(self, raw: i32) -> Option<SeqNum> {
        if raw >= 0 && (raw as u32) < self.modulus {
            Some(SeqNum(raw as u32))
        } else {
            None
        }
    }

    /// The sequence number following `seq`
    #[inline]
    pub fn next(self, seq: SeqNum) -> SeqNum {
        SeqNum((seq.0 + 1) % self.modulus)
    }

    /// Forward distance from `from` to `to`, in `0..modulus`
    #[inline]
    pub fn offset(self, from: SeqNum, to: SeqNum) -> u32 {
        (to.0 + self.modulus - from.0) % self.modulus
    }

    /// Check whether `seq` lies in `[base, base + len)` modulo the space
    #[inline]
    pub fn in_window(self, base: SeqNum, seq: SeqNum, len: usize) -> bool {
        (self.offset(base, seq) as usize) < len
    }
}
