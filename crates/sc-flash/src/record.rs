//! Session Records
//!
//! The fixed-width record the store persists: three little-endian 32-bit
//! words `[reserved][balance][reserved]`, both reserved words zero.

use serde::{Deserialize, Serialize};

/// Number of 32-bit words in a stored record.
pub const RECORD_WORDS: usize = 3;

/// Encoded record size in bytes.
pub const RECORD_LEN: usize = RECORD_WORDS * 4;

/// The persistent slice of a game session.
///
/// Only the credit balance survives power loss; reels, bet and phase
/// restart fresh every boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub balance: u32,
}

impl SessionRecord {
    pub fn new(balance: u32) -> Self {
        Self { balance }
    }

    /// Encode as `[0, balance, 0]` little-endian words.
    ///
    /// The reserved guard words make erased or half-programmed regions
    /// (runs of 0xFF) fail validation on read-back.
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut bytes = [0u8; RECORD_LEN];
        bytes[4..8].copy_from_slice(&self.balance.to_le_bytes());
        bytes
    }

    /// Decode and validate a stored record.
    ///
    /// `None` unless both guard words are zero and the balance is at
    /// most `max_balance`. A zero balance is valid; it is the state
    /// right before game over.
    pub fn decode(bytes: &[u8; RECORD_LEN], max_balance: u32) -> Option<Self> {
        let guard_lo = word(bytes, 0);
        let balance = word(bytes, 1);
        let guard_hi = word(bytes, 2);

        if guard_lo != 0 || guard_hi != 0 || balance > max_balance {
            return None;
        }
        Some(Self { balance })
    }
}

fn word(bytes: &[u8; RECORD_LEN], i: usize) -> u32 {
    let mut w = [0u8; 4];
    w.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
    u32::from_le_bytes(w)
}

// ============ Tests ============
