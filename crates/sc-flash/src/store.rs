//! Ping-Pong Record Store
//!
//! Wear leveling and crash safety over two regions:
//! - Every save writes the fresh record to one region, then erases the other
//! - The write target alternates, so each region rests every other save
//! - A crash between write and erase leaves the stale copy invalid, never the fresh one

use crate::record::{RECORD_LEN, SessionRecord};
use crate::region::{NvRegion, RegionError};

/// Erase attempts per region before the store declares it dead.
pub const MAX_ERASE_RETRIES: u32 = 8;

// ============ Load Outcome ============

/// Where a load found its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Secondary,
    Defaults,
}

/// Result of a read-only load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub record: SessionRecord,
    pub source: LoadSource,
}

// ============ Errors ============

/// Record store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("region {region} failed to erase after {attempts} attempts")]
    EraseFault { region: usize, attempts: u32 },

    #[error("regions of {have} bytes cannot hold a {need}-byte record")]
    RegionTooSmall { need: usize, have: usize },

    #[error(transparent)]
    Region(#[from] RegionError),
}

// ============ Record Store ============

/// Two-region alternating store for one session record.
///
/// Region 0 is the primary: loads check it first, and the first save
/// after a repair lands there.
pub struct RecordStore<R: NvRegion> {
    regions: [R; 2],
    write_idx: usize,
    max_balance: u32,
}

impl<R: NvRegion> RecordStore<R> {
    pub fn new(primary: R, secondary: R, max_balance: u32) -> Result<Self, StoreError> {
        let have = primary.len().min(secondary.len());
        if have < RECORD_LEN {
            return Err(StoreError::RegionTooSmall {
                need: RECORD_LEN,
                have,
            });
        }
        Ok(Self {
            regions: [primary, secondary],
            write_idx: 0,
            max_balance,
        })
    }

    /// Persist a record: write the fresh copy, then retire the old one.
    ///
    /// The write target was erased by the previous cycle, so the new
    /// record is fully on cells before the old region is touched. Losing
    /// power anywhere in between leaves at least one valid copy.
    pub fn save(&mut self, record: SessionRecord) -> Result<(), StoreError> {
        let write_idx = self.write_idx;
        let erase_idx = 1 - write_idx;

        self.regions[write_idx].write(0, &record.encode())?;
        self.erase_verified(erase_idx)?;
        self.write_idx = erase_idx;
        Ok(())
    }

    /// Read-only load: first valid record of primary then secondary,
    /// `fallback` when neither validates. Never writes.
    pub fn load(&self, fallback: SessionRecord) -> Result<LoadOutcome, StoreError> {
        if let Some(record) = self.read_region(0)? {
            return Ok(LoadOutcome {
                record,
                source: LoadSource::Primary,
            });
        }
        if let Some(record) = self.read_region(1)? {
            return Ok(LoadOutcome {
                record,
                source: LoadSource::Secondary,
            });
        }
        Ok(LoadOutcome {
            record: fallback,
            source: LoadSource::Defaults,
        })
    }

    /// Erase both regions and write `record` as the single fresh copy.
    ///
    /// Re-establishes the invariant the alternating writer relies on:
    /// its next target is erased, whatever state the regions were in.
    pub fn repair(&mut self, record: SessionRecord) -> Result<(), StoreError> {
        self.erase_verified(0)?;
        self.erase_verified(1)?;
        self.write_idx = 0;
        self.save(record)
    }

    /// Boot-time recovery: load, log the source, then repair.
    pub fn restore(&mut self, fallback: SessionRecord) -> Result<LoadOutcome, StoreError> {
        let outcome = self.load(fallback)?;
        match outcome.source {
            LoadSource::Primary => {
                log::info!(
                    "restored record from primary region (balance {})",
                    outcome.record.balance
                );
            }
            LoadSource::Secondary => {
                log::warn!(
                    "primary region invalid, restored from secondary (balance {})",
                    outcome.record.balance
                );
            }
            LoadSource::Defaults => {
                log::warn!(
                    "no valid record in either region, starting from defaults (balance {})",
                    outcome.record.balance
                );
            }
        }
        self.repair(outcome.record)?;
        Ok(outcome)
    }

    /// Index of the region the next save will write (0 or 1).
    pub fn write_target(&self) -> usize {
        self.write_idx
    }

    /// Borrow a region for inspection. `idx` is 0 or 1.
    pub fn region(&self, idx: usize) -> &R {
        &self.regions[idx]
    }

    /// Borrow a region mutably, e.g. for fault injection in tests.
    pub fn region_mut(&mut self, idx: usize) -> &mut R {
        &mut self.regions[idx]
    }

    fn read_region(&self, idx: usize) -> Result<Option<SessionRecord>, StoreError> {
        let mut bytes = [0u8; RECORD_LEN];
        self.regions[idx].read(0, &mut bytes)?;
        Ok(SessionRecord::decode(&bytes, self.max_balance))
    }

    fn erase_verified(&mut self, idx: usize) -> Result<(), StoreError> {
        let mut attempts = 0;
        loop {
            self.regions[idx].erase()?;
            attempts += 1;
            if self.regions[idx].verify_erased() {
                return Ok(());
            }
            if attempts >= MAX_ERASE_RETRIES {
                return Err(StoreError::EraseFault {
                    region: idx,
                    attempts,
                });
            }
            log::warn!(
                "region {} erase verify failed, retrying ({}/{})",
                idx,
                attempts,
                MAX_ERASE_RETRIES
            );
        }
    }
}

// ============ Tests ============
