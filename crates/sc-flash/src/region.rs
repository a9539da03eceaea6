//! Erasable Memory Regions
//!
//! Storage abstraction the record store writes through:
//! - `MemRegion`: RAM-backed, NOR-style bit semantics, erase fault injection
//! - `FileRegion`: fixed-size file for host-side persistence
//! - Shared handles via `Arc<Mutex<R>>`

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

/// Byte value of erased cells.
pub const ERASED_BYTE: u8 = 0xFF;

/// Default region capacity, matching a 128-byte info flash segment.
pub const SEGMENT_LEN: usize = 128;

// ============ Region Trait ============

/// A fixed-size region of erasable storage.
///
/// Models flash-like memory: erase fills the whole region with
/// [`ERASED_BYTE`]; programming happens in place between erases.
pub trait NvRegion {
    /// Region capacity in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read `buf.len()` bytes starting at `offset`.
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), RegionError>;

    /// Program `bytes` starting at `offset`.
    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), RegionError>;

    /// Erase the whole region back to [`ERASED_BYTE`].
    fn erase(&mut self) -> Result<(), RegionError>;

    /// Check that every byte of the region reads as erased.
    fn verify_erased(&self) -> bool;
}

/// Region access errors
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("access at {offset}..{end} outside region of {len} bytes")]
    OutOfBounds {
        offset: usize,
        end: usize,
        len: usize,
    },

    #[error("region IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn bounds(offset: usize, n: usize, len: usize) -> Result<usize, RegionError> {
    let end = offset.saturating_add(n);
    if end > len {
        return Err(RegionError::OutOfBounds { offset, end, len });
    }
    Ok(end)
}

// ============ In-Memory Region ============

/// RAM-backed region with NOR-flash write semantics.
///
/// Programming can only clear bits (`dst &= src`), so a write over
/// non-erased cells produces the AND of old and new contents, the same
/// corruption a protocol bug would cause on real info flash.
#[derive(Debug, Clone)]
pub struct MemRegion {
    cells: Vec<u8>,
}

impl MemRegion {
    pub fn new() -> Self {
        Self::with_len(SEGMENT_LEN)
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            cells: vec![ERASED_BYTE; len],
        }
    }

    /// Cut an erase short after `n` bytes, as a power loss would.
    ///
    /// The first `n` bytes read erased, the rest keep their previous
    /// contents. Crash-recovery tests drive this directly.
    pub fn interrupt_erase(&mut self, n: usize) {
        let n = n.min(self.cells.len());
        self.cells[..n].fill(ERASED_BYTE);
    }
}

impl Default for MemRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl NvRegion for MemRegion {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), RegionError> {
        let end = bounds(offset, buf.len(), self.cells.len())?;
        buf.copy_from_slice(&self.cells[offset..end]);
        Ok(())
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), RegionError> {
        let end = bounds(offset, bytes.len(), self.cells.len())?;
        for (cell, byte) in self.cells[offset..end].iter_mut().zip(bytes) {
            *cell &= byte;
        }
        Ok(())
    }

    fn erase(&mut self) -> Result<(), RegionError> {
        self.cells.fill(ERASED_BYTE);
        Ok(())
    }

    fn verify_erased(&self) -> bool {
        self.cells.iter().all(|&c| c == ERASED_BYTE)
    }
}

// ============ File-Backed Region ============

/// Fixed-size file-backed region for host-side cabinets.
///
/// The file is created at full size on first open and never grows or
/// shrinks; write and erase sync to disk before returning.
pub struct FileRegion {
    file: std::fs::File,
    len: usize,
}

impl FileRegion {
    /// Open or create a region file of exactly `len` bytes.
    ///
    /// A fresh file starts fully erased. An existing file keeps its
    /// contents but must have the requested size.
    pub fn open(path: impl AsRef<Path>, len: usize) -> Result<Self, RegionError> {
        let path = path.as_ref();
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let have = file.metadata()?.len();
        if have == 0 {
            file.write_all(&vec![ERASED_BYTE; len])?;
            file.sync_data()?;
            log::debug!("initialized region file {} ({} bytes)", path.display(), len);
        } else if have != len as u64 {
            return Err(RegionError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "region file {} has {} bytes, expected {}",
                    path.display(),
                    have,
                    len
                ),
            )));
        }

        Ok(Self { file, len })
    }
}

impl NvRegion for FileRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), RegionError> {
        bounds(offset, buf.len(), self.len)?;
        (&self.file).seek(SeekFrom::Start(offset as u64))?;
        (&self.file).read_exact(buf)?;
        Ok(())
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), RegionError> {
        bounds(offset, bytes.len(), self.len)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(bytes)?;
        self.file.sync_data()?;
        Ok(())
    }

    fn erase(&mut self) -> Result<(), RegionError> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&vec![ERASED_BYTE; self.len])?;
        self.file.sync_data()?;
        Ok(())
    }

    fn verify_erased(&self) -> bool {
        let mut buf = vec![0u8; self.len];
        match self.read(0, &mut buf) {
            Ok(()) => buf.iter().all(|&b| b == ERASED_BYTE),
            Err(_) => false,
        }
    }
}

// ============ Shared Regions ============

/// Regions behind a shared handle still act as regions.
///
/// Lets tests keep a probe on a region owned by a store, and the
/// cabinet inspect its flash from another thread.
impl<R: NvRegion> NvRegion for Arc<Mutex<R>> {
    fn len(&self) -> usize {
        self.lock().len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), RegionError> {
        self.lock().read(offset, buf)
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), RegionError> {
        self.lock().write(offset, bytes)
    }

    fn erase(&mut self) -> Result<(), RegionError> {
        self.lock().erase()
    }

    fn verify_erased(&self) -> bool {
        self.lock().verify_erased()
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_region_starts_erased() {
        let region = MemRegion::new();
        assert_eq!(region.len(), SEGMENT_LEN);
        assert!(region.verify_erased());
    }

    #[test]
    fn test_write_clears_bits_only() {
        let mut region = MemRegion::with_len(4);
        region.write(0, &[0xF0]).unwrap();
        region.write(0, &[0x0F]).unwrap();

        let mut buf = [0u8; 1];
        region.read(0, &mut buf).unwrap();
        assert_eq!(buf[0], 0x00, "overlapping writes must AND together");
    }

    #[test]
    fn test_erase_restores_all_cells() {
        let mut region = MemRegion::with_len(8);
        region.write(2, &[0x12, 0x34]).unwrap();
        assert!(!region.verify_erased());

        region.erase().unwrap();
        assert!(region.verify_erased());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut region = MemRegion::with_len(8);
        let mut buf = [0u8; 4];

        assert!(matches!(
            region.read(6, &mut buf),
            Err(RegionError::OutOfBounds { .. })
        ));
        assert!(matches!(
            region.write(8, &[1]),
            Err(RegionError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_interrupt_erase_keeps_tail() {
        let mut region = MemRegion::with_len(8);
        region.write(0, &[0x11; 8]).unwrap();
        region.interrupt_erase(3);

        let mut buf = [0u8; 8];
        region.read(0, &mut buf).unwrap();
        assert_eq!(&buf[..3], &[ERASED_BYTE; 3]);
        assert_eq!(&buf[3..], &[0x11; 5]);
        assert!(!region.verify_erased());
    }

    #[test]
    fn test_file_region_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.nvm");

        let mut region = FileRegion::open(&path, 128).unwrap();
        assert!(region.verify_erased());

        region.write(4, &[0xAB, 0xCD]).unwrap();
        let mut buf = [0u8; 2];
        region.read(4, &mut buf).unwrap();
        assert_eq!(buf, [0xAB, 0xCD]);
    }

    #[test]
    fn test_file_region_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.nvm");

        {
            let mut region = FileRegion::open(&path, 64).unwrap();
            region.write(0, &[1, 2, 3, 4]).unwrap();
        }

        let region = FileRegion::open(&path, 64).unwrap();
        let mut buf = [0u8; 4];
        region.read(0, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_file_region_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.nvm");

        FileRegion::open(&path, 64).unwrap();
        assert!(FileRegion::open(&path, 128).is_err());
    }

    #[test]
    fn test_shared_region_handle() {
        let shared = Arc::new(Mutex::new(MemRegion::with_len(16)));
        let mut handle: Arc<Mutex<MemRegion>> = Arc::clone(&shared);

        handle.write(0, &[0x55]).unwrap();

        let mut buf = [0u8; 1];
        shared.lock().read(0, &mut buf).unwrap();
        assert_eq!(buf[0], 0x55);
    }
}
