//! # sc-flash — Wear-Leveled Record Storage
//!
//! Crash-safe persistence for small fixed-size records over two erasable
//! memory regions, in the style of segmented info flash.
//!
//! ## Features
//!
//! - **Ping-Pong Wear Leveling**: Writes alternate between two regions
//! - **Crash Safety**: New record is written before the old one is erased
//! - **Validation**: Records carry reserved guard words and a bounds check
//! - **Recovery**: Two-stage fallback (primary → secondary → defaults)
//!
//! ## Architecture
//!
//! ```text
//! RecordStore
//!     │
//!     ├── regions: [NvRegion; 2]   (MemRegion, FileRegion, ...)
//!     │       write target alternates every save
//!     │
//!     ├── save: write new → erase old → verify (bounded retries)
//!     ├── load: read-only, first valid of primary/secondary
//!     └── repair: erase both + save (known erase state)
//! ```

pub mod record;
pub mod region;
pub mod store;

pub use record::*;
pub use region::*;
pub use store::*;
