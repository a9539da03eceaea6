//! # sc-engine — Cabinet Slot Game Core
//!
//! Deterministic three-reel cabinet game: an additive step generator,
//! cyclic reel strips, five fixed paylines, a phase-per-tick state
//! machine, and a crash-safe balance behind `sc-flash`.
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine::tick (every ~500 ms)
//!     │
//!     ├── ButtonLatch (first press wins)
//!     ├── GamePhase: Idle → Spin → Win | GameOver → Idle
//!     ├── ReelBank + FibonacciRng → Window
//!     ├── WinEvaluation (5 paylines + win mask)
//!     ├── RecordStore::save (every tick)
//!     └── RenderModel → FrameHandoff → Surface
//! ```

pub mod config;
pub mod input;
pub mod machine;
pub mod paytable;
pub mod reel;
pub mod render;
pub mod rng;
pub mod session;

pub use config::*;
pub use input::*;
pub use machine::*;
pub use paytable::*;
pub use reel::*;
pub use render::*;
pub use rng::*;
pub use session::*;
