//! # Scroll Narrative
//!
//! Turns a reader's scroll position into a place on a route and decides
//! which part of the story belongs on screen there.
//!
//! ## Core Components
//!
//! - **indexer**: Snaps narrative points onto the route polyline
//! - **mapping**: Non-linear scroll-to-distance table with dwell zones around story beats
//! - **activation**: Active waypoint, section header and the debounced cross-fade
//! - **progress**: Navigation entries, the active entry and animated jumps
//! - **timer**: Explicit, cancellable one-shot timers driven by frame time
//! - **engine**: Frame-coalesced entry point tying the pieces together
//!
//! ## Design Philosophy
//!
//! - **Frame-Driven**: Input is recorded, work happens once per frame
//! - **Pure Core**: Mapping, snapping and the cross-fade are plain functions of their input
//! - **Host-Agnostic**: Time and layout measurements are passed in, never read from a clock or DOM

pub mod activation;
pub mod engine;
pub mod indexer;
pub mod mapping;
pub mod progress;
pub mod timer;

pub use activation::*;
pub use engine::*;
pub use indexer::*;
pub use mapping::*;
pub use progress::*;
pub use timer::*;
