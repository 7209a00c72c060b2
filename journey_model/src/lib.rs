//! # Journey Model
//!
//! The data side of a scroll-driven map journey: the route polyline, the
//! narrative points placed along it, and the tuning that shapes the scroll
//! experience. This crate holds no engine state; everything here is built
//! once per journey and read-only afterwards.

pub mod config;
pub mod error;
pub mod geometry;
pub mod narrative;

pub use config::*;
pub use error::*;
pub use geometry::*;
pub use narrative::*;
