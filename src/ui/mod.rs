//! Presentation side of the project grid
//!
//! - Which records are visible, and with which controls (projection.rs)
//! - Where the result is drawn (surface.rs)

pub mod projection;
pub mod surface;
