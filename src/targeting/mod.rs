//! Target selection: contexts, geometries and the finder that applies them.

pub mod context;
pub mod finder;
pub mod geometry;

pub use context::{is_friendly, is_hostile, TargetContext};
pub use finder::{TargetFinder, TargetQuery};
pub use geometry::Geometry;
