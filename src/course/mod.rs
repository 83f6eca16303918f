mod builder;
mod params;
mod placement;

pub use builder::{Course, CourseBuilder, CourseError};
pub use params::{BlockPalette, CourseMode, CourseParams};
pub use placement::{NotePlacement, PlacementBehavior};
