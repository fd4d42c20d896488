pub mod duration_range;
pub mod sample_window;

pub use duration_range::DurationRange;
pub use sample_window::{SampleWindow, WindowSegment};
