pub mod aggregate;
pub mod duration;
pub mod line;

pub use aggregate::{aggregate, median, Utilization};
pub use duration::parse_duration;
pub use line::{parse_samples, DurationPair, SamplePair};
