pub use genome::GenomeSpace;
pub use interval::{Interval, IntervalOp};
pub use locus::Locus;
pub use orientation::Orientation;

mod genome;
mod interval;
mod locus;
mod orientation;
