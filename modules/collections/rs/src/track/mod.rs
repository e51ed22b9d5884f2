pub use ops::{Combine, Compare};
pub use track::{BoolTrack, Runs, SignalTrack, Track, Value};

mod intervals;
mod ops;
mod pileup;
#[allow(clippy::module_inception)]
mod track;
