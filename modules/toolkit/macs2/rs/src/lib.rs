pub use listener::{BedGraphDump, Listener, NoListener};
pub use params::{Macs2Params, Macs2ParamsBuilder};
pub use pilecall_io_rs::narrowpeak::NarrowPeak;
pub use pipeline::{macs2, Accumulator, Macs2};

pub mod control;
pub mod listener;
pub mod params;
pub mod pcalling;
pub mod pileup;
pub mod poisson;
mod pipeline;
