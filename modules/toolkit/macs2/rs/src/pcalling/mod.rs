pub use by_cutoff::ByCutoff;
pub use caller::{call, call_peaks, summarize};

mod by_cutoff;
mod caller;
