pub mod bed;
pub mod bedgraph;
pub mod chrom_sizes;
pub mod compression;
pub mod narrowpeak;
mod traits;

pub use traits::{ReadRecord, WriteRecord};
