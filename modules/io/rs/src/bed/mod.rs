// Format reference: https://samtools.github.io/hts-specs/BEDv1.pdf
//
// Only the fields needed for pileups are parsed:
// 1. seqid
// 2. start: i64, 0-based
// 3. end: i64, exclusive
// 6. orientation: [+|-|.], optional. Missing orientation is treated as unstranded.
//
// Other columns are ignored.

mod reader;

pub use reader::{parse, Reader};
