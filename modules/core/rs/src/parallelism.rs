use std::cmp::Ordering;
use std::thread::available_parallelism;

use eyre::Result;

// Negative values count back from the number of available cores: -1 is "all of them".
fn _normalize(requested: isize, max: isize) -> usize {
    match requested.cmp(&0) {
        Ordering::Less => (max + requested + 1).max(1) as usize,
        Ordering::Equal => 1,
        Ordering::Greater => requested.min(max) as usize,
    }
}

/// Number of worker threads to use for the requested parallelism level.
pub fn available(requested: isize) -> Result<usize> {
    if requested == 0 || requested == 1 {
        return Ok(1);
    }
    let max = available_parallelism()?.get() as isize;
    Ok(_normalize(requested, max))
}
