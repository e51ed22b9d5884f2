//! Treatment pileup: reads are extended to fragments and counted per base.

use std::sync::Arc;

use ahash::HashSet;
use eyre::Result;
use itertools::Itertools;

use pilecall_collections_rs::track::Track;
use pilecall_core_rs::loc::{GenomeSpace, Interval, Locus, Orientation};

/// Resolve chromosome indices of the reads. Reads on chromosomes absent from the genome are
/// skipped with a single warning.
pub(crate) fn resolve<'a>(
    genome: &GenomeSpace,
    reads: &'a [Locus<i64>],
) -> Vec<(usize, &'a Locus<i64>)> {
    let mut resolved = Vec::with_capacity(reads.len());
    let mut unknown = HashSet::default();
    let mut skipped = 0;
    for read in reads {
        match genome.index_of(&read.contig) {
            Some(index) => resolved.push((index, read)),
            None => {
                skipped += 1;
                unknown.insert(read.contig.as_str());
            }
        }
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {} reads on contigs absent from the genome: {}",
            skipped,
            unknown.into_iter().sorted().join(", ")
        );
    }
    resolved
}

/// Fragment covered by the read: `[start, start + L)` for forward and unstranded reads,
/// `[end - L, end)` for reverse reads.
pub fn extend(read: &Locus<i64>, fragment_length: u64) -> Result<Interval<i64>> {
    let length = i64::try_from(fragment_length)?;
    match read.orientation {
        Orientation::Forward | Orientation::Dual => {
            Interval::new(read.start(), read.start() + length)
        }
        Orientation::Reverse => Interval::new(read.end() - length, read.end()),
    }
}

/// Number of fragments covering each base of the genome.
pub fn pileup(
    genome: Arc<GenomeSpace>,
    reads: &[Locus<i64>],
    fragment_length: u64,
) -> Result<Track<f64>> {
    let fragments = resolve(&genome, reads)
        .into_iter()
        .map(|(index, read)| Ok((index, extend(read, fragment_length)?)))
        .collect::<Result<Vec<_>>>()?;
    log::debug!("Piling up {} fragments", fragments.len());
    Track::pileup(genome, fragments)
}
