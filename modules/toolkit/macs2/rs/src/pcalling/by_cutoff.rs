use derive_getters::{Dissolve, Getters};
use eyre::Result;
use itertools::Itertools;

use pilecall_collections_rs::track::{BoolTrack, Track};
use pilecall_core_rs::loc::{Interval, IntervalOp, Locus, Orientation};

/// Peak regions from a per-base score track: bases with scores below the cutoff form candidate
/// regions, regions closer than `merge_within` are joined and regions shorter than `min_length`
/// are discarded.
#[derive(Clone, PartialEq, Debug, Dissolve, Getters)]
pub struct ByCutoff {
    pub min_length: u64,
    pub merge_within: u64,
    pub cutoff: f64,
}

impl Default for ByCutoff {
    fn default() -> Self {
        Self {
            min_length: 0,
            merge_within: 0,
            cutoff: 0.0,
        }
    }
}

impl ByCutoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_min_length(&mut self, min_length: u64) -> &mut Self {
        self.min_length = min_length;
        self
    }

    pub fn set_merge_within(&mut self, merge_within: u64) -> &mut Self {
        self.merge_within = merge_within;
        self
    }

    pub fn set_cutoff(&mut self, cutoff: f64) -> &mut Self {
        self.cutoff = cutoff;
        self
    }

    /// Regions where the scores are strictly below the cutoff.
    pub fn run(&self, scores: &Track<f64>) -> Result<Vec<Locus<u64>>> {
        let cutoff = self.cutoff;
        self.regions(&scores.threshold(|x| *x < cutoff)?)
    }

    /// Merge and filter `true` regions of the track. Output is in the genome order.
    pub fn regions(&self, passed: &BoolTrack) -> Result<Vec<Locus<u64>>> {
        self.merge(passed.to_intervals()?)
    }

    /// Merge and filter loci. Loci of each contig must be contiguous in the input, the output
    /// keeps the contig order and sorts loci within each contig.
    pub fn merge(&self, loci: Vec<Locus<u64>>) -> Result<Vec<Locus<u64>>> {
        let mut result = Vec::with_capacity(loci.len());
        for (contig, group) in &loci.into_iter().chunk_by(|x| x.contig.clone()) {
            let intervals = group.map(|x| x.interval).collect();
            for interval in Interval::merge_within(intervals, self.merge_within) {
                if interval.len() >= self.min_length {
                    result.push(Locus::new(contig.clone(), interval, Orientation::Dual));
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pilecall_core_rs::loc::GenomeSpace;

    use super::*;

    fn locus(contig: &str, start: u64, end: u64) -> Locus<u64> {
        Locus::try_from((contig, start..end, Orientation::Dual)).unwrap()
    }

    fn scores() -> Track<f64> {
        let genome = Arc::new(GenomeSpace::build([("chr1", 100), ("chr2", 100)]).unwrap());
        Track::zeros(genome)
            .add_interval("chr1", Interval::new(10, 30).unwrap(), -4.0)
            .and_then(|t| t.add_interval("chr1", Interval::new(39, 60).unwrap(), -3.0))
            .and_then(|t| t.add_interval("chr1", Interval::new(80, 85).unwrap(), -9.0))
            .and_then(|t| t.add_interval("chr2", Interval::new(0, 20).unwrap(), -1.0))
            .unwrap()
    }

    #[test]
    fn test_run() -> Result<()> {
        let peaks = ByCutoff::new()
            .set_cutoff(-2.0)
            .set_merge_within(10)
            .set_min_length(20)
            .run(&scores())?;
        assert_eq!(peaks, vec![locus("chr1", 10, 60)]);

        let peaks = ByCutoff::new()
            .set_cutoff(-2.0)
            .set_merge_within(5)
            .set_min_length(1)
            .run(&scores())?;
        assert_eq!(
            peaks,
            vec![locus("chr1", 10, 30), locus("chr1", 39, 60), locus("chr1", 80, 85)]
        );

        let peaks = ByCutoff::new().set_cutoff(-0.5).run(&scores())?;
        assert_eq!(peaks.len(), 4);
        assert_eq!(peaks[3], locus("chr2", 0, 20));
        Ok(())
    }

    #[test]
    fn test_merge_is_idempotent() -> Result<()> {
        let caller = ByCutoff::new().set_merge_within(10).clone();
        let loci = vec![
            locus("chr1", 0, 5),
            locus("chr1", 12, 20),
            locus("chr1", 40, 45),
            locus("chr1", 55, 70),
            locus("chr2", 5, 6),
            locus("chr2", 100, 120),
        ];
        let once = caller.merge(loci)?;
        assert_eq!(
            once,
            vec![
                locus("chr1", 0, 20),
                locus("chr1", 40, 70),
                locus("chr2", 5, 6),
                locus("chr2", 100, 120)
            ]
        );
        assert_eq!(caller.merge(once.clone())?, once);
        Ok(())
    }

    #[test]
    fn test_length_filter() -> Result<()> {
        let loci = vec![locus("chr1", 0, 9), locus("chr1", 20, 30), locus("chr1", 50, 80)];
        for min_length in [1, 9, 10, 11, 30, 31] {
            let filtered = ByCutoff::new()
                .set_min_length(min_length)
                .merge(loci.clone())?;
            assert!(filtered.iter().all(|x| x.interval.len() >= min_length));
            let expected = loci.iter().filter(|x| x.interval.len() >= min_length).count();
            assert_eq!(filtered.len(), expected);
        }
        Ok(())
    }
}
