use ahash::HashMap;
use eyre::Result;

use pilecall_core_rs::loc::{Interval, Locus, Orientation};
use pilecall_core_rs::Error;

use super::track::{BoolTrack, Track, Value};

impl BoolTrack {
    /// Maximal intervals where the track is `true`, in the genome order.
    pub fn to_intervals(&self) -> Result<Vec<Locus<u64>>> {
        let mut result = Vec::new();
        for (runs, (name, _)) in self.chroms.iter().zip(self.genome.iter()) {
            let mut cursor = 0;
            for (value, length) in runs.runs() {
                if *value {
                    result.push(Locus::new(
                        name.to_owned(),
                        Interval::new(cursor, cursor + length)?,
                        Orientation::Dual,
                    ));
                }
                cursor += length;
            }
        }
        Ok(result)
    }
}

impl<V: Value> Track<V> {
    /// Runs of the track inside each interval, clipped to the interval bounds. Intervals are
    /// clipped to the chromosome, an interval outside of its chromosome yields no runs.
    pub fn extract(&self, intervals: &[Locus<u64>]) -> Result<Vec<Vec<(V, u64)>>> {
        // Run ends for each chromosome touched by the intervals
        let mut ends: HashMap<usize, Vec<u64>> = HashMap::default();

        let mut result = Vec::with_capacity(intervals.len());
        for locus in intervals {
            let index = self
                .genome
                .index_of(&locus.contig)
                .ok_or_else(|| Error::UnknownContig(locus.contig.clone()))?;
            let runs = &self.chroms[index];
            let ends = ends.entry(index).or_insert_with(|| {
                runs.runs()
                    .scan(0u64, |acc, (_, length)| {
                        *acc += length;
                        Some(*acc)
                    })
                    .collect()
            });

            let (start, end) = (locus.start(), locus.end().min(runs.total_length()));
            let mut extracted = Vec::new();
            let first = ends.partition_point(|x| *x <= start);
            let mut cursor = start;
            for (run, (value, _)) in runs.runs().enumerate().skip(first) {
                if cursor >= end {
                    break;
                }
                let run_end = ends[run].min(end);
                extracted.push((value.clone(), run_end - cursor));
                cursor = run_end;
            }
            result.push(extracted);
        }
        Ok(result)
    }

    /// Per-position values inside each interval.
    pub fn extract_dense(&self, intervals: &[Locus<u64>]) -> Result<Vec<Vec<V>>> {
        Ok(self
            .extract(intervals)?
            .into_iter()
            .map(|runs| {
                runs.into_iter()
                    .flat_map(|(value, length)| std::iter::repeat_n(value, length as usize))
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pilecall_core_rs::loc::GenomeSpace;

    use super::*;

    fn signal() -> Track<f64> {
        let genome = Arc::new(GenomeSpace::build([("chr1", 100), ("chr2", 50)]).unwrap());
        Track::zeros(genome)
            .add_interval("chr1", Interval::new(10, 30).unwrap(), 2.0)
            .and_then(|t| t.add_interval("chr1", Interval::new(20, 40).unwrap(), 1.0))
            .and_then(|t| t.add_interval("chr2", Interval::new(0, 5).unwrap(), 5.0))
            .and_then(|t| t.add_interval("chr2", Interval::new(45, 50).unwrap(), 5.0))
            .unwrap()
    }

    fn locus(contig: &str, start: u64, end: u64) -> Locus<u64> {
        Locus::new(contig.to_owned(), Interval::new(start, end).unwrap(), Orientation::Dual)
    }

    #[test]
    fn test_to_intervals() -> Result<()> {
        let intervals = signal().threshold(|x| *x > 0.0)?.to_intervals()?;
        assert_eq!(
            intervals,
            vec![locus("chr1", 10, 40), locus("chr2", 0, 5), locus("chr2", 45, 50)]
        );

        let none = signal().threshold(|x| *x > 10.0)?.to_intervals()?;
        assert!(none.is_empty());
        Ok(())
    }

    #[test]
    fn test_extract() -> Result<()> {
        let track = signal();
        let extracted = track.extract(&[
            locus("chr1", 15, 35),
            locus("chr1", 0, 5),
            locus("chr2", 3, 48),
            locus("chr1", 95, 120),
        ])?;
        assert_eq!(
            extracted,
            vec![
                vec![(2.0, 5), (3.0, 10), (1.0, 5)],
                vec![(0.0, 5)],
                vec![(5.0, 2), (0.0, 40), (5.0, 3)],
                vec![(0.0, 5)],
            ]
        );

        let dense = track.extract_dense(&[locus("chr1", 28, 32)])?;
        assert_eq!(dense, vec![vec![3.0, 3.0, 1.0, 1.0]]);

        assert!(track.extract(&[locus("chrX", 0, 1)]).is_err());
        Ok(())
    }
}
