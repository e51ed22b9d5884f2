use std::sync::Arc;

use eyre::{ensure, Result};
use rayon::prelude::*;

use pilecall_core_rs::loc::{GenomeSpace, Interval};

use super::ops::clip;
use super::track::{empty_runs, Track};

impl Track<f64> {
    /// Coverage of the genome by the fragments: every position holds the number of fragments
    /// overlapping it. Fragments are given as `(chromosome index, interval)` and are clipped to the
    /// chromosome bounds, fragments that fall entirely outside are ignored.
    pub fn pileup(
        genome: Arc<GenomeSpace>,
        fragments: impl IntoIterator<Item = (usize, Interval<i64>)>,
    ) -> Result<Self> {
        let mut events: Vec<Vec<(u64, i64)>> = vec![Vec::new(); genome.len()];
        for (index, interval) in fragments {
            ensure!(
                index < genome.len(),
                "chromosome index {} is out of bounds for a genome with {} chromosomes",
                index,
                genome.len()
            );
            if let Some((start, end)) = clip(interval, genome.chrom(index).1) {
                events[index].push((start, 1));
                events[index].push((end, -1));
            }
        }

        let chroms = events
            .into_par_iter()
            .enumerate()
            .map(|(index, events)| sweep(events, genome.chrom(index).1))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { genome, chroms })
    }
}

fn sweep(mut events: Vec<(u64, i64)>, size: u64) -> Result<super::Runs<f64>> {
    events.sort_unstable_by_key(|x| x.0);

    let mut runs = empty_runs::<f64>();
    let (mut depth, mut cursor) = (0i64, 0u64);
    for (position, delta) in events {
        if position > cursor {
            runs.append(depth as f64, position - cursor)?;
            cursor = position;
        }
        depth += delta;
    }
    debug_assert_eq!(depth, 0);
    runs.append(depth as f64, size - cursor)?;
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome() -> Arc<GenomeSpace> {
        Arc::new(GenomeSpace::build([("chr1", 100), ("chr2", 50)]).unwrap())
    }

    fn dense_pileup(size: usize, fragments: &[(i64, i64)]) -> Vec<f64> {
        let mut dense = vec![0.0; size];
        for (start, end) in fragments {
            for pos in (*start).max(0)..(*end).min(size as i64) {
                dense[pos as usize] += 1.0;
            }
        }
        dense
    }

    #[test]
    fn test_pileup_matches_dense() -> Result<()> {
        let chr1 = [(-10, 10), (0, 20), (20, 40), (15, 35), (90, 120), (30, 31)];
        let chr2 = [(0, 50), (10, 20), (10, 20)];

        let fragments = chr1
            .iter()
            .map(|(s, e)| (0, Interval::new(*s, *e).unwrap()))
            .chain(chr2.iter().map(|(s, e)| (1, Interval::new(*s, *e).unwrap())));
        let track = Track::pileup(genome(), fragments)?;

        assert_eq!(track.to_dense("chr1")?, dense_pileup(100, &chr1));
        assert_eq!(track.to_dense("chr2")?, dense_pileup(50, &chr2));
        assert_eq!(track.chrom_runs(1).len(), 3);
        Ok(())
    }

    #[test]
    fn test_pileup_is_additive() -> Result<()> {
        let genome = genome();
        let first = [(0, Interval::new(0, 30)?), (1, Interval::new(5, 10)?)];
        let second = [(0, Interval::new(10, 60)?), (0, Interval::new(95, 200)?)];

        let together = Track::pileup(genome.clone(), first.iter().chain(second.iter()).cloned())?;
        let parts = Track::pileup(genome.clone(), first)?.sum(&Track::pileup(genome, second)?)?;
        for index in 0..2 {
            assert_eq!(together.chrom_runs(index), parts.chrom_runs(index));
        }
        Ok(())
    }

    #[test]
    fn test_empty_pileup() -> Result<()> {
        let track = Track::pileup(genome(), [])?;
        assert_eq!(track.nruns(), 2);
        assert_eq!(track.to_dense("chr2")?, vec![0.0; 50]);
        Ok(())
    }

    #[test]
    fn test_out_of_bounds_fragments() -> Result<()> {
        let track = Track::pileup(genome(), [(0, Interval::new(-20, -10)?), (1, Interval::new(50, 60)?)])?;
        assert_eq!(track.nruns(), 2);
        assert!(Track::pileup(genome(), [(2, Interval::new(0, 10)?)]).is_err());
        Ok(())
    }
}
