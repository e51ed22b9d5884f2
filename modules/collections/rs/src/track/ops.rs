use eyre::{ensure, eyre, Result};
use rayon::prelude::*;

use pilecall_core_rs::loc::Interval;
use pilecall_core_rs::Error;

use super::track::{empty_runs, same, BoolTrack, Track, Value};
use crate::rle_vec::{merge, merge2, MergeFn};

/// Elementwise reduction of several signal tracks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Combine {
    Max,
    Min,
    Sum,
}

impl Combine {
    #[inline(always)]
    fn apply(self, first: f64, second: f64) -> f64 {
        match self {
            Combine::Max => first.max(second),
            Combine::Min => first.min(second),
            Combine::Sum => first + second,
        }
    }
}

/// Elementwise comparison of two signal tracks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Compare {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Compare {
    #[inline(always)]
    pub fn apply(self, first: f64, second: f64) -> bool {
        match self {
            Compare::Lt => first < second,
            Compare::Le => first <= second,
            Compare::Gt => first > second,
            Compare::Ge => first >= second,
            Compare::Eq => first == second,
        }
    }
}

impl<V: Value> Track<V> {
    /// Elementwise binary function over two tracks defined on the same genome.
    pub fn zip_with<U: Value, W: Value>(
        &self,
        other: &Track<U>,
        f: impl Fn(&V, &U) -> W + Send + Sync,
    ) -> Result<Track<W>> {
        self.same_genome(other)?;

        let chroms = self
            .chroms
            .par_iter()
            .zip(other.chroms.par_iter())
            .map(|(first, second)| {
                merge2(first, second).run(same::<W> as fn(&W, &W) -> bool, |a, b| match (a, b) {
                    (Some(a), Some(b)) => f(a, b),
                    _ => unreachable!("runs of a chromosome always cover its whole length"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Track {
            genome: self.genome.clone(),
            chroms,
        })
    }
}

impl Track<f64> {
    /// Elementwise reduction of all tracks. All tracks must share the same genome.
    pub fn combine(tracks: &[&Track<f64>], how: Combine) -> Result<Track<f64>> {
        let first = tracks
            .first()
            .ok_or_else(|| eyre!("at least one track is required for combine"))?;
        for track in &tracks[1..] {
            first.same_genome(*track)?;
        }

        let chroms = (0..first.genome.len())
            .into_par_iter()
            .map(|index| {
                let reducer = MergeFn::new(
                    |x: &f64| *x,
                    |values: &[&f64]| {
                        values[1..]
                            .iter()
                            .fold(*values[0], |acc, x| how.apply(acc, **x))
                    },
                );
                merge(tracks.iter().map(|t| &t.chroms[index]))
                    .with_identical(same::<f64> as fn(&f64, &f64) -> bool)
                    .with_merge(reducer)
                    .run()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Track {
            genome: first.genome.clone(),
            chroms,
        })
    }

    pub fn max(&self, other: &Track<f64>) -> Result<Track<f64>> {
        Self::combine(&[self, other], Combine::Max)
    }

    pub fn sum(&self, other: &Track<f64>) -> Result<Track<f64>> {
        Self::combine(&[self, other], Combine::Sum)
    }

    pub fn compare(&self, other: &Track<f64>, how: Compare) -> Result<BoolTrack> {
        self.zip_with(other, |a, b| how.apply(*a, *b))
    }

    /// Add the value over the interval of the chromosome. The interval is clipped to the chromosome
    /// bounds, an interval entirely outside of the chromosome leaves the track unchanged.
    pub fn add_interval(&self, contig: &str, interval: Interval<i64>, value: f64) -> Result<Self> {
        let index = self
            .genome
            .index_of(contig)
            .ok_or_else(|| Error::UnknownContig(contig.to_owned()))?;
        let size = self.genome.chrom(index).1;

        let mut result = self.clone();
        let Some((start, end)) = clip(interval, size) else {
            return Ok(result);
        };

        let mut delta = empty_runs::<f64>();
        delta.append(0.0, start)?;
        delta.append(value, end - start)?;
        delta.append(0.0, size - end)?;
        ensure!(delta.total_length() == size, Error::ShapeMismatch);

        result.chroms[index] = merge2(&self.chroms[index], &delta).run(
            same::<f64> as fn(&f64, &f64) -> bool,
            |a, b| a.copied().unwrap_or(0.0) + b.copied().unwrap_or(0.0),
        )?;
        Ok(result)
    }
}

/// Clip the interval to `[0, size)`. Returns `None` when nothing is left.
pub(crate) fn clip(interval: Interval<i64>, size: u64) -> Option<(u64, u64)> {
    let chrom = Interval::new(0, i64::try_from(size).unwrap_or(i64::MAX)).ok()?;
    let clipped = interval.clamped(&chrom)?.cast::<u64>()?;
    Some(clipped.dissolve())
}
