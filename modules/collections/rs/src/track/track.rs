use std::fmt::Debug;
use std::sync::Arc;

use eyre::{ensure, Result};
use rayon::prelude::*;

use pilecall_core_rs::loc::GenomeSpace;
use pilecall_core_rs::Error;

use crate::rle_vec::RleVec;

/// Values that can be stored in a track.
pub trait Value: Clone + PartialEq + Debug + Send + Sync {}

impl<T: Clone + PartialEq + Debug + Send + Sync> Value for T {}

/// Runs of a single chromosome. Neighbouring runs always hold different values.
pub type Runs<V> = RleVec<V, u64, fn(&V, &V) -> bool>;

pub type SignalTrack = Track<f64>;
pub type BoolTrack = Track<bool>;

pub(crate) fn same<V: PartialEq>(first: &V, second: &V) -> bool {
    first == second
}

pub(crate) fn empty_runs<V: Value>() -> Runs<V> {
    Runs::builder(same::<V> as fn(&V, &V) -> bool).build()
}

/// Piecewise-constant signal over a genome space.
///
/// Each chromosome is stored as a run-length encoded vector, chromosomes follow the genome order.
/// Run lengths of every chromosome sum up exactly to its length. Tracks are immutable: all
/// operations produce new tracks.
#[derive(Clone, Debug)]
pub struct Track<V: Value> {
    pub(crate) genome: Arc<GenomeSpace>,
    pub(crate) chroms: Vec<Runs<V>>,
}

impl<V: Value> Track<V> {
    /// Track with the same value everywhere.
    pub fn constant(genome: Arc<GenomeSpace>, value: V) -> Self {
        let chroms = genome
            .iter()
            .map(|(_, size)| Runs::uniform(value.clone(), size, same::<V> as fn(&V, &V) -> bool))
            .collect();
        Self { genome, chroms }
    }

    /// Assemble a track from per-chromosome runs listed in the genome order.
    pub fn from_runs(genome: Arc<GenomeSpace>, chroms: Vec<Runs<V>>) -> Result<Self> {
        ensure!(
            chroms.len() == genome.len(),
            Error::ShapeMismatch
        );
        for (runs, (name, size)) in chroms.iter().zip(genome.iter()) {
            ensure!(
                runs.total_length() == size,
                "runs of {} cover {} positions, expected {}",
                name,
                runs.total_length(),
                size
            );
        }
        Ok(Self { genome, chroms })
    }

    pub fn genome(&self) -> &Arc<GenomeSpace> {
        &self.genome
    }

    /// Runs of the chromosome with the given index in the genome order.
    pub fn chrom_runs(&self, index: usize) -> &Runs<V> {
        &self.chroms[index]
    }

    pub fn runs(&self, contig: &str) -> Result<&Runs<V>> {
        let index = self
            .genome
            .index_of(contig)
            .ok_or_else(|| Error::UnknownContig(contig.to_owned()))?;
        Ok(&self.chroms[index])
    }

    /// Total number of runs across all chromosomes.
    pub fn nruns(&self) -> usize {
        self.chroms.iter().map(|x| x.len()).sum()
    }

    /// Value at the global genome position.
    pub fn get(&self, global: u64) -> Option<&V> {
        let (index, local) = self.genome.locate(global)?;
        self.chroms[index].get(local)
    }

    /// Value at the position within the chromosome.
    pub fn value_at(&self, contig: &str, position: u64) -> Result<Option<&V>> {
        Ok(self.runs(contig)?.get(position))
    }

    /// Per-position values of the chromosome. Meant for small genomes and tests.
    pub fn to_dense(&self, contig: &str) -> Result<Vec<V>> {
        Ok(self.runs(contig)?.to_dense())
    }

    pub(crate) fn same_genome<U: Value>(&self, other: &Track<U>) -> Result<()> {
        if Arc::ptr_eq(&self.genome, &other.genome) || *self.genome == *other.genome {
            Ok(())
        } else {
            Err(Error::ShapeMismatch.into())
        }
    }

    /// Apply the function to every run of every chromosome.
    pub fn map<U: Value>(&self, f: impl Fn(&V) -> U + Send + Sync) -> Result<Track<U>> {
        let chroms = self
            .chroms
            .par_iter()
            .map(|runs| {
                let mut mapped = empty_runs::<U>();
                for (value, length) in runs.runs() {
                    mapped.append(f(value), *length)?;
                }
                Ok(mapped)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Track {
            genome: self.genome.clone(),
            chroms,
        })
    }

    /// Elementwise predicate, the result is `true` where the predicate holds.
    pub fn threshold(&self, predicate: impl Fn(&V) -> bool + Send + Sync) -> Result<BoolTrack> {
        self.map(predicate)
    }
}

impl Track<f64> {
    /// Track filled with zeros.
    pub fn zeros(genome: Arc<GenomeSpace>) -> Self {
        Self::constant(genome, 0.0)
    }

    pub fn scale(&self, factor: f64) -> Result<Self> {
        self.map(|x| x * factor)
    }
}
