use std::sync::Arc;

use derive_getters::Getters;
use eyre::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};

use pilecall_collections_rs::track::Track;
use pilecall_core_rs::loc::{GenomeSpace, Locus};
use pilecall_core_rs::parallelism;
use pilecall_io_rs::narrowpeak::NarrowPeak;

use crate::listener::{Listener, NoListener};
use crate::params::Macs2Params;
use crate::{control, pcalling, pileup, poisson};

/// Single-sample peak caller bound to a genome and a set of parameters.
#[derive(Getters)]
pub struct Macs2 {
    genome: Arc<GenomeSpace>,
    params: Macs2Params,
    #[getter(skip)]
    pool: ThreadPool,
}

impl Macs2 {
    pub fn new(genome: Arc<GenomeSpace>, params: Macs2Params) -> Result<Self> {
        let threads = parallelism::available(*params.threads())?;
        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        log::debug!("Peak calling with {} threads", threads);

        Ok(Self {
            genome,
            params,
            pool,
        })
    }

    pub fn run(&self, reads: &[Locus<i64>]) -> Result<Vec<NarrowPeak>> {
        self.run_with(reads, &mut NoListener)
    }

    pub fn run_with(
        &self,
        reads: &[Locus<i64>],
        listener: &mut dyn Listener,
    ) -> Result<Vec<NarrowPeak>> {
        let mut accumulator = self.accumulator();
        accumulator.add(reads)?;
        accumulator.finish(listener)
    }

    /// Accumulator for reads arriving in chunks.
    pub fn accumulator(&self) -> Accumulator<'_> {
        Accumulator {
            macs2: self,
            treatment: Track::zeros(self.genome.clone()),
            windows: self
                .params
                .window_sizes()
                .iter()
                .map(|_| Track::zeros(self.genome.clone()))
                .collect(),
            reads: 0,
        }
    }
}

/// Running sums of the treatment and window pileups. Chunks can be added in any order, the result
/// is the same as calling [`Macs2::run`] on all reads at once.
pub struct Accumulator<'a> {
    macs2: &'a Macs2,
    treatment: Track<f64>,
    windows: Vec<Track<f64>>,
    reads: usize,
}

impl Accumulator<'_> {
    pub fn add(&mut self, chunk: &[Locus<i64>]) -> Result<&mut Self> {
        if chunk.is_empty() {
            return Ok(self);
        }

        let (genome, params) = (self.macs2.genome(), self.macs2.params());
        let (treatment, windows) = self.macs2.pool.install(|| -> Result<_> {
            let treatment = pileup::pileup(genome.clone(), chunk, *params.fragment_length())?
                .sum(&self.treatment)?;
            let windows = control::window_pileups(genome, chunk, params.window_sizes())?
                .iter()
                .zip(&self.windows)
                .map(|(part, total)| part.sum(total))
                .collect::<Result<Vec<_>>>()?;
            Ok((treatment, windows))
        })?;

        self.treatment = treatment;
        self.windows = windows;
        self.reads += chunk.len();
        log::debug!("Accumulated {} reads", self.reads);
        Ok(self)
    }

    /// Number of reads added so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn finish(self, listener: &mut dyn Listener) -> Result<Vec<NarrowPeak>> {
        let (genome, params) = (self.macs2.genome(), self.macs2.params());
        let pool = &self.macs2.pool;

        log::info!("Treatment pileup: {} runs", self.treatment.nruns());
        listener.treat_pileup(&self.treatment)?;

        let control = pool.install(|| control::lambda(genome, &self.windows, params))?;
        log::info!("Control lambda: {} runs", control.nruns());
        listener.control_lambda(&control)?;

        let p_scores = pool.install(|| poisson::p_value_track(&self.treatment, &control))?;
        listener.p_scores(&p_scores)?;

        let peaks = pool.install(|| pcalling::call_peaks(&p_scores, params))?;
        listener.peaks(&peaks)?;
        Ok(peaks)
    }
}

/// Call peaks for the reads with a temporary [`Macs2`] instance.
pub fn macs2(
    reads: &[Locus<i64>],
    genome: Arc<GenomeSpace>,
    params: Macs2Params,
) -> Result<Vec<NarrowPeak>> {
    Macs2::new(genome, params)?.run(reads)
}
