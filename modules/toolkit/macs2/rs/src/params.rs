use derive_getters::{Dissolve, Getters};
use eyre::Result;

use pilecall_core_rs::loc::{GenomeSpace, IntervalOp, Locus};
use pilecall_core_rs::Error;

/// Validated peak calling parameters. Use [`Macs2Params::builder`] to construct them.
#[derive(Clone, PartialEq, Debug, Getters, Dissolve)]
pub struct Macs2Params {
    /// Fragment length used to extend reads and to scale the control lambda.
    fragment_length: u64,
    /// Total number of reads, sets the genome-wide background rate.
    n_reads: u64,
    p_value_cutoff: f64,
    /// Peaks separated by at most this many bases are merged.
    max_gap: u64,
    effective_genome_size: u64,
    /// Local background window sizes.
    window_sizes: Vec<u64>,
    /// Shorter peaks are discarded.
    min_length: u64,
    /// Requested parallelism level, see [`pilecall_core_rs::parallelism::available`].
    threads: isize,
}

impl Macs2Params {
    pub fn builder() -> Macs2ParamsBuilder {
        Macs2ParamsBuilder::default()
    }

    /// Builder pre-filled with statistics of the input: the number of reads, the median read
    /// length as the maximum gap and the genome size as the effective genome size.
    pub fn derive(reads: &[Locus<i64>], genome: &GenomeSpace) -> Macs2ParamsBuilder {
        let mut builder = Macs2ParamsBuilder::default();
        builder.set_n_reads(reads.len() as u64);

        if !reads.is_empty() {
            let mut lengths: Vec<u64> = reads.iter().map(|x| x.interval.len() as u64).collect();
            lengths.sort_unstable();
            let mid = lengths.len() / 2;
            let median = if lengths.len() % 2 == 1 {
                lengths[mid]
            } else {
                (lengths[mid - 1] + lengths[mid]) / 2
            };
            builder.set_max_gap(median);
        }
        if genome.size() > 0 {
            builder.set_effective_genome_size(genome.size());
        }
        builder
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Macs2ParamsBuilder {
    fragment_length: u64,
    n_reads: u64,
    p_value_cutoff: f64,
    max_gap: u64,
    effective_genome_size: u64,
    window_sizes: Vec<u64>,
    min_length: Option<u64>,
    threads: isize,
}

impl Default for Macs2ParamsBuilder {
    fn default() -> Self {
        Self {
            fragment_length: 150,
            n_reads: 0,
            p_value_cutoff: 0.001,
            max_gap: 30,
            effective_genome_size: 2_600_000,
            window_sizes: vec![10_000],
            min_length: None,
            threads: 1,
        }
    }
}

impl Macs2ParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fragment_length(&mut self, fragment_length: u64) -> &mut Self {
        self.fragment_length = fragment_length;
        self
    }

    pub fn set_n_reads(&mut self, n_reads: u64) -> &mut Self {
        self.n_reads = n_reads;
        self
    }

    pub fn set_p_value_cutoff(&mut self, p_value_cutoff: f64) -> &mut Self {
        self.p_value_cutoff = p_value_cutoff;
        self
    }

    pub fn set_max_gap(&mut self, max_gap: u64) -> &mut Self {
        self.max_gap = max_gap;
        self
    }

    pub fn set_effective_genome_size(&mut self, effective_genome_size: u64) -> &mut Self {
        self.effective_genome_size = effective_genome_size;
        self
    }

    pub fn set_window_sizes(&mut self, window_sizes: Vec<u64>) -> &mut Self {
        self.window_sizes = window_sizes;
        self
    }

    /// Minimum peak length, defaults to the fragment length.
    pub fn set_min_length(&mut self, min_length: u64) -> &mut Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn set_threads(&mut self, threads: isize) -> &mut Self {
        self.threads = threads;
        self
    }

    pub fn build(&self) -> Result<Macs2Params> {
        let invalid =
            |msg: String| -> Result<Macs2Params> { Err(Error::configuration(msg).into()) };

        if self.fragment_length == 0 {
            return invalid("fragment length must be positive".to_owned());
        }
        if !(self.p_value_cutoff > 0.0 && self.p_value_cutoff < 1.0) {
            return invalid(format!(
                "p-value cutoff must be in (0, 1), got {}",
                self.p_value_cutoff
            ));
        }
        if self.effective_genome_size == 0 {
            return invalid("effective genome size must be positive".to_owned());
        }
        if let Some(w) = self.window_sizes.iter().find(|x| **x == 0) {
            return invalid(format!("window sizes must be positive, got {}", w));
        }
        let min_length = self.min_length.unwrap_or(self.fragment_length);
        if min_length == 0 {
            return invalid("minimum peak length must be positive".to_owned());
        }
        if i64::try_from(self.fragment_length).is_err()
            || self.window_sizes.iter().any(|x| i64::try_from(*x).is_err())
        {
            return invalid("fragment length and window sizes must fit into i64".to_owned());
        }

        Ok(Macs2Params {
            fragment_length: self.fragment_length,
            n_reads: self.n_reads,
            p_value_cutoff: self.p_value_cutoff,
            max_gap: self.max_gap,
            effective_genome_size: self.effective_genome_size,
            window_sizes: self.window_sizes.clone(),
            min_length,
            threads: self.threads,
        })
    }
}

#[cfg(test)]
mod tests {
    use pilecall_core_rs::loc::Orientation;

    use super::*;

    #[test]
    fn test_defaults() -> Result<()> {
        let params = Macs2Params::builder().build()?;
        assert_eq!(*params.fragment_length(), 150);
        assert_eq!(*params.n_reads(), 0);
        assert_eq!(*params.p_value_cutoff(), 0.001);
        assert_eq!(*params.max_gap(), 30);
        assert_eq!(*params.effective_genome_size(), 2_600_000);
        assert_eq!(params.window_sizes(), &vec![10_000]);
        assert_eq!(*params.min_length(), 150);
        assert_eq!(*params.threads(), 1);
        Ok(())
    }

    #[test]
    fn test_min_length_follows_fragment_length() -> Result<()> {
        let params = Macs2Params::builder().set_fragment_length(20).build()?;
        assert_eq!(*params.min_length(), 20);

        let params = Macs2Params::builder()
            .set_fragment_length(20)
            .set_min_length(5)
            .build()?;
        assert_eq!(*params.min_length(), 5);
        Ok(())
    }

    #[test]
    fn test_invalid_params() {
        let mut cases = Vec::new();
        cases.push(Macs2Params::builder().set_fragment_length(0).clone());
        for cutoff in [0.0, 1.0, -0.5, 2.0, f64::NAN] {
            cases.push(Macs2Params::builder().set_p_value_cutoff(cutoff).clone());
        }
        cases.push(Macs2Params::builder().set_effective_genome_size(0).clone());
        cases.push(Macs2Params::builder().set_window_sizes(vec![100, 0]).clone());
        cases.push(Macs2Params::builder().set_min_length(0).clone());
        cases.push(Macs2Params::builder().set_fragment_length(u64::MAX).clone());

        for builder in cases {
            let err = builder.build().unwrap_err();
            assert!(
                matches!(err.downcast_ref::<Error>(), Some(Error::Configuration(_))),
                "{:?}",
                builder
            );
        }
    }

    #[test]
    fn test_derive() -> Result<()> {
        let genome = GenomeSpace::build([("chr1", 100), ("chr2", 50)])?;
        let reads = vec![
            Locus::try_from(("chr1", 10..20, Orientation::Reverse))?,
            Locus::try_from(("chr1", 11..22, Orientation::Forward))?,
            Locus::try_from(("chr1", 40..60, Orientation::Reverse))?,
            Locus::try_from(("chr2", 15..35, Orientation::Forward))?,
        ];
        let params = Macs2Params::derive(&reads, &genome)
            .set_fragment_length(20)
            .build()?;
        assert_eq!(*params.n_reads(), 4);
        // Lengths are 10, 11, 20, 20
        assert_eq!(*params.max_gap(), 15);
        assert_eq!(*params.effective_genome_size(), 150);

        let empty = Macs2Params::derive(&[], &GenomeSpace::build(Vec::<(String, u64)>::new())?)
            .build()?;
        assert_eq!(*empty.n_reads(), 0);
        assert_eq!(*empty.max_gap(), 30);
        assert_eq!(*empty.effective_genome_size(), 2_600_000);
        Ok(())
    }
}
