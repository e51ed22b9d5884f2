use std::f64::consts::LOG10_E;
use std::path::PathBuf;

use ::impl_tools::autoimpl;
use eyre::{Context, Result};

use pilecall_collections_rs::track::Track;
use pilecall_io_rs::narrowpeak::{self, NarrowPeak};
use pilecall_io_rs::{bedgraph, WriteRecord};

/// Hooks called by the pipeline after each stage. All hooks do nothing by default.
#[autoimpl(for <T: trait + ?Sized> &mut T, Box<T>)]
pub trait Listener {
    /// Fragment pileup of the treatment reads.
    fn treat_pileup(&mut self, _track: &Track<f64>) -> Result<()> {
        Ok(())
    }

    /// Local background, already scaled by the fragment length.
    fn control_lambda(&mut self, _track: &Track<f64>) -> Result<()> {
        Ok(())
    }

    /// Per-base natural log p-values.
    fn p_scores(&mut self, _track: &Track<f64>) -> Result<()> {
        Ok(())
    }

    fn peaks(&mut self, _peaks: &[NarrowPeak]) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct NoListener;

impl Listener for NoListener {}

/// Dumps every stage next to the given prefix: `<prefix>treat_pileup.bdg`,
/// `<prefix>control_lambda.bdg`, `<prefix>p_scores.bdg` (as -log10 p) and `<prefix>peaks.narrowPeak`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct BedGraphDump {
    prefix: String,
}

impl BedGraphDump {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.prefix, name))
    }

    fn dump(&self, name: &str, track: &Track<f64>) -> Result<()> {
        let path = self.path(name);
        log::info!("Writing {}", path.display());

        let mut writer = bedgraph::Writer::from_path(&path)?;
        writer
            .write_track(track)
            .and_then(|_| writer.flush())
            .wrap_err_with(|| format!("Failed to write {}", path.display()))
    }
}

impl Listener for BedGraphDump {
    fn treat_pileup(&mut self, track: &Track<f64>) -> Result<()> {
        self.dump("treat_pileup.bdg", track)
    }

    fn control_lambda(&mut self, track: &Track<f64>) -> Result<()> {
        self.dump("control_lambda.bdg", track)
    }

    fn p_scores(&mut self, track: &Track<f64>) -> Result<()> {
        self.dump("p_scores.bdg", &track.map(|x| -LOG10_E * x)?)
    }

    fn peaks(&mut self, peaks: &[NarrowPeak]) -> Result<()> {
        let path = self.path("peaks.narrowPeak");
        log::info!("Writing {} peaks to {}", peaks.len(), path.display());

        let mut writer = narrowpeak::Writer::from_path(&path)?;
        writer
            .write_records(peaks)
            .and_then(|_| writer.flush())
            .wrap_err_with(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pilecall_core_rs::loc::{GenomeSpace, Interval, Orientation};

    use super::*;

    #[test]
    fn test_bedgraph_dump() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("pilecall-listener-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let prefix = format!("{}/sample.", dir.display());

        let genome = Arc::new(GenomeSpace::build([("chr1", 20)])?);
        let track = Track::zeros(genome).add_interval("chr1", Interval::new(5, 10)?, 2.0)?;
        let peak = NarrowPeak::new(
            "chr1".into(),
            Interval::new(5, 10)?,
            "peak_1".into(),
            20,
            Orientation::Dual,
            2.0,
            2.0,
            2.0,
            0,
        );

        let mut listener = BedGraphDump::new(prefix);
        listener.treat_pileup(&track)?;
        listener.control_lambda(&track)?;
        listener.p_scores(&track.scale(-std::f64::consts::LN_10)?)?;
        listener.peaks(&[peak])?;

        let read = |name: &str| std::fs::read_to_string(dir.join(format!("sample.{}", name)));
        let expected = "chr1\t0\t5\t0\nchr1\t5\t10\t2\nchr1\t10\t20\t0\n";
        assert_eq!(read("treat_pileup.bdg")?, expected);
        assert_eq!(read("control_lambda.bdg")?, expected);

        let p_scores = read("p_scores.bdg")?;
        assert_eq!(p_scores.lines().count(), 3);
        let value: f64 = p_scores.lines().nth(1).unwrap().split('\t').nth(3).unwrap().parse()?;
        assert!((value - 2.0).abs() < 1e-12);

        assert_eq!(
            read("peaks.narrowPeak")?,
            "chr1\t5\t10\tpeak_1\t20\t.\t2\t2\t2\t0\n"
        );

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_no_listener() -> Result<()> {
        let genome = Arc::new(GenomeSpace::build([("chr1", 20)])?);
        let mut listener: Box<dyn Listener> = Box::new(NoListener);
        listener.treat_pileup(&Track::zeros(genome))?;
        listener.peaks(&[])?;
        Ok(())
    }
}
