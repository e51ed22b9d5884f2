// Format reference: https://genome.ucsc.edu/FAQ/FAQformat.html#format12
//
// 1. chrom
// 2. chromStart, 0-based
// 3. chromEnd, exclusive
// 4. name
// 5. score: u32
// 6. strand: [+|-|.]
// 7. signalValue
// 8. pValue: -log10, -1 if unknown
// 9. qValue: -log10, -1 if unknown
// 10. peak: summit offset from chromStart, -1 if unknown

use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::{ensure, eyre, Context, OptionExt, Report, Result};

use pilecall_core_rs::loc::{Interval, IntervalOp, Orientation};

use crate::compression;
use crate::WriteRecord;

#[derive(Clone, PartialEq, Debug, Getters, Dissolve, Constructor)]
pub struct NarrowPeak {
    contig: String,
    interval: Interval<u64>,
    name: String,
    score: u32,
    orientation: Orientation,
    signal_value: f64,
    p_value: f64,
    q_value: f64,
    summit: i64,
}

impl FromStr for NarrowPeak {
    type Err = Report;

    fn from_str(line: &str) -> Result<Self> {
        fn field<'a, T: FromStr>(parts: &mut impl Iterator<Item = &'a str>, name: &str) -> Result<T>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            parts
                .next()
                .ok_or_eyre(format!("Missing narrowPeak {}", name))?
                .parse::<T>()
                .wrap_err_with(|| format!("Invalid narrowPeak {}", name))
        }

        let mut parts = line.trim_end_matches(['\n', '\r']).split('\t');
        let contig: String = field(&mut parts, "chrom")?;
        let start = field(&mut parts, "chromStart")?;
        let end = field(&mut parts, "chromEnd")?;
        let name = field(&mut parts, "name")?;
        let score = field(&mut parts, "score")?;
        let strand: char = field(&mut parts, "strand")?;
        let peak = NarrowPeak {
            contig,
            interval: Interval::new(start, end)?,
            name,
            score,
            orientation: Orientation::try_from(strand)
                .map_err(|_| eyre!("Invalid narrowPeak strand: {}", strand))?,
            signal_value: field(&mut parts, "signalValue")?,
            p_value: field(&mut parts, "pValue")?,
            q_value: field(&mut parts, "qValue")?,
            summit: field(&mut parts, "peak")?,
        };
        ensure!(parts.next().is_none(), "narrowPeak record has too many fields");
        Ok(peak)
    }
}

pub struct Writer<W> {
    writer: W,
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl Writer<()> {
    /// Create a narrowPeak file, `.gz` paths are gzip-compressed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Writer<Box<dyn Write + Send + Sync>>> {
        Ok(Writer::new(compression::create_file(path)?))
    }
}

impl<W: Write> WriteRecord for Writer<W> {
    type Record = NarrowPeak;

    fn write_record(&mut self, record: &Self::Record) -> Result<()> {
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.contig,
            record.interval.start(),
            record.interval.end(),
            record.name,
            record.score,
            record.orientation,
            record.signal_value,
            record.p_value,
            record.q_value,
            record.summit
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
