use std::io::Write;
use std::path::Path;

use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::Result;

use pilecall_collections_rs::track::Track;
use pilecall_core_rs::loc::{Interval, IntervalOp};

use crate::compression;
use crate::WriteRecord;

/// A single bedGraph line: constant value over the interval of the chromosome.
#[derive(Clone, PartialEq, Debug, Default, Getters, Dissolve, Constructor)]
pub struct Record {
    contig: String,
    interval: Interval<u64>,
    value: f64,
}

pub struct Writer<W> {
    writer: W,
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write every run of the track, chromosomes in the genome order.
    pub fn write_track(&mut self, track: &Track<f64>) -> Result<()> {
        let mut record = Record::default();
        for (index, (contig, _)) in track.genome().iter().enumerate() {
            record.contig.clear();
            record.contig.push_str(contig);

            let mut cursor = 0;
            for (value, length) in track.chrom_runs(index).runs() {
                if *length == 0 {
                    continue;
                }
                record.interval = Interval::new(cursor, cursor + length)?;
                record.value = *value;
                self.write_record(&record)?;
                cursor += length;
            }
        }
        Ok(())
    }
}

impl Writer<()> {
    /// Create a bedGraph file, `.gz` paths are gzip-compressed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Writer<Box<dyn Write + Send + Sync>>> {
        Ok(Writer::new(compression::create_file(path)?))
    }
}

impl<W: Write> WriteRecord for Writer<W> {
    type Record = Record;

    fn write_record(&mut self, record: &Self::Record) -> Result<()> {
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}",
            record.contig,
            record.interval.start(),
            record.interval.end(),
            record.value
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
