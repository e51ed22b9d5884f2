use std::io::BufRead;
use std::path::Path;

use eyre::{bail, Context, OptionExt, Result};

use pilecall_core_rs::loc::{Interval, Locus, Orientation};

use crate::compression;
use crate::ReadRecord;

pub mod parse {
    use super::*;

    pub fn seqid<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<String> {
        let seqid = parts.next().ok_or_eyre("Missing BED seqid")?;
        if seqid.is_empty() {
            bail!("Empty BED seqid");
        }
        Ok(seqid.to_owned())
    }

    pub fn interval<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<Interval<i64>> {
        let start = parts.next().ok_or_eyre("Missing BED start")?;
        let end = parts.next().ok_or_eyre("Missing BED end")?;

        let (start, end) = match (start.parse::<i64>(), end.parse::<i64>()) {
            (Ok(start), Ok(end)) if start >= 0 => (start, end),
            _ => bail!("Invalid BED interval"),
        };
        Interval::new(start, end).wrap_err("Invalid BED interval")
    }

    /// Orientation from the 6th column. Columns 4 and 5 are skipped, a missing column is unstranded.
    pub fn orientation<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<Orientation> {
        let orientation = match parts.nth(2) {
            None => return Ok(Orientation::Dual),
            Some(x) => x,
        };
        let orientation = match orientation {
            "+" => Orientation::Forward,
            "-" => Orientation::Reverse,
            "." => Orientation::Dual,
            _ => bail!("Invalid BED strand"),
        };
        Ok(orientation)
    }

    pub fn locus<'a>(parts: &mut impl Iterator<Item = &'a str>, into: &mut Locus<i64>) -> Result<()> {
        into.contig = seqid(parts)?;
        into.interval = interval(parts)?;
        into.orientation = orientation(parts)?;
        Ok(())
    }

    /// Header, comment and blank lines carry no records.
    pub fn is_header(line: &str) -> bool {
        line.is_empty()
            || line.starts_with('#')
            || line.starts_with("track")
            || line.starts_with("browser")
    }
}

/// Reads BED3+ records as stranded loci.
pub struct Reader<R> {
    reader: R,
    buffer: String,
    line: usize,
}

impl<R> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line: 0,
        }
    }
}

impl Reader<()> {
    /// Create a new BED reader from the given file path. Gzip compression is detected from the
    /// file signature.
    pub fn from_path(
        path: impl AsRef<Path>,
    ) -> Result<Reader<Box<dyn BufRead + Send + Sync + 'static>>> {
        let stream = compression::read_file(path.as_ref())
            .wrap_err_with(|| format!("Failed to open BED file {}", path.as_ref().display()))?;
        Ok(Reader::new(stream.box_bufread()))
    }
}

impl<R: BufRead> Reader<R> {
    /// Read all remaining records into a new vector.
    pub fn read_all(&mut self) -> Result<Vec<Locus<i64>>> {
        let mut records = Vec::new();
        self.read_to_end(&mut records)?;
        log::debug!("Read {} BED records", records.len());
        Ok(records)
    }
}

impl<R: BufRead> ReadRecord for Reader<R> {
    type Record = Locus<i64>;

    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(false);
            }
            self.line += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if parse::is_header(line) {
                continue;
            }

            let mut parts = line.split('\t');
            parse::locus(&mut parts, into).wrap_err_with(|| {
                format!("Failed to parse BED record at line {}: {}", self.line, line)
            })?;
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn read(content: &str) -> Result<Vec<Locus<i64>>> {
        Reader::new(Cursor::new(content)).read_all()
    }

    #[test]
    fn test_empty_bed() -> Result<()> {
        assert!(read("")?.is_empty());
        assert!(read("# comment\ntrack name=x\nbrowser position chr1\n\n")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_valid_bed_parsing() -> Result<()> {
        let content = "\
            track name=reads\n\
            chr1\t10\t20\tr1\t0\t-\n\
            chr1\t11\t22\tr2\t0\t+\r\n\
            chr2\t40\t60\n\
            chr2\t15\t35\tr4\t0\t.\textra\n";
        let expected = vec![
            Locus::try_from(("chr1", 10..20, Orientation::Reverse))?,
            Locus::try_from(("chr1", 11..22, Orientation::Forward))?,
            Locus::try_from(("chr2", 40..60, Orientation::Dual))?,
            Locus::try_from(("chr2", 15..35, Orientation::Dual))?,
        ];
        assert_eq!(read(content)?, expected);
        Ok(())
    }

    #[test]
    fn test_record_by_record() -> Result<()> {
        let mut reader = Reader::new(Cursor::new("chr1\t0\t5\tx\t0\t+\n#c\nchr1\t5\t9\n"));
        let mut record = Locus::default();
        assert!(reader.read_record(&mut record)?);
        assert_eq!(record.interval, Interval::new(0, 5)?);
        assert!(reader.read_record(&mut record)?);
        assert_eq!(record.orientation, Orientation::Dual);
        assert!(!reader.read_record(&mut record)?);
        Ok(())
    }

    #[test]
    fn test_invalid_bed() {
        for content in [
            "chr1\t10\n",
            "chr1\t20\t10\n",
            "chr1\t-5\t10\n",
            "chr1\tx\t10\n",
            "chr1\t1\t10\tname\t0\t*\n",
            "\t1\t10\n",
        ] {
            assert!(read(content).is_err(), "{:?}", content);
        }
    }
}
