use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use eyre::{ensure, Result};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

pub enum DecompressedStream {
    PlainText(File),
    Gzip(MultiGzDecoder<File>),
}

impl DecompressedStream {
    pub fn box_read(self) -> Box<dyn std::io::Read + Send + Sync + 'static> {
        match self {
            DecompressedStream::PlainText(file) => Box::new(file),
            DecompressedStream::Gzip(decoder) => Box::new(decoder),
        }
    }

    pub fn box_bufread(self) -> Box<dyn BufRead + Send + Sync + 'static> {
        match self {
            DecompressedStream::PlainText(file) => Box::new(BufReader::new(file)),
            DecompressedStream::Gzip(decoder) => Box::new(BufReader::new(decoder)),
        }
    }
}

/// Open the file for reading. Gzip is detected from the file signature, anything else is
/// treated as plain text.
pub fn read_file(path: impl AsRef<Path>) -> Result<DecompressedStream> {
    let path = path.as_ref();
    ensure!(path.exists(), "File {} does not exist", path.display());

    let kind = match infer::get_from_path(path)? {
        Some(kind) => kind,
        None => return Ok(DecompressedStream::PlainText(File::open(path)?)),
    };

    let stream = match (kind.extension(), kind.mime_type()) {
        ("gz", "application/gzip") => DecompressedStream::Gzip(MultiGzDecoder::new(File::open(path)?)),
        // Always assume plain text if there is no clear match
        _ => DecompressedStream::PlainText(File::open(path)?),
    };
    Ok(stream)
}

/// Create the file for writing. Paths ending with `.gz` are gzip-compressed.
pub fn create_file(path: impl AsRef<Path>) -> Result<Box<dyn Write + Send + Sync + 'static>> {
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path)?);

    let compressed = matches!(
        path.extension().and_then(|x| x.to_str()),
        Some("gz") | Some("gzip")
    );
    if compressed {
        Ok(Box::new(GzEncoder::new(file, flate2::Compression::default())))
    } else {
        Ok(Box::new(file))
    }
}
