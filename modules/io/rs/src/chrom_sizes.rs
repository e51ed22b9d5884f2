//! `chrom.sizes` files: one `name<TAB>length` pair per line, extra columns are ignored.

use std::io::BufRead;
use std::path::Path;

use eyre::{eyre, Context, OptionExt, Result};

use crate::compression;

/// Parse chromosome sizes in the file order.
pub fn read(reader: impl BufRead) -> Result<Vec<(String, u64)>> {
    let mut result = Vec::new();
    for (ind, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let name = parts
            .next()
            .ok_or_eyre("Missing chromosome name")
            .wrap_err_with(|| format!("Invalid chrom.sizes line {}", ind + 1))?;
        let size = parts
            .next()
            .ok_or_eyre("Missing chromosome length")
            .and_then(|x| {
                x.parse::<u64>()
                    .map_err(|e| eyre!("Invalid chromosome length {}: {}", x, e))
            })
            .wrap_err_with(|| format!("Invalid chrom.sizes line {}", ind + 1))?;
        result.push((name.to_owned(), size));
    }
    Ok(result)
}

pub fn read_path(path: impl AsRef<Path>) -> Result<Vec<(String, u64)>> {
    let path = path.as_ref();
    let stream = compression::read_file(path)?;
    let sizes = read(stream.box_bufread())
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    log::debug!("Read {} chromosome sizes from {}", sizes.len(), path.display());
    Ok(sizes)
}
