use ahash::HashMap;
use eyre::Result;

use crate::error::Error;

/// Genome space maps every chromosome onto a single global coordinate axis.
///
/// Chromosomes are laid out in the caller-specified order: the offset of each chromosome is the
/// sum of lengths of all preceding chromosomes, and offsets partition `[0, size)` into contiguous,
/// non-overlapping ranges. The space is immutable once built.
#[derive(Clone, Debug)]
pub struct GenomeSpace {
    names: Vec<String>,
    sizes: Vec<u64>,
    offsets: Vec<u64>,
    index: HashMap<String, usize>,
    size: u64,
}

impl GenomeSpace {
    /// Build the genome space from an ordered sequence of (chromosome name, length) pairs.
    /// Fails with [`Error::Configuration`] on empty names, zero lengths or repeated names.
    pub fn build<S: Into<String>>(chrom_sizes: impl IntoIterator<Item = (S, u64)>) -> Result<Self> {
        let mut names = Vec::new();
        let mut sizes = Vec::new();
        let mut offsets = Vec::new();
        let mut index = HashMap::default();

        let mut size: u64 = 0;
        for (name, length) in chrom_sizes {
            let name = name.into();
            if name.is_empty() {
                return Err(Error::configuration("chromosome name must not be empty").into());
            }
            if length == 0 {
                return Err(Error::configuration(format!(
                    "chromosome {name} must have a positive length"
                ))
                .into());
            }
            if index.insert(name.clone(), names.len()).is_some() {
                return Err(Error::configuration(format!(
                    "chromosome {name} is listed more than once"
                ))
                .into());
            }

            offsets.push(size);
            size = size.checked_add(length).ok_or_else(|| {
                Error::configuration("total genome length doesn't fit into u64")
            })?;
            names.push(name);
            sizes.push(length);
        }

        Ok(Self {
            names,
            sizes,
            offsets,
            index,
            size,
        })
    }

    /// Total length of the genome.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Chromosome names in the genome order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn offset(&self, name: &str) -> Result<u64> {
        Ok(self.offsets[self.require(name)?])
    }

    pub fn chrom_size(&self, name: &str) -> Result<u64> {
        Ok(self.sizes[self.require(name)?])
    }

    /// Name, length and global offset of the chromosome with the given index.
    pub fn chrom(&self, index: usize) -> (&str, u64, u64) {
        (&self.names[index], self.sizes[index], self.offsets[index])
    }

    /// Iterate over (name, length) pairs in the genome order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.names
            .iter()
            .map(|x| x.as_str())
            .zip(self.sizes.iter().copied())
    }

    /// Translate a global position into (chromosome index, local position).
    pub fn locate(&self, global: u64) -> Option<(usize, u64)> {
        if global >= self.size {
            return None;
        }
        // Index of the last chromosome whose offset is <= global
        let index = self.offsets.partition_point(|&x| x <= global) - 1;
        Some((index, global - self.offsets[index]))
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| Error::UnknownContig(name.to_owned()).into())
    }
}

impl PartialEq for GenomeSpace {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.sizes == other.sizes
    }
}

impl Eq for GenomeSpace {}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome() -> GenomeSpace {
        GenomeSpace::build([("chr1", 100), ("chr2", 60), ("chrM", 17)]).unwrap()
    }

    #[test]
    fn test_offsets() -> Result<()> {
        let genome = genome();
        assert_eq!(genome.size(), 177);
        assert_eq!(genome.len(), 3);
        assert_eq!(genome.names(), &["chr1", "chr2", "chrM"]);

        for (name, offset, size) in [("chr1", 0, 100), ("chr2", 100, 60), ("chrM", 160, 17)] {
            assert_eq!(genome.offset(name)?, offset);
            assert_eq!(genome.chrom_size(name)?, size);
        }
        Ok(())
    }

    #[test]
    fn test_caller_order_is_preserved() -> Result<()> {
        let genome = GenomeSpace::build([("chrY", 10), ("chr1", 5)])?;
        assert_eq!(genome.names(), &["chrY", "chr1"]);
        assert_eq!(genome.offset("chr1")?, 10);
        Ok(())
    }

    #[test]
    fn test_locate() {
        let genome = genome();
        for (global, expected) in [
            (0, Some((0, 0))),
            (99, Some((0, 99))),
            (100, Some((1, 0))),
            (159, Some((1, 59))),
            (160, Some((2, 0))),
            (176, Some((2, 16))),
            (177, None),
        ] {
            assert_eq!(genome.locate(global), expected);
        }
    }

    #[test]
    fn test_invalid_genomes() {
        for sizes in [
            vec![("chr1", 100), ("chr1", 50)],
            vec![("chr1", 0)],
            vec![("", 10)],
        ] {
            let err = GenomeSpace::build(sizes).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<Error>(),
                Some(Error::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_unknown_contig() {
        let err = genome().offset("chrX").unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::UnknownContig("chrX".into()))
        );
    }

    #[test]
    fn test_empty_genome() -> Result<()> {
        let genome = GenomeSpace::build(Vec::<(String, u64)>::new())?;
        assert!(genome.is_empty());
        assert_eq!(genome.size(), 0);
        assert_eq!(genome.locate(0), None);
        Ok(())
    }
}
