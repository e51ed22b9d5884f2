use std::iter::Zip;
use std::vec::IntoIter;

use derive_getters::Dissolve;
use eyre::{eyre, Result};

use pilecall_core_rs::num::PrimUInt;

use super::identical::Identical;

pub struct RleVecBuilder<V, L: PrimUInt, I: Identical<V>> {
    values: Vec<V>,
    lengths: Vec<L>,
    identical: I,
}

impl<V, L: PrimUInt, I: Identical<V>> RleVecBuilder<V, L, I> {
    pub fn new(identical: I) -> Self {
        Self {
            values: Vec::new(),
            lengths: Vec::new(),
            identical,
        }
    }

    pub fn with_identical<NewI: Identical<V>>(self, identical: NewI) -> RleVecBuilder<V, L, NewI> {
        RleVecBuilder {
            values: self.values,
            lengths: self.lengths,
            identical,
        }
    }

    pub fn with_capacity(mut self, runs: usize) -> Self {
        self.values.reserve(runs);
        self.lengths.reserve(runs);
        self
    }

    /// Use pre-encoded runs as is. Zero-length runs are rejected.
    pub fn with_rle_values(mut self, values: Vec<V>, lengths: Vec<L>) -> Result<Self> {
        if values.len() != lengths.len() {
            return Err(eyre!(
                "Values and lengths must have the same length, got {} and {}",
                values.len(),
                lengths.len()
            ));
        }
        if lengths.iter().any(|x| x.is_zero()) {
            return Err(eyre!("Run lengths must be positive"));
        }

        self.values = values;
        self.lengths = lengths;
        Ok(self)
    }

    /// Encode a dense sequence of values.
    pub fn with_dense_values(mut self, dense: &[V]) -> Result<Self>
    where
        V: Clone,
    {
        self.values.clear();
        self.lengths.clear();

        let mut iter = dense.iter();
        let mut current = match iter.next() {
            None => return Ok(self),
            Some(x) => x,
        };
        let mut length: u64 = 1;

        for value in iter {
            if self.identical.identical(current, value) {
                length += 1;
            } else {
                self.values.push(current.clone());
                self.lengths.push(Self::cast(length)?);
                current = value;
                length = 1;
            }
        }

        self.values.push(current.clone());
        self.lengths.push(Self::cast(length)?);
        Ok(self)
    }

    pub fn build(self) -> RleVec<V, L, I> {
        RleVec {
            values: self.values,
            lengths: self.lengths,
            identical: self.identical,
        }
    }

    fn cast(length: u64) -> Result<L> {
        L::from(length).ok_or_else(|| eyre!("Length {} can't fit in {:?}", length, L::max_value()))
    }
}

/// Run-length encoded vector: a sequence of (value, run length) pairs.
#[derive(Debug, Clone, Dissolve)]
pub struct RleVec<V, L: PrimUInt, I: Identical<V>> {
    values: Vec<V>,
    lengths: Vec<L>,
    identical: I,
}

impl<V, L: PrimUInt, I: Identical<V>> RleVec<V, L, I> {
    pub fn builder(identical: I) -> RleVecBuilder<V, L, I> {
        RleVecBuilder::new(identical)
    }

    /// A vector with a single run of the given value.
    pub fn uniform(value: V, length: L, identical: I) -> Self {
        let mut rle = Self::builder(identical).build();
        if !length.is_zero() {
            rle.push(value, length);
        }
        rle
    }

    pub fn identical(&self, first: &V, second: &V) -> bool {
        self.identical.identical(first, second)
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Number of encoded elements, i.e. the sum of all run lengths.
    pub fn total_length(&self) -> u64 {
        self.lengths
            .iter()
            .fold(0u64, |acc, x| acc + x.to_u64().unwrap_or(0))
    }

    /// Append a new run without checking the previous one.
    pub fn push(&mut self, value: V, length: L) {
        self.values.push(value);
        self.lengths.push(length);
    }

    /// Append a run, extending the last run instead if both values are identical.
    pub fn append(&mut self, value: V, length: L) -> Result<()> {
        if length.is_zero() {
            return Ok(());
        }
        if let (Some(last_value), Some(last_length)) = (self.values.last(), self.lengths.last_mut()) {
            if self.identical.identical(last_value, &value) {
                *last_length = last_length
                    .checked_add(&length)
                    .ok_or_else(|| eyre!("Length can't fit in {:?}", L::max_value()))?;
                return Ok(());
            }
        }
        self.push(value, length);
        Ok(())
    }

    pub fn runs(&self) -> impl Iterator<Item = (&V, &L)> {
        self.values.iter().zip(self.lengths.iter())
    }

    /// Value at the given element position.
    pub fn get(&self, position: u64) -> Option<&V> {
        let mut end = 0u64;
        for (value, length) in self.runs() {
            end += length.to_u64()?;
            if position < end {
                return Some(value);
            }
        }
        None
    }

    /// Expand runs into a dense vector.
    pub fn to_dense(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut dense = Vec::with_capacity(self.total_length() as usize);
        for (value, length) in self.runs() {
            let length = length.to_usize().unwrap_or(0);
            dense.extend(std::iter::repeat_n(value.clone(), length));
        }
        dense
    }
}

impl<V, L: PrimUInt, I: Identical<V>> IntoIterator for RleVec<V, L, I> {
    type Item = (V, L);
    type IntoIter = Zip<IntoIter<V>, IntoIter<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter().zip(self.lengths)
    }
}

impl<V: PartialEq, L: PrimUInt, I: Identical<V>> PartialEq for RleVec<V, L, I> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.lengths == other.lengths
    }
}
