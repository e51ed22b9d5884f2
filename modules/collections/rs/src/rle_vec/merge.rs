use std::marker::PhantomData;

use ::impl_tools::autoimpl;
use eyre::{eyre, Result};

use pilecall_core_rs::num::PrimUInt;

use super::{Identical, RleVec};

/// Elementwise reduction over several run-length vectors.
#[autoimpl(for <M: trait + ?Sized> &mut M, Box<M>)]
pub trait Merge<T> {
    /// Called where only one vector still has values (vectors of different lengths).
    fn single(&mut self, val: &T) -> T;
    fn multiple(&mut self, vals: &[&T]) -> T;
}

pub struct MergeFn<T, Single, Multiple>
where
    Single: FnMut(&T) -> T,
    Multiple: FnMut(&[&T]) -> T,
{
    single_fn: Single,
    multiple_fn: Multiple,
    _phantom: PhantomData<T>,
}

impl<T, Single, Multiple> MergeFn<T, Single, Multiple>
where
    Single: FnMut(&T) -> T,
    Multiple: FnMut(&[&T]) -> T,
{
    pub fn new(single_fn: Single, multiple_fn: Multiple) -> Self {
        Self {
            single_fn,
            multiple_fn,
            _phantom: Default::default(),
        }
    }
}

impl<T, Single, Multiple> Merge<T> for MergeFn<T, Single, Multiple>
where
    Single: FnMut(&T) -> T,
    Multiple: FnMut(&[&T]) -> T,
{
    #[inline(always)]
    fn single(&mut self, val: &T) -> T {
        (self.single_fn)(val)
    }

    #[inline(always)]
    fn multiple(&mut self, vals: &[&T]) -> T {
        (self.multiple_fn)(vals)
    }
}

pub fn merge<'a, V, L, M, IOriginal, INew>(
    inputs: impl IntoIterator<Item = &'a RleVec<V, L, IOriginal>>,
) -> MergeSetup<'a, V, L, M, IOriginal, INew>
where
    V: 'a,
    L: PrimUInt + 'a,
    M: Merge<V>,
    IOriginal: Identical<V> + 'a,
    INew: Identical<V>,
{
    MergeSetup {
        inputs: inputs.into_iter().collect(),
        identical: None,
        merge: None,
    }
}

pub struct MergeSetup<'a, V, L: PrimUInt, M: Merge<V>, IOriginal: Identical<V>, INew: Identical<V>>
{
    inputs: Vec<&'a RleVec<V, L, IOriginal>>,
    identical: Option<INew>,
    merge: Option<M>,
}

impl<V, L: PrimUInt, M: Merge<V>, IOriginal: Identical<V>, INew: Identical<V>>
    MergeSetup<'_, V, L, M, IOriginal, INew>
{
    pub fn with_identical(mut self, identical: INew) -> Self {
        self.identical = Some(identical);
        self
    }

    pub fn with_merge(mut self, merge: M) -> Self {
        self.merge = Some(merge);
        self
    }

    pub fn run(mut self) -> Result<RleVec<V, L, INew>> {
        let merge_fn = self
            .merge
            .take()
            .ok_or_else(|| eyre!("Merge function is unspecified in rle_vec::merge."))?;
        let identical = self
            .identical
            .take()
            .ok_or_else(|| eyre!("Identical rule is unspecified in rle_vec::merge."))?;

        merge_impl(&self.inputs, RleVec::builder(identical).build(), merge_fn)
    }
}

fn merge_impl<V, L, IOriginal, INew>(
    inputs: &[&RleVec<V, L, IOriginal>],
    mut append_to: RleVec<V, L, INew>,
    mut merge: impl Merge<V>,
) -> Result<RleVec<V, L, INew>>
where
    L: PrimUInt,
    IOriginal: Identical<V>,
    INew: Identical<V>,
{
    // (remaining runs, current value, end of the current run)
    let mut cursors = Vec::with_capacity(inputs.len());
    for rle in inputs {
        let mut runs = rle.runs();
        if let Some((val, length)) = runs.next() {
            cursors.push((runs, val, to_u64(length)?));
        }
    }

    let mut current_end: u64 = 0;
    let mut values = Vec::with_capacity(cursors.len());
    while !cursors.is_empty() {
        let new_end = cursors
            .iter()
            .map(|x| x.2)
            .min()
            .unwrap_or(current_end);

        values.clear();
        values.extend(cursors.iter().map(|x| x.1));
        let value = match values.as_slice() {
            [single] => merge.single(single),
            multiple => merge.multiple(multiple),
        };

        let length = L::from(new_end - current_end)
            .ok_or_else(|| eyre!("Length can't fit in {:?}", L::max_value()))?;
        debug_assert!(length > L::zero());
        append_to.append(value, length)?;
        current_end = new_end;

        // Push finished cursors forward and drop the exhausted ones
        let mut failure = None;
        cursors.retain_mut(|(runs, val, end)| {
            if *end > current_end {
                return true;
            }
            match runs.next() {
                Some((v, l)) => match to_u64(l) {
                    Ok(l) => {
                        *val = v;
                        *end += l;
                        true
                    }
                    Err(err) => {
                        failure = Some(err);
                        false
                    }
                },
                None => false,
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }
    }

    Ok(append_to)
}

fn to_u64<L: PrimUInt>(length: &L) -> Result<u64> {
    length
        .to_u64()
        .ok_or_else(|| eyre!("Length {:?} can't fit in u64", length))
}
