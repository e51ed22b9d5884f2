use std::marker::PhantomData;

use ::impl_tools::autoimpl;
use eyre::{eyre, Result};

use pilecall_core_rs::num::PrimUInt;

use super::{Identical, RleVec};

/// Elementwise binary operation over two run-length vectors.
#[autoimpl(for <M: trait + ?Sized> &mut M, Box<M>)]
pub trait Merge2<T> {
    /// Called past the end of the shorter vector.
    fn single(&mut self, val: &T) -> T;
    fn two(&mut self, first: &T, second: &T) -> T;
}

pub struct Merge2Fn<T, Single, Two>
where
    Single: FnMut(&T) -> T,
    Two: FnMut(&T, &T) -> T,
{
    single_fn: Single,
    two_fn: Two,
    _phantom: PhantomData<T>,
}

impl<T, Single, Two> Merge2Fn<T, Single, Two>
where
    Single: FnMut(&T) -> T,
    Two: FnMut(&T, &T) -> T,
{
    pub fn new(single_fn: Single, two_fn: Two) -> Self {
        Self {
            single_fn,
            two_fn,
            _phantom: Default::default(),
        }
    }
}

impl<T, Single, Two> Merge2<T> for Merge2Fn<T, Single, Two>
where
    Single: FnMut(&T) -> T,
    Two: FnMut(&T, &T) -> T,
{
    #[inline(always)]
    fn single(&mut self, val: &T) -> T {
        (self.single_fn)(val)
    }

    #[inline(always)]
    fn two(&mut self, first: &T, second: &T) -> T {
        (self.two_fn)(first, second)
    }
}

/// Binary merge. Unlike [`super::merge`], the inputs may hold different value types and the
/// output type is set by the merge function.
pub fn merge2<'a, A, B, L, IA, IB>(
    first: &'a RleVec<A, L, IA>,
    second: &'a RleVec<B, L, IB>,
) -> Merge2Setup<'a, A, B, L, IA, IB>
where
    L: PrimUInt,
    IA: Identical<A>,
    IB: Identical<B>,
{
    Merge2Setup { first, second }
}

pub struct Merge2Setup<'a, A, B, L: PrimUInt, IA: Identical<A>, IB: Identical<B>> {
    first: &'a RleVec<A, L, IA>,
    second: &'a RleVec<B, L, IB>,
}

impl<A, B, L: PrimUInt, IA: Identical<A>, IB: Identical<B>> Merge2Setup<'_, A, B, L, IA, IB> {
    /// Run the merge with a function `(Option<&A>, Option<&B>) -> V`. `None` marks positions past
    /// the end of the corresponding input.
    pub fn run<V, INew: Identical<V>>(
        self,
        identical: INew,
        mut merge: impl FnMut(Option<&A>, Option<&B>) -> V,
    ) -> Result<RleVec<V, L, INew>> {
        let mut result = RleVec::builder(identical)
            .with_capacity(self.first.len().max(self.second.len()))
            .build();

        let mut first = self.first.runs();
        let mut second = self.second.runs();
        let mut fcursor = next_run(&mut first, 0)?;
        let mut scursor = next_run(&mut second, 0)?;

        let mut current_end: u64 = 0;
        loop {
            let new_end = match (&fcursor, &scursor) {
                (None, None) => break,
                (Some((_, fend)), None) => *fend,
                (None, Some((_, send))) => *send,
                (Some((_, fend)), Some((_, send))) => (*fend).min(*send),
            };

            let value = merge(fcursor.map(|x| x.0), scursor.map(|x| x.0));
            let length = L::from(new_end - current_end)
                .ok_or_else(|| eyre!("Length can't fit in {:?}", L::max_value()))?;
            result.append(value, length)?;
            current_end = new_end;

            if matches!(fcursor, Some((_, end)) if end == current_end) {
                fcursor = next_run(&mut first, current_end)?;
            }
            if matches!(scursor, Some((_, end)) if end == current_end) {
                scursor = next_run(&mut second, current_end)?;
            }
        }

        Ok(result)
    }

    /// Run the merge for inputs of the same value type using a [`Merge2`] implementation.
    pub fn with_merge2<INew: Identical<A>>(
        self,
        identical: INew,
        mut merge: impl Merge2<A>,
    ) -> Result<RleVec<A, L, INew>>
    where
        B: Into<A> + Clone,
        A: Clone,
    {
        self.run(identical, |first, second| match (first, second) {
            (Some(f), Some(s)) => merge.two(f, &s.clone().into()),
            (Some(f), None) => merge.single(f),
            (None, Some(s)) => merge.single(&s.clone().into()),
            (None, None) => unreachable!("merge2 never calls the merge function past both ends"),
        })
    }
}

fn next_run<'a, V: 'a, L: PrimUInt + 'a>(
    runs: &mut impl Iterator<Item = (&'a V, &'a L)>,
    start: u64,
) -> Result<Option<(&'a V, u64)>> {
    match runs.next() {
        None => Ok(None),
        Some((value, length)) => {
            let length = length
                .to_u64()
                .ok_or_else(|| eyre!("Length {:?} can't fit in u64", length))?;
            Ok(Some((value, start + length)))
        }
    }
}
