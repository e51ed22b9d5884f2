/// Decides whether two neighbouring values belong to the same run.
pub trait Identical<T> {
    /// Returns `true` if `first` and `second` must be stored as a single run.
    /// No guarantees are made about which of the two values is kept.
    fn identical(&self, first: &T, second: &T) -> bool;
}

impl<T, F> Identical<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn identical(&self, first: &T, second: &T) -> bool {
        self(first, second)
    }
}
