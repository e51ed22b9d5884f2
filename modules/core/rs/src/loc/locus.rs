use std::fmt::Display;
use std::ops::Range;

use derive_getters::Dissolve;
use derive_more::Constructor;
use eyre::Report;

use crate::num::PrimInt;

use super::interval::{Interval, IntervalOp};
use super::orientation::Orientation;

/// A locus is a region within a genome with coordinates (contig and interval) and an orientation.
/// Sequencing reads and called peaks are both represented as loci.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Dissolve, Constructor)]
pub struct Locus<Idx: PrimInt> {
    pub contig: String,
    pub interval: Interval<Idx>,
    pub orientation: Orientation,
}

impl<Idx: PrimInt> Locus<Idx> {
    pub fn start(&self) -> Idx {
        self.interval.start()
    }

    pub fn end(&self) -> Idx {
        self.interval.end()
    }
}

impl<Idx: PrimInt> Default for Locus<Idx> {
    fn default() -> Self {
        Self {
            contig: String::default(),
            interval: Interval::default(),
            orientation: Orientation::default(),
        }
    }
}

impl<Idx: PrimInt> TryFrom<(&str, Range<Idx>, Orientation)> for Locus<Idx> {
    type Error = Report;

    fn try_from(
        (contig, range, orientation): (&str, Range<Idx>, Orientation),
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            contig: contig.to_owned(),
            interval: range.try_into()?,
            orientation,
        })
    }
}

impl<Idx: PrimInt + Display> Display for Locus<Idx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}[{}]",
            self.contig,
            self.interval.start(),
            self.interval.end(),
            self.orientation
        )
    }
}
