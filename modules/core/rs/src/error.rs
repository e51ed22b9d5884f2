use derive_more::{Display, Error};

/// Typed failure kinds. They travel inside `eyre::Report`, use `report.downcast_ref::<Error>()`
/// to inspect them.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
pub enum Error {
    /// Invalid parameter values or genome description. Raised eagerly at construction time.
    #[display("invalid configuration: {_0}")]
    Configuration(#[error(not(source))] String),
    /// Tracks built over different genome spaces were combined together.
    #[display("tracks are defined over different genome spaces")]
    ShapeMismatch,
    /// A contig is not a part of the genome space.
    #[display("unknown contig: {_0}")]
    UnknownContig(#[error(not(source))] String),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}
