pub use error::Error;

mod error;
pub mod loc;
pub mod num;
pub mod parallelism;
