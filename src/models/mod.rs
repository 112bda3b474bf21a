pub mod geo;
pub mod outcome;

pub use geo::{Bounds, Cell, CoordinateBox};
pub use outcome::{FetchOutcome, Record, TransportFailure};
