pub mod box_aggregator;
pub mod box_result;

pub use box_aggregator::{collect_box, BoxAggregator, BoxReport};
pub use box_result::{BoxResult, FinalizeReason, Finalized};
