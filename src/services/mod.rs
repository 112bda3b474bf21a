pub mod cell_fetcher;
pub mod snapshot_writer;

pub use cell_fetcher::CellFetcher;
pub use snapshot_writer::SnapshotWriter;
