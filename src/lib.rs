pub mod config;
pub mod database;
pub mod error;
pub mod fallback;
pub mod ingest;
pub mod landing;
pub mod seed;
pub mod source;
pub mod stats;
pub mod types;
pub mod utils;

pub use error::{IngestError, RowError, SeedError, SourceError, StatsError};
pub use ingest::{IngestOutcome, IngestReport};
pub use seed::SeedReport;
pub use source::{DrawSource, SourceKind};
pub use types::*;
