//! Read-only SQL over persisted datasets.
//!
//! Artifacts in a data directory are exposed as relations named after
//! their file stem (`neuropsych`, `neurocog`, ...). Typed formats take
//! precedence when a dataset was written more than once.

mod discovery;
mod error;
mod query;
mod read;

pub use discovery::{Relation, discover_relations};
pub use error::{QueryError, Result};
pub use query::query;
pub use read::{read_artifact, scan_artifact};
