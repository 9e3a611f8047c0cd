//! Domain types - cache entries, outcomes and call deadlines.

mod deadline;
mod entry;
mod outcome;

pub use deadline::Deadline;
pub use entry::{CacheEntry, validate_key};
pub use outcome::Outcome;
