//! Resumable progress tracking for long-running batch jobs.
//!
//! Progress is stored as an append-only log of partial [`CheckpointRecord`]s.
//! Every committed page of a batch writes one record holding the keys it
//! finished; nothing is ever updated in place. The logical state of a job is
//! recovered by aggregating every record sharing an id into an
//! [`AggregatedCheckpoint`], whose `processed` set is the union of all the
//! partial sets.
//!
//! Because union is commutative and idempotent, records may be written by
//! concurrent workers in any order, and a crashed run loses at most the page
//! that was in flight.

mod aggregate;
mod db;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod models;
mod repo;
mod row;
mod store;

pub use crate::aggregate::{aggregate, aggregate_with_filter};
pub use crate::db::Database;
#[cfg(any(test, feature = "mock"))]
pub use crate::memory::MemoryStore;
pub use crate::models::{AggregatedCheckpoint, Category, CheckpointFilter, CheckpointRecord};
pub use crate::repo::Repository;
pub use crate::store::CheckpointStore;
