//! In-memory repository backend for Refract.
//!
//! Collections are stored in [papaya](https://docs.rs/papaya) lock-free hash
//! maps keyed by record `_id`. Filters and sorts are evaluated directly over
//! the stored JSON, which makes this backend the reference for query
//! semantics and the default for tests.

pub mod database;
pub mod query;
pub mod repository;

pub use database::InMemoryDatabase;
pub use query::{matches, sort_records};
pub use repository::InMemoryRepository;
