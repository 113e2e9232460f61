//! fmbrowse Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout fmbrowse:
//! - Record and pagination types mirroring the Data API envelope
//! - The query translator turning page/search/date state into find requests
//! - The `RecordSource` trait abstraction over the remote store
//! - Core error types

pub mod date;
pub mod error;
pub mod query;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use query::{MatchMode, PageRequest, QueryProfile, SearchField, TranslatedQuery, translate};
pub use source::RecordSource;
pub use types::{FieldMap, FieldValue, FilterClause, PaginatedResult, Record, SortOrder, SortSpec};
