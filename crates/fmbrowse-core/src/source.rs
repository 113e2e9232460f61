//! Record source trait definitions

use crate::{
    Result,
    query::TranslatedQuery,
    types::{FilterClause, PaginatedResult, Record},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A read-only store of layout records.
///
/// "No matching records" is not an error at this seam: implementations
/// return an empty page or an empty list for it.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page; a query without clauses is a plain listing
    async fn fetch_page<T>(&self, layout: &str, query: &TranslatedQuery) -> Result<PaginatedResult<T>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Get a single record by id, `None` when it does not exist
    async fn get_record<T>(&self, layout: &str, record_id: &str) -> Result<Option<Record<T>>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Run a find without paging, optionally capped at `limit` records
    async fn find_records<T>(
        &self,
        layout: &str,
        clauses: Vec<FilterClause>,
        limit: Option<u32>,
    ) -> Result<Vec<Record<T>>>
    where
        T: DeserializeOwned + Send + 'static;
}

#[async_trait::async_trait]
impl<S: RecordSource> RecordSource for Arc<S> {
    async fn fetch_page<T>(&self, layout: &str, query: &TranslatedQuery) -> Result<PaginatedResult<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        (**self).fetch_page(layout, query).await
    }

    async fn get_record<T>(&self, layout: &str, record_id: &str) -> Result<Option<Record<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        (**self).get_record(layout, record_id).await
    }

    async fn find_records<T>(
        &self,
        layout: &str,
        clauses: Vec<FilterClause>,
        limit: Option<u32>,
    ) -> Result<Vec<Record<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        (**self).find_records(layout, clauses, limit).await
    }
}
