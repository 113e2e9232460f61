//! fmbrowse Resource Accessors
//!
//! One accessor per entity (contacts, products, lots, sales, sale line
//! items). Each fixes the layout, the searchable fields and any fixed
//! criteria, then hands the translated query to a [`RecordSource`].
//!
//! Browse calls come in pairs: `try_*` returns the tagged result, the plain
//! variant logs a failure and yields an empty page so a view always has
//! something to render.

pub mod fields;
pub mod profiles;
pub mod summary;

pub use fields::{ContactFields, LineItemFields, LotFields, ProductFields, SaleFields};
pub use summary::{Grouping, RevenuePoint, SalesSummary};

use fmbrowse_core::{
    FilterClause, MatchMode, PageRequest, PaginatedResult, QueryProfile, Record, RecordSource,
    Result, translate,
};
use profiles::*;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Entity accessors over a record source
pub struct Resources<S> {
    source: S,
}

impl<S: RecordSource> Resources<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn try_contacts(&self, request: &PageRequest) -> Result<PaginatedResult<ContactFields>> {
        self.browse(CONTACTS_LAYOUT, &CONTACTS, request).await
    }

    pub async fn contacts(&self, request: &PageRequest) -> PaginatedResult<ContactFields> {
        or_empty(CONTACTS_LAYOUT, self.try_contacts(request).await)
    }

    pub async fn try_products(&self, request: &PageRequest) -> Result<PaginatedResult<ProductFields>> {
        self.browse(PRODUCTS_LAYOUT, &PRODUCTS, request).await
    }

    pub async fn products(&self, request: &PageRequest) -> PaginatedResult<ProductFields> {
        or_empty(PRODUCTS_LAYOUT, self.try_products(request).await)
    }

    pub async fn try_sales(&self, request: &PageRequest) -> Result<PaginatedResult<SaleFields>> {
        self.browse(SALES_LAYOUT, &SALES, request).await
    }

    pub async fn sales(&self, request: &PageRequest) -> PaginatedResult<SaleFields> {
        or_empty(SALES_LAYOUT, self.try_sales(request).await)
    }

    pub async fn contact(&self, record_id: &str) -> Result<Option<Record<ContactFields>>> {
        self.source.get_record(CONTACTS_LAYOUT, record_id).await
    }

    pub async fn product(&self, record_id: &str) -> Result<Option<Record<ProductFields>>> {
        self.source.get_record(PRODUCTS_LAYOUT, record_id).await
    }

    pub async fn sale(&self, record_id: &str) -> Result<Option<Record<SaleFields>>> {
        self.source.get_record(SALES_LAYOUT, record_id).await
    }

    /// Look a product up by its business key rather than its record id
    pub async fn product_by_item_no(&self, item_no: &str) -> Result<Option<Record<ProductFields>>> {
        let clauses = vec![exact("ItemNo", item_no)];
        let records = self
            .source
            .find_records(PRODUCTS_LAYOUT, clauses, Some(1))
            .await?;
        Ok(records.into_iter().next())
    }

    /// Inventory lots of a product; any failure yields no lots
    pub async fn lots(&self, item_no: &str) -> Vec<Record<LotFields>> {
        let clauses = vec![exact("ItemNo", item_no)];
        match self.source.find_records(LOTS_LAYOUT, clauses, None).await {
            Ok(lots) => lots,
            Err(e) => {
                error!(layout = LOTS_LAYOUT, item_no, "Failed to fetch lots: {}", e);
                Vec::new()
            }
        }
    }

    /// Line items of a sale, keyed by the sale's products key; any failure yields none
    pub async fn line_items(&self, sales_key: &str) -> Vec<Record<LineItemFields>> {
        let clauses = vec![exact("SalesKeyProducts", sales_key)];
        match self
            .source
            .find_records(LINE_ITEMS_LAYOUT, clauses, Some(LINE_ITEMS_LIMIT))
            .await
        {
            Ok(items) => items,
            Err(e) => {
                error!(layout = LINE_ITEMS_LAYOUT, sales_key, "Failed to fetch line items: {}", e);
                Vec::new()
            }
        }
    }

    async fn browse<T>(
        &self,
        layout: &str,
        profile: &QueryProfile,
        request: &PageRequest,
    ) -> Result<PaginatedResult<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let query = translate(request, profile)?;
        debug!(layout, find = query.is_find(), "Browsing layout");
        self.source.fetch_page(layout, &query).await
    }
}

fn exact(field: &str, value: &str) -> FilterClause {
    FilterClause::new().with(field, MatchMode::Exact.pattern(value))
}

/// Collapse a failed browse into an empty page, keeping the cause in the log
fn or_empty<T>(layout: &str, result: Result<PaginatedResult<T>>) -> PaginatedResult<T> {
    result.unwrap_or_else(|e| {
        error!(layout, "Error fetching {}: {}", layout, e);
        PaginatedResult::empty()
    })
}
