//! Query translation
//!
//! Turns UI-level paging state (page, page size, free-text search, optional
//! date range) into the request shape the Data API expects: a list of filter
//! clauses, a 1-based offset and an optional sort.
//!
//! Clauses within a find request are OR-combined while the criteria inside a
//! clause are AND-combined. Any criterion that must always apply (the date
//! range, or an entity's fixed filters) is therefore copied into every
//! clause rather than added as a clause of its own.

use crate::{
    Error, Result,
    date::to_filemaker_date,
    types::{FilterClause, SortOrder, SortSpec},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a search term is matched against a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// `*term*` substring wildcard
    Contains,
    /// `=term` exact match, for identifier-like fields
    Exact,
}

impl MatchMode {
    pub fn pattern(&self, term: &str) -> String {
        match self {
            MatchMode::Contains => format!("*{}*", term),
            MatchMode::Exact => format!("={}", term),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchField {
    pub name: &'static str,
    pub mode: MatchMode,
}

impl SearchField {
    pub const fn contains(name: &'static str) -> Self {
        Self {
            name,
            mode: MatchMode::Contains,
        }
    }

    pub const fn exact(name: &'static str) -> Self {
        Self {
            name,
            mode: MatchMode::Exact,
        }
    }
}

/// Entity-specific inputs to the translator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryProfile {
    /// Fields searched (OR-combined) when a search term is given
    pub search_fields: &'static [SearchField],

    /// Field the date range applies to; entities without one ignore dates
    pub date_field: Option<&'static str>,

    /// Criteria applied to every clause
    pub fixed_filters: &'static [(&'static str, &'static str)],

    /// Default sort, empty for server order
    pub sort: &'static [(&'static str, SortOrder)],
}

impl QueryProfile {
    pub const fn new(search_fields: &'static [SearchField]) -> Self {
        Self {
            search_fields,
            date_field: None,
            fixed_filters: &[],
            sort: &[],
        }
    }

    pub const fn with_date_field(mut self, field: &'static str) -> Self {
        self.date_field = Some(field);
        self
    }

    pub const fn with_fixed_filters(
        mut self,
        filters: &'static [(&'static str, &'static str)],
    ) -> Self {
        self.fixed_filters = filters;
        self
    }

    pub const fn with_sort(mut self, sort: &'static [(&'static str, SortOrder)]) -> Self {
        self.sort = sort;
        self
    }
}

/// Paging and filter state as the presentation layer holds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,

    /// Records per page
    pub limit: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_start_date(mut self, start: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self
    }

    pub fn with_date_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self.end_date = Some(end.into());
        self
    }

    /// Search term as typed, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|term| !term.trim().is_empty())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// The request shape handed to a record source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedQuery {
    /// Empty means "no filtering": use the plain listing endpoint
    pub clauses: Vec<FilterClause>,

    /// 1-based offset of the first record on the page
    pub offset: u32,

    pub limit: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortSpec>>,
}

impl TranslatedQuery {
    /// True when this query needs the find endpoint
    pub fn is_find(&self) -> bool {
        !self.clauses.is_empty()
    }
}

/// 1-based offset of the first record on `page`.
///
/// The Data API counts records from 1, so page 1 starts at offset 1.
pub fn page_offset(page: u32, limit: u32) -> Result<u32> {
    if page == 0 {
        return Err(Error::InvalidQuery("page must be at least 1".to_string()));
    }
    if limit == 0 {
        return Err(Error::InvalidQuery("limit must be greater than 0".to_string()));
    }

    (page - 1)
        .checked_mul(limit)
        .and_then(|skip| skip.checked_add(1))
        .ok_or_else(|| Error::InvalidQuery(format!("page {} is out of range", page)))
}

/// Translate paging state into a find (or list) request for one entity.
pub fn translate(request: &PageRequest, profile: &QueryProfile) -> Result<TranslatedQuery> {
    let offset = page_offset(request.page, request.limit)?;
    let date_criterion = date_criterion(request, profile)?;

    let mut clauses: Vec<FilterClause> = match request.search_term() {
        Some(term) => profile
            .search_fields
            .iter()
            .map(|field| FilterClause::new().with(field.name, field.mode.pattern(term)))
            .collect(),
        None => Vec::new(),
    };

    if let Some(date) = date_criterion {
        merge_into_all(&mut clauses, &date);
    }

    if !profile.fixed_filters.is_empty() {
        let fixed: FilterClause = profile.fixed_filters.iter().copied().collect();
        merge_into_all(&mut clauses, &fixed);
    }

    let sort = (!profile.sort.is_empty()).then(|| {
        profile
            .sort
            .iter()
            .map(|(field, order)| SortSpec::new(*field, *order))
            .collect()
    });

    debug!(
        page = request.page,
        limit = request.limit,
        offset,
        clauses = clauses.len(),
        "Translated page request"
    );

    Ok(TranslatedQuery {
        clauses,
        offset,
        limit: request.limit,
        sort,
    })
}

/// Build the date criterion for the profile's date field, if any applies.
fn date_criterion(request: &PageRequest, profile: &QueryProfile) -> Result<Option<FilterClause>> {
    let start = request.start_date.as_deref().filter(|s| !s.trim().is_empty());
    let end = request.end_date.as_deref().filter(|s| !s.trim().is_empty());

    let Some(field) = profile.date_field else {
        if start.is_some() || end.is_some() {
            debug!("Ignoring date range for entity without a date field");
        }
        return Ok(None);
    };

    let pattern = match (start, end) {
        (Some(start), Some(end)) => format!(
            "{}...{}",
            to_filemaker_date(start)?,
            to_filemaker_date(end)?
        ),
        (Some(start), None) => format!(">={}", to_filemaker_date(start)?),
        (None, Some(_)) => {
            debug!("Ignoring end date without a start date");
            return Ok(None);
        }
        (None, None) => return Ok(None),
    };

    Ok(Some(FilterClause::new().with(field, pattern)))
}

/// AND `criteria` into every clause, starting from one empty clause if needed.
fn merge_into_all(clauses: &mut Vec<FilterClause>, criteria: &FilterClause) {
    if clauses.is_empty() {
        clauses.push(FilterClause::new());
    }
    for clause in clauses.iter_mut() {
        clause.merge(criteria);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTACT_SEARCH: &[SearchField] = &[
        SearchField::contains("ContactName"),
        SearchField::contains("USSMID"),
    ];

    const SALE_SEARCH: &[SearchField] = &[
        SearchField::exact("InvoiceNo"),
        SearchField::contains("ContactName_BillTo"),
        SearchField::exact("SalesKey_Display"),
    ];

    const NAME_SEARCH: &[SearchField] = &[SearchField::contains("Name")];

    const CONTACTS: QueryProfile = QueryProfile::new(CONTACT_SEARCH);

    const SALES: QueryProfile = QueryProfile::new(SALE_SEARCH)
        .with_date_field("SalesDate")
        .with_fixed_filters(&[("IsSale", "1"), ("Revision_NextCreated", "=")])
        .with_sort(&[("SalesDate", SortOrder::Descend)]);

    const DATED_ACTIVE: QueryProfile = QueryProfile::new(NAME_SEARCH)
        .with_date_field("SalesDate")
        .with_fixed_filters(&[("status", "active")]);

    #[test]
    fn test_offset_is_one_based() {
        for page in 1..=50u32 {
            for limit in [1u32, 7, 20, 100] {
                assert_eq!(page_offset(page, limit).unwrap(), (page - 1) * limit + 1);
            }
        }
    }

    #[test]
    fn test_offset_rejects_zero_page_and_limit() {
        assert!(matches!(page_offset(0, 20), Err(Error::InvalidQuery(_))));
        assert!(matches!(page_offset(1, 0), Err(Error::InvalidQuery(_))));
        assert!(matches!(page_offset(u32::MAX, u32::MAX), Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn test_contacts_search_produces_or_clauses() {
        let query = translate(&PageRequest::new(1, 20).with_search("Smith"), &CONTACTS).unwrap();

        assert_eq!(query.offset, 1);
        assert_eq!(
            query.clauses,
            vec![
                FilterClause::new().with("ContactName", "*Smith*"),
                FilterClause::new().with("USSMID", "*Smith*"),
            ]
        );
        assert!(query.sort.is_none());
    }

    #[test]
    fn test_no_search_no_date_no_fixed_is_list_mode() {
        let query = translate(&PageRequest::new(3, 10), &CONTACTS).unwrap();
        assert!(query.clauses.is_empty());
        assert!(!query.is_find());
        assert_eq!(query.offset, 21);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let query = translate(&PageRequest::new(1, 20).with_search("   "), &CONTACTS).unwrap();
        assert!(query.clauses.is_empty());
    }

    #[test]
    fn test_search_term_is_sent_as_typed() {
        let query = translate(&PageRequest::new(1, 20).with_search("John "), &CONTACTS).unwrap();
        assert_eq!(
            query.clauses,
            vec![
                FilterClause::new().with("ContactName", "*John *"),
                FilterClause::new().with("USSMID", "*John *"),
            ]
        );
    }

    #[test]
    fn test_fixed_filter_only_yields_single_clause() {
        let query = translate(&PageRequest::new(1, 20), &SALES).unwrap();
        assert_eq!(
            query.clauses,
            vec![
                FilterClause::new()
                    .with("IsSale", "1")
                    .with("Revision_NextCreated", "=")
            ]
        );
    }

    #[test]
    fn test_sales_date_range_scenario() {
        let request = PageRequest::new(2, 20)
            .with_search("")
            .with_date_range("2024-01-01", "2024-01-31");
        let query = translate(&request, &SALES).unwrap();

        assert_eq!(query.offset, 21);
        assert_eq!(
            query.clauses,
            vec![
                FilterClause::new()
                    .with("SalesDate", "01/01/2024...01/31/2024")
                    .with("IsSale", "1")
                    .with("Revision_NextCreated", "=")
            ]
        );
        assert_eq!(
            query.sort,
            Some(vec![SortSpec::new("SalesDate", SortOrder::Descend)])
        );
    }

    #[test]
    fn test_date_and_fixed_filters_merged_into_every_search_clause() {
        let request = PageRequest::new(1, 20)
            .with_search("abc")
            .with_date_range("01/01/2024", "01/31/2024");
        let query = translate(&request, &DATED_ACTIVE).unwrap();

        assert_eq!(query.clauses.len(), 1);
        for clause in &query.clauses {
            assert_eq!(clause.get("Name"), Some("*abc*"));
            assert_eq!(clause.get("SalesDate"), Some("01/01/2024...01/31/2024"));
            assert_eq!(clause.get("status"), Some("active"));
        }
    }

    #[test]
    fn test_sales_search_with_range_keeps_every_alternative_constrained() {
        let request = PageRequest::new(1, 20)
            .with_search("1002")
            .with_date_range("2024-01-01", "2024-01-31");
        let query = translate(&request, &SALES).unwrap();

        assert_eq!(query.clauses.len(), 3);
        assert_eq!(query.clauses[0].get("InvoiceNo"), Some("=1002"));
        assert_eq!(query.clauses[1].get("ContactName_BillTo"), Some("*1002*"));
        assert_eq!(query.clauses[2].get("SalesKey_Display"), Some("=1002"));
        for clause in &query.clauses {
            assert_eq!(clause.get("SalesDate"), Some("01/01/2024...01/31/2024"));
            assert_eq!(clause.get("IsSale"), Some("1"));
            assert_eq!(clause.get("Revision_NextCreated"), Some("="));
            assert_eq!(clause.len(), 4);
        }
    }

    #[test]
    fn test_start_date_only_is_open_ended() {
        let request = PageRequest::new(1, 20).with_start_date("2024-03-01");
        let query = translate(&request, &DATED_ACTIVE).unwrap();

        assert_eq!(
            query.clauses,
            vec![
                FilterClause::new()
                    .with("SalesDate", ">=03/01/2024")
                    .with("status", "active")
            ]
        );
    }

    #[test]
    fn test_start_date_only_merged_into_search_clauses() {
        let request = PageRequest::new(1, 20)
            .with_search("Acme")
            .with_start_date("2024-03-01");
        let query = translate(&request, &SALES).unwrap();

        assert_eq!(query.clauses.len(), 3);
        assert!(
            query
                .clauses
                .iter()
                .all(|c| c.get("SalesDate") == Some(">=03/01/2024"))
        );
    }

    #[test]
    fn test_end_date_alone_is_ignored() {
        let mut request = PageRequest::new(1, 20);
        request.end_date = Some("2024-01-31".to_string());
        let query = translate(&request, &SALES).unwrap();

        assert_eq!(query.clauses.len(), 1);
        assert!(!query.clauses[0].contains_field("SalesDate"));
    }

    #[test]
    fn test_dates_ignored_for_entity_without_date_field() {
        let request = PageRequest::new(1, 20).with_date_range("2024-01-01", "2024-01-31");
        let query = translate(&request, &CONTACTS).unwrap();
        assert!(query.clauses.is_empty());
    }

    #[test]
    fn test_invalid_date_is_an_error() {
        let request = PageRequest::new(1, 20).with_date_range("2024-01-01", "not-a-date");
        assert!(matches!(
            translate(&request, &SALES),
            Err(Error::InvalidDate(d)) if d == "not-a-date"
        ));
    }

    #[test]
    fn test_no_clause_carries_date_or_fixed_filter_alone() {
        let request = PageRequest::new(1, 20)
            .with_search("abc")
            .with_date_range("2024-01-01", "2024-01-31");
        let query = translate(&request, &SALES).unwrap();

        for clause in &query.clauses {
            let has_search = ["InvoiceNo", "ContactName_BillTo", "SalesKey_Display"]
                .iter()
                .any(|f| clause.contains_field(f));
            assert!(has_search, "clause without a search field: {:?}", clause);
        }
    }

    #[test]
    fn test_default_page_request() {
        let request = PageRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 20);
        assert!(request.search_term().is_none());
    }
}
