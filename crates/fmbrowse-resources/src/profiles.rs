//! Layouts and query profiles per entity

use fmbrowse_core::{QueryProfile, SearchField, SortOrder};

pub const CONTACTS_LAYOUT: &str = "CMT_Web";
pub const PRODUCTS_LAYOUT: &str = "PRD_Web";
pub const LOTS_LAYOUT: &str = "ITY_Web";
pub const SALES_LAYOUT: &str = "SLS_Web";
pub const LINE_ITEMS_LAYOUT: &str = "LIC_Web";

/// Upper bound on line items fetched for one sale
pub const LINE_ITEMS_LIMIT: u32 = 500;

const CONTACT_SEARCH: &[SearchField] = &[
    SearchField::contains("ContactName"),
    SearchField::contains("USSMID"),
];

const PRODUCT_SEARCH: &[SearchField] = &[
    SearchField::contains("ProductName"),
    SearchField::contains("ItemNo"),
];

const SALE_SEARCH: &[SearchField] = &[
    SearchField::exact("InvoiceNo"),
    SearchField::contains("ContactName_BillTo"),
    SearchField::exact("SalesKey_Display"),
];

pub const CONTACTS: QueryProfile = QueryProfile::new(CONTACT_SEARCH);

pub const PRODUCTS: QueryProfile = QueryProfile::new(PRODUCT_SEARCH);

/// Current sales only: sale records that have not been superseded by a
/// newer revision, newest first.
pub const SALES: QueryProfile = QueryProfile::new(SALE_SEARCH)
    .with_date_field("SalesDate")
    .with_fixed_filters(&[("IsSale", "1"), ("Revision_NextCreated", "=")])
    .with_sort(&[("SalesDate", SortOrder::Descend)]);
