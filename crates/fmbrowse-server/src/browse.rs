//! Browse commands: each one runs a single accessor and renders its result as JSON

use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Subcommand};
use fmbrowse_core::{PageRequest, RecordSource};
use fmbrowse_resources::Resources;
use serde::Serialize;
use serde_json::Value;

/// Paging and filter flags shared by the list commands
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Records per page
    #[arg(long, default_value_t = PageRequest::DEFAULT_LIMIT)]
    pub limit: u32,

    /// Free-text search term
    #[arg(long)]
    pub search: Option<String>,

    /// Start date (YYYY-MM-DD or MM/DD/YYYY)
    #[arg(long)]
    pub start: Option<String>,

    /// End date, only used together with --start
    #[arg(long)]
    pub end: Option<String>,
}

impl ListArgs {
    pub fn to_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            start_date: self.start.clone(),
            end_date: self.end.clone(),
        }
    }
}

/// Date range of the sales summary
#[derive(Debug, Clone, Args)]
pub struct SummaryArgs {
    /// Start date, defaults to the first day of the current month
    #[arg(long)]
    pub start: Option<String>,

    /// End date, defaults to today
    #[arg(long)]
    pub end: Option<String>,
}

impl SummaryArgs {
    /// Fill missing bounds relative to `today`
    pub fn range(&self, today: NaiveDate) -> (String, String) {
        let iso = |date: NaiveDate| date.format("%Y-%m-%d").to_string();
        let first = today.with_day(1).unwrap_or(today);
        (
            self.start.clone().unwrap_or_else(|| iso(first)),
            self.end.clone().unwrap_or_else(|| iso(today)),
        )
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum BrowseCommand {
    /// List contacts
    Contacts(ListArgs),
    /// List products
    Products(ListArgs),
    /// List current sales, newest first
    Sales(ListArgs),
    /// Show one contact by record id
    Contact { id: String },
    /// Show one product by record id
    Product { id: String },
    /// Show one product by item number
    ProductByItem { item_no: String },
    /// Show one sale by record id
    Sale { id: String },
    /// List inventory lots of a product
    Lots { item_no: String },
    /// List line items of a sale
    LineItems { sales_key: String },
    /// Summarize sales over a date range
    Summary(SummaryArgs),
}

/// Run a browse command and return its JSON rendering.
///
/// List commands never fail (failures render as an empty page); single-record
/// lookups render `null` when the record does not exist. A summary fails
/// only on an unreadable date.
pub async fn run<S: RecordSource>(
    command: &BrowseCommand,
    resources: &Resources<S>,
) -> anyhow::Result<Value> {
    let value = match command {
        BrowseCommand::Contacts(args) => to_json(resources.contacts(&args.to_request()).await)?,
        BrowseCommand::Products(args) => to_json(resources.products(&args.to_request()).await)?,
        BrowseCommand::Sales(args) => to_json(resources.sales(&args.to_request()).await)?,
        BrowseCommand::Contact { id } => to_json(resources.contact(id).await?)?,
        BrowseCommand::Product { id } => to_json(resources.product(id).await?)?,
        BrowseCommand::ProductByItem { item_no } => {
            to_json(resources.product_by_item_no(item_no).await?)?
        }
        BrowseCommand::Sale { id } => to_json(resources.sale(id).await?)?,
        BrowseCommand::Lots { item_no } => to_json(resources.lots(item_no).await)?,
        BrowseCommand::LineItems { sales_key } => to_json(resources.line_items(sales_key).await)?,
        BrowseCommand::Summary(args) => {
            let (start, end) = args.range(Local::now().date_naive());
            to_json(resources.sales_summary(&start, &end).await?)?
        }
    };
    Ok(value)
}

fn to_json<T: Serialize>(value: T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}
