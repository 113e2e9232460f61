//! Sales summary for a date range
//!
//! Rolls one large page of sales up into the figures a dashboard shows:
//! invoiced revenue, open sales, a count per status and a revenue series
//! whose bucket size follows the length of the range.

use crate::{Resources, SaleFields};
use chrono::NaiveDate;
use fmbrowse_core::date::{parse_date, parse_filemaker_date};
use fmbrowse_core::{PageRequest, Record, RecordSource, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Sales fetched for one summary; anything past this is left out
pub const SUMMARY_LIMIT: u32 = 5000;

/// Status of a sale that has been invoiced
pub const CLOSED_STATUS: &str = "Closed";

const UNKNOWN_STATUS: &str = "Unknown";

/// Bucket size of the revenue series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    Daily,
    Monthly,
    Yearly,
}

impl Grouping {
    /// Up to 60 days is daily, up to two years monthly, anything longer yearly
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        match (end - start).num_days().abs() {
            0..=60 => Grouping::Daily,
            61..=730 => Grouping::Monthly,
            _ => Grouping::Yearly,
        }
    }

    /// Series key of a date: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`
    pub fn key(&self, date: NaiveDate) -> String {
        let format = match self {
            Grouping::Daily => "%Y-%m-%d",
            Grouping::Monthly => "%Y-%m",
            Grouping::Yearly => "%Y",
        };
        date.format(format).to_string()
    }
}

/// Invoiced revenue of one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub period: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub grouping: Grouping,
    /// Sales the summary was built from
    pub sale_count: usize,
    /// Sales matching the range on the server, may exceed `sale_count`
    pub found_count: u64,
    /// Sum of closed sale totals
    pub invoiced_revenue: f64,
    pub closed_count: usize,
    /// Sales in any status other than closed
    pub open_count: usize,
    /// Sales per status; a blank status counts as "Unknown"
    pub status_counts: BTreeMap<String, u64>,
    /// Closed revenue per bucket, ordered by period
    pub revenue: Vec<RevenuePoint>,
}

impl SalesSummary {
    /// Summarize `sales` for the range `start..=end`
    pub fn from_sales(start: NaiveDate, end: NaiveDate, sales: &[Record<SaleFields>]) -> Self {
        let grouping = Grouping::for_range(start, end);
        let mut invoiced_revenue = 0.0;
        let mut closed_count = 0;
        let mut status_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut buckets: BTreeMap<String, f64> = BTreeMap::new();

        for sale in sales {
            let fields = &sale.field_data;
            let status = fields.status.to_string();

            let label = if status.is_empty() { UNKNOWN_STATUS } else { status.as_str() };
            *status_counts.entry(label.to_string()).or_insert(0) += 1;

            if status != CLOSED_STATUS {
                continue;
            }
            closed_count += 1;

            // Unparsable totals count as zero
            let total = fields.total.as_f64().unwrap_or(0.0);
            invoiced_revenue += total;

            match fields.sales_date.as_str().and_then(parse_filemaker_date) {
                Some(date) => *buckets.entry(grouping.key(date)).or_insert(0.0) += total,
                None => warn!(
                    record_id = %sale.record_id,
                    sales_date = %fields.sales_date,
                    "Skipping sale with unreadable date in revenue series"
                ),
            }
        }

        Self {
            start_date: start,
            end_date: end,
            grouping,
            sale_count: sales.len(),
            found_count: sales.len() as u64,
            invoiced_revenue,
            closed_count,
            open_count: sales.len() - closed_count,
            status_counts,
            revenue: buckets
                .into_iter()
                .map(|(period, total)| RevenuePoint { period, total })
                .collect(),
        }
    }
}

impl<S: RecordSource> Resources<S> {
    /// Summarize the sales dated within `start..=end`.
    ///
    /// The dates must parse; a failed fetch summarizes to zeros like any
    /// other browse.
    pub async fn sales_summary(&self, start: &str, end: &str) -> Result<SalesSummary> {
        let from = parse_date(start)?;
        let to = parse_date(end)?;

        let request = PageRequest::new(1, SUMMARY_LIMIT).with_date_range(start, end);
        let page = self.sales(&request).await;

        if page.page_count(SUMMARY_LIMIT) > 1 {
            warn!(
                found = page.found_count,
                used = page.data.len(),
                "Sales summary covers only the first {} sales",
                SUMMARY_LIMIT
            );
        }

        let mut summary = SalesSummary::from_sales(from, to, &page.data);
        summary.found_count = page.found_count;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmbrowse_core::FieldValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(id: &str, status: &str, sales_date: &str, total: FieldValue) -> Record<SaleFields> {
        Record {
            record_id: id.to_string(),
            mod_id: None,
            field_data: SaleFields {
                status: status.into(),
                sales_date: sales_date.into(),
                total,
                ..Default::default()
            },
            portal_data: None,
        }
    }

    #[test]
    fn test_grouping_thresholds() {
        let start = date(2024, 1, 1);
        assert_eq!(Grouping::for_range(start, start), Grouping::Daily);
        assert_eq!(Grouping::for_range(start, start + chrono::Days::new(60)), Grouping::Daily);
        assert_eq!(Grouping::for_range(start, start + chrono::Days::new(61)), Grouping::Monthly);
        assert_eq!(Grouping::for_range(start, start + chrono::Days::new(730)), Grouping::Monthly);
        assert_eq!(Grouping::for_range(start, start + chrono::Days::new(731)), Grouping::Yearly);
    }

    #[test]
    fn test_grouping_ignores_range_direction() {
        assert_eq!(
            Grouping::for_range(date(2024, 12, 31), date(2024, 1, 1)),
            Grouping::Monthly
        );
    }

    #[test]
    fn test_grouping_keys_are_zero_padded() {
        let day = date(2024, 3, 7);
        assert_eq!(Grouping::Daily.key(day), "2024-03-07");
        assert_eq!(Grouping::Monthly.key(day), "2024-03");
        assert_eq!(Grouping::Yearly.key(day), "2024");
    }

    #[test]
    fn test_revenue_counts_closed_sales_only() {
        let sales = vec![
            sale("1", "Closed", "01/05/2024", "2,300.50".into()),
            sale("2", "Closed", "01/05/2024", FieldValue::Number(1000.25)),
            sale("3", "Open", "01/06/2024", "999".into()),
            sale("4", "Quote", "01/07/2024", "50".into()),
        ];

        let summary = SalesSummary::from_sales(date(2024, 1, 1), date(2024, 1, 31), &sales);

        assert_eq!(summary.invoiced_revenue, 3300.75);
        assert_eq!(summary.closed_count, 2);
        assert_eq!(summary.open_count, 2);
        assert_eq!(summary.sale_count, 4);
        assert_eq!(
            summary.revenue,
            vec![RevenuePoint { period: "2024-01-05".to_string(), total: 3300.75 }]
        );
    }

    #[test]
    fn test_status_counts_label_blank_status() {
        let sales = vec![
            sale("1", "Closed", "01/05/2024", "10".into()),
            sale("2", "", "01/05/2024", "10".into()),
            sale("3", "Open", "01/05/2024", "10".into()),
            sale("4", "Open", "01/05/2024", "10".into()),
        ];

        let summary = SalesSummary::from_sales(date(2024, 1, 1), date(2024, 1, 31), &sales);

        assert_eq!(summary.status_counts["Closed"], 1);
        assert_eq!(summary.status_counts["Open"], 2);
        assert_eq!(summary.status_counts["Unknown"], 1);
    }

    #[test]
    fn test_series_sorted_by_period_and_bad_dates_skipped() {
        let sales = vec![
            sale("1", "Closed", "11/20/2023", "100".into()),
            sale("2", "Closed", "2/3/2023", "40".into()),
            sale("3", "Closed", "11/02/2023", "25".into()),
            sale("4", "Closed", "2023-05-01", "7".into()),
            sale("5", "Closed", "", "3".into()),
        ];

        let summary = SalesSummary::from_sales(date(2023, 1, 1), date(2023, 12, 31), &sales);

        assert_eq!(summary.grouping, Grouping::Monthly);
        assert_eq!(
            summary.revenue,
            vec![
                RevenuePoint { period: "2023-02".to_string(), total: 40.0 },
                RevenuePoint { period: "2023-11".to_string(), total: 125.0 },
            ]
        );
        // Undated sales still count toward revenue
        assert_eq!(summary.invoiced_revenue, 175.0);
    }

    #[test]
    fn test_unreadable_totals_count_as_zero() {
        let sales = vec![
            sale("1", "Closed", "01/05/2024", "n/a".into()),
            sale("2", "Closed", "01/05/2024", FieldValue::Empty),
            sale("3", "Closed", "01/05/2024", "5".into()),
        ];

        let summary = SalesSummary::from_sales(date(2024, 1, 1), date(2024, 1, 2), &sales);
        assert_eq!(summary.invoiced_revenue, 5.0);
        assert_eq!(summary.closed_count, 3);
    }

    #[test]
    fn test_empty_summary_serializes_camel_case() {
        let summary = SalesSummary::from_sales(date(2024, 1, 1), date(2024, 1, 31), &[]);
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["startDate"], "2024-01-01");
        assert_eq!(value["grouping"], "daily");
        assert_eq!(value["invoicedRevenue"], 0.0);
        assert_eq!(value["openCount"], 0);
        assert_eq!(value["revenue"], serde_json::json!([]));
    }
}
