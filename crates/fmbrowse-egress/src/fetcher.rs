//! Record fetcher
//!
//! Issues list, find and single-record calls against a layout, unwraps the
//! `{ response: { data, dataInfo }, messages }` envelope and normalizes the
//! outcome into [`PaginatedResult`].
//!
//! The Data API reports "no records match" on a find with HTTP 401 and
//! message code `401`. That reply is a successful empty result here, never an
//! authentication failure.

use crate::{EgressError, Result, session::SessionManager};
use async_trait::async_trait;
use fmbrowse_core::{
    FilterClause, PaginatedResult, Record, RecordSource, SortSpec, TranslatedQuery,
};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Data API message code for "no records match the request"
const CODE_NO_MATCH: &str = "401";

/// Data API message code for "record is missing"
const CODE_RECORD_MISSING: &str = "101";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    List,
    Find,
    Record,
}

/// Classified reply before the body is decoded
#[derive(Debug)]
enum Reply {
    Body(String),
    NoMatch,
    Missing,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "Option::default")]
    response: Option<ResponseBody<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody<T> {
    #[serde(default = "Vec::new")]
    data: Vec<Record<T>>,
    #[serde(default)]
    data_info: DataInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataInfo {
    #[serde(default)]
    total_record_count: u64,
    #[serde(default)]
    found_count: u64,
}

/// Only the messages part of an envelope, for classifying error replies
#[derive(Debug, Default, Deserialize)]
struct MessagesOnly {
    #[serde(default)]
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct FindBody<'a> {
    query: &'a [FilterClause],
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'a [SortSpec]>,
}

/// Fetches records through an authenticated session
pub struct RecordFetcher {
    session: Arc<SessionManager>,
}

impl RecordFetcher {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Fetch one page: find when the query has clauses, plain listing otherwise
    pub async fn fetch<T>(&self, layout: &str, query: &TranslatedQuery) -> Result<PaginatedResult<T>>
    where
        T: DeserializeOwned,
    {
        if query.is_find() {
            self.find(
                layout,
                &query.clauses,
                query.offset,
                query.limit,
                query.sort.as_deref(),
            )
            .await
        } else {
            self.list(layout, query.offset, query.limit, query.sort.as_deref())
                .await
        }
    }

    /// `GET layouts/{layout}/records` with `_limit`, `_offset` and `_sort`
    #[instrument(skip(self, sort))]
    pub async fn list<T>(
        &self,
        layout: &str,
        offset: u32,
        limit: u32,
        sort: Option<&[SortSpec]>,
    ) -> Result<PaginatedResult<T>>
    where
        T: DeserializeOwned,
    {
        let mut url = self.session.config().records_url(layout)?;
        append_list_params(&mut url, offset, limit, sort)?;
        debug!(layout, limit, offset, ?sort, "Getting records");

        let request = self.session.client().get(url);
        let reply = self.execute(request, CallKind::List).await?;
        page_from_reply(layout, reply, offset, limit)
    }

    /// `POST layouts/{layout}/_find` with the clauses, paging and sort in the body
    #[instrument(skip(self, clauses, sort))]
    pub async fn find<T>(
        &self,
        layout: &str,
        clauses: &[FilterClause],
        offset: u32,
        limit: u32,
        sort: Option<&[SortSpec]>,
    ) -> Result<PaginatedResult<T>>
    where
        T: DeserializeOwned,
    {
        let body = FindBody {
            query: clauses,
            limit: Some(limit),
            offset: Some(offset),
            sort,
        };
        debug!(layout, ?clauses, limit, offset, ?sort, "Finding records");

        let url = self.session.config().find_url(layout)?;
        let request = self.session.client().post(url).json(&body);
        let reply = self.execute(request, CallKind::Find).await?;
        page_from_reply(layout, reply, offset, limit)
    }

    /// Run a find and return every record of the first result set, up to `limit`
    #[instrument(skip(self, clauses))]
    pub async fn find_all<T>(
        &self,
        layout: &str,
        clauses: &[FilterClause],
        limit: Option<u32>,
    ) -> Result<Vec<Record<T>>>
    where
        T: DeserializeOwned,
    {
        let body = FindBody {
            query: clauses,
            limit,
            offset: None,
            sort: None,
        };
        debug!(layout, ?clauses, ?limit, "Finding records");

        let url = self.session.config().find_url(layout)?;
        let request = self.session.client().post(url).json(&body);

        match self.execute(request, CallKind::Find).await? {
            Reply::Body(body) => {
                let mut data = decode::<T>(layout, &body)?.data;
                if let Some(limit) = limit {
                    data.truncate(limit as usize);
                }
                Ok(data)
            }
            Reply::NoMatch | Reply::Missing => Ok(Vec::new()),
        }
    }

    /// `GET layouts/{layout}/records/{id}`, `None` when the record is missing
    #[instrument(skip(self))]
    pub async fn record<T>(&self, layout: &str, record_id: &str) -> Result<Option<Record<T>>>
    where
        T: DeserializeOwned,
    {
        let url = self.session.config().record_url(layout, record_id)?;
        let request = self.session.client().get(url);

        match self.execute(request, CallKind::Record).await? {
            Reply::Body(body) => Ok(decode::<T>(layout, &body)?.data.into_iter().next()),
            Reply::NoMatch | Reply::Missing => {
                debug!(layout, record_id, "Record not found");
                Ok(None)
            }
        }
    }

    /// Attach the session token, send, and classify the reply
    async fn execute(&self, request: RequestBuilder, kind: CallKind) -> Result<Reply> {
        let token = self.session.token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Data API response");

        let messages = serde_json::from_str::<MessagesOnly>(&body)
            .map(|m| m.messages)
            .unwrap_or_default();
        let code = messages.first().map(|m| m.code.as_str());

        if code == Some(CODE_NO_MATCH) || (kind == CallKind::Find && status == StatusCode::UNAUTHORIZED)
        {
            debug!("No records match the request");
            return Ok(Reply::NoMatch);
        }

        if kind == CallKind::Record
            && (status == StatusCode::NOT_FOUND || code == Some(CODE_RECORD_MISSING))
        {
            return Ok(Reply::Missing);
        }

        if !status.is_success() {
            let message = messages
                .first()
                .map(|m| m.message.clone())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| body.clone());

            return Err(if status == StatusCode::UNAUTHORIZED {
                EgressError::AuthFailed {
                    status_code: status.as_u16(),
                    message,
                }
            } else {
                EgressError::ApiError {
                    status_code: status.as_u16(),
                    code: code.map(str::to_string),
                    message,
                }
            });
        }

        Ok(Reply::Body(body))
    }
}

#[async_trait]
impl RecordSource for RecordFetcher {
    async fn fetch_page<T>(
        &self,
        layout: &str,
        query: &TranslatedQuery,
    ) -> fmbrowse_core::Result<PaginatedResult<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Ok(self.fetch(layout, query).await?)
    }

    async fn get_record<T>(
        &self,
        layout: &str,
        record_id: &str,
    ) -> fmbrowse_core::Result<Option<Record<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Ok(self.record(layout, record_id).await?)
    }

    async fn find_records<T>(
        &self,
        layout: &str,
        clauses: Vec<FilterClause>,
        limit: Option<u32>,
    ) -> fmbrowse_core::Result<Vec<Record<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Ok(self.find_all(layout, &clauses, limit).await?)
    }
}

fn append_list_params(
    url: &mut Url,
    offset: u32,
    limit: u32,
    sort: Option<&[SortSpec]>,
) -> Result<()> {
    let sort = sort
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| EgressError::ConfigError(format!("Failed to encode sort: {}", e)))?;

    let mut pairs = url.query_pairs_mut();
    pairs
        .append_pair("_limit", &limit.to_string())
        .append_pair("_offset", &offset.to_string());
    if let Some(sort) = sort {
        pairs.append_pair("_sort", &sort);
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(layout: &str, body: &str) -> Result<ResponseBody<T>> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        EgressError::MalformedResponse(format!("{}: failed to decode envelope: {}", layout, e))
    })?;

    envelope.response.ok_or_else(|| {
        warn!(layout, "Unexpected response structure: no response object");
        EgressError::MalformedResponse(format!("{}: envelope has no response object", layout))
    })
}

fn page_from_reply<T: DeserializeOwned>(
    layout: &str,
    reply: Reply,
    offset: u32,
    limit: u32,
) -> Result<PaginatedResult<T>> {
    let body = match reply {
        Reply::Body(body) => body,
        Reply::NoMatch | Reply::Missing => return Ok(PaginatedResult::empty()),
    };

    let ResponseBody { mut data, data_info } = decode::<T>(layout, &body)?;
    if data.len() > limit as usize {
        warn!(
            layout,
            returned = data.len(),
            limit,
            "Server returned more records than requested"
        );
        data.truncate(limit as usize);
    }

    // Counts never fall below what the page itself proves exists
    let seen = u64::from(offset.saturating_sub(1)) + data.len() as u64;
    if !data.is_empty() && data_info.found_count < seen {
        debug!(
            layout,
            found = data_info.found_count,
            seen,
            "Raising counts to cover the returned page"
        );
    }
    let found_count = if data.is_empty() {
        data_info.found_count
    } else {
        data_info.found_count.max(seen)
    };
    let total_count = data_info.total_record_count.max(found_count);

    Ok(PaginatedResult {
        data,
        total_count,
        found_count,
    })
}
