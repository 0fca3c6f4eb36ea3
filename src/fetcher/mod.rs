//! Paginated fetcher module
//!
//! Walks the pages of one endpoint for one query.
//!
//! # Overview
//!
//! A fetch runs the endpoint's session bootstrap, then requests page after
//! page until the pagination convention runs out of cursors or a configured
//! limit is hit. Every request goes through the retrying [`HttpClient`], and
//! an optional overall deadline bounds the whole walk.
//!
//! Errors never discard data: a failure after at least one page yields
//! [`FetchStatus::Partial`] with the items gathered so far.

mod types;

pub use types::{FetchOutcome, FetchStats, FetchStatus};

use crate::auth::resolve_headers;
use crate::endpoint::EndpointConfig;
use crate::error::Result;
use crate::extract::{extract_items, project};
use crate::http::{Deadline, HttpClient, ReqwestTransport, Transport};
use crate::pagination::{Cursor, NextPage, Paginator, StopReason};
use crate::query::Query;
use crate::template::TemplateContext;
use crate::types::StringMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fetches every page of one endpoint
#[derive(Debug)]
pub struct Fetcher {
    endpoint: EndpointConfig,
    client: HttpClient,
    paginator: Box<dyn Paginator>,
}

impl Fetcher {
    /// Create a fetcher backed by a reqwest transport
    pub fn new(endpoint: EndpointConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&endpoint.transport_config())?;
        Ok(Self::with_transport(endpoint, Arc::new(transport)))
    }

    /// Create a fetcher over a caller-supplied transport
    pub fn with_transport(endpoint: EndpointConfig, transport: Arc<dyn Transport>) -> Self {
        let mut client = HttpClient::new(transport, endpoint.retry.clone());
        if let Some(ref limit) = endpoint.rate_limit {
            client = client.with_rate_limit(limit);
        }
        let paginator = endpoint.pagination.build();

        Self {
            endpoint,
            client,
            paginator,
        }
    }

    /// The endpoint this fetcher walks
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Fetch all pages for `query`.
    ///
    /// Never fails outright: errors are reported through
    /// [`FetchOutcome::status`] alongside whatever was collected.
    pub async fn fetch_all(&self, query: &Query) -> FetchOutcome {
        let started = Instant::now();
        let deadline = self.endpoint.timeout().map(Deadline::after);

        info!(
            "Fetching {} for '{}'{}",
            self.endpoint.name,
            query.term,
            query
                .location
                .as_deref()
                .map(|l| format!(" in '{l}'"))
                .unwrap_or_default()
        );

        let mut items = Vec::new();
        let mut stats = FetchStats::default();
        let result = self
            .walk(query, deadline.as_ref(), &mut items, &mut stats)
            .await;

        stats.items = items.len();
        stats.duration_ms = started.elapsed().as_millis() as u64;

        let status = match result {
            Ok(()) => FetchStatus::Complete,
            Err(e) if stats.pages == 0 => FetchStatus::Failed(e),
            Err(e) => FetchStatus::Partial(e),
        };

        match status.error() {
            None => info!(
                "{}: {} items in {} pages ({:?})",
                self.endpoint.name, stats.items, stats.pages, stats.stop_reason
            ),
            Some(e) => warn!(
                "{}: fetch {} after {} pages with {} items: {e}",
                self.endpoint.name,
                status.as_str(),
                stats.pages,
                stats.items
            ),
        }

        FetchOutcome {
            items,
            status,
            stats,
        }
    }

    async fn walk(
        &self,
        query: &Query,
        deadline: Option<&Deadline>,
        items: &mut Vec<Value>,
        stats: &mut FetchStats,
    ) -> Result<()> {
        let base = self.base_context(query);
        let session = self.bootstrap(&base, deadline).await?;
        let mut cursor = self.paginator.initial_cursor();

        loop {
            let ctx = page_context(&base, cursor.as_ref());
            let mut request = self.endpoint.build_request(&ctx)?;
            request.headers.extend(session.clone());

            debug!(
                "{}: requesting page {} ({})",
                self.endpoint.name,
                stats.pages + 1,
                cursor
                    .as_ref()
                    .map_or_else(|| "first".to_string(), ToString::to_string)
            );

            let body = self.client.send_json(&request, deadline).await?;
            let page = self.page_items(&body)?;
            let page_len = page.len();

            stats.pages += 1;
            items.extend(page);
            info!(
                "{}: page {} returned {} items ({} total)",
                self.endpoint.name,
                stats.pages,
                page_len,
                items.len()
            );

            if let Some(max) = self.endpoint.max_items {
                if items.len() >= max {
                    items.truncate(max);
                    stats.stop_reason = Some(StopReason::MaxItems);
                    return Ok(());
                }
            }

            match self
                .paginator
                .next_page(&body, page_len, query.page_size, cursor.as_ref())?
            {
                NextPage::Done(reason) => {
                    stats.stop_reason = Some(reason);
                    return Ok(());
                }
                NextPage::Continue(_)
                    if self.endpoint.max_pages.is_some_and(|max| stats.pages >= max) =>
                {
                    stats.stop_reason = Some(StopReason::MaxPages);
                    return Ok(());
                }
                NextPage::Continue(next) => cursor = Some(next),
            }
        }
    }

    async fn bootstrap(
        &self,
        base: &TemplateContext,
        deadline: Option<&Deadline>,
    ) -> Result<StringMap> {
        if self.endpoint.auth.is_empty() {
            return Ok(StringMap::new());
        }
        let headers = self.endpoint.render_headers(&page_context(base, None))?;
        resolve_headers(&self.endpoint.auth, &self.client, &headers, deadline).await
    }

    fn page_items(&self, body: &Value) -> Result<Vec<Value>> {
        let items = extract_items(
            body,
            &self.endpoint.items_path,
            self.endpoint.allow_empty_items,
        )?;
        match self.endpoint.fields {
            Some(ref fields) => items.iter().map(|item| project(item, fields)).collect(),
            None => Ok(items),
        }
    }

    fn base_context(&self, query: &Query) -> TemplateContext {
        let vars: Map<String, Value> = self
            .endpoint
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        TemplateContext::new()
            .with("term", query.term.clone())
            .with(
                "location",
                query.location.clone().map_or(Value::Null, Value::String),
            )
            .with("page_size", query.page_size)
            .with("vars", Value::Object(vars))
    }
}

/// Template context for one page request
fn page_context(base: &TemplateContext, cursor: Option<&Cursor>) -> TemplateContext {
    let mut ctx = base.clone();
    ctx.set("cursor", cursor.map_or(Value::Null, Cursor::to_value));
    ctx.set(
        "offset",
        match cursor {
            Some(Cursor::Offset(n)) => Value::from(*n),
            _ => Value::Null,
        },
    );
    ctx.set(
        "page",
        match cursor {
            Some(Cursor::Page(n)) => Value::from(*n),
            _ => Value::Null,
        },
    );
    ctx
}

/// Fetch all pages of `endpoint` for `query` with a fresh fetcher.
///
/// The `Result` only covers building the HTTP client; fetch errors are
/// reported in the outcome.
pub async fn fetch_all(query: &Query, endpoint: &EndpointConfig) -> Result<FetchOutcome> {
    let fetcher = Fetcher::new(endpoint.clone())?;
    Ok(fetcher.fetch_all(query).await)
}
