use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

use crate::jobs::PageWindow;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Raw `limit`/`offset` query parameters.
///
/// Kept as strings so unparsable values fall back to defaults instead of
/// failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageParams {
    /// A missing, non-numeric, zero or negative limit means the default;
    /// anything above the cap is clamped to it.
    pub fn window(&self) -> PageWindow {
        let limit = self
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_LIMIT, |limit| limit.min(MAX_LIMIT));

        let offset = self
            .offset
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|offset| *offset >= 0)
            .unwrap_or(0);

        PageWindow::new(limit, offset)
    }
}

/// Paginated response envelope
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(req: &HttpRequest, window: PageWindow, count: i64, results: Vec<T>) -> Self {
        Paginated {
            count,
            next: next_link(req, window, count),
            previous: previous_link(req, window),
            results,
        }
    }
}

fn next_link(req: &HttpRequest, window: PageWindow, count: i64) -> Option<String> {
    let next_offset = window.offset.saturating_add(window.limit);
    if next_offset >= count {
        return None;
    }
    Some(page_url(req, window.limit, Some(next_offset)))
}

fn previous_link(req: &HttpRequest, window: PageWindow) -> Option<String> {
    if window.offset <= 0 {
        return None;
    }
    let previous_offset = window.offset.saturating_sub(window.limit);
    if previous_offset <= 0 {
        return Some(page_url(req, window.limit, None));
    }
    Some(page_url(req, window.limit, Some(previous_offset)))
}

/// Absolute URL of the current request with `limit`/`offset` replaced and the
/// remaining parameters kept in sorted order.
fn page_url(req: &HttpRequest, limit: i64, offset: Option<i64>) -> String {
    let mut params: Vec<(String, String)> =
        serde_urlencoded::from_str(req.query_string()).unwrap_or_default();
    params.retain(|(key, _)| key != "limit" && key != "offset");
    params.push(("limit".to_string(), limit.to_string()));
    if let Some(offset) = offset {
        params.push(("offset".to_string(), offset.to_string()));
    }
    params.sort();

    let query = serde_urlencoded::to_string(&params).unwrap_or_default();
    let info = req.connection_info();
    format!("{}://{}{}?{}", info.scheme(), info.host(), req.path(), query)
}
