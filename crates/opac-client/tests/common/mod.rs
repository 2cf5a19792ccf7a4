#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use opac_client::client::HttpCatalogClient;
use opac_client::config::CatalogConfig;
use opac_client::error::TransportError;
use opac_client::transport::{BoxFuture, Request, Response, Transport};
use serde_json::Value;

/// What a scripted route answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A fixed status and body.
    Body(u16, String),
    /// A JSON array, paged by `_page`/`_per_page` with `X-Total-Count` set.
    Paged(Vec<Value>),
    /// A JSON array returned whole, ignoring paging.
    Unpaged(Vec<Value>),
    Timeout,
    Refused,
}

impl Reply {
    pub fn json(status: u16, value: &Value) -> Self {
        Self::Body(status, value.to_string())
    }

    pub fn html(body: &str) -> Self {
        Self::Body(200, body.to_owned())
    }

    fn answer(&self, request: &Request) -> Result<Response, TransportError> {
        match self {
            Self::Body(status, body) => Ok(Response::new(*status, body.clone())),
            Self::Paged(rows) => {
                let page: usize = request.query_value("_page").and_then(|v| v.parse().ok()).unwrap_or(1);
                let size: usize = request
                    .query_value("_per_page")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(20);
                let window: Vec<&Value> = rows.iter().skip((page - 1) * size).take(size).collect();
                let mut response = Response::new(200, serde_json::to_string(&window).unwrap());
                response.total_count = Some(rows.len() as u64);
                Ok(response)
            }
            Self::Unpaged(rows) => Ok(Response::new(200, Value::from(rows.clone()).to_string())),
            Self::Timeout => Err(TransportError::Timeout),
            Self::Refused => Err(TransportError::Connect("connection refused".to_owned())),
        }
    }
}

struct Route {
    suffix: String,
    replies: VecDeque<Reply>,
}

/// In-memory [`Transport`] that answers by URL suffix and records every call.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer URLs ending in `suffix` with `replies` in order; the last
    /// reply repeats.
    pub fn route(&self, suffix: &str, replies: Vec<Reply>) {
        self.routes.lock().unwrap().push(Route {
            suffix: suffix.to_owned(),
            replies: replies.into(),
        });
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, suffix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .count()
    }
}

impl Transport for ScriptedTransport {
    fn get<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, TransportError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(request.clone());
            let mut routes = self.routes.lock().unwrap();
            let Some(route) = routes
                .iter_mut()
                .filter(|r| request.url.ends_with(&r.suffix))
                .max_by_key(|r| r.suffix.len())
            else {
                return Ok(Response::new(404, "{}"));
            };
            let reply = if route.replies.len() > 1 {
                route.replies.pop_front().unwrap()
            } else {
                route.replies.front().cloned().unwrap()
            };
            reply.answer(request)
        })
    }
}

pub const BASE_URL: &str = "http://catalog.test";

pub fn test_config() -> CatalogConfig {
    CatalogConfig {
        base_url: BASE_URL.to_owned(),
        retry_backoff_ms: 0,
        ..CatalogConfig::default()
    }
}

pub fn client_with(config: CatalogConfig, transport: &Arc<ScriptedTransport>) -> HttpCatalogClient {
    HttpCatalogClient::with_transport(config, Arc::clone(transport) as Arc<dyn Transport>).unwrap()
}

pub fn client(transport: &Arc<ScriptedTransport>) -> HttpCatalogClient {
    client_with(test_config(), transport)
}

/// A REST search row.
pub fn biblio(id: u64, title: &str, author: &str) -> Value {
    serde_json::json!({
        "biblio_id": id,
        "title": title,
        "author": author,
        "copyright_date": 1850,
        "cn_source": "lcc",
        "cn_class": format!("PR45{id:02}"),
        "cn_item": ".A1",
    })
}

/// An OPAC results page listing `(id, title, author)` rows.
pub fn results_page(total: usize, rows: &[(u64, &str, &str)]) -> String {
    let mut html = format!(
        "<html><body><p id=\"numresults\">Your search returned {total} results.</p><table>"
    );
    for (id, title, author) in rows {
        html.push_str(&format!(
            "<tr><td><div id=\"title_summary_{id}\" class=\"title_summary\">\
             <a href=\"/cgi-bin/koha/opac-detail.pl?biblionumber={id}\" class=\"title\">{title} /</a>\
             <span class=\"title_resp_stmt\">by {author}.</span>\
             <span class=\"results_summary publisher\"><span class=\"publisher_date\">1853</span></span>\
             </div></td></tr>"
        ));
    }
    html.push_str("</table></body></html>");
    html
}
