//! Route table and handlers.
//!
//! | Method     | Path                 | Handler              |
//! |------------|----------------------|----------------------|
//! | GET        | `/api/icon`          | [`get_icon`]         |
//! | POST       | `/api/icon`          | [`post_icon`]        |
//! | POST       | `/api/local-icon`    | [`post_local_icon`]  |
//! | GET        | `/api/proxy-icon`    | [`proxy_icon`]       |
//! | GET        | `/api/default-icon`  | [`default_icon`]     |
//! | GET / HEAD | `/api/network-probe` | [`network_probe`]    |
//! | GET / HEAD | `/api/network-test`  | [`network_test`]     |
//! | GET / HEAD | network icon path    | embedded SVG         |

use std::net::IpAddr;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tiny_http::Method;
use url::Url;

use super::{Reply, Service};
use crate::core::{IconResult, LinkAddress, LinkRecord, ReachabilityVerdict, is_internal_url};
use crate::embed::icons::NETWORK_ICON_SVG;
use crate::fetch::{FetchError, validate_capture, validate_image_data};
use crate::log;
use crate::probe::{NetworkReport, ProbeError, client_address};
use crate::resolver::{IconRequest, Resolution, StepError, placeholder};
use crate::store::persist_icon;

/// Transport-independent view of an incoming request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: FxHashMap<String, String>,
    pub body: Vec<u8>,
    pub real_ip: Option<String>,
    pub forwarded_for: Option<String>,
    pub peer: Option<IpAddr>,
}

impl ApiRequest {
    /// Split a raw request target into path and decoded query.
    pub fn new(method: Method, target: &str) -> Self {
        let parsed = Url::parse("http://localhost/").and_then(|base| base.join(target));
        let (path, query) = match parsed {
            Ok(url) => (
                url.path().to_string(),
                url.query_pairs().into_owned().collect(),
            ),
            Err(_) => (target.to_string(), FxHashMap::default()),
        };

        Self {
            method,
            path,
            query,
            body: Vec::new(),
            real_ip: None,
            forwarded_for: None,
            peer: None,
        }
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn header_real_ip(mut self, value: Option<String>) -> Self {
        self.real_ip = value;
        self
    }

    pub fn header_forwarded_for(mut self, value: Option<String>) -> Self {
        self.forwarded_for = value;
        self
    }

    pub fn peer(mut self, peer: Option<IpAddr>) -> Self {
        self.peer = peer;
        self
    }

    /// Non-blank query parameter.
    fn param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn flag(&self, name: &str) -> bool {
        self.param(name)
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
    }

    fn json<'de, T: Deserialize<'de>>(&'de self) -> Result<T, Reply> {
        serde_json::from_slice(&self.body).map_err(|e| Reply::error(400, format!("invalid json: {e}")))
    }
}

/// Dispatch `request` to its handler.
pub fn route(service: &Service, request: &ApiRequest) -> Reply {
    let method = &request.method;
    let head = *method == Method::Head;
    let get = *method == Method::Get || head;

    match request.path.as_str() {
        "/api/icon" if *method == Method::Get => get_icon(service, request),
        "/api/icon" if *method == Method::Post => post_icon(service, request),
        "/api/local-icon" if *method == Method::Post => post_local_icon(service, request),
        "/api/proxy-icon" if get => proxy_icon(service, request),
        "/api/default-icon" if get => default_icon(request),
        "/api/network-probe" if head => probe_exists(request),
        "/api/network-probe" if get => network_probe(service, request),
        "/api/network-test" if head => Reply::empty(200),
        "/api/network-test" if get => network_test(request),
        path if get && path == service.resolver.settings().network_icon => {
            let mut reply = Reply::svg(NETWORK_ICON_SVG);
            reply.cache_control = None;
            reply
        }
        "/api/icon" | "/api/local-icon" | "/api/proxy-icon" | "/api/default-icon"
        | "/api/network-probe" | "/api/network-test" => Reply::error(405, "method not allowed"),
        _ => Reply::error(404, "not found"),
    }
}

/// Whether the handler for `method` and raw `target` may wait on outbound
/// requests (icon resolution, aggregator fetches, reachability probes).
pub fn waits_on_network(method: &Method, target: &str) -> bool {
    let path = target.split(['?', '#']).next().unwrap_or(target);
    matches!(
        (method, path),
        (Method::Get | Method::Post, "/api/icon")
            | (Method::Get | Method::Head, "/api/proxy-icon")
            | (Method::Get, "/api/network-probe")
    )
}

// =============================================================================
// Icons
// =============================================================================

/// `{ icon, kind }` payload.
#[derive(Debug, Serialize)]
struct IconPayload {
    icon: String,
    kind: &'static str,
}

impl From<&IconResult> for IconPayload {
    fn from(icon: &IconResult) -> Self {
        Self {
            icon: icon.to_string(),
            kind: icon.kind(),
        }
    }
}

/// Address for an explicit URL parameter, placed by its classification.
fn address_of(url: &str) -> LinkAddress {
    if is_internal_url(url) {
        LinkAddress::new(Some(url), None)
    } else {
        LinkAddress::new(None, Some(url))
    }
}

fn lookup(service: &Service, id: &str) -> Result<Option<LinkRecord>, Reply> {
    service.store.get(id).map_err(|e| {
        log!("store"; "lookup of {} failed: {}", id, e);
        Reply::error(500, "failed to read link store")
    })
}

/// Resolve for `link` (and/or an explicit URL), without looking at a stored icon.
fn resolve_fresh(
    service: &Service,
    url: Option<&str>,
    link: Option<&LinkRecord>,
    prefer_internal: bool,
) -> Resolution {
    let address = match (url, link) {
        (Some(url), _) => address_of(url),
        (None, Some(link)) => link.address(),
        (None, None) => LinkAddress::default(),
    };
    let request = IconRequest::new(address)
        .prefer_internal(prefer_internal)
        .title(link.map(|l| l.title.as_str()));

    service.runtime.block_on(service.resolver.resolution(&request))
}

fn persist(service: &Service, id: &str, icon: &IconResult) {
    // Fire and forget; the reply never waits on storage.
    drop(persist_icon(
        &service.runtime,
        Arc::clone(&service.store),
        id.to_string(),
        icon.clone(),
    ));
}

/// `GET /api/icon?url=..&linkId=..&preferInternal=..`
fn get_icon(service: &Service, request: &ApiRequest) -> Reply {
    let url = request.param("url");
    let link_id = request.param("linkId");
    if url.is_none() && link_id.is_none() {
        return Reply::error(400, "url or linkId is required");
    }

    let link = match link_id.map(|id| lookup(service, id)).transpose() {
        Ok(link) => link.flatten(),
        Err(reply) => return reply,
    };
    if url.is_none() && link.is_none() {
        return Reply::error(404, "link not found");
    }

    if let Some(stored) = link
        .as_ref()
        .and_then(LinkRecord::stored_icon)
        .and_then(IconResult::from_stored)
    {
        return Reply::ok(IconPayload::from(&stored));
    }

    let resolved = resolve_fresh(service, url, link.as_ref(), request.flag("preferInternal"));
    if let Some(link) = link.as_ref().filter(|_| resolved.durable) {
        persist(service, &link.id, &resolved.icon);
    }
    Reply::ok(IconPayload::from(&resolved.icon))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IconUpdate {
    link_id: Option<String>,
    icon_base64: Option<String>,
    url: Option<String>,
    #[serde(default)]
    prefer_internal: bool,
}

/// `POST /api/icon`: store a supplied data URI, or re-resolve and store.
fn post_icon(service: &Service, request: &ApiRequest) -> Reply {
    let update: IconUpdate = match request.json() {
        Ok(update) => update,
        Err(reply) => return reply,
    };
    let Some(link_id) = update.link_id.as_deref().filter(|id| !id.trim().is_empty()) else {
        return Reply::error(400, "linkId is required");
    };

    let link = match lookup(service, link_id) {
        Ok(Some(link)) => link,
        Ok(None) => return Reply::error(404, "link not found"),
        Err(reply) => return reply,
    };

    let supplied = update
        .icon_base64
        .as_deref()
        .filter(|payload| payload.starts_with("data:"))
        .and_then(IconResult::from_stored);

    let resolved = match supplied {
        Some(icon) => Resolution { icon, durable: true },
        None => {
            let url = update.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
            resolve_fresh(service, url, Some(&link), update.prefer_internal)
        }
    };

    if resolved.durable {
        persist(service, &link.id, &resolved.icon);
    }
    Reply::ok(IconPayload::from(&resolved.icon))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalIcon {
    link_id: Option<String>,
    icon_base64: Option<String>,
}

/// `POST /api/local-icon`: accept an icon captured inside the private network.
fn post_local_icon(service: &Service, request: &ApiRequest) -> Reply {
    let capture: LocalIcon = match request.json() {
        Ok(capture) => capture,
        Err(reply) => return reply,
    };
    let (Some(link_id), Some(payload)) = (capture.link_id.as_deref(), capture.icon_base64.as_deref())
    else {
        return Reply::error(400, "linkId and iconBase64 are required");
    };

    let max_bytes = service.resolver.settings().max_icon_bytes;
    if let Err(e) = validate_image_data(payload, max_bytes) {
        return Reply::error(400, e.to_string());
    }

    let link = match lookup(service, link_id) {
        Ok(Some(link)) => link,
        Ok(None) => return Reply::error(404, "link not found"),
        Err(reply) => return reply,
    };

    let icon = match validate_capture(&link, payload, max_bytes) {
        Ok(icon) => icon,
        Err(e) => return Reply::error(400, e.to_string()),
    };

    match service.store.set_icon(&link.id, &icon.to_string()) {
        Ok(()) => Reply::ok(IconPayload::from(&icon)),
        Err(e) => {
            log!("store"; "failed to save captured icon for {}: {}", link.id, e);
            Reply::error(500, "failed to save icon")
        }
    }
}

/// `GET /api/proxy-icon?url=..`: aggregator icon fetched server-side.
fn proxy_icon(service: &Service, request: &ApiRequest) -> Reply {
    let Some(url) = request.param("url") else {
        return Reply::error(400, "url is required");
    };

    match service.runtime.block_on(service.resolver.proxy_icon(url)) {
        Ok(icon) => Reply::ok(IconPayload::from(&icon)),
        Err(StepError::InvalidUrl(e)) => Reply::error(400, format!("invalid url: {e}")),
        Err(StepError::Fetch(FetchError::Status(code))) => {
            Reply::error(code, format!("failed to fetch icon: {code}"))
        }
        Err(e) => Reply::error(502, format!("failed to fetch icon: {e}")),
    }
}

/// `GET /api/default-icon?char=..&name=..`: letter badge as SVG.
fn default_icon(request: &ApiRequest) -> Reply {
    let letter = request.param("char").unwrap_or("A");
    let seed = request.param("name").unwrap_or(letter);
    Reply::svg(placeholder::badge_svg(seed, letter))
}

// =============================================================================
// Network
// =============================================================================

#[derive(Debug, Serialize)]
struct ProbePayload<'a> {
    target: &'a str,
    #[serde(flatten)]
    verdict: ReachabilityVerdict,
}

fn probe_error(err: &ProbeError) -> Reply {
    match err {
        ProbeError::Disallowed(_) => Reply::error(403, err.to_string()),
        ProbeError::MissingTarget | ProbeError::InvalidUrl(_) => Reply::error(400, err.to_string()),
    }
}

/// `GET /api/network-probe?target=..`
fn network_probe(service: &Service, request: &ApiRequest) -> Reply {
    let Some(target) = request.param("target") else {
        return probe_error(&ProbeError::MissingTarget);
    };

    match service.runtime.block_on(service.prober.probe_target(target)) {
        Ok(verdict) => Reply::ok(ProbePayload { target, verdict }),
        Err(e) => probe_error(&e),
    }
}

/// `HEAD /api/network-probe?target=..`: cheap existence check, no request made.
fn probe_exists(request: &ApiRequest) -> Reply {
    match request.param("target") {
        Some(_) => Reply::empty(200),
        None => Reply::empty(400),
    }
}

/// `GET /api/network-test`: the address this request appears to come from.
fn network_test(request: &ApiRequest) -> Reply {
    let addr = client_address(
        request.real_ip.as_deref(),
        request.forwarded_for.as_deref(),
        request.peer,
    );
    Reply::ok(NetworkReport::new(addr))
}

// =============================================================================
// Tests
// =============================================================================
