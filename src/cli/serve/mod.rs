//! HTTP service exposing icon resolution and reachability.
//!
//! A blocking tiny_http accept loop hands each request to a small rayon
//! pool; handlers drive the async resolver and prober through a shared
//! tokio runtime handle.

mod api;
mod lifecycle;
mod response;

pub use api::{ApiRequest, route, waits_on_network};
pub use response::Reply;

use crate::{
    config::{LinkiconConfig, cfg},
    core::is_shutdown,
    fetch::{HttpFetcher, ServerSideFetch},
    log,
    probe::ReachabilityProber,
    resolver::{IconResolver, ResolverSettings},
    store::{JsonLinkStore, LinkStore},
};
use anyhow::{Context, Result};
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Method, Request, Server};

/// Handler threads for routes that wait on outbound requests.
const NETWORK_THREADS: usize = 4;

/// Handler threads for everything else.
const QUICK_THREADS: usize = 2;

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 4 * 1024 * 1024;

/// Everything a request handler needs.
pub struct Service {
    pub resolver: IconResolver,
    pub prober: ReachabilityProber,
    pub store: Arc<dyn LinkStore>,
    pub runtime: tokio::runtime::Handle,
}

impl Service {
    /// Wire the production fetcher and JSON store from `config`.
    pub fn from_config(config: &LinkiconConfig, runtime: tokio::runtime::Handle) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.resolver.user_agent, config.resolver.max_icon_bytes)
            .context("Failed to create http client")?;
        let store = JsonLinkStore::new(&config.store.path);
        Ok(Self::with_parts(
            Arc::new(fetcher),
            Arc::new(store),
            config,
            runtime,
        ))
    }

    pub fn with_parts(
        fetch: Arc<dyn ServerSideFetch>,
        store: Arc<dyn LinkStore>,
        config: &LinkiconConfig,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        Self {
            resolver: IconResolver::new(
                Arc::clone(&fetch),
                ResolverSettings::from(&config.resolver),
            ),
            prober: ReachabilityProber::new(fetch, &config.probe),
            store,
            runtime,
        }
    }
}

/// Bind, then serve until Ctrl+C.
pub fn serve() -> Result<()> {
    let config = cfg();
    let runtime = lifecycle::build_runtime()?;
    let service = Arc::new(Service::from_config(&config, runtime.handle().clone())?);

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server_for_shutdown(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    log!("serve"; "link store {}", config.store.path.display());

    run_request_loop(&server, &service)?;

    // Let pending icon writes finish.
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));
    Ok(())
}

fn build_pool(threads: usize, lane: &'static str) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("linkicon-{lane}-{i}"))
        .build()
        .with_context(|| format!("Failed to create {lane} thread pool"))
}

/// Slow resolutions and probes never hold up the cheap routes.
fn run_request_loop(server: &Server, service: &Arc<Service>) -> Result<()> {
    let network = build_pool(NETWORK_THREADS, "net")?;
    let quick = build_pool(QUICK_THREADS, "http")?;

    for request in server.incoming_requests() {
        let pool = if waits_on_network(request.method(), request.url()) {
            &network
        } else {
            &quick
        };
        let service = Arc::clone(service);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &service) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, service: &Service) -> Result<()> {
    // Early exit if shutdown requested
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let api_request = read_request(&mut request)?;
    let head_only = api_request.method == Method::Head;
    let reply = route(service, &api_request);

    crate::debug!("serve"; "{} {} -> {}", api_request.method, request.url(), reply.status);
    response::send(request, reply, head_only)
}

/// Copy what the handlers need out of a tiny_http request.
fn read_request(request: &mut Request) -> Result<ApiRequest> {
    let mut body = Vec::new();
    if matches!(request.method(), Method::Post) {
        request
            .as_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .context("Failed to read request body")?;
    }

    let header = |name: &str| {
        request
            .headers()
            .iter()
            .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
            .map(|h| h.value.to_string())
    };

    Ok(ApiRequest::new(request.method().clone(), request.url())
        .header_real_ip(header("x-real-ip"))
        .header_forwarded_for(header("x-forwarded-for"))
        .peer(request.remote_addr().map(SocketAddr::ip))
        .body(body))
}
