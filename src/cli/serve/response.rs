//! HTTP responses.
//!
//! Handlers build a [`Reply`]; only [`send`] touches tiny_http.

use crate::core::Envelope;
use crate::utils::mime::types::{JSON, SVG};
use anyhow::Result;
use serde::Serialize;
use tiny_http::{Header, Request, Response, StatusCode};

/// Cache policy for generated badges.
const BADGE_CACHE_CONTROL: &str = "public, max-age=3600";

/// A response produced by a route handler.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub cache_control: Option<&'static str>,
}

impl Reply {
    /// `200` with `{ success: true, data }`.
    pub fn ok<T: Serialize>(data: T) -> Self {
        Self::json(200, &Envelope::ok(data))
    }

    /// `status` with `{ success: false, error }`.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &Envelope::<()>::err(message))
    }

    pub fn json<T: Serialize>(status: u16, envelope: &Envelope<T>) -> Self {
        let body = serde_json::to_vec(envelope).unwrap_or_else(|_| {
            br#"{"success":false,"error":"failed to encode response"}"#.to_vec()
        });
        Self {
            status,
            content_type: JSON,
            body,
            cache_control: None,
        }
    }

    pub fn svg(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: SVG,
            body: body.into().into_bytes(),
            cache_control: Some(BADGE_CACHE_CONTROL),
        }
    }

    /// Header-only response (HEAD checks).
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: JSON,
            body: Vec::new(),
            cache_control: None,
        }
    }

    /// Body parsed back as JSON.
    #[cfg(test)]
    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Write `reply` to the client; HEAD requests get headers only.
pub fn send(request: Request, reply: Reply, head_only: bool) -> Result<()> {
    let body = if head_only { Vec::new() } else { reply.body };

    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(reply.status))
        .with_header(make_header("Content-Type", reply.content_type));
    if let Some(cache) = reply.cache_control {
        response = response.with_header(make_header("Cache-Control", cache));
    }

    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, Reply::error(503, "service unavailable"), false)
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let reply = Reply::error(403, "only local network targets are allowed");
        assert_eq!(reply.status, 403);
        assert_eq!(reply.content_type, JSON);

        let json = reply.json_body();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "only local network targets are allowed");
    }

    #[test]
    fn test_svg_is_cacheable() {
        let reply = Reply::svg("<svg/>");
        assert_eq!(reply.content_type, SVG);
        assert_eq!(reply.cache_control, Some(BADGE_CACHE_CONTROL));
        assert_eq!(reply.body, b"<svg/>");
    }
}
