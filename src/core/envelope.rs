//! JSON envelope shared by every API response.
//!
//! ```json
//! { "success": true, "data": { ... } }
//! { "success": false, "error": "..." }
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Payload of a successful envelope.
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape() {
        let ok = serde_json::to_value(Envelope::ok(json!({ "icon": "/x.svg" }))).unwrap();
        assert_eq!(ok, json!({ "success": true, "data": { "icon": "/x.svg" } }));

        let err = serde_json::to_value(Envelope::<()>::err("bad link")).unwrap();
        assert_eq!(err, json!({ "success": false, "error": "bad link" }));
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Report {
        ip: String,
    }

    #[test]
    fn test_payload_without_default() {
        let parsed: Envelope<Report> =
            serde_json::from_str(r#"{"success":true,"data":{"ip":"10.0.0.2"}}"#).unwrap();
        assert_eq!(parsed.into_data(), Some(Report { ip: "10.0.0.2".into() }));

        let missing: Envelope<Report> = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(missing.data, None);
    }

    #[test]
    fn test_failed_envelope_has_no_data() {
        let parsed: Envelope<u8> =
            serde_json::from_str(r#"{"success":false,"data":1,"error":"x"}"#).unwrap();
        assert_eq!(parsed.into_data(), None);
    }
}
