//! Upstream metering backend client
//!
//! HTTP client for the backend that actually talks to the concentrators.
//! The console never interprets failures beyond sorting them into transport
//! problems and upstream-reported errors; upstream error text is passed
//! through verbatim so operators see what the concentrator said.

use std::collections::HashMap;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::report::ReportEnvelope;

/// Client for the upstream metering backend
pub struct UpstreamClient {
    client: Client,
    config: UpstreamConfig,
}

/// Configuration for the upstream client
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the metering backend (e.g. "http://localhost:8000")
    pub base_url: String,
    /// Request timeout in seconds; report queries can take minutes on a
    /// slow PLC segment, so this is generous by default
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Parameters for one report query
#[derive(Debug, Clone, Serialize)]
pub struct ReportQuery {
    pub meter: String,
    pub report_name: String,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fini: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_pet: Option<String>,
}

/// Parameters for one relay order
#[derive(Debug, Clone, Serialize)]
pub struct OrderQuery {
    pub meter: String,
    pub order: String,
    pub priority: u8,
    pub actdate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_pet: Option<String>,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Check that the backend answers at all
    pub async fn health_check(&self) -> Result<(), UpstreamError> {
        let url = format!("{}/health", self.config.base_url);
        let response = self.client.get(&url).send().await.map_err(classify_transport)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Unavailable)
        }
    }

    /// Run one report query and return the response envelope
    pub async fn report(&self, query: &ReportQuery) -> Result<ReportEnvelope, UpstreamError> {
        let url = format!("{}/api/report", self.config.base_url);
        let body = self.get_json(&url, query).await?;
        Ok(ReportEnvelope::new(body))
    }

    /// Send one relay order and return the response envelope
    pub async fn order(&self, query: &OrderQuery) -> Result<ReportEnvelope, UpstreamError> {
        let url = format!("{}/api/order", self.config.base_url);
        let body = self.get_json(&url, query).await?;
        Ok(ReportEnvelope::new(body))
    }

    /// Upload a meter list file for a bulk order. The file is forwarded as
    /// multipart form data; the response is the backend's per-meter result
    /// list, untouched.
    pub async fn order_batch(
        &self,
        file_name: &str,
        file_data: Vec<u8>,
        order: &str,
        actdate: &str,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}/api/order/batch", self.config.base_url);

        let part = Part::bytes(file_data).file_name(file_name.to_string());
        let form = Form::new()
            .part("file", part)
            .text("order", order.to_string())
            .text("actdate", actdate.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;
        read_json(response).await
    }

    /// Fetch the field code meaning table. Non-string values are skipped;
    /// the table is advisory and a partial map is better than none.
    pub async fn meanings(&self) -> Result<HashMap<String, String>, UpstreamError> {
        let url = format!("{}/api/meanings", self.config.base_url);
        let response = self.client.get(&url).send().await.map_err(classify_transport)?;
        let body = read_json(response).await?;

        let mut entries = HashMap::new();
        if let Value::Object(map) = body {
            for (code, meaning) in map {
                if let Value::String(text) = meaning {
                    entries.insert(code, text);
                }
            }
        }
        Ok(entries)
    }

    async fn get_json<Q: Serialize>(&self, url: &str, query: &Q) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify_transport)?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(UpstreamError::Request);
    }

    let text = response.text().await.unwrap_or_default();
    Err(UpstreamError::Http {
        status: status.as_u16(),
        message: extract_error_message(status.as_u16(), &text),
    })
}

/// Upstream error text, passed through verbatim when possible: a string
/// `detail` or `error` field wins, any other JSON value under those keys is
/// serialized, and a body without either collapses to "HTTP <status>".
fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error"] {
            match value.get(key) {
                Some(Value::String(text)) => return text.clone(),
                Some(other) => return other.to_string(),
                None => {}
            }
        }
    }
    format!("HTTP {}", status)
}

fn classify_transport(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else if e.is_connect() {
        UpstreamError::Unavailable
    } else {
        UpstreamError::Request(e)
    }
}

/// Whether one entry in a bulk order result list reports success: its `ok`
/// or `success` field is truthy.
pub fn batch_entry_ok(entry: &Value) -> bool {
    for key in ["ok", "success"] {
        if let Some(flag) = entry.get(key) {
            return value_truthy(flag);
        }
    }
    false
}

fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Null => false,
        _ => true,
    }
}

/// Errors talking to the metering backend
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Metering backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with an error; message passed through verbatim
    #[error("{message}")]
    Http { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_passes_detail_through_verbatim() {
        let body = r#"{"detail": "CNC timeout waiting for CIR0141825620"}"#;
        assert_eq!(
            extract_error_message(502, body),
            "CNC timeout waiting for CIR0141825620"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_error_field() {
        assert_eq!(extract_error_message(400, r#"{"error": "bad meter"}"#), "bad meter");
    }

    #[test]
    fn test_structured_detail_is_serialized() {
        let body = r#"{"detail": [{"loc": ["meter"], "msg": "required"}]}"#;
        assert_eq!(
            extract_error_message(422, body),
            r#"[{"loc":["meter"],"msg":"required"}]"#
        );
    }

    #[test]
    fn test_unusable_body_collapses_to_status() {
        assert_eq!(extract_error_message(500, "<html>oops</html>"), "HTTP 500");
        assert_eq!(extract_error_message(404, r#"{"other": 1}"#), "HTTP 404");
    }

    #[test]
    fn test_batch_entry_ok_truthiness() {
        assert!(batch_entry_ok(&json!({"ok": true})));
        assert!(batch_entry_ok(&json!({"success": 1})));
        assert!(batch_entry_ok(&json!({"ok": "queued"})));
        assert!(!batch_entry_ok(&json!({"ok": false})));
        assert!(!batch_entry_ok(&json!({"ok": "0"})));
        assert!(!batch_entry_ok(&json!({"ok": null})));
        assert!(!batch_entry_ok(&json!({"status": "done"})));
    }

    #[test]
    fn test_report_query_skips_empty_range() {
        let query = ReportQuery {
            meter: "CIR0141825620".to_string(),
            report_name: "S01".to_string(),
            priority: 1,
            fini: None,
            fend: None,
            id_pet: None,
        };
        let encoded = serde_json::to_value(&query).unwrap();
        assert!(encoded.get("fini").is_none());
        assert_eq!(encoded.get("report_name").unwrap(), "S01");
    }
}
