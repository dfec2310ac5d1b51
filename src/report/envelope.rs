//! Report response envelope
//!
//! The upstream backend wraps every report answer in an envelope carrying
//! the decoded payload (`data` or `parsed`), the verbatim response text
//! (`raw` or `xml`), and bookkeeping fields (`ip`, `report_name`, `meter`).
//! None of the fields is guaranteed; the envelope stays an untyped value and
//! exposes accessors with the same fallback order the dashboards rely on.

use serde_json::Value;

/// Envelope around one upstream report response
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEnvelope {
    body: Value,
}

impl ReportEnvelope {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// The payload to normalize: `data` if the key exists (even when null),
    /// else `parsed`, else the whole body.
    pub fn payload(&self) -> &Value {
        if let Value::Object(obj) = &self.body {
            if let Some(data) = obj.get("data") {
                return data;
            }
            if let Some(parsed) = obj.get("parsed") {
                return parsed;
            }
        }
        &self.body
    }

    /// Verbatim response text for the XML download: `raw`, else `xml`.
    pub fn raw_text(&self) -> Option<&str> {
        self.field_str("raw").or_else(|| self.field_str("xml"))
    }

    /// Concentrator address the report was served from
    pub fn ip(&self) -> Option<&str> {
        self.field_str("ip")
    }

    /// Report method echoed back by the upstream
    pub fn report_name(&self) -> Option<&str> {
        self.field_str("report_name")
    }

    fn field_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }
}

impl From<Value> for ReportEnvelope {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_prefers_data() {
        let env = ReportEnvelope::new(json!({"data": [1, 2], "parsed": {"rows": []}}));
        assert_eq!(env.payload(), &json!([1, 2]));
    }

    #[test]
    fn test_null_data_is_still_the_payload() {
        // A present-but-null `data` key must not fall through to `parsed`.
        let env = ReportEnvelope::new(json!({"data": null, "parsed": {"rows": [{}]}}));
        assert_eq!(env.payload(), &Value::Null);
    }

    #[test]
    fn test_payload_falls_back_to_parsed_then_body() {
        let env = ReportEnvelope::new(json!({"parsed": {"rows": []}}));
        assert_eq!(env.payload(), &json!({"rows": []}));

        let env = ReportEnvelope::new(json!([{"a": 1}]));
        assert_eq!(env.payload(), &json!([{"a": 1}]));
    }

    #[test]
    fn test_raw_text_prefers_raw_over_xml() {
        let env = ReportEnvelope::new(json!({"raw": "<Report/>", "xml": "<Other/>"}));
        assert_eq!(env.raw_text(), Some("<Report/>"));

        let env = ReportEnvelope::new(json!({"xml": "<Other/>"}));
        assert_eq!(env.raw_text(), Some("<Other/>"));

        let env = ReportEnvelope::new(json!({}));
        assert_eq!(env.raw_text(), None);
    }
}
