use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("static URL pattern"));

/// Scheme check applied before any network call.
pub fn is_http_url(url: &str) -> bool {
    HTTP_URL.is_match(url)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    /// Empty means "no key": the probe then omits the Authorization header.
    #[serde(rename = "apiKey")]
    pub api_key: String,
}

impl Credential {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Persisted form: exactly `baseUrl` and `apiKey`.
    pub fn to_stored(&self) -> String {
        serde_json::json!({
            "baseUrl": self.base_url,
            "apiKey": self.api_key,
        })
        .to_string()
    }
}

/// Decodes a persisted value. Anything that is not a JSON object with a
/// string base URL (`baseUrl`, or the legacy `baseURL`) and a string
/// `apiKey` yields `None`.
pub fn parse_stored(raw: Option<&str>) -> Option<Credential> {
    let parsed: Value = serde_json::from_str(raw?).ok()?;
    let api_key = parsed.get("apiKey")?.as_str()?;

    ["baseUrl", "baseURL"]
        .iter()
        .find_map(|field| parsed.get(*field).and_then(Value::as_str))
        .map(|base_url| Credential::new(base_url, api_key))
}

/// A validated credential together with the models the endpoint reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    #[serde(flatten)]
    pub credential: Credential,
    #[serde(rename = "baseURL")]
    base_url_alias: String,
    pub models: Vec<String>,
}

impl ResolvedConfig {
    pub fn new(credential: Credential, models: Vec<String>) -> Self {
        Self {
            base_url_alias: credential.base_url.clone(),
            credential,
            models,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.credential.base_url
    }

    pub fn base_url_alias(&self) -> &str {
        &self.base_url_alias
    }

    pub fn api_key(&self) -> &str {
        &self.credential.api_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_check_requires_http_scheme() {
        assert!(is_http_url("https://api.openai.com/v1"));
        assert!(is_http_url("http://localhost:11434/v1"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("api.openai.com"));
        assert!(!is_http_url(" https://api.openai.com"));
        assert!(!is_http_url(""));
    }

    #[test]
    fn parses_current_and_legacy_field_names() {
        let current = parse_stored(Some(r#"{"baseUrl":"https://a.test/v1","apiKey":"sk-1"}"#));
        assert_eq!(current, Some(Credential::new("https://a.test/v1", "sk-1")));

        let legacy = parse_stored(Some(r#"{"baseURL":"https://b.test/v1","apiKey":""}"#));
        assert_eq!(legacy, Some(Credential::new("https://b.test/v1", "")));
    }

    #[test]
    fn prefers_base_url_over_legacy_field() {
        let both = parse_stored(Some(
            r#"{"baseUrl":"https://new.test","baseURL":"https://old.test","apiKey":"k"}"#,
        ));
        assert_eq!(both.map(|c| c.base_url), Some("https://new.test".to_string()));

        let fallback = parse_stored(Some(
            r#"{"baseUrl":42,"baseURL":"https://old.test","apiKey":"k"}"#,
        ));
        assert_eq!(fallback.map(|c| c.base_url), Some("https://old.test".to_string()));
    }

    #[test]
    fn malformed_or_absent_input_is_absent() {
        for raw in [
            None,
            Some(""),
            Some("not json"),
            Some("{"),
            Some("null"),
            Some("[]"),
            Some("\"https://a.test\""),
            Some("{}"),
            Some(r#"{"baseUrl":"https://a.test"}"#),
            Some(r#"{"apiKey":"k"}"#),
        ] {
            assert_eq!(parse_stored(raw), None, "input {raw:?}");
        }
    }

    #[test]
    fn non_string_fields_are_absent() {
        for raw in [
            r#"{"baseUrl":"https://a.test","apiKey":null}"#,
            r#"{"baseUrl":"https://a.test","apiKey":123}"#,
            r#"{"baseUrl":["https://a.test"],"apiKey":"k"}"#,
            r#"{"baseURL":{"url":"https://a.test"},"apiKey":"k"}"#,
            r#"{"baseUrl":null,"apiKey":"k"}"#,
        ] {
            assert_eq!(parse_stored(Some(raw)), None, "input {raw}");
        }
    }

    #[test]
    fn stored_form_contains_exactly_two_fields() {
        let stored = Credential::new("https://a.test/v1", "sk-1").to_stored();
        let value: Value = serde_json::from_str(&stored).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["baseUrl"], "https://a.test/v1");
        assert_eq!(object["apiKey"], "sk-1");
        assert_eq!(
            parse_stored(Some(&stored)),
            Some(Credential::new("https://a.test/v1", "sk-1"))
        );
    }

    #[test]
    fn resolved_config_serializes_both_aliases() {
        let resolved = ResolvedConfig::new(
            Credential::new("https://a.test/v1", "sk-1"),
            vec!["gpt-4".to_string()],
        );
        assert_eq!(resolved.base_url(), resolved.base_url_alias());

        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["baseUrl"], "https://a.test/v1");
        assert_eq!(value["baseURL"], "https://a.test/v1");
        assert_eq!(value["apiKey"], "sk-1");
        assert_eq!(value["models"], serde_json::json!(["gpt-4"]));
    }
}
