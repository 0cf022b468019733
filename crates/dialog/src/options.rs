use keygate_provider::{ConfigStore, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_STORAGE_KEY: &str = "bootstrapLLMProvider_openaiConfig";

/// One entry of a closed list of endpoints the user picks from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUrlChoice {
    pub url: String,
    pub name: String,
}

#[derive(Clone)]
pub struct DialogOptions {
    pub store: Arc<dyn ConfigStore>,
    pub storage_key: String,
    /// Suggestions offered for a free-form URL field.
    pub default_base_urls: Vec<String>,
    /// When set, the URL field becomes a closed choice list.
    pub base_urls: Option<Vec<BaseUrlChoice>>,
    pub force_show: bool,
    pub title: String,
    pub base_url_label: String,
    pub api_key_label: String,
    pub button_label: String,
    pub help: String,
}

impl fmt::Debug for DialogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogOptions")
            .field("storage_key", &self.storage_key)
            .field("default_base_urls", &self.default_base_urls)
            .field("base_urls", &self.base_urls)
            .field("force_show", &self.force_show)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl DialogOptions {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_base_urls: vec![DEFAULT_BASE_URL.to_string()],
            base_urls: None,
            force_show: false,
            title: "OpenAI API Configuration".to_string(),
            base_url_label: "API Base URL".to_string(),
            api_key_label: "API Key".to_string(),
            button_label: "Save & Test".to_string(),
            help: String::new(),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_force_show(mut self, force_show: bool) -> Self {
        self.force_show = force_show;
        self
    }

    pub fn with_base_urls(mut self, choices: Vec<BaseUrlChoice>) -> Self {
        self.base_urls = Some(choices);
        self
    }

    pub fn with_default_base_urls(mut self, urls: Vec<String>) -> Self {
        self.default_base_urls = urls;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn apply(mut self, overrides: DialogOverrides) -> Self {
        let DialogOverrides {
            storage_key,
            default_base_urls,
            base_urls,
            force_show,
            title,
            base_url_label,
            api_key_label,
            button_label,
            help,
        } = overrides;

        if let Some(v) = storage_key {
            self.storage_key = v;
        }
        if let Some(v) = default_base_urls {
            self.default_base_urls = v;
        }
        if base_urls.is_some() {
            self.base_urls = base_urls;
        }
        if let Some(v) = force_show {
            self.force_show = v;
        }
        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = base_url_label {
            self.base_url_label = v;
        }
        if let Some(v) = api_key_label {
            self.api_key_label = v;
        }
        if let Some(v) = button_label {
            self.button_label = v;
        }
        if let Some(v) = help {
            self.help = v;
        }
        self
    }
}

/// Caller-supplied option overrides, as read from the `[dialog]` table of the
/// configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogOverrides {
    pub storage_key: Option<String>,
    pub default_base_urls: Option<Vec<String>>,
    pub base_urls: Option<Vec<BaseUrlChoice>>,
    pub force_show: Option<bool>,
    pub title: Option<String>,
    pub base_url_label: Option<String>,
    pub api_key_label: Option<String>,
    pub button_label: Option<String>,
    pub help: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_provider::MemoryStore;

    fn options() -> DialogOptions {
        DialogOptions::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn defaults_describe_openai() {
        let opts = options();
        assert_eq!(opts.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(opts.default_base_urls, vec!["https://api.openai.com/v1"]);
        assert!(opts.base_urls.is_none());
        assert!(!opts.force_show);
        assert_eq!(opts.title, "OpenAI API Configuration");
        assert_eq!(opts.button_label, "Save & Test");
        assert!(opts.help.is_empty());
    }

    #[test]
    fn overrides_only_touch_fields_they_set() {
        let opts = options().apply(DialogOverrides {
            title: Some("Local LLM".to_string()),
            force_show: Some(true),
            ..Default::default()
        });

        assert_eq!(opts.title, "Local LLM");
        assert!(opts.force_show);
        assert_eq!(opts.api_key_label, "API Key");
        assert_eq!(opts.default_base_urls, vec!["https://api.openai.com/v1"]);
    }

    #[test]
    fn overrides_deserialize_from_partial_table() {
        let overrides: DialogOverrides = serde_json::from_value(serde_json::json!({
            "help": "Ask your admin for a key",
            "base_urls": [{"url": "https://llm.internal/v1", "name": "Internal"}]
        }))
        .unwrap();

        let opts = options().apply(overrides);
        assert_eq!(opts.help, "Ask your admin for a key");
        assert_eq!(
            opts.base_urls,
            Some(vec![BaseUrlChoice {
                url: "https://llm.internal/v1".to_string(),
                name: "Internal".to_string(),
            }])
        );
        assert_eq!(opts.title, "OpenAI API Configuration");
    }
}
