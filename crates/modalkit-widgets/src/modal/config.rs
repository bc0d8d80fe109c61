#![forbid(unsafe_code)]

//! Manager configuration: timings, page hooks, copy, and upload policy.
//!
//! All types implement `Default` with the production values. Behind the
//! `policy-config` feature, [`ManagerConfig`] can be loaded from a TOML or
//! JSON document; missing keys keep their defaults and durations are given
//! in milliseconds:
//!
//! ```toml
//! transition_ms = 250
//! ajax_timeout_ms = 8000
//! scroll_lock_class = "modal-open"
//!
//! [messages]
//! load_failed_title = "Something went wrong"
//!
//! [upload]
//! max_file_size = 5242880
//! allowed_extensions = ["pdf", "docx"]
//! ```

use core::fmt;
use std::time::Duration;

/// Default fade transition.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

/// Default bound on content loads.
pub const DEFAULT_AJAX_TIMEOUT: Duration = Duration::from_secs(10);

/// Default upload size limit (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// User-facing copy used by generated dialog chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct Messages {
    pub loading: String,
    pub load_failed_title: String,
    pub load_failed_body: String,
    pub retry_label: String,
    pub dismiss_label: String,
    pub close_label: String,
    pub ok_label: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub remove_file_label: String,
    pub drop_files_hint: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            loading: "Loading…".to_owned(),
            load_failed_title: "Unable to load".to_owned(),
            load_failed_body: "This content could not be loaded. Please try again.".to_owned(),
            retry_label: "Try again".to_owned(),
            dismiss_label: "Dismiss".to_owned(),
            close_label: "Close".to_owned(),
            ok_label: "OK".to_owned(),
            confirm_label: "Confirm".to_owned(),
            cancel_label: "Cancel".to_owned(),
            remove_file_label: "Remove".to_owned(),
            drop_files_hint: "Drop files here or click to browse".to_owned(),
        }
    }
}

/// Client-side attachment rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct UploadPolicy {
    /// Inclusive upper bound in bytes.
    pub max_file_size: u64,
    /// Lower-case extensions without the dot.
    pub allowed_extensions: Vec<String>,
    /// MIME types accepted when the browser reports one.
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: ["pdf", "doc", "docx", "jpg", "jpeg", "png", "gif"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            allowed_mime_types: [
                "application/pdf",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "image/jpeg",
                "image/png",
                "image/gif",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        }
    }
}

impl UploadPolicy {
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }

    /// `application/octet-stream` is what browsers report when they do not
    /// know; it defers to the extension check.
    pub fn allows_mime(&self, mime: &str) -> bool {
        let mime = mime.split(';').next().unwrap_or_default().trim();
        mime.eq_ignore_ascii_case("application/octet-stream")
            || self
                .allowed_mime_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    }

    /// `accept` attribute value for file inputs, e.g. `.pdf,.doc`.
    pub fn accept_attr(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Configuration for [`DialogManager`](crate::modal::DialogManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Fade duration; open/close calls are rejected while it runs.
    pub transition: Duration,
    /// Bound on asynchronous content loads.
    pub ajax_timeout: Duration,
    /// Body class that disables page scroll while any dialog is open.
    pub scroll_lock_class: String,
    pub messages: Messages,
    pub upload: UploadPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            transition: DEFAULT_TRANSITION,
            ajax_timeout: DEFAULT_AJAX_TIMEOUT,
            scroll_lock_class: "modal-open".to_owned(),
            messages: Messages::default(),
            upload: UploadPolicy::default(),
        }
    }
}

impl ManagerConfig {
    pub fn transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    pub fn ajax_timeout(mut self, timeout: Duration) -> Self {
        self.ajax_timeout = timeout;
        self
    }

    pub fn scroll_lock_class(mut self, class: impl Into<String>) -> Self {
        self.scroll_lock_class = class.into();
        self
    }

    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn upload(mut self, upload: UploadPolicy) -> Self {
        self.upload = upload;
        self
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the scroll lock class is blank, the
    /// upload limit is zero, or no extension is allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scroll_lock_class.trim().is_empty() {
            return Err(ConfigError::Invalid("scroll_lock_class is empty".into()));
        }
        if self.upload.max_file_size == 0 {
            return Err(ConfigError::Invalid("upload.max_file_size is zero".into()));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "upload.allowed_extensions is empty".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(feature = "policy-config")]
mod file {
    use super::*;

    /// On-disk shape; durations in milliseconds.
    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct ConfigDocument {
        transition_ms: Option<u64>,
        ajax_timeout_ms: Option<u64>,
        scroll_lock_class: Option<String>,
        messages: Option<Messages>,
        upload: Option<UploadPolicy>,
    }

    impl ConfigDocument {
        fn into_config(self) -> Result<ManagerConfig, ConfigError> {
            let defaults = ManagerConfig::default();
            let config = ManagerConfig {
                transition: self
                    .transition_ms
                    .map_or(defaults.transition, Duration::from_millis),
                ajax_timeout: self
                    .ajax_timeout_ms
                    .map_or(defaults.ajax_timeout, Duration::from_millis),
                scroll_lock_class: self
                    .scroll_lock_class
                    .unwrap_or(defaults.scroll_lock_class),
                messages: self.messages.unwrap_or(defaults.messages),
                upload: self.upload.unwrap_or(defaults.upload),
            };
            config.validate()?;
            Ok(config)
        }
    }

    impl ManagerConfig {
        /// Load from a TOML document.
        ///
        /// # Errors
        ///
        /// [`ConfigError::Parse`] on malformed TOML or unknown keys,
        /// [`ConfigError::Invalid`] when [`validate`](Self::validate) fails.
        pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
            let doc: ConfigDocument =
                toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
            doc.into_config()
        }

        /// Load from a JSON document.
        ///
        /// # Errors
        ///
        /// Same as [`from_toml_str`](Self::from_toml_str).
        pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
            let doc: ConfigDocument =
                serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
            doc.into_config()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let config = ManagerConfig::default();
        assert_eq!(config.transition, Duration::from_millis(300));
        assert_eq!(config.ajax_timeout, Duration::from_secs(10));
        assert_eq!(config.upload.max_file_size, 10_485_760);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let policy = UploadPolicy::default();
        assert!(policy.allows_extension("PDF"));
        assert!(policy.allows_extension("docx"));
        assert!(!policy.allows_extension("exe"));
    }

    #[test]
    fn mime_check_ignores_parameters_and_octet_stream() {
        let policy = UploadPolicy::default();
        assert!(policy.allows_mime("application/pdf; charset=binary"));
        assert!(policy.allows_mime("application/octet-stream"));
        assert!(!policy.allows_mime("application/x-msdownload"));
    }

    #[test]
    fn accept_attr_lists_extensions() {
        let policy = UploadPolicy {
            allowed_extensions: vec!["pdf".into(), "png".into()],
            ..UploadPolicy::default()
        };
        assert_eq!(policy.accept_attr(), ".pdf,.png");
    }

    #[test]
    fn validate_rejects_empty_allow_list() {
        let config = ManagerConfig::default().upload(UploadPolicy {
            allowed_extensions: Vec::new(),
            ..UploadPolicy::default()
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn toml_overrides_keep_other_defaults() {
        let config = ManagerConfig::from_toml_str(
            r#"
            transition_ms = 150

            [upload]
            max_file_size = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.transition, Duration::from_millis(150));
        assert_eq!(config.ajax_timeout, Duration::from_secs(10));
        assert_eq!(config.upload.max_file_size, 1024);
        assert!(config.upload.allows_extension("pdf"));
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn json_unknown_key_is_parse_error() {
        let err = ManagerConfig::from_json_str(r#"{"transition": 5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn json_zero_limit_is_invalid() {
        let err = ManagerConfig::from_json_str(r#"{"upload": {"max_file_size": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
