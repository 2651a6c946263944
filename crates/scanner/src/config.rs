//! Relay configuration: submission settings plus the rescan window,
//! auto-submit and pre-filled form values.

use std::collections::BTreeMap;
use std::time::Duration;

use scanpost_core::{AuxField, RescanPolicy};
use scanpost_events::config::{parse_bool, parse_positive};
use scanpost_events::{ConfigError, SubmitConfig};

/// Relay configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub submit: SubmitConfig,
    /// Suppression window for repeated scans (zero disables it).
    pub rescan: RescanPolicy,
    /// Submit each accepted scan without a form submit action.
    pub auto_submit: bool,
    /// Pre-filled form values.
    pub form_defaults: BTreeMap<AuxField, String>,
}

/// Environment variable holding the default value of a form field.
pub fn field_env_key(field: AuxField) -> &'static str {
    match field {
        AuxField::InOut => "SCAN_FIELD_IN_OUT",
        AuxField::Agent => "SCAN_FIELD_AGENT",
        AuxField::Manager => "SCAN_FIELD_MANAGER",
        AuxField::OtherEquip => "SCAN_FIELD_OTHER_EQUIP",
    }
}

impl ScannerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `SUBMIT_*`                  | see [`SubmitConfig::from_env`] |
    /// | `RESCAN_SUPPRESS_WINDOW_MS` | `0`     |
    /// | `SCAN_AUTO_SUBMIT`          | `true`  |
    /// | `SCAN_FIELD_IN_OUT`         | unset   |
    /// | `SCAN_FIELD_AGENT`          | unset   |
    /// | `SCAN_FIELD_MANAGER`        | unset   |
    /// | `SCAN_FIELD_OTHER_EQUIP`    | unset   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let submit = SubmitConfig::from_lookup(&lookup)?;

        let window_ms = match lookup("RESCAN_SUPPRESS_WINDOW_MS") {
            Some(v) if v.trim() == "0" => 0,
            Some(v) => parse_positive("RESCAN_SUPPRESS_WINDOW_MS", &v)?,
            None => 0,
        };

        let auto_submit = lookup("SCAN_AUTO_SUBMIT")
            .map(|v| parse_bool("SCAN_AUTO_SUBMIT", &v))
            .transpose()?
            .unwrap_or(true);

        let form_defaults = AuxField::ALL
            .into_iter()
            .filter_map(|field| lookup(field_env_key(field)).map(|value| (field, value)))
            .collect();

        Ok(Self {
            submit,
            rescan: RescanPolicy::new(Duration::from_millis(window_ms as u64)),
            auto_submit,
            form_defaults,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ScannerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScannerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("SUBMIT_ENDPOINT_URL", "http://localhost/")]).unwrap();
        assert!(!config.rescan.is_enabled());
        assert!(config.auto_submit);
        assert!(config.form_defaults.is_empty());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("SUBMIT_ENDPOINT_URL", "http://localhost/"),
            ("RESCAN_SUPPRESS_WINDOW_MS", "1500"),
            ("SCAN_AUTO_SUBMIT", "false"),
            ("SCAN_FIELD_AGENT", "Bob"),
            ("SCAN_FIELD_OTHER_EQUIP", "ladder"),
        ])
        .unwrap();
        assert_eq!(config.rescan.window, Duration::from_millis(1500));
        assert!(!config.auto_submit);
        assert_eq!(config.form_defaults.get(&AuxField::Agent).map(String::as_str), Some("Bob"));
        assert_eq!(
            config.form_defaults.get(&AuxField::OtherEquip).map(String::as_str),
            Some("ladder")
        );
    }

    #[test]
    fn submit_errors_propagate() {
        assert_matches!(load(&[]), Err(ConfigError::Missing("SUBMIT_ENDPOINT_URL")));
    }

    #[test]
    fn bad_window_is_rejected() {
        assert_matches!(
            load(&[
                ("SUBMIT_ENDPOINT_URL", "http://localhost/"),
                ("RESCAN_SUPPRESS_WINDOW_MS", "-5"),
            ]),
            Err(ConfigError::Invalid { key: "RESCAN_SUPPRESS_WINDOW_MS", .. })
        );
    }
}
