use std::env;
use std::fs;
use std::path::Path;

use pipeshell_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::CommandResult;

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let llm_api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let entries = [
        ("crm.base_url", config.crm.base_url.clone(), &["PIPESHELL_CRM_BASE_URL"][..]),
        (
            "crm.api_token",
            redact_secret(config.crm.api_token.expose_secret()),
            &["PIPESHELL_CRM_API_TOKEN"][..],
        ),
        ("llm.provider", format!("{:?}", config.llm.provider), &["PIPESHELL_LLM_PROVIDER"][..]),
        ("llm.api_key", llm_api_key, &["PIPESHELL_LLM_API_KEY"][..]),
        (
            "llm.base_url",
            config.llm.effective_base_url().to_string(),
            &["PIPESHELL_LLM_BASE_URL"][..],
        ),
        ("llm.model", config.llm.model.clone(), &["PIPESHELL_LLM_MODEL"][..]),
        (
            "llm.temperature",
            config.llm.temperature.to_string(),
            &["PIPESHELL_LLM_TEMPERATURE"][..],
        ),
        (
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["PIPESHELL_LLM_TIMEOUT_SECS"][..],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["PIPESHELL_LOGGING_LEVEL", "PIPESHELL_LOG_LEVEL"][..],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["PIPESHELL_LOGGING_FORMAT", "PIPESHELL_LOG_FORMAT"][..],
        ),
    ];

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_keys) in entries {
        lines.push(render_line(key_path, &value, source(key_path, env_keys)));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        let set = env::var(env_key).map(|value| !value.trim().is_empty()).unwrap_or(false);
        if set {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps at most a short provider prefix (`gsk_`, `sk-`) visible.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let prefix = trimmed
        .find(['-', '_'])
        .filter(|index| *index > 0 && *index <= 4)
        .map(|index| &trimmed[..=index]);
    match prefix {
        Some(prefix) => format!("{prefix}***"),
        None => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_secret};

    #[test]
    fn redaction_keeps_only_short_prefixes() {
        assert_eq!(redact_secret("gsk_abcdef"), "gsk_***");
        assert_eq!(redact_secret("sk-abcdef"), "sk-***");
        assert_eq!(redact_secret("0123456789abcdef"), "<redacted>");
        assert_eq!(redact_secret("   "), "<empty>");
    }

    #[test]
    fn dotted_paths_are_resolved_in_toml() {
        let doc = "[llm]\nmodel = \"llama3\"\n".parse::<toml::Value>().expect("valid toml");

        assert!(contains_path(&doc, "llm.model"));
        assert!(!contains_path(&doc, "llm.api_key"));
        assert!(!contains_path(&doc, "crm.base_url"));
    }
}
