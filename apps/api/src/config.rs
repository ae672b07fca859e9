use std::path::Path;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Endpoint of the external document renderer service.
    pub renderer_url: String,
    pub system_prompt_path: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            renderer_url: std::env::var("RENDERER_URL")
                .unwrap_or_else(|_| "http://localhost:3457/render".to_string()),
            system_prompt_path: std::env::var("SYSTEM_PROMPT_PATH")
                .unwrap_or_else(|_| "prompt/system-prompt.md".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3456".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Loads the system instruction from disk, dropping the editor-facing header
/// above the first `---`. Called once at startup; the text is handed to the
/// coordinator as a value from then on.
pub fn load_system_prompt(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read system prompt at {}", path.display()))?;

    let prompt = match raw.split_once("---") {
        Some((_header, body)) => body.trim(),
        None => raw.trim(),
    };
    if prompt.is_empty() {
        bail!("System prompt at {} is empty", path.display());
    }
    Ok(prompt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_prompt(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_system_prompt_strips_header_before_separator() {
        let file = write_prompt("Interne notities voor redacteuren\n---\nJij bent een offerte-assistent.");
        let prompt = load_system_prompt(file.path()).unwrap();
        assert_eq!(prompt, "Jij bent een offerte-assistent.");
    }

    #[test]
    fn test_load_system_prompt_keeps_later_separators() {
        let file = write_prompt("header\n---\ndeel een\n---\ndeel twee");
        let prompt = load_system_prompt(file.path()).unwrap();
        assert_eq!(prompt, "deel een\n---\ndeel twee");
    }

    #[test]
    fn test_load_system_prompt_without_separator_uses_whole_file() {
        let file = write_prompt("  Jij bent een offerte-assistent.  ");
        let prompt = load_system_prompt(file.path()).unwrap();
        assert_eq!(prompt, "Jij bent een offerte-assistent.");
    }

    #[test]
    fn test_load_system_prompt_rejects_empty_prompt() {
        let file = write_prompt("alleen een header\n---\n   ");
        assert!(load_system_prompt(file.path()).is_err());
    }

    #[test]
    fn test_load_system_prompt_missing_file_is_an_error() {
        assert!(load_system_prompt("/nonexistent/prompt.md").is_err());
    }
}
