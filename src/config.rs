use std::path::PathBuf;

use crate::api::DEFAULT_API_URL;

const DEFAULT_DB_NAME: &str = "rapid_revise.db";
const APP_DIR: &str = "rapid-revise";

pub const DB_ENV: &str = "RAPID_REVISE_DB";
pub const API_URL_ENV: &str = "RAPID_REVISE_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub api_url: String,
}

impl Config {
    /// Resolve from the environment. `api_url_flag` wins over `RAPID_REVISE_API_URL`.
    pub fn from_env(api_url_flag: Option<&str>) -> Self {
        Self {
            db_path: resolve_db_path(std::env::var(DB_ENV).ok()),
            api_url: resolve_api_url(api_url_flag, std::env::var(API_URL_ENV).ok()),
        }
    }
}

fn resolve_db_path(env_path: Option<String>) -> PathBuf {
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn resolve_api_url(flag: Option<&str>, env_url: Option<String>) -> String {
    let present = |u: &String| !u.trim().is_empty();
    flag.map(str::to_string)
        .filter(present)
        .or_else(|| env_url.filter(present))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod db_path_tests {
        use super::*;

        #[test]
        fn env_path_wins() {
            let path = resolve_db_path(Some("/tmp/test_rapid_revise.db".to_string()));
            assert_eq!(path.to_str().unwrap(), "/tmp/test_rapid_revise.db");
        }

        #[test]
        fn default_is_under_app_dir() {
            let path = resolve_db_path(None);
            let path_str = path.to_str().unwrap();
            assert!(path_str.ends_with("rapid_revise.db"));
            assert!(path_str.contains("rapid-revise"));
        }

        #[test]
        fn empty_env_uses_default() {
            let path = resolve_db_path(Some(String::new()));
            assert!(path.ends_with("rapid-revise/rapid_revise.db"));
        }
    }

    mod api_url_tests {
        use super::*;

        #[test]
        fn defaults_to_localhost() {
            assert_eq!(resolve_api_url(None, None), "http://localhost:5000");
        }

        #[test]
        fn env_overrides_default() {
            let url = resolve_api_url(None, Some("https://api.example.com".to_string()));
            assert_eq!(url, "https://api.example.com");
        }

        #[test]
        fn flag_overrides_env() {
            let url = resolve_api_url(
                Some("http://127.0.0.1:8080"),
                Some("https://api.example.com".to_string()),
            );
            assert_eq!(url, "http://127.0.0.1:8080");
        }

        #[test]
        fn blank_flag_falls_back_to_env() {
            let url = resolve_api_url(Some("  "), Some("https://api.example.com".to_string()));
            assert_eq!(url, "https://api.example.com");
        }

        #[test]
        fn blank_flag_and_env_use_default() {
            assert_eq!(
                resolve_api_url(Some(""), Some(" ".to_string())),
                "http://localhost:5000"
            );
        }
    }
}
