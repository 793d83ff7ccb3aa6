use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Only PDF files can be uploaded, got {path}")]
    NotPdf { path: PathBuf },

    #[error("Not logged in. Run `rapid-revise auth login --token <TOKEN>` first")]
    NotAuthenticated,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ureq::Error> for Error {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(status, response) => {
                let message = response
                    .into_string()
                    .ok()
                    .and_then(|body| api_message(&body))
                    .unwrap_or_else(|| "request rejected".to_string());
                Error::Api { status, message }
            }
            other => Error::Http(Box::new(other)),
        }
    }
}

// Backend error bodies look like {"message": "..."} or {"error": "..."}.
fn api_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

pub type Result<T> = std::result::Result<T, Error>;
