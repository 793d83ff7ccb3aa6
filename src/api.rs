//! Blocking client for the Rapid Revise backend.
//!
//! Every request carries the stored session cookie when there is one. Non-2xx
//! responses surface as `Error::Api`.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Community, User};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

const SESSION_COOKIE: &str = "session";

pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    session: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommunityList {
    #[serde(default)]
    community: Vec<Community>,
}

/// Fields of the structured plan generation form.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExamPrepRequest {
    pub subject: String,
    pub board: String,
    pub class_level: String,
    pub department: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_session(&mut self, token: Option<String>) {
        self.session = token;
    }

    /// Where the user signs in with Google. The backend sets the session cookie afterwards.
    pub fn login_url(&self) -> String {
        self.url("/auth/google/login")
    }

    pub fn list_communities(&self) -> Result<Vec<Community>> {
        let list: CommunityList = self.get_json("/community/")?;
        Ok(list.community)
    }

    pub fn get_community(&self, id: &str) -> Result<Community> {
        let value: Value = self.get_json(&community_path(id)?)?;
        unwrap_community(value)
    }

    pub fn create_community(&self, name: &str, description: &str) -> Result<Community> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("community name is required".to_string()));
        }
        let response = self
            .request("POST", "/community/")
            .set("Content-Type", "application/json")
            .send_json(json!({ "name": name, "description": description }))?;
        unwrap_community(response.into_json()?)
    }

    /// `Ok(false)` when the backend refuses the vote.
    pub fn vote_community(&self, id: &str, up: bool) -> Result<bool> {
        let path = format!("{}/vote", community_path(id)?);
        let vote = if up { 1 } else { -1 };
        let result = self
            .request("PUT", &path)
            .set("Content-Type", "application/json")
            .send_json(json!({ "vote": vote }));

        match result {
            Ok(_) => Ok(true),
            Err(ureq::Error::Status(status, _)) => {
                warn!(%id, status, "vote rejected");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Upload a free-form prompt, optionally with a PDF syllabus.
    pub fn generate_from_prompt(&self, prompt: &str, file: Option<&Path>) -> Result<Value> {
        let attachment = match file {
            Some(path) => Some(read_pdf(path)?),
            None => None,
        };

        let boundary = format!("----rapid-revise-{:016x}", rand::random::<u64>());
        let body = multipart_body(
            &boundary,
            prompt,
            attachment.as_ref().map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
        );

        debug!(bytes = body.len(), "uploading prompt");
        let response = self
            .request("POST", "/study_plan/pdf")
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={}", boundary),
            )
            .send_bytes(&body)?;
        Ok(response.into_json()?)
    }

    pub fn generate_from_form(&self, form: &ExamPrepRequest) -> Result<Value> {
        let response = self
            .request("POST", "/examprep/")
            .set("Content-Type", "application/json")
            .send_json(form)?;
        Ok(response.into_json()?)
    }

    pub fn current_user(&self) -> Result<User> {
        if self.session.is_none() {
            return Err(Error::NotAuthenticated);
        }
        self.get_json("/user/me")
    }

    pub fn logout(&self) -> Result<()> {
        self.request("GET", "/auth/logout").call()?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = self.url(path);
        debug!(method, %url, "backend request");
        let request = self.agent.request(method, &url);
        match &self.session {
            Some(token) => request.set("Cookie", &cookie_header(token)),
            None => request,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request("GET", path).call()?;
        Ok(response.into_json()?)
    }
}

/// Tokens copied from the browser may already be a full `name=value` pair.
fn cookie_header(token: &str) -> String {
    if token.contains('=') {
        token.to_string()
    } else {
        format!("{}={}", SESSION_COOKIE, token)
    }
}

// Ids go straight into the path, so only plain id characters are allowed.
fn community_path(id: &str) -> Result<String> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(Error::InvalidInput(format!("invalid community id: {:?}", id)));
    }
    Ok(format!("/community/{}", id))
}

// Single objects come back bare or wrapped as {"community": {...}}.
fn unwrap_community(value: Value) -> Result<Community> {
    let inner = match value {
        Value::Object(mut map) if map.get("community").is_some_and(Value::is_object) => {
            map.remove("community").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

fn read_pdf(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = std::fs::read(path)?;
    if !bytes.starts_with(b"%PDF") {
        return Err(Error::NotPdf {
            path: path.to_path_buf(),
        });
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());
    Ok((name, bytes))
}

fn multipart_body(boundary: &str, prompt: &str, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"prompt\"\r\n\r\n");
    body.extend_from_slice(prompt.as_bytes());
    body.extend_from_slice(b"\r\n");

    if let Some((name, bytes)) = file {
        let name = name.replace('"', "");
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
