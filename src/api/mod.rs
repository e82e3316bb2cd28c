pub mod envelope;
pub mod error;
pub mod models;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;

pub use envelope::{Envelope, Generated, Updated, Uploaded};
pub use error::ApiError;
pub use models::{ActionItem, Health, Insight, Priority, Transcript, TranscriptContent};

use models::{lenient_entries, GenerateBody, GenerateRequest, UpdateActionRequest, UploadBody};

const UPLOADED: &str = "File uploaded successfully";
const UPLOAD_FAILED: &str = "Failed to upload transcript";
const GENERATED: &str = "Meeting data generated successfully";
const GENERATE_FAILED: &str = "Failed to generate meeting data";
const INSIGHT_FAILED: &str = "Failed to fetch meeting data";
const UPDATED: &str = "Action item updated successfully";
const UPDATE_FAILED: &str = "Failed to update action item";
const TRANSCRIPT_FAILED: &str = "Failed to fetch transcript";
const HEALTH_FAILED: &str = "Backend health check failed";

const JSON: &str = "application/json";

/// Blocking client for the Transinia backend.
///
/// Every operation issues exactly one request and never returns an error:
/// single-resource calls resolve to an [`Envelope`], list calls fall back to
/// an empty `Vec`. Failures are logged at `warn`.
pub struct ApiClient {
    base_url: Url,
    client: Client,
}

impl ApiClient {
    /// Fails only if the base URL is unusable or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Self::from_parts(&config.base_url, client)
    }

    /// Use a preconfigured HTTP client (proxy, TLS or timeout settings the
    /// caller owns).
    pub fn from_parts(base_url: &str, client: Client) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url} ({e})")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Upload a transcript file from disk.
    pub fn upload_transcript(&self, path: &Path) -> Envelope<Uploaded> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                let err = ApiError::File {
                    path: path.to_path_buf(),
                    source,
                };
                return settle("upload_transcript", UPLOAD_FAILED, Err(err));
            }
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("transcript.txt");
        self.upload_transcript_bytes(file_name, bytes)
    }

    /// Upload transcript content under the given file name. The backend
    /// accepts `.txt`, `.md` and `.docx` names.
    pub fn upload_transcript_bytes(&self, file_name: &str, bytes: Vec<u8>) -> Envelope<Uploaded> {
        let result = self.try_upload(file_name, bytes);
        if let Ok(ref uploaded) = result {
            info!(file = file_name, file_id = ?uploaded.file_id, "Uploaded transcript");
        }
        settle("upload_transcript", UPLOAD_FAILED, result)
    }

    fn try_upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<Uploaded, ApiError> {
        let url = self.endpoint(&["api", "transcripts", "upload"])?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type_for(file_name))?;
        let form = Form::new().part("file", part);
        debug!(%url, file = file_name, "POST multipart");

        let body: UploadBody = decode(&self.send(self.client.post(url).multipart(form))?)?;
        Ok(Uploaded {
            message: UPLOADED.to_string(),
            file_id: body.file_id,
        })
    }

    /// List uploaded transcripts. Empty on any failure.
    pub fn get_transcripts(&self) -> Vec<Transcript> {
        let result = self.get_list(&["api", "transcripts", "list"], "transcripts");
        settle_list("get_transcripts", result)
    }

    /// Fetch the raw text of one uploaded transcript.
    pub fn get_transcript(&self, transcript_id: &str) -> Envelope<TranscriptContent> {
        let result = self.get_json(&["api", "transcripts", transcript_id]);
        settle("get_transcript", TRANSCRIPT_FAILED, result)
    }

    /// Ask the backend to analyse a transcript. An earlier analysis is
    /// reported as success with `already_processed` set.
    pub fn generate_insights(&self, transcript_id: &str) -> Envelope<Generated> {
        let result = self.try_generate(transcript_id);
        if let Ok(ref generated) = result {
            info!(
                transcript = transcript_id,
                meeting_data_id = ?generated.meeting_data_id,
                already_processed = generated.already_processed,
                "Generated insights"
            );
        }
        settle("generate_insights", GENERATE_FAILED, result)
    }

    fn try_generate(&self, transcript_id: &str) -> Result<Generated, ApiError> {
        let url = self.endpoint(&["api", "meeting-data", "generate"])?;
        debug!(%url, transcript = transcript_id, "POST");
        let request = self
            .client
            .post(url)
            .header(ACCEPT, JSON)
            .json(&GenerateRequest { transcript_id });

        let body: GenerateBody = decode(&self.send(request)?)?;
        Ok(Generated {
            message: body.message.unwrap_or_else(|| GENERATED.to_string()),
            meeting_data_id: body.meeting_data_id,
            already_processed: body.already_processed.unwrap_or(false),
        })
    }

    /// Fetch one insight by id.
    pub fn get_insight(&self, insight_id: &str) -> Envelope<Insight> {
        let result = self.get_json(&["api", "meeting-data", insight_id]);
        settle("get_insight", INSIGHT_FAILED, result)
    }

    /// List all insights. Empty on any failure.
    pub fn get_meetings(&self) -> Vec<Insight> {
        let result = self.get_list(&["api", "meeting-data", "list"], "meetingData");
        settle_list("get_meetings", result)
    }

    /// High-priority action items across all meetings, filtered by the
    /// backend. Empty on any failure.
    pub fn get_high_priority_tasks(&self) -> Vec<ActionItem> {
        let result = self.get_list(&["api", "tasks", "high-priority"], "tasks");
        settle_list("get_high_priority_tasks", result)
    }

    /// Persist an action item's completion flag. The updated entity is not
    /// returned; re-fetch the insight for fresh state.
    pub fn update_action_item(
        &self,
        insight_id: &str,
        action_item_id: &str,
        completed: bool,
    ) -> Envelope<Updated> {
        let result = self.try_update(insight_id, action_item_id, completed);
        if result.is_ok() {
            info!(
                insight = insight_id,
                action_item = action_item_id,
                completed,
                "Updated action item"
            );
        }
        settle("update_action_item", UPDATE_FAILED, result)
    }

    fn try_update(
        &self,
        insight_id: &str,
        action_item_id: &str,
        completed: bool,
    ) -> Result<Updated, ApiError> {
        let url = self.endpoint(&["api", "meeting-data", insight_id, "actions", action_item_id])?;
        debug!(%url, completed, "PATCH");
        let request = self
            .client
            .patch(url)
            .header(ACCEPT, JSON)
            .json(&UpdateActionRequest { completed });

        // Body is ignored unless it explicitly declares failure.
        let text = self.send(request)?;
        if let Ok(body) = serde_json::from_str::<serde_json::Value>(&text) {
            reject_declared_failure(&body)?;
        }
        Ok(Updated {
            message: UPDATED.to_string(),
        })
    }

    /// Backend liveness check.
    pub fn health(&self) -> Envelope<Health> {
        let result = self.get_json(&["health"]);
        settle("health", HEALTH_FAILED, result)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        // `extend` silently drops dot segments, which would change the route.
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ApiError::InvalidUrl(format!("unusable id {bad:?}")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        let text = self.send(self.client.get(url).header(ACCEPT, JSON))?;
        decode(&text)
    }

    /// Fetch the array under `key`. A missing key reads as empty; entries
    /// that do not decode are skipped individually.
    fn get_list<T: DeserializeOwned>(&self, segments: &[&str], key: &str) -> Result<Vec<T>, ApiError> {
        let mut body: serde_json::Value = self.get_json(segments)?;
        let items: Option<Vec<serde_json::Value>> = match body.get_mut(key) {
            Some(list) => serde_json::from_value(list.take())?,
            None => None,
        };
        Ok(lenient_entries(items.unwrap_or_default()))
    }

    /// Send the request and return the body of a 2xx response.
    fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let resp = request.send()?;
        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error::server_message(&text),
            });
        }
        Ok(text)
    }
}

/// Parse a 2xx body, honouring an explicit `"success": false`.
fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let body: serde_json::Value = serde_json::from_str(text)?;
    reject_declared_failure(&body)?;
    Ok(serde_json::from_value(body)?)
}

fn reject_declared_failure(body: &serde_json::Value) -> Result<(), ApiError> {
    if body.get("success").and_then(|s| s.as_bool()) == Some(false) {
        return Err(ApiError::Rejected {
            message: error::message_field(body).unwrap_or_default(),
        });
    }
    Ok(())
}

fn settle<T>(operation: &str, fallback: &str, result: Result<T, ApiError>) -> Envelope<T> {
    if let Err(ref err) = result {
        warn!(operation, error = %err, "Backend call failed");
    }
    Envelope::from_result(result, fallback)
}

fn settle_list<T>(operation: &str, result: Result<Vec<T>, ApiError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            warn!(operation, error = %err, "Backend call failed, returning empty list");
            Vec::new()
        }
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".md") || lower.ends_with(".markdown") {
        "text/markdown"
    } else if lower.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if lower.ends_with(".txt") {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}
