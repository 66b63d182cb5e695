/*
 * Client side of the remote classification service. The service receives a
 * folder path and a natural-language instruction, asks a language model where
 * each file belongs, and answers with a list of proposed relocations. Accepted
 * proposals are then applied one at a time through its `/commit` endpoint.
 *
 * `ClassificationServiceOperations` is the seam the presenter depends on;
 * `HttpClassificationService` implements it with a blocking HTTP client; the
 * presenter runs classification on a worker thread.
 */
use super::proposal_tree::{CommitRequest, ProposedChange};
use super::settings::{ProcessAction, Settings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const BATCH_ENDPOINT: &str = "batch";
const COMMIT_ENDPOINT: &str = "commit";
const MAX_DETAIL_LEN: usize = 200;

#[derive(Debug)]
pub enum ServiceError {
    Transport(reqwest::Error),
    Status { status: u16, detail: String },
    Decode(serde_json::Error),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Transport(err)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Decode(err)
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Transport(e) => write!(f, "Could not reach the classification service: {e}"),
            ServiceError::Status { status, detail } if detail.is_empty() => {
                write!(f, "Classification service answered with status {status}")
            }
            ServiceError::Status { status, detail } => {
                write!(f, "Classification service answered with status {status}: {detail}")
            }
            ServiceError::Decode(e) => write!(f, "Unexpected response from the classification service: {e}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Transport(e) => Some(e),
            ServiceError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/*
 * The `/batch` payload. `max_tree_depth` travels as a string because that is
 * how the service declares it.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub path: String,
    pub model: String,
    pub instruction: String,
    pub max_tree_depth: String,
    pub file_format: String,
    pub groq_api_key: String,
    pub process_action: ProcessAction,
}

impl BatchRequest {
    pub fn from_settings(settings: &Settings) -> Self {
        BatchRequest {
            path: settings.file_path.clone(),
            model: settings.model.clone(),
            instruction: settings.instruction.clone(),
            max_tree_depth: settings.max_tree_depth.to_string(),
            file_format: settings.current_file_format().unwrap_or_default().to_string(),
            groq_api_key: settings.groq_api_key.clone(),
            process_action: settings.process_action,
        }
    }
}

#[derive(Debug)]
pub struct CommitOutcome {
    pub request: CommitRequest,
    pub result: Result<()>,
}

/*
 * Per-item results of committing a set of accepted proposals.
 */
#[derive(Debug, Default)]
pub struct CommitReport {
    pub outcomes: Vec<CommitOutcome>,
}

impl CommitReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CommitOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

pub trait ClassificationServiceOperations: Send + Sync {
    fn classify(&self, request: &BatchRequest) -> Result<Vec<ProposedChange>>;

    fn commit(&self, request: &CommitRequest) -> Result<()>;

    /*
     * Commits every request in order. A failure does not stop the batch; each
     * request gets its own outcome in the report.
     */
    fn commit_all(&self, requests: &[CommitRequest]) -> CommitReport {
        let outcomes = requests
            .iter()
            .map(|request| {
                let result = self.commit(request);
                if let Err(e) = &result {
                    log::warn!(
                        "ClassificationService: Commit of {} -> {} failed: {e}",
                        request.src_path,
                        request.dst_path
                    );
                }
                CommitOutcome {
                    request: request.clone(),
                    result,
                }
            })
            .collect();
        CommitReport { outcomes }
    }
}

pub struct HttpClassificationService {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpClassificationService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(HttpClassificationService {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url)
    }

    fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<String> {
        let url = self.endpoint(endpoint);
        log::debug!("ClassificationService: POST {url}");
        let response = self.client.post(&url).json(body).send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            log::warn!("ClassificationService: POST {url} returned {status}");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }
        Ok(text)
    }
}

impl ClassificationServiceOperations for HttpClassificationService {
    fn classify(&self, request: &BatchRequest) -> Result<Vec<ProposedChange>> {
        log::info!(
            "ClassificationService: Classifying {:?} with model '{}'",
            request.path,
            request.model
        );
        let body = self.post(BATCH_ENDPOINT, request)?;
        let changes: Vec<ProposedChange> = serde_json::from_str(&body)?;
        log::info!("ClassificationService: Received {} proposals", changes.len());
        Ok(changes)
    }

    fn commit(&self, request: &CommitRequest) -> Result<()> {
        self.post(COMMIT_ENDPOINT, request).map(|_| ())
    }
}

/*
 * Pulls a readable reason out of an error body. The service reports errors as
 * `{"detail": "..."}`; anything else is passed through, shortened.
 */
fn error_detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    };
    detail.chars().take(MAX_DETAIL_LEN).collect()
}
