//! Envelope types for the request leg.

use serde::{Deserialize, Serialize};

use crate::config::AddressRecord;
use crate::error::{JobError, ProtocolError};
use crate::job::Job;

/// Discriminator carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    JobRequest,
    RegisterSatellite,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::JobRequest => write!(f, "JOB_REQUEST"),
            MessageKind::RegisterSatellite => write!(f, "REGISTER_SATELLITE"),
        }
    }
}

/// A tagged request. The content type is fixed by the kind, so a decoded
/// envelope always carries a well-typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Envelope {
    JobRequest(Job),
    /// Announces a satellite to a manager. Worker nodes do not serve it.
    RegisterSatellite(AddressRecord),
}

impl Envelope {
    pub fn job_request(job: Job) -> Self {
        Envelope::JobRequest(job)
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Envelope::JobRequest(_) => MessageKind::JobRequest,
            Envelope::RegisterSatellite(_) => MessageKind::RegisterSatellite,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
    }

    /// Decode an envelope body. Unknown kinds and content that does not match
    /// the kind are both [`ProtocolError::MalformedEnvelope`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
    }

    /// Extract the job, rejecting every other kind.
    pub fn into_job(self) -> Result<Job, JobError> {
        match self {
            Envelope::JobRequest(job) => Ok(job),
            other => Err(JobError::UnsupportedMessageKind {
                kind: other.kind().to_string(),
            }),
        }
    }
}

/// Bare error value written in place of a result when explicit error
/// replies are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

impl ErrorReply {
    pub fn from_job_error(err: &JobError) -> Self {
        Self {
            error: ErrorDetail {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Recognize an error reply among bare result values.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        value.get("error")?;
        serde_json::from_value(value.clone()).ok()
    }
}
