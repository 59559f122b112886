//! Session service boundary
//!
//! The pedal's session service owns the authoritative session, member and
//! loop state. The panel only ever talks to it through [`SessionService`],
//! which keeps the synchronizer testable without a network.

pub mod http;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Result type for session service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Latest session state reported by the service
///
/// `session_id == None` means the pedal is not in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: Option<String>,
    pub is_owner: bool,
}

impl SessionSnapshot {
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn online(session_id: impl Into<String>, is_owner: bool) -> Self {
        Self {
            session_id: Some(session_id.into()),
            is_owner,
        }
    }

    /// Whether the pedal is in a session
    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    /// Role label for display
    pub fn role(&self) -> &'static str {
        match (self.is_active(), self.is_owner) {
            (false, _) => "offline",
            (true, true) => "owner",
            (true, false) => "member",
        }
    }
}

/// Wire form of the session snapshot: `[sessionId | null, isOwner]`
impl<'de> Deserialize<'de> for SessionSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (session_id, is_owner) = <(Option<String>, bool)>::deserialize(deserializer)?;
        Ok(Self {
            session_id,
            is_owner,
        })
    }
}

impl Serialize for SessionSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (&self.session_id, self.is_owner).serialize(serializer)
    }
}

/// Opaque acknowledgement of a command
///
/// Some endpoints (the record toggle) answer with a human-readable string,
/// which is kept so it can be flashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

impl Ack {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Domain failure codes carried in rejected responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCode {
    AlreadyInSession,
    ServerFull,
    NotFound,
    Full,
    NicknameCollision,
    UnableToEnd,
    UnableToLeave,
    /// Anything the panel has no dedicated message for
    Other(String),
}

impl FailureCode {
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "already-in-session" => Self::AlreadyInSession,
            "server-full" => Self::ServerFull,
            "not-found" => Self::NotFound,
            "full" => Self::Full,
            "nickname-collision" => Self::NicknameCollision,
            "unable-to-end" => Self::UnableToEnd,
            "unable-to-leave" => Self::UnableToLeave,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AlreadyInSession => "already-in-session",
            Self::ServerFull => "server-full",
            Self::NotFound => "not-found",
            Self::Full => "full",
            Self::NicknameCollision => "nickname-collision",
            Self::UnableToEnd => "unable-to-end",
            Self::UnableToLeave => "unable-to-leave",
            Self::Other(code) => code,
        }
    }
}

/// Errors from the session service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached
    Network(String),
    /// The service answered with a non-success status
    Rejected { status: u16, code: FailureCode },
    /// The response body was not what the contract promises
    Decode(String),
}

impl ServiceError {
    pub fn rejected(status: u16, code: FailureCode) -> Self {
        Self::Rejected { status, code }
    }

    /// Failure code, when the service sent one
    pub fn code(&self) -> Option<&FailureCode> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Rejected { status, code } => {
                write!(f, "Rejected ({}): {}", status, code.as_str())
            }
            Self::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

// ─────────────────────────────────────────────────────────────────────────────
// Request payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionRequest {
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    pub session_id: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopRequest {
    pub loop_index: u32,
}

/// Failure body as sent by the service: `"code"` or `{"error": "code"}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum FailureBody {
    Code(String),
    Object { error: String },
}

impl FailureBody {
    /// Extract a failure code from a raw response body
    pub(crate) fn code_from(body: &str) -> FailureCode {
        match serde_json::from_str::<FailureBody>(body) {
            Ok(FailureBody::Code(code)) | Ok(FailureBody::Object { error: code }) => {
                FailureCode::parse(&code)
            }
            Err(_) => FailureCode::parse(body),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service trait
// ─────────────────────────────────────────────────────────────────────────────

/// The session service as seen by the panel
///
/// Calls are issued from spawned tasks, so every future must be `Send`.
pub trait SessionService: Send + Sync + 'static {
    fn get_session(&self) -> impl Future<Output = ServiceResult<SessionSnapshot>> + Send;

    fn get_members(&self) -> impl Future<Output = ServiceResult<Vec<String>>> + Send;

    fn get_loops(&self) -> impl Future<Output = ServiceResult<Vec<u32>>> + Send;

    fn new_session(&self, nickname: &str) -> impl Future<Output = ServiceResult<Ack>> + Send;

    fn join_session(
        &self,
        session_id: &str,
        nickname: &str,
    ) -> impl Future<Output = ServiceResult<Ack>> + Send;

    fn end_session(&self) -> impl Future<Output = ServiceResult<Ack>> + Send;

    fn leave_session(&self) -> impl Future<Output = ServiceResult<Ack>> + Send;

    fn start_playback(&self, loop_index: u32) -> impl Future<Output = ServiceResult<Ack>> + Send;

    fn stop_playback(&self) -> impl Future<Output = ServiceResult<Ack>> + Send;

    fn remove_loop(&self, loop_index: u32) -> impl Future<Output = ServiceResult<Ack>> + Send;

    fn toggle_recording(&self) -> impl Future<Output = ServiceResult<Ack>> + Send;
}
