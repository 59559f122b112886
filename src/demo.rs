// Demo mode: an in-process pedal session service
//
// Lets the panel run without hardware or a session server. The demo pedal
// keeps its state in memory and serves the same endpoints the real pedal
// exposes, with the same failure codes:
// - one pre-existing remote session ("JAMS") hosted by someone else
// - a local loop store that survives joining and leaving sessions
// - a record toggle that appends a new loop each time recording stops
//
// Run with: SLPANEL_DEMO=1 cargo run --release   (or `slpanel --demo`)

use crate::service::{
    Ack, FailureCode, JoinSessionRequest, LoopRequest, NewSessionRequest, ServiceError,
    ServiceResult, SessionSnapshot,
};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Id of the session hosted by another pedal
pub const REMOTE_SESSION_ID: &str = "JAMS";

/// Members already in the remote session
const REMOTE_MEMBERS: [&str; 2] = ["ash", "matt"];

/// Session capacity, including the local pedal
const MAX_SESSION_MEMBERS: usize = 4;

#[derive(Debug, Clone)]
struct DemoSession {
    id: String,
    owner: bool,
    members: Vec<String>,
}

/// In-memory model of a pedal and the session server behind it
#[derive(Debug, Clone)]
pub struct DemoPedal {
    session: Option<DemoSession>,
    pub(crate) remote_members: Vec<String>,
    loops: BTreeSet<u32>,
    playing: Option<u32>,
    recording: bool,
    sessions_created: u32,
    /// When set, the server refuses to host new sessions
    pub server_full: bool,
}

impl Default for DemoPedal {
    fn default() -> Self {
        Self {
            session: None,
            remote_members: REMOTE_MEMBERS.iter().map(|m| m.to_string()).collect(),
            loops: BTreeSet::new(),
            playing: None,
            recording: false,
            sessions_created: 0,
            server_full: false,
        }
    }
}

fn reject(status: StatusCode, code: FailureCode) -> ServiceError {
    ServiceError::rejected(status.as_u16(), code)
}

fn generic(status: StatusCode, code: &str) -> ServiceError {
    reject(status, FailureCode::Other(code.to_string()))
}

impl DemoPedal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pedal with a couple of loops already recorded
    pub fn seeded() -> Self {
        let mut pedal = Self::new();
        pedal.loops.extend([1, 2]);
        pedal
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match &self.session {
            Some(session) => SessionSnapshot::online(session.id.clone(), session.owner),
            None => SessionSnapshot::offline(),
        }
    }

    pub fn members(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| s.members.clone())
            .unwrap_or_default()
    }

    pub fn loops(&self) -> Vec<u32> {
        self.loops.iter().copied().collect()
    }

    #[cfg(test)]
    pub fn playing(&self) -> Option<u32> {
        self.playing
    }

    pub fn new_session(&mut self, nickname: &str) -> ServiceResult<Ack> {
        if self.session.is_some() {
            return Err(reject(StatusCode::CONFLICT, FailureCode::AlreadyInSession));
        }
        if self.server_full {
            return Err(reject(
                StatusCode::SERVICE_UNAVAILABLE,
                FailureCode::ServerFull,
            ));
        }

        self.sessions_created += 1;
        let id = format!("S{:03}", self.sessions_created % 1000);
        self.session = Some(DemoSession {
            id: id.clone(),
            owner: true,
            members: vec![nickname.to_string()],
        });
        Ok(Ack::with_message(format!("Created session {}", id)))
    }

    pub fn join_session(&mut self, session_id: &str, nickname: &str) -> ServiceResult<Ack> {
        if self.session.is_some() {
            return Err(reject(StatusCode::CONFLICT, FailureCode::AlreadyInSession));
        }
        if session_id != REMOTE_SESSION_ID {
            return Err(reject(StatusCode::NOT_FOUND, FailureCode::NotFound));
        }
        if self.remote_members.len() + 1 > MAX_SESSION_MEMBERS {
            return Err(reject(StatusCode::CONFLICT, FailureCode::Full));
        }
        if self.remote_members.iter().any(|m| m == nickname) {
            return Err(reject(StatusCode::CONFLICT, FailureCode::NicknameCollision));
        }

        let mut members = self.remote_members.clone();
        members.push(nickname.to_string());
        self.session = Some(DemoSession {
            id: REMOTE_SESSION_ID.to_string(),
            owner: false,
            members,
        });
        Ok(Ack::with_message(format!("Joined session {}", session_id)))
    }

    pub fn end_session(&mut self) -> ServiceResult<Ack> {
        match &self.session {
            Some(session) if session.owner => {
                self.session = None;
                Ok(Ack::with_message("Session ended"))
            }
            _ => Err(reject(StatusCode::FORBIDDEN, FailureCode::UnableToEnd)),
        }
    }

    pub fn leave_session(&mut self) -> ServiceResult<Ack> {
        if self.session.take().is_none() {
            return Err(reject(StatusCode::CONFLICT, FailureCode::UnableToLeave));
        }
        Ok(Ack::with_message("Left session"))
    }

    pub fn start_playback(&mut self, loop_index: u32) -> ServiceResult<Ack> {
        if self.recording {
            return Err(generic(StatusCode::CONFLICT, "recording"));
        }
        if !self.loops.contains(&loop_index) {
            return Err(reject(StatusCode::NOT_FOUND, FailureCode::NotFound));
        }
        self.playing = Some(loop_index);
        Ok(Ack::default())
    }

    pub fn stop_playback(&mut self) -> ServiceResult<Ack> {
        if self.playing.take().is_none() {
            return Err(generic(StatusCode::CONFLICT, "not-playing"));
        }
        Ok(Ack::default())
    }

    pub fn remove_loop(&mut self, loop_index: u32) -> ServiceResult<Ack> {
        if !self.loops.remove(&loop_index) {
            return Err(reject(StatusCode::NOT_FOUND, FailureCode::NotFound));
        }
        if self.playing == Some(loop_index) {
            self.playing = None;
        }
        Ok(Ack::default())
    }

    pub fn toggle_recording(&mut self) -> ServiceResult<Ack> {
        if self.recording {
            self.recording = false;
            let index = self.loops.last().map_or(1, |last| last + 1);
            self.loops.insert(index);
            return Ok(Ack::with_message("Loop recorded."));
        }
        if self.playing.is_some() {
            return Err(generic(StatusCode::CONFLICT, "playing"));
        }
        self.recording = true;
        Ok(Ack::with_message("Recording loop..."))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP surface
// ─────────────────────────────────────────────────────────────────────────────

type SharedPedal = Arc<Mutex<DemoPedal>>;

type HandlerError = (StatusCode, Json<String>);

fn into_response_error(err: ServiceError) -> HandlerError {
    match err {
        ServiceError::Rejected { status, code } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
            Json(code.as_str().to_string()),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(other.to_string()),
        ),
    }
}

/// Run `f` against the locked pedal, mapping failures to HTTP errors
fn with_pedal<T>(
    pedal: &SharedPedal,
    f: impl FnOnce(&mut DemoPedal) -> ServiceResult<T>,
) -> Result<T, HandlerError> {
    let mut pedal = pedal.lock().map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json("pedal state poisoned".to_string()),
        )
    })?;
    f(&mut *pedal).map_err(into_response_error)
}

fn ack_json(ack: Ack) -> Json<Option<String>> {
    Json(ack.message)
}

async fn get_session(
    State(pedal): State<SharedPedal>,
) -> Result<Json<SessionSnapshot>, HandlerError> {
    with_pedal(&pedal, |p| Ok(p.snapshot())).map(Json)
}

async fn get_members(State(pedal): State<SharedPedal>) -> Result<Json<Vec<String>>, HandlerError> {
    with_pedal(&pedal, |p| Ok(p.members())).map(Json)
}

async fn get_loops(State(pedal): State<SharedPedal>) -> Result<Json<Vec<u32>>, HandlerError> {
    with_pedal(&pedal, |p| Ok(p.loops())).map(Json)
}

async fn new_session(
    State(pedal): State<SharedPedal>,
    Json(request): Json<NewSessionRequest>,
) -> Result<Json<Option<String>>, HandlerError> {
    with_pedal(&pedal, |p| p.new_session(&request.nickname)).map(ack_json)
}

async fn join_session(
    State(pedal): State<SharedPedal>,
    Json(request): Json<JoinSessionRequest>,
) -> Result<Json<Option<String>>, HandlerError> {
    with_pedal(&pedal, |p| {
        p.join_session(&request.session_id, &request.nickname)
    })
    .map(ack_json)
}

async fn end_session(
    State(pedal): State<SharedPedal>,
) -> Result<Json<Option<String>>, HandlerError> {
    with_pedal(&pedal, DemoPedal::end_session).map(ack_json)
}

async fn leave_session(
    State(pedal): State<SharedPedal>,
) -> Result<Json<Option<String>>, HandlerError> {
    with_pedal(&pedal, DemoPedal::leave_session).map(ack_json)
}

async fn start_playback(
    State(pedal): State<SharedPedal>,
    Json(request): Json<LoopRequest>,
) -> Result<Json<Option<String>>, HandlerError> {
    with_pedal(&pedal, |p| p.start_playback(request.loop_index)).map(ack_json)
}

async fn stop_playback(
    State(pedal): State<SharedPedal>,
) -> Result<Json<Option<String>>, HandlerError> {
    with_pedal(&pedal, DemoPedal::stop_playback).map(ack_json)
}

async fn remove_loop(
    State(pedal): State<SharedPedal>,
    Json(request): Json<LoopRequest>,
) -> Result<Json<Option<String>>, HandlerError> {
    with_pedal(&pedal, |p| p.remove_loop(request.loop_index)).map(ack_json)
}

async fn toggle_recording(
    State(pedal): State<SharedPedal>,
) -> Result<Json<Option<String>>, HandlerError> {
    with_pedal(&pedal, DemoPedal::toggle_recording).map(ack_json)
}

fn router(pedal: SharedPedal) -> Router {
    Router::new()
        .route("/getsession", get(get_session))
        .route("/getmembers", get(get_members))
        .route("/getloops", get(get_loops))
        .route("/newsession", post(new_session))
        .route("/joinsession", post(join_session))
        .route("/endsession", post(end_session))
        .route("/leavesession", post(leave_session))
        .route("/startplayback", post(start_playback))
        .route("/stopplayback", post(stop_playback))
        .route("/removeloop", post(remove_loop))
        .route("/toggleloop", post(toggle_recording))
        .with_state(pedal)
}

/// Handle to a running demo pedal server
pub struct DemoServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl DemoServer {
    /// Base URL the panel should poll
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Signal graceful shutdown and wait for the server task
    pub async fn shutdown(self) {
        // If the send fails, the server has already stopped
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

/// Start an empty demo pedal on `bind`
#[cfg(test)]
pub async fn spawn(bind: &str) -> Result<DemoServer> {
    spawn_with(bind, DemoPedal::new()).await
}

/// Start a demo pedal server with the given initial state
pub async fn spawn_with(bind: &str, pedal: DemoPedal) -> Result<DemoServer> {
    let listener = TcpListener::bind(bind)
        .await
        .context("Failed to bind demo pedal")?;
    let addr = listener
        .local_addr()
        .context("Failed to read demo pedal address")?;

    let app = router(Arc::new(Mutex::new(pedal)));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            })
            .await;
        if let Err(e) = result {
            tracing::error!("Demo pedal server error: {}", e);
        }
    });

    tracing::info!("Demo pedal listening on {}", addr);
    Ok(DemoServer {
        addr,
        shutdown_tx,
        handle,
    })
}
