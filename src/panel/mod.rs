//! Session control panel
//!
//! The panel is the single owner of the local copy of session, member and
//! loop state. It polls the session service, replaces its collections
//! wholesale with whatever comes back, derives what the two session buttons
//! do, and turns button submissions and list actions into service commands.
//!
//! All mutation happens in [`Panel::handle`], called from one event loop.
//! Requests run as spawned tasks and report back as [`PanelEvent`]s on the
//! panel's channel; once the loop has stopped reading, late completions land
//! in a closed channel and are dropped.

pub mod button;
pub mod lists;
pub mod timer;

#[cfg(test)]
pub(crate) mod tests;

use crate::flash::Flash;
use crate::service::{Ack, FailureCode, ServiceError, ServiceResult, SessionService, SessionSnapshot};
use button::{Activation, ButtonDescriptor, ButtonPair, ButtonSlot, SessionAction, Submission};
use lists::{Focus, LoopMemberList, PlaybackChange};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use timer::PollTimer;
use tokio::sync::mpsc;

/// Required length of a session id
pub const SESSION_ID_LEN: usize = 4;

/// Capacity of the panel event channel
pub const PANEL_EVENT_BUFFER: usize = 256;

/// A command sent to the session service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewSession { nickname: String },
    JoinSession { session_id: String, nickname: String },
    EndSession,
    LeaveSession,
    Playback(PlaybackChange),
    RemoveLoop { loop_index: u32 },
    ToggleRecording,
}

impl Command {
    async fn execute<S: SessionService>(&self, service: &S) -> ServiceResult<Ack> {
        match self {
            Command::NewSession { nickname } => service.new_session(nickname).await,
            Command::JoinSession {
                session_id,
                nickname,
            } => service.join_session(session_id, nickname).await,
            Command::EndSession => service.end_session().await,
            Command::LeaveSession => service.leave_session().await,
            Command::Playback(PlaybackChange::Start(loop_index)) => {
                service.start_playback(*loop_index).await
            }
            Command::Playback(PlaybackChange::Stop) => service.stop_playback().await,
            Command::RemoveLoop { loop_index } => service.remove_loop(*loop_index).await,
            Command::ToggleRecording => service.toggle_recording().await,
        }
    }

    /// Whether success changes the session and calls for an immediate refresh
    fn refreshes_session(&self) -> bool {
        matches!(
            self,
            Command::NewSession { .. }
                | Command::JoinSession { .. }
                | Command::EndSession
                | Command::LeaveSession
        )
    }

    fn success_message(&self, ack: &Ack) -> Option<String> {
        match self {
            Command::NewSession { .. } => Some(
                ack.message
                    .clone()
                    .unwrap_or_else(|| "Created session.".to_string()),
            ),
            Command::JoinSession { session_id, .. } => {
                Some(format!("Joined session {}.", session_id))
            }
            Command::EndSession => Some("Session ended.".to_string()),
            Command::LeaveSession => Some("Left session.".to_string()),
            Command::ToggleRecording => ack.message.clone(),
            Command::Playback(_) | Command::RemoveLoop { .. } => None,
        }
    }

    /// User-facing message for a failed command
    fn failure_message(&self, err: &ServiceError) -> String {
        let code = err.code();
        match self {
            Command::NewSession { .. } => match code {
                Some(FailureCode::AlreadyInSession) => {
                    "Pedal already in a session. Session not created.".to_string()
                }
                Some(FailureCode::ServerFull) => "Server full. Session not created.".to_string(),
                _ => "Server error. Session not created.".to_string(),
            },
            Command::JoinSession { session_id, nickname } => match code {
                Some(FailureCode::NotFound) => format!("Session {} not found.", session_id),
                Some(FailureCode::Full) => format!("Session {} is full.", session_id),
                Some(FailureCode::NicknameCollision) => format!(
                    "Nickname {} is already taken in session {}.",
                    nickname, session_id
                ),
                Some(FailureCode::AlreadyInSession) => format!(
                    "Pedal already in a session. Session {} not joined.",
                    session_id
                ),
                _ => format!("Server error. Session {} not joined.", session_id),
            },
            Command::EndSession => "Unable to end session.".to_string(),
            Command::LeaveSession => "Unable to leave session.".to_string(),
            Command::Playback(PlaybackChange::Start(loop_index)) => {
                format!("Unable to play loop {}.", loop_index)
            }
            Command::Playback(PlaybackChange::Stop) => "Unable to stop playback.".to_string(),
            Command::RemoveLoop { loop_index } => format!("Unable to remove loop {}.", loop_index),
            Command::ToggleRecording => "Unable to toggle recording.".to_string(),
        }
    }
}

/// Everything that can happen to the panel
#[derive(Debug)]
pub enum PanelEvent {
    /// Poll timer fired
    Tick,
    SessionFetched {
        seq: u64,
        result: ServiceResult<SessionSnapshot>,
    },
    MembersFetched {
        seq: u64,
        result: ServiceResult<Vec<String>>,
    },
    LoopsFetched {
        seq: u64,
        result: ServiceResult<Vec<u32>>,
    },
    CommandFinished {
        command: Command,
        result: ServiceResult<Ack>,
    },
}

/// Sequence number of the newest applied response per collection
#[derive(Debug, Default, Clone, Copy)]
struct AppliedSeq {
    session: u64,
    members: u64,
    loops: u64,
}

/// Accept `seq` if it is not older than `latest`, advancing `latest`
fn accept_seq(latest: &mut u64, seq: u64) -> bool {
    if seq < *latest {
        return false;
    }
    *latest = seq;
    true
}

pub struct Panel<S> {
    service: Arc<S>,
    flash: Flash,
    events: mpsc::Sender<PanelEvent>,

    snapshot: SessionSnapshot,
    members: Vec<String>,
    loops: BTreeSet<u32>,

    buttons: ButtonPair,
    lists: LoopMemberList,

    next_seq: u64,
    applied: AppliedSeq,
    /// Bumped every time the button descriptors are recomputed
    descriptor_revision: u64,
}

impl<S: SessionService> Panel<S> {
    /// Create an offline panel reporting on `events`
    pub fn new(service: Arc<S>, flash: Flash, events: mpsc::Sender<PanelEvent>) -> Self {
        let snapshot = SessionSnapshot::offline();
        let buttons = ButtonPair::new(ButtonDescriptor::for_snapshot(&snapshot));
        Self {
            service,
            flash,
            events,
            snapshot,
            members: Vec::new(),
            loops: BTreeSet::new(),
            buttons,
            lists: LoopMemberList::new(),
            next_seq: 0,
            applied: AppliedSeq::default(),
            descriptor_revision: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn loops(&self) -> &BTreeSet<u32> {
        &self.loops
    }

    pub fn buttons(&self) -> &ButtonPair {
        &self.buttons
    }

    pub fn lists(&self) -> &LoopMemberList {
        &self.lists
    }

    pub fn playing(&self) -> Option<u32> {
        self.lists.playing()
    }

    #[cfg(test)]
    pub fn descriptor_revision(&self) -> u64 {
        self.descriptor_revision
    }

    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Start polling: acquire the timer, then run the first update
    ///
    /// Polling stops when the returned guard is dropped.
    #[must_use = "dropping the timer stops polling"]
    pub fn mount(&mut self, period: Duration) -> PollTimer {
        let timer = PollTimer::start(period, self.events.clone());
        self.update();
        timer
    }

    /// Fetch session, members and loops concurrently
    pub fn update(&mut self) {
        self.next_seq += 1;
        let seq = self.next_seq;
        tracing::trace!("Update #{}", seq);

        let service = Arc::clone(&self.service);
        self.spawn(async move {
            PanelEvent::SessionFetched {
                seq,
                result: service.get_session().await,
            }
        });

        let service = Arc::clone(&self.service);
        self.spawn(async move {
            PanelEvent::MembersFetched {
                seq,
                result: service.get_members().await,
            }
        });

        let service = Arc::clone(&self.service);
        self.spawn(async move {
            PanelEvent::LoopsFetched {
                seq,
                result: service.get_loops().await,
            }
        });
    }

    fn spawn<F>(&self, request: F)
    where
        F: Future<Output = PanelEvent> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = request.await;
            // A closed channel means the panel was torn down
            let _ = events.send(event).await;
        });
    }

    fn issue(&self, command: Command) {
        tracing::debug!("Issuing {:?}", command);
        let service = Arc::clone(&self.service);
        self.spawn(async move {
            let result = command.execute(service.as_ref()).await;
            PanelEvent::CommandFinished { command, result }
        });
    }

    /// Apply one event; the only place panel state changes
    pub fn handle(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::Tick => self.update(),
            PanelEvent::SessionFetched { seq, result } => match result {
                Ok(snapshot) => {
                    if accept_seq(&mut self.applied.session, seq) {
                        self.apply_snapshot(snapshot);
                    } else {
                        tracing::debug!("Dropping stale session response #{}", seq);
                    }
                }
                Err(e) => {
                    tracing::debug!("Session fetch failed: {}", e);
                    self.flash.error("Server error while updating session");
                }
            },
            PanelEvent::MembersFetched { seq, result } => match result {
                Ok(members) => {
                    if accept_seq(&mut self.applied.members, seq) {
                        self.members = members;
                    } else {
                        tracing::debug!("Dropping stale member response #{}", seq);
                    }
                }
                Err(e) => {
                    tracing::debug!("Member fetch failed: {}", e);
                    self.flash.error("Server error while updating member list");
                }
            },
            PanelEvent::LoopsFetched { seq, result } => match result {
                Ok(loops) => {
                    if accept_seq(&mut self.applied.loops, seq) {
                        self.apply_loops(loops.into_iter().collect());
                    } else {
                        tracing::debug!("Dropping stale loop response #{}", seq);
                    }
                }
                Err(e) => {
                    tracing::debug!("Loop fetch failed: {}", e);
                    self.flash.error("Server error while updating loop list");
                }
            },
            PanelEvent::CommandFinished { command, result } => {
                self.finish_command(command, result)
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: SessionSnapshot) {
        if snapshot == self.snapshot {
            return;
        }

        tracing::info!(
            "Session changed: {} ({}) -> {} ({})",
            self.snapshot.session_id.as_deref().unwrap_or("none"),
            self.snapshot.role(),
            snapshot.session_id.as_deref().unwrap_or("none"),
            snapshot.role()
        );

        let was_active = self.snapshot.is_active();
        self.snapshot = snapshot;
        if was_active && !self.snapshot.is_active() {
            self.lists.clear_playback();
        }
        self.recompute_descriptors();
    }

    fn recompute_descriptors(&mut self) {
        self.buttons
            .install(ButtonDescriptor::for_snapshot(&self.snapshot));
        // End session is only offered to the owner; the service decides anyway
        let end_disabled = self.snapshot.is_active() && !self.snapshot.is_owner;
        self.buttons.set_disabled(ButtonSlot::First, false);
        self.buttons.set_disabled(ButtonSlot::Second, end_disabled);
        self.descriptor_revision += 1;
        tracing::debug!(
            "Buttons now {} / {} (rev {})",
            self.buttons.get(ButtonSlot::First).descriptor().text,
            self.buttons.get(ButtonSlot::Second).descriptor().text,
            self.descriptor_revision
        );
    }

    fn apply_loops(&mut self, loops: BTreeSet<u32>) {
        self.loops = loops;
        if self.lists.reconcile(&self.loops) {
            tracing::debug!("Playing loop no longer exists; playback cleared");
        }
    }

    fn finish_command(&mut self, command: Command, result: ServiceResult<Ack>) {
        match result {
            Ok(ack) => {
                tracing::debug!("{:?} succeeded", command);
                if let Some(message) = command.success_message(&ack) {
                    self.flash.info(message);
                }
                if let Command::Playback(change) = command {
                    self.lists.playback_confirmed(change);
                }
                if command.refreshes_session() {
                    self.update();
                }
            }
            Err(e) => {
                tracing::debug!("{:?} failed: {}", command, e);
                self.flash.error(command.failure_message(&e));
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────

    pub fn new_session(&mut self, nickname: &str) {
        if nickname.is_empty() {
            self.flash.error("Nickname required.");
            return;
        }
        self.issue(Command::NewSession {
            nickname: nickname.to_string(),
        });
    }

    pub fn join_session(&mut self, session_id: &str, nickname: &str) {
        if session_id.chars().count() != SESSION_ID_LEN {
            self.flash.error(format!(
                "Session ID must be {} characters long.",
                SESSION_ID_LEN
            ));
            return;
        }
        if nickname.is_empty() {
            self.flash.error("Nickname required.");
            return;
        }
        self.issue(Command::JoinSession {
            session_id: session_id.to_string(),
            nickname: nickname.to_string(),
        });
    }

    pub fn end_session(&mut self) {
        self.issue(Command::EndSession);
    }

    pub fn leave_session(&mut self) {
        self.issue(Command::LeaveSession);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Buttons
    // ─────────────────────────────────────────────────────────────────────

    /// Click / accept on one of the session buttons
    pub fn activate_button(&mut self, slot: ButtonSlot) {
        match self.buttons.activate(slot) {
            Activation::Submit(submission) => self.submit(submission),
            Activation::Prompt { index } => tracing::trace!("{:?} prompting field {}", slot, index),
            Activation::Ignored => tracing::trace!("{:?} is disabled", slot),
        }
    }

    pub fn reset_button(&mut self, slot: ButtonSlot) {
        self.buttons.reset(slot);
    }

    /// Mutable access to the automaton for text edits
    pub fn button_mut(&mut self, slot: ButtonSlot) -> &mut button::ButtonAutomaton {
        self.buttons.get_mut(slot)
    }

    /// Dispatch a completed button cycle to its action
    fn submit(&mut self, submission: Submission) {
        let Submission { action, inputs } = submission;
        match (action, inputs.as_slice()) {
            (SessionAction::NewSession, [nickname]) => self.new_session(nickname),
            (SessionAction::JoinSession, [session_id, nickname]) => {
                self.join_session(session_id, nickname)
            }
            (SessionAction::LeaveSession, []) => self.leave_session(),
            (SessionAction::EndSession, []) => self.end_session(),
            (action, inputs) => {
                tracing::warn!("{:?} received {} input(s)", action, inputs.len());
                self.flash.error("Unexpected number of inputs.");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Loops
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_focus(&mut self, target: Focus) {
        self.lists.set_focus(target);
    }

    /// Start `loop_index`, or stop it if it is the one playing
    pub fn toggle_playback(&mut self, loop_index: u32) {
        let change = self.lists.toggle_target(loop_index);
        self.issue(Command::Playback(change));
    }

    pub fn remove_loop(&mut self, loop_index: u32) {
        self.issue(Command::RemoveLoop { loop_index });
    }

    pub fn toggle_recording(&mut self) {
        self.issue(Command::ToggleRecording);
    }
}
