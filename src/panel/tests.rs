//! Panel reconciliation and command tests
//!
//! The panel runs against an in-process service backed by `DemoPedal`, with
//! every call recorded and per-endpoint failure injection.

use super::button::{ButtonSlot, ButtonState};
use super::lists::Focus;
use super::*;
use crate::demo::{DemoPedal, REMOTE_SESSION_ID};
use crate::flash::FlashLevel;
use std::collections::HashMap;
use std::sync::Mutex;

/// `SessionService` over an in-memory `DemoPedal`, also used by the TUI tests
#[derive(Default)]
pub(crate) struct LocalPedal {
    pedal: Mutex<DemoPedal>,
    calls: Mutex<Vec<&'static str>>,
    /// Endpoint -> injected failure; `None` is a transport error
    failing: Mutex<HashMap<&'static str, Option<FailureCode>>>,
}

impl LocalPedal {
    pub(crate) fn with(pedal: DemoPedal) -> Self {
        Self {
            pedal: Mutex::new(pedal),
            ..Default::default()
        }
    }

    fn call<T>(
        &self,
        name: &'static str,
        f: impl FnOnce(&mut DemoPedal) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        self.calls.lock().unwrap().push(name);
        match self.failing.lock().unwrap().get(name) {
            Some(None) => return Err(ServiceError::Network("connection refused".to_string())),
            Some(Some(code)) => return Err(ServiceError::rejected(500, code.clone())),
            None => {}
        }
        let mut pedal = self.pedal.lock().unwrap();
        f(&mut *pedal)
    }

    fn fail(&self, name: &'static str) {
        self.failing.lock().unwrap().insert(name, None);
    }

    fn reject(&self, name: &'static str, code: FailureCode) {
        self.failing.lock().unwrap().insert(name, Some(code));
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    pub(crate) fn commands(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !c.starts_with("get_"))
            .count()
    }
}

impl SessionService for LocalPedal {
    async fn get_session(&self) -> ServiceResult<SessionSnapshot> {
        self.call("get_session", |p| Ok(p.snapshot()))
    }

    async fn get_members(&self) -> ServiceResult<Vec<String>> {
        self.call("get_members", |p| Ok(p.members()))
    }

    async fn get_loops(&self) -> ServiceResult<Vec<u32>> {
        self.call("get_loops", |p| Ok(p.loops()))
    }

    async fn new_session(&self, nickname: &str) -> ServiceResult<Ack> {
        self.call("new_session", |p| p.new_session(nickname))
    }

    async fn join_session(&self, session_id: &str, nickname: &str) -> ServiceResult<Ack> {
        self.call("join_session", |p| p.join_session(session_id, nickname))
    }

    async fn end_session(&self) -> ServiceResult<Ack> {
        self.call("end_session", DemoPedal::end_session)
    }

    async fn leave_session(&self) -> ServiceResult<Ack> {
        self.call("leave_session", DemoPedal::leave_session)
    }

    async fn start_playback(&self, loop_index: u32) -> ServiceResult<Ack> {
        self.call("start_playback", |p| p.start_playback(loop_index))
    }

    async fn stop_playback(&self) -> ServiceResult<Ack> {
        self.call("stop_playback", DemoPedal::stop_playback)
    }

    async fn remove_loop(&self, loop_index: u32) -> ServiceResult<Ack> {
        self.call("remove_loop", |p| p.remove_loop(loop_index))
    }

    async fn toggle_recording(&self) -> ServiceResult<Ack> {
        self.call("toggle_recording", DemoPedal::toggle_recording)
    }
}

struct Harness {
    panel: Panel<LocalPedal>,
    service: Arc<LocalPedal>,
    rx: mpsc::Receiver<PanelEvent>,
    flash: Flash,
}

impl Harness {
    fn new(pedal: DemoPedal) -> Self {
        let service = Arc::new(LocalPedal::with(pedal));
        let flash = Flash::new();
        let (tx, rx) = mpsc::channel(PANEL_EVENT_BUFFER);
        let panel = Panel::new(Arc::clone(&service), flash.clone(), tx);
        Self {
            panel,
            service,
            rx,
            flash,
        }
    }

    /// Apply events until nothing arrives for a short while
    async fn settle(&mut self) {
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(100), self.rx.recv()).await
        {
            self.panel.handle(event);
        }
    }

    async fn update(&mut self) {
        self.panel.update();
        self.settle().await;
    }

    fn errors(&self) -> Vec<String> {
        self.flash
            .history()
            .into_iter()
            .filter(|m| m.level == FlashLevel::Error)
            .map(|m| m.message)
            .collect()
    }

    fn last_error(&self) -> Option<String> {
        self.errors().pop()
    }

    /// Type `text` into whichever button is prompting and press accept
    fn answer(&mut self, slot: ButtonSlot, text: &str) {
        self.panel.button_mut(slot).set_field(text);
        self.panel.activate_button(slot);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconciliation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_replaces_all_collections() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.update().await;

    assert_eq!(h.panel.snapshot(), &SessionSnapshot::offline());
    assert!(h.panel.members().is_empty());
    assert_eq!(h.panel.loops(), &BTreeSet::from([1, 2]));
    assert_eq!(h.service.count("get_session"), 1);
    assert_eq!(h.service.count("get_members"), 1);
    assert_eq!(h.service.count("get_loops"), 1);
}

#[tokio::test]
async fn test_repeated_update_is_idempotent() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.panel.new_session("rick");
    h.settle().await;

    let revision = h.panel.descriptor_revision();
    let snapshot = h.panel.snapshot().clone();
    let members = h.panel.members().to_vec();
    let loops = h.panel.loops().clone();

    h.update().await;
    h.update().await;

    assert_eq!(h.panel.descriptor_revision(), revision);
    assert_eq!(h.panel.snapshot(), &snapshot);
    assert_eq!(h.panel.members(), members.as_slice());
    assert_eq!(h.panel.loops(), &loops);
}

#[tokio::test]
async fn test_failed_member_fetch_does_not_block_others() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.service.pedal.lock().unwrap().new_session("rick").unwrap();
    h.service.fail("get_members");

    h.update().await;

    assert!(h.panel.snapshot().is_active());
    assert_eq!(h.panel.loops().len(), 2);
    assert!(h.panel.members().is_empty());
    assert_eq!(
        h.errors(),
        vec!["Server error while updating member list".to_string()]
    );
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let mut h = Harness::new(DemoPedal::new());

    h.panel.handle(PanelEvent::SessionFetched {
        seq: 2,
        result: Ok(SessionSnapshot::online("S001", true)),
    });
    h.panel.handle(PanelEvent::SessionFetched {
        seq: 1,
        result: Ok(SessionSnapshot::offline()),
    });
    assert_eq!(h.panel.snapshot(), &SessionSnapshot::online("S001", true));

    h.panel.handle(PanelEvent::MembersFetched {
        seq: 3,
        result: Ok(vec!["rick".to_string()]),
    });
    h.panel.handle(PanelEvent::MembersFetched {
        seq: 2,
        result: Ok(Vec::new()),
    });
    assert_eq!(h.panel.members(), ["rick".to_string()]);
}

#[tokio::test]
async fn test_tick_triggers_update() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.handle(PanelEvent::Tick);
    h.settle().await;
    assert_eq!(h.service.count("get_session"), 1);
}

#[tokio::test]
async fn test_mount_updates_immediately_and_polls() {
    let mut h = Harness::new(DemoPedal::new());
    let timer = h.panel.mount(Duration::from_millis(20));
    assert_eq!(timer.period(), Duration::from_millis(20));

    tokio::time::sleep(Duration::from_millis(70)).await;
    drop(timer);
    h.settle().await;

    assert!(h.service.count("get_session") >= 2);
}

#[tokio::test]
async fn test_completion_after_teardown_is_dropped() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.update();
    // Tear down before any completion is read
    drop(h.rx);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.panel.snapshot(), &SessionSnapshot::offline());
    assert!(h.flash.history().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Session lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_session_scenario() {
    let mut h = Harness::new(DemoPedal::new());
    h.update().await;

    h.panel.activate_button(ButtonSlot::First);
    assert_eq!(
        h.panel.buttons().get(ButtonSlot::First).placeholder(),
        Some("nickname")
    );
    h.answer(ButtonSlot::First, "rick");
    h.settle().await;

    assert!(h.panel.snapshot().is_active());
    assert!(h.panel.snapshot().is_owner);
    assert!(h.panel.members().contains(&"rick".to_string()));
    let buttons = h.panel.buttons();
    assert_eq!(buttons.get(ButtonSlot::First).descriptor().text, "LEAVE SESSION");
    assert_eq!(buttons.get(ButtonSlot::Second).descriptor().text, "END SESSION");
    assert!(!buttons.get(ButtonSlot::Second).is_disabled());
    assert_eq!(h.service.count("new_session"), 1);

    let session_id = h.panel.snapshot().session_id.clone().unwrap();
    let created = h.flash.history().into_iter().find(|m| m.level == FlashLevel::Info);
    assert_eq!(
        created.map(|m| m.message),
        Some(format!("Created session {}", session_id))
    );
}

#[tokio::test]
async fn test_empty_nickname_never_reaches_service() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.activate_button(ButtonSlot::First);
    h.answer(ButtonSlot::First, "");
    h.settle().await;

    assert_eq!(h.service.commands(), 0);
    assert_eq!(h.errors(), vec!["Nickname required.".to_string()]);
}

#[tokio::test]
async fn test_short_session_id_never_reaches_service() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.join_session("abc", "rick");
    h.settle().await;

    assert_eq!(h.service.commands(), 0);
    assert_eq!(
        h.last_error().as_deref(),
        Some("Session ID must be 4 characters long.")
    );
}

#[tokio::test]
async fn test_well_formed_join_issues_one_request() {
    let cases = [("ABCD", "rick"), ("JAMS", " "), ("ÅÄÖÜ", "x"), ("JAMS", "ash")];
    for (session_id, nickname) in cases {
        let mut h = Harness::new(DemoPedal::new());
        h.panel.join_session(session_id, nickname);
        h.settle().await;

        assert_eq!(h.service.count("join_session"), 1, "{}", session_id);
        assert!(
            !h.errors().iter().any(|e| e.contains("characters") || e.contains("required")),
            "validation failed for {:?}",
            (session_id, nickname)
        );
    }
}

#[tokio::test]
async fn test_join_through_buttons_as_member() {
    let mut h = Harness::new(DemoPedal::new());
    h.update().await;

    h.panel.activate_button(ButtonSlot::Second);
    h.answer(ButtonSlot::Second, REMOTE_SESSION_ID);
    assert_eq!(
        h.panel.buttons().get(ButtonSlot::Second).state(),
        ButtonState::Prompting { index: 1 }
    );
    h.answer(ButtonSlot::Second, "rick");
    h.settle().await;

    assert_eq!(h.panel.snapshot(), &SessionSnapshot::online(REMOTE_SESSION_ID, false));
    assert_eq!(h.panel.members(), ["ash", "matt", "rick"].map(String::from));
    // Members are not offered "end session"
    assert!(h.panel.buttons().get(ButtonSlot::Second).is_disabled());
    h.panel.activate_button(ButtonSlot::Second);
    h.settle().await;
    assert_eq!(h.service.count("end_session"), 0);
}

#[tokio::test]
async fn test_join_failure_messages() {
    let mut h = Harness::new(DemoPedal::new());

    h.panel.join_session("ZZZZ", "rick");
    h.settle().await;
    assert_eq!(h.last_error().as_deref(), Some("Session ZZZZ not found."));

    h.panel.join_session(REMOTE_SESSION_ID, "ash");
    h.settle().await;
    assert_eq!(
        h.last_error().as_deref(),
        Some("Nickname ash is already taken in session JAMS.")
    );

    h.service.fail("join_session");
    h.panel.join_session(REMOTE_SESSION_ID, "rick");
    h.settle().await;
    assert_eq!(
        h.last_error().as_deref(),
        Some("Server error. Session JAMS not joined.")
    );
    assert!(!h.panel.snapshot().is_active());
}

#[tokio::test]
async fn test_new_session_failure_messages() {
    let mut pedal = DemoPedal::new();
    pedal.server_full = true;
    let mut h = Harness::new(pedal);

    h.panel.new_session("rick");
    h.settle().await;
    assert_eq!(
        h.last_error().as_deref(),
        Some("Server full. Session not created.")
    );

    h.service.pedal.lock().unwrap().server_full = false;
    h.panel.new_session("rick");
    h.settle().await;
    h.panel.new_session("rick");
    h.settle().await;
    assert_eq!(
        h.last_error().as_deref(),
        Some("Pedal already in a session. Session not created.")
    );
}

#[tokio::test]
async fn test_new_session_generic_failures() {
    let mut h = Harness::new(DemoPedal::new());

    h.service.reject("new_session", FailureCode::Other("disk-error".to_string()));
    h.panel.new_session("rick");
    h.settle().await;
    assert_eq!(
        h.last_error().as_deref(),
        Some("Server error. Session not created.")
    );

    h.service.fail("new_session");
    h.panel.new_session("rick");
    h.settle().await;
    assert_eq!(
        h.errors(),
        vec!["Server error. Session not created.".to_string(); 2]
    );
    assert!(!h.panel.snapshot().is_active());
}

#[tokio::test]
async fn test_join_full_session_message() {
    let mut pedal = DemoPedal::new();
    pedal.remote_members = ["a", "b", "c", "d"].map(String::from).to_vec();
    let mut h = Harness::new(pedal);

    h.panel.join_session(REMOTE_SESSION_ID, "rick");
    h.settle().await;

    assert_eq!(h.service.count("join_session"), 1);
    assert_eq!(h.last_error().as_deref(), Some("Session JAMS is full."));
    assert!(!h.panel.snapshot().is_active());
}

#[tokio::test]
async fn test_wrong_input_count_issues_no_request() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.submit(Submission {
        action: SessionAction::JoinSession,
        inputs: vec!["JAMS".to_string()],
    });
    h.panel.submit(Submission {
        action: SessionAction::LeaveSession,
        inputs: vec!["extra".to_string()],
    });
    h.settle().await;

    assert_eq!(h.service.commands(), 0);
    assert_eq!(
        h.errors(),
        vec!["Unexpected number of inputs.".to_string(); 2]
    );
}

#[tokio::test]
async fn test_leave_session_scenario() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.panel.new_session("rick");
    h.settle().await;
    h.panel.toggle_playback(1);
    h.settle().await;
    assert_eq!(h.panel.playing(), Some(1));

    h.panel.activate_button(ButtonSlot::First);
    h.settle().await;

    assert!(!h.panel.snapshot().is_active());
    assert_eq!(h.panel.playing(), None);
    assert_eq!(
        h.panel.buttons().get(ButtonSlot::First).descriptor().text,
        "NEW SESSION"
    );
    assert_eq!(
        h.panel.buttons().get(ButtonSlot::Second).descriptor().text,
        "JOIN SESSION"
    );
    assert!(!h.panel.buttons().get(ButtonSlot::Second).is_disabled());
}

#[tokio::test]
async fn test_end_session_failure_keeps_state() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.join_session(REMOTE_SESSION_ID, "rick");
    h.settle().await;
    let revision = h.panel.descriptor_revision();

    // Not gated locally; the service refuses
    h.panel.end_session();
    h.settle().await;

    assert_eq!(h.service.count("end_session"), 1);
    assert_eq!(h.last_error().as_deref(), Some("Unable to end session."));
    assert!(h.panel.snapshot().is_active());
    assert_eq!(h.panel.descriptor_revision(), revision);
}

#[tokio::test]
async fn test_leave_failure_message() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.leave_session();
    h.settle().await;
    assert_eq!(h.last_error().as_deref(), Some("Unable to leave session."));
}

// ─────────────────────────────────────────────────────────────────────────────
// Loops
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_toggle_playback_twice() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.update().await;

    h.panel.toggle_playback(2);
    h.settle().await;
    assert_eq!(h.panel.playing(), Some(2));

    h.panel.toggle_playback(2);
    h.settle().await;
    assert_eq!(h.panel.playing(), None);
    assert_eq!(h.service.count("start_playback"), 1);
    assert_eq!(h.service.count("stop_playback"), 1);
}

#[tokio::test]
async fn test_failed_playback_leaves_state_unchanged() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.panel.toggle_playback(1);
    h.settle().await;

    h.service.fail("start_playback");
    h.panel.toggle_playback(2);
    h.settle().await;

    assert_eq!(h.panel.playing(), Some(1));
    assert_eq!(h.last_error().as_deref(), Some("Unable to play loop 2."));
}

#[tokio::test]
async fn test_failed_stop_keeps_loop_playing() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.panel.toggle_playback(2);
    h.settle().await;

    h.service.fail("stop_playback");
    h.panel.toggle_playback(2);
    h.settle().await;

    assert_eq!(h.service.count("stop_playback"), 1);
    assert_eq!(h.panel.playing(), Some(2));
    assert_eq!(h.last_error().as_deref(), Some("Unable to stop playback."));
}

#[tokio::test]
async fn test_remove_loop_waits_for_poll() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.update().await;
    h.panel.toggle_playback(2);
    h.settle().await;

    h.panel.remove_loop(2);
    h.settle().await;
    // No optimistic change
    assert_eq!(h.panel.loops(), &BTreeSet::from([1, 2]));
    assert_eq!(h.panel.playing(), Some(2));

    h.update().await;
    assert_eq!(h.panel.loops(), &BTreeSet::from([1]));
    assert_eq!(h.panel.playing(), None);
}

#[tokio::test]
async fn test_remove_failure_is_reported_once() {
    let mut h = Harness::new(DemoPedal::seeded());
    h.panel.remove_loop(9);
    h.settle().await;

    assert_eq!(h.service.count("remove_loop"), 1);
    assert_eq!(h.errors(), vec!["Unable to remove loop 9.".to_string()]);
}

#[tokio::test]
async fn test_recording_toggle_flashes_ack() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.toggle_recording();
    h.settle().await;
    h.panel.toggle_recording();
    h.settle().await;

    let infos: Vec<String> = h
        .flash
        .history()
        .into_iter()
        .filter(|m| m.level == FlashLevel::Info)
        .map(|m| m.message)
        .collect();
    assert_eq!(infos, vec!["Recording loop...", "Loop recorded."]);

    h.update().await;
    assert_eq!(h.panel.loops(), &BTreeSet::from([1]));
}

#[tokio::test]
async fn test_focus_switch_is_local() {
    let mut h = Harness::new(DemoPedal::new());
    h.panel.set_focus(Focus::Members);
    h.settle().await;

    assert_eq!(h.panel.lists().focus(), Focus::Members);
    assert!(h.service.calls.lock().unwrap().is_empty());
}
