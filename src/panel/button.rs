//! Session control buttons
//!
//! Each button is a small automaton: a plain pushbutton when it has no text
//! prompts, otherwise a guided sequence of text fields that commits all
//! answers at once. The two buttons of the panel live in a [`ButtonPair`],
//! which resets one whenever the other is activated so that at most one of
//! them is ever collecting input.

use crate::service::SessionSnapshot;

/// The callback a button fires when its input cycle completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    NewSession,
    JoinSession,
    LeaveSession,
    EndSession,
}

/// What a button is currently wired to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonDescriptor {
    /// Identity; a different id means a different button
    pub id: &'static str,
    pub action: SessionAction,
    pub text: &'static str,
    pub prompts: Vec<&'static str>,
}

impl ButtonDescriptor {
    pub fn new_session() -> Self {
        Self {
            id: "new-session",
            action: SessionAction::NewSession,
            text: "NEW SESSION",
            prompts: vec!["nickname"],
        }
    }

    pub fn join_session() -> Self {
        Self {
            id: "join-session",
            action: SessionAction::JoinSession,
            text: "JOIN SESSION",
            prompts: vec!["session id", "nickname"],
        }
    }

    pub fn leave_session() -> Self {
        Self {
            id: "leave-session",
            action: SessionAction::LeaveSession,
            text: "LEAVE SESSION",
            prompts: Vec::new(),
        }
    }

    pub fn end_session() -> Self {
        Self {
            id: "end-session",
            action: SessionAction::EndSession,
            text: "END SESSION",
            prompts: Vec::new(),
        }
    }

    /// Descriptors for both buttons given the current session state
    pub fn for_snapshot(snapshot: &SessionSnapshot) -> [ButtonDescriptor; 2] {
        if snapshot.is_active() {
            [Self::leave_session(), Self::end_session()]
        } else {
            [Self::new_session(), Self::join_session()]
        }
    }
}

/// Where a button is in its input cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Idle,
    /// Waiting for the answer to `prompts[index]`
    Prompting { index: usize },
}

/// Completed input cycle, ready to hand to the action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub action: SessionAction,
    pub inputs: Vec<String>,
}

/// Result of activating a button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Button is disabled; nothing happened
    Ignored,
    /// Now waiting for input at `index`
    Prompt { index: usize },
    /// Input cycle complete
    Submit(Submission),
}

/// Sequential text-entry automaton behind one button
#[derive(Debug, Clone)]
pub struct ButtonAutomaton {
    descriptor: ButtonDescriptor,
    state: ButtonState,
    collected: Vec<String>,
    field: String,
    disabled: bool,
}

impl ButtonAutomaton {
    pub fn new(descriptor: ButtonDescriptor) -> Self {
        Self {
            descriptor,
            state: ButtonState::Idle,
            collected: Vec::new(),
            field: String::new(),
            disabled: false,
        }
    }

    pub fn descriptor(&self) -> &ButtonDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn is_prompting(&self) -> bool {
        matches!(self.state, ButtonState::Prompting { .. })
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Current text field contents
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Answers committed so far in this cycle
    pub fn collected(&self) -> &[String] {
        &self.collected
    }

    /// Placeholder for the field being edited, if any
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.state {
            ButtonState::Prompting { index } => self.descriptor.prompts.get(index).copied(),
            ButtonState::Idle => None,
        }
    }

    /// Click / accept key
    pub fn activate(&mut self) -> Activation {
        if self.disabled {
            return Activation::Ignored;
        }

        let prompt_count = self.descriptor.prompts.len();
        match self.state {
            ButtonState::Idle if prompt_count == 0 => Activation::Submit(Submission {
                action: self.descriptor.action,
                inputs: Vec::new(),
            }),
            ButtonState::Idle => {
                self.collected.clear();
                self.field.clear();
                self.state = ButtonState::Prompting { index: 0 };
                Activation::Prompt { index: 0 }
            }
            ButtonState::Prompting { index } => {
                self.collected.truncate(index);
                self.collected.push(std::mem::take(&mut self.field));

                if index + 1 < prompt_count {
                    self.state = ButtonState::Prompting { index: index + 1 };
                    Activation::Prompt { index: index + 1 }
                } else {
                    let inputs = std::mem::take(&mut self.collected);
                    self.reset();
                    Activation::Submit(Submission {
                        action: self.descriptor.action,
                        inputs,
                    })
                }
            }
        }
    }

    /// Back to `Idle`, dropping any partial input
    pub fn reset(&mut self) {
        self.state = ButtonState::Idle;
        self.collected.clear();
        self.field.clear();
    }

    /// Replace the field contents (only while prompting)
    #[cfg(test)]
    pub fn set_field(&mut self, value: impl Into<String>) {
        if self.is_prompting() {
            self.field = value.into();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.is_prompting() {
            self.field.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.is_prompting() {
            self.field.pop();
        }
    }
}

/// Which of the two buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSlot {
    First,
    Second,
}

impl ButtonSlot {
    fn index(self) -> usize {
        match self {
            ButtonSlot::First => 0,
            ButtonSlot::Second => 1,
        }
    }

    pub fn sibling(self) -> Self {
        match self {
            ButtonSlot::First => ButtonSlot::Second,
            ButtonSlot::Second => ButtonSlot::First,
        }
    }
}

/// Owner of both button automata
///
/// Activating one button resets the other before the activation is
/// evaluated, so at most one of the pair is ever prompting.
#[derive(Debug, Clone)]
pub struct ButtonPair {
    slots: [ButtonAutomaton; 2],
}

impl ButtonPair {
    pub fn new(descriptors: [ButtonDescriptor; 2]) -> Self {
        let [first, second] = descriptors;
        Self {
            slots: [ButtonAutomaton::new(first), ButtonAutomaton::new(second)],
        }
    }

    pub fn get(&self, slot: ButtonSlot) -> &ButtonAutomaton {
        &self.slots[slot.index()]
    }

    pub fn get_mut(&mut self, slot: ButtonSlot) -> &mut ButtonAutomaton {
        &mut self.slots[slot.index()]
    }

    /// Install new descriptors
    ///
    /// A slot whose descriptor id changed gets a fresh automaton; a slot with
    /// the same id keeps its in-progress input.
    pub fn install(&mut self, descriptors: [ButtonDescriptor; 2]) {
        for (automaton, descriptor) in self.slots.iter_mut().zip(descriptors) {
            if automaton.descriptor.id != descriptor.id {
                let disabled = automaton.disabled;
                *automaton = ButtonAutomaton::new(descriptor);
                automaton.disabled = disabled;
            } else {
                automaton.descriptor = descriptor;
            }
        }
    }

    pub fn set_disabled(&mut self, slot: ButtonSlot, disabled: bool) {
        self.get_mut(slot).set_disabled(disabled);
    }

    /// Activate `slot`, yielding focus from its sibling first
    pub fn activate(&mut self, slot: ButtonSlot) -> Activation {
        if self.get(slot).is_disabled() {
            return Activation::Ignored;
        }
        self.get_mut(slot.sibling()).reset();
        self.get_mut(slot).activate()
    }

    pub fn reset(&mut self, slot: ButtonSlot) {
        self.get_mut(slot).reset();
    }

    /// The slot currently collecting input, if any
    pub fn prompting(&self) -> Option<ButtonSlot> {
        [ButtonSlot::First, ButtonSlot::Second]
            .into_iter()
            .find(|slot| self.get(*slot).is_prompting())
    }
}
