//! Loop and member lists
//!
//! Tracks which list is on screen and which loop is playing. The playing
//! loop is local, optimistic state: it only changes when a start/stop
//! command succeeds, or when the polled loop set shows it is gone.

use std::collections::BTreeSet;

/// Which list is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Loops,
    Members,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Loops => Focus::Members,
            Focus::Members => Focus::Loops,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Focus::Loops => "LOOPS",
            Focus::Members => "MEMBERS",
        }
    }
}

/// Playback command chosen by a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackChange {
    Start(u32),
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct LoopMemberList {
    focus: Focus,
    playing: Option<u32>,
}

impl LoopMemberList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, target: Focus) {
        self.focus = target;
    }

    pub fn playing(&self) -> Option<u32> {
        self.playing
    }

    /// Decide what toggling `loop_index` means right now
    pub fn toggle_target(&self, loop_index: u32) -> PlaybackChange {
        if self.playing == Some(loop_index) {
            PlaybackChange::Stop
        } else {
            PlaybackChange::Start(loop_index)
        }
    }

    /// Record a playback command the service accepted
    pub fn playback_confirmed(&mut self, change: PlaybackChange) {
        self.playing = match change {
            PlaybackChange::Start(loop_index) => Some(loop_index),
            PlaybackChange::Stop => None,
        };
    }

    /// Forget the playing loop if the polled loop set no longer has it
    ///
    /// Returns true if playback state was cleared.
    pub fn reconcile(&mut self, loops: &BTreeSet<u32>) -> bool {
        match self.playing {
            Some(loop_index) if !loops.contains(&loop_index) => {
                self.playing = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear_playback(&mut self) {
        self.playing = None;
    }
}
