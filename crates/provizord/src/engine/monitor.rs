//! Session monitor - state machine over the engine's raw output stream.
//!
//! Output arrives as arbitrary chunks; everything is appended to the session
//! transcript regardless of state, and the marker scan runs on each arrival.
//! The engine's prompts are not newline-terminated, so detection works on
//! substrings of the accumulated text, never on line boundaries.

use crate::engine::markers;

/// Monitor state for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No output received yet.
    AwaitingOutput,
    /// Output flowing, no terminal marker seen.
    Accumulating,
    /// Choice prompt stalled after the terminator; a nudge is pending.
    Stuck,
    /// End-of-run marker observed.
    Complete,
}

/// What the session driver must do after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorAction {
    None,
    /// Schedule one blank line after the configured nudge delay.
    InjectBlankLine,
    /// Terminal marker seen; stop driving and parse the transcript.
    Complete,
}

/// Accumulates the transcript and watches for protocol markers.
pub struct SessionMonitor {
    transcript: String,
    state: SessionState,
    terminator_sent: bool,
    nudge_spent: bool,
}

impl SessionMonitor {
    pub fn new() -> Self {
        Self {
            transcript: String::new(),
            state: SessionState::AwaitingOutput,
            terminator_sent: false,
            nudge_spent: false,
        }
    }

    /// Called by the driver right after the terminator line goes out; the
    /// stuck-prompt correction is only valid past that point.
    pub fn note_terminator_sent(&mut self) {
        self.terminator_sent = true;
    }

    /// Called after the nudge blank line was actually written.
    pub fn note_nudge_sent(&mut self) {
        if self.state == SessionState::Stuck {
            self.state = SessionState::Accumulating;
        }
    }

    /// Feed one output chunk; returns the action the driver must take.
    pub fn observe(&mut self, chunk: &str) -> MonitorAction {
        self.transcript.push_str(chunk);

        if self.state == SessionState::Complete {
            return MonitorAction::None;
        }

        if self.transcript.contains(markers::END_OF_RUN) {
            self.state = SessionState::Complete;
            return MonitorAction::Complete;
        }

        // Stuck-prompt quirk: the terminator alone does not always advance
        // past the final menu. Answered with one blank line, once per
        // session — a second injection can loop the menu forever.
        if self.terminator_sent && !self.nudge_spent && chunk.contains(markers::CHOICE_PROMPT) {
            self.nudge_spent = true;
            self.state = SessionState::Stuck;
            return MonitorAction::InjectBlankLine;
        }

        self.state = SessionState::Accumulating;
        MonitorAction::None
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Full accumulated transcript so far.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

impl Default for SessionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_the_instant_the_end_marker_lands() {
        let mut monitor = SessionMonitor::new();
        assert_eq!(monitor.observe("РЕКОМЕНДАЦИИ ДЛЯ: Иванов\n"), MonitorAction::None);
        assert_eq!(monitor.state(), SessionState::Accumulating);
        // Marker split across two chunks still fires on arrival of the tail.
        assert_eq!(monitor.observe("КОНЕЦ РАБО"), MonitorAction::None);
        assert_eq!(monitor.observe("ТЫ СИСТЕМЫ\n"), MonitorAction::Complete);
        assert!(monitor.is_complete());
    }

    #[test]
    fn nudge_requires_terminator_and_fires_once() {
        let mut monitor = SessionMonitor::new();
        // Prompt before the terminator is normal menu traffic.
        assert_eq!(monitor.observe("Ваш выбор: "), MonitorAction::None);

        monitor.note_terminator_sent();
        assert_eq!(monitor.observe("Ваш выбор: "), MonitorAction::InjectBlankLine);
        assert_eq!(monitor.state(), SessionState::Stuck);

        monitor.note_nudge_sent();
        assert_eq!(monitor.state(), SessionState::Accumulating);

        // Never twice per session.
        assert_eq!(monitor.observe("Ваш выбор: "), MonitorAction::None);
    }

    #[test]
    fn transcript_accumulates_every_chunk_in_every_state() {
        let mut monitor = SessionMonitor::new();
        monitor.observe("a");
        monitor.note_terminator_sent();
        monitor.observe("Ваш выбор: ");
        monitor.observe("КОНЕЦ РАБОТЫ СИСТЕМЫ");
        monitor.observe("хвост");
        assert_eq!(monitor.transcript(), "aВаш выбор: КОНЕЦ РАБОТЫ СИСТЕМЫхвост");
    }
}
