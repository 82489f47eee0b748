use crate::{
    foundation::{core::Millis, math::Rng64},
    runtime::host::{TimerHost, TimerId, TimerTarget},
    typing::config::TypewriterConfig,
};

/// Where the typewriter is in revealing its current target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypewriterPhase {
    /// Not started, or stopped.
    Idle,
    /// Revealing characters.
    Typing,
    /// Everything revealed; waiting out the completion hold.
    Holding,
    /// Target fully shown and reported complete.
    Complete,
}

/// Compact progress record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TypewriterState {
    /// Revealed prefix length, in characters.
    pub revealed_prefix_len: usize,
    /// Completion has been reported.
    pub is_complete: bool,
    /// Cursor should be drawn.
    pub cursor_visible: bool,
}

/// What a host renders.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TypewriterOutput {
    /// Revealed prefix of the target.
    pub display_text: String,
    /// Completion has been reported.
    pub is_complete: bool,
    /// Cursor should be drawn.
    pub cursor_visible: bool,
}

/// Progressive text reveal driven by host timers.
///
/// Each reveal timer is scheduled only after the previous character is committed, so at most one
/// reveal is ever pending. The cursor blinks on its own interval for as long as the engine runs
/// and is always shown until the target is complete.
pub struct Typewriter {
    config: TypewriterConfig,
    rng: Rng64,
    target: String,
    /// Byte offset just past each character of `target`.
    ends: Vec<usize>,
    revealed: usize,
    phase: TypewriterPhase,
    blink_on: bool,
    running: bool,
    reveal_timer: Option<TimerId>,
    hold_timer: Option<TimerId>,
    blink_timer: Option<TimerId>,
}

impl Typewriter {
    /// An idle typewriter. The config is normalized first.
    pub fn new(config: TypewriterConfig) -> Self {
        let config = config.normalized();
        Self {
            rng: Rng64::new(config.seed),
            config,
            target: String::new(),
            ends: Vec::new(),
            revealed: 0,
            phase: TypewriterPhase::Idle,
            blink_on: true,
            running: false,
            reveal_timer: None,
            hold_timer: None,
            blink_timer: None,
        }
    }

    /// Begin revealing `text`. Restarts if already running.
    #[tracing::instrument(skip(self, text, timers), fields(chars = text.chars().count()))]
    pub fn start(&mut self, text: &str, timers: &mut dyn TimerHost) {
        if self.running {
            self.stop(timers);
        }
        self.running = true;
        if let Some(period) = self.config.cursor_blink_interval_ms {
            self.blink_timer = Some(timers.set_interval(Millis(period)));
        }
        self.reset(text, timers);
    }

    /// Replace the target. Same text while running is a no-op; anything else resets progress.
    pub fn set_text(&mut self, text: &str, timers: &mut dyn TimerHost) {
        if !self.running {
            self.load_target(text);
            return;
        }
        if text == self.target {
            return;
        }
        self.reset(text, timers);
    }

    /// Cancel every timer. The revealed prefix is discarded.
    pub fn stop(&mut self, timers: &mut dyn TimerHost) {
        for id in [
            self.reveal_timer.take(),
            self.hold_timer.take(),
            self.blink_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            timers.clear_timer(id);
        }
        self.running = false;
        self.revealed = 0;
        self.phase = TypewriterPhase::Idle;
        self.blink_on = true;
        tracing::debug!("typewriter stopped");
    }

    /// True between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The normalized configuration.
    pub fn config(&self) -> &TypewriterConfig {
        &self.config
    }

    /// Full text being revealed.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Current phase.
    pub fn phase(&self) -> TypewriterPhase {
        self.phase
    }

    /// The revealed prefix of the target.
    pub fn display_text(&self) -> &str {
        let end = match self.revealed {
            0 => 0,
            n => self.ends[n - 1],
        };
        &self.target[..end]
    }

    /// Whether the target is complete.
    pub fn is_complete(&self) -> bool {
        self.phase == TypewriterPhase::Complete
    }

    /// Solid until complete, then follows the blink.
    pub fn cursor_visible(&self) -> bool {
        self.blink_on || !self.is_complete()
    }

    /// Progress as a small copyable record.
    pub fn state(&self) -> TypewriterState {
        TypewriterState {
            revealed_prefix_len: self.revealed,
            is_complete: self.is_complete(),
            cursor_visible: self.cursor_visible(),
        }
    }

    /// Everything a host needs to render.
    pub fn output(&self) -> TypewriterOutput {
        TypewriterOutput {
            display_text: self.display_text().to_owned(),
            is_complete: self.is_complete(),
            cursor_visible: self.cursor_visible(),
        }
    }

    fn load_target(&mut self, text: &str) {
        self.target = text.to_owned();
        self.ends = text.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
        self.revealed = 0;
    }

    fn reset(&mut self, text: &str, timers: &mut dyn TimerHost) {
        for id in [self.reveal_timer.take(), self.hold_timer.take()]
            .into_iter()
            .flatten()
        {
            timers.clear_timer(id);
        }
        self.load_target(text);
        self.blink_on = true;

        if self.ends.is_empty() {
            self.enter_holding(timers);
        } else {
            self.phase = TypewriterPhase::Typing;
            self.reveal_timer = Some(timers.set_timeout(Millis(self.config.start_delay_ms)));
        }
        tracing::debug!(chars = self.ends.len(), "typewriter reset");
    }

    fn enter_holding(&mut self, timers: &mut dyn TimerHost) {
        self.phase = TypewriterPhase::Holding;
        self.hold_timer = Some(timers.set_timeout(Millis(self.config.completion_hold_ms)));
    }

    fn reveal_next(&mut self, timers: &mut dyn TimerHost) {
        self.revealed = (self.revealed + 1).min(self.ends.len());
        if self.revealed < self.ends.len() {
            let delay = self.config.next_char_delay(&mut self.rng);
            self.reveal_timer = Some(timers.set_timeout(delay));
        } else {
            self.enter_holding(timers);
        }
    }
}

impl TimerTarget for Typewriter {
    fn on_timer(&mut self, id: TimerId, timers: &mut dyn TimerHost) {
        if self.reveal_timer == Some(id) {
            self.reveal_timer = None;
            self.reveal_next(timers);
        } else if self.hold_timer == Some(id) {
            self.hold_timer = None;
            self.phase = TypewriterPhase::Complete;
            tracing::debug!(at = timers.now().0, "typewriter complete");
        } else if self.blink_timer == Some(id) {
            self.blink_on = !self.blink_on;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/typing/engine.rs"]
mod tests;
