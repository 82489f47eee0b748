use crate::foundation::{
    core::Millis,
    error::AmbientResult,
    math::Rng64,
};

/// Default base delay between characters.
pub const DEFAULT_CHAR_INTERVAL_MS: u64 = 80;
/// Default cursor toggle period.
pub const DEFAULT_CURSOR_BLINK_MS: u64 = 530;
/// Default pause before reporting completion.
pub const DEFAULT_COMPLETION_HOLD_MS: u64 = 1000;
/// Default delay before the first character.
pub const DEFAULT_START_DELAY_MS: u64 = 200;
/// Lower bound for a jittered per-character delay.
pub const MIN_JITTERED_INTERVAL_MS: f64 = 30.0;
/// Total jitter spread as a fraction of the base interval (±30%).
pub const JITTER_SPREAD: f64 = 0.6;

/// Typewriter timing. Every field is optional in JSON.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    /// Base delay between characters.
    #[serde(deserialize_with = "clamped_ms")]
    pub char_interval_ms: u64,
    /// Apply ±30% jitter per character, floored at 30ms.
    pub natural_variation: bool,
    /// Cursor toggle period; `None` keeps the cursor solid.
    #[serde(deserialize_with = "clamped_opt_ms")]
    pub cursor_blink_interval_ms: Option<u64>,
    /// Pause between revealing the last character and reporting completion.
    #[serde(deserialize_with = "clamped_ms")]
    pub completion_hold_ms: u64,
    /// Delay before the first character.
    #[serde(deserialize_with = "clamped_ms")]
    pub start_delay_ms: u64,
    /// Seed of the jitter stream.
    pub seed: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            char_interval_ms: DEFAULT_CHAR_INTERVAL_MS,
            natural_variation: true,
            cursor_blink_interval_ms: Some(DEFAULT_CURSOR_BLINK_MS),
            completion_hold_ms: DEFAULT_COMPLETION_HOLD_MS,
            start_delay_ms: DEFAULT_START_DELAY_MS,
            seed: 0x7e57_7e57,
        }
    }
}

impl TypewriterConfig {
    /// Fixed cadence: character `i` appears at `interval * (i + 1)`, no jitter, no blinking,
    /// no completion hold.
    pub fn fixed(interval_ms: u64) -> Self {
        Self {
            char_interval_ms: interval_ms,
            natural_variation: false,
            cursor_blink_interval_ms: None,
            completion_hold_ms: 0,
            start_delay_ms: interval_ms,
            ..Self::default()
        }
    }

    /// Decode a partial JSON config and clamp it with [`normalized`](Self::normalized).
    ///
    /// Timing fields accept any JSON number; negative or fractional values are rounded and
    /// floored at zero before clamping, so only malformed JSON is an error.
    pub fn from_json(s: &str) -> AmbientResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        Ok(cfg.normalized())
    }

    /// Clamp intervals to at least 1ms instead of rejecting them. Delays are already `>= 0`.
    pub fn normalized(mut self) -> Self {
        self.char_interval_ms = self.char_interval_ms.max(1);
        self.cursor_blink_interval_ms = self.cursor_blink_interval_ms.map(|ms| ms.max(1));
        self
    }

    /// Delay before the next character after the first.
    pub fn next_char_delay(&self, rng: &mut Rng64) -> Millis {
        let base = self.char_interval_ms.max(1) as f64;
        if !self.natural_variation {
            return Millis::from_f64_round(base);
        }
        let variation = (rng.next_f64_01() - 0.5) * JITTER_SPREAD;
        Millis::from_f64_round((base + base * variation).max(MIN_JITTERED_INTERVAL_MS))
    }
}

/// Millisecond field that tolerates negative and fractional JSON numbers.
fn clamped_ms<'de, D: serde::Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    let ms = <f64 as serde::Deserialize>::deserialize(de)?;
    Ok(Millis::from_f64_round(ms).0)
}

fn clamped_opt_ms<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
    let ms = <Option<f64> as serde::Deserialize>::deserialize(de)?;
    Ok(ms.map(|ms| Millis::from_f64_round(ms).0))
}

#[cfg(test)]
#[path = "../../tests/unit/typing/config.rs"]
mod tests;
