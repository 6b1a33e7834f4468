/// Debounced Text Input
///
/// Holds the draft text of a filter input and releases it only after the
/// user has stopped typing for the configured delay. The draft is echoed
/// back immediately; the released value is what drives a recompute.
///
/// Callers pass the current `Instant` explicitly, which keeps the timing
/// deterministic under test.

use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Trailing-edge debounce over one text input.
///
/// # Examples
///
/// ```
/// use datatable::DebouncedInput;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut input = DebouncedInput::new("", Duration::from_millis(500));
///
/// input.input("a", start);
/// input.input("al", start + Duration::from_millis(100));
/// assert_eq!(input.draft(), "al");
/// assert_eq!(input.poll(start + Duration::from_millis(550)), None);
/// assert_eq!(input.poll(start + Duration::from_millis(600)), Some("al".to_string()));
/// assert!(!input.is_pending());
/// ```
#[derive(Debug, Clone)]
pub struct DebouncedInput {
    draft: String,
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for DebouncedInput {
    fn default() -> Self {
        DebouncedInput::new("", Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl DebouncedInput {
    pub fn new(initial: impl Into<String>, delay: Duration) -> Self {
        DebouncedInput {
            draft: initial.into(),
            delay,
            deadline: None,
        }
    }

    /// Record a keystroke: update the draft and restart the delay.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.draft = text.into();
        self.deadline = Some(now + self.delay);
    }

    /// Release the draft once the delay has elapsed since the last input.
    /// Fires at most once per burst of input.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.draft.clone())
            }
            _ => None,
        }
    }

    /// Adopt a value changed from outside (e.g. a filter reset) and drop any
    /// pending release.
    pub fn sync(&mut self, value: impl Into<String>) {
        self.draft = value.into();
        self.deadline = None;
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut input = DebouncedInput::new("", ms(500));

        input.input("a", t0);
        input.input("an", t0 + ms(50));
        input.input("ann", t0 + ms(100));

        assert_eq!(input.deadline(), Some(t0 + ms(600)));
        assert_eq!(input.poll(t0 + ms(500)), None);
        assert_eq!(input.poll(t0 + ms(600)), Some("ann".to_string()));
        assert_eq!(input.poll(t0 + ms(2000)), None);
    }

    #[test]
    fn test_draft_is_immediate() {
        let mut input = DebouncedInput::default();
        input.input("bo", Instant::now());
        assert_eq!(input.draft(), "bo");
        assert!(input.is_pending());
        assert_eq!(input.delay(), ms(DEFAULT_DEBOUNCE_MS));
    }

    #[test]
    fn test_sync_cancels_pending() {
        let t0 = Instant::now();
        let mut input = DebouncedInput::new("old", ms(500));
        input.input("typing", t0);

        input.sync("");
        assert_eq!(input.draft(), "");
        assert!(!input.is_pending());
        assert_eq!(input.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn test_zero_delay_fires_on_next_poll() {
        let t0 = Instant::now();
        let mut input = DebouncedInput::new("", Duration::ZERO);
        input.input("x", t0);
        assert_eq!(input.poll(t0), Some("x".to_string()));
    }
}
