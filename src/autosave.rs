// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Dirty tracking and autosave timing

use crate::config::AutosaveConfig;
use std::time::{Duration, Instant};

/// Shortest autosave interval allowed, in seconds.
pub const MIN_INTERVAL_SECS: u64 = 5;

/// Per-session edit state. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct AutosaveState {
    pub dirty: bool,
    /// Time of the last save attempt. None until the first tick.
    pub last_save: Option<Instant>,
}

impl AutosaveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Forget the clock and dirty flag (New, Load).
    pub fn reset(&mut self) {
        self.dirty = false;
        self.last_save = None;
    }

    /// Restart the clock after any save attempt; only a successful one clears dirty.
    pub fn record_attempt(&mut self, now: Instant, success: bool) {
        self.last_save = Some(now);
        if success {
            self.dirty = false;
        }
    }
}

/// When to flush a dirty note to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosavePolicy {
    pub enabled: bool,
    interval: Duration,
}

impl AutosavePolicy {
    pub fn new(enabled: bool, interval_secs: u64) -> Self {
        Self {
            enabled,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub fn from_config(config: &AutosaveConfig) -> Self {
        Self::new(config.enabled, config.interval_seconds)
    }

    /// Configured interval raised to the minimum.
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(Duration::from_secs(MIN_INTERVAL_SECS))
    }

    /// Sampled once per tick. The first sample of a session only starts the clock.
    pub fn should_autosave(&self, state: &mut AutosaveState, now: Instant) -> bool {
        let last = match state.last_save {
            Some(t) => t,
            None => {
                state.last_save = Some(now);
                return false;
            }
        };
        if !self.enabled || !state.dirty {
            return false;
        }
        now.saturating_duration_since(last) >= self.effective_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirty_at(t: Instant) -> AutosaveState {
        AutosaveState {
            dirty: true,
            last_save: Some(t),
        }
    }

    #[test]
    fn interval_is_clamped_to_minimum() {
        let policy = AutosavePolicy::new(true, 2);
        assert_eq!(policy.effective_interval(), Duration::from_secs(5));
        assert_eq!(
            AutosavePolicy::new(true, 60).effective_interval(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn fires_only_once_interval_has_elapsed() {
        let policy = AutosavePolicy::new(true, 2);
        let t0 = Instant::now();
        let mut state = dirty_at(t0);

        assert!(!policy.should_autosave(&mut state, t0 + Duration::from_secs(4)));
        assert!(policy.should_autosave(&mut state, t0 + Duration::from_secs(5)));
    }

    #[test]
    fn clean_state_never_fires() {
        let policy = AutosavePolicy::new(true, 5);
        let t0 = Instant::now();
        let mut state = AutosaveState {
            dirty: false,
            last_save: Some(t0),
        };
        for secs in [0, 5, 60, 3600] {
            assert!(!policy.should_autosave(&mut state, t0 + Duration::from_secs(secs)));
        }
    }

    #[test]
    fn disabled_never_fires() {
        let policy = AutosavePolicy::new(false, 5);
        let t0 = Instant::now();
        let mut state = dirty_at(t0);
        assert!(!policy.should_autosave(&mut state, t0 + Duration::from_secs(600)));
    }

    #[test]
    fn first_tick_starts_clock_instead_of_firing() {
        let policy = AutosavePolicy::new(true, 5);
        let mut state = AutosaveState::new();
        state.mark_dirty();
        let t0 = Instant::now();

        assert!(!policy.should_autosave(&mut state, t0));
        assert_eq!(state.last_save, Some(t0));
        assert!(!policy.should_autosave(&mut state, t0 + Duration::from_secs(3)));
        assert!(policy.should_autosave(&mut state, t0 + Duration::from_secs(5)));
    }

    #[test]
    fn failed_attempt_resets_clock_but_stays_dirty() {
        let policy = AutosavePolicy::new(true, 5);
        let t0 = Instant::now();
        let mut state = dirty_at(t0);

        let t1 = t0 + Duration::from_secs(5);
        assert!(policy.should_autosave(&mut state, t1));
        state.record_attempt(t1, false);
        assert!(state.dirty);
        assert!(!policy.should_autosave(&mut state, t1 + Duration::from_secs(1)));
        assert!(policy.should_autosave(&mut state, t1 + Duration::from_secs(5)));

        state.record_attempt(t1 + Duration::from_secs(5), true);
        assert!(!state.dirty);
    }

    #[test]
    fn reset_clears_clock_and_dirty() {
        let mut state = dirty_at(Instant::now());
        state.reset();
        assert!(!state.dirty);
        assert!(state.last_save.is_none());
    }
}
