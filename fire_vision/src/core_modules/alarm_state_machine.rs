// THEORY:
// The `AlarmStateMachine` is the temporal layer of the engine. The stages before
// it look at one frame at a time and are noisy: a red shirt, a reflection or a
// dropped frame can flip the per-frame verdict. This module adds memory, and
// turns that flickering boolean into a stable alarm status.
//
// Key principles:
// 1.  **Arming**: a run of `frames_to_arm` consecutive positive frames moves the
//     machine into `Alarm`. Shorter runs only reach `Detecting`, a transient hint
//     that something fire-colored is in view.
// 2.  **Cooldown**: once raised, the status only drops back to `Normal` after
//     `frames_to_disarm` consecutive negative frames. Brief gaps in detection are
//     held through, so the alarm does not flicker.
// 3.  **Atomic update**: state and both counters change together inside one
//     `&mut self` call. Readers only ever see a complete `AlarmSnapshot`.
// 4.  **Owned, never global**: every pipeline owns its own machine, so any number
//     of them can run side by side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The debounced alarm status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlarmState {
    #[default]
    Normal,
    Detecting,
    Alarm,
}

impl AlarmState {
    pub fn is_alarm(&self) -> bool {
        matches!(self, AlarmState::Alarm)
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlarmState::Normal => "normal",
            AlarmState::Detecting => "detecting",
            AlarmState::Alarm => "alarm",
        };
        f.write_str(label)
    }
}

/// Consecutive hit/miss counters used for arming and cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebounceCounters {
    pub consecutive_hits: u32,
    pub consecutive_misses: u32,
}

/// A read-only, consistent view of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlarmSnapshot {
    pub state: AlarmState,
    pub consecutive_hits: u32,
    pub consecutive_misses: u32,
}

/// The outcome of feeding one frame (or a reset) to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub previous: AlarmState,
    pub current: AlarmState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Three-state debouncer with consecutive-frame arming and cooldown disarming.
#[derive(Debug, Clone)]
pub struct AlarmStateMachine {
    state: AlarmState,
    counters: DebounceCounters,
    frames_to_arm: u32,
    frames_to_disarm: u32,
}

impl AlarmStateMachine {
    /// Both thresholds are expected to be positive; `PipelineConfig::validate`
    /// enforces that before a machine is ever built from configuration.
    pub fn new(frames_to_arm: u32, frames_to_disarm: u32) -> Self {
        Self {
            state: AlarmState::Normal,
            counters: DebounceCounters::default(),
            frames_to_arm,
            frames_to_disarm,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn counters(&self) -> DebounceCounters {
        self.counters
    }

    pub fn snapshot(&self) -> AlarmSnapshot {
        AlarmSnapshot {
            state: self.state,
            consecutive_hits: self.counters.consecutive_hits,
            consecutive_misses: self.counters.consecutive_misses,
        }
    }

    /// Advances the machine by one analyzed frame.
    pub fn transition(&mut self, fire_detected: bool) -> Transition {
        let previous = self.state;

        if fire_detected {
            self.counters.consecutive_hits = self.counters.consecutive_hits.saturating_add(1);
            self.counters.consecutive_misses = 0;

            if self.counters.consecutive_hits >= self.frames_to_arm {
                self.state = AlarmState::Alarm;
            } else if self.state != AlarmState::Alarm {
                self.state = AlarmState::Detecting;
            }
        } else {
            self.counters.consecutive_misses = self.counters.consecutive_misses.saturating_add(1);
            self.counters.consecutive_hits = 0;

            let raised = matches!(self.state, AlarmState::Alarm | AlarmState::Detecting);
            if raised && self.counters.consecutive_misses >= self.frames_to_disarm {
                self.state = AlarmState::Normal;
                self.counters = DebounceCounters::default();
            }
        }

        Transition {
            previous,
            current: self.state,
        }
    }

    /// Unconditionally returns to `Normal` with both counters zeroed.
    pub fn reset(&mut self) -> Transition {
        let previous = self.state;
        self.state = AlarmState::Normal;
        self.counters = DebounceCounters::default();
        Transition {
            previous,
            current: self.state,
        }
    }
}
