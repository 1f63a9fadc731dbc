//! Tick sources and the cancellable repeating task that drives them
//!
//! Engines never schedule themselves. The session owns a `TickTask` bound to
//! either the host's frame callback or a fixed-period timer, and stops it the
//! instant a run ends or the host unmounts.

use serde::{Deserialize, Serialize};

use crate::error::MountError;

/// Keys the engines understand; anything else maps to `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Other,
}

impl Key {
    /// Map a DOM-style key/code name
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" | "w" | "W" => Key::Up,
            "ArrowDown" | "s" | "S" => Key::Down,
            "ArrowLeft" | "a" | "A" => Key::Left,
            "ArrowRight" | "d" | "D" => Key::Right,
            " " | "Space" => Key::Space,
            _ => Key::Other,
        }
    }
}

/// Raw input forwarded by the host
///
/// Handlers only record intent; state changes happen at the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Pointer press or touch start
    Tap,
}

/// What paces an engine's ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickSource {
    /// One tick per host animation frame
    Frame,
    /// One tick per elapsed interval, decoupled from frame rate
    Timer { interval_ms: f64 },
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Over { score: u64 },
}

/// Cancellable repeating task bound to a tick source
#[derive(Debug, Clone)]
pub struct TickTask {
    source: TickSource,
    max_substeps: u32,
    accumulator_ms: f64,
    pending_frame: Option<f64>,
    substeps: u32,
    cancelled: bool,
}

impl TickTask {
    pub fn new(source: TickSource, max_substeps: u32) -> Result<Self, MountError> {
        if max_substeps == 0 {
            return Err(MountError::NoTickBudget);
        }
        validate(source)?;
        Ok(Self {
            source,
            max_substeps,
            accumulator_ms: 0.0,
            pending_frame: None,
            substeps: 0,
            cancelled: false,
        })
    }

    pub fn source(&self) -> TickSource {
        self.source
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Stop the task; no further ticks are ever yielded
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.pending_frame = None;
        self.accumulator_ms = 0.0;
    }

    /// Switch pacing (e.g. a timer that speeds up); accumulated time is kept.
    /// An invalid source is ignored and the previous pacing stays in effect.
    pub fn retime(&mut self, source: TickSource) {
        if validate(source).is_ok() {
            self.source = source;
        } else {
            log::warn!("Ignoring invalid tick source {:?}", source);
        }
    }

    /// Feed elapsed wall time for one host frame
    pub fn begin_frame(&mut self, elapsed_ms: f64) {
        if self.cancelled {
            return;
        }
        let elapsed_ms = elapsed_ms.max(0.0);
        self.substeps = 0;
        match self.source {
            TickSource::Frame => self.pending_frame = Some(elapsed_ms),
            TickSource::Timer { interval_ms } => {
                // Bound the backlog so a long stall cannot burst past the cap
                let cap = interval_ms * self.max_substeps as f64;
                self.accumulator_ms = (self.accumulator_ms + elapsed_ms).min(cap);
            }
        }
    }

    /// Next due tick in this frame, yielding its step duration in ms
    pub fn next_tick(&mut self) -> Option<f64> {
        if self.cancelled || self.substeps >= self.max_substeps {
            return None;
        }
        let dt = match self.source {
            TickSource::Frame => self.pending_frame.take()?,
            TickSource::Timer { interval_ms } => {
                if self.accumulator_ms < interval_ms {
                    return None;
                }
                self.accumulator_ms -= interval_ms;
                interval_ms
            }
        };
        self.substeps += 1;
        Some(dt)
    }
}

fn validate(source: TickSource) -> Result<(), MountError> {
    match source {
        TickSource::Timer { interval_ms } if !(interval_ms.is_finite() && interval_ms > 0.0) => {
            Err(MountError::InvalidInterval(interval_ms))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(task: &mut TickTask) -> Vec<f64> {
        std::iter::from_fn(|| task.next_tick()).collect()
    }

    #[test]
    fn test_frame_source_one_tick_per_frame() {
        let mut task = TickTask::new(TickSource::Frame, 8).unwrap();
        task.begin_frame(16.0);
        assert_eq!(drain(&mut task), vec![16.0]);
        assert!(task.next_tick().is_none());
    }

    #[test]
    fn test_timer_accumulates() {
        let mut task = TickTask::new(TickSource::Timer { interval_ms: 200.0 }, 8).unwrap();
        task.begin_frame(150.0);
        assert!(drain(&mut task).is_empty());
        task.begin_frame(100.0);
        assert_eq!(drain(&mut task), vec![200.0]);
        task.begin_frame(350.0);
        assert_eq!(drain(&mut task).len(), 2);
    }

    #[test]
    fn test_timer_backlog_capped() {
        let mut task = TickTask::new(TickSource::Timer { interval_ms: 50.0 }, 4).unwrap();
        task.begin_frame(10_000.0);
        assert_eq!(drain(&mut task).len(), 4);
        task.begin_frame(0.0);
        assert!(drain(&mut task).is_empty());
    }

    #[test]
    fn test_cancel_stops_everything() {
        let mut task = TickTask::new(TickSource::Frame, 8).unwrap();
        task.begin_frame(16.0);
        task.cancel();
        assert!(task.next_tick().is_none());
        task.begin_frame(16.0);
        assert!(task.next_tick().is_none());
        assert!(task.is_cancelled());
    }

    #[test]
    fn test_invalid_timer_rejected() {
        assert!(matches!(
            TickTask::new(TickSource::Timer { interval_ms: 0.0 }, 8),
            Err(MountError::InvalidInterval(_))
        ));
        assert!(matches!(
            TickTask::new(TickSource::Timer { interval_ms: f64::NAN }, 8),
            Err(MountError::InvalidInterval(_))
        ));
        assert!(matches!(
            TickTask::new(TickSource::Frame, 0),
            Err(MountError::NoTickBudget)
        ));
    }

    #[test]
    fn test_retime_keeps_accumulator() {
        let mut task = TickTask::new(TickSource::Timer { interval_ms: 200.0 }, 8).unwrap();
        task.begin_frame(150.0);
        assert!(drain(&mut task).is_empty());
        task.retime(TickSource::Timer { interval_ms: 100.0 });
        assert_eq!(drain(&mut task), vec![100.0]);
        task.retime(TickSource::Timer { interval_ms: -1.0 });
        assert_eq!(task.source(), TickSource::Timer { interval_ms: 100.0 });
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowUp"), Key::Up);
        assert_eq!(Key::from_name(" "), Key::Space);
        assert_eq!(Key::from_name("Enter"), Key::Other);
    }
}
