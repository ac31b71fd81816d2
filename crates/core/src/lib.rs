//! Core library for the telerehabilitation rep counter.
//!
//! Pose and hand landmarks arrive one frame at a time from an external
//! detector. Each tracked exercise is described by an [`ExerciseRule`] that
//! derives a joint angle or distance from named landmarks; a [`Session`]
//! thresholds that metric into stage transitions, counts repetitions and
//! debounces jitter with a cooldown read from an injectable [`Clock`].

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod exercise;
pub mod geometry;
pub mod landmarks;
pub mod progress;
pub mod session;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{EngineConfig, ThresholdOverride};
pub use engine::{RepCounterEngine, SessionHandle};
pub use error::{RepCounterError, Result};
pub use exercise::{ExerciseRule, Metric, Subject};
pub use landmarks::{HandLandmark, HandLandmarks, LandmarkFrame, Point, PoseLandmark};
pub use progress::{ProgressTracker, SessionReport, TrackingSample, Trend};
pub use session::{FrameOutcome, Session, SessionState, Stage};
