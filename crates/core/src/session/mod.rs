//! Per-exercise repetition counting.
//!
//! A [`Session`] folds a stream of [`LandmarkFrame`]s into a stage machine
//! with three states: `None` before the first extension, `Extended` once the
//! rule's metric rises above its high threshold, and `Contracted` once it
//! falls back below the low threshold. Only the `Extended -> Contracted`
//! edge counts a repetition. After every accepted transition the session
//! ignores frames until the cooldown elapses, which keeps per-frame jitter
//! around a threshold from producing phantom reps.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::{
    exercise::Subject,
    progress::{duration_millis, ProgressTracker, SessionReport},
    EngineConfig, ExerciseRule, LandmarkFrame,
};

pub const FEEDBACK_UNSUPPORTED: &str = "exercise not supported";
pub const FEEDBACK_NOT_DETECTED: &str = "landmarks not detected";
const NO_STAGE_LABEL: &str = "none";

/// Coarse phase of the repetition cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    None,
    Extended,
    Contracted,
}

/// Observable state of a session after the most recent frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub rep_count: u32,
    pub stage: Stage,
    /// The rule's name for `stage`, e.g. `"up"` or `"closed"`.
    pub stage_label: &'static str,
    #[serde(serialize_with = "serialize_millis")]
    pub cooldown_until: Option<Duration>,
    pub last_feedback: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            rep_count: 0,
            stage: Stage::None,
            stage_label: NO_STAGE_LABEL,
            cooldown_until: None,
            last_feedback: String::new(),
        }
    }
}

impl SessionState {
    pub fn in_cooldown(&self, now: Duration) -> bool {
        self.cooldown_until.map(|until| now < until).unwrap_or(false)
    }
}

fn serialize_millis<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(duration) => serializer.serialize_some(&duration_millis(*duration)),
        None => serializer.serialize_none(),
    }
}

/// What a single frame did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// The session tracks an exercise without a rule.
    Unsupported,
    /// Arrived inside the cooldown window and was ignored entirely.
    Debounced,
    /// The landmark set the rule needs was absent or incomplete.
    MissingLandmarks,
    /// Landmarks were present but produced a non-finite metric.
    Rejected,
    /// Evaluated without crossing a threshold.
    Steady,
    /// Entered the extended stage.
    Extended,
    /// Completed a repetition.
    RepCompleted { rep_count: u32 },
}

#[derive(Debug)]
enum Measurement {
    Missing,
    Rejected,
    Values(Vec<f32>),
}

/// Tracking state for one exercise. Sessions share nothing with each other.
#[derive(Debug, Clone)]
pub struct Session {
    exercise: String,
    rule: Option<ExerciseRule>,
    cooldown: Duration,
    state: SessionState,
    progress: ProgressTracker,
}

impl Session {
    /// Starts a session for `exercise` using an already resolved rule. A
    /// `None` rule yields a degraded session that never counts.
    pub fn new(
        exercise: impl Into<String>,
        rule: Option<ExerciseRule>,
        config: &EngineConfig,
        now: Duration,
    ) -> Self {
        let exercise = exercise.into();
        if rule.is_none() {
            tracing::warn!(exercise = %exercise, "no rule for exercise, session will not count");
        }
        Self {
            exercise,
            rule,
            cooldown: config.cooldown(),
            state: SessionState::default(),
            progress: ProgressTracker::new(
                config.points_per_level,
                config.tracking_interval(),
                now,
            ),
        }
    }

    /// Starts a session resolving the rule from `config`. Invalid overrides
    /// fall back to the built-in thresholds.
    pub fn start(exercise: impl Into<String>, config: &EngineConfig, now: Duration) -> Self {
        let exercise = exercise.into();
        let rule = config.rule_for(&exercise).unwrap_or_else(|err| {
            tracing::warn!(exercise = %exercise, %err, "ignoring threshold override");
            ExerciseRule::lookup(&exercise)
        });
        Self::new(exercise, rule, config, now)
    }

    pub fn exercise(&self) -> &str {
        &self.exercise
    }

    pub fn rule(&self) -> Option<&ExerciseRule> {
        self.rule.as_ref()
    }

    pub fn is_supported(&self) -> bool {
        self.rule.is_some()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Display label of the current stage, `"none"` before the first transition.
    pub fn stage_label(&self) -> &'static str {
        self.state.stage_label
    }

    /// Evaluates one frame captured at `now`.
    pub fn process_frame_at(&mut self, frame: &LandmarkFrame, now: Duration) -> FrameOutcome {
        let Some(rule) = self.rule.as_ref() else {
            self.state.last_feedback = FEEDBACK_UNSUPPORTED.to_string();
            return FrameOutcome::Unsupported;
        };

        self.progress.tick(now, self.state.rep_count);

        if self.state.in_cooldown(now) {
            tracing::trace!(exercise = %self.exercise, "frame inside cooldown window");
            return FrameOutcome::Debounced;
        }

        let values = match measure(rule, frame) {
            Measurement::Values(values) => values,
            Measurement::Missing => {
                self.state.last_feedback = FEEDBACK_NOT_DETECTED.to_string();
                return FrameOutcome::MissingLandmarks;
            }
            Measurement::Rejected => {
                tracing::debug!(
                    exercise = %self.exercise,
                    "rejecting frame with non-finite metric"
                );
                return FrameOutcome::Rejected;
            }
        };

        // Several hands share one stage; the first one to cross a threshold wins.
        let stage = self.state.stage;
        let Some((metric, next)) = values
            .into_iter()
            .find_map(|metric| next_stage(rule, stage, metric).map(|next| (metric, next)))
        else {
            return FrameOutcome::Steady;
        };

        self.state.stage = next;
        self.state.cooldown_until = Some(now + self.cooldown);

        match next {
            Stage::Extended => {
                self.state.stage_label = rule.extended_label;
                self.state.last_feedback = rule.extended_message.to_string();
                tracing::debug!(
                    exercise = %self.exercise,
                    metric,
                    stage = rule.extended_label,
                    "stage transition"
                );
                FrameOutcome::Extended
            }
            _ => {
                self.state.rep_count += 1;
                self.state.stage_label = rule.contracted_label;
                self.state.last_feedback = rule.contracted_message.to_string();
                for achievement in self.progress.record_rep(rule.points_per_rep) {
                    tracing::info!(exercise = %self.exercise, %achievement, "achievement unlocked");
                }
                tracing::debug!(
                    exercise = %self.exercise,
                    metric,
                    stage = rule.contracted_label,
                    reps = self.state.rep_count,
                    "repetition completed"
                );
                FrameOutcome::RepCompleted {
                    rep_count: self.state.rep_count,
                }
            }
        }
    }

    /// Summary of the session so far.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            exercise: self.exercise.clone(),
            supported: self.is_supported(),
            reps: self.state.rep_count,
            stage: self.stage_label().to_string(),
            points: self.progress.points(),
            level: self.progress.level(),
            progress_percent: self.progress.progress_percent(),
            achievements: self.progress.achievements().to_vec(),
            samples: self.progress.samples().to_vec(),
            prediction: self.progress.prediction().message().to_string(),
        }
    }
}

fn measure(rule: &ExerciseRule, frame: &LandmarkFrame) -> Measurement {
    let values: Vec<f32> = match rule.subject() {
        Subject::Pose => rule.metric.measure_pose(frame).into_iter().collect(),
        Subject::EachHand => frame
            .hands
            .iter()
            .filter_map(|hand| rule.metric.measure_hand(hand))
            .collect(),
    };

    if values.is_empty() {
        return Measurement::Missing;
    }

    let finite: Vec<f32> = values.into_iter().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        Measurement::Rejected
    } else {
        Measurement::Values(finite)
    }
}

fn next_stage(rule: &ExerciseRule, stage: Stage, metric: f32) -> Option<Stage> {
    if metric > rule.high_threshold && stage != Stage::Extended {
        Some(Stage::Extended)
    } else if metric < rule.low_threshold && stage == Stage::Extended {
        Some(Stage::Contracted)
    } else {
        None
    }
}
