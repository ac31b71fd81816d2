use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum number of samples before a trend is reported.
const MIN_TREND_SAMPLES: usize = 5;

/// Running totals captured at a fixed interval while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingSample {
    pub elapsed_ms: u64,
    pub reps: u32,
    pub points: u32,
}

/// Points, levels and achievements earned during one session, plus the
/// periodic samples used to judge whether performance is trending up.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    points_per_level: u32,
    tracking_interval: Duration,
    started_at: Duration,
    last_sample_at: Duration,
    points: u32,
    level: u32,
    achievements: Vec<String>,
    samples: Vec<TrackingSample>,
}

impl ProgressTracker {
    pub fn new(points_per_level: u32, tracking_interval: Duration, started_at: Duration) -> Self {
        Self {
            points_per_level: points_per_level.max(1),
            tracking_interval,
            started_at,
            last_sample_at: started_at,
            points: 0,
            level: 1,
            achievements: Vec::new(),
            samples: Vec::new(),
        }
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn achievements(&self) -> &[String] {
        &self.achievements
    }

    pub fn samples(&self) -> &[TrackingSample] {
        &self.samples
    }

    /// Percentage of the way through the current level.
    pub fn progress_percent(&self) -> f32 {
        (self.points % self.points_per_level) as f32 / self.points_per_level as f32 * 100.0
    }

    /// Credits a completed repetition. Returns the achievements unlocked by it.
    pub fn record_rep(&mut self, points: u32) -> Vec<String> {
        self.points = self.points.saturating_add(points);
        let target_level = self.points / self.points_per_level + 1;
        let mut unlocked = Vec::new();
        while self.level < target_level {
            self.level += 1;
            let achievement = format!("Reached Level {}", self.level);
            self.achievements.push(achievement.clone());
            unlocked.push(achievement);
        }
        unlocked
    }

    /// Records a sample if the tracking interval has elapsed since the last one.
    pub fn tick(&mut self, now: Duration, reps: u32) -> Option<TrackingSample> {
        if self.tracking_interval.is_zero() {
            return None;
        }
        if now.saturating_sub(self.last_sample_at) < self.tracking_interval {
            return None;
        }

        let sample = TrackingSample {
            elapsed_ms: duration_millis(now.saturating_sub(self.started_at)),
            reps,
            points: self.points,
        };
        self.samples.push(sample);
        self.last_sample_at = now;
        Some(sample)
    }

    /// Describes the trend of sampled points.
    pub fn prediction(&self) -> Trend {
        if self.samples.len() < MIN_TREND_SAMPLES {
            return Trend::InsufficientData;
        }

        let deltas: Vec<f64> = self
            .samples
            .windows(2)
            .map(|pair| f64::from(pair[1].points) - f64::from(pair[0].points))
            .collect();
        let average = deltas.iter().sum::<f64>() / deltas.len() as f64;

        if average > 0.0 {
            Trend::Improving
        } else if average < 0.0 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }
}

/// Serializable end-of-session summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub exercise: String,
    pub supported: bool,
    pub reps: u32,
    pub stage: String,
    pub points: u32,
    pub level: u32,
    pub progress_percent: f32,
    pub achievements: Vec<String>,
    pub samples: Vec<TrackingSample>,
    pub prediction: String,
}

/// Direction of the sampled points history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    InsufficientData,
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn message(self) -> &'static str {
        match self {
            Trend::InsufficientData => "Not enough data to predict.",
            Trend::Improving => "You're improving! Keep going!",
            Trend::Declining => "Your performance is declining. Try to focus!",
            Trend::Stable => "Your progress is stable. Keep it up!",
        }
    }
}

pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
