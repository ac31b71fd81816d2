use serde::Serialize;

use crate::{
    geometry::{distance, joint_angle, vertical_gap},
    HandLandmark, HandLandmarks, LandmarkFrame, PoseLandmark, RepCounterError, Result,
};

/// How a rule turns landmarks into the scalar it thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    /// Interior joint angle in degrees over three body landmarks.
    Angle {
        a: PoseLandmark,
        vertex: PoseLandmark,
        c: PoseLandmark,
    },
    /// Distance between two points of the same hand.
    HandDistance { from: HandLandmark, to: HandLandmark },
    /// Vertical separation between two points of the same hand.
    HandVerticalGap { from: HandLandmark, to: HandLandmark },
}

/// Which landmark set a metric is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Pose,
    EachHand,
}

impl Metric {
    pub fn subject(&self) -> Subject {
        match self {
            Metric::Angle { .. } => Subject::Pose,
            Metric::HandDistance { .. } | Metric::HandVerticalGap { .. } => Subject::EachHand,
        }
    }

    /// Evaluates a body metric. Returns `None` for hand metrics or when the
    /// pose set lacks one of the named landmarks.
    pub fn measure_pose(&self, frame: &LandmarkFrame) -> Option<f32> {
        match *self {
            Metric::Angle { a, vertex, c } => Some(joint_angle(
                frame.pose_point(a)?,
                frame.pose_point(vertex)?,
                frame.pose_point(c)?,
            )),
            _ => None,
        }
    }

    /// Evaluates a hand metric on a single detected hand.
    pub fn measure_hand(&self, hand: &HandLandmarks) -> Option<f32> {
        match *self {
            Metric::HandDistance { from, to } => Some(distance(hand.get(from)?, hand.get(to)?)),
            Metric::HandVerticalGap { from, to } => {
                Some(vertical_gap(hand.get(from)?, hand.get(to)?))
            }
            Metric::Angle { .. } => None,
        }
    }
}

/// Immutable description of one exercise: the metric, the two thresholds
/// that drive the stage machine and the labels shown for each stage.
///
/// Crossing above `high_threshold` marks the extended stage, dropping below
/// `low_threshold` from there completes a repetition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseRule {
    pub name: &'static str,
    pub metric: Metric,
    pub high_threshold: f32,
    pub low_threshold: f32,
    pub extended_label: &'static str,
    pub contracted_label: &'static str,
    pub extended_message: &'static str,
    pub contracted_message: &'static str,
    pub points_per_rep: u32,
}

const RULES: &[ExerciseRule] = &[
    ExerciseRule {
        name: "Squats",
        metric: Metric::Angle {
            a: PoseLandmark::LeftHip,
            vertex: PoseLandmark::LeftKnee,
            c: PoseLandmark::LeftAnkle,
        },
        high_threshold: 160.0,
        low_threshold: 90.0,
        extended_label: "up",
        contracted_label: "down",
        extended_message: "Stand straight",
        contracted_message: "Good squat!",
        points_per_rep: 10,
    },
    ExerciseRule {
        name: "Push-ups",
        metric: Metric::Angle {
            a: PoseLandmark::RightShoulder,
            vertex: PoseLandmark::RightElbow,
            c: PoseLandmark::RightWrist,
        },
        high_threshold: 160.0,
        low_threshold: 90.0,
        extended_label: "up",
        contracted_label: "down",
        extended_message: "Ready for push-up",
        contracted_message: "Good push-up!",
        points_per_rep: 10,
    },
    ExerciseRule {
        name: "Arm Raises",
        metric: Metric::Angle {
            a: PoseLandmark::RightShoulder,
            vertex: PoseLandmark::RightElbow,
            c: PoseLandmark::RightWrist,
        },
        high_threshold: 160.0,
        low_threshold: 110.0,
        extended_label: "up",
        contracted_label: "down",
        extended_message: "Arm raised",
        contracted_message: "Arm lowered",
        points_per_rep: 10,
    },
    ExerciseRule {
        name: "Finger Twirling",
        metric: Metric::HandDistance {
            from: HandLandmark::ThumbTip,
            to: HandLandmark::IndexFingerTip,
        },
        high_threshold: 0.06,
        low_threshold: 0.03,
        extended_label: "open",
        contracted_label: "closed",
        extended_message: "Fingers open",
        contracted_message: "Pinch complete!",
        points_per_rep: 5,
    },
    ExerciseRule {
        name: "Head Rotation",
        metric: Metric::Angle {
            a: PoseLandmark::LeftEar,
            vertex: PoseLandmark::Nose,
            c: PoseLandmark::RightEar,
        },
        high_threshold: 140.0,
        low_threshold: 100.0,
        extended_label: "rotated",
        contracted_label: "neutral",
        extended_message: "Head rotated",
        contracted_message: "Back to neutral",
        points_per_rep: 7,
    },
    ExerciseRule {
        name: "Fist Rotation",
        metric: Metric::HandVerticalGap {
            from: HandLandmark::Wrist,
            to: HandLandmark::PinkyTip,
        },
        high_threshold: 0.1,
        low_threshold: 0.05,
        extended_label: "down",
        contracted_label: "up",
        extended_message: "Fist turned down",
        contracted_message: "Good rotation!",
        points_per_rep: 8,
    },
];

impl ExerciseRule {
    /// Looks up the built-in rule for `name`. Matching is exact.
    pub fn lookup(name: &str) -> Option<ExerciseRule> {
        RULES.iter().find(|rule| rule.name == name).cloned()
    }

    /// All built-in rules in display order.
    pub fn supported() -> &'static [ExerciseRule] {
        RULES
    }

    pub fn subject(&self) -> Subject {
        self.metric.subject()
    }

    /// Returns a copy of the rule with replaced thresholds.
    pub fn with_thresholds(&self, high: f32, low: f32) -> Result<ExerciseRule> {
        validate_thresholds(self.name, high, low)?;
        Ok(ExerciseRule {
            high_threshold: high,
            low_threshold: low,
            ..self.clone()
        })
    }
}

pub(crate) fn validate_thresholds(name: &str, high: f32, low: f32) -> Result<()> {
    if !high.is_finite() || !low.is_finite() {
        return Err(RepCounterError::invalid_config(format!(
            "thresholds for `{name}` must be finite"
        )));
    }
    if high <= low {
        return Err(RepCounterError::invalid_config(format!(
            "high threshold ({high}) for `{name}` must exceed low threshold ({low})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    #[test]
    fn builtin_rules_are_well_formed() {
        for rule in ExerciseRule::supported() {
            assert!(
                rule.high_threshold > rule.low_threshold,
                "{} has inverted thresholds",
                rule.name
            );
            assert_ne!(rule.extended_label, rule.contracted_label);
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert!(ExerciseRule::lookup("Squats").is_some());
        assert!(ExerciseRule::lookup("squats").is_none());
        assert!(ExerciseRule::lookup("Juggling").is_none());
    }

    #[test]
    fn rejects_inverted_overrides() {
        let rule = ExerciseRule::lookup("Squats").unwrap();
        assert!(rule.with_thresholds(90.0, 160.0).is_err());
        assert!(rule.with_thresholds(f32::NAN, 10.0).is_err());

        let tuned = rule.with_thresholds(150.0, 100.0).unwrap();
        assert_eq!(tuned.high_threshold, 150.0);
        assert_eq!(tuned.extended_label, "up");
    }

    #[test]
    fn hand_metric_ignores_pose() {
        let rule = ExerciseRule::lookup("Finger Twirling").unwrap();
        assert_eq!(rule.subject(), Subject::EachHand);

        let mut points = vec![Point::new(0.5, 0.5); HandLandmark::COUNT];
        points[HandLandmark::ThumbTip.index()] = Point::new(0.40, 0.50);
        points[HandLandmark::IndexFingerTip.index()] = Point::new(0.50, 0.50);
        let hand = HandLandmarks(points);

        let value = rule.metric.measure_hand(&hand).unwrap();
        assert!((value - 0.1).abs() < 1e-4);
        assert!(rule.metric.measure_pose(&LandmarkFrame::empty(0)).is_none());
    }
}
