use serde::{Deserialize, Serialize};

/// A single landmark position in normalised image space. The pose model
/// reports `x` and `y` in `[0, 1]`; a depth value may ride along in the
/// payload but the counter only works in the image plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }
}

/// Stable body landmark identifiers in the order the pose model emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

/// Stable hand landmark identifiers, one set per detected hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub const COUNT: usize = 21;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb_cmc",
            Self::ThumbMcp => "thumb_mcp",
            Self::ThumbIp => "thumb_ip",
            Self::ThumbTip => "thumb_tip",
            Self::IndexFingerMcp => "index_finger_mcp",
            Self::IndexFingerPip => "index_finger_pip",
            Self::IndexFingerDip => "index_finger_dip",
            Self::IndexFingerTip => "index_finger_tip",
            Self::MiddleFingerMcp => "middle_finger_mcp",
            Self::MiddleFingerPip => "middle_finger_pip",
            Self::MiddleFingerDip => "middle_finger_dip",
            Self::MiddleFingerTip => "middle_finger_tip",
            Self::RingFingerMcp => "ring_finger_mcp",
            Self::RingFingerPip => "ring_finger_pip",
            Self::RingFingerDip => "ring_finger_dip",
            Self::RingFingerTip => "ring_finger_tip",
            Self::PinkyMcp => "pinky_mcp",
            Self::PinkyPip => "pinky_pip",
            Self::PinkyDip => "pinky_dip",
            Self::PinkyTip => "pinky_tip",
        }
    }
}

/// Landmarks for one hand, indexed by [`HandLandmark`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks(pub Vec<Point>);

impl HandLandmarks {
    pub fn get(&self, landmark: HandLandmark) -> Option<Point> {
        self.0.get(landmark.index()).copied()
    }
}

/// One capture tick worth of landmarks. Either set may be missing when the
/// detector found nothing; a missing or truncated set simply yields `None`
/// on lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub pose: Option<Vec<Point>>,
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Default::default()
        }
    }

    pub fn with_pose(timestamp_ms: u64, pose: Vec<Point>) -> Self {
        Self {
            timestamp_ms,
            pose: Some(pose),
            hands: Vec::new(),
        }
    }

    pub fn with_hands(timestamp_ms: u64, hands: Vec<HandLandmarks>) -> Self {
        Self {
            timestamp_ms,
            pose: None,
            hands,
        }
    }

    pub fn pose_point(&self, landmark: PoseLandmark) -> Option<Point> {
        self.pose
            .as_ref()
            .and_then(|points| points.get(landmark.index()).copied())
    }

    /// Decodes a single JSON encoded frame from text or raw bytes.
    pub fn from_json(line: impl AsRef<[u8]>) -> crate::Result<Self> {
        Ok(serde_json::from_slice(line.as_ref())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_pose_yields_none() {
        let frame = LandmarkFrame::with_pose(0, vec![Point::new(0.5, 0.5); 10]);
        assert!(frame.pose_point(PoseLandmark::Nose).is_some());
        assert!(frame.pose_point(PoseLandmark::LeftHip).is_none());
    }

    #[test]
    fn decodes_frame_with_depth_and_missing_fields() {
        let frame = LandmarkFrame::from_json(
            r#"{"timestamp_ms": 40, "hands": [[{"x": 0.1, "y": 0.2, "z": -0.3}]]}"#,
        )
        .unwrap();

        assert_eq!(frame.timestamp_ms, 40);
        assert!(frame.pose.is_none());
        let wrist = frame.hands[0].get(HandLandmark::Wrist).unwrap();
        assert_eq!(wrist.z, Some(-0.3));
        assert!(frame.hands[0].get(HandLandmark::ThumbTip).is_none());
    }

    #[test]
    fn landmark_names_follow_model_identifiers() {
        assert_eq!(PoseLandmark::LeftHip.index(), 23);
        assert_eq!(PoseLandmark::LeftHip.name(), "left_hip");
        assert_eq!(HandLandmark::IndexFingerTip.index(), 8);
        assert_eq!(HandLandmark::IndexFingerTip.name(), "index_finger_tip");
    }
}
