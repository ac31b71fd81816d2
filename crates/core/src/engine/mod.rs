use std::collections::HashMap;

use serde::Serialize;

use crate::{
    Clock, EngineConfig, FrameOutcome, LandmarkFrame, MonotonicClock, RepCounterError, Result,
    Session, SessionReport, SessionState,
};

/// Opaque identifier for a session owned by a [`RepCounterEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Owns any number of isolated sessions and the clock they are evaluated
/// against. Frames for one session must be fed serially.
#[derive(Debug)]
pub struct RepCounterEngine<C = MonotonicClock> {
    config: EngineConfig,
    clock: C,
    sessions: HashMap<SessionHandle, Session>,
    next_id: u64,
}

impl RepCounterEngine<MonotonicClock> {
    /// Creates an engine driven by the wall clock.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::start())
    }
}

impl<C: Clock> RepCounterEngine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            sessions: HashMap::new(),
            next_id: 1,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts tracking `exercise`. Unsupported names still produce a valid
    /// session that reports them on every frame.
    pub fn start_session(&mut self, exercise: &str) -> SessionHandle {
        let handle = SessionHandle(self.next_id);
        self.next_id += 1;

        let session = Session::start(exercise, &self.config, self.clock.now());
        tracing::info!(
            session = handle.0,
            exercise,
            supported = session.is_supported(),
            "session started"
        );
        self.sessions.insert(handle, session);
        handle
    }

    /// Feeds one frame to a session, reading the clock once, and returns
    /// the updated state. The state carries the rule's stage label, so it
    /// can be displayed as is.
    pub fn process_frame(
        &mut self,
        handle: SessionHandle,
        frame: &LandmarkFrame,
    ) -> Result<&SessionState> {
        self.evaluate(handle, frame)?;
        self.state(handle)
    }

    /// Like [`process_frame`](Self::process_frame) but reports what the frame did.
    pub fn evaluate(
        &mut self,
        handle: SessionHandle,
        frame: &LandmarkFrame,
    ) -> Result<FrameOutcome> {
        let now = self.clock.now();
        let session = self.session_mut(handle)?;
        Ok(session.process_frame_at(frame, now))
    }

    pub fn state(&self, handle: SessionHandle) -> Result<&SessionState> {
        self.session(handle).map(Session::state)
    }

    pub fn session(&self, handle: SessionHandle) -> Result<&Session> {
        self.sessions
            .get(&handle)
            .ok_or(RepCounterError::UnknownSession(handle.0))
    }

    pub fn report(&self, handle: SessionHandle) -> Result<SessionReport> {
        self.session(handle).map(Session::report)
    }

    /// Discards a session. Ending an unknown or already ended handle is a no-op.
    pub fn end_session(&mut self, handle: SessionHandle) {
        if let Some(session) = self.sessions.remove(&handle) {
            tracing::info!(
                session = handle.0,
                exercise = session.exercise(),
                reps = session.state().rep_count,
                "session ended"
            );
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn session_mut(&mut self, handle: SessionHandle) -> Result<&mut Session> {
        self.sessions
            .get_mut(&handle)
            .ok_or(RepCounterError::UnknownSession(handle.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, Stage};

    fn engine() -> (RepCounterEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let engine = RepCounterEngine::with_clock(EngineConfig::default(), clock.clone()).unwrap();
        (engine, clock)
    }

    #[test]
    fn sessions_are_isolated() {
        let (mut engine, _clock) = engine();
        let squats = engine.start_session("Squats");
        let juggling = engine.start_session("Juggling");
        assert_ne!(squats, juggling);

        engine.process_frame(juggling, &LandmarkFrame::empty(0)).unwrap();
        assert_eq!(engine.state(juggling).unwrap().last_feedback, "exercise not supported");
        assert_eq!(engine.state(squats).unwrap().last_feedback, "");
        assert_eq!(engine.state(squats).unwrap().stage, Stage::None);
    }

    #[test]
    fn ended_sessions_are_gone() {
        let (mut engine, _clock) = engine();
        let handle = engine.start_session("Squats");
        engine.end_session(handle);
        engine.end_session(handle);

        assert_eq!(engine.active_sessions(), 0);
        let err = engine.process_frame(handle, &LandmarkFrame::empty(0)).unwrap_err();
        assert!(matches!(err, RepCounterError::UnknownSession(id) if id == handle.id()));
    }

    #[test]
    fn reads_clock_for_cooldown() {
        let (mut engine, clock) = engine();
        let handle = engine.start_session("Squats");

        engine.process_frame(handle, &LandmarkFrame::empty(0)).unwrap();
        assert_eq!(engine.state(handle).unwrap().last_feedback, "landmarks not detected");

        clock.set_millis(1_000);
        let state = engine.process_frame(handle, &LandmarkFrame::empty(0)).unwrap();
        assert!(!state.in_cooldown(clock.now()));
    }

    #[test]
    fn returned_state_carries_display_label() {
        let (mut engine, _clock) = engine();
        let handle = engine.start_session("Squats");
        assert_eq!(engine.state(handle).unwrap().stage_label, "none");

        let json = r#"{"pose": [
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.3}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.5}, {"x": 0.5, "y": 0.5},
            {"x": 0.5, "y": 0.7}
        ]}"#;
        let frame = LandmarkFrame::from_json(json).unwrap();
        let state = engine.process_frame(handle, &frame).unwrap();

        assert_eq!(state.stage, Stage::Extended);
        assert_eq!(state.stage_label, "up");
        let encoded = serde_json::to_value(state).unwrap();
        assert_eq!(encoded["stage_label"], "up");
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            points_per_level: 0,
            ..EngineConfig::default()
        };
        assert!(RepCounterEngine::with_clock(config, ManualClock::new()).is_err());
    }
}
