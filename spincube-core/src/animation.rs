/// Per-frame animation state: spin angle, bouncing position and pause flag
use std::f32::consts::TAU;

use crate::config::{BounceLimits, SceneConfig};
use crate::mat4::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    /// Spin angle in radians, kept in `[0, TAU)`
    pub rotation: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    paused: bool,
}

impl AnimationState {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            rotation: 0.0,
            position: config.start_position,
            velocity: config.start_velocity,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advance by `dt` nominal frames.
    ///
    /// Does nothing while paused. Depth (`position[2]`) never changes; x and
    /// y bounce off `limits`.
    pub fn step(&mut self, config: &SceneConfig, limits: BounceLimits, dt: f32) {
        if self.paused {
            return;
        }

        self.rotation = (self.rotation + config.rotation_speed * dt).rem_euclid(TAU);
        self.position[0] += self.velocity[0] * dt;
        self.position[1] += self.velocity[1] * dt;

        bounce(self.position[0], &mut self.velocity[0], limits.x);
        bounce(self.position[1], &mut self.velocity[1], limits.y);
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(&SceneConfig::default())
    }
}

/// Reflects `velocity` when `position` is past `limit` and still heading
/// outward, so each crossing flips the sign once.
fn bounce(position: f32, velocity: &mut f32, limit: f32) {
    if (position > limit && *velocity > 0.0) || (position < -limit && *velocity < 0.0) {
        *velocity = -*velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: BounceLimits = BounceLimits { x: 2.0, y: 2.0 };

    #[test]
    fn test_initial_state() {
        let state = AnimationState::default();
        assert_eq!(state.rotation, 0.0);
        assert_eq!(state.position, [0.0, 0.0, -3.0]);
        assert_eq!(state.velocity, [0.01, 0.01, 0.0]);
        assert!(!state.is_paused());
    }

    #[test]
    fn test_step_advances() {
        let config = SceneConfig::default();
        let mut state = AnimationState::new(&config);
        state.step(&config, LIMITS, 1.0);
        assert!((state.rotation - 0.01).abs() < 1e-6);
        assert!((state.position[0] - 0.01).abs() < 1e-6);
        assert!((state.position[1] - 0.01).abs() < 1e-6);
        assert_eq!(state.position[2], -3.0);

        state.step(&config, LIMITS, 2.5);
        assert!((state.rotation - 0.035).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_wraps_at_full_turn() {
        let config = SceneConfig::default();
        let mut state = AnimationState::new(&config);
        state.rotation = TAU - 0.005;
        state.step(&config, LIMITS, 1.0);
        assert!((state.rotation - 0.005).abs() < 1e-5);
    }

    #[test]
    fn test_large_angle_keeps_spinning() {
        let config = SceneConfig::default();
        let mut state = AnimationState::new(&config);
        state.rotation = 300_000.0;
        state.step(&config, LIMITS, 1.0);
        assert!((0.0..TAU).contains(&state.rotation));

        let before = state.rotation;
        state.step(&config, LIMITS, 1.0);
        assert!((state.rotation - before - 0.01).abs() < 1e-5);
    }

    #[test]
    fn test_bounce_only_when_heading_outward() {
        let mut velocity = 0.5;
        bounce(2.1, &mut velocity, 2.0);
        assert_eq!(velocity, -0.5);
        // still past the limit but already heading back in
        bounce(2.05, &mut velocity, 2.0);
        assert_eq!(velocity, -0.5);
        bounce(-2.05, &mut velocity, 2.0);
        assert_eq!(velocity, 0.5);
        bounce(2.0, &mut velocity, 2.0);
        assert_eq!(velocity, 0.5);
    }

    #[test]
    fn test_paused_step_is_noop() {
        let config = SceneConfig::default();
        let mut state = AnimationState::new(&config);
        state.step(&config, LIMITS, 1.0);
        state.toggle_pause();
        let frozen = state;
        for _ in 0..100 {
            state.step(&config, LIMITS, 1.0);
        }
        assert_eq!(state, frozen);

        state.toggle_pause();
        state.step(&config, LIMITS, 1.0);
        assert!(state.rotation > frozen.rotation);
    }
}
