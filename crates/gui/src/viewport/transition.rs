//! Camera transition state machine
//!
//! Two camera modes (overview and focused) and two transition states (idle
//! and transitioning). A transition optionally dollies the camera out
//! first, then runs up to three property tweens concurrently. Requests
//! arriving while a transition is running are rejected.

use glam::Vec3;

use super::camera::PerspectiveCamera;
use super::controls::OrbitControls;
use super::tween::{Property, PropertyTween};
use crate::scene::ObjectId;

/// Below this difference a property is considered already at its target
const SAME_VALUE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Overview,
    Focused(ObjectId),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a camera transition is already in progress")]
    InFlight,
}

/// Target pose of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub camera_position: Vec3,
    pub camera_rotation: Vec3,
    pub scene_offset: Vec3,
}

/// Pull the camera up to `height` before the main move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DollyOut {
    pub height: f32,
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub to: CameraMode,
    pub pose: Pose,
    pub dolly_out: Option<DollyOut>,
    /// Duration of the concurrent main tweens (seconds)
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    DollyOut(PropertyTween),
    Main(Vec<PropertyTween>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTransition {
    request: TransitionRequest,
    phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TransitionState {
    #[default]
    Idle,
    Transitioning(ActiveTransition),
}

/// Outcome of one animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Running,
    /// The transition completed this frame and the camera is now in this mode
    Finished(CameraMode),
}

#[derive(Debug, Default)]
pub struct CameraTransition {
    mode: CameraMode,
    state: TransitionState,
}

impl CameraTransition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, TransitionState::Transitioning(_))
    }

    /// Start a transition. Disables the orbit controls until it completes.
    pub fn begin(
        &mut self,
        request: TransitionRequest,
        camera: &PerspectiveCamera,
        scene_offset: Vec3,
        controls: &mut OrbitControls,
    ) -> Result<(), TransitionError> {
        if self.is_animating() {
            tracing::debug!("zoom request ignored: transition in flight");
            return Err(TransitionError::InFlight);
        }

        controls.enabled = false;
        let phase = match request.dolly_out {
            Some(dolly) => {
                let to = Vec3::new(camera.position.x, dolly.height, camera.position.z);
                Phase::DollyOut(PropertyTween::new(
                    Property::CameraPosition,
                    camera.position,
                    to,
                    dolly.duration,
                ))
            }
            None => Phase::Main(main_tweens(&request, camera, scene_offset)),
        };
        tracing::debug!(to = ?request.to, "camera transition started");
        self.state = TransitionState::Transitioning(ActiveTransition { request, phase });
        Ok(())
    }

    /// Advance the running transition by `dt` seconds
    pub fn tick(
        &mut self,
        dt: f32,
        camera: &mut PerspectiveCamera,
        scene_offset: &mut Vec3,
        controls: &mut OrbitControls,
    ) -> Tick {
        let TransitionState::Transitioning(active) = &mut self.state else {
            return Tick::Idle;
        };

        match &mut active.phase {
            Phase::DollyOut(tween) => {
                camera.position = tween.advance(dt);
                if tween.is_finished() {
                    active.phase = Phase::Main(main_tweens(&active.request, camera, *scene_offset));
                }
                Tick::Running
            }
            Phase::Main(tweens) => {
                for tween in tweens.iter_mut() {
                    let value = tween.advance(dt);
                    match tween.property {
                        Property::CameraPosition => camera.position = value,
                        Property::CameraRotation => camera.rotation = value,
                        Property::SceneOffset => *scene_offset = value,
                    }
                }
                if tweens.iter().all(PropertyTween::is_finished) {
                    let to = active.request.to;
                    self.finish(to, camera, controls);
                    Tick::Finished(to)
                } else {
                    Tick::Running
                }
            }
        }
    }

    fn finish(&mut self, to: CameraMode, camera: &mut PerspectiveCamera, controls: &mut OrbitControls) {
        self.state = TransitionState::Idle;
        self.mode = to;
        match to {
            CameraMode::Overview => controls.reset(camera),
            CameraMode::Focused(_) => {
                let below = Vec3::new(camera.position.x, 0.0, camera.position.z);
                controls.sync(camera, below);
            }
        }
        controls.enabled = true;
        tracing::debug!(mode = ?to, "camera transition finished");
    }
}

/// Tweens for every property whose target differs from its current value
fn main_tweens(request: &TransitionRequest, camera: &PerspectiveCamera, scene_offset: Vec3) -> Vec<PropertyTween> {
    let pose = request.pose;
    let candidates = [
        (Property::CameraPosition, camera.position, pose.camera_position),
        (Property::SceneOffset, scene_offset, pose.scene_offset),
        (Property::CameraRotation, camera.rotation, pose.camera_rotation),
    ];
    candidates
        .into_iter()
        .filter(|(_, current, target)| !current.abs_diff_eq(*target, SAME_VALUE_EPSILON))
        .map(|(property, current, target)| PropertyTween::new(property, current, target, request.duration))
        .collect()
}
