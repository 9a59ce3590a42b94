use glam::Vec3;

use super::camera::PerspectiveCamera;

/// Camera pose saved by [`OrbitControls::save_state`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedPose {
    pub target: Vec3,
    pub position: Vec3,
    pub rotation: Vec3,
}

/// Orbit controls: user-driven camera manipulation around a target point.
///
/// The camera stays on a sphere around `target`; yaw spins around the Y
/// axis and `elevation` is the angle above the XZ plane.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Input is ignored while disabled (e.g. during camera transitions)
    pub enabled: bool,
    pub target: Vec3,
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Angle above the ground plane (radians)
    pub elevation: f32,
    /// Distance from target
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Max angle between the camera and the +Y axis (radians)
    pub max_polar_angle: f32,
    saved: Option<SavedPose>,
}

impl OrbitControls {
    pub fn new(min_distance: f32, max_distance: f32, max_polar_angle: f32) -> Self {
        Self {
            enabled: true,
            target: Vec3::ZERO,
            yaw: 0.0,
            elevation: std::f32::consts::FRAC_PI_2,
            distance: max_distance,
            min_distance,
            max_distance,
            max_polar_angle,
            saved: None,
        }
    }

    fn min_elevation(&self) -> f32 {
        std::f32::consts::FRAC_PI_2 - self.max_polar_angle
    }

    /// Read the camera's position relative to `target` into the orbit
    /// parameters, clamp them, and re-aim the camera.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let distance = offset.length();
        if distance > f32::EPSILON {
            self.distance = distance;
            self.elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
            self.yaw = offset.x.atan2(offset.z);
        }
        self.clamp();
        self.apply(camera);
    }

    /// Adopt the camera's current pose without re-aiming it
    pub fn sync(&mut self, camera: &PerspectiveCamera, target: Vec3) {
        self.target = target;
        let offset = camera.position - target;
        let distance = offset.length();
        if distance > f32::EPSILON {
            self.distance = distance;
            self.elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
            self.yaw = offset.x.atan2(offset.z);
        }
    }

    fn clamp(&mut self) {
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self.elevation = self
            .elevation
            .clamp(self.min_elevation(), std::f32::consts::FRAC_PI_2);
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.elevation.sin_cos();
        self.target + Vec3::new(self.distance * cp * sy, self.distance * sp, self.distance * cp * cy)
    }

    fn apply(&self, camera: &mut PerspectiveCamera) {
        camera.position = self.eye_position();
        camera.look_at(self.target);
    }

    /// Orbit by a pointer drag (degrees). Returns whether the camera changed.
    pub fn rotate(&mut self, camera: &mut PerspectiveCamera, dx: f32, dy: f32) -> bool {
        if !self.enabled {
            return false;
        }
        self.yaw -= dx.to_radians();
        self.elevation += dy.to_radians();
        self.clamp();
        self.apply(camera);
        true
    }

    /// Dolly toward (positive) or away from the target
    pub fn zoom(&mut self, camera: &mut PerspectiveCamera, delta: f32) -> bool {
        if !self.enabled {
            return false;
        }
        self.distance *= 1.0 - delta;
        self.clamp();
        self.apply(camera);
        true
    }

    /// Move target and camera together in the ground plane
    pub fn pan(&mut self, camera: &mut PerspectiveCamera, dx: f32, dz: f32) -> bool {
        if !self.enabled {
            return false;
        }
        let (sy, cy) = self.yaw.sin_cos();
        let right = Vec3::new(cy, 0.0, -sy);
        let back = Vec3::new(sy, 0.0, cy);
        self.target += right * dx + back * dz;
        self.apply(camera);
        true
    }

    /// Remember the current camera pose for [`OrbitControls::reset`]
    pub fn save_state(&mut self, camera: &PerspectiveCamera) {
        self.saved = Some(SavedPose {
            target: self.target,
            position: camera.position,
            rotation: camera.rotation,
        });
    }

    pub fn saved(&self) -> Option<SavedPose> {
        self.saved
    }

    /// Restore the saved pose exactly
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) {
        if let Some(saved) = self.saved {
            camera.position = saved.position;
            camera.rotation = saved.rotation;
            self.sync(camera, saved.target);
        }
    }
}
