//! Property tweens for camera transitions

use glam::Vec3;

/// Animatable properties of the camera and scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    CameraPosition,
    CameraRotation,
    SceneOffset,
}

/// Easing curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    /// Quadratic ease-out, `1 - (1 - p)^2`
    #[default]
    Power1Out,
}

impl Ease {
    pub fn apply(self, p: f32) -> f32 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Ease::Power1Out => 1.0 - (1.0 - p) * (1.0 - p),
        }
    }
}

/// Interpolates one [`Property`] from its start value to a target over a
/// fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTween {
    pub property: Property,
    pub from: Vec3,
    pub to: Vec3,
    pub duration: f32,
    pub ease: Ease,
    elapsed: f32,
}

impl PropertyTween {
    pub fn new(property: Property, from: Vec3, to: Vec3, duration: f32) -> Self {
        Self {
            property,
            from,
            to,
            duration,
            ease: Ease::default(),
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds and return the current value
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        self.elapsed += dt.max(0.0);
        self.value()
    }

    pub fn value(&self) -> Vec3 {
        if self.is_finished() {
            return self.to;
        }
        let t = self.ease.apply(self.elapsed / self.duration);
        self.from.lerp(self.to, t)
    }

    pub fn is_finished(&self) -> bool {
        self.duration <= 0.0 || self.elapsed >= self.duration
    }
}
