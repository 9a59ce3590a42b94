use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

use super::picking::Ray;

/// Screen-space drawing surface: top-left origin and size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Pixel offset inside the viewport → normalized device coordinates (-1..1, y up)
    pub fn to_ndc(&self, local: Vec2) -> Vec2 {
        Vec2::new(
            (local.x / self.width) * 2.0 - 1.0,
            -(local.y / self.height) * 2.0 + 1.0,
        )
    }

    /// Normalized device coordinates → absolute screen pixels
    pub fn from_ndc(&self, ndc: Vec2) -> Vec2 {
        self.origin
            + Vec2::new(
                (ndc.x + 1.0) * 0.5 * self.width,
                (1.0 - ndc.y) * 0.5 * self.height,
            )
    }
}

/// Perspective camera with an explicit position and Euler XYZ rotation
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    /// Euler angles (radians), XYZ order
    pub rotation: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Camera → world
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position)
    }

    /// World → camera
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    /// Camera → clip
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Viewing direction in world space
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Rotate the camera to face `target`. Looking straight along the Y
    /// axis falls back to -Z as the up vector.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-10 {
            if forward.y < 0.0 {
                Vec3::NEG_Z
            } else {
                Vec3::Z
            }
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, target, up);
        let orientation = Quat::from_mat4(&view).inverse();
        let (x, y, z) = orientation.to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }

    /// Cast a ray from the camera through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let vp_inv = self.view_projection().inverse();
        let far_world = vp_inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.position,
            direction: (far - self.position).normalize_or_zero(),
        }
    }

    /// Project a world point to screen pixels. Returns the pixel position
    /// and the view-space distance, or None when the point is behind the camera.
    pub fn project(&self, point: Vec3, viewport: &Viewport) -> Option<(Vec2, f32)> {
        let view = self.view_matrix().transform_point3(point);
        let clip = self.projection_matrix() * view.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some((viewport.from_ndc(Vec2::new(ndc.x, ndc.y)), -view.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn top_down() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.2, 1500.0);
        camera.position = Vec3::new(0.0, 750.0, 0.0);
        camera.rotation = Vec3::new(-FRAC_PI_2, 0.0, 0.0);
        camera
    }

    #[test]
    fn test_viewport_ndc_roundtrip() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.to_ndc(Vec2::new(400.0, 300.0)), Vec2::ZERO);
        assert_eq!(vp.to_ndc(Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.from_ndc(Vec2::new(1.0, -1.0)), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn test_center_ray_points_down() {
        let ray = top_down().ray_from_ndc(Vec2::ZERO);
        assert_eq!(ray.origin, Vec3::new(0.0, 750.0, 0.0));
        assert!((ray.direction - Vec3::NEG_Y).length() < 1e-4);
    }

    #[test]
    fn test_project_center_point() {
        let vp = Viewport::new(800.0, 600.0);
        let camera = PerspectiveCamera {
            aspect: vp.aspect(),
            ..top_down()
        };
        let (screen, depth) = camera.project(Vec3::ZERO, &vp).unwrap();
        assert!((screen - Vec2::new(400.0, 300.0)).length() < 1e-2);
        assert!((depth - 750.0).abs() < 1e-2);
        assert!(camera.project(Vec3::new(0.0, 800.0, 0.0), &vp).is_none());
    }

    #[test]
    fn test_look_at_straight_down_matches_overview_rotation() {
        let mut camera = top_down();
        camera.rotation = Vec3::ZERO;
        camera.look_at(Vec3::ZERO);
        assert!((camera.rotation - Vec3::new(-FRAC_PI_2, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_look_at_oblique() {
        let mut camera = PerspectiveCamera::new(45.0, 1.0, 1.0, 1000.0);
        camera.position = Vec3::new(3.0, 5.0, 4.0);
        camera.look_at(Vec3::ZERO);
        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!((camera.forward() - expected).length() < 1e-4);
    }
}
