use glam::{Mat4, Vec3};

use crate::scene::resources::{Geometry, Resources};
use crate::scene::{ObjectId, SceneGraph};

/// A ray in world space; `direction` is expected to be normalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The unit cube centered at the origin
    pub const UNIT: Aabb = Aabb {
        min: Vec3::splat(-0.5),
        max: Vec3::splat(0.5),
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }

    /// The 12 edges as corner index pairs into [`Aabb::corners`]
    pub const EDGES: [(usize, usize); 12] = [
        (0, 1), (1, 2), (2, 3), (3, 0),
        (4, 5), (5, 6), (6, 7), (7, 4),
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];

    /// Bounds of this box after transforming all corners
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self::from_points(self.corners().map(|c| matrix.transform_point3(c)))
    }
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = ray.direction.recip();

    let t1 = (aabb.min - ray.origin) * inv_dir;
    let t2 = (aabb.max - ray.origin) * inv_dir;

    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Closest approach between a ray and the segment `a..b`.
/// Returns `(t along the ray, squared distance between the closest points)`.
pub fn ray_segment(ray: &Ray, a: Vec3, b: Vec3) -> (f32, f32) {
    const EPSILON: f32 = 1e-12;

    let d1 = ray.direction;
    let d2 = b - a;
    let r = ray.origin - a;
    let dd1 = d1.dot(d1);
    let dd2 = d2.dot(d2);
    let f = d2.dot(r);
    let c = d1.dot(r);

    let (t, s) = if dd2 <= EPSILON {
        ((-c / dd1).max(0.0), 0.0)
    } else {
        let b12 = d1.dot(d2);
        let denom = dd1 * dd2 - b12 * b12;
        let mut t = if denom.abs() > EPSILON {
            ((b12 * f - c * dd2) / denom).max(0.0)
        } else {
            0.0
        };
        let mut s = (b12 * t + f) / dd2;
        if s < 0.0 {
            s = 0.0;
            t = (-c / dd1).max(0.0);
        } else if s > 1.0 {
            s = 1.0;
            t = ((b12 - c) / dd1).max(0.0);
        }
        (t, s)
    };

    let on_ray = ray.at(t);
    let on_segment = a + d2 * s;
    (t, on_ray.distance_squared(on_segment))
}

/// Picking parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickParams {
    /// Max distance between the ray and a line for it to count as hit
    pub line_threshold: f32,
    /// Character width factor used to size text bounds
    pub text_tolerance: f32,
}

impl Default for PickParams {
    fn default() -> Self {
        Self {
            line_threshold: 1.0,
            text_tolerance: 0.6,
        }
    }
}

/// A single ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub object: ObjectId,
    pub distance: f32,
}

/// Intersect the ray with every object in the scene (recursively).
/// Hits are sorted nearest first.
pub fn intersect_objects(
    scene: &SceneGraph,
    resources: &Resources,
    ray: &Ray,
    params: &PickParams,
) -> Vec<Hit> {
    let mut hits = Vec::new();

    for (id, object) in scene.iter() {
        let Some(geometry) = resources.geometry(object.geometry) else {
            continue;
        };
        let Some(world) = scene.world_matrix(id) else {
            continue;
        };

        let distance = match geometry {
            Geometry::Box => ray_aabb(ray, &Aabb::UNIT.transformed(&world)),
            Geometry::Text { text, size, depth } => {
                let width = text.chars().count() as f32 * size * params.text_tolerance;
                let local = Aabb {
                    min: Vec3::ZERO,
                    max: Vec3::new(width, *size, *depth),
                };
                ray_aabb(ray, &local.transformed(&world))
            }
            Geometry::BoxEdges => {
                let corners = Aabb::UNIT.corners().map(|c| world.transform_point3(c));
                nearest_line_hit(
                    ray,
                    Aabb::EDGES.iter().map(|&(a, b)| (corners[a], corners[b])),
                    params.line_threshold,
                )
            }
            Geometry::Curve { points } => {
                let world_points: Vec<Vec3> =
                    points.iter().map(|p| world.transform_point3(*p)).collect();
                nearest_line_hit(
                    ray,
                    world_points.windows(2).map(|w| (w[0], w[1])),
                    params.line_threshold,
                )
            }
            // Sprites live in the screen-space overlay
            Geometry::Sprite => None,
        };

        if let Some(distance) = distance {
            hits.push(Hit {
                object: id,
                distance,
            });
        }
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

fn nearest_line_hit(
    ray: &Ray,
    segments: impl Iterator<Item = (Vec3, Vec3)>,
    threshold: f32,
) -> Option<f32> {
    let threshold_sq = threshold * threshold;
    segments
        .map(|(a, b)| ray_segment(ray, a, b))
        .filter(|&(_, dist_sq)| dist_sq <= threshold_sq)
        .map(|(t, _)| t)
        .min_by(f32::total_cmp)
}

/// The nearest hit that is a data primitive; decorations are skipped.
pub fn nearest_tagged(hits: &[Hit], scene: &SceneGraph) -> Option<ObjectId> {
    hits.iter()
        .map(|h| h.object)
        .find(|&id| scene.tag(id).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::Rgb;
    use crate::scene::resources::Material;
    use crate::scene::{Decoration, ObjectKind, SceneObject, Tag, Transform};

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, 100.0, z),
            direction: Vec3::NEG_Y,
        }
    }

    fn add_box(scene: &mut SceneGraph, r: &mut Resources, kind: ObjectKind, pos: Vec3, scale: Vec3) -> ObjectId {
        scene.add(SceneObject::new(
            kind,
            Transform::at(pos).with_scale(scale),
            r.add_geometry(Geometry::Box),
            r.add_material(Material::mesh(Rgb::WHITE)),
        ))
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let ray = down_ray(0.0, 0.0);
        assert_eq!(ray_aabb(&ray, &Aabb::UNIT), Some(99.5));
        assert_eq!(ray_aabb(&down_ray(2.0, 0.0), &Aabb::UNIT), None);
    }

    #[test]
    fn test_ray_aabb_origin_inside() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::X,
        };
        assert_eq!(ray_aabb(&ray, &Aabb::UNIT), Some(0.5));
    }

    #[test]
    fn test_ray_segment_distance() {
        let ray = down_ray(0.0, 0.0);
        let (t, d2) = ray_segment(&ray, Vec3::new(-1.0, 0.0, 0.5), Vec3::new(1.0, 0.0, 0.5));
        assert!((t - 100.0).abs() < 1e-4);
        assert!((d2 - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_hits_sorted_nearest_first() {
        let mut r = Resources::new();
        let mut scene = SceneGraph::new();
        let low = add_box(&mut scene, &mut r, ObjectKind::Data(Tag::Hierarchy(0)), Vec3::ZERO, Vec3::splat(10.0));
        let high = add_box(&mut scene, &mut r, ObjectKind::Data(Tag::Hierarchy(1)), Vec3::new(0.0, 20.0, 0.0), Vec3::splat(4.0));

        let hits = intersect_objects(&scene, &r, &down_ray(0.0, 0.0), &PickParams::default());
        let ids: Vec<ObjectId> = hits.iter().map(|h| h.object).collect();
        assert_eq!(ids, vec![high, low]);
    }

    #[test]
    fn test_nearest_tagged_skips_decorations() {
        let mut r = Resources::new();
        let mut scene = SceneGraph::new();
        let data = add_box(&mut scene, &mut r, ObjectKind::Data(Tag::Hierarchy(3)), Vec3::ZERO, Vec3::splat(10.0));
        add_box(&mut scene, &mut r, ObjectKind::Decoration(Decoration::Platform), Vec3::new(0.0, 20.0, 0.0), Vec3::splat(10.0));

        let hits = intersect_objects(&scene, &r, &down_ray(1.0, 1.0), &PickParams::default());
        assert_eq!(hits.len(), 2);
        assert_eq!(nearest_tagged(&hits, &scene), Some(data));
    }

    #[test]
    fn test_edges_hit_within_threshold_only() {
        let mut r = Resources::new();
        let mut scene = SceneGraph::new();
        scene.add(SceneObject::new(
            ObjectKind::Decoration(Decoration::Frame),
            Transform::default().with_scale(Vec3::splat(10.0)),
            r.add_geometry(Geometry::BoxEdges),
            r.add_material(Material::line(Rgb::WHITE)),
        ));
        let params = PickParams::default();
        // Near the x = 5 edge
        assert_eq!(intersect_objects(&scene, &r, &down_ray(5.5, 0.0), &params).len(), 1);
        // Center of the top face is far from every edge
        assert!(intersect_objects(&scene, &r, &down_ray(0.0, 0.0), &params).is_empty());
    }

    #[test]
    fn test_empty_scene_has_no_hits() {
        let scene = SceneGraph::new();
        let hits = intersect_objects(&scene, &Resources::new(), &down_ray(0.0, 0.0), &PickParams::default());
        assert!(hits.is_empty());
        assert_eq!(nearest_tagged(&hits, &scene), None);
    }

    #[test]
    fn test_disposed_geometry_is_not_hit() {
        let mut r = Resources::new();
        let mut scene = SceneGraph::new();
        let id = add_box(&mut scene, &mut r, ObjectKind::Data(Tag::Hierarchy(0)), Vec3::ZERO, Vec3::ONE);
        let geometry = scene.get(id).unwrap().geometry;
        r.dispose_geometry(geometry);
        assert!(intersect_objects(&scene, &r, &down_ray(0.0, 0.0), &PickParams::default()).is_empty());
    }
}
