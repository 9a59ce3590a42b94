//! Procedural toy city
//!
//! Buildings occupy lots of a `cols × rows` grid on a flat platform. A
//! seeded [`StdRng`] drives every random choice, so the same config always
//! yields the same city. Some buildings link to up to three others; links
//! are only shown as arcs while their source building is focused.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use shared::GridPos;

use super::resources::{Geometry, GeometryId, Material, MaterialId, Resources};
use super::{Decoration, ObjectKind, SceneGraph, SceneObject, Tag, Transform};
use crate::helpers::Rgb;

/// Segments of a connection arc
pub const CURVE_SEGMENTS: usize = 16;

pub const PLATFORM_COLOR: Rgb = Rgb::from_hex(0xdddddd);

/// Building facade colors
pub const PALETTE: [Rgb; 6] = [
    Rgb::from_hex(0x0088ff),
    Rgb::from_hex(0x44aa88),
    Rgb::from_hex(0x8844aa),
    Rgb::from_hex(0xaa8844),
    Rgb::from_hex(0xe55064),
    Rgb::from_hex(0x5b6770),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    pub cols: u32,
    pub rows: u32,
    pub seed: u64,
    /// Probability that a lot holds a building
    pub occupancy: f64,
    /// Edge length of one square lot
    pub lot_size: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Building footprint as a fraction of the lot
    pub min_footprint: f32,
    pub max_footprint: f32,
    pub max_links: usize,
    pub platform_thickness: f32,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            cols: 12,
            rows: 12,
            seed: 42,
            occupancy: 0.7,
            lot_size: 20.0,
            min_height: 5.0,
            max_height: 60.0,
            min_footprint: 0.4,
            max_footprint: 0.8,
            max_links: 3,
            platform_thickness: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub pos: GridPos,
    pub height: f32,
    pub width: f32,
    pub depth: f32,
    pub color: Rgb,
}

/// A generated city: buildings by lot plus the directed link relation
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub config: CityConfig,
    pub buildings: BTreeMap<GridPos, Building>,
    pub adjacency: BTreeMap<GridPos, Vec<GridPos>>,
}

impl City {
    pub fn generate(config: CityConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let occupancy = config.occupancy.clamp(0.0, 1.0);
        let heights = ordered(config.min_height, config.max_height);
        let footprints = ordered(config.min_footprint, config.max_footprint);

        let mut buildings = BTreeMap::new();
        for z in 0..config.rows {
            for x in 0..config.cols {
                if !rng.gen_bool(occupancy) {
                    continue;
                }
                let pos = GridPos::new(x, z);
                let building = Building {
                    pos,
                    height: rng.gen_range(heights.0..=heights.1),
                    width: rng.gen_range(footprints.0..=footprints.1) * config.lot_size,
                    depth: rng.gen_range(footprints.0..=footprints.1) * config.lot_size,
                    color: PALETTE[rng.gen_range(0..PALETTE.len())],
                };
                buildings.insert(pos, building);
            }
        }

        let keys: Vec<GridPos> = buildings.keys().copied().collect();
        let mut adjacency = BTreeMap::new();
        for &key in &keys {
            let candidates: Vec<GridPos> = keys.iter().copied().filter(|&k| k != key).collect();
            let n = rng.gen_range(0..=config.max_links).min(candidates.len());
            if n == 0 {
                continue;
            }
            let targets: Vec<GridPos> = candidates.choose_multiple(&mut rng, n).copied().collect();
            adjacency.insert(key, targets);
        }

        tracing::info!(
            seed = config.seed,
            buildings = buildings.len(),
            links = adjacency.values().map(Vec::len).sum::<usize>(),
            "city generated"
        );
        Self {
            config,
            buildings,
            adjacency,
        }
    }

    pub fn building(&self, pos: GridPos) -> Option<&Building> {
        self.buildings.get(&pos)
    }

    /// Targets linked from `pos`
    pub fn links(&self, pos: GridPos) -> &[GridPos] {
        self.adjacency.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Platform extent along X and Z
    pub fn footprint(&self) -> (f32, f32) {
        (
            self.config.cols as f32 * self.config.lot_size,
            self.config.rows as f32 * self.config.lot_size,
        )
    }

    /// Center of a lot at ground level
    pub fn lot_center(&self, pos: GridPos) -> Vec3 {
        let lot = self.config.lot_size;
        Vec3::new(pos.x as f32 * lot + lot / 2.0, 0.0, pos.z as f32 * lot + lot / 2.0)
    }

    /// Scene offset that centers the platform on the origin
    pub fn base_offset(&self) -> Vec3 {
        let (w, d) = self.footprint();
        Vec3::new(-w / 2.0, 0.0, -d / 2.0)
    }

    /// Arcs from the roof of `pos` to the roof of each linked building
    pub fn connection_curves(&self, pos: GridPos) -> Vec<Vec<Vec3>> {
        let Some(from) = self.building(pos) else {
            return Vec::new();
        };
        let start = self.lot_center(pos) + Vec3::Y * from.height;
        self.links(pos)
            .iter()
            .filter_map(|&target| {
                let to = self.building(target)?;
                let end = self.lot_center(target) + Vec3::Y * to.height;
                Some(connection_curve(start, end, CURVE_SEGMENTS))
            })
            .collect()
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    (a.min(b), a.max(b))
}

/// Quadratic arc from `start` to `end`, raised by half the span at its
/// midpoint. Returns `segments + 1` points.
pub fn connection_curve(start: Vec3, end: Vec3, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    let lift = start.distance(end) / 2.0;
    let control = (start + end) / 2.0 + Vec3::Y * lift;
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            start * (u * u) + control * (2.0 * u * t) + end * (t * t)
        })
        .collect()
}

/// Resources shared by the city scene
#[derive(Debug, Clone, PartialEq)]
pub struct CityPool {
    pub box_geometry: GeometryId,
    pub edge_geometry: GeometryId,
    pub fills: Vec<MaterialId>,
    pub line: MaterialId,
    pub platform: MaterialId,
}

impl CityPool {
    pub fn new(resources: &mut Resources) -> Self {
        Self {
            box_geometry: resources.add_geometry(Geometry::Box),
            edge_geometry: resources.add_geometry(Geometry::BoxEdges),
            fills: PALETTE
                .iter()
                .map(|&c| resources.add_material(Material::mesh(c)))
                .collect(),
            line: resources.add_material(Material::line(Rgb::from_hex(0x333333))),
            platform: resources.add_material(Material::mesh(PLATFORM_COLOR)),
        }
    }

    fn fill(&self, color: Rgb) -> MaterialId {
        let index = PALETTE.iter().position(|&c| c == color).unwrap_or(0);
        self.fills[index]
    }

    pub fn dispose(&self, resources: &mut Resources) {
        resources.dispose_geometry(self.box_geometry);
        resources.dispose_geometry(self.edge_geometry);
        for &m in &self.fills {
            resources.dispose_material(m);
        }
        resources.dispose_material(self.line);
        resources.dispose_material(self.platform);
    }
}

/// Add the platform and one framed box per building
pub fn build_city_scene(city: &City, scene: &mut SceneGraph, resources: &mut Resources) -> CityPool {
    let pool = CityPool::new(resources);
    let (w, d) = city.footprint();
    let t = city.config.platform_thickness;

    scene.add(SceneObject::new(
        ObjectKind::Decoration(Decoration::Platform),
        Transform::at(Vec3::new(w / 2.0, -t / 2.0, d / 2.0)).with_scale(Vec3::new(w, t, d)),
        pool.box_geometry,
        pool.platform,
    ));

    for building in city.buildings.values() {
        let center = city.lot_center(building.pos);
        let id = scene.add(SceneObject::new(
            ObjectKind::Data(Tag::Building(building.pos)),
            Transform::at(center + Vec3::Y * (building.height / 2.0))
                .with_scale(Vec3::new(building.width, building.height, building.depth)),
            pool.box_geometry,
            pool.fill(building.color),
        ));
        scene.add_child(
            id,
            SceneObject::new(
                ObjectKind::Decoration(Decoration::Frame),
                Transform::default(),
                pool.edge_geometry,
                pool.line,
            ),
        );
    }

    tracing::debug!(buildings = city.buildings.len(), "city scene built");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_generation_is_deterministic() {
        let a = City::generate(fixtures::small_city_config());
        let b = City::generate(fixtures::small_city_config());
        assert_eq!(a, b);

        let other = City::generate(CityConfig {
            seed: 8,
            ..fixtures::small_city_config()
        });
        assert_ne!(a.buildings, other.buildings);
    }

    #[test]
    fn test_full_occupancy_fills_grid() {
        let city = City::generate(fixtures::small_city_config());
        assert_eq!(city.buildings.len(), 12);
        for b in city.buildings.values() {
            assert!(b.height >= 5.0 && b.height <= 60.0);
            assert!(b.width <= city.config.lot_size);
            assert!(PALETTE.contains(&b.color));
        }
    }

    #[test]
    fn test_adjacency_bounds() {
        for seed in 0..20 {
            let city = City::generate(CityConfig {
                seed,
                ..CityConfig::default()
            });
            for (key, targets) in &city.adjacency {
                assert!(!targets.is_empty() && targets.len() <= 3);
                assert!(!targets.contains(key));
                assert!(targets.iter().all(|t| city.buildings.contains_key(t)));
                let mut unique = targets.clone();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), targets.len());
            }
        }
    }

    #[test]
    fn test_empty_city() {
        let city = City::generate(CityConfig {
            occupancy: 0.0,
            ..CityConfig::default()
        });
        assert!(city.buildings.is_empty());
        assert!(city.adjacency.is_empty());
        assert!(city.connection_curves(GridPos::new(0, 0)).is_empty());
    }

    #[test]
    fn test_connection_curve_shape() {
        let start = Vec3::ZERO;
        let end = Vec3::new(20.0, 0.0, 0.0);
        let points = connection_curve(start, end, CURVE_SEGMENTS);
        assert_eq!(points.len(), CURVE_SEGMENTS + 1);
        assert_eq!(points[0], start);
        assert_eq!(points[CURVE_SEGMENTS], end);
        // Apex at t = 0.5 sits halfway up the control point's lift
        let mid = points[CURVE_SEGMENTS / 2];
        assert!((mid - Vec3::new(10.0, 5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_curves_follow_links() {
        let city = City::generate(fixtures::small_city_config());
        for (&key, targets) in &city.adjacency {
            let curves = city.connection_curves(key);
            assert_eq!(curves.len(), targets.len());
            let roof = city.lot_center(key) + Vec3::Y * city.building(key).unwrap().height;
            assert_eq!(curves[0][0], roof);
        }
    }

    #[test]
    fn test_scene_has_platform_and_tagged_buildings() {
        let city = City::generate(fixtures::small_city_config());
        let mut scene = SceneGraph::new();
        let mut resources = Resources::new();
        let pool = build_city_scene(&city, &mut scene, &mut resources);

        let tagged = scene.iter().filter(|(_, o)| o.tag().is_some()).count();
        assert_eq!(tagged, city.buildings.len());
        let pos = *city.buildings.keys().next().unwrap();
        let id = scene.find_tagged(Tag::Building(pos)).unwrap();
        let object = scene.get(id).unwrap();
        assert_eq!(object.transform.position.y, city.building(pos).unwrap().height / 2.0);

        scene.clear(&mut resources);
        pool.dispose(&mut resources);
        assert_eq!(resources.memory(), Default::default());
    }

    #[test]
    fn test_base_offset_centers_platform() {
        let city = City::generate(fixtures::small_city_config());
        assert_eq!(city.footprint(), (80.0, 60.0));
        assert_eq!(city.base_offset(), Vec3::new(-40.0, 0.0, -30.0));
    }
}
