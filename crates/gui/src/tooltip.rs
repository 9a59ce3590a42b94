//! Tooltip strategies
//!
//! Both strategies follow the same lifecycle: `attach` once the viewer is
//! ready, `update` whenever a new object gains focus, `clear` on focus loss
//! or camera movement, `dispose` on teardown.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::resources::{
    Geometry, GeometryId, Material, MaterialId, MaterialKind, Resources, Texture, TextureId,
};
use crate::viewport::camera::Viewport;

/// Pixel offset of the overlay tooltip from the pointer
pub const POINTER_OFFSET: f32 = 5.0;
/// Approximate glyph advance of the tooltip font (pixels)
pub const CHAR_WIDTH: f32 = 7.0;
pub const LINE_HEIGHT: f32 = 14.0;
/// Panel padding on each side (pixels)
pub const PADDING: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipKind {
    #[default]
    Overlay,
    Sprite,
}

impl std::str::FromStr for TooltipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overlay" | "html" => Ok(Self::Overlay),
            "sprite" => Ok(Self::Sprite),
            other => Err(format!("unknown tooltip kind: {other}")),
        }
    }
}

/// Text shown for a focused object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipContent {
    pub title: String,
    pub value: String,
}

impl TooltipContent {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }

    pub fn lines(&self) -> [&str; 2] {
        [&self.title, &self.value]
    }

    /// Estimated panel size in pixels
    pub fn panel_size(&self) -> Vec2 {
        let chars = self.title.chars().count().max(self.value.chars().count());
        Vec2::new(
            chars as f32 * CHAR_WIDTH + PADDING * 2.0,
            LINE_HEIGHT * 2.0 + PADDING * 2.0,
        )
    }
}

pub trait Tooltip {
    fn kind(&self) -> TooltipKind;

    fn attach(&mut self);

    /// Show `content` for the pointer at `screen` (absolute pixels)
    fn update(
        &mut self,
        content: &TooltipContent,
        screen: Vec2,
        viewport: &Viewport,
        resources: &mut Resources,
    );

    fn clear(&mut self, resources: &mut Resources);

    /// Release everything the tooltip allocated. Safe to call twice.
    fn dispose(&mut self, resources: &mut Resources);

    /// Content currently displayed, if visible
    fn content(&self) -> Option<&TooltipContent>;

    /// Top-left corner of the panel in absolute screen pixels, if visible
    fn anchor(&self, viewport: &Viewport) -> Option<Vec2>;

    fn is_visible(&self) -> bool {
        self.content().is_some()
    }
}

pub fn create(kind: TooltipKind, resources: &mut Resources, max_title_chars: usize) -> Box<dyn Tooltip> {
    match kind {
        TooltipKind::Overlay => Box::new(OverlayTooltip::default()),
        TooltipKind::Sprite => Box::new(SpriteTooltip::new(resources, max_title_chars)),
    }
}

/// Panel drawn by the UI layer on top of the viewport
#[derive(Debug, Default)]
pub struct OverlayTooltip {
    shown: Option<(TooltipContent, Vec2)>,
}

impl Tooltip for OverlayTooltip {
    fn kind(&self) -> TooltipKind {
        TooltipKind::Overlay
    }

    fn attach(&mut self) {}

    fn update(&mut self, content: &TooltipContent, screen: Vec2, _viewport: &Viewport, _resources: &mut Resources) {
        self.shown = Some((content.clone(), screen + Vec2::splat(POINTER_OFFSET)));
    }

    fn clear(&mut self, _resources: &mut Resources) {
        self.shown = None;
    }

    fn dispose(&mut self, _resources: &mut Resources) {
        self.shown = None;
    }

    fn content(&self) -> Option<&TooltipContent> {
        self.shown.as_ref().map(|(c, _)| c)
    }

    fn anchor(&self, _viewport: &Viewport) -> Option<Vec2> {
        self.shown.as_ref().map(|(_, p)| *p)
    }
}

/// Billboard in the orthographic overlay scene, textured with the tooltip
/// panel. Its resources are allocated up front and live until `dispose`.
#[derive(Debug)]
pub struct SpriteTooltip {
    geometry: GeometryId,
    material: MaterialId,
    texture: TextureId,
    /// Top-left corner in overlay coordinates (origin at viewport center, y up)
    pub position: Vec3,
    /// Texture canvas size
    pub scale: Vec2,
    content: Option<TooltipContent>,
    disposed: bool,
}

impl SpriteTooltip {
    /// `max_title_chars` sizes the canvas for the longest title it will show
    pub fn new(resources: &mut Resources, max_title_chars: usize) -> Self {
        let scale = Vec2::new(
            (max_title_chars as f32 * CHAR_WIDTH).ceil() + PADDING * 2.0,
            LINE_HEIGHT * 2.0 + PADDING * 2.0,
        );
        let texture = resources.add_texture(Texture {
            width: scale.x,
            height: scale.y,
            ..Texture::default()
        });
        let material = resources.add_material(Material {
            kind: MaterialKind::Sprite { texture },
            ..Material::mesh(crate::helpers::Rgb::WHITE)
        });
        let geometry = resources.add_geometry(Geometry::Sprite);
        Self {
            geometry,
            material,
            texture,
            position: Vec3::ZERO,
            scale,
            content: None,
            disposed: false,
        }
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }
}

impl Tooltip for SpriteTooltip {
    fn kind(&self) -> TooltipKind {
        TooltipKind::Sprite
    }

    fn attach(&mut self) {}

    fn update(&mut self, content: &TooltipContent, screen: Vec2, viewport: &Viewport, resources: &mut Resources) {
        if self.disposed {
            return;
        }
        if let Some(texture) = resources.texture_mut(self.texture) {
            texture.lines = content.lines().iter().map(|l| l.to_string()).collect();
            texture.revision += 1;
        }
        let local = screen - viewport.origin;
        self.position = Vec3::new(
            local.x - viewport.width / 2.0,
            -local.y + viewport.height / 2.0,
            1.0,
        );
        self.content = Some(content.clone());
    }

    fn clear(&mut self, resources: &mut Resources) {
        if let Some(texture) = resources.texture_mut(self.texture) {
            texture.lines.clear();
            texture.revision += 1;
        }
        self.content = None;
    }

    fn dispose(&mut self, resources: &mut Resources) {
        resources.dispose_geometry(self.geometry);
        resources.dispose_material(self.material);
        resources.dispose_texture(self.texture);
        self.content = None;
        self.disposed = true;
    }

    fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }

    fn anchor(&self, viewport: &Viewport) -> Option<Vec2> {
        self.content.as_ref()?;
        Some(
            viewport.origin
                + Vec2::new(
                    self.position.x + viewport.width / 2.0,
                    viewport.height / 2.0 - self.position.y,
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> TooltipContent {
        TooltipContent::new("flare/analytics", "48,716")
    }

    /// Shared lifecycle every strategy must satisfy
    fn check_contract(tooltip: &mut dyn Tooltip, resources: &mut Resources) {
        let viewport = Viewport::new(800.0, 600.0);
        tooltip.attach();
        assert!(!tooltip.is_visible());

        tooltip.update(&content(), Vec2::new(100.0, 50.0), &viewport, resources);
        assert_eq!(tooltip.content(), Some(&content()));
        let anchor = tooltip.anchor(&viewport).unwrap();
        assert!(anchor.x >= 100.0 && anchor.y >= 50.0);

        tooltip.clear(resources);
        assert!(!tooltip.is_visible());
        assert_eq!(tooltip.anchor(&viewport), None);

        tooltip.dispose(resources);
        tooltip.dispose(resources);
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn test_overlay_satisfies_contract() {
        let mut resources = Resources::new();
        let mut tooltip = OverlayTooltip::default();
        check_contract(&mut tooltip, &mut resources);
        assert_eq!(resources.memory().geometries, 0);
    }

    #[test]
    fn test_sprite_satisfies_contract() {
        let mut resources = Resources::new();
        let mut tooltip = SpriteTooltip::new(&mut resources, 20);
        assert_eq!(resources.memory().geometries, 1);
        assert_eq!(resources.memory().textures, 1);
        check_contract(&mut tooltip, &mut resources);
        assert_eq!(resources.memory(), Default::default());
    }

    #[test]
    fn test_overlay_offset_from_pointer() {
        let mut tooltip = OverlayTooltip::default();
        let viewport = Viewport::new(800.0, 600.0);
        tooltip.update(&content(), Vec2::new(10.0, 20.0), &viewport, &mut Resources::new());
        assert_eq!(tooltip.anchor(&viewport), Some(Vec2::new(15.0, 25.0)));
    }

    #[test]
    fn test_sprite_position_in_overlay_space() {
        let mut resources = Resources::new();
        let mut tooltip = SpriteTooltip::new(&mut resources, 10);
        let viewport = Viewport::new(800.0, 600.0);
        tooltip.update(&content(), Vec2::new(100.0, 50.0), &viewport, &mut resources);
        assert_eq!(tooltip.position, Vec3::new(-300.0, 250.0, 1.0));
        assert_eq!(tooltip.anchor(&viewport), Some(Vec2::new(100.0, 50.0)));

        let texture = resources.texture(tooltip.texture()).unwrap();
        assert_eq!(texture.lines, vec!["flare/analytics", "48,716"]);
        assert_eq!(texture.width, 80.0);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("sprite".parse::<TooltipKind>(), Ok(TooltipKind::Sprite));
        assert_eq!("overlay".parse::<TooltipKind>(), Ok(TooltipKind::Overlay));
        assert!("div".parse::<TooltipKind>().is_err());
    }
}
