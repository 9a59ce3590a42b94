//! Integration tests for the overview / focus camera transition.

use glam::Vec3;
use treemap3d_lib::harness::TestHarness;
use treemap3d_lib::scene::Tag;
use treemap3d_lib::viewer::TOP_DOWN;
use treemap3d_lib::viewport::transition::{CameraMode, TransitionError};

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < 1e-3
}

fn focused_on_strings() -> (TestHarness, Tag) {
    let mut h = TestHarness::flare();
    let tag = Tag::Hierarchy(h.node_named("Strings").unwrap());
    assert!(h.hover(tag));
    (h, tag)
}

#[test]
fn test_zoom_in_centers_rectangle_under_camera() {
    let (mut h, tag) = focused_on_strings();
    let object = h.object(tag).unwrap();

    h.zoom().unwrap();
    assert!(h.viewer.is_animating());
    assert!(!h.viewer.controls.enabled);

    let frames = h.run_animation();
    assert!(frames > 1);
    assert!(!h.viewer.is_animating());
    assert_eq!(h.viewer.mode(), CameraMode::Focused(object));
    assert!(h.viewer.controls.enabled);

    assert!(close(h.viewer.camera.position, Vec3::new(0.0, 450.0, 0.0)));
    assert!(close(h.viewer.camera.rotation, TOP_DOWN));
    let center = h.world_center(object).unwrap();
    assert!(center.x.abs() < 1e-3 && center.z.abs() < 1e-3, "center {center}");
    // Vertical offset of the scene is unchanged
    assert_eq!(h.viewer.scene.position.y, h.viewer.overview_offset().y);
}

#[test]
fn test_zoom_out_restores_overview() {
    let (mut h, _) = focused_on_strings();
    let start_camera = h.viewer.camera.position;
    let start_rotation = h.viewer.camera.rotation;

    h.zoom().unwrap();
    h.run_animation();

    h.viewer.zoom_out().unwrap();
    h.run_animation();

    assert_eq!(h.viewer.mode(), CameraMode::Overview);
    assert!(h.viewer.controls.enabled);
    assert!(close(h.viewer.camera.position, start_camera));
    assert!(close(h.viewer.camera.rotation, start_rotation));
    assert!(close(h.viewer.scene.position, h.viewer.overview_offset()));
}

#[test]
fn test_double_click_with_nothing_focused_returns_to_overview() {
    let (mut h, _) = focused_on_strings();
    let start_camera = h.viewer.camera.position;
    let start_rotation = h.viewer.camera.rotation;

    h.zoom().unwrap();
    h.run_animation();
    assert!(matches!(h.viewer.mode(), CameraMode::Focused(_)));

    h.hover_background();
    assert_eq!(h.viewer.focused(), None);

    // Same gesture, no focus: back to the overview pose
    h.zoom().unwrap();
    h.run_animation();

    assert_eq!(h.viewer.mode(), CameraMode::Overview);
    assert!(h.viewer.controls.enabled);
    assert!(close(h.viewer.camera.position, start_camera));
    assert!(close(h.viewer.camera.rotation, start_rotation));
    assert!(close(h.viewer.scene.position, h.viewer.overview_offset()));
}

#[test]
fn test_double_click_on_background_in_overview_is_noop() {
    let mut h = TestHarness::flare();
    h.hover_background();
    let camera = h.viewer.camera.clone();

    h.zoom().unwrap();
    h.run_animation();

    assert_eq!(h.viewer.mode(), CameraMode::Overview);
    assert!(close(h.viewer.camera.position, camera.position));
    assert!(h.viewer.controls.enabled);
}

#[test]
fn test_zoom_while_animating_is_rejected() {
    let (mut h, tag) = focused_on_strings();
    let object = h.object(tag).unwrap();

    h.zoom().unwrap();
    h.viewer.on_frame(treemap3d_lib::harness::FRAME);
    assert_eq!(h.zoom(), Err(TransitionError::InFlight));
    assert_eq!(h.viewer.zoom_out(), Err(TransitionError::InFlight));

    h.run_animation();
    assert_eq!(h.viewer.mode(), CameraMode::Focused(object));
}

#[test]
fn test_pointer_ignored_during_transition() {
    let (mut h, tag) = focused_on_strings();
    let object = h.object(tag).unwrap();
    let stats = h.viewer.stats();

    h.zoom().unwrap();
    h.hover_background();
    assert_eq!(h.viewer.focused(), Some(object));
    assert_eq!(h.viewer.stats().highlight_attaches, stats.highlight_attaches);
    assert!(h.viewer.tooltip().is_visible());

    h.run_animation();
    // The focused rectangle now sits under the viewport center
    let center = h.screen_point(tag).unwrap();
    assert!((center - glam::Vec2::new(512.0, 384.0)).length() < 1.0, "{center}");
    assert!(h.hover(tag));
}

#[test]
fn test_refocus_from_focused_skips_dolly() {
    let (mut h, tag) = focused_on_strings();
    let object = h.object(tag).unwrap();
    h.zoom().unwrap();
    h.run_animation();

    assert!(h.hover(tag));
    h.zoom().unwrap();
    // Without the dolly phase the camera never rises above the focus height
    let mut frames = 0;
    while h.viewer.is_animating() {
        h.viewer.on_frame(treemap3d_lib::harness::FRAME);
        assert!(h.viewer.camera.position.y <= 450.0 + 1e-3);
        frames += 1;
    }
    assert!(frames <= 1);
    assert_eq!(h.viewer.mode(), CameraMode::Focused(object));
}

#[test]
fn test_focus_after_orbit_looks_straight_down() {
    let (mut h, tag) = focused_on_strings();
    let object = h.object(tag).unwrap();

    h.viewer.orbit(0.0, -20.0);
    assert!(!close(h.viewer.camera.rotation, TOP_DOWN));
    assert_eq!(h.viewer.focused(), Some(object));

    h.zoom().unwrap();
    h.run_animation();
    assert_eq!(h.viewer.mode(), CameraMode::Focused(object));
    assert!(close(h.viewer.camera.rotation, TOP_DOWN));
}
