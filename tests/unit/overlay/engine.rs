use super::*;
use crate::{
    foundation::core::{Rect, Size, Vec2},
    overlay::mount::FixedMount,
    runtime::virtual_host::VirtualHost,
};

const THREE: &str = r#"<svg viewBox="0 0 10 10"><path d="M0 0"/><circle r="1"/><rect width="1" height="1"/></svg>"#;

fn three_point_mount() -> FixedMount {
    FixedMount::points([
        ("doodle-1", Point::new(0.0, 0.0)),
        ("doodle-2", Point::new(50.0, 50.0)),
        ("doodle-3", Point::new(500.0, 500.0)),
    ])
}

fn started(config: OverlayConfig, mount: FixedMount) -> (ReactiveOverlay<FixedMount>, VirtualHost) {
    let mut host = VirtualHost::new();
    let mut overlay = ReactiveOverlay::new(config, mount, Viewport::new(1000.0, 800.0));
    overlay.start(THREE, &mut host);
    (overlay, host)
}

#[test]
fn pointer_near_two_of_three_shapes() {
    let (mut overlay, _host) = started(OverlayConfig::default(), three_point_mount());
    assert_eq!(overlay.ids(), vec!["doodle-1", "doodle-2", "doodle-3"]);

    overlay.on_event(HostEvent::PointerMove(Point::new(10.0, 10.0)));
    assert_eq!(overlay.active_ids(), vec!["doodle-1", "doodle-2"]);
    assert_eq!(overlay.is_active("doodle-3"), Some(false));
    assert_eq!(overlay.mount().rendered_active("doodle-1"), Some(true));
    assert_eq!(overlay.mount().rendered_active("doodle-3"), Some(false));
}

#[test]
fn reference_points_are_box_centers() {
    let mount = FixedMount::new([("doodle-2", Rect::new(10.0, 20.0, 30.0, 60.0))]);
    let (overlay, _host) = started(OverlayConfig::default(), mount);
    assert_eq!(overlay.reference_point("doodle-2"), Some(Point::new(20.0, 40.0)));
    assert_eq!(overlay.reference_point("doodle-1"), None);
    assert_eq!(overlay.is_active("doodle-1"), Some(false));
}

#[test]
fn suppression_clears_now_and_resumes_on_next_move() {
    let (mut overlay, _host) = started(OverlayConfig::default(), three_point_mount());
    overlay.on_event(HostEvent::PointerMove(Point::new(10.0, 10.0)));
    assert_eq!(overlay.active_ids().len(), 2);

    overlay.set_suppressed(true);
    assert!(overlay.active_ids().is_empty());
    assert_eq!(overlay.mount().rendered_active("doodle-1"), Some(false));

    overlay.on_event(HostEvent::PointerMove(Point::new(10.0, 10.0)));
    assert!(overlay.active_ids().is_empty());

    overlay.set_suppressed(false);
    assert!(overlay.active_ids().is_empty());
    overlay.on_event(HostEvent::PointerMove(Point::new(10.0, 10.0)));
    assert_eq!(overlay.active_ids().len(), 2);
}

#[test]
fn measured_layout_listens_to_scroll_and_recomputes() {
    let (mut overlay, host) = started(OverlayConfig::default(), three_point_mount());
    assert_eq!(host.listener_count(), 3);
    assert!(host.is_listening(EventKind::Scroll));

    overlay.on_event(HostEvent::Scroll(Vec2::new(0.0, 50.0)));
    assert_eq!(overlay.reference_point("doodle-2"), Some(Point::new(50.0, 0.0)));

    overlay.on_event(HostEvent::PointerMove(Point::new(120.0, 0.0)));
    assert_eq!(overlay.active_ids(), vec!["doodle-2"]);
}

#[test]
fn scroll_is_ignored_when_disabled() {
    let config = OverlayConfig {
        recompute_on_scroll: false,
        ..OverlayConfig::default()
    };
    let (mut overlay, host) = started(config, three_point_mount());
    assert_eq!(host.listener_count(), 2);
    overlay.on_event(HostEvent::Scroll(Vec2::new(0.0, 50.0)));
    assert_eq!(overlay.reference_point("doodle-2"), Some(Point::new(50.0, 50.0)));
}

#[test]
fn procedural_layout_avoids_safe_zone_and_replaces_on_resize() {
    let config = OverlayConfig {
        policy: LayoutPolicy::Procedural,
        ..OverlayConfig::default()
    };
    let (mut overlay, host) = started(config, FixedMount::default());
    assert!(!host.is_listening(EventKind::Scroll));

    let safe = SafeZone::default().rect(Size::new(1000.0, 800.0));
    let before: Vec<Point> = overlay
        .ids()
        .iter()
        .filter_map(|id| overlay.reference_point(id))
        .collect();
    assert_eq!(before.len(), 3);
    assert!(before.iter().all(|p| !safe.contains(*p)));
    assert!(before[0].y < safe.y0);
    assert!(before[1].x >= safe.x1);
    assert!(before[2].y >= safe.y1);

    overlay.on_event(HostEvent::Resize(Size::new(500.0, 400.0)));
    let after: Vec<Point> = overlay
        .ids()
        .iter()
        .filter_map(|id| overlay.reference_point(id))
        .collect();
    assert_eq!(after.len(), 3);
    assert!(after.iter().all(|p| p.x <= 500.0 && p.y <= 400.0));
    assert_ne!(before, after);
}

#[test]
fn procedural_layout_is_stable_for_same_document() {
    let config = OverlayConfig {
        policy: LayoutPolicy::Procedural,
        ..OverlayConfig::default()
    };
    let (a, _) = started(config.clone(), FixedMount::default());
    let (b, _) = started(config, FixedMount::default());
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn stop_releases_listeners_and_nodes() {
    let (mut overlay, mut host) = started(OverlayConfig::default(), three_point_mount());
    overlay.stop(&mut host);
    assert_eq!(host.listener_count(), 0);
    assert!(!overlay.is_running());
    assert!(overlay.ids().is_empty());
    assert_eq!(overlay.mount().rendered_active("doodle-1"), None);

    overlay.on_event(HostEvent::PointerMove(Point::ORIGIN));
    assert!(overlay.active_ids().is_empty());
}

#[test]
fn same_document_is_not_remounted() {
    let (mut overlay, mut host) = started(OverlayConfig::default(), three_point_mount());
    overlay.set_document(THREE, &mut host);
    assert_eq!(overlay.mount().mount_count(), 1);
    assert_eq!(host.listener_count(), 3);
}

#[test]
fn new_document_replaces_registry_and_listeners() {
    let (mut overlay, mut host) = started(OverlayConfig::default(), three_point_mount());
    overlay.on_event(HostEvent::PointerMove(Point::new(10.0, 10.0)));

    overlay.set_document(r#"<svg viewBox="0 0 1 1"><circle r="1"/></svg>"#, &mut host);
    assert_eq!(overlay.mount().mount_count(), 2);
    assert_eq!(overlay.ids(), vec!["doodle-1"]);
    assert!(overlay.is_active("doodle-2").is_none());
    assert_eq!(overlay.is_active("doodle-1"), Some(false));
    assert_eq!(host.listener_count(), 3);
}

#[test]
fn missing_container_makes_everything_a_no_op() {
    let (mut overlay, host) = started(OverlayConfig::default(), FixedMount::detached());
    assert_eq!(host.listener_count(), 3);
    assert!(overlay.ids().is_empty());
    overlay.on_event(HostEvent::PointerMove(Point::ORIGIN));
    overlay.on_event(HostEvent::Resize(Size::new(10.0, 10.0)));
    overlay.set_suppressed(true);
    assert!(overlay.active_ids().is_empty());
}

#[test]
fn empty_document_has_no_shapes() {
    let mut host = VirtualHost::new();
    let mut overlay =
        ReactiveOverlay::new(OverlayConfig::default(), FixedMount::default(), Viewport::new(10.0, 10.0));
    overlay.start("", &mut host);
    assert!(overlay.ids().is_empty());
    assert_eq!(overlay.document().map(|d| d.markup()), Some(""));
}

#[test]
fn config_from_partial_json_is_defaulted_and_clamped() {
    let cfg = OverlayConfig::from_json(
        r#"{"policy":"procedural","threshold":-4,"safe_zone":{"width_fraction":2.0}}"#,
    )
    .unwrap();
    assert_eq!(cfg.policy, LayoutPolicy::Procedural);
    assert_eq!(cfg.threshold, 0.0);
    assert_eq!(cfg.safe_zone.width_fraction, 1.0);
    assert_eq!(cfg.safe_zone.height_fraction, 0.8);
    assert!(cfg.recompute_on_scroll);

    assert!(OverlayConfig::from_json("{\"policy\":\"spiral\"}").is_err());
}
