use super::*;
use crate::{foundation::core::Vec2, markup::annotate::annotate};

const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100">
  <rect x="10" y="10" width="20" height="20" fill="black"/>
</svg>"#;

#[test]
fn svg_mount_measures_fitted_boxes() {
    let doc = annotate(SQUARE);
    let mut mount = SvgMount::new();
    let nodes = mount.mount(&doc).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, "doodle-1");

    let b = nodes[0].node.bounding_box(Viewport::new(200.0, 200.0)).unwrap();
    assert!((b.center().x - 40.0).abs() < 1e-3);
    assert!((b.center().y - 40.0).abs() < 1e-3);

    let b = nodes[0]
        .node
        .bounding_box(Viewport::new(200.0, 200.0).with_scroll(Vec2::new(0.0, 10.0)))
        .unwrap();
    assert!((b.center().y - 30.0).abs() < 1e-3);
}

#[test]
fn svg_mount_slices_wide_viewports() {
    let doc = annotate(SQUARE);
    let nodes = SvgMount::new().mount(&doc).unwrap();
    let b = nodes[0].node.bounding_box(Viewport::new(400.0, 200.0)).unwrap();
    assert!((b.center().x - 80.0).abs() < 1e-3);
    assert!((b.center().y - -20.0).abs() < 1e-3);
}

#[test]
fn svg_mount_respects_container_origin() {
    let doc = annotate(SQUARE);
    let nodes = SvgMount::new()
        .with_container_origin(Point::new(5.0, 7.0))
        .mount(&doc)
        .unwrap();
    let b = nodes[0].node.bounding_box(Viewport::new(100.0, 100.0)).unwrap();
    assert!((b.center().x - 25.0).abs() < 1e-3);
    assert!((b.center().y - 27.0).abs() < 1e-3);
}

#[test]
fn unparseable_markup_still_yields_unplaced_nodes() {
    let doc = annotate(r#"<svg><path d="M0 0 L1 1"/><rect x="1"#);
    assert_eq!(doc.len(), 1);
    let nodes = SvgMount::new().mount(&doc).unwrap();
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].node.bounding_box(Viewport::new(10.0, 10.0)).is_none());
}

#[test]
fn fixed_mount_mirrors_toggles_and_detaches() {
    let doc = annotate(r#"<svg><path/><circle/></svg>"#);
    let mut mount = FixedMount::points([("doodle-1", Point::new(3.0, 4.0))]);
    let mut nodes = mount.mount(&doc).unwrap();
    assert_eq!(mount.mount_count(), 1);
    assert_eq!(mount.rendered_active("doodle-2"), Some(false));

    nodes[1].node.set_active(true);
    assert_eq!(mount.rendered_active("doodle-2"), Some(true));
    assert_eq!(
        nodes[0].node.bounding_box(Viewport::new(10.0, 10.0)).map(|b| b.center()),
        Some(Point::new(3.0, 4.0))
    );
    assert!(nodes[1].node.bounding_box(Viewport::new(10.0, 10.0)).is_none());

    mount.unmount();
    assert_eq!(mount.rendered_active("doodle-2"), None);

    assert!(FixedMount::detached().mount(&doc).is_none());
}
