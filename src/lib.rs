//! Ambientfx drives two decorative UI effects without owning a UI:
//!
//! - a pointer-reactive overlay: an SVG document is annotated so each drawable element gets a
//!   stable `doodle-{n}` id, every element is given a reference point (measured from the rendered
//!   document or scattered procedurally around the viewport edges), and elements near the pointer
//!   are switched to an active state;
//! - a typewriter that reveals a target string one character at a time, with optional jitter, a
//!   completion hold and a blinking cursor.
//!
//! Both engines are single-threaded state machines. Time and window events come from an injected
//! host ([`TimerHost`], [`EventHost`]); [`VirtualHost`] is a deterministic implementation for tests
//! and offline simulation.
//!
//! ```rust
//! use ambientfx::{
//!     FixedMount, HostEvent, Millis, OverlayConfig, Point, ReactiveOverlay, Typewriter,
//!     TypewriterConfig, VirtualHost, Viewport,
//! };
//!
//! let mut host = VirtualHost::new();
//!
//! let mount = FixedMount::points([("doodle-1", Point::new(400.0, 300.0))]);
//! let mut overlay = ReactiveOverlay::new(OverlayConfig::default(), mount, Viewport::new(800.0, 600.0));
//! overlay.start(r#"<svg><circle r="4"/></svg>"#, &mut host);
//! overlay.on_event(HostEvent::PointerMove(Point::new(420.0, 300.0)));
//! assert_eq!(overlay.active_ids(), ["doodle-1"]);
//! assert_eq!(overlay.mount().rendered_active("doodle-1"), Some(true));
//!
//! let mut tw = Typewriter::new(TypewriterConfig::fixed(50));
//! tw.start("hello", &mut host);
//! host.run_until(Millis(250), &mut tw);
//! assert_eq!(tw.output().display_text, "hello");
//! assert!(tw.output().is_complete);
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod markup;
pub(crate) mod overlay;
pub(crate) mod raster;
pub(crate) mod runtime;
pub(crate) mod typing;

pub use crate::foundation::core::{Millis, Point, Rect, Size, Vec2, Viewport};
pub use crate::foundation::error::{AmbientError, AmbientResult};
pub use crate::foundation::math::Rng64;

pub use crate::markup::annotate::{
    ACTIVE_CLASS, AnnotatedDocument, AnnotationScope, DOODLE_CLASS, DRAWABLE_TAGS, ID_PREFIX,
    ROOT_FIT, annotate, annotate_with, is_drawable, mark_active, with_svg_namespace,
};
pub use crate::overlay::engine::{OverlayConfig, ReactiveOverlay, ShapeSnapshot};
pub use crate::overlay::layout::{
    EdgeRegion, LayoutPolicy, SafeZone, procedural_points, slice_fit,
};
pub use crate::overlay::mount::{
    DocumentMount, FixedMount, MountedNode, ShapeNode, SvgMount, SvgShapeNode,
};
pub use crate::overlay::proximity::{DEFAULT_PROXIMITY_THRESHOLD, ProximityReactor};
pub use crate::raster::snapshot::{HIGHLIGHT_RGB, Snapshot, render_snapshot};
pub use crate::runtime::host::{
    EventHost, EventKind, HostEvent, ListenerId, TimerHost, TimerId, TimerTarget,
};
pub use crate::runtime::virtual_host::VirtualHost;
pub use crate::typing::config::TypewriterConfig;
pub use crate::typing::engine::{Typewriter, TypewriterOutput, TypewriterPhase, TypewriterState};
