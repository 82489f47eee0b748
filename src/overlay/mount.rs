use std::{cell::RefCell, collections::BTreeMap, rc::Rc, sync::Arc};

use crate::{
    foundation::core::{Point, Rect, Size, Viewport},
    markup::annotate::{AnnotatedDocument, with_svg_namespace},
    overlay::layout::slice_fit,
};

/// A rendered drawable node owned by the overlay.
pub trait ShapeNode {
    /// On-screen bounding box in viewport coordinates, or `None` when it cannot be measured.
    fn bounding_box(&self, viewport: Viewport) -> Option<Rect>;

    /// Apply or remove the active visual state.
    fn set_active(&mut self, active: bool);
}

/// A node handed over by a [`DocumentMount`], keyed by its annotated id.
pub struct MountedNode {
    /// Annotated id of the node.
    pub id: String,
    /// The rendered node itself.
    pub node: Box<dyn ShapeNode>,
}

/// Rendering container the overlay mounts annotated documents into.
pub trait DocumentMount {
    /// Render `doc` and return its nodes. `None` means there is no container to render into.
    fn mount(&mut self, doc: &AnnotatedDocument) -> Option<Vec<MountedNode>>;

    /// Drop whatever was rendered by the last [`DocumentMount::mount`].
    fn unmount(&mut self) {}
}

/// Mount that renders through `usvg` and measures node boxes from the resulting render tree.
///
/// The container is assumed to fill the viewport and sit at `container_origin` in page
/// coordinates; the document is fitted into it with `xMidYMid slice` semantics.
pub struct SvgMount {
    options: usvg::Options<'static>,
    container_origin: Point,
}

impl Default for SvgMount {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgMount {
    /// Mount without system fonts, anchored at the page origin.
    pub fn new() -> Self {
        Self {
            options: usvg::Options::default(),
            container_origin: Point::ORIGIN,
        }
    }

    /// Load system fonts so `<text>` nodes can be shaped and measured.
    pub fn with_system_fonts(mut self) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        self.options.fontdb = Arc::new(db);
        self
    }

    /// Page position of the container's top-left corner.
    pub fn with_container_origin(mut self, origin: Point) -> Self {
        self.container_origin = origin;
        self
    }
}

impl DocumentMount for SvgMount {
    #[tracing::instrument(skip(self, doc), fields(shapes = doc.len()))]
    fn mount(&mut self, doc: &AnnotatedDocument) -> Option<Vec<MountedNode>> {
        let tree = if doc.markup().trim().is_empty() {
            None
        } else {
            match usvg::Tree::from_str(&with_svg_namespace(doc.markup()), &self.options) {
                Ok(tree) => Some(tree),
                Err(err) => {
                    tracing::warn!(%err, "document could not be measured; shapes stay unplaced");
                    None
                }
            }
        };

        let frame = tree
            .as_ref()
            .map(|t| Size::new(f64::from(t.size().width()), f64::from(t.size().height())))
            .unwrap_or(Size::ZERO);

        let nodes = doc
            .ids()
            .iter()
            .map(|id| {
                let doc_box = tree.as_ref().and_then(|t| t.node_by_id(id)).map(|n| {
                    let b = n.abs_bounding_box();
                    Rect::new(
                        f64::from(b.left()),
                        f64::from(b.top()),
                        f64::from(b.right()),
                        f64::from(b.bottom()),
                    )
                });
                MountedNode {
                    id: id.clone(),
                    node: Box::new(SvgShapeNode {
                        doc_box,
                        frame,
                        origin: self.container_origin,
                        active: false,
                    }),
                }
            })
            .collect();
        Some(nodes)
    }
}

/// Node produced by [`SvgMount`]: a document-space box plus the active flag.
#[derive(Clone, Debug)]
pub struct SvgShapeNode {
    doc_box: Option<Rect>,
    frame: Size,
    origin: Point,
    active: bool,
}

impl SvgShapeNode {
    /// Last state applied through [`ShapeNode::set_active`].
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl ShapeNode for SvgShapeNode {
    fn bounding_box(&self, viewport: Viewport) -> Option<Rect> {
        let fit = slice_fit(self.frame, viewport.size)?;
        let b = fit.transform_rect_bbox(self.doc_box?);
        Some(b + (self.origin.to_vec2() - viewport.scroll))
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

type RenderedStates = Rc<RefCell<BTreeMap<String, bool>>>;

/// Mount with preset page-space boxes per id, for hosts that measure elsewhere and for tests.
///
/// Toggles applied to its nodes are mirrored into a table readable through
/// [`FixedMount::rendered_active`].
#[derive(Clone, Debug, Default)]
pub struct FixedMount {
    boxes: BTreeMap<String, Rect>,
    detached: bool,
    rendered: RenderedStates,
    mounts: usize,
}

impl FixedMount {
    /// Page-space boxes keyed by id; ids without a box stay unmeasurable.
    pub fn new<I, S>(boxes: I) -> Self
    where
        I: IntoIterator<Item = (S, Rect)>,
        S: Into<String>,
    {
        Self {
            boxes: boxes.into_iter().map(|(id, r)| (id.into(), r)).collect(),
            ..Self::default()
        }
    }

    /// Boxes that collapse to the given center points.
    pub fn points<I, S>(points: I) -> Self
    where
        I: IntoIterator<Item = (S, Point)>,
        S: Into<String>,
    {
        Self::new(
            points
                .into_iter()
                .map(|(id, p)| (id, Rect::from_center_size(p, Size::ZERO))),
        )
    }

    /// A mount with no container: every mount attempt yields nothing.
    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    /// Active state last applied to the rendered node `id`.
    pub fn rendered_active(&self, id: &str) -> Option<bool> {
        self.rendered.borrow().get(id).copied()
    }

    /// Number of successful mounts so far.
    pub fn mount_count(&self) -> usize {
        self.mounts
    }
}

impl DocumentMount for FixedMount {
    fn mount(&mut self, doc: &AnnotatedDocument) -> Option<Vec<MountedNode>> {
        if self.detached {
            return None;
        }
        self.mounts += 1;

        let mut rendered = self.rendered.borrow_mut();
        rendered.clear();
        let nodes = doc
            .ids()
            .iter()
            .map(|id| {
                rendered.insert(id.clone(), false);
                MountedNode {
                    id: id.clone(),
                    node: Box::new(FixedNode {
                        id: id.clone(),
                        page_box: self.boxes.get(id).copied(),
                        rendered: Rc::clone(&self.rendered),
                    }),
                }
            })
            .collect();
        Some(nodes)
    }

    fn unmount(&mut self) {
        self.rendered.borrow_mut().clear();
    }
}

struct FixedNode {
    id: String,
    page_box: Option<Rect>,
    rendered: RenderedStates,
}

impl ShapeNode for FixedNode {
    fn bounding_box(&self, viewport: Viewport) -> Option<Rect> {
        self.page_box.map(|b| b - viewport.scroll)
    }

    fn set_active(&mut self, active: bool) {
        if let Some(state) = self.rendered.borrow_mut().get_mut(&self.id) {
            *state = active;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/mount.rs"]
mod tests;
