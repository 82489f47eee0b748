use std::collections::BTreeMap;

use crate::{
    foundation::{
        core::{Point, Viewport},
        error::AmbientResult,
        math::{Fnv1a64, fingerprint_str},
    },
    markup::annotate::{AnnotatedDocument, AnnotationScope, annotate_with},
    overlay::{
        layout::{LayoutPolicy, SafeZone, procedural_points},
        mount::DocumentMount,
        proximity::{DEFAULT_PROXIMITY_THRESHOLD, ProximityReactor, ShapeRecord},
    },
    runtime::host::{EventHost, EventKind, HostEvent, ListenerId},
};

/// Overlay configuration. Every field is optional in JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// How reference points are assigned.
    pub policy: LayoutPolicy,
    /// Pointer distance under which a shape becomes active.
    pub threshold: f64,
    /// Re-measure on page scroll. Only meaningful for [`LayoutPolicy::Measured`].
    pub recompute_on_scroll: bool,
    /// Which drawables get an id.
    pub scope: AnnotationScope,
    /// Region procedural placement keeps clear.
    pub safe_zone: SafeZone,
    /// Seed for procedural placement; mixed with the document fingerprint.
    pub seed: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            policy: LayoutPolicy::Measured,
            threshold: DEFAULT_PROXIMITY_THRESHOLD,
            recompute_on_scroll: true,
            scope: AnnotationScope::Rendered,
            safe_zone: SafeZone::default(),
            seed: 0x0d00_d1e5,
        }
    }
}

impl OverlayConfig {
    /// Decode a partial JSON config, then [`normalized`](Self::normalized).
    pub fn from_json(s: &str) -> AmbientResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        Ok(cfg.normalized())
    }

    /// Clamp out-of-range values instead of rejecting them.
    pub fn normalized(mut self) -> Self {
        self.threshold = ProximityReactor::new(self.threshold).threshold();
        self.safe_zone = self.safe_zone.normalized();
        self
    }

    fn listens_to_scroll(&self) -> bool {
        self.policy == LayoutPolicy::Measured && self.recompute_on_scroll
    }
}

/// Read-only copy of one shape's state.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShapeSnapshot {
    /// Annotated id.
    pub id: String,
    /// Current reference point, `None` while unplaced.
    pub reference_point: Option<Point>,
    /// Whether the pointer is near.
    pub active: bool,
}

/// Pointer-reactive overlay over an SVG document.
///
/// Lifecycle: [`start`](Self::start) annotates, mounts and lays out the document and subscribes
/// to pointer, resize and (for measured layouts) scroll events; [`stop`](Self::stop) releases every
/// listener and drops the mounted nodes. Events that arrive while stopped are ignored.
pub struct ReactiveOverlay<M: DocumentMount> {
    config: OverlayConfig,
    reactor: ProximityReactor,
    mount: M,
    viewport: Viewport,
    document: Option<(String, AnnotatedDocument)>,
    records: BTreeMap<String, ShapeRecord>,
    listeners: Vec<(ListenerId, EventKind)>,
    last_pointer: Option<Point>,
}

impl<M: DocumentMount> ReactiveOverlay<M> {
    /// A stopped overlay. The config is normalized first.
    pub fn new(config: OverlayConfig, mount: M, viewport: Viewport) -> Self {
        let config = config.normalized();
        Self {
            reactor: ProximityReactor::new(config.threshold),
            config,
            mount,
            viewport,
            document: None,
            records: BTreeMap::new(),
            listeners: Vec::new(),
            last_pointer: None,
        }
    }

    /// Mount `svg` and begin reacting to events. Restarts if already running.
    #[tracing::instrument(skip(self, svg, events), fields(bytes = svg.len()))]
    pub fn start(&mut self, svg: &str, events: &mut dyn EventHost) {
        if self.is_running() {
            self.stop(events);
        }

        self.load_document(svg);
        if let Some((_, doc)) = &self.document
            && let Some(nodes) = self.mount.mount(doc)
        {
            self.records = nodes
                .into_iter()
                .map(|n| (n.id.clone(), ShapeRecord::new(n.id, n.node)))
                .collect();
        }
        self.relayout();

        let mut kinds = vec![EventKind::PointerMove, EventKind::Resize];
        if self.config.listens_to_scroll() {
            kinds.push(EventKind::Scroll);
        }
        self.listeners = kinds.into_iter().map(|k| (events.listen(k), k)).collect();

        tracing::debug!(
            shapes = self.records.len(),
            listeners = self.listeners.len(),
            "overlay started"
        );
    }

    /// Swap the governing document. Same input is a no-op; different input tears down and
    /// restarts so no listener or node from the old document survives.
    pub fn set_document(&mut self, svg: &str, events: &mut dyn EventHost) {
        if self
            .document
            .as_ref()
            .is_some_and(|(source, _)| source == svg)
        {
            return;
        }
        tracing::debug!(bytes = svg.len(), "overlay document changed");
        if self.is_running() {
            self.start(svg, events);
        } else {
            self.load_document(svg);
        }
    }

    /// Release every listener and drop all mounted nodes.
    pub fn stop(&mut self, events: &mut dyn EventHost) {
        for (id, _) in self.listeners.drain(..) {
            events.unlisten(id);
        }
        self.records.clear();
        self.mount.unmount();
        self.document = None;
        self.last_pointer = None;
        tracing::debug!("overlay stopped");
    }

    /// Raise or lower suppression. Raising clears all active states right away.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        if suppressed != self.reactor.is_suppressed() {
            tracing::debug!(suppressed, "overlay suppression changed");
        }
        self.reactor.set_suppressed(suppressed, &mut self.records);
    }

    /// Handle a host event. Kinds the overlay is not subscribed to are ignored.
    pub fn on_event(&mut self, event: HostEvent) {
        if !self.listens_to(event.kind()) {
            return;
        }
        match event {
            HostEvent::PointerMove(p) => {
                self.last_pointer = Some(p);
                self.reactor.evaluate(p, &mut self.records);
            }
            HostEvent::Resize(size) => {
                self.viewport = Viewport {
                    size,
                    scroll: self.viewport.scroll,
                };
                self.relayout();
            }
            HostEvent::Scroll(offset) => {
                self.viewport.scroll = offset;
                self.relayout();
            }
        }
    }

    /// True between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Current suppression flag.
    pub fn is_suppressed(&self) -> bool {
        self.reactor.is_suppressed()
    }

    /// The normalized configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Viewport as of the last resize or scroll.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Last pointer position seen while running.
    pub fn last_pointer(&self) -> Option<Point> {
        self.last_pointer
    }

    /// The mount the overlay renders into.
    pub fn mount(&self) -> &M {
        &self.mount
    }

    /// The annotated governing document, if one is loaded.
    pub fn document(&self) -> Option<&AnnotatedDocument> {
        self.document.as_ref().map(|(_, doc)| doc)
    }

    /// Ids of the mounted shapes, in document order.
    pub fn ids(&self) -> Vec<String> {
        self.ordered().map(|r| r.id.clone()).collect()
    }

    /// Active state of `id`; `None` for unknown ids.
    pub fn is_active(&self, id: &str) -> Option<bool> {
        self.records.get(id).map(|r| r.active)
    }

    /// Reference point of `id`, if it has one.
    pub fn reference_point(&self, id: &str) -> Option<Point> {
        self.records.get(id).and_then(|r| r.reference_point)
    }

    /// Ids of the currently active shapes, in document order.
    pub fn active_ids(&self) -> Vec<String> {
        self.ordered()
            .filter(|r| r.active)
            .map(|r| r.id.clone())
            .collect()
    }

    /// Copy of every shape's state, in document order.
    pub fn snapshot(&self) -> Vec<ShapeSnapshot> {
        self.ordered()
            .map(|r| ShapeSnapshot {
                id: r.id.clone(),
                reference_point: r.reference_point,
                active: r.active,
            })
            .collect()
    }

    fn ordered(&self) -> impl Iterator<Item = &ShapeRecord> {
        let ids = self
            .document
            .as_ref()
            .map(|(_, doc)| doc.ids())
            .unwrap_or_default();
        ids.iter().filter_map(|id| self.records.get(id))
    }

    fn listens_to(&self, kind: EventKind) -> bool {
        self.listeners.iter().any(|(_, k)| *k == kind)
    }

    fn load_document(&mut self, svg: &str) {
        let cached = self
            .document
            .as_ref()
            .is_some_and(|(source, _)| source == svg);
        if !cached {
            let doc = annotate_with(svg, self.config.scope);
            self.document = Some((svg.to_owned(), doc));
        }
    }

    /// Recompute every reference point from scratch.
    fn relayout(&mut self) {
        let Some((_, doc)) = &self.document else {
            return;
        };
        if self.records.is_empty() {
            return;
        }

        match self.config.policy {
            LayoutPolicy::Measured => {
                let viewport = self.viewport;
                for record in self.records.values_mut() {
                    record.reference_point =
                        record.element.bounding_box(viewport).map(|b| b.center());
                }
            }
            LayoutPolicy::Procedural => {
                let mut seed = Fnv1a64::new_default();
                seed.write_u64(self.config.seed);
                seed.write_u64(fingerprint_str(doc.markup()));
                let points = procedural_points(
                    doc.len(),
                    self.viewport,
                    self.config.safe_zone,
                    seed.finish(),
                );

                let placed: BTreeMap<&str, Point> = doc
                    .ids()
                    .iter()
                    .map(String::as_str)
                    .zip(points)
                    .collect();
                for record in self.records.values_mut() {
                    record.reference_point = placed.get(record.id.as_str()).copied();
                }
            }
        }

        tracing::debug!(
            policy = ?self.config.policy,
            width = self.viewport.width(),
            height = self.viewport.height(),
            "reference points recomputed"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/engine.rs"]
mod tests;
