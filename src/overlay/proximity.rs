use std::collections::BTreeMap;

use crate::{
    foundation::core::Point,
    overlay::mount::ShapeNode,
};

/// Pointer distance (in viewport units) under which a shape counts as near.
pub const DEFAULT_PROXIMITY_THRESHOLD: f64 = 100.0;

/// One annotated node in the overlay's registry.
pub(crate) struct ShapeRecord {
    pub id: String,
    pub element: Box<dyn ShapeNode>,
    /// `None` until a layout pass manages to place the node.
    pub reference_point: Option<Point>,
    pub active: bool,
}

impl ShapeRecord {
    pub(crate) fn new(id: String, element: Box<dyn ShapeNode>) -> Self {
        Self {
            id,
            element,
            reference_point: None,
            active: false,
        }
    }

    /// Record the state and push it to the rendered node, unconditionally.
    pub(crate) fn apply(&mut self, active: bool) {
        self.active = active;
        self.element.set_active(active);
    }
}

/// Per-move distance test with an external suppression switch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityReactor {
    threshold: f64,
    suppressed: bool,
}

impl Default for ProximityReactor {
    fn default() -> Self {
        Self::new(DEFAULT_PROXIMITY_THRESHOLD)
    }
}

impl ProximityReactor {
    /// Negative or non-finite thresholds are clamped to zero, which nothing can be under.
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.max(0.0)
        } else {
            0.0
        };
        Self {
            threshold,
            suppressed: false,
        }
    }

    /// Effective threshold after clamping.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether evaluation is currently forced inactive.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Strictly closer than the threshold.
    pub fn is_near(&self, pointer: Point, reference: Point) -> bool {
        pointer.distance(reference) < self.threshold
    }

    /// Re-evaluate every record against `pointer` and return how many ended up active.
    ///
    /// While suppressed no distances are computed and everything is forced inactive.
    pub(crate) fn evaluate(
        &self,
        pointer: Point,
        records: &mut BTreeMap<String, ShapeRecord>,
    ) -> usize {
        if self.suppressed {
            Self::deactivate_all(records);
            return 0;
        }

        let mut active = 0usize;
        for record in records.values_mut() {
            let near = record
                .reference_point
                .is_some_and(|p| self.is_near(pointer, p));
            record.apply(near);
            active += usize::from(near);
        }
        active
    }

    /// Change the suppression flag. Raising it clears every active state immediately; lowering it
    /// leaves states alone until the next evaluation.
    pub(crate) fn set_suppressed(
        &mut self,
        suppressed: bool,
        records: &mut BTreeMap<String, ShapeRecord>,
    ) {
        self.suppressed = suppressed;
        if suppressed {
            Self::deactivate_all(records);
        }
    }

    pub(crate) fn deactivate_all(records: &mut BTreeMap<String, ShapeRecord>) {
        for record in records.values_mut() {
            record.apply(false);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/proximity.rs"]
mod tests;
