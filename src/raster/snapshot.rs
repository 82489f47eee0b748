use std::sync::Arc;

use crate::{
    foundation::{
        core::{Size, Viewport},
        error::{AmbientError, AmbientResult},
    },
    markup::{
        annotate::{ACTIVE_CLASS, AnnotatedDocument, mark_active, with_svg_namespace},
        splice::{Edit, TagEvent, rewrite_tags},
    },
    overlay::layout::slice_fit,
};

/// Fill and stroke applied to active shapes in snapshots.
pub const HIGHLIGHT_RGB: [u8; 3] = [0xff, 0x5a, 0x36];

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const MAX_DIM: u32 = 16_384;

/// An opaque raster of the overlay, premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub rgba8_premul: Vec<u8>,
}

impl Snapshot {
    /// RGBA at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba8_premul.get(i..i + 4)?.try_into().ok()
    }
}

/// Render the annotated document as it would appear in `viewport`, with the shapes in
/// `active_ids` highlighted.
///
/// The document is fitted with `xMidYMid slice` semantics, the same way reference points are
/// measured, so pixel `(x, y)` lines up with pointer position `(x, y)`.
#[tracing::instrument(skip(doc, active_ids), fields(shapes = doc.len()))]
pub fn render_snapshot<'a>(
    doc: &AnnotatedDocument,
    active_ids: impl IntoIterator<Item = &'a str>,
    viewport: Viewport,
) -> AmbientResult<Snapshot> {
    let width = to_px(viewport.width())?;
    let height = to_px(viewport.height())?;

    let markup = with_highlight_style(&mark_active(doc.markup(), active_ids));
    let mut options = usvg::Options::default();
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    options.fontdb = Arc::new(db);

    let tree = usvg::Tree::from_str(&with_svg_namespace(&markup), &options)
        .map_err(|e| AmbientError::markup(format!("parse svg: {e}")))?;

    let frame = Size::new(
        f64::from(tree.size().width()),
        f64::from(tree.size().height()),
    );
    let fit = slice_fit(frame, viewport.size)
        .ok_or_else(|| AmbientError::render("document has no drawable area"))?;
    let [a, b, c, d, e, f] = fit.as_coeffs().map(|v| v as f32);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| AmbientError::render("failed to allocate snapshot pixmap"))?;
    let [r, g, bl, al] = BACKGROUND;
    pixmap.fill(resvg::tiny_skia::Color::from_rgba8(r, g, bl, al));
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_row(a, b, c, d, e, f),
        &mut pixmap.as_mut(),
    );

    Ok(Snapshot {
        width,
        height,
        rgba8_premul: pixmap.take(),
    })
}

fn to_px(v: f64) -> AmbientResult<u32> {
    if !v.is_finite() || v < 1.0 {
        return Err(AmbientError::validation(format!(
            "snapshot viewport must be at least 1x1, got {v}"
        )));
    }
    let px = v.ceil() as u32;
    if px > MAX_DIM {
        return Err(AmbientError::validation(format!(
            "snapshot dimension {px} exceeds {MAX_DIM}"
        )));
    }
    Ok(px)
}

/// Insert a stylesheet for [`ACTIVE_CLASS`] as the first child of the root element.
fn with_highlight_style(markup: &str) -> String {
    let [r, g, b] = HIGHLIGHT_RGB;
    let style = format!(
        "<style type=\"text/css\">.{ACTIVE_CLASS} {{ fill: #{r:02x}{g:02x}{b:02x}; \
         stroke: #{r:02x}{g:02x}{b:02x}; }}</style>"
    );

    let mut inserted = false;
    rewrite_tags(markup, |event| match event {
        TagEvent::Start(tag) if !inserted && tag.name == "svg" && !tag.self_closing => {
            inserted = true;
            Edit::Append(style.clone())
        }
        _ => Edit::Keep,
    })
    .into_owned()
}

#[cfg(test)]
#[path = "../../tests/unit/raster/snapshot.rs"]
mod tests;
