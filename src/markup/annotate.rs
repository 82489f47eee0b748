use std::{borrow::Cow, collections::BTreeSet};

use crate::markup::splice::{Edit, StartTag, TagEvent, rewrite_tags};

/// Marker class shared by every annotated drawable node.
pub const DOODLE_CLASS: &str = "interactive-doodle";
/// Class toggled onto a node while the pointer is near it.
pub const ACTIVE_CLASS: &str = "doodle-active";
/// Prefix of generated node ids; the full id is `doodle-{n}` with `n` starting at 1.
pub const ID_PREFIX: &str = "doodle-";
/// Fit directive applied to the root element.
pub const ROOT_FIT: &str = "xMidYMid slice";

/// Element names that become reactive shapes.
pub const DRAWABLE_TAGS: [&str; 6] = ["path", "g", "circle", "rect", "ellipse", "text"];

/// Containers whose content is never rendered directly.
const NON_RENDERED_TAGS: [&str; 6] = ["defs", "clipPath", "mask", "pattern", "symbol", "marker"];

/// Default object size used when the root carries neither `viewBox` nor usable dimensions.
const FALLBACK_VIEW_BOX: (f64, f64) = (300.0, 150.0);

/// Which drawable elements receive an id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationScope {
    /// Every rendered drawable element, nested ones included.
    #[default]
    Rendered,
    /// Only drawable elements with no drawable ancestor.
    Outermost,
}

/// Annotated markup plus the ids assigned to it, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct AnnotatedDocument {
    markup: String,
    ids: Vec<String>,
}

impl AnnotatedDocument {
    /// The rewritten SVG text.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Assigned ids, `doodle-1` first.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Number of annotated drawable elements.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nothing drawable was found.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Whether an element with this (case-sensitive) name is one of [`DRAWABLE_TAGS`].
pub fn is_drawable(name: &str) -> bool {
    DRAWABLE_TAGS.contains(&name)
}

/// Annotate `svg` with the default [`AnnotationScope::Rendered`] scope.
pub fn annotate(svg: &str) -> AnnotatedDocument {
    annotate_with(svg, AnnotationScope::Rendered)
}

/// Tag drawable elements with `doodle-{n}` ids and the [`DOODLE_CLASS`] marker, and apply the
/// fit directive to the root `<svg>`.
///
/// Never fails: whatever the XML reader cannot make sense of is copied through unchanged, and an
/// empty input yields an empty document.
#[tracing::instrument(skip(svg), fields(bytes = svg.len()))]
pub fn annotate_with(svg: &str, scope: AnnotationScope) -> AnnotatedDocument {
    struct Open {
        name: String,
        hidden: bool,
        drawable: bool,
    }

    let mut ids = Vec::new();
    let mut stack: Vec<Open> = Vec::new();
    let mut root_done = false;

    let markup = rewrite_tags(svg, |event| match event {
        TagEvent::Start(tag) => {
            let hidden = stack.iter().any(|o| o.hidden);
            let drawable = is_drawable(&tag.name);
            let nested = stack.iter().any(|o| o.drawable);
            if !tag.self_closing {
                stack.push(Open {
                    name: tag.name.clone(),
                    hidden: NON_RENDERED_TAGS.contains(&tag.name.as_str()),
                    drawable,
                });
            }

            if !root_done && tag.name == "svg" {
                root_done = true;
                if tag.intact {
                    return Edit::Replace(root_tag(tag));
                }
            } else if drawable
                && tag.intact
                && !hidden
                && (scope == AnnotationScope::Rendered || !nested)
            {
                let id = format!("{ID_PREFIX}{}", ids.len() + 1);
                let rewritten = drawable_tag(tag, &id);
                ids.push(id);
                return Edit::Replace(rewritten);
            }
            Edit::Keep
        }
        TagEvent::End(name) => {
            if let Some(pos) = stack.iter().rposition(|o| o.name == name) {
                stack.truncate(pos);
            }
            Edit::Keep
        }
    })
    .into_owned();

    tracing::debug!(shapes = ids.len(), "annotated document");
    AnnotatedDocument { markup, ids }
}

/// Toggle [`ACTIVE_CLASS`] on the elements whose id is in `active`, removing it everywhere else.
pub fn mark_active<'a>(markup: &str, active: impl IntoIterator<Item = &'a str>) -> String {
    let active: BTreeSet<&str> = active.into_iter().collect();

    rewrite_tags(markup, |event| {
        let TagEvent::Start(tag) = event else {
            return Edit::Keep;
        };
        let Some(id) = tag.attr("id").filter(|_| tag.intact) else {
            return Edit::Keep;
        };
        let is_active = active.contains(id);
        let existing = tag.attr("class").unwrap_or_default();
        let has_class = existing.split_whitespace().any(|c| c == ACTIVE_CLASS);
        if is_active == has_class {
            return Edit::Keep;
        }

        let mut classes: Vec<&str> = existing
            .split_whitespace()
            .filter(|c| *c != ACTIVE_CLASS)
            .collect();
        if is_active {
            classes.push(ACTIVE_CLASS);
        }

        let mut out = format!("<{}", tag.name);
        if !classes.is_empty() {
            push_attr(&mut out, "class", &classes.join(" "));
        }
        push_attrs_except(&mut out, tag, &["class"]);
        close_tag(&mut out, tag);
        Edit::Replace(out)
    })
    .into_owned()
}

/// SVG namespace; render-tree parsers ignore elements outside it.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Add the SVG namespace to the root element when the markup omits it (inline HTML markup
/// usually does).
pub fn with_svg_namespace(markup: &str) -> Cow<'_, str> {
    let mut seen_root = false;
    rewrite_tags(markup, |event| match event {
        TagEvent::Start(tag) if !seen_root && tag.name == "svg" => {
            seen_root = true;
            match tag.raw.strip_prefix("<svg") {
                Some(rest) if tag.attr("xmlns").is_none() => {
                    Edit::Replace(format!("<svg xmlns=\"{SVG_NS}\"{rest}"))
                }
                _ => Edit::Keep,
            }
        }
        _ => Edit::Keep,
    })
}

fn root_tag(tag: &StartTag<'_>) -> String {
    let mut out = String::from("<svg");
    push_attr(&mut out, "preserveAspectRatio", ROOT_FIT);
    if tag.attr("viewBox").is_none() {
        let (w, h) = intrinsic_size(tag).unwrap_or(FALLBACK_VIEW_BOX);
        push_attr(&mut out, "viewBox", &format!("0 0 {w} {h}"));
    }
    push_attrs_except(&mut out, tag, &["preserveAspectRatio"]);
    close_tag(&mut out, tag);
    out
}

fn drawable_tag(tag: &StartTag<'_>, id: &str) -> String {
    let mut class = String::from(DOODLE_CLASS);
    if let Some(existing) = tag.attr("class") {
        for c in existing.split_whitespace().filter(|c| *c != DOODLE_CLASS) {
            class.push(' ');
            class.push_str(c);
        }
    }

    let mut out = format!("<{}", tag.name);
    push_attr(&mut out, "class", &class);
    push_attr(&mut out, "id", id);
    push_attrs_except(&mut out, tag, &["class", "id"]);
    close_tag(&mut out, tag);
    out
}

fn push_attrs_except(out: &mut String, tag: &StartTag<'_>, skip: &[&str]) {
    for (name, value) in tag.attrs.iter().filter(|(n, _)| !skip.contains(&n.as_str())) {
        push_attr(out, name, value);
    }
}

/// Values are already escaped for their original quoting; only `"` needs attention.
fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&value.replace('"', "&quot;"));
    out.push('"');
}

fn close_tag(out: &mut String, tag: &StartTag<'_>) {
    out.push_str(if tag.self_closing { "/>" } else { ">" });
}

fn intrinsic_size(tag: &StartTag<'_>) -> Option<(f64, f64)> {
    fn length(v: &str) -> Option<f64> {
        let v = v.trim();
        let v = v.strip_suffix("px").unwrap_or(v).trim();
        let n: f64 = v.parse().ok()?;
        (n.is_finite() && n > 0.0).then_some(n)
    }

    Some((length(tag.attr("width")?)?, length(tag.attr("height")?)?))
}

#[cfg(test)]
#[path = "../../tests/unit/markup/annotate.rs"]
mod tests;
