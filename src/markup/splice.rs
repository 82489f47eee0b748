//! Lossless tag rewriting over `quick-xml` events.
//!
//! The reader only locates tags. Output is built by copying the source between edits, so text,
//! comments, CDATA, declarations and untouched tags come out byte for byte. When the reader hits
//! something it cannot parse, the rest of the input is copied unchanged.

use std::borrow::Cow;

use quick_xml::{
    events::{BytesStart, Event},
    reader::Reader,
};

/// A start or empty-element tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StartTag<'a> {
    /// The tag as written, from `<` to `>`.
    pub raw: &'a str,
    pub name: String,
    /// Attribute names and raw (still escaped) values, in source order.
    pub attrs: Vec<(String, String)>,
    pub self_closing: bool,
    /// False when some attribute could not be read; such tags should be left alone.
    pub intact: bool,
}

impl StartTag<'_> {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) enum TagEvent<'t, 'a> {
    Start(&'t StartTag<'a>),
    End(&'t str),
}

/// What to do with the tag just visited.
pub(crate) enum Edit {
    Keep,
    /// Replace the whole tag.
    Replace(String),
    /// Insert right after the tag's `>`.
    Append(String),
}

/// Visit every start and end tag of `src` in document order and apply the returned edits.
///
/// Borrows `src` when nothing was edited.
pub(crate) fn rewrite_tags<'a>(
    src: &'a str,
    mut visit: impl FnMut(TagEvent<'_, 'a>) -> Edit,
) -> Cow<'a, str> {
    let mut reader = Reader::from_str(src);
    reader.check_end_names(false);

    let mut out = String::new();
    let mut written = 0usize;
    loop {
        let from = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(%err, offset = from, "markup scan stopped; remainder copied as-is");
                break;
            }
        };
        let to = reader.buffer_position() as usize;

        let (edit, open) = match &event {
            Event::Start(e) | Event::Empty(e) => {
                let self_closing = matches!(event, Event::Empty(_));
                match start_tag(src, from, to, e, self_closing) {
                    Some((tag, open)) => (visit(TagEvent::Start(&tag)), open),
                    None => continue,
                }
            }
            Event::End(e) => match (std::str::from_utf8(e.name().as_ref()), tag_open(src, from)) {
                (Ok(name), Some(open)) => (visit(TagEvent::End(name)), open),
                _ => continue,
            },
            _ => continue,
        };

        match edit {
            Edit::Keep => {}
            Edit::Replace(s) => {
                out.push_str(&src[written..open]);
                out.push_str(&s);
                written = to;
            }
            Edit::Append(s) => {
                out.push_str(&src[written..to]);
                out.push_str(&s);
                written = to;
            }
        }
    }

    if written == 0 && out.is_empty() {
        return Cow::Borrowed(src);
    }
    out.push_str(&src[written..]);
    Cow::Owned(out)
}

/// Offset of the `<` opening the tag read from `from`. The reader may already have consumed it
/// together with the preceding text.
fn tag_open(src: &str, from: usize) -> Option<usize> {
    if src.as_bytes().get(from) == Some(&b'<') {
        Some(from)
    } else {
        src.get(..from)?.rfind('<')
    }
}

fn start_tag<'a>(
    src: &'a str,
    from: usize,
    to: usize,
    e: &BytesStart<'_>,
    self_closing: bool,
) -> Option<(StartTag<'a>, usize)> {
    let open = tag_open(src, from)?;
    let raw = src.get(open..to)?;
    let name = std::str::from_utf8(e.name().as_ref()).ok()?.to_owned();

    let mut attrs = Vec::new();
    let mut intact = true;
    for attr in e.html_attributes().with_checks(false) {
        let parsed = attr.ok().and_then(|a| {
            let key = std::str::from_utf8(a.key.as_ref()).ok()?.to_owned();
            let value = std::str::from_utf8(&a.value).ok()?.to_owned();
            Some((key, value))
        });
        match parsed {
            Some(kv) => attrs.push(kv),
            None => intact = false,
        }
    }

    Some((
        StartTag {
            raw,
            name,
            attrs,
            self_closing,
            intact,
        },
        open,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/markup/splice.rs"]
mod tests;
