//! Source-document rendering: sentence segmentation, mention contexts and
//! HTML with highlighted justification spans.
//!
//! All offsets here are character offsets into the document text, matching the
//! offsets AIF justifications carry. [`DocumentText`] maps them to byte
//! positions.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::corpus::Document;
use crate::elements::Justification;
use crate::error::RenderError;

/// Half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The half-open span of an inclusive-end justification, or `None` if
    /// its offsets do not fit in `usize`.
    pub fn of_justification(justification: &Justification) -> Option<Self> {
        let start = usize::try_from(justification.span_start).ok()?;
        let end = usize::try_from(justification.span_end).ok()?.checked_add(1)?;
        Some(Self::new(start, end))
    }
}

/// Document text indexed by character.
pub struct DocumentText<'a> {
    text: &'a str,
    /// Byte offset of every character, plus `text.len()`.
    offsets: Vec<usize>,
}

impl<'a> DocumentText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn char_len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Text of `span`, or `None` if it runs past the end.
    pub fn slice(&self, span: Span) -> Option<&'a str> {
        if span.start > span.end || span.end > self.char_len() {
            return None;
        }
        Some(&self.text[self.offsets[span.start]..self.offsets[span.end]])
    }

    /// Text of `span`, clamped to the document.
    fn slice_clamped(&self, span: Span) -> &'a str {
        let end = span.end.min(self.char_len());
        let start = span.start.min(end);
        &self.text[self.offsets[start]..self.offsets[end]]
    }
}

// ---------------------------------------------------------------------------
// Sentences
// ---------------------------------------------------------------------------

/// Lowercased abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "ft", "gen", "col", "lt", "sgt",
    "capt", "cmdr", "adm", "gov", "sen", "rep", "pres", "rev", "hon", "no", "vs", "etc", "inc",
    "ltd", "co", "corp", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct",
    "nov", "dec", "e.g", "i.e", "u.s", "u.k", "u.n", "a.m", "p.m",
];

const TERMINALS: &[char] = &['.', '!', '?'];
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '\u{201d}', '\u{2019}', '\u{bb}'];

/// Sentence spans of `text`.
///
/// A sentence ends after `.`, `!` or `?` (and any closing quotes or brackets)
/// when whitespace follows, unless the period belongs to a known abbreviation
/// or a single-letter initial, or the next word starts lowercase. Newlines
/// alone never end a sentence. Leading and trailing whitespace is excluded.
pub fn sentence_spans(text: &str) -> Vec<Span> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut spans = Vec::new();

    let skip_ws = |mut i: usize| {
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        i
    };

    let mut start = skip_ws(0);
    let mut i = start;
    while i < len {
        if !TERMINALS.contains(&chars[i]) {
            i += 1;
            continue;
        }
        let terminal = i;
        let mut end = i + 1;
        while end < len && TERMINALS.contains(&chars[end]) {
            end += 1;
        }
        while end < len && CLOSERS.contains(&chars[end]) {
            end += 1;
        }

        if end == len {
            spans.push(Span::new(start, end));
            start = len;
            break;
        }
        if !chars[end].is_whitespace() {
            i = end;
            continue;
        }

        let next = skip_ws(end);
        let abbreviated = chars[terminal] == '.' && end == terminal + 1 && {
            let word = word_before(&chars, terminal);
            is_abbreviation(&word)
        };
        let lowercase_follows = next < len && chars[next].is_lowercase();

        if !abbreviated && !lowercase_follows {
            spans.push(Span::new(start, end));
            start = next;
        }
        i = next.max(end);
    }

    if start < len {
        let mut end = len;
        while end > start && chars[end - 1].is_whitespace() {
            end -= 1;
        }
        if end > start {
            spans.push(Span::new(start, end));
        }
    }
    spans
}

/// The token ending just before `terminal`, stripped of opening punctuation.
fn word_before(chars: &[char], terminal: usize) -> String {
    let mut begin = terminal;
    while begin > 0 && !chars[begin - 1].is_whitespace() {
        begin -= 1;
    }
    chars[begin..terminal]
        .iter()
        .skip_while(|c| !c.is_alphanumeric())
        .collect()
}

fn is_abbreviation(word: &str) -> bool {
    let mut letters = word.chars();
    if let (Some(c), None) = (letters.next(), letters.next()) {
        return c.is_alphabetic();
    }
    let lower = word.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

/// The document's first sentence, cut at the first blank line and truncated
/// to 100 characters plus `...`.
pub fn title_sentence(text: &str) -> Option<String> {
    let first = *sentence_spans(text).first()?;
    let doc = DocumentText::new(text);
    let sentence = doc.slice_clamped(first);
    let sentence = sentence.split("\n\n").next().unwrap_or(sentence);

    if sentence.chars().count() > 100 {
        let truncated: String = sentence.chars().take(100).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(sentence.to_string())
    }
}

/// Context span for each justification span: the sentence containing it,
/// narrowed to the blank-line-delimited paragraph around the mention.
///
/// A mention that crosses a sentence boundary is its own context.
pub fn contexts_from_justifications(
    justifications: &BTreeMap<String, Span>,
    text: &str,
) -> BTreeMap<String, Span> {
    let doc = DocumentText::new(text);
    let sentences = sentence_spans(text);
    let mut contexts = BTreeMap::new();

    for (id, span) in justifications {
        let Some(sentence) = sentences.iter().find(|s| s.contains(span)) else {
            tracing::debug!(justification = %id, "mention crosses a sentence boundary");
            contexts.insert(id.clone(), *span);
            continue;
        };

        let before = doc.slice_clamped(Span::new(sentence.start, span.start));
        let start = match before.rfind("\n\n") {
            Some(byte) => sentence.start + before[..byte].chars().count() + 2,
            None => sentence.start,
        };

        let after = doc.slice_clamped(Span::new(span.end, sentence.end));
        let end = match after.find("\n\n") {
            Some(byte) => span.end + after[..byte].chars().count(),
            None => sentence.end,
        };

        contexts.insert(id.clone(), Span::new(start, end));
    }
    contexts
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// HTML for a document with mention and context markers.
#[derive(Debug, Clone, Default)]
pub struct RenderedDocument {
    /// Whole document; ids prefixed `contextof-` / `mentionof-`.
    pub html: String,
    /// Per-id HTML of each marked span; ids prefixed `c-` / `m-`.
    pub fragments: HashMap<String, String>,
}

#[derive(Default)]
struct Markers<'s> {
    starts: HashMap<usize, Vec<&'s str>>,
    /// Innermost first.
    ends: HashMap<usize, Vec<&'s str>>,
    /// Zero-length spans, closed as soon as they open.
    empty: HashMap<usize, Vec<&'s str>>,
}

impl<'s> Markers<'s> {
    fn new(spans: &'s BTreeMap<String, Span>) -> Self {
        let mut sorted: Vec<(&String, &Span)> = spans.iter().collect();
        // Outer spans open first.
        sorted.sort_by(|(_, a), (_, b)| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut markers = Self::default();
        for (id, span) in sorted {
            markers.starts.entry(span.start).or_default().push(id.as_str());
            if span.is_empty() {
                markers.empty.entry(span.start).or_default().push(id.as_str());
            } else {
                markers.ends.entry(span.end).or_default().insert(0, id.as_str());
            }
        }
        markers
    }

    fn starting(&self, at: usize) -> &[&'s str] {
        Self::at(&self.starts, at)
    }

    fn ending(&self, at: usize) -> &[&'s str] {
        Self::at(&self.ends, at)
    }

    fn empty(&self, at: usize) -> &[&'s str] {
        Self::at(&self.empty, at)
    }

    fn at<'m>(map: &'m HashMap<usize, Vec<&'s str>>, at: usize) -> &'m [&'s str] {
        map.get(&at).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Render `text` as HTML, wrapping each context span in
/// `<span id="c-…" class="mention-context">` and each justification span in
/// `<span id="m-…" class="mention">`.
///
/// Nested and abutting spans render correctly; partially overlapping spans
/// do not.
pub fn render_document(
    text: &str,
    justification_spans: &BTreeMap<String, Span>,
    context_spans: &BTreeMap<String, Span>,
    include_class: bool,
) -> RenderedDocument {
    let mentions = Markers::new(justification_spans);
    let contexts = Markers::new(context_spans);

    let context_class = include_class.then_some("mention-context");
    let mention_class = include_class.then_some("mention");

    let mut html = String::with_capacity(text.len() + 64 * justification_spans.len());
    let mut fragments = HashMap::new();
    let mut stack: Vec<OpenMarker<'_>> = Vec::new();

    let mut chars = text.chars();
    let total = text.chars().count();
    let mut buf = [0u8; 4];
    for cursor in 0..=total {
        for &id in mentions.ending(cursor) {
            close_marker(&mut html, &mut stack, "m", id, &mut fragments);
        }
        for &id in contexts.ending(cursor) {
            close_marker(&mut html, &mut stack, "c", id, &mut fragments);
        }
        for &id in contexts.starting(cursor) {
            open_marker(&mut html, &mut stack, "c", id, context_class);
        }
        for &id in mentions.starting(cursor) {
            open_marker(&mut html, &mut stack, "m", id, mention_class);
        }
        for &id in mentions.empty(cursor) {
            close_marker(&mut html, &mut stack, "m", id, &mut fragments);
        }
        for &id in contexts.empty(cursor) {
            close_marker(&mut html, &mut stack, "c", id, &mut fragments);
        }

        if let Some(c) = chars.next() {
            html_escape::encode_safe_to_string(c.encode_utf8(&mut buf), &mut html);
        }
    }

    // Document text is escaped, so these only match marker attributes.
    let html = html
        .replace("id=\"c-", "id=\"contextof-")
        .replace("id=\"m-", "id=\"mentionof-");

    RenderedDocument { html, fragments }
}

/// A marker that has been opened: where it starts in the output, and its kind
/// and id.
struct OpenMarker<'s> {
    start: usize,
    prefix: &'static str,
    id: &'s str,
}

/// Open a marker span and push it on `stack`.
fn open_marker<'s>(
    html: &mut String,
    stack: &mut Vec<OpenMarker<'s>>,
    prefix: &'static str,
    id: &'s str,
    class: Option<&str>,
) {
    stack.push(OpenMarker {
        start: html.len(),
        prefix,
        id,
    });
    html.push_str("<span id=\"");
    html.push_str(prefix);
    html.push('-');
    html_escape::encode_double_quoted_attribute_to_string(id, html);
    html.push('"');
    if let Some(class) = class {
        html.push_str(" class=\"");
        html.push_str(class);
        html.push('"');
    }
    html.push('>');
}

/// Close the marker `prefix`/`id`, recording it as a fragment. Markers opened
/// inside it that are still open (partial overlaps) are closed with it.
fn close_marker(
    html: &mut String,
    stack: &mut Vec<OpenMarker<'_>>,
    prefix: &str,
    id: &str,
    fragments: &mut HashMap<String, String>,
) {
    if !stack.iter().any(|m| m.prefix == prefix && m.id == id) {
        return;
    }
    while let Some(marker) = stack.pop() {
        html.push_str("</span>");
        fragments.insert(marker.id.to_string(), html[marker.start..].to_string());
        if marker.prefix == prefix && marker.id == id {
            break;
        }
    }
}

/// Render `document` with a single justification and its context marked.
///
/// The marker id is the justification's `start:end` key.
pub fn render_single_justification_document(
    document: &Document,
    justification: &Justification,
) -> Result<String, RenderError> {
    let text = DocumentText::new(&document.fulltext);
    let span = Span::of_justification(justification).filter(|&s| text.slice(s).is_some());
    let Some(span) = span else {
        return Err(RenderError::SpanOutOfRange {
            document: document.parent_id.clone(),
            span: justification.span_key(),
        });
    };

    let spans = BTreeMap::from([(justification.span_key(), span)]);
    let contexts = contexts_from_justifications(&spans, &document.fulltext);
    let rendered = render_document(&document.fulltext, &spans, &contexts, true);
    if rendered.html.is_empty() {
        return Err(RenderError::Empty {
            document: document.parent_id.clone(),
        });
    }
    Ok(rendered.html)
}

/// The mention text of a justification, if its span fits the document.
pub fn mention_text<'a>(document: &'a Document, justification: &Justification) -> Option<&'a str> {
    Span::of_justification(justification)
        .and_then(|span| DocumentText::new(&document.fulltext).slice(span))
}
