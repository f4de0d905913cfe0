//! Text reflow and light HTML handling for captions and label fields.

use crate::metrics::{BuiltinFont, TextMeasure};
use crate::styles::LabelCategory;
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());
static BLOCK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)(ul|ol|h[1-5]|p)\b([^>]*)>").unwrap());
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li\s*>").unwrap());
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(type|start)\s*=\s*["']?([^"'\s>]+)"#).unwrap()
});
static NON_IDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_]").unwrap());
static UNDERSCORES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Greedy word wrap using Helvetica metrics.
pub fn wrap(text: &str, max_width: f32, font: BuiltinFont, font_size: f32) -> Vec<String> {
    wrap_with(TextMeasure::Metrics, text, max_width, font, font_size)
}

/// Greedy word wrap with an explicit measuring tier.
///
/// Words are added to the current line while it still fits in `max_width`.
/// A word that is wider than `max_width` on its own gets a line to itself;
/// words are never split. Runs of whitespace collapse to single spaces.
pub fn wrap_with(
    measure: TextMeasure,
    text: &str,
    max_width: f32,
    font: BuiltinFont,
    font_size: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", line, word);
        if measure.width(&candidate, font, font_size) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Remove tags, decode common entities and collapse whitespace.
pub fn strip_tags(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");
    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    // last, so "&amp;lt;" stays "&lt;"
    numeric.replace("&amp;", "&")
}

/// One drawable run of a label field.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub category: LabelCategory,
    pub text: String,
}

impl TextBlock {
    fn new(category: LabelCategory, text: String) -> Self {
        TextBlock { category, text }
    }
}

/// Split label markup into styled blocks, in document order.
///
/// Headings and paragraphs become blocks of their own category, list items
/// become `List` blocks prefixed with their marker, and loose text between
/// them becomes `Regular` blocks. A list inside a paragraph or heading splits
/// it: the text around the list keeps the enclosing category.
pub fn parse_markup(markup: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    parse_into(&mut blocks, markup, LabelCategory::Regular);
    blocks
}

fn parse_into(blocks: &mut Vec<TextBlock>, markup: &str, loose: LabelCategory) {
    let mut last = 0;

    while let Some(open) = next_open_tag(markup, last) {
        push_text(blocks, loose, &markup[last..open.start]);

        let (inner, resume) = match find_close(markup, &open.tag, open.end) {
            Some((inner_end, close_end)) => (&markup[open.end..inner_end], close_end),
            // unclosed: the block runs to the end
            None => (&markup[open.end..], markup.len()),
        };
        last = resume;

        match open.tag.as_str() {
            "ul" | "ol" => push_list(blocks, ListStyle::from_tag(&open.tag, &open.attrs), inner),
            tag => {
                let category = LabelCategory::from_tag(tag).unwrap_or(LabelCategory::Regular);
                parse_into(blocks, inner, category);
            }
        }
    }

    push_text(blocks, loose, &markup[last..]);
}

struct OpenTag {
    tag: String,
    attrs: String,
    start: usize,
    end: usize,
}

fn next_open_tag(markup: &str, from: usize) -> Option<OpenTag> {
    BLOCK_TAG_RE
        .captures_iter(&markup[from..])
        .find(|caps| caps[1].is_empty())
        .and_then(|caps| {
            let whole = caps.get(0)?;
            Some(OpenTag {
                tag: caps[2].to_ascii_lowercase(),
                attrs: caps[3].to_string(),
                start: from + whole.start(),
                end: from + whole.end(),
            })
        })
}

/// Byte range of the `</tag>` closing the element opened just before `from`,
/// skipping nested elements of the same name. Returns (inner end, close end).
fn find_close(markup: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    for caps in BLOCK_TAG_RE.captures_iter(&markup[from..]) {
        if !caps[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        let whole = caps.get(0)?;
        if caps[1].is_empty() {
            depth += 1;
        } else if depth == 0 {
            return Some((from + whole.start(), from + whole.end()));
        } else {
            depth -= 1;
        }
    }
    None
}

fn push_list(blocks: &mut Vec<TextBlock>, style: ListStyle, inner: &str) {
    let items = ITEM_RE
        .captures_iter(inner)
        .map(|item| strip_tags(&item[1]))
        .filter(|text| !text.is_empty());
    for (i, text) in items.enumerate() {
        blocks.push(TextBlock::new(
            LabelCategory::List,
            format!("{} {}", style.marker(i), text),
        ));
    }
}

fn push_text(blocks: &mut Vec<TextBlock>, category: LabelCategory, fragment: &str) {
    let text = strip_tags(fragment);
    if !text.is_empty() {
        blocks.push(TextBlock::new(category, text));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListStyle {
    Bullet,
    Decimal(u32),
    Lower(u32),
    Upper(u32),
}

impl ListStyle {
    fn from_tag(tag: &str, attrs: &str) -> Self {
        if tag == "ul" {
            return ListStyle::Bullet;
        }
        let mut kind = "1".to_string();
        let mut start = 1u32;
        for caps in ATTR_RE.captures_iter(attrs) {
            match caps[1].to_ascii_lowercase().as_str() {
                "type" => kind = caps[2].to_string(),
                "start" => start = caps[2].parse().unwrap_or(1).max(1),
                _ => {}
            }
        }
        match kind.as_str() {
            "a" => ListStyle::Lower(start),
            "A" => ListStyle::Upper(start),
            _ => ListStyle::Decimal(start),
        }
    }

    fn marker(self, index: usize) -> String {
        let offset = index as u32;
        match self {
            ListStyle::Bullet => "\u{2022}".to_string(),
            ListStyle::Decimal(start) => format!("{}.", start + offset),
            ListStyle::Lower(start) => format!("{}.", alpha_marker(start + offset, false)),
            ListStyle::Upper(start) => format!("{}.", alpha_marker(start + offset, true)),
        }
    }
}

/// 1 -> a, 26 -> z, 27 -> aa.
fn alpha_marker(mut n: u32, upper: bool) -> String {
    let base = if upper { b'A' } else { b'a' };
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(base + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Lowercase identifier form of an option value: spaces and anything outside
/// `[a-z0-9_]` become underscores, runs collapse, edges are trimmed.
pub fn normalize_field_value(value: &str) -> String {
    let lower = value.to_lowercase().replace(' ', "_");
    let replaced = NON_IDENT_RE.replace_all(&lower, "_");
    let collapsed = UNDERSCORES_RE.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}
