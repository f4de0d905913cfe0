use crate::canvas::Document;
use crate::metrics::{BuiltinFont, win_ansi_code};
use crate::widgets::{self, FormField, WidgetKind};
use serde::{Deserialize, Serialize};

// --- Page geometry ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageLayout {
    /// US Letter with the form's half-inch margins.
    pub fn letter() -> Self {
        PageLayout {
            width: 612.0,
            height: 792.0,
            margin_left: 36.0,
            margin_right: 36.0,
            margin_top: 36.0,
            margin_bottom: 36.0,
        }
    }

    pub fn content_top(&self) -> f32 {
        self.height - self.margin_top
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }
}

// --- Colors and rectangles ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    pub fn black() -> Self {
        Color::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Color::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Self {
        Color::rgb(1.0, 0.0, 0.0)
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Color::rgb(
            channel(0)? as f32 / 255.0,
            channel(2)? as f32 / 255.0,
            channel(4)? as f32 / 255.0,
        ))
    }

    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", channel(self.r), channel(self.g), channel(self.b))
    }

    /// Operand triple for `rg`/`RG` operators and `/MK` arrays.
    pub fn to_pdf(&self) -> String {
        format!("{} {} {}", num(self.r), num(self.g), num(self.b))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color `{}`, expected #RRGGBB", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn to_pdf_array(&self) -> String {
        format!(
            "[{} {} {} {}]",
            num(self.x),
            num(self.y),
            num(self.right()),
            num(self.top())
        )
    }
}

// --- Low-level PDF object model ---

pub struct PdfGenerator {
    pub objects: Vec<PdfObj>,
    pub next_id: u32,
}

#[derive(Debug)]
pub struct PdfObj {
    pub id: u32,
    pub generation: u32,
    pub content: String,
    pub is_stream: bool,
    pub stream_data: Option<Vec<u8>>,
}

impl PdfGenerator {
    pub fn new() -> Self {
        PdfGenerator {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add_object(&mut self, content: String) -> u32 {
        let id = self.next_id;
        self.objects.push(PdfObj {
            id,
            generation: 0,
            content,
            is_stream: false,
            stream_data: None,
        });
        self.next_id += 1;
        id
    }

    pub fn add_stream_object(&mut self, dictionary: String, data: Vec<u8>) -> u32 {
        let id = self.next_id;
        self.objects.push(PdfObj {
            id,
            generation: 0,
            content: dictionary,
            is_stream: true,
            stream_data: Some(data),
        });
        self.next_id += 1;
        id
    }

    /// Allocate an object id whose dictionary is filled in later with
    /// [`PdfGenerator::set_object`]. Needed for forward references such as
    /// `/Parent` and `/P`.
    pub fn reserve_object(&mut self) -> u32 {
        self.add_object(String::new())
    }

    pub fn set_object(&mut self, id: u32, content: String) {
        if let Some(obj) = self.objects.iter_mut().find(|o| o.id == id) {
            obj.content = content;
        }
    }

    pub fn generate(&self, root_id: u32, info_id: Option<u32>) -> Vec<u8> {
        let mut pdf = Vec::new();

        pdf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for obj in &self.objects {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} {} obj\n", obj.id, obj.generation).as_bytes());
            pdf.extend_from_slice(obj.content.as_bytes());

            if obj.is_stream {
                if let Some(data) = &obj.stream_data {
                    pdf.extend_from_slice(b"stream\n");
                    pdf.extend_from_slice(data);
                    pdf.extend_from_slice(b"\nendstream\n");
                }
            }

            pdf.extend_from_slice(b"endobj\n");
        }

        let xref_offset = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", self.objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }

        pdf.extend_from_slice(b"trailer\n<<\n");
        pdf.extend_from_slice(format!("/Size {}\n", self.objects.len() + 1).as_bytes());
        pdf.extend_from_slice(format!("/Root {} 0 R\n", root_id).as_bytes());
        if let Some(info) = info_id {
            pdf.extend_from_slice(format!("/Info {} 0 R\n", info).as_bytes());
        }
        pdf.extend_from_slice(b">>\nstartxref\n");
        pdf.extend_from_slice(format!("{}\n", xref_offset).as_bytes());
        pdf.extend_from_slice(b"%%EOF\n");

        pdf
    }
}

impl Default for PdfGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// --- Document assembly ---

/// Serialize a finished [`Document`] into PDF bytes: one content stream per
/// page, the Helvetica family, widget annotations wired into an AcroForm,
/// and an info dictionary carrying the title.
pub fn assemble_pdf(doc: &Document) -> Vec<u8> {
    let mut generator = PdfGenerator::new();
    let layout = doc.layout;

    let catalog_id = generator.reserve_object();
    let pages_id = generator.reserve_object();
    let acroform_id = generator.reserve_object();

    let font_ids: Vec<(BuiltinFont, u32)> = BuiltinFont::ALL
        .iter()
        .map(|font| {
            let dict = format!(
                "<< /Type /Font\n/Subtype /Type1\n/BaseFont /{}\n/Encoding /WinAnsiEncoding\n>>\n",
                font.base_font()
            );
            (*font, generator.add_object(dict))
        })
        .collect();
    let zapf_id = generator
        .add_object("<< /Type /Font\n/Subtype /Type1\n/BaseFont /ZapfDingbats\n>>\n".to_string());

    let info_id = generator.add_object(format!(
        "<< /Title {}\n/Producer (formpdf)\n/Creator (formpdf)\n>>\n",
        pdf_text_string(&doc.title)
    ));

    let image_ids: Vec<(String, u32)> = doc
        .images
        .iter()
        .map(|(name, info)| {
            (
                name.clone(),
                crate::image::create_jpeg_image_object(&mut generator, info),
            )
        })
        .collect();

    let page_ids: Vec<u32> = doc.pages.iter().map(|_| generator.reserve_object()).collect();
    let mut annots: Vec<Vec<u32>> = vec![Vec::new(); doc.pages.len()];
    let mut field_ids = Vec::with_capacity(doc.fields.len());

    for field in &doc.fields {
        match field {
            FormField::Single(widget) => {
                let appearance = match &widget.kind {
                    WidgetKind::Checkbox { .. } => Some(add_appearance_pair(
                        &mut generator,
                        widget,
                        widgets::CHECK_MARK,
                        zapf_id,
                    )),
                    _ => None,
                };
                let page_id = page_ids[widget.page];
                let id = generator.add_object(widgets::widget_dict(widget, page_id, appearance));
                annots[widget.page].push(id);
                field_ids.push(id);
            }
            FormField::Radio(group) => {
                let parent_id = generator.reserve_object();
                let mut kids = Vec::with_capacity(group.buttons.len());
                for button in &group.buttons {
                    let (on_id, off_id) =
                        add_appearance_pair(&mut generator, button, widgets::RADIO_DOT, zapf_id);
                    let kid = generator.add_object(widgets::radio_kid_dict(
                        button,
                        parent_id,
                        page_ids[button.page],
                        (on_id, off_id),
                    ));
                    annots[button.page].push(kid);
                    kids.push(kid);
                }
                generator.set_object(parent_id, widgets::radio_parent_dict(group, &kids));
                field_ids.push(parent_id);
            }
        }
    }

    let font_refs: Vec<String> = font_ids
        .iter()
        .map(|(font, id)| format!("/{} {} 0 R", font.resource_name(), id))
        .collect();
    let xobject_refs: Vec<String> = image_ids
        .iter()
        .map(|(name, id)| format!("/{} {} 0 R", name, id))
        .collect();
    let xobjects = if xobject_refs.is_empty() {
        String::new()
    } else {
        format!(" /XObject << {} >>", xobject_refs.join(" "))
    };

    for (i, page) in doc.pages.iter().enumerate() {
        let content_id = generator.add_stream_object(
            format!("<< /Length {} >>\n", page.content.len()),
            page.content.clone(),
        );
        let annots_str = if annots[i].is_empty() {
            String::new()
        } else {
            format!("/Annots [{}]\n", refs(&annots[i]))
        };
        let page_dict = format!(
            "<< /Type /Page\n\
             /Parent {} 0 R\n\
             /MediaBox [0 0 {} {}]\n\
             /Contents {} 0 R\n\
             /Resources << /Font << {} >>{} >>\n\
             {}>>\n",
            pages_id,
            num(layout.width),
            num(layout.height),
            content_id,
            font_refs.join(" "),
            xobjects,
            annots_str
        );
        generator.set_object(page_ids[i], page_dict);
    }

    generator.set_object(
        pages_id,
        format!(
            "<< /Type /Pages\n/Kids [{}]\n/Count {}\n>>\n",
            refs(&page_ids),
            page_ids.len()
        ),
    );

    let helv_id = font_ids
        .iter()
        .find(|(font, _)| *font == BuiltinFont::Helvetica)
        .map(|(_, id)| *id)
        .unwrap_or(0);
    generator.set_object(
        acroform_id,
        format!(
            "<< /Fields [{}]\n/NeedAppearances true\n/DA (/Helv 0 Tf 0 g)\n\
             /DR << /Font << /Helv {} 0 R /ZaDb {} 0 R >> >>\n>>\n",
            refs(&field_ids),
            helv_id,
            zapf_id
        ),
    );

    generator.set_object(
        catalog_id,
        format!(
            "<< /Type /Catalog\n/Pages {} 0 R\n/AcroForm {} 0 R\n>>\n",
            pages_id, acroform_id
        ),
    );

    generator.generate(catalog_id, Some(info_id))
}

/// Add the "on" and "off" appearance streams for a button widget.
fn add_appearance_pair(
    generator: &mut PdfGenerator,
    widget: &impl widgets::HasAppearance,
    mark: char,
    zapf_id: u32,
) -> (u32, u32) {
    let rect = widget.rect();
    let dict = |len: usize| {
        format!(
            "<< /Type /XObject\n/Subtype /Form\n/BBox [0 0 {} {}]\n\
             /Resources << /Font << /ZaDb {} 0 R >> >>\n/Length {}\n>>\n",
            num(rect.width),
            num(rect.height),
            zapf_id,
            len
        )
    };
    let on = widgets::appearance_stream(&rect, widget.style(), Some(mark));
    let off = widgets::appearance_stream(&rect, widget.style(), None);
    let on_id = generator.add_stream_object(dict(on.len()), on);
    let off_id = generator.add_stream_object(dict(off.len()), off);
    (on_id, off_id)
}

fn refs(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a coordinate with at most two decimals and no trailing zeros.
pub fn num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let s = format!("{:.2}", rounded);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Escape text for a PDF literal string in WinAnsiEncoding.
///
/// Characters with a WinAnsi code above ASCII (Latin-1 and the curly quote,
/// dash and bullet block) become octal escapes. Anything the encoding cannot
/// represent becomes `?`.
pub fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(ch),
            _ => match win_ansi_code(ch) {
                Some(code) => out.push_str(&format!("\\{:03o}", code)),
                None => out.push('?'),
            },
        }
    }
    out
}

/// Text string for dictionaries (titles, field names, tooltips, values).
///
/// These are read as PDFDocEncoding, not WinAnsi, so anything beyond ASCII
/// is written as a UTF-16BE hex string with a byte order mark.
pub fn pdf_text_string(text: &str) -> String {
    let plain = text
        .chars()
        .all(|c| (c.is_ascii() && !c.is_ascii_control()) || matches!(c, '\n' | '\r' | '\t'));
    if plain {
        return format!("({})", escape_pdf_string(text));
    }
    let mut out = String::from("<FEFF");
    for unit in text.encode_utf16() {
        out.push_str(&format!("{:04X}", unit));
    }
    out.push('>');
    out
}

/// Encode an arbitrary string as a PDF name (without the leading slash).
pub fn pdf_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("#{:02X}", byte));
        }
    }
    if out.is_empty() {
        out.push_str("Yes");
    }
    out
}
