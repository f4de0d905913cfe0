//! AcroForm widget model.
//!
//! Widgets are collected by the canvas while pages are drawn and turned into
//! annotation dictionaries when the document is assembled. Text and choice
//! fields rely on `/NeedAppearances`; buttons carry their own on/off
//! appearance streams so they render without viewer support.

use crate::pdf_generator::{Color, Rect, num, pdf_name, pdf_text_string};
use thiserror::Error;

/// ZapfDingbats check mark.
pub const CHECK_MARK: char = '4';
/// ZapfDingbats filled circle.
pub const RADIO_DOT: char = 'l';

// Field flags (PDF 32000-1, 12.7.4)
const FF_MULTILINE: u32 = 4096;
const FF_NO_TOGGLE_TO_OFF: u32 = 16384;
const FF_RADIO: u32 = 32768;
const FF_COMBO: u32 = 131072;
// Annotation flag: print
const ANNOT_PRINT: u32 = 4;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WidgetError {
    #[error("widget option `{0}` is not supported")]
    UnsupportedOption(&'static str),
    #[error("widget `{0}` has a degenerate rectangle")]
    DegenerateRect(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetStyle {
    pub border_color: Color,
    pub fill_color: Color,
    pub text_color: Color,
    pub border_width: f32,
    pub font_size: f32,
}

impl Default for WidgetStyle {
    fn default() -> Self {
        WidgetStyle {
            border_color: Color::black(),
            fill_color: Color::white(),
            text_color: Color::black(),
            border_width: 1.0,
            font_size: 10.0,
        }
    }
}

/// Optional keyword-style extras a widget primitive may accept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetExtras {
    pub tooltip: Option<String>,
    pub export_value: Option<String>,
    pub value: Option<String>,
}

impl WidgetExtras {
    pub fn tooltip(text: impl Into<String>) -> Self {
        WidgetExtras {
            tooltip: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Which optional extras the drawing surface accepts. Everything is
/// supported by default; narrower sets model older writers and let the
/// renderers' fallback ladder be tested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetSupport {
    pub tooltip: bool,
    pub export_value: bool,
    pub value: bool,
}

impl Default for WidgetSupport {
    fn default() -> Self {
        WidgetSupport {
            tooltip: true,
            export_value: true,
            value: true,
        }
    }
}

impl WidgetSupport {
    pub fn minimal() -> Self {
        WidgetSupport {
            tooltip: false,
            export_value: false,
            value: false,
        }
    }

    pub fn check(&self, extras: &WidgetExtras) -> Result<(), WidgetError> {
        if extras.tooltip.is_some() && !self.tooltip {
            return Err(WidgetError::UnsupportedOption("tooltip"));
        }
        if extras.export_value.is_some() && !self.export_value {
            return Err(WidgetError::UnsupportedOption("export_value"));
        }
        if extras.value.is_some() && !self.value {
            return Err(WidgetError::UnsupportedOption("value"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Text { multiline: bool, value: Option<String> },
    Choice { options: Vec<(String, String)> },
    Checkbox { on_state: String },
}

/// A terminal field with exactly one widget annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub name: String,
    pub tooltip: Option<String>,
    pub rect: Rect,
    pub page: usize,
    pub kind: WidgetKind,
    pub style: WidgetStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadioButton {
    pub value: String,
    pub rect: Rect,
    pub page: usize,
    pub style: WidgetStyle,
}

/// One radio field; its buttons may sit on different pages.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioGroup {
    pub name: String,
    pub tooltip: Option<String>,
    pub buttons: Vec<RadioButton>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Single(Widget),
    Radio(RadioGroup),
}

impl FormField {
    pub fn name(&self) -> &str {
        match self {
            FormField::Single(w) => &w.name,
            FormField::Radio(g) => &g.name,
        }
    }

    /// Number of widget annotations this field produces.
    pub fn widget_count(&self) -> usize {
        match self {
            FormField::Single(_) => 1,
            FormField::Radio(g) => g.buttons.len(),
        }
    }
}

pub trait HasAppearance {
    fn rect(&self) -> Rect;
    fn style(&self) -> &WidgetStyle;
}

impl HasAppearance for Widget {
    fn rect(&self) -> Rect {
        self.rect
    }
    fn style(&self) -> &WidgetStyle {
        &self.style
    }
}

impl HasAppearance for RadioButton {
    fn rect(&self) -> Rect {
        self.rect
    }
    fn style(&self) -> &WidgetStyle {
        &self.style
    }
}

pub(crate) fn ensure_rect(name: &str, rect: &Rect) -> Result<(), WidgetError> {
    if rect.width <= 0.0 || rect.height <= 0.0 || !rect.width.is_finite() || !rect.height.is_finite() {
        return Err(WidgetError::DegenerateRect(name.to_string()));
    }
    Ok(())
}

fn mk_entry(style: &WidgetStyle, caption: Option<char>) -> String {
    let ca = caption.map(|c| format!(" /CA ({})", c)).unwrap_or_default();
    format!(
        "/MK << /BC [{}] /BG [{}]{} >>\n",
        style.border_color.to_pdf(),
        style.fill_color.to_pdf(),
        ca
    )
}

fn annot_head(rect: &Rect, page_id: u32) -> String {
    format!(
        "<< /Type /Annot\n/Subtype /Widget\n/Rect {}\n/P {} 0 R\n/F {}\n",
        rect.to_pdf_array(),
        page_id,
        ANNOT_PRINT
    )
}

/// Merged field/widget dictionary for a terminal field.
pub fn widget_dict(widget: &Widget, page_id: u32, appearance: Option<(u32, u32)>) -> String {
    let mut dict = annot_head(&widget.rect, page_id);
    dict.push_str(&format!("/T {}\n", pdf_text_string(&widget.name)));
    if let Some(tooltip) = &widget.tooltip {
        dict.push_str(&format!("/TU {}\n", pdf_text_string(tooltip)));
    }
    dict.push_str(&format!(
        "/BS << /W {} /S /S >>\n",
        num(widget.style.border_width)
    ));

    match &widget.kind {
        WidgetKind::Text { multiline, value } => {
            dict.push_str("/FT /Tx\n");
            if *multiline {
                dict.push_str(&format!("/Ff {}\n", FF_MULTILINE));
            }
            if let Some(value) = value {
                dict.push_str(&format!("/V {}\n", pdf_text_string(value)));
            }
            dict.push_str(&text_da(&widget.style));
            dict.push_str(&mk_entry(&widget.style, None));
        }
        WidgetKind::Choice { options } => {
            dict.push_str("/FT /Ch\n");
            dict.push_str(&format!("/Ff {}\n", FF_COMBO));
            let opts: Vec<String> = options
                .iter()
                .map(|(key, label)| {
                    format!("[{} {}]", pdf_text_string(key), pdf_text_string(label))
                })
                .collect();
            dict.push_str(&format!("/Opt [{}]\n", opts.join(" ")));
            dict.push_str(&text_da(&widget.style));
            dict.push_str(&mk_entry(&widget.style, None));
        }
        WidgetKind::Checkbox { on_state } => {
            dict.push_str("/FT /Btn\n/V /Off\n/AS /Off\n");
            dict.push_str(&format!(
                "/DA (/ZaDb 0 Tf {} rg)\n",
                widget.style.text_color.to_pdf()
            ));
            dict.push_str(&mk_entry(&widget.style, Some(CHECK_MARK)));
            if let Some((on_id, off_id)) = appearance {
                dict.push_str(&format!(
                    "/AP << /N << /{} {} 0 R /Off {} 0 R >> >>\n",
                    pdf_name(on_state),
                    on_id,
                    off_id
                ));
            }
        }
    }

    dict.push_str(">>\n");
    dict
}

fn text_da(style: &WidgetStyle) -> String {
    format!(
        "/DA (/Helv {} Tf {} rg)\n",
        num(style.font_size),
        style.text_color.to_pdf()
    )
}

pub fn radio_parent_dict(group: &RadioGroup, kids: &[u32]) -> String {
    let mut dict = format!(
        "<< /FT /Btn\n/Ff {}\n/T {}\n",
        FF_RADIO | FF_NO_TOGGLE_TO_OFF,
        pdf_text_string(&group.name)
    );
    if let Some(tooltip) = &group.tooltip {
        dict.push_str(&format!("/TU {}\n", pdf_text_string(tooltip)));
    }
    let kid_refs: Vec<String> = kids.iter().map(|id| format!("{} 0 R", id)).collect();
    dict.push_str(&format!("/V /Off\n/Kids [{}]\n>>\n", kid_refs.join(" ")));
    dict
}

pub fn radio_kid_dict(button: &RadioButton, parent_id: u32, page_id: u32, appearance: (u32, u32)) -> String {
    let mut dict = annot_head(&button.rect, page_id);
    dict.push_str(&format!("/Parent {} 0 R\n/AS /Off\n", parent_id));
    dict.push_str(&format!(
        "/BS << /W {} /S /S >>\n",
        num(button.style.border_width)
    ));
    dict.push_str(&mk_entry(&button.style, Some(RADIO_DOT)));
    dict.push_str(&format!(
        "/AP << /N << /{} {} 0 R /Off {} 0 R >> >>\n>>\n",
        pdf_name(&button.value),
        appearance.0,
        appearance.1
    ));
    dict
}

/// Appearance stream in widget space: background, border and an optional
/// ZapfDingbats mark centered in the box.
pub fn appearance_stream(rect: &Rect, style: &WidgetStyle, mark: Option<char>) -> Vec<u8> {
    let bw = style.border_width;
    let mut s = String::from("q\n");
    s.push_str(&format!(
        "{} rg\n0 0 {} {} re f\n",
        style.fill_color.to_pdf(),
        num(rect.width),
        num(rect.height)
    ));
    if bw > 0.0 {
        s.push_str(&format!(
            "{} RG\n{} w\n{} {} {} {} re S\n",
            style.border_color.to_pdf(),
            num(bw),
            num(bw / 2.0),
            num(bw / 2.0),
            num(rect.width - bw),
            num(rect.height - bw)
        ));
    }
    if let Some(mark) = mark {
        let size = rect.height.min(rect.width) * 0.8;
        // both marks are roughly 0.78 em wide and 0.7 em tall
        let tx = (rect.width - size * 0.78) / 2.0;
        let ty = (rect.height - size * 0.7) / 2.0;
        s.push_str(&format!(
            "BT\n/ZaDb {} Tf\n{} rg\n{} {} Td\n({}) Tj\nET\n",
            num(size),
            style.text_color.to_pdf(),
            num(tx),
            num(ty),
            mark
        ));
    }
    s.push_str("Q\n");
    s.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_widget(multiline: bool) -> Widget {
        Widget {
            name: "first_name".to_string(),
            tooltip: Some("First Name".to_string()),
            rect: Rect::new(36.0, 600.0, 200.0, 24.0),
            page: 0,
            kind: WidgetKind::Text {
                multiline,
                value: None,
            },
            style: WidgetStyle::default(),
        }
    }

    #[test]
    fn test_support_check() {
        let extras = WidgetExtras {
            export_value: Some("x".into()),
            ..Default::default()
        };
        assert!(WidgetSupport::default().check(&extras).is_ok());
        assert_eq!(
            WidgetSupport::minimal().check(&extras),
            Err(WidgetError::UnsupportedOption("export_value"))
        );
        assert!(WidgetSupport::minimal().check(&WidgetExtras::default()).is_ok());
    }

    #[test]
    fn test_ensure_rect() {
        assert!(ensure_rect("a", &Rect::new(0.0, 0.0, 10.0, 10.0)).is_ok());
        assert!(ensure_rect("a", &Rect::new(0.0, 0.0, 0.0, 10.0)).is_err());
        assert!(ensure_rect("a", &Rect::new(0.0, 0.0, 10.0, f32::NAN)).is_err());
    }

    #[test]
    fn test_text_widget_dict() {
        let dict = widget_dict(&text_widget(false), 7, None);
        assert!(dict.contains("/FT /Tx"));
        assert!(dict.contains("/T (first_name)"));
        assert!(dict.contains("/TU (First Name)"));
        assert!(dict.contains("/Rect [36 600 236 624]"));
        assert!(dict.contains("/P 7 0 R"));
        assert!(!dict.contains("/Ff"));

        let multi = widget_dict(&text_widget(true), 7, None);
        assert!(multi.contains("/Ff 4096"));
    }

    #[test]
    fn test_choice_widget_dict() {
        let mut w = text_widget(false);
        w.kind = WidgetKind::Choice {
            options: vec![("ny".into(), "New York".into())],
        };
        let dict = widget_dict(&w, 3, None);
        assert!(dict.contains("/FT /Ch"));
        assert!(dict.contains("/Ff 131072"));
        assert!(dict.contains("/Opt [[(ny) (New York)]]"));
    }

    #[test]
    fn test_checkbox_widget_dict() {
        let mut w = text_widget(false);
        w.kind = WidgetKind::Checkbox {
            on_state: "consent_yes".into(),
        };
        let dict = widget_dict(&w, 3, Some((10, 11)));
        assert!(dict.contains("/FT /Btn"));
        assert!(dict.contains("/AS /Off"));
        assert!(dict.contains("/AP << /N << /consent_yes 10 0 R /Off 11 0 R >> >>"));
    }

    #[test]
    fn test_radio_dicts() {
        let group = RadioGroup {
            name: "smoker".into(),
            tooltip: None,
            buttons: vec![],
        };
        let parent = radio_parent_dict(&group, &[5, 6]);
        assert!(parent.contains("/Ff 49152"));
        assert!(parent.contains("/Kids [5 0 R 6 0 R]"));

        let button = RadioButton {
            value: "yes".into(),
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            page: 0,
            style: WidgetStyle::default(),
        };
        let kid = radio_kid_dict(&button, 4, 2, (8, 9));
        assert!(kid.contains("/Parent 4 0 R"));
        assert!(kid.contains("/yes 8 0 R /Off 9 0 R"));
        assert!(!kid.contains("/T ("));
    }

    #[test]
    fn test_appearance_stream() {
        let rect = Rect::new(0.0, 0.0, 12.0, 12.0);
        let on = String::from_utf8(appearance_stream(&rect, &WidgetStyle::default(), Some(CHECK_MARK))).unwrap();
        let off = String::from_utf8(appearance_stream(&rect, &WidgetStyle::default(), None)).unwrap();
        assert!(on.contains("(4) Tj"));
        assert!(!off.contains("Tj"));
        assert!(off.contains("re S"));
    }
}
