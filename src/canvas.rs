//! In-memory drawing surface.
//!
//! The canvas accumulates one content stream per page together with the
//! form widgets placed on it. Nothing touches the filesystem until
//! [`Document::save`] is called on the finished result.

use crate::image::{ImageInfo, create_image_content_stream};
use crate::metrics::BuiltinFont;
use crate::pdf_generator::{Color, PageLayout, Rect, assemble_pdf, escape_pdf_string, num};
use crate::widgets::{
    FormField, RadioButton, RadioGroup, Widget, WidgetError, WidgetExtras, WidgetKind,
    WidgetStyle, WidgetSupport, ensure_rect,
};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsState {
    pub font: BuiltinFont,
    pub font_size: f32,
    pub fill: Color,
    pub stroke: Color,
    pub line_width: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        GraphicsState {
            font: BuiltinFont::Helvetica,
            font_size: 12.0,
            fill: Color::black(),
            stroke: Color::black(),
            line_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub content: Vec<u8>,
}

impl Page {
    pub fn content_str(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

pub struct Canvas {
    layout: PageLayout,
    title: String,
    support: WidgetSupport,
    pages: Vec<Page>,
    current: Vec<u8>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    fields: Vec<FormField>,
    images: Vec<(String, ImageInfo)>,
}

impl Canvas {
    pub fn new(layout: PageLayout) -> Self {
        Canvas {
            layout,
            title: String::new(),
            support: WidgetSupport::default(),
            pages: Vec::new(),
            current: Vec::new(),
            state: GraphicsState::default(),
            saved: Vec::new(),
            fields: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_support(mut self, support: WidgetSupport) -> Self {
        self.support = support;
        self
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// 1-based number of the page currently being drawn.
    pub fn page_number(&self) -> usize {
        self.pages.len() + 1
    }

    fn page_index(&self) -> usize {
        self.pages.len()
    }

    /// Close the current page and open a fresh one. The graphics state
    /// resets; states saved earlier stay restorable.
    pub fn show_page(&mut self) {
        let content = std::mem::take(&mut self.current);
        self.pages.push(Page { content });
        self.state = GraphicsState::default();
    }

    // --- state ---

    pub fn state(&self) -> GraphicsState {
        self.state
    }

    pub fn save_state(&mut self) {
        self.saved.push(self.state);
    }

    pub fn restore_state(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    pub fn set_font(&mut self, font: BuiltinFont, size: f32) {
        self.state.font = font;
        self.state.font_size = size;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }

    pub fn string_width(&self, text: &str) -> f32 {
        self.state.font.text_width(text, self.state.font_size)
    }

    // --- drawing ---

    pub fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        let op = format!(
            "BT\n/{} {} Tf\n{} rg\n{} {} Td\n({}) Tj\nET\n",
            self.state.font.resource_name(),
            num(self.state.font_size),
            self.state.fill.to_pdf(),
            num(x),
            num(y),
            escape_pdf_string(text)
        );
        self.current.extend_from_slice(op.as_bytes());
    }

    pub fn draw_centred_string(&mut self, center_x: f32, y: f32, text: &str) {
        let width = self.string_width(text);
        self.draw_string(center_x - width / 2.0, y, text);
    }

    pub fn draw_right_string(&mut self, right_x: f32, y: f32, text: &str) {
        let width = self.string_width(text);
        self.draw_string(right_x - width, y, text);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let op = format!(
            "{} RG\n{} w\n{} {} m\n{} {} l\nS\n",
            self.state.stroke.to_pdf(),
            num(self.state.line_width),
            num(x1),
            num(y1),
            num(x2),
            num(y2)
        );
        self.current.extend_from_slice(op.as_bytes());
    }

    pub fn rect(&mut self, rect: Rect, stroke: bool, fill: bool) {
        let paint = match (stroke, fill) {
            (true, true) => "B",
            (false, true) => "f",
            (true, false) => "S",
            (false, false) => "n",
        };
        let op = format!(
            "{} rg\n{} RG\n{} w\n{} {} {} {} re\n{}\n",
            self.state.fill.to_pdf(),
            self.state.stroke.to_pdf(),
            num(self.state.line_width),
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
            paint
        );
        self.current.extend_from_slice(op.as_bytes());
    }

    /// Make an image available under `name` for [`Canvas::draw_image`].
    pub fn register_image(&mut self, name: &str, info: ImageInfo) {
        if !self.images.iter().any(|(n, _)| n == name) {
            self.images.push((name.to_string(), info));
        }
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.images.iter().any(|(n, _)| n == name)
    }

    pub fn draw_image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        if self.has_image(name) {
            let op = create_image_content_stream(x, y, width, height, name);
            self.current.extend_from_slice(&op);
        }
    }

    // --- widgets ---

    pub fn text_field(
        &mut self,
        name: &str,
        rect: Rect,
        multiline: bool,
        style: WidgetStyle,
        extras: &WidgetExtras,
    ) -> Result<(), WidgetError> {
        self.support.check(extras)?;
        ensure_rect(name, &rect)?;
        self.push_widget(name, rect, style, extras, WidgetKind::Text {
            multiline,
            value: extras.value.clone(),
        });
        Ok(())
    }

    pub fn choice_field(
        &mut self,
        name: &str,
        rect: Rect,
        options: Vec<(String, String)>,
        style: WidgetStyle,
        extras: &WidgetExtras,
    ) -> Result<(), WidgetError> {
        self.support.check(extras)?;
        ensure_rect(name, &rect)?;
        self.push_widget(name, rect, style, extras, WidgetKind::Choice { options });
        Ok(())
    }

    /// The checked state is named after the export value, then the value,
    /// then the conventional `Yes`.
    pub fn checkbox(
        &mut self,
        name: &str,
        rect: Rect,
        style: WidgetStyle,
        extras: &WidgetExtras,
    ) -> Result<(), WidgetError> {
        self.support.check(extras)?;
        ensure_rect(name, &rect)?;
        let on_state = extras
            .export_value
            .clone()
            .or_else(|| extras.value.clone())
            .unwrap_or_else(|| "Yes".to_string());
        self.push_widget(name, rect, style, extras, WidgetKind::Checkbox { on_state });
        Ok(())
    }

    /// Add one button to the radio field `group`, creating the field on
    /// first use.
    pub fn radio(
        &mut self,
        group: &str,
        value: &str,
        rect: Rect,
        style: WidgetStyle,
        extras: &WidgetExtras,
    ) -> Result<(), WidgetError> {
        self.support.check(extras)?;
        ensure_rect(group, &rect)?;
        let button = RadioButton {
            value: value.to_string(),
            rect,
            page: self.page_index(),
            style,
        };
        let existing = self.fields.iter_mut().find_map(|f| match f {
            FormField::Radio(g) if g.name == group => Some(g),
            _ => None,
        });
        match existing {
            Some(g) => g.buttons.push(button),
            None => self.fields.push(FormField::Radio(RadioGroup {
                name: group.to_string(),
                tooltip: extras.tooltip.clone(),
                buttons: vec![button],
            })),
        }
        Ok(())
    }

    fn push_widget(
        &mut self,
        name: &str,
        rect: Rect,
        style: WidgetStyle,
        extras: &WidgetExtras,
        kind: WidgetKind,
    ) {
        self.fields.push(FormField::Single(Widget {
            name: name.to_string(),
            tooltip: extras.tooltip.clone(),
            rect,
            page: self.page_index(),
            kind,
            style,
        }));
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Content drawn so far on the open page.
    pub fn current_content(&self) -> String {
        String::from_utf8_lossy(&self.current).into_owned()
    }

    /// Close the open page and hand over everything drawn.
    pub fn finish(mut self) -> Document {
        let content = std::mem::take(&mut self.current);
        self.pages.push(Page { content });
        Document {
            layout: self.layout,
            title: self.title,
            pages: self.pages,
            fields: self.fields,
            images: self.images,
        }
    }
}

/// A fully drawn form, ready to be serialized.
#[derive(Debug, Clone)]
pub struct Document {
    pub layout: PageLayout,
    pub title: String,
    pub pages: Vec<Page>,
    pub fields: Vec<FormField>,
    pub images: Vec<(String, ImageInfo)>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name()).collect()
    }

    pub fn find_field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        assemble_pdf(self)
    }

    /// Write the PDF in one go: the file is created, written and flushed
    /// within this call.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes();
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}
