//! Page-break heuristics and the per-page chrome (letterhead and footer).
//!
//! Breaks are decided from an estimate made before a field is drawn. The
//! estimate never looks at what was actually drawn, so a field whose real
//! height exceeds its estimate can run into the bottom margin.

use crate::canvas::Canvas;
use crate::config::{BusinessInfo, FormConfig, Palette};
use crate::form::{FieldKind, FieldSpec};
use crate::image::{ImageInfo, load_logo, scale_to_fit};
use crate::metrics::{BuiltinFont, TextMeasure};
use crate::pdf_generator::PageLayout;
use crate::styles::{LabelCategory, StyleTable};
use crate::text::{parse_markup, strip_tags, wrap_with};
use tracing::warn;

/// Height reserved per caption line by the estimate.
const CAPTION_LINE_HEIGHT: f32 = 15.0;
/// Per-option height for checkbox and radio lists.
const OPTION_HEIGHT: f32 = 20.0;
const LOGO_BOX: (f32, f32) = (100.0, 75.0);
const LETTERHEAD_LEADING: f32 = 15.0;
pub const LOGO_NAME: &str = "Logo";

/// Estimated vertical space a field needs, decided before drawing it.
pub fn estimate_height(
    field: &FieldSpec,
    config: &FormConfig,
    styles: &StyleTable,
    measure: TextMeasure,
) -> f32 {
    if field.kind.is_skipped() || field.kind.is_group_marker() {
        return 0.0;
    }
    let width = config.content_width();

    if field.kind == FieldKind::Label {
        return parse_markup(&field.label)
            .iter()
            .map(|block| {
                let style = styles.get(block.category);
                let wrap_width = if block.category == LabelCategory::List {
                    width - 20.0
                } else {
                    width - 40.0
                };
                let lines =
                    wrap_with(measure, &block.text, wrap_width, style.font, style.font_size).len();
                style.spacing_before + lines as f32 * style.leading() + style.spacing_after
            })
            .sum();
    }

    let mut height = 0.0;
    let caption = strip_tags(&field.label);
    if !caption.is_empty() {
        let lines = wrap_with(measure, &caption, width - 40.0, BuiltinFont::Helvetica, 10.0).len();
        height += lines as f32 * CAPTION_LINE_HEIGHT
            + styles.get(LabelCategory::FieldLabel).spacing_after;
    }

    height += match &field.kind {
        FieldKind::TextArea => 120.0,
        FieldKind::Checkbox | FieldKind::Radio => {
            let mut options = field.option_list().len().max(1);
            if field.kind == FieldKind::Radio {
                options = options.max(2);
            }
            options as f32 * OPTION_HEIGHT + 5.0
        }
        _ => config.field.height + 25.0,
    };
    height
}

pub fn needs_break(current_y: f32, needed: f32, margin_bottom: f32) -> bool {
    current_y - needed < margin_bottom
}

/// Letterhead, logo and footer drawn on every page.
#[derive(Debug, Clone)]
pub struct PageChrome {
    layout: PageLayout,
    business: BusinessInfo,
    palette: Palette,
    logo: Option<ImageInfo>,
}

impl PageChrome {
    /// Build the chrome, loading the logo if one is configured. A logo that
    /// cannot be loaded is skipped with a warning.
    pub fn new(config: &FormConfig) -> Self {
        let logo = config
            .business
            .logo_path
            .as_deref()
            .and_then(|path| match load_logo(path) {
                Ok(info) => Some(info),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "logo skipped");
                    None
                }
            });
        PageChrome::with_logo(config, logo)
    }

    pub fn with_logo(config: &FormConfig, logo: Option<ImageInfo>) -> Self {
        PageChrome {
            layout: config.layout(),
            business: config.business.clone(),
            palette: config.palette,
            logo,
        }
    }

    fn logo_size(&self) -> Option<(f32, f32)> {
        self.logo
            .as_ref()
            .map(|info| scale_to_fit(info.width, info.height, LOGO_BOX.0, LOGO_BOX.1))
    }

    fn letterhead_lines(&self) -> Vec<&str> {
        [
            self.business.name.as_str(),
            self.business.address.as_str(),
            self.business.phone.as_str(),
            self.business.email.as_str(),
        ]
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect()
    }

    fn first_line_y(&self) -> f32 {
        match self.logo_size() {
            Some((_, h)) => self.layout.height - h - 40.0,
            None => self.layout.height - self.layout.margin_top - 8.0,
        }
    }

    /// Baseline of the last letterhead line, or where it would be.
    fn last_line_y(&self) -> f32 {
        let count = self.letterhead_lines().len().max(1);
        self.first_line_y() - LETTERHEAD_LEADING * (count - 1) as f32
    }

    /// Where field content starts on every page.
    pub fn content_top(&self) -> f32 {
        if self.letterhead_lines().is_empty() && self.logo.is_none() {
            return self.layout.content_top();
        }
        self.last_line_y() - 30.0
    }

    /// Draw logo and letterhead; returns the content top.
    pub fn draw_header(&self, canvas: &mut Canvas) -> f32 {
        canvas.save_state();
        let width = self.layout.width;

        if let (Some(info), Some((w, h))) = (&self.logo, self.logo_size()) {
            if !canvas.has_image(LOGO_NAME) {
                canvas.register_image(LOGO_NAME, info.clone());
            }
            canvas.draw_image(LOGO_NAME, (width - w) / 2.0, self.layout.height - h - 20.0, w, h);
        }

        let lines = self.letterhead_lines();
        if !lines.is_empty() {
            canvas.set_font(BuiltinFont::Helvetica, 8.0);
            canvas.set_fill_color(self.palette.primary);
            let mut y = self.first_line_y();
            for line in &lines {
                canvas.draw_centred_string(width / 2.0, y, line);
                y -= LETTERHEAD_LEADING;
            }
            let rule_y = self.last_line_y() - 12.0;
            canvas.set_stroke_color(self.palette.border);
            canvas.set_line_width(0.5);
            canvas.line(
                self.layout.margin_left,
                rule_y,
                width - self.layout.margin_right,
                rule_y,
            );
        }

        canvas.restore_state();
        self.content_top()
    }

    /// "Page i of N", right-aligned in the bottom margin.
    pub fn draw_footer(&self, canvas: &mut Canvas, page: usize, total: usize) {
        canvas.save_state();
        canvas.set_font(BuiltinFont::Helvetica, 9.0);
        canvas.set_fill_color(self.palette.secondary);
        canvas.draw_right_string(
            self.layout.width - self.layout.margin_right,
            self.layout.margin_bottom - 20.0,
            &format!("Page {} of {}", page, total),
        );
        canvas.restore_state();
    }
}
