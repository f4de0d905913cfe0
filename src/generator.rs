//! Form generation driver.
//!
//! [`FormGenerator`] walks the field list twice. The measurement pass
//! renders into memory to learn the page count; the render pass starts from
//! scratch and draws "Page i of N" footers with the known total. Only the
//! finished render pass is ever written to disk.

use crate::canvas::{Canvas, Document};
use crate::config::FormConfig;
use crate::fields::{self, renderer_for};
use crate::form::{FieldKind, FieldSpec, FormDocument};
use crate::image::ImageInfo;
use crate::layout::{GroupClassifier, LayoutContext, TableClassifier};
use crate::metrics::{BuiltinFont, TextMeasure};
use crate::pagination::{PageChrome, estimate_height, needs_break};
use crate::styles::StyleTable;
use crate::text::wrap_with;
use crate::widgets::{WidgetStyle, WidgetSupport};
use anyhow::{Result, anyhow};
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything a field renderer may touch while drawing one field.
pub struct RenderContext<'a> {
    pub canvas: Canvas,
    pub layout: LayoutContext,
    pub styles: &'a StyleTable,
    pub config: &'a FormConfig,
    pub measure: TextMeasure,
    chrome: &'a PageChrome,
    total_pages: Option<usize>,
}

impl<'a> RenderContext<'a> {
    /// Open the first page and draw its header. `total_pages` is `None`
    /// during the measurement pass, which suppresses footers.
    pub fn new(
        config: &'a FormConfig,
        styles: &'a StyleTable,
        chrome: &'a PageChrome,
        support: WidgetSupport,
        total_pages: Option<usize>,
    ) -> Self {
        let mut canvas = Canvas::new(config.layout()).with_support(support);
        let top = chrome.draw_header(&mut canvas);
        let mut layout = LayoutContext::from_config(config);
        layout.begin_page(top);
        RenderContext {
            canvas,
            layout,
            styles,
            config,
            measure: config.text_measure(),
            chrome,
            total_pages,
        }
    }

    fn draw_footer(&mut self) {
        if let Some(total) = self.total_pages {
            self.chrome
                .draw_footer(&mut self.canvas, self.layout.current_page, total);
        }
    }

    /// Close the page, open the next one and put the cursor under its header.
    pub fn break_page(&mut self) {
        self.draw_footer();
        self.canvas.show_page();
        let top = self.chrome.draw_header(&mut self.canvas);
        self.layout.advance_page(top);
        debug!(page = self.layout.current_page, "page break");
    }

    /// Break the page if `needed` points do not fit above the bottom margin.
    /// Returns true when a break happened. A fresh page is never broken:
    /// content taller than a page starts where it is.
    pub fn ensure_space(&mut self, needed: f32) -> bool {
        if self.layout.current_y >= self.chrome.content_top() {
            return false;
        }
        if needs_break(self.layout.current_y, needed, self.layout.margin_bottom()) {
            self.break_page();
            true
        } else {
            false
        }
    }

    pub fn widget_style(&self) -> WidgetStyle {
        let palette = &self.config.palette;
        WidgetStyle {
            border_color: palette.border,
            fill_color: palette.background,
            text_color: palette.primary,
            border_width: 0.5,
            font_size: 10.0,
        }
    }

    pub fn wrap(&self, text: &str, width: f32, font: BuiltinFont, size: f32) -> Vec<String> {
        wrap_with(self.measure, text, width, font, size)
    }

    /// Draw the last footer and hand over the finished document.
    pub fn finish(mut self) -> Document {
        self.draw_footer();
        self.canvas.finish()
    }
}

pub struct FormGenerator {
    document: FormDocument,
    config: FormConfig,
    styles: StyleTable,
    chrome: PageChrome,
    classifier: Box<dyn GroupClassifier>,
    support: WidgetSupport,
}

impl FormGenerator {
    pub fn new(document: FormDocument, config: FormConfig) -> Self {
        let styles = StyleTable::new(&config.palette);
        let chrome = PageChrome::new(&config);
        let classifier = Box::new(TableClassifier::from_config(&config));
        FormGenerator {
            document,
            config,
            styles,
            chrome,
            classifier,
            support: WidgetSupport::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl GroupClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn with_widget_support(mut self, support: WidgetSupport) -> Self {
        self.support = support;
        self
    }

    /// Replace the configured logo with an already decoded one.
    pub fn with_logo(mut self, logo: Option<ImageInfo>) -> Self {
        self.chrome = PageChrome::with_logo(&self.config, logo);
        self
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    /// Measurement pass: lay the form out in memory and count its pages.
    pub fn count_pages(&self) -> usize {
        self.run(None).page_count()
    }

    /// Both passes. The returned document carries accurate page totals.
    pub fn render(&self) -> Document {
        let total = self.count_pages();
        let document = self.run(Some(total));
        if document.page_count() != total {
            warn!(
                measured = total,
                rendered = document.page_count(),
                "page count changed between passes"
            );
        }
        document
    }

    /// Render and write the PDF to `path`.
    pub fn generate_pdf(&self, path: &Path) -> Result<Document> {
        let document = self.render();
        document.save(path)?;
        info!(
            path = %path.display(),
            pages = document.page_count(),
            fields = document.fields.len(),
            "form written"
        );
        Ok(document)
    }

    fn run(&self, total_pages: Option<usize>) -> Document {
        let mut ctx = RenderContext::new(
            &self.config,
            &self.styles,
            &self.chrome,
            self.support,
            total_pages,
        );
        ctx.canvas.set_title(&self.document.title);
        for field in &self.document.fields {
            self.process_field(&mut ctx, field);
        }
        ctx.finish()
    }

    fn process_field(&self, ctx: &mut RenderContext<'_>, field: &FieldSpec) {
        if field.kind.is_skipped() {
            debug!(field = %field.name, kind = %field.kind, "skipped");
            return;
        }
        if field.kind == FieldKind::GroupStart {
            ctx.layout
                .start_group(&field.name, &self.config, self.classifier.as_ref());
            return;
        }
        if field.kind == FieldKind::GroupEnd {
            ctx.layout.end_group();
            return;
        }

        if ctx.layout.at_row_start() {
            let needed = estimate_height(field, &self.config, &self.styles, ctx.measure);
            ctx.ensure_space(needed);
        }

        ctx.canvas.save_state();
        let result = match renderer_for(&field.kind) {
            Some(renderer) => renderer.draw(ctx, field),
            None => Err(anyhow!("unsupported field type `{}`", field.kind)),
        };
        ctx.canvas.restore_state();

        if let Err(e) = result {
            warn!(field = %field.name, kind = %field.kind, error = %e, "drawing fallback field");
            ctx.canvas.save_state();
            fields::draw_fallback(ctx, field, &e);
            ctx.canvas.restore_state();
        }
    }
}
