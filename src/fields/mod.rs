//! Field renderers.
//!
//! Each renderer draws one [`FieldSpec`] at the slot handed out by the
//! layout context, then reports the lowest y it inked through
//! [`LayoutContext::complete_field`](crate::layout::LayoutContext::complete_field).

mod checkbox;
mod label;
mod radio;
mod select;
mod text_area;
mod text_field;

pub use checkbox::{CheckboxGrid, CheckboxRenderer, OptionPlacement, layout_checkbox_options};
pub use label::LabelRenderer;
pub use radio::RadioRenderer;
pub use select::SelectRenderer;
pub use text_area::TextAreaRenderer;
pub use text_field::TextFieldRenderer;

use crate::form::{FieldKind, FieldOption, FieldSpec};
use crate::generator::RenderContext;
use crate::pdf_generator::Rect;
use crate::styles::LabelCategory;
use crate::text::{normalize_field_value, strip_tags};
use crate::widgets::{WidgetError, WidgetExtras};
use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Space between caption lines beyond the font size.
const CAPTION_LINE_GAP: f32 = 3.0;
/// Space between the last caption baseline and the widget below it.
const CAPTION_BOX_GAP: f32 = 4.0;
/// Gap left under a single-line field.
pub(crate) const FIELD_GAP: f32 = 12.0;
pub(crate) const MIN_TEXT_WIDTH: f32 = 60.0;

pub trait FieldRenderer {
    fn draw(&self, ctx: &mut RenderContext<'_>, field: &FieldSpec) -> Result<()>;
}

/// Renderer for a drawable field type, `None` for types with no renderer.
pub fn renderer_for(kind: &FieldKind) -> Option<&'static dyn FieldRenderer> {
    match kind {
        FieldKind::Text | FieldKind::Email | FieldKind::Date => Some(&TextFieldRenderer),
        FieldKind::Select => Some(&SelectRenderer),
        FieldKind::TextArea => Some(&TextAreaRenderer),
        FieldKind::Checkbox => Some(&CheckboxRenderer),
        FieldKind::Radio => Some(&RadioRenderer),
        FieldKind::Label => Some(&LabelRenderer),
        _ => None,
    }
}

/// Draw a field caption in the field-label style, wrapped to `width`.
/// Returns the y where the widget below it should start.
pub(crate) fn draw_caption(
    ctx: &mut RenderContext<'_>,
    text: &str,
    x: f32,
    top: f32,
    width: f32,
) -> f32 {
    let caption = strip_tags(text);
    if caption.is_empty() {
        return top;
    }
    let style = ctx.styles.get(LabelCategory::FieldLabel);
    let lines = ctx.wrap(&caption, width, style.font, style.font_size);
    ctx.canvas.set_font(style.font, style.font_size);
    ctx.canvas.set_fill_color(style.color);

    let mut baseline = top - style.font_size;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            baseline -= style.font_size + CAPTION_LINE_GAP;
        }
        ctx.canvas.draw_string(x, baseline, line);
    }
    baseline - CAPTION_BOX_GAP
}

/// Tooltip-only ladder, empty when there is nothing to show.
pub(crate) fn tooltip_ladder(tooltip: &str) -> Vec<WidgetExtras> {
    if tooltip.is_empty() {
        Vec::new()
    } else {
        vec![WidgetExtras::tooltip(tooltip)]
    }
}

/// Try `create` with each set of extras in turn, then with none at all.
/// Only rejected options move down the ladder; any other widget error is
/// returned as is.
pub(crate) fn create_with_fallback<F>(ladder: &[WidgetExtras], mut create: F) -> Result<(), WidgetError>
where
    F: FnMut(&WidgetExtras) -> Result<(), WidgetError>,
{
    for extras in ladder {
        match create(extras) {
            Ok(()) => return Ok(()),
            Err(WidgetError::UnsupportedOption(option)) => {
                debug!(option, "widget option rejected, retrying with fewer extras");
            }
            Err(e) => return Err(e),
        }
    }
    create(&WidgetExtras::default())
}

/// Widget names for a list of options: `{field}_{normalized key}`, or
/// `{field}_option_{n}` for keys that normalize to nothing. Repeats get a
/// numeric suffix so every widget name stays unique.
pub(crate) fn option_widget_names(field_name: &str, options: &[FieldOption]) -> Vec<String> {
    let mut used = HashSet::new();
    options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let key = normalize_field_value(&option.key);
            let base = if key.is_empty() {
                format!("{}_option_{}", field_name, i + 1)
            } else {
                format!("{}_{}", field_name, key)
            };
            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

/// Options for checkbox and radio fields. A field without options gets one
/// option built from its own label.
pub(crate) fn options_or_label(field: &FieldSpec) -> Vec<FieldOption> {
    let options = field.option_list();
    if !options.is_empty() {
        return options;
    }
    let label = strip_tags(&field.label);
    let label = if label.is_empty() { field.name.clone() } else { label };
    let mut option = FieldOption::synthetic(&label);
    if option.key.is_empty() {
        option.key = "option_1".to_string();
    }
    vec![option]
}

/// Stand-in for a field whose renderer failed: a plain text box whose
/// caption carries the error.
pub(crate) fn draw_fallback(ctx: &mut RenderContext<'_>, field: &FieldSpec, err: &anyhow::Error) {
    let slot = ctx.layout.field_slot();
    let label = strip_tags(&field.label);
    let caption = if label.is_empty() {
        format!("(Error: {})", err)
    } else {
        format!("{} (Error: {})", label, err)
    };
    let box_top = draw_caption(ctx, &caption, slot.x, slot.y, slot.width);
    let height = ctx.config.field.height;
    let rect = Rect::new(slot.x, box_top - height, slot.width.max(MIN_TEXT_WIDTH), height);
    let style = ctx.widget_style();
    if let Err(e) = ctx
        .canvas
        .text_field(&field.name, rect, false, style, &WidgetExtras::default())
    {
        warn!(field = %field.name, error = %e, "fallback widget not created");
    }
    ctx.layout.complete_field(&field.name, slot, rect.y, FIELD_GAP);
}

#[cfg(test)]
pub(crate) mod fixture {
    use crate::config::FormConfig;
    use crate::generator::RenderContext;
    use crate::pagination::PageChrome;
    use crate::styles::StyleTable;
    use crate::widgets::WidgetSupport;

    pub struct Fixture {
        pub config: FormConfig,
        pub styles: StyleTable,
        pub chrome: PageChrome,
    }

    impl Fixture {
        pub fn new() -> Self {
            Fixture::with_config(FormConfig::default())
        }

        pub fn with_config(config: FormConfig) -> Self {
            Fixture {
                styles: StyleTable::new(&config.palette),
                chrome: PageChrome::with_logo(&config, None),
                config,
            }
        }

        pub fn context(&self) -> RenderContext<'_> {
            self.context_with(WidgetSupport::default())
        }

        pub fn context_with(&self, support: WidgetSupport) -> RenderContext<'_> {
            RenderContext::new(&self.config, &self.styles, &self.chrome, support, None)
        }
    }
}
