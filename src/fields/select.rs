use super::{FIELD_GAP, FieldRenderer, create_with_fallback, draw_caption, tooltip_ladder};
use crate::form::FieldSpec;
use crate::generator::RenderContext;
use crate::pdf_generator::Rect;
use crate::text::strip_tags;
use anyhow::Result;

const MIN_SELECT_WIDTH: f32 = 100.0;

/// Combo box for `select` fields.
pub struct SelectRenderer;

impl FieldRenderer for SelectRenderer {
    fn draw(&self, ctx: &mut RenderContext<'_>, field: &FieldSpec) -> Result<()> {
        let slot = ctx.layout.field_slot();
        let box_top = draw_caption(ctx, &field.label, slot.x, slot.y, slot.width);

        let options: Vec<(String, String)> = field
            .option_list()
            .into_iter()
            .map(|o| (o.key, o.label))
            .collect();
        let height = ctx.config.field.height;
        let rect = Rect::new(
            slot.x,
            box_top - height,
            slot.width.max(MIN_SELECT_WIDTH),
            height,
        );
        let style = ctx.widget_style();
        let ladder = tooltip_ladder(&select_tooltip(&strip_tags(&field.label), &options));
        create_with_fallback(&ladder, |extras| {
            ctx.canvas
                .choice_field(&field.name, rect, options.clone(), style, extras)
        })?;

        ctx.layout.complete_field(&field.name, slot, rect.y, FIELD_GAP);
        Ok(())
    }
}

/// "Label - Options: a, b" listing every option label.
fn select_tooltip(label: &str, options: &[(String, String)]) -> String {
    if options.is_empty() {
        return label.to_string();
    }
    let labels: Vec<&str> = options.iter().map(|(_, label)| label.as_str()).collect();
    if label.is_empty() {
        format!("Options: {}", labels.join(", "))
    } else {
        format!("{} - Options: {}", label, labels.join(", "))
    }
}
