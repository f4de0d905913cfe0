use super::{FieldRenderer, MIN_TEXT_WIDTH, create_with_fallback, draw_caption, tooltip_ladder};
use crate::form::FieldSpec;
use crate::generator::RenderContext;
use crate::pdf_generator::Rect;
use crate::text::strip_tags;
use anyhow::Result;

const AREA_HEIGHT: f32 = 100.0;
const AREA_GAP: f32 = 20.0;

/// Multi-line box for `textarea` fields.
pub struct TextAreaRenderer;

impl FieldRenderer for TextAreaRenderer {
    fn draw(&self, ctx: &mut RenderContext<'_>, field: &FieldSpec) -> Result<()> {
        let slot = ctx.layout.field_slot();
        let box_top = draw_caption(ctx, &field.label, slot.x, slot.y, slot.width);

        let rect = Rect::new(
            slot.x,
            box_top - AREA_HEIGHT,
            slot.width.max(MIN_TEXT_WIDTH),
            AREA_HEIGHT,
        );
        let style = ctx.widget_style();
        let ladder = tooltip_ladder(&strip_tags(&field.label));
        create_with_fallback(&ladder, |extras| {
            ctx.canvas.text_field(&field.name, rect, true, style, extras)
        })?;

        ctx.layout.complete_field(&field.name, slot, rect.y, AREA_GAP);
        Ok(())
    }
}
