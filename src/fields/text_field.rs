use super::{FIELD_GAP, FieldRenderer, MIN_TEXT_WIDTH, create_with_fallback, draw_caption, tooltip_ladder};
use crate::form::FieldSpec;
use crate::generator::RenderContext;
use crate::pdf_generator::Rect;
use crate::text::strip_tags;
use anyhow::Result;

/// Single-line box for `text`, `email` and `date` fields.
pub struct TextFieldRenderer;

impl FieldRenderer for TextFieldRenderer {
    fn draw(&self, ctx: &mut RenderContext<'_>, field: &FieldSpec) -> Result<()> {
        let slot = ctx.layout.field_slot();
        let box_top = draw_caption(ctx, &field.label, slot.x, slot.y, slot.width);

        let height = ctx.config.field.height;
        let rect = Rect::new(slot.x, box_top - height, slot.width.max(MIN_TEXT_WIDTH), height);
        let style = ctx.widget_style();
        let ladder = tooltip_ladder(&strip_tags(&field.label));
        create_with_fallback(&ladder, |extras| {
            ctx.canvas.text_field(&field.name, rect, false, style, extras)
        })?;

        ctx.layout.complete_field(&field.name, slot, rect.y, FIELD_GAP);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fixture::Fixture;
    use crate::form::FieldKind;
    use crate::widgets::{FormField, WidgetKind, WidgetSupport};

    #[test]
    fn test_text_field_geometry() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        ctx.layout.current_y = 600.0;
        let field = FieldSpec::new(FieldKind::Email, "email", "Email Address");
        TextFieldRenderer.draw(&mut ctx, &field).unwrap();

        let FormField::Single(widget) = &ctx.canvas.fields()[0] else {
            panic!("expected a single widget");
        };
        assert_eq!(widget.rect, Rect::new(36.0, 564.0, 540.0, 24.0));
        assert_eq!(widget.tooltip.as_deref(), Some("Email Address"));
        assert!(matches!(widget.kind, WidgetKind::Text { multiline: false, .. }));
        assert_eq!(ctx.layout.current_y, 552.0);
    }

    #[test]
    fn test_without_tooltip_support() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context_with(WidgetSupport::minimal());
        let field = FieldSpec::new(FieldKind::Text, "name", "Name");
        TextFieldRenderer.draw(&mut ctx, &field).unwrap();
        assert_eq!(ctx.canvas.fields().len(), 1);
        let FormField::Single(widget) = &ctx.canvas.fields()[0] else {
            panic!("expected a single widget");
        };
        assert_eq!(widget.tooltip, None);
    }

    #[test]
    fn test_narrow_column_keeps_minimum_width() {
        let mut config = crate::config::FormConfig::default();
        config.field.width = 40.0;
        let fixture = Fixture::with_config(config);
        let mut ctx = fixture.context();
        let field = FieldSpec::new(FieldKind::Date, "dob", "");
        TextFieldRenderer.draw(&mut ctx, &field).unwrap();
        let FormField::Single(widget) = &ctx.canvas.fields()[0] else {
            panic!("expected a single widget");
        };
        assert_eq!(widget.rect.width, 60.0);
    }
}
