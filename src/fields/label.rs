use super::FieldRenderer;
use crate::form::FieldSpec;
use crate::generator::RenderContext;
use crate::styles::{Alignment, LabelCategory};
use crate::text::parse_markup;
use anyhow::Result;

const LIST_INDENT: f32 = 10.0;
const RULE_DROP: f32 = 8.0;

/// Static text: headings, paragraphs and lists from the label markup.
pub struct LabelRenderer;

impl FieldRenderer for LabelRenderer {
    fn draw(&self, ctx: &mut RenderContext<'_>, field: &FieldSpec) -> Result<()> {
        let slot = ctx.layout.field_slot();
        let center = slot.x + slot.width / 2.0;
        let mut y = slot.y;

        for block in parse_markup(&field.label) {
            let style = ctx.styles.get(block.category);
            let (x, wrap_width) = if block.category == LabelCategory::List {
                (slot.x + LIST_INDENT, slot.width - 20.0)
            } else {
                (slot.x, slot.width - 40.0)
            };
            let lines = ctx.wrap(&block.text, wrap_width, style.font, style.font_size);

            y -= style.spacing_before;
            ctx.canvas.set_font(style.font, style.font_size);
            ctx.canvas.set_fill_color(style.color);
            let mut baseline = y;
            for line in &lines {
                baseline = y - style.font_size;
                match style.alignment {
                    Alignment::Center => ctx.canvas.draw_centred_string(center, baseline, line),
                    Alignment::Left => ctx.canvas.draw_string(x, baseline, line),
                }
                y -= style.leading();
            }

            if block.category == LabelCategory::H1 && !lines.is_empty() {
                let rule_y = baseline - RULE_DROP;
                ctx.canvas.set_stroke_color(ctx.config.palette.border);
                ctx.canvas.set_line_width(0.5);
                ctx.canvas.line(slot.x, rule_y, slot.x + slot.width, rule_y);
            }
            y -= style.spacing_after;
        }

        ctx.layout.complete_field(&field.name, slot, y, 0.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fixture::Fixture;
    use crate::form::FieldKind;
    use crate::metrics::TextMeasure;
    use crate::pagination::estimate_height;

    fn label(markup: &str) -> FieldSpec {
        FieldSpec::new(FieldKind::Label, "", markup)
    }

    #[test]
    fn test_h1_centered_with_rule() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        ctx.layout.current_y = 600.0;
        LabelRenderer.draw(&mut ctx, &label("<h1>Intake</h1>")).unwrap();

        let content = ctx.canvas.current_content();
        assert!(content.contains("/F2 18 Tf"));
        assert!(content.contains("(Intake) Tj"));
        // rule 8pt under the 582 baseline
        assert!(content.contains("36 574 m\n576 574 l"));
        assert_eq!(ctx.layout.current_y, 600.0 - 58.0);
        assert!(ctx.canvas.fields().is_empty());
    }

    #[test]
    fn test_list_items() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        LabelRenderer
            .draw(&mut ctx, &label("<ol type=\"a\"><li>First</li><li>Second</li></ol>"))
            .unwrap();
        let content = ctx.canvas.current_content();
        assert!(content.contains("(a. First) Tj"));
        assert!(content.contains("(b. Second) Tj"));
    }

    #[test]
    fn test_height_matches_estimate() {
        let fixture = Fixture::new();
        let markup = "<h2>History</h2><p>Please list any conditions you have been treated for in the last five years, including dates where known.</p><ul><li>Asthma</li><li>Diabetes</li></ul>trailing note";
        let field = label(markup);
        let mut ctx = fixture.context();
        ctx.layout.current_y = 700.0;
        LabelRenderer.draw(&mut ctx, &field).unwrap();
        let estimate = estimate_height(&field, &fixture.config, &fixture.styles, TextMeasure::Metrics);
        assert!((700.0 - ctx.layout.current_y - estimate).abs() < 0.01);
    }
}
