use super::{FieldRenderer, create_with_fallback, draw_caption, options_or_label, tooltip_ladder};
use crate::form::{FieldOption, FieldSpec};
use crate::generator::RenderContext;
use crate::metrics::{BuiltinFont, TextMeasure};
use crate::pagination::needs_break;
use crate::pdf_generator::Rect;
use crate::styles::LabelCategory;
use crate::text::strip_tags;
use anyhow::Result;
use std::collections::HashSet;

const RADIO_SIZE: f32 = 10.0;
const LABEL_PAD: f32 = 4.0;
const ITEM_GAP: f32 = 15.0;
const ROW_STEP: f32 = 16.0;
const RADIO_GAP: f32 = 12.0;

/// Radio buttons sharing one field name, laid out left to right.
pub struct RadioRenderer;

impl FieldRenderer for RadioRenderer {
    fn draw(&self, ctx: &mut RenderContext<'_>, field: &FieldSpec) -> Result<()> {
        let options = radio_options(field);
        let slot = ctx.layout.field_slot();
        let mut top = draw_caption(ctx, &field.label, slot.x, slot.y, slot.width);

        let style = ctx.styles.get(LabelCategory::CheckboxLabel);
        let positions = layout_radio_options(&options, slot.width, style.font, style.font_size, ctx.measure);
        let widget_style = ctx.widget_style();
        let caption = strip_tags(&field.label);

        let mut row = None;
        let mut bottom = top;
        for (option, (option_row, x)) in options.iter().zip(positions) {
            if row != Some(option_row) {
                if row.is_some() {
                    top -= ROW_STEP;
                }
                row = Some(option_row);
                if !ctx.layout.in_group() && needs_break(top, RADIO_SIZE, ctx.layout.margin_bottom()) {
                    ctx.break_page();
                    top = ctx.layout.current_y;
                }
                bottom = top - RADIO_SIZE;
            }

            let x = slot.x + x;
            let rect = Rect::new(x, top - RADIO_SIZE, RADIO_SIZE, RADIO_SIZE);
            let tooltip = if caption.is_empty() { &option.label } else { &caption };
            let ladder = tooltip_ladder(tooltip);
            create_with_fallback(&ladder, |extras| {
                ctx.canvas
                    .radio(&field.name, &option.key, rect, widget_style, extras)
            })?;

            ctx.canvas.set_font(style.font, style.font_size);
            ctx.canvas.set_fill_color(style.color);
            ctx.canvas
                .draw_string(x + RADIO_SIZE + LABEL_PAD, top - 8.0, &option.label);
        }

        ctx.layout.complete_field(&field.name, slot, bottom, RADIO_GAP);
        Ok(())
    }
}

/// Options with labels stripped of markup. A lone option gets a
/// "Not Selected" companion so the field always offers a choice. Repeated
/// keys get a numeric suffix so each button has its own on-state.
pub fn radio_options(field: &FieldSpec) -> Vec<FieldOption> {
    let mut options: Vec<FieldOption> = options_or_label(field)
        .into_iter()
        .map(|o| FieldOption::new(o.key, strip_tags(&o.label)))
        .collect();
    if options.len() == 1 {
        options.push(FieldOption::new("not_selected", "Not Selected"));
    }

    let mut used = HashSet::new();
    for option in &mut options {
        let base = option.key.clone();
        let mut n = 2;
        while !used.insert(option.key.clone()) {
            option.key = format!("{}_{}", base, n);
            n += 1;
        }
    }
    options
}

/// `(row, x offset)` per option; a new row starts when the next button and
/// its label would overflow `width`.
fn layout_radio_options(
    options: &[FieldOption],
    width: f32,
    font: BuiltinFont,
    font_size: f32,
    measure: TextMeasure,
) -> Vec<(usize, f32)> {
    let mut row = 0;
    let mut x = 0.0;
    options
        .iter()
        .map(|option| {
            let item = RADIO_SIZE + LABEL_PAD + measure.width(&option.label, font, font_size);
            if x > 0.0 && x + item > width {
                row += 1;
                x = 0.0;
            }
            let position = (row, x);
            x += item + ITEM_GAP;
            position
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fixture::Fixture;
    use crate::form::{FieldKind, OptionPayload};
    use crate::widgets::{FormField, RadioGroup, WidgetSupport};
    use serde_json::json;

    fn radio(name: &str, label: &str, options: serde_json::Value) -> FieldSpec {
        let payload: OptionPayload = serde_json::from_value(options).unwrap();
        FieldSpec::new(FieldKind::Radio, name, label).with_options(payload)
    }

    fn group<'a>(ctx: &'a RenderContext<'_>) -> &'a RadioGroup {
        match &ctx.canvas.fields()[0] {
            FormField::Radio(group) => group,
            FormField::Single(_) => panic!("expected a radio group"),
        }
    }

    #[test]
    fn test_single_option_gets_not_selected() {
        let field = radio("smoker", "Smoker?", json!({"yes": "Yes"}));
        let options = radio_options(&field);
        assert_eq!(
            options,
            vec![FieldOption::new("yes", "Yes"), FieldOption::new("not_selected", "Not Selected")]
        );

        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        RadioRenderer.draw(&mut ctx, &field).unwrap();
        let group = group(&ctx);
        assert_eq!(group.name, "smoker");
        let values: Vec<&str> = group.buttons.iter().map(|b| b.value.as_str()).collect();
        assert_eq!(values, vec!["yes", "not_selected"]);
        assert_eq!(group.tooltip.as_deref(), Some("Smoker?"));
    }

    #[test]
    fn test_repeated_keys_get_distinct_values() {
        let field = radio("answer", "Answer", json!(["Yes", "yes", "YES", "No"]));
        let keys: Vec<String> = radio_options(&field).into_iter().map(|o| o.key).collect();
        assert_eq!(keys, vec!["yes", "yes_2", "yes_3", "no"]);

        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        RadioRenderer.draw(&mut ctx, &field).unwrap();
        let values: Vec<&str> = group(&ctx).buttons.iter().map(|b| b.value.as_str()).collect();
        assert_eq!(values, vec!["yes", "yes_2", "yes_3", "no"]);
    }

    #[test]
    fn test_buttons_share_a_row() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        ctx.layout.current_y = 600.0;
        let field = radio("sex", "", json!(["Male", "Female", "Other"]));
        RadioRenderer.draw(&mut ctx, &field).unwrap();

        let buttons = &group(&ctx).buttons;
        assert_eq!(buttons.len(), 3);
        assert!(buttons.iter().all(|b| b.rect.y == 590.0));
        assert!(buttons[0].rect.x < buttons[1].rect.x);
        assert_eq!(ctx.layout.current_y, 590.0 - 12.0);
        assert!(ctx.canvas.current_content().contains("(Female) Tj"));
    }

    #[test]
    fn test_rows_wrap() {
        let options: Vec<FieldOption> = (0..10)
            .map(|i| FieldOption::new(format!("o{}", i), "A reasonably long choice"))
            .collect();
        let positions = layout_radio_options(&options, 300.0, BuiltinFont::Helvetica, 9.0, TextMeasure::Metrics);
        assert_eq!(positions[0], (0, 0.0));
        assert!(positions.iter().any(|(row, _)| *row > 0));
        assert!(positions.iter().all(|(_, x)| *x < 300.0));
    }

    #[test]
    fn test_no_options_uses_label() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context_with(WidgetSupport::minimal());
        let field = FieldSpec::new(FieldKind::Radio, "ok", "Okay");
        RadioRenderer.draw(&mut ctx, &field).unwrap();
        let group = group(&ctx);
        assert_eq!(group.buttons.len(), 2);
        assert_eq!(group.buttons[0].value, "okay");
        assert_eq!(group.tooltip, None);
    }
}
