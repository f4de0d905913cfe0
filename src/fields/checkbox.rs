//! Checkbox fields: one box with a wrapped caption, or a grid of boxes.

use super::{FIELD_GAP, FieldRenderer, create_with_fallback, draw_caption, option_widget_names, options_or_label};
use crate::form::{FieldOption, FieldSpec};
use crate::generator::RenderContext;
use crate::metrics::{BuiltinFont, TextMeasure};
use crate::pagination::needs_break;
use crate::pdf_generator::Rect;
use crate::styles::{LabelCategory, LabelStyle};
use crate::text::{strip_tags, wrap_with};
use crate::widgets::WidgetExtras;
use anyhow::Result;

const BOX_SIZE: f32 = 12.0;
/// Box plus the padding between box and text.
const TEXT_OFFSET: f32 = 18.0;
const ITEM_GAP: f32 = 15.0;
const LINE_STEP: f32 = 13.0;
const ROW_GAP: f32 = 8.0;
const TOOLTIP_LIMIT: usize = 50;

pub struct CheckboxRenderer;

impl FieldRenderer for CheckboxRenderer {
    fn draw(&self, ctx: &mut RenderContext<'_>, field: &FieldSpec) -> Result<()> {
        let options = options_or_label(field);
        match options.as_slice() {
            [single] => draw_single(ctx, field, single),
            _ => draw_grid(ctx, field, &options),
        }
    }
}

/// One option placed in the grid, relative to the field's left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionPlacement {
    pub key: String,
    pub label: String,
    pub lines: Vec<String>,
    pub row: usize,
    pub x: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxGrid {
    pub items: Vec<OptionPlacement>,
    pub row_heights: Vec<f32>,
    pub cell_width: f32,
    pub per_row: usize,
}

/// Pack options into rows of equal-width cells.
///
/// The cell is sized for the widest label that fits under a cap of half the
/// field width, so at least two options share a row when the field is wide
/// enough. A label wider than the cap gets a row of its own, wraps at the
/// cap and makes that row taller.
pub fn layout_checkbox_options(
    options: &[FieldOption],
    width: f32,
    font: BuiltinFont,
    font_size: f32,
    measure: TextMeasure,
) -> CheckboxGrid {
    let chrome = TEXT_OFFSET + ITEM_GAP;
    let mut cap = width / 2.0 - chrome;
    if cap < 40.0 {
        cap = width - chrome;
    }
    let labels: Vec<(String, f32)> = options
        .iter()
        .map(|o| {
            let label = strip_tags(&o.label);
            let w = measure.width(&label, font, font_size);
            (label, w)
        })
        .collect();
    let widest = labels
        .iter()
        .map(|(_, w)| *w)
        .filter(|w| *w <= cap)
        .fold(0.0, f32::max);
    let text_width = widest.max(1.0);
    let cell_width = chrome + text_width;
    let per_row = ((width / cell_width).floor() as usize).max(1);

    let mut items = Vec::with_capacity(options.len());
    let (mut row, mut column) = (0usize, 0usize);
    for (option, (label, label_width)) in options.iter().zip(labels) {
        let wide = label_width > cap;
        if wide && column > 0 {
            row += 1;
            column = 0;
        }
        let wrap_width = if wide { cap.max(1.0) } else { text_width };
        let lines = wrap_with(measure, &label, wrap_width, font, font_size);
        items.push(OptionPlacement {
            key: option.key.clone(),
            height: text_block_height(lines.len()),
            label,
            lines,
            row,
            x: column as f32 * cell_width,
        });
        column += 1;
        if wide || column == per_row {
            row += 1;
            column = 0;
        }
    }

    let rows = items.last().map_or(0, |item| item.row + 1);
    let mut row_heights = vec![BOX_SIZE; rows];
    for item in &items {
        row_heights[item.row] = row_heights[item.row].max(item.height);
    }

    CheckboxGrid {
        items,
        row_heights,
        cell_width,
        per_row,
    }
}

/// The first line sits beside the box; further lines extend below it.
fn text_block_height(lines: usize) -> f32 {
    BOX_SIZE + lines.saturating_sub(1) as f32 * LINE_STEP
}

/// Export value first, then value, then tooltip only.
fn checkbox_ladder(tooltip: &str, name: &str) -> Vec<WidgetExtras> {
    let tooltip = (!tooltip.is_empty()).then(|| tooltip.to_string());
    vec![
        WidgetExtras {
            tooltip: tooltip.clone(),
            export_value: Some(name.to_string()),
            value: None,
        },
        WidgetExtras {
            tooltip: tooltip.clone(),
            export_value: None,
            value: Some(name.to_string()),
        },
        WidgetExtras {
            tooltip,
            ..Default::default()
        },
    ]
}

fn truncate_tooltip(text: &str) -> String {
    if text.chars().count() > TOOLTIP_LIMIT {
        let head: String = text.chars().take(TOOLTIP_LIMIT).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn draw_lines(ctx: &mut RenderContext<'_>, style: &LabelStyle, x: f32, top: f32, lines: &[String]) {
    ctx.canvas.set_font(style.font, style.font_size);
    ctx.canvas.set_fill_color(style.color);
    let mut baseline = top - style.font_size;
    for line in lines {
        ctx.canvas.draw_string(x, baseline, line);
        baseline -= LINE_STEP;
    }
}

fn draw_single(ctx: &mut RenderContext<'_>, field: &FieldSpec, option: &FieldOption) -> Result<()> {
    let slot = ctx.layout.field_slot();
    let text = strip_tags(&option.label);
    let caption = strip_tags(&field.label);

    let top = if !caption.is_empty() && caption != text {
        draw_caption(ctx, &field.label, slot.x, slot.y, slot.width)
    } else {
        slot.y
    };

    let style = ctx.styles.get(LabelCategory::CheckboxLabel);
    let lines = ctx.wrap(&text, slot.width - TEXT_OFFSET, style.font, style.font_size);
    let height = text_block_height(lines.len());

    let name = option_widget_names(&field.name, std::slice::from_ref(option))
        .pop()
        .unwrap_or_else(|| field.name.clone());
    let rect = Rect::new(slot.x, top - BOX_SIZE, BOX_SIZE, BOX_SIZE);
    let widget_style = ctx.widget_style();
    let ladder = checkbox_ladder(&truncate_tooltip(&text), &name);
    create_with_fallback(&ladder, |extras| {
        ctx.canvas.checkbox(&name, rect, widget_style, extras)
    })?;

    draw_lines(ctx, &style, slot.x + TEXT_OFFSET, top, &lines);

    let gap = if text.chars().count() > 100 { 15.0 } else { ROW_GAP };
    ctx.layout.complete_field(&field.name, slot, top - height, gap);
    Ok(())
}

fn draw_grid(ctx: &mut RenderContext<'_>, field: &FieldSpec, options: &[FieldOption]) -> Result<()> {
    let slot = ctx.layout.field_slot();
    let mut top = draw_caption(ctx, &field.label, slot.x, slot.y, slot.width);

    let style = ctx.styles.get(LabelCategory::CheckboxLabel);
    let grid = layout_checkbox_options(options, slot.width, style.font, style.font_size, ctx.measure);
    let names = option_widget_names(&field.name, options);
    let widget_style = ctx.widget_style();

    let mut row = None;
    let mut bottom = top;
    for (item, name) in grid.items.iter().zip(&names) {
        if row != Some(item.row) {
            if row.is_some() {
                top = bottom - ROW_GAP;
            }
            row = Some(item.row);
            let row_height = grid.row_heights[item.row];
            // inside a group the row must stay on one page with its siblings
            if !ctx.layout.in_group() && needs_break(top, row_height, ctx.layout.margin_bottom()) {
                ctx.break_page();
                top = ctx.layout.current_y;
            }
            bottom = top - row_height;
        }

        let x = slot.x + item.x;
        let rect = Rect::new(x, top - BOX_SIZE, BOX_SIZE, BOX_SIZE);
        let ladder = checkbox_ladder(&truncate_tooltip(&item.label), name);
        create_with_fallback(&ladder, |extras| {
            ctx.canvas.checkbox(name, rect, widget_style, extras)
        })?;
        draw_lines(ctx, &style, x + TEXT_OFFSET, top, &item.lines);
    }

    ctx.layout.complete_field(&field.name, slot, bottom, FIELD_GAP);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::fixture::Fixture;
    use crate::form::{FieldKind, OptionPayload};
    use crate::widgets::{FormField, WidgetKind, WidgetSupport};
    use serde_json::json;

    fn checkbox(name: &str, label: &str, options: serde_json::Value) -> FieldSpec {
        let payload: OptionPayload = serde_json::from_value(options).unwrap();
        FieldSpec::new(FieldKind::Checkbox, name, label).with_options(payload)
    }

    fn widgets(ctx: &RenderContext<'_>) -> Vec<(String, Rect, String)> {
        ctx.canvas
            .fields()
            .iter()
            .filter_map(|f| match f {
                FormField::Single(w) => match &w.kind {
                    WidgetKind::Checkbox { on_state } => {
                        Some((w.name.clone(), w.rect, on_state.clone()))
                    }
                    _ => None,
                },
                FormField::Radio(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_long_label_grows_its_item() {
        let long = "Bananas and something long enough to require wrapping across more than one line of the current column width";
        let options = vec![FieldOption::new("a", "Apples"), FieldOption::new("b", long)];
        let grid = layout_checkbox_options(&options, 540.0, BuiltinFont::Helvetica, 9.0, TextMeasure::Metrics);

        assert_eq!(grid.items[0].height, 12.0);
        assert!(grid.items[1].lines.len() > 1);
        assert!(grid.items[1].height > grid.items[0].height);
        assert_eq!(grid.row_heights[grid.items[1].row], grid.items[1].height);

        let (a, b) = (&grid.items[0], &grid.items[1]);
        assert_eq!((a.row, b.row), (0, 1));
        assert_eq!(b.x, 0.0);
        assert!(grid.row_heights[b.row] > grid.row_heights[a.row]);
    }

    #[test]
    fn test_wide_label_between_short_ones() {
        let long = "I have read and understood the privacy notice and consent to treatment";
        let options = vec![
            FieldOption::new("x", "Yes"),
            FieldOption::new("y", long),
            FieldOption::new("z", "No"),
        ];
        let grid = layout_checkbox_options(&options, 300.0, BuiltinFont::Helvetica, 9.0, TextMeasure::Metrics);
        let rows: Vec<usize> = grid.items.iter().map(|i| i.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        assert_eq!(grid.row_heights.len(), 3);
        assert_eq!(grid.items[2].x, 0.0);
        assert!(grid.row_heights[1] > grid.row_heights[0]);
    }

    #[test]
    fn test_scenario_widget_names() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        let field = checkbox(
            "field",
            "Fruit",
            json!({"a": "Apples", "b": "Bananas and something long enough to require wrapping across more than one line of the current column width"}),
        );
        CheckboxRenderer.draw(&mut ctx, &field).unwrap();
        let names: Vec<String> = widgets(&ctx).into_iter().map(|(n, _, _)| n).collect();
        assert_eq!(names, vec!["field_a", "field_b"]);
    }

    #[test]
    fn test_short_options_share_a_row() {
        let options: Vec<FieldOption> = ["Red", "Green", "Blue"]
            .iter()
            .map(|l| FieldOption::synthetic(l))
            .collect();
        let grid = layout_checkbox_options(&options, 540.0, BuiltinFont::Helvetica, 9.0, TextMeasure::Metrics);
        assert!(grid.per_row >= 3);
        assert!(grid.items.iter().all(|i| i.row == 0));
        assert_eq!(grid.row_heights, vec![12.0]);
        assert_eq!(grid.items[1].x, grid.cell_width);
    }

    #[test]
    fn test_narrow_column_one_per_row() {
        let options = vec![FieldOption::new("a", "Alpha"), FieldOption::new("b", "Beta")];
        let grid = layout_checkbox_options(&options, 60.0, BuiltinFont::Helvetica, 9.0, TextMeasure::Metrics);
        assert_eq!(grid.per_row, 1);
        assert_eq!(grid.items[1].row, 1);
        assert_eq!(grid.items[1].x, 0.0);
    }

    #[test]
    fn test_grid_rows_stack() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context_with(WidgetSupport::default());
        ctx.layout.current_y = 600.0;
        let labels: Vec<String> = (0..12).map(|i| format!("Option number {}", i)).collect();
        let field = checkbox("opts", "", json!(labels));
        CheckboxRenderer.draw(&mut ctx, &field).unwrap();

        let boxes = widgets(&ctx);
        assert_eq!(boxes.len(), 12);
        assert_eq!(boxes[0].1.top(), 600.0);
        let last_row_top = boxes[11].1.top();
        assert!(last_row_top < 600.0);
        // rows are 12pt plus an 8pt gap apart
        assert_eq!((600.0 - last_row_top) % 20.0, 0.0);
        assert_eq!(ctx.layout.current_y, last_row_top - 12.0 - 12.0);
        // export value carries the full widget name
        assert_eq!(boxes[3].2, "opts_option_number_3");
    }

    #[test]
    fn test_single_checkbox() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        ctx.layout.current_y = 600.0;
        let field = checkbox("consent", "I consent", json!({"yes": "I consent"}));
        CheckboxRenderer.draw(&mut ctx, &field).unwrap();

        let boxes = widgets(&ctx);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].0, "consent_yes");
        assert_eq!(boxes[0].1, Rect::new(36.0, 588.0, 12.0, 12.0));
        let content = ctx.canvas.current_content();
        // caption matches the option text so it is drawn once
        assert_eq!(content.matches("(I consent) Tj").count(), 1);
        assert!(content.contains("54 591 Td"));
        assert_eq!(ctx.layout.current_y, 600.0 - 12.0 - 8.0);
    }

    #[test]
    fn test_single_checkbox_from_label() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        let field = FieldSpec::new(FieldKind::Checkbox, "agree", "I agree");
        CheckboxRenderer.draw(&mut ctx, &field).unwrap();
        assert_eq!(widgets(&ctx)[0].0, "agree_i_agree");
    }

    #[test]
    fn test_minimal_support_still_creates_box() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context_with(WidgetSupport::minimal());
        let field = checkbox("c", "Pick", json!(["One", "Two"]));
        CheckboxRenderer.draw(&mut ctx, &field).unwrap();
        let boxes = widgets(&ctx);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].2, "Yes");
    }

    #[test]
    fn test_value_rung_used_without_export_value() {
        let fixture = Fixture::new();
        let support = WidgetSupport {
            export_value: false,
            ..WidgetSupport::default()
        };
        let mut ctx = fixture.context_with(support);
        let field = checkbox("c", "", json!({"x": "X"}));
        CheckboxRenderer.draw(&mut ctx, &field).unwrap();
        assert_eq!(widgets(&ctx)[0].2, "c_x");
    }

    #[test]
    fn test_tooltip_truncated() {
        let text = "x".repeat(60);
        let tip = truncate_tooltip(&text);
        assert_eq!(tip.len(), 53);
        assert!(tip.ends_with("..."));
        assert_eq!(truncate_tooltip("short"), "short");
    }

    #[test]
    fn test_grid_breaks_between_rows() {
        let fixture = Fixture::new();
        let mut ctx = fixture.context();
        ctx.layout.current_y = 80.0;
        let labels: Vec<String> = (0..20).map(|i| format!("A fairly long option label {}", i)).collect();
        let field = checkbox("many", "", json!(labels));
        CheckboxRenderer.draw(&mut ctx, &field).unwrap();
        assert_eq!(ctx.layout.current_page, 2);
        assert_eq!(widgets(&ctx).len(), 20);
        assert_eq!(ctx.canvas.page_number(), 2);
    }
}
