//! Style table for captions, headings and body text.

use crate::config::Palette;
use crate::metrics::BuiltinFont;
use crate::pdf_generator::Color;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelCategory {
    H1,
    H2,
    H3,
    H4,
    H5,
    Paragraph,
    Regular,
    FieldLabel,
    CheckboxLabel,
    List,
}

impl LabelCategory {
    /// Category selected by an HTML tag name such as `h3` or `p`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "h1" => Some(LabelCategory::H1),
            "h2" => Some(LabelCategory::H2),
            "h3" => Some(LabelCategory::H3),
            "h4" => Some(LabelCategory::H4),
            "h5" => Some(LabelCategory::H5),
            "p" => Some(LabelCategory::Paragraph),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub font: BuiltinFont,
    pub font_size: f32,
    pub color: Color,
    pub spacing_before: f32,
    pub spacing_after: f32,
    pub alignment: Alignment,
}

impl LabelStyle {
    fn new(font: BuiltinFont, font_size: f32, color: Color, spacing_after: f32) -> Self {
        LabelStyle {
            font,
            font_size,
            color,
            spacing_before: 0.0,
            spacing_after,
            alignment: Alignment::Left,
        }
    }

    fn centered(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }

    /// Distance between consecutive baselines of a wrapped block.
    pub fn leading(&self) -> f32 {
        self.font_size + 5.0
    }
}

#[derive(Debug, Clone)]
pub struct StyleTable {
    styles: HashMap<LabelCategory, LabelStyle>,
}

impl StyleTable {
    pub fn new(palette: &Palette) -> Self {
        use BuiltinFont::*;
        use LabelCategory::*;

        let styles = HashMap::from([
            (FieldLabel, LabelStyle::new(HelveticaBold, 8.0, palette.secondary, 8.0)),
            (H1, LabelStyle::new(HelveticaBold, 18.0, palette.accent, 35.0).centered()),
            (H2, LabelStyle::new(HelveticaBold, 16.0, palette.accent, 28.0)),
            (H3, LabelStyle::new(HelveticaBold, 14.0, palette.accent, 25.0)),
            (H4, LabelStyle::new(HelveticaOblique, 6.0, palette.secondary, 20.0)),
            (H5, LabelStyle::new(HelveticaBold, 10.0, palette.secondary, 14.0)),
            (Paragraph, LabelStyle::new(Helvetica, 10.0, palette.secondary, 30.0)),
            (Regular, LabelStyle::new(Helvetica, 9.0, palette.secondary, 12.0)),
            (CheckboxLabel, LabelStyle::new(Helvetica, 9.0, palette.primary, 8.0)),
            (List, LabelStyle::new(Helvetica, 9.0, palette.secondary, 4.0)),
        ]);
        StyleTable { styles }
    }

    pub fn get(&self, category: LabelCategory) -> LabelStyle {
        self.styles
            .get(&category)
            .or_else(|| self.styles.get(&LabelCategory::Regular))
            .copied()
            .unwrap_or_else(|| LabelStyle::new(BuiltinFont::Helvetica, 9.0, Color::black(), 12.0))
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        StyleTable::new(&Palette::default())
    }
}
