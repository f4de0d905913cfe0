//! Static configuration consumed by the layout engine.
//!
//! Everything has a default matching the stock intake form, so a config
//! file only needs the keys it wants to change.

use crate::error::InputError;
use crate::metrics::TextMeasure;
use crate::pdf_generator::{Color, PageLayout};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    pub margin_x: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            width: 612.0,
            height: 792.0,
            margin_x: 36.0,
            margin_top: 36.0,
            margin_bottom: 36.0,
        }
    }
}

impl PageConfig {
    pub fn layout(&self) -> PageLayout {
        PageLayout {
            width: self.width,
            height: self.height,
            margin_left: self.margin_x,
            margin_right: self.margin_x,
            margin_top: self.margin_top,
            margin_bottom: self.margin_bottom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDimensions {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldDimensions {
    fn default() -> Self {
        FieldDimensions {
            width: 550.0,
            height: 24.0,
        }
    }
}

/// Letterhead drawn at the top of every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub logo_path: Option<PathBuf>,
}

impl Default for BusinessInfo {
    fn default() -> Self {
        BusinessInfo {
            name: "Business Name".to_string(),
            address: "123 Main St, Anytown, USA 12345".to_string(),
            phone: "(555) 555-5555".to_string(),
            email: "contact@business.com".to_string(),
            logo_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub border: Color,
    pub background: Color,
}

impl Default for Palette {
    fn default() -> Self {
        let hex = |s: &str| Color::from_hex(s).unwrap_or_else(Color::black);
        Palette {
            primary: hex("#2D3748"),
            secondary: hex("#4A5568"),
            accent: hex("#3182CE"),
            border: hex("#E2E8F0"),
            background: hex("#F7FAFC"),
        }
    }
}

/// Column layout of a named group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub columns: usize,
    #[serde(default)]
    pub widths: Vec<f32>,
    #[serde(default = "default_group_spacing")]
    pub spacing: f32,
}

fn default_group_spacing() -> f32 {
    10.0
}

impl GroupConfig {
    pub fn new(columns: usize, widths: Vec<f32>, spacing: f32) -> Self {
        GroupConfig {
            columns,
            widths,
            spacing,
        }
    }

    /// A single full-width column, used for groups without configuration.
    pub fn single_column() -> Self {
        GroupConfig::new(1, vec![1.0], default_group_spacing())
    }

    pub fn column_count(&self) -> usize {
        self.columns.max(1)
    }

    /// Proportions padded with the last width (or truncated) to the column
    /// count and normalized to sum to 1. All-zero or missing widths split
    /// evenly.
    pub fn proportions(&self) -> Vec<f32> {
        let columns = self.column_count();
        let mut widths: Vec<f32> = self
            .widths
            .iter()
            .map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 })
            .take(columns)
            .collect();
        let pad = widths.last().copied().unwrap_or(1.0);
        widths.resize(columns, pad);

        let total: f32 = widths.iter().sum();
        if total <= 0.0 {
            return vec![1.0 / columns as f32; columns];
        }
        widths.iter().map(|w| w / total).collect()
    }

    /// Pixel width of each column once inter-column spacing is removed.
    pub fn column_widths(&self, content_width: f32) -> Vec<f32> {
        let columns = self.column_count();
        let available = content_width - self.spacing * (columns - 1) as f32;
        self.proportions()
            .into_iter()
            .map(|p| p * available)
            .collect()
    }
}

/// Explicit container/functional group names. Names listed nowhere are
/// classified by whether they have a [`GroupConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupClasses {
    pub container: Vec<String>,
    pub functional: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    /// Gap left under the lowest field of a completed group row.
    pub row_gap: f32,
    /// Gap left under a group's last row when the group ends.
    pub group_trailing_gap: f32,
}

impl Default for Spacing {
    fn default() -> Self {
        Spacing {
            row_gap: 10.0,
            group_trailing_gap: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub page: PageConfig,
    pub field: FieldDimensions,
    pub business: BusinessInfo,
    pub palette: Palette,
    pub groups: BTreeMap<String, GroupConfig>,
    pub group_classes: GroupClasses,
    pub spacing: Spacing,
    /// Use the legacy per-character width estimate instead of font metrics.
    pub approximate_text: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        let groups = BTreeMap::from([
            (
                "*name_details".to_string(),
                GroupConfig::new(3, vec![0.4, 0.4, 0.2], 15.0),
            ),
            (
                "*address_details".to_string(),
                GroupConfig::new(4, vec![0.43, 0.21, 0.14, 0.22], 8.0),
            ),
            (
                "contact_information".to_string(),
                GroupConfig::new(3, vec![0.33, 0.33, 0.34], 15.0),
            ),
        ]);
        FormConfig {
            page: PageConfig::default(),
            field: FieldDimensions::default(),
            business: BusinessInfo::default(),
            palette: Palette::default(),
            groups,
            group_classes: GroupClasses::default(),
            spacing: Spacing::default(),
            approximate_text: false,
        }
    }
}

impl FormConfig {
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let raw = std::fs::read_to_string(path).map_err(|e| InputError::from_io(path, e))?;
        let config: FormConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        let layout = self.layout();
        if layout.content_width() <= 0.0 || layout.content_top() <= layout.margin_bottom {
            return Err(InputError::Config(
                "page margins leave no room for content".to_string(),
            ));
        }
        if self.field.width <= 0.0 || self.field.height <= 0.0 {
            return Err(InputError::Config(
                "field dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn layout(&self) -> PageLayout {
        self.page.layout()
    }

    /// Width available to ungrouped fields and to a group's columns.
    pub fn content_width(&self) -> f32 {
        self.field.width.min(self.layout().content_width())
    }

    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups.get(name)
    }

    pub fn text_measure(&self) -> TextMeasure {
        if self.approximate_text {
            TextMeasure::Approximate
        } else {
            TextMeasure::Metrics
        }
    }
}
