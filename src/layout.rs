//! Layout cursor and the group/column manager.
//!
//! A [`LayoutContext`] is threaded through every renderer call. It owns the
//! vertical cursor, the page counter and the active group, if any. Renderers
//! ask it for a [`FieldSlot`], draw into it, and report the lowest y they
//! inked through [`LayoutContext::complete_field`].

use crate::config::{FormConfig, GroupConfig, Spacing};
use crate::pdf_generator::PageLayout;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Organizational wrapper with no column layout of its own.
    Container,
    /// Controls the column layout of the fields inside it.
    Functional,
}

/// Decides whether a group name is a container or a functional group.
pub trait GroupClassifier {
    fn classify(&self, name: &str) -> GroupKind;
}

/// Classification from config: explicit lists win, otherwise a name with a
/// group configuration is functional and anything else is a container.
#[derive(Debug, Clone, Default)]
pub struct TableClassifier {
    container: HashSet<String>,
    functional: HashSet<String>,
    configured: HashSet<String>,
}

impl TableClassifier {
    pub fn from_config(config: &FormConfig) -> Self {
        TableClassifier {
            container: config.group_classes.container.iter().cloned().collect(),
            functional: config.group_classes.functional.iter().cloned().collect(),
            configured: config.groups.keys().cloned().collect(),
        }
    }
}

impl GroupClassifier for TableClassifier {
    fn classify(&self, name: &str) -> GroupKind {
        if self.functional.contains(name) {
            GroupKind::Functional
        } else if self.container.contains(name) {
            GroupKind::Container
        } else if self.configured.contains(name) {
            GroupKind::Functional
        } else {
            GroupKind::Container
        }
    }
}

/// Outcome of a `group_start` request.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupTransition {
    Started,
    /// A functional group replaced the open container group.
    ClosedAndStarted { closed: String },
    /// A container group was requested inside another group.
    Ignored,
    /// A functional group was requested inside another functional group.
    Blocked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedField {
    pub name: String,
    pub x: f32,
    /// Lowest y the field inked.
    pub y: f32,
    pub start_y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGroup {
    pub name: String,
    pub kind: GroupKind,
    pub columns: usize,
    pub column_widths: Vec<f32>,
    pub spacing: f32,
    pub start_y: f32,
    pub fields: Vec<PlacedField>,
    /// `group_end` markers still owed to ignored or blocked starts.
    pub swallowed_ends: usize,
}

impl ActiveGroup {
    fn next_column(&self) -> usize {
        self.fields.len() % self.columns
    }

    fn row_start(&self) -> usize {
        self.fields.len() - self.next_column()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GroupState {
    #[default]
    Idle,
    InGroup(ActiveGroup),
}

/// Where the next field goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSlot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct LayoutContext {
    pub current_y: f32,
    pub current_page: usize,
    pub layout: PageLayout,
    pub content_width: f32,
    pub spacing: Spacing,
    pub group: GroupState,
}

impl LayoutContext {
    pub fn new(layout: PageLayout, content_width: f32, spacing: Spacing) -> Self {
        LayoutContext {
            current_y: layout.content_top(),
            current_page: 1,
            layout,
            content_width,
            spacing,
            group: GroupState::Idle,
        }
    }

    pub fn from_config(config: &FormConfig) -> Self {
        LayoutContext::new(config.layout(), config.content_width(), config.spacing.clone())
    }

    /// Move the cursor to the top of the page's content area.
    pub fn begin_page(&mut self, content_top: f32) {
        self.current_y = content_top;
    }

    /// Account for a page break: next page number, cursor back to the top.
    pub fn advance_page(&mut self, content_top: f32) {
        self.current_page += 1;
        self.begin_page(content_top);
    }

    pub fn margin_x(&self) -> f32 {
        self.layout.margin_left
    }

    pub fn margin_bottom(&self) -> f32 {
        self.layout.margin_bottom
    }

    pub fn in_group(&self) -> bool {
        matches!(self.group, GroupState::InGroup(_))
    }

    pub fn active_group(&self) -> Option<&ActiveGroup> {
        match &self.group {
            GroupState::InGroup(g) => Some(g),
            GroupState::Idle => None,
        }
    }

    /// True when the next field starts a new row (always true when idle).
    pub fn at_row_start(&self) -> bool {
        self.active_group().is_none_or(|g| g.next_column() == 0)
    }

    pub fn field_slot(&self) -> FieldSlot {
        match &self.group {
            GroupState::Idle => FieldSlot {
                x: self.margin_x(),
                y: self.current_y,
                width: self.content_width,
                column: 0,
            },
            GroupState::InGroup(g) => {
                let column = g.next_column();
                let preceding: f32 = g.column_widths[..column].iter().sum();
                let y = if column == 0 {
                    self.current_y
                } else {
                    g.fields[g.row_start()].start_y
                };
                FieldSlot {
                    x: self.margin_x() + preceding + g.spacing * column as f32,
                    y,
                    width: g.column_widths[column],
                    column,
                }
            }
        }
    }

    /// Record a drawn field. Outside a group the cursor moves to
    /// `bottom_y - gap`; inside one the field joins the current row and the
    /// cursor moves only once the row is complete.
    pub fn complete_field(&mut self, name: &str, slot: FieldSlot, bottom_y: f32, gap: f32) {
        let row_gap = self.spacing.row_gap;
        match &mut self.group {
            GroupState::Idle => {
                self.current_y = bottom_y - gap;
            }
            GroupState::InGroup(g) => {
                g.fields.push(PlacedField {
                    name: name.to_string(),
                    x: slot.x,
                    y: bottom_y,
                    start_y: slot.y,
                    width: slot.width,
                });
                if g.next_column() == 0 {
                    let row = &g.fields[g.fields.len() - g.columns..];
                    let lowest = row.iter().map(|f| f.y).fold(f32::INFINITY, f32::min);
                    self.current_y = lowest - row_gap;
                } else {
                    self.current_y = g.fields[g.row_start()].start_y;
                }
            }
        }
    }

    pub fn start_group(
        &mut self,
        name: &str,
        config: &FormConfig,
        classifier: &dyn GroupClassifier,
    ) -> GroupTransition {
        let kind = classifier.classify(name);
        let transition = match &mut self.group {
            GroupState::Idle => GroupTransition::Started,
            GroupState::InGroup(active) => match (active.kind, kind) {
                (GroupKind::Container, GroupKind::Functional) => GroupTransition::ClosedAndStarted {
                    closed: active.name.clone(),
                },
                (_, GroupKind::Container) => {
                    active.swallowed_ends += 1;
                    GroupTransition::Ignored
                }
                (GroupKind::Functional, GroupKind::Functional) => {
                    active.swallowed_ends += 1;
                    GroupTransition::Blocked
                }
            },
        };

        match &transition {
            GroupTransition::Started => self.open_group(name, kind, config),
            GroupTransition::ClosedAndStarted { .. } => {
                self.close_group();
                self.open_group(name, kind, config);
            }
            GroupTransition::Ignored | GroupTransition::Blocked => {}
        }
        debug!(group = name, ?kind, ?transition, "group start");
        transition
    }

    fn open_group(&mut self, name: &str, kind: GroupKind, config: &FormConfig) {
        let config = config
            .group(name)
            .cloned()
            .unwrap_or_else(GroupConfig::single_column);
        self.group = GroupState::InGroup(ActiveGroup {
            name: name.to_string(),
            kind,
            columns: config.column_count(),
            column_widths: config.column_widths(self.content_width),
            spacing: config.spacing,
            start_y: self.current_y,
            fields: Vec::new(),
            swallowed_ends: 0,
        });
    }

    /// Handle a `group_end` marker. Returns true if a group was closed.
    pub fn end_group(&mut self) -> bool {
        match &mut self.group {
            GroupState::Idle => {
                debug!("group end with no open group ignored");
                return false;
            }
            GroupState::InGroup(active) if active.swallowed_ends > 0 => {
                active.swallowed_ends -= 1;
                return false;
            }
            GroupState::InGroup(_) => {}
        }
        self.close_group();
        true
    }

    fn close_group(&mut self) {
        let trailing_gap = self.spacing.group_trailing_gap;
        if let GroupState::InGroup(active) = std::mem::take(&mut self.group) {
            if let Some(last) = active.fields.len().checked_sub(1) {
                let row_start = last - last % active.columns;
                let lowest = active.fields[row_start..]
                    .iter()
                    .map(|f| f.y)
                    .fold(f32::INFINITY, f32::min);
                self.current_y = lowest - trailing_gap;
            }
        }
    }
}
