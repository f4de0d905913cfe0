use crate::canvas::Document;
use crate::config::FormConfig;
use crate::form::{DEFAULT_TITLE, FieldKind, FieldSpec, FormDocument, OptionPayload};
use crate::generator::FormGenerator;
use crate::widgets::WidgetSupport;
use anyhow::Result;
use serde_json::{Map, Value};
use std::path::Path;

/// Fluent builder for assembling a form in code instead of JSON.
///
/// # Example
/// ```rust,no_run
/// use formpdf::builder::FormBuilder;
///
/// FormBuilder::new()
///     .title("Patient Intake")
///     .label("<h1>Patient Intake</h1>")
///     .start_group("*name_details")
///     .text("first_name", "First Name")
///     .text("last_name", "Last Name")
///     .text("middle_initial", "M.I.")
///     .end_group()
///     .radio("smoker", "Do you smoke?", &[("yes", "Yes"), ("no", "No")])
///     .build("intake.pdf")
///     .expect("failed to write form");
/// ```
pub struct FormBuilder {
    title: String,
    fields: Vec<FieldSpec>,
    config: FormConfig,
    support: WidgetSupport,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            fields: Vec::new(),
            config: FormConfig::default(),
            support: WidgetSupport::default(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_widget_support(mut self, support: WidgetSupport) -> Self {
        self.support = support;
        self
    }

    pub fn text(self, name: &str, label: &str) -> Self {
        self.field(FieldSpec::new(FieldKind::Text, name, label))
    }

    pub fn email(self, name: &str, label: &str) -> Self {
        self.field(FieldSpec::new(FieldKind::Email, name, label))
    }

    pub fn date(self, name: &str, label: &str) -> Self {
        self.field(FieldSpec::new(FieldKind::Date, name, label))
    }

    pub fn textarea(self, name: &str, label: &str) -> Self {
        self.field(FieldSpec::new(FieldKind::TextArea, name, label))
    }

    pub fn select(self, name: &str, label: &str, options: &[(&str, &str)]) -> Self {
        self.field(FieldSpec::new(FieldKind::Select, name, label).with_options(option_map(options)))
    }

    pub fn checkbox(self, name: &str, label: &str, options: &[(&str, &str)]) -> Self {
        self.field(FieldSpec::new(FieldKind::Checkbox, name, label).with_options(option_map(options)))
    }

    pub fn radio(self, name: &str, label: &str, options: &[(&str, &str)]) -> Self {
        self.field(FieldSpec::new(FieldKind::Radio, name, label).with_options(option_map(options)))
    }

    /// Static text; accepts the same light markup as JSON label fields.
    pub fn label(self, markup: &str) -> Self {
        self.field(FieldSpec::new(FieldKind::Label, "", markup))
    }

    pub fn start_group(self, name: &str) -> Self {
        self.field(FieldSpec::new(FieldKind::GroupStart, name, ""))
    }

    pub fn end_group(self) -> Self {
        self.field(FieldSpec::new(FieldKind::GroupEnd, "", ""))
    }

    /// Add a prepared field as is.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn document(&self) -> FormDocument {
        FormDocument::new(self.title.clone(), self.fields.clone())
    }

    /// Lay the form out and return it without touching the filesystem.
    pub fn render(self) -> Document {
        self.into_generator().render()
    }

    /// Build the PDF and return the bytes (no filesystem access)
    pub fn build_bytes(self) -> Vec<u8> {
        self.render().to_bytes()
    }

    /// Build the PDF and write it to `path`.
    pub fn build(self, path: impl AsRef<Path>) -> Result<Document> {
        self.into_generator().generate_pdf(path.as_ref())
    }

    fn into_generator(self) -> FormGenerator {
        let document = FormDocument::new(self.title, self.fields);
        FormGenerator::new(document, self.config).with_widget_support(self.support)
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn option_map(options: &[(&str, &str)]) -> OptionPayload {
    let map: Map<String, Value> = options
        .iter()
        .map(|(key, label)| (key.to_string(), Value::String(label.to_string())))
        .collect();
    OptionPayload::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::FormField;

    #[test]
    fn test_builder_basic() {
        let pdf = FormBuilder::new()
            .title("Test Form")
            .label("<h2>Details</h2>")
            .text("name", "Name")
            .email("email", "Email")
            .build_bytes();

        assert!(pdf.starts_with(b"%PDF"));
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Title (Test Form)"));
        assert!(text.contains("/T (email)"));
    }

    #[test]
    fn test_builder_count() {
        let builder = FormBuilder::new()
            .start_group("contact_information")
            .text("phone", "Phone")
            .end_group();
        assert_eq!(builder.field_count(), 3);
        assert_eq!(builder.document().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_option_order_kept() {
        let builder = FormBuilder::new().select("state", "State", &[("ny", "New York"), ("ca", "California")]);
        let doc = builder.document();
        let keys: Vec<String> = doc.fields[0].option_list().into_iter().map(|o| o.key).collect();
        assert_eq!(keys, vec!["ny", "ca"]);
    }

    #[test]
    fn test_builder_minimal_support() {
        let doc = FormBuilder::new()
            .with_widget_support(WidgetSupport::minimal())
            .checkbox("allergies", "Allergies", &[("pollen", "Pollen"), ("dust", "Dust")])
            .render();
        assert_eq!(doc.field_names(), vec!["allergies_pollen", "allergies_dust"]);
        assert!(matches!(doc.fields[0], FormField::Single(_)));
    }
}
