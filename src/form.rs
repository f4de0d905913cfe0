//! Form document model and the JSON loader.

use crate::error::InputError;
use crate::text::normalize_field_value;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

pub const DEFAULT_TITLE: &str = "Generated Form";

const TITLE_KEYS: [&str; 3] = ["form_name", "title", "name"];
const INVALID_KIND: &str = "invalid";
const FIELD_SPEC_KEYS: [&str; 4] = ["name", "label", "email_label", "type"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Email,
    Date,
    Select,
    TextArea,
    Checkbox,
    Radio,
    Label,
    GroupStart,
    GroupEnd,
    PdfDownload,
    Submit,
    Other(String),
}

impl FromStr for FieldKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = s.trim().to_lowercase();
        Ok(match kind.as_str() {
            "text" => FieldKind::Text,
            "email" => FieldKind::Email,
            "date" => FieldKind::Date,
            "select" => FieldKind::Select,
            "textarea" => FieldKind::TextArea,
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            "label" => FieldKind::Label,
            "group_start" => FieldKind::GroupStart,
            "group_end" => FieldKind::GroupEnd,
            "pdf_download" => FieldKind::PdfDownload,
            "submit" => FieldKind::Submit,
            _ => FieldKind::Other(kind),
        })
    }
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Date => "date",
            FieldKind::Select => "select",
            FieldKind::TextArea => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Label => "label",
            FieldKind::GroupStart => "group_start",
            FieldKind::GroupEnd => "group_end",
            FieldKind::PdfDownload => "pdf_download",
            FieldKind::Submit => "submit",
            FieldKind::Other(s) => s,
        }
    }

    /// Web-only controls with no place in a printed form.
    pub fn is_skipped(&self) -> bool {
        matches!(self, FieldKind::PdfDownload | FieldKind::Submit)
    }

    pub fn is_group_marker(&self) -> bool {
        matches!(self, FieldKind::GroupStart | FieldKind::GroupEnd)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option payload exactly as it appeared in the input.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum OptionPayload {
    #[default]
    Missing,
    Map(Map<String, Value>),
    List(Vec<Value>),
    Single(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldOption {
    pub key: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        FieldOption {
            key: key.into(),
            label: label.into(),
        }
    }

    /// Option whose key is derived from its label.
    pub fn synthetic(label: &str) -> Self {
        FieldOption::new(normalize_field_value(label), label)
    }
}

impl OptionPayload {
    /// Canonical ordered `(key, label)` pairs. Never fails; shapes that do
    /// not look like options degrade to one synthetic option built from
    /// their string form.
    pub fn normalize(&self) -> Vec<FieldOption> {
        match self {
            OptionPayload::Missing => Vec::new(),
            OptionPayload::Single(value) => {
                let s = value_string(value);
                if s.is_empty() {
                    Vec::new()
                } else {
                    vec![FieldOption::synthetic(&s)]
                }
            }
            OptionPayload::Map(map) => normalize_map(map),
            OptionPayload::List(items) => items.iter().flat_map(normalize_item).collect(),
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            OptionPayload::Missing => true,
            OptionPayload::Map(m) => m.is_empty(),
            OptionPayload::List(l) => l.is_empty(),
            OptionPayload::Single(v) => value_string(v).is_empty(),
        }
    }
}

fn normalize_map(map: &Map<String, Value>) -> Vec<FieldOption> {
    if map.is_empty() {
        return Vec::new();
    }
    let nested = ["option", "options"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_object));
    if let Some(nested) = nested {
        return entries(nested);
    }
    if FIELD_SPEC_KEYS.iter().any(|k| map.contains_key(*k)) {
        let s = Value::Object(map.clone()).to_string();
        return vec![FieldOption::synthetic(&s)];
    }
    entries(map)
}

fn entries(map: &Map<String, Value>) -> Vec<FieldOption> {
    map.iter()
        .map(|(k, v)| FieldOption::new(k.clone(), value_string(v)))
        .collect()
}

fn normalize_item(item: &Value) -> Vec<FieldOption> {
    match item {
        Value::Null => Vec::new(),
        Value::Array(pair) if pair.len() == 2 => {
            vec![FieldOption::new(value_string(&pair[0]), value_string(&pair[1]))]
        }
        Value::Object(obj) => match (obj.get("value"), obj.get("label")) {
            (Some(value), Some(label)) => {
                vec![FieldOption::new(value_string(value), value_string(label))]
            }
            _ => entries(obj),
        },
        other => {
            let s = value_string(other);
            vec![FieldOption::synthetic(&s)]
        }
    }
}

/// String form of a JSON scalar; strings are used verbatim.
fn value_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub options: OptionPayload,
}

impl FieldSpec {
    pub fn new(kind: FieldKind, name: impl Into<String>, label: impl Into<String>) -> Self {
        FieldSpec {
            name: name.into(),
            label: label.into(),
            kind,
            options: OptionPayload::Missing,
        }
    }

    pub fn with_options(mut self, options: OptionPayload) -> Self {
        self.options = options;
        self
    }

    pub fn option_list(&self) -> Vec<FieldOption> {
        self.options.normalize()
    }
}

#[derive(Deserialize)]
struct RawField {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    label: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    option: Option<OptionPayload>,
    #[serde(default)]
    options: Option<OptionPayload>,
}

impl RawField {
    fn into_spec(self, index: usize) -> FieldSpec {
        let kind: FieldKind = match self.kind.as_deref().unwrap_or("").parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        };
        let mut name = self.name.as_ref().map(value_string).unwrap_or_default();
        if name.trim().is_empty() && !matches!(kind, FieldKind::Label | FieldKind::GroupEnd) {
            name = format!("field_{}", index + 1);
        }
        let options = match self.option {
            Some(payload) if !payload.is_missing() => payload,
            _ => self.options.unwrap_or_default(),
        };
        FieldSpec {
            name,
            label: self.label.as_ref().map(value_string).unwrap_or_default(),
            kind,
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormDocument {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl FormDocument {
    pub fn new(title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        FormDocument {
            title: title.into(),
            fields,
        }
    }
}

pub fn load_form(path: &Path) -> Result<FormDocument, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|e| InputError::from_io(path, e))?;
    parse_form(&raw)
}

pub fn parse_form(json: &str) -> Result<FormDocument, InputError> {
    let root: Value = serde_json::from_str(json)?;
    let path = locate_fields(&root).ok_or(InputError::MissingFields)?;

    let title = path
        .iter()
        .find_map(|node| {
            TITLE_KEYS
                .iter()
                .find_map(|key| node.get(*key).and_then(Value::as_str))
                .filter(|s| !s.trim().is_empty())
        })
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let holder = path.last().copied().ok_or(InputError::MissingFields)?;
    let entries = holder
        .get("fields")
        .and_then(Value::as_array)
        .ok_or(InputError::MissingFields)?;

    let fields: Vec<FieldSpec> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match read_field(entry, index) {
            Ok(spec) => spec,
            Err(e) => invalid_field(entry, index, &e),
        })
        .collect();

    debug!(title = %title, fields = fields.len(), "parsed form document");
    Ok(FormDocument { title, fields })
}

fn read_field(entry: &Value, index: usize) -> Result<FieldSpec, InputError> {
    if !entry.is_object() {
        return Err(InputError::InvalidField {
            index,
            reason: format!("expected an object, found {}", json_type(entry)),
        });
    }
    let raw: RawField =
        serde_json::from_value(entry.clone()).map_err(|e| InputError::InvalidField {
            index,
            reason: e.to_string(),
        })?;
    Ok(raw.into_spec(index))
}

/// Placeholder for an entry that could not be read. Its kind has no
/// renderer, so it is drawn as a fallback box and the rest of the form
/// is unaffected.
fn invalid_field(entry: &Value, index: usize, error: &InputError) -> FieldSpec {
    warn!(error = %error, "unreadable field entry kept as a placeholder");
    let text = |key: &str| {
        entry
            .get(key)
            .map(value_string)
            .filter(|s| !s.trim().is_empty())
    };
    let name = text("name").unwrap_or_else(|| format!("field_{}", index + 1));
    let label = match entry {
        Value::Object(_) => text("label").unwrap_or_else(|| name.clone()),
        other => value_string(other),
    };
    FieldSpec::new(FieldKind::Other(INVALID_KIND.to_string()), name, label)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn has_fields(value: &Value) -> bool {
    value.get("fields").is_some_and(Value::is_array)
}

/// Path of objects from the root down to the object holding `fields`.
///
/// Known shapes are tried first: `root key -> content -> nested key`, then a
/// `fields` array on the root itself, then a depth-first search.
fn locate_fields(root: &Value) -> Option<Vec<&Value>> {
    if let Some(obj) = root.as_object() {
        for outer in obj.values() {
            let Some(content) = outer.get("content").filter(|c| c.is_object()) else {
                continue;
            };
            if let Some(inner) = content
                .as_object()
                .and_then(|c| c.values().find(|v| has_fields(v)))
            {
                return Some(vec![root, outer, content, inner]);
            }
        }
    }
    if has_fields(root) {
        return Some(vec![root]);
    }
    let mut path = Vec::new();
    if search(root, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn search<'a>(node: &'a Value, path: &mut Vec<&'a Value>) -> bool {
    match node {
        Value::Object(obj) => {
            path.push(node);
            if has_fields(node) {
                return true;
            }
            for child in obj.values() {
                if search(child, path) {
                    return true;
                }
            }
            path.pop();
            false
        }
        Value::Array(items) => items.iter().any(|item| search(item, path)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> OptionPayload {
        serde_json::from_value(v).unwrap()
    }

    fn pairs(options: Vec<FieldOption>) -> Vec<(String, String)> {
        options.into_iter().map(|o| (o.key, o.label)).collect()
    }

    #[test]
    fn test_field_kind_parse() {
        assert_eq!(" TextArea ".parse::<FieldKind>().unwrap(), FieldKind::TextArea);
        assert_eq!("GROUP_START".parse::<FieldKind>().unwrap(), FieldKind::GroupStart);
        assert_eq!(
            "signature".parse::<FieldKind>().unwrap(),
            FieldKind::Other("signature".to_string())
        );
        assert!(FieldKind::Submit.is_skipped());
        assert!(FieldKind::GroupEnd.is_group_marker());
    }

    #[test]
    fn test_payload_shapes() {
        assert_eq!(payload(json!(null)), OptionPayload::Missing);
        assert!(matches!(payload(json!({"a": "A"})), OptionPayload::Map(_)));
        assert!(matches!(payload(json!(["a"])), OptionPayload::List(_)));
        assert!(matches!(payload(json!("a")), OptionPayload::Single(_)));
        assert!(matches!(payload(json!(3)), OptionPayload::Single(_)));
    }

    #[test]
    fn test_normalize_map_preserves_order() {
        let options = payload(json!({"z": "Zebra", "a": "Apple", "m": 3})).normalize();
        assert_eq!(
            pairs(options),
            vec![
                ("z".into(), "Zebra".into()),
                ("a".into(), "Apple".into()),
                ("m".into(), "3".into())
            ]
        );
    }

    #[test]
    fn test_normalize_nested_map() {
        let options = payload(json!({"option": {"y": "Yes", "n": "No"}, "label": "x"})).normalize();
        assert_eq!(pairs(options), vec![("y".into(), "Yes".into()), ("n".into(), "No".into())]);
    }

    #[test]
    fn test_normalize_field_spec_like_map() {
        let options = payload(json!({"name": "consent", "type": "checkbox"})).normalize();
        assert_eq!(options.len(), 1);
        assert!(options[0].label.contains("consent"));
    }

    #[test]
    fn test_normalize_lists() {
        let strings = payload(json!(["Red Apple", "Pear"])).normalize();
        assert_eq!(
            pairs(strings),
            vec![("red_apple".into(), "Red Apple".into()), ("pear".into(), "Pear".into())]
        );

        let objects = payload(json!([{"value": "ny", "label": "New York"}, {"ca": "California"}])).normalize();
        assert_eq!(
            pairs(objects),
            vec![("ny".into(), "New York".into()), ("ca".into(), "California".into())]
        );

        let tuples = payload(json!([["m", "Male"], ["f", "Female"]])).normalize();
        assert_eq!(tuples[1], FieldOption::new("f", "Female"));
    }

    #[test]
    fn test_normalize_single_and_missing() {
        assert_eq!(
            pairs(payload(json!("I Agree")).normalize()),
            vec![("i_agree".into(), "I Agree".into())]
        );
        assert!(OptionPayload::Missing.normalize().is_empty());
        assert!(payload(json!({})).normalize().is_empty());
        assert!(payload(json!("")).is_missing());
    }

    #[test]
    fn test_parse_nested_shape() {
        let doc = parse_form(
            r#"{"form": {"name": "Patient Intake", "content": {"form": {"fields": [
                {"name": "first", "label": "First", "type": "text"},
                {"name": "fruit", "type": "checkbox", "option": {"a": "Apples"}}
            ]}}}}"#,
        )
        .unwrap();
        assert_eq!(doc.title, "Patient Intake");
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(doc.fields[1].option_list(), vec![FieldOption::new("a", "Apples")]);
    }

    #[test]
    fn test_parse_direct_fields() {
        let doc = parse_form(r#"{"title": "Quick", "fields": [{"name": "a", "type": "TEXT"}]}"#).unwrap();
        assert_eq!(doc.title, "Quick");
        assert_eq!(doc.fields[0].kind, FieldKind::Text);
        assert_eq!(doc.fields[0].label, "");
    }

    #[test]
    fn test_parse_deep_search() {
        let doc = parse_form(
            r#"{"meta": [1, 2], "wrapper": {"form_name": "Deep", "inner": [{"fields": []}]}}"#,
        )
        .unwrap();
        assert_eq!(doc.title, "Deep");
        assert!(doc.fields.is_empty());
    }

    #[test]
    fn test_default_title() {
        let doc = parse_form(r#"{"fields": []}"#).unwrap();
        assert_eq!(doc.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_options_key_fallback() {
        let doc = parse_form(r#"{"fields": [{"name": "s", "type": "select", "options": ["A", "B"]}]}"#).unwrap();
        assert_eq!(doc.fields[0].option_list().len(), 2);
    }

    #[test]
    fn test_missing_name_synthesized() {
        let doc = parse_form(r#"{"fields": [{"type": "text"}, {"type": "label", "label": "<p>x</p>"}]}"#).unwrap();
        assert_eq!(doc.fields[0].name, "field_1");
        assert_eq!(doc.fields[1].name, "");
    }

    #[test]
    fn test_input_errors() {
        assert!(matches!(parse_form("{"), Err(InputError::MalformedJson { .. })));
        assert!(matches!(parse_form(r#"{"form": {}}"#), Err(InputError::MissingFields)));
    }

    #[test]
    fn test_unreadable_entries_become_placeholders() {
        let doc = parse_form(
            r#"{"fields": [
                {"name": "a", "type": "text"},
                {"name": "b", "label": "Bee", "type": 5},
                "text",
                {"name": "c", "type": "text"}
            ]}"#,
        )
        .unwrap();
        let names: Vec<&str> = doc.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "field_3", "c"]);
        assert_eq!(doc.fields[0].kind, FieldKind::Text);
        assert_eq!(doc.fields[1].kind, FieldKind::Other("invalid".into()));
        assert_eq!(doc.fields[1].label, "Bee");
        assert_eq!(doc.fields[2].kind, FieldKind::Other("invalid".into()));
        assert_eq!(doc.fields[2].label, "text");
        assert_eq!(doc.fields[3].kind, FieldKind::Text);

        let err = read_field(&serde_json::json!({"type": 5}), 1).unwrap_err();
        assert!(matches!(err, InputError::InvalidField { index: 1, .. }));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn label() -> impl Strategy<Value = String> {
            "[A-Za-z0-9 ,.!?-]{1,30}"
        }

        proptest! {
            #[test]
            fn map_payload_normalizes(entries in prop::collection::vec(("[a-z]{1,6}", label()), 1..6)) {
                let map: Map<String, Value> = entries
                    .into_iter()
                    .map(|(k, v)| (format!("k_{}", k), Value::String(v)))
                    .collect();
                let options = OptionPayload::Map(map.clone()).normalize();
                prop_assert!(!options.is_empty());
                let keys: Vec<&String> = map.keys().collect();
                let got: Vec<&String> = options.iter().map(|o| &o.key).collect();
                prop_assert_eq!(got, keys);
            }

            #[test]
            fn string_list_normalizes(items in prop::collection::vec(label(), 1..6)) {
                let list = items.iter().cloned().map(Value::String).collect();
                let options = OptionPayload::List(list).normalize();
                prop_assert_eq!(options.len(), items.len());
            }

            #[test]
            fn object_list_normalizes(items in prop::collection::vec(("[a-z]{1,6}", label()), 1..6)) {
                let list = items
                    .iter()
                    .map(|(v, l)| serde_json::json!({"value": v, "label": l}))
                    .collect();
                let options = OptionPayload::List(list).normalize();
                prop_assert_eq!(options.len(), items.len());
            }

            #[test]
            fn single_string_normalizes(s in label()) {
                let options = OptionPayload::Single(Value::String(s.clone())).normalize();
                prop_assert_eq!(options.len(), 1);
                prop_assert_eq!(&options[0].label, &s);
            }
        }
    }
}
