//! Workflow models shared by the API client and the dispatch engine.
//!
//! Input declarations keep their authoring order (via `IndexMap`) so prompts
//! and generated flag help list inputs the way the workflow file declares them.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata declared for a single `workflow_dispatch` input.
///
/// `default`, `description` and `options` accept any YAML scalar and keep the
/// text as written, so `default: 1.0` stays `"1.0"` and `default: false`
/// becomes `"false"`. `required` also accepts the YAML 1.1 words (`yes`,
/// `off`, ...). Explicit nulls fall back to the field default, and a `type`
/// this crate does not know decodes as [`WorkflowInputType::Unknown`].
///
/// Text is only preserved by deserializers that hand out scalar source text
/// from `deserialize_str`, as the streaming YAML deserializer does.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowInput {
    /// Whether the dispatch event must carry a value for this input.
    #[serde(default, deserialize_with = "yaml_bool")]
    pub required: bool,
    /// Value used when the caller does not provide one.
    #[serde(default, deserialize_with = "scalar_text")]
    pub default: String,
    /// Human-readable description shown in prompts and flag help.
    #[serde(default, deserialize_with = "scalar_text")]
    pub description: String,
    /// Declared value type; absent means free-form text.
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient_input_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_type: Option<WorkflowInputType>,
    /// Allowed values for `choice` inputs.
    #[serde(default, deserialize_with = "scalar_text_list", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl WorkflowInput {
    /// The effective type of the input, treating an undeclared type as text.
    pub fn kind(&self) -> WorkflowInputType {
        self.input_type.unwrap_or_default()
    }

    /// Returns true when the declaration carries a non-empty default value.
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }
}

/// Value types GitHub Actions accepts for `workflow_dispatch` inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowInputType {
    #[default]
    String,
    Boolean,
    Choice,
    Number,
    Environment,
    /// A type this client does not know; validated and prompted as text.
    #[serde(other)]
    Unknown,
}

impl WorkflowInputType {
    fn from_label(label: &str) -> Self {
        match label {
            "string" => WorkflowInputType::String,
            "boolean" => WorkflowInputType::Boolean,
            "choice" => WorkflowInputType::Choice,
            "number" => WorkflowInputType::Number,
            "environment" => WorkflowInputType::Environment,
            _ => WorkflowInputType::Unknown,
        }
    }
}

impl fmt::Display for WorkflowInputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowInputType::String => "string",
            WorkflowInputType::Boolean => "boolean",
            WorkflowInputType::Choice => "choice",
            WorkflowInputType::Number => "number",
            WorkflowInputType::Environment => "environment",
            WorkflowInputType::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Declared inputs keyed by input name in declaration order.
pub type WorkflowInputs = IndexMap<String, WorkflowInput>;

/// A workflow registered in a repository, as listed by the Actions API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    /// Repository-relative path of the definition file.
    pub path: String,
    pub state: WorkflowState,
}

impl Workflow {
    /// File name of the workflow definition (`ci.yml` for `.github/workflows/ci.yml`).
    pub fn base(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Lifecycle state reported for a workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Active,
    Deleted,
    DisabledFork,
    DisabledInactivity,
    DisabledManually,
    /// A state this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowState::Active => "active",
            WorkflowState::Deleted => "deleted",
            WorkflowState::DisabledFork => "disabled_fork",
            WorkflowState::DisabledInactivity => "disabled_inactivity",
            WorkflowState::DisabledManually => "disabled_manually",
            WorkflowState::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One page of the workflow listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowList {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

/// Body of a `workflow_dispatch` event creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Branch or tag holding the version of the workflow file to run.
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub inputs: IndexMap<String, String>,
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ScalarText>::deserialize(deserializer)?
        .map(|text| text.0)
        .unwrap_or_default())
}

fn scalar_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ScalarText>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|text| text.0)
        .collect())
}

fn yaml_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(YamlBoolVisitor)
}

fn lenient_input_type<'de, D>(deserializer: D) -> Result<Option<WorkflowInputType>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(InputTypeVisitor)
}

/// A scalar read through `deserialize_str`, keeping its source text.
struct ScalarText(String);

impl<'de> Deserialize<'de> for ScalarText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ScalarTextVisitor).map(ScalarText)
    }
}

struct ScalarTextVisitor;

impl<'de> Visitor<'de> for ScalarTextVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, number, boolean, or null")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
        Ok(value.to_owned())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
        Ok(value)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
        Ok(value.to_string())
    }
}

struct YamlBoolVisitor;

impl<'de> Visitor<'de> for YamlBoolVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
        Ok(value)
    }

    // YAML 1.1 spellings.
    fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
        match value {
            "y" | "Y" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" | "true" | "True" | "TRUE" => Ok(true),
            "n" | "N" | "no" | "No" | "NO" | "off" | "Off" | "OFF" | "false" | "False" | "FALSE" => Ok(false),
            _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }
}

struct InputTypeVisitor;

impl<'de> Visitor<'de> for InputTypeVisitor {
    type Value = Option<WorkflowInputType>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an input type")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Some(WorkflowInputType::from_label(value)))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
        Ok(Some(WorkflowInputType::Unknown))
    }

    fn visit_i64<E: de::Error>(self, _value: i64) -> Result<Self::Value, E> {
        Ok(Some(WorkflowInputType::Unknown))
    }

    fn visit_u64<E: de::Error>(self, _value: u64) -> Result<Self::Value, E> {
        Ok(Some(WorkflowInputType::Unknown))
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<Self::Value, E> {
        Ok(Some(WorkflowInputType::Unknown))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Some(WorkflowInputType::Unknown))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Some(WorkflowInputType::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_defaults_keep_their_text() {
        let yaml = "required: true\ndefault: false\ndescription: 42\ntype: boolean\n";
        let input: WorkflowInput = serde_yaml::from_str(yaml).expect("decode input");

        assert!(input.required);
        assert_eq!(input.default, "false");
        assert_eq!(input.description, "42");
        assert_eq!(input.kind(), WorkflowInputType::Boolean);
    }

    #[test]
    fn number_defaults_keep_their_written_form() {
        for (written, expected) in [("1.0", "1.0"), ("0x1F", "0x1F"), ("007", "007"), ("1e3", "1e3"), ("'2.50'", "2.50")] {
            let yaml = format!("default: {written}\n");
            let input: WorkflowInput = serde_yaml::from_str(&yaml).expect("decode input");
            assert_eq!(input.default, expected, "{written}");
        }
    }

    #[test]
    fn options_accept_any_scalar() {
        let yaml = "type: choice\noptions: [1, 2.50, true, three]\ndefault: 2.50\n";
        let input: WorkflowInput = serde_yaml::from_str(yaml).expect("decode input");

        assert_eq!(input.options, ["1", "2.50", "true", "three"]);
        assert!(input.options.contains(&input.default));
    }

    #[test]
    fn unknown_types_are_tolerated() {
        for yaml in ["type: text\n", "type: 3\n", "type: [a]\n", "type: {a: b}\n"] {
            let input: WorkflowInput = serde_yaml::from_str(yaml).unwrap_or_else(|error| panic!("{yaml}: {error}"));
            assert_eq!(input.kind(), WorkflowInputType::Unknown, "{yaml}");
        }
        let untyped: WorkflowInput = serde_yaml::from_str("type: ~\n").expect("decode input");
        assert_eq!(untyped.kind(), WorkflowInputType::String);
    }

    #[test]
    fn required_accepts_yaml_1_1_booleans() {
        for (written, expected) in [("yes", true), ("Y", true), ("On", true), ("no", false), ("OFF", false), ("n", false)] {
            let yaml = format!("required: {written}\n");
            let input: WorkflowInput = serde_yaml::from_str(&yaml).expect("decode input");
            assert_eq!(input.required, expected, "{written}");
        }

        let error = serde_yaml::from_str::<WorkflowInput>("required: maybe\n").expect_err("maybe is not a boolean");
        assert!(error.to_string().contains("expected a boolean"), "{error}");
    }

    #[test]
    fn nulls_fall_back_to_defaults() {
        let yaml = "required: ~\ndefault: ~\ndescription:\noptions: ~\n";
        let input: WorkflowInput = serde_yaml::from_str(yaml).expect("decode input");

        assert_eq!(input, WorkflowInput::default());
        assert_eq!(input.kind(), WorkflowInputType::String);
        assert!(!input.has_default());
    }

    #[test]
    fn mapping_default_is_rejected() {
        let yaml = "default:\n  nested: value\n";
        let error = serde_yaml::from_str::<WorkflowInput>(yaml).expect_err("mapping default must fail");
        assert!(error.to_string().contains("a string, number, boolean, or null"), "{error}");
    }

    #[test]
    fn workflow_state_tolerates_unknown_values() {
        let workflow: Workflow = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "CI",
            "path": ".github/workflows/ci.yml",
            "state": "paused_for_review"
        }))
        .expect("decode workflow");

        assert_eq!(workflow.state, WorkflowState::Unknown);
        assert_eq!(workflow.base(), "ci.yml");
    }

    #[test]
    fn dispatch_request_serializes_ref_key() {
        let mut inputs = IndexMap::new();
        inputs.insert("name".to_string(), "mona".to_string());
        let request = DispatchRequest {
            git_ref: "main".into(),
            inputs,
        };

        let json = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(json, serde_json::json!({ "ref": "main", "inputs": { "name": "mona" } }));
    }
}
