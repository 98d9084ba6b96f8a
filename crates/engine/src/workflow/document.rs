//! Locates the `workflow_dispatch` inputs declared by a workflow file.
//!
//! The file is read twice. The first pass decodes the root into a
//! [`WorkflowDocument`] to classify it: malformed, missing `on`, or not
//! manually runnable. When `workflow_dispatch` carries a mapping, a second
//! pass decodes `on.workflow_dispatch.inputs` straight from the YAML event
//! stream, so scalars such as `default: 1.0` keep their written text instead
//! of being re-rendered from a parsed number.
//!
//! The `on` key matches case-insensitively and the first match wins.
//! `workflow_dispatch` and `inputs` match exactly.

use std::fmt;

use ghwf_types::{WorkflowInput, WorkflowInputs};
use indexmap::IndexMap;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

const TRIGGERS_KEY: &str = "on";
const DISPATCH_EVENT: &str = "workflow_dispatch";
const INPUTS_KEY: &str = "inputs";

/// Reasons a workflow file cannot yield dispatch inputs.
///
/// `Parse`, `InvalidDocument` and `DecodeInputs` describe malformed files;
/// `MissingTriggers` and `NotManuallyRunnable` describe well-formed files that
/// cannot be dispatched by hand.
#[derive(Debug, Error)]
pub enum WorkflowDocumentError {
    #[error("unable to parse workflow YAML: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("invalid workflow file: expected a single YAML document with a top-level mapping")]
    InvalidDocument,

    #[error("invalid workflow: no 'on' key")]
    MissingTriggers,

    #[error("unable to manually run a workflow without a workflow_dispatch event")]
    NotManuallyRunnable,

    #[error("could not decode workflow inputs: {0}")]
    DecodeInputs(#[source] serde_yaml::Error),
}

/// The parts of a workflow file needed to dispatch it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowDocument {
    /// Value of the first top-level key spelled `on` in any letter case.
    pub triggers: Option<WorkflowTriggers>,
}

/// The value of `on`.
///
/// GitHub accepts an event name (`on: workflow_dispatch`), a list of event
/// names (`on: [push, workflow_dispatch]`), or a mapping from event name to
/// configuration. The string and list forms are dispatchable when they name
/// `workflow_dispatch`, and they declare no inputs. Any other value is
/// kept as [`WorkflowTriggers::Other`] and names no event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WorkflowTriggers {
    /// `on: push`
    Event(String),
    /// `on: [push, workflow_dispatch]`
    Events(Vec<Value>),
    /// `on: { push: ..., workflow_dispatch: ... }`
    Configured(Mapping),
    /// Null or a scalar that names no event.
    Other(Value),
}

impl WorkflowTriggers {
    /// Configuration attached to `workflow_dispatch`, if the event is declared.
    ///
    /// `on: workflow_dispatch` and a list naming `workflow_dispatch` carry no
    /// configuration and yield `Value::Null`, the same as
    /// `workflow_dispatch:` with an empty body.
    pub fn dispatch_config(&self) -> Option<Value> {
        match self {
            WorkflowTriggers::Event(event) => (event == DISPATCH_EVENT).then_some(Value::Null),
            WorkflowTriggers::Events(events) => events
                .iter()
                .any(|event| event.as_str() == Some(DISPATCH_EVENT))
                .then_some(Value::Null),
            WorkflowTriggers::Configured(events) => events.get(DISPATCH_EVENT).cloned(),
            WorkflowTriggers::Other(_) => None,
        }
    }
}

impl WorkflowDocument {
    /// Parse raw workflow file bytes.
    ///
    /// The input must hold exactly one YAML document whose root is a mapping.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WorkflowDocumentError> {
        let mut documents = serde_yaml::Deserializer::from_slice(bytes);
        let document = documents.next().ok_or(WorkflowDocumentError::InvalidDocument)?;

        // An empty stream still yields one document, which decodes as null.
        let root = Value::deserialize(document).map_err(WorkflowDocumentError::Parse)?;
        if documents.next().is_some() || !root.is_mapping() {
            return Err(WorkflowDocumentError::InvalidDocument);
        }

        WorkflowDocument::deserialize(root).map_err(WorkflowDocumentError::Parse)
    }

    /// Whether the document can be dispatched and has a `workflow_dispatch`
    /// mapping that may declare inputs.
    ///
    /// `workflow_dispatch:` with no body, or a scalar body, declares no inputs.
    pub fn has_dispatch_config(&self) -> Result<bool, WorkflowDocumentError> {
        let triggers = self
            .triggers
            .as_ref()
            .ok_or(WorkflowDocumentError::MissingTriggers)?;
        let config = triggers
            .dispatch_config()
            .ok_or(WorkflowDocumentError::NotManuallyRunnable)?;
        Ok(config.is_mapping())
    }
}

/// Extract the inputs declared under `on.workflow_dispatch.inputs`.
///
/// A dispatchable workflow without `inputs` yields an empty map.
pub fn find_inputs(yaml: &[u8]) -> Result<WorkflowInputs, WorkflowDocumentError> {
    if !WorkflowDocument::from_slice(yaml)?.has_dispatch_config()? {
        return Ok(WorkflowInputs::new());
    }

    let declared: DeclaredInputs = serde_yaml::from_slice(yaml).map_err(WorkflowDocumentError::DecodeInputs)?;
    Ok(declared.into_inputs())
}

impl<'de> Deserialize<'de> for WorkflowDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(WorkflowDocumentVisitor)
    }
}

struct WorkflowDocumentVisitor;

impl<'de> Visitor<'de> for WorkflowDocumentVisitor {
    type Value = WorkflowDocument;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a workflow mapping")
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let triggers = first_entry(map, is_triggers_key)?;
        Ok(WorkflowDocument { triggers })
    }
}

fn is_triggers_key(key: &str) -> bool {
    key.eq_ignore_ascii_case(TRIGGERS_KEY)
}

/// Decode the value of the first key accepted by `matches`, skipping the rest.
fn first_entry<'de, A, T>(mut map: A, matches: fn(&str) -> bool) -> Result<Option<T>, A::Error>
where
    A: MapAccess<'de>,
    T: Deserialize<'de>,
{
    let mut found = None;
    while let Some(key) = map.next_key::<Value>()? {
        if found.is_none() && key.as_str().is_some_and(matches) {
            found = Some(map.next_value::<T>()?);
        } else {
            map.next_value::<IgnoredAny>()?;
        }
    }
    Ok(found)
}

/// Second-pass view of a workflow file: only `on.workflow_dispatch.inputs`.
///
/// Only used once the first pass found a `workflow_dispatch` mapping.
#[derive(Debug, Default)]
struct DeclaredInputs(Option<IndexMap<String, Option<WorkflowInput>>>);

impl DeclaredInputs {
    fn into_inputs(self) -> WorkflowInputs {
        self.0
            .unwrap_or_default()
            .into_iter()
            .map(|(name, input)| (name, input.unwrap_or_default()))
            .collect()
    }
}

/// Which level of the `on.workflow_dispatch.inputs` path a visitor is at.
#[derive(Clone, Copy)]
enum InputsPath {
    Root,
    Triggers,
    Dispatch,
}

struct InputsPathVisitor(InputsPath);

impl<'de> Deserialize<'de> for DeclaredInputs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(InputsPathVisitor(InputsPath::Root))
    }
}

struct TriggersInputs(DeclaredInputs);

impl<'de> Deserialize<'de> for TriggersInputs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(InputsPathVisitor(InputsPath::Triggers)).map(TriggersInputs)
    }
}

struct DispatchInputs(DeclaredInputs);

impl<'de> Deserialize<'de> for DispatchInputs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(InputsPathVisitor(InputsPath::Dispatch)).map(DispatchInputs)
    }
}

impl<'de> Visitor<'de> for InputsPathVisitor {
    type Value = DeclaredInputs;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            InputsPath::Root => formatter.write_str("a workflow mapping"),
            InputsPath::Triggers => formatter.write_str("an 'on' mapping"),
            InputsPath::Dispatch => formatter.write_str("a workflow_dispatch mapping"),
        }
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let declared = match self.0 {
            InputsPath::Root => first_entry::<_, TriggersInputs>(map, is_triggers_key)?.map(|found| found.0),
            InputsPath::Triggers => {
                first_entry::<_, DispatchInputs>(map, |key| key == DISPATCH_EVENT)?.map(|found| found.0)
            }
            InputsPath::Dispatch => first_entry(map, |key| key == INPUTS_KEY)?.map(DeclaredInputs),
        };
        Ok(declared.unwrap_or_default())
    }
}
