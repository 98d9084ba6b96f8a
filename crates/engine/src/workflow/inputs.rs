//! Collects input values for a dispatch event and checks them against the declarations.
//!
//! Values arrive either as a JSON object or as `--name value` style arguments.
//! The argument parser is generated from the declared inputs so `--help`-style
//! output and unknown-flag errors come straight from clap.

use clap::{Arg, ArgAction, Command};
use ghwf_types::{WorkflowInputType, WorkflowInputs};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Input values keyed by input name, ready to be sent in a dispatch event.
pub type ProvidedInputs = IndexMap<String, String>;

/// Problems with the values supplied for workflow inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("could not parse provided JSON: {0}")]
    InvalidJson(String),

    #[error("could not parse input args: {0}")]
    InvalidArgs(String),

    #[error("missing required input '{0}'")]
    MissingRequired(String),

    #[error("unexpected input '{0}'")]
    Unknown(String),

    #[error("input '{name}' must be one of [{}], got '{value}'", .options.join(", "))]
    InvalidChoice {
        name: String,
        value: String,
        options: Vec<String>,
    },

    #[error("input '{name}' must be 'true' or 'false', got '{value}'")]
    InvalidBoolean { name: String, value: String },

    #[error("input '{name}' must be a number, got '{value}'")]
    InvalidNumber { name: String, value: String },
}

/// Parse a JSON object of input values.
///
/// Numbers and booleans are accepted and sent as their JSON text.
pub fn inputs_from_json(json: &str) -> Result<ProvidedInputs, InputError> {
    let value: Value = serde_json::from_str(json).map_err(|error| InputError::InvalidJson(error.to_string()))?;
    let Value::Object(map) = value else {
        return Err(InputError::InvalidJson(
            "expected an object mapping input names to values".to_string(),
        ));
    };

    map.into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(text) => text,
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                other => {
                    return Err(InputError::InvalidJson(format!(
                        "value for '{name}' must be a string, number, or boolean, got {other}"
                    )));
                }
            };
            Ok((name, text))
        })
        .collect()
}

/// Build a flag parser with one `--<name> <value>` option per declared input.
pub fn build_input_command(declared: &WorkflowInputs) -> Command {
    let mut command = Command::new("inputs")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true);

    for (name, input) in declared {
        let mut arg = Arg::new(name.clone())
            .long(name.clone())
            .value_name("VALUE")
            .action(ArgAction::Set);
        if !input.description.is_empty() {
            arg = arg.help(input.description.clone());
        }
        if input.has_default() {
            arg = arg.default_value(input.default.clone());
        }
        command = command.arg(arg);
    }

    command
}

/// Parse `--name value` arguments into a value for every declared input.
///
/// Inputs that are not mentioned take their declared default. A required input
/// that ends up empty is an error.
pub fn inputs_from_args(args: &[String], declared: &WorkflowInputs) -> Result<ProvidedInputs, InputError> {
    let matches = build_input_command(declared)
        .try_get_matches_from(args)
        .map_err(|error| InputError::InvalidArgs(first_error_line(&error.to_string())))?;

    let mut provided = ProvidedInputs::new();
    for (name, input) in declared {
        let value = matches.get_one::<String>(name.as_str()).cloned().unwrap_or_default();
        if input.required && value.is_empty() {
            return Err(InputError::MissingRequired(name.clone()));
        }
        provided.insert(name.clone(), value);
    }

    Ok(provided)
}

/// Check provided values against the declared inputs.
///
/// - every provided name must be declared
/// - a required input must be non-empty when provided, and may only be omitted
///   when it declares a default (GitHub applies it server side)
/// - `choice`, `boolean` and `number` inputs must carry a value of that type
pub fn validate_inputs(provided: &ProvidedInputs, declared: &WorkflowInputs) -> Result<(), InputError> {
    if let Some(unknown) = provided.keys().find(|name| !declared.contains_key(*name)) {
        return Err(InputError::Unknown(unknown.clone()));
    }

    for (name, input) in declared {
        let value = match provided.get(name) {
            None if input.required && !input.has_default() => return Err(InputError::MissingRequired(name.clone())),
            None => continue,
            Some(value) if value.is_empty() => {
                if input.required {
                    return Err(InputError::MissingRequired(name.clone()));
                }
                continue;
            }
            Some(value) => value,
        };

        match input.kind() {
            WorkflowInputType::Choice if !input.options.is_empty() && !input.options.contains(value) => {
                return Err(InputError::InvalidChoice {
                    name: name.clone(),
                    value: value.clone(),
                    options: input.options.clone(),
                });
            }
            WorkflowInputType::Boolean if value != "true" && value != "false" => {
                return Err(InputError::InvalidBoolean {
                    name: name.clone(),
                    value: value.clone(),
                });
            }
            WorkflowInputType::Number if value.trim().parse::<f64>().is_err() => {
                return Err(InputError::InvalidNumber {
                    name: name.clone(),
                    value: value.clone(),
                });
            }
            _ => {}
        }
    }

    Ok(())
}

fn first_error_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or(rendered).trim();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}
