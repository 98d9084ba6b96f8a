use ghwf_engine::workflow::{inputs_from_args, validate_inputs};
use ghwf_engine::{WorkflowDocumentError, find_inputs};
use ghwf_types::WorkflowInputType;

fn release() -> &'static [u8] {
    include_bytes!("data/release.yml")
}

#[test]
fn extracts_inputs_from_a_realistic_workflow() {
    let inputs = find_inputs(release()).expect("release workflow inputs");

    let names: Vec<_> = inputs.keys().map(String::as_str).collect();
    assert_eq!(names, ["version", "channel", "draft", "retries", "notes"]);

    let version = &inputs["version"];
    assert!(version.required);
    assert_eq!(version.description, "Version to publish");
    assert_eq!(version.kind(), WorkflowInputType::String);

    let channel = &inputs["channel"];
    assert_eq!(channel.kind(), WorkflowInputType::Choice);
    assert_eq!(channel.options, ["stable", "beta"]);
    assert_eq!(channel.default, "stable");

    assert_eq!(inputs["draft"].default, "false");
    assert_eq!(inputs["retries"].default, "3");
    assert!(!inputs["notes"].required);
    assert!(inputs["notes"].default.is_empty());
}

#[test]
fn push_only_workflow_cannot_be_dispatched() {
    let error = find_inputs(include_bytes!("data/ci.yml")).expect_err("ci has no workflow_dispatch");
    assert!(matches!(error, WorkflowDocumentError::NotManuallyRunnable), "{error:?}");
}

#[test]
fn extracted_inputs_drive_arg_parsing_and_validation() {
    let declared = find_inputs(release()).expect("release workflow inputs");
    let args: Vec<String> = ["--version", "1.2.0", "--channel=beta"].iter().map(|arg| arg.to_string()).collect();

    let provided = inputs_from_args(&args, &declared).expect("parse input args");
    assert_eq!(provided["version"], "1.2.0");
    assert_eq!(provided["channel"], "beta");
    assert_eq!(provided["draft"], "false");
    assert_eq!(provided["retries"], "3");
    validate_inputs(&provided, &declared).expect("valid inputs");

    let bad: Vec<String> = ["--version", "1.2.0", "--channel", "nightly"].iter().map(|arg| arg.to_string()).collect();
    let provided = inputs_from_args(&bad, &declared).expect("parse input args");
    let error = validate_inputs(&provided, &declared).expect_err("nightly is not an option");
    assert_eq!(error.to_string(), "input 'channel' must be one of [stable, beta], got 'nightly'");
}
