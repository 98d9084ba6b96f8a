//! Dispatch orchestration: resolve a workflow, collect its inputs, create the event.
//!
//! Every remote call goes through [`WorkflowsApi`] and every question to the user
//! through [`Prompter`], so the whole flow runs against fakes in tests.

use anyhow::{Context, Result, anyhow, bail};
use ghwf_api::WorkflowsApi;
use ghwf_types::{DispatchRequest, RepoRef, Workflow, WorkflowInput, WorkflowInputType, WorkflowInputs};
use tracing::{debug, info};

use crate::workflow::{
    DISPATCHABLE_STATES, ProvidedInputs, SelectionError, ensure_runnable, filter_by_state, find_inputs, inputs_from_args,
    inputs_from_json, match_selector, select_workflow, validate_inputs, workflow_id,
};

/// Asks the user to choose or type values.
pub trait Prompter {
    /// Index of the chosen item.
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Free text answer, pre-filled with `default`.
    fn input(&self, prompt: &str, default: &str, allow_empty: bool) -> Result<String>;
}

/// Where input values come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputSource {
    /// Ask for each declared input.
    Prompt,
    /// A JSON object of values.
    Json(String),
    /// `--name value` arguments.
    Args(Vec<String>),
    /// Nothing provided; declared defaults apply server side.
    #[default]
    None,
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub repo: RepoRef,
    /// Workflow ID, name, file name, or path. `None` picks interactively.
    pub selector: Option<String>,
    /// Branch or tag; the default branch when unset.
    pub git_ref: Option<String>,
    pub inputs: InputSource,
    /// Whether ambiguous selections may be resolved by asking.
    pub interactive: bool,
    /// Build the request without sending it.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub workflow: Workflow,
    pub request: DispatchRequest,
    /// False for a dry run.
    pub dispatched: bool,
}

/// Run the full dispatch flow for one workflow.
pub async fn run_dispatch<A, P>(api: &A, prompter: &P, options: DispatchOptions) -> Result<DispatchOutcome>
where
    A: WorkflowsApi + ?Sized,
    P: Prompter + ?Sized,
{
    let repo = &options.repo;
    let workflow = resolve_workflow(api, prompter, &options).await?;
    debug!(repo = %repo, workflow_id = workflow.id, path = %workflow.path, "resolved workflow");

    let git_ref = match options.git_ref.as_deref().filter(|git_ref| !git_ref.is_empty()) {
        Some(git_ref) => git_ref.to_string(),
        None => api
            .default_branch(repo)
            .await
            .with_context(|| format!("unable to determine default branch for {}", repo.full_name()))?,
    };

    let content = api
        .workflow_content(repo, &workflow.path, &git_ref)
        .await
        .context("unable to fetch workflow file content")?;
    let declared = find_inputs(&content)?;
    debug!(count = declared.len(), "found workflow_dispatch inputs");

    let provided = match &options.inputs {
        InputSource::Prompt => prompt_inputs(prompter, &declared)?,
        InputSource::Json(json) => inputs_from_json(json)?,
        InputSource::Args(args) if !args.is_empty() => inputs_from_args(args, &declared)?,
        InputSource::Args(_) | InputSource::None => ProvidedInputs::new(),
    };
    validate_inputs(&provided, &declared)?;

    let request = DispatchRequest { git_ref, inputs: provided };
    if options.dry_run {
        return Ok(DispatchOutcome {
            workflow,
            request,
            dispatched: false,
        });
    }

    api.create_dispatch(repo, workflow.id, &request)
        .await
        .context("could not create workflow dispatch event")?;
    info!(repo = %repo, workflow = %workflow.name, git_ref = %request.git_ref, "created workflow_dispatch event");

    Ok(DispatchOutcome {
        workflow,
        request,
        dispatched: true,
    })
}

async fn resolve_workflow<A, P>(api: &A, prompter: &P, options: &DispatchOptions) -> Result<Workflow>
where
    A: WorkflowsApi + ?Sized,
    P: Prompter + ?Sized,
{
    let repo = &options.repo;
    let Some(selector) = options.selector.as_deref() else {
        if !options.interactive {
            bail!("workflow ID or name required when not running interactively");
        }
        let workflows = list_dispatchable(api, repo).await?;
        if workflows.is_empty() {
            return Err(SelectionError::NoneEnabled.into());
        }
        let candidates: Vec<&Workflow> = workflows.iter().collect();
        return choose_workflow(prompter, "Select a workflow", &candidates);
    };

    if let Some(id) = workflow_id(selector)
        && let Some(workflow) = api.get_workflow(repo, id).await?
    {
        ensure_runnable(&workflow, DISPATCHABLE_STATES)?;
        return Ok(workflow);
    }

    let workflows = list_dispatchable(api, repo).await?;
    match select_workflow(&workflows, selector) {
        Err(SelectionError::Ambiguous { .. }) if options.interactive => {
            let candidates = match_selector(&workflows, selector);
            choose_workflow(prompter, "Which workflow do you mean?", &candidates)
        }
        resolved => Ok(resolved?),
    }
}

async fn list_dispatchable<A>(api: &A, repo: &RepoRef) -> Result<Vec<Workflow>>
where
    A: WorkflowsApi + ?Sized,
{
    let workflows = api
        .list_workflows(repo)
        .await
        .with_context(|| format!("could not fetch workflows for {}", repo.full_name()))?;
    Ok(filter_by_state(workflows, DISPATCHABLE_STATES)?)
}

fn choose_workflow<P>(prompter: &P, prompt: &str, candidates: &[&Workflow]) -> Result<Workflow>
where
    P: Prompter + ?Sized,
{
    let items: Vec<String> = candidates
        .iter()
        .map(|workflow| format!("{} ({})", workflow.name, workflow.base()))
        .collect();
    let index = prompter.select(prompt, &items, 0)?;
    candidates
        .get(index)
        .map(|workflow| (*workflow).clone())
        .ok_or_else(|| anyhow!("selection {index} is out of range"))
}

/// Ask for every declared input in declaration order.
fn prompt_inputs<P>(prompter: &P, declared: &WorkflowInputs) -> Result<ProvidedInputs>
where
    P: Prompter + ?Sized,
{
    let mut provided = ProvidedInputs::new();
    for (name, input) in declared {
        let label = prompt_label(name, input);
        let value = match input.kind() {
            WorkflowInputType::Choice if !input.options.is_empty() => {
                let default = input.options.iter().position(|option| *option == input.default).unwrap_or(0);
                let index = prompter.select(&label, &input.options, default)?;
                input
                    .options
                    .get(index)
                    .cloned()
                    .ok_or_else(|| anyhow!("selection {index} is out of range"))?
            }
            WorkflowInputType::Boolean => {
                let items = vec!["true".to_string(), "false".to_string()];
                let default = usize::from(input.default != "true");
                items[prompter.select(&label, &items, default)?.min(1)].clone()
            }
            _ => loop {
                let answer = prompter.input(&label, &input.default, !input.required)?;
                if !input.required || !answer.is_empty() {
                    break answer;
                }
            },
        };
        provided.insert(name.clone(), value);
    }
    Ok(provided)
}

fn prompt_label(name: &str, input: &WorkflowInput) -> String {
    let mut label = name.to_string();
    if input.required {
        label.push_str(" (required)");
    }
    if !input.description.is_empty() {
        label.push_str(": ");
        label.push_str(&input.description);
    }
    label
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ghwf_api::ApiError;
    use ghwf_types::WorkflowState;

    use super::*;

    const HELLO_WORKFLOW: &str = r#"
name: Hello
on:
  workflow_dispatch:
    inputs:
      name:
        required: true
        description: who to greet
      greeting:
        default: hello
      level:
        type: choice
        options: [info, debug]
        default: debug
"#;

    struct FakeApi {
        workflows: Vec<Workflow>,
        content: String,
        dispatched: Mutex<Vec<(u64, DispatchRequest)>>,
    }

    impl FakeApi {
        fn new(content: &str) -> Self {
            Self {
                workflows: vec![
                    workflow(1, "Hello", "hello.yml", WorkflowState::Active),
                    workflow(2, "Deploy", "deploy-a.yml", WorkflowState::Active),
                    workflow(3, "Deploy", "deploy-b.yml", WorkflowState::Active),
                    workflow(4, "Old", "old.yml", WorkflowState::DisabledManually),
                ],
                content: content.to_string(),
                dispatched: Mutex::new(Vec::new()),
            }
        }

        fn dispatched(&self) -> Vec<(u64, DispatchRequest)> {
            self.dispatched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WorkflowsApi for FakeApi {
        async fn list_workflows(&self, _repo: &RepoRef) -> Result<Vec<Workflow>, ApiError> {
            Ok(self.workflows.clone())
        }

        async fn get_workflow(&self, _repo: &RepoRef, workflow_id: u64) -> Result<Option<Workflow>, ApiError> {
            Ok(self.workflows.iter().find(|workflow| workflow.id == workflow_id).cloned())
        }

        async fn default_branch(&self, _repo: &RepoRef) -> Result<String, ApiError> {
            Ok("trunk".into())
        }

        async fn workflow_content(&self, _repo: &RepoRef, path: &str, _git_ref: &str) -> Result<Vec<u8>, ApiError> {
            if path.ends_with("hello.yml") || path.starts_with(".github/workflows/deploy") {
                Ok(self.content.as_bytes().to_vec())
            } else {
                Err(ApiError::status(404, r#"{"message":"Not Found"}"#))
            }
        }

        async fn create_dispatch(&self, _repo: &RepoRef, workflow_id: u64, request: &DispatchRequest) -> Result<(), ApiError> {
            self.dispatched.lock().unwrap().push((workflow_id, request.clone()));
            Ok(())
        }
    }

    /// Replays canned answers; running out is an error.
    #[derive(Default)]
    struct ScriptedPrompter {
        selections: RefCell<VecDeque<usize>>,
        answers: RefCell<VecDeque<String>>,
        prompts: RefCell<Vec<String>>,
        select_defaults: RefCell<Vec<usize>>,
    }

    impl ScriptedPrompter {
        fn with(selections: &[usize], answers: &[&str]) -> Self {
            Self {
                selections: RefCell::new(selections.iter().copied().collect()),
                answers: RefCell::new(answers.iter().map(|answer| answer.to_string()).collect()),
                prompts: RefCell::default(),
                select_defaults: RefCell::default(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn select(&self, prompt: &str, _items: &[String], default: usize) -> Result<usize> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.select_defaults.borrow_mut().push(default);
            self.selections
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow!("unexpected selection prompt: {prompt}"))
        }

        fn input(&self, prompt: &str, _default: &str, _allow_empty: bool) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.answers
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow!("unexpected input prompt: {prompt}"))
        }
    }

    fn workflow(id: u64, name: &str, file: &str, state: WorkflowState) -> Workflow {
        Workflow {
            id,
            name: name.into(),
            path: format!(".github/workflows/{file}"),
            state,
        }
    }

    fn options(selector: Option<&str>, inputs: InputSource) -> DispatchOptions {
        DispatchOptions {
            repo: RepoRef::new("github.com", "octo", "app"),
            selector: selector.map(str::to_string),
            git_ref: None,
            inputs,
            interactive: false,
            dry_run: false,
        }
    }

    fn args(values: &[&str]) -> InputSource {
        InputSource::Args(values.iter().map(|value| value.to_string()).collect())
    }

    #[tokio::test]
    async fn dispatches_with_input_args_on_default_branch() {
        let api = FakeApi::new(HELLO_WORKFLOW);
        let outcome = run_dispatch(&api, &ScriptedPrompter::default(), options(Some("hello"), args(&["--name", "mona"])))
            .await
            .unwrap();

        assert!(outcome.dispatched);
        assert_eq!(outcome.workflow.id, 1);
        assert_eq!(outcome.request.git_ref, "trunk");
        assert_eq!(outcome.request.inputs["name"], "mona");
        assert_eq!(outcome.request.inputs["greeting"], "hello");
        assert_eq!(outcome.request.inputs["level"], "debug");
        assert_eq!(api.dispatched(), vec![(1, outcome.request)]);
    }

    #[tokio::test]
    async fn dry_run_does_not_dispatch() {
        let api = FakeApi::new(HELLO_WORKFLOW);
        let mut opts = options(Some("1"), InputSource::Json(r#"{"name":"mona"}"#.into()));
        opts.dry_run = true;
        opts.git_ref = Some("feature".into());

        let outcome = run_dispatch(&api, &ScriptedPrompter::default(), opts).await.unwrap();

        assert!(!outcome.dispatched);
        assert_eq!(outcome.request.git_ref, "feature");
        assert_eq!(outcome.request.inputs.len(), 1);
        assert!(api.dispatched().is_empty());
    }

    #[tokio::test]
    async fn missing_required_input_stops_before_dispatch() {
        let api = FakeApi::new(HELLO_WORKFLOW);
        let error = run_dispatch(&api, &ScriptedPrompter::default(), options(Some("hello.yml"), InputSource::None))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "missing required input 'name'");
        assert!(api.dispatched().is_empty());
    }

    #[tokio::test]
    async fn workflow_without_dispatch_trigger_is_rejected() {
        let api = FakeApi::new("on: push\n");
        let error = run_dispatch(&api, &ScriptedPrompter::default(), options(Some("hello"), InputSource::None))
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "unable to manually run a workflow without a workflow_dispatch event"
        );
    }

    #[tokio::test]
    async fn content_errors_carry_context() {
        let mut api = FakeApi::new(HELLO_WORKFLOW);
        api.workflows[0].path = ".github/workflows/missing.yml".into();
        let error = run_dispatch(&api, &ScriptedPrompter::default(), options(Some("Hello"), InputSource::None))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "unable to fetch workflow file content");
    }

    #[tokio::test]
    async fn disabled_workflows_are_not_selectable() {
        let api = FakeApi::new(HELLO_WORKFLOW);
        let by_name = run_dispatch(&api, &ScriptedPrompter::default(), options(Some("old"), InputSource::None))
            .await
            .unwrap_err();
        assert_eq!(by_name.to_string(), "could not find any workflows named old");

        let by_id = run_dispatch(&api, &ScriptedPrompter::default(), options(Some("4"), InputSource::None))
            .await
            .unwrap_err();
        assert!(by_id.to_string().contains("disabled_manually"), "{by_id}");
    }

    #[tokio::test]
    async fn everything_disabled_is_reported() {
        let mut api = FakeApi::new(HELLO_WORKFLOW);
        api.workflows.retain(|workflow| workflow.state != WorkflowState::Active);
        let error = run_dispatch(&api, &ScriptedPrompter::default(), options(Some("hello"), InputSource::None))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "no workflows are enabled on this repository");
    }

    #[tokio::test]
    async fn ambiguous_selector_fails_without_a_terminal() {
        let api = FakeApi::new("on: workflow_dispatch\n");
        let error = run_dispatch(&api, &ScriptedPrompter::default(), options(Some("deploy"), InputSource::None))
            .await
            .unwrap_err();
        assert!(error.to_string().starts_with("could not resolve to a unique workflow"), "{error}");
    }

    #[tokio::test]
    async fn ambiguous_selector_is_resolved_by_prompt() {
        let api = FakeApi::new("on: workflow_dispatch\n");
        let mut opts = options(Some("deploy"), InputSource::None);
        opts.interactive = true;

        let outcome = run_dispatch(&api, &ScriptedPrompter::with(&[1], &[]), opts).await.unwrap();
        assert_eq!(outcome.workflow.id, 3);
        assert!(outcome.request.inputs.is_empty());
    }

    #[tokio::test]
    async fn interactive_run_prompts_for_workflow_and_inputs() {
        let api = FakeApi::new(HELLO_WORKFLOW);
        let prompter = ScriptedPrompter::with(&[0, 0], &["", "mona", "hi"]);
        let mut opts = options(None, InputSource::Prompt);
        opts.interactive = true;

        let outcome = run_dispatch(&api, &prompter, opts).await.unwrap();

        assert_eq!(outcome.workflow.id, 1);
        assert_eq!(outcome.request.inputs["name"], "mona");
        assert_eq!(outcome.request.inputs["greeting"], "hi");
        assert_eq!(outcome.request.inputs["level"], "info");
        assert_eq!(
            *prompter.prompts.borrow(),
            [
                "Select a workflow",
                "name (required): who to greet",
                "name (required): who to greet",
                "greeting",
                "level",
            ]
        );
    }

    #[tokio::test]
    async fn boolean_prompts_preselect_false_unless_default_is_true() {
        let content = r#"
on:
  workflow_dispatch:
    inputs:
      unset:
        type: boolean
      enabled:
        type: boolean
        default: true
      disabled:
        type: boolean
        default: false
"#;
        let api = FakeApi::new(content);
        let prompter = ScriptedPrompter::with(&[1, 0, 1], &[]);

        let outcome = run_dispatch(&api, &prompter, options(Some("hello"), InputSource::Prompt))
            .await
            .unwrap();

        assert_eq!(*prompter.select_defaults.borrow(), [1, 0, 1]);
        assert_eq!(outcome.request.inputs["unset"], "false");
        assert_eq!(outcome.request.inputs["enabled"], "true");
        assert_eq!(outcome.request.inputs["disabled"], "false");
    }

    #[tokio::test]
    async fn missing_selector_requires_a_terminal() {
        let api = FakeApi::new(HELLO_WORKFLOW);
        let error = run_dispatch(&api, &ScriptedPrompter::default(), options(None, InputSource::None))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "workflow ID or name required when not running interactively");
    }
}
