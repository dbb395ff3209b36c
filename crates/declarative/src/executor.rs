//! Execution engine - applies a plan in order

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::compute_diffs;
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::Result;

/// Execute a plan with the given options and callbacks
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, verbose)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback, asked once before any change
///
/// Resources are applied strictly in plan order. A failing resource is
/// recorded in the summary and execution continues with the next one.
pub fn execute<P, C>(
    plan: &ExecutionPlan,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let diffs = compute_diffs(plan.iter())?;
    if diffs.is_empty() {
        log::debug!("All {} resources already converged", plan.len());
        return Ok(ExecuteSummary {
            no_change: plan.len(),
            ..Default::default()
        });
    }

    if opts.dry_run {
        return Ok(ExecuteSummary {
            skipped: diffs.len(),
            no_change: plan.len() - diffs.len(),
            ..Default::default()
        });
    }

    let prompt = format!(
        "Apply {} change{}?",
        diffs.len(),
        if diffs.len() == 1 { "" } else { "s" }
    );
    if !confirm.confirm(&prompt)? {
        return Ok(ExecuteSummary {
            skipped: diffs.len(),
            ..Default::default()
        });
    }

    let mut summary = ExecuteSummary::default();
    let mut ctx = ApplyContext::new(false, opts.verbose);

    progress.on_start(plan.len());
    for resource in plan.iter() {
        let id = resource.id();
        progress.on_resource_start(&id, &resource.description());
        let result = apply_resource(resource, &mut ctx);
        progress.on_resource_complete(&id, &result);
        summary.add_result(&id, &result);
    }
    progress.on_finish();

    Ok(summary)
}

/// Apply a single resource, turning an error into [`ApplyResult::Failed`]
fn apply_resource(resource: &dyn Resource, ctx: &mut ApplyContext) -> ApplyResult {
    match resource.apply(ctx) {
        Ok(result) => result,
        Err(e) => {
            log::error!("{} {}: {:#}", resource.resource_type(), resource.id(), e);
            ApplyResult::Failed {
                error: format!("{:#}", e),
            }
        }
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: &ExecutionPlan, opts: &ExecuteOptions) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &mut NoProgress, &mut AutoConfirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress};
    use crate::types::ResourceState;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct TestResource {
        id: String,
        should_change: bool,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl TestResource {
        fn boxed(id: &str, should_change: bool, fail: bool, log: &Arc<Mutex<Vec<String>>>) -> Box<Self> {
            Box::new(Self {
                id: id.to_string(),
                should_change,
                fail,
                log: Arc::clone(log),
            })
        }
    }

    impl Resource for TestResource {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn description(&self) -> String {
            format!("Test resource {}", self.id)
        }

        fn resource_type(&self) -> &'static str {
            "test"
        }

        fn current_state(&self) -> Result<ResourceState> {
            if self.should_change {
                Ok(ResourceState::Absent)
            } else {
                Ok(ResourceState::Present { details: None })
            }
        }

        fn desired_state(&self) -> ResourceState {
            ResourceState::Present { details: None }
        }

        fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
            if ctx.dry_run {
                return Ok(ApplyResult::Skipped {
                    reason: "Dry run".into(),
                });
            }
            self.log.lock().unwrap().push(self.id.clone());
            if self.fail {
                anyhow::bail!("remote command failed");
            }
            if self.should_change {
                Ok(ApplyResult::Created)
            } else {
                Ok(ApplyResult::NoChange)
            }
        }
    }

    fn log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_execute_empty_plan() {
        let plan = ExecutionPlan::new();
        let result = execute_simple(&plan, &ExecuteOptions::default()).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_execute_no_changes() {
        let applied = log();
        let mut plan = ExecutionPlan::new();
        plan.push(TestResource::boxed("test1", false, false, &applied));

        let result = execute_simple(&plan, &ExecuteOptions::default()).unwrap();

        // No diff means nothing is applied
        assert_eq!(result.no_change, 1);
        assert_eq!(result.total_changes(), 0);
        assert!(applied.lock().unwrap().is_empty());
    }

    #[test]
    fn test_execute_in_plan_order() {
        let applied = log();
        let mut plan = ExecutionPlan::new();
        plan.push(TestResource::boxed("first", true, false, &applied));
        plan.push(TestResource::boxed("second", false, false, &applied));
        plan.push(TestResource::boxed("third", true, false, &applied));

        let result = execute(&plan, &ExecuteOptions::default(), &mut NoProgress, &mut AutoConfirm).unwrap();

        assert_eq!(result.created, 2);
        assert_eq!(result.no_change, 1);
        assert_eq!(*applied.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_execute_continues_after_failure() {
        let applied = log();
        let mut plan = ExecutionPlan::new();
        plan.push(TestResource::boxed("broken", true, true, &applied));
        plan.push(TestResource::boxed("fine", true, false, &applied));

        let result = execute_simple(&plan, &ExecuteOptions::default()).unwrap();

        assert_eq!(result.failed, 1);
        assert_eq!(result.created, 1);
        assert_eq!(result.failures[0].0, "broken");
        assert!(result.failures[0].1.contains("remote command failed"));
    }

    #[test]
    fn test_execute_dry_run() {
        let applied = log();
        let mut plan = ExecutionPlan::new();
        plan.push(TestResource::boxed("a", true, false, &applied));
        plan.push(TestResource::boxed("b", false, false, &applied));

        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = execute_simple(&plan, &opts).unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.no_change, 1);
        assert!(applied.lock().unwrap().is_empty());
    }

    #[test]
    fn test_execute_declined() {
        let applied = log();
        let mut plan = ExecutionPlan::new();
        plan.push(TestResource::boxed("a", true, false, &applied));

        let result = execute(&plan, &ExecuteOptions::default(), &mut NoProgress, &mut AutoDecline).unwrap();

        assert_eq!(result.skipped, 1);
        assert!(applied.lock().unwrap().is_empty());
    }
}
