//! # Declarative
//!
//! A small framework for declarative resource management.
//!
//! ## Core Concepts
//!
//! - **Resource**: a setting with a detectable current state and a desired state
//! - **ResourceState**: the current or desired state of a resource
//! - **ExecutionPlan**: an ordered list of resources
//! - **Executor**: applies a plan in order, one resource at a time
//!
//! Order is part of the plan. A resource may depend on an earlier one (a
//! default locale needs the locale to be available first), so nothing is
//! reordered or run concurrently.
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ApplyContext, ApplyResult, ExecuteOptions, ExecutionPlan, Resource, ResourceState};
//!
//! #[derive(Debug)]
//! struct Hostname { want: String }
//!
//! impl Resource for Hostname {
//!     fn id(&self) -> String { "hostname".into() }
//!     fn description(&self) -> String { format!("Hostname {}", self.want) }
//!     fn resource_type(&self) -> &'static str { "hostname" }
//!     fn current_state(&self) -> anyhow::Result<ResourceState> { /* query */ }
//!     fn desired_state(&self) -> ResourceState {
//!         ResourceState::Present { details: Some(self.want.clone()) }
//!     }
//!     fn apply(&self, ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> { /* converge */ }
//! }
//!
//! let mut plan = ExecutionPlan::new();
//! plan.push(Box::new(Hostname { want: "web1".into() }));
//! let summary = declarative::execute_simple(&plan, &ExecuteOptions::default())?;
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: receives progress updates
//! - [`ConfirmCallback`]: handles user confirmation before changes
//!
//! Neither ties the crate to a UI framework.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{DiffSummary, ResourceDiff, compute_diffs};
pub use executor::{execute, execute_simple};
pub use planner::ExecutionPlan;
pub use resource::{BoxedResource, Resource};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary, ResourceState};
