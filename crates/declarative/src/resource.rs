//! Resource trait for declarative state management
//!
//! A Resource represents a setting that is in some state and can be
//! converged to a desired state.

use crate::context::ApplyContext;
use crate::types::{ApplyResult, ResourceState};
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// Every resource provides:
/// - Identity (id, description, type)
/// - State detection (current vs desired)
/// - State convergence (apply)
pub trait Resource: Send + Sync + fmt::Debug {
    /// Unique identifier for this resource within its type. Examples:
    /// - "net.ipv4.ip_forward" for a kernel parameter
    /// - "en_US.UTF-8" for a locale
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category, used for grouping and filtering
    /// (e.g. "sysctl", "hostname", "locale", "default_locale")
    fn resource_type(&self) -> &'static str;

    /// Detect the current state of this resource by querying the system
    fn current_state(&self) -> Result<ResourceState>;

    /// Get the desired state for this resource
    fn desired_state(&self) -> ResourceState;

    /// Check if the resource needs changes to reach desired state
    fn needs_apply(&self) -> Result<bool> {
        let current = self.current_state()?;
        let desired = self.desired_state();
        Ok(current != desired)
    }

    /// Apply changes to reach the desired state
    ///
    /// This method should:
    /// 1. Respect ctx.dry_run (return Skipped if true)
    /// 2. Make only the necessary changes
    /// 3. Return NoChange if nothing had to be done
    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult>;
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
