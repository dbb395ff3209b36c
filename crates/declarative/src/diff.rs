//! Diff computation for resources

use crate::resource::Resource;
use crate::types::ResourceState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
}

impl ResourceDiff {
    /// Create a diff from a resource, returning None if no changes needed
    pub fn from_resource(resource: &dyn Resource) -> Result<Option<Self>> {
        let current = resource.current_state().with_context(|| {
            format!("Could not read current state of {} {}", resource.resource_type(), resource.id())
        })?;
        let desired = resource.desired_state();

        if current == desired {
            return Ok(None);
        }

        Ok(Some(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
        }))
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Absent, ResourceState::Present { .. })
        )
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Present { .. }, ResourceState::Absent)
        )
    }
}

/// Compute diffs for a list of resources, in order
///
/// Returns only resources that have differences between current and desired
/// state. The first resource whose state cannot be read aborts the scan.
pub fn compute_diffs<'a, I>(resources: I) -> Result<Vec<ResourceDiff>>
where
    I: IntoIterator<Item = &'a dyn Resource>,
{
    let mut diffs = Vec::new();
    for resource in resources {
        if let Some(diff) = ResourceDiff::from_resource(resource)? {
            diffs.push(diff);
        }
    }
    Ok(diffs)
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to remove
    pub removals: usize,
    /// Number of resources to modify
    pub modifications: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_removal() {
                summary.removals += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(current: ResourceState, desired: ResourceState) -> ResourceDiff {
        ResourceDiff {
            resource_id: "x".into(),
            resource_type: "test".into(),
            description: "x".into(),
            current,
            desired,
        }
    }

    #[test]
    fn test_diff_summary() {
        let diffs = vec![
            diff(ResourceState::Absent, ResourceState::present("1")),
            diff(ResourceState::present("0"), ResourceState::present("1")),
            diff(ResourceState::present("0"), ResourceState::Absent),
        ];
        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.modifications, 1);
        assert_eq!(summary.removals, 1);
        assert!(summary.has_changes());
        assert!(!DiffSummary::from_diffs(&[]).has_changes());
    }
}
