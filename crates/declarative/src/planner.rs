//! Execution plan - an ordered list of resources

use crate::resource::{BoxedResource, Resource};

/// Resources in the order they must be applied
#[derive(Default)]
pub struct ExecutionPlan {
    resources: Vec<BoxedResource>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource; it runs after everything already in the plan
    pub fn push(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Resources in plan order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.iter().map(|r| r.as_ref())
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "type" or "type.name". Only the first dot separates
    /// type from name, so "sysctl.net.ipv4.ip_forward" works.
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|r| matches_filter(r, resource_type, name))
            }
        }
    }

    /// Total number of resources in the plan
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('.') {
        Some((resource_type, name)) => (resource_type, Some(name)),
        None => (target, None),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(resource: &dyn Resource, resource_type: &str, name: Option<&str>) -> bool {
    // Allow common aliases
    let matches_type = match resource_type {
        "kernel" | "sysctls" => resource.resource_type() == "sysctl",
        "locale" => resource.resource_type() == "locales",
        "lang" | "default-locale" => resource.resource_type() == "default_locale",
        rt => resource.resource_type() == rt,
    };
    if !matches_type {
        return false;
    }

    if let Some(n) = name
        && !resource.id().contains(n)
    {
        return false;
    }

    true
}
