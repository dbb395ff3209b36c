//! Hostname resource

use anyhow::Result;

use sysconf::{Layout, SystemOps};

use super::{ApplyContext, ApplyResult, Resource, ResourceState};
use crate::target::SharedTarget;

#[derive(Clone)]
pub struct Hostname {
    target: SharedTarget,
    layout: Layout,
    pub name: String,
}

impl std::fmt::Debug for Hostname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hostname")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Hostname {
    pub fn new(target: SharedTarget, layout: Layout, name: &str) -> Self {
        Self {
            target,
            layout,
            name: name.to_string(),
        }
    }
}

impl Resource for Hostname {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Set hostname to {}", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "hostname"
    }

    fn current_state(&self) -> Result<ResourceState> {
        let current = self.target.get_hostname()?;
        if current == self.name {
            Ok(ResourceState::present(current))
        } else {
            Ok(ResourceState::Modified {
                from: current,
                to: self.name.clone(),
            })
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::present(&self.name)
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(super::dry_run());
        }
        let changed = super::require(&self.target, &self.layout).hostname(&self.name)?;
        Ok(super::changed(changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use sysconf::memory::MemoryTarget;

    #[test]
    fn test_hostname_converges_once() {
        let mem = Arc::new(MemoryTarget::new().with_hostname("localhost"));
        let resource = Hostname::new(mem.clone(), Layout::default(), "web1.example.com");

        assert!(resource.needs_apply().unwrap());
        assert_eq!(
            resource.apply(&mut ApplyContext::default()).unwrap(),
            ApplyResult::Modified
        );
        assert_eq!(mem.hostname(), "web1.example.com");

        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::present("web1.example.com")
        );
        assert_eq!(
            resource.apply(&mut ApplyContext::default()).unwrap(),
            ApplyResult::NoChange
        );
        assert_eq!(mem.hostname_set_count(), 1);
    }
}
