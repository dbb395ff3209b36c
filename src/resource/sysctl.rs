//! Kernel parameter resource

use anyhow::Result;

use sysconf::{Layout, RemoteFs, SystemOps};
use sysconf::layout::sysctl_line;
use sysconf::system::sysctl_values_equal;

use super::{ApplyContext, ApplyResult, Resource, ResourceState};
use crate::target::SharedTarget;

/// One kernel parameter, optionally persisted under the sysctl directory
#[derive(Clone)]
pub struct SysctlParam {
    target: SharedTarget,
    layout: Layout,
    pub key: String,
    pub value: String,
    pub persist: bool,
}

impl std::fmt::Debug for SysctlParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysctlParam")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("persist", &self.persist)
            .finish_non_exhaustive()
    }
}

impl SysctlParam {
    pub fn new(target: SharedTarget, layout: Layout, key: &str, value: &str, persist: bool) -> Self {
        Self {
            target,
            layout,
            key: key.to_string(),
            value: value.to_string(),
            persist,
        }
    }

    fn persisted(&self) -> Result<bool> {
        let path = self.layout.sysctl_file(&self.key);
        let expected = sysctl_line(&self.key, &self.value);
        Ok(self
            .target
            .read_file(&path, true)?
            .is_some_and(|content| content == expected.as_bytes()))
    }
}

impl Resource for SysctlParam {
    fn id(&self) -> String {
        self.key.clone()
    }

    fn description(&self) -> String {
        format!("Set {} = {}", self.key, self.value)
    }

    fn resource_type(&self) -> &'static str {
        "sysctl"
    }

    fn current_state(&self) -> Result<ResourceState> {
        let live = self.target.get_sysctl(&self.key)?;
        if !sysctl_values_equal(&live, &self.value) {
            if live.is_empty() {
                return Ok(ResourceState::Absent);
            }
            return Ok(ResourceState::Modified {
                from: live,
                to: self.value.clone(),
            });
        }

        if self.persist && !self.persisted()? {
            return Ok(ResourceState::Modified {
                from: format!("{} (not persisted)", self.value),
                to: self.value.clone(),
            });
        }

        Ok(ResourceState::present(&self.value))
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::present(&self.value)
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(super::dry_run());
        }
        let outcome = super::require(&self.target, &self.layout).sysctl(
            &self.key,
            &self.value,
            self.persist,
        )?;
        Ok(super::changed(outcome.changed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use sysconf::memory::MemoryTarget;

    const PERSISTED: &str = "/etc/sysctl.d/60-vm.swappiness.conf";

    fn param(mem: &Arc<MemoryTarget>, persist: bool) -> SysctlParam {
        let target: SharedTarget = mem.clone();
        SysctlParam::new(target, Layout::default(), "vm.swappiness", "10", persist)
    }

    #[test]
    fn test_modified_then_converged() {
        let mem = Arc::new(MemoryTarget::new().with_sysctl("vm.swappiness", "60"));
        let resource = param(&mem, true);

        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Modified {
                from: "60".into(),
                to: "10".into()
            }
        );

        let result = resource.apply(&mut ApplyContext::default()).unwrap();
        assert_eq!(result, ApplyResult::Modified);
        assert_eq!(mem.sysctl("vm.swappiness").as_deref(), Some("10"));
        assert_eq!(mem.file(PERSISTED).as_deref(), Some("vm.swappiness = 10\n"));
        assert_eq!(mem.privileged_commands(), vec!["service procps start"]);

        assert!(!resource.needs_apply().unwrap());
        assert_eq!(resource.apply(&mut ApplyContext::default()).unwrap(), ApplyResult::NoChange);
        assert_eq!(mem.privileged_commands().len(), 1);
    }

    #[test]
    fn test_live_value_without_persisted_file() {
        let mem = Arc::new(MemoryTarget::new().with_sysctl("vm.swappiness", "10"));
        let resource = param(&mem, true);
        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Modified {
                from: "10 (not persisted)".into(),
                to: "10".into()
            }
        );

        let transient = param(&mem, false);
        assert!(!transient.needs_apply().unwrap());
    }

    #[test]
    fn test_unknown_parameter_is_absent() {
        let mem = Arc::new(MemoryTarget::new());
        assert_eq!(param(&mem, false).current_state().unwrap(), ResourceState::Absent);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let mem = Arc::new(MemoryTarget::new().with_sysctl("vm.swappiness", "60"));
        let mut ctx = ApplyContext::new(true, false);
        let result = param(&mem, true).apply(&mut ctx).unwrap();
        assert!(matches!(result, ApplyResult::Skipped { .. }));
        assert_eq!(mem.sysctl_set_count(), 0);
        assert_eq!(mem.write_count(), 0);
    }
}
