//! Build an execution plan from a host manifest

use declarative::ExecutionPlan;

use crate::config::Manifest;
use crate::resource::{DefaultLocale, Hostname, Locales, SysctlParam};
use crate::target::SharedTarget;

/// Resources in apply order: kernel parameters, hostname, locales, then the
/// default locale (which depends on its locale being generated)
pub fn build(manifest: &Manifest, target: &SharedTarget) -> ExecutionPlan {
    let layout = &manifest.layout;
    let mut plan = ExecutionPlan::new();

    for (key, value) in manifest.sysctl_params() {
        plan.push(Box::new(SysctlParam::new(
            target.clone(),
            layout.clone(),
            key,
            &value,
            manifest.sysctl.persist,
        )));
    }

    if let Some(name) = &manifest.hostname {
        plan.push(Box::new(Hostname::new(target.clone(), layout.clone(), name)));
    }

    if !manifest.locales.is_empty() {
        plan.push(Box::new(Locales::new(
            target.clone(),
            layout.clone(),
            manifest.locales.clone(),
        )));
    }

    if let Some(name) = &manifest.default_locale {
        plan.push(Box::new(DefaultLocale::new(target.clone(), layout.clone(), name)));
    }

    log::debug!("Planned {} resources", plan.len());
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SysctlValue;
    use declarative::{ExecuteOptions, execute_simple};
    use std::sync::Arc;
    use sysconf::memory::MemoryTarget;

    fn manifest() -> Manifest {
        let mut manifest = Manifest {
            hostname: Some("web1".into()),
            locales: vec!["en_US.UTF-8".into(), "fr_FR.UTF-8".into()],
            default_locale: Some("en_US.UTF-8".into()),
            ..Default::default()
        };
        manifest
            .sysctl
            .params
            .insert("vm.swappiness".into(), SysctlValue::Int(10));
        manifest
            .sysctl
            .params
            .insert("net.ipv4.ip_forward".into(), SysctlValue::Bool(true));
        manifest
    }

    fn host() -> Arc<MemoryTarget> {
        Arc::new(
            MemoryTarget::new()
                .with_hostname("localhost")
                .with_sysctl("vm.swappiness", "60")
                .with_sysctl("net.ipv4.ip_forward", "0")
                .with_supported("en_US.UTF-8", "UTF-8")
                .with_supported("fr_FR.UTF-8", "UTF-8"),
        )
    }

    #[test]
    fn test_plan_order() {
        let target: SharedTarget = host();
        let plan = build(&manifest(), &target);
        let order: Vec<_> = plan
            .iter()
            .map(|r| format!("{}:{}", r.resource_type(), r.id()))
            .collect();
        assert_eq!(
            order,
            vec![
                "sysctl:net.ipv4.ip_forward",
                "sysctl:vm.swappiness",
                "hostname:web1",
                "locales:en_US.UTF-8,fr_FR.UTF-8",
                "default_locale:en_US.UTF-8",
            ]
        );
    }

    #[test]
    fn test_empty_manifest_plans_nothing() {
        let target: SharedTarget = host();
        assert!(build(&Manifest::default(), &target).is_empty());
    }

    #[test]
    fn test_apply_converges_and_is_idempotent() {
        let mem = host();
        let target: SharedTarget = mem.clone();
        let plan = build(&manifest(), &target);

        let summary = execute_simple(&plan, &ExecuteOptions::default()).unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.modified, 5);

        assert_eq!(mem.sysctl("net.ipv4.ip_forward").as_deref(), Some("1"));
        assert_eq!(mem.hostname(), "web1");
        assert_eq!(
            mem.file("/var/lib/locales/supported.d/local").as_deref(),
            Some("en_US.UTF-8 UTF-8\nfr_FR.UTF-8 UTF-8\n")
        );
        assert_eq!(
            mem.privileged_commands(),
            vec![
                "service procps start",
                "service procps start",
                "dpkg-reconfigure locales",
            ]
        );

        let again = execute_simple(&plan, &ExecuteOptions::default()).unwrap();
        assert_eq!(again.no_change, 5);
        assert_eq!(again.total_changes(), 0);
        assert_eq!(mem.privileged_commands().len(), 3);
    }

    #[test]
    fn test_filtered_plan() {
        let target: SharedTarget = host();
        let plan = build(&manifest(), &target).filter_by_target(Some("sysctl.vm"));
        assert_eq!(plan.len(), 1);
        let plan = build(&manifest(), &target).filter_by_target(Some("locale"));
        assert_eq!(plan.len(), 1);
    }
}
