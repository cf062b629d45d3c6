//! Tests for the run module.

use super::*;

use netplan_cfg::config::Cli;
use netplan_cfg::document::DhcpState;
use netplan_cfg::reconcile::{Phase, PhaseOutput, ReconcileError, ReconcileReport};
use netplan_cfg::store::LoadError;

fn phase(phase: Phase, status: Option<i32>) -> PhaseOutput {
    PhaseOutput::new(phase, status, "", "")
}

mod finish {
    use super::*;

    #[test]
    fn dhcp_state_is_the_exit_status() {
        assert_eq!(finish(Ok(Outcome::Dhcp(DhcpState::Enabled))), 0);
        assert_eq!(finish(Ok(Outcome::Dhcp(DhcpState::Disabled))), 1);
        assert_eq!(finish(Ok(Outcome::Dhcp(DhcpState::Unset))), 2);
    }

    #[test]
    fn successful_reconciliation_exits_zero() {
        let report = ReconcileReport {
            generate: phase(Phase::Generate, Some(0)),
            apply: phase(Phase::Apply, Some(0)),
        };

        assert_eq!(finish(Ok(Outcome::Reconciled(report))), 0);
    }

    #[test]
    fn dry_run_and_skipped_exit_zero() {
        assert_eq!(finish(Ok(Outcome::DryRun("network: {}\n".to_string()))), 0);
        assert_eq!(finish(Ok(Outcome::Skipped)), 0);
    }

    #[test]
    fn failed_phase_status_is_propagated() {
        let generate = ReconcileError::GenerateFailed(phase(Phase::Generate, Some(78)));
        let apply = ReconcileError::ApplyFailed {
            generate: phase(Phase::Generate, Some(0)),
            apply: phase(Phase::Apply, None),
        };

        assert_eq!(finish(Err(ActionError::Reconcile(generate))), 78);
        assert_eq!(finish(Err(ActionError::Reconcile(apply))), 1);
    }

    #[test]
    fn other_errors_are_runtime_errors() {
        let spawn = ReconcileError::Spawn {
            phase: Phase::Generate,
            program: "netplan".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let load = LoadError::Read {
            path: "/etc/netplan/90-vz-eth0.yaml".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        assert_eq!(
            finish(Err(ActionError::Reconcile(spawn))),
            exit_code::RUNTIME_ERROR
        );
        assert_eq!(
            finish(Err(ActionError::Load(load))),
            exit_code::RUNTIME_ERROR
        );
    }
}

mod execute {
    use super::*;

    fn config(dir: &std::path::Path, netplan: &std::path::Path, args: &[&str]) -> ValidatedConfig {
        let mut full = vec![
            "netplan-cfg",
            "--config-dir",
            dir.to_str().unwrap(),
            "--netplan",
            netplan.to_str().unwrap(),
        ];
        full.extend(args);
        ValidatedConfig::from_raw(&Cli::parse_from_iter(full), None).unwrap()
    }

    #[tokio::test]
    async fn get_dhcp_on_missing_document_is_unset() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            &dir.path().join("no-netplan"),
            &["-a", "get_dhcp", "-d", "eth0"],
        );

        let result = execute(config).await;

        assert_eq!(result.unwrap(), Outcome::Dhcp(DhcpState::Unset));
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            &dir.path().join("no-netplan"),
            &["-a", "set_dhcp", "-d", "eth0", "-p", "4", "--dry-run"],
        );

        let outcome = execute(config).await.unwrap();

        assert!(matches!(outcome, Outcome::DryRun(ref yaml) if yaml.contains("dhcp4: true")));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_netplan_saves_then_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            &dir.path().join("no-netplan"),
            &["-a", "set_dhcp", "-d", "eth0", "-p", "6"],
        );

        let result = execute(config).await;

        assert!(dir.path().join("90-vz-eth0.yaml").exists());
        assert_eq!(finish(result), exit_code::RUNTIME_ERROR);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn netplan_status_becomes_exit_status() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("netplan");
        std::fs::write(&script, "#!/bin/sh\n[ \"$1\" = apply ] && exit 3\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let config = config(dir.path(), &script, &["-a", "restart", "-d", "eth0"]);

        let result = execute(config).await;

        assert_eq!(finish(result), 3);
    }
}
