pub mod steps;
pub mod utils;

use crate::error::ProvisionError;
use crate::node::Node;
use crate::setup::steps::{
	DisableSwap, Firewall, HostsTable, Inventory, KernelModules, Packages, Ssh, Sysctl,
};
use crate::system::System;
use tracing::info;

pub trait SetupStep {
	fn name(&self) -> &'static str;
	fn check(&self, node: &Node, sys: &dyn System) -> Result<bool, ProvisionError>;
	fn set(&self, node: &Node, sys: &dyn System) -> Result<(), ProvisionError>;
}

const SETUP_STEPS: &[&dyn SetupStep] = &[
	&Packages,
	&HostsTable,
	&DisableSwap,
	&KernelModules,
	&Sysctl,
	&Ssh,
	&Firewall,
	&Inventory,
];

pub fn apply(node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
	info!("Applying configuration for role {:?}.", node.role);
	for step in SETUP_STEPS {
		if step
			.check(node, sys)
			.map_err(|source| step_error(step.name(), source))?
		{
			info!("Step '{}' is already satisfied.", step.name());
			continue;
		}
		step.set(node, sys)
			.map_err(|source| step_error(step.name(), source))?;
		if !step
			.check(node, sys)
			.map_err(|source| step_error(step.name(), source))?
		{
			return Err(ProvisionError::StepUnsatisfied { step: step.name() });
		}
		info!("Step '{}' applied.", step.name());
	}
	Ok(())
}

fn step_error(step: &'static str, source: ProvisionError) -> ProvisionError {
	ProvisionError::Step {
		step,
		source: Box::new(source),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cluster;
	use crate::error::EXIT_PACKAGE;
	use crate::system::fake::FakeSystem;
	use std::path::PathBuf;

	fn node(hostname: &str) -> Node {
		Node::new(hostname, PathBuf::from("/vagrant/keys")).unwrap()
	}

	#[test]
	fn jumpbox_run_produces_jumpbox_artifacts() {
		let sys = FakeSystem::new();
		apply(&node("jumpbox"), &sys).unwrap();
		let inventory = sys.file("/root/machines.txt").unwrap();
		assert_eq!(inventory.lines().count(), 3);
		for member in cluster::MEMBERS {
			assert!(inventory.contains(&member.inventory_line()));
		}
		assert!(sys.file("/root/.ssh/id_ed25519").is_some());
		assert_eq!(sys.mode("/root/.ssh/id_ed25519"), Some(0o600));
		let client_config = sys.file("/root/.ssh/config").unwrap();
		assert!(client_config.contains("StrictHostKeyChecking no"));
		assert_eq!(
			sys.file("/etc/ssh/sshd_config.d/60-nodeprep.conf").as_deref(),
			Some("PermitRootLogin yes\n"),
		);
		assert!(sys
			.events()
			.iter()
			.all(|event| !event.starts_with("ufw allow")));
	}

	#[test]
	fn jumpbox_run_does_not_touch_authorized_keys() {
		let sys = FakeSystem::new();
		apply(&node("jumpbox"), &sys).unwrap();
		assert!(sys.file("/root/.ssh/authorized_keys").is_none());
	}

	#[test]
	fn worker_run_opens_worker_ports_only() {
		let sys = FakeSystem::new();
		apply(&node("node1"), &sys).unwrap();
		let events = sys.events();
		assert!(events.contains(&"ufw allow 10250/tcp".to_owned()));
		assert!(events.contains(&"ufw allow 30000:32767/tcp".to_owned()));
		assert!(!events.contains(&"ufw allow 6443/tcp".to_owned()));
		assert!(!events.contains(&"ufw allow 2379:2380/tcp".to_owned()));
		assert!(sys.file("/root/machines.txt").is_none());
		assert!(sys.file("/root/.ssh/id_ed25519").is_none());
		assert!(sys.file("/root/.ssh/config").is_none());
		let authorized = sys.file("/root/.ssh/authorized_keys").unwrap();
		assert!(authorized.contains("ssh-ed25519 AAAAC3Nz root@jumpbox"));
	}

	#[test]
	fn control_plane_run_opens_control_plane_ports_only() {
		let sys = FakeSystem::new();
		apply(&node("server"), &sys).unwrap();
		let events = sys.events();
		for port in ["6443", "2379:2380", "10250", "10251", "10252"] {
			assert!(events.contains(&format!("ufw allow {port}/tcp")));
		}
		assert!(!events.contains(&"ufw allow 30000:32767/tcp".to_owned()));
		assert!(sys.file("/root/machines.txt").is_none());
	}

	#[test]
	fn all_roles_persist_the_forward_policy() {
		for hostname in ["jumpbox", "server", "node0"] {
			let sys = FakeSystem::new();
			apply(&node(hostname), &sys).unwrap();
			let defaults = sys.file("/etc/default/ufw").unwrap();
			assert!(defaults.contains("DEFAULT_FORWARD_POLICY=\"ACCEPT\""));
			assert!(!defaults.contains("DEFAULT_FORWARD_POLICY=\"DROP\""));
		}
	}

	#[test]
	fn pipeline_configures_the_shared_host_state() {
		let sys = FakeSystem::new();
		apply(&node("server"), &sys).unwrap();
		let hosts = sys.file("/etc/hosts").unwrap();
		for member in cluster::MEMBERS {
			assert!(hosts.contains(&member.host_line()));
		}
		assert!(!sys.swap_on.get());
		assert!(!sys.file("/etc/fstab").unwrap().contains("swap"));
		let modules = sys.file("/etc/modules-load.d/k8s.conf").unwrap();
		assert_eq!(modules, "overlay\nbr_netfilter\nnf_conntrack\n");
		let sysctl = sys.file("/etc/sysctl.d/k8s.conf").unwrap();
		assert_eq!(sysctl.lines().count(), 12);
		assert!(sysctl.contains("net.ipv4.ip_forward = 1"));
		let events = sys.events();
		assert!(events.contains(&"sysctl --system".to_owned()));
		assert!(events.contains(&"systemctl restart ssh".to_owned()));
	}

	#[test]
	fn pipeline_runs_steps_in_declaration_order() {
		let sys = FakeSystem::new();
		apply(&node("node0"), &sys).unwrap();
		let events = sys.events();
		let position = |event: &str| {
			events
				.iter()
				.position(|e| e.starts_with(event))
				.unwrap_or_else(|| panic!("missing event: {event}"))
		};
		assert!(position("apt-get install") < position("write /etc/hosts"));
		assert!(position("write /etc/hosts") < position("swapoff -a"));
		assert!(position("swapoff -a") < position("modprobe overlay"));
		assert!(position("modprobe overlay") < position("sysctl --system"));
		assert!(position("sysctl --system") < position("systemctl restart ssh"));
		assert!(position("systemctl restart ssh") < position("ufw reload"));
	}

	#[test]
	fn package_failure_aborts_before_any_later_mutation() {
		let sys = FakeSystem::new();
		sys.fail_package_install.set(true);
		let err = apply(&node("server"), &sys).unwrap_err();
		assert_eq!(err.exit_code(), EXIT_PACKAGE);
		assert_eq!(sys.events(), vec!["apt-get update".to_owned()]);
	}

	#[test]
	fn rerun_performs_no_further_mutations() {
		let sys = FakeSystem::new();
		apply(&node("node0"), &sys).unwrap();
		let first_run_events = sys.events().len();
		apply(&node("node0"), &sys).unwrap();
		assert_eq!(sys.events().len(), first_run_events);
		let hosts = sys.file("/etc/hosts").unwrap();
		let server_lines = hosts
			.lines()
			.filter(|line| *line == cluster::MEMBERS[0].host_line())
			.count();
		assert_eq!(server_lines, 1);
		let authorized = sys.file("/root/.ssh/authorized_keys").unwrap();
		assert_eq!(authorized.lines().count(), 1);
	}

	#[test]
	fn jumpbox_run_without_key_material_is_a_config_error() {
		let sys = FakeSystem::new();
		sys.files
			.borrow_mut()
			.remove(std::path::Path::new("/vagrant/keys/id_ed25519"));
		let err = apply(&node("jumpbox"), &sys).unwrap_err();
		match err {
			ProvisionError::Step { step, source } => {
				assert_eq!(step, "Ssh");
				assert!(matches!(*source, ProvisionError::Config(_)));
			}
			other => panic!("expected Step error, got {other:?}"),
		}
	}
}
