use crate::cluster;
use crate::error::ProvisionError;
use crate::node::{Node, Role};
use crate::setup::utils::text;
use crate::setup::SetupStep;
use crate::system::{FirewallRule, System};
use std::path::Path;
use tracing::info;

pub struct Firewall;

impl Firewall {
	pub const UFW_DEFAULTS_PATH: &str = "/etc/default/ufw";
	pub const FORWARD_POLICY_KEY: &str = "DEFAULT_FORWARD_POLICY=";
	pub const FORWARD_POLICY: &str = "DEFAULT_FORWARD_POLICY=\"ACCEPT\"";

	pub const CONTROL_PLANE_RULES: &[FirewallRule] = &[
		FirewallRule {
			port: "6443",
			protocol: "tcp",
			from: cluster::SUBNET,
			comment: "kube-apiserver",
		},
		FirewallRule {
			port: "2379:2380",
			protocol: "tcp",
			from: cluster::SUBNET,
			comment: "etcd client and peer",
		},
		FirewallRule {
			port: "10250",
			protocol: "tcp",
			from: cluster::SUBNET,
			comment: "kubelet",
		},
		FirewallRule {
			port: "10251",
			protocol: "tcp",
			from: cluster::SUBNET,
			comment: "kube-scheduler",
		},
		FirewallRule {
			port: "10252",
			protocol: "tcp",
			from: cluster::SUBNET,
			comment: "kube-controller-manager",
		},
	];

	pub const WORKER_RULES: &[FirewallRule] = &[
		FirewallRule {
			port: "10250",
			protocol: "tcp",
			from: cluster::SUBNET,
			comment: "kubelet",
		},
		FirewallRule {
			port: "30000:32767",
			protocol: "tcp",
			from: cluster::SUBNET,
			comment: "nodeport services",
		},
	];

	pub fn rules_for(role: Role) -> &'static [FirewallRule] {
		match role {
			Role::Jumpbox => &[],
			Role::ControlPlane => Firewall::CONTROL_PLANE_RULES,
			Role::Worker => Firewall::WORKER_RULES,
		}
	}
}

impl SetupStep for Firewall {
	fn name(&self) -> &'static str {
		"Firewall"
	}

	fn check(&self, node: &Node, sys: &dyn System) -> Result<bool, ProvisionError> {
		let defaults_txt = sys
			.read_file(Path::new(Firewall::UFW_DEFAULTS_PATH))?
			.unwrap_or_default();
		if !defaults_txt
			.lines()
			.any(|line| line == Firewall::FORWARD_POLICY)
		{
			info!("Forward policy is not persisted.");
			return Ok(false);
		}
		let rules = Firewall::rules_for(node.role);
		if rules.is_empty() {
			info!("No firewall rules required for this role.");
			return Ok(true);
		}
		let added = sys.firewall_added()?;
		for rule in rules {
			let command = rule.command();
			if !added.lines().any(|line| line.contains(&command)) {
				info!("Firewall port {} is not open.", rule.port);
				return Ok(false);
			}
		}
		info!("Firewall ports are already open.");
		Ok(true)
	}

	fn set(&self, node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
		info!("Configuring firewall.");
		text::set_key_line(
			sys,
			Path::new(Firewall::UFW_DEFAULTS_PATH),
			Firewall::FORWARD_POLICY_KEY,
			Firewall::FORWARD_POLICY,
		)?;
		for rule in Firewall::rules_for(node.role) {
			info!("Opening firewall port {} for {}.", rule.port, rule.comment);
			sys.firewall_allow(rule)?;
		}
		sys.firewall_reload()?;
		Ok(())
	}
}
