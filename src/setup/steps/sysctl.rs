use crate::error::ProvisionError;
use crate::node::Node;
use crate::setup::SetupStep;
use crate::system::System;
use std::path::Path;
use tracing::info;

pub struct Sysctl;

impl Sysctl {
	pub const CONFIG_PATH: &str = "/etc/sysctl.d/k8s.conf";
	pub const SETTINGS: &[(&str, &str)] = &[
		("net.bridge.bridge-nf-call-iptables", "1"),
		("net.bridge.bridge-nf-call-ip6tables", "1"),
		("net.ipv4.ip_forward", "1"),
		("net.ipv6.conf.all.forwarding", "1"),
		("net.netfilter.nf_conntrack_max", "131072"),
		("net.core.somaxconn", "32768"),
		("net.core.netdev_max_backlog", "16384"),
		("net.ipv4.tcp_max_syn_backlog", "8192"),
		("fs.file-max", "1048576"),
		("fs.inotify.max_user_watches", "524288"),
		("fs.inotify.max_user_instances", "512"),
		("vm.max_map_count", "262144"),
	];

	fn config_text() -> String {
		Sysctl::SETTINGS
			.iter()
			.map(|(key, value)| format!("{key} = {value}"))
			.collect::<Vec<_>>()
			.join("\n")
			+ "\n"
	}
}

impl SetupStep for Sysctl {
	fn name(&self) -> &'static str {
		"Sysctl"
	}

	fn check(&self, _node: &Node, sys: &dyn System) -> Result<bool, ProvisionError> {
		let Some(config_txt) = sys.read_file(Path::new(Sysctl::CONFIG_PATH))? else {
			info!("Sysctl config is missing.");
			return Ok(false);
		};
		if config_txt != Sysctl::config_text() {
			info!("Sysctl is misconfigured.");
			return Ok(false);
		}
		info!("Sysctl is already configured.");
		Ok(true)
	}

	fn set(&self, _node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
		info!("Configuring sysctl.");
		sys.write_file(Path::new(Sysctl::CONFIG_PATH), &Sysctl::config_text())?;
		sys.reload_sysctl()?;
		info!("Sysctl has been configured.");
		Ok(())
	}
}
