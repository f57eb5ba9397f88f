use crate::cluster;
use crate::error::ProvisionError;
use crate::node::Node;
use crate::setup::utils::text;
use crate::setup::SetupStep;
use crate::system::System;
use std::path::Path;
use tracing::info;

pub struct HostsTable;

impl HostsTable {
	pub const CONFIG_PATH: &str = "/etc/hosts";
}

impl SetupStep for HostsTable {
	fn name(&self) -> &'static str {
		"HostsTable"
	}

	fn check(&self, _node: &Node, sys: &dyn System) -> Result<bool, ProvisionError> {
		let Some(hosts_txt) = sys.read_file(Path::new(HostsTable::CONFIG_PATH))? else {
			info!("Hosts table is missing.");
			return Ok(false);
		};
		for member in cluster::MEMBERS {
			let line = member.host_line();
			if !hosts_txt.lines().any(|existing| existing == line) {
				info!("Hosts table entry for {} is missing.", member.alias);
				return Ok(false);
			}
		}
		info!("Hosts table already lists all cluster members.");
		Ok(true)
	}

	fn set(&self, _node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
		info!("Adding cluster members to the hosts table.");
		for member in cluster::MEMBERS {
			text::ensure_line(sys, Path::new(HostsTable::CONFIG_PATH), &member.host_line())?;
		}
		Ok(())
	}
}
