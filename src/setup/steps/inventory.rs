use crate::cluster;
use crate::error::ProvisionError;
use crate::node::{Node, Role};
use crate::setup::SetupStep;
use crate::system::System;
use std::path::Path;
use tracing::info;

pub struct Inventory;

impl Inventory {
	pub const CONFIG_PATH: &str = "/root/machines.txt";

	fn config_text() -> String {
		cluster::MEMBERS
			.iter()
			.map(cluster::Member::inventory_line)
			.collect::<Vec<_>>()
			.join("\n")
			+ "\n"
	}
}

impl SetupStep for Inventory {
	fn name(&self) -> &'static str {
		"Inventory"
	}

	fn check(&self, node: &Node, sys: &dyn System) -> Result<bool, ProvisionError> {
		if node.role != Role::Jumpbox {
			info!("This machine is not the jumpbox, no inventory file required.");
			return Ok(true);
		}
		let Some(inventory_txt) = sys.read_file(Path::new(Inventory::CONFIG_PATH))? else {
			info!("Inventory file is missing.");
			return Ok(false);
		};
		if inventory_txt != Inventory::config_text() {
			info!("Inventory file is out of date.");
			return Ok(false);
		}
		info!("Inventory file is already written.");
		Ok(true)
	}

	fn set(&self, _node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
		info!("Writing the cluster inventory file.");
		sys.write_file(Path::new(Inventory::CONFIG_PATH), &Inventory::config_text())?;
		Ok(())
	}
}
