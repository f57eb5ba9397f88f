use crate::error::ProvisionError;
use crate::node::Node;
use crate::setup::SetupStep;
use crate::system::System;
use std::path::Path;
use tracing::info;

pub struct DisableSwap;

impl DisableSwap {
	pub const FSTAB_PATH: &str = "/etc/fstab";

	fn has_swap_entry(fstab_txt: &str) -> bool {
		fstab_txt
			.lines()
			.filter(|line| !line.trim_start().starts_with('#'))
			.any(|line| {
				let fields = line.split_whitespace().collect::<Vec<&str>>();
				fields.len() >= 3 && fields[2] == "swap"
			})
	}
}

impl SetupStep for DisableSwap {
	fn name(&self) -> &'static str {
		"DisableSwap"
	}

	fn check(&self, _node: &Node, sys: &dyn System) -> Result<bool, ProvisionError> {
		if sys.swap_active()? {
			info!("Swap is enabled.");
			return Ok(false);
		}
		let fstab_txt = sys
			.read_file(Path::new(DisableSwap::FSTAB_PATH))?
			.unwrap_or_default();
		if DisableSwap::has_swap_entry(&fstab_txt) {
			info!("Swap is enabled in fstab.");
			return Ok(false);
		}
		info!("Swap is already disabled and absent from fstab.");
		Ok(true)
	}

	fn set(&self, _node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
		info!("Disabling swap.");
		sys.disable_swap()?;
		let config_path = Path::new(DisableSwap::FSTAB_PATH);
		let Some(original) = sys.read_file(config_path)? else {
			return Ok(());
		};
		let cleaned = original
			.lines()
			.filter(|line| {
				line.split_whitespace()
					.nth(2)
					.is_none_or(|fs_type| fs_type != "swap")
			})
			.collect::<Vec<_>>()
			.join("\n");
		let final_content = if original.ends_with('\n') {
			cleaned + "\n"
		} else {
			cleaned
		};
		if final_content != original {
			info!("Removing swap entries from fstab.");
			sys.write_file(config_path, &final_content)?;
		}
		Ok(())
	}
}
