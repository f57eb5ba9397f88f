use crate::error::ProvisionError;
use crate::node::Node;
use crate::setup::SetupStep;
use crate::system::System;
use std::path::Path;
use tracing::info;

pub struct KernelModules;

impl KernelModules {
	pub const CONFIG_PATH: &str = "/etc/modules-load.d/k8s.conf";
	pub const MODULES: &[&str] = &["overlay", "br_netfilter", "nf_conntrack"];

	fn config_text() -> String {
		KernelModules::MODULES.join("\n") + "\n"
	}
}

impl SetupStep for KernelModules {
	fn name(&self) -> &'static str {
		"KernelModules"
	}

	fn check(&self, _node: &Node, sys: &dyn System) -> Result<bool, ProvisionError> {
		let Some(config_txt) = sys.read_file(Path::new(KernelModules::CONFIG_PATH))? else {
			info!("Kernel module config is missing.");
			return Ok(false);
		};
		if config_txt != KernelModules::config_text() {
			info!("Kernel modules are misconfigured.");
			return Ok(false);
		}
		for module_name in KernelModules::MODULES {
			if !sys.kernel_module_loaded(module_name) {
				info!("Kernel module {module_name} is not loaded.");
				return Ok(false);
			}
		}
		info!("Kernel modules are already configured and loaded.");
		Ok(true)
	}

	fn set(&self, _node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
		info!("Configuring kernel modules.");
		sys.write_file(
			Path::new(KernelModules::CONFIG_PATH),
			&KernelModules::config_text(),
		)?;
		for module_name in KernelModules::MODULES {
			sys.load_kernel_module(module_name)?;
		}
		info!("Kernel modules have been configured and loaded.");
		Ok(())
	}
}
