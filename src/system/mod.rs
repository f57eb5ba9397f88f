pub mod debian;
#[cfg(test)]
pub mod fake;

pub use debian::Debian;

use crate::error::ProvisionError;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct FirewallRule {
	pub port: &'static str,
	pub protocol: &'static str,
	pub from: &'static str,
	pub comment: &'static str,
}

impl FirewallRule {
	// Matches the rule lines ufw echoes back from `ufw show added`.
	pub fn command(&self) -> String {
		format!(
			"allow from {} to any port {} proto {} comment 'nodeprep: {}'",
			self.from, self.port, self.protocol, self.comment,
		)
	}
}

pub trait System {
	fn refresh_package_index(&self) -> Result<(), ProvisionError>;
	fn install_packages(&self, names: &[&str]) -> Result<(), ProvisionError>;
	fn package_installed(&self, name: &str) -> Result<bool, ProvisionError>;
	fn clean_package_cache(&self) -> Result<(), ProvisionError>;

	fn read_file(&self, path: &Path) -> Result<Option<String>, ProvisionError>;
	fn write_file(&self, path: &Path, contents: &str) -> Result<(), ProvisionError>;
	fn set_mode(&self, path: &Path, mode: u32) -> Result<(), ProvisionError>;

	fn load_kernel_module(&self, name: &str) -> Result<(), ProvisionError>;
	fn kernel_module_loaded(&self, name: &str) -> bool;
	fn reload_sysctl(&self) -> Result<(), ProvisionError>;

	fn swap_active(&self) -> Result<bool, ProvisionError>;
	fn disable_swap(&self) -> Result<(), ProvisionError>;

	fn restart_service(&self, name: &str) -> Result<(), ProvisionError>;

	fn firewall_allow(&self, rule: &FirewallRule) -> Result<(), ProvisionError>;
	fn firewall_added(&self) -> Result<String, ProvisionError>;
	fn firewall_reload(&self) -> Result<(), ProvisionError>;

	fn total_memory_kb(&self) -> Result<u64, ProvisionError>;
	fn available_disk_kb(&self, path: &Path) -> Result<u64, ProvisionError>;
}
