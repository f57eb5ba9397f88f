use crate::error::ProvisionError;
use crate::node::{Node, Role};
use crate::setup::utils::text;
use crate::setup::SetupStep;
use crate::system::System;
use std::path::Path;
use tracing::info;

pub struct Ssh;

impl Ssh {
	pub const SSHD_DROPIN_PATH: &str = "/etc/ssh/sshd_config.d/60-nodeprep.conf";
	pub const SSHD_DROPIN: &str = "PermitRootLogin yes\n";
	pub const SSH_DIR: &str = "/root/.ssh";
	pub const PRIVATE_KEY_PATH: &str = "/root/.ssh/id_ed25519";
	pub const CLIENT_CONFIG_PATH: &str = "/root/.ssh/config";
	pub const CLIENT_CONFIG: &str =
		"Host *\n\tStrictHostKeyChecking no\n\tUserKnownHostsFile /dev/null\n";
	pub const AUTHORIZED_KEYS_PATH: &str = "/root/.ssh/authorized_keys";
	pub const SERVICE: &str = "ssh";

	fn key_material(node: &Node, sys: &dyn System, file_name: &str) -> Result<String, ProvisionError> {
		let path = node.key_dir.join(file_name);
		sys.read_file(&path)?.ok_or_else(|| {
			ProvisionError::Config(format!("SSH key material missing at {}", path.display()))
		})
	}
}

impl SetupStep for Ssh {
	fn name(&self) -> &'static str {
		"Ssh"
	}

	fn check(&self, node: &Node, sys: &dyn System) -> Result<bool, ProvisionError> {
		let dropin = sys.read_file(Path::new(Ssh::SSHD_DROPIN_PATH))?;
		if dropin.as_deref() != Some(Ssh::SSHD_DROPIN) {
			info!("Root login is not enabled for sshd.");
			return Ok(false);
		}
		match node.role {
			Role::Jumpbox => {
				if sys.read_file(Path::new(Ssh::PRIVATE_KEY_PATH))?.is_none() {
					info!("Jumpbox private key is not installed.");
					return Ok(false);
				}
				let client_config = sys.read_file(Path::new(Ssh::CLIENT_CONFIG_PATH))?;
				if client_config.as_deref() != Some(Ssh::CLIENT_CONFIG) {
					info!("Jumpbox SSH client config is not installed.");
					return Ok(false);
				}
			}
			Role::ControlPlane | Role::Worker => {
				let public_key = Ssh::key_material(node, sys, "id_ed25519.pub")?;
				let public_key = public_key.trim_end();
				let authorized = sys
					.read_file(Path::new(Ssh::AUTHORIZED_KEYS_PATH))?
					.unwrap_or_default();
				if !authorized.lines().any(|line| line == public_key) {
					info!("Jumpbox public key is not authorized.");
					return Ok(false);
				}
			}
		}
		info!("SSH is already configured.");
		Ok(true)
	}

	fn set(&self, node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
		info!("Configuring SSH.");
		sys.write_file(Path::new(Ssh::SSHD_DROPIN_PATH), Ssh::SSHD_DROPIN)?;
		match node.role {
			Role::Jumpbox => {
				let private_key = Ssh::key_material(node, sys, "id_ed25519")?;
				sys.write_file(Path::new(Ssh::PRIVATE_KEY_PATH), &private_key)?;
				sys.set_mode(Path::new(Ssh::SSH_DIR), 0o700)?;
				sys.set_mode(Path::new(Ssh::PRIVATE_KEY_PATH), 0o600)?;
				sys.write_file(Path::new(Ssh::CLIENT_CONFIG_PATH), Ssh::CLIENT_CONFIG)?;
				info!("Jumpbox key material and client config installed.");
			}
			Role::ControlPlane | Role::Worker => {
				let public_key = Ssh::key_material(node, sys, "id_ed25519.pub")?;
				text::ensure_line(
					sys,
					Path::new(Ssh::AUTHORIZED_KEYS_PATH),
					public_key.trim_end(),
				)?;
				sys.set_mode(Path::new(Ssh::AUTHORIZED_KEYS_PATH), 0o600)?;
				info!("Jumpbox public key authorized for root.");
			}
		}
		sys.restart_service(Ssh::SERVICE)?;
		Ok(())
	}
}
