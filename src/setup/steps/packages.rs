use crate::error::ProvisionError;
use crate::node::Node;
use crate::setup::SetupStep;
use crate::system::System;
use tracing::info;

pub struct Packages;

impl Packages {
	pub const PACKAGE_NAMES: &[&str] = &[
		"apt-transport-https",
		"ca-certificates",
		"conntrack",
		"curl",
		"git",
		"gnupg",
		"ipset",
		"openssl",
		"socat",
		"ufw",
		"vim",
		"wget",
	];
}

impl SetupStep for Packages {
	fn name(&self) -> &'static str {
		"Packages"
	}

	fn check(&self, _node: &Node, sys: &dyn System) -> Result<bool, ProvisionError> {
		for package_name in Packages::PACKAGE_NAMES {
			if !sys.package_installed(package_name)? {
				info!("{package_name} is not installed.");
				return Ok(false);
			}
		}
		info!("Base packages are already installed.");
		Ok(true)
	}

	fn set(&self, _node: &Node, sys: &dyn System) -> Result<(), ProvisionError> {
		info!("Installing base packages via apt-get.");
		sys.refresh_package_index()
			.map_err(|err| ProvisionError::Package(Box::new(err)))?;
		sys.install_packages(Packages::PACKAGE_NAMES)
			.map_err(|err| ProvisionError::Package(Box::new(err)))?;
		info!("Base packages installed.");
		Ok(())
	}
}
