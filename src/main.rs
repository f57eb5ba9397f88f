mod cluster;
mod context;
mod error;
mod logging;
mod node;
mod setup;
mod system;

use crate::error::ProvisionError;
use crate::node::Node;
use crate::system::{Debian, System};
use std::path::Path;
use tracing::{error, info, warn};

fn main() {
	context::init();
	logging::init();
	info!("Node provisioning started.");
	let sys = Debian;
	if let Err(err) = run(&sys) {
		error!("Provisioning failed: {err}");
		if let Err(cleanup_err) = sys.clean_package_cache() {
			warn!("Package cache cleanup failed: {cleanup_err}");
		}
		std::process::exit(err.exit_code());
	}
	info!("Node provisioning finished successfully.");
}

fn run(sys: &dyn System) -> Result<(), ProvisionError> {
	let ctx = context::get();
	let node = Node::new(&ctx.hostname, ctx.key_dir.clone())?;
	info!("Hostname '{}' classified as {:?}.", node.hostname, node.role);
	let ram_kb = sys.total_memory_kb()?;
	let disk_kb = sys.available_disk_kb(Path::new("/"))?;
	info!("Measured {ram_kb} KB memory and {disk_kb} KB free disk.");
	node::check_prerequisites(node.role, ram_kb, disk_kb)?;
	setup::apply(&node, sys)
}
