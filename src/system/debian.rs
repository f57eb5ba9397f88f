use crate::error::ProvisionError;
use crate::system::{FirewallRule, System};
use std::{
	fs, io,
	os::unix::fs::PermissionsExt,
	path::Path,
	process::{Command, Output},
};
use tracing::info;

pub struct Debian;

fn run_status(cmd: &str, args: &[&str]) -> Result<(), ProvisionError> {
	let full_cmd = format!("{cmd} {}", args.join(" "));
	let status = Command::new(cmd)
		.args(args)
		.status()
		.map_err(|source| ProvisionError::CommandLaunch {
			cmd: full_cmd.clone(),
			source,
		})?;
	if !status.success() {
		return Err(ProvisionError::CommandFailed {
			cmd: full_cmd,
			status,
			stderr: None,
		});
	}
	Ok(())
}

fn run_output(cmd: &str, args: &[&str]) -> Result<Output, ProvisionError> {
	let full_cmd = format!("{cmd} {}", args.join(" "));
	let output = Command::new(cmd)
		.args(args)
		.output()
		.map_err(|source| ProvisionError::CommandLaunch {
			cmd: full_cmd.clone(),
			source,
		})?;
	if !output.status.success() {
		let stderr = if output.stderr.is_empty() {
			None
		} else {
			Some(String::from_utf8_lossy(&output.stderr).trim().to_owned())
		};
		return Err(ProvisionError::CommandFailed {
			cmd: full_cmd,
			status: output.status,
			stderr,
		});
	}
	Ok(output)
}

fn parse_mem_total_kb(meminfo: &str) -> Option<u64> {
	meminfo
		.lines()
		.find(|line| line.starts_with("MemTotal:"))?
		.split_whitespace()
		.nth(1)?
		.parse()
		.ok()
}

fn parse_df_avail_kb(df_output: &str) -> Option<u64> {
	df_output.lines().nth(1)?.trim().parse().ok()
}

impl System for Debian {
	fn refresh_package_index(&self) -> Result<(), ProvisionError> {
		run_status("apt-get", &["update"])
	}

	fn install_packages(&self, names: &[&str]) -> Result<(), ProvisionError> {
		let mut args = vec!["install", "-y", "--no-install-recommends"];
		args.extend_from_slice(names);
		run_status("apt-get", &args)
	}

	fn package_installed(&self, name: &str) -> Result<bool, ProvisionError> {
		let output = Command::new("dpkg-query")
			.args(["-W", "-f=${Status}", name])
			.output()
			.map_err(|source| ProvisionError::CommandLaunch {
				cmd: format!("dpkg-query -W -f=${{Status}} {name}"),
				source,
			})?;
		if !output.status.success() {
			return Ok(false);
		}
		let stdout = String::from_utf8_lossy(&output.stdout);
		let status = stdout.trim();
		Ok(status == "install ok installed" || status == "hold ok installed")
	}

	fn clean_package_cache(&self) -> Result<(), ProvisionError> {
		info!("Clearing package cache.");
		run_status("apt-get", &["clean"])
	}

	fn read_file(&self, path: &Path) -> Result<Option<String>, ProvisionError> {
		match fs::read_to_string(path) {
			Ok(contents) => Ok(Some(contents)),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err.into()),
		}
	}

	fn write_file(&self, path: &Path, contents: &str) -> Result<(), ProvisionError> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		fs::write(path, contents)?;
		Ok(())
	}

	fn set_mode(&self, path: &Path, mode: u32) -> Result<(), ProvisionError> {
		fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
		Ok(())
	}

	fn load_kernel_module(&self, name: &str) -> Result<(), ProvisionError> {
		info!("Loading kernel module: {name}.");
		run_status("modprobe", &[name])
	}

	fn kernel_module_loaded(&self, name: &str) -> bool {
		Path::new("/sys/module/").join(name).exists()
	}

	fn reload_sysctl(&self) -> Result<(), ProvisionError> {
		run_status("sysctl", &["--system"])
	}

	fn swap_active(&self) -> Result<bool, ProvisionError> {
		Ok(fs::read_to_string("/proc/swaps")?.lines().count() > 1)
	}

	fn disable_swap(&self) -> Result<(), ProvisionError> {
		run_output("swapoff", &["-a"]).map(|_| ())
	}

	fn restart_service(&self, name: &str) -> Result<(), ProvisionError> {
		info!("Restarting service: {name}.");
		run_status("systemctl", &["restart", name])
	}

	fn firewall_allow(&self, rule: &FirewallRule) -> Result<(), ProvisionError> {
		run_status(
			"ufw",
			&[
				"allow",
				"from",
				rule.from,
				"to",
				"any",
				"port",
				rule.port,
				"proto",
				rule.protocol,
				"comment",
				&format!("nodeprep: {}", rule.comment),
			],
		)
	}

	fn firewall_added(&self) -> Result<String, ProvisionError> {
		let output = run_output("ufw", &["show", "added"])?;
		Ok(String::from_utf8_lossy(&output.stdout).to_string())
	}

	fn firewall_reload(&self) -> Result<(), ProvisionError> {
		run_status("ufw", &["reload"])
	}

	fn total_memory_kb(&self) -> Result<u64, ProvisionError> {
		let meminfo = fs::read_to_string("/proc/meminfo")?;
		parse_mem_total_kb(&meminfo)
			.ok_or_else(|| ProvisionError::Config("MemTotal missing from /proc/meminfo".to_owned()))
	}

	fn available_disk_kb(&self, path: &Path) -> Result<u64, ProvisionError> {
		let path_str = path
			.to_str()
			.ok_or_else(|| ProvisionError::Config("non-utf8 filesystem path".to_owned()))?;
		let output = run_output("df", &["--output=avail", "-k", path_str])?;
		let stdout = String::from_utf8_lossy(&output.stdout);
		parse_df_avail_kb(&stdout)
			.ok_or_else(|| ProvisionError::Config(format!("unparseable df output for {path_str}")))
	}
}
