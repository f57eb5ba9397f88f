use crate::error::ProvisionError;
use crate::system::System;
use std::path::Path;

// Appends `line` unless it is already present as a full line. Returns
// whether the file changed.
pub fn ensure_line(sys: &dyn System, path: &Path, line: &str) -> Result<bool, ProvisionError> {
	let contents = sys.read_file(path)?.unwrap_or_default();
	if contents.lines().any(|existing| existing == line) {
		return Ok(false);
	}
	let mut updated = contents;
	if !updated.is_empty() && !updated.ends_with('\n') {
		updated.push('\n');
	}
	updated.push_str(line);
	updated.push('\n');
	sys.write_file(path, &updated)?;
	Ok(true)
}

// Replaces the line starting with `key` by `line`, or appends `line` when no
// such line exists. Returns whether the file changed.
pub fn set_key_line(
	sys: &dyn System,
	path: &Path,
	key: &str,
	line: &str,
) -> Result<bool, ProvisionError> {
	let contents = sys.read_file(path)?.unwrap_or_default();
	if contents.lines().any(|existing| existing == line) {
		return Ok(false);
	}
	let mut replaced = false;
	let mut lines = Vec::new();
	for existing in contents.lines() {
		if existing.starts_with(key) {
			lines.push(line);
			replaced = true;
		} else {
			lines.push(existing);
		}
	}
	if !replaced {
		lines.push(line);
	}
	sys.write_file(path, &(lines.join("\n") + "\n"))?;
	Ok(true)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::system::fake::FakeSystem;
	use std::path::Path;

	#[test]
	fn ensure_line_appends_exactly_once() {
		let sys = FakeSystem::new();
		let path = Path::new("/etc/hosts");
		assert!(ensure_line(&sys, path, "192.168.56.11 server").unwrap());
		assert!(!ensure_line(&sys, path, "192.168.56.11 server").unwrap());
		let hosts = sys.file("/etc/hosts").unwrap();
		assert_eq!(
			hosts.lines().filter(|l| *l == "192.168.56.11 server").count(),
			1,
		);
		assert!(hosts.starts_with("127.0.0.1 localhost\n"));
	}

	#[test]
	fn ensure_line_creates_a_missing_file() {
		let sys = FakeSystem::new();
		let path = Path::new("/root/.ssh/authorized_keys");
		assert!(ensure_line(&sys, path, "ssh-ed25519 AAAA").unwrap());
		assert_eq!(sys.file("/root/.ssh/authorized_keys").unwrap(), "ssh-ed25519 AAAA\n");
	}

	#[test]
	fn set_key_line_replaces_an_existing_value_in_place() {
		let sys = FakeSystem::new();
		let path = Path::new("/etc/default/ufw");
		assert!(set_key_line(
			&sys,
			path,
			"DEFAULT_FORWARD_POLICY=",
			"DEFAULT_FORWARD_POLICY=\"ACCEPT\"",
		)
		.unwrap());
		let defaults = sys.file("/etc/default/ufw").unwrap();
		assert_eq!(
			defaults,
			"DEFAULT_INPUT_POLICY=\"DROP\"\nDEFAULT_FORWARD_POLICY=\"ACCEPT\"\n",
		);
	}

	#[test]
	fn set_key_line_appends_when_the_key_is_absent() {
		let sys = FakeSystem::new();
		let path = Path::new("/etc/default/empty");
		assert!(set_key_line(&sys, path, "DEFAULT_FORWARD_POLICY=", "DEFAULT_FORWARD_POLICY=\"ACCEPT\"").unwrap());
		assert!(!set_key_line(&sys, path, "DEFAULT_FORWARD_POLICY=", "DEFAULT_FORWARD_POLICY=\"ACCEPT\"").unwrap());
		assert_eq!(
			sys.file("/etc/default/empty").unwrap(),
			"DEFAULT_FORWARD_POLICY=\"ACCEPT\"\n",
		);
	}
}
