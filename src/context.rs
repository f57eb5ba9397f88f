use std::{env, path::PathBuf, process::Command, sync::OnceLock};

pub const DEFAULT_KEY_DIR: &str = "/vagrant/keys";
pub const DEFAULT_LOG_PATH: &str = "/var/log/nodeprep.log";

#[derive(Debug)]
pub struct Context {
	pub hostname: String,
	pub key_dir: PathBuf,
	pub log_path: PathBuf,
}

static CONTEXT: OnceLock<Context> = OnceLock::new();

pub fn init() {
	let hostname = std::str::from_utf8(
		&Command::new("hostname")
			.arg("-f")
			.output()
			.expect("Fatal failure resolving hostname.")
			.stdout,
	)
	.expect("Fatal failure in hostname non-utf8 encoding.")
	.trim()
	.to_owned();
	let key_dir = env::var("NODEPREP_KEY_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|_| PathBuf::from(DEFAULT_KEY_DIR));
	let log_path = env::var("NODEPREP_LOG")
		.map(PathBuf::from)
		.unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH));
	let context = Context {
		hostname,
		key_dir,
		log_path,
	};
	CONTEXT.set(context).expect("Fatal context initialization.");
}

pub fn get() -> &'static Context {
	CONTEXT.get().expect("Fatal failure to get context.")
}
