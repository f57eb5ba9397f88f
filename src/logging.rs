use crate::context;
use std::{fs::OpenOptions, panic, sync::Mutex};
use tracing_journald::layer as journald_layer;
use tracing_panic::panic_hook;
use tracing_subscriber::{fmt, layer::SubscriberExt, registry::Registry, EnvFilter};

// journalctl -t nodeprep
pub fn init() {
	panic::set_hook(Box::new(panic_hook));
	let log_file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(&context::get().log_path)
		.map_err(|err| eprintln!("log file not writable: {err}"))
		.ok();
	let log_sub = Registry::default()
		.with(
			EnvFilter::builder()
				.with_default_directive(tracing::Level::INFO.into())
				.from_env_lossy(),
		)
		.with(
			fmt::layer()
				.with_ansi(true)
				.with_target(true)
				.with_timer(fmt::time::SystemTime)
				.compact(),
		)
		.with(log_file.map(|file| {
			fmt::layer()
				.with_ansi(false)
				.with_target(true)
				.with_timer(fmt::time::SystemTime)
				.with_writer(Mutex::new(file))
		}))
		.with(
			journald_layer()
				.map_err(|err| eprintln!("journald not available: {err}"))
				.ok()
				.map(|layr| layr.with_syslog_identifier("nodeprep".into())),
		);
	tracing::subscriber::set_global_default(log_sub).expect("Failed to set log subscriber.");
}
