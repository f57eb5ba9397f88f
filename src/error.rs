use std::{io, process::ExitStatus};

pub const EXIT_GENERAL: i32 = 1;
pub const EXIT_PREREQUISITE: i32 = 2;
pub const EXIT_NETWORK: i32 = 3;
pub const EXIT_PACKAGE: i32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
	#[error("I/O error: {0}.")]
	Io(#[from] io::Error),

	#[error("Failed to execute command '{cmd}': {source}")]
	CommandLaunch {
		cmd: String,
		#[source]
		source: io::Error,
	},

	#[error("Command failed: {cmd}")]
	CommandFailed {
		cmd: String,
		status: ExitStatus,
		stderr: Option<String>,
	},

	#[error("Step '{step}' failed: {source}")]
	Step {
		step: &'static str,
		#[source]
		source: Box<ProvisionError>,
	},

	#[error("Step '{step}' is still unsatisfied after attempt to set it.")]
	StepUnsatisfied { step: &'static str },

	#[error("Insufficient {resource}: {} MB available, {} MB required.", .actual_kb / 1024, .required_kb / 1024)]
	InsufficientResource {
		resource: &'static str,
		required_kb: u64,
		actual_kb: u64,
	},

	#[error("Hostname '{hostname}' is not part of the cluster inventory.")]
	UnknownRole { hostname: String },

	#[error("Package installation failed: {0}")]
	Package(#[source] Box<ProvisionError>),

	// Reserved exit class, never constructed by the current pipeline.
	#[allow(dead_code)]
	#[error("Network error: {0}.")]
	Network(String),

	#[error("Invalid configuration: {0}.")]
	Config(String),
}

impl ProvisionError {
	pub fn exit_code(&self) -> i32 {
		match self {
			ProvisionError::Step { source, .. } => source.exit_code(),
			ProvisionError::InsufficientResource { .. } => EXIT_PREREQUISITE,
			ProvisionError::Network(_) => EXIT_NETWORK,
			ProvisionError::Package(_) => EXIT_PACKAGE,
			_ => EXIT_GENERAL,
		}
	}
}
