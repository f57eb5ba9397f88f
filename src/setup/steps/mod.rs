pub mod disable_swap;
pub mod firewall;
pub mod hosts;
pub mod inventory;
pub mod kernel_modules;
pub mod packages;
pub mod ssh;
pub mod sysctl;

pub use disable_swap::DisableSwap;
pub use firewall::Firewall;
pub use hosts::HostsTable;
pub use inventory::Inventory;
pub use kernel_modules::KernelModules;
pub use packages::Packages;
pub use ssh::Ssh;
pub use sysctl::Sysctl;
