pub mod config;
pub mod kernel;
pub mod outputs;
pub mod services;

// Re-export specific items if needed for convenient access
pub use config::ParleyConfig;
pub use kernel::reactor::Reactor;
