//! CLI command implementations

pub mod compile;
pub mod config;
pub mod digest;
pub mod info;
pub mod locate;

pub use compile::execute as compile;
pub use config::execute as config;
pub use digest::execute as digest;
pub use info::execute as info;
pub use locate::execute as locate;
