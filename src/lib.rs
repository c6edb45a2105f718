//! A small fixture program: greet a few users, draw and sum a random sample,
//! and print each greeting next to the value held for that user.

pub mod config;
pub mod driver;
pub mod dummy;
pub mod greeting;
pub mod logging;
pub mod rotating_file_logger;
pub mod sample;

// Re-export the main types for easy access
pub use config::Config;
pub use driver::{Driver, OutputFormat, RunLine, RunReport};
pub use dummy::Dummy;
pub use greeting::greet;
pub use logging::{init_logging, LoggingHandles, VerbosityCheckLayer};
pub use sample::RandomSample;
