pub mod config;
pub mod error;
pub mod intensity;
pub mod report;

pub use config::Config;
pub use error::*;
pub use intensity::*;
pub use report::*;
