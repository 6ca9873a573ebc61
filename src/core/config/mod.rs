pub mod data;
pub mod io;


pub use data::{default_database_path, Config, ConfigKey};
pub use io::ConfigError;
