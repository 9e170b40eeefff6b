pub mod cli;
pub mod llm;
pub mod load_config;

pub use cli::{run, Cli, Commands};
