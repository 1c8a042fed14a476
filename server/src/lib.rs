pub mod board_file;
pub mod config;
pub mod data;
pub mod error;
pub mod logic;
pub mod server;
pub mod session;

pub use error::{Error, Result};
