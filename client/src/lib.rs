//! Minesweeper Client Library
//!
//! An async client for the line-based minesweeper server. It reads the
//! welcome line on connect, so it knows how many lines each board snapshot
//! spans, and turns replies into [`BoardView`]s.
//!
//! ```rust,no_run
//! use minesweeper_client::{DigResult, MinesweeperClient, Pos};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut client = MinesweeperClient::connect("127.0.0.1:4444").await?;
//!     println!("{:?}", client.welcome());
//!
//!     match client.dig(Pos::new(3, 1)).await? {
//!         DigResult::Boom => println!("BOOM!"),
//!         DigResult::Board(board) => println!("{}", board),
//!     }
//!
//!     client.flag(Pos::new(0, 0)).await?;
//!     client.bye().await?;
//!     Ok(())
//! }
//! ```

mod client;

pub use client::{DigResult, MinesweeperClient};

// Re-export common types for convenience
pub use minesweeper_common::{models::*, protocol::*};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
