//! Types shared between the minesweeper server and its clients: positions,
//! cell symbols, request lines and the fixed reply texts.

pub mod models;
pub mod protocol;
