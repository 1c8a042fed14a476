use minesweeper_common::protocol::{BOOM, ClientMessage, HELP_TEXT, INVALID_COMMAND};
use tracing::{debug, instrument};

use crate::logic::Board;

/// What the connection should do after handling one request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send the text and keep reading.
    Reply(String),
    /// Send the text, then hang up.
    ReplyThenClose(String),
    /// Hang up without replying.
    Close,
}

impl Outcome {
    pub fn reply(&self) -> Option<&str> {
        match self {
            Outcome::Reply(text) | Outcome::ReplyThenClose(text) => Some(text),
            Outcome::Close => None,
        }
    }

    pub fn closes(&self) -> bool {
        !matches!(self, Outcome::Reply(_))
    }
}

/// Handles one line of client input against the shared board.
///
/// Clients send `X Y` as column then row, the board is addressed by row then
/// column, so coordinates are swapped here.
#[instrument(level = "trace", skip(board))]
pub async fn handle_request(board: &Board, input: &str, debug_mode: bool) -> Outcome {
    let message = match input.parse::<ClientMessage>() {
        Ok(message) => message,
        Err(_) => {
            debug!("Invalid command: {:?}", input);
            return Outcome::Reply(INVALID_COMMAND.to_string());
        }
    };

    debug!("Handling {}", message);
    match message {
        ClientMessage::Look => Outcome::Reply(board.render().await),
        ClientMessage::Help => Outcome::Reply(HELP_TEXT.to_string()),
        ClientMessage::Bye => Outcome::Close,
        ClientMessage::Dig { pos } => {
            if board.dig(pos.y, pos.x).await {
                if debug_mode {
                    Outcome::Reply(BOOM.to_string())
                } else {
                    Outcome::ReplyThenClose(BOOM.to_string())
                }
            } else {
                Outcome::Reply(board.render().await)
            }
        }
        ClientMessage::Flag { pos } => {
            board.flag(pos.y, pos.x).await;
            Outcome::Reply(board.render().await)
        }
        ClientMessage::Deflag { pos } => {
            board.deflag(pos.y, pos.x).await;
            Outcome::Reply(board.render().await)
        }
    }
}
