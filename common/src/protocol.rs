use std::{fmt, str::FromStr};

use crate::models::Pos;

/// Reply sent when a dig hits a bomb.
pub const BOOM: &str = "BOOM!";

/// Reply sent for any line that does not match the grammar.
pub const INVALID_COMMAND: &str = "Invalid command";

/// Reply to `help`.
pub const HELP_TEXT: &str = concat!(
    "MESSAGE ::= ( LOOK | DIG | FLAG | DEFLAG | HELP_REQ | BYE ) NEWLINE\n",
    "LOOK ::= \"look\"\n",
    "DIG ::= \"dig\" SPACE X SPACE Y\n",
    "FLAG ::= \"flag\" SPACE X SPACE Y\n",
    "DEFLAG ::= \"deflag\" SPACE X SPACE Y\n",
    "HELP_REQ ::= \"help\"\n",
    "BYE ::= \"bye\"\n",
    "NEWLINE ::= \"\\n\" | \"\\r\" \"\\n\"?\n",
    "X ::= INT\n",
    "Y ::= INT\n",
    "SPACE ::= \" \"\n",
    "INT ::= \"-\"? [0-9]+",
);

/// A single request line sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    Look,
    Help,
    Bye,
    Dig { pos: Pos },
    Flag { pos: Pos },
    Deflag { pos: Pos },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCommand;

impl fmt::Display for InvalidCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(INVALID_COMMAND)
    }
}

impl std::error::Error for InvalidCommand {}

/// Parses `-?[0-9]+`. Values beyond `i64` saturate, which keeps them out of
/// range of any board instead of turning them into invalid commands.
fn parse_int(token: &str) -> Result<i64, InvalidCommand> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidCommand);
    }

    Ok(token.parse().unwrap_or(if token.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

impl FromStr for ClientMessage {
    type Err = InvalidCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let tokens: Vec<&str> = line.split(' ').collect();

        match tokens.as_slice() {
            ["look"] => Ok(ClientMessage::Look),
            ["help"] => Ok(ClientMessage::Help),
            ["bye"] => Ok(ClientMessage::Bye),
            [command @ ("dig" | "flag" | "deflag"), x, y] => {
                let pos = Pos::new(parse_int(x)?, parse_int(y)?);
                Ok(match *command {
                    "dig" => ClientMessage::Dig { pos },
                    "flag" => ClientMessage::Flag { pos },
                    _ => ClientMessage::Deflag { pos },
                })
            }
            _ => Err(InvalidCommand),
        }
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::Look => f.write_str("look"),
            ClientMessage::Help => f.write_str("help"),
            ClientMessage::Bye => f.write_str("bye"),
            ClientMessage::Dig { pos } => write!(f, "dig {} {}", pos.x, pos.y),
            ClientMessage::Flag { pos } => write!(f, "flag {} {}", pos.x, pos.y),
            ClientMessage::Deflag { pos } => write!(f, "deflag {} {}", pos.x, pos.y),
        }
    }
}

/// The greeting a server sends right after accepting a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Welcome {
    pub cols: usize,
    pub rows: usize,
    pub players: usize,
}

impl fmt::Display for Welcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Welcome to Minesweeper. Board: {} columns by {} rows. Players: {} including you. Type 'help' for help.",
            self.cols, self.rows, self.players
        )
    }
}

impl FromStr for Welcome {
    type Err = InvalidCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let rest = line
            .trim_end()
            .strip_prefix("Welcome to Minesweeper. Board: ")
            .ok_or(InvalidCommand)?;
        let (cols, rest) = rest.split_once(" columns by ").ok_or(InvalidCommand)?;
        let (rows, rest) = rest.split_once(" rows. Players: ").ok_or(InvalidCommand)?;
        let (players, _) = rest.split_once(" including you.").ok_or(InvalidCommand)?;

        Ok(Self {
            cols: cols.parse().map_err(|_| InvalidCommand)?,
            rows: rows.parse().map_err(|_| InvalidCommand)?,
            players: players.parse().map_err(|_| InvalidCommand)?,
        })
    }
}
