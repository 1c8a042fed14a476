use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;
use tracing::info;

use crate::{
    board_file::BoardLayout,
    error::{Error, Result},
    logic::{Board, RandomBombs},
};

pub const DEFAULT_PORT: u16 = 4444;
pub const DEFAULT_SIZE: usize = 10;

/// Multiplayer minesweeper server.
///
/// Clients are disconnected after digging a bomb unless `--debug` is given.
/// Without `--file` or `--size` a random 10x10 board is used.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Keep clients connected after they dig a bomb
    #[arg(long, env = "MINESWEEPER_DEBUG", overrides_with = "no_debug")]
    pub debug: bool,

    /// Disconnect clients after they dig a bomb (default)
    #[arg(long, overrides_with = "debug")]
    pub no_debug: bool,

    /// Address to listen on
    #[arg(long, env = "MINESWEEPER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "MINESWEEPER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Random board of SIZE_X columns by SIZE_Y rows
    #[arg(
        long,
        env = "MINESWEEPER_SIZE",
        value_name = "SIZE_X,SIZE_Y",
        value_parser = parse_size,
        conflicts_with = "file"
    )]
    pub size: Option<(usize, usize)>,

    /// Load the starting board from a board file
    #[arg(long, env = "MINESWEEPER_BOARD_FILE", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Chance of each cell of a random board holding a bomb
    #[arg(
        long,
        env = "MINESWEEPER_BOMB_PROBABILITY",
        default_value_t = RandomBombs::DEFAULT_PROBABILITY
    )]
    pub bomb_probability: f64,
}

fn parse_size(value: &str) -> std::result::Result<(usize, usize), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected SIZE_X,SIZE_Y, found {:?}", value))?;
    let x = x
        .trim()
        .parse()
        .map_err(|_| format!("unable to parse number {:?}", x))?;
    let y = y
        .trim()
        .parse()
        .map_err(|_| format!("unable to parse number {:?}", y))?;
    Ok((x, y))
}

/// Where the starting board comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardSource {
    Random {
        cols: usize,
        rows: usize,
        probability: f64,
    },
    File(PathBuf),
}

impl BoardSource {
    pub async fn build(&self) -> Result<Board> {
        match self {
            BoardSource::Random {
                cols,
                rows,
                probability,
            } => {
                info!(
                    "Generating random {}x{} board, bomb probability {}",
                    cols, rows, probability
                );
                Ok(Board::new(*rows, *cols, RandomBombs::new(*probability)))
            }
            BoardSource::File(path) => Ok(BoardLayout::load(path).await?.to_board()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub debug: bool,
    pub board: BoardSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            debug: false,
            board: BoardSource::Random {
                cols: DEFAULT_SIZE,
                rows: DEFAULT_SIZE,
                probability: RandomBombs::DEFAULT_PROBABILITY,
            },
        }
    }
}

impl TryFrom<Cli> for ServerConfig {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        if !(0.0..=1.0).contains(&cli.bomb_probability) {
            return Err(Error::InvalidConfig(format!(
                "bomb probability {} is not between 0 and 1",
                cli.bomb_probability
            )));
        }

        let board = match (cli.file, cli.size) {
            (Some(path), _) => BoardSource::File(path),
            (None, Some((cols, rows))) if cols == 0 || rows == 0 => {
                return Err(Error::InvalidConfig(format!(
                    "board size {},{} must be positive",
                    cols, rows
                )));
            }
            (None, Some((cols, rows))) => BoardSource::Random {
                cols,
                rows,
                probability: cli.bomb_probability,
            },
            (None, None) => BoardSource::Random {
                cols: DEFAULT_SIZE,
                rows: DEFAULT_SIZE,
                probability: cli.bomb_probability,
            },
        };

        Ok(Self {
            addr: SocketAddr::new(cli.host, cli.port),
            debug: cli.debug && !cli.no_debug,
            board,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Result<ServerConfig> {
        let cli = Cli::try_parse_from(std::iter::once("minesweeper-server").chain(args.iter().copied()))
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        ServerConfig::try_from(cli)
    }

    #[test]
    fn defaults() {
        assert_eq!(config(&[]).unwrap(), ServerConfig::default());
    }

    #[test]
    fn size_is_columns_then_rows() {
        let config = config(&["--size", "42,58", "--port", "1234", "--debug"]).unwrap();
        assert_eq!(config.addr.port(), 1234);
        assert!(config.debug);
        assert_eq!(
            config.board,
            BoardSource::Random {
                cols: 42,
                rows: 58,
                probability: RandomBombs::DEFAULT_PROBABILITY,
            }
        );
    }

    #[test]
    fn last_debug_flag_wins() {
        assert!(!config(&["--debug", "--no-debug"]).unwrap().debug);
        assert!(config(&["--no-debug", "--debug"]).unwrap().debug);
    }

    #[test]
    fn file_source() {
        let config = config(&["--file", "boards/board_file_5"]).unwrap();
        assert_eq!(config.board, BoardSource::File(PathBuf::from("boards/board_file_5")));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(config(&["--size", "0,5"]).is_err());
        assert!(config(&["--size", "5"]).is_err());
        assert!(config(&["--size", "5,5", "--file", "board"]).is_err());
        assert!(config(&["--port", "65536"]).is_err());
        assert!(config(&["--bomb-probability", "1.5"]).is_err());
        assert!(config(&["--frobnicate"]).is_err());
    }

    #[tokio::test]
    async fn builds_random_board() {
        let source = BoardSource::Random {
            cols: 3,
            rows: 2,
            probability: 0.0,
        };
        let board = source.build().await.unwrap();
        assert_eq!((board.rows(), board.cols()), (2, 3));
        assert!(!board.dig(0, 0).await);
    }
}
