use std::{net::SocketAddr, sync::Arc};

use dashmap::DashMap;
use minesweeper_common::protocol::Welcome;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream, ToSocketAddrs},
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::ServerConfig,
    error::Result,
    logic::Board,
    session::handle_request,
};

/// Live sessions, keyed by session id.
pub type Players = Arc<DashMap<Uuid, SocketAddr>>;

/// Removes a session from the player registry however its task ends.
struct PlayerGuard {
    players: Players,
    id: Uuid,
}

impl Drop for PlayerGuard {
    fn drop(&mut self) {
        if let Some((_, addr)) = self.players.remove(&self.id) {
            info!(
                "Player {} ({}) left, remaining players: {}",
                self.id,
                addr,
                self.players.len()
            );
        } else {
            warn!("Attempted to remove unknown player: {}", self.id);
        }
    }
}

pub struct MinesweeperServer {
    listener: TcpListener,
    board: Arc<Board>,
    players: Players,
    debug: bool,
}

impl MinesweeperServer {
    #[instrument(level = "trace", skip(addr, board))]
    pub async fn bind(addr: impl ToSocketAddrs, board: Board, debug_mode: bool) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(
            "Listening on {} with a {}x{} board{}",
            listener.local_addr()?,
            board.cols(),
            board.rows(),
            if debug_mode { " (debug mode)" } else { "" }
        );

        Ok(Self {
            listener,
            board: Arc::new(board),
            players: Arc::new(DashMap::new()),
            debug: debug_mode,
        })
    }

    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let board = config.board.build().await?;
        Self::bind(config.addr, board, config.debug).await
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn board(&self) -> Arc<Board> {
        self.board.clone()
    }

    pub fn players(&self) -> Players {
        self.players.clone()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Accepts connections until the listener fails. Failures inside a
    /// session only end that session.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    return Err(e.into());
                }
            };

            let id = Uuid::new_v4();
            self.players.insert(id, addr);
            let players = self.players.len();
            info!(
                "Player {} connected from {}, total players: {}",
                id, addr, players
            );

            let guard = PlayerGuard {
                players: self.players.clone(),
                id,
            };
            let board = self.board.clone();
            let debug_mode = self.debug;

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, &board, players, debug_mode).await {
                    warn!("Connection error for player {}: {}", guard.id, e);
                }
                drop(guard);
            });
        }
    }
}

#[instrument(level = "trace", skip(stream, board))]
async fn handle_connection(
    mut stream: TcpStream,
    board: &Board,
    players: usize,
    debug_mode: bool,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    let welcome = Welcome {
        cols: board.cols(),
        rows: board.rows(),
        players,
    };
    writer.write_all(format!("{}\n", welcome).as_bytes()).await?;

    while let Some(line) = read_request(&mut reader, &mut buf).await? {
        let outcome = handle_request(board, &line, debug_mode).await;
        if let Some(reply) = outcome.reply() {
            writer.write_all(format!("{}\n", reply).as_bytes()).await?;
        }
        if outcome.closes() {
            debug!("Closing session after {:?}", line);
            break;
        }
    }

    writer.shutdown().await
}

/// Reads one request line without its terminator. Bytes that are not valid
/// UTF-8 are replaced so the line still reaches the parser. Returns None at EOF.
async fn read_request<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}
