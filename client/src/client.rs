use minesweeper_common::{
    models::{BoardView, Pos},
    protocol::{BOOM, ClientMessage, HELP_TEXT, Welcome},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpStream, ToSocketAddrs,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};
use tracing::{debug, info};

use crate::Result;

/// Result of a `dig` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigResult {
    Boom,
    Board(BoardView),
}

/// Line-protocol client for a minesweeper server.
pub struct MinesweeperClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    welcome: Welcome,
}

impl MinesweeperClient {
    /// Connect and read the server's welcome line
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        let line = lines
            .next_line()
            .await?
            .ok_or("Connection closed before welcome message")?;
        let welcome: Welcome = line
            .parse()
            .map_err(|_| format!("Unexpected welcome message: {}", line))?;
        info!(
            "Connected to {}x{} board with {} players",
            welcome.cols, welcome.rows, welcome.players
        );

        Ok(Self {
            lines,
            writer,
            welcome,
        })
    }

    pub fn welcome(&self) -> Welcome {
        self.welcome
    }

    /// Send a raw line; a newline is appended
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        debug!("Sending: {}", line);
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await?;
        Ok(())
    }

    pub async fn send(&mut self, message: ClientMessage) -> Result<()> {
        self.send_line(&message.to_string()).await
    }

    /// Read one reply line. Returns None once the server has closed the connection
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    async fn expect_line(&mut self) -> Result<String> {
        Ok(self
            .read_line()
            .await?
            .ok_or("Connection closed while waiting for a reply")?)
    }

    async fn read_board(&mut self, first: String) -> Result<BoardView> {
        let mut rows = vec![first];
        while rows.len() < self.welcome.rows {
            rows.push(self.expect_line().await?);
        }

        BoardView::parse(rows.iter().map(String::as_str))
            .ok_or_else(|| format!("Malformed board snapshot: {:?}", rows).into())
    }

    pub async fn look(&mut self) -> Result<BoardView> {
        self.send(ClientMessage::Look).await?;
        let first = self.expect_line().await?;
        self.read_board(first).await
    }

    pub async fn dig(&mut self, pos: Pos) -> Result<DigResult> {
        self.send(ClientMessage::Dig { pos }).await?;
        let first = self.expect_line().await?;
        if first == BOOM {
            return Ok(DigResult::Boom);
        }
        Ok(DigResult::Board(self.read_board(first).await?))
    }

    pub async fn flag(&mut self, pos: Pos) -> Result<BoardView> {
        self.send(ClientMessage::Flag { pos }).await?;
        let first = self.expect_line().await?;
        self.read_board(first).await
    }

    pub async fn deflag(&mut self, pos: Pos) -> Result<BoardView> {
        self.send(ClientMessage::Deflag { pos }).await?;
        let first = self.expect_line().await?;
        self.read_board(first).await
    }

    pub async fn help(&mut self) -> Result<String> {
        self.send(ClientMessage::Help).await?;
        let mut lines = Vec::new();
        for _ in HELP_TEXT.lines() {
            lines.push(self.expect_line().await?);
        }
        Ok(lines.join("\n"))
    }

    /// Say goodbye and wait for the server to hang up
    pub async fn bye(mut self) -> Result<()> {
        self.send(ClientMessage::Bye).await?;
        while let Some(line) = self.read_line().await? {
            debug!("Ignoring line after bye: {}", line);
        }
        Ok(())
    }
}
