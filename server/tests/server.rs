use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

use minesweeper_client::{
    BOOM, BoardView, Cell, DigResult, HELP_TEXT, INVALID_COMMAND, MinesweeperClient, Pos,
};
use minesweeper_server::{
    board_file::BoardLayout,
    logic::{Board, all_bombs},
    server::{MinesweeperServer, Players},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
    time::{sleep, timeout},
};

struct TestServer {
    addr: SocketAddr,
    board: Arc<Board>,
    players: Players,
}

async fn start(board: Board, debug: bool) -> TestServer {
    let server = MinesweeperServer::bind("127.0.0.1:0", board, debug)
        .await
        .unwrap();
    let test_server = TestServer {
        addr: server.local_addr().unwrap(),
        board: server.board(),
        players: server.players(),
    };
    tokio::spawn(server.serve());
    test_server
}

async fn wait_for_players(players: &Players, expected: usize) {
    timeout(Duration::from_secs(5), async {
        while players.len() != expected {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {} players, found {}", expected, players.len()));
}

fn rows(view: &BoardView) -> Vec<String> {
    view.to_string().lines().map(str::to_string).collect()
}

#[tokio::test]
async fn welcome_reports_board_and_players() {
    let server = start(Board::empty(4, 7), false).await;

    let first = MinesweeperClient::connect(server.addr).await.unwrap();
    assert_eq!(first.welcome().cols, 7);
    assert_eq!(first.welcome().rows, 4);
    assert_eq!(first.welcome().players, 1);

    let second = MinesweeperClient::connect(server.addr).await.unwrap();
    assert_eq!(second.welcome().players, 2);
    wait_for_players(&server.players, 2).await;

    first.bye().await.unwrap();
    wait_for_players(&server.players, 1).await;

    drop(second);
    wait_for_players(&server.players, 0).await;
}

#[tokio::test]
async fn board_file_session_in_debug_mode() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/boards/board_file_5");
    let layout = BoardLayout::load(&path).await.unwrap();
    let server = start(layout.to_board(), true).await;
    let mut client = MinesweeperClient::connect(server.addr).await.unwrap();

    let untouched = vec!["- - - - - - -".to_string(); 7];
    assert_eq!(rows(&client.look().await.unwrap()), untouched);

    let DigResult::Board(view) = client.dig(Pos::new(3, 1)).await.unwrap() else {
        panic!("expected a board");
    };
    let mut expected = untouched.clone();
    expected[1] = "- - - 1 - - -".to_string();
    assert_eq!(rows(&view), expected);

    assert_eq!(client.dig(Pos::new(4, 1)).await.unwrap(), DigResult::Boom);

    let blank = " ".repeat(13);
    let mut expected = vec![blank.clone(); 5];
    expected.push(format!("1 1{}", &blank[3..]));
    expected.push(format!("- 1{}", &blank[3..]));
    assert_eq!(rows(&client.look().await.unwrap()), expected);

    server.board.check_consistency().await.unwrap();
    client.bye().await.unwrap();
}

#[tokio::test]
async fn boom_disconnects_outside_debug_mode() {
    let server = start(Board::new(5, 5, all_bombs), false).await;
    let mut client = MinesweeperClient::connect(server.addr).await.unwrap();

    assert_eq!(client.dig(Pos::new(2, 2)).await.unwrap(), DigResult::Boom);
    assert_eq!(client.read_line().await.unwrap(), None);
    wait_for_players(&server.players, 0).await;

    let mut other = MinesweeperClient::connect(server.addr).await.unwrap();
    let view = other.look().await.unwrap();
    assert_eq!(view.get(Pos::new(2, 2)), Some(Cell::Revealed { adjacent: 8 }));
    server.board.check_consistency().await.unwrap();
}

#[tokio::test]
async fn clear_board_look_and_dig() {
    let server = start(Board::empty(3, 4), false).await;
    let mut client = MinesweeperClient::connect(server.addr).await.unwrap();

    assert_eq!(
        rows(&client.look().await.unwrap()),
        vec!["- - - -"; 3]
    );

    let DigResult::Board(view) = client.dig(Pos::new(0, 0)).await.unwrap() else {
        panic!("expected a board");
    };
    assert_eq!(rows(&view), vec!["       "; 3]);
}

#[tokio::test]
async fn flags_and_invalid_input() {
    let server = start(Board::empty(2, 3), false).await;
    let mut client = MinesweeperClient::connect(server.addr).await.unwrap();

    let view = client.flag(Pos::new(2, 1)).await.unwrap();
    assert_eq!(rows(&view), vec!["- - -", "- - F"]);

    for line in ["dance", "dig 1", "LOOK", "flag x y"] {
        client.send_line(line).await.unwrap();
        assert_eq!(client.read_line().await.unwrap().as_deref(), Some(INVALID_COMMAND));
    }

    let view = client.deflag(Pos::new(2, 1)).await.unwrap();
    assert_eq!(rows(&view), vec!["- - -", "- - -"]);

    let view = client.flag(Pos::new(-3, 99)).await.unwrap();
    assert_eq!(rows(&view), vec!["- - -", "- - -"]);

    assert_eq!(client.help().await.unwrap(), HELP_TEXT);
    client.bye().await.unwrap();
}

#[tokio::test]
async fn non_utf8_line_is_an_invalid_command() {
    let server = start(Board::empty(2, 3), false).await;
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    assert!(lines.next_line().await.unwrap().unwrap().starts_with("Welcome"));

    writer.write_all(b"dig \xff 0\n").await.unwrap();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some(INVALID_COMMAND));

    writer.write_all(b"look\n").await.unwrap();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("- - -"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("- - -"));

    writer.write_all(b"bye\n").await.unwrap();
    assert_eq!(lines.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn out_of_range_dig_replies_normally() {
    let server = start(Board::new(2, 2, all_bombs), false).await;
    let mut client = MinesweeperClient::connect(server.addr).await.unwrap();

    for pos in [Pos::new(-1, 0), Pos::new(0, 2), Pos::new(i64::MAX, i64::MIN)] {
        let result = client.dig(pos).await.unwrap();
        assert_ne!(result, DigResult::Boom);
    }
    client.send_line("dig 0 0").await.unwrap();
    assert_eq!(client.read_line().await.unwrap().as_deref(), Some(BOOM));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_players_share_one_board() {
    let server = start(
        Board::new(12, 12, |row: usize, col: usize| (row * 5 + col * 3) % 7 == 0),
        true,
    )
    .await;

    let tasks: Vec<_> = (0..6)
        .map(|player| {
            let addr = server.addr;
            tokio::spawn(async move {
                let mut client = MinesweeperClient::connect(addr).await.unwrap();
                let mut booms = 0usize;
                for i in 0..144i64 {
                    let cell = (i * (player + 1) * 5) % 144;
                    if client.dig(Pos::new(cell % 12, cell / 12)).await.unwrap() == DigResult::Boom {
                        booms += 1;
                    }
                }
                client.bye().await.unwrap();
                booms
            })
        })
        .collect();

    let mut booms = 0usize;
    for task in tasks {
        booms += task.await.unwrap();
    }

    let bombs = (0..12)
        .flat_map(|row| (0..12).map(move |col| (row, col)))
        .filter(|(row, col)| (row * 5 + col * 3) % 7 == 0)
        .count();
    assert!(booms <= bombs);
    server.board.check_consistency().await.unwrap();
    wait_for_players(&server.players, 0).await;
}
