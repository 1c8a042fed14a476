pub mod generator;

use minesweeper_common::models::{self, BoardView};
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace, warn};

use crate::{
    data::{Cell, CellState, Field},
    error::{Error, Result},
};

pub use generator::{BombGenerator, RandomBombs, all_bombs, no_bombs};

const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn generate_cells(rows: usize, cols: usize, generator: &impl BombGenerator) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            cells.push(Cell::new(row, col, generator.generate(row, col)));
        }
    }
    cells
}

impl Field {
    fn new(rows: usize, cols: usize, generator: &impl BombGenerator) -> Self {
        Self {
            rows,
            cols,
            cells: generate_cells(rows, cols, generator),
        }
    }

    fn index(&self, row: i64, col: i64) -> Option<usize> {
        let row = usize::try_from(row).ok().filter(|row| *row < self.rows)?;
        let col = usize::try_from(col).ok().filter(|col| *col < self.cols)?;
        Some(row * self.cols + col)
    }

    fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let row = (index / self.cols) as i64;
        let col = (index % self.cols) as i64;
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(move |(dr, dc)| self.index(row + dr, col + dc))
    }

    fn adjacent_bombs(&self, index: usize) -> u8 {
        self.neighbours(index)
            .filter(|neighbour| self.cells[*neighbour].bomb)
            .count() as u8
    }

    fn dig(&mut self, index: usize) -> bool {
        if !self.cells[index].is_untouched() {
            return false;
        }

        let had_bomb = self.cells[index].bomb;
        if had_bomb {
            self.cells[index].bomb = false;
            let neighbours: Vec<usize> = self.neighbours(index).collect();
            for neighbour in neighbours {
                if let CellState::Revealed(count) = &mut self.cells[neighbour].state {
                    *count -= 1;
                }
            }
        }

        let revealed = self.reveal(index);
        trace!("Revealed {} cells", revealed);
        had_bomb
    }

    /// Depth-first flood fill from `start`. A cell's `Untouched` state is what
    /// marks it unvisited, so each cell is revealed at most once and flagged
    /// cells are never entered.
    fn reveal(&mut self, start: usize) -> usize {
        let mut stack = vec![start];
        let mut revealed = 0;

        while let Some(index) = stack.pop() {
            if !self.cells[index].is_untouched() {
                continue;
            }

            let adjacent = self.adjacent_bombs(index);
            self.cells[index].state = CellState::Revealed(adjacent);
            revealed += 1;

            if adjacent == 0 {
                stack.extend(
                    self.neighbours(index)
                        .filter(|neighbour| self.cells[*neighbour].is_untouched()),
                );
            }
        }

        revealed
    }

    fn view(&self) -> BoardView {
        if self.cols == 0 {
            return BoardView { rows: Vec::new() };
        }
        BoardView {
            rows: self
                .cells
                .chunks(self.cols)
                .map(|row| row.iter().map(models::Cell::from).collect())
                .collect(),
        }
    }

    fn check_consistency(&self) -> Result<()> {
        for (index, cell) in self.cells.iter().enumerate() {
            if let CellState::Revealed(shown) = cell.state {
                let actual = self.adjacent_bombs(index);
                if shown != actual {
                    return Err(Error::Inconsistent {
                        row: cell.row,
                        col: cell.col,
                        shown,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}

/// The shared minesweeper grid.
///
/// Every operation that reads or writes cells takes one board-wide lock, so
/// concurrent callers observe the operations as if they ran one at a time.
/// Coordinates are `(row, col)`; anything outside the grid is ignored.
#[derive(Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    field: Mutex<Field>,
}

impl Board {
    #[instrument(level = "trace", skip(generator))]
    pub fn new(rows: usize, cols: usize, generator: impl BombGenerator) -> Self {
        let field = Field::new(rows, cols, &generator);
        debug!(
            "Created {}x{} board with {} bombs",
            rows,
            cols,
            field.cells.iter().filter(|cell| cell.bomb).count()
        );
        Self {
            rows,
            cols,
            field: Mutex::new(field),
        }
    }

    pub fn empty(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, no_bombs)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Digs at `(row, col)` and returns whether a bomb was there.
    ///
    /// Only untouched cells can be dug. A dug bomb is removed and the counts
    /// of already revealed neighbours drop accordingly; the cell is then
    /// revealed, flooding outwards when it has no neighbouring bombs.
    #[instrument(level = "trace", skip(self))]
    pub async fn dig(&self, row: i64, col: i64) -> bool {
        let mut field = self.field.lock().await;
        let Some(index) = field.index(row, col) else {
            debug!("Ignoring dig outside the board at ({}, {})", row, col);
            return false;
        };

        let had_bomb = field.dig(index);
        if had_bomb {
            warn!("Bomb dug at ({}, {})", row, col);
        }
        debug_assert!(field.check_consistency().is_ok());
        had_bomb
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn flag(&self, row: i64, col: i64) {
        let mut field = self.field.lock().await;
        if let Some(index) = field.index(row, col)
            && field.cells[index].is_untouched()
        {
            field.cells[index].state = CellState::Flagged;
            trace!("Cell ({}, {}) flagged", row, col);
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn deflag(&self, row: i64, col: i64) {
        let mut field = self.field.lock().await;
        if let Some(index) = field.index(row, col)
            && field.cells[index].state == CellState::Flagged
        {
            field.cells[index].state = CellState::Untouched;
            trace!("Cell ({}, {}) deflagged", row, col);
        }
    }

    /// Snapshot of the board, one line per row with cells separated by a
    /// space: `-` untouched, `F` flagged, a blank for no neighbouring bombs,
    /// otherwise the count.
    pub async fn render(&self) -> String {
        self.field.lock().await.view().to_string()
    }

    pub async fn view(&self) -> BoardView {
        self.field.lock().await.view()
    }

    /// Verifies that every revealed count matches the bombs around it.
    pub async fn check_consistency(&self) -> Result<()> {
        self.field.lock().await.check_consistency()
    }
}
