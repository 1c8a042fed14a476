use minesweeper_common::models;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Untouched,
    Flagged,
    Revealed(u8),
}

#[derive(Debug)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub bomb: bool,
    pub state: CellState,
}

impl Cell {
    pub fn new(row: usize, col: usize, bomb: bool) -> Self {
        Self {
            row,
            col,
            bomb,
            state: CellState::Untouched,
        }
    }

    pub fn is_untouched(&self) -> bool {
        self.state == CellState::Untouched
    }
}

/// The grid itself, stored row-major. Only ever touched through a `Board`,
/// which owns the lock around it.
#[derive(Debug)]
pub struct Field {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Cell>,
}

impl From<&Cell> for models::Cell {
    fn from(value: &Cell) -> Self {
        match value.state {
            CellState::Untouched => Self::Untouched,
            CellState::Flagged => Self::Flagged,
            CellState::Revealed(adjacent) => Self::Revealed { adjacent },
        }
    }
}
