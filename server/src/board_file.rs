//! Loading boards from their text description.
//!
//! The first line holds the number of rows and columns, each following line
//! one row of `0` (clear) and `1` (bomb) tokens:
//!
//! ```text
//! 2 3
//! 0 0 1
//! 1 0 0
//! ```

use std::{collections::HashSet, path::Path, str::FromStr};

use tracing::{info, instrument};

use crate::{
    error::{Error, Result},
    logic::{BombGenerator, Board},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    pub rows: usize,
    pub cols: usize,
    pub bombs: HashSet<(usize, usize)>,
}

fn invalid(line: usize, reason: impl Into<String>) -> Error {
    Error::BoardFile {
        line,
        reason: reason.into(),
    }
}

fn parse_dimension(token: &str, line: usize) -> Result<usize> {
    match token.parse::<usize>() {
        Ok(0) => Err(invalid(line, "board dimensions must be positive")),
        Ok(value) => Ok(value),
        Err(_) => Err(invalid(line, format!("expected a dimension, found {:?}", token))),
    }
}

impl BoardLayout {
    #[instrument(level = "trace")]
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|cause| Error::BoardFileUnreadable {
                path: path.to_path_buf(),
                cause,
            })?;
        let layout: Self = text.parse()?;
        info!(
            "Loaded {}x{} board with {} bombs from {}",
            layout.rows,
            layout.cols,
            layout.bombs.len(),
            path.display()
        );
        Ok(layout)
    }

    pub fn has_bomb(&self, row: usize, col: usize) -> bool {
        self.bombs.contains(&(row, col))
    }

    /// A generator that reproduces this layout.
    pub fn generator(&self) -> impl BombGenerator + '_ {
        move |row: usize, col: usize| self.has_bomb(row, col)
    }

    pub fn to_board(&self) -> Board {
        Board::new(self.rows, self.cols, self.generator())
    }
}

impl FromStr for BoardLayout {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

        let (number, header) = lines.next().ok_or_else(|| invalid(1, "missing board size"))?;
        let (rows, cols) = match header.split_whitespace().collect::<Vec<_>>().as_slice() {
            [rows, cols] => (parse_dimension(rows, number)?, parse_dimension(cols, number)?),
            _ => return Err(invalid(number, "expected \"ROWS COLS\"")),
        };

        let mut bombs = HashSet::new();
        for row in 0..rows {
            let (number, line) = lines
                .next()
                .ok_or_else(|| invalid(row + 2, format!("missing row {} of {}", row + 1, rows)))?;

            let values: Vec<&str> = line.split_whitespace().collect();
            if values.len() != cols {
                return Err(invalid(
                    number,
                    format!("expected {} values, found {}", cols, values.len()),
                ));
            }

            for (col, value) in values.into_iter().enumerate() {
                match value {
                    "0" => {}
                    "1" => {
                        bombs.insert((row, col));
                    }
                    other => {
                        return Err(invalid(number, format!("expected 0 or 1, found {:?}", other)));
                    }
                }
            }
        }

        if let Some((number, _)) = lines.find(|(_, line)| !line.trim().is_empty()) {
            return Err(invalid(number, format!("more than {} rows", rows)));
        }

        Ok(Self { rows, cols, bombs })
    }
}
