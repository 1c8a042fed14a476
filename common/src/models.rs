use std::fmt;

/// A position as clients address it: `x` is the column, `y` is the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i64,
    pub y: i64,
}

impl Pos {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// What a player can see of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Untouched,
    Flagged,
    Revealed { adjacent: u8 },
}

impl Cell {
    pub const UNTOUCHED: char = '-';
    pub const FLAGGED: char = 'F';
    pub const EMPTY: char = ' ';

    /// The single character used for this cell in a board snapshot.
    /// A cell has at most eight neighbours, so larger counts render as `8`.
    pub fn symbol(self) -> char {
        match self {
            Cell::Untouched => Self::UNTOUCHED,
            Cell::Flagged => Self::FLAGGED,
            Cell::Revealed { adjacent: 0 } => Self::EMPTY,
            Cell::Revealed { adjacent } => {
                char::from_digit(u32::from(adjacent.min(8)), 10).unwrap_or(Self::UNTOUCHED)
            }
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            Self::UNTOUCHED => Some(Cell::Untouched),
            Self::FLAGGED => Some(Cell::Flagged),
            Self::EMPTY => Some(Cell::Revealed { adjacent: 0 }),
            '1'..='8' => Some(Cell::Revealed {
                adjacent: symbol as u8 - b'0',
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A parsed board snapshot, indexed `[row][col]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardView {
    pub rows: Vec<Vec<Cell>>,
}

impl BoardView {
    /// Parses one snapshot line, e.g. `"- F 1  "`.
    pub fn parse_row(line: &str) -> Option<Vec<Cell>> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() || chars.len() % 2 == 0 {
            return None;
        }

        let mut row = Vec::with_capacity(chars.len() / 2 + 1);
        for (i, symbol) in chars.into_iter().enumerate() {
            if i % 2 == 1 {
                if symbol != ' ' {
                    return None;
                }
                continue;
            }
            row.push(Cell::from_symbol(symbol)?);
        }
        Some(row)
    }

    /// Parses a full snapshot; every row must have the same width.
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let rows = lines
            .into_iter()
            .map(Self::parse_row)
            .collect::<Option<Vec<_>>>()?;

        let width = rows.first()?.len();
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self { rows })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Looks a cell up by protocol position (`x` column, `y` row).
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        let row = usize::try_from(pos.y).ok()?;
        let col = usize::try_from(pos.x).ok()?;
        self.rows.get(row)?.get(col).copied()
    }

    pub fn count(&self, predicate: impl Fn(Cell) -> bool) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| predicate(**cell))
            .count()
    }
}

impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", cell)?;
            }
        }
        Ok(())
    }
}
