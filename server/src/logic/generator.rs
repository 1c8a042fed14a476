use rand::Rng;

/// Decides whether the cell at `(row, col)` starts with a bomb.
///
/// A board calls its generator exactly once per cell while it is being built
/// and drops it afterwards.
pub trait BombGenerator {
    fn generate(&self, row: usize, col: usize) -> bool;
}

impl<F> BombGenerator for F
where
    F: Fn(usize, usize) -> bool,
{
    fn generate(&self, row: usize, col: usize) -> bool {
        self(row, col)
    }
}

/// Places a bomb in each cell independently with the given probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomBombs {
    probability: f64,
}

impl RandomBombs {
    pub const DEFAULT_PROBABILITY: f64 = 0.25;

    pub fn new(probability: f64) -> Self {
        if probability.is_nan() {
            return Self::default();
        }
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomBombs {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROBABILITY)
    }
}

impl BombGenerator for RandomBombs {
    fn generate(&self, _row: usize, _col: usize) -> bool {
        rand::rng().random_bool(self.probability)
    }
}

pub fn all_bombs(_row: usize, _col: usize) -> bool {
    true
}

pub fn no_bombs(_row: usize, _col: usize) -> bool {
    false
}
