//! Sampled visible window

use serde::{Deserialize, Serialize};

use crate::paytable::Payline;
use crate::symbols::SymbolId;

/// Zero-based grid position as `(reel, row)`
pub type Cell = (usize, usize);

/// Visible symbols per reel plus the strip offset each reel stopped at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Symbols per reel, top row first
    pub reels: Vec<Vec<SymbolId>>,
    /// Sampled strip offset per reel (the literal reel stop)
    #[serde(default)]
    pub reel_positions: Vec<usize>,
}

impl Grid {
    pub fn new(reels: Vec<Vec<SymbolId>>, reel_positions: Vec<usize>) -> Self {
        Self {
            reels,
            reel_positions,
        }
    }

    /// Grid built from literal columns (offsets unknown, reported as 0)
    pub fn from_columns(reels: Vec<Vec<SymbolId>>) -> Self {
        let reel_positions = vec![0; reels.len()];
        Self {
            reels,
            reel_positions,
        }
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    /// Visible rows on the tallest reel
    pub fn rows(&self) -> usize {
        self.reels.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn symbol(&self, (reel, row): Cell) -> Option<SymbolId> {
        self.reels.get(reel).and_then(|r| r.get(row)).copied()
    }

    /// Every cell holding `symbol`, reel by reel
    pub fn cells_of(&self, symbol: SymbolId) -> Vec<Cell> {
        self.reels
            .iter()
            .enumerate()
            .flat_map(|(reel, column)| {
                column
                    .iter()
                    .enumerate()
                    .filter(move |&(_, &s)| s == symbol)
                    .map(move |(row, _)| (reel, row))
            })
            .collect()
    }

    pub fn count(&self, symbol: SymbolId) -> usize {
        self.reels.iter().flatten().filter(|&&s| s == symbol).count()
    }

    /// Symbols along a payline; stops early if the line leaves the grid
    pub fn line_symbols(&self, payline: &Payline) -> Vec<(Cell, SymbolId)> {
        payline
            .cells()
            .map_while(|cell| self.symbol(cell).map(|s| (cell, s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_and_count() {
        let grid = Grid::from_columns(vec![vec![1, 7, 3], vec![7, 5, 6], vec![7, 8, 7]]);
        assert_eq!(grid.count(7), 4);
        assert_eq!(grid.cells_of(7), vec![(0, 1), (1, 0), (2, 0), (2, 2)]);
        assert_eq!(grid.symbol((1, 2)), Some(6));
        assert_eq!(grid.symbol((3, 0)), None);
        assert_eq!(grid.rows(), 3);
    }

    #[test]
    fn test_line_symbols() {
        let grid = Grid::from_columns(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        let line = Payline::new(vec![1, 2, 3]);
        let symbols: Vec<SymbolId> = grid.line_symbols(&line).into_iter().map(|(_, s)| s).collect();
        assert_eq!(symbols, vec![1, 5, 9]);
    }
}
