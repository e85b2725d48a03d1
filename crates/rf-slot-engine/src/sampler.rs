//! Reel sampler
//!
//! Two modes: a uniform stop per reel, or a scatter-biased draw that parks a
//! scatter inside the window on as many reels as requested. The biased draw
//! can still come up short (too few reels carry scatters); the outcome loop
//! rejects such grids and samples again.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::reels::ReelStrip;
use crate::symbols::SymbolId;

/// How reel stops are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    /// Independent uniform stop on every reel
    Uniform,
    /// Land `min_scatters` scatters on distinct reels where the strips allow it
    ScatterBiased {
        scatter: SymbolId,
        min_scatters: usize,
    },
}

/// Draws visible windows from a validated strip set
#[derive(Debug, Clone, Copy)]
pub struct ReelSampler<'a> {
    strips: &'a [ReelStrip],
    rows: usize,
}

impl<'a> ReelSampler<'a> {
    /// Validate the strips once; sampling itself cannot fail afterwards
    pub fn new(strips: &'a [ReelStrip], rows: usize) -> Result<Self, ConfigError> {
        for (reel, strip) in strips.iter().enumerate() {
            strip.validate(reel, rows)?;
        }
        Ok(Self { strips, rows })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn reel_count(&self) -> usize {
        self.strips.len()
    }

    /// Sample a fresh grid
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, mode: SampleMode) -> Grid {
        let mut offsets: Vec<usize> = (0..self.strips.len())
            .map(|reel| self.uniform_offset(rng, reel))
            .collect();

        if let SampleMode::ScatterBiased {
            scatter,
            min_scatters,
        } = mode
        {
            let mut reels: Vec<usize> = (0..self.strips.len()).collect();
            reels.shuffle(rng);

            let mut placed = 0;
            for reel in reels {
                if placed >= min_scatters {
                    break;
                }
                // Reels without a scatter keep their uniform stop
                if let Some(offset) = self.scatter_offset(rng, reel, scatter) {
                    offsets[reel] = offset;
                    placed += 1;
                }
            }
        }

        let reels = offsets
            .iter()
            .zip(self.strips)
            .map(|(&offset, strip)| strip.window(offset, self.rows))
            .collect();
        Grid::new(reels, offsets)
    }

    /// A single random symbol from a reel's strip, used to backfill cascades
    pub fn draw_symbol<R: Rng + ?Sized>(&self, rng: &mut R, reel: usize) -> Option<SymbolId> {
        let strip = self.strips.get(reel)?;
        strip.symbol_at(rng.random_range(0..strip.len()))
    }

    /// Uniform offset in `[0, len - rows]`
    fn uniform_offset<R: Rng + ?Sized>(&self, rng: &mut R, reel: usize) -> usize {
        let len = self.strips[reel].len();
        rng.random_range(0..=len - self.rows)
    }

    /// Offset that shows one of the strip's scatters on a random row
    fn scatter_offset<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        reel: usize,
        scatter: SymbolId,
    ) -> Option<usize> {
        let strip = &self.strips[reel];
        let positions = strip.positions_of(scatter);
        let &position = positions.choose(rng)?;
        let row = rng.random_range(0..self.rows);
        Some((position + strip.len() - row) % strip.len())
    }
}
