//! Pixel Painter Battle - a local two-player grid-painting session.
//!
//! Self-contained turn-based logic: two cursors on a grid of cells, each
//! cell owned by at most one player, a fixed-frame countdown, and an
//! optional bonus cell worth extra points. The client draws the grid from
//! [`PainterSession::cells`] and feeds moves, paints and ticks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid grid side lengths.
pub const MIN_GRID_SIDE: u32 = 10;
pub const MAX_GRID_SIDE: u32 = 40;

/// Default match length in fixed frames (90 seconds at 60 Hz).
pub const DEFAULT_MATCH_FRAMES: u32 = 90 * 60;

/// Bonus cell spawn chance per frame and its lifetime in frames.
const BONUS_CHANCE: f64 = 0.005;
const BONUS_FRAMES: u32 = 180;
/// Points for claiming the bonus cell on top of the regular point.
const BONUS_POINTS: u32 = 3;

#[derive(Debug, Error)]
pub enum PainterConfigError {
    #[error("grid side must be between {MIN_GRID_SIDE} and {MAX_GRID_SIDE}, got {0}")]
    GridSide(u32),
    #[error("players must use distinct colors")]
    DuplicateColors,
}

/// Match settings, validated before a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PainterConfig {
    pub width: u32,
    pub height: u32,
    /// Draw colors for player 0 and player 1.
    pub player_colors: [[u8; 3]; 2],
    pub match_frames: u32,
    pub rng_seed: u64,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            player_colors: [[220, 60, 60], [60, 90, 220]],
            match_frames: DEFAULT_MATCH_FRAMES,
            rng_seed: 0x5041494E54,
        }
    }
}

impl PainterConfig {
    pub fn validate(&self) -> Result<(), PainterConfigError> {
        for side in [self.width, self.height] {
            if !(MIN_GRID_SIDE..=MAX_GRID_SIDE).contains(&side) {
                return Err(PainterConfigError::GridSide(side));
            }
        }
        if self.player_colors[0] == self.player_colors[1] {
            return Err(PainterConfigError::DuplicateColors);
        }
        Ok(())
    }
}

/// A bonus cell waiting to be claimed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BonusCell {
    pub x: u32,
    pub y: u32,
    pub frames_left: u32,
}

/// One running match.
#[derive(Debug, Clone)]
pub struct PainterSession {
    config: PainterConfig,
    /// Row-major cell ownership; `None` is unpainted.
    cells: Vec<Option<u8>>,
    /// Cursor positions for player 0 and player 1.
    cursors: [(u32, u32); 2],
    scores: [u32; 2],
    /// Whose turn it is to move and paint, 0 or 1.
    turn: u8,
    frames_remaining: u32,
    bonus: Option<BonusCell>,
    rng: StdRng,
}

impl PainterSession {
    /// Start a match. Player 0 opens in the top-left corner, player 1 in
    /// the bottom-right; player 0 moves first.
    pub fn new(config: PainterConfig) -> Result<Self, PainterConfigError> {
        config.validate()?;
        let cells = vec![None; (config.width * config.height) as usize];
        let cursors = [(0, 0), (config.width - 1, config.height - 1)];
        let rng = StdRng::seed_from_u64(config.rng_seed);
        let frames_remaining = config.match_frames;
        Ok(Self {
            config,
            cells,
            cursors,
            scores: [0, 0],
            turn: 0,
            frames_remaining,
            bonus: None,
            rng,
        })
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn turn(&self) -> u8 {
        self.turn
    }

    pub fn cursor(&self, player: u8) -> (u32, u32) {
        self.cursors[player as usize & 1]
    }

    pub fn frames_remaining(&self) -> u32 {
        self.frames_remaining
    }

    pub fn finished(&self) -> bool {
        self.frames_remaining == 0
    }

    pub fn bonus(&self) -> Option<BonusCell> {
        self.bonus
    }

    /// Owner of the cell at (x, y), if painted. Off-grid coordinates
    /// read as unpainted.
    pub fn cell(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.config.width || y >= self.config.height {
            return None;
        }
        self.cells[(y * self.config.width + x) as usize]
    }

    /// Row-major cell ownership for rendering.
    pub fn cells(&self) -> &[Option<u8>] {
        &self.cells
    }

    /// Move the given player's cursor by one step, clamped to the grid.
    /// Ignored when it is not that player's turn or the match is over.
    pub fn move_cursor(&mut self, player: u8, dx: i32, dy: i32) {
        if self.finished() || player != self.turn {
            return;
        }
        let (x, y) = self.cursors[player as usize];
        let nx = (x as i32 + dx.signum()).clamp(0, self.config.width as i32 - 1) as u32;
        let ny = (y as i32 + dy.signum()).clamp(0, self.config.height as i32 - 1) as u32;
        self.cursors[player as usize] = (nx, ny);
    }

    /// Paint the cell under the given player's cursor and pass the turn.
    /// Claiming any cell not already your own scores a point; repainting
    /// your own cell scores nothing (but still spends the turn). The
    /// previous owner keeps their points. A live bonus cell pays extra.
    pub fn paint(&mut self, player: u8) {
        if self.finished() || player != self.turn {
            return;
        }
        let (x, y) = self.cursors[player as usize];
        let index = (y * self.config.width + x) as usize;

        if self.cells[index] != Some(player) {
            self.cells[index] = Some(player);
            self.scores[player as usize] += 1;

            if let Some(bonus) = self.bonus {
                if bonus.x == x && bonus.y == y {
                    self.scores[player as usize] += BONUS_POINTS;
                    self.bonus = None;
                }
            }
        }

        self.turn = 1 - self.turn;
    }

    /// Advance one fixed frame: count the clock down, age the bonus cell,
    /// maybe spawn a fresh one on an unpainted cell.
    pub fn tick(&mut self) {
        if self.finished() {
            return;
        }
        self.frames_remaining -= 1;

        if let Some(bonus) = self.bonus.as_mut() {
            bonus.frames_left -= 1;
            if bonus.frames_left == 0 {
                self.bonus = None;
            }
        } else if self.rng.gen_bool(BONUS_CHANCE) {
            let x = self.rng.gen_range(0..self.config.width);
            let y = self.rng.gen_range(0..self.config.height);
            if self.cell(x, y).is_none() {
                self.bonus = Some(BonusCell {
                    x,
                    y,
                    frames_left: BONUS_FRAMES,
                });
            }
        }
    }

    /// The winning player once the match is over. `None` while the clock
    /// runs or on a tie.
    pub fn winner(&self) -> Option<u8> {
        if !self.finished() || self.scores[0] == self.scores[1] {
            return None;
        }
        Some(if self.scores[0] > self.scores[1] { 0 } else { 1 })
    }
}
