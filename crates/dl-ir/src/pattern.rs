//! Hit symbols and pattern grids.

use alloc::vec::Vec;
use thiserror::Error;

/// Gain added per emphasis level.
pub const EMPHASIS_STEP: u16 = 12;

/// Highest emphasis level (symbol `'9'`).
pub const MAX_LEVEL: u8 = 8;

/// One cell of a pattern grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hit {
    /// No trigger
    #[default]
    Rest,
    /// Trigger with emphasis level 0-8 (symbols `'1'`-`'9'`)
    Strike(u8),
}

impl Hit {
    /// Decode a grid symbol. Returns `None` for anything outside the alphabet.
    pub const fn from_symbol(symbol: u8) -> Option<Self> {
        match symbol {
            b' ' => Some(Hit::Rest),
            b'1'..=b'9' => Some(Hit::Strike(symbol - b'1')),
            _ => None,
        }
    }

    /// Encode back to the grid symbol.
    pub const fn symbol(self) -> char {
        match self {
            Hit::Rest => ' ',
            Hit::Strike(level) => (b'1' + level) as char,
        }
    }

    /// Transient gain for this hit, or `None` for a rest.
    pub const fn emphasis(self) -> Option<u16> {
        match self {
            Hit::Rest => None,
            Hit::Strike(level) => Some(level as u16 * EMPHASIS_STEP),
        }
    }
}

/// Errors raised while loading a grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern has no lanes")]
    NoLanes,
    #[error("lane {lane} has {found} ticks, expected {expected}")]
    RaggedLane {
        lane: usize,
        found: usize,
        expected: usize,
    },
    #[error("invalid symbol {symbol:?} at lane {lane}, tick {tick}")]
    InvalidSymbol { lane: usize, tick: usize, symbol: char },
    #[error("bar of {0} ticks exceeds {max}", max = u16::MAX)]
    TooLong(usize),
    #[error("{0} lanes exceed {max}", max = u8::MAX)]
    TooManyLanes(usize),
}

/// One bar of hits: a lane per voice, a column per tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    /// Ticks in the bar
    pub ticks: u16,
    /// Number of lanes (one per voice)
    pub lanes: u8,
    /// Grid data, stored lane-major: data[lane * ticks + tick]
    data: Vec<Hit>,
}

impl Pattern {
    /// Create an all-rest pattern.
    pub fn new(lanes: u8, ticks: u16) -> Self {
        Self {
            ticks,
            lanes,
            data: alloc::vec![Hit::Rest; lanes as usize * ticks as usize],
        }
    }

    /// Parse a grid from one text row per lane.
    ///
    /// Every row must have the same length; that length is the bar length.
    pub fn from_rows(rows: &[&str]) -> Result<Self, PatternError> {
        let first = rows.first().ok_or(PatternError::NoLanes)?;
        let ticks = first.len();
        let tick_count = u16::try_from(ticks).map_err(|_| PatternError::TooLong(ticks))?;
        let lane_count = u8::try_from(rows.len()).map_err(|_| PatternError::TooManyLanes(rows.len()))?;
        let mut data = Vec::with_capacity(rows.len() * ticks);

        for (lane, row) in rows.iter().enumerate() {
            if row.len() != ticks {
                return Err(PatternError::RaggedLane {
                    lane,
                    found: row.len(),
                    expected: ticks,
                });
            }
            for (tick, &byte) in row.as_bytes().iter().enumerate() {
                let hit = Hit::from_symbol(byte).ok_or(PatternError::InvalidSymbol {
                    lane,
                    tick,
                    symbol: byte as char,
                })?;
                data.push(hit);
            }
        }

        Ok(Self {
            ticks: tick_count,
            lanes: lane_count,
            data,
        })
    }

    /// Hit at (lane, tick).
    #[inline]
    pub fn hit(&self, lane: usize, tick: usize) -> Hit {
        debug_assert!(lane < self.lanes as usize);
        debug_assert!(tick < self.ticks as usize);
        self.data[lane * self.ticks as usize + tick]
    }

    pub fn set(&mut self, lane: usize, tick: usize, hit: Hit) {
        let ticks = self.ticks as usize;
        self.data[lane * ticks + tick] = hit;
    }

    /// All hits of one lane.
    pub fn lane(&self, lane: usize) -> &[Hit] {
        let start = lane * self.ticks as usize;
        &self.data[start..start + self.ticks as usize]
    }

    /// Number of strikes in a lane.
    pub fn strikes(&self, lane: usize) -> usize {
        self.lane(lane).iter().filter(|h| **h != Hit::Rest).count()
    }
}
