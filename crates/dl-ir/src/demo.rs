//! The built-in song: three grids over a ten-bar loop at 155 BPM.

use crate::kit::KIT_NAMES;
use crate::pattern::{Pattern, PatternError};
use crate::song::{Song, VoiceSettings};

pub const DEMO_BPM: u16 = 155;
pub const DEMO_BEATS_PER_BAR: u8 = 4;
pub const DEMO_TICKS_PER_BAR: u16 = 72;

// kick, clap, snare, hihat, perc, kick (quiet, panned left)
const VOICES: [VoiceSettings; 6] = [
    VoiceSettings::new(16, 192, 0),
    VoiceSettings::new(8, 0, 1),
    VoiceSettings::new(16, 40, 2),
    VoiceSettings::new(18, 80, 3),
    VoiceSettings::new(28, 30, 4),
    VoiceSettings::new(4, 30, 0),
];

#[rustfmt::skip]
const GRIDS: [[&str; 6]; 3] = [
    [
    //"012345678901234567890123456789012345678901234567890123456789012345678901"
      "1        1                     1    1        1                          ",
      "                                                                        ",
      "                  1                                   1                 ",
      "                                                                        ",
      "1        1        1        1        1        1        1        1        ",
      "                                                                        ",
    ],
    [
      "9                                   1                                   ",
      "                                                                        ",
      "4        1        1        1        3        1        1        1        ",
      "                                                                        ",
      "                                                                        ",
      "                                                                        ",
    ],
    [
      "9                                   1                                   ",
      "         1                 1                 1                 1        ",
      "1                 1                 1                 1                 ",
      "5        1        1        1        1        1                 1        ",
      "5                          1                 1                          ",
      "         1                          4                          1        ",
    ],
];

const ORDER: [u8; 10] = [0, 0, 0, 2, 2, 2, 2, 2, 1, 0];

/// Build the built-in song. Voice sample indices refer to [`KIT_NAMES`].
pub fn demo_song() -> Result<Song, PatternError> {
    debug_assert!(VOICES.iter().all(|v| v.sample.map_or(true, |s| (s as usize) < KIT_NAMES.len())));

    let mut song = Song::new("drummer", DEMO_BPM, DEMO_BEATS_PER_BAR, DEMO_TICKS_PER_BAR);
    song.voices.extend_from_slice(&VOICES);
    for rows in &GRIDS {
        song.add_pattern(Pattern::from_rows(rows)?);
    }
    song.order.extend_from_slice(&ORDER);
    Ok(song)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::drum_kit;
    use crate::pattern::Hit;

    #[test]
    fn demo_song_validates_against_kit() {
        let song = demo_song().unwrap();
        assert_eq!(song.validate(&drum_kit(44_100)), Ok(()));
        assert_eq!(song.loop_bars(), 10);
        assert_eq!(song.patterns.len(), 3);
    }

    #[test]
    fn grids_are_one_bar_each() {
        let song = demo_song().unwrap();
        for p in &song.patterns {
            assert_eq!(p.ticks, DEMO_TICKS_PER_BAR);
            assert_eq!(p.lanes, 6);
        }
    }

    #[test]
    fn first_grid_downbeat() {
        let song = demo_song().unwrap();
        let p = song.pattern_at(0);
        // kick and perc on tick 0, nothing else
        assert_eq!(p.hit(0, 0), Hit::Strike(0));
        assert_eq!(p.hit(4, 0), Hit::Strike(0));
        for lane in [1, 2, 3, 5] {
            assert_eq!(p.hit(lane, 0), Hit::Rest);
        }
    }

    #[test]
    fn accented_kick_in_fill_bars() {
        let song = demo_song().unwrap();
        // bar 3 plays grid 2, which opens with a level-8 kick
        assert_eq!(song.pattern_at(3).hit(0, 0), Hit::Strike(8));
        assert_eq!(song.pattern_at(8).hit(2, 0), Hit::Strike(3));
    }
}
