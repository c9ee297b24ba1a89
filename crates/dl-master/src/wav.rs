//! WAV encoding for 16-bit stereo PCM.

use dl_engine::Frame;
use std::io::Write;

/// Bytes per stereo frame: two little-endian `i16`.
const FRAME_BYTES: u32 = 4;

/// Canonical 44-byte RIFF/WAVE header for a 16-bit stereo stream.
fn header(sample_rate: u32, frames: usize) -> [u8; 44] {
    let data_len = frames as u32 * FRAME_BYTES;
    let fields: [&[u8]; 12] = [
        b"RIFF",
        &(36 + data_len).to_le_bytes(),
        b"WAVEfmt ",
        &16u32.to_le_bytes(),
        // format 1 (PCM), 2 channels
        &1u16.to_le_bytes(),
        &2u16.to_le_bytes(),
        &sample_rate.to_le_bytes(),
        &(sample_rate * FRAME_BYTES).to_le_bytes(),
        &(FRAME_BYTES as u16).to_le_bytes(),
        &16u16.to_le_bytes(),
        b"data",
        &data_len.to_le_bytes(),
    ];

    let mut out = [0u8; 44];
    let mut at = 0;
    for field in fields {
        out[at..at + field.len()].copy_from_slice(field);
        at += field.len();
    }
    out
}

pub fn write_wav(w: &mut impl Write, frames: &[Frame], sample_rate: u32) -> std::io::Result<()> {
    w.write_all(&header(sample_rate, frames.len()))?;
    for frame in frames {
        let [l0, l1] = frame.left.to_le_bytes();
        let [r0, r1] = frame.right.to_le_bytes();
        w.write_all(&[l0, l1, r0, r1])?;
    }
    Ok(())
}

/// Encode a whole file in memory.
pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(44 + frames.len() * FRAME_BYTES as usize);
    write_wav(&mut buf, frames, sample_rate)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_describes_stereo_16_bit() {
        let frames = [Frame { left: 1, right: -1 }, Frame { left: 2, right: -2 }];
        let wav = frames_to_wav(&frames, 44_138).unwrap();
        assert_eq!(wav.len(), 44 + 8);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 8);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 2);
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 44_138);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 44_138 * 4);
        assert_eq!(&wav[36..40], b"data");
    }

    #[test]
    fn empty_stream_is_header_only() {
        let wav = frames_to_wav(&[], 48_000).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36);
        assert_eq!(u16::from_le_bytes([wav[32], wav[33]]), 4);
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 0);
    }

    #[test]
    fn samples_are_interleaved_left_first() {
        let wav = frames_to_wav(&[Frame { left: 0x0102, right: -2 }], 8_000).unwrap();
        assert_eq!(&wav[44..48], &[0x02, 0x01, 0xFE, 0xFF]);
    }
}
