//! MP3 duration estimation from the first frame header.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AssetError, Result};

/// Bytes of the file head searched for the frame sync.
const HEADER_LEN: u64 = 10_000;

/// Frame sync for MPEG-1 Layer III without CRC protection.
const FRAME_SYNC: [u8; 2] = [0xFF, 0xFB];

/// MPEG-1 Layer III bitrates in kbps, indexed by header bits 12-15.
const BITRATES: [Option<u32>; 15] = [
    None,
    Some(32),
    Some(40),
    Some(48),
    Some(56),
    Some(64),
    Some(80),
    Some(96),
    Some(112),
    Some(128),
    Some(160),
    Some(192),
    Some(224),
    Some(256),
    Some(320),
];

/// Estimate the duration of an MP3 file in seconds.
///
/// Assumes constant bitrate and looks only at the first frame header.
///
/// # Errors
///
/// Fails if the file cannot be read, no frame sync is found in the first
/// 10000 bytes, or the bitrate index is invalid.
pub fn guess_mp3_duration(path: &Path) -> Result<f64> {
    let open_err = |e| AssetError::FileOpen(path.to_path_buf(), e);

    let file = File::open(path).map_err(open_err)?;
    let file_size = file.metadata().map_err(open_err)?.len();

    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    file.take(HEADER_LEN)
        .read_to_end(&mut header)
        .map_err(open_err)?;

    let offset = header
        .windows(FRAME_SYNC.len())
        .position(|w| w == FRAME_SYNC)
        .ok_or_else(|| AssetError::Mp3("Failed to find MP3 frame sync bits.".into()))?;

    let bitrate = header
        .get(offset..offset + 4)
        .map(|bytes| u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .and_then(|bits| BITRATES.get(((bits >> 12) & 0xF) as usize).copied().flatten())
        .ok_or_else(|| AssetError::Mp3("Invalid or unsupported bitrate index.".into()))?;

    Ok(file_size as f64 * 8.0 / f64::from(bitrate) / 1000.0)
}
