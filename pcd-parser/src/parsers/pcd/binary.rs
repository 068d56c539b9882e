use std::io::Read;

use pcd_core::pointcloud::point::Point;
use rayon::{iter::ParallelIterator as _, slice::ParallelSlice as _};

use super::{header::PcdHeader, layout::RecordLayout};
use crate::error::{FormatError, ReadError};

/// Reads exactly `points * stride` bytes and extracts x/y/z from each record.
/// Bytes past the declared payload are left unread.
pub fn read_binary<R: Read>(reader: &mut R, header: &PcdHeader) -> Result<Vec<Point>, ReadError> {
    let layout = RecordLayout::from_header(header)?;
    let expected = header
        .points
        .checked_mul(layout.stride)
        .ok_or_else(|| FormatError::MalformedHeader {
            line: header.header_lines,
            reason: format!("POINTS {} overflows the payload size", header.points),
        })?;

    let mut payload = Vec::new();
    reader.take(expected as u64).read_to_end(&mut payload)?;
    if payload.len() < expected {
        return Err(FormatError::TruncatedPayload {
            expected,
            actual: payload.len(),
        }
        .into());
    }

    Ok(payload
        .par_chunks_exact(layout.stride)
        .map(|record| layout.read_point(record))
        .collect())
}
