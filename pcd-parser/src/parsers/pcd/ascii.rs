use std::io::BufRead;

use pcd_core::pointcloud::point::Point;

use super::header::PcdHeader;
use crate::error::{FormatError, ReadError};

/// Reads whitespace-separated rows until EOF. The declared point count is not enforced.
pub fn read_ascii<R: BufRead>(reader: R, header: &PcdHeader) -> Result<Vec<Point>, ReadError> {
    let column = |name: &'static str| {
        let index = header
            .field_index(name)
            .ok_or(FormatError::MissingField(name))?;
        header
            .column_of(index)
            .ok_or_else(|| FormatError::MalformedHeader {
                line: header.header_lines,
                reason: "COUNT values overflow the row width".to_string(),
            })
    };
    let columns = [column("x")?, column("y")?, column("z")?];
    let required = columns.iter().max().map_or(0, |max| max.saturating_add(1));

    // POINTS is only a hint here, so cap the up-front allocation
    let mut points = Vec::with_capacity(header.points.min(1 << 20));
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line_no = header.header_lines + index + 1;

        let text = std::str::from_utf8(&line).map_err(|_| FormatError::InvalidRecord {
            line: line_no,
            reason: "row is not text".to_string(),
        })?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < required {
            return Err(FormatError::InvalidRecord {
                line: line_no,
                reason: format!("expected at least {required} columns, found {}", tokens.len()),
            }
            .into());
        }

        let mut xyz = [0.0; 3];
        for (value, &column) in xyz.iter_mut().zip(&columns) {
            let token = tokens[column];
            *value = token.parse().map_err(|_| FormatError::InvalidRecord {
                line: line_no,
                reason: format!("'{token}' is not a number"),
            })?;
        }
        points.push(Point::from(xyz));
    }

    Ok(points)
}
