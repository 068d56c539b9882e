//! Point cloud files following the `.pcd` convention: a text header of
//! `FIELDS`/`SIZE`/`TYPE`/`COUNT`/`POINTS` lines terminated by `DATA <encoding>`,
//! followed by either whitespace-separated rows or packed little-endian records.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use pcd_core::pointcloud::point::{DataEncoding, PointCloud};

use super::Parser;
use crate::error::{ParseError, ReadError};

pub mod ascii;
pub mod binary;
pub mod header;
pub mod layout;

pub use header::{parse_header, FieldDef, FieldKind, PcdHeader};
pub use layout::RecordLayout;

pub struct PcdParser {
    pub filename: PathBuf,
}

impl PcdParser {
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

impl Parser for PcdParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let start = std::time::Instant::now();
        let file =
            File::open(&self.filename).map_err(|e| ParseError::from_io(&self.filename, e))?;

        let point_cloud = read_pcd(BufReader::new(file))
            .map_err(|e| ParseError::from_read(&self.filename, e))?;

        log::debug!(
            "decoded {} {} points from {:?} in {:?}",
            point_cloud.len(),
            point_cloud
                .metadata
                .encoding
                .map_or("unknown", |encoding| encoding.as_str()),
            self.filename,
            start.elapsed()
        );
        Ok(point_cloud)
    }
}

/// Decodes a point cloud from any buffered reader, keeping only x/y/z.
pub fn read_pcd<R: BufRead>(mut reader: R) -> Result<PointCloud, ReadError> {
    let header = parse_header(&mut reader)?;

    let points = match header.data {
        DataEncoding::Ascii => ascii::read_ascii(reader, &header)?,
        DataEncoding::Binary => binary::read_binary(&mut reader, &header)?,
    };

    if header.data == DataEncoding::Ascii && points.len() != header.points {
        log::debug!(
            "ascii payload has {} rows, header declares {}",
            points.len(),
            header.points
        );
    }

    let mut point_cloud = PointCloud::new(points);
    point_cloud.metadata.declared_count = Some(header.points);
    point_cloud.metadata.encoding = Some(header.data);
    if let Some(version) = header.version {
        point_cloud
            .metadata
            .other
            .insert("version".to_string(), version);
    }

    Ok(point_cloud)
}
