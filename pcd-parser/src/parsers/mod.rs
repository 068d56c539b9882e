use pcd_core::pointcloud::point::PointCloud;

use crate::error::ParseError;

pub mod pcd;

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, ParseError>;
}
