pub mod error;
pub mod parsers;

pub use error::{FormatError, ParseError, ReadError};
pub use parsers::pcd::{read_pcd, PcdParser};
pub use parsers::Parser;
