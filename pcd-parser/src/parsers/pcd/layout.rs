use byteorder::{ByteOrder as _, LittleEndian};
use pcd_core::pointcloud::point::Point;

use super::header::{FieldKind, PcdHeader};
use crate::error::FormatError;

/// Little-endian scalar storage of a single field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl Scalar {
    pub fn from_field(kind: FieldKind, size: usize) -> Option<Self> {
        match (kind, size) {
            (FieldKind::Float, 4) => Some(Self::F32),
            (FieldKind::Float, 8) => Some(Self::F64),
            (FieldKind::Signed, 1) => Some(Self::I8),
            (FieldKind::Signed, 2) => Some(Self::I16),
            (FieldKind::Signed, 4) => Some(Self::I32),
            (FieldKind::Signed, 8) => Some(Self::I64),
            (FieldKind::Unsigned, 1) => Some(Self::U8),
            (FieldKind::Unsigned, 2) => Some(Self::U16),
            (FieldKind::Unsigned, 4) => Some(Self::U32),
            (FieldKind::Unsigned, 8) => Some(Self::U64),
            _ => None,
        }
    }

    pub fn read(self, bytes: &[u8]) -> f64 {
        match self {
            Self::F32 => LittleEndian::read_f32(bytes) as f64,
            Self::F64 => LittleEndian::read_f64(bytes),
            Self::I8 => bytes[0] as i8 as f64,
            Self::I16 => LittleEndian::read_i16(bytes) as f64,
            Self::I32 => LittleEndian::read_i32(bytes) as f64,
            Self::I64 => LittleEndian::read_i64(bytes) as f64,
            Self::U8 => bytes[0] as f64,
            Self::U16 => LittleEndian::read_u16(bytes) as f64,
            Self::U32 => LittleEndian::read_u32(bytes) as f64,
            Self::U64 => LittleEndian::read_u64(bytes) as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub offset: usize,
    pub scalar: Scalar,
}

impl FieldSlot {
    pub fn read(&self, record: &[u8]) -> f64 {
        self.scalar.read(&record[self.offset..])
    }
}

/// Fixed binary record layout derived from the header's ordered field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    pub stride: usize,
    pub x: FieldSlot,
    pub y: FieldSlot,
    pub z: FieldSlot,
}

impl RecordLayout {
    pub fn from_header(header: &PcdHeader) -> Result<Self, FormatError> {
        let mut offset = 0;
        let mut slots = Vec::with_capacity(header.fields.len());

        // every field is validated, not just x/y/z, otherwise the stride can't be trusted
        for field in &header.fields {
            let scalar = Scalar::from_field(field.kind, field.size)
                .filter(|_| field.count > 0)
                .ok_or_else(|| FormatError::UnsupportedFieldType {
                    field: field.name.clone(),
                    kind: field.kind.tag(),
                    size: field.size,
                })?;
            slots.push(FieldSlot { offset, scalar });
            offset = field
                .byte_width()
                .and_then(|width| offset.checked_add(width))
                .ok_or_else(|| FormatError::MalformedHeader {
                    line: header.header_lines,
                    reason: "SIZE x COUNT overflows the record size".to_string(),
                })?;
        }

        let slot = |name: &'static str| {
            header
                .field_index(name)
                .map(|index| slots[index])
                .ok_or(FormatError::MissingField(name))
        };

        Ok(Self {
            stride: offset,
            x: slot("x")?,
            y: slot("y")?,
            z: slot("z")?,
        })
    }

    pub fn read_point(&self, record: &[u8]) -> Point {
        Point::new(self.x.read(record), self.y.read(record), self.z.read(record))
    }
}
