use std::io::BufRead;

use pcd_core::pointcloud::point::DataEncoding;

use crate::error::{FormatError, ReadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Signed,
    Unsigned,
}

impl FieldKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "F" => Some(Self::Float),
            "I" => Some(Self::Signed),
            "U" => Some(Self::Unsigned),
            _ => None,
        }
    }

    pub fn tag(&self) -> char {
        match self {
            Self::Float => 'F',
            Self::Signed => 'I',
            Self::Unsigned => 'U',
        }
    }
}

/// One entry of the header's `FIELDS` list with its `SIZE`, `TYPE` and `COUNT`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub size: usize,
    pub kind: FieldKind,
    pub count: usize,
}

impl FieldDef {
    /// `SIZE * COUNT`, or `None` when it does not fit in `usize`.
    pub fn byte_width(&self) -> Option<usize> {
        self.size.checked_mul(self.count)
    }
}

#[derive(Debug, Clone)]
pub struct PcdHeader {
    pub version: Option<String>,
    pub fields: Vec<FieldDef>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    /// Declared record count; trusted by the binary payload, advisory for ASCII.
    pub points: usize,
    pub data: DataEncoding,
    /// Number of lines consumed up to and including `DATA`.
    pub header_lines: usize,
}

impl PcdHeader {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Bytes per binary record. `None` on overflow, like the other size helpers.
    pub fn stride(&self) -> Option<usize> {
        checked_sum(self.fields.iter().map(FieldDef::byte_width))
    }

    /// Byte offset of a field inside a binary record.
    pub fn offset_of(&self, index: usize) -> Option<usize> {
        checked_sum(self.fields[..index].iter().map(FieldDef::byte_width))
    }

    /// Column of a field's first element inside an ASCII row.
    pub fn column_of(&self, index: usize) -> Option<usize> {
        checked_sum(self.fields[..index].iter().map(|field| Some(field.count)))
    }

    /// Columns per ASCII row.
    pub fn column_count(&self) -> Option<usize> {
        checked_sum(self.fields.iter().map(|field| Some(field.count)))
    }
}

fn checked_sum(mut values: impl Iterator<Item = Option<usize>>) -> Option<usize> {
    values.try_fold(0usize, |total, value| total.checked_add(value?))
}

/// Reads header lines up to and including the `DATA` line, leaving `reader` at the
/// first payload byte.
pub fn parse_header<R: BufRead>(reader: &mut R) -> Result<PcdHeader, ReadError> {
    let mut version = None;
    let mut names: Option<Vec<String>> = None;
    let mut sizes: Option<Vec<usize>> = None;
    let mut kinds: Option<Vec<FieldKind>> = None;
    let mut counts: Option<Vec<usize>> = None;
    let mut width = None;
    let mut height = None;
    let mut points = None;
    let mut count_line = 0;

    let mut buf = Vec::new();
    let mut line_no = 0;

    let data = loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Err(FormatError::MissingDataLine.into());
        }
        line_no += 1;

        let line = std::str::from_utf8(&buf).map_err(|_| FormatError::MalformedHeader {
            line: line_no,
            reason: "header line is not text".to_string(),
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(key) = parts.next() else {
            continue;
        };
        let values: Vec<&str> = parts.collect();

        match key {
            "VERSION" => version = values.first().map(|v| v.to_string()),
            "FIELDS" => names = Some(values.iter().map(|v| v.to_string()).collect()),
            "SIZE" => sizes = Some(parse_list(&values, line_no, "SIZE")?),
            "COUNT" => {
                counts = Some(parse_list(&values, line_no, "COUNT")?);
                count_line = line_no;
            }
            "TYPE" => {
                let parsed = values
                    .iter()
                    .map(|tag| {
                        FieldKind::from_tag(tag).ok_or_else(|| FormatError::MalformedHeader {
                            line: line_no,
                            reason: format!("unknown TYPE '{tag}'"),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                kinds = Some(parsed);
            }
            "WIDTH" => width = Some(parse_single(&values, line_no, "WIDTH")?),
            "HEIGHT" => height = Some(parse_single(&values, line_no, "HEIGHT")?),
            "POINTS" => points = Some(parse_single(&values, line_no, "POINTS")?),
            _ if key.starts_with("DATA") => {
                let tag = values.first().ok_or_else(|| FormatError::MalformedHeader {
                    line: line_no,
                    reason: "DATA without an encoding".to_string(),
                })?;
                break match *tag {
                    "ascii" => DataEncoding::Ascii,
                    "binary" => DataEncoding::Binary,
                    other => return Err(FormatError::UnsupportedEncoding(other.to_string()).into()),
                };
            }
            // VIEWPOINT and anything unknown
            _ => {}
        }
    };

    let names = names.ok_or(FormatError::MissingHeaderEntry("FIELDS"))?;
    for required in ["x", "y", "z"] {
        if !names.iter().any(|name| name == required) {
            return Err(FormatError::MissingField(required).into());
        }
    }

    // SIZE and TYPE only matter to the binary layout; ASCII files may omit them.
    if data == DataEncoding::Binary {
        if sizes.is_none() {
            return Err(FormatError::MissingHeaderEntry("SIZE").into());
        }
        if kinds.is_none() {
            return Err(FormatError::MissingHeaderEntry("TYPE").into());
        }
    }
    let sizes = sizes.unwrap_or_else(|| vec![4; names.len()]);
    let kinds = kinds.unwrap_or_else(|| vec![FieldKind::Float; names.len()]);
    let counts = counts.unwrap_or_else(|| vec![1; names.len()]);

    check_len("SIZE", names.len(), sizes.len())?;
    check_len("TYPE", names.len(), kinds.len())?;
    check_len("COUNT", names.len(), counts.len())?;
    if counts.contains(&0) {
        return Err(FormatError::MalformedHeader {
            line: count_line,
            reason: "COUNT values must be at least 1".to_string(),
        }
        .into());
    }

    let fields = names
        .into_iter()
        .zip(sizes)
        .zip(kinds)
        .zip(counts)
        .map(|(((name, size), kind), count)| FieldDef {
            name,
            size,
            kind,
            count,
        })
        .collect();

    let points = match (points, width) {
        (Some(points), _) => points,
        (None, Some(width)) => {
            let height = height.unwrap_or(1);
            width
                .checked_mul(height)
                .ok_or_else(|| FormatError::MalformedHeader {
                    line: line_no,
                    reason: format!("WIDTH {width} x HEIGHT {height} overflows the point count"),
                })?
        }
        (None, None) => return Err(FormatError::MissingHeaderEntry("POINTS").into()),
    };

    let header = PcdHeader {
        version,
        fields,
        width,
        height,
        points,
        data,
        header_lines: line_no,
    };

    // the sizes below bound every offset and column the payload readers compute
    if header.column_count().is_none() {
        return Err(FormatError::MalformedHeader {
            line: count_line,
            reason: "COUNT values overflow the row width".to_string(),
        }
        .into());
    }
    if data == DataEncoding::Binary && header.stride().is_none() {
        return Err(FormatError::MalformedHeader {
            line: line_no,
            reason: "SIZE x COUNT overflows the record size".to_string(),
        }
        .into());
    }

    Ok(header)
}

fn parse_list(values: &[&str], line: usize, key: &str) -> Result<Vec<usize>, FormatError> {
    values
        .iter()
        .map(|value| {
            value.parse().map_err(|_| FormatError::MalformedHeader {
                line,
                reason: format!("{key} value '{value}' is not a non-negative integer"),
            })
        })
        .collect()
}

fn parse_single(values: &[&str], line: usize, key: &str) -> Result<usize, FormatError> {
    match values {
        [value] => value.parse().map_err(|_| FormatError::MalformedHeader {
            line,
            reason: format!("{key} value '{value}' is not a non-negative integer"),
        }),
        _ => Err(FormatError::MalformedHeader {
            line,
            reason: format!("{key} expects exactly one value"),
        }),
    }
}

fn check_len(entry: &'static str, expected: usize, actual: usize) -> Result<(), FormatError> {
    if expected == actual {
        Ok(())
    } else {
        Err(FormatError::FieldListMismatch {
            entry,
            expected,
            actual,
        })
    }
}
