//! NumPy `.npy` reader/writer for 2-D `f64` tables.
//!
//! Only what the simulator exchanges with its Python tooling is supported:
//! `<f8` (or `>f8`) element type, C order, one- or two-dimensional shapes.
//! Files are written as format version 1.0 with the header padded so the
//! data starts on a 64-byte boundary.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{NbodyError, Result};
use crate::io::matrix::Matrix;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// Load a table from `path`
pub fn load(path: impl AsRef<Path>) -> Result<Matrix> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| NbodyError::io(path, e))?;
    read_from(&mut BufReader::new(file)).map_err(|e| match e {
        NbodyError::InputFormat(msg) => {
            NbodyError::format(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Save `matrix` to `path`, replacing any existing file
pub fn save(path: impl AsRef<Path>, matrix: &Matrix) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NbodyError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, matrix)
        .and_then(|_| writer.flush())
        .map_err(|e| NbodyError::io(path, e))
}

/// Decode a table from any reader
pub fn read_from<R: Read>(reader: &mut R) -> Result<Matrix> {
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic).map_err(truncated)?;
    if &magic[..6] != MAGIC {
        return Err(NbodyError::format("not a .npy file (bad magic)"));
    }

    let header_len = match magic[6] {
        1 => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len).map_err(truncated)?;
            u16::from_le_bytes(len) as usize
        }
        2 | 3 => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len).map_err(truncated)?;
            u32::from_le_bytes(len) as usize
        }
        v => return Err(NbodyError::format(format!("unsupported .npy version {v}"))),
    };

    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header).map_err(truncated)?;
    let header = String::from_utf8(header)
        .map_err(|_| NbodyError::format("header is not valid text"))?;
    let header = Header::parse(&header)?;

    let (rows, cols) = header.shape;
    let len = rows
        .checked_mul(cols)
        .and_then(|count| count.checked_mul(8))
        .ok_or_else(|| NbodyError::format("shape overflows"))?;
    // grow with the data actually present; the header's shape is untrusted
    let mut bytes = Vec::new();
    reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut bytes)
        .map_err(truncated)?;
    if bytes.len() != len {
        return Err(NbodyError::format(format!(
            "truncated .npy data: header declares {len} bytes, found {}",
            bytes.len()
        )));
    }

    let data = bytes
        .chunks_exact(8)
        .map(|b| {
            let b: [u8; 8] = [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]];
            if header.big_endian {
                f64::from_be_bytes(b)
            } else {
                f64::from_le_bytes(b)
            }
        })
        .collect();

    Matrix::from_vec(rows, cols, data)
}

/// Encode a table as `.npy` v1.0
pub fn write_to<W: Write>(writer: &mut W, matrix: &Matrix) -> std::io::Result<()> {
    let (rows, cols) = matrix.shape();
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({rows}, {cols}), }}"
    );
    // magic(6) + version(2) + length(2) + header + '\n'
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');

    let header_len = u16::try_from(header.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "npy header too long")
    })?;

    writer.write_all(MAGIC)?;
    writer.write_all(&[1, 0])?;
    writer.write_all(&header_len.to_le_bytes())?;
    writer.write_all(header.as_bytes())?;
    for v in matrix.as_slice() {
        writer.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn truncated(e: std::io::Error) -> NbodyError {
    NbodyError::format(format!("truncated .npy data ({e})"))
}

/// Parsed header dictionary
#[derive(Debug, PartialEq)]
struct Header {
    big_endian: bool,
    shape: (usize, usize),
}

impl Header {
    fn parse(text: &str) -> Result<Self> {
        let descr = dict_value(text, "descr")?;
        let big_endian = match descr.trim_matches(|c| c == '\'' || c == '"') {
            "<f8" | "=f8" | "f8" => false,
            ">f8" => true,
            other => {
                return Err(NbodyError::format(format!(
                    "unsupported dtype {other}, expected float64"
                )))
            }
        };

        match dict_value(text, "fortran_order")? {
            "False" => {}
            "True" => return Err(NbodyError::format("fortran-ordered arrays are not supported")),
            other => return Err(NbodyError::format(format!("bad fortran_order {other}"))),
        }

        let shape = dict_value(text, "shape")?;
        let dims = shape
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| {
                d.parse::<usize>()
                    .map_err(|_| NbodyError::format(format!("bad dimension {d}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let shape = match dims.as_slice() {
            [cols] => (1, *cols),
            [rows, cols] => (*rows, *cols),
            _ => {
                return Err(NbodyError::format(format!(
                    "expected a 2-D array, got shape {shape}"
                )))
            }
        };

        Ok(Self { big_endian, shape })
    }
}

/// Raw text of the value stored under `key` in a python dict literal
fn dict_value<'a>(text: &'a str, key: &str) -> Result<&'a str> {
    let missing = || NbodyError::format(format!("header has no '{key}' entry"));
    let quoted = format!("'{key}'");
    let start = text.find(&quoted).ok_or_else(missing)? + quoted.len();
    let rest = text[start..].trim_start();
    let rest = rest.strip_prefix(':').ok_or_else(missing)?.trim_start();

    let end = match rest.chars().next() {
        Some('(') => rest.find(')').map(|i| i + 1),
        Some(q @ ('\'' | '"')) => rest[1..].find(q).map(|i| i + 2),
        Some(_) => rest.find([',', '}']),
        None => None,
    }
    .ok_or_else(|| NbodyError::format(format!("unterminated '{key}' entry")))?;

    Ok(rest[..end].trim())
}
