//! Numeric sysfs attribute reading
//!
//! Attribute files under `/sys/class/power_supply/<device>/` hold a single
//! value followed by a newline. Values are parsed from the leading numeral
//! of the file contents, the way `strtoull(3)` and `strtod(3)` would, so a
//! trailing newline or unit suffix is ignored.

use crate::error::ReadError;
use std::fs;
use std::path::{Path, PathBuf};

/// Read `dir/field` as an unsigned base-10 integer
pub fn read_uint(dir: &Path, field: &str) -> Result<u64, ReadError> {
    let (path, content) = read_attribute(dir, field)?;
    parse_uint_prefix(&content).ok_or(ReadError::ParseError { path, content })
}

/// Read `dir/field` as a decimal floating point number
pub fn read_float(dir: &Path, field: &str) -> Result<f32, ReadError> {
    let (path, content) = read_attribute(dir, field)?;
    parse_float_prefix(&content).ok_or(ReadError::ParseError { path, content })
}

/// Read the raw contents of `dir/field`; bytes that are not UTF-8 are
/// replaced so the leading numeral still parses
fn read_attribute(dir: &Path, field: &str) -> Result<(PathBuf, String), ReadError> {
    let path = dir.join(field);
    let bytes = fs::read(&path).map_err(|source| ReadError::NotFound {
        path: path.clone(),
        source,
    })?;

    let content = String::from_utf8_lossy(&bytes).into_owned();
    Ok((path, content))
}

/// Parse the leading unsigned integer of `text`, skipping leading whitespace
pub(crate) fn parse_uint_prefix(text: &str) -> Option<u64> {
    let text = text.trim_start();
    let digits = text.strip_prefix('+').unwrap_or(text);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    if end == 0 {
        return None;
    }

    digits[..end].parse::<u64>().ok()
}

/// Parse the leading decimal float of `text`, skipping leading whitespace
pub(crate) fn parse_float_prefix(text: &str) -> Option<f32> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f32>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
