//! Minimal WKT reader for `POLYGON` and `MULTIPOLYGON`.
//!
//! Accepts this crate's own output and DuckDB's `ST_AsText` output
//! (`POLYGON ((...))`), keywords in any case, arbitrary whitespace. Extra
//! ordinates (Z/M) are read and dropped.

use super::{Geometry, Position, Ring};
use crate::error::{CoreError, CoreResult};

/// Parse WKT text into a [`Geometry`].
pub fn parse_wkt(text: &str) -> CoreResult<Geometry> {
    let trimmed = text.trim();
    let open = trimmed.find('(').ok_or_else(|| malformed("missing '('"))?;
    let keyword = trimmed[..open].trim().to_ascii_uppercase();

    let mut reader = Reader {
        input: trimmed[open..].as_bytes(),
        pos: 0,
    };
    let geometry = match keyword.as_str() {
        "POLYGON" => Geometry::Polygon(reader.polygon()?),
        "MULTIPOLYGON" => Geometry::MultiPolygon(reader.list(Reader::polygon)?),
        other => {
            return Err(CoreError::UnsupportedGeometry {
                geometry_type: other.to_string(),
            })
        }
    };
    reader.skip_ws();
    if reader.pos != reader.input.len() {
        return Err(malformed("trailing characters"));
    }
    Ok(geometry)
}

fn malformed(message: &str) -> CoreError {
    CoreError::MalformedGeometry {
        message: format!("invalid WKT: {message}"),
    }
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn skip_ws(&mut self) {
        while self
            .input
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> CoreResult<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(malformed(&format!(
                "expected '{}' at offset {}",
                byte as char, self.pos
            )))
        }
    }

    /// `( item, item, ... )`
    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> CoreResult<T>) -> CoreResult<Vec<T>> {
        self.expect(b'(')?;
        let mut items = vec![item(self)?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            items.push(item(self)?);
        }
        self.expect(b')')?;
        Ok(items)
    }

    fn polygon(&mut self) -> CoreResult<Vec<Ring>> {
        self.list(Reader::ring)
    }

    fn ring(&mut self) -> CoreResult<Ring> {
        self.list(Reader::position)
    }

    fn position(&mut self) -> CoreResult<Position> {
        let x = self.number()?;
        let y = self.number()?;
        while matches!(self.peek(), Some(b) if b != b',' && b != b')') {
            self.number()?;
        }
        Ok([x, y])
    }

    fn number(&mut self) -> CoreResult<f64> {
        self.skip_ws();
        let start = self.pos;
        while self
            .input
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
        {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| malformed(&format!("expected number at offset {start}")))
    }
}
