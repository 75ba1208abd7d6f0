//! Property list decoding.
//!
//! Shortcuts stores action lists as binary (`bplist00`) or XML property
//! lists. Both decode into [`PlistValue`], a closed tree that every consumer
//! matches exhaustively. Decoding never fails loudly: corrupt or unsupported
//! input yields `None` so callers can treat it as "no data".

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;

/// Seconds between the Unix epoch and the Cocoa reference date (2001-01-01T00:00:00Z).
pub const COCOA_EPOCH_UNIX: i64 = 978_307_200;

/// Nesting limit for both formats. Real workflows stay far below it, and the
/// recursion it allows fits a default 2 MiB thread stack.
const MAX_DEPTH: usize = 128;

pub type PlistDict = IndexMap<String, PlistValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    Null,
    Boolean(bool),
    Integer(i128),
    Real(f64),
    Date(DateTime<Utc>),
    Data(Vec<u8>),
    String(String),
    /// Keyed-archiver object reference (binary plists only).
    Uid(u64),
    Array(Vec<PlistValue>),
    Dictionary(PlistDict),
}

impl PlistValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            PlistValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&PlistDict> {
        match self {
            PlistValue::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl fmt::Display for PlistValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlistValue::Null => f.write_str("null"),
            PlistValue::Boolean(b) => write!(f, "{b}"),
            PlistValue::Integer(n) => write!(f, "{n}"),
            PlistValue::Real(r) => write!(f, "{r}"),
            PlistValue::Date(d) => f.write_str(&d.to_rfc3339()),
            PlistValue::Data(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            PlistValue::String(s) => f.write_str(s),
            PlistValue::Uid(uid) => write!(f, "Uid({uid})"),
            PlistValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            PlistValue::Dictionary(dict) => {
                f.write_str("{")?;
                for (i, (key, value)) in dict.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Convert a Cocoa-epoch offset in seconds into a UTC timestamp.
pub fn cocoa_date(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    if whole.abs() > i64::MAX as f64 / 2.0 {
        return None;
    }
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(COCOA_EPOCH_UNIX.checked_add(whole as i64)?, nanos)
}

/// Decode a binary or XML property list.
///
/// Empty input, unknown formats, and structural corruption all return `None`.
pub fn decode(bytes: &[u8]) -> Option<PlistValue> {
    if bytes.is_empty() {
        return None;
    }
    if bytes.starts_with(binary::MAGIC_PREFIX) {
        return binary::decode(bytes);
    }
    let text = std::str::from_utf8(bytes).ok()?;
    xml::decode(text)
}

// ---------------------------------------------------------------------------
// Binary format
// ---------------------------------------------------------------------------

mod binary {
    use super::{cocoa_date, PlistDict, PlistValue, MAX_DEPTH};

    pub(super) const MAGIC_PREFIX: &[u8] = b"bplist";
    const MAGIC: &[u8] = b"bplist00";
    const TRAILER_LEN: usize = 32;
    /// Decoded-node allowance per input byte. Shared references let a small
    /// file describe an exponentially large tree; the budget caps that.
    const NODES_PER_INPUT_BYTE: usize = 4;

    struct Reader<'a> {
        /// Object area: everything before the offset table.
        objects: &'a [u8],
        offsets: Vec<usize>,
        ref_size: usize,
        /// Objects on the current decode path, for cycle detection.
        visiting: Vec<bool>,
        /// Nodes left before decoding gives up.
        budget: usize,
    }

    pub(super) fn decode(data: &[u8]) -> Option<PlistValue> {
        if data.len() < MAGIC.len() + TRAILER_LEN || !data.starts_with(MAGIC) {
            return None;
        }
        let trailer = &data[data.len() - TRAILER_LEN..];
        let offset_size = trailer[6] as usize;
        let ref_size = trailer[7] as usize;
        if !(1..=8).contains(&offset_size) || !(1..=8).contains(&ref_size) {
            return None;
        }
        let num_objects = usize::try_from(be_uint(&trailer[8..16])?).ok()?;
        let top_object = usize::try_from(be_uint(&trailer[16..24])?).ok()?;
        let table_offset = usize::try_from(be_uint(&trailer[24..32])?).ok()?;

        let table_end = num_objects
            .checked_mul(offset_size)?
            .checked_add(table_offset)?;
        if table_offset < MAGIC.len() || table_end > data.len() - TRAILER_LEN {
            return None;
        }

        let offsets = data[table_offset..table_end]
            .chunks_exact(offset_size)
            .map(|chunk| {
                be_uint(chunk)
                    .and_then(|o| usize::try_from(o).ok())
                    .filter(|&o| o >= MAGIC.len() && o < table_offset)
            })
            .collect::<Option<Vec<usize>>>()?;

        let mut reader = Reader {
            objects: &data[..table_offset],
            visiting: vec![false; offsets.len()],
            offsets,
            ref_size,
            budget: data.len().saturating_mul(NODES_PER_INPUT_BYTE),
        };
        reader.object(top_object, 0)
    }

    fn be_uint(bytes: &[u8]) -> Option<u64> {
        if bytes.len() > 8 {
            return None;
        }
        Some(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    impl<'a> Reader<'a> {
        fn slice(&self, start: usize, len: usize) -> Option<&'a [u8]> {
            let objects = self.objects;
            objects.get(start..start.checked_add(len)?)
        }

        fn object(&mut self, index: usize, depth: usize) -> Option<PlistValue> {
            if depth > MAX_DEPTH || self.budget == 0 {
                return None;
            }
            self.budget -= 1;
            let offset = *self.offsets.get(index)?;
            if std::mem::replace(self.visiting.get_mut(index)?, true) {
                return None;
            }
            let value = self.object_at(offset, depth);
            self.visiting[index] = false;
            value
        }

        fn object_at(&mut self, offset: usize, depth: usize) -> Option<PlistValue> {
            let marker = *self.objects.get(offset)?;
            let (kind, info) = (marker >> 4, marker & 0x0f);
            let body = offset + 1;

            match kind {
                0x0 => match info {
                    0x0 => Some(PlistValue::Null),
                    0x8 => Some(PlistValue::Boolean(false)),
                    0x9 => Some(PlistValue::Boolean(true)),
                    _ => None,
                },
                0x1 => self.integer(body, info).map(PlistValue::Integer),
                0x2 => self.real(body, info).map(PlistValue::Real),
                0x3 if info == 0x3 => {
                    let bytes: [u8; 8] = self.slice(body, 8)?.try_into().ok()?;
                    cocoa_date(f64::from_be_bytes(bytes)).map(PlistValue::Date)
                }
                0x4 => {
                    let (len, start) = self.length(body, info)?;
                    Some(PlistValue::Data(self.slice(start, len)?.to_vec()))
                }
                // Marked ASCII, but Apple's writer also uses it for Latin-1
                // text, so each byte maps to the code point of the same value.
                0x5 => {
                    let (len, start) = self.length(body, info)?;
                    let bytes = self.slice(start, len)?;
                    Some(PlistValue::String(
                        bytes.iter().map(|&b| char::from(b)).collect(),
                    ))
                }
                0x6 => {
                    let (units, start) = self.length(body, info)?;
                    let bytes = self.slice(start, units.checked_mul(2)?)?;
                    let units: Vec<u16> = bytes
                        .chunks_exact(2)
                        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                        .collect();
                    String::from_utf16(&units).ok().map(PlistValue::String)
                }
                0x7 => {
                    let (len, start) = self.length(body, info)?;
                    let bytes = self.slice(start, len)?;
                    String::from_utf8(bytes.to_vec())
                        .ok()
                        .map(PlistValue::String)
                }
                0x8 => {
                    let bytes = self.slice(body, info as usize + 1)?;
                    be_uint(bytes).map(PlistValue::Uid)
                }
                // array, ordered set, set
                0xA | 0xB | 0xC => {
                    let (count, start) = self.length(body, info)?;
                    let refs = self.refs(start, count)?;
                    refs.into_iter()
                        .map(|r| self.object(r, depth + 1))
                        .collect::<Option<Vec<_>>>()
                        .map(PlistValue::Array)
                }
                0xD => {
                    let (count, start) = self.length(body, info)?;
                    let keys = self.refs(start, count)?;
                    let values =
                        self.refs(start.checked_add(count.checked_mul(self.ref_size)?)?, count)?;
                    let mut dict = PlistDict::with_capacity(count);
                    for (k, v) in keys.into_iter().zip(values) {
                        let key = match self.object(k, depth + 1)? {
                            PlistValue::String(s) => s,
                            other => other.to_string(),
                        };
                        let value = self.object(v, depth + 1)?;
                        dict.insert(key, value);
                    }
                    Some(PlistValue::Dictionary(dict))
                }
                _ => None,
            }
        }

        /// Integers of 1, 2 and 4 bytes are unsigned; 8 and 16 bytes are signed.
        fn integer(&self, start: usize, info: u8) -> Option<i128> {
            match info {
                0..=2 => {
                    let bytes = self.slice(start, 1 << info)?;
                    be_uint(bytes).map(i128::from)
                }
                3 => {
                    let bytes: [u8; 8] = self.slice(start, 8)?.try_into().ok()?;
                    Some(i128::from(i64::from_be_bytes(bytes)))
                }
                4 => {
                    let bytes: [u8; 16] = self.slice(start, 16)?.try_into().ok()?;
                    Some(i128::from_be_bytes(bytes))
                }
                _ => None,
            }
        }

        fn real(&self, start: usize, info: u8) -> Option<f64> {
            match info {
                2 => {
                    let bytes: [u8; 4] = self.slice(start, 4)?.try_into().ok()?;
                    Some(f64::from(f32::from_be_bytes(bytes)))
                }
                3 => {
                    let bytes: [u8; 8] = self.slice(start, 8)?.try_into().ok()?;
                    Some(f64::from_be_bytes(bytes))
                }
                _ => None,
            }
        }

        /// Resolve an object's element count and the offset where its payload starts.
        /// A low nibble of `0xF` means the count follows as an integer object.
        fn length(&self, body: usize, info: u8) -> Option<(usize, usize)> {
            if info != 0x0f {
                return Some((info as usize, body));
            }
            let marker = *self.objects.get(body)?;
            if marker >> 4 != 0x1 {
                return None;
            }
            let width_exp = marker & 0x0f;
            let count = usize::try_from(self.integer(body + 1, width_exp)?).ok()?;
            Some((count, body + 1 + (1usize << width_exp)))
        }

        fn refs(&self, start: usize, count: usize) -> Option<Vec<usize>> {
            let bytes = self.slice(start, count.checked_mul(self.ref_size)?)?;
            bytes
                .chunks_exact(self.ref_size)
                .map(|chunk| be_uint(chunk).and_then(|r| usize::try_from(r).ok()))
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// XML format
// ---------------------------------------------------------------------------

mod xml {
    use super::{PlistDict, PlistValue, MAX_DEPTH};
    use base64::Engine as _;
    use chrono::{DateTime, Utc};

    enum Token<'a> {
        Open(&'a str),
        Close(&'a str),
        Empty(&'a str),
    }

    struct Cursor<'a> {
        src: &'a str,
        pos: usize,
    }

    pub(super) fn decode(text: &str) -> Option<PlistValue> {
        let mut cursor = Cursor {
            src: text.trim_start_matches('\u{feff}'),
            pos: 0,
        };
        let value = match cursor.next_token()? {
            Token::Open("plist") => {
                let inner = cursor.next_token()?;
                let value = cursor.value(inner, 0)?;
                match cursor.next_token()? {
                    Token::Close("plist") => value,
                    _ => return None,
                }
            }
            token => cursor.value(token, 0)?,
        };
        cursor.at_end().then_some(value)
    }

    fn tag_name(inner: &str) -> &str {
        inner
            .split(|c: char| c.is_whitespace())
            .next()
            .unwrap_or_default()
    }

    fn parse_integer(text: &str) -> Option<i128> {
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            return i128::from_str_radix(hex, 16).ok();
        }
        text.parse().ok()
    }

    fn unescape(raw: &str) -> Option<String> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let semi = after.find(';')?;
            let entity = &after[..semi];
            let ch = match entity {
                "lt" => '<',
                "gt" => '>',
                "amp" => '&',
                "quot" => '"',
                "apos" => '\'',
                _ => {
                    let code = if let Some(hex) = entity.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()?
                    } else {
                        entity.strip_prefix('#')?.parse().ok()?
                    };
                    char::from_u32(code)?
                }
            };
            out.push(ch);
            rest = &after[semi + 1..];
        }
        out.push_str(rest);
        Some(out)
    }

    impl<'a> Cursor<'a> {
        fn rest(&self) -> &'a str {
            let src = self.src;
            &src[self.pos..]
        }

        fn skip_past(&mut self, pattern: &str) -> Option<()> {
            let idx = self.rest().find(pattern)?;
            self.pos += idx + pattern.len();
            Some(())
        }

        /// Skip whitespace, declarations, comments and DOCTYPE; stop at the next tag.
        fn skip_misc(&mut self) -> Option<()> {
            loop {
                let rest = self.rest();
                let trimmed = rest.trim_start();
                self.pos += rest.len() - trimmed.len();
                if trimmed.starts_with("<?") {
                    self.skip_past("?>")?;
                } else if trimmed.starts_with("<!--") {
                    self.skip_past("-->")?;
                } else if trimmed.starts_with("<!") {
                    self.skip_past(">")?;
                } else {
                    return Some(());
                }
            }
        }

        fn at_end(&mut self) -> bool {
            self.skip_misc().is_some() && self.rest().is_empty()
        }

        fn next_token(&mut self) -> Option<Token<'a>> {
            self.skip_misc()?;
            let rest = self.rest();
            if !rest.starts_with('<') {
                return None;
            }
            let end = rest.find('>')?;
            let inner = &rest[1..end];
            self.pos += end + 1;
            if let Some(name) = inner.strip_prefix('/') {
                return Some(Token::Close(name.trim()));
            }
            if let Some(body) = inner.strip_suffix('/') {
                return Some(Token::Empty(tag_name(body)));
            }
            Some(Token::Open(tag_name(inner)))
        }

        /// Read character data up to and including the closing tag `name`.
        fn text(&mut self, name: &str) -> Option<String> {
            let mut text = String::new();
            loop {
                let rest = self.rest();
                if let Some(cdata) = rest.strip_prefix("<![CDATA[") {
                    let end = cdata.find("]]>")?;
                    text.push_str(&cdata[..end]);
                    self.pos += "<![CDATA[".len() + end + "]]>".len();
                    continue;
                }
                if rest.starts_with("<!--") {
                    self.skip_past("-->")?;
                    continue;
                }
                if rest.starts_with("</") {
                    return match self.next_token()? {
                        Token::Close(closing) if closing == name => Some(text),
                        _ => None,
                    };
                }
                let end = rest.find('<')?;
                if end == 0 {
                    return None;
                }
                text.push_str(&unescape(&rest[..end])?);
                self.pos += end;
            }
        }

        fn value(&mut self, token: Token<'a>, depth: usize) -> Option<PlistValue> {
            if depth > MAX_DEPTH {
                return None;
            }
            match token {
                Token::Empty(name) => match name {
                    "true" => Some(PlistValue::Boolean(true)),
                    "false" => Some(PlistValue::Boolean(false)),
                    "string" => Some(PlistValue::String(String::new())),
                    "data" => Some(PlistValue::Data(Vec::new())),
                    "array" => Some(PlistValue::Array(Vec::new())),
                    "dict" => Some(PlistValue::Dictionary(PlistDict::new())),
                    _ => None,
                },
                Token::Open(name) => match name {
                    "true" | "false" => self
                        .text(name)?
                        .trim()
                        .is_empty()
                        .then_some(PlistValue::Boolean(name == "true")),
                    "string" => self.text(name).map(PlistValue::String),
                    "integer" => parse_integer(self.text(name)?.trim()).map(PlistValue::Integer),
                    "real" => self.text(name)?.trim().parse().ok().map(PlistValue::Real),
                    "date" => DateTime::parse_from_rfc3339(self.text(name)?.trim())
                        .ok()
                        .map(|d| PlistValue::Date(d.with_timezone(&Utc))),
                    "data" => {
                        let encoded: String = self
                            .text(name)?
                            .chars()
                            .filter(|c| !c.is_whitespace())
                            .collect();
                        base64::engine::general_purpose::STANDARD
                            .decode(encoded)
                            .ok()
                            .map(PlistValue::Data)
                    }
                    "array" => {
                        let mut items = Vec::new();
                        loop {
                            match self.next_token()? {
                                Token::Close("array") => return Some(PlistValue::Array(items)),
                                token => items.push(self.value(token, depth + 1)?),
                            }
                        }
                    }
                    "dict" => {
                        let mut dict = PlistDict::new();
                        loop {
                            let key = match self.next_token()? {
                                Token::Close("dict") => return Some(PlistValue::Dictionary(dict)),
                                Token::Open("key") => self.text("key")?,
                                Token::Empty("key") => String::new(),
                                _ => return None,
                            };
                            let token = self.next_token()?;
                            let value = self.value(token, depth + 1)?;
                            dict.insert(key, value);
                        }
                    }
                    _ => None,
                },
                Token::Close(_) => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(value: &plist::Value) -> Vec<u8> {
        let mut buf = Vec::new();
        value.to_writer_binary(&mut buf).unwrap();
        buf
    }

    fn xml(value: &plist::Value) -> Vec<u8> {
        let mut buf = Vec::new();
        value.to_writer_xml(&mut buf).unwrap();
        buf
    }

    fn sample() -> plist::Value {
        let mut params = plist::Dictionary::new();
        params.insert("WFDelayTime".into(), plist::Value::Integer(5i64.into()));
        params.insert("Ratio".into(), plist::Value::Real(0.5));
        params.insert("Enabled".into(), plist::Value::Boolean(true));
        params.insert("Blob".into(), plist::Value::Data(b"hello".to_vec()));
        params.insert("Name".into(), plist::Value::String("Grüße ☕".into()));
        params.insert(
            "Items".into(),
            plist::Value::Array(vec![
                plist::Value::Integer((-3i64).into()),
                plist::Value::String("x".into()),
            ]),
        );
        plist::Value::Dictionary(params)
    }

    fn expected_sample() -> PlistValue {
        let mut dict = PlistDict::new();
        dict.insert("WFDelayTime".into(), PlistValue::Integer(5));
        dict.insert("Ratio".into(), PlistValue::Real(0.5));
        dict.insert("Enabled".into(), PlistValue::Boolean(true));
        dict.insert("Blob".into(), PlistValue::Data(b"hello".to_vec()));
        dict.insert("Name".into(), PlistValue::String("Grüße ☕".into()));
        dict.insert(
            "Items".into(),
            PlistValue::Array(vec![
                PlistValue::Integer(-3),
                PlistValue::String("x".into()),
            ]),
        );
        PlistValue::Dictionary(dict)
    }

    #[test]
    fn empty_input_is_absent() {
        assert_eq!(decode(&[]), None);
    }

    #[test]
    fn decodes_binary_plist() {
        let decoded = decode(&binary(&sample())).unwrap();
        let dict = decoded.as_dictionary().unwrap();
        let expected = expected_sample();
        for (key, value) in expected.as_dictionary().unwrap() {
            assert_eq!(dict.get(key), Some(value), "key {key}");
        }
    }

    #[test]
    fn decodes_xml_plist() {
        let decoded = decode(&xml(&sample())).unwrap();
        let dict = decoded.as_dictionary().unwrap();
        let expected = expected_sample();
        for (key, value) in expected.as_dictionary().unwrap() {
            assert_eq!(dict.get(key), Some(value), "key {key}");
        }
    }

    #[test]
    fn decodes_binary_dates_relative_to_cocoa_epoch() {
        let at = std::time::UNIX_EPOCH + std::time::Duration::from_secs(978_307_200 + 86_400);
        let value = plist::Value::Array(vec![plist::Value::Date(at.into())]);
        let decoded = decode(&binary(&value)).unwrap();
        match &decoded.as_array().unwrap()[0] {
            PlistValue::Date(d) => assert_eq!(d.to_rfc3339(), "2001-01-02T00:00:00+00:00"),
            other => panic!("expected date, got {other:?}"),
        }
    }

    #[test]
    fn decodes_handwritten_xml() {
        let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <!-- a comment -->
    <key>text</key><string>a &amp; b &lt;c&gt; &#x263A;</string>
    <key>empty</key><string/>
    <key>no</key><false/>
    <key>when</key><date>2024-01-02T03:04:05Z</date>
    <key>raw</key><data>
        aGVs
        bG8=
    </data>
    <key>nested</key><array><dict/><array/></array>
</dict>
</plist>"#;
        let decoded = decode(text.as_bytes()).unwrap();
        let dict = decoded.as_dictionary().unwrap();
        assert_eq!(dict["text"].as_str(), Some("a & b <c> ☺"));
        assert_eq!(dict["empty"].as_str(), Some(""));
        assert_eq!(dict["no"], PlistValue::Boolean(false));
        assert_eq!(dict["raw"], PlistValue::Data(b"hello".to_vec()));
        assert_eq!(dict["when"].to_string(), "2024-01-02T03:04:05+00:00");
        assert_eq!(dict["nested"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn garbage_text_is_absent() {
        assert_eq!(decode(b"not a plist"), None);
        assert_eq!(decode(b"<plist><dict><key>a</key></dict></plist>"), None);
        assert_eq!(decode(b"<plist><string>x</string></plist> trailing"), None);
        assert_eq!(decode(&[0xff, 0xfe, 0x00]), None);
    }

    #[test]
    fn truncated_binary_is_absent() {
        let bytes = binary(&sample());
        for cut in [8, 20, bytes.len() - 1] {
            assert_eq!(decode(&bytes[..cut]), None, "cut at {cut}");
        }
    }

    #[test]
    fn corrupt_offset_table_is_absent() {
        let mut bytes = binary(&sample());
        let len = bytes.len();
        // Point the offset table past the end of the object area.
        bytes[len - 8..].copy_from_slice(&u64::MAX.to_be_bytes());
        assert_eq!(decode(&bytes), None);
    }

    /// Assemble a binary plist from raw object encodings with 1-byte offsets
    /// and references. The first object is the top.
    fn handmade(objects: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = b"bplist00".to_vec();
        let mut offsets = Vec::new();
        for object in objects {
            offsets.push(u8::try_from(bytes.len()).unwrap());
            bytes.extend_from_slice(object);
        }
        let table_offset = bytes.len() as u64;
        bytes.extend_from_slice(&offsets);
        let mut trailer = [0u8; 32];
        trailer[6] = 1;
        trailer[7] = 1;
        trailer[8..16].copy_from_slice(&(objects.len() as u64).to_be_bytes());
        trailer[24..32].copy_from_slice(&table_offset.to_be_bytes());
        bytes.extend_from_slice(&trailer);
        bytes
    }

    fn nested_arrays(levels: usize) -> plist::Value {
        (0..levels).fold(plist::Value::Boolean(true), |inner, _| {
            plist::Value::Array(vec![inner])
        })
    }

    #[test]
    fn self_referencing_array_is_absent() {
        // Single array whose only element refers back to itself.
        assert_eq!(decode(&handmade(&[vec![0xA1, 0x00]])), None);
    }

    #[test]
    fn shared_reference_blowup_is_absent() {
        // Object i is [i+1, i+1]: a ~200 byte file describing 2^40 nodes.
        let levels = 40u8;
        let mut objects: Vec<Vec<u8>> = (1..levels)
            .map(|next| vec![0xA2, next, next])
            .collect();
        objects.push(vec![0x08]);
        let bytes = handmade(&objects);

        let started = std::time::Instant::now();
        assert_eq!(decode(&bytes), None);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn shared_references_within_budget_decode() {
        // Same shape as above but only 2^3 leaves.
        let objects = vec![
            vec![0xA2, 1, 1],
            vec![0xA2, 2, 2],
            vec![0xA2, 3, 3],
            vec![0x09],
        ];
        let value = decode(&handmade(&objects)).unwrap();
        let PlistValue::Array(outer) = value else {
            panic!("expected array");
        };
        assert_eq!(outer.len(), 2);
    }

    #[test]
    fn ascii_marked_strings_read_high_bytes_as_latin1() {
        // 0x51: ASCII string of length 1 holding 0xE9.
        let bytes = handmade(&[vec![0x51, 0xE9]]);
        assert_eq!(decode(&bytes), Some(PlistValue::String("é".into())));
    }

    #[test]
    fn deep_nesting_is_bounded_on_a_default_thread_stack() {
        let shallow_binary = binary(&nested_arrays(100));
        let deep_binary = binary(&nested_arrays(200));
        let shallow_xml = xml(&nested_arrays(100));
        let deep_xml = xml(&nested_arrays(200));

        std::thread::spawn(move || {
            assert!(decode(&shallow_binary).is_some());
            assert_eq!(decode(&deep_binary), None);
            assert!(decode(&shallow_xml).is_some());
            assert_eq!(decode(&deep_xml), None);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn cocoa_date_handles_fractions_and_non_finite() {
        let d = cocoa_date(1.5).unwrap();
        assert_eq!(d.timestamp(), COCOA_EPOCH_UNIX + 1);
        assert_eq!(d.timestamp_subsec_millis(), 500);
        assert_eq!(cocoa_date(f64::NAN), None);
    }
}
