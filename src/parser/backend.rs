//! PDF container access layer.
//!
//! The [`PdfBackend`] trait isolates the concrete PDF library from the
//! extraction pipeline. Two implementations exist: [`LopdfBackend`] for
//! well-formed containers, and [`RecoveredBackend`], a linear byte-stream
//! scan used when the cross-reference table is too damaged for a structured
//! load.

use std::collections::BTreeMap;
use std::io::Read;

use lopdf::{Document as LopdfDocument, Object};

use crate::error::{Error, Result};
use crate::model::DocInfo;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Font information for one page resource entry.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// Font resource name (key in the page's font dictionary)
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold")
    pub base_font: String,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value, if this operand is a number.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font info, content streams,
/// text decoding, and Info-dictionary metadata without exposing concrete
/// library types to the pipeline.
pub trait PdfBackend {
    /// All pages as (1-indexed page number → PageId), in document order.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Font resource entries for a page. May be empty in degraded mode.
    fn page_fonts(&self, page: PageId) -> Result<Vec<FontInfo>>;

    /// Decompressed content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Decode a text byte string using the named font's encoding, falling
    /// back to simple decoding when the encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Info-dictionary metadata (title, author, dates, version).
    fn info(&self) -> DocInfo;

    /// Number of pages.
    fn page_count(&self) -> u32 {
        self.pages().len() as u32
    }
}

/// Parse raw content stream bytes into a sequence of operations.
///
/// Shared by both backends: `lopdf`'s content parser operates on raw bytes
/// independently of any loaded document.
pub fn decode_content(data: &[u8]) -> Result<Vec<ContentOp>> {
    let content = lopdf::content::Content::decode(data)
        .map_err(|e| Error::UnreadablePdf(format!("content stream: {}", e)))?;

    Ok(content
        .operations
        .into_iter()
        .map(|op| ContentOp {
            operator: op.operator,
            operands: op.operands.iter().map(convert_object).collect(),
        })
        .collect())
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM first (PDF standard for Unicode strings)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Latin-1 fallback
    bytes.iter().map(|&b| b as char).collect()
}

fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Primary backend for well-formed PDF containers.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self { doc })
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::UnreadablePdf(e.to_string()))?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            result.push(FontInfo {
                name: name.clone(),
                base_font,
            });
        }
        Ok(result)
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::UnreadablePdf(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(c) => c,
            // A page without a Contents entry is legal and simply empty.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return s
                        .decompressed_content()
                        .map_err(|e| Error::UnreadablePdf(e.to_string()));
                }
                Err(Error::UnreadablePdf("invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::UnreadablePdf("invalid content stream".to_string())),
        }
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn info(&self) -> DocInfo {
        let mut info = DocInfo::with_version(self.doc.version.to_string());
        info.encrypted = self.doc.is_encrypted();

        if let Ok(obj) = self.doc.trailer.get(b"Info") {
            if let Ok(info_ref) = obj.as_reference() {
                if let Ok(dict) = self.doc.get_dictionary(info_ref) {
                    info.title = dict_string(dict, b"Title");
                    info.author = dict_string(dict, b"Author");
                    info.subject = dict_string(dict, b"Subject");
                    info.creator = dict_string(dict, b"Creator");
                    info.producer = dict_string(dict, b"Producer");
                    if let Some(s) = dict_string(dict, b"CreationDate") {
                        info.created = parse_pdf_date(&s);
                    }
                    if let Some(s) = dict_string(dict, b"ModDate") {
                        info.modified = parse_pdf_date(&s);
                    }
                }
            }
        }

        info
    }
}

/// Read a string value from a PDF dictionary.
fn dict_string(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    })
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSS...).
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:")?;

    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}

// ---------------------------------------------------------------------------
// RecoveredBackend — linear scan fallback for malformed xref tables
// ---------------------------------------------------------------------------

use regex::bytes::Regex;

/// Degraded backend built by scanning the raw byte stream for page objects.
///
/// Used when `lopdf` cannot load the container (typically a corrupt or
/// truncated cross-reference table). Font resources are not resolved in this
/// mode: text decodes through the simple fallback and style flags default to
/// regular weight.
pub struct RecoveredBackend {
    /// Page object ids in byte-stream order
    page_ids: Vec<PageId>,
    /// Content stream bytes per page object id
    contents: BTreeMap<PageId, Vec<u8>>,
    version: String,
}

impl RecoveredBackend {
    /// Scan raw bytes for `N G obj … endobj` ranges and reassemble the page
    /// list and content streams without consulting the xref table.
    pub fn scan(data: &[u8]) -> Result<Self> {
        // (?-u): these scan arbitrary binary bytes, not UTF-8 text.
        let obj_re =
            Regex::new(r"(?s-u)(\d+)\s+(\d+)\s+obj\b(.*?)endobj").expect("valid object regex");
        let contents_ref_re =
            Regex::new(r"(?-u)/Contents\s+(\d+)\s+(\d+)\s+R").expect("valid contents regex");
        let contents_arr_re =
            Regex::new(r"(?-u)/Contents\s*\[([^\]]*)\]").expect("valid contents array regex");
        let ref_re = Regex::new(r"(?-u)(\d+)\s+(\d+)\s+R").expect("valid reference regex");
        let page_type_re = Regex::new(r"(?-u)/Type\s*/Page\b").expect("valid page type regex");

        let mut bodies: BTreeMap<PageId, &[u8]> = BTreeMap::new();
        let mut page_ids: Vec<PageId> = Vec::new();
        let mut content_refs: BTreeMap<PageId, Vec<PageId>> = BTreeMap::new();

        for caps in obj_re.captures_iter(data) {
            let num: u32 = match parse_ascii_number(&caps[1]) {
                Some(n) => n,
                None => continue,
            };
            let gen: u16 = parse_ascii_number(&caps[2]).unwrap_or(0) as u16;
            let id = (num, gen);
            // get() keeps the haystack lifetime; bodies outlive this capture.
            let body = caps.get(3).expect("body group").as_bytes();
            bodies.insert(id, body);

            if page_type_re.is_match(body) {
                let mut refs = Vec::new();
                if let Some(c) = contents_ref_re.captures(body) {
                    if let (Some(n), Some(g)) =
                        (parse_ascii_number(&c[1]), parse_ascii_number(&c[2]))
                    {
                        refs.push((n, g as u16));
                    }
                } else if let Some(c) = contents_arr_re.captures(body) {
                    for r in ref_re.captures_iter(&c[1]) {
                        if let (Some(n), Some(g)) =
                            (parse_ascii_number(&r[1]), parse_ascii_number(&r[2]))
                        {
                            refs.push((n, g as u16));
                        }
                    }
                }
                page_ids.push(id);
                content_refs.insert(id, refs);
            }
        }

        if page_ids.is_empty() {
            return Err(Error::UnreadablePdf(
                "no page objects found in linear scan".to_string(),
            ));
        }

        let mut contents = BTreeMap::new();
        for (page_id, refs) in content_refs {
            let mut stream = Vec::new();
            for content_id in refs {
                if let Some(body) = bodies.get(&content_id) {
                    if let Some(data) = extract_stream(body) {
                        stream.extend_from_slice(&data);
                        stream.push(b' ');
                    }
                }
            }
            contents.insert(page_id, stream);
        }

        let version = crate::detect::detect_version_from_bytes(&data[..data.len().min(16)])
            .unwrap_or_else(|_| "1.4".to_string());

        log::warn!(
            "recovered {} page(s) via linear scan; font metadata unavailable",
            page_ids.len()
        );

        Ok(Self {
            page_ids,
            contents,
            version,
        })
    }
}

impl PdfBackend for RecoveredBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.page_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (i as u32 + 1, *id))
            .collect()
    }

    fn page_fonts(&self, _page: PageId) -> Result<Vec<FontInfo>> {
        Ok(Vec::new())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
        Ok(self.contents.get(&page).cloned().unwrap_or_default())
    }

    fn decode_text(&self, _page: PageId, _font_name: &[u8], bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }

    fn info(&self) -> DocInfo {
        DocInfo::with_version(self.version.clone())
    }
}

/// Pull the payload out of a `stream … endstream` body, inflating
/// FlateDecode data when the object declares that filter.
fn extract_stream(body: &[u8]) -> Option<Vec<u8>> {
    let stream_re =
        Regex::new(r"(?s-u)stream\r?\n(.*?)endstream").expect("valid stream regex");
    let caps = stream_re.captures(body)?;
    let mut raw: &[u8] = &caps[1];

    // The EOL before `endstream` is a delimiter, not stream data.
    if raw.ends_with(b"\n") {
        raw = &raw[..raw.len() - 1];
    }
    if raw.ends_with(b"\r") {
        raw = &raw[..raw.len() - 1];
    }

    let flate_re = Regex::new(r"(?-u)/Filter\s*(\[[^\]]*/FlateDecode[^\]]*\]|/FlateDecode)")
        .expect("valid filter regex");
    if flate_re.is_match(body) {
        let mut decoded = Vec::new();
        let mut decoder = flate2::read::ZlibDecoder::new(raw);
        match decoder.read_to_end(&mut decoded) {
            Ok(_) => return Some(decoded),
            Err(e) => {
                log::warn!("FlateDecode failed during recovery: {}", e);
                return None;
            }
        }
    }

    Some(raw.to_vec())
}

fn parse_ascii_number(bytes: &[u8]) -> Option<u32> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_pdf_value_as_number() {
        assert_eq!(PdfValue::Integer(42).as_number(), Some(42.0));
        assert_eq!(PdfValue::Real(3.5).as_number(), Some(3.5));
        assert_eq!(PdfValue::Other.as_number(), None);
    }

    #[test]
    fn test_parse_pdf_date() {
        use chrono::Datelike;
        let date = parse_pdf_date("D:20240115103045").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_pdf_date_minimal() {
        use chrono::Datelike;
        let date = parse_pdf_date("D:2024").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
    }

    #[test]
    fn test_recovery_scan_finds_page_objects() {
        let data = b"%PDF-1.4\n\
            1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
            2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n\
            3 0 obj << /Type /Page /Parent 2 0 R /Contents 4 0 R >> endobj\n\
            4 0 obj << /Length 44 >> stream\n\
            BT /F1 12 Tf 72 700 Td (Hello) Tj ET\n\
            endstream endobj\n\
            trailer << /Root 1 0 R >>";

        let backend = RecoveredBackend::scan(data).unwrap();
        assert_eq!(backend.page_count(), 1);

        let pages = backend.pages();
        let content = backend.page_content(pages[&1]).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("(Hello) Tj"));
    }

    #[test]
    fn test_recovery_scan_rejects_pageless_bytes() {
        let result = RecoveredBackend::scan(b"not a pdf at all");
        assert!(matches!(result, Err(Error::UnreadablePdf(_))));
    }

    #[test]
    fn test_extract_stream_raw() {
        let body = b"<< /Length 5 >> stream\nhello\nendstream";
        assert_eq!(extract_stream(body).unwrap(), b"hello");
    }
}
