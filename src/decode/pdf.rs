//! `lopdf`-backed fragment source.
//!
//! Walks each page's content stream and emits one fragment per text-showing
//! operator, positioned in top-down page coordinates.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{BBox, Fragment, PageFragments};
use crate::text::is_spaceless_script_char;

use super::FragmentSource;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Average glyph advance as a fraction of the font size; no font metrics are read.
const GLYPH_ADVANCE: f32 = 0.5;
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// TJ adjustments above this (thousandths of an em) are read as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Nesting limit when following /Parent for inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Check the header and return the PDF version string.
pub fn sniff_pdf(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    let chars: Vec<char> = version.chars().collect();
    let valid = chars.len() == 3
        && chars[0].is_ascii_digit()
        && chars[1] == '.'
        && chars[2].is_ascii_digit()
        && matches!(chars[0], '1' | '2');
    if !valid {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

/// Fragment source backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
    version: String,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let version = sniff_pdf(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            log::debug!("Document is encrypted; decoding with the empty user password");
        }
        Ok(Self { doc, version })
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// PDF version from the file header (e.g. "1.7").
    pub fn version(&self) -> &str {
        &self.version
    }

    fn page_id(&self, page_num: u32) -> Result<ObjectId> {
        let pages = self.doc.get_pages();
        pages
            .get(&page_num)
            .copied()
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))
    }

    /// Look up a page attribute, following /Parent for inherited values.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(self.resolve(value));
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Media box as `[x0, y0, x1, y1]`, defaulting to US Letter.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let values: Option<Vec<f32>> = self
            .inherited(page_id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .map(|arr| arr.iter().filter_map(|o| get_number(self.resolve(o))).collect());

        match values.as_deref() {
            Some(&[x0, y0, x1, y1]) if x1 != x0 && y1 != y0 => {
                [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)]
            }
            _ => [0.0, 0.0, 612.0, 792.0],
        }
    }

    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without /Contents is blank
            Err(_) => return Ok(Vec::new()),
        };

        match self.resolve(contents) {
            Object::Stream(s) => Ok(stream_bytes(s)),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = self.resolve(obj) {
                        content.extend_from_slice(&stream_bytes(s));
                        content.push(b' ');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn walk_content(
        &self,
        content: &[u8],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        base_fonts: &HashMap<Vec<u8>, String>,
        frame: &PageFrame,
    ) -> Result<Vec<Fragment>> {
        let content = Content::decode(content)?;

        let mut fragments = Vec::new();
        let mut state = TextState::default();
        let mut in_text_block = false;

        for op in &content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    state.matrix = TextMatrix::default();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if let [Object::Name(name), size, ..] = op.operands.as_slice() {
                        state.font_key = name.clone();
                        state.font_name = base_fonts
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                        state.font_size = get_number(size).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = op.operands.as_slice() {
                        let tx = get_number(tx).unwrap_or(0.0);
                        let ty = get_number(ty).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let n: Vec<f32> = op
                            .operands
                            .iter()
                            .take(6)
                            .map(|o| get_number(o).unwrap_or(0.0))
                            .collect();
                        state.matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                    }
                }
                "T*" => state.matrix.next_line(state.leading),
                "Tj" | "TJ" | "'" | "\"" => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        state.matrix.next_line(state.leading);
                    }
                    if !in_text_block {
                        continue;
                    }
                    let text = self.show_text(&op.operator, &op.operands, fonts, &state);
                    if let Some(fragment) = state.emit(text, frame) {
                        fragments.push(fragment);
                    }
                }
                _ => {}
            }
        }

        Ok(fragments)
    }

    /// Decode the string operand(s) of a text-showing operator.
    fn show_text(
        &self,
        operator: &str,
        operands: &[Object],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        state: &TextState,
    ) -> String {
        let decode = |bytes: &[u8]| -> String {
            let encoding = fonts
                .get(&state.font_key)
                .and_then(|f| f.get_font_encoding(&self.doc).ok());
            match encoding {
                Some(enc) => LopdfDocument::decode_text(&enc, bytes)
                    .unwrap_or_else(|_| decode_text_simple(bytes)),
                None => decode_text_simple(bytes),
            }
        };

        match operator {
            "TJ" => {
                let Some(Object::Array(items)) = operands.first() else {
                    return String::new();
                };
                let mut combined = String::new();
                for item in items {
                    match item {
                        Object::String(bytes, _) => combined.push_str(&decode(bytes)),
                        other => {
                            let adjustment = -get_number(other).unwrap_or(0.0);
                            if adjustment > TJ_SPACE_THRESHOLD && needs_space(&combined) {
                                combined.push(' ');
                            }
                        }
                    }
                }
                combined
            }
            "\"" => match operands.get(2) {
                Some(Object::String(bytes, _)) => decode(bytes),
                _ => String::new(),
            },
            _ => match operands.first() {
                Some(Object::String(bytes, _)) => decode(bytes),
                _ => String::new(),
            },
        }
    }

    /// Read the document-info /Title.
    fn info_title(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let dict = match info {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        let title = match dict.get(b"Title").ok().map(|o| self.resolve(o))? {
            Object::String(bytes, _) => decode_text_simple(bytes),
            Object::Name(bytes) => String::from_utf8_lossy(bytes).to_string(),
            _ => return None,
        };
        let title = title.trim_matches(char::from(0)).trim().to_string();
        (!title.is_empty()).then_some(title)
    }
}

impl FragmentSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    fn metadata_title(&self) -> Option<String> {
        self.info_title()
    }

    fn decode_page(&self, page_num: u32) -> Result<PageFragments> {
        let page_id = self.page_id(page_num)?;
        let to_decode_error = |e: Error| match e {
            Error::PdfParse(reason) => Error::Decode {
                page: page_num,
                reason,
            },
            other => other,
        };

        let fonts = self.doc.get_page_fonts(page_id).map_err(|e| Error::Decode {
            page: page_num,
            reason: e.to_string(),
        })?;
        let base_fonts: HashMap<Vec<u8>, String> = fonts
            .iter()
            .map(|(name, dict)| {
                let base = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                (name.clone(), base)
            })
            .collect();

        let [x0, y0, x1, y1] = self.media_box(page_id);
        let frame = PageFrame { left: x0, top: y1 };

        let content = self.page_content(page_id).map_err(to_decode_error)?;
        let fragments = self
            .walk_content(&content, &fonts, &base_fonts, &frame)
            .map_err(to_decode_error)?;

        let mut page = PageFragments::new(page_num as usize - 1, x1 - x0, y1 - y0);
        for fragment in fragments {
            page.push(fragment);
        }
        log::debug!("Page {}: {} fragments", page_num, page.fragments.len());
        Ok(page)
    }
}

/// Origin shift from PDF user space (bottom-up) to top-down page space.
struct PageFrame {
    left: f32,
    top: f32,
}

/// Graphics state relevant to text placement.
struct TextState {
    matrix: TextMatrix,
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: TextMatrix::default(),
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Place `text` at the current position and advance past it.
    fn emit(&mut self, text: String, frame: &PageFrame) -> Option<Fragment> {
        let advance = text.chars().count() as f32 * self.font_size * GLYPH_ADVANCE;
        let (x, baseline) = self.matrix.position();
        let size = self.font_size * self.matrix.vertical_scale();
        let width = advance * self.matrix.horizontal_scale();
        self.matrix.advance(advance);

        if text.trim().is_empty() || size <= 0.0 {
            return None;
        }

        let left = x - frame.left;
        let top = frame.top - (baseline + size * ASCENT);
        let bottom = frame.top - (baseline - size * DESCENT);
        Some(Fragment::new(
            text,
            self.font_name.clone(),
            size,
            BBox::new(left, top, left + width, bottom),
            0,
        ))
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    // Start of the current line; Td and T* move relative to it
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self, leading: f32) {
        let leading = if leading != 0.0 { leading } else { 12.0 };
        self.translate(0.0, -leading);
    }

    /// Move along the baseline by `tx` text-space units.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Stream data, decompressed when a filter is present.
fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && c != '\u{00A0}' && !is_spaceless_script_char(c),
        None => false,
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_pdf() {
        assert_eq!(sniff_pdf(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap(), "1.7");
        assert_eq!(sniff_pdf(b"%PDF-2.0\n").unwrap(), "2.0");
        assert!(matches!(sniff_pdf(b"<!DOCTYPE html>"), Err(Error::UnknownFormat)));
        assert!(matches!(sniff_pdf(b"%PDF"), Err(Error::UnknownFormat)));
        assert!(matches!(
            sniff_pdf(b"%PDF-9.x\n"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        assert!(matches!(
            LopdfSource::load_bytes(b"PK\x03\x04 not a pdf"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[test]
    fn test_text_matrix_lines() {
        let mut m = TextMatrix::default();
        m.set(1.0, 0.0, 0.0, 1.0, 72.0, 700.0);
        m.advance(30.0);
        assert_eq!(m.position(), (102.0, 700.0));

        m.next_line(14.0);
        assert_eq!(m.position(), (72.0, 686.0));

        m.translate(10.0, -20.0);
        assert_eq!(m.position(), (82.0, 666.0));
    }

    #[test]
    fn test_emit_converts_to_top_down() {
        let frame = PageFrame {
            left: 0.0,
            top: 792.0,
        };
        let mut state = TextState {
            font_name: "Helvetica-Bold".to_string(),
            font_size: 20.0,
            ..TextState::default()
        };
        state.matrix.set(1.0, 0.0, 0.0, 1.0, 72.0, 700.0);

        let fragment = state.emit("Title".to_string(), &frame).unwrap();
        assert!(fragment.bold);
        assert_eq!(fragment.bbox.x0, 72.0);
        assert_eq!(fragment.bbox.x1, 122.0);
        assert_eq!(fragment.bbox.y0, 76.0);
        assert_eq!(fragment.bbox.y1, 96.0);
        // the pen moved past the text
        assert_eq!(state.matrix.position(), (122.0, 700.0));

        assert!(state.emit("   ".to_string(), &frame).is_none());
    }

    #[test]
    fn test_needs_space() {
        assert!(needs_space("word"));
        assert!(!needs_space("word "));
        assert!(!needs_space(""));
        assert!(!needs_space("漢"));
    }
}
