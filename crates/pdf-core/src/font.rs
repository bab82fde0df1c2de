//! Font handling for text overlays
//!
//! Two kinds of fonts are supported: the standard Helvetica-Bold font, which
//! every viewer ships and which needs only its widths to lay out text, and
//! caller-supplied TrueType fonts embedded as Type0/CIDFontType2.

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use std::collections::BTreeSet;

/// Helvetica-Bold advance widths for WinAnsi codes 0x20..=0x7E (1000 units/em)
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A-Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, // a-z
    389, 280, 389, 584, // {..~
];

/// Helvetica-Bold advance widths for WinAnsi codes 0xA0..=0xFF
const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // A0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // B0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // C0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // D0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // E0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // F0
];

/// Helvetica-Bold pair kerning in 1000 units/em, keyed by WinAnsi codes
///
/// 0x91..=0x94 are the curly quotes; the straight apostrophe (0x27) has no
/// kerning.
fn helvetica_bold_kerning(left: u8, right: u8) -> i32 {
    const SPACE: u8 = b' ';
    const COMMA: u8 = b',';
    const HYPHEN: u8 = b'-';
    const PERIOD: u8 = b'.';
    const COLON: u8 = b':';
    const SEMICOLON: u8 = b';';
    const QUOTE_LEFT: u8 = 0x91;
    const QUOTE_RIGHT: u8 = 0x92;
    const DOUBLE_QUOTE_LEFT: u8 = 0x93;
    const DOUBLE_QUOTE_RIGHT: u8 = 0x94;

    match (left, right) {
        (b'A', b'C' | b'O' | b'Q') => -40,
        (b'A', b'G' | b'U') => -50,
        (b'A', b'T') => -90,
        (b'A', b'V') => -80,
        (b'A', b'W') => -60,
        (b'A', b'Y') => -110,
        (b'A', b'u' | b'w' | b'y') => -30,
        (b'A', b'v') => -40,

        (b'B', b'A') => -30,
        (b'B', b'U') => -10,

        (b'D', b'A' | b'V' | b'W') => -40,
        (b'D', b'Y') => -70,
        (b'D', COMMA | PERIOD) => -30,

        (b'F', b'A') => -80,
        (b'F', b'a') => -20,
        (b'F', COMMA | PERIOD) => -100,

        (b'J', b'A' | COMMA | PERIOD | b'u') => -20,

        (b'K', b'O' | b'u') => -30,
        (b'K', b'e') => -15,
        (b'K', b'o') => -35,
        (b'K', b'y') => -40,

        (b'L', b'T') => -90,
        (b'L', b'V') => -110,
        (b'L', b'W') => -80,
        (b'L', b'Y') => -120,
        (b'L', QUOTE_RIGHT | DOUBLE_QUOTE_RIGHT) => -140,
        (b'L', b'y') => -30,

        (b'O', b'A' | b'V' | b'W' | b'X') => -50,
        (b'O', b'T' | COMMA | PERIOD) => -40,
        (b'O', b'Y') => -70,

        (b'P', b'A') => -100,
        (b'P', b'a' | b'e') => -30,
        (b'P', b'o') => -40,
        (b'P', COMMA | PERIOD) => -120,

        (b'Q', b'U') => -10,

        (b'R', b'O' | b'T' | b'U') => -20,
        (b'R', b'V' | b'Y') => -50,
        (b'R', b'W') => -40,

        (b'S', COMMA | PERIOD) => -20,

        (b'T', b'A' | b'u') => -90,
        (b'T', b'O' | COLON | SEMICOLON) => -40,
        (b'T', b'a' | b'o' | b'r' | COMMA | PERIOD) => -80,
        (b'T', b'e' | b'w' | b'y') => -60,
        (b'T', HYPHEN) => -120,

        (b'U', b'A') => -50,
        (b'U', COMMA | PERIOD) => -30,

        (b'V', b'A' | HYPHEN) => -80,
        (b'V', b'G' | b'O' | b'e') => -50,
        (b'V', b'a' | b'u') => -60,
        (b'V', COLON | SEMICOLON) => -40,
        (b'V', COMMA | PERIOD) => -120,
        (b'V', b'o') => -90,

        (b'W', b'A' | b'o') => -60,
        (b'W', b'O' | b'y') => -20,
        (b'W', b'a' | HYPHEN) => -40,
        (b'W', COLON | SEMICOLON) => -10,
        (b'W', COMMA | PERIOD) => -80,
        (b'W', b'e') => -35,
        (b'W', b'u') => -45,

        (b'Y', b'A') => -110,
        (b'Y', b'O') => -70,
        (b'Y', b'a') => -90,
        (b'Y', COLON | SEMICOLON) => -50,
        (b'Y', b'e') => -80,
        (b'Y', b'o' | b'u' | COMMA | PERIOD) => -100,

        (b'a', b'g') => -10,
        (b'a', b'v' | b'w') => -15,
        (b'a', b'y') => -20,

        (b'b', b'b' | b'l') => -10,
        (b'b', b'u' | b'v' | b'y') => -20,

        (b'c', b'h' | b'y') => -10,
        (b'c', b'k' | b'l') => -20,

        (b'd', b'd') => -10,
        (b'd', b'v' | b'w' | b'y') => -15,

        (b'e', COMMA) => 10,
        (b'e', PERIOD) => 20,
        (b'e', b'v' | b'w' | b'x' | b'y') => -15,

        (b'f', COMMA | PERIOD | b'e') => -10,
        (b'f', b'o') => -20,
        (b'f', QUOTE_RIGHT | DOUBLE_QUOTE_RIGHT) => 30,

        (b'g', b'e') => 10,
        (b'g', b'g') => -10,

        (b'h', b'y') => -20,
        (b'k', b'o') => -15,
        (b'l', b'w' | b'y') => -15,

        (b'm', b'u') => -20,
        (b'm', b'y') => -30,

        (b'n', b'u') => -10,
        (b'n', b'v') => -40,
        (b'n', b'y') => -20,

        (b'o', b'v' | b'y') => -20,
        (b'o', b'w') => -15,
        (b'o', b'x') => -30,

        (b'p', b'y') => -15,

        (b'r', b'c' | b'd' | HYPHEN | b'o' | b'q') => -20,
        (b'r', COMMA | PERIOD) => -60,
        (b'r', b's') => -15,
        (b'r', b't') => 20,
        (b'r', b'v' | b'y') => 10,

        (b's', b'w') => -15,

        (b'v', b'a') => -20,
        (b'v', b'o') => -30,
        (b'v', COMMA | PERIOD) => -80,

        (b'w', COMMA | PERIOD) => -40,
        (b'w', b'o') => -20,

        (b'x', b'e') => -10,

        (b'y', b'a') => -30,
        (b'y', b'e') => -10,
        (b'y', b'o') => -25,
        (b'y', COMMA | PERIOD) => -80,

        (b'z', b'e') => 10,

        (COLON | SEMICOLON, SPACE) => -40,
        (COMMA | PERIOD, QUOTE_RIGHT | DOUBLE_QUOTE_RIGHT) => -120,
        (COMMA | PERIOD, SPACE) => -40,
        (DOUBLE_QUOTE_RIGHT, SPACE) => -80,
        (QUOTE_LEFT, QUOTE_LEFT) => -46,
        (QUOTE_RIGHT, QUOTE_RIGHT) => -46,
        (QUOTE_RIGHT, b'd' | SPACE) => -80,
        (QUOTE_RIGHT, b'l' | b'v') => -20,
        (QUOTE_RIGHT, b'r') => -40,
        (QUOTE_RIGHT, b's') => -60,

        (SPACE, b'T') => -100,
        (SPACE, b'V' | b'W' | DOUBLE_QUOTE_LEFT) => -80,
        (SPACE, b'Y') => -120,
        (SPACE, QUOTE_LEFT) => -60,

        _ => 0,
    }
}

/// Base letter an accented WinAnsi letter kerns like
fn kerning_base(code: u8) -> u8 {
    match code {
        0xC0..=0xC5 => b'A',
        0xC7 => b'C',
        0xC8..=0xCB => b'E',
        0xCC..=0xCF => b'I',
        0xD1 => b'N',
        0xD2..=0xD6 | 0xD8 => b'O',
        0xD9..=0xDC => b'U',
        0xDD | 0x9F => b'Y',
        0x8A => b'S',
        0x8E => b'Z',
        0xE0..=0xE5 => b'a',
        0xE7 => b'c',
        0xE8..=0xEB => b'e',
        0xEC..=0xEF => b'i',
        0xF1 => b'n',
        0xF2..=0xF6 | 0xF8 => b'o',
        0xF9..=0xFC => b'u',
        0xFD | 0xFF => b'y',
        0x9A => b's',
        0x9E => b'z',
        _ => code,
    }
}

/// Built-in fonts that need no embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    #[default]
    HelveticaBold,
}

impl StandardFont {
    /// PostScript name used as `/BaseFont`
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Map a character to its WinAnsiEncoding code
    pub fn encode_char(&self, c: char) -> Option<u8> {
        let code = match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => return None,
        };
        Some(code)
    }

    /// Advance width of a WinAnsi code in 1000 units/em
    fn code_width(&self, code: u8) -> u16 {
        match code {
            0x20..=0x7E => HELVETICA_BOLD_ASCII[(code - 0x20) as usize],
            0xA0..=0xFF => HELVETICA_BOLD_LATIN1[(code - 0xA0) as usize],
            0x80 | 0x83 | 0x86 | 0x87 | 0x96 => 556,
            0x82 | 0x91 | 0x92 => 278,
            0x84 | 0x93 | 0x94 => 500,
            0x85 | 0x89 | 0x8C | 0x97 | 0x99 => 1000,
            0x88 | 0x8B | 0x98 | 0x9B => 333,
            0x8A | 0x9F => 667,
            0x8E => 611,
            0x95 => 350,
            0x9A => 556,
            0x9C => 944,
            0x9E => 500,
            _ => 556,
        }
    }

    /// Encode text as WinAnsi bytes, failing on the first unsupported character
    pub fn encode_text(&self, text: &str) -> Result<Vec<u8>> {
        text.chars()
            .map(|c| self.encode_char(c).ok_or(PdfError::FontEncoding(c)))
            .collect()
    }

    /// Kerning between two adjacent WinAnsi codes in 1000 units/em
    pub fn kerning(&self, left: u8, right: u8) -> i32 {
        match self {
            StandardFont::HelveticaBold => {
                helvetica_bold_kerning(kerning_base(left), kerning_base(right))
            }
        }
    }

    /// Calculate text width in points for a given font size
    ///
    /// Advance widths plus pair kerning, the width viewers lay the run out at.
    pub fn text_width_points(&self, text: &str, font_size: f32) -> Result<f64> {
        let codes = self.encode_text(text)?;
        let advances: i32 = codes.iter().map(|&code| self.code_width(code) as i32).sum();
        let kerning: i32 = codes
            .windows(2)
            .map(|pair| self.kerning(pair[0], pair[1]))
            .sum();
        Ok((advances + kerning) as f64 * font_size as f64 / 1000.0)
    }

    /// Simple font dictionary with WinAnsiEncoding
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(self.base_font().as_bytes().to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ])
    }
}

/// TrueType font data for embedding
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Characters drawn with this font
    pub used_chars: BTreeSet<char>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier, also used as the PDF base font name
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data: ttf_data.to_vec(),
            used_chars: BTreeSet::new(),
        })
    }

    /// Parse the face on demand; validated once in `from_ttf`
    fn face(&self) -> Result<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))
    }

    /// Record characters drawn with this font
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> Result<f64> {
        let face = self.face()?;
        let units: u32 = text
            .chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(|w| w as u32)
            .sum();
        Ok(units as f64 / face.units_per_em() as f64 * font_size as f64)
    }

    /// Encode text as a hex string of 2-byte glyph IDs (Identity-H)
    ///
    /// Characters without a glyph fail rather than silently drawing `.notdef`.
    pub fn encode_text_hex(&self, text: &str) -> Result<String> {
        let face = self.face()?;
        let mut result = String::with_capacity(text.len() * 4 + 2);
        result.push('<');
        for c in text.chars() {
            let gid = face
                .glyph_index(c)
                .filter(|gid| gid.0 != 0)
                .ok_or(PdfError::FontEncoding(c))?;
            result.push_str(&format!("{:04X}", gid.0));
        }
        result.push('>');
        Ok(result)
    }

    /// Base font name with characters that are not valid in a PDF name removed
    fn base_font_name(&self) -> Vec<u8> {
        let cleaned: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        if cleaned.is_empty() {
            b"EmbeddedFont".to_vec()
        } else {
            cleaned.into_bytes()
        }
    }

    /// Generate all PDF objects needed to embed this font
    ///
    /// Object references between them are left as placeholders; the document
    /// wires them up when it adds the objects.
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let face = self.face()?;
        let font_name = Object::Name(self.base_font_name());
        let scale = 1000.0 / face.units_per_em() as f64;
        let to_pdf_units = |v: i16| Object::Integer((v as f64 * scale).round() as i64);

        let tounicode_content = self.generate_tounicode_cmap(&face);
        let tounicode_stream = Stream::new(Dictionary::new(), tounicode_content.into_bytes());

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        );

        let bbox = face.global_bounding_box();
        let font_bbox = vec![
            to_pdf_units(bbox.x_min),
            to_pdf_units(bbox.y_min),
            to_pdf_units(bbox.x_max),
            to_pdf_units(bbox.y_max),
        ];
        let cap_height = face.capital_height().unwrap_or(face.ascender());

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", to_pdf_units(face.ascender())),
            ("Descent", to_pdf_units(face.descender())),
            ("CapHeight", to_pdf_units(cap_height)),
            ("StemV", 80.into()),
            ("FontFile2", Object::Null),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Null),
            ("CIDToGIDMap", Object::Name(b"Identity".to_vec())),
            ("W", self.generate_widths_array(&face, scale).into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", font_name),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
            ("DescendantFonts", Object::Array(vec![])),
            ("ToUnicode", Object::Null),
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Add the font objects to `doc`, storing the Type0 dictionary at `type0_id`
    pub(crate) fn embed_into(&self, doc: &mut lopdf::Document, type0_id: ObjectId) -> Result<()> {
        let objects = self.to_pdf_objects()?;

        let font_file_id = doc.add_object(objects.font_file_stream);

        let mut font_descriptor = objects.font_descriptor;
        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
        let font_descriptor_id = doc.add_object(font_descriptor);

        let mut cid_font = objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
        let cid_font_id = doc.add_object(cid_font);

        let tounicode_id = doc.add_object(objects.tounicode_stream);

        let mut type0_font = objects.type0_font;
        type0_font.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );
        type0_font.set("ToUnicode", Object::Reference(tounicode_id));
        doc.objects.insert(type0_id, Object::Dictionary(type0_font));

        Ok(())
    }

    /// Generate /W array for used glyphs: [gid1 [w1] gid2 [w2] ...]
    fn generate_widths_array(&self, face: &ttf_parser::Face<'_>, scale: f64) -> Vec<Object> {
        let mut gids: Vec<ttf_parser::GlyphId> = self
            .used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c))
            .collect();
        gids.sort();
        gids.dedup();

        let mut widths = Vec::with_capacity(gids.len() * 2);
        for gid in gids {
            let advance = face.glyph_hor_advance(gid).unwrap_or(0) as f64 * scale;
            widths.push((gid.0 as i64).into());
            widths.push(Object::Array(vec![(advance.round() as i64).into()]));
        }
        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self, face: &ttf_parser::Face<'_>) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let mappings: Vec<(u16, char)> = self
            .used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c).map(|gid| (gid.0, c)))
            .collect();

        // At most 100 entries per bfchar section
        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut units = [0u16; 2];
                let hex: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

/// A font usable for text overlays
#[derive(Debug, Clone)]
pub enum Font {
    Standard(StandardFont),
    TrueType(FontData),
}

impl Default for Font {
    fn default() -> Self {
        Font::Standard(StandardFont::default())
    }
}

impl Font {
    /// Width of `text` in points at `font_size`
    pub fn text_width_points(&self, text: &str, font_size: f32) -> Result<f64> {
        match self {
            Font::Standard(font) => font.text_width_points(text, font_size),
            Font::TrueType(font) => font.text_width_points(text, font_size),
        }
    }

    /// Hex string operand for `Tj`
    pub fn encode_text_hex(&self, text: &str) -> Result<String> {
        match self {
            Font::Standard(font) => {
                let bytes = font.encode_text(text)?;
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                Ok(format!("<{hex}>"))
            }
            Font::TrueType(font) => font.encode_text_hex(text),
        }
    }
}

/// A font registered with a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontHandle {
    pub(crate) slot: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_width_tables_cover_expected_codes() {
        let font = StandardFont::HelveticaBold;
        assert_eq!(font.code_width(b' '), 278);
        assert_eq!(font.code_width(b'0'), 556);
        assert_eq!(font.code_width(b'@'), 975);
        assert_eq!(font.code_width(b'W'), 944);
        assert_eq!(font.code_width(b'm'), 889);
        assert_eq!(font.code_width(b'~'), 584);
        assert_eq!(font.code_width(0xC9), 667); // É
        assert_eq!(font.code_width(0xFF), 556); // ÿ
    }

    #[test]
    fn test_helvetica_bold_text_width() {
        let font = StandardFont::HelveticaBold;
        // C(722) O(778) N(722) F(611) I(278) D(722) E(667) N(722) T(611) I(278) A(722) L(611)
        let width = font.text_width_points("CONFIDENTIAL", 50.0).unwrap();
        assert!((width - 7444.0 * 50.0 / 1000.0).abs() < 1e-9);
        assert_eq!(font.text_width_points("", 50.0).unwrap(), 0.0);
    }

    #[test]
    fn test_kerned_text_width() {
        let font = StandardFont::HelveticaBold;
        // A(722) V(667) A(722) T(611) A(722) R(722) = 4166
        // AV -80, VA -80, AT -90, TA -90
        let width = font.text_width_points("AVATAR", 1000.0).unwrap();
        assert_eq!(width, 3826.0);

        assert_eq!(font.kerning(b'W', b'A'), -60);
        assert_eq!(font.kerning(0xC0, b'V'), -80); // À kerns like A
        assert_eq!(font.kerning(b'H', b'I'), 0);
    }

    #[test]
    fn test_winansi_encoding() {
        let font = StandardFont::HelveticaBold;
        assert_eq!(font.encode_text("Aé€").unwrap(), vec![0x41, 0xE9, 0x80]);
        assert!(matches!(
            font.encode_text("สวัสดี"),
            Err(PdfError::FontEncoding('ส'))
        ));
    }

    #[test]
    fn test_font_hex_operand() {
        let font = Font::default();
        assert_eq!(font.encode_text_hex("Hi").unwrap(), "<4869>");
    }

    #[test]
    fn test_standard_font_dictionary() {
        let dict = StandardFont::HelveticaBold.to_pdf_dictionary();
        assert_eq!(
            dict.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica-Bold"
        );
        assert_eq!(
            dict.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
    }

    /// Glyphs for 'A' (600), 'B' (700) and 'Ж' (800) at 1000 units/em
    fn glyph_font() -> FontData {
        FontData::from_ttf("Glyphs Test", include_bytes!("../tests/fixtures/glyphs.ttf")).unwrap()
    }

    #[test]
    fn test_truetype_width_and_encoding() {
        let font = glyph_font();
        let width = font.text_width_points("ABЖ", 10.0).unwrap();
        assert!((width - 21.0).abs() < 1e-9);

        assert_eq!(font.encode_text_hex("BAЖ").unwrap(), "<000200010003>");
        assert!(matches!(
            font.encode_text_hex("AC"),
            Err(PdfError::FontEncoding('C'))
        ));
    }

    #[test]
    fn test_truetype_pdf_objects() {
        let mut font = glyph_font();
        font.add_chars("ЖBA");
        let objects = font.to_pdf_objects().unwrap();

        assert_eq!(
            objects.type0_font.get(b"Subtype").unwrap().as_name().unwrap(),
            b"Type0"
        );
        assert_eq!(
            objects.type0_font.get(b"Encoding").unwrap().as_name().unwrap(),
            b"Identity-H"
        );
        assert_eq!(
            objects.cid_font.get(b"Subtype").unwrap().as_name().unwrap(),
            b"CIDFontType2"
        );
        assert_eq!(
            objects.font_descriptor.get(b"FontName").unwrap().as_name().unwrap(),
            b"Glyphs-Test"
        );

        let widths = objects.cid_font.get(b"W").unwrap().as_array().unwrap();
        let expected: Vec<Object> = [(1, 600), (2, 700), (3, 800)]
            .into_iter()
            .flat_map(|(gid, w)| {
                [
                    Object::Integer(gid),
                    Object::Array(vec![Object::Integer(w)]),
                ]
            })
            .collect();
        assert_eq!(widths, &expected);

        let cmap = String::from_utf8(objects.tounicode_stream.content).unwrap();
        assert!(cmap.contains("3 beginbfchar"));
        assert!(cmap.contains("<0001> <0041>"));
        assert!(cmap.contains("<0003> <0416>"));
        assert_eq!(objects.font_file_stream.content, font.ttf_data);
    }

    #[test]
    fn test_invalid_ttf_rejected() {
        assert!(matches!(
            FontData::from_ttf("broken", &[0u8; 100]),
            Err(PdfError::FontParseError(_))
        ));
    }
}
