//! Drawing primitives over lopdf content streams.
//!
//! Callers work in top-down page coordinates (origin at the top-left
//! corner, y growing downwards, text positioned by the top of its line);
//! the canvas flips them into PDF user space.

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use super::fonts::{Font, encode_win_ansi};
use crate::core::InvoiceError;

/// Helvetica ascender in 1/1000 em, used to place the baseline below the
/// top of a text line.
const ASCENT: f64 = 0.718;

/// An RGB color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::from_hex(0x000000);
    pub const WHITE: Color = Color::from_hex(0xFFFFFF);

    /// `0xRRGGBB`.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    fn operands(&self) -> Vec<Object> {
        vec![self.r.into(), self.g.into(), self.b.into()]
    }
}

/// Font, size and fill color for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f64,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(font: Font, size: f64, color: Color) -> Self {
        Self { font, size, color }
    }
}

/// A piece of text placed on a page, kept alongside the content stream so
/// the rendered layout can be inspected without parsing PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Zero-based page index.
    pub page: usize,
    pub x: f64,
    /// Top of the text line, top-down coordinates.
    pub y: f64,
    pub font: Font,
    pub size: f64,
    pub color: Color,
    pub text: String,
}

/// Document metadata written to the PDF Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
}

/// Page-by-page operation recorder.
#[derive(Debug)]
pub struct Canvas {
    width: f64,
    height: f64,
    pages: Vec<Vec<Operation>>,
    runs: Vec<TextRun>,
    /// Fill opacities in percent, one ExtGState each.
    opacities: BTreeSet<u8>,
}

impl Canvas {
    /// A canvas with one empty page of the given size in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: vec![Vec::new()],
            runs: Vec::new(),
            opacities: BTreeSet::new(),
        }
    }

    /// Start a new page; subsequent drawing goes there.
    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.pages.len() - 1
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        let index = self.current_page();
        &mut self.pages[index]
    }

    /// Filled rectangle with its top-left corner at `(x, y)`.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color) {
        let bottom = self.height - y - h;
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("rg", fill.operands()));
        ops.push(Operation::new("re", vec![real(x), real(bottom), real(w), real(h)]));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Filled rectangle painted at `opacity` (0..=1) over what is below.
    pub fn fill_rect_translucent(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Color,
        opacity: f64,
    ) {
        let percent = (opacity.clamp(0.0, 1.0) * 100.0).round() as u8;
        self.opacities.insert(percent);
        let bottom = self.height - y - h;
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("gs", vec![Object::Name(opacity_name(percent).into_bytes())]));
        ops.push(Operation::new("rg", fill.operands()));
        ops.push(Operation::new("re", vec![real(x), real(bottom), real(w), real(h)]));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Filled and outlined rectangle.
    pub fn fill_stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color, stroke: Color) {
        let bottom = self.height - y - h;
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![real(1.0)]));
        ops.push(Operation::new("rg", fill.operands()));
        ops.push(Operation::new("RG", stroke.operands()));
        ops.push(Operation::new("re", vec![real(x), real(bottom), real(w), real(h)]));
        ops.push(Operation::new("B", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Horizontal rule from `x1` to `x2` at height `y`.
    pub fn hline(&mut self, x1: f64, x2: f64, y: f64, color: Color, width: f64) {
        let y = self.height - y;
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![real(width)]));
        ops.push(Operation::new("RG", color.operands()));
        ops.push(Operation::new("m", vec![real(x1), real(y)]));
        ops.push(Operation::new("l", vec![real(x2), real(y)]));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Text whose line top-left corner is at `(x, y)`.
    pub fn text(&mut self, x: f64, y: f64, text: &str, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        let baseline = self.height - y - ASCENT * style.size;
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(style.font.resource_name().as_bytes().to_vec()), real(style.size)],
        ));
        ops.push(Operation::new("rg", style.color.operands()));
        ops.push(Operation::new("Td", vec![real(x), real(baseline)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(text))],
        ));
        ops.push(Operation::new("ET", vec![]));

        let page = self.current_page();
        self.runs.push(TextRun {
            page,
            x,
            y,
            font: style.font,
            size: style.size,
            color: style.color,
            text: text.to_string(),
        });
    }

    /// Text right-aligned within the box `[x, x + width]`.
    pub fn text_right(&mut self, x: f64, width: f64, y: f64, text: &str, style: TextStyle) {
        let measured = style.font.measure(text, style.size);
        self.text(x + (width - measured).max(0.0), y, text, style);
    }

    /// Text centered within the box `[x, x + width]`.
    pub fn text_centered(&mut self, x: f64, width: f64, y: f64, text: &str, style: TextStyle) {
        let measured = style.font.measure(text, style.size);
        self.text(x + ((width - measured) / 2.0).max(0.0), y, text, style);
    }

    /// Assemble the recorded pages into a serialized PDF.
    pub fn finish(self, info: &DocumentInfo) -> Result<(Vec<u8>, Vec<TextRun>), InvoiceError> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_ids: Vec<(Font, lopdf::ObjectId)> = [Font::Regular, Font::Bold]
            .into_iter()
            .map(|font| {
                let id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_name(),
                    "Encoding" => "WinAnsiEncoding",
                });
                (font, id)
            })
            .collect();
        let mut fonts = lopdf::Dictionary::new();
        for (font, id) in font_ids {
            fonts.set(font.resource_name(), Object::Reference(id));
        }
        let mut resources = dictionary! { "Font" => fonts };
        if !self.opacities.is_empty() {
            let mut states = lopdf::Dictionary::new();
            for percent in &self.opacities {
                let alpha = real(f64::from(*percent) / 100.0);
                states.set(
                    opacity_name(*percent),
                    dictionary! { "Type" => "ExtGState", "ca" => alpha.clone(), "CA" => alpha },
                );
            }
            resources.set("ExtGState", states);
        }
        let resources_id = doc.add_object(resources);

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| InvoiceError::Render(format!("failed to encode content: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    real(self.width),
                    real(self.height),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(&info.title)),
            "Author" => Object::string_literal(encode_win_ansi(&info.author)),
            "Subject" => Object::string_literal(encode_win_ansi(&info.subject)),
            "Creator" => Object::string_literal("rental-invoice"),
        });
        doc.trailer.set("Info", info_id);

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| InvoiceError::Render(format!("failed to save PDF: {e}")))?;
        Ok((output, self.runs))
    }
}

fn opacity_name(percent: u8) -> String {
    format!("GA{percent}")
}

fn real(value: f64) -> Object {
    (value as f32).into()
}
