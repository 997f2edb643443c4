use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::brand::BrandMark;
use crate::error::Result;

pub(crate) const FONT: &[u8] = b"MintF1";
const BRAND: &[u8] = b"MintBrand";
const MARK: &[u8] = b"MintMark";

/// Helvetica glyphs average roughly half an em; good enough to centre text
/// without font metrics.
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const LETTER: Rect = Rect { x: 0.0, y: 0.0, width: 612.0, height: 792.0 };

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn to_array(self) -> Vec<Object> {
        vec![
            self.x.into(),
            self.y.into(),
            (self.x + self.width).into(),
            (self.y + self.height).into(),
        ]
    }
}

/// Shared objects (font, opacity states, brand image) added to a document
/// once and referenced from every page overlay.
pub(crate) struct Kit {
    font: ObjectId,
    states: Dictionary,
    brand: Option<(ObjectId, f32)>,
}

impl Kit {
    pub fn new(doc: &mut Document) -> Self {
        let font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        Self { font, states: Dictionary::new(), brand: None }
    }

    pub fn font(&self) -> ObjectId {
        self.font
    }

    /// Registers a constant-alpha graphics state and returns its resource name.
    pub fn opacity(&mut self, doc: &mut Document, alpha: f32) -> Vec<u8> {
        let alpha = alpha.clamp(0.0, 1.0);
        let name = format!("MintA{}", (alpha * 100.0).round() as u32).into_bytes();
        if !self.states.has(&name) {
            let state = doc.add_object(dictionary! {
                "Type" => "ExtGState",
                "CA" => alpha,
                "ca" => alpha,
            });
            self.states.set(name.clone(), state);
        }
        name
    }

    pub fn embed_brand(&mut self, doc: &mut Document, mark: &BrandMark) {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => mark.width() as i64,
                "Height" => mark.height() as i64,
                "ColorSpace" => mark.color_space(),
                "BitsPerComponent" => 8_i64,
                "Filter" => "DCTDecode",
            },
            mark.bytes().to_vec(),
        );
        let id = doc.add_object(image);
        self.brand = Some((id, mark.aspect()));
    }

    pub fn has_brand(&self) -> bool {
        self.brand.is_some()
    }

    fn resources(&self) -> Dictionary {
        let mut resources = dictionary! {
            "Font" => dictionary! { FONT.to_vec() => self.font },
            "ExtGState" => self.states.clone(),
        };
        if let Some((image, _)) = self.brand {
            resources.set("XObject", dictionary! { BRAND.to_vec() => image });
        }
        resources
    }
}

// =========================================================================
// Layer content
// Each helper returns a self-contained q ... Q block in page user space.
// =========================================================================

/// Large text rotated 45 degrees about the page centre.
pub(crate) fn diagonal_text(page: Rect, text: &str, state: &[u8], gray: f32) -> Vec<Operation> {
    let text = pdf_text(text);
    let diagonal = (page.width.powi(2) + page.height.powi(2)).sqrt();
    let chars = text.len().max(1) as f32;
    let size = (diagonal * 0.6 / (chars * AVG_GLYPH_WIDTH)).clamp(18.0, 96.0);
    let text_width = chars * size * AVG_GLYPH_WIDTH;

    let (cos, sin) = (std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2);
    let (cx, cy) = page.center();
    // Shift the baseline origin back by half the text box along the rotated axes.
    let (hw, hh) = (text_width / 2.0, size * 0.35);
    let ox = cx - (hw * cos - hh * sin);
    let oy = cy - (hw * sin + hh * cos);

    vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![Object::Name(state.to_vec())]),
        Operation::new("g", vec![gray.into()]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(FONT.to_vec()), size.into()]),
        Operation::new(
            "Tm",
            vec![cos.into(), sin.into(), (-sin).into(), cos.into(), ox.into(), oy.into()],
        ),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// The brand image scaled to half the page width, rotated 45 degrees and centred.
pub(crate) fn diagonal_brand(page: Rect, kit: &Kit, state: &[u8]) -> Vec<Operation> {
    let Some((_, aspect)) = kit.brand else {
        return Vec::new();
    };
    let w = page.width * 0.5;
    let h = w * aspect;
    let (cos, sin) = (std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2);
    let (cx, cy) = page.center();
    let ox = cx - (w / 2.0 * cos - h / 2.0 * sin);
    let oy = cy - (w / 2.0 * sin + h / 2.0 * cos);

    vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![Object::Name(state.to_vec())]),
        Operation::new(
            "cm",
            vec![(w * cos).into(), (w * sin).into(), (-h * sin).into(), (h * cos).into(), ox.into(), oy.into()],
        ),
        Operation::new("Do", vec![Object::Name(BRAND.to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

/// Small upright text anchored near the bottom-left corner.
pub(crate) fn caption(page: Rect, text: &str, state: &[u8]) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![Object::Name(state.to_vec())]),
        Operation::new("g", vec![0.55_f32.into()]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(FONT.to_vec()), 8.0_f32.into()]),
        Operation::new(
            "Tm",
            vec![1.0_f32.into(), 0.0_f32.into(), 0.0_f32.into(), 1.0_f32.into(), (page.x + 18.0).into(), (page.y + 14.0).into()],
        ),
        Operation::new("Tj", vec![Object::string_literal(pdf_text(text))]),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Left edge that horizontally centres a line of encoded text on the page.
pub(crate) fn centered_x(page: Rect, text: &[u8], size: f32) -> f32 {
    let width = text.len() as f32 * size * AVG_GLYPH_WIDTH;
    page.x + ((page.width - width) / 2.0).max(18.0)
}

/// Encodes text for the WinAnsi-encoded standard font: one byte per glyph.
/// Latin-1 maps straight through, the 0x80..0x9F block takes the
/// Windows-1252 extras, and anything the font cannot show becomes `?`.
pub(crate) fn pdf_text(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi).collect()
}

fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u8,
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
        _ => b'?',
    }
}

// =========================================================================
// Page plumbing
// =========================================================================

/// Effective MediaBox, following the page tree for inherited values.
pub(crate) fn page_box(doc: &Document, page_id: ObjectId) -> Rect {
    inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| rect_from(doc, &obj))
        .unwrap_or(Rect::LETTER)
}

/// Wraps the page's existing content in q/Q and paints `operations` on top
/// as a form XObject carrying its own resources.
pub(crate) fn stamp_page(
    doc: &mut Document,
    page_id: ObjectId,
    kit: &Kit,
    page: Rect,
    operations: Vec<Operation>,
) -> Result<()> {
    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => page.to_array(),
            "Resources" => kit.resources(),
        },
        Content { operations }.encode()?,
    );
    let form_id = doc.add_object(form);

    attach_xobject(doc, page_id, MARK, form_id)?;

    let existing = existing_contents(doc, page_id)?;
    let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let mut paint = b"Q\nq /".to_vec();
    paint.extend_from_slice(MARK);
    paint.extend_from_slice(b" Do Q\n");
    let close = doc.add_object(Stream::new(Dictionary::new(), paint));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open));
    contents.extend(existing);
    contents.push(Object::Reference(close));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", contents);
    Ok(())
}

fn existing_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let contents = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    Ok(contents)
}

/// Adds `name -> xobject_id` to the page's XObject resources. Inherited
/// resources are copied onto the page first so nothing the original content
/// relies on is hidden.
fn attach_xobject(doc: &mut Document, page_id: ObjectId, name: &[u8], xobject_id: ObjectId) -> Result<()> {
    let mut resources = match inherited(doc, page_id, b"Resources") {
        Some(Object::Reference(id)) => doc.get_dictionary(id)?.clone(),
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id)?.clone(),
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    xobjects.set(name.to_vec(), Object::Reference(xobject_id));
    resources.set("XObject", xobjects);

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", resources);
    Ok(())
}

fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    // Page trees are shallow; the bound only guards against cyclic Parent links.
    for _ in 0..64 {
        let id = current?;
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        current = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn rect_from(doc: &Document, obj: &Object) -> Option<Rect> {
    let obj = match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let values: Vec<f32> = obj.as_array().ok()?.iter().filter_map(number).collect();
    if values.len() != 4 {
        return None;
    }
    let rect = Rect {
        x: values[0].min(values[2]),
        y: values[1].min(values[3]),
        width: (values[2] - values[0]).abs(),
        height: (values[3] - values[1]).abs(),
    };
    (rect.width > 0.0 && rect.height > 0.0).then_some(rect)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
