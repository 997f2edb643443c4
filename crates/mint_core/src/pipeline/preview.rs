use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use super::brand::BrandMark;
use super::overlay::{self, Kit, Rect, FONT};
use super::{Degradation, PipelineOptions, Rendered};
use crate::error::{Error, Result};

/// Builds the free preview: the first `preview_pages` pages, each carrying a
/// diagonal text watermark (plus the brand mark when one is available), and
/// a trailing unwatermarked "preview ended" page when pages were cut.
pub fn render_preview(
    original: &[u8],
    options: &PipelineOptions,
    brand: Option<&BrandMark>,
) -> Result<Rendered> {
    let mut doc = Document::load_mem(original)
        .map_err(|e| Error::UnsupportedFormat(format!("not a readable PDF: {}", e)))?;

    let pages = doc.get_pages();
    let total = pages.len();
    if total == 0 {
        return Err(Error::Pipeline("document has no pages".into()));
    }

    // 1. Truncate to the leading pages
    let shown = total.min(options.preview_pages);
    let cut: Vec<u32> = pages.keys().copied().filter(|n| *n as usize > shown).collect();
    let first_page_box = pages
        .values()
        .next()
        .map(|id| overlay::page_box(&doc, *id))
        .unwrap_or(Rect::LETTER);
    if !cut.is_empty() {
        doc.delete_pages(&cut);
    }

    // 2. Shared watermark objects
    let mut degradations = Vec::new();
    let mut kit = Kit::new(&mut doc);
    let text_state = kit.opacity(&mut doc, options.text_opacity);
    let image_state = kit.opacity(&mut doc, options.image_opacity);
    match brand {
        Some(mark) => kit.embed_brand(&mut doc, mark),
        None => degradations.push(Degradation::BrandAssetMissing),
    }

    // 3. Overlay every kept page
    for (number, page_id) in doc.get_pages() {
        let page = overlay::page_box(&doc, page_id);
        let mut operations = overlay::diagonal_text(page, &options.watermark_text, &text_state, 0.6);
        if kit.has_brand() {
            operations.extend(overlay::diagonal_brand(page, &kit, &image_state));
        }
        if let Err(e) = overlay::stamp_page(&mut doc, page_id, &kit, page, operations) {
            warn!(page = number, error = %e, "Preview watermark skipped");
            degradations.push(Degradation::PageSkipped { page: number, reason: e.to_string() });
        }
    }

    // 4. Call to action when the preview is shorter than the document
    let mut page_count = shown;
    if total > options.preview_pages {
        append_call_to_action(&mut doc, &kit, first_page_box, total, shown, &options.site_name)?;
        page_count += 1;
    }

    for degradation in &degradations {
        warn!(%degradation, "Preview degraded");
    }
    debug!(total, shown, page_count, "Rendered preview");

    doc.prune_objects();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| Error::Pipeline(format!("failed to write preview: {}", e)))?;

    Ok(Rendered { bytes, page_count, degradations })
}

fn append_call_to_action(
    doc: &mut Document,
    kit: &Kit,
    page: Rect,
    total: usize,
    shown: usize,
    site_name: &str,
) -> Result<()> {
    let pages_id = page_tree_root(doc)?;

    let lines: [(String, f32); 4] = [
        ("Preview ended".to_string(), 28.0),
        (format!("This document has {} pages in total.", total), 14.0),
        (format!("You have seen the first {} of them.", shown), 14.0),
        (format!("Get the full document on {} to keep reading.", site_name), 14.0),
    ];

    let mut operations = vec![Operation::new("BT", vec![]), Operation::new("g", vec![0.15_f32.into()])];
    let mut y = page.y + page.height * 0.62;
    for (text, size) in &lines {
        let text = overlay::pdf_text(text);
        let x = overlay::centered_x(page, &text, *size);
        operations.push(Operation::new("Tf", vec![Object::Name(FONT.to_vec()), (*size).into()]));
        operations.push(Operation::new(
            "Tm",
            vec![1.0_f32.into(), 0.0_f32.into(), 0.0_f32.into(), 1.0_f32.into(), x.into(), y.into()],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        y -= size * 2.2;
    }
    operations.push(Operation::new("ET", vec![]));

    let content_id = doc.add_object(Stream::new(dictionary! {}, Content { operations }.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => page.to_array(),
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { FONT.to_vec() => kit.font() },
        },
    });

    let pages = doc.get_object_mut(pages_id)?.as_dict_mut()?;
    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.get_mut(b"Kids")?.as_array_mut()?.push(Object::Reference(page_id));
    pages.set("Count", count + 1);
    Ok(())
}

fn page_tree_root(doc: &Document) -> Result<ObjectId> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let pages_id = doc.get_dictionary(catalog_id)?.get(b"Pages")?.as_reference()?;
    Ok(pages_id)
}
