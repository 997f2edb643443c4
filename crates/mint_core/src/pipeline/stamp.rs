use lopdf::Document;
use tracing::{debug, warn};

use super::brand::BrandMark;
use super::overlay::{self, Kit};
use super::{Degradation, PipelineOptions, Rendered};
use crate::error::Result;

/// Stamps every page of a purchased document with "Downloaded by: {identity}"
/// and, when available, a faint centred brand mark.
///
/// Stamping never blocks delivery: a page that cannot be stamped is skipped,
/// and a file lopdf cannot parse is returned as-is with a degradation.
pub fn stamp_for_delivery(
    original: &[u8],
    identity: &str,
    options: &PipelineOptions,
    brand: Option<&BrandMark>,
) -> Result<Rendered> {
    let mut doc = match Document::load_mem(original) {
        Ok(doc) => doc,
        Err(e) => {
            let degradation = Degradation::Unstamped(e.to_string());
            warn!(%degradation, "Delivering original bytes");
            return Ok(Rendered {
                bytes: original.to_vec(),
                page_count: 0,
                degradations: vec![degradation],
            });
        }
    };

    let mut degradations = Vec::new();
    let mut kit = Kit::new(&mut doc);
    let caption_state = kit.opacity(&mut doc, options.caption_opacity);
    let image_state = kit.opacity(&mut doc, options.image_opacity);
    if let Some(mark) = brand {
        kit.embed_brand(&mut doc, mark);
    }

    let caption = format!("Downloaded by: {}", identity);
    let pages = doc.get_pages();
    for (&number, &page_id) in &pages {
        let page = overlay::page_box(&doc, page_id);
        let mut operations = overlay::caption(page, &caption, &caption_state);
        if kit.has_brand() {
            operations.extend(overlay::diagonal_brand(page, &kit, &image_state));
        }
        if let Err(e) = overlay::stamp_page(&mut doc, page_id, &kit, page, operations) {
            warn!(page = number, error = %e, "Identity stamp skipped");
            degradations.push(Degradation::PageSkipped { page: number, reason: e.to_string() });
        }
    }

    let mut bytes = Vec::new();
    if let Err(e) = doc.save_to(&mut bytes) {
        let degradation = Degradation::Unstamped(e.to_string());
        warn!(%degradation, "Delivering original bytes");
        return Ok(Rendered {
            bytes: original.to_vec(),
            page_count: pages.len(),
            degradations: vec![degradation],
        });
    }
    debug!(pages = pages.len(), "Stamped document for delivery");

    Ok(Rendered { bytes, page_count: pages.len(), degradations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Content;
    use crate::pipeline::brand::tests::tiny_jpeg;
    use crate::pipeline::fixtures::{contains, sample_pdf, streams};

    #[test]
    fn every_page_names_the_buyer() {
        let rendered =
            stamp_for_delivery(&sample_pdf(7), "reader@example.com", &PipelineOptions::default(), None)
                .unwrap();
        assert_eq!(rendered.page_count, 7);
        assert!(!rendered.is_degraded());

        let doc = Document::load_mem(&rendered.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 7);
        let stamped = streams(&doc)
            .iter()
            .filter(|s| contains(s, "Downloaded by: reader@example.com"))
            .count();
        assert_eq!(stamped, 7);
    }

    #[test]
    fn original_content_survives_stamping() {
        let rendered =
            stamp_for_delivery(&sample_pdf(2), "reader@example.com", &PipelineOptions::default(), None)
                .unwrap();
        let doc = Document::load_mem(&rendered.bytes).unwrap();
        let pages = doc.get_pages();
        let second = doc.get_page_content(pages[&2]).unwrap();
        assert!(contains(&second, "Page 2"));
        assert!(contains(&second, "/MintMark Do"));
    }

    #[test]
    fn brand_mark_is_optional_extra() {
        let brand = BrandMark::from_jpeg(tiny_jpeg(80, 80)).unwrap();
        let rendered =
            stamp_for_delivery(&sample_pdf(3), "reader@example.com", &PipelineOptions::default(), Some(&brand))
                .unwrap();
        let doc = Document::load_mem(&rendered.bytes).unwrap();
        let branded = streams(&doc)
            .iter()
            .filter(|s| contains(s, "/MintBrand Do"))
            .count();
        assert_eq!(branded, 3);
    }

    #[test]
    fn accented_identity_is_stamped_in_win_ansi() {
        let rendered =
            stamp_for_delivery(&sample_pdf(1), "josé@example.com", &PipelineOptions::default(), None)
                .unwrap();
        let doc = Document::load_mem(&rendered.bytes).unwrap();
        let shown: Vec<Vec<u8>> = streams(&doc)
            .iter()
            .filter_map(|s| Content::decode(s).ok())
            .flat_map(|content| content.operations)
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first().and_then(|o| o.as_str().ok()).map(<[u8]>::to_vec))
            .collect();
        assert!(shown.contains(&b"Downloaded by: jos\xE9@example.com".to_vec()));
    }

    #[test]
    fn unparseable_file_is_delivered_untouched() {
        let original = b"plain text, not a PDF".to_vec();
        let rendered =
            stamp_for_delivery(&original, "reader@example.com", &PipelineOptions::default(), None).unwrap();
        assert_eq!(rendered.bytes, original);
        assert!(matches!(rendered.degradations[..], [Degradation::Unstamped(_)]));
    }
}
