//! PDF text extraction
//!
//! Extracts text page by page with lopdf. Extraction is best-effort per
//! page: a page that fails to decode yields empty text instead of aborting
//! the whole pass. Only an unopenable document is a terminal error.

use std::path::Path;

use crate::errors::AppError;

/// One physical page of the source document, 1-indexed
#[derive(Debug, Clone)]
pub struct Page {
    pub page_number: u32,
    pub text: String,
}

/// Extract text from every page of a PDF, in physical page order.
pub fn extract_pages(path: &Path) -> Result<Vec<Page>, AppError> {
    let doc = lopdf::Document::load(path).map_err(|e| AppError::DocumentUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().cloned().collect();
    tracing::debug!(page_count = page_numbers.len(), "Extracting text from PDF");

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page_number in page_numbers {
        let text = match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "Failed to extract page text, treating as empty");
                String::new()
            }
        };
        pages.push(Page { page_number, text });
    }

    Ok(pages)
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a minimal in-memory PDF with one page of text per entry.
    pub fn pdf_with_pages(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for text in page_texts {
            let content = format!(
                "BT /F1 12 Tf 100 700 Td ({}) Tj ET",
                text.replace('\\', "\\\\")
                    .replace('(', "\\(")
                    .replace(')', "\\)")
            );
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_texts.len() as i64),
        });
        for page_id in &page_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
                dict.set("Parent", pages_id);
            }
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}
