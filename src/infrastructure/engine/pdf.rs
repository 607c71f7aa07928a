//! PDF page extraction with lopdf

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::Document;
use tracing::{debug, warn};

use crate::domain::engine::PageExtractor;
use crate::domain::DomainError;

fn pdf_error(message: impl Into<String>) -> DomainError {
    DomainError::engine("pdf", message)
}

/// Keep pages `start_page..=end_page` (zero-based) of `pdf_bytes`.
/// An end past the last page is clamped.
fn extract(pdf_bytes: &[u8], start_page: u32, end_page: Option<u32>) -> Result<Vec<u8>, DomainError> {
    let mut document =
        Document::load_mem(pdf_bytes).map_err(|e| pdf_error(format!("Failed to load PDF: {}", e)))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(pdf_error("PDF has no pages"));
    }

    let last_page = page_count - 1;
    let end_page = match end_page {
        Some(end) if end > last_page => {
            warn!(end, last_page, "End page out of range, using last page");
            last_page
        }
        Some(end) => end,
        None => last_page,
    };

    if start_page > end_page {
        return Err(pdf_error(format!(
            "Start page {} is after end page {}",
            start_page, end_page
        )));
    }

    // lopdf numbers pages from 1
    let dropped: Vec<u32> = (1..=page_count)
        .filter(|number| *number < start_page + 1 || *number > end_page + 1)
        .collect();

    if !dropped.is_empty() {
        document.delete_pages(&dropped);
        document.prune_objects();
    }

    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|e| pdf_error(format!("Failed to write PDF: {}", e)))?;

    debug!(
        page_count,
        kept = page_count - dropped.len() as u32,
        bytes = output.len(),
        "PDF pages extracted"
    );
    Ok(output)
}

/// Page extractor running lopdf on the blocking pool
#[derive(Debug, Clone, Default)]
pub struct LopdfPageExtractor;

impl LopdfPageExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageExtractor for LopdfPageExtractor {
    async fn extract_pages(
        &self,
        pdf_bytes: Bytes,
        start_page: u32,
        end_page: Option<u32>,
    ) -> Result<Vec<u8>, DomainError> {
        tokio::task::spawn_blocking(move || extract(&pdf_bytes, start_page, end_page))
            .await
            .map_err(|e| DomainError::internal(format!("PDF extraction task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    fn pdf_with_pages(count: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..count)
            .map(|_| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[tokio::test]
    async fn test_first_page_only() {
        let source = pdf_with_pages(3);
        assert_eq!(page_count(&source), 3);

        let first = LopdfPageExtractor::new()
            .extract_pages(Bytes::from(source), 0, Some(0))
            .await
            .unwrap();

        assert_eq!(page_count(&first), 1);
    }

    #[tokio::test]
    async fn test_open_end_keeps_remaining_pages() {
        let source = pdf_with_pages(3);

        let tail = LopdfPageExtractor::new()
            .extract_pages(Bytes::from(source), 1, None)
            .await
            .unwrap();

        assert_eq!(page_count(&tail), 2);
    }

    #[tokio::test]
    async fn test_end_past_last_page_is_clamped() {
        let source = pdf_with_pages(2);

        let all = LopdfPageExtractor::new()
            .extract_pages(Bytes::from(source), 0, Some(10))
            .await
            .unwrap();

        assert_eq!(page_count(&all), 2);
    }

    #[tokio::test]
    async fn test_garbage_is_engine_error() {
        let err = LopdfPageExtractor::new()
            .extract_pages(Bytes::from_static(b"not a pdf"), 0, Some(0))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Engine { ref stage, .. } if stage == "pdf"));
    }

    #[test]
    fn test_start_after_end() {
        let err = extract(&pdf_with_pages(2), 1, Some(0)).unwrap_err();
        assert!(err.to_string().contains("after end page"));
    }
}
