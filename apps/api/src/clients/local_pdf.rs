use async_trait::async_trait;
use tracing::warn;

use super::{non_blank, ClientError, ResumeFile, TextExtractor};

/// In-process PDF text extraction via `pdf-extract`.
/// Selected with `PDF_TEXT_EXTRACTION=local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPdfTextExtractor;

#[async_trait]
impl TextExtractor for LocalPdfTextExtractor {
    async fn extract_text(&self, pdf: &ResumeFile) -> Result<Option<String>, ClientError> {
        let bytes = pdf.bytes.clone();
        let filename = pdf.filename.clone();

        let extracted =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

        // unreadable PDFs read as "no text", same as the remote extractor
        match extracted {
            Ok(Ok(text)) => Ok(non_blank(Some(text))),
            Ok(Err(e)) => {
                warn!("Could not extract text from {filename}: {e}");
                Ok(None)
            }
            Err(e) => {
                warn!("PDF extraction task for {filename} aborted: {e}");
                Ok(None)
            }
        }
    }
}
