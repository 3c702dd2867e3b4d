use crate::config::Config;
use crate::html_renderer::{HtmlRenderer, WkHtmlToPdf};
use crate::image_processor::ImageProcessor;
use crate::pdf_processor::PdfProcessor;
use crate::types::*;
use std::sync::Arc;

pub const PHOTOS_PDF_NAME: &str = "photos_converted.pdf";
pub const HTML_PDF_NAME: &str = "html_converted.pdf";

const PHOTO_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Validates uploads and hands them to the codec or renderer. Holds no
/// per-request state, so one instance is shared by every worker.
#[derive(Clone)]
pub struct DocumentConverter {
    image_processor: ImageProcessor,
    pdf_processor: PdfProcessor,
    renderer: Arc<dyn HtmlRenderer>,
}

impl DocumentConverter {
    pub fn new(config: &Config, renderer: Arc<dyn HtmlRenderer>) -> Self {
        let image_processor = ImageProcessor::new(config.jpeg_quality);
        Self {
            image_processor,
            pdf_processor: PdfProcessor::new(image_processor, config.pdf_dpi),
            renderer,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(WkHtmlToPdf::from_config(config)))
    }

    pub async fn png_to_jpg(
        &self,
        file: UploadedFile,
    ) -> Result<ConversionResult, ConversionError> {
        if !file.has_suffix(".png") {
            return Err(ConversionError::WrongExtension { expected: "PNG" });
        }

        let processor = self.image_processor;
        let content = file.content.clone();
        let jpeg = tokio::task::spawn_blocking(move || processor.png_to_jpeg(&content)).await??;

        log::info!(
            "Converted {} to JPEG ({} -> {} bytes)",
            file.filename,
            file.content.len(),
            jpeg.len()
        );
        Ok(ConversionResult::new(jpeg, "image/jpeg", file.renamed("jpg")))
    }

    pub async fn jpg_to_png(
        &self,
        file: UploadedFile,
    ) -> Result<ConversionResult, ConversionError> {
        if !(file.has_suffix(".jpg") || file.has_suffix(".jpeg")) {
            return Err(ConversionError::WrongExtension { expected: "JPG" });
        }

        let processor = self.image_processor;
        let content = file.content.clone();
        let png = tokio::task::spawn_blocking(move || processor.jpeg_to_png(&content)).await??;

        log::info!(
            "Converted {} to PNG ({} -> {} bytes)",
            file.filename,
            file.content.len(),
            png.len()
        );
        Ok(ConversionResult::new(png, "image/png", file.renamed("png")))
    }

    /// All filenames are checked before any image is decoded.
    pub async fn photos_to_pdf(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<ConversionResult, ConversionError> {
        if files.is_empty() {
            return Err(ConversionError::NoFiles);
        }
        if let Some(bad) = files.iter().find(|file| {
            !file
                .extension()
                .is_some_and(|ext| PHOTO_EXTENSIONS.contains(&ext.as_str()))
        }) {
            return Err(ConversionError::UnsupportedFileType {
                filename: bad.filename.clone(),
            });
        }

        let count = files.len();
        let processor = self.pdf_processor;
        let pdf = tokio::task::spawn_blocking(move || {
            processor.images_to_pdf(files.iter().map(|file| &file.content[..]))
        })
        .await
        .map_err(ConversionError::from)
        .and_then(|result| result)
        .map_err(|e| e.context("Failed to convert images"))?;

        log::info!("Assembled {} image(s) into a {} byte PDF", count, pdf.len());
        Ok(ConversionResult::new(pdf, "application/pdf", PHOTOS_PDF_NAME))
    }

    pub async fn html_to_pdf(&self, html: &str) -> Result<ConversionResult, ConversionError> {
        let pdf = self
            .renderer
            .render(html)
            .await
            .map_err(|e| e.context("Failed to convert HTML to PDF"))?;

        log::info!("Rendered {} bytes of HTML into a {} byte PDF", html.len(), pdf.len());
        Ok(ConversionResult::new(pdf, "application/pdf", HTML_PDF_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processor::tests::{jpeg_bytes, png_bytes};
    use async_trait::async_trait;

    struct FixedRenderer(Result<Vec<u8>, String>);

    #[async_trait]
    impl HtmlRenderer for FixedRenderer {
        async fn render(&self, _html: &str) -> Result<Vec<u8>, ConversionError> {
            self.0.clone().map_err(ConversionError::Render)
        }
    }

    fn converter(renderer: FixedRenderer) -> DocumentConverter {
        DocumentConverter::new(&Config::default(), Arc::new(renderer))
    }

    fn default_converter() -> DocumentConverter {
        converter(FixedRenderer(Ok(b"%PDF-1.4".to_vec())))
    }

    #[tokio::test]
    async fn png_to_jpg_renames_and_sets_media_type() {
        let result = default_converter()
            .png_to_jpg(UploadedFile::new("Shot.PNG", png_bytes(12, 9)))
            .await
            .unwrap();

        assert_eq!(result.media_type, "image/jpeg");
        assert_eq!(result.filename, "Shot.jpg");
        assert_eq!(image::guess_format(&result.content).unwrap(), image::ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn png_to_jpg_rejects_other_extensions_before_decoding() {
        let err = default_converter()
            .png_to_jpg(UploadedFile::new("photo.txt", b"not even an image".to_vec()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "Only PNG files allowed");
    }

    #[tokio::test]
    async fn png_to_jpg_reports_codec_errors_verbatim() {
        let err = default_converter()
            .png_to_jpg(UploadedFile::new("broken.png", b"garbage".to_vec()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
        assert!(matches!(err, ConversionError::Image(_)));
    }

    #[tokio::test]
    async fn jpg_to_png_accepts_both_spellings() {
        let converter = default_converter();
        for name in ["a.jpg", "b.JPEG"] {
            let result = converter
                .jpg_to_png(UploadedFile::new(name, jpeg_bytes(8, 8)))
                .await
                .unwrap();
            assert_eq!(result.media_type, "image/png");
            assert!(result.filename.ends_with(".png"));
        }

        let err = converter
            .jpg_to_png(UploadedFile::new("a.png", jpeg_bytes(8, 8)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Only JPG files allowed");
    }

    #[tokio::test]
    async fn photos_to_pdf_requires_files() {
        let err = default_converter().photos_to_pdf(vec![]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "Please upload at least one image.");
    }

    #[tokio::test]
    async fn photos_to_pdf_names_the_offending_file() {
        let files = vec![
            UploadedFile::new("ok.png", png_bytes(4, 4)),
            UploadedFile::new("anim.gif", b"GIF89a".to_vec()),
        ];
        let err = default_converter().photos_to_pdf(files).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "Unsupported file type: anim.gif");
    }

    #[tokio::test]
    async fn photos_to_pdf_wraps_decode_failures() {
        let files = vec![UploadedFile::new("fake.webp", b"RIFF....WEBP".to_vec())];
        let err = default_converter().photos_to_pdf(files).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
        assert!(err.to_string().starts_with("Failed to convert images: "));
    }

    #[tokio::test]
    async fn photos_to_pdf_builds_named_pdf() {
        let files = vec![
            UploadedFile::new("a.png", png_bytes(4, 4)),
            UploadedFile::new("b.jpeg", jpeg_bytes(6, 6)),
        ];
        let result = default_converter().photos_to_pdf(files).await.unwrap();
        assert_eq!(result.media_type, "application/pdf");
        assert_eq!(result.filename, PHOTOS_PDF_NAME);
        assert!(result.content.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn html_to_pdf_prefixes_render_errors() {
        let err = converter(FixedRenderer(Err("wkhtmltopdf exited with 1".into())))
            .html_to_pdf("<h1>Hi</h1>")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConversionFailed);
        assert_eq!(err.to_string(), "Failed to convert HTML to PDF: wkhtmltopdf exited with 1");
    }

    #[tokio::test]
    async fn html_to_pdf_returns_rendered_bytes() {
        let result = default_converter().html_to_pdf("<h1>Hi</h1>").await.unwrap();
        assert_eq!(result.content, b"%PDF-1.4");
        assert_eq!(result.filename, HTML_PDF_NAME);
    }
}
