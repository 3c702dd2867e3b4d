use crate::types::ConversionError;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use std::io::Cursor;

#[derive(Debug, Clone, Copy)]
pub struct ImageProcessor {
    jpeg_quality: u8,
}

impl ImageProcessor {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    /// Re-encode any decodable image as JPEG. Alpha is discarded, not composited.
    pub fn png_to_jpeg(&self, content: &[u8]) -> Result<Vec<u8>, ConversionError> {
        let rgb = self.decode_rgb(content)?;
        let output = self.encode_jpeg(&DynamicImage::ImageRgb8(rgb))?;
        log::debug!(
            "Encoded JPEG at quality {}: {} -> {} bytes",
            self.jpeg_quality,
            content.len(),
            output.len()
        );
        Ok(output)
    }

    /// Re-encode as PNG keeping the decoded colour type.
    pub fn jpeg_to_png(&self, content: &[u8]) -> Result<Vec<u8>, ConversionError> {
        let img = image::load_from_memory(content)?;
        let output = self.encode_png(&img)?;
        log::debug!("Encoded PNG ({:?}): {} -> {} bytes", img.color(), content.len(), output.len());
        Ok(output)
    }

    /// Decode and flatten to 8-bit RGB.
    pub fn decode_rgb(&self, content: &[u8]) -> Result<RgbImage, ConversionError> {
        Ok(image::load_from_memory(content)?.to_rgb8())
    }

    pub fn encode_jpeg(&self, img: &DynamicImage) -> Result<Vec<u8>, ConversionError> {
        let mut output = Vec::new();
        img.write_to(&mut Cursor::new(&mut output), ImageOutputFormat::Jpeg(self.jpeg_quality))?;
        Ok(output)
    }

    fn encode_png(&self, img: &DynamicImage) -> Result<Vec<u8>, ConversionError> {
        let mut output = Vec::new();
        img.write_to(&mut Cursor::new(&mut output), ImageOutputFormat::Png)?;
        Ok(output)
    }
}
