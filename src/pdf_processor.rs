use crate::image_processor::ImageProcessor;
use crate::types::ConversionError;
use image::{DynamicImage, RgbImage};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

const POINTS_PER_INCH: f32 = 72.0;
const IMAGE_NAME: Name<'static> = Name(b"Im0");

#[derive(Debug, Clone, Copy)]
pub struct PdfProcessor {
    image_processor: ImageProcessor,
    dpi: u32,
}

impl PdfProcessor {
    pub fn new(image_processor: ImageProcessor, dpi: u32) -> Self {
        Self {
            image_processor,
            dpi,
        }
    }

    /// Decode every upload first so a bad file aborts before anything is written.
    pub fn images_to_pdf<'a, I>(&self, contents: I) -> Result<Vec<u8>, ConversionError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let images = contents
            .into_iter()
            .map(|content| self.image_processor.decode_rgb(content))
            .collect::<Result<Vec<_>, _>>()?;
        self.compose(&images)
    }

    /// One page per image, in order. Each page is sized to its image.
    pub fn compose(&self, images: &[RgbImage]) -> Result<Vec<u8>, ConversionError> {
        if images.is_empty() {
            return Err(ConversionError::NoFiles);
        }

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_ids: Vec<Ref> = (0..images.len())
            .map(|index| Ref::new(3 + 3 * index as i32))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(images.len() as i32);

        for (img, &page_id) in images.iter().zip(&page_ids) {
            let image_id = Ref::new(page_id.get() + 1);
            let content_id = Ref::new(page_id.get() + 2);
            let (width, height) = img.dimensions();
            let (page_width, page_height) = self.page_size(width, height);

            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, page_width, page_height));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().x_objects().pair(IMAGE_NAME, image_id);
            page.finish();

            let encoded = self
                .image_processor
                .encode_jpeg(&DynamicImage::ImageRgb8(img.clone()))?;
            let mut image = pdf.image_xobject(image_id, &encoded);
            image.filter(Filter::DctDecode);
            image.width(width as i32);
            image.height(height as i32);
            image.color_space().device_rgb();
            image.bits_per_component(8);
            image.finish();

            let mut content = Content::new();
            content.save_state();
            content.transform([page_width, 0.0, 0.0, page_height, 0.0, 0.0]);
            content.x_object(IMAGE_NAME);
            content.restore_state();
            pdf.stream(content_id, &content.finish());
        }

        let bytes = pdf.finish();
        log::info!("Composed PDF with {} page(s): {} bytes", images.len(), bytes.len());
        Ok(bytes)
    }

    fn page_size(&self, width: u32, height: u32) -> (f32, f32) {
        let scale = POINTS_PER_INCH / self.dpi as f32;
        (width as f32 * scale, height as f32 * scale)
    }
}
