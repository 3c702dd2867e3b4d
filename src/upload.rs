use crate::types::{ConversionError, UploadedFile};
use actix_multipart::Multipart;
use actix_web::web;
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use std::fmt::Display;

/// Parts collected from one multipart request, bounded by a byte budget
/// shared across every part.
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<(String, UploadedFile)>,
    texts: Vec<(String, String)>,
}

impl UploadForm {
    pub async fn read(mut payload: Multipart, limit: usize) -> Result<Self, ConversionError> {
        let mut form = UploadForm::default();
        let mut remaining = limit;

        while let Some(item) = payload.next().await {
            let field = item.map_err(|e| ConversionError::Upload(e.to_string()))?;
            let disposition = field.content_disposition();
            let name = disposition.get_name().unwrap_or_default().to_string();
            let filename = disposition.get_filename().map(str::to_string);

            let content = read_chunks(field, &mut remaining, limit).await?;
            match filename {
                Some(filename) => form.files.push((name, UploadedFile::new(filename, content))),
                None => {
                    let text = String::from_utf8(content.to_vec()).map_err(|e| {
                        ConversionError::Upload(format!("field {} is not UTF-8: {}", name, e))
                    })?;
                    form.texts.push((name, text));
                }
            }
        }

        Ok(form)
    }

    /// Every file sent under `field`, in upload order.
    pub fn files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(name, _)| name == field);
        self.files = rest;
        matching.into_iter().map(|(_, file)| file).collect()
    }

    pub fn file(&mut self, field: &'static str) -> Result<UploadedFile, ConversionError> {
        self.files(field)
            .into_iter()
            .next()
            .ok_or(ConversionError::MissingField { field })
    }

    pub fn text(&mut self, field: &'static str) -> Result<String, ConversionError> {
        let index = self
            .texts
            .iter()
            .position(|(name, _)| name == field)
            .ok_or(ConversionError::MissingField { field })?;
        Ok(self.texts.swap_remove(index).1)
    }
}

/// Buffers a whole request body, failing once it passes `limit`.
pub async fn read_body(payload: web::Payload, limit: usize) -> Result<Bytes, ConversionError> {
    let mut remaining = limit;
    read_chunks(payload, &mut remaining, limit).await
}

async fn read_chunks<S, E>(
    mut stream: S,
    remaining: &mut usize,
    limit: usize,
) -> Result<Bytes, ConversionError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ConversionError::Upload(e.to_string()))?;
        *remaining = remaining
            .checked_sub(chunk.len())
            .ok_or(ConversionError::TooLarge { limit })?;
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}
