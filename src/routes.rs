use crate::config::Config;
use crate::converter::DocumentConverter;
use crate::types::*;
use crate::upload::{self, UploadForm};
use actix_multipart::Multipart;
use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};

const HTML_FIELD: &str = "html_content";

/// Registers shared data and every endpoint. Bodies are read by the handlers
/// themselves so that limits and malformed forms surface as JSON errors.
pub fn configure(
    config: web::Data<Config>,
    converter: web::Data<DocumentConverter>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(config)
            .app_data(converter)
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .route("/png-to-jpg", web::post().to(png_to_jpg))
            .route("/jpg-to-png", web::post().to(jpg_to_png))
            .route("/photo-to-pdf", web::post().to(photo_to_pdf))
            .route("/html-to-pdf", web::post().to(html_to_pdf))
            .default_service(web::to(not_found));
    }
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "File & Image Converter API is running",
        "endpoints": {
            "png_to_jpg": "POST /png-to-jpg",
            "jpg_to_png": "POST /jpg-to-png",
            "photo_to_pdf": "POST /photo-to-pdf",
            "html_to_pdf": "POST /html-to-pdf",
            "health": "GET /health"
        }
    }))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "healthy" }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        detail: "Not Found".to_string(),
    })
}

async fn png_to_jpg(
    payload: Multipart,
    config: web::Data<Config>,
    converter: web::Data<DocumentConverter>,
) -> Result<HttpResponse, ConversionError> {
    let result = async {
        let file = UploadForm::read(payload, config.max_upload_bytes).await?.file("file")?;
        converter.png_to_jpg(file).await
    }
    .await;
    download("png-to-jpg", result)
}

async fn jpg_to_png(
    payload: Multipart,
    config: web::Data<Config>,
    converter: web::Data<DocumentConverter>,
) -> Result<HttpResponse, ConversionError> {
    let result = async {
        let file = UploadForm::read(payload, config.max_upload_bytes).await?.file("file")?;
        converter.jpg_to_png(file).await
    }
    .await;
    download("jpg-to-png", result)
}

async fn photo_to_pdf(
    payload: Multipart,
    config: web::Data<Config>,
    converter: web::Data<DocumentConverter>,
) -> Result<HttpResponse, ConversionError> {
    let result = async {
        let files = UploadForm::read(payload, config.max_upload_bytes).await?.files("files");
        log::info!("Received {} image(s) for PDF assembly", files.len());
        converter.photos_to_pdf(files).await
    }
    .await;
    download("photo-to-pdf", result)
}

async fn html_to_pdf(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<Config>,
    converter: web::Data<DocumentConverter>,
) -> Result<HttpResponse, ConversionError> {
    let result = async {
        let html = read_html(&req, payload, config.max_upload_bytes).await?;
        converter.html_to_pdf(&html).await
    }
    .await;
    download("html-to-pdf", result)
}

/// `html_content` may arrive multipart-encoded; anything else is parsed as a
/// urlencoded form.
async fn read_html(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<String, ConversionError> {
    if req.content_type().starts_with("multipart/") {
        let payload = Multipart::new(req.headers(), payload);
        return UploadForm::read(payload, limit).await?.text(HTML_FIELD);
    }

    let body = upload::read_body(payload, limit).await?;
    let fields: Vec<(String, String)> =
        serde_urlencoded::from_bytes(&body).map_err(|e| ConversionError::Upload(e.to_string()))?;
    fields
        .into_iter()
        .find(|(name, _)| name == HTML_FIELD)
        .map(|(_, value)| value)
        .ok_or(ConversionError::MissingField { field: HTML_FIELD })
}

fn download(
    endpoint: &str,
    result: Result<ConversionResult, ConversionError>,
) -> Result<HttpResponse, ConversionError> {
    match result {
        Ok(converted) => Ok(HttpResponse::Ok()
            .content_type(converted.media_type)
            .insert_header(ContentDisposition::attachment(converted.filename))
            .body(converted.content)),
        Err(e) => {
            match e.kind() {
                ErrorKind::InvalidInput => log::warn!("{} rejected: {}", endpoint, e),
                ErrorKind::ConversionFailed => log::error!("{} failed: {}", endpoint, e),
            }
            Err(e)
        }
    }
}
