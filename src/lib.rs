//! File & Image Converter
//!
//! A stateless HTTP service that converts uploads: PNG to JPEG, JPEG to PNG,
//! a batch of photos to a multi-page PDF, and HTML to PDF via `wkhtmltopdf`.

pub mod config;
pub mod converter;
pub mod html_renderer;
pub mod image_processor;
pub mod pdf_processor;
pub mod routes;
pub mod types;
pub mod upload;

pub use config::Config;
pub use converter::DocumentConverter;
pub use html_renderer::{HtmlRenderer, WkHtmlToPdf};
pub use types::*;
