#![allow(dead_code)]

use actix_web::web;
use file_converter::{routes, Config, DocumentConverter};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub const BOUNDARY: &str = "----converter-test-boundary";

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// Returns the `Content-Type` header value and the encoded body.
pub fn multipart(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 90, 120]));
    encode(DynamicImage::ImageRgba8(img), ImageOutputFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, 40, y as u8]));
    encode(DynamicImage::ImageRgb8(img), ImageOutputFormat::Jpeg(90))
}

/// A 1x1 lossless WEBP image.
pub const WEBP_1X1: [u8; 34] = [
    0x52, 0x49, 0x46, 0x46, 0x1a, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50, 0x56, 0x50, 0x38, 0x4c,
    0x0d, 0x00, 0x00, 0x00, 0x2f, 0x00, 0x00, 0x00, 0x10, 0x07, 0x10, 0x11, 0x11, 0x88, 0x88, 0xfe,
    0x07, 0x00,
];

fn encode(img: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    out
}

/// Shell script standing in for wkhtmltopdf; `body` sees the input path in `$input`.
pub fn stub_renderer(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-wkhtmltopdf");
    let script = format!(
        "#!/bin/sh\n\
         for arg in \"$@\"; do case \"$arg\" in *.html) input=\"$arg\";; esac; done\n{}\n",
        body
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Writes a PDF header followed by the submitted markup.
pub const ECHO_PDF: &str = "printf '%%PDF-1.4\\n'; cat \"$input\"";

pub fn test_config(renderer: PathBuf, temp_dir: &Path) -> Config {
    Config {
        wkhtmltopdf_path: renderer,
        temp_dir: temp_dir.to_path_buf(),
        render_timeout_secs: 10,
        ..Config::default()
    }
}

pub fn routes(config: Config) -> impl FnOnce(&mut web::ServiceConfig) {
    let converter = DocumentConverter::from_config(&config);
    routes::configure(web::Data::new(config), web::Data::new(converter))
}

pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
