//! Image loading utilities.
//!
//! Converts uploaded files to base64 data URIs and decodes data URIs back
//! into pixels for the compositor.

use base64::Engine;

use crate::error::{RenderError, RenderResult};

/// Decoded image data.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel, straight alpha).
    pub data: Vec<u8>,
}

/// Image formats recognised from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Windows bitmap.
    Bmp,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        if data.starts_with(b"BM") {
            return Self::Bmp;
        }

        Self::Unknown
    }

    /// MIME type used when building a data URI.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Encode file contents as a base64 data URI.
///
/// The MIME type is sniffed from the bytes; nothing else is validated.
#[must_use]
pub fn encode_data_uri(bytes: &[u8]) -> String {
    let mime = ImageFormat::from_magic_bytes(bytes).mime();
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Wrap PNG bytes in a data URL.
#[must_use]
pub fn png_data_url(png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    format!("data:image/png;base64,{encoded}")
}

/// Extract the raw bytes from a data URI.
///
/// # Errors
///
/// Returns an error if the URI is malformed or its payload does not decode.
pub fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    // Find the comma separating metadata from data
    let comma_pos = uri_data
        .find(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let metadata = &uri_data[..comma_pos];
    let encoded_data = &uri_data[comma_pos + 1..];

    if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        percent_decode(encoded_data)
    }
}

/// Load an image from raw bytes.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn load_image_from_bytes(data: &[u8]) -> RenderResult<TextureData> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(TextureData {
        width,
        height,
        data: rgba.into_raw(),
    })
}

/// Load an image from a data URI (base64 encoded).
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be decoded.
pub fn load_image_from_data_uri(uri: &str) -> RenderResult<TextureData> {
    let bytes = decode_data_uri(uri)?;
    load_image_from_bytes(&bytes)
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let byte = bytes
                .get(idx + 1..idx + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            idx += 3;
        } else {
            result.push(bytes[idx]);
            idx += 1;
        }
    }

    Ok(result)
}
