//! Frame payload decoding
//!
//! Clients send frames as base64 text, optionally wrapped in a data URL
//! (`data:image/jpeg;base64,<payload>`).

use base64::Engine;
use image::DynamicImage;

/// Drop a data-URL header, keeping everything after the first comma
pub fn strip_data_url(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    }
}

/// Decode a base64 (or data-URL) frame into an image
pub fn decode_frame(payload: &str) -> crate::Result<DynamicImage> {
    let data = strip_data_url(payload).trim();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| crate::Error::Decode(format!("invalid base64: {}", e)))?;

    image::load_from_memory(&bytes)
        .map_err(|e| crate::Error::Decode(format!("unreadable image: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_base64(width: u32, height: u32) -> String {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url("AAAA"), "AAAA");
    }

    #[test]
    fn test_decode_plain_base64() {
        let image = decode_frame(&png_base64(64, 48)).unwrap();
        assert_eq!((image.width(), image.height()), (64, 48));
    }

    #[test]
    fn test_decode_data_url() {
        let payload = format!("data:image/png;base64,{}", png_base64(8, 4));
        let image = decode_frame(&payload).unwrap();
        assert_eq!((image.width(), image.height()), (8, 4));
    }

    #[test]
    fn test_invalid_base64() {
        let err = decode_frame("not base64 at all!!").unwrap_err();
        assert!(matches!(err, crate::Error::Decode(_)));
    }

    #[test]
    fn test_valid_base64_but_not_an_image() {
        let payload = base64::engine::general_purpose::STANDARD.encode(b"hello world");
        let err = decode_frame(&payload).unwrap_err();
        assert!(err.to_string().contains("unreadable image"));
    }
}
