//! PNG data-URL snapshot codec.
//!
//! Snapshots travel as `data:image/png;base64,...` strings so one format
//! serves history entries, page records and image export.

use crate::surface::Surface;
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Snapshot codec errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("not a PNG data URL")]
    BadPrefix,
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("unsupported pixel format: {0:?}/{1:?}")]
    UnsupportedFormat(png::ColorType, png::BitDepth),
}

/// Encode the surface as PNG bytes (RGBA8, straight alpha).
pub fn encode_png(surface: &Surface) -> Result<Vec<u8>, SnapshotError> {
    let mut bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut bytes, surface.width(), surface.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(surface.pixels())?;
    writer.finish()?;
    Ok(bytes)
}

/// Encode the surface as a PNG data URL.
pub fn encode_snapshot(surface: &Surface) -> Result<String, SnapshotError> {
    let bytes = encode_png(surface)?;
    Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(bytes)))
}

/// Decode a PNG data URL back into a surface.
pub fn decode_snapshot(data_url: &str) -> Result<Surface, SnapshotError> {
    let encoded = data_url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or(SnapshotError::BadPrefix)?;
    let bytes = STANDARD.decode(encoded)?;

    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
        return Err(SnapshotError::UnsupportedFormat(
            info.color_type,
            info.bit_depth,
        ));
    }
    buf.truncate(info.buffer_size());

    // Dimensions and buffer length always agree for a frame the decoder
    // accepted; treat a mismatch as a decode failure anyway.
    Surface::from_pixels(info.width, info.height, buf).ok_or(SnapshotError::BadPrefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_objects;
    use inkpad_core::object::{DrawObject, ObjectKind, ObjectStyle, SurfacePoint};

    fn drawn_surface() -> Surface {
        let mut obj = DrawObject::new(
            ObjectKind::Line,
            SurfacePoint::new(2.0, 2.0),
            ObjectStyle {
                width: 3.0,
                ..Default::default()
            },
        );
        obj.points.push(SurfacePoint::new(28.0, 20.0));
        let mut s = Surface::new(32, 24);
        render_objects(&mut s, &[obj], None);
        s
    }

    #[test]
    fn test_snapshot_round_trip() {
        let surface = drawn_surface();
        let url = encode_snapshot(&surface).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let back = decode_snapshot(&url).unwrap();
        assert_eq!(back.width(), surface.width());
        assert_eq!(back.height(), surface.height());
        assert_eq!(back.pixels(), surface.pixels());
    }

    #[test]
    fn test_decode_rejects_wrong_prefix() {
        let err = decode_snapshot("data:image/jpeg;base64,abcd").unwrap_err();
        assert!(matches!(err, SnapshotError::BadPrefix));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let err = decode_snapshot("data:image/png;base64,!!!").unwrap_err();
        assert!(matches!(err, SnapshotError::Base64(_)));
    }

    #[test]
    fn test_decode_rejects_garbage_png() {
        let payload = base64::engine::general_purpose::STANDARD.encode(b"not a png");
        let err = decode_snapshot(&format!("data:image/png;base64,{payload}")).unwrap_err();
        assert!(matches!(err, SnapshotError::Decode(_)));
    }
}
