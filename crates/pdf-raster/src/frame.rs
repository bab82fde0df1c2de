//! Encoded render output

use crate::{PageSize, RenderRotation, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;

/// How a rendered page is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEncoding {
    /// Quality in 1..=100
    Jpeg { quality: u8 },
    Png,
}

impl FrameEncoding {
    pub fn extension(&self) -> &'static str {
        match self {
            FrameEncoding::Jpeg { .. } => "jpg",
            FrameEncoding::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FrameEncoding::Jpeg { .. } => "image/jpeg",
            FrameEncoding::Png => "image/png",
        }
    }
}

/// One rendered and encoded page
#[derive(Debug, Clone)]
pub struct RasterFrame {
    pub page_index: usize,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub encoding: FrameEncoding,
    pub image_bytes: Vec<u8>,
}

/// Pixel dimensions for a page of `size` points rendered at `scale`
pub fn expected_frame_size(size: PageSize, scale: f32, rotation: RenderRotation) -> (u32, u32) {
    let to_pixels = |points: f64| ((points * scale as f64).round() as u32).max(1);
    let (w, h) = (to_pixels(size.width), to_pixels(size.height));
    if rotation.swaps_axes() {
        (h, w)
    } else {
        (w, h)
    }
}

/// Encode pixels; JPEG output is flattened onto white
pub fn encode_image(image: &RgbaImage, encoding: FrameEncoding) -> Result<Vec<u8>> {
    match encoding {
        FrameEncoding::Jpeg { quality } => {
            let rgb = flatten_on_white(image);
            let mut buffer = Vec::new();
            JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).encode_image(&rgb)?;
            Ok(buffer)
        }
        FrameEncoding::Png => {
            let mut cursor = Cursor::new(Vec::new());
            image.write_to(&mut cursor, ImageFormat::Png)?;
            Ok(cursor.into_inner())
        }
    }
}

fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expected_frame_size() {
        let a4 = PageSize::A4;
        assert_eq!(expected_frame_size(a4, 1.0, RenderRotation::None), (595, 842));
        assert_eq!(expected_frame_size(a4, 2.0, RenderRotation::Degrees270), (1684, 1191));
        assert_eq!(
            expected_frame_size(PageSize::new(0.2, 0.2), 1.0, RenderRotation::None),
            (1, 1)
        );
    }

    #[test]
    fn test_jpeg_flattens_transparency() {
        let transparent = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let bytes = encode_image(&transparent, FrameEncoding::Jpeg { quality: 90 }).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let pixel = decoded.get_pixel(4, 4).0;
        assert!(pixel.iter().all(|&c| c > 240), "{pixel:?}");
    }

    #[test]
    fn test_png_keeps_alpha() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 128]));
        let bytes = encode_image(&image, FrameEncoding::Png).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30, 128]);
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!(FrameEncoding::Jpeg { quality: 80 }.extension(), "jpg");
        assert_eq!(FrameEncoding::Png.mime_type(), "image/png");
    }
}
