//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Raster formats that can be embedded as image XObjects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Map a declared MIME type to a supported format
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// JPEG frame header info
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    bits_per_component: u8,
    num_components: u8,
}

/// Image XObject ready for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray", "DeviceCMYK")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter ("DCTDecode" for JPEG, "FlateDecode" for PNG)
    pub filter: String,
    /// Encoded image data
    pub data: Vec<u8>,
    /// Invert the decode range (Adobe CMYK JPEGs store inverted samples)
    pub invert_decode: bool,
    /// Alpha channel as a DeviceGray soft mask
    pub soft_mask: Option<Box<ImageXObject>>,
}

/// Read the SOF segment of a JPEG to get its frame geometry
fn get_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return Err(PdfError::ImageError("Missing JPEG SOI marker".to_string()));
    }

    // SOF segment layout after the marker:
    // length (2), precision (1), height (2), width (2), components (1)
    let mut i = 2;
    while i + 10 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // Fill bytes between segments
        if marker == 0xFF {
            i += 1;
            continue;
        }

        // SOF markers, excluding DHT (C4), JPG (C8) and DAC (CC)
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let bits_per_component = data[i + 4];
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let num_components = data[i + 9];
            return Ok(JpegInfo {
                width,
                height,
                bits_per_component,
                num_components,
            });
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::ImageError("Could not parse JPEG info".to_string()))
}

/// Deflate raw samples for a FlateDecode stream
fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

impl ImageXObject {
    /// Create an XObject from encoded bytes of a known format
    pub fn from_bytes(data: &[u8], format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// Create XObject from JPEG data
    ///
    /// JPEG images are embedded as-is with the DCTDecode filter; only the
    /// frame header is parsed.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = get_jpeg_info(data)?;

        if info.width == 0 || info.height == 0 {
            return Err(PdfError::ImageError(
                "JPEG has zero width or height".to_string(),
            ));
        }

        let (color_space, invert_decode) = match info.num_components {
            1 => ("DeviceGray", false),
            3 => ("DeviceRGB", false),
            4 => ("DeviceCMYK", true),
            n => {
                return Err(PdfError::ImageError(format!(
                    "Unsupported JPEG component count: {n}"
                )))
            }
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space: color_space.to_string(),
            bits_per_component: info.bits_per_component,
            filter: "DCTDecode".to_string(),
            data: data.to_vec(),
            invert_decode,
            soft_mask: None,
        })
    }

    /// Create XObject from PNG data
    ///
    /// PNG samples are decoded to 8-bit and re-encoded with FlateDecode.
    /// An alpha channel that is not fully opaque becomes a soft mask.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;

        let (width, height) = (image.width(), image.height());
        let has_alpha = image.color().has_alpha();
        let is_gray = !image.color().has_color();

        let (samples, color_space) = if is_gray {
            (image.to_luma8().into_raw(), "DeviceGray")
        } else {
            (image.to_rgb8().into_raw(), "DeviceRGB")
        };

        let soft_mask = if has_alpha {
            Self::alpha_mask(&image)?.map(Box::new)
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: deflate(&samples)?,
            invert_decode: false,
            soft_mask,
        })
    }

    /// Extract the alpha channel, or None when every pixel is opaque
    fn alpha_mask(image: &DynamicImage) -> Result<Option<Self>> {
        let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p[3]).collect();
        if alpha.iter().all(|&a| a == u8::MAX) {
            return Ok(None);
        }

        Ok(Some(Self {
            width: image.width(),
            height: image.height(),
            color_space: "DeviceGray".to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: deflate(&alpha)?,
            invert_decode: false,
            soft_mask: None,
        }))
    }

    /// Convert to lopdf Stream object
    ///
    /// The soft mask, if any, is not referenced here; the document adds it as
    /// its own object and links it through `/SMask`.
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));
        if self.invert_decode {
            let decode = [1, 0, 1, 0, 1, 0, 1, 0]
                .into_iter()
                .map(Object::Integer)
                .collect::<Vec<_>>();
            dict.set("Decode", Object::Array(decode));
        }
        dict.set("Length", self.data.len() as i64);

        // Already encoded; keep lopdf from compressing it again
        Stream::new(dict, self.data.clone()).with_compression(false)
    }
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x` - X coordinate in points
/// * `y` - Y coordinate in points (from bottom, PDF coordinates)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
