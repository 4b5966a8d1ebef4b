//! Image transform: fit a downloaded flag into a bounded square on white.
//!
//! ## Why flatten?
//!
//! Card viewers render transparent regions against their own theme colour,
//! which makes white bands vanish on a white card and dark emblems vanish in
//! night mode. Compositing onto opaque white fixes the look once at download
//! time.
//!
//! ## Why spawn_blocking?
//!
//! Decoding and Lanczos resampling are CPU-bound. Running them on the blocking
//! pool keeps the Tokio workers free for the next download.

use crate::error::EntityError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Decode, shrink, flatten and re-encode `bytes` on the blocking pool.
///
/// Payloads the `image` crate cannot decode (raw SVG, truncated files) come
/// back unchanged with a warning; the caller stores them as-is.
pub async fn prepare_image(
    bytes: Vec<u8>,
    file_name: &str,
    max_dimension: u32,
) -> Result<Vec<u8>, EntityError> {
    let name = file_name.to_string();

    tokio::task::spawn_blocking(move || match transform_image(&bytes, &name, max_dimension) {
        Ok(out) => out,
        Err(e) => {
            warn!("Could not process image {}: {}; storing bytes as downloaded", name, e);
            bytes
        }
    })
    .await
    .map_err(|e| EntityError::WriteFailed {
        file: file_name.to_string(),
        reason: format!("image task panicked: {e}"),
    })
}

/// Blocking transform. The output format follows the extension of `file_name`.
pub fn transform_image(
    bytes: &[u8],
    file_name: &str,
    max_dimension: u32,
) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = (img.width(), img.height());

    let img = if w > max_dimension || h > max_dimension {
        let resized = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
        debug!(
            "Resized {} {}x{} → {}x{}",
            file_name,
            w,
            h,
            resized.width(),
            resized.height()
        );
        resized
    } else {
        img
    };

    let img = flatten_on_white(img);

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), output_format(file_name))?;
    Ok(buf)
}

/// PNG or JPEG by extension; PNG for anything else.
fn output_format(file_name: &str) -> ImageFormat {
    match Path::new(file_name)
        .extension()
        .and_then(ImageFormat::from_extension)
    {
        Some(ImageFormat::Jpeg) => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    }
}

/// Composite any alpha channel over opaque white.
fn flatten_on_white(img: DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return img;
    }

    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }

    DynamicImage::ImageRgb8(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode");
        buf
    }

    #[test]
    fn large_image_is_fit_within_bounds() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(800, 400, Rgba([0, 0, 255, 255])));
        let out = transform_image(&png_bytes(&img), "001_Flag_of_Chad.png", 400).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (400, 200));
    }

    #[test]
    fn small_image_keeps_its_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 80, Rgb([255, 0, 0])));
        let out = transform_image(&png_bytes(&img), "x.png", 400).unwrap();
        assert_eq!(image::load_from_memory(&out).unwrap().dimensions(), (120, 80));
    }

    #[test]
    fn transparency_becomes_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0])));
        let out = transform_image(&png_bytes(&img), "x.png", 400).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.to_rgb8().get_pixel(5, 5), &Rgb([255, 255, 255]));
    }

    #[test]
    fn jpeg_extension_encodes_jpeg() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([0, 128, 0])));
        let out = transform_image(&png_bytes(&img), "002_Flag_of_Mali.JPG", 400).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn unknown_extension_encodes_png() {
        assert_eq!(output_format("003_Flag_of_Peru.svg"), ImageFormat::Png);
        assert_eq!(output_format("noext"), ImageFormat::Png);
    }

    #[tokio::test]
    async fn undecodable_payload_is_returned_unchanged() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#.to_vec();
        let out = prepare_image(svg.clone(), "x.svg", 400).await.unwrap();
        assert_eq!(out, svg);
    }

    #[tokio::test]
    async fn prepare_image_runs_transform() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(600, 600, Rgba([255, 0, 0, 128])));
        let out = prepare_image(png_bytes(&img), "x.png", 400).await.unwrap();
        assert_eq!(image::load_from_memory(&out).unwrap().dimensions(), (400, 400));
    }
}
