// Copyright @yucwang 2026

use crate::core::error::Result;
use crate::io::exr_utils::write_rgba_exr;
use crate::math::constants::Float;
use crate::math::spectrum::{clamp, ColorRGBA};

use std::path::Path;

fn linear_to_srgb(v: Float) -> Float {
    let v = clamp(v, 0.0, 1.0);
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn to_byte(v: Float) -> u8 {
    (clamp(v, 0.0, 1.0) * 255.0 + 0.5) as u8
}

/// 8-bit sRGB PNG. Alpha is stored linearly.
pub fn write_png(pixels: &[ColorRGBA], width: usize, height: usize, file_path: &str) -> Result<()> {
    log::info!("Starting writing PNG image: {}.", file_path);

    let png = image::RgbaImage::from_fn(width as u32, height as u32, |x, y| {
        let px = pixels[y as usize * width + x as usize];
        image::Rgba([
            to_byte(linear_to_srgb(px.r)),
            to_byte(linear_to_srgb(px.g)),
            to_byte(linear_to_srgb(px.b)),
            to_byte(px.a),
        ])
    });
    png.save(file_path)?;

    log::info!("PNG written to: {}.", file_path);
    Ok(())
}

/// Writes EXR or PNG depending on the file extension. Unknown extensions
/// fall back to EXR.
pub fn write_image(pixels: &[ColorRGBA], width: usize, height: usize, file_path: &str) -> Result<()> {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => write_png(pixels, width, height, file_path),
        Some("exr") => write_rgba_exr(pixels, width, height, file_path),
        other => {
            log::warn!("Unknown image extension {:?}, writing OpenEXR.", other);
            write_rgba_exr(pixels, width, height, file_path)
        }
    }
}
