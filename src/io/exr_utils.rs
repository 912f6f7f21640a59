/* Copyright 2020 @TwoCookingMice */

use crate::core::error::Result;
use crate::math::spectrum::ColorRGBA;

use exr::prelude::*;

/// RGBA pixels read back from an OpenEXR file, row-major.
#[derive(Debug)]
pub struct RgbaPixels {
    pub width: usize,
    pub height: usize,
    pub data: Vec<ColorRGBA>,
}

// Read EXR Image from file
pub fn read_rgba_exr(file_path: &str) -> Result<RgbaPixels> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| RgbaPixels {
                width: resolution.width(),
                height: resolution.height(),
                data: vec![ColorRGBA::default(); resolution.width() * resolution.height()],
            },
            |image: &mut RgbaPixels, position: Vec2<usize>, (r, g, b, a): (f32, f32, f32, f32)| {
                let idx = position.y() * image.width + position.x();
                image.data[idx] = ColorRGBA::new(r, g, b, a);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)?;

    let pixels = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded, width = {}, height = {}.", pixels.width, pixels.height);
    Ok(pixels)
}

// Write EXR Image to file
pub fn write_rgba_exr(image: &[ColorRGBA],
                      width: usize,
                      height: usize,
                      file_path: &str) -> Result<()> {
    log::info!("Starting writing openexr images: {}.", file_path);

    write_rgba_file(file_path, width, height, |x, y| {
        let px = image[y * width + x];
        (px.r, px.g, px.b, px.a)
    })?;

    log::info!("EXR written to: {}.", file_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exr_write_read() {
        let path = std::env::temp_dir().join(format!("lumivol_exr_{}.exr", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let pixels: Vec<ColorRGBA> = (0..6)
            .map(|i| ColorRGBA::new(i as f32 * 0.1, 0.5, 1.0 - i as f32 * 0.1, (i % 2) as f32))
            .collect();
        write_rgba_exr(&pixels, 3, 2, &path).unwrap();

        let read = read_rgba_exr(&path).unwrap();
        assert_eq!((read.width, read.height), (3, 2));
        for (a, b) in pixels.iter().zip(read.data.iter()) {
            assert!((a.r - b.r).abs() < 1e-6);
            assert!((a.a - b.a).abs() < 1e-6);
        }
        let _ = std::fs::remove_file(&path);
    }
}
