// Copyright @yucwang 2026

//! Mitsuba `.vol` grids: the `VOL` magic and version 3, then little-endian
//! encoding (1 = float32), resolution, channel count, bounding box and the
//! voxel data with x varying fastest.

use crate::core::buffer::BufferSource;
use crate::core::error::{RenderError, Result};
use crate::core::texture::Texture3D;
use crate::math::aabb::AABB;
use crate::math::constants::{Vector3f, Vector3i};

const HEADER_BYTES: usize = 48;

/// A decoded grid, first channel only.
#[derive(Debug, Clone, PartialEq)]
pub struct VolGrid {
    pub resolution: Vector3i,
    pub no_channels: usize,
    pub bounds: AABB,
    pub data: Vec<f32>,
}

impl VolGrid {
    /// Uploads the grid into `texture` through its own backing store.
    pub fn upload(&self, texture: &mut Texture3D<f32>) -> Result<()> {
        texture.set(BufferSource::Host(&self.data), self.resolution)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take4(&mut self) -> Result<[u8; 4]> {
        let end = self.pos + 4;
        let chunk = self.bytes.get(self.pos..end)
            .ok_or_else(|| RenderError::InvalidVolume(String::from("truncated .vol header")))?;
        self.pos = end;
        Ok([chunk[0], chunk[1], chunk[2], chunk[3]])
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take4()?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take4()?))
    }
}

pub fn parse_vol(bytes: &[u8]) -> Result<VolGrid> {
    if bytes.len() < HEADER_BYTES || &bytes[0..3] != b"VOL" {
        return Err(RenderError::InvalidVolume(String::from("missing VOL magic")));
    }
    if bytes[3] != 3 {
        return Err(RenderError::InvalidVolume(format!("unsupported .vol version {}", bytes[3])));
    }

    let mut reader = Reader { bytes, pos: 4 };
    let encoding = reader.i32()?;
    if encoding != 1 {
        return Err(RenderError::InvalidVolume(format!("unsupported .vol encoding {}, only float32 is read", encoding)));
    }

    let resolution = Vector3i::new(reader.i32()?, reader.i32()?, reader.i32()?);
    let no_channels = reader.i32()?;
    if resolution.iter().any(|v| *v <= 0) || no_channels <= 0 {
        return Err(RenderError::InvalidVolume(format!(
            "invalid .vol layout {:?} with {} channels", resolution, no_channels)));
    }
    let p_min = Vector3f::new(reader.f32()?, reader.f32()?, reader.f32()?);
    let p_max = Vector3f::new(reader.f32()?, reader.f32()?, reader.f32()?);

    let no_channels = no_channels as usize;
    let oversized = || RenderError::InvalidVolume(format!(
        ".vol layout {:?} with {} channels overflows", resolution, no_channels));
    let no_voxels = resolution
        .iter()
        .try_fold(1usize, |acc, v| acc.checked_mul(*v as usize))
        .ok_or_else(oversized)?;
    let voxel_bytes = no_channels.checked_mul(4).ok_or_else(oversized)?;
    let expected = no_voxels.checked_mul(voxel_bytes).ok_or_else(oversized)?;
    let payload = &bytes[HEADER_BYTES..];
    if payload.len() < expected {
        return Err(RenderError::InvalidVolume(format!(
            ".vol payload has {} bytes, expected {}", payload.len(), expected)));
    }

    let data = payload
        .chunks_exact(voxel_bytes)
        .take(no_voxels)
        .map(|voxel| f32::from_le_bytes([voxel[0], voxel[1], voxel[2], voxel[3]]))
        .collect();

    Ok(VolGrid { resolution, no_channels, bounds: AABB::new(p_min, p_max), data })
}

pub fn read_vol(file_path: &str) -> Result<VolGrid> {
    log::info!("Starting reading volume grid from: {}.", file_path);
    let bytes = std::fs::read(file_path)?;
    let grid = parse_vol(&bytes)?;
    log::info!("Volume loaded, resolution = {} x {} x {}, channels = {}.",
               grid.resolution.x, grid.resolution.y, grid.resolution.z, grid.no_channels);
    Ok(grid)
}

/// Single-channel float32 encoding of `data`.
pub fn encode_vol(resolution: Vector3i, bounds: &AABB, data: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_BYTES + data.len() * 4);
    bytes.extend_from_slice(b"VOL");
    bytes.push(3);
    for v in [1, resolution.x, resolution.y, resolution.z, 1] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    for v in bounds.p_min.iter().chain(bounds.p_max.iter()) {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    for v in data {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::texture::FilterMode;

    #[test]
    fn test_parse_single_channel_grid() {
        let bounds = AABB::new(Vector3f::new(-1.0, -2.0, -3.0), Vector3f::new(1.0, 2.0, 3.0));
        let data: Vec<f32> = (0..24).map(|i| i as f32 * 0.5).collect();
        let grid = parse_vol(&encode_vol(Vector3i::new(2, 3, 4), &bounds, &data)).unwrap();

        assert_eq!(grid.resolution, Vector3i::new(2, 3, 4));
        assert_eq!(grid.bounds, bounds);
        assert_eq!(grid.data, data);

        let mut texture = Texture3D::new_host("grid", FilterMode::Nearest);
        grid.upload(&mut texture).unwrap();
        assert_eq!(texture.texel(1, 2, 3), 23.0 * 0.5);
    }

    #[test]
    fn test_multi_channel_keeps_first() {
        let mut bytes = encode_vol(Vector3i::new(2, 1, 1), &AABB::new(Vector3f::zeros(), Vector3f::repeat(1.0)), &[]);
        // Patch the channel count to 2 and append interleaved voxels.
        bytes[20..24].copy_from_slice(&2i32.to_le_bytes());
        for v in [1.0f32, 9.0, 2.0, 9.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let grid = parse_vol(&bytes).unwrap();
        assert_eq!(grid.no_channels, 2);
        assert_eq!(grid.data, vec![1.0, 2.0]);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(parse_vol(b"NOPE"), Err(RenderError::InvalidVolume(_))));

        let bounds = AABB::new(Vector3f::zeros(), Vector3f::repeat(1.0));
        let mut bytes = encode_vol(Vector3i::new(2, 2, 2), &bounds, &[0.0; 8]);
        bytes.truncate(bytes.len() - 4);
        assert!(parse_vol(&bytes).is_err());

        let mut bytes = encode_vol(Vector3i::new(1, 1, 1), &bounds, &[0.0]);
        bytes[3] = 2;
        assert!(parse_vol(&bytes).is_err());
    }

    #[test]
    fn test_rejects_overflowing_layout() {
        let bounds = AABB::new(Vector3f::zeros(), Vector3f::repeat(1.0));
        let mut bytes = encode_vol(Vector3i::new(2048, 2048, 2048), &bounds, &[]);
        bytes[20..24].copy_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(parse_vol(&bytes), Err(RenderError::InvalidVolume(_))));

        let bytes = encode_vol(Vector3i::new(i32::MAX, i32::MAX, i32::MAX), &bounds, &[]);
        assert!(matches!(parse_vol(&bytes), Err(RenderError::InvalidVolume(_))));
    }
}
