use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use log::warn;
use thiserror::Error;

/// Failure while decoding a texture file.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to read texture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {path} has unsupported channel count {channels}")]
    Channels { path: PathBuf, channels: u8 },
    #[error("texture {path} has zero area")]
    Empty { path: PathBuf },
}

/// Decoded RGBA8 pixels plus the colour space they should be sampled in.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Colour textures are stored as sRGB; data maps (specular) stay linear.
    pub srgb: bool,
}

impl TextureData {
    pub fn load(path: &Path, srgb: bool) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = image::load_from_memory(&bytes).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_image(path, &image, srgb)
    }

    /// Loads `path`, falling back to a checkerboard when it cannot be decoded
    /// so a missing file shows up visibly instead of aborting the demo.
    pub fn load_or_fallback(path: &Path, srgb: bool) -> Self {
        Self::load(path, srgb).unwrap_or_else(|err| {
            warn!("{err}; using fallback texture");
            Self::checkerboard(path.display().to_string(), 8, srgb)
        })
    }

    /// Expands 1 to 4 channel images into RGBA8.
    pub fn from_image(path: &Path, image: &DynamicImage, srgb: bool) -> Result<Self, TextureError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty {
                path: path.to_path_buf(),
            });
        }
        let channels = image.color().channel_count();
        if !(1..=4).contains(&channels) {
            return Err(TextureError::Channels {
                path: path.to_path_buf(),
                channels,
            });
        }
        Ok(Self {
            label: path.display().to_string(),
            width,
            height,
            pixels: image.to_rgba8().into_raw(),
            srgb,
        })
    }

    pub fn solid(label: impl Into<String>, rgba: [u8; 4], srgb: bool) -> Self {
        Self {
            label: label.into(),
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
            srgb,
        }
    }

    /// Magenta/black checkerboard made of `cells` x `cells` squares of 8 px.
    pub fn checkerboard(label: impl Into<String>, cells: u32, srgb: bool) -> Self {
        const CELL: u32 = 8;
        let size = cells.max(1) * CELL;
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let on = ((x / CELL) + (y / CELL)) % 2 == 0;
                let color: [u8; 4] = if on {
                    [255, 0, 255, 255]
                } else {
                    [0, 0, 0, 255]
                };
                pixels.extend_from_slice(&color);
            }
        }
        Self {
            label: label.into(),
            width: size,
            height: size,
            pixels,
            srgb,
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    #[test]
    fn grayscale_expands_to_rgba() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 1, Luma([7])));
        let data = TextureData::from_image(Path::new("gray.png"), &gray, false).unwrap();
        assert_eq!(data.pixels, vec![7, 7, 7, 255, 7, 7, 7, 255]);
        assert_eq!(data.bytes_per_row(), 8);
    }

    #[test]
    fn rgb_gets_opaque_alpha() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_raw(1, 1, vec![1, 2, 3]).unwrap());
        let data = TextureData::from_image(Path::new("rgb.png"), &rgb, true).unwrap();
        assert_eq!(data.pixels, vec![1, 2, 3, 255]);
        assert!(data.srgb);
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();
        let data = TextureData::load(&path, true).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(&data.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_file_falls_back_to_checkerboard() {
        let data = TextureData::load_or_fallback(Path::new("does/not/exist.png"), true);
        assert_eq!(data.width, 64);
        assert_eq!(data.pixels.len(), 64 * 64 * 4);
        assert_eq!(&data.pixels[..4], &[255, 0, 255, 255]);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = TextureData::load(Path::new("does/not/exist.png"), false).unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }));
    }
}
