//! Image resizing into the fixed pixel grid the hash encoder consumes.

use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Fixed grid width: a fidelity/cost tradeoff for hash computation, not a
/// user-facing knob.
pub const GRID_WIDTH: u32 = 32;

/// Fixed grid height.
pub const GRID_HEIGHT: u32 = 32;

/// A 32×32 matrix of RGB triples, ephemeral within one processing call.
///
/// Produced by crop-to-fill resizing, so the grid is always exactly
/// `GRID_WIDTH`×`GRID_HEIGHT` regardless of the source aspect ratio.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    pixels: Vec<[u8; 3]>,
}

impl PixelGrid {
    fn from_image(image: &RgbImage) -> Self {
        debug_assert_eq!(image.dimensions(), (GRID_WIDTH, GRID_HEIGHT));
        Self {
            pixels: image.pixels().map(|p| p.0).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        GRID_WIDTH
    }

    pub fn height(&self) -> u32 {
        GRID_HEIGHT
    }

    /// Pixel at (x, y), row-major.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[(y * GRID_WIDTH + x) as usize]
    }

    /// Flatten into the RGBA byte layout the hash encoder expects.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixels.len() * 4);
        for [r, g, b] in &self.pixels {
            rgba.extend_from_slice(&[*r, *g, *b, 255]);
        }
        rgba
    }
}

/// Normalizes a source image of arbitrary dimensions into a [`PixelGrid`].
pub struct ImageResizer {
    limits: LimitsConfig,
}

impl ImageResizer {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read, decode, and crop-to-fill resize an image file.
    ///
    /// Decoding runs under `spawn_blocking`. Any failure (unreadable file,
    /// oversized file, corrupt or unrecognized image data) surfaces as
    /// `DecodeError`; callers never fall back to the raw unresized image.
    pub async fn resize(&self, path: &Path) -> Result<PixelGrid, PipelineError> {
        self.precheck(path)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {e}"),
            })?;

        let path_owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::resize_sync(bytes, &path_owned))
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {e}"),
            })?
    }

    /// Cheap pre-decode guards: size ceiling and image magic bytes.
    fn precheck(&self, path: &Path) -> Result<(), PipelineError> {
        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {e}"),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!(
                    "File too large: {}MB > {}MB",
                    metadata.len() / (1024 * 1024),
                    self.limits.max_file_size_mb
                ),
            });
        }

        let header = {
            use std::io::Read;
            let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot open file: {e}"),
            })?;
            let mut buf = [0u8; 12];
            let n = file.read(&mut buf).unwrap_or(0);
            (buf, n)
        };

        if !looks_like_image(&header.0, header.1) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    /// Synchronous decode + resize (runs in spawn_blocking).
    fn resize_sync(bytes: Vec<u8>, path: &Path) -> Result<PixelGrid, PipelineError> {
        use std::io::Cursor;

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {e}"),
            })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // Crop-to-fill: scale and center-crop so the grid is filled exactly,
        // never letterboxed. Aspect ratio is intentionally not preserved.
        let resized = image.resize_to_fill(GRID_WIDTH, GRID_HEIGHT, FilterType::Triangle);
        Ok(PixelGrid::from_image(&resized.to_rgb8()))
    }
}

/// Magic-byte check for the formats the pipeline accepts.
fn looks_like_image(header: &[u8; 12], bytes_read: usize) -> bool {
    if bytes_read < 4 {
        return false;
    }

    // JPEG: FF D8 FF
    if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
        return true;
    }

    // PNG: 89 50 4E 47
    if header[0] == 0x89 && header[1] == b'P' && header[2] == b'N' && header[3] == b'G' {
        return true;
    }

    // GIF: GIF8
    if header[0] == b'G' && header[1] == b'I' && header[2] == b'F' && header[3] == b'8' {
        return true;
    }

    // WebP: RIFF....WEBP (short reads may still be WebP, allow them through)
    if header[0] == b'R' && header[1] == b'I' && header[2] == b'F' && header[3] == b'F' {
        if bytes_read >= 12 {
            return &header[8..12] == b"WEBP";
        }
        return true;
    }

    // BMP: BM
    if header[0] == b'B' && header[1] == b'M' {
        return true;
    }

    // TIFF: II*\0 or MM\0*
    let is_tiff_le = header[0] == b'I' && header[1] == b'I' && header[2] == 0x2A && header[3] == 0;
    let is_tiff_be = header[0] == b'M' && header[1] == b'M' && header[2] == 0 && header[3] == 0x2A;
    is_tiff_le || is_tiff_be
}
