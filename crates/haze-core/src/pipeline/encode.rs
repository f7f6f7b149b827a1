//! Placeholder hash encoding.
//!
//! The encoding algorithm itself is external: a pure, deterministic function
//! supplied by the `blurhash` crate. This module only adapts a [`PixelGrid`]
//! to the buffer layout the encoder expects and maps its failure into the
//! pipeline's error taxonomy.

use crate::error::PipelineError;

use super::resize::{PixelGrid, GRID_HEIGHT, GRID_WIDTH};

/// Horizontal DCT components of the placeholder hash.
pub const COMPONENTS_X: u32 = 4;

/// Vertical DCT components of the placeholder hash.
pub const COMPONENTS_Y: u32 = 3;

/// Length in characters of a hash produced with the fixed component counts.
pub const HASH_LEN: usize = 4 + 2 * (COMPONENTS_X * COMPONENTS_Y) as usize;

/// The base-83 alphabet hashes are drawn from.
pub const ALPHABET: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz#$%*+,-.:;=?@[]^_{|}~";

/// Encode a pixel grid into a placeholder hash string.
pub fn encode_grid(asset_id: &str, grid: &PixelGrid) -> Result<String, PipelineError> {
    blurhash::encode(
        COMPONENTS_X,
        COMPONENTS_Y,
        GRID_WIDTH,
        GRID_HEIGHT,
        &grid.to_rgba(),
    )
    .map_err(|e| PipelineError::Encode {
        asset_id: asset_id.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use crate::pipeline::resize::ImageResizer;
    use image::{DynamicImage, Rgb, RgbImage};

    async fn grid_from(image: RgbImage) -> PixelGrid {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.png");
        DynamicImage::ImageRgb8(image).save(&path).unwrap();
        ImageResizer::new(LimitsConfig::default())
            .resize(&path)
            .await
            .unwrap()
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[tokio::test]
    async fn test_hash_length_and_alphabet() {
        let grid = grid_from(gradient(200, 100)).await;
        let hash = encode_grid("fixture.png", &grid).unwrap();

        assert_eq!(hash.len(), HASH_LEN);
        assert!(hash.chars().all(|c| ALPHABET.contains(c)));
    }

    #[tokio::test]
    async fn test_encoding_is_deterministic() {
        let grid = grid_from(gradient(640, 480)).await;
        let first = encode_grid("fixture.png", &grid).unwrap();
        let second = encode_grid("fixture.png", &grid).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_distinct_images_distinct_hashes() {
        let red = grid_from(RgbImage::from_pixel(64, 64, Rgb([200, 0, 0]))).await;
        let blue = grid_from(RgbImage::from_pixel(64, 64, Rgb([0, 0, 200]))).await;

        let red_hash = encode_grid("red.png", &red).unwrap();
        let blue_hash = encode_grid("blue.png", &blue).unwrap();
        assert_ne!(red_hash, blue_hash);
    }
}
