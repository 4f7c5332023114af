//! Texture image loading.
//!
//! Material overrides in a home point at PNG or JPEG files next to the
//! models. They are decoded once into 8-bit sRGB RGBA; color space handling is
//! left to whatever consumes the scene.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded image.
#[derive(Clone, Debug)]
pub struct Texture {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,

    /// Row-major sRGB RGBA, 4 bytes per pixel
    pub rgba: Vec<u8>,
}

impl Texture {
    /// True when any pixel is not fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.rgba.chunks_exact(4).any(|p| p[3] < u8::MAX)
    }

    pub fn size_bytes(&self) -> usize {
        self.rgba.len()
    }
}

/// Decode an image file.
pub fn load_texture(path: &Path) -> TextureResult<Texture> {
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let texture = Texture {
        path: path.to_path_buf(),
        width,
        height,
        rgba: rgba.into_raw(),
    };

    log::debug!(
        "Loaded image {} ({}x{}, {:.1} KB{})",
        path.display(),
        width,
        height,
        texture.size_bytes() as f32 / 1024.0,
        if texture.has_alpha() { ", alpha" } else { "" }
    );
    Ok(texture)
}
