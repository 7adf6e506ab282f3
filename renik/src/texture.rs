//! 2D textures.

opaque_id!(
  /// Identifier of a texture uploaded to a backend.
  TextureId,
  "texture"
);

/// Pixel layout of a texture, one byte per channel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureFormat {
  /// Red only.
  R8,
  /// Red and green.
  Rg8,
  /// Red, green and blue.
  Rgb8,
  /// Red, green, blue and alpha.
  Rgba8,
}

impl TextureFormat {
  /// Size in bytes of a single pixel.
  pub fn bytes_per_pixel(self) -> usize {
    match self {
      TextureFormat::R8 => 1,
      TextureFormat::Rg8 => 2,
      TextureFormat::Rgb8 => 3,
      TextureFormat::Rgba8 => 4,
    }
  }
}

/// Sampling filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureFilter {
  /// Nearest texel.
  Nearest,
  /// Linear interpolation between neighbouring texels.
  Linear,
}

/// Behavior of texture coordinates outside of `[0; 1]`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureWrap {
  /// Clamp to the edge texel.
  ClampToEdge,
  /// Repeat the texture.
  Repeat,
  /// Repeat the texture, mirroring every other repetition.
  MirroredRepeat,
}

/// CPU-side description of a 2D texture.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Texture {
  width: u32,
  height: u32,
  format: TextureFormat,
  pixels: Vec<u8>,
  /// Minification filter.
  pub min_filter: TextureFilter,
  /// Magnification filter.
  pub mag_filter: TextureFilter,
  /// Wrapping on both axes.
  pub wrap: TextureWrap,
}

impl Texture {
  /// Create a texture from raw pixels, rows bottom to top.
  ///
  /// Returns `None` if `pixels` doesn’t hold exactly `width * height` pixels of `format`.
  pub fn new(width: u32, height: u32, format: TextureFormat, pixels: Vec<u8>) -> Option<Self> {
    let expected = width as usize * height as usize * format.bytes_per_pixel();

    if pixels.len() != expected {
      return None;
    }

    Some(Texture {
      width,
      height,
      format,
      pixels,
      min_filter: TextureFilter::Linear,
      mag_filter: TextureFilter::Linear,
      wrap: TextureWrap::ClampToEdge,
    })
  }

  /// Width in pixels.
  pub fn width(&self) -> u32 {
    self.width
  }

  /// Height in pixels.
  pub fn height(&self) -> u32 {
    self.height
  }

  /// Pixel format.
  pub fn format(&self) -> TextureFormat {
    self.format
  }

  /// Raw pixels.
  pub fn pixels(&self) -> &[u8] {
    &self.pixels
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pixel_count_must_match() {
    assert!(Texture::new(2, 2, TextureFormat::Rgba8, vec![0; 16]).is_some());
    assert!(Texture::new(2, 2, TextureFormat::Rgba8, vec![0; 12]).is_none());
    assert!(Texture::new(3, 1, TextureFormat::Rgb8, vec![0; 9]).is_some());
  }

  #[test]
  fn default_sampling() {
    let tex = Texture::new(1, 1, TextureFormat::R8, vec![255]).unwrap();
    assert_eq!(tex.min_filter, TextureFilter::Linear);
    assert_eq!(tex.wrap, TextureWrap::ClampToEdge);
  }
}
