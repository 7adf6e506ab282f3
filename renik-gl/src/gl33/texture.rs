//! 2D textures.

use crate::gl33::debug::Reporter;
use crate::gl33::state::GLState;
use gl::types::*;
use renik::{GraphicError, Texture, TextureFilter, TextureFormat, TextureWrap};
use std::os::raw::c_void;

/// Upload a texture into a new texture object, bound to the texture unit 0.
pub(crate) unsafe fn upload(
  state: &mut GLState,
  reporter: &mut Reporter,
  texture: &Texture,
) -> Result<GLuint, GraphicError> {
  let (width, height) = texture_size(texture)?;
  let (internal_format, format) = opengl_pixel_format(texture.format());

  let mut handle: GLuint = 0;
  gl::GenTextures(1, &mut handle);

  state.set_texture_unit(0);
  state.bind_texture(handle);

  apply_sampler_to_texture(texture);

  gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
  gl::TexImage2D(
    gl::TEXTURE_2D,
    0,
    internal_format as GLint,
    width,
    height,
    0,
    format,
    gl::UNSIGNED_BYTE,
    texture.pixels().as_ptr() as *const c_void,
  );

  if let Err(e) = reporter.check("glTexImage2D") {
    delete(state, handle);
    return Err(e);
  }

  Ok(handle)
}

/// Delete a texture object, forgetting it in the state cache first.
pub(crate) unsafe fn delete(state: &mut GLState, handle: GLuint) {
  state.unbind_texture(handle);
  gl::DeleteTextures(1, &handle);
}

fn texture_size(texture: &Texture) -> Result<(GLsizei, GLsizei), GraphicError> {
  if texture.width() == 0 || texture.height() == 0 {
    return Err(GraphicError::InvalidTexture(format!(
      "empty texture ({}×{})",
      texture.width(),
      texture.height()
    )));
  }

  let max = GLsizei::MAX as u32;
  if texture.width() > max || texture.height() > max {
    return Err(GraphicError::InvalidTexture(format!(
      "texture too large ({}×{})",
      texture.width(),
      texture.height()
    )));
  }

  Ok((texture.width() as GLsizei, texture.height() as GLsizei))
}

fn apply_sampler_to_texture(texture: &Texture) {
  let wrap = opengl_wrap(texture.wrap) as GLint;

  unsafe {
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap);
    gl::TexParameteri(
      gl::TEXTURE_2D,
      gl::TEXTURE_MIN_FILTER,
      opengl_filter(texture.min_filter) as GLint,
    );
    gl::TexParameteri(
      gl::TEXTURE_2D,
      gl::TEXTURE_MAG_FILTER,
      opengl_filter(texture.mag_filter) as GLint,
    );
  }
}

pub(crate) fn opengl_pixel_format(format: TextureFormat) -> (GLenum, GLenum) {
  match format {
    TextureFormat::R8 => (gl::R8, gl::RED),
    TextureFormat::Rg8 => (gl::RG8, gl::RG),
    TextureFormat::Rgb8 => (gl::RGB8, gl::RGB),
    TextureFormat::Rgba8 => (gl::RGBA8, gl::RGBA),
  }
}

fn opengl_wrap(wrap: TextureWrap) -> GLenum {
  match wrap {
    TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
    TextureWrap::Repeat => gl::REPEAT,
    TextureWrap::MirroredRepeat => gl::MIRRORED_REPEAT,
  }
}

fn opengl_filter(filter: TextureFilter) -> GLenum {
  match filter {
    TextureFilter::Nearest => gl::NEAREST,
    TextureFilter::Linear => gl::LINEAR,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pixel_formats() {
    assert_eq!(opengl_pixel_format(TextureFormat::Rgba8), (gl::RGBA8, gl::RGBA));
    assert_eq!(opengl_pixel_format(TextureFormat::R8), (gl::R8, gl::RED));
  }

  #[test]
  fn empty_textures_are_rejected() {
    let tex = Texture::new(0, 4, TextureFormat::Rgba8, Vec::new()).unwrap();
    assert!(matches!(
      texture_size(&tex),
      Err(GraphicError::InvalidTexture(_))
    ));
  }

  #[test]
  fn sizes_are_forwarded() {
    let tex = Texture::new(4, 2, TextureFormat::Rg8, vec![0; 16]).unwrap();
    assert_eq!(texture_size(&tex).unwrap(), (4, 2));
  }

  #[test]
  fn sampling() {
    assert_eq!(opengl_wrap(TextureWrap::Repeat), gl::REPEAT);
    assert_eq!(opengl_filter(TextureFilter::Nearest), gl::NEAREST);
  }
}
