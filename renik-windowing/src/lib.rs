//! # renik windowing
//!
//! This is the base, abstract crate for windowing types in renik. The `renik` crate describes what a
//! backend can draw, but it doesn’t give you a way to get a window nor an OpenGL context: that
//! depends on the platform and the windowing library an application picks. Windowing crates –
//! `renik-*` – fill that gap by implementing [`Surface`].
//!
//! # What’s included
//!
//! - [`WindowDim`]: the dimension of a window and its mode (windowed, fullscreen, fullscreen
//!   restricted).
//! - [`PixelFormat`]: the native framebuffer format requested when the context is created.
//! - [`WindowOpt`]: hints to customize the window integration, such as the cursor mode or
//!   multisampling.
//! - [`Surface`]: what a backend needs from a native window to render into it.

#![deny(missing_docs)]

use std::error::Error;
use std::os::raw::c_void;

/// Dimension metrics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode.
  Windowed {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
  /// Fullscreen mode, using the primary monitor resolution.
  Fullscreen,
  /// Fullscreen mode with a restricted resolution.
  FullscreenRestricted {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
}

/// Cursor mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorMode {
  /// The cursor is always visible.
  Visible,
  /// The cursor exists yet has been hidden.
  Invisible,
  /// The cursor is hidden and grabbed by the window.
  Disabled,
}

/// Native framebuffer description used to pick the pixel format of the surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PixelFormat {
  /// Bits of the color buffer (RGBA).
  pub color_bits: u8,
  /// Bits of the depth buffer.
  pub depth_bits: u8,
  /// Bits of the stencil buffer.
  pub stencil_bits: u8,
  /// Whether the surface is double buffered.
  pub double_buffer: bool,
}

impl Default for PixelFormat {
  /// 32-bit RGBA, 24-bit depth, 8-bit stencil, double buffered.
  fn default() -> Self {
    PixelFormat {
      color_bits: 32,
      depth_bits: 24,
      stencil_bits: 8,
      double_buffer: true,
    }
  }
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to start
/// with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  cursor_mode: CursorMode,
  num_samples: Option<u32>,
  vsync: bool,
  pixel_format: PixelFormat,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to a `960×540` window.
  /// - `cursor_mode` set to [`CursorMode::Visible`].
  /// - `num_samples` set to `None`.
  /// - `vsync` enabled.
  /// - `pixel_format` set to [`PixelFormat::default`].
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed {
        width: 960,
        height: 540,
      },
      cursor_mode: CursorMode::Visible,
      num_samples: None,
      vsync: true,
      pixel_format: PixelFormat::default(),
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> &WindowDim {
    &self.dim
  }

  /// Hide, unhide or disable the cursor. Default to [`CursorMode::Visible`].
  #[inline]
  pub fn set_cursor_mode(self, cursor_mode: CursorMode) -> Self {
    WindowOpt {
      cursor_mode,
      ..self
    }
  }

  /// Get the cursor mode.
  #[inline]
  pub fn cursor_mode(&self) -> &CursorMode {
    &self.cursor_mode
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> &Option<u32> {
    &self.num_samples
  }

  /// Enable or disable vertical synchronization.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether vertical synchronization is enabled.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }

  /// Set the pixel format of the surface.
  #[inline]
  pub fn set_pixel_format(self, pixel_format: PixelFormat) -> Self {
    WindowOpt {
      pixel_format,
      ..self
    }
  }

  /// Get the pixel format of the surface.
  #[inline]
  pub fn pixel_format(&self) -> &PixelFormat {
    &self.pixel_format
  }
}

/// A native drawing surface a backend can create a context on and present to.
///
/// Implementations wrap whatever the windowing library gives access to (a window, a device context,
/// a canvas, …).
pub trait Surface {
  /// Type of surface errors.
  type Error: Error + 'static;

  /// Make the rendering context of the surface current on the calling thread.
  fn make_current(&mut self) -> Result<(), Self::Error>;

  /// Address of a driver entry point, or null if it doesn’t exist.
  ///
  /// Only meaningful once [`Surface::make_current`] succeeded.
  fn get_proc_address(&self, name: &str) -> *const c_void;

  /// Present the back buffer.
  fn swap_buffers(&mut self) -> Result<(), Self::Error>;

  /// Size of the surface’s framebuffer, in physical pixels.
  fn size(&self) -> [u32; 2];

  /// Width of the surface’s framebuffer.
  ///
  /// # Defaults
  ///
  /// Defaults to `.size()[0]`.
  fn width(&self) -> u32 {
    self.size()[0]
  }

  /// Height of the surface’s framebuffer.
  ///
  /// # Defaults
  ///
  /// Defaults to `.size()[1]`.
  fn height(&self) -> u32 {
    self.size()[1]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_options() {
    let opt = WindowOpt::default();

    assert_eq!(
      *opt.dim(),
      WindowDim::Windowed {
        width: 960,
        height: 540
      }
    );
    assert_eq!(*opt.cursor_mode(), CursorMode::Visible);
    assert_eq!(*opt.num_samples(), None);
    assert!(opt.vsync());
  }

  #[test]
  fn default_pixel_format() {
    let pf = PixelFormat::default();

    assert_eq!(pf.color_bits, 32);
    assert_eq!(pf.depth_bits, 24);
    assert_eq!(pf.stencil_bits, 8);
    assert!(pf.double_buffer);
  }

  #[test]
  fn builder_keeps_other_fields() {
    let opt = WindowOpt::default()
      .set_num_samples(4)
      .set_cursor_mode(CursorMode::Disabled)
      .set_vsync(false);

    assert_eq!(*opt.num_samples(), Some(4));
    assert_eq!(*opt.cursor_mode(), CursorMode::Disabled);
    assert!(!opt.vsync());
    assert_eq!(*opt.pixel_format(), PixelFormat::default());
  }

  #[test]
  fn provided_width_and_height() {
    struct Fixed;

    #[derive(Debug)]
    struct Never;

    impl std::fmt::Display for Never {
      fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("never")
      }
    }

    impl Error for Never {}

    impl Surface for Fixed {
      type Error = Never;

      fn make_current(&mut self) -> Result<(), Never> {
        Ok(())
      }

      fn get_proc_address(&self, _: &str) -> *const c_void {
        std::ptr::null()
      }

      fn swap_buffers(&mut self) -> Result<(), Never> {
        Ok(())
      }

      fn size(&self) -> [u32; 2] {
        [640, 480]
      }
    }

    assert_eq!(Fixed.width(), 640);
    assert_eq!(Fixed.height(), 480);
  }
}
