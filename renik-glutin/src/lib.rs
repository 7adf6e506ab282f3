//! The [glutin] windowing implementation for [renik-windowing].
//!
//! [`GlutinSurface`] opens a window with an OpenGL 3.3 core context. The context isn’t made current
//! when the surface is created: this is done by the backend when it’s initialized, through
//! [`Surface::make_current`].
//!
//! [glutin]: https://crates.io/crates/glutin
//! [renik-windowing]: https://crates.io/crates/renik-windowing

#![deny(missing_docs)]

pub use glutin;
use glutin::{
  dpi::{LogicalSize, PhysicalSize},
  event_loop::EventLoop,
  window::{Fullscreen, Window, WindowBuilder},
  Api, ContextBuilder, ContextError, CreationError, GlProfile, GlRequest, NotCurrent,
  PossiblyCurrent, WindowedContext,
};
use renik_gl::GL33;
pub use renik_windowing::{CursorMode, PixelFormat, WindowDim, WindowOpt};
use renik_windowing::Surface;
use std::error;
use std::fmt;
use std::mem;
use std::os::raw::c_void;
use std::ptr;

/// Error that might occur when creating or using a Glutin surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlutinError {
  /// Something went wrong when creating the Glutin surface. The carried [`CreationError`] provides
  /// more information.
  CreationError(CreationError),
  /// OpenGL context error.
  ContextError(ContextError),
  /// The context was lost while switching it current; the surface can’t be used anymore.
  ContextLost,
  /// The operation needs the context to be current.
  NotCurrent,
}

impl fmt::Display for GlutinError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlutinError::CreationError(ref e) => write!(f, "Glutin surface creation error: {}", e),
      GlutinError::ContextError(ref e) => write!(f, "Glutin OpenGL context error: {}", e),
      GlutinError::ContextLost => f.write_str("Glutin OpenGL context lost"),
      GlutinError::NotCurrent => f.write_str("Glutin OpenGL context not current"),
    }
  }
}

impl error::Error for GlutinError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlutinError::CreationError(e) => Some(e),
      GlutinError::ContextError(e) => Some(e),
      _ => None,
    }
  }
}

impl From<CreationError> for GlutinError {
  fn from(e: CreationError) -> Self {
    GlutinError::CreationError(e)
  }
}

impl From<ContextError> for GlutinError {
  fn from(e: ContextError) -> Self {
    GlutinError::ContextError(e)
  }
}

enum Context {
  NotCurrent(WindowedContext<NotCurrent>),
  Current(WindowedContext<PossiblyCurrent>),
  Lost,
}

/// The Glutin surface.
///
/// Hand it to [`GL33::new`] (or use [`gl33`]) to render into it.
pub struct GlutinSurface {
  ctx: Context,
  cursor_mode: CursorMode,
}

impl GlutinSurface {
  /// Create a new [`GlutinSurface`] by consuming a [`WindowBuilder`].
  ///
  /// This is an alternative method to [`new`](GlutinSurface::new) that is more flexible as you have
  /// access to the whole `glutin` types.
  ///
  /// `window_builder` is the default object when passed to your closure and `ctx_builder` is
  /// already initialized for the OpenGL context (you’re not supposed to change the version nor the
  /// profile!).
  pub fn from_builders<WB, CB>(
    window_builder: WB,
    ctx_builder: CB,
  ) -> Result<(Self, EventLoop<()>), GlutinError>
  where
    WB: FnOnce(WindowBuilder) -> WindowBuilder,
    CB: FnOnce(ContextBuilder<NotCurrent>) -> ContextBuilder<NotCurrent>,
  {
    let event_loop = EventLoop::new();

    // the window is shown once the context is current
    let window_builder = window_builder(WindowBuilder::new().with_visible(false));

    let windowed_ctx = ctx_builder(
      ContextBuilder::new()
        .with_gl(GlRequest::Specific(Api::OpenGl, (3, 3)))
        .with_gl_profile(GlProfile::Core),
    )
    .build_windowed(window_builder, &event_loop)?;

    let surface = GlutinSurface {
      ctx: Context::NotCurrent(windowed_ctx),
      cursor_mode: CursorMode::Visible,
    };

    Ok((surface, event_loop))
  }

  /// Create a new [`GlutinSurface`] from scratch.
  pub fn new(title: &str, win_opt: WindowOpt) -> Result<(Self, EventLoop<()>), GlutinError> {
    let dim = *win_opt.dim();
    let pixel_format = *win_opt.pixel_format();
    let samples = win_opt.num_samples().unwrap_or(0).min(u16::MAX as u32) as u16;
    let vsync = win_opt.vsync();

    let (mut surface, event_loop) = Self::from_builders(
      |wb| apply_dim(wb.with_title(title), dim),
      |cb| {
        let (color_bits, alpha_bits) = color_alpha_bits(&pixel_format);

        cb.with_multisampling(samples)
          .with_double_buffer(Some(pixel_format.double_buffer))
          .with_depth_buffer(pixel_format.depth_bits)
          .with_stencil_buffer(pixel_format.stencil_bits)
          .with_pixel_format(color_bits, alpha_bits)
          .with_vsync(vsync)
      },
    )?;

    surface.cursor_mode = *win_opt.cursor_mode();

    log::debug!("created a {:?} Glutin surface titled {:?}", dim, title);

    Ok((surface, event_loop))
  }

  /// The window, unless the context was lost.
  pub fn window(&self) -> Option<&Window> {
    match self.ctx {
      Context::NotCurrent(ref ctx) => Some(ctx.window()),
      Context::Current(ref ctx) => Some(ctx.window()),
      Context::Lost => None,
    }
  }

  /// Resize the default framebuffer, after the window got resized.
  pub fn resize(&mut self, width: u32, height: u32) {
    if let Context::Current(ref ctx) = self.ctx {
      ctx.resize(PhysicalSize::new(width, height));
    }
  }

  fn apply_cursor_mode(&self, window: &Window) {
    let (visible, grabbed) = match self.cursor_mode {
      CursorMode::Visible => (true, false),
      CursorMode::Invisible => (false, false),
      CursorMode::Disabled => (false, true),
    };

    window.set_cursor_visible(visible);

    if let Err(e) = window.set_cursor_grab(grabbed) {
      log::warn!("cannot grab the cursor: {}", e);
    }
  }
}

impl Surface for GlutinSurface {
  type Error = GlutinError;

  fn make_current(&mut self) -> Result<(), GlutinError> {
    let current = match mem::replace(&mut self.ctx, Context::Lost) {
      Context::NotCurrent(ctx) => unsafe { ctx.make_current() }.map_err(|(ctx, e)| {
        self.ctx = Context::NotCurrent(ctx);
        GlutinError::ContextError(e)
      })?,

      Context::Current(ctx) if ctx.is_current() => ctx,

      Context::Current(ctx) => unsafe { ctx.make_current() }.map_err(|(ctx, e)| {
        self.ctx = Context::Current(ctx);
        GlutinError::ContextError(e)
      })?,

      Context::Lost => return Err(GlutinError::ContextLost),
    };

    self.apply_cursor_mode(current.window());
    current.window().set_visible(true);
    self.ctx = Context::Current(current);

    Ok(())
  }

  fn get_proc_address(&self, name: &str) -> *const c_void {
    match self.ctx {
      Context::Current(ref ctx) => ctx.get_proc_address(name) as *const c_void,
      _ => ptr::null(),
    }
  }

  fn swap_buffers(&mut self) -> Result<(), GlutinError> {
    match self.ctx {
      Context::Current(ref ctx) => Ok(ctx.swap_buffers()?),
      Context::NotCurrent(_) => Err(GlutinError::NotCurrent),
      Context::Lost => Err(GlutinError::ContextLost),
    }
  }

  /// Get the underlying size (in physical pixels) of the surface.
  fn size(&self) -> [u32; 2] {
    self.window().map_or([0, 0], |window| {
      let size = window.inner_size();
      [size.width, size.height]
    })
  }
}

/// Create a window and an OpenGL 3.3 backend rendering into it.
///
/// The backend still has to be initialized with [`Graphic::init`](renik::Graphic::init).
pub fn gl33(
  title: &str,
  win_opt: WindowOpt,
) -> Result<(GL33<GlutinSurface>, EventLoop<()>), GlutinError> {
  let (surface, event_loop) = GlutinSurface::new(title, win_opt)?;
  Ok((GL33::new(surface), event_loop))
}

fn apply_dim(window_builder: WindowBuilder, dim: WindowDim) -> WindowBuilder {
  match dim {
    WindowDim::Windowed { width, height } => {
      window_builder.with_inner_size(LogicalSize::new(width, height))
    }

    WindowDim::Fullscreen => window_builder.with_fullscreen(Some(Fullscreen::Borderless(None))),

    WindowDim::FullscreenRestricted { width, height } => window_builder
      .with_inner_size(LogicalSize::new(width, height))
      .with_fullscreen(Some(Fullscreen::Borderless(None))),
  }
}

/// Split the color bits of a pixel format into RGB and alpha bits.
fn color_alpha_bits(pixel_format: &PixelFormat) -> (u8, u8) {
  let alpha_bits = if pixel_format.color_bits >= 32 { 8 } else { 0 };
  (pixel_format.color_bits - alpha_bits, alpha_bits)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::error::Error as _;

  #[test]
  fn rgba_pixel_format() {
    assert_eq!(color_alpha_bits(&PixelFormat::default()), (24, 8));

    let rgb = PixelFormat {
      color_bits: 24,
      ..PixelFormat::default()
    };
    assert_eq!(color_alpha_bits(&rgb), (24, 0));
  }

  #[test]
  fn context_errors() {
    let e = GlutinError::from(ContextError::ContextLost);
    assert!(e.to_string().starts_with("Glutin OpenGL context error"));
    assert!(e.source().is_some());

    assert!(GlutinError::ContextLost.source().is_none());
    assert_eq!(
      GlutinError::NotCurrent.to_string(),
      "Glutin OpenGL context not current"
    );
  }
}
