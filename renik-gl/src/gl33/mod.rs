//! OpenGL 3.3 backend.
//!
//! [`GL33`] owns a [`Surface`] and implements [`Graphic`](renik::Graphic) on top of its context.
//! Nothing touches the driver before [`Graphic::init`](renik::Graphic::init): the context is made
//! current, the entry points are loaded through [`Surface::get_proc_address`] and the initial
//! state is captured into a [`GLState`].

mod debug;
mod draw;
mod framebuffer;
mod graphic;
mod mesh;
mod shader;
mod state;
mod texture;

pub use self::state::{GLState, StateQueryError};

use self::debug::Reporter;
use self::mesh::MeshTable;
use gl::types::*;
use renik::{FramebufferId, RenderbufferId, Shader, ShaderId, TextureId};
use renik_windowing::Surface;
use std::collections::HashMap;

/// The OpenGL 3.3 backend.
///
/// Next to the surface, the backend keeps the tables mapping abstract resources to native
/// handles. They are all freed by [`Graphic::release`](renik::Graphic::release), which is also
/// called when the backend is dropped.
pub struct GL33<S>
where
  S: Surface,
{
  surface: S,
  state: Option<GLState>,
  reporter: Reporter,
  meshes: MeshTable,
  shaders: Vec<Shader>,
  programs: HashMap<ShaderId, GLuint>,
  textures: HashMap<TextureId, GLuint>,
  framebuffers: HashMap<FramebufferId, GLuint>,
  renderbuffers: HashMap<RenderbufferId, GLuint>,
  // framebuffer bound by the surface when initialized
  default_framebuffer: GLuint,
  vertex_array: GLuint,
}

impl<S> GL33<S>
where
  S: Surface,
{
  /// Wrap a surface. The backend must be initialized before use.
  pub fn new(surface: S) -> Self {
    GL33 {
      surface,
      state: None,
      reporter: Reporter::default(),
      meshes: MeshTable::default(),
      shaders: Vec::new(),
      programs: HashMap::new(),
      textures: HashMap::new(),
      framebuffers: HashMap::new(),
      renderbuffers: HashMap::new(),
      default_framebuffer: 0,
      vertex_array: 0,
    }
  }

  /// The surface rendered into.
  pub fn surface(&self) -> &S {
    &self.surface
  }

  /// The surface rendered into.
  pub fn surface_mut(&mut self) -> &mut S {
    &mut self.surface
  }

  /// The cached graphics state, once initialized.
  ///
  /// Calls made to the driver behind the back of the backend must be followed by the matching
  /// `invalidate_*` call on the state.
  pub fn state_mut(&mut self) -> Option<&mut GLState> {
    self.state.as_mut()
  }

  /// Number of meshes with live buffers.
  pub fn mesh_count(&self) -> usize {
    self.meshes.len()
  }
}

impl<S> Drop for GL33<S>
where
  S: Surface,
{
  fn drop(&mut self) {
    if self.state.is_some() {
      if let Err(e) = renik::Graphic::release(self) {
        log::error!("cannot release OpenGL resources: {}", e);
      }
    }
  }
}
