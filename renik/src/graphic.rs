//! The graphic interface.
//!
//! [`Graphic`] is implemented by backends. An implementation is bound to a single native surface
//! and must be initialized with [`Graphic::init`] before anything else can be done; every
//! operation touching the driver fails with [`GraphicError::NotInitialized`] otherwise.

use crate::backend::GraphicBackend;
use crate::color::{Color, RectI};
use crate::diagnostic::DiagnosticCallback;
use crate::draw::DrawMode;
use crate::feature::Feature;
use crate::material::Material;
use crate::mesh::{Mesh, MeshId};
use crate::shader::{Shader, ShaderError, ShaderId};
use crate::texture::{Texture, TextureId};
use std::error;
use std::fmt;

opaque_id!(
  /// Identifier of a framebuffer created by a backend.
  FramebufferId,
  "framebuffer"
);

opaque_id!(
  /// Identifier of a renderbuffer created by a backend.
  RenderbufferId,
  "renderbuffer"
);

/// Errors a [`Graphic`] implementation can return.
#[non_exhaustive]
#[derive(Debug)]
pub enum GraphicError {
  /// The backend was not initialized, or was released.
  NotInitialized,
  /// The native surface failed (context activation, presentation, …).
  Surface(String),
  /// The graphics state couldn’t be acquired or queried.
  State(String),
  /// Shader creation or lookup failed.
  Shader(ShaderError),
  /// The mesh was never bound.
  UnknownMesh(MeshId),
  /// The mesh has no material.
  MissingMaterial(MeshId),
  /// The material of the mesh has no shader attached.
  MissingShader(MeshId),
  /// No texture is registered under this id.
  UnknownTexture(TextureId),
  /// No framebuffer is registered under this id.
  UnknownFramebuffer(FramebufferId),
  /// No renderbuffer is registered under this id.
  UnknownRenderbuffer(RenderbufferId),
  /// The texture can’t be uploaded.
  InvalidTexture(String),
  /// A driver call reported an error.
  Driver {
    /// Native error code.
    code: u32,
    /// Name of the failing call.
    call: &'static str,
  },
}

impl GraphicError {
  /// Create a surface error out of any displayable error.
  pub fn surface(e: impl fmt::Display) -> Self {
    GraphicError::Surface(e.to_string())
  }
}

impl fmt::Display for GraphicError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GraphicError::NotInitialized => f.write_str("graphic interface not initialized"),
      GraphicError::Surface(ref e) => write!(f, "surface error: {}", e),
      GraphicError::State(ref e) => write!(f, "graphics state error: {}", e),
      GraphicError::Shader(ref e) => write!(f, "shader error: {}", e),
      GraphicError::UnknownMesh(id) => write!(f, "unknown {}", id),
      GraphicError::MissingMaterial(id) => write!(f, "{} has no material", id),
      GraphicError::MissingShader(id) => write!(f, "material of {} has no shader", id),
      GraphicError::UnknownTexture(id) => write!(f, "unknown {}", id),
      GraphicError::UnknownFramebuffer(id) => write!(f, "unknown {}", id),
      GraphicError::UnknownRenderbuffer(id) => write!(f, "unknown {}", id),
      GraphicError::InvalidTexture(ref reason) => write!(f, "invalid texture: {}", reason),
      GraphicError::Driver { code, call } => write!(f, "driver error {} in {}", code, call),
    }
  }
}

impl error::Error for GraphicError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GraphicError::Shader(e) => Some(e),
      _ => None,
    }
  }
}

impl From<ShaderError> for GraphicError {
  fn from(e: ShaderError) -> Self {
    GraphicError::Shader(e)
  }
}

/// Abstract rendering interface.
///
/// Implementors translate each call into the fixed sequence of driver calls it stands for and keep
/// the tables mapping abstract resources (meshes, shaders, textures, …) to native handles.
pub trait Graphic {
  /// Kind of backend.
  fn graphic_type(&self) -> GraphicBackend;

  /// Whether [`Graphic::init`] succeeded and [`Graphic::release`] wasn’t called since.
  fn is_initialized(&self) -> bool;

  /// Create and activate the rendering context on the surface and set up the default state.
  ///
  /// Calling it on an initialized backend does nothing.
  fn init(&mut self) -> Result<(), GraphicError>;

  /// Free every native resource held in the tables and mark the backend uninitialized.
  fn release(&mut self) -> Result<(), GraphicError>;

  /// Install a callback receiving every driver error.
  fn set_diagnostic_callback(&mut self, callback: Option<DiagnosticCallback>);

  /// Library of created shaders.
  fn shaders(&self) -> &[Shader];

  /// Look up a created shader.
  fn shader(&self, id: ShaderId) -> Option<&Shader> {
    self.shaders().iter().find(|s| s.id() == id)
  }

  /// Ask the driver whether a capability is enabled.
  fn check_feature(&mut self, feature: Feature) -> Result<bool, GraphicError>;

  /// Enable a capability.
  fn enable_feature(&mut self, feature: Feature) -> Result<(), GraphicError>;

  /// Disable a capability.
  fn disable_feature(&mut self, feature: Feature) -> Result<(), GraphicError>;

  /// Enable a capability, then run `action` to finish configuring it (blend function, depth
  /// range, …).
  fn enable_feature_with<F>(&mut self, feature: Feature, action: F) -> Result<(), GraphicError>
  where
    Self: Sized,
    F: FnOnce(&mut Self),
  {
    self.enable_feature(feature)?;
    action(self);
    Ok(())
  }

  /// Disable a capability, then run `action`.
  fn disable_feature_with<F>(&mut self, feature: Feature, action: F) -> Result<(), GraphicError>
  where
    Self: Sized,
    F: FnOnce(&mut Self),
  {
    self.disable_feature(feature)?;
    action(self);
    Ok(())
  }

  /// Create a framebuffer object.
  fn create_framebuffer(&mut self) -> Result<FramebufferId, GraphicError>;

  /// Delete a framebuffer object.
  fn delete_framebuffer(&mut self, id: FramebufferId) -> Result<(), GraphicError>;

  /// Bind a framebuffer for drawing; `None` binds the surface’s default framebuffer.
  fn bind_framebuffer(&mut self, id: Option<FramebufferId>) -> Result<(), GraphicError>;

  /// Create a renderbuffer object.
  fn create_renderbuffer(&mut self) -> Result<RenderbufferId, GraphicError>;

  /// Delete a renderbuffer object.
  fn delete_renderbuffer(&mut self, id: RenderbufferId) -> Result<(), GraphicError>;

  /// Bind a renderbuffer; `None` unbinds.
  fn bind_renderbuffer(&mut self, id: Option<RenderbufferId>) -> Result<(), GraphicError>;

  /// Upload (if needed) and bind the vertex and index buffers of a mesh.
  ///
  /// The buffers are cached by mesh identity. A cached mesh is only re-uploaded when `rebind` is
  /// set or when its data changed since the last upload.
  fn bind_mesh(&mut self, mesh: &Mesh, rebind: bool) -> Result<(), GraphicError>;

  /// Unbind the buffers of a mesh; with `release`, also free them.
  ///
  /// Buffers are keyed by mesh identity and outlive the [`Mesh`] value: a mesh must be unbound with
  /// `release` before it’s dropped, or its buffers stay allocated until [`Graphic::release`].
  fn unbind_mesh(&mut self, mesh: &Mesh, release: bool) -> Result<(), GraphicError>;

  /// Upload a texture.
  fn bind_texture(&mut self, texture: &Texture) -> Result<TextureId, GraphicError>;

  /// Free a texture.
  fn unbind_texture(&mut self, id: TextureId) -> Result<(), GraphicError>;

  /// Compile, link and validate a vertex / fragment program pair and add it to the library.
  fn create_shader(
    &mut self,
    vertex_src: &str,
    fragment_src: &str,
    name: &str,
  ) -> Result<ShaderId, GraphicError>;

  /// Resolve the input locations of a shader into a material and attach the shader to it.
  fn attach_shader_to_material(
    &mut self,
    shader: ShaderId,
    material: &mut Material,
  ) -> Result<(), GraphicError>;

  /// Free a shader and remove it from the library.
  fn destroy_shader(&mut self, id: ShaderId) -> Result<(), GraphicError>;

  /// Draw a mesh with its material, indexed if the mesh has indices.
  fn draw_mesh(&mut self, mesh: &Mesh, mode: DrawMode) -> Result<(), GraphicError>;

  /// Draw the vertices of a mesh in order, ignoring its indices.
  fn draw_vertices(&mut self, mesh: &Mesh, mode: DrawMode) -> Result<(), GraphicError>;

  /// Set the viewport.
  fn draw_viewport(&mut self, rect: RectI) -> Result<(), GraphicError>;

  /// Set the scissor box. The scissor test itself is toggled with [`Feature::ScissorTest`].
  fn draw_scissor(&mut self, rect: RectI) -> Result<(), GraphicError>;

  /// Set the color the color buffer is cleared to.
  fn clear_color(&mut self, color: Color) -> Result<(), GraphicError>;

  /// Set the value the depth buffer is cleared to.
  fn clear_depth(&mut self, depth: f32) -> Result<(), GraphicError>;

  /// Set the value the stencil buffer is cleared to.
  fn clear_stencil(&mut self, stencil: i32) -> Result<(), GraphicError>;

  /// Start a frame by clearing the color, depth and stencil buffers.
  fn begin_render(&mut self) -> Result<(), GraphicError>;

  /// End a frame and present it.
  fn end_render(&mut self) -> Result<(), GraphicError>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shader::StageType;
  use std::error::Error as _;

  #[test]
  fn shader_errors_convert_and_chain() {
    let e: GraphicError = ShaderError::NullSource(StageType::Vertex).into();

    assert_eq!(e.to_string(), "shader error: missing vertex shader source");
    assert!(e.source().is_some());
  }

  #[test]
  fn driver_error_message() {
    let e = GraphicError::Driver {
      code: 1281,
      call: "glViewport",
    };
    assert_eq!(e.to_string(), "driver error 1281 in glViewport");
  }

  #[test]
  fn surface_error_from_display() {
    let e = GraphicError::surface("context lost");
    assert_eq!(e.to_string(), "surface error: context lost");
  }
}
