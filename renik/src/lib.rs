//! # renik graphic interface
//!
//! `renik` describes what a rendering backend must be able to do without saying anything about how
//! it does it. The [`Graphic`] trait is the whole contract: create and destroy shaders, upload and
//! draw meshes, clear buffers, set up the viewport and scissor box, and present frames.
//!
//! This crate doesn’t create any context nor window. Backends, such as `renik-gl`, implement
//! [`Graphic`] on top of a real graphics API, and windowing crates, such as `renik-glutin`, provide
//! the native surface a backend renders into.
//!
//! # Resources and identity
//!
//! Resources handed to a backend are described by plain values living on the CPU side:
//!
//! - [`Mesh`]: a set of named vertex channels plus an index list. A mesh carries a unique
//!   [`MeshId`] that backends use to cache GPU buffers, so that a mesh is uploaded once and rebound
//!   cheaply afterwards.
//! - [`Shader`]: the reflection of a linked program, with its attributes and uniforms.
//! - [`Material`]: a shader plus the resolved locations of its inputs and the uniform values to
//!   upload at draw time.
//! - [`Texture`]: raw 2D pixels with sampling settings.
//!
//! Everything created on the backend side is referred to by an opaque id ([`ShaderId`],
//! [`TextureId`], [`FramebufferId`], [`RenderbufferId`]).

#![deny(missing_docs)]

#[macro_use]
mod id;

pub mod backend;
pub mod color;
pub mod diagnostic;
pub mod draw;
pub mod feature;
pub mod graphic;
pub mod material;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use crate::backend::GraphicBackend;
pub use crate::color::{Color, RectI};
pub use crate::diagnostic::{Diagnostic, DiagnosticCallback};
pub use crate::draw::DrawMode;
pub use crate::feature::Feature;
pub use crate::graphic::{FramebufferId, Graphic, GraphicError, RenderbufferId};
pub use crate::material::{Material, UniformValue};
pub use crate::mesh::{Mesh, MeshId, VertexChannel};
pub use crate::shader::{
  Shader, ShaderError, ShaderId, ShaderInputDataType, ShaderInputInfo, ShaderInputKind, StageType,
};
pub use crate::texture::{Texture, TextureFilter, TextureFormat, TextureId, TextureWrap};
