//! Draw calls: uniform upload, vertex attribute wiring and primitive submission.

use crate::gl33::debug::Reporter;
use crate::gl33::state::{Bind, GLState};
use gl::types::*;
use renik::{
  DrawMode, GraphicError, Material, Mesh, Shader, ShaderInputKind, TextureId, UniformValue,
};
use std::collections::HashMap;
use std::os::raw::c_void;

pub(crate) fn opengl_mode(mode: DrawMode) -> GLenum {
  match mode {
    DrawMode::Points => gl::POINTS,
    DrawMode::LineStrip => gl::LINE_STRIP,
    DrawMode::LineLoop => gl::LINE_LOOP,
    DrawMode::Lines => gl::LINES,
    DrawMode::TriangleStrip => gl::TRIANGLE_STRIP,
    DrawMode::TriangleFan => gl::TRIANGLE_FAN,
    DrawMode::Triangles => gl::TRIANGLES,
  }
}

/// A vertex attribute pointing into the packed vertex buffer of a mesh.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct AttributeBinding {
  pub(crate) location: GLuint,
  pub(crate) components: GLint,
  pub(crate) offset: usize,
}

/// Vertex attributes of `shader` the mesh has a channel for, sorted by location.
pub(crate) fn attribute_bindings(
  shader: &Shader,
  material: &Material,
  mesh: &Mesh,
) -> Vec<AttributeBinding> {
  let mut bindings = Vec::new();

  for (name, _) in shader.attributes() {
    let location = match material.location(name) {
      Some(location) if location >= 0 => location as GLuint,

      _ => {
        log::warn!("{}: attribute {} is inactive", shader.name(), name);
        continue;
      }
    };

    let (channel, offset) = match (mesh.channel(name), mesh.channel_offset(name)) {
      (Some(channel), Some(offset)) => (channel, offset),

      _ => {
        log::warn!("{}: no channel for attribute {}", mesh.id(), name);
        continue;
      }
    };

    bindings.push(AttributeBinding {
      location,
      components: channel.components() as GLint,
      offset,
    });
  }

  bindings.sort_by_key(|b| b.location);
  bindings
}

/// Whether a value can be fed to the uniform `name` of `shader`.
pub(crate) fn accepts_uniform(shader: &Shader, name: &str, value: &UniformValue) -> bool {
  match shader.input(name) {
    Some(info) if info.kind == ShaderInputKind::Uniform => {
      if info.data_type == value.data_type() {
        true
      } else {
        log::warn!(
          "{}: uniform {} is {:?}, not {:?}; skipped",
          shader.name(),
          name,
          info.data_type,
          value.data_type()
        );
        false
      }
    }

    _ => {
      log::warn!("{}: no active uniform {}; skipped", shader.name(), name);
      false
    }
  }
}

/// Upload the uniform values of a material to the program currently in use.
pub(crate) unsafe fn upload_uniforms(
  state: &mut GLState,
  reporter: &mut Reporter,
  shader: &Shader,
  material: &Material,
  textures: &HashMap<TextureId, GLuint>,
) -> Result<(), GraphicError> {
  for (name, value) in material.uniforms() {
    if !accepts_uniform(shader, name, value) {
      continue;
    }

    let location = match material.location(name) {
      Some(location) if location >= 0 => location,
      _ => continue,
    };

    match *value {
      UniformValue::Float(x) => gl::Uniform1f(location, x),
      UniformValue::Vec2(ref v) => gl::Uniform2fv(location, 1, v.as_ptr()),
      UniformValue::Vec3(ref v) => gl::Uniform3fv(location, 1, v.as_ptr()),
      UniformValue::Vec4(ref v) => gl::Uniform4fv(location, 1, v.as_ptr()),
      UniformValue::Mat2(ref m) => gl::UniformMatrix2fv(location, 1, gl::FALSE, m.as_ptr()),
      UniformValue::Mat3(ref m) => gl::UniformMatrix3fv(location, 1, gl::FALSE, m.as_ptr()),
      UniformValue::Mat4(ref m) => gl::UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr()),
      UniformValue::Int(x) => gl::Uniform1i(location, x),

      UniformValue::Texture(id, unit) => {
        let handle = *textures.get(&id).ok_or(GraphicError::UnknownTexture(id))?;

        state.set_texture_unit(unit);
        state.bind_texture(handle);
        gl::Uniform1i(location, unit as GLint);
      }
    }
  }

  reporter.check("glUniform")
}

/// Primitive submission of a draw.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum DrawCall {
  /// `glDrawElements` over that many `u32` indices.
  Indexed(usize),
  /// `glDrawArrays` over that many vertices.
  Arrays(usize),
}

impl DrawCall {
  pub(crate) fn for_mesh(mesh: &Mesh, indexed: bool) -> Self {
    if indexed && mesh.index_count() > 0 {
      DrawCall::Indexed(mesh.index_count())
    } else {
      DrawCall::Arrays(mesh.vertex_count())
    }
  }
}

/// Wire the attributes, submit the primitives and reset the bindings.
///
/// The mesh buffers and the program must be bound already. Bindings are reset whether the draw
/// succeeded or not.
pub(crate) unsafe fn submit(
  state: &mut GLState,
  reporter: &mut Reporter,
  vertex_array: GLuint,
  bindings: &[AttributeBinding],
  call: DrawCall,
  mode: DrawMode,
) -> Result<(), GraphicError> {
  state.bind_vertex_array(vertex_array, Bind::Cached);

  for binding in bindings {
    gl::EnableVertexAttribArray(binding.location);
    gl::VertexAttribPointer(
      binding.location,
      binding.components,
      gl::FLOAT,
      gl::FALSE,
      0,
      binding.offset as *const c_void,
    );
  }

  let result = reporter.check("glVertexAttribPointer").and_then(|_| {
    let mode = opengl_mode(mode);

    match call {
      DrawCall::Indexed(count) => {
        gl::DrawElements(
          mode,
          count as GLsizei,
          gl::UNSIGNED_INT,
          std::ptr::null(),
        );
        reporter.check("glDrawElements")
      }

      DrawCall::Arrays(count) => {
        gl::DrawArrays(mode, 0, count as GLsizei);
        reporter.check("glDrawArrays")
      }
    }
  });

  for binding in bindings {
    gl::DisableVertexAttribArray(binding.location);
  }

  state.bind_array_buffer(0, Bind::Cached);
  state.bind_element_array_buffer(0, Bind::Cached);
  state.use_program(0);

  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use renik::{ShaderId, ShaderInputDataType, ShaderInputInfo, VertexChannel};

  fn shader() -> Shader {
    let mut inputs = HashMap::new();
    inputs.insert(
      "position".to_owned(),
      ShaderInputInfo::attribute(ShaderInputDataType::Vec2),
    );
    inputs.insert(
      "color".to_owned(),
      ShaderInputInfo::attribute(ShaderInputDataType::Vec3),
    );
    inputs.insert(
      "normal".to_owned(),
      ShaderInputInfo::attribute(ShaderInputDataType::Vec3),
    );
    inputs.insert(
      "time".to_owned(),
      ShaderInputInfo::uniform(ShaderInputDataType::Float),
    );

    Shader::new(ShaderId::allocate(), "test", inputs)
  }

  fn material(shader: &Shader) -> Material {
    let mut locations = HashMap::new();
    locations.insert("position".to_owned(), 1);
    locations.insert("color".to_owned(), 0);
    locations.insert("normal".to_owned(), -1);
    locations.insert("time".to_owned(), 3);

    let mut material = Material::new();
    material.attach(shader.id(), locations);
    material
  }

  fn mesh() -> Mesh {
    Mesh::new(true)
      .with_channel(VertexChannel::new("position", 2, vec![0.; 6]))
      .with_channel(VertexChannel::new("color", 3, vec![1.; 9]))
      .with_channel(VertexChannel::new("uv", 2, vec![0.; 6]))
      .with_indices(vec![0, 1, 2])
  }

  #[test]
  fn only_active_attributes_with_channels_are_wired() {
    let shader = shader();
    let material = material(&shader);

    let bindings = attribute_bindings(&shader, &material, &mesh());

    assert_eq!(
      bindings,
      vec![
        AttributeBinding {
          location: 0,
          components: 3,
          offset: 24,
        },
        AttributeBinding {
          location: 1,
          components: 2,
          offset: 0,
        },
      ]
    );
  }

  #[test]
  fn uniforms_must_match_the_reflected_type() {
    let shader = shader();

    assert!(accepts_uniform(&shader, "time", &UniformValue::Float(0.)));
    assert!(!accepts_uniform(&shader, "time", &UniformValue::Int(0)));
    assert!(!accepts_uniform(&shader, "position", &UniformValue::Vec2([0.; 2])));
    assert!(!accepts_uniform(&shader, "missing", &UniformValue::Float(0.)));
  }

  #[test]
  fn draw_calls() {
    let mesh = mesh();
    assert_eq!(DrawCall::for_mesh(&mesh, true), DrawCall::Indexed(3));
    assert_eq!(DrawCall::for_mesh(&mesh, false), DrawCall::Arrays(3));

    let unindexed = Mesh::new(false).with_channel(VertexChannel::new("position", 3, vec![0.; 12]));
    assert_eq!(DrawCall::for_mesh(&unindexed, true), DrawCall::Arrays(4));
  }

  #[test]
  fn modes() {
    assert_eq!(opengl_mode(DrawMode::Triangles), gl::TRIANGLES);
    assert_eq!(opengl_mode(DrawMode::LineLoop), gl::LINE_LOOP);
    assert_eq!(opengl_mode(DrawMode::Points), gl::POINTS);
  }
}
