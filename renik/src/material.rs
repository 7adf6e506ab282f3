//! Materials.
//!
//! A [`Material`] binds a shader to a mesh. It stores the location of every shader input, resolved
//! once by [`Graphic::attach_shader_to_material`](crate::Graphic::attach_shader_to_material), and
//! the uniform values uploaded each time a mesh using the material is drawn.

use crate::shader::{ShaderId, ShaderInputDataType};
use crate::texture::TextureId;
use std::collections::HashMap;

/// A value fed to a uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
  /// `float`.
  Float(f32),
  /// `vec2`.
  Vec2([f32; 2]),
  /// `vec3`.
  Vec3([f32; 3]),
  /// `vec4`.
  Vec4([f32; 4]),
  /// `mat2`, column major.
  Mat2([f32; 4]),
  /// `mat3`, column major.
  Mat3([f32; 9]),
  /// `mat4`, column major.
  Mat4([f32; 16]),
  /// `int`.
  Int(i32),
  /// `sampler2D`: a texture and the texture unit to bind it to.
  Texture(TextureId, u32),
}

impl UniformValue {
  /// Shader data type the value can be fed to.
  pub fn data_type(&self) -> ShaderInputDataType {
    match *self {
      UniformValue::Float(_) => ShaderInputDataType::Float,
      UniformValue::Vec2(_) => ShaderInputDataType::Vec2,
      UniformValue::Vec3(_) => ShaderInputDataType::Vec3,
      UniformValue::Vec4(_) => ShaderInputDataType::Vec4,
      UniformValue::Mat2(_) => ShaderInputDataType::Mat2x2,
      UniformValue::Mat3(_) => ShaderInputDataType::Mat3x3,
      UniformValue::Mat4(_) => ShaderInputDataType::Mat4x4,
      UniformValue::Int(_) => ShaderInputDataType::Int,
      UniformValue::Texture(..) => ShaderInputDataType::Sampler2D,
    }
  }
}

/// A shader binding and the values of its inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
  shader: Option<ShaderId>,
  locations: HashMap<String, i32>,
  uniforms: HashMap<String, UniformValue>,
}

impl Material {
  /// Create a material with no shader attached.
  pub fn new() -> Self {
    Material::default()
  }

  /// Shader attached to the material, if any.
  pub fn shader(&self) -> Option<ShaderId> {
    self.shader
  }

  /// Attach a shader and its resolved input locations.
  ///
  /// Previously resolved locations are dropped. Uniform values are kept.
  pub fn attach(&mut self, shader: ShaderId, locations: HashMap<String, i32>) {
    self.shader = Some(shader);
    self.locations = locations;
  }

  /// Forget the attached shader and its locations.
  pub fn detach(&mut self) {
    self.shader = None;
    self.locations.clear();
  }

  /// Resolved location of a shader input.
  pub fn location(&self, name: &str) -> Option<i32> {
    self.locations.get(name).copied()
  }

  /// All resolved locations.
  pub fn locations(&self) -> &HashMap<String, i32> {
    &self.locations
  }

  /// Set the value of a uniform.
  pub fn set_uniform(&mut self, name: impl Into<String>, value: UniformValue) {
    self.uniforms.insert(name.into(), value);
  }

  /// Value of a uniform.
  pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
    self.uniforms.get(name)
  }

  /// All uniform values.
  pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
    self.uniforms.iter().map(|(name, value)| (name.as_str(), value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn attach_replaces_locations_and_keeps_uniforms() {
    let mut material = Material::new();
    material.set_uniform("time", UniformValue::Float(1.));

    let mut locations = HashMap::new();
    locations.insert("position".to_owned(), 0);
    material.attach(ShaderId::allocate(), locations);

    let mut locations = HashMap::new();
    locations.insert("color".to_owned(), 1);
    let shader = ShaderId::allocate();
    material.attach(shader, locations);

    assert_eq!(material.shader(), Some(shader));
    assert_eq!(material.location("position"), None);
    assert_eq!(material.location("color"), Some(1));
    assert_eq!(material.uniform("time"), Some(&UniformValue::Float(1.)));
  }

  #[test]
  fn detach() {
    let mut material = Material::new();
    material.attach(ShaderId::allocate(), HashMap::new());
    material.detach();

    assert!(material.shader().is_none());
    assert!(material.locations().is_empty());
  }

  #[test]
  fn uniform_data_types() {
    assert_eq!(
      UniformValue::Mat4([0.; 16]).data_type(),
      ShaderInputDataType::Mat4x4
    );
    assert_eq!(
      UniformValue::Texture(TextureId::allocate(), 0).data_type(),
      ShaderInputDataType::Sampler2D
    );
  }
}
