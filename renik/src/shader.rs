//! Shader programs and their reflection.
//!
//! A [`Shader`] is what a backend hands back after compiling and linking a vertex and a fragment
//! stage. It doesn’t own any GPU resource itself: it’s the reflected description of the program
//! (its active attributes and uniforms), identified by a [`ShaderId`].

use std::collections::HashMap;
use std::error;
use std::fmt;

opaque_id!(
  /// Identifier of a shader program created by a backend.
  ShaderId,
  "shader"
);

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  Vertex,
  /// Fragment shader.
  Fragment,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::Vertex => f.write_str("vertex shader"),
      StageType::Fragment => f.write_str("fragment shader"),
    }
  }
}

/// Whether a shader input is fed per vertex or per draw.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShaderInputKind {
  /// Per-vertex input, fed from a mesh channel.
  Attribute,
  /// Per-draw input, fed from a material value.
  Uniform,
}

/// Data type of a shader input, as reflected from the linked program.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShaderInputDataType {
  /// `float`.
  Float,
  /// `vec2`.
  Vec2,
  /// `vec3`.
  Vec3,
  /// `vec4`.
  Vec4,
  /// `mat2`.
  Mat2x2,
  /// `mat3`.
  Mat3x3,
  /// `mat4`.
  Mat4x4,
  /// `sampler2D`.
  Sampler2D,
  /// `int`.
  Int,
  /// Any type this interface doesn’t know how to feed.
  Unknown,
}

impl ShaderInputDataType {
  /// Number of scalar components.
  pub fn components(self) -> usize {
    match self {
      ShaderInputDataType::Float => 1,
      ShaderInputDataType::Vec2 => 2,
      ShaderInputDataType::Vec3 => 3,
      ShaderInputDataType::Vec4 => 4,
      ShaderInputDataType::Mat2x2 => 4,
      ShaderInputDataType::Mat3x3 => 9,
      ShaderInputDataType::Mat4x4 => 16,
      ShaderInputDataType::Sampler2D | ShaderInputDataType::Int => 1,
      ShaderInputDataType::Unknown => 0,
    }
  }
}

/// Reflected information about a single shader input.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ShaderInputInfo {
  /// Attribute or uniform.
  pub kind: ShaderInputKind,
  /// Data type.
  pub data_type: ShaderInputDataType,
}

impl ShaderInputInfo {
  /// Describe an attribute.
  pub fn attribute(data_type: ShaderInputDataType) -> Self {
    ShaderInputInfo {
      kind: ShaderInputKind::Attribute,
      data_type,
    }
  }

  /// Describe a uniform.
  pub fn uniform(data_type: ShaderInputDataType) -> Self {
    ShaderInputInfo {
      kind: ShaderInputKind::Uniform,
      data_type,
    }
  }
}

/// A linked shader program, as reflected by a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Shader {
  id: ShaderId,
  name: String,
  inputs: HashMap<String, ShaderInputInfo>,
}

impl Shader {
  /// Create a shader description.
  ///
  /// This is meant to be called by backends once a program is linked.
  pub fn new(
    id: ShaderId,
    name: impl Into<String>,
    inputs: HashMap<String, ShaderInputInfo>,
  ) -> Self {
    Shader {
      id,
      name: name.into(),
      inputs,
    }
  }

  /// Identifier of the program.
  pub fn id(&self) -> ShaderId {
    self.id
  }

  /// Name given at creation.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// All active inputs, by name.
  pub fn inputs(&self) -> &HashMap<String, ShaderInputInfo> {
    &self.inputs
  }

  /// Look up an input by name.
  pub fn input(&self, name: &str) -> Option<&ShaderInputInfo> {
    self.inputs.get(name)
  }

  /// Active attributes.
  pub fn attributes(&self) -> impl Iterator<Item = (&str, &ShaderInputInfo)> {
    self.inputs_of(ShaderInputKind::Attribute)
  }

  /// Active uniforms.
  pub fn uniforms(&self) -> impl Iterator<Item = (&str, &ShaderInputInfo)> {
    self.inputs_of(ShaderInputKind::Uniform)
  }

  fn inputs_of(&self, kind: ShaderInputKind) -> impl Iterator<Item = (&str, &ShaderInputInfo)> {
    self
      .inputs
      .iter()
      .filter(move |(_, info)| info.kind == kind)
      .map(|(name, info)| (name.as_str(), info))
  }
}

/// Errors that can happen while creating or using a shader program.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShaderError {
  /// The source of a stage was empty.
  NullSource(StageType),
  /// A stage failed to compile. The `String` is the compiler log.
  CompilationFailed(StageType, String),
  /// The program failed to link. The `String` is the linker log.
  LinkFailed(String),
  /// The program failed validation. The `String` is the validation log.
  ValidationFailed(String),
  /// No program is registered under this id.
  UnknownShader(ShaderId),
}

impl fmt::Display for ShaderError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ShaderError::NullSource(ty) => write!(f, "missing {} source", ty),
      ShaderError::CompilationFailed(ty, ref log) => {
        write!(f, "failed to compile {}: {}", ty, log)
      }
      ShaderError::LinkFailed(ref log) => write!(f, "failed to link shader: {}", log),
      ShaderError::ValidationFailed(ref log) => write!(f, "failed to validate shader: {}", log),
      ShaderError::UnknownShader(id) => write!(f, "unknown {}", id),
    }
  }
}

impl error::Error for ShaderError {}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Shader {
    let mut inputs = HashMap::new();
    inputs.insert(
      "position".to_owned(),
      ShaderInputInfo::attribute(ShaderInputDataType::Vec3),
    );
    inputs.insert(
      "color".to_owned(),
      ShaderInputInfo::attribute(ShaderInputDataType::Vec4),
    );
    inputs.insert(
      "mvp".to_owned(),
      ShaderInputInfo::uniform(ShaderInputDataType::Mat4x4),
    );

    Shader::new(ShaderId::allocate(), "sample", inputs)
  }

  #[test]
  fn attributes_and_uniforms_are_split() {
    let shader = sample();

    let mut attributes: Vec<_> = shader.attributes().map(|(name, _)| name).collect();
    attributes.sort_unstable();
    assert_eq!(attributes, ["color", "position"]);

    let uniforms: Vec<_> = shader.uniforms().map(|(name, _)| name).collect();
    assert_eq!(uniforms, ["mvp"]);
  }

  #[test]
  fn input_lookup() {
    let shader = sample();

    assert_eq!(
      shader.input("mvp").map(|i| i.data_type),
      Some(ShaderInputDataType::Mat4x4)
    );
    assert!(shader.input("normal").is_none());
  }

  #[test]
  fn ids_are_unique() {
    assert_ne!(ShaderId::allocate(), ShaderId::allocate());
  }

  #[test]
  fn components() {
    assert_eq!(ShaderInputDataType::Vec3.components(), 3);
    assert_eq!(ShaderInputDataType::Mat3x3.components(), 9);
    assert_eq!(ShaderInputDataType::Unknown.components(), 0);
  }

  #[test]
  fn compilation_error_message() {
    let e = ShaderError::CompilationFailed(StageType::Fragment, "0:1: syntax error".to_owned());
    assert_eq!(
      e.to_string(),
      "failed to compile fragment shader: 0:1: syntax error"
    );
  }
}
