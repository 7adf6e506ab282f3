//! Shader stages and programs.

use gl::types::*;
use renik::{ShaderError, ShaderInputDataType, ShaderInputInfo, ShaderInputKind, StageType};
use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::CString;
use std::ptr::{null, null_mut};

const GLSL_PRAGMA: &str = "#version 330 core\n";

/// Prepend the GLSL version pragma to sources that don’t declare one.
pub(crate) fn glsl_pragma_src(src: &str) -> Cow<str> {
  if src.trim_start().starts_with("#version") {
    Cow::Borrowed(src)
  } else {
    let mut pragma = String::from(GLSL_PRAGMA);
    pragma.push_str(src);
    Cow::Owned(pragma)
  }
}

fn opengl_shader_type(ty: StageType) -> GLenum {
  match ty {
    StageType::Vertex => gl::VERTEX_SHADER,
    StageType::Fragment => gl::FRAGMENT_SHADER,
  }
}

/// Turn a raw info log into a string, dropping the trailing NUL and whitespace.
pub(crate) fn info_log_to_string(mut log: Vec<u8>) -> String {
  if let Some(nul) = log.iter().position(|&b| b == 0) {
    log.truncate(nul);
  }

  String::from_utf8_lossy(&log).trim_end().to_owned()
}

/// Compile a single stage.
///
/// The stage is deleted if it fails to compile.
pub(crate) unsafe fn compile_stage(ty: StageType, src: &str) -> Result<GLuint, ShaderError> {
  if src.trim().is_empty() {
    return Err(ShaderError::NullSource(ty));
  }

  let c_src = CString::new(glsl_pragma_src(src).as_bytes())
    .map_err(|_| ShaderError::CompilationFailed(ty, "source contains a NUL byte".to_owned()))?;

  let handle = gl::CreateShader(opengl_shader_type(ty));

  if handle == 0 {
    return Err(ShaderError::CompilationFailed(
      ty,
      "unable to create shader stage".to_owned(),
    ));
  }

  gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
  gl::CompileShader(handle);

  let mut compiled: GLint = gl::FALSE.into();
  gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

  let log = stage_info_log(handle);

  if compiled == gl::TRUE.into() {
    if !log.is_empty() {
      log::warn!("{} compiled with warnings: {}", ty, log);
    }

    Ok(handle)
  } else {
    gl::DeleteShader(handle);
    Err(ShaderError::CompilationFailed(ty, log))
  }
}

unsafe fn stage_info_log(handle: GLuint) -> String {
  let mut log_len: GLint = 0;
  gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  if log_len <= 0 {
    return String::new();
  }

  let mut log: Vec<u8> = vec![0; log_len as usize];
  gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

  info_log_to_string(log)
}

unsafe fn program_info_log(handle: GLuint) -> String {
  let mut log_len: GLint = 0;
  gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  if log_len <= 0 {
    return String::new();
  }

  let mut log: Vec<u8> = vec![0; log_len as usize];
  gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

  info_log_to_string(log)
}

/// Link and validate a program out of a vertex and a fragment stage.
///
/// The stages are detached once the program is linked, whatever the outcome; deleting them is up
/// to the caller. The program is deleted if linking or validation fails.
pub(crate) unsafe fn link_program(vertex: GLuint, fragment: GLuint) -> Result<GLuint, ShaderError> {
  let handle = gl::CreateProgram();

  if handle == 0 {
    return Err(ShaderError::LinkFailed(
      "unable to create shader program".to_owned(),
    ));
  }

  gl::AttachShader(handle, vertex);
  gl::AttachShader(handle, fragment);
  gl::LinkProgram(handle);

  let result = check_program(handle, gl::LINK_STATUS)
    .map_err(ShaderError::LinkFailed)
    .and_then(|_| {
      gl::ValidateProgram(handle);
      check_program(handle, gl::VALIDATE_STATUS).map_err(ShaderError::ValidationFailed)
    });

  gl::DetachShader(handle, vertex);
  gl::DetachShader(handle, fragment);

  match result {
    Ok(()) => Ok(handle),

    Err(e) => {
      gl::DeleteProgram(handle);
      Err(e)
    }
  }
}

/// Compile both stages, link them and reflect the inputs of the resulting program.
///
/// The stages are deleted once linked.
pub(crate) unsafe fn build_program(
  vertex_src: &str,
  fragment_src: &str,
) -> Result<(GLuint, HashMap<String, ShaderInputInfo>), ShaderError> {
  let vertex = compile_stage(StageType::Vertex, vertex_src)?;

  let fragment = match compile_stage(StageType::Fragment, fragment_src) {
    Ok(fragment) => fragment,

    Err(e) => {
      gl::DeleteShader(vertex);
      return Err(e);
    }
  };

  let program = link_program(vertex, fragment);

  gl::DeleteShader(vertex);
  gl::DeleteShader(fragment);

  let program = program?;

  Ok((program, reflect_inputs(program)))
}

unsafe fn check_program(handle: GLuint, status: GLenum) -> Result<(), String> {
  let mut res: GLint = gl::FALSE.into();
  gl::GetProgramiv(handle, status, &mut res);

  if res == gl::TRUE.into() {
    Ok(())
  } else {
    Err(program_info_log(handle))
  }
}

/// Map a reflected OpenGL type to the interface’s data type.
pub(crate) fn from_gl_type(ty: GLenum) -> ShaderInputDataType {
  match ty {
    gl::FLOAT => ShaderInputDataType::Float,
    gl::FLOAT_VEC2 => ShaderInputDataType::Vec2,
    gl::FLOAT_VEC3 => ShaderInputDataType::Vec3,
    gl::FLOAT_VEC4 => ShaderInputDataType::Vec4,
    gl::FLOAT_MAT2 => ShaderInputDataType::Mat2x2,
    gl::FLOAT_MAT3 => ShaderInputDataType::Mat3x3,
    gl::FLOAT_MAT4 => ShaderInputDataType::Mat4x4,
    gl::SAMPLER_2D => ShaderInputDataType::Sampler2D,
    gl::INT => ShaderInputDataType::Int,
    _ => ShaderInputDataType::Unknown,
  }
}

/// Reflect the active attributes and uniforms of a linked program.
pub(crate) unsafe fn reflect_inputs(program: GLuint) -> HashMap<String, ShaderInputInfo> {
  let mut inputs = HashMap::new();

  reflect(
    program,
    ShaderInputKind::Attribute,
    gl::ACTIVE_ATTRIBUTES,
    gl::ACTIVE_ATTRIBUTE_MAX_LENGTH,
    &mut inputs,
  );
  reflect(
    program,
    ShaderInputKind::Uniform,
    gl::ACTIVE_UNIFORMS,
    gl::ACTIVE_UNIFORM_MAX_LENGTH,
    &mut inputs,
  );

  inputs
}

unsafe fn reflect(
  program: GLuint,
  kind: ShaderInputKind,
  count_param: GLenum,
  max_len_param: GLenum,
  inputs: &mut HashMap<String, ShaderInputInfo>,
) {
  let mut count: GLint = 0;
  let mut max_len: GLint = 0;

  gl::GetProgramiv(program, count_param, &mut count);
  gl::GetProgramiv(program, max_len_param, &mut max_len);

  let mut buffer: Vec<u8> = vec![0; max_len.max(1) as usize];

  for index in 0..count.max(0) as GLuint {
    let mut len: GLsizei = 0;
    let mut size: GLint = 0;
    let mut ty: GLenum = 0;
    let name_ptr = buffer.as_mut_ptr() as *mut GLchar;

    match kind {
      ShaderInputKind::Attribute => gl::GetActiveAttrib(
        program,
        index,
        buffer.len() as GLsizei,
        &mut len,
        &mut size,
        &mut ty,
        name_ptr,
      ),

      ShaderInputKind::Uniform => gl::GetActiveUniform(
        program,
        index,
        buffer.len() as GLsizei,
        &mut len,
        &mut size,
        &mut ty,
        name_ptr,
      ),
    }

    let name = String::from_utf8_lossy(&buffer[..len.max(0) as usize]).into_owned();
    let data_type = from_gl_type(ty);

    if data_type == ShaderInputDataType::Unknown {
      log::warn!("{} has an unsupported type ({:#x})", name, ty);
    }

    inputs.insert(name, ShaderInputInfo { kind, data_type });
  }
}

/// Location of an input in a linked program; negative if inactive.
pub(crate) unsafe fn input_location(program: GLuint, name: &str, kind: ShaderInputKind) -> GLint {
  let c_name = match CString::new(name.as_bytes()) {
    Ok(c_name) => c_name,
    Err(_) => return -1,
  };

  match kind {
    ShaderInputKind::Attribute => gl::GetAttribLocation(program, c_name.as_ptr() as *const GLchar),
    ShaderInputKind::Uniform => gl::GetUniformLocation(program, c_name.as_ptr() as *const GLchar),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pragma_is_added_once() {
    let src = "void main() {}";
    assert_eq!(glsl_pragma_src(src), "#version 330 core\nvoid main() {}");

    let versioned = "#version 410 core\nvoid main() {}";
    assert_eq!(glsl_pragma_src(versioned), versioned);

    let indented = "\n  #version 330\nvoid main() {}";
    assert!(matches!(glsl_pragma_src(indented), Cow::Borrowed(_)));
  }

  #[test]
  fn info_log_is_trimmed() {
    let log = b"0:1(1): error: syntax error\n\0\0".to_vec();
    assert_eq!(info_log_to_string(log), "0:1(1): error: syntax error");
    assert_eq!(info_log_to_string(Vec::new()), "");
  }

  #[test]
  fn gl_types() {
    assert_eq!(from_gl_type(gl::FLOAT), ShaderInputDataType::Float);
    assert_eq!(from_gl_type(gl::FLOAT_VEC3), ShaderInputDataType::Vec3);
    assert_eq!(from_gl_type(gl::FLOAT_MAT4), ShaderInputDataType::Mat4x4);
    assert_eq!(from_gl_type(gl::SAMPLER_2D), ShaderInputDataType::Sampler2D);
    assert_eq!(from_gl_type(gl::DOUBLE), ShaderInputDataType::Unknown);
  }

  #[test]
  fn blank_source_is_rejected_before_reaching_the_driver() {
    let e = unsafe { compile_stage(StageType::Vertex, "  \n") }.unwrap_err();
    assert_eq!(e, ShaderError::NullSource(StageType::Vertex));
  }
}
