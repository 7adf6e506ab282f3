use crate::gl33::draw::{self, DrawCall};
use crate::gl33::state::{Bind, GLState};
use crate::gl33::{framebuffer, mesh, shader, texture, GL33};
use gl::types::*;
use renik::{
  Color, Diagnostic, DiagnosticCallback, DrawMode, Feature, FramebufferId, Graphic, GraphicBackend,
  GraphicError, Material, Mesh, RectI, RenderbufferId, Shader, ShaderError, ShaderId, Texture,
  TextureId,
};
use renik_windowing::Surface;
use std::collections::HashMap;

macro_rules! gl_state {
  ($self:ident) => {
    $self.state.as_mut().ok_or(GraphicError::NotInitialized)?
  };
}

fn state_error(e: impl std::fmt::Display) -> GraphicError {
  GraphicError::State(e.to_string())
}

fn lookup_shader<'a>(
  programs: &HashMap<ShaderId, GLuint>,
  shaders: &'a [Shader],
  id: ShaderId,
) -> Result<(GLuint, &'a Shader), ShaderError> {
  let program = programs
    .get(&id)
    .copied()
    .ok_or(ShaderError::UnknownShader(id))?;
  let shader = shaders
    .iter()
    .find(|s| s.id() == id)
    .ok_or(ShaderError::UnknownShader(id))?;

  Ok((program, shader))
}

/// Last driver call made by [`Graphic::unbind_mesh`].
fn unbind_mesh_call(release: bool) -> &'static str {
  if release {
    "glDeleteBuffers"
  } else {
    "glBindBuffer"
  }
}

/// Material of a mesh and the program it’s drawn with.
fn draw_target<'m, 'a>(
  mesh: &'m Mesh,
  programs: &HashMap<ShaderId, GLuint>,
  shaders: &'a [Shader],
) -> Result<(&'m Material, GLuint, &'a Shader), GraphicError> {
  let material = mesh
    .material()
    .ok_or_else(|| GraphicError::MissingMaterial(mesh.id()))?;
  let shader_id = material
    .shader()
    .ok_or_else(|| GraphicError::MissingShader(mesh.id()))?;
  let (program, shader) = lookup_shader(programs, shaders, shader_id)?;

  Ok((material, program, shader))
}

impl<S> GL33<S>
where
  S: Surface,
{
  fn draw(&mut self, mesh: &Mesh, mode: DrawMode, indexed: bool) -> Result<(), GraphicError> {
    if self.state.is_none() {
      return Err(GraphicError::NotInitialized);
    }

    let (material, program, shader) = draw_target(mesh, &self.programs, &self.shaders)?;

    let state = gl_state!(self);
    let reporter = &mut self.reporter;

    unsafe {
      state.use_program(program);
      state.bind_vertex_array(self.vertex_array, Bind::Cached);

      let prepared = mesh::bind_mesh(state, reporter, &mut self.meshes, mesh, false)
        .and_then(|_| draw::upload_uniforms(state, reporter, shader, material, &self.textures));

      if let Err(e) = prepared {
        state.use_program(0);
        return Err(e);
      }

      let bindings = draw::attribute_bindings(shader, material, mesh);

      draw::submit(
        state,
        reporter,
        self.vertex_array,
        &bindings,
        DrawCall::for_mesh(mesh, indexed),
        mode,
      )
    }
  }
}

unsafe fn init_state(state: &mut GLState) -> GLuint {
  let mut vertex_array: GLuint = 0;
  gl::GenVertexArrays(1, &mut vertex_array);
  state.bind_vertex_array(vertex_array, Bind::Forced);

  state.set_capability(Feature::Blend, true);
  state.set_blending_func(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);

  vertex_array
}

impl<S> Graphic for GL33<S>
where
  S: Surface,
{
  fn graphic_type(&self) -> GraphicBackend {
    GraphicBackend::OpenGl
  }

  fn is_initialized(&self) -> bool {
    self.state.is_some()
  }

  fn init(&mut self) -> Result<(), GraphicError> {
    if self.state.is_some() {
      return Ok(());
    }

    self.surface.make_current().map_err(GraphicError::surface)?;

    let surface = &self.surface;
    gl::load_with(|s| surface.get_proc_address(s));

    if !gl::Viewport::is_loaded() {
      return Err(GraphicError::State(
        "cannot load OpenGL entry points".to_owned(),
      ));
    }

    let mut state = GLState::new().map_err(state_error)?;

    unsafe {
      let vertex_array = init_state(&mut state);

      if let Err(e) = self.reporter.check("glGenVertexArrays") {
        gl::DeleteVertexArrays(1, &vertex_array);
        return Err(e);
      }

      self.default_framebuffer = state.bound_framebuffer().unwrap_or(0);
      self.vertex_array = vertex_array;
    }

    self.state = Some(state);

    let [width, height] = self.surface.size();
    log::debug!(
      "OpenGL 3.3 backend initialized on a {}×{} surface",
      width,
      height
    );

    Ok(())
  }

  fn release(&mut self) -> Result<(), GraphicError> {
    let mut state = self.state.take().ok_or(GraphicError::NotInitialized)?;
    let default_framebuffer = self.default_framebuffer;

    unsafe {
      state.use_program(0);

      for handler in self.meshes.drain() {
        mesh::delete_buffers(&mut state, handler.vbo, handler.ibo);
      }

      for (_, program) in self.programs.drain() {
        gl::DeleteProgram(program);
      }

      for (_, handle) in self.textures.drain() {
        texture::delete(&mut state, handle);
      }

      for (_, handle) in self.framebuffers.drain() {
        framebuffer::delete_framebuffer(&mut state, handle, default_framebuffer);
      }

      for (_, handle) in self.renderbuffers.drain() {
        framebuffer::delete_renderbuffer(&mut state, handle);
      }

      state.bind_vertex_array(0, Bind::Cached);
      gl::DeleteVertexArrays(1, &self.vertex_array);
    }

    self.shaders.clear();
    self.vertex_array = 0;
    self.default_framebuffer = 0;

    log::debug!("OpenGL 3.3 backend released");

    unsafe { self.reporter.check("release") }
  }

  fn set_diagnostic_callback(&mut self, callback: Option<DiagnosticCallback>) {
    self.reporter.set_callback(callback);
  }

  fn shaders(&self) -> &[Shader] {
    &self.shaders
  }

  fn check_feature(&mut self, feature: Feature) -> Result<bool, GraphicError> {
    let state = gl_state!(self);

    unsafe {
      let enabled = state.query_capability(feature).map_err(state_error)?;
      self.reporter.check("glIsEnabled")?;
      Ok(enabled)
    }
  }

  fn enable_feature(&mut self, feature: Feature) -> Result<(), GraphicError> {
    let state = gl_state!(self);

    unsafe {
      state.set_capability(feature, true);
      self.reporter.check("glEnable")
    }
  }

  fn disable_feature(&mut self, feature: Feature) -> Result<(), GraphicError> {
    let state = gl_state!(self);

    unsafe {
      state.set_capability(feature, false);
      self.reporter.check("glDisable")
    }
  }

  fn create_framebuffer(&mut self) -> Result<FramebufferId, GraphicError> {
    gl_state!(self);

    let handle = unsafe {
      let handle = framebuffer::create_framebuffer();
      self.reporter.check("glGenFramebuffers")?;
      handle
    };

    let id = FramebufferId::allocate();
    self.framebuffers.insert(id, handle);
    log::debug!("created {}", id);

    Ok(id)
  }

  fn delete_framebuffer(&mut self, id: FramebufferId) -> Result<(), GraphicError> {
    let state = gl_state!(self);
    let handle = self
      .framebuffers
      .remove(&id)
      .ok_or(GraphicError::UnknownFramebuffer(id))?;

    unsafe {
      framebuffer::delete_framebuffer(state, handle, self.default_framebuffer);
      self.reporter.check("glDeleteFramebuffers")?;
    }

    log::debug!("deleted {}", id);
    Ok(())
  }

  fn bind_framebuffer(&mut self, id: Option<FramebufferId>) -> Result<(), GraphicError> {
    let state = gl_state!(self);
    let handle = match id {
      Some(id) => *self
        .framebuffers
        .get(&id)
        .ok_or(GraphicError::UnknownFramebuffer(id))?,
      None => self.default_framebuffer,
    };

    unsafe {
      state.bind_framebuffer(handle);
      self.reporter.check("glBindFramebuffer")
    }
  }

  fn create_renderbuffer(&mut self) -> Result<RenderbufferId, GraphicError> {
    gl_state!(self);

    let handle = unsafe {
      let handle = framebuffer::create_renderbuffer();
      self.reporter.check("glGenRenderbuffers")?;
      handle
    };

    let id = RenderbufferId::allocate();
    self.renderbuffers.insert(id, handle);
    log::debug!("created {}", id);

    Ok(id)
  }

  fn delete_renderbuffer(&mut self, id: RenderbufferId) -> Result<(), GraphicError> {
    let state = gl_state!(self);
    let handle = self
      .renderbuffers
      .remove(&id)
      .ok_or(GraphicError::UnknownRenderbuffer(id))?;

    unsafe {
      framebuffer::delete_renderbuffer(state, handle);
      self.reporter.check("glDeleteRenderbuffers")?;
    }

    log::debug!("deleted {}", id);
    Ok(())
  }

  fn bind_renderbuffer(&mut self, id: Option<RenderbufferId>) -> Result<(), GraphicError> {
    let state = gl_state!(self);
    let handle = match id {
      Some(id) => *self
        .renderbuffers
        .get(&id)
        .ok_or(GraphicError::UnknownRenderbuffer(id))?,
      None => 0,
    };

    unsafe {
      state.bind_renderbuffer(handle);
      self.reporter.check("glBindRenderbuffer")
    }
  }

  fn bind_mesh(&mut self, mesh: &Mesh, rebind: bool) -> Result<(), GraphicError> {
    let state = gl_state!(self);

    unsafe { mesh::bind_mesh(state, &mut self.reporter, &mut self.meshes, mesh, rebind) }
      .map(|_| ())
  }

  fn unbind_mesh(&mut self, mesh: &Mesh, release: bool) -> Result<(), GraphicError> {
    let state = gl_state!(self);
    let handler = self
      .meshes
      .get(mesh.id())
      .ok_or_else(|| GraphicError::UnknownMesh(mesh.id()))?;

    unsafe {
      state.unbind_buffer(handler.vbo);
      state.unbind_buffer(handler.ibo);

      if release {
        self.meshes.remove(mesh.id());
        mesh::delete_buffers(state, handler.vbo, handler.ibo);
        log::debug!("released the buffers of {}", mesh.id());
      }

      self.reporter.check(unbind_mesh_call(release))
    }
  }

  fn bind_texture(&mut self, texture: &Texture) -> Result<TextureId, GraphicError> {
    let state = gl_state!(self);
    let handle = unsafe { texture::upload(state, &mut self.reporter, texture)? };

    let id = TextureId::allocate();
    self.textures.insert(id, handle);
    log::debug!(
      "uploaded {} ({}×{} {:?})",
      id,
      texture.width(),
      texture.height(),
      texture.format()
    );

    Ok(id)
  }

  fn unbind_texture(&mut self, id: TextureId) -> Result<(), GraphicError> {
    let state = gl_state!(self);
    let handle = self
      .textures
      .remove(&id)
      .ok_or(GraphicError::UnknownTexture(id))?;

    unsafe {
      texture::delete(state, handle);
      self.reporter.check("glDeleteTextures")?;
    }

    log::debug!("deleted {}", id);
    Ok(())
  }

  fn create_shader(
    &mut self,
    vertex_src: &str,
    fragment_src: &str,
    name: &str,
  ) -> Result<ShaderId, GraphicError> {
    gl_state!(self);

    let (program, inputs) = match unsafe { shader::build_program(vertex_src, fragment_src) } {
      Ok(built) => built,

      Err(e) => {
        self
          .reporter
          .report(Diagnostic::NO_CODE, format!("{}: {}", name, e));
        return Err(e.into());
      }
    };

    let id = ShaderId::allocate();
    log::debug!("created {} ({}) with {} inputs", id, name, inputs.len());

    self.programs.insert(id, program);
    self.shaders.push(Shader::new(id, name, inputs));

    Ok(id)
  }

  fn attach_shader_to_material(
    &mut self,
    id: ShaderId,
    material: &mut Material,
  ) -> Result<(), GraphicError> {
    gl_state!(self);

    let (program, shader) = lookup_shader(&self.programs, &self.shaders, id)?;
    let mut locations = HashMap::with_capacity(shader.inputs().len());

    for (name, info) in shader.inputs() {
      let location = unsafe { shader::input_location(program, name, info.kind) };

      if location < 0 {
        log::warn!("{}: input {} has no location", shader.name(), name);
      }

      locations.insert(name.clone(), location);
    }

    unsafe { self.reporter.check("glGetUniformLocation")? };

    material.attach(id, locations);
    Ok(())
  }

  fn destroy_shader(&mut self, id: ShaderId) -> Result<(), GraphicError> {
    let state = gl_state!(self);
    let program = self
      .programs
      .remove(&id)
      .ok_or(ShaderError::UnknownShader(id))?;

    self.shaders.retain(|s| s.id() != id);

    unsafe {
      state.use_program(0);
      gl::DeleteProgram(program);
      self.reporter.check("glDeleteProgram")?;
    }

    log::debug!("destroyed {}", id);
    Ok(())
  }

  fn draw_mesh(&mut self, mesh: &Mesh, mode: DrawMode) -> Result<(), GraphicError> {
    self.draw(mesh, mode, true)
  }

  fn draw_vertices(&mut self, mesh: &Mesh, mode: DrawMode) -> Result<(), GraphicError> {
    self.draw(mesh, mode, false)
  }

  fn draw_viewport(&mut self, rect: RectI) -> Result<(), GraphicError> {
    let rect = rect.flip_y(self.surface.height() as i32);
    let state = gl_state!(self);

    unsafe {
      state.set_viewport([rect.x, rect.y, rect.width, rect.height]);
      self.reporter.check("glViewport")
    }
  }

  fn draw_scissor(&mut self, rect: RectI) -> Result<(), GraphicError> {
    let rect = rect.flip_y(self.surface.height() as i32);
    let state = gl_state!(self);

    unsafe {
      state.set_scissor([rect.x, rect.y, rect.width, rect.height]);
      self.reporter.check("glScissor")
    }
  }

  fn clear_color(&mut self, color: Color) -> Result<(), GraphicError> {
    let state = gl_state!(self);

    unsafe {
      state.set_clear_color(color.into());
      self.reporter.check("glClearColor")
    }
  }

  fn clear_depth(&mut self, depth: f32) -> Result<(), GraphicError> {
    let state = gl_state!(self);

    unsafe {
      state.set_clear_depth(depth);
      self.reporter.check("glClearDepth")
    }
  }

  fn clear_stencil(&mut self, stencil: i32) -> Result<(), GraphicError> {
    let state = gl_state!(self);

    unsafe {
      state.set_clear_stencil(stencil);
      self.reporter.check("glClearStencil")
    }
  }

  fn begin_render(&mut self) -> Result<(), GraphicError> {
    gl_state!(self);

    unsafe {
      gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT);
      self.reporter.check("glClear")
    }
  }

  fn end_render(&mut self) -> Result<(), GraphicError> {
    gl_state!(self);

    self.surface.swap_buffers().map_err(|e| {
      log::error!("cannot present the frame: {}", e);
      GraphicError::surface(e)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use renik::{VertexChannel, UniformValue};
  use std::cell::RefCell;
  use std::fmt;
  use std::os::raw::c_void;
  use std::ptr;
  use std::rc::Rc;

  #[derive(Debug)]
  struct LostContext;

  impl fmt::Display for LostContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      f.write_str("context lost")
    }
  }

  impl std::error::Error for LostContext {}

  /// A surface without any driver behind it.
  struct Headless {
    can_make_current: bool,
    made_current: Rc<RefCell<u32>>,
  }

  impl Headless {
    fn new(can_make_current: bool) -> Self {
      Headless {
        can_make_current,
        made_current: Rc::new(RefCell::new(0)),
      }
    }
  }

  impl Surface for Headless {
    type Error = LostContext;

    fn make_current(&mut self) -> Result<(), LostContext> {
      *self.made_current.borrow_mut() += 1;

      if self.can_make_current {
        Ok(())
      } else {
        Err(LostContext)
      }
    }

    fn get_proc_address(&self, _: &str) -> *const c_void {
      ptr::null()
    }

    fn swap_buffers(&mut self) -> Result<(), LostContext> {
      Ok(())
    }

    fn size(&self) -> [u32; 2] {
      [800, 600]
    }
  }

  fn triangle() -> Mesh {
    Mesh::new(true)
      .with_channel(VertexChannel::new("position", 2, vec![0., 0., 1., 0., 0., 1.]))
      .with_indices(vec![0, 1, 2])
  }

  /// A backend that believes it’s initialized, for the paths failing before any driver call.
  struct Detached(GL33<Headless>);

  impl Detached {
    fn new() -> Self {
      let mut gl = GL33::new(Headless::new(true));
      gl.state = Some(GLState::detached());
      Detached(gl)
    }
  }

  impl Drop for Detached {
    fn drop(&mut self) {
      // releasing would reach the driver
      self.0.state = None;
    }
  }

  fn shader_library() -> (HashMap<ShaderId, GLuint>, Vec<Shader>, ShaderId) {
    let id = ShaderId::allocate();
    let mut programs = HashMap::new();
    programs.insert(id, 7);

    (programs, vec![Shader::new(id, "flat", HashMap::new())], id)
  }

  fn with_shader(mesh: Mesh, shader: ShaderId) -> Mesh {
    let mut material = Material::new();
    material.attach(shader, HashMap::new());

    let mut mesh = mesh;
    mesh.set_material(material);
    mesh
  }

  #[test]
  fn draw_target_resolves_the_program() {
    let (programs, shaders, id) = shader_library();
    let mesh = with_shader(triangle(), id);

    let (material, program, shader) = draw_target(&mesh, &programs, &shaders).unwrap();

    assert_eq!(material.shader(), Some(id));
    assert_eq!(program, 7);
    assert_eq!(shader.name(), "flat");
  }

  #[test]
  fn draw_target_needs_a_material_and_a_shader() {
    let (programs, shaders, _) = shader_library();

    let bare = triangle();
    assert!(matches!(
      draw_target(&bare, &programs, &shaders),
      Err(GraphicError::MissingMaterial(id)) if id == bare.id()
    ));

    let mut unshaded = triangle();
    unshaded.set_material(Material::new());
    assert!(matches!(
      draw_target(&unshaded, &programs, &shaders),
      Err(GraphicError::MissingShader(id)) if id == unshaded.id()
    ));

    let stranger = ShaderId::allocate();
    let orphan = with_shader(triangle(), stranger);
    assert!(matches!(
      draw_target(&orphan, &programs, &shaders),
      Err(GraphicError::Shader(ShaderError::UnknownShader(id))) if id == stranger
    ));
  }

  #[test]
  fn shader_lookup_needs_both_tables() {
    let (programs, shaders, id) = shader_library();
    assert!(lookup_shader(&programs, &shaders, id).is_ok());

    // a program without its reflection is as unknown as no program at all
    assert_eq!(
      lookup_shader(&programs, &[], id).unwrap_err(),
      ShaderError::UnknownShader(id)
    );
    assert_eq!(
      lookup_shader(&HashMap::new(), &shaders, id).unwrap_err(),
      ShaderError::UnknownShader(id)
    );
  }

  #[test]
  fn unbinding_without_release_deletes_nothing() {
    assert_eq!(unbind_mesh_call(false), "glBindBuffer");
    assert_eq!(unbind_mesh_call(true), "glDeleteBuffers");
  }

  #[test]
  fn init_twice_is_a_no_op() {
    let mut gl = Detached::new();
    let made_current = gl.0.surface().made_current.clone();

    assert!(gl.0.is_initialized());
    assert!(gl.0.init().is_ok());
    assert_eq!(*made_current.borrow(), 0);
    assert!(gl.0.is_initialized());
  }

  #[test]
  fn drawing_unshaded_meshes() {
    let mut gl = Detached::new();

    let bare = triangle();
    assert!(matches!(
      gl.0.draw_mesh(&bare, DrawMode::Triangles),
      Err(GraphicError::MissingMaterial(id)) if id == bare.id()
    ));

    let mut unshaded = triangle();
    unshaded.set_material(Material::new());
    assert!(matches!(
      gl.0.draw_vertices(&unshaded, DrawMode::Points),
      Err(GraphicError::MissingShader(id)) if id == unshaded.id()
    ));

    let orphan = with_shader(triangle(), ShaderId::allocate());
    assert!(matches!(
      gl.0.draw_mesh(&orphan, DrawMode::Triangles),
      Err(GraphicError::Shader(ShaderError::UnknownShader(_)))
    ));
  }

  #[test]
  fn unknown_resources() {
    let mut gl = Detached::new();
    let mesh = triangle();
    let mut material = Material::new();

    assert!(matches!(
      gl.0.unbind_mesh(&mesh, false),
      Err(GraphicError::UnknownMesh(id)) if id == mesh.id()
    ));
    assert!(matches!(
      gl.0.unbind_mesh(&mesh, true),
      Err(GraphicError::UnknownMesh(_))
    ));

    let texture = TextureId::allocate();
    assert!(matches!(
      gl.0.unbind_texture(texture),
      Err(GraphicError::UnknownTexture(id)) if id == texture
    ));

    let shader = ShaderId::allocate();
    assert!(matches!(
      gl.0.destroy_shader(shader),
      Err(GraphicError::Shader(ShaderError::UnknownShader(id))) if id == shader
    ));
    assert!(matches!(
      gl.0.attach_shader_to_material(shader, &mut material),
      Err(GraphicError::Shader(ShaderError::UnknownShader(_)))
    ));
    assert!(material.shader().is_none());

    let framebuffer = FramebufferId::allocate();
    assert!(matches!(
      gl.0.delete_framebuffer(framebuffer),
      Err(GraphicError::UnknownFramebuffer(id)) if id == framebuffer
    ));
    assert!(matches!(
      gl.0.bind_framebuffer(Some(framebuffer)),
      Err(GraphicError::UnknownFramebuffer(_))
    ));

    let renderbuffer = RenderbufferId::allocate();
    assert!(matches!(
      gl.0.delete_renderbuffer(renderbuffer),
      Err(GraphicError::UnknownRenderbuffer(id)) if id == renderbuffer
    ));
    assert!(matches!(
      gl.0.bind_renderbuffer(Some(renderbuffer)),
      Err(GraphicError::UnknownRenderbuffer(_))
    ));
  }

  #[test]
  fn operations_need_init() {
    let mut gl = GL33::new(Headless::new(true));
    let mesh = triangle();
    let mut material = Material::new();

    assert_eq!(gl.graphic_type(), GraphicBackend::OpenGl);
    assert!(!gl.is_initialized());
    assert!(gl.shaders().is_empty());
    assert!(gl.shader(ShaderId::allocate()).is_none());

    assert!(matches!(gl.release(), Err(GraphicError::NotInitialized)));
    assert!(matches!(
      gl.check_feature(Feature::Blend),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.enable_feature(Feature::DepthTest),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.create_framebuffer(),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.bind_renderbuffer(None),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.bind_mesh(&mesh, false),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.unbind_mesh(&mesh, true),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.create_shader("void main() {}", "void main() {}", "noop"),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.attach_shader_to_material(ShaderId::allocate(), &mut material),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.draw_mesh(&mesh, DrawMode::Triangles),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.draw_viewport(RectI::new(0, 0, 800, 600)),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(
      gl.clear_color(Color::WHITE),
      Err(GraphicError::NotInitialized)
    ));
    assert!(matches!(gl.begin_render(), Err(GraphicError::NotInitialized)));
    assert!(matches!(gl.end_render(), Err(GraphicError::NotInitialized)));

    assert_eq!(gl.mesh_count(), 0);
    assert!(material.shader().is_none());
  }

  #[test]
  fn uninitialized_draw_doesnt_look_at_the_mesh() {
    let mut gl = GL33::new(Headless::new(true));

    let mut mesh = triangle();
    let mut material = Material::new();
    material.set_uniform("time", UniformValue::Float(0.));
    mesh.set_material(material);

    assert!(matches!(
      gl.draw_vertices(&mesh, DrawMode::Points),
      Err(GraphicError::NotInitialized)
    ));
  }

  #[test]
  fn failing_surface_leaves_backend_uninitialized() {
    let surface = Headless::new(false);
    let made_current = surface.made_current.clone();
    let mut gl = GL33::new(surface);

    match gl.init() {
      Err(GraphicError::Surface(e)) => assert_eq!(e, "context lost"),
      r => panic!("unexpected init result: {:?}", r),
    }

    assert_eq!(*made_current.borrow(), 1);
    assert!(!gl.is_initialized());
    assert!(gl.state_mut().is_none());
    assert!(matches!(gl.begin_render(), Err(GraphicError::NotInitialized)));
  }

  #[test]
  fn missing_entry_points_leave_backend_uninitialized() {
    let mut gl = GL33::new(Headless::new(true));

    assert!(matches!(gl.init(), Err(GraphicError::State(_))));
    assert!(!gl.is_initialized());
    assert_eq!(gl.surface().size(), [800, 600]);
  }

  #[test]
  fn diagnostic_callback_can_be_set_before_init() {
    let mut gl = GL33::new(Headless::new(true));
    gl.set_diagnostic_callback(Some(Box::new(|_: &Diagnostic| ())));
    gl.set_diagnostic_callback(None);
    assert!(!gl.is_initialized());
  }
}
