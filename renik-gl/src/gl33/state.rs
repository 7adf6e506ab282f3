//! Graphics state.

use gl::types::*;
use renik::Feature;
use std::cell::RefCell;
use std::collections::HashMap;
use std::error;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know the target value is
/// already set to what the command tries to set. For instance, if you ask to use a program `34`
/// once, that value will be set on the GPU and cached on our side. Later, if no other program has
/// been used in between, using program `34` again doesn’t reach the driver.
///
/// Note: do not confuse [`Cached`] with [`Bind`]. The latter is used to either use the regular
/// cache mechanism or override it to force a value to be written.
#[derive(Debug)]
pub(crate) struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Cache a value.
  pub(crate) fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  pub(crate) fn invalidate(&mut self) {
    self.0 = None;
  }

  pub(crate) fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  pub(crate) fn get(&self) -> Option<&T> {
    self.0.as_ref()
  }

  /// Check if the cached value is invalid regarding a value.
  ///
  /// A non-cached value (i.e. empty) is always invalid whatever compared value. If a value is
  /// already cached, then it’s invalid if it’s not equal ([`PartialEq`]) to the input value.
  pub(crate) fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

/// The graphics state.
///
/// This type represents the current state of the OpenGL context of a surface. It acts as a
/// forward-gate to the driver but adds a small cache layer over it to prevent from issuing the same
/// API call (with the same parameters) twice.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // viewport and scissor box
  viewport: Cached<[GLint; 4]>,
  scissor: Cached<[GLint; 4]>,

  // clear values
  clear_color: Cached<[GLfloat; 4]>,
  clear_depth: Cached<GLfloat>,
  clear_stencil: Cached<GLint>,

  // blending
  blending_func: Cached<(GLenum, GLenum)>,

  // capabilities
  capabilities: HashMap<Feature, Cached<bool>>,

  // texture
  current_texture_unit: Cached<GLuint>,
  bound_textures: Vec<GLuint>,

  // array buffer
  bound_array_buffer: GLuint,

  // element buffer
  bound_element_array_buffer: GLuint,

  // framebuffer
  bound_framebuffer: Cached<GLuint>,

  // renderbuffer
  bound_renderbuffer: Cached<GLuint>,

  // vertex array
  bound_vertex_array: GLuint,

  // shader program
  current_program: GLuint,
}

impl GLState {
  /// Create a new `GLState` from the current OpenGL context.
  ///
  /// > Note: keep in mind you can create only one per thread. The slot is given back when the
  /// > state is dropped.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
        }

        None => return Err(StateQueryError::UnavailableGLState),
      }

      drop(inner);

      // the slot must not leak if querying the context fails
      Self::get_from_context().map_err(|e| {
        release_tls_slot();
        e
      })
    })
  }

  fn get_from_context() -> Result<Self, StateQueryError> {
    unsafe {
      let viewport = Cached::new(get_ctx_viewport()?);
      let scissor = Cached::new(get_ctx_scissor()?);
      let clear_color = Cached::new(get_ctx_clear_color()?);
      let clear_depth = Cached::new(get_ctx_clear_depth()?);
      let clear_stencil = Cached::new(get_ctx_clear_stencil()?);
      let blending_func = Cached::new(get_ctx_blending_func()?);
      let capabilities = get_ctx_capabilities()?;
      let current_texture_unit = Cached::new(get_ctx_current_texture_unit()?);
      let bound_textures = vec![0; 48]; // 48 is the platform minimal requirement
      let bound_framebuffer = Cached::new(get_ctx_bound_framebuffer()?);
      let bound_renderbuffer = Cached::new(get_ctx_bound_renderbuffer()?);
      let bound_vertex_array = get_ctx_bound_vertex_array()?;
      let current_program = get_ctx_current_program()?;

      Ok(GLState {
        _a: PhantomData,
        viewport,
        scissor,
        clear_color,
        clear_depth,
        clear_stencil,
        blending_func,
        capabilities,
        current_texture_unit,
        bound_textures,
        bound_array_buffer: 0,
        bound_element_array_buffer: 0,
        bound_framebuffer,
        bound_renderbuffer,
        bound_vertex_array,
        current_program,
      })
    }
  }

  /// A state with nothing cached and no context behind it.
  ///
  /// Nothing reaching the driver may be called on it.
  #[cfg(test)]
  pub(crate) fn detached() -> Self {
    GLState {
      _a: PhantomData,
      viewport: Cached(None),
      scissor: Cached(None),
      clear_color: Cached(None),
      clear_depth: Cached(None),
      clear_stencil: Cached(None),
      blending_func: Cached(None),
      capabilities: HashMap::new(),
      current_texture_unit: Cached(None),
      bound_textures: Vec::new(),
      bound_array_buffer: 0,
      bound_element_array_buffer: 0,
      bound_framebuffer: Cached(None),
      bound_renderbuffer: Cached(None),
      bound_vertex_array: 0,
      current_program: 0,
    }
  }

  /// Framebuffer bound when the state was captured.
  pub(crate) fn bound_framebuffer(&self) -> Option<GLuint> {
    self.bound_framebuffer.get().copied()
  }

  /// Cached state of a capability, if known.
  pub fn capability(&self, feature: Feature) -> Option<bool> {
    self
      .capabilities
      .get(&feature)
      .and_then(|c| c.get().copied())
  }

  /// Invalidate the currently in-use shader program.
  pub fn invalidate_shader_program(&mut self) {
    self.current_program = 0;
  }

  /// Invalidate the currently in-use array buffer.
  pub fn invalidate_array_buffer(&mut self) {
    self.bound_array_buffer = 0;
  }

  /// Invalidate the currently in-use element array buffer.
  pub fn invalidate_element_array_buffer(&mut self) {
    self.bound_element_array_buffer = 0;
  }

  /// Invalidate the currently in-use viewport.
  pub fn invalidate_viewport(&mut self) {
    self.viewport.invalidate()
  }

  /// Invalidate the currently in-use scissor box.
  pub fn invalidate_scissor(&mut self) {
    self.scissor.invalidate()
  }

  /// Invalidate the clear values.
  pub fn invalidate_clear_values(&mut self) {
    self.clear_color.invalidate();
    self.clear_depth.invalidate();
    self.clear_stencil.invalidate();
  }

  /// Invalidate every cached capability state.
  pub fn invalidate_capabilities(&mut self) {
    for c in self.capabilities.values_mut() {
      c.invalidate();
    }
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
    }
  }

  pub(crate) unsafe fn set_scissor(&mut self, scissor: [GLint; 4]) {
    if self.scissor.is_invalid(&scissor) {
      gl::Scissor(scissor[0], scissor[1], scissor[2], scissor[3]);
      self.scissor.set(scissor);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&clear_color) {
      gl::ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
      self.clear_color.set(clear_color);
    }
  }

  pub(crate) unsafe fn set_clear_depth(&mut self, depth: GLfloat) {
    if self.clear_depth.is_invalid(&depth) {
      gl::ClearDepth(depth as GLdouble);
      self.clear_depth.set(depth);
    }
  }

  pub(crate) unsafe fn set_clear_stencil(&mut self, stencil: GLint) {
    if self.clear_stencil.is_invalid(&stencil) {
      gl::ClearStencil(stencil);
      self.clear_stencil.set(stencil);
    }
  }

  pub(crate) unsafe fn set_blending_func(&mut self, src: GLenum, dst: GLenum) {
    let funcs = (src, dst);

    if self.blending_func.is_invalid(&funcs) {
      gl::BlendFunc(src, dst);
      self.blending_func.set(funcs);
    }
  }

  pub(crate) unsafe fn set_capability(&mut self, feature: Feature, enabled: bool) {
    let cached = self
      .capabilities
      .entry(feature)
      .or_insert_with(|| Cached(None));

    if cached.is_invalid(&enabled) {
      let cap = feature_to_glenum(feature);

      if enabled {
        gl::Enable(cap);
      } else {
        gl::Disable(cap);
      }

      cached.set(enabled);
    }
  }

  /// Ask the driver for the state of a capability, bypassing and refreshing the cache.
  pub(crate) unsafe fn query_capability(&mut self, feature: Feature) -> Result<bool, StateQueryError> {
    let enabled = get_ctx_capability(feature)?;

    self
      .capabilities
      .entry(feature)
      .or_insert_with(|| Cached(None))
      .set(enabled);

    Ok(enabled)
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    if self.current_texture_unit.is_invalid(&unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
      self.current_texture_unit.set(unit);
    }
  }

  pub(crate) unsafe fn bind_texture(&mut self, handle: GLuint) {
    let unit = match self.current_texture_unit.get() {
      Some(unit) => *unit as usize,

      None => {
        self.set_texture_unit(0);
        0
      }
    };

    match self.bound_textures.get(unit).copied() {
      Some(handle_) if handle != handle_ => {
        gl::BindTexture(gl::TEXTURE_2D, handle);
        self.bound_textures[unit] = handle;
      }

      None => {
        gl::BindTexture(gl::TEXTURE_2D, handle);

        // not enough registered texture units; let’s grow a bit more
        self.bound_textures.resize(unit + 1, 0);
        self.bound_textures[unit] = handle;
      }

      _ => (), // cached
    }
  }

  /// Forget every binding of a texture about to be deleted.
  pub(crate) fn unbind_texture(&mut self, handle: GLuint) {
    for bound in self.bound_textures.iter_mut().filter(|h| **h == handle) {
      *bound = 0;
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_array_buffer != handle {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer = handle;
    }
  }

  pub(crate) unsafe fn bind_element_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_element_array_buffer != handle {
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, handle);
      self.bound_element_array_buffer = handle;
    }
  }

  pub(crate) unsafe fn unbind_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer == handle {
      self.bind_array_buffer(0, Bind::Cached);
    } else if self.bound_element_array_buffer == handle {
      self.bind_element_array_buffer(0, Bind::Cached);
    }
  }

  pub(crate) unsafe fn bind_framebuffer(&mut self, handle: GLuint) {
    if self.bound_framebuffer.is_invalid(&handle) {
      gl::BindFramebuffer(gl::FRAMEBUFFER, handle);
      self.bound_framebuffer.set(handle);
    }
  }

  pub(crate) fn is_framebuffer_bound(&self, handle: GLuint) -> bool {
    !self.bound_framebuffer.is_invalid(&handle)
  }

  pub(crate) unsafe fn bind_renderbuffer(&mut self, handle: GLuint) {
    if self.bound_renderbuffer.is_invalid(&handle) {
      gl::BindRenderbuffer(gl::RENDERBUFFER, handle);
      self.bound_renderbuffer.set(handle);
    }
  }

  pub(crate) fn is_renderbuffer_bound(&self, handle: GLuint) -> bool {
    !self.bound_renderbuffer.is_invalid(&handle)
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_vertex_array != handle {
      gl::BindVertexArray(handle);
      self.bound_vertex_array = handle;
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program != handle {
      gl::UseProgram(handle);
      self.current_program = handle;
    }
  }
}

impl Drop for GLState {
  fn drop(&mut self) {
    release_tls_slot();
  }
}

fn release_tls_slot() {
  // the thread might be shutting down, in which case there is no slot to give back anymore
  let _ = TLS_ACQUIRE_GFX_STATE.try_with(|rc| *rc.borrow_mut() = Some(()));
}

/// OpenGL capability of a [`Feature`].
#[inline]
pub(crate) fn feature_to_glenum(feature: Feature) -> GLenum {
  match feature {
    Feature::Blend => gl::BLEND,
    Feature::DepthTest => gl::DEPTH_TEST,
    Feature::StencilTest => gl::STENCIL_TEST,
    Feature::ScissorTest => gl::SCISSOR_TEST,
    Feature::CullFace => gl::CULL_FACE,
    Feature::Multisample => gl::MULTISAMPLE,
    Feature::FramebufferSrgb => gl::FRAMEBUFFER_SRGB,
    Feature::PrimitiveRestart => gl::PRIMITIVE_RESTART,
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// Corrupted capability state.
  UnknownCapabilityState(Feature, GLboolean),
  /// Corrupted blending source factor.
  UnknownBlendingSrcFactor(GLenum),
  /// Corrupted blending destination factor.
  UnknownBlendingDstFactor(GLenum),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownCapabilityState(feature, ref s) => {
        write!(f, "unknown {} state: {}", feature, s)
      }
      StateQueryError::UnknownBlendingSrcFactor(ref k) => {
        write!(f, "unknown blending source factor: {}", k)
      }
      StateQueryError::UnknownBlendingDstFactor(ref k) => {
        write!(f, "unknown blending destination factor: {}", k)
      }
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_ctx_viewport() -> Result<[GLint; 4], StateQueryError> {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_scissor() -> Result<[GLint; 4], StateQueryError> {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::SCISSOR_BOX, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_clear_color() -> Result<[GLfloat; 4], StateQueryError> {
  let mut data = [0.; 4];
  gl::GetFloatv(gl::COLOR_CLEAR_VALUE, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_clear_depth() -> Result<GLfloat, StateQueryError> {
  let mut depth = 1.;
  gl::GetFloatv(gl::DEPTH_CLEAR_VALUE, &mut depth);
  Ok(depth)
}

unsafe fn get_ctx_clear_stencil() -> Result<GLint, StateQueryError> {
  let mut stencil = 0;
  gl::GetIntegerv(gl::STENCIL_CLEAR_VALUE, &mut stencil);
  Ok(stencil)
}

unsafe fn get_ctx_blending_func() -> Result<(GLenum, GLenum), StateQueryError> {
  let mut src = gl::ONE as GLint;
  let mut dst = gl::ZERO as GLint;

  gl::GetIntegerv(gl::BLEND_SRC_RGB, &mut src);
  gl::GetIntegerv(gl::BLEND_DST_RGB, &mut dst);

  let src = src as GLenum;
  let dst = dst as GLenum;

  if !is_blending_factor(src) {
    return Err(StateQueryError::UnknownBlendingSrcFactor(src));
  }

  if !is_blending_factor(dst) {
    return Err(StateQueryError::UnknownBlendingDstFactor(dst));
  }

  Ok((src, dst))
}

#[inline]
fn is_blending_factor(factor: GLenum) -> bool {
  matches!(
    factor,
    gl::ONE
      | gl::ZERO
      | gl::SRC_COLOR
      | gl::ONE_MINUS_SRC_COLOR
      | gl::DST_COLOR
      | gl::ONE_MINUS_DST_COLOR
      | gl::SRC_ALPHA
      | gl::ONE_MINUS_SRC_ALPHA
      | gl::DST_ALPHA
      | gl::ONE_MINUS_DST_ALPHA
      | gl::CONSTANT_COLOR
      | gl::ONE_MINUS_CONSTANT_COLOR
      | gl::CONSTANT_ALPHA
      | gl::ONE_MINUS_CONSTANT_ALPHA
      | gl::SRC_ALPHA_SATURATE
  )
}

unsafe fn get_ctx_capability(feature: Feature) -> Result<bool, StateQueryError> {
  let state = gl::IsEnabled(feature_to_glenum(feature));

  match state {
    gl::TRUE => Ok(true),
    gl::FALSE => Ok(false),
    _ => Err(StateQueryError::UnknownCapabilityState(feature, state)),
  }
}

unsafe fn get_ctx_capabilities() -> Result<HashMap<Feature, Cached<bool>>, StateQueryError> {
  let mut capabilities = HashMap::with_capacity(Feature::ALL.len());

  for &feature in &Feature::ALL {
    capabilities.insert(feature, Cached::new(get_ctx_capability(feature)?));
  }

  Ok(capabilities)
}

unsafe fn get_ctx_current_texture_unit() -> Result<GLuint, StateQueryError> {
  let mut active_texture = gl::TEXTURE0 as GLint;
  gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut active_texture);
  Ok(active_texture as GLuint - gl::TEXTURE0)
}

unsafe fn get_ctx_bound_framebuffer() -> Result<GLuint, StateQueryError> {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(gl::FRAMEBUFFER_BINDING, &mut bound);
  Ok(bound as GLuint)
}

unsafe fn get_ctx_bound_renderbuffer() -> Result<GLuint, StateQueryError> {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(gl::RENDERBUFFER_BINDING, &mut bound);
  Ok(bound as GLuint)
}

unsafe fn get_ctx_bound_vertex_array() -> Result<GLuint, StateQueryError> {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(gl::VERTEX_ARRAY_BINDING, &mut bound);
  Ok(bound as GLuint)
}

unsafe fn get_ctx_current_program() -> Result<GLuint, StateQueryError> {
  let mut used = 0 as GLint;
  gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut used);
  Ok(used as GLuint)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_cache_is_always_invalid() {
    let mut c = Cached::new(3);
    c.invalidate();

    assert!(c.is_invalid(&3));
    assert!(c.get().is_none());
  }

  #[test]
  fn cache_compares_values() {
    let mut c = Cached::new([0, 0, 800, 600]);

    assert!(!c.is_invalid(&[0, 0, 800, 600]));
    assert!(c.is_invalid(&[0, 0, 640, 480]));

    c.set([0, 0, 640, 480]);
    assert!(!c.is_invalid(&[0, 0, 640, 480]));
  }

  #[test]
  fn capabilities_map_to_distinct_enums() {
    let mut caps: Vec<_> = Feature::ALL.iter().map(|&f| feature_to_glenum(f)).collect();
    caps.sort_unstable();
    caps.dedup();

    assert_eq!(caps.len(), Feature::ALL.len());
    assert_eq!(feature_to_glenum(Feature::Blend), gl::BLEND);
    assert_eq!(feature_to_glenum(Feature::ScissorTest), gl::SCISSOR_TEST);
  }

  #[test]
  fn blending_factors() {
    assert!(is_blending_factor(gl::SRC_ALPHA));
    assert!(is_blending_factor(gl::ONE_MINUS_SRC_ALPHA));
    assert!(!is_blending_factor(gl::TRIANGLES + 0xdead));
  }
}
