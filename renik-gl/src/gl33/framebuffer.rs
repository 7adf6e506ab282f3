//! Framebuffer and renderbuffer objects.

use crate::gl33::state::GLState;
use gl::types::*;

pub(crate) unsafe fn create_framebuffer() -> GLuint {
  let mut handle: GLuint = 0;
  gl::GenFramebuffers(1, &mut handle);
  handle
}

/// Delete a framebuffer, rebinding `default` first if it was bound.
pub(crate) unsafe fn delete_framebuffer(state: &mut GLState, handle: GLuint, default: GLuint) {
  if state.is_framebuffer_bound(handle) {
    state.bind_framebuffer(default);
  }

  gl::DeleteFramebuffers(1, &handle);
}

pub(crate) unsafe fn create_renderbuffer() -> GLuint {
  let mut handle: GLuint = 0;
  gl::GenRenderbuffers(1, &mut handle);
  handle
}

/// Delete a renderbuffer, unbinding it first if it was bound.
pub(crate) unsafe fn delete_renderbuffer(state: &mut GLState, handle: GLuint) {
  if state.is_renderbuffer_bound(handle) {
    state.bind_renderbuffer(0);
  }

  gl::DeleteRenderbuffers(1, &handle);
}
