//! Driver error reporting.

use gl::types::*;
use renik::{Diagnostic, DiagnosticCallback, GraphicBackend, GraphicError};
use std::fmt;

/// Forwards driver errors to the log and to the user diagnostic callback, if any.
#[derive(Default)]
pub(crate) struct Reporter {
  callback: Option<DiagnosticCallback>,
}

impl fmt::Debug for Reporter {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("Reporter")
      .field("callback", &self.callback.is_some())
      .finish()
  }
}

impl Reporter {
  pub(crate) fn set_callback(&mut self, callback: Option<DiagnosticCallback>) {
    self.callback = callback;
  }

  pub(crate) fn report(&mut self, code: u32, message: impl Into<String>) {
    let diagnostic = Diagnostic::new(code, GraphicBackend::OpenGl, message);
    log::error!("{}", diagnostic);

    if let Some(ref mut callback) = self.callback {
      callback(&diagnostic);
    }
  }

  /// Read every pending driver error and turn the first one into a [`GraphicError::Driver`].
  ///
  /// All the errors are reported, so that none is left pending and blamed on a later call.
  pub(crate) unsafe fn check(&mut self, call: &'static str) -> Result<(), GraphicError> {
    self.check_with(call, || gl::GetError())
  }

  fn check_with(
    &mut self,
    call: &'static str,
    mut get_error: impl FnMut() -> GLenum,
  ) -> Result<(), GraphicError> {
    let mut first = None;

    for _ in 0..MAX_PENDING_ERRORS {
      let code = get_error();

      if code == gl::NO_ERROR {
        break;
      }

      self.report(code, driver_error_message(code, call));
      first.get_or_insert(code);
    }

    match first {
      Some(code) => Err(GraphicError::Driver { code, call }),
      None => Ok(()),
    }
  }
}

// a lost context can keep reporting errors; don’t spin on it
const MAX_PENDING_ERRORS: usize = 16;

pub(crate) fn driver_error_message(code: GLenum, call: &str) -> String {
  format!("{} ({}) in {}", error_name(code), code, call)
}

fn error_name(code: GLenum) -> &'static str {
  match code {
    gl::INVALID_ENUM => "GL_INVALID_ENUM",
    gl::INVALID_VALUE => "GL_INVALID_VALUE",
    gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
    gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
    gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
    gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
    gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
    _ => "unknown error",
  }
}
