//! Driver diagnostics.
//!
//! Backends log every driver error through the [log](https://crates.io/crates/log) facade.
//! Applications that want to route those errors somewhere else (an in-game console, a crash
//! reporter) can install a [`DiagnosticCallback`] with [`Graphic::set_diagnostic_callback`](crate::Graphic::set_diagnostic_callback).

use crate::backend::GraphicBackend;
use std::fmt;

/// A single error report coming from the driver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
  /// Driver error code, or `u32::MAX` when the error has no native code.
  pub code: u32,
  /// Backend that emitted the report.
  pub backend: GraphicBackend,
  /// Human readable message.
  pub message: String,
}

impl Diagnostic {
  /// Code used for reports that don’t come with a native error code.
  pub const NO_CODE: u32 = u32::MAX;

  /// Create a new report.
  pub fn new(code: u32, backend: GraphicBackend, message: impl Into<String>) -> Self {
    Diagnostic {
      code,
      backend,
      message: message.into(),
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    if self.code == Self::NO_CODE {
      write!(f, "[{}] {}", self.backend, self.message)
    } else {
      write!(f, "[{}] error {}: {}", self.backend, self.code, self.message)
    }
  }
}

/// User callback receiving driver [`Diagnostic`]s.
pub type DiagnosticCallback = Box<dyn FnMut(&Diagnostic)>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_with_code() {
    let d = Diagnostic::new(1282, GraphicBackend::OpenGl, "glBufferData");
    assert_eq!(d.to_string(), "[OpenGL] error 1282: glBufferData");
  }

  #[test]
  fn display_without_code() {
    let d = Diagnostic::new(Diagnostic::NO_CODE, GraphicBackend::OpenGl, "link failed");
    assert_eq!(d.to_string(), "[OpenGL] link failed");
  }
}
