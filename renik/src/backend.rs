//! Backend kinds.

use std::fmt;

/// Kind of graphics API a [`Graphic`](crate::Graphic) implementation runs on.
///
/// The discriminant is the numeric code reported in [`Diagnostic`](crate::Diagnostic)s.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GraphicBackend {
  /// OpenGL.
  OpenGl = 1,
}

impl GraphicBackend {
  /// Numeric code of the backend.
  pub fn code(self) -> i32 {
    self as i32
  }
}

impl fmt::Display for GraphicBackend {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GraphicBackend::OpenGl => f.write_str("OpenGL"),
    }
  }
}
