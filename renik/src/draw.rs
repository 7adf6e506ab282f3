//! Primitive modes.

/// How vertices are assembled into primitives when drawing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DrawMode {
  /// One point per vertex.
  Points,
  /// A connected line going through all vertices.
  LineStrip,
  /// Like [`DrawMode::LineStrip`] but the last vertex connects back to the first one.
  LineLoop,
  /// A line for every pair of vertices.
  Lines,
  /// Triangles sharing an edge with the previous one.
  TriangleStrip,
  /// Triangles all sharing the first vertex.
  TriangleFan,
  /// A triangle for every three vertices.
  Triangles,
}

impl Default for DrawMode {
  fn default() -> Self {
    DrawMode::Triangles
  }
}
