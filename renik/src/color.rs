//! Colors and rectangles.

/// A linear RGBA color, each channel in `[0; 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
  /// Red channel.
  pub r: f32,
  /// Green channel.
  pub g: f32,
  /// Blue channel.
  pub b: f32,
  /// Alpha channel.
  pub a: f32,
}

impl Color {
  /// Opaque black.
  pub const BLACK: Color = Color::new(0., 0., 0., 1.);
  /// Opaque white.
  pub const WHITE: Color = Color::new(1., 1., 1., 1.);
  /// Fully transparent black.
  pub const TRANSPARENT: Color = Color::new(0., 0., 0., 0.);

  /// Create a new color.
  pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
    Color { r, g, b, a }
  }

  /// Create an opaque color.
  pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
    Color::new(r, g, b, 1.)
  }
}

impl Default for Color {
  fn default() -> Self {
    Color::BLACK
  }
}

impl From<Color> for [f32; 4] {
  fn from(c: Color) -> Self {
    [c.r, c.g, c.b, c.a]
  }
}

impl From<[f32; 4]> for Color {
  fn from([r, g, b, a]: [f32; 4]) -> Self {
    Color { r, g, b, a }
  }
}

/// An integer rectangle in window coordinates.
///
/// The origin is the top-left corner of the window and `y` grows downwards.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RectI {
  /// Left edge.
  pub x: i32,
  /// Top edge.
  pub y: i32,
  /// Width.
  pub width: i32,
  /// Height.
  pub height: i32,
}

impl RectI {
  /// Create a new rectangle.
  pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
    RectI {
      x,
      y,
      width,
      height,
    }
  }

  /// Express the rectangle with a bottom-left origin, `y` growing upwards, for a surface of
  /// `surface_height` pixels.
  pub fn flip_y(self, surface_height: i32) -> Self {
    RectI {
      y: surface_height - self.y - self.height,
      ..self
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn color_to_array() {
    let c: [f32; 4] = Color::new(0.1, 0.2, 0.3, 0.4).into();
    assert_eq!(c, [0.1, 0.2, 0.3, 0.4]);
    assert_eq!(Color::from(c), Color::new(0.1, 0.2, 0.3, 0.4));
  }

  #[test]
  fn rgb_is_opaque() {
    assert_eq!(Color::rgb(1., 0., 0.).a, 1.);
    assert_eq!(Color::default(), Color::BLACK);
  }

  #[test]
  fn full_surface_flip_is_identity() {
    let rect = RectI::new(0, 0, 800, 600);
    assert_eq!(rect.flip_y(600), rect);
  }

  #[test]
  fn top_strip_goes_to_the_top() {
    // a 100px strip at the top of a 600px window starts 500px above the bottom edge
    let rect = RectI::new(10, 0, 200, 100).flip_y(600);
    assert_eq!(rect, RectI::new(10, 500, 200, 100));
  }

  #[test]
  fn flip_twice_round_trips() {
    let rect = RectI::new(5, 42, 30, 17);
    assert_eq!(rect.flip_y(480).flip_y(480), rect);
  }
}
