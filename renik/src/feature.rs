//! Render capabilities that can be switched on and off.

use std::fmt;

/// A driver capability.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Feature {
  /// Color blending.
  Blend,
  /// Depth testing.
  DepthTest,
  /// Stencil testing.
  StencilTest,
  /// Scissor testing; the box is set with [`Graphic::draw_scissor`](crate::Graphic::draw_scissor).
  ScissorTest,
  /// Face culling.
  CullFace,
  /// Multisampling.
  Multisample,
  /// sRGB conversion when writing to the framebuffer.
  FramebufferSrgb,
  /// Primitive restart.
  PrimitiveRestart,
}

impl Feature {
  /// All known features.
  pub const ALL: [Feature; 8] = [
    Feature::Blend,
    Feature::DepthTest,
    Feature::StencilTest,
    Feature::ScissorTest,
    Feature::CullFace,
    Feature::Multisample,
    Feature::FramebufferSrgb,
    Feature::PrimitiveRestart,
  ];
}

impl fmt::Display for Feature {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    let name = match *self {
      Feature::Blend => "blend",
      Feature::DepthTest => "depth test",
      Feature::StencilTest => "stencil test",
      Feature::ScissorTest => "scissor test",
      Feature::CullFace => "face culling",
      Feature::Multisample => "multisample",
      Feature::FramebufferSrgb => "sRGB framebuffer",
      Feature::PrimitiveRestart => "primitive restart",
    };

    f.write_str(name)
  }
}
