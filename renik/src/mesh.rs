//! Meshes.
//!
//! A [`Mesh`] is a list of named vertex channels and an index list. Channels are packed one after
//! the other (non-interleaved) when uploaded: the channel inserted first starts at offset `0`, the
//! second one right after the last byte of the first one, and so on.
//!
//! Backends cache the GPU buffers of a mesh under its [`MeshId`]. That id is allocated when the
//! mesh is created and is what ties the CPU value to its GPU copy, which is why [`Mesh`] is not
//! `Clone`. Every mutation bumps [`Mesh::revision`] so that backends know when to re-upload.

use crate::material::Material;
use std::mem;

opaque_id!(
  /// Identity of a [`Mesh`].
  MeshId,
  "mesh"
);

/// A named stream of per-vertex floats.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexChannel {
  name: String,
  components: usize,
  data: Vec<f32>,
}

impl VertexChannel {
  /// Create a channel of `components` floats per vertex.
  ///
  /// `data.len()` should be a multiple of `components`; trailing floats are ignored when counting
  /// vertices.
  pub fn new(name: impl Into<String>, components: usize, data: Vec<f32>) -> Self {
    VertexChannel {
      name: name.into(),
      components,
      data,
    }
  }

  /// Name of the channel, matched against shader attribute names.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Number of floats per vertex.
  pub fn components(&self) -> usize {
    self.components
  }

  /// Raw data.
  pub fn data(&self) -> &[f32] {
    &self.data
  }

  /// Size of the channel in bytes.
  pub fn size(&self) -> usize {
    self.data.len() * mem::size_of::<f32>()
  }

  /// Number of vertices in the channel.
  pub fn vertex_count(&self) -> usize {
    if self.components == 0 {
      0
    } else {
      self.data.len() / self.components
    }
  }
}

/// A mesh: vertex channels, indices and an optional material.
#[derive(Debug)]
pub struct Mesh {
  id: MeshId,
  channels: Vec<VertexChannel>,
  indices: Vec<u32>,
  is_static: bool,
  material: Option<Material>,
  revision: u64,
}

impl Mesh {
  /// Create an empty mesh.
  ///
  /// Static meshes are expected to be uploaded once; dynamic ones are hinted to the driver as
  /// frequently updated.
  pub fn new(is_static: bool) -> Self {
    Mesh {
      id: MeshId::allocate(),
      channels: Vec::new(),
      indices: Vec::new(),
      is_static,
      material: None,
      revision: 0,
    }
  }

  /// Add or replace a channel, builder style.
  pub fn with_channel(mut self, channel: VertexChannel) -> Self {
    self.set_channel(channel);
    self
  }

  /// Set the indices, builder style.
  pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
    self.set_indices(indices);
    self
  }

  /// Set the material, builder style.
  pub fn with_material(mut self, material: Material) -> Self {
    self.material = Some(material);
    self
  }

  /// Identity of the mesh.
  pub fn id(&self) -> MeshId {
    self.id
  }

  /// Whether the mesh is static.
  pub fn is_static(&self) -> bool {
    self.is_static
  }

  /// Revision of the vertex and index data; bumped by every mutation.
  pub fn revision(&self) -> u64 {
    self.revision
  }

  /// Replace the channel with the same name, or append it.
  pub fn set_channel(&mut self, channel: VertexChannel) {
    match self.channels.iter_mut().find(|c| c.name == channel.name) {
      Some(existing) => *existing = channel,
      None => self.channels.push(channel),
    }

    self.revision += 1;
  }

  /// Replace the indices.
  pub fn set_indices(&mut self, indices: Vec<u32>) {
    self.indices = indices;
    self.revision += 1;
  }

  /// All channels, in packing order.
  pub fn channels(&self) -> &[VertexChannel] {
    &self.channels
  }

  /// Look up a channel by name.
  pub fn channel(&self, name: &str) -> Option<&VertexChannel> {
    self.channels.iter().find(|c| c.name == name)
  }

  /// Byte offset of a channel in the packed vertex data.
  pub fn channel_offset(&self, name: &str) -> Option<usize> {
    let mut offset = 0;

    for channel in &self.channels {
      if channel.name == name {
        return Some(offset);
      }

      offset += channel.size();
    }

    None
  }

  /// Total size in bytes of the packed vertex data.
  pub fn vertex_size(&self) -> usize {
    self.channels.iter().map(VertexChannel::size).sum()
  }

  /// Number of vertices, as given by the shortest channel.
  pub fn vertex_count(&self) -> usize {
    self
      .channels
      .iter()
      .map(VertexChannel::vertex_count)
      .min()
      .unwrap_or(0)
  }

  /// Indices.
  pub fn indices(&self) -> &[u32] {
    &self.indices
  }

  /// Number of indices.
  pub fn index_count(&self) -> usize {
    self.indices.len()
  }

  /// Size in bytes of the index data.
  pub fn index_size(&self) -> usize {
    self.indices.len() * mem::size_of::<u32>()
  }

  /// Material used to draw the mesh.
  pub fn material(&self) -> Option<&Material> {
    self.material.as_ref()
  }

  /// Mutable access to the material, to update uniform values between draws.
  pub fn material_mut(&mut self) -> Option<&mut Material> {
    self.material.as_mut()
  }

  /// Set the material.
  pub fn set_material(&mut self, material: Material) {
    self.material = Some(material);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn triangle() -> Mesh {
    Mesh::new(true)
      .with_channel(VertexChannel::new(
        "position",
        2,
        vec![-0.5, -0.5, 0.5, -0.5, 0., 0.5],
      ))
      .with_channel(VertexChannel::new(
        "color",
        3,
        vec![1., 0., 0., 0., 1., 0., 0., 0., 1.],
      ))
      .with_indices(vec![0, 1, 2])
  }

  #[test]
  fn packed_layout() {
    let mesh = triangle();

    assert_eq!(mesh.vertex_size(), (6 + 9) * 4);
    assert_eq!(mesh.channel_offset("position"), Some(0));
    assert_eq!(mesh.channel_offset("color"), Some(24));
    assert_eq!(mesh.channel_offset("normal"), None);
  }

  #[test]
  fn counts() {
    let mesh = triangle();

    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.index_count(), 3);
    assert_eq!(mesh.index_size(), 12);
  }

  #[test]
  fn replacing_a_channel_keeps_its_slot() {
    let mut mesh = triangle();
    mesh.set_channel(VertexChannel::new("position", 3, vec![0.; 9]));

    assert_eq!(mesh.channels().len(), 2);
    assert_eq!(mesh.channels()[0].name(), "position");
    assert_eq!(mesh.channel_offset("color"), Some(36));
  }

  #[test]
  fn mutations_bump_revision() {
    let mut mesh = Mesh::new(false);
    let r0 = mesh.revision();

    mesh.set_indices(vec![0]);
    let r1 = mesh.revision();
    mesh.set_channel(VertexChannel::new("position", 1, vec![0.]));

    assert!(r1 > r0);
    assert!(mesh.revision() > r1);
  }

  #[test]
  fn meshes_have_distinct_identities() {
    assert_ne!(Mesh::new(true).id(), Mesh::new(true).id());
  }

  #[test]
  fn empty_mesh() {
    let mesh = Mesh::new(true);

    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(mesh.vertex_size(), 0);
    assert!(mesh.material().is_none());
  }

  #[test]
  fn zero_component_channel_has_no_vertices() {
    let channel = VertexChannel::new("weird", 0, vec![1., 2.]);
    assert_eq!(channel.vertex_count(), 0);
    assert_eq!(channel.size(), 8);
  }
}
