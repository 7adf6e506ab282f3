//! Mesh buffers.
//!
//! Each mesh gets a vertex buffer holding its channels packed one after the other and an index
//! buffer holding its `u32` indices. Both handles are kept in the [`MeshTable`], keyed by mesh
//! identity.

use crate::gl33::debug::Reporter;
use crate::gl33::state::{Bind, GLState};
use gl::types::*;
use renik::{GraphicError, Mesh, MeshId};
use std::collections::HashMap;
use std::os::raw::c_void;
use std::ptr;

/// Native buffers of a mesh.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MeshHandler {
  pub(crate) vbo: GLuint,
  pub(crate) ibo: GLuint,
  /// Revision of the mesh data last uploaded.
  pub(crate) revision: u64,
}

/// What [`bind_mesh`] must do for a given mesh.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MeshBinding {
  /// The buffers are up to date; just bind them.
  Cached(MeshHandler),
  /// The data must be uploaded, reusing the buffers of the previous upload if any.
  Upload(Option<MeshHandler>),
}

/// Mesh identity to native buffers.
#[derive(Debug, Default)]
pub(crate) struct MeshTable {
  handlers: HashMap<MeshId, MeshHandler>,
}

impl MeshTable {
  pub(crate) fn plan(&self, mesh: &Mesh, rebind: bool) -> MeshBinding {
    match self.handlers.get(&mesh.id()) {
      Some(&handler) if !rebind && handler.revision == mesh.revision() => {
        MeshBinding::Cached(handler)
      }

      existing => MeshBinding::Upload(existing.copied()),
    }
  }

  pub(crate) fn get(&self, id: MeshId) -> Option<MeshHandler> {
    self.handlers.get(&id).copied()
  }

  pub(crate) fn insert(&mut self, id: MeshId, handler: MeshHandler) {
    self.handlers.insert(id, handler);
  }

  pub(crate) fn remove(&mut self, id: MeshId) -> Option<MeshHandler> {
    self.handlers.remove(&id)
  }

  pub(crate) fn drain(&mut self) -> impl Iterator<Item = MeshHandler> + '_ {
    self.handlers.drain().map(|(_, handler)| handler)
  }

  pub(crate) fn len(&self) -> usize {
    self.handlers.len()
  }
}

fn usage(mesh: &Mesh) -> GLenum {
  if mesh.is_static() {
    gl::STATIC_DRAW
  } else {
    gl::DYNAMIC_DRAW
  }
}

/// Bind the buffers of a mesh, uploading its data first if needed.
pub(crate) unsafe fn bind_mesh(
  state: &mut GLState,
  reporter: &mut Reporter,
  table: &mut MeshTable,
  mesh: &Mesh,
  rebind: bool,
) -> Result<MeshHandler, GraphicError> {
  state.bind_array_buffer(0, Bind::Cached);
  state.bind_element_array_buffer(0, Bind::Cached);
  reporter.check("glBindBuffer")?;

  match table.plan(mesh, rebind) {
    MeshBinding::Cached(handler) => {
      state.bind_array_buffer(handler.vbo, Bind::Cached);
      state.bind_element_array_buffer(handler.ibo, Bind::Cached);
      reporter.check("glBindBuffer")?;

      Ok(handler)
    }

    MeshBinding::Upload(existing) => {
      let handler = upload(state, reporter, mesh, existing)?;
      table.insert(mesh.id(), handler);

      log::debug!(
        "uploaded {} ({} bytes of vertices, {} indices)",
        mesh.id(),
        mesh.vertex_size(),
        mesh.index_count()
      );

      Ok(handler)
    }
  }
}

unsafe fn upload(
  state: &mut GLState,
  reporter: &mut Reporter,
  mesh: &Mesh,
  existing: Option<MeshHandler>,
) -> Result<MeshHandler, GraphicError> {
  let (vbo, ibo) = match existing {
    Some(handler) => (handler.vbo, handler.ibo),

    None => {
      let mut handles: [GLuint; 2] = [0; 2];
      gl::GenBuffers(2, handles.as_mut_ptr());
      (handles[0], handles[1])
    }
  };

  let result = fill_buffers(state, reporter, mesh, vbo, ibo);

  match result {
    Ok(()) => Ok(MeshHandler {
      vbo,
      ibo,
      revision: mesh.revision(),
    }),

    Err(e) => {
      // freshly generated buffers are nobody’s; previously cached ones stay in the table
      if existing.is_none() {
        delete_buffers(state, vbo, ibo);
      }

      Err(e)
    }
  }
}

unsafe fn fill_buffers(
  state: &mut GLState,
  reporter: &mut Reporter,
  mesh: &Mesh,
  vbo: GLuint,
  ibo: GLuint,
) -> Result<(), GraphicError> {
  let usage = usage(mesh);

  state.bind_array_buffer(vbo, Bind::Forced);
  gl::BufferData(
    gl::ARRAY_BUFFER,
    mesh.vertex_size() as GLsizeiptr,
    ptr::null(),
    usage,
  );
  reporter.check("glBufferData")?;

  let mut offset = 0;
  for channel in mesh.channels() {
    let size = channel.size();

    gl::BufferSubData(
      gl::ARRAY_BUFFER,
      offset as GLintptr,
      size as GLsizeiptr,
      channel.data().as_ptr() as *const c_void,
    );
    reporter.check("glBufferSubData")?;

    offset += size;
  }

  state.bind_element_array_buffer(ibo, Bind::Forced);
  gl::BufferData(
    gl::ELEMENT_ARRAY_BUFFER,
    mesh.index_size() as GLsizeiptr,
    mesh.indices().as_ptr() as *const c_void,
    usage,
  );
  reporter.check("glBufferData")
}

/// Delete the buffers of a mesh, forgetting them in the state cache first.
pub(crate) unsafe fn delete_buffers(state: &mut GLState, vbo: GLuint, ibo: GLuint) {
  state.unbind_buffer(vbo);
  state.unbind_buffer(ibo);

  let handles = [vbo, ibo];
  gl::DeleteBuffers(2, handles.as_ptr());
}

#[cfg(test)]
mod tests {
  use super::*;
  use renik::VertexChannel;

  fn mesh() -> Mesh {
    Mesh::new(true)
      .with_channel(VertexChannel::new("position", 2, vec![0.; 6]))
      .with_indices(vec![0, 1, 2])
  }

  fn handler(mesh: &Mesh) -> MeshHandler {
    MeshHandler {
      vbo: 1,
      ibo: 2,
      revision: mesh.revision(),
    }
  }

  #[test]
  fn unknown_mesh_is_uploaded() {
    let table = MeshTable::default();
    assert_eq!(table.plan(&mesh(), false), MeshBinding::Upload(None));
  }

  #[test]
  fn known_mesh_is_cached() {
    let mesh = mesh();
    let mut table = MeshTable::default();
    table.insert(mesh.id(), handler(&mesh));

    assert_eq!(table.plan(&mesh, false), MeshBinding::Cached(handler(&mesh)));
  }

  #[test]
  fn rebind_reuses_buffers() {
    let mesh = mesh();
    let mut table = MeshTable::default();
    table.insert(mesh.id(), handler(&mesh));

    assert_eq!(
      table.plan(&mesh, true),
      MeshBinding::Upload(Some(handler(&mesh)))
    );
  }

  #[test]
  fn modified_mesh_is_reuploaded() {
    let mut mesh = mesh();
    let mut table = MeshTable::default();
    let stale = handler(&mesh);
    table.insert(mesh.id(), stale);

    mesh.set_indices(vec![2, 1, 0]);

    assert_eq!(table.plan(&mesh, false), MeshBinding::Upload(Some(stale)));
  }

  #[test]
  fn identity_not_content_is_the_key() {
    let a = mesh();
    let b = mesh();
    let mut table = MeshTable::default();
    table.insert(a.id(), handler(&a));

    assert_eq!(table.plan(&b, false), MeshBinding::Upload(None));
  }

  #[test]
  fn remove_and_drain() {
    let a = mesh();
    let b = mesh();
    let mut table = MeshTable::default();
    table.insert(a.id(), handler(&a));
    table.insert(b.id(), handler(&b));

    assert!(table.remove(a.id()).is_some());
    assert!(table.remove(a.id()).is_none());
    assert_eq!(table.drain().count(), 1);
    assert_eq!(table.len(), 0);
  }

  #[test]
  fn entries_outlive_dropped_meshes() {
    let mut table = MeshTable::default();
    let id = {
      let mesh = mesh();
      table.insert(mesh.id(), handler(&mesh));
      mesh.id()
    };

    assert_eq!(table.len(), 1);
    assert!(table.remove(id).is_some());
  }

  #[test]
  fn usage_follows_staticness() {
    assert_eq!(usage(&Mesh::new(true)), gl::STATIC_DRAW);
    assert_eq!(usage(&Mesh::new(false)), gl::DYNAMIC_DRAW);
  }
}
