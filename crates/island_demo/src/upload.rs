//! Stand-in for the GPU side: takes each finished mesh hand-off and records
//! what a renderer would upload for it.

use heightfield::{HeightfieldMesh, MeshChange, Vertex};

/// Byte and call counts for one surface's buffers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadStats {
    /// Full vertex + index buffer uploads.
    pub full_uploads: u32,
    /// Position/normal sub-buffer updates.
    pub patch_uploads: u32,
    pub bytes: usize,
    pub last_revision: u64,
}

impl UploadStats {
    /// Record the upload a renderer would do after `change`.
    ///
    /// Only called once generation or patching has returned, so the arrays seen
    /// here are always complete.
    pub fn upload(&mut self, mesh: &HeightfieldMesh, change: MeshChange) {
        match change {
            MeshChange::Unchanged => return,
            MeshChange::Rebuilt => {
                let vertices = mesh.vertices();
                let vertex_bytes: &[u8] = bytemuck::cast_slice::<Vertex, u8>(&vertices);
                let index_bytes: &[u8] = bytemuck::cast_slice(mesh.indices());
                self.bytes += vertex_bytes.len() + index_bytes.len();
                self.full_uploads += 1;
            }
            MeshChange::Patched => {
                let positions: &[u8] = bytemuck::cast_slice(mesh.positions());
                let normals: &[u8] = bytemuck::cast_slice(mesh.normals());
                self.bytes += positions.len() + normals.len();
                self.patch_uploads += 1;
            }
        }
        self.last_revision = mesh.revision();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_full_and_patch_bytes() {
        let mut mesh = HeightfieldMesh::generate(2, 4.0, |_, _| 0.0).unwrap();
        let mut stats = UploadStats::default();

        stats.upload(&mesh, MeshChange::Rebuilt);
        assert_eq!(stats.bytes, 9 * Vertex::STRIDE + 24 * 4);

        mesh.patch(|_, _| (1.0, heightfield::Vec3::Y));
        stats.upload(&mesh, MeshChange::Patched);
        assert_eq!(stats.bytes, 9 * Vertex::STRIDE + 24 * 4 + 9 * 24);
        assert_eq!(stats.last_revision, 1);

        stats.upload(&mesh, MeshChange::Unchanged);
        assert_eq!((stats.full_uploads, stats.patch_uploads), (1, 1));
    }
}
