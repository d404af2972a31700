//! glTF/GLB parsing into reusable model templates.
//!
//! A template is the node hierarchy of one asset's default scene with its
//! geometry converted to [`MeshData`]. Templates are immutable and shared
//! behind an `Arc`; mounting one copies the hierarchy into the scene graph
//! while the meshes stay shared.

use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::error::StorefrontError;
use crate::scene::{MeshData, Transform};

/// One node of a [`ModelTemplate`].
#[derive(Debug, Clone)]
pub struct TemplateNode {
    /// Node name, falling back to the mesh name, then `node{index}`.
    pub name: String,
    /// Transform relative to the parent.
    pub transform: Transform,
    /// Merged triangle geometry, `None` for group nodes.
    pub mesh: Option<Arc<MeshData>>,
    /// Indices of child nodes within the template.
    pub children: Vec<usize>,
}

/// Parsed, immutable node hierarchy of a model asset.
#[derive(Debug, Clone)]
pub struct ModelTemplate {
    source: String,
    nodes: Vec<TemplateNode>,
    roots: Vec<usize>,
}

impl ModelTemplate {
    /// Parse a `.glb` (or self-contained `.gltf`) held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::AssetLoad`] naming `source` if the bytes
    /// are not a loadable glTF asset.
    pub fn from_slice(source: &str, bytes: &[u8]) -> Result<Self, StorefrontError> {
        let (document, buffers, _images) = gltf::import_slice(bytes)
            .map_err(|e| StorefrontError::asset_load(source, e))?;
        Self::from_document(source, &document, &buffers)
    }

    /// Load from disk. External buffers of a `.gltf` resolve relative to
    /// the file.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::AssetLoad`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, StorefrontError> {
        let source = path.display().to_string();
        let (document, buffers, _images) = gltf::import(path)
            .map_err(|e| StorefrontError::asset_load(&source, e))?;
        Self::from_document(&source, &document, &buffers)
    }

    fn from_document(
        source: &str,
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
    ) -> Result<Self, StorefrontError> {
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| StorefrontError::asset_load(source, "asset has no scene"))?;

        let meshes: Vec<Option<Arc<MeshData>>> = document
            .meshes()
            .map(|mesh| convert_mesh(&mesh, buffers))
            .collect();

        let mut template = Self {
            source: source.to_owned(),
            nodes: Vec::new(),
            roots: Vec::new(),
        };
        for node in scene.nodes() {
            let root = template.push_node(&node, &meshes);
            template.roots.push(root);
        }

        log::info!(
            "parsed {source}: {} nodes, {} meshes",
            template.nodes.len(),
            template.mesh_count()
        );
        Ok(template)
    }

    fn push_node(
        &mut self,
        node: &gltf::Node<'_>,
        meshes: &[Option<Arc<MeshData>>],
    ) -> usize {
        let gltf_mesh = node.mesh();
        let name = node
            .name()
            .or_else(|| gltf_mesh.as_ref().and_then(gltf::Mesh::name))
            .map_or_else(|| format!("node{}", node.index()), str::to_owned);
        let mesh = gltf_mesh.and_then(|m| meshes.get(m.index()).cloned().flatten());

        let (translation, rotation, scale) = node.transform().decomposed();
        let index = self.nodes.len();
        self.nodes.push(TemplateNode {
            name,
            transform: Transform {
                translation: Vec3::from_array(translation),
                rotation: Quat::from_array(rotation),
                scale: Vec3::from_array(scale),
            },
            mesh,
            children: Vec::new(),
        });

        for child in node.children() {
            let child_index = self.push_node(&child, meshes);
            self.nodes[index].children.push(child_index);
        }
        index
    }

    /// Path or URL the template was loaded from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All nodes; roots are listed in [`roots`](Self::roots).
    #[must_use]
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    /// Indices of the scene's top-level nodes.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Number of nodes carrying geometry.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }
}

/// Merge a glTF mesh's triangle primitives into one [`MeshData`]. The
/// first primitive's base color wins.
fn convert_mesh(
    mesh: &gltf::Mesh<'_>,
    buffers: &[gltf::buffer::Data],
) -> Option<Arc<MeshData>> {
    let mut merged: Option<MeshData> = None;
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!(
                "skipping {:?} primitive in mesh {}",
                primitive.mode(),
                mesh.index()
            );
            continue;
        }
        let reader =
            primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let normals = reader.read_normals().map(Iterator::collect);
        let indices = reader.read_indices().map_or_else(
            || (0..positions.len() as u32).collect(),
            |indices| indices.into_u32().collect(),
        );
        let color = primitive.material().pbr_metallic_roughness().base_color_factor();

        let data = MeshData::new(positions, normals, indices, color);
        match merged.as_mut() {
            Some(existing) => existing.append(&data),
            None => merged = Some(data),
        }
    }
    merged.filter(|m| m.triangle_count() > 0).map(Arc::new)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A small GLB: group "Store" with two instances of a named quad mesh
    /// ("Shelf_A", and an unnamed node falling back to the mesh name) and
    /// an unnamed node with an unnamed mesh.
    pub(crate) fn sample_glb() -> Vec<u8> {
        let positions: [[f32; 3]; 4] = [
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0],
        ];
        let indices: [u32; 6] = [0, 1, 2, 0, 2, 3];
        let mut bin = Vec::new();
        for p in positions.iter().flatten() {
            bin.extend_from_slice(&p.to_le_bytes());
        }
        for i in indices {
            bin.extend_from_slice(&i.to_le_bytes());
        }

        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "name": "Store", "children": [1, 2, 3] },
                { "name": "Shelf_A", "mesh": 0, "translation": [-2.0, 0.0, 0.0] },
                { "mesh": 0, "translation": [2.0, 0.0, 0.0] },
                { "mesh": 1, "translation": [0.0, 4.0, 0.0] }
            ],
            "meshes": [
                { "name": "quad", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] },
                { "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }
            ],
            "materials": [
                { "pbrMetallicRoughness": { "baseColorFactor": [0.2, 0.4, 0.6, 1.0] } }
            ],
            "buffers": [{ "byteLength": bin.len() }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 48 },
                { "buffer": 0, "byteOffset": 48, "byteLength": 24 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
                  "min": [-1.0, -1.0, 0.0], "max": [1.0, 1.0, 0.0] },
                { "bufferView": 1, "componentType": 5125, "count": 6, "type": "SCALAR" }
            ]
        });
        let mut json = serde_json::to_vec(&json).unwrap();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2_u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn parses_hierarchy_names_and_meshes() {
        let t = ModelTemplate::from_slice("store.glb", &sample_glb()).unwrap();
        assert_eq!(t.source(), "store.glb");
        assert_eq!(t.roots(), &[0]);
        let names: Vec<&str> = t.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Store", "Shelf_A", "quad", "node3"]);
        assert_eq!(t.nodes()[0].children, vec![1, 2, 3]);
        assert_eq!(t.mesh_count(), 3);
        assert!(t.nodes()[0].mesh.is_none());
    }

    #[test]
    fn converts_geometry_color_and_transform() {
        let t = ModelTemplate::from_slice("store.glb", &sample_glb()).unwrap();
        let shelf = &t.nodes()[1];
        let mesh = shelf.mesh.as_ref().unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.color, [0.2, 0.4, 0.6, 1.0]);
        assert_eq!(mesh.normals.len(), 4);
        assert_eq!(shelf.transform.translation, Vec3::new(-2.0, 0.0, 0.0));

        // default material
        assert_eq!(t.nodes()[3].mesh.as_ref().unwrap().color, [1.0; 4]);
    }

    #[test]
    fn instances_share_mesh_data() {
        let t = ModelTemplate::from_slice("store.glb", &sample_glb()).unwrap();
        let a = t.nodes()[1].mesh.as_ref().unwrap();
        let b = t.nodes()[2].mesh.as_ref().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn garbage_is_an_asset_error_naming_the_path() {
        let err = ModelTemplate::from_slice("broken.glb", b"not a model").unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::AssetLoad { ref path, .. } if path == "broken.glb"
        ));
    }

    #[test]
    fn missing_file_is_an_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelTemplate::load(&dir.path().join("absent.glb")).unwrap_err();
        assert!(matches!(err, StorefrontError::AssetLoad { .. }));
    }
}
