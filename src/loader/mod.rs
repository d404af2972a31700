//! Model loading: parse assets into templates, cache them by path, and
//! mount them into the scene graph with a click handler on every mesh.

mod cache;
mod template;

use std::rc::Rc;
use std::sync::Arc;

use glam::Vec3;
#[cfg(not(target_arch = "wasm32"))]
pub use cache::ThreadFetcher;
pub use cache::{AssetCache, AssetFetcher, AssetState, LoadResult, MemoryFetcher};
pub use template::{ModelTemplate, TemplateNode};

#[cfg(test)]
pub(crate) use template::tests::sample_glb;

use crate::options::ViewConfig;
use crate::picking::{ClickHandler, ClickHandlers};
use crate::scene::{Node, NodeId, SceneGraph, Transform};

/// A template instance living in the scene graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedModel {
    /// Placement group holding the instance.
    pub root: NodeId,
    /// Every mesh node of the instance, each with a click handler.
    pub meshes: Vec<NodeId>,
    /// Asset the instance came from.
    pub source: String,
}

/// Instantiates templates under the scene root and removes them again.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelLoader;

impl ModelLoader {
    /// Copy `template` under a placement group positioned and scaled by
    /// `placement`, attaching `on_select` as the click handler of every
    /// mesh node.
    ///
    /// Returns `None` only if the scene root is gone, which cannot happen
    /// for a graph built with [`SceneGraph::new`].
    pub fn mount(
        scene: &mut SceneGraph,
        handlers: &mut ClickHandlers,
        template: &ModelTemplate,
        placement: &ViewConfig,
        on_select: &ClickHandler,
    ) -> Option<MountedModel> {
        let group = Node::group(
            template.source(),
            Transform::from_translation_scale(
                Vec3::from_array(placement.position),
                Vec3::from_array(placement.scale),
            ),
        );
        let root = scene.add_child(scene.root(), group)?;

        let mut meshes = Vec::new();
        let mut stack: Vec<(usize, NodeId)> =
            template.roots().iter().rev().map(|&i| (i, root)).collect();
        while let Some((index, parent)) = stack.pop() {
            let Some(source) = template.nodes().get(index) else {
                continue;
            };
            let node = match &source.mesh {
                Some(mesh) => Node::mesh(&source.name, source.transform, Arc::clone(mesh)),
                None => Node::group(&source.name, source.transform),
            };
            let Some(id) = scene.add_child(parent, node) else {
                continue;
            };
            if source.mesh.is_some() {
                handlers.attach(id, Rc::clone(on_select));
                meshes.push(id);
            }
            stack.extend(source.children.iter().rev().map(|&c| (c, id)));
        }

        log::info!(
            "mounted {} with {} clickable meshes",
            template.source(),
            meshes.len()
        );
        Some(MountedModel {
            root,
            meshes,
            source: template.source().to_owned(),
        })
    }

    /// Remove a mounted instance and release its click handlers.
    pub fn unmount(
        scene: &mut SceneGraph,
        handlers: &mut ClickHandlers,
        model: &MountedModel,
    ) {
        let removed = scene.remove_subtree(model.root);
        handlers.release(&removed);
        log::info!("unmounted {}", model.source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ModelTemplate {
        ModelTemplate::from_slice("store.glb", &sample_glb()).unwrap()
    }

    fn placement() -> ViewConfig {
        ViewConfig {
            asset_path: "store.glb".into(),
            position: [-1.0, -4.0, -1.0],
            scale: [0.2, 0.2, 0.2],
        }
    }

    #[test]
    fn mount_places_and_tags_every_mesh() {
        let mut scene = SceneGraph::new();
        let mut handlers = ClickHandlers::new();
        let on_select: ClickHandler = Rc::new(|_: NodeId| {});
        let model =
            ModelLoader::mount(&mut scene, &mut handlers, &template(), &placement(), &on_select)
                .unwrap();

        assert_eq!(model.meshes.len(), 3);
        assert_eq!(handlers.len(), 3);
        for id in &model.meshes {
            assert!(handlers.get(*id).is_some());
        }
        let root = scene.node(model.root).unwrap();
        assert_eq!(root.transform.translation, Vec3::new(-1.0, -4.0, -1.0));
        assert_eq!(root.transform.scale, Vec3::splat(0.2));

        let shelf = scene.find_by_name("Shelf_A").unwrap();
        let p = scene.world_matrix(shelf).transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(-1.4, -4.0, -1.0), 1e-5));
    }

    #[test]
    fn handlers_report_the_clicked_mesh() {
        let mut scene = SceneGraph::new();
        let mut handlers = ClickHandlers::new();
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let on_select: ClickHandler = Rc::new(move |id: NodeId| sink.borrow_mut().push(id));
        let model =
            ModelLoader::mount(&mut scene, &mut handlers, &template(), &placement(), &on_select)
                .unwrap();

        let target = model.meshes[1];
        (handlers.get(target).unwrap())(target);
        assert_eq!(*seen.borrow(), vec![target]);
    }

    #[test]
    fn unmount_removes_nodes_and_handlers() {
        let mut scene = SceneGraph::new();
        let mut handlers = ClickHandlers::new();
        let on_select: ClickHandler = Rc::new(|_: NodeId| {});
        let model =
            ModelLoader::mount(&mut scene, &mut handlers, &template(), &placement(), &on_select)
                .unwrap();
        ModelLoader::unmount(&mut scene, &mut handlers, &model);
        assert!(scene.is_empty());
        assert!(handlers.is_empty());
    }

    #[test]
    fn remounting_creates_fresh_ids() {
        let mut scene = SceneGraph::new();
        let mut handlers = ClickHandlers::new();
        let on_select: ClickHandler = Rc::new(|_: NodeId| {});
        let t = template();
        let first =
            ModelLoader::mount(&mut scene, &mut handlers, &t, &placement(), &on_select).unwrap();
        ModelLoader::unmount(&mut scene, &mut handlers, &first);
        let second =
            ModelLoader::mount(&mut scene, &mut handlers, &t, &placement(), &on_select).unwrap();
        assert!(first.meshes.iter().all(|id| !scene.contains(*id)));
        assert_eq!(second.meshes.len(), 3);
        assert_eq!(handlers.len(), 3);
    }
}
