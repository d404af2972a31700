use glam::{Vec2, Vec3};

use super::handlers::ClickHandlers;
use super::ray::{ndc, Ray};
use crate::camera::core::Camera;
use crate::input::{BindOutcome, ListenerSlot};
use crate::scene::{NodeId, SceneGraph};

/// A ray/mesh intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Mesh node that was hit.
    pub node: NodeId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
}

/// Every visible mesh under `root` the ray crosses, nearest first. Each
/// mesh contributes at most its nearest hit.
#[must_use]
pub fn intersect(scene: &SceneGraph, ray: &Ray, root: NodeId) -> Vec<Hit> {
    let mut hits: Vec<Hit> = scene
        .visible_meshes(root)
        .into_iter()
        .filter_map(|id| {
            let mesh = scene.node(id)?.mesh.as_ref()?;
            // Tiny but invertible placements (cm-unit models scaled down)
            // stay pickable; only a singular matrix is skipped.
            let inverse = scene.world_matrix(id).inverse();
            if !inverse.is_finite() {
                return None;
            }
            let local = ray.transformed(&inverse);
            let t = mesh.raycast(local.origin, local.dir)?;
            Some(Hit {
                node: id,
                distance: t,
                point: ray.at(t),
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Identities the click listener depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerBinding {
    /// Render surface the listener is attached to.
    pub surface: u64,
    /// Camera rays are cast from.
    pub camera: u64,
    /// Scene rays are cast into.
    pub scene: u64,
}

/// What a click resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// The picker is unmounted or the click fell outside the surface.
    Ignored,
    /// The ray hit nothing.
    Missed,
    /// The nearest hit has no click handler; nothing was invoked.
    Unhandled(NodeId),
    /// The nearest hit's handler was invoked.
    Handled(NodeId),
}

/// Resolves clicks on the render surface to the nearest mesh and invokes
/// that mesh's click handler.
#[derive(Debug)]
pub struct RayPicker {
    listener: ListenerSlot<PickerBinding>,
}

impl Default for RayPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl RayPicker {
    /// An unmounted picker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listener: ListenerSlot::new("ray picker"),
        }
    }

    /// Attach the click listener for `binding`, replacing one bound to
    /// different identities.
    pub fn mount(&mut self, binding: PickerBinding) -> BindOutcome {
        self.listener.bind(binding)
    }

    /// Detach the click listener.
    pub fn unmount(&mut self) -> bool {
        self.listener.unbind()
    }

    /// Whether the click listener is attached.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.listener.is_bound()
    }

    /// Cast a ray through `pixel` and invoke the nearest hit's handler.
    ///
    /// Only the nearest hit is considered: if it has no handler the click
    /// does nothing, even when a mesh behind it has one.
    pub fn handle_click(
        &self,
        pixel: Vec2,
        surface: Vec2,
        camera: &Camera,
        scene: &SceneGraph,
        handlers: &ClickHandlers,
    ) -> PickOutcome {
        if !self.is_mounted() {
            return PickOutcome::Ignored;
        }
        let inside = pixel.cmpge(Vec2::ZERO).all() && pixel.cmple(surface).all();
        if !inside || surface.min_element() <= 0.0 {
            return PickOutcome::Ignored;
        }

        let ray = Ray::from_camera(camera, ndc(pixel, surface));
        let Some(nearest) = intersect(scene, &ray, scene.root()).first().copied()
        else {
            return PickOutcome::Missed;
        };

        match handlers.get(nearest.node) {
            Some(handler) => {
                log::debug!(
                    "picked {} at distance {:.3}",
                    nearest.node,
                    nearest.distance
                );
                handler(nearest.node);
                PickOutcome::Handled(nearest.node)
            }
            None => PickOutcome::Unhandled(nearest.node),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::camera::controller::CameraController;
    use crate::options::CameraOptions;
    use crate::scene::{unit_cube, MeshData, Node, Transform};

    const SURFACE: Vec2 = Vec2::new(800.0, 600.0);
    const CENTER: Vec2 = Vec2::new(400.0, 300.0);

    fn camera() -> Camera {
        CameraController::new(&CameraOptions::default(), 800, 600).camera
    }

    fn mounted() -> RayPicker {
        let mut picker = RayPicker::new();
        let _ = picker.mount(PickerBinding {
            surface: 1,
            camera: 1,
            scene: 1,
        });
        picker
    }

    fn cube_at(scene: &mut SceneGraph, name: &str, at: Vec3) -> NodeId {
        scene
            .add_child(
                scene.root(),
                Node::mesh(
                    name,
                    Transform::from_translation_scale(at, Vec3::ONE),
                    Arc::new(unit_cube()),
                ),
            )
            .unwrap()
    }

    fn recording(handlers: &mut ClickHandlers, node: NodeId) -> Rc<RefCell<Vec<NodeId>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        handlers.attach(node, Rc::new(move |id: NodeId| sink.borrow_mut().push(id)));
        log
    }

    #[test]
    fn empty_scene_misses() {
        let scene = SceneGraph::new();
        let outcome = mounted().handle_click(
            CENTER,
            SURFACE,
            &camera(),
            &scene,
            &ClickHandlers::new(),
        );
        assert_eq!(outcome, PickOutcome::Missed);
    }

    #[test]
    fn nearest_mesh_handler_fires_once() {
        let mut scene = SceneGraph::new();
        let far = cube_at(&mut scene, "far", Vec3::ZERO);
        let near = cube_at(&mut scene, "near", Vec3::new(24.0, 9.0, 18.0));
        let mut handlers = ClickHandlers::new();
        let far_log = recording(&mut handlers, far);
        let near_log = recording(&mut handlers, near);

        let outcome =
            mounted().handle_click(CENTER, SURFACE, &camera(), &scene, &handlers);
        assert_eq!(outcome, PickOutcome::Handled(near));
        assert_eq!(*near_log.borrow(), vec![near]);
        assert!(far_log.borrow().is_empty());
    }

    #[test]
    fn intersect_sorts_nearest_first() {
        let mut scene = SceneGraph::new();
        let far = cube_at(&mut scene, "far", Vec3::ZERO);
        let near = cube_at(&mut scene, "near", Vec3::new(24.0, 9.0, 18.0));
        let ray = Ray::from_camera(&camera(), Vec2::ZERO);
        let hits = intersect(&scene, &ray, scene.root());
        assert_eq!(hits.iter().map(|h| h.node).collect::<Vec<_>>(), vec![near, far]);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn nearest_without_handler_does_nothing() {
        let mut scene = SceneGraph::new();
        let far = cube_at(&mut scene, "far", Vec3::ZERO);
        let near = cube_at(&mut scene, "near", Vec3::new(24.0, 9.0, 18.0));
        let mut handlers = ClickHandlers::new();
        let far_log = recording(&mut handlers, far);

        let outcome =
            mounted().handle_click(CENTER, SURFACE, &camera(), &scene, &handlers);
        assert_eq!(outcome, PickOutcome::Unhandled(near));
        assert!(far_log.borrow().is_empty());
    }

    #[test]
    fn hidden_meshes_are_not_picked() {
        let mut scene = SceneGraph::new();
        let cube = cube_at(&mut scene, "cube", Vec3::ZERO);
        scene.node_mut(cube).unwrap().visible = false;
        let outcome = mounted().handle_click(
            CENTER,
            SURFACE,
            &camera(),
            &scene,
            &ClickHandlers::new(),
        );
        assert_eq!(outcome, PickOutcome::Missed);
    }

    #[test]
    fn clicks_outside_surface_or_unmounted_are_ignored() {
        let mut scene = SceneGraph::new();
        let cube = cube_at(&mut scene, "cube", Vec3::ZERO);
        let mut handlers = ClickHandlers::new();
        let log = recording(&mut handlers, cube);

        let mut picker = mounted();
        assert_eq!(
            picker.handle_click(
                Vec2::new(900.0, 300.0),
                SURFACE,
                &camera(),
                &scene,
                &handlers
            ),
            PickOutcome::Ignored
        );
        assert!(picker.unmount());
        assert_eq!(
            picker.handle_click(CENTER, SURFACE, &camera(), &scene, &handlers),
            PickOutcome::Ignored
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn scaled_parent_is_respected() {
        let mut scene = SceneGraph::new();
        let group = scene
            .add_child(
                scene.root(),
                Node::group(
                    "model",
                    Transform::from_translation_scale(Vec3::ZERO, Vec3::splat(0.5)),
                ),
            )
            .unwrap();
        let cube = scene
            .add_child(
                group,
                Node::mesh("cube", Transform::IDENTITY, Arc::new(unit_cube())),
            )
            .unwrap();
        let ray = Ray::from_camera(&camera(), Vec2::ZERO);
        let hits = intersect(&scene, &ray, scene.root());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, cube);
        // the hit point lies on the half-size cube's surface
        assert!(hits[0].point.abs().max_element() <= 0.25 + 1e-3);
    }

    #[test]
    fn small_scale_nested_model_is_pickable() {
        // placement 0.2, centimetre root 0.01, 500-unit mesh: 1 unit in world
        let mut scene = SceneGraph::new();
        let placement = scene
            .add_child(
                scene.root(),
                Node::group(
                    "model",
                    Transform::from_translation_scale(Vec3::ZERO, Vec3::splat(0.2)),
                ),
            )
            .unwrap();
        let root_node = scene
            .add_child(
                placement,
                Node::group(
                    "RootNode",
                    Transform::from_translation_scale(Vec3::ZERO, Vec3::splat(0.01)),
                ),
            )
            .unwrap();
        let cube = unit_cube();
        let positions = cube
            .positions
            .iter()
            .map(|p| (Vec3::from_array(*p) * 500.0).to_array())
            .collect();
        let shelf = scene
            .add_child(
                root_node,
                Node::mesh(
                    "shelf",
                    Transform::IDENTITY,
                    Arc::new(MeshData::new(positions, None, cube.indices, cube.color)),
                ),
            )
            .unwrap();
        assert!(scene.world_matrix(shelf).determinant() < 1e-8);

        let mut handlers = ClickHandlers::new();
        let log = recording(&mut handlers, shelf);
        let outcome =
            mounted().handle_click(CENTER, SURFACE, &camera(), &scene, &handlers);
        assert_eq!(outcome, PickOutcome::Handled(shelf));
        assert_eq!(*log.borrow(), vec![shelf]);

        let ray = Ray::from_camera(&camera(), Vec2::ZERO);
        let hits = intersect(&scene, &ray, scene.root());
        assert_eq!(hits.len(), 1);
        assert!(hits[0].point.abs().max_element() <= 0.5 + 1e-3);
    }
}
