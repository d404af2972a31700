//! The view controller.
//!
//! [`Storefront`] owns the interactive state (view mode, selected mesh,
//! popup text) and every GPU-free component: scene graph, asset cache,
//! click-handler registry, camera controller and keyboard rig, ray picker,
//! and selection animator. Hosts feed it input and a millisecond clock;
//! renderers read the scene, camera, and overlay description back out.

mod command;
pub mod overlay;

use std::rc::Rc;
use std::sync::mpsc;

pub use command::StoreCommand;
use glam::Vec2;
pub use overlay::{Banner, BannerKind, OverlayLayout, OverlayState, Rect};

use crate::animation::{PopupChange, SelectionAnimator};
use crate::camera::controller::CameraController;
use crate::camera::rig::{CameraRig, RigBinding};
use crate::input::{InputEvent, InputProcessor};
use crate::loader::{AssetCache, AssetFetcher, AssetState, ModelLoader, MountedModel};
use crate::options::{Options, ViewConfig};
use crate::picking::{ClickHandler, ClickHandlers, PickOutcome, PickerBinding, RayPicker};
use crate::scene::{NodeId, SceneGraph};

/// Identity of the single camera and scene a storefront owns.
const CAMERA_ID: u64 = 1;
const SCENE_ID: u64 = 1;

/// Which model is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Storefront exterior.
    #[default]
    Outside,
    /// Store interior.
    Inside,
}

impl ViewMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Outside => Self::Inside,
            Self::Inside => Self::Outside,
        }
    }

    /// Label of the button that leaves this mode.
    #[must_use]
    pub fn button_label(self) -> &'static str {
        match self {
            Self::Outside => "Enter Market",
            Self::Inside => "Exit Market",
        }
    }
}

/// Load state of the active view's model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The asset is being fetched or parsed.
    Loading,
    /// The model is mounted.
    Ready,
    /// The asset could not be loaded; nothing is mounted.
    Failed(String),
}

/// View controller and owner of all interactive state.
pub struct Storefront {
    options: Options,
    view: ViewMode,
    selected: Option<NodeId>,
    popup: Option<String>,
    status: LoadStatus,

    scene: SceneGraph,
    handlers: ClickHandlers,
    assets: AssetCache,
    mounted: Option<MountedModel>,

    camera: CameraController,
    rig: CameraRig,
    picker: RayPicker,
    animator: SelectionAnimator,
    input: InputProcessor,

    /// Every mesh's click handler reports through this channel.
    on_select: ClickHandler,
    selection_rx: mpsc::Receiver<NodeId>,

    surface: Vec2,
    scale_factor: f32,
    /// Whether clicks on the button rectangle toggle the view (hosts that
    /// draw the button themselves); hosts with a real button turn it off.
    overlay_hit_test: bool,
    now_ms: f64,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("view", &self.view)
            .field("selected", &self.selected)
            .field("popup", &self.popup)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Build the controller for a `width` x `height` surface and start
    /// loading the outside model through `fetcher`.
    #[must_use]
    pub fn new(
        options: Options,
        fetcher: Box<dyn AssetFetcher>,
        width: u32,
        height: u32,
    ) -> Self {
        let (selection_tx, selection_rx) = mpsc::channel();
        let on_select: ClickHandler = Rc::new(move |node: NodeId| {
            let _ = selection_tx.send(node);
        });

        let mut store = Self {
            camera: CameraController::new(&options.camera, width, height),
            rig: CameraRig::new(options.keybindings.clone()),
            picker: RayPicker::new(),
            animator: SelectionAnimator::new(options.selection.clone()),
            input: InputProcessor::new(),
            options,
            view: ViewMode::Outside,
            selected: None,
            popup: None,
            status: LoadStatus::Loading,
            scene: SceneGraph::new(),
            handlers: ClickHandlers::new(),
            assets: AssetCache::new(fetcher),
            mounted: None,
            on_select,
            selection_rx,
            surface: Vec2::new(width as f32, height as f32),
            scale_factor: 1.0,
            overlay_hit_test: true,
            now_ms: 0.0,
        };
        store.mount_listeners(0);
        store.sync_model();
        store
    }

    /// Attach the click and key listeners to surface `surface`. Calling
    /// again with another surface rebinds both; with the same one it is a
    /// no-op.
    pub fn mount_listeners(&mut self, surface: u64) {
        let _ = self.picker.mount(PickerBinding {
            surface,
            camera: CAMERA_ID,
            scene: SCENE_ID,
        });
        let _ = self.rig.mount(RigBinding {
            camera: CAMERA_ID,
            step: self.options.camera.key_step,
        });
    }

    /// Teardown: detach listeners and cancel the pending reset. Input
    /// after this has no effect and no reset fires.
    pub fn unmount(&mut self) {
        let _ = self.picker.unmount();
        let _ = self.rig.unmount();
        self.animator.unmount();
    }

    /// Choose whether clicks on the button rectangle toggle the view.
    pub fn set_overlay_hit_test(&mut self, enabled: bool) {
        self.overlay_hit_test = enabled;
    }

    // ── state ──────────────────────────────────────────────────────────

    /// Current view mode.
    #[must_use]
    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Label of the toggle button.
    #[must_use]
    pub fn button_label(&self) -> &'static str {
        self.view.button_label()
    }

    /// Popup text, if shown.
    #[must_use]
    pub fn popup(&self) -> Option<&str> {
        self.popup.as_deref()
    }

    /// Most recently selected mesh. A reset does not clear it.
    #[must_use]
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// When the pending selection reset fires, on the clock passed to
    /// [`update`](Self::update). Hosts whose frame loop can stall arm a
    /// real timer for it.
    #[must_use]
    pub fn reset_deadline(&self) -> Option<f64> {
        self.animator.reset_deadline()
    }

    /// Load state of the active view's model.
    #[must_use]
    pub fn load_status(&self) -> &LoadStatus {
        &self.status
    }

    /// Model asset, placement, and scale of the active view.
    #[must_use]
    pub fn active_view_config(&self) -> &ViewConfig {
        match self.view {
            ViewMode::Outside => &self.options.views.outside,
            ViewMode::Inside => &self.options.views.inside,
        }
    }

    /// The mounted model, once loaded.
    #[must_use]
    pub fn mounted(&self) -> Option<&MountedModel> {
        self.mounted.as_ref()
    }

    /// Scene graph.
    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Mutable scene graph (the renderer marks it rendered).
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    /// Camera controller.
    #[must_use]
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Apply new options. Camera placement and views are only read at
    /// construction; speeds, selection timing, and key bindings apply
    /// immediately.
    pub fn set_options(&mut self, options: Options) {
        self.camera.apply_options(&options.camera);
        self.animator.set_options(options.selection.clone());
        self.rig.set_bindings(options.keybindings.clone());
        self.options = options;
        let _ = self.rig.mount(RigBinding {
            camera: CAMERA_ID,
            step: self.options.camera.key_step,
        });
    }

    /// Surface size in physical pixels.
    #[must_use]
    pub fn surface_size(&self) -> Vec2 {
        self.surface
    }

    /// Track a new surface size and DPI scale.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.surface = Vec2::new(width as f32, height as f32);
        self.scale_factor = scale_factor;
        self.camera.resize(width, height);
    }

    // ── overlays ───────────────────────────────────────────────────────

    /// What the overlays show this frame. A selection popup takes
    /// precedence over the load-failure banner.
    #[must_use]
    pub fn overlay(&self) -> OverlayState {
        let banner = match (&self.popup, &self.status) {
            (Some(text), _) => Some(Banner {
                text: text.clone(),
                kind: BannerKind::Info,
            }),
            (None, LoadStatus::Failed(_)) => Some(Banner {
                text: format!("Failed to load {}", self.active_view_config().asset_path),
                kind: BannerKind::Error,
            }),
            (None, _) => None,
        };
        OverlayState {
            button_label: self.button_label(),
            banner,
        }
    }

    /// Overlay placement for the current surface and banner.
    #[must_use]
    pub fn overlay_layout(&self) -> OverlayLayout {
        let overlay = self.overlay();
        OverlayLayout::new(
            self.surface,
            self.scale_factor,
            overlay.banner.as_ref().map(|b| b.text.as_str()),
        )
    }

    /// Whether the cursor is over the button rectangle.
    #[must_use]
    pub fn button_hovered(&self) -> bool {
        let (x, y) = self.input.mouse_pos();
        self.overlay_hit_test && self.overlay_layout().button.contains(Vec2::new(x, y))
    }

    // ── input ──────────────────────────────────────────────────────────

    /// Feed a raw input event.
    pub fn handle_input(&mut self, event: InputEvent) {
        if let Some(command) = self.input.handle_event(event) {
            self.execute(command);
        }
    }

    /// Forget held buttons (focus loss).
    pub fn release_input(&mut self) {
        self.input.release_mouse_state();
    }

    /// Run one command.
    pub fn execute(&mut self, command: StoreCommand) {
        match command {
            StoreCommand::RotateCamera { delta } => self.camera.rotate(delta),
            StoreCommand::PanCamera { delta } => self.camera.pan(delta),
            StoreCommand::Zoom { delta } => self.camera.zoom(delta),
            StoreCommand::KeyDown { key } => {
                if self.rig.handle_key(&key, &mut self.camera).is_some() {
                    let eye = self.camera.camera.eye;
                    log::debug!(
                        "key {key}: camera position x={}, y={}, z={}",
                        eye.x,
                        eye.y,
                        eye.z
                    );
                }
            }
            StoreCommand::Click { position } => self.click(position),
            StoreCommand::ToggleView => self.toggle_view(),
        }
    }

    fn click(&mut self, position: Vec2) {
        if self.overlay_hit_test && self.overlay_layout().button.contains(position) {
            self.toggle_view();
            return;
        }
        let outcome = self.picker.handle_click(
            position,
            self.surface,
            &self.camera.camera,
            &self.scene,
            &self.handlers,
        );
        if let PickOutcome::Unhandled(node) = outcome {
            log::debug!("nearest hit {node} has no click handler");
        }
        self.drain_selections();
    }

    /// Apply selections reported by click handlers.
    fn drain_selections(&mut self) {
        while let Ok(node) = self.selection_rx.try_recv() {
            self.select(node);
        }
    }

    /// Select `node` as if its click handler had fired.
    pub fn select(&mut self, node: NodeId) {
        if let Some(PopupChange::Show(text)) =
            self.animator.select(node, self.now_ms, &mut self.scene)
        {
            log::debug!("{text}");
            self.selected = Some(node);
            self.popup = Some(text);
        }
    }

    /// Switch to the other view: unmount the current model and mount the
    /// other one as soon as its template is available.
    pub fn toggle_view(&mut self) {
        self.view = self.view.toggled();
        log::info!(
            "switching to {:?} view ({})",
            self.view,
            self.active_view_config().asset_path
        );

        // The old model's meshes are gone, so its pending reset would have
        // nothing to reset; drop it together with its popup.
        self.animator.unmount();
        self.popup = None;
        self.selected = None;
        if let Some(model) = self.mounted.take() {
            ModelLoader::unmount(&mut self.scene, &mut self.handlers, &model);
        }
        self.sync_model();
    }

    // ── frame ──────────────────────────────────────────────────────────

    /// Per-frame step at `now_ms` on a monotonic millisecond clock: fold in
    /// finished loads, mount the active model when ready, run the
    /// selection animation.
    pub fn update(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        if !self.assets.poll().is_empty() {
            self.sync_model();
        }
        if let Some(PopupChange::Clear) = self.animator.tick(now_ms, &mut self.scene) {
            self.popup = None;
        }
    }

    /// Bring the mounted model and load status in line with the view.
    fn sync_model(&mut self) {
        let config = self.active_view_config().clone();
        match self.assets.request(&config.asset_path) {
            AssetState::Loading => self.status = LoadStatus::Loading,
            AssetState::Failed(reason) => self.status = LoadStatus::Failed(reason),
            AssetState::Ready(template) => {
                if self.mounted.is_none() {
                    self.mounted = ModelLoader::mount(
                        &mut self.scene,
                        &mut self.handlers,
                        &template,
                        &config,
                        &self.on_select,
                    );
                }
                self.status = LoadStatus::Ready;
            }
        }
    }
}

impl Drop for Storefront {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::input::MouseButton;
    use crate::loader::{sample_glb, MemoryFetcher};

    const OUTSIDE: &str = "assets/models/lowpoly_supermarket.glb";
    const INSIDE: &str = "assets/models/multi_supermarket.glb";

    fn store() -> Storefront {
        let fetcher = MemoryFetcher::new()
            .with_asset(OUTSIDE, sample_glb())
            .with_asset(INSIDE, sample_glb());
        let mut s = Storefront::new(Options::default(), Box::new(fetcher), 800, 600);
        s.update(0.0);
        s
    }

    /// Pixel position of a node's world origin.
    fn pixel_of(s: &Storefront, node: NodeId) -> Vec2 {
        let world = s.scene().world_matrix(node).transform_point3(Vec3::ZERO);
        let ndc = s.camera().camera.build_matrix().project_point3(world);
        Vec2::new((ndc.x + 1.0) * 0.5 * 800.0, (1.0 - ndc.y) * 0.5 * 600.0)
    }

    fn click_at(s: &mut Storefront, p: Vec2) {
        s.handle_input(InputEvent::CursorMoved { x: p.x, y: p.y });
        s.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        s.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: false,
        });
    }

    #[test]
    fn starts_outside_and_mounts_when_loaded() {
        let fetcher = MemoryFetcher::new().with_asset(OUTSIDE, sample_glb());
        let mut s = Storefront::new(Options::default(), Box::new(fetcher), 800, 600);
        assert_eq!(s.view(), ViewMode::Outside);
        assert_eq!(s.button_label(), "Enter Market");
        assert_eq!(*s.load_status(), LoadStatus::Loading);
        assert!(s.mounted().is_none());

        s.update(16.0);
        assert_eq!(*s.load_status(), LoadStatus::Ready);
        let model = s.mounted().unwrap();
        assert_eq!(model.source, OUTSIDE);
        assert_eq!(model.meshes.len(), 3);
        let root = s.scene().node(model.root).unwrap();
        assert_eq!(root.transform.scale, Vec3::splat(0.5));
    }

    #[test]
    fn toggle_round_trip_restores_outside() {
        let mut s = store();
        let outside = s.active_view_config().clone();

        s.execute(StoreCommand::ToggleView);
        assert_eq!(s.view(), ViewMode::Inside);
        assert_eq!(s.button_label(), "Exit Market");
        assert_eq!(s.active_view_config().asset_path, INSIDE);
        s.update(16.0);
        let root = s.scene().node(s.mounted().unwrap().root).unwrap();
        assert_eq!(root.transform.translation, Vec3::new(-1.0, -4.0, -1.0));
        assert_eq!(root.transform.scale, Vec3::splat(0.2));

        s.execute(StoreCommand::ToggleView);
        s.update(32.0);
        assert_eq!(s.view(), ViewMode::Outside);
        assert_eq!(s.button_label(), "Enter Market");
        assert_eq!(*s.active_view_config(), outside);
        let model = s.mounted().unwrap();
        assert_eq!(model.source, OUTSIDE);
        let root = s.scene().node(model.root).unwrap();
        assert_eq!(root.transform.translation, Vec3::ZERO);
        assert_eq!(root.transform.scale, Vec3::splat(0.5));
    }

    #[test]
    fn switching_view_replaces_the_model() {
        let mut s = store();
        let first = s.mounted().unwrap().clone();
        s.toggle_view();
        // inside template was never requested, so it is still loading
        assert!(s.mounted().is_none());
        assert!(first.meshes.iter().all(|id| !s.scene().contains(*id)));
        s.update(16.0);
        assert_eq!(s.mounted().unwrap().source, INSIDE);
        assert_eq!(s.scene().visible_meshes(s.scene().root()).len(), 3);
    }

    #[test]
    fn clicking_a_mesh_selects_it() {
        let mut s = store();
        let shelf = s.scene().find_by_name("Shelf_A").unwrap();
        let p = pixel_of(&s, shelf);
        click_at(&mut s, p);

        assert_eq!(s.selected(), Some(shelf));
        assert_eq!(s.popup(), Some("Shelf_A selected"));
        assert_eq!(
            s.scene().node(shelf).unwrap().transform.scale,
            Vec3::splat(1.2)
        );
        assert_eq!(
            s.overlay().banner,
            Some(Banner {
                text: "Shelf_A selected".into(),
                kind: BannerKind::Info
            })
        );
    }

    #[test]
    fn popup_clears_three_seconds_after_selection() {
        let mut s = store();
        let shelf = s.scene().find_by_name("Shelf_A").unwrap();
        s.update(1000.0);
        s.select(shelf);
        s.update(3999.0);
        assert!(s.popup().is_some());
        s.update(4000.0);
        assert_eq!(s.popup(), None);
        assert_eq!(s.selected(), Some(shelf));
        assert_eq!(s.scene().node(shelf).unwrap().transform.scale, Vec3::ONE);
    }

    #[test]
    fn reset_deadline_tracks_the_pending_reset() {
        let mut s = store();
        let shelf = s.scene().find_by_name("Shelf_A").unwrap();
        assert_eq!(s.reset_deadline(), None);

        s.update(250.0);
        s.select(shelf);
        assert_eq!(s.reset_deadline(), Some(3250.0));

        // a single late update fires the reset even without frames between
        s.update(9000.0);
        assert_eq!(s.reset_deadline(), None);
        assert_eq!(s.popup(), None);

        s.select(shelf);
        s.toggle_view();
        assert_eq!(s.reset_deadline(), None);
    }

    #[test]
    fn clicking_empty_space_changes_nothing() {
        let mut s = store();
        click_at(&mut s, Vec2::new(5.0, 5.0));
        assert_eq!(s.selected(), None);
        assert_eq!(s.popup(), None);
    }

    #[test]
    fn button_rectangle_toggles_the_view() {
        let mut s = store();
        click_at(&mut s, Vec2::new(400.0, 516.0));
        assert_eq!(s.view(), ViewMode::Inside);

        s.set_overlay_hit_test(false);
        click_at(&mut s, Vec2::new(400.0, 516.0));
        assert_eq!(s.view(), ViewMode::Inside);
    }

    #[test]
    fn five_w_keys_move_ten_units() {
        let mut s = store();
        for _ in 0..5 {
            s.handle_input(InputEvent::KeyDown { key: "w".into() });
        }
        assert_eq!(s.camera().camera.eye.z, 50.0);
        s.handle_input(InputEvent::KeyDown { key: "x".into() });
        assert_eq!(s.camera().camera.eye, Vec3::new(80.0, 30.0, 50.0));
    }

    #[test]
    fn unmounted_store_ignores_input_and_timers() {
        let mut s = store();
        let shelf = s.scene().find_by_name("Shelf_A").unwrap();
        s.select(shelf);
        s.unmount();

        s.handle_input(InputEvent::KeyDown { key: "w".into() });
        assert_eq!(s.camera().camera.eye.z, 60.0);
        s.update(10_000.0);
        assert_eq!(s.popup(), Some("Shelf_A selected"));
        assert_eq!(
            s.scene().node(shelf).unwrap().transform.scale,
            Vec3::splat(1.2)
        );
    }

    #[test]
    fn load_failure_shows_error_banner() {
        let mut s = Storefront::new(
            Options::default(),
            Box::new(MemoryFetcher::new()),
            800,
            600,
        );
        s.update(0.0);
        assert!(matches!(s.load_status(), LoadStatus::Failed(_)));
        assert!(s.mounted().is_none());
        let banner = s.overlay().banner.unwrap();
        assert_eq!(banner.kind, BannerKind::Error);
        assert_eq!(banner.text, format!("Failed to load {OUTSIDE}"));
    }

    #[test]
    fn key_step_follows_options() {
        let mut s = store();
        let mut options = Options::default();
        options.camera.key_step = 5.0;
        s.set_options(options);
        s.handle_input(InputEvent::KeyDown { key: "d".into() });
        assert_eq!(s.camera().camera.eye.x, 85.0);
    }
}
