//! Pulse-and-wobble feedback for the selected mesh.
//!
//! Selecting a mesh enlarges it, shows a popup, and arms a reset timer.
//! Every frame the most recent selection is nudged along Y and Z by a
//! sine term added to its current position. When the timer fires, the
//! mesh's scale returns to one and the popup is cleared. A new selection
//! cancels any pending reset before arming its own, so at most one reset
//! is ever pending.

use glam::Vec3;

use super::timer::OneShotTimer;
use crate::options::SelectionOptions;
use crate::scene::{NodeId, SceneGraph};

/// Popup change requested by the animator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupChange {
    /// Show this text.
    Show(String),
    /// Hide the popup.
    Clear,
}

/// Selection feedback state machine.
#[derive(Debug)]
pub struct SelectionAnimator {
    options: SelectionOptions,
    hovered: Option<NodeId>,
    timer: OneShotTimer<NodeId>,
}

impl SelectionAnimator {
    /// Idle animator.
    #[must_use]
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            options,
            hovered: None,
            timer: OneShotTimer::new(),
        }
    }

    /// Replace the tuning parameters. A pending reset keeps its deadline.
    pub fn set_options(&mut self, options: SelectionOptions) {
        self.options = options;
    }

    /// Mesh currently receiving the per-frame oscillation.
    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Whether a reset is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// When the pending reset fires, on the animator's clock.
    #[must_use]
    pub fn reset_deadline(&self) -> Option<f64> {
        self.timer.deadline()
    }

    /// Start a selection cycle for `node` at `now_ms`.
    ///
    /// A pending reset for an earlier selection is cancelled first. That
    /// mesh keeps its enlarged scale unless `restore_on_supersede` is set.
    /// Returns the popup text to show, or `None` if `node` is not live.
    pub fn select(
        &mut self,
        node: NodeId,
        now_ms: f64,
        scene: &mut SceneGraph,
    ) -> Option<PopupChange> {
        if !scene.contains(node) {
            return None;
        }
        let superseded = self.timer.cancel();
        if let Some(previous) = superseded {
            log::debug!("selection {node} supersedes pending reset of {previous}");
            if self.options.restore_on_supersede && previous != node {
                set_scale(scene, previous, Vec3::ONE);
            }
        }

        let target = scene.node_mut(node)?;
        target.transform.scale = Vec3::splat(self.options.pulse_scale);
        let text = format!("{} selected", target.name);

        self.hovered = Some(node);
        let _ = self.timer.arm(
            now_ms,
            f64::from(self.options.reset_delay_ms),
            node,
        );
        Some(PopupChange::Show(text))
    }

    /// Per-frame step: fire a due reset, then oscillate the hovered mesh.
    ///
    /// Returns [`PopupChange::Clear`] on the frame the reset fires.
    pub fn tick(
        &mut self,
        now_ms: f64,
        scene: &mut SceneGraph,
    ) -> Option<PopupChange> {
        let reset = self.timer.poll(now_ms).map(|node| {
            set_scale(scene, node, Vec3::ONE);
            if self.options.clear_hover_on_reset && self.hovered == Some(node) {
                self.hovered = None;
            }
            PopupChange::Clear
        });

        if let Some(target) = self.hovered.and_then(|id| scene.node_mut(id)) {
            let offset = ((now_ms * self.options.oscillation_frequency).sin()
                as f32)
                * self.options.oscillation_amplitude;
            target.transform.translation.y += offset;
            target.transform.translation.z += offset;
        }

        reset
    }

    /// Teardown: cancel the pending reset without running it and stop
    /// oscillating.
    pub fn unmount(&mut self) {
        if let Some(node) = self.timer.cancel() {
            log::debug!("teardown cancelled pending reset of {node}");
        }
        self.hovered = None;
    }
}

fn set_scale(scene: &mut SceneGraph, node: NodeId, scale: Vec3) {
    if let Some(n) = scene.node_mut(node) {
        n.transform.scale = scale;
    }
}
