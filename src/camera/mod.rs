//! Camera system for 3D scene viewing.
//!
//! Provides an orbital camera with rotation, panning, and zoom, keyboard
//! stepping of the eye, and the GPU uniform binding.

/// GPU uniform buffer and bind group for the camera.
pub mod binding;
/// Orbital camera controller managing rotation, pan, and zoom.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
/// Keyboard-driven eye stepping.
pub mod rig;
