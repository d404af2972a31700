// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Interactive 3D supermarket storefront viewer built on wgpu.
//!
//! Shows one of two glTF models (the storefront exterior or the store
//! interior), lets the user orbit, pan, zoom, and step the camera with the
//! keyboard, and reacts to clicks on individual meshes with a pulsing
//! highlight and a "{name} selected" popup.
//!
//! # Key entry points
//!
//! - [`store::Storefront`] - the GPU-free view controller owning all
//!   interactive state
//! - [`engine::StorefrontEngine`] - wgpu rendering around a storefront
//! - [`options::Options`] - runtime configuration (camera, lighting,
//!   selection timing, views, key bindings)
//! - `Viewer` (feature `viewer`) - a ready-made winit window
//! - `startStorefront` (feature `web`) - the browser entry point
//!
//! # Architecture
//!
//! Hosts translate native events into [`InputEvent`]s. The storefront turns
//! them into [`StoreCommand`]s: drags orbit or pan the camera, clicks cast a
//! ray through the scene graph and invoke the nearest mesh's click handler,
//! keys step the camera eye. Model assets load off the main thread (a
//! loader thread natively, `fetch()` in the browser) into a path-keyed
//! template cache, so switching views back and forth parses each asset
//! once.

pub mod animation;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
#[cfg(feature = "gui")]
pub mod gui;
pub mod input;
pub mod loader;
pub mod options;
pub mod picking;
pub mod renderer;
pub mod scene;
pub mod store;
pub mod util;
#[cfg(feature = "viewer")]
mod viewer;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub use engine::StorefrontEngine;
pub use error::StorefrontError;
pub use input::{InputEvent, MouseButton};
pub use store::{LoadStatus, StoreCommand, Storefront, ViewMode};
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
