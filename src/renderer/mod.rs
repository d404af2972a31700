//! Rendering passes: lit meshes, then screen-space overlay quads.

pub mod mesh_pass;
pub mod overlay_pass;
pub(crate) mod pipeline_util;
