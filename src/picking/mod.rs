//! CPU ray picking.
//!
//! A click on the render surface is converted to normalized device
//! coordinates, unprojected into a world-space ray, and intersected with
//! every visible mesh. The nearest mesh's click handler, if it has one, is
//! invoked with that mesh's node id.

mod handlers;
mod picker;
mod ray;

pub use handlers::{ClickHandler, ClickHandlers};
pub use picker::{intersect, Hit, PickOutcome, PickerBinding, RayPicker};
pub use ray::{ndc, Ray};
