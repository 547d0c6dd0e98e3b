//! Renderer trait for presentation backends.
//!
//! The engine never draws; it hands a finished [`FrameData`] to whatever
//! implements this trait (the terminal view in `age-term`, a test recorder, ...).

use crate::assets::registry::ShapeRegistry;
use super::drawable::RenderSnapshot;

/// Complete frame data for rendering.
pub struct FrameData<'a> {
    /// Draw commands and status lines for this tick.
    pub snapshot: &'a RenderSnapshot,
    /// Shapes referenced by the draw commands.
    pub assets: &'a ShapeRegistry,
    /// Play field dimensions in cells.
    pub world_width: i32,
    pub world_height: i32,
}

/// Presentation backend.
///
/// # Example Implementation
///
/// ```ignore
/// struct Recorder(Vec<usize>);
///
/// impl Renderer for Recorder {
///     type Error = std::convert::Infallible;
///     fn backend(&self) -> &'static str { "recorder" }
///     fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), Self::Error> {
///         self.0.push(frame.snapshot.drawables.len());
///         Ok(())
///     }
/// }
/// ```
pub trait Renderer {
    type Error;

    /// Backend identifier (e.g., "ascii", "null").
    fn backend(&self) -> &'static str;

    /// Present one frame.
    fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), Self::Error>;
}
