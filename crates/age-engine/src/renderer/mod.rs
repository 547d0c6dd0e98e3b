pub mod drawable;
pub mod traits;

pub use drawable::{build_draw_list, Drawable, RenderSnapshot};
pub use traits::{FrameData, Renderer};
