pub mod codec;
pub mod display_list;
pub mod interface;
pub mod raster;
pub mod regs;
pub mod renderer;

pub use interface::{BlendFunc, LogicOp, Render, TestFunc, TexEnvMode, TextureWrapMode};
pub use raster::{RasterizedTriangle, Rasterizer};
pub use renderer::{RenderError, Renderer, UploadStatus};
