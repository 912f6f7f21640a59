// Copyright @yucwang 2021

use crate::core::error::Result;
use crate::core::film::FrameBuffer;
use crate::core::scene::Scene;

pub trait Renderer {
    /// Evaluates one frame into `frame`, blocking until every pixel is done,
    /// and folds it into the running estimate.
    fn render_frame(&self, scene: &mut Scene, frame: &mut FrameBuffer) -> Result<()>;

    fn render(&self, scene: &mut Scene, frame: &mut FrameBuffer, no_frames: u32) -> Result<()> {
        for _ in 0..no_frames {
            self.render_frame(scene, frame)?;
        }
        Ok(())
    }
}
