// Copyright @yucwang 2021

use crate::core::error::Result;
use crate::core::film::FrameBuffer;
use crate::core::scene::Scene;
use crate::integrators::single_scattering::single_scattering;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;

pub use super::renderer::Renderer;

/// Progressive single-scattering renderer. Rows are spread over the rayon
/// pool; each pixel owns its seeds and output slot exclusively.
pub struct SingleScatteringRenderer {
    show_progress: bool,
}

impl SingleScatteringRenderer {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    fn progress_bar(&self, len: u64, template: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        progress.set_style(
            ProgressStyle::with_template(template)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress
    }
}

impl Renderer for SingleScatteringRenderer {
    fn render_frame(&self, scene: &mut Scene, frame: &mut FrameBuffer) -> Result<()> {
        scene.prepare()?;

        let width = scene.camera.width();
        let height = scene.camera.height();
        frame.resize(width, height)?;

        let scene_ref: &Scene = scene;
        let (seeds1, seeds2, output) = frame.frame_views();
        output
            .par_chunks_mut(width)
            .zip(seeds1.par_chunks_mut(width))
            .zip(seeds2.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, ((row, row_seeds1), row_seeds2))| {
                for x in 0..row.len() {
                    row[x] = single_scattering(scene_ref, x, y, &mut row_seeds1[x], &mut row_seeds2[x]);
                }
            });

        frame.accumulate();
        Ok(())
    }

    fn render(&self, scene: &mut Scene, frame: &mut FrameBuffer, no_frames: u32) -> Result<()> {
        let start = Instant::now();
        let progress = self.progress_bar(no_frames as u64, "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames");

        for _ in 0..no_frames {
            self.render_frame(scene, frame)?;
            progress.inc(1);
        }
        progress.finish_and_clear();

        log::info!("Rendered {} frame(s) at {} x {} in {:.2?} ({} accumulated)",
                   no_frames, frame.width(), frame.height(), start.elapsed(), frame.no_iterations());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;
    use crate::emitters::area::Light;
    use crate::math::constants::Vector3f;
    use crate::math::spectrum::ColorXYZ;
    use crate::math::transform::Transform;
    use crate::shapes::rectangle::Rectangle;
    use std::sync::Arc;

    fn scene() -> Scene {
        let camera = Camera::look_at(Vector3f::zeros(), Vector3f::z(), Vector3f::y(), 40.0, 16, 8);
        let mut scene = Scene::new(camera);
        // Small emitter in the middle of the view.
        let quad = Transform::translate(Vector3f::new(0.0, 0.0, 10.0))
            .compose(&Transform::scale(Vector3f::new(0.5, 0.5, 1.0)));
        scene.add_light(Light::new(Arc::new(Rectangle::new(quad)), ColorXYZ::splat(1.0)));
        scene
    }

    #[test]
    fn test_render_fills_coverage_mask() {
        let mut scene = scene();
        let mut frame = FrameBuffer::new(7);
        let renderer = SingleScatteringRenderer::new(false);
        renderer.render(&mut scene, &mut frame, 2).unwrap();

        assert_eq!(frame.no_iterations(), 2);
        assert_eq!(frame.running_estimate().len(), 16 * 8);

        let center = frame.running_estimate()[4 * 16 + 8];
        assert_eq!(center.a, 1.0);
        let corner = frame.running_estimate()[0];
        assert_eq!(corner.a, 0.0);
        assert_eq!(corner.r, 0.0);
    }

    #[test]
    fn test_frames_advance_seeds() {
        let mut scene = scene();
        let mut frame = FrameBuffer::new(3);
        let renderer = SingleScatteringRenderer::new(false);
        renderer.render_frame(&mut scene, &mut frame).unwrap();
        let before: Vec<u32> = frame.seeds().0.to_vec();
        renderer.render_frame(&mut scene, &mut frame).unwrap();
        assert_ne!(before, frame.seeds().0.to_vec());
    }

    #[test]
    fn test_invalid_camera_is_rejected_before_rendering() {
        let mut scene = scene();
        scene.camera.film_size.x = 0;
        let mut frame = FrameBuffer::new(0);
        let renderer = SingleScatteringRenderer::new(false);
        assert!(renderer.render_frame(&mut scene, &mut frame).is_err());
        assert_eq!(frame.no_iterations(), 0);
    }
}
