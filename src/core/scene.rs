// Copyright @yucwang 2026

use crate::core::camera::Camera;
use crate::core::error::Result;
use crate::core::medium::VolumeMedium;
use crate::core::shape::Shape;
use crate::emitters::area::Light;
use crate::math::aabb::AABB;
use crate::math::spectrum::ColorXYZ;

use std::sync::Arc;

/// An opaque Lambertian surface.
pub struct SceneObject {
    pub shape: Arc<dyn Shape>,
    pub reflectance: ColorXYZ,
    pub name: Option<String>,
}

impl SceneObject {
    pub fn new(shape: Arc<dyn Shape>, reflectance: ColorXYZ) -> Self {
        Self { shape, reflectance, name: None }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn shape(&self) -> &Arc<dyn Shape> {
        &self.shape
    }
}

/// Everything a frame reads. Mutated only through `prepare` and the setters,
/// between frames.
pub struct Scene {
    pub camera: Camera,
    pub volume: Option<VolumeMedium>,
    pub lights: Vec<Light>,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self { camera, volume: None, lights: Vec::new(), objects: Vec::new() }
    }

    pub fn with_volume(mut self, volume: VolumeMedium) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn bounds(&self) -> AABB {
        let mut bounds = AABB::default();
        if let Some(volume) = &self.volume {
            bounds.expand_by_aabb(volume.bounds());
        }
        for light in &self.lights {
            bounds.expand_by_aabb(&light.shape().bounding_box());
        }
        for object in &self.objects {
            bounds.expand_by_aabb(&object.shape.bounding_box());
        }
        bounds
    }

    /// Validates the camera and binds the volume for the next frame.
    pub fn prepare(&mut self) -> Result<()> {
        self.camera.validate()?;
        if let Some(volume) = self.volume.as_mut() {
            volume.prepare()?;
        }
        if self.lights.is_empty() {
            log::warn!("Scene has no lights, only emitters seen directly will contribute");
        }
        log::debug!("Scene prepared: {} lights, {} objects, volume: {}",
                    self.lights.len(), self.objects.len(), self.volume.is_some());
        Ok(())
    }
}
