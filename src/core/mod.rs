// Copyright @yucwang 2021

pub mod accelerator;
pub mod buffer;
pub mod camera;
pub mod error;
pub mod film;
pub mod interaction;
pub mod medium;
pub mod rng;
pub mod scene;
pub mod scene_loader;
pub mod shape;
pub mod texture;
pub mod transfer_function;
