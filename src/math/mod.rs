// Copyright @yucwang 2021

pub mod aabb;
pub mod constants;
pub mod ray;
pub mod transform;
pub mod spectrum;
pub mod warp;
