// Copyright @yucwang 2026

pub mod cube;
pub mod disk;
pub mod rectangle;
pub mod sphere;
