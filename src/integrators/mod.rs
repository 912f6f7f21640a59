// Copyright @yucwang 2026

pub mod intersector;
pub mod raymarching;
pub mod single_scattering;
