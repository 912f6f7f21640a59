// Copyright @yucwang 2026

use crate::math::constants::Float;

use std::ops::{Add, Mul};

/// Piecewise-linear mapping from a scalar intensity to a value. Lookups
/// outside the node range clamp to the first or last node.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction1D<V> {
    nodes: Vec<(Float, V)>,
}

impl<V> TransferFunction1D<V>
where
    V: Copy + Default + Add<Output = V> + Mul<Float, Output = V>,
{
    pub fn new(mut nodes: Vec<(Float, V)>) -> Self {
        nodes.retain(|(x, _)| x.is_finite());
        nodes.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { nodes }
    }

    pub fn constant(value: V) -> Self {
        Self { nodes: vec![(0.0, value)] }
    }

    /// Identity ramp from `(0, zero)` to `(1, one)`.
    pub fn ramp(zero: V, one: V) -> Self {
        Self { nodes: vec![(0.0, zero), (1.0, one)] }
    }

    pub fn nodes(&self) -> &[(Float, V)] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn eval(&self, x: Float) -> V {
        let (first, last) = match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return V::default(),
        };
        if !(x > first.0) {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }

        // First node strictly above x; always in 1..len here.
        let hi = self.nodes.partition_point(|(key, _)| *key <= x);
        let (x0, v0) = self.nodes[hi - 1];
        let (x1, v1) = self.nodes[hi];
        let span = x1 - x0;
        if span <= 0.0 {
            return v1;
        }
        let t = (x - x0) / span;
        v0 * (1.0 - t) + v1 * t
    }
}
