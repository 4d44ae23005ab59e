// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value arithmetic for animated properties.
//!
//! A sequence never does math on its values itself; every phrase delegates to
//! [`Interpolate`]. Scalars and fixed-size `f32` arrays (vectors, RGBA colors)
//! blend linearly, [`Quat`] blends along the short arc.

use serde::{Deserialize, Serialize};

/// A value that can be blended between two endpoints
pub trait Interpolate: Clone {
    /// Blend from `self` (at `t = 0`) to `other` (at `t = 1`).
    ///
    /// `t` may leave `0.0..=1.0` for overshooting eases.
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

/// Linear interpolation between two floats
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Interpolate for f32 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        lerp(*self, *other, t)
    }
}

impl Interpolate for f64 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * f64::from(t)
    }
}

impl<const N: usize> Interpolate for [f32; N] {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        std::array::from_fn(|i| lerp(self[i], other[i], t))
    }
}

/// Rotation quaternion stored as `[x, y, z, w]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat(pub [f32; 4]);

impl Quat {
    /// The identity rotation
    pub const IDENTITY: Self = Self([0.0, 0.0, 0.0, 1.0]);

    /// Rotation of `angle` radians around `axis`
    pub fn from_axis_angle(axis: [f32; 3], angle: f32) -> Self {
        let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if len == 0.0 {
            return Self::IDENTITY;
        }
        let (s, c) = (angle * 0.5).sin_cos();
        let k = s / len;
        Self([axis[0] * k, axis[1] * k, axis[2] * k, c])
    }

    /// Four-component dot product
    pub fn dot(&self, other: &Self) -> f32 {
        let (a, b) = (self.0, other.0);
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
    }

    /// Unit-length copy of this quaternion
    pub fn normalized(&self) -> Self {
        let len = self.dot(self).sqrt();
        if len == 0.0 {
            return Self::IDENTITY;
        }
        let q = self.0;
        Self([q[0] / len, q[1] / len, q[2] / len, q[3] / len])
    }

    /// Spherical linear interpolation along the shorter arc
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let a = self.0;
        let mut b = other.0;
        let mut dot = self.dot(other);

        // q and -q are the same rotation
        if dot < 0.0 {
            b = [-b[0], -b[1], -b[2], -b[3]];
            dot = -dot;
        }

        // Nearly parallel; fall back to nlerp
        if dot > 0.9995 {
            return Self(a.interpolate(&b, t)).normalized();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta = theta.sin();
        let sin_theta_0 = theta_0.sin();

        let s0 = theta.cos() - dot * sin_theta / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        Self([
            a[0] * s0 + b[0] * s1,
            a[1] * s0 + b[1] * s1,
            a[2] * s0 + b[2] * s1,
            a[3] * s0 + b[3] * s1,
        ])
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Interpolate for Quat {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.slerp(other, t)
    }
}
