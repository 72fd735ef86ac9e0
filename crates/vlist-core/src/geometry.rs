#![forbid(unsafe_code)]

//! Float geometry shared by scroll surfaces and item layout.
//!
//! Collection views work in logical points. Hosts that render on a pixel
//! grid snap measured heights with [`round_to_pixel_grid`] so that repeated
//! measurements of the same content produce bit-identical values.

use std::ops::{Add, Sub};

/// A 2D vector in logical points (scroll offsets, positions).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vector with only a vertical component.
    #[inline]
    #[must_use]
    pub const fn vertical(y: f32) -> Self {
        Self { x: 0.0, y }
    }

    /// True when both components are finite (not NaN or infinite).
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Copy of `self` with a different `y`.
    #[inline]
    #[must_use]
    pub const fn with_y(self, y: f32) -> Self {
        Self { x: self.x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width/height pair in logical points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// An empty size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    #[inline]
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or NaN.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// True when both dimensions are finite and non-negative.
    #[inline]
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Snap `value` to the nearest device pixel for the given scale.
///
/// A non-positive or non-finite scale leaves the value untouched.
#[inline]
#[must_use]
pub fn round_to_pixel_grid(value: f32, pixels_per_point: f32) -> f32 {
    if !(pixels_per_point.is_finite() && pixels_per_point > 0.0) || !value.is_finite() {
        return value;
    }
    (value * pixels_per_point).round() / pixels_per_point
}
