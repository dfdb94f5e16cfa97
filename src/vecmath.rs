use serde::{Serialize, Deserialize};

// Basic 2D Vector type (can be replaced with glam::Vec2 if preferred)
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline(always)]
    pub fn new(x: f32, y: f32) -> Self { Self { x, y } }
    #[inline(always)]
    pub fn zero() -> Self { Self::new(0.0, 0.0) }
    #[inline(always)]
    pub fn length_squared(self) -> f32 { self.x * self.x + self.y * self.y }
    #[inline(always)]
    pub fn length(self) -> f32 { self.length_squared().sqrt() }
    #[inline(always)]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x; let dy = self.y - other.y; dx * dx + dy * dy
    }
    #[inline(always)]
    pub fn distance(self, other: Self) -> f32 { self.distance_squared(other).sqrt() }
    #[inline(always)]
    pub fn add(self, other: Self) -> Self { Self::new(self.x + other.x, self.y + other.y) }
    #[inline(always)]
    pub fn sub(self, other: Self) -> Self { Self::new(self.x - other.x, self.y - other.y) }
    #[inline(always)]
    pub fn scale(self, scalar: f32) -> Self { Self::new(self.x * scalar, self.y * scalar) }

    /// Division by a scalar. The caller must guard against a zero divisor.
    #[inline(always)]
    pub fn div(self, scalar: f32) -> Self { Self::new(self.x / scalar, self.y / scalar) }

    /// Normalizes the vector, returning a zero vector if the length is zero or very small.
    /// Force rules rely on this: a degenerate steering vector contributes nothing.
    pub fn normalize_or_zero(self) -> Vec2 {
        let len_sq = self.length_squared();
        if len_sq > 1e-12 { // Use a small epsilon to avoid division by near-zero
            self.scale(1.0 / len_sq.sqrt())
        } else {
            Vec2::zero()
        }
    }
}
