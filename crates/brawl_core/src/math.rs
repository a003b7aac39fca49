//! Fixed-point math utilities for deterministic simulation.
//!
//! All combat math uses fixed-point arithmetic so that two machines
//! fed the same inputs produce bit-identical fights. Floating-point
//! operations can produce different results on different CPUs.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Convert a duration in seconds into whole simulation ticks.
///
/// Rounds to the nearest tick; negative durations clamp to zero and
/// durations past the fixed-point range saturate.
#[must_use]
pub fn seconds_to_ticks(seconds: Fixed, tick_rate: u32) -> u32 {
    if seconds <= Fixed::ZERO {
        return 0;
    }
    let ticks = seconds
        .saturating_mul(Fixed::saturating_from_num(tick_rate))
        .saturating_round();
    u32::try_from(ticks.to_num::<i64>()).unwrap_or(u32::MAX)
}

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for hand-authored decimal values.
///
/// Definition files are written by designers as plain decimals
/// (`damage: 12.5`). The decimal is converted to [`Fixed`] once, at load
/// time, so no floating point ever reaches the simulation.
pub mod decimal_serde {
    use super::Fixed;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_num::<f64>())
    }

    /// Deserialize a decimal into a fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| D::Error::custom(format!("value {value} out of fixed-point range")))
    }
}

/// Serde support for hand-authored decimal vectors, written as `(x, y)`.
pub mod decimal_vec_serde {
    use super::{Fixed, Vec2Fixed};
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a vector as a decimal pair.
    pub fn serialize<S>(value: &Vec2Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (value.x.to_num::<f64>(), value.y.to_num::<f64>()).serialize(serializer)
    }

    /// Deserialize a decimal pair into a vector.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec2Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (x, y) = <(f64, f64)>::deserialize(deserializer)?;
        match (Fixed::checked_from_num(x), Fixed::checked_from_num(y)) {
            (Some(x), Some(y)) => Ok(Vec2Fixed::new(x, y)),
            _ => Err(D::Error::custom(format!(
                "vector ({x}, {y}) out of fixed-point range"
            ))),
        }
    }
}

/// Serde support for optional hand-authored decimal vectors.
pub mod option_decimal_vec_serde {
    use super::{Fixed, Vec2Fixed};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize an optional vector as a decimal pair.
    pub fn serialize<S>(value: &Option<Vec2Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&(v.x.to_num::<f64>(), v.y.to_num::<f64>())),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional decimal pair.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec2Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<(f64, f64)>::deserialize(deserializer)? {
            Some((x, y)) => match (Fixed::checked_from_num(x), Fixed::checked_from_num(y)) {
                (Some(x), Some(y)) => Ok(Some(Vec2Fixed::new(x, y))),
                _ => Err(D::Error::custom(format!(
                    "vector ({x}, {y}) out of fixed-point range"
                ))),
            },
            None => Ok(None),
        }
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Unit vector pointing right (+X).
    pub const RIGHT: Self = Self {
        x: Fixed::ONE,
        y: Fixed::ZERO,
    };

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Multiply both components by a scalar, saturating at the range limits.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x.saturating_mul(factor), self.y.saturating_mul(factor))
    }

    /// Divide both components by a scalar, saturating at the range limits.
    ///
    /// Division by zero yields the vector unchanged.
    #[must_use]
    pub fn div_scalar(self, divisor: Fixed) -> Self {
        if divisor == Fixed::ZERO {
            return self;
        }
        Self::new(
            self.x.saturating_div(divisor),
            self.y.saturating_div(divisor),
        )
    }

    /// Negate the X component.
    #[must_use]
    pub fn mirror_x(self) -> Self {
        Self::new(self.x.saturating_neg(), self.y)
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len_sq = self.dot(self);

        if len_sq == Fixed::ZERO {
            return Self::ZERO;
        }

        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }
}

/// Computes the square root of a fixed-point number using binary search.
fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..32 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
        }
    }
}

impl std::ops::AddAssign for Vec2Fixed {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

/// Axis-aligned box described by its center and full size.
///
/// Used for both hitboxes and hurtboxes. Boxes that merely touch along
/// an edge do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Center of the box in world space.
    pub center: Vec2Fixed,
    /// Full width and height.
    pub size: Vec2Fixed,
}

impl Aabb {
    /// Create a box from its center and full size.
    #[must_use]
    pub const fn new(center: Vec2Fixed, size: Vec2Fixed) -> Self {
        Self { center, size }
    }

    /// Half extents of the box.
    #[must_use]
    pub fn half_extents(&self) -> Vec2Fixed {
        self.size.div_scalar(Fixed::from_num(2))
    }

    /// Strict overlap test on both axes.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a = self.half_extents();
        let b = other.half_extents();
        let dx = (self.center.x - other.center.x).abs();
        let dy = (self.center.y - other.center.y).abs();
        dx < a.x + b.x && dy < a.y + b.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a, b);

        let result1 = a * Fixed::from_num(7);
        let result2 = b * Fixed::from_num(7);
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_seconds_to_ticks() {
        assert_eq!(seconds_to_ticks(Fixed::from_num(0.1), 60), 6);
        assert_eq!(seconds_to_ticks(Fixed::from_num(2), 60), 120);
        assert_eq!(seconds_to_ticks(Fixed::from_num(0.5), 60), 30);
        assert_eq!(seconds_to_ticks(Fixed::ZERO, 60), 0);
        assert_eq!(seconds_to_ticks(Fixed::from_num(-1), 60), 0);
    }

    #[test]
    fn test_seconds_to_ticks_saturates() {
        let huge = Fixed::from_num(100_000_000);
        assert!(seconds_to_ticks(huge, 60) >= u32::MAX / 2);
        assert!(seconds_to_ticks(Fixed::MAX, u32::MAX) >= u32::MAX / 2);
    }

    #[test]
    fn test_vec2_scale_and_mirror() {
        let v = Vec2Fixed::from_ints(2, -3).scale(Fixed::from_num(2));
        assert_eq!(v, Vec2Fixed::from_ints(4, -6));
        assert_eq!(v.mirror_x(), Vec2Fixed::from_ints(-4, -6));
        assert_eq!(v.div_scalar(Fixed::ZERO), v);
    }

    #[test]
    fn test_vec2_ops_saturate() {
        let big = Vec2Fixed::new(Fixed::MAX, Fixed::MIN);
        assert_eq!(big.scale(Fixed::from_num(4)), big);
        assert_eq!(big.div_scalar(Fixed::from_num(0.001)), big);
        assert_eq!(big + big, big);
        assert_eq!(
            big - Vec2Fixed::new(Fixed::MIN, Fixed::MAX),
            big
        );
    }

    #[test]
    fn test_vec2_normalize() {
        let v = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(4));
        let norm = v.normalize();

        let len_sq = norm.dot(norm);
        let one = Fixed::from_num(1);
        let epsilon = one / Fixed::from_num(10000);
        assert!(
            (len_sq - one).abs() < epsilon,
            "normalized vector length² should be ~1, got {:?}",
            len_sq
        );
        assert_eq!(Vec2Fixed::ZERO.normalize(), Vec2Fixed::ZERO);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2Fixed::ZERO, Vec2Fixed::from_ints(2, 2));
        let b = Aabb::new(Vec2Fixed::from_ints(1, 1), Vec2Fixed::from_ints(2, 2));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        // Touching edges do not count
        let c = Aabb::new(Vec2Fixed::from_ints(2, 0), Vec2Fixed::from_ints(2, 2));
        assert!(!a.overlaps(&c));

        let far = Aabb::new(Vec2Fixed::from_ints(10, 0), Vec2Fixed::from_ints(2, 2));
        assert!(!a.overlaps(&far));
    }

    #[test]
    fn test_decimal_serde_roundtrip_through_ron() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "decimal_serde")]
            value: Fixed,
            #[serde(with = "decimal_vec_serde")]
            vec: Vec2Fixed,
        }

        let parsed: Wrapper = ron::from_str("(value: 1.5, vec: (2.0, -0.5))").unwrap();
        assert_eq!(parsed.value, Fixed::from_num(1.5));
        assert_eq!(parsed.vec, Vec2Fixed::new(Fixed::from_num(2), Fixed::from_num(-0.5)));
    }
}
