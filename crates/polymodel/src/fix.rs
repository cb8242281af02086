//! 16.16 fixed-point scalars and vectors.
//!
//! Every coordinate stored in the bytecode is a [`Fix`]. Equality is exact on
//! the raw bits, which is what vertex deduplication relies on. Geometric tests
//! (plane classification, intersection) are done in `f64` through
//! [`FixVec::to_vector`] and converted back with [`FixVec::from_vector`].

use std::fmt;
use std::io::{self, Read, Write};
use std::ops::{Add, Mul, Neg, Sub};

use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use nalgebra::Vector3;

/// A 16.16 fixed-point number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fix(pub i32);

impl Fix {
    pub const ZERO: Fix = Fix(0);
    pub const ONE: Fix = Fix(0x10000);

    /// Converts a float, rounding to the nearest representable value.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Fix((value * 65536.0).round() as i32)
    }

    #[inline]
    pub fn from_int(value: i16) -> Self {
        Fix(i32::from(value) << 16)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }

    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Fix(reader.read_i32::<LE>()?))
    }

    pub fn write<W: Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LE>(self.0)
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl Add for Fix {
    type Output = Fix;

    fn add(self, rhs: Fix) -> Fix {
        Fix(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fix {
    type Output = Fix;

    fn sub(self, rhs: Fix) -> Fix {
        Fix(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Fix {
    type Output = Fix;

    fn neg(self) -> Fix {
        Fix(self.0.wrapping_neg())
    }
}

impl Mul for Fix {
    type Output = Fix;

    fn mul(self, rhs: Fix) -> Fix {
        Fix(((i64::from(self.0) * i64::from(rhs.0)) >> 16) as i32)
    }
}

/// A vector of three [`Fix`] components, `fixvec` on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FixVec {
    pub x: Fix,
    pub y: Fix,
    pub z: Fix,
}

impl FixVec {
    pub const ZERO: FixVec = FixVec {
        x: Fix::ZERO,
        y: Fix::ZERO,
        z: Fix::ZERO,
    };

    /// Size of a `fixvec` in the instruction stream.
    pub const SIZE: usize = 12;

    #[inline]
    pub fn new(x: Fix, y: Fix, z: Fix) -> Self {
        Self { x, y, z }
    }

    /// Builds a vector from float components, rounding each one.
    pub fn from_f64(x: f64, y: f64, z: f64) -> Self {
        Self::new(Fix::from_f64(x), Fix::from_f64(y), Fix::from_f64(z))
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    #[inline]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x.to_f64(), self.y.to_f64(), self.z.to_f64())
    }

    #[inline]
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self::from_f64(v.x, v.y, v.z)
    }

    /// Euclidean distance, computed in floating point.
    pub fn distance(self, other: FixVec) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            x: Fix::read(reader)?,
            y: Fix::read(reader)?,
            z: Fix::read(reader)?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.x.write(writer)?;
        self.y.write(writer)?;
        self.z.write(writer)
    }
}

impl fmt::Display for FixVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add for FixVec {
    type Output = FixVec;

    fn add(self, rhs: FixVec) -> FixVec {
        FixVec::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for FixVec {
    type Output = FixVec;

    fn sub(self, rhs: FixVec) -> FixVec {
        FixVec::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for FixVec {
    type Output = FixVec;

    fn neg(self) -> FixVec {
        FixVec::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_as_decimal() {
        assert_eq!(Fix::from_f64(-1.5).to_string(), "-1.5");
        assert_eq!(FixVec::from_f64(1.0, 0.25, 0.0).to_string(), "(1, 0.25, 0)");
    }

    #[test]
    fn float_conversion_rounds_to_nearest() {
        assert_eq!(Fix::from_f64(1.0), Fix::ONE);
        assert_eq!(Fix::from_f64(-0.5), Fix(-0x8000));
        assert_eq!(Fix::from_f64(1.0 / 131072.0 * 1.2), Fix(1));
        assert_eq!(Fix::from_int(3).to_f64(), 3.0);
    }

    #[test]
    fn multiply_keeps_scale() {
        let half = Fix::from_f64(0.5);
        assert_eq!(half * Fix::from_int(4), Fix::from_int(2));
        assert_eq!(-Fix::ONE * Fix::ONE, -Fix::ONE);
    }

    #[test]
    fn vector_io_is_little_endian() {
        let v = FixVec::new(Fix(1), Fix(-1), Fix::ONE);
        let mut buf = Vec::new();
        v.write(&mut buf).unwrap();
        assert_eq!(buf.len(), FixVec::SIZE);
        assert_eq!(&buf[0..4], &[1, 0, 0, 0]);
        assert_eq!(&buf[4..8], &[0xff, 0xff, 0xff, 0xff]);
        assert_eq!(&buf[8..12], &[0, 0, 1, 0]);

        let read = FixVec::read(&mut &buf[..]).unwrap();
        assert_eq!(read, v);
    }

    #[test]
    fn distance_and_zero() {
        let a = FixVec::from_f64(3.0, 0.0, 0.0);
        let b = FixVec::from_f64(0.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-9);
        assert!((a - a).is_zero());
        assert!(!a.is_zero());
    }
}
