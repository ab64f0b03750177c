use std::ops::*;
use std::fmt;
use num;
use crate::core::mc::Float;
use super::Point3;

pub type Vector3f = Vector3<Float>;

/// A displacement or a photon direction. Directions are kept at unit length.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T
}

impl<T> Vector3<T> {
    #[inline]
    pub fn new(x: T, y: T, z: T) -> Vector3<T> {
        Vector3::<T>{x, y, z}
    }

    #[inline]
    pub fn zero() -> Vector3<T>
    where
    T: num::Zero
    {
        Vector3::<T>{x: T::zero(), y: T::zero(), z: T::zero()}
    }

    /// Calculate the squared length of the Vector3.
    #[inline]
    pub fn length_squared(&self) -> T
    where
    T: Copy + Add<T, Output = T> + Mul<T, Output = T>
    {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Calculate the dot product of two Vector3.
    #[inline]
    pub fn dot(&self, o: &Vector3<T>) -> T
    where
    T: Copy + Add<T, Output = T> + Mul<T, Output = T>
    {
        self.x * o.x + self.y * o.y + self.z * o.z
    }
}

impl Vector3f {
    #[inline]
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Calculate the length of the Vector3.
    #[inline]
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Returns the Vector3 normalized to unit length.
    pub fn normalize(&self) -> Vector3f {
        *self / self.length()
    }

    /// Return the absolute coordinate values for this Vector3
    #[inline]
    pub fn abs(&self) -> Vector3f {
        Vector3f::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Mirror this direction about the plane with unit normal `n`.
    #[inline]
    pub fn reflect(&self, n: &Vector3f) -> Vector3f {
        *self - *n * (2.0 * self.dot(n))
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Index out of range for Vector3"),
        }
    }
}

impl<T> IndexMut<usize> for Vector3<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Index out of range for Vector3"),
        }
    }
}

impl<T> Neg for Vector3<T>
where
T: Neg<Output = T>
{
    type Output = Self;

    fn neg(self) -> Vector3<T> {
        Vector3::<T>{
            x: -self.x,
            y: -self.y,
            z: -self.z
        }
    }
}

impl Div<Float> for Vector3f {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Float) -> Self {
        debug_assert_ne!(rhs, 0.0);
        let inv = 1.0 / rhs;
        Vector3f{
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv
        }
    }
}

impl<T> Mul<T> for Vector3<T>
where
T: Copy + Mul<T, Output = T>
{
    type Output = Self;
    #[inline]
    fn mul(self, rhs: T) -> Self {
        Vector3::<T>{
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs
        }
    }
}

impl Mul<Vector3f> for Float {
    type Output = Vector3f;
    #[inline]
    fn mul(self, rhs: Vector3f) -> Vector3f {
        rhs * self
    }
}

impl<T> MulAssign<T> for Vector3<T>
where
T: Copy + MulAssign
{
    #[inline]
    fn mul_assign(&mut self, rhs: T) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl<T> Add<Vector3<T>> for Vector3<T>
where
T: Add<T, Output = T>
{
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Vector3::<T>{
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z
        }
    }
}

impl<T> AddAssign<Vector3<T>> for Vector3<T>
where
T: AddAssign
{
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl<T> Sub<Vector3<T>> for Vector3<T>
where
T: Sub<T, Output = T>
{
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Vector3::<T>{
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z
        }
    }
}

impl<T> From<Point3<T>> for Vector3<T> {
    fn from(p: Point3<T>) -> Vector3<T> {
        Vector3::<T>{
            x: p.x,
            y: p.y,
            z: p.z
        }
    }
}

impl<T> fmt::Display for Vector3<T>
where
T: fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect() {
        let d = Vector3f::new(0.6, 0.0, -0.8);
        let r = d.reflect(&Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(r, Vector3f::new(0.6, 0.0, 0.8));
    }
}
