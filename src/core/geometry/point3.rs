use std::ops::*;
use std::fmt;
use num;
use crate::core::mc::Float;
use super::Vector3;

pub type Point3f = Point3<Float>;

/// A position in tissue coordinates (mm). z grows into the tissue.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Point3<T> {
    pub x: T,
    pub y: T,
    pub z: T
}

impl<T> Point3<T> {
    pub fn new(x: T, y: T, z: T) -> Point3<T> {
        Point3::<T>{x, y, z}
    }

    /// Create a new Point3 with all components 0.
    pub fn zero() -> Point3<T>
    where
    T: num::Zero
    {
        Point3::<T>{
            x: T::zero(),
            y: T::zero(),
            z: T::zero()
        }
    }
}

impl Point3f {
    #[inline]
    pub fn distance(&self, o: &Point3f) -> Float {
        (*self - *o).length()
    }

    /// Radial distance from the z axis.
    #[inline]
    pub fn rho(&self) -> Float {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
}

impl<T> Index<usize> for Point3<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Index out of range for Point3"),
        }
    }
}

impl<T> IndexMut<usize> for Point3<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Index out of range for Point3"),
        }
    }
}

impl<T> Add<Vector3<T>> for Point3<T>
where
T: Copy + Add<Output = T>
{
    type Output = Point3<T>;
    fn add(self, rhs: Vector3<T>) -> Point3<T> {
        Point3::<T>{
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z
        }
    }
}

impl<T> AddAssign<Vector3<T>> for Point3<T>
where
T: Copy + AddAssign
{
    fn add_assign(&mut self, rhs: Vector3<T>) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl<T> Sub for Point3<T>
where
T: Copy + Sub<Output = T>
{
    type Output = Vector3<T>;
    fn sub(self, rhs: Point3<T>) -> Vector3<T> {
        Vector3::<T>{
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z
        }
    }
}

impl<T> Sub<Vector3<T>> for Point3<T>
where
T: Copy + Sub<Output = T>
{
    type Output = Point3<T>;
    fn sub(self, rhs: Vector3<T>) -> Point3<T> {
        Point3::<T>{
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z
        }
    }
}

impl<T> fmt::Display for Point3<T>
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
    fn test_rho_ignores_depth() {
        let p = Point3f::new(3.0, 4.0, 12.0);
        assert_eq!(p.rho(), 5.0);
        assert_eq!(p.distance(&Point3f::new(3.0, 4.0, 0.0)), 12.0);
    }
}
