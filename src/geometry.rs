//! Geometric utility objects.

use crate::num::BFloat;
use num;
use std::{
    fmt,
    ops::{Index, IndexMut},
};

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Denotes the zonal (x) or meridional (y) dimension of a horizontal grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim2 {
    X = 0,
    Y = 1,
}

impl Dim2 {
    /// Creates an array for iterating over the x- and y-dimensions.
    pub fn slice() -> [Self; 2] {
        [Self::X, Self::Y]
    }

    /// Returns the number of the dimension.
    pub fn num(self) -> usize {
        self as usize
    }

    /// Returns the axis of a `[ydim, xdim]` ordered array that runs along this dimension.
    pub fn array_axis(self) -> usize {
        match self {
            Self::X => 1,
            Self::Y => 0,
        }
    }
}

impl fmt::Display for Dim2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::X => "x",
                Self::Y => "y",
            }
        )
    }
}

use Dim2::{X, Y};

/// Represents any quantity with two dimensional components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct In2D<T>([T; 2]);

impl<T> In2D<T> {
    /// Creates a new 2D quantity given the two components.
    pub fn new(x: T, y: T) -> Self {
        Self([x, y])
    }

    /// Creates a new 2D quantity by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim2) -> T,
    {
        Self::new(create_component(X), create_component(Y))
    }

    /// Creates a new 2D quantity with the given value copied into all components.
    pub fn same(a: T) -> Self
    where
        T: Copy,
    {
        Self([a, a])
    }

    /// Creates a new tuple containing copies of the two components.
    pub fn to_tuple(&self) -> (T, T)
    where
        T: Copy,
    {
        (self[X], self[Y])
    }
}

impl<T> Index<Dim2> for In2D<T> {
    type Output = T;
    fn index(&self, dim: Dim2) -> &Self::Output {
        &self.0[dim as usize]
    }
}

impl<T> IndexMut<Dim2> for In2D<T> {
    fn index_mut(&mut self, dim: Dim2) -> &mut Self::Output {
        &mut self.0[dim as usize]
    }
}

impl<T: fmt::Display> fmt::Display for In2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self[X], self[Y])
    }
}

/// A 2D index `(i, j)` into a horizontal grid, with `i` along x and `j` along y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Idx2<I>(In2D<I>);

impl<I: num::Integer + Copy> Idx2<I> {
    /// Creates a new 2D index given the two components.
    pub fn new(i: I, j: I) -> Self {
        Self(In2D::new(i, j))
    }

    /// Creates a new 2D index with all components set to zero.
    pub fn origin() -> Self {
        Self::new(I::zero(), I::zero())
    }

    /// Creates a new tuple containing the two components.
    pub fn to_tuple(&self) -> (I, I) {
        self.0.to_tuple()
    }
}

impl<I> Index<Dim2> for Idx2<I> {
    type Output = I;
    fn index(&self, dim: Dim2) -> &Self::Output {
        &self.0[dim]
    }
}

impl<I> IndexMut<Dim2> for Idx2<I> {
    fn index_mut(&mut self, dim: Dim2) -> &mut Self::Output {
        &mut self.0[dim]
    }
}

impl<I: fmt::Display> fmt::Display for Idx2<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self[X], self[Y])
    }
}

/// A 2D spatial coordinate (longitude, latitude).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Point2<F>(In2D<F>);

impl<F: BFloat> Point2<F> {
    /// Creates a new 2D point given the two components.
    pub fn new(x: F, y: F) -> Self {
        Self(In2D::new(x, y))
    }
}

impl<F> Index<Dim2> for Point2<F> {
    type Output = F;
    fn index(&self, dim: Dim2) -> &Self::Output {
        &self.0[dim]
    }
}

impl<F> IndexMut<Dim2> for Point2<F> {
    fn index_mut(&mut self, dim: Dim2) -> &mut Self::Output {
        &mut self.0[dim]
    }
}

impl<F: BFloat + fmt::Display> fmt::Display for Point2<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self[X], self[Y])
    }
}

/// A particle position given as longitude, latitude and depth.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Point3<F> {
    pub x: F,
    pub y: F,
    pub z: F,
}

impl<F: BFloat> Point3<F> {
    /// Creates a new 3D point given the three components.
    pub fn new(x: F, y: F, z: F) -> Self {
        Self { x, y, z }
    }
}

impl<F: BFloat + fmt::Display> fmt::Display for Point3<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_axes_follow_row_major_lat_lon_layout() {
        assert_eq!(Dim2::X.array_axis(), 1);
        assert_eq!(Dim2::Y.array_axis(), 0);
    }
}
