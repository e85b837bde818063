//! The volume module contains the storage abstraction the watershed passes operate on.
//!
//! The algorithms only ever talk to a volume through [`VolumeView`] and [`VolumeViewMut`],
//! so any storage that can answer "what is the value at this coordinate" can be segmented.
//! [`Volume`] is a dense implementation of both traits.

use std::ops::{Index, IndexMut};

use glam::UVec3;
use thiserror::Error;

/// Read access to a dense 3D grid of values.
pub trait VolumeView<T> {
    /// The extent of the volume as `(width, height, depth)` in voxels.
    fn shape(&self) -> UVec3;

    /// Returns the value at `coord`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `coord` is outside of [`VolumeView::shape`].
    fn get(&self, coord: UVec3) -> T;
}

/// Write access to a dense 3D grid of values.
pub trait VolumeViewMut<T>: VolumeView<T> {
    /// Stores `value` at `coord`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `coord` is outside of [`VolumeView::shape`].
    fn set(&mut self, coord: UVec3, value: T);
}

/// A dense 3D array stored in scan order: `x` varies fastest, then `y`, then `z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Volume<T> {
    shape: UVec3,
    data: Vec<T>,
}

impl<T: Clone> Volume<T> {
    /// Creates a volume of the given shape with every voxel set to `value`.
    pub fn filled(shape: UVec3, value: T) -> Self {
        Self {
            shape,
            data: vec![value; voxel_count(shape)],
        }
    }
}

impl<T> Volume<T> {
    /// Creates a volume by evaluating `f` at every coordinate in scan order.
    pub fn from_fn(shape: UVec3, mut f: impl FnMut(UVec3) -> T) -> Self {
        let mut data = Vec::with_capacity(voxel_count(shape));
        for z in 0..shape.z {
            for y in 0..shape.y {
                for x in 0..shape.x {
                    data.push(f(UVec3::new(x, y, z)));
                }
            }
        }
        Self { shape, data }
    }

    /// Wraps scan-ordered `data` into a volume.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not contain exactly `shape.x * shape.y * shape.z` elements.
    pub fn from_vec(shape: UVec3, data: Vec<T>) -> Result<Self, VolumeError> {
        let expected = voxel_count(shape);
        if data.len() != expected {
            return Err(VolumeError::LengthMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// The extent of the volume as `(width, height, depth)` in voxels.
    #[inline]
    pub fn shape(&self) -> UVec3 {
        self.shape
    }

    /// The number of voxels in the volume.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if any of the extents is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if `coord` lies inside the volume.
    #[inline]
    pub fn contains(&self, coord: UVec3) -> bool {
        coord.cmplt(self.shape).all()
    }

    /// The position of `coord` in the scan-ordered backing storage.
    #[inline]
    pub fn linear_index(&self, coord: UVec3) -> usize {
        coord.x as usize
            + self.shape.x as usize * (coord.y as usize + self.shape.y as usize * coord.z as usize)
    }

    /// Returns the value at `coord`. `None` if the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, coord: UVec3) -> Option<&T> {
        if !self.contains(coord) {
            return None;
        }
        self.data.get(self.linear_index(coord))
    }

    /// Returns the value at `coord` mutably. `None` if the coordinate is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, coord: UVec3) -> Option<&mut T> {
        if !self.contains(coord) {
            return None;
        }
        let index = self.linear_index(coord);
        self.data.get_mut(index)
    }

    /// The scan-ordered backing storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the volume, returning the scan-ordered backing storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterates over all voxels in scan order, yielding their coordinate and value.
    pub fn iter(&self) -> impl Iterator<Item = (UVec3, &T)> + '_ {
        let width = self.shape.x.max(1) as usize;
        let height = self.shape.y.max(1) as usize;
        self.data.iter().enumerate().map(move |(i, value)| {
            let x = i % width;
            let y = (i / width) % height;
            let z = i / (width * height);
            (UVec3::new(x as u32, y as u32, z as u32), value)
        })
    }
}

impl<T> Index<UVec3> for Volume<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `coord` is out of bounds.
    #[inline]
    fn index(&self, coord: UVec3) -> &Self::Output {
        assert!(
            self.contains(coord),
            "coordinate {coord} is out of bounds for volume of shape {}",
            self.shape
        );
        &self.data[self.linear_index(coord)]
    }
}

impl<T> IndexMut<UVec3> for Volume<T> {
    /// # Panics
    ///
    /// Panics if `coord` is out of bounds.
    #[inline]
    fn index_mut(&mut self, coord: UVec3) -> &mut Self::Output {
        assert!(
            self.contains(coord),
            "coordinate {coord} is out of bounds for volume of shape {}",
            self.shape
        );
        let index = self.linear_index(coord);
        &mut self.data[index]
    }
}

impl<T: Copy> VolumeView<T> for Volume<T> {
    #[inline]
    fn shape(&self) -> UVec3 {
        self.shape
    }

    #[inline]
    fn get(&self, coord: UVec3) -> T {
        self[coord]
    }
}

impl<T: Copy> VolumeViewMut<T> for Volume<T> {
    #[inline]
    fn set(&mut self, coord: UVec3, value: T) {
        self[coord] = value;
    }
}

#[inline]
pub(crate) fn voxel_count(shape: UVec3) -> usize {
    shape.x as usize * shape.y as usize * shape.z as usize
}

/// Errors that can occur when building a [`Volume`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VolumeError {
    /// Happens when the backing storage does not match the requested shape.
    #[error("Volume of shape {shape} needs {expected} elements, but got {actual}")]
    LengthMismatch {
        /// The requested shape
        shape: UVec3,
        /// The number of elements the shape requires
        expected: usize,
        /// The number of elements that were supplied
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fn_stores_in_scan_order() {
        let volume = Volume::from_fn(UVec3::new(2, 3, 2), |c| c.x + 10 * c.y + 100 * c.z);
        assert_eq!(volume.len(), 12);
        assert_eq!(
            volume.as_slice(),
            &[0, 1, 10, 11, 20, 21, 100, 101, 110, 111, 120, 121]
        );
        assert_eq!(volume[UVec3::new(1, 2, 1)], 121);
        assert_eq!(volume.linear_index(UVec3::new(1, 2, 1)), 11);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let error = Volume::from_vec(UVec3::new(2, 2, 2), vec![0_u8; 7]).unwrap_err();
        assert_eq!(
            error,
            VolumeError::LengthMismatch {
                shape: UVec3::new(2, 2, 2),
                expected: 8,
                actual: 7,
            }
        );
        assert!(Volume::from_vec(UVec3::new(2, 2, 2), vec![0_u8; 8]).is_ok());
    }

    #[test]
    fn get_is_bounds_checked() {
        let mut volume = Volume::filled(UVec3::new(2, 1, 1), 3_u16);
        assert_eq!(volume.get(UVec3::new(1, 0, 0)), Some(&3));
        // Would alias (0, 1, 0) if only the linear index was checked.
        assert_eq!(volume.get(UVec3::new(2, 0, 0)), None);
        assert_eq!(volume.get_mut(UVec3::new(0, 1, 0)), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_panics_out_of_bounds() {
        let volume = Volume::filled(UVec3::new(2, 2, 2), 0_u8);
        let _ = volume[UVec3::new(0, 0, 2)];
    }

    #[test]
    fn iter_yields_coordinates() {
        let volume = Volume::from_fn(UVec3::new(3, 2, 2), |c| c);
        for (coord, value) in volume.iter() {
            assert_eq!(coord, *value);
        }
        assert_eq!(volume.iter().count(), 12);
    }

    #[test]
    fn view_traits_round_trip_through_set() {
        let mut volume = Volume::filled(UVec3::new(2, 2, 2), 0_u32);
        VolumeViewMut::set(&mut volume, UVec3::new(1, 1, 1), 7);
        assert_eq!(VolumeView::get(&volume, UVec3::new(1, 1, 1)), 7);
        assert_eq!(VolumeView::shape(&volume), UVec3::new(2, 2, 2));
    }

    #[test]
    fn empty_shape_has_no_voxels() {
        let volume = Volume::filled(UVec3::new(4, 0, 4), 1.0_f32);
        assert!(volume.is_empty());
        assert_eq!(volume.iter().count(), 0);
    }
}
