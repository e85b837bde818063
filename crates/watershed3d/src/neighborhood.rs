//! Neighbor geometry for the voxel grid.
//!
//! A [`Neighborhood`] fixes the set of neighbor offsets, the bit each direction occupies in a
//! [`DirectionMask`] and the split of the directions into a causal and an anti-causal half.
//!
//! The scan order used throughout the crate visits `z` slowest and `x` fastest. A direction is
//! *causal* if the neighbor it points to has already been visited when the scan reaches the
//! current voxel. The causal directions always come first, so they are `0..CAUSAL_COUNT`,
//! and the opposite of a causal direction is anti-causal.

use std::{fmt, marker::PhantomData};

use glam::IVec3;

use crate::{border::VolumeBorder, direction_mask::DirectionMask};

/// The index of a neighbor direction within a [`Neighborhood`].
///
/// Directions are only handed out by a neighborhood, through its named constants,
/// [`Neighborhood::direction`] and the direction iterators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Direction(u8);

impl Direction {
    #[inline]
    pub(crate) const fn new(index: u8) -> Self {
        Self(index)
    }

    /// The direction as an index into per-direction tables.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The geometry of a neighborhood on the voxel grid.
///
/// Implemented by [`SixNeighborhood`] and [`TwentySixNeighborhood`].
pub trait Neighborhood: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The mask type wide enough to hold one bit per direction.
    type Mask: DirectionMask;

    /// The runtime name of this neighborhood.
    const CONNECTIVITY: Connectivity;

    /// The number of directions.
    const DIRECTION_COUNT: usize;

    /// The number of causal directions. These are the directions `0..CAUSAL_COUNT`.
    const CAUSAL_COUNT: usize;

    /// The unit offset of every direction, indexed by [`Direction::index`].
    const OFFSETS: &'static [IVec3];

    /// The direction an interior voxel starts circulating its neighbors from.
    const INTERIOR_START: Direction;

    /// Returns the direction pointing the other way.
    fn opposite(direction: Direction) -> Direction;

    /// The direction with the given index, `None` if the neighborhood has no such direction.
    #[inline]
    fn direction(index: usize) -> Option<Direction> {
        (index < Self::DIRECTION_COUNT).then(|| Direction::new(index as u8))
    }

    /// Looks up the direction whose offset is `offset`.
    fn direction_to(offset: IVec3) -> Option<Direction> {
        Self::OFFSETS
            .iter()
            .position(|&candidate| candidate == offset)
            .and_then(Self::direction)
    }

    /// The unit offset of `direction` as `(dx, dy, dz)`.
    ///
    /// # Panics
    ///
    /// Panics if `direction` was handed out by a larger neighborhood and does not exist in this one.
    #[inline]
    fn offset(direction: Direction) -> IVec3 {
        Self::OFFSETS[direction.index()]
    }

    /// The bit `direction` occupies in a [`Neighborhood::Mask`].
    ///
    /// # Panics
    ///
    /// Panics if `direction` was handed out by a larger neighborhood and does not exist in this one.
    #[inline]
    fn direction_bit(direction: Direction) -> Self::Mask {
        assert!(
            direction.index() < Self::DIRECTION_COUNT,
            "{direction:?} is not part of a {}-neighborhood",
            Self::CONNECTIVITY
        );
        <Self::Mask as DirectionMask>::bit(direction.0)
    }

    /// The bit of the direction opposite to `direction`.
    #[inline]
    fn opposite_direction_bit(direction: Direction) -> Self::Mask {
        Self::direction_bit(Self::opposite(direction))
    }

    /// Returns `true` if the neighbor in `direction` precedes the current voxel in scan order.
    #[inline]
    fn is_causal(direction: Direction) -> bool {
        direction.index() < Self::CAUSAL_COUNT
    }

    /// All directions in index order.
    fn directions() -> impl Iterator<Item = Direction> {
        (0..Self::DIRECTION_COUNT as u8).map(Direction)
    }

    /// The causal directions, from the first to the last one.
    fn causal_directions() -> impl Iterator<Item = Direction> {
        (0..Self::CAUSAL_COUNT as u8).map(Direction)
    }

    /// The anti-causal directions, in the order of their causal opposites.
    fn anti_causal_directions() -> impl Iterator<Item = Direction> {
        Self::causal_directions().map(Self::opposite)
    }

    /// All directions, starting at [`Neighborhood::INTERIOR_START`] and wrapping around.
    ///
    /// This is the order in which an interior voxel visits its neighbors.
    fn interior_directions() -> impl Iterator<Item = Direction> {
        let count = Self::DIRECTION_COUNT;
        let start = Self::INTERIOR_START.index();
        (0..count).map(move |i| Direction(((start + i) % count) as u8))
    }
}

/// Face connectivity: the 6 neighbors sharing a face with the voxel.
///
/// | index | name    | offset       |
/// |-------|---------|--------------|
/// | 0     | InFront | `(0, 0, -1)` |
/// | 1     | North   | `(0, -1, 0)` |
/// | 2     | West    | `(-1, 0, 0)` |
/// | 3     | Behind  | `(0, 0, 1)`  |
/// | 4     | South   | `(0, 1, 0)`  |
/// | 5     | East    | `(1, 0, 0)`  |
///
/// Interior voxels visit their neighbors starting at East: 5, 0, 1, 2, 3, 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SixNeighborhood;

impl SixNeighborhood {
    /// `(0, 0, -1)`
    pub const IN_FRONT: Direction = Direction(0);
    /// `(0, -1, 0)`
    pub const NORTH: Direction = Direction(1);
    /// `(-1, 0, 0)`
    pub const WEST: Direction = Direction(2);
    /// `(0, 0, 1)`
    pub const BEHIND: Direction = Direction(3);
    /// `(0, 1, 0)`
    pub const SOUTH: Direction = Direction(4);
    /// `(1, 0, 0)`
    pub const EAST: Direction = Direction(5);
}

impl Neighborhood for SixNeighborhood {
    type Mask = u8;
    const CONNECTIVITY: Connectivity = Connectivity::Six;
    const DIRECTION_COUNT: usize = 6;
    const CAUSAL_COUNT: usize = 3;
    const INTERIOR_START: Direction = Self::EAST;
    const OFFSETS: &'static [IVec3] = &[
        IVec3::new(0, 0, -1),
        IVec3::new(0, -1, 0),
        IVec3::new(-1, 0, 0),
        IVec3::new(0, 0, 1),
        IVec3::new(0, 1, 0),
        IVec3::new(1, 0, 0),
    ];

    #[inline]
    fn opposite(direction: Direction) -> Direction {
        Direction((direction.0 + 3) % 6)
    }
}

/// Full connectivity: all 26 voxels of the surrounding 3x3x3 cube.
///
/// Directions are ordered lexicographically by `(dz, dy, dx)`, which is exactly the scan order
/// of the neighbors. Direction 0 is `(-1, -1, -1)`, direction 12 is `(-1, 0, 0)` (the last causal
/// one), direction 13 is `(1, 0, 0)` and direction 25 is `(1, 1, 1)`.
///
/// Interior voxels visit their neighbors starting at direction 13 and wrap around after 25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TwentySixNeighborhood;

impl Neighborhood for TwentySixNeighborhood {
    type Mask = u32;
    const CONNECTIVITY: Connectivity = Connectivity::TwentySix;
    const DIRECTION_COUNT: usize = 26;
    const CAUSAL_COUNT: usize = 13;
    const INTERIOR_START: Direction = Direction(13);
    const OFFSETS: &'static [IVec3] = &[
        // In front
        IVec3::new(-1, -1, -1),
        IVec3::new(0, -1, -1),
        IVec3::new(1, -1, -1),
        IVec3::new(-1, 0, -1),
        IVec3::new(0, 0, -1),
        IVec3::new(1, 0, -1),
        IVec3::new(-1, 1, -1),
        IVec3::new(0, 1, -1),
        IVec3::new(1, 1, -1),
        // Same slice
        IVec3::new(-1, -1, 0),
        IVec3::new(0, -1, 0),
        IVec3::new(1, -1, 0),
        IVec3::new(-1, 0, 0),
        IVec3::new(1, 0, 0),
        IVec3::new(-1, 1, 0),
        IVec3::new(0, 1, 0),
        IVec3::new(1, 1, 0),
        // Behind
        IVec3::new(-1, -1, 1),
        IVec3::new(0, -1, 1),
        IVec3::new(1, -1, 1),
        IVec3::new(-1, 0, 1),
        IVec3::new(0, 0, 1),
        IVec3::new(1, 0, 1),
        IVec3::new(-1, 1, 1),
        IVec3::new(0, 1, 1),
        IVec3::new(1, 1, 1),
    ];

    #[inline]
    fn opposite(direction: Direction) -> Direction {
        Direction(25 - direction.0)
    }
}

const _: () = assert!(SixNeighborhood::DIRECTION_COUNT <= <u8 as DirectionMask>::CAPACITY);
const _: () = assert!(TwentySixNeighborhood::DIRECTION_COUNT <= <u32 as DirectionMask>::CAPACITY);

/// Selects the neighborhood used by [`watershed_transform`](crate::watershed_transform) at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// See [`SixNeighborhood`].
    #[default]
    Six,
    /// See [`TwentySixNeighborhood`].
    TwentySix,
}

impl Connectivity {
    /// The number of neighbors of an interior voxel.
    pub const fn direction_count(self) -> usize {
        match self {
            Connectivity::Six => SixNeighborhood::DIRECTION_COUNT,
            Connectivity::TwentySix => TwentySixNeighborhood::DIRECTION_COUNT,
        }
    }

    /// The number of neighbors of an interior voxel that precede it in scan order.
    pub const fn causal_direction_count(self) -> usize {
        match self {
            Connectivity::Six => SixNeighborhood::CAUSAL_COUNT,
            Connectivity::TwentySix => TwentySixNeighborhood::CAUSAL_COUNT,
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.direction_count())
    }
}

/// The directions of a [`Neighborhood`] that stay inside the volume, for every [`VolumeBorder`].
///
/// Interior voxels use the full direction set. Voxels on a face, edge or corner only see the
/// subset whose offsets do not leave the volume. Both subsets keep the index order of the
/// neighborhood.
#[derive(Debug, Clone)]
pub struct BorderDirections<N: Neighborhood> {
    all: Vec<Vec<Direction>>,
    causal: Vec<Vec<Direction>>,
    _neighborhood: PhantomData<N>,
}

impl<N: Neighborhood> BorderDirections<N> {
    /// Builds the lookup tables for all border classifications.
    pub fn new() -> Self {
        let mut all = Vec::with_capacity(VolumeBorder::COMBINATIONS);
        let mut causal = Vec::with_capacity(VolumeBorder::COMBINATIONS);
        for bits in 0..VolumeBorder::COMBINATIONS {
            let border = VolumeBorder::from_bits_truncate(bits as u8);
            let valid: Vec<Direction> = N::directions()
                .filter(|&direction| border.allows(N::offset(direction)))
                .collect();
            causal.push(
                valid
                    .iter()
                    .copied()
                    .filter(|&direction| N::is_causal(direction))
                    .collect(),
            );
            all.push(valid);
        }
        Self {
            all,
            causal,
            _neighborhood: PhantomData,
        }
    }

    /// All directions that stay inside the volume for a voxel with the given classification.
    #[inline]
    pub fn near_border_directions(&self, border: VolumeBorder) -> &[Direction] {
        &self.all[border.bits() as usize]
    }

    /// The causal directions that stay inside the volume for a voxel with the given classification.
    #[inline]
    pub fn near_border_directions_causal(&self, border: VolumeBorder) -> &[Direction] {
        &self.causal[border.bits() as usize]
    }

    /// The `index`-th valid direction for a voxel with the given classification.
    /// `None` once all valid directions have been enumerated.
    #[inline]
    pub fn near_border_direction(&self, border: VolumeBorder, index: usize) -> Option<Direction> {
        self.near_border_directions(border).get(index).copied()
    }

    /// The `index`-th valid causal direction for a voxel with the given classification.
    /// `None` once all valid causal directions have been enumerated.
    #[inline]
    pub fn near_border_direction_causal(
        &self,
        border: VolumeBorder,
        index: usize,
    ) -> Option<Direction> {
        self.near_border_directions_causal(border).get(index).copied()
    }
}

impl<N: Neighborhood> Default for BorderDirections<N> {
    fn default() -> Self {
        Self::new()
    }
}
