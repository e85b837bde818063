use glam::{IVec3, UVec3};

bitflags::bitflags! {
    /// The faces of a volume a voxel lies on.
    ///
    /// A voxel of a volume that is one voxel thick along an axis lies on both faces of that axis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    #[repr(transparent)]
    pub struct VolumeBorder: u8 {
        /// `x == 0`, no neighbors with a negative x offset.
        const LEFT = 1 << 0;
        /// `x == width - 1`, no neighbors with a positive x offset.
        const RIGHT = 1 << 1;
        /// `y == 0`, no neighbors with a negative y offset.
        const TOP = 1 << 2;
        /// `y == height - 1`, no neighbors with a positive y offset.
        const BOTTOM = 1 << 3;
        /// `z == 0`, no neighbors with a negative z offset.
        const FRONT = 1 << 4;
        /// `z == depth - 1`, no neighbors with a positive z offset.
        const REAR = 1 << 5;
    }
}

impl VolumeBorder {
    /// The number of distinct border classifications.
    pub(crate) const COMBINATIONS: usize = 1 << 6;

    /// Classifies the voxel at `coord` inside a volume of the given `shape`.
    #[inline]
    pub fn classify(coord: UVec3, shape: UVec3) -> Self {
        let mut border = Self::empty();
        border.set(Self::LEFT, coord.x == 0);
        border.set(Self::RIGHT, coord.x + 1 >= shape.x);
        border.set(Self::TOP, coord.y == 0);
        border.set(Self::BOTTOM, coord.y + 1 >= shape.y);
        border.set(Self::FRONT, coord.z == 0);
        border.set(Self::REAR, coord.z + 1 >= shape.z);
        border
    }

    /// Returns `true` if the voxel is not on any face of the volume.
    #[inline]
    pub fn is_interior(self) -> bool {
        self.is_empty()
    }

    /// Returns `true` if stepping by `offset` from a voxel with this classification stays inside the volume.
    ///
    /// `offset` is expected to be a neighbor offset, i.e. every component is in `-1..=1`.
    #[inline]
    pub fn allows(self, offset: IVec3) -> bool {
        let blocked = |negative: Self, positive: Self, step: i32| {
            (step < 0 && self.contains(negative)) || (step > 0 && self.contains(positive))
        };
        !(blocked(Self::LEFT, Self::RIGHT, offset.x)
            || blocked(Self::TOP, Self::BOTTOM, offset.y)
            || blocked(Self::FRONT, Self::REAR, offset.z))
    }
}
