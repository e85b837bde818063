use std::fmt::Debug;

/// An unsigned integer used as a set of neighbor directions, one bit per direction.
///
/// Bit `i` set means that the neighbor in direction `i` is part of the set.
/// An empty mask marks a local minimum.
pub trait DirectionMask: Copy + Eq + Debug + Default + Send + Sync + 'static {
    /// The number of directions this mask can hold.
    const CAPACITY: usize;

    /// The mask containing no direction.
    const EMPTY: Self;

    /// The mask containing only the direction with the given index.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `direction >= Self::CAPACITY`.
    fn bit(direction: u8) -> Self;

    /// Returns `true` if all bits of `bits` are set in `self`.
    fn contains(self, bits: Self) -> bool;

    /// Sets all bits of `bits` in `self`.
    fn insert(&mut self, bits: Self);

    /// Returns `true` if no direction is set.
    #[inline]
    fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

macro_rules! impl_direction_mask {
    ($($ty:ty),*) => {
        $(
            impl DirectionMask for $ty {
                const CAPACITY: usize = <$ty>::BITS as usize;
                const EMPTY: Self = 0;

                #[inline]
                fn bit(direction: u8) -> Self {
                    debug_assert!((direction as usize) < Self::CAPACITY);
                    1 << direction
                }

                #[inline]
                fn contains(self, bits: Self) -> bool {
                    self & bits == bits
                }

                #[inline]
                fn insert(&mut self, bits: Self) {
                    *self |= bits;
                }
            }
        )*
    };
}

impl_direction_mask!(u8, u32);
