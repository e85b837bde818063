use glam::UVec3;

use crate::{
    border::VolumeBorder,
    direction_mask::DirectionMask,
    neighborhood::{BorderDirections, Direction, Neighborhood},
    volume::{Volume, VolumeView},
};

/// The direction masks of every voxel, as produced by [`prepare_watersheds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionField<M> {
    /// For every voxel, the set of neighbor directions it drains into.
    pub masks: Volume<M>,
    /// The number of voxels with an empty mask.
    pub local_minima: u32,
}

impl<M: DirectionMask> DirectionField<M> {
    /// Returns `true` if the voxel at `coord` drains into no neighbor.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is out of bounds.
    #[inline]
    pub fn is_local_minimum(&self, coord: UVec3) -> bool {
        self.masks[coord].is_empty()
    }
}

/// Computes, for every voxel of `input`, the set of neighbor directions leading downhill.
///
/// The neighbors that stay inside the volume are inspected while tracking the lowest value seen so
/// far, starting at the voxel's own value. Voxels on the border of the volume inspect them in
/// direction order, interior voxels in [`Neighborhood::interior_directions`] order.
/// - A neighbor strictly below the lowest value replaces the mask with its own direction.
///   Neighbors that later tie with that lower value are not added, so the first direction reaching
///   the lowest value wins.
///
/// For example, an interior voxel with equally low neighbors to the west and east drains east.
/// - As long as no strictly lower neighbor has been found, every neighbor tied with the voxel's own
///   value is added to the mask. Plateaus are linked this way.
///
/// A voxel whose mask stays empty is a local minimum. Values that cannot be compared (`NaN`) are
/// neither lower than nor equal to anything, so a `NaN` voxel is always a local minimum.
pub fn prepare_watersheds<N, T>(input: &impl VolumeView<T>) -> DirectionField<N::Mask>
where
    N: Neighborhood,
    T: PartialOrd + Copy,
{
    let shape = input.shape();
    let directions = BorderDirections::<N>::new();
    let interior: Vec<Direction> = N::interior_directions().collect();
    let mut local_minima = 0_u32;

    let masks = Volume::from_fn(shape, |coord| {
        let border = VolumeBorder::classify(coord, shape);
        let candidates = if border.is_interior() {
            interior.as_slice()
        } else {
            directions.near_border_directions(border)
        };
        let own = input.get(coord);
        let mut lowest = own;
        let mut mask = <N::Mask as DirectionMask>::EMPTY;
        for &direction in candidates {
            let neighbor = input.get((coord.as_ivec3() + N::offset(direction)).as_uvec3());
            if neighbor < lowest {
                lowest = neighbor;
                mask = N::direction_bit(direction);
            } else if neighbor == own && own == lowest {
                mask.insert(N::direction_bit(direction));
            }
        }
        if mask.is_empty() {
            local_minima += 1;
        }
        mask
    });

    tracing::debug!(
        %shape,
        connectivity = %N::CONNECTIVITY,
        local_minima,
        "Prepared watershed direction masks"
    );

    DirectionField {
        masks,
        local_minima,
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use crate::neighborhood::{SixNeighborhood, TwentySixNeighborhood};

    use super::*;

    type Six = SixNeighborhood;

    fn line(values: &[i32]) -> Volume<i32> {
        Volume::from_vec(UVec3::new(values.len() as u32, 1, 1), values.to_vec()).unwrap()
    }

    fn bit(direction: crate::Direction) -> u8 {
        Six::direction_bit(direction)
    }

    #[test]
    fn strict_minima_have_empty_masks() {
        let volume = Volume::from_vec(UVec3::new(1, 1, 3), vec![1, 5, 1]).unwrap();
        let field = prepare_watersheds::<Six, _>(&volume);
        assert_eq!(field.masks.as_slice(), &[0, bit(Six::IN_FRONT), 0]);
        assert_eq!(field.local_minima, 2);
        assert!(field.is_local_minimum(UVec3::new(0, 0, 0)));
        assert!(!field.is_local_minimum(UVec3::new(0, 0, 1)));
    }

    #[test]
    fn plateau_links_all_tied_neighbors() {
        let volume = Volume::from_vec(UVec3::new(1, 1, 3), vec![5, 5, 5]).unwrap();
        let field = prepare_watersheds::<Six, _>(&volume);
        assert_eq!(
            field.masks.as_slice(),
            &[
                bit(Six::BEHIND),
                bit(Six::IN_FRONT) | bit(Six::BEHIND),
                bit(Six::IN_FRONT)
            ]
        );
        assert_eq!(field.local_minima, 0);
    }

    #[test]
    fn first_lowest_direction_wins() {
        // The middle voxel sees 1 to the west first, the 1 to the east only ties with it.
        let field = prepare_watersheds::<Six, _>(&line(&[1, 5, 1]));
        assert_eq!(field.masks.as_slice(), &[0, bit(Six::WEST), 0]);
    }

    #[test]
    fn lower_neighbor_discards_earlier_ties() {
        // West ties with the voxel, east is strictly lower.
        let field = prepare_watersheds::<Six, _>(&line(&[3, 3, 1]));
        assert_eq!(field.masks[UVec3::new(1, 0, 0)], bit(Six::EAST));
        assert_eq!(field.masks[UVec3::new(0, 0, 0)], bit(Six::EAST));
        assert_eq!(field.local_minima, 1);
    }

    #[test]
    fn ties_after_descent_are_ignored() {
        // East ties with the voxel's own value, but a lower neighbor was already found in the west.
        let field = prepare_watersheds::<Six, _>(&line(&[1, 3, 3]));
        assert_eq!(field.masks[UVec3::new(1, 0, 0)], bit(Six::WEST));
        assert_eq!(field.masks[UVec3::new(2, 0, 0)], bit(Six::WEST));
    }

    #[test]
    fn lowest_of_several_lower_neighbors_is_kept() {
        let volume = Volume::from_fn(UVec3::new(3, 3, 1), |c| match (c.x, c.y) {
            (1, 1) => 9,
            (1, 0) => 4,
            (0, 1) => 2,
            (2, 1) => 7,
            (1, 2) => 2,
            _ => 10,
        });
        let field = prepare_watersheds::<Six, _>(&volume);
        // North (4) is lower first, then west (2) is lower still, south (2) only ties with it.
        assert_eq!(field.masks[UVec3::new(1, 1, 0)], bit(Six::WEST));
    }

    #[test]
    fn diagonal_neighbors_only_count_with_full_connectivity() {
        let volume = Volume::from_fn(UVec3::new(2, 2, 1), |c| if c.x == c.y { 0 } else { 9 });

        let six = prepare_watersheds::<Six, _>(&volume);
        assert_eq!(six.local_minima, 2);

        let twenty_six = prepare_watersheds::<TwentySixNeighborhood, _>(&volume);
        assert_eq!(twenty_six.local_minima, 0);
        // (1, 1) ties with its north-west neighbor (0, 0), direction 9.
        assert_eq!(twenty_six.masks[UVec3::new(1, 1, 0)], 1 << 9);
        // (0, 0) ties with its south-east neighbor (1, 1), direction 16.
        assert_eq!(twenty_six.masks[UVec3::ZERO], 1 << 16);
    }

    /// A 3x3x3 volume whose center sees two equally low neighbors along the x axis.
    fn center_between_two_pits() -> Volume<i32> {
        Volume::from_fn(UVec3::splat(3), |c| match (c.x, c.y, c.z) {
            (1, 1, 1) => 5,
            (0, 1, 1) | (2, 1, 1) => 0,
            _ => 9,
        })
    }

    #[test]
    fn interior_voxels_start_looking_east() {
        let volume = center_between_two_pits();
        let center = UVec3::ONE;

        let six = prepare_watersheds::<Six, _>(&volume);
        assert_eq!(six.masks[center], bit(Six::EAST));

        let twenty_six = prepare_watersheds::<TwentySixNeighborhood, _>(&volume);
        let east = TwentySixNeighborhood::direction_to(IVec3::X).unwrap();
        assert_eq!(
            twenty_six.masks[center],
            TwentySixNeighborhood::direction_bit(east)
        );
    }

    #[test]
    fn border_voxels_keep_direction_order() {
        // The same tie on a face of the volume goes west.
        let volume = Volume::from_fn(UVec3::new(3, 3, 1), |c| match (c.x, c.y) {
            (1, 1) => 5,
            (0, 1) | (2, 1) => 0,
            _ => 9,
        });
        let field = prepare_watersheds::<Six, _>(&volume);
        assert_eq!(field.masks[UVec3::new(1, 1, 0)], bit(Six::WEST));
    }

    #[test]
    fn nan_voxels_are_minima() {
        let volume = Volume::from_vec(UVec3::new(3, 1, 1), vec![2.0, f32::NAN, 1.0]).unwrap();
        let field = prepare_watersheds::<Six, _>(&volume);
        assert_eq!(field.masks.as_slice(), &[0, 0, 0]);
        assert_eq!(field.local_minima, 3);
    }

    #[test]
    fn empty_volume_has_no_minima() {
        let volume = Volume::filled(UVec3::new(0, 3, 3), 0_u8);
        let field = prepare_watersheds::<TwentySixNeighborhood, _>(&volume);
        assert!(field.masks.is_empty());
        assert_eq!(field.local_minima, 0);
    }
}
