use glam::UVec3;

use crate::{
    border::VolumeBorder,
    direction_mask::DirectionMask,
    neighborhood::{BorderDirections, Neighborhood},
    transform::WatershedError,
    union_find::UnionFindArray,
    volume::{VolumeView, VolumeViewMut, voxel_count},
};

/// Labels the basins described by a direction mask volume, as produced by
/// [`prepare_watersheds`](crate::prepare_watersheds).
///
/// Two neighboring voxels belong to the same basin if either of them drains into the other. The
/// volume is scanned once in scan order, merging every voxel with the causal neighbors it is
/// connected to. Afterwards the basins are numbered `1..=K` in the order their first voxel was
/// reached and written to `dest`. Returns `K`.
///
/// # Errors
///
/// Returns an error, without touching `dest`, if
/// - `masks` and `dest` have different shapes,
/// - the volume has more voxels than can be given provisional labels,
/// - `K` does not fit into the label type `L`.
pub fn watershed_labeling<N, L>(
    masks: &impl VolumeView<N::Mask>,
    dest: &mut impl VolumeViewMut<L>,
) -> Result<u32, WatershedError>
where
    N: Neighborhood,
    L: TryFrom<u32> + Copy,
{
    let shape = masks.shape();
    if dest.shape() != shape {
        return Err(WatershedError::ShapeMismatch {
            input: shape,
            output: dest.shape(),
        });
    }
    let voxels = check_label_capacity(shape)?;

    let directions = BorderDirections::<N>::new();
    let mut forest = UnionFindArray::with_capacity(voxels);
    let mut provisional = Vec::with_capacity(voxels);

    for z in 0..shape.z {
        for y in 0..shape.y {
            for x in 0..shape.x {
                let coord = UVec3::new(x, y, z);
                let mask = masks.get(coord);
                let mut current = forest.next_free_label();

                let border = VolumeBorder::classify(coord, shape);
                for &direction in directions.near_border_directions_causal(border) {
                    let neighbor = (coord.as_ivec3() + N::offset(direction)).as_uvec3();
                    // Either we drain into the neighbor or the neighbor drains into us.
                    if mask.contains(N::direction_bit(direction))
                        || masks
                            .get(neighbor)
                            .contains(N::opposite_direction_bit(direction))
                    {
                        let neighbor_label = provisional[scan_index(neighbor, shape)];
                        current = forest.make_union(neighbor_label, current);
                    }
                }
                provisional.push(forest.finalize_label(current));
            }
        }
    }

    let regions = forest.make_contiguous();
    let region_labels = (0..=regions)
        .map(L::try_from)
        .collect::<Result<Vec<L>, _>>()
        .map_err(|_| WatershedError::LabelOverflow {
            region_count: regions,
        })?;

    for z in 0..shape.z {
        for y in 0..shape.y {
            for x in 0..shape.x {
                let coord = UVec3::new(x, y, z);
                let region = forest.region(provisional[scan_index(coord, shape)]);
                dest.set(coord, region_labels[region as usize]);
            }
        }
    }

    Ok(regions)
}

/// Returns the voxel count of `shape` if every voxel can be given its own provisional label.
pub(crate) fn check_label_capacity(shape: UVec3) -> Result<usize, WatershedError> {
    let voxels = voxel_count(shape);
    // Label 0 is reserved and one more label is needed for the tentative entry.
    let max_voxels = u32::MAX as usize - 2;
    if voxels > max_voxels {
        return Err(WatershedError::TooManyVoxels {
            voxel_count: voxels as u64,
            max: max_voxels as u64,
        });
    }
    Ok(voxels)
}

#[inline]
fn scan_index(coord: UVec3, shape: UVec3) -> usize {
    coord.x as usize + shape.x as usize * (coord.y as usize + shape.y as usize * coord.z as usize)
}
