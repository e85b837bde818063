use glam::UVec3;
use thiserror::Error;

use crate::{
    labeling::{check_label_capacity, watershed_labeling},
    neighborhood::{Connectivity, Neighborhood, SixNeighborhood, TwentySixNeighborhood},
    prepare::prepare_watersheds,
    volume::{VolumeView, VolumeViewMut},
};

/// Segments `source` into watershed basins and writes their labels to `dest`.
///
/// `source` is interpreted as a boundary indicator such as a gradient magnitude: every local
/// minimum seeds a basin, and every other voxel joins the basin of the neighbor it drains into.
/// `connectivity` decides which voxels count as neighbors.
///
/// Returns the number of basins `K`. Afterwards `dest` holds exactly the labels `1..=K`.
///
/// # Errors
///
/// Returns an error before doing any work if `source` and `dest` have different shapes or the
/// volume is too large to be labeled, and before writing any label if `K` does not fit into `L`.
pub fn watershed_transform<T, L>(
    source: &impl VolumeView<T>,
    dest: &mut impl VolumeViewMut<L>,
    connectivity: Connectivity,
) -> Result<u32, WatershedError>
where
    T: PartialOrd + Copy,
    L: TryFrom<u32> + Copy,
{
    match connectivity {
        Connectivity::Six => transform_with::<SixNeighborhood, _, _>(source, dest),
        Connectivity::TwentySix => transform_with::<TwentySixNeighborhood, _, _>(source, dest),
    }
}

/// [`watershed_transform`] with [`Connectivity::Six`].
///
/// # Errors
///
/// See [`watershed_transform`].
pub fn watersheds_six<T, L>(
    source: &impl VolumeView<T>,
    dest: &mut impl VolumeViewMut<L>,
) -> Result<u32, WatershedError>
where
    T: PartialOrd + Copy,
    L: TryFrom<u32> + Copy,
{
    watershed_transform(source, dest, Connectivity::Six)
}

/// [`watershed_transform`] with [`Connectivity::TwentySix`].
///
/// # Errors
///
/// See [`watershed_transform`].
pub fn watersheds_twenty_six<T, L>(
    source: &impl VolumeView<T>,
    dest: &mut impl VolumeViewMut<L>,
) -> Result<u32, WatershedError>
where
    T: PartialOrd + Copy,
    L: TryFrom<u32> + Copy,
{
    watershed_transform(source, dest, Connectivity::TwentySix)
}

fn transform_with<N, T, L>(
    source: &impl VolumeView<T>,
    dest: &mut impl VolumeViewMut<L>,
) -> Result<u32, WatershedError>
where
    N: Neighborhood,
    T: PartialOrd + Copy,
    L: TryFrom<u32> + Copy,
{
    let shape = source.shape();
    if dest.shape() != shape {
        return Err(WatershedError::ShapeMismatch {
            input: shape,
            output: dest.shape(),
        });
    }
    check_label_capacity(shape)?;

    // The mask width follows from the neighborhood: 8 bits for 6 directions, 32 bits for 26.
    let field = prepare_watersheds::<N, T>(source);
    let regions = watershed_labeling::<N, L>(&field.masks, dest)?;

    tracing::debug!(
        %shape,
        connectivity = %N::CONNECTIVITY,
        local_minima = field.local_minima,
        regions,
        "Computed watershed transform"
    );
    Ok(regions)
}

/// Errors that can occur during [`watershed_transform`] and [`watershed_labeling`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatershedError {
    /// Happens when the input and output volumes differ in shape.
    #[error("Shape mismatch between input {input} and output {output}")]
    ShapeMismatch {
        /// The shape of the input volume
        input: UVec3,
        /// The shape of the output volume
        output: UVec3,
    },
    /// Happens when the volume has more voxels than provisional labels are available.
    #[error("Volume has {voxel_count} voxels, but at most {max} can be labeled")]
    TooManyVoxels {
        /// The number of voxels in the volume
        voxel_count: u64,
        /// The maximum number of voxels
        max: u64,
    },
    /// Happens when the label type cannot represent the number of regions.
    #[error("{region_count} regions do not fit into the label type")]
    LabelOverflow {
        /// The number of regions that were found
        region_count: u32,
    },
}
