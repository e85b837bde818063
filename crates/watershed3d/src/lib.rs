#![doc = include_str!("../../../readme.md")]

mod border;
mod direction_mask;
mod labeling;
mod neighborhood;
mod prepare;
mod transform;
mod union_find;
mod volume;

pub use border::VolumeBorder;
pub use direction_mask::DirectionMask;
pub use labeling::watershed_labeling;
pub use neighborhood::{
    BorderDirections, Connectivity, Direction, Neighborhood, SixNeighborhood,
    TwentySixNeighborhood,
};
pub use prepare::{DirectionField, prepare_watersheds};
pub use transform::{WatershedError, watershed_transform, watersheds_six, watersheds_twenty_six};
pub use volume::{Volume, VolumeError, VolumeView, VolumeViewMut};
