//! Dataset folder inspection.

mod scan;

pub use scan::{
    DatasetInventory, Split, SplitInventory, is_annotation_file, is_image_file, scan_dataset,
    scan_split, steps_per_epoch,
};
