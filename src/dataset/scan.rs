//! Image and annotation folder scanning.
//!
//! The trainer reads one PASCAL VOC annotation per image. Images and
//! annotations are paired by file stem; listings are not recursive.

use crate::config::{DetectorConfig, resolve_path};
use crate::constants::dataset::{ANNOTATION_EXTENSION, IMAGE_EXTENSIONS};
use crate::error::{Error, Result};
use crate::output::progress;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Which configured folder pair a scan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// `train.train_image_folder` / `train.train_annot_folder`.
    Train,
    /// `train.valid_image_folder` / `train.valid_annot_folder`.
    Validation,
}

impl Split {
    fn image_field(self) -> &'static str {
        match self {
            Self::Train => "train.train_image_folder",
            Self::Validation => "train.valid_image_folder",
        }
    }

    fn annot_field(self) -> &'static str {
        match self {
            Self::Train => "train.train_annot_folder",
            Self::Validation => "train.valid_annot_folder",
        }
    }
}

/// Contents of one image/annotation folder pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitInventory {
    /// Images folder.
    pub image_folder: PathBuf,
    /// Annotations folder.
    pub annot_folder: PathBuf,
    /// Number of image files.
    pub images: usize,
    /// Number of annotation files.
    pub annotations: usize,
    /// Image stems without an annotation, sorted.
    pub unmatched_images: Vec<String>,
    /// Annotation stems without an image, sorted.
    pub unmatched_annotations: Vec<String>,
}

impl SplitInventory {
    /// Number of image/annotation pairs.
    pub fn matched(&self) -> usize {
        self.annotations - self.unmatched_annotations.len()
    }
}

/// Train and validation inventories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInventory {
    /// Training split.
    pub train: SplitInventory,
    /// Validation split, when configured.
    pub valid: Option<SplitInventory>,
}

/// Check if a file is a supported image.
pub fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(OsStr::new(candidate)))
    })
}

/// Check if a file is a PASCAL VOC annotation.
pub fn is_annotation_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OsStr::new(ANNOTATION_EXTENSION)))
}

/// Collect the stems of files in `dir` accepted by `filter`.
fn collect_stems(
    dir: &Path,
    filter: fn(&Path) -> bool,
    field: &'static str,
    show_progress: bool,
) -> Result<BTreeSet<String>> {
    if !dir.is_dir() {
        return Err(Error::DatasetFolderNotFound {
            field,
            path: dir.to_path_buf(),
        });
    }

    let entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .and_then(|listing| {
            listing
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<_>>()
        })
        .map_err(|e| Error::DatasetRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let label = dir.display().to_string();
    let pb = progress::create_scan_progress(entries.len(), &label, show_progress);

    let mut stems = BTreeSet::new();
    for path in &entries {
        progress::inc_progress(pb.as_ref());
        if !path.is_file() || !filter(path) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
            if !stems.insert(stem.to_string()) {
                warn!("Duplicate file stem '{}' in {}", stem, dir.display());
            }
        } else {
            warn!("Skipping non-UTF-8 file name: {}", path.display());
        }
    }
    progress::finish_progress(pb, "done");

    debug!("Found {} matching files in {}", stems.len(), dir.display());
    Ok(stems)
}

/// Scan one image/annotation folder pair.
pub fn scan_split(
    split: Split,
    image_folder: &Path,
    annot_folder: &Path,
    show_progress: bool,
) -> Result<SplitInventory> {
    let images = collect_stems(image_folder, is_image_file, split.image_field(), show_progress)?;
    let annotations = collect_stems(
        annot_folder,
        is_annotation_file,
        split.annot_field(),
        show_progress,
    )?;

    Ok(SplitInventory {
        image_folder: image_folder.to_path_buf(),
        annot_folder: annot_folder.to_path_buf(),
        images: images.len(),
        annotations: annotations.len(),
        unmatched_images: images.difference(&annotations).cloned().collect(),
        unmatched_annotations: annotations.difference(&images).cloned().collect(),
    })
}

/// Scan the train and, if configured, validation folders of `config`.
///
/// Relative folders resolve against `base_dir`.
pub fn scan_dataset(
    config: &DetectorConfig,
    base_dir: &Path,
    show_progress: bool,
) -> Result<DatasetInventory> {
    let train = &config.train;

    let train_split = scan_split(
        Split::Train,
        &resolve_path(base_dir, &train.train_image_folder),
        &resolve_path(base_dir, &train.train_annot_folder),
        show_progress,
    )?;

    let valid_split = if train.has_validation() {
        Some(scan_split(
            Split::Validation,
            &resolve_path(base_dir, &train.valid_image_folder),
            &resolve_path(base_dir, &train.valid_annot_folder),
            show_progress,
        )?)
    } else {
        None
    };

    Ok(DatasetInventory {
        train: train_split,
        valid: valid_split,
    })
}

/// Batches per epoch: annotations repeated `repeat_times`, rounded up to
/// whole batches.
pub fn steps_per_epoch(split: &SplitInventory, repeat_times: u32, batch_size: u32) -> Result<u64> {
    if split.annotations == 0 {
        return Err(Error::EmptyDataset {
            path: split.annot_folder.clone(),
        });
    }

    let samples = split.annotations as u64 * u64::from(repeat_times);
    Ok(samples.div_ceil(u64::from(batch_size.max(1))))
}
