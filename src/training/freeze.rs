//! Layer freezing from the configured first trainable layer.

use crate::error::{Error, Result};
use std::path::Path;

/// Which layers keep their pretrained weights during training.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreezePlan {
    /// Layers whose weights are not updated, in model order.
    pub frozen: Vec<String>,
    /// Layers that train, in model order.
    pub trainable: Vec<String>,
}

impl FreezePlan {
    /// Whether any layer is frozen.
    pub fn is_partial(&self) -> bool {
        !self.frozen.is_empty()
    }
}

/// Split `layers` at `first_trainable`.
///
/// Every layer before the named one is frozen. With no name every layer
/// trains. A name the model does not have is an error listing the real layers.
pub fn plan_frozen_layers(layers: &[String], first_trainable: Option<&str>) -> Result<FreezePlan> {
    let Some(name) = first_trainable.filter(|n| !n.is_empty()) else {
        return Ok(FreezePlan {
            frozen: Vec::new(),
            trainable: layers.to_vec(),
        });
    };

    let split = layers
        .iter()
        .position(|layer| layer == name)
        .ok_or_else(|| Error::FirstTrainableLayerNotFound {
            name: name.to_string(),
            candidates: layers
                .iter()
                .enumerate()
                .map(|(idx, layer)| format!("{idx} {layer}"))
                .collect(),
        })?;

    Ok(FreezePlan {
        frozen: layers[..split].to_vec(),
        trainable: layers[split..].to_vec(),
    })
}

/// Read layer names, one per line; blank lines and `#` comments are skipped.
pub fn read_layer_names(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::LayersRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
