//! Scene composition.
//!
//! Spawns the scene's objects from manifest entries, one entry at a time and
//! in declared order, resolving type names through the [`ObjectRegistry`]
//! resource. An entry that fails to resolve or validate is logged and
//! skipped; the others keep their manifest position as their
//! [`ManifestIndex`], so relative order is preserved.

use bevy_ecs::prelude::*;
use log::{error, info, warn};
use serde_json::Value;

use crate::components::manifestindex::ManifestIndex;
use crate::error::EngineError;
use crate::resources::manifest::ObjectMeta;
use crate::resources::registry::ObjectRegistry;

/// An entry that could not be composed.
#[derive(Debug)]
pub struct CompositionFailure {
    /// Position of the entry in the manifest.
    pub index: usize,
    pub type_name: String,
    pub error: EngineError,
}

#[derive(Debug, Default)]
pub struct CompositionReport {
    pub composed: usize,
    pub failures: Vec<CompositionFailure>,
}

impl CompositionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Instantiate every entry of `entries` and spawn it into `world`.
///
/// Without an [`ObjectRegistry`] resource nothing can resolve and every
/// entry fails as unregistered.
pub fn compose_scene(world: &mut World, entries: &[ObjectMeta]) -> CompositionReport {
    let Some(mut registry) = world.remove_resource::<ObjectRegistry>() else {
        error!("No object registry in the world, cannot compose the scene");
        let failures = entries
            .iter()
            .enumerate()
            .map(|(index, meta)| {
                let type_name = entry_type_name(meta).unwrap_or_default().to_string();
                CompositionFailure {
                    index,
                    error: EngineError::Unregistered(type_name.clone()),
                    type_name,
                }
            })
            .collect();
        return CompositionReport {
            composed: 0,
            failures,
        };
    };

    let report = compose_with(world, &mut registry, entries);
    world.insert_resource(registry);
    report
}

fn entry_type_name(meta: &ObjectMeta) -> Option<&str> {
    meta.get("name").and_then(Value::as_str)
}

fn compose_with(
    world: &mut World,
    registry: &mut ObjectRegistry,
    entries: &[ObjectMeta],
) -> CompositionReport {
    let mut report = CompositionReport::default();

    for (index, meta) in entries.iter().enumerate() {
        let Some(type_name) = entry_type_name(meta) else {
            warn!("Object entry #{} has no type name, skipping", index);
            report.failures.push(CompositionFailure {
                index,
                type_name: String::new(),
                error: EngineError::invalid(format!("#{}", index), "missing 'name'"),
            });
            continue;
        };

        match registry.instantiate(type_name, meta) {
            Ok(object) => {
                object.spawn(world, ManifestIndex(index));
                report.composed += 1;
            }
            Err(e) => {
                error!("Error loading object '{}' (entry #{}): {}", type_name, index, e);
                report.failures.push(CompositionFailure {
                    index,
                    type_name: type_name.to_string(),
                    error: e,
                });
            }
        }
    }

    info!(
        "Composed scene: {} object(s), {} failure(s)",
        report.composed,
        report.failures.len()
    );
    report
}
