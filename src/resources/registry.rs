//! Object type registry.
//!
//! Maps the type names used in manifests to an [`ObjectType`]: the built-in
//! [`EntityKind`] that implements it plus default metadata. The built-in
//! kinds are registered up front. Any other name is loaded on first use by a
//! [`TypeLoader`], usually from `<objects>/<TypeName>.json`:
//!
//! ```json
//! {
//!   "name": "Hero",
//!   "kind": "Sprite",
//!   "defaults": { "image": "hero.png", "cols": 4, "animations": [ ... ] }
//! }
//! ```
//!
//! A name is loaded at most once. A failed load registers nothing, so a
//! later lookup tries again.

use bevy_ecs::prelude::Resource;
use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::components::entitykind::{EntityKind, SceneObject};
use crate::error::{EngineError, EngineResult};
use crate::resources::manifest::ObjectMeta;

/// A constructible object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    pub kind: EntityKind,
    /// Metadata applied under every instance's own metadata.
    #[serde(default)]
    pub defaults: ObjectMeta,
}

impl ObjectType {
    pub fn builtin(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            defaults: ObjectMeta::new(),
        }
    }
}

/// Resolves an unregistered type name into a definition.
pub trait TypeLoader: Send + Sync {
    fn load(&self, type_name: &str) -> EngineResult<ObjectType>;
}

/// Loader for registries that only know the built-in kinds.
pub struct NoLoader;

impl TypeLoader for NoLoader {
    fn load(&self, type_name: &str) -> EngineResult<ObjectType> {
        Err(EngineError::Unregistered(type_name.to_string()))
    }
}

/// Loads `<base>/<TypeName>.<ext>` JSON definitions.
pub struct DefinitionLoader {
    pub base: PathBuf,
    pub ext: String,
}

impl DefinitionLoader {
    pub fn new(base: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ext: ext.into(),
        }
    }

    pub fn path_for(&self, type_name: &str) -> PathBuf {
        self.base.join(format!("{}.{}", type_name, self.ext))
    }
}

impl TypeLoader for DefinitionLoader {
    fn load(&self, type_name: &str) -> EngineResult<ObjectType> {
        // Type names become file names; keep them to a single path component.
        if type_name.is_empty()
            || type_name.contains(['/', '\\'])
            || type_name.starts_with('.')
        {
            return Err(EngineError::type_load(type_name, "not a valid type name"));
        }
        let path = self.path_for(type_name);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::Unregistered(type_name.to_string())
            } else {
                EngineError::type_load(type_name, format!("{}: {}", path.display(), e))
            }
        })?;
        let def: ObjectType = serde_json::from_str(&text)
            .map_err(|e| EngineError::type_load(type_name, format!("{}: {}", path.display(), e)))?;
        if def.name != type_name {
            return Err(EngineError::type_load(
                type_name,
                format!("{} defines '{}' instead", path.display(), def.name),
            ));
        }
        Ok(def)
    }
}

/// Name → object type map, grown lazily through its loader.
#[derive(Resource)]
pub struct ObjectRegistry {
    types: FxHashMap<String, ObjectType>,
    loader: Box<dyn TypeLoader>,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new(NoLoader)
    }
}

impl ObjectRegistry {
    /// Registry seeded with the built-in kinds (plus `Object` as an alias of `GameObject`).
    pub fn new(loader: impl TypeLoader + 'static) -> Self {
        let mut registry = Self {
            types: FxHashMap::default(),
            loader: Box::new(loader),
        };
        for kind in EntityKind::ALL {
            registry.register(ObjectType::builtin(kind.type_name(), kind));
        }
        registry.register(ObjectType::builtin("Object", EntityKind::GameObject));
        registry
    }

    pub fn register(&mut self, object_type: ObjectType) {
        self.types.insert(object_type.name.clone(), object_type);
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Look a type up, loading and registering it on a miss.
    pub fn resolve(&mut self, type_name: &str) -> EngineResult<&ObjectType> {
        if !self.types.contains_key(type_name) {
            let loaded = self.loader.load(type_name)?;
            info!("Registered object type '{}' ({:?})", type_name, loaded.kind);
            self.types.insert(type_name.to_string(), loaded);
        }
        self.types
            .get(type_name)
            .ok_or_else(|| EngineError::Unregistered(type_name.to_string()))
    }

    /// Resolve `type_name` and build an instance from `meta`.
    ///
    /// The type's defaults are applied first and the entry's own fields
    /// override them. The object's `name` is always the requested type name.
    pub fn instantiate(&mut self, type_name: &str, meta: &ObjectMeta) -> EngineResult<SceneObject> {
        let object_type = self.resolve(type_name)?;
        let mut merged = object_type.defaults.clone();
        for (key, value) in meta {
            merged.insert(key.clone(), value.clone());
        }
        merged.insert("name".to_string(), Value::String(type_name.to_string()));
        debug!("Instantiating '{}' as {:?}", type_name, object_type.kind);
        object_type.kind.build(merged)
    }
}
