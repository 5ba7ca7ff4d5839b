//! Table-driven control builder and TOML scenes.
//!
//! `SchemaRegistry` answers "which fields does this type have" from a static
//! table instead of runtime reflection. `Scene` loads such a table together
//! with a set of plain objects, which is enough to drive the orchestrator
//! from the command line or from tests.

use crate::error::{GenerationError, SheetError};
use crate::generation::ControlBuilder;
use crate::selection::{FieldFlags, Handle, Inspectable, ObjectId, TypeSignature};
use crate::sheet::{Control, ControlSet, ControlValue, TypeBucketKey};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// One field of a type as the property sheet sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub widget: String,
    pub flags: FieldFlags,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, widget: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            widget: widget.into(),
            flags: FieldFlags::VISIBLE | FieldFlags::EDITABLE,
        }
    }

    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    fn selected_by(&self, key: &TypeBucketKey) -> bool {
        self.flags.contains(key.include) && !self.flags.intersects(key.exclude)
    }
}

/// Field tables per type name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: HashMap<String, Vec<FieldSpec>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: impl Into<String>, fields: Vec<FieldSpec>) {
        self.types.insert(type_name.into(), fields);
    }

    pub fn with_type(mut self, type_name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        self.register(type_name, fields);
        self
    }

    pub fn fields(&self, type_name: &str) -> Option<&[FieldSpec]> {
        self.types.get(type_name).map(Vec::as_slice)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }
}

impl ControlBuilder for SchemaRegistry {
    fn build_controls(
        &self,
        key: &TypeBucketKey,
        handles: &[Handle],
    ) -> Result<ControlSet, GenerationError> {
        let fields = self
            .fields(&key.type_name)
            .ok_or_else(|| GenerationError::UnknownType(key.type_name.to_string()))?;
        let bindings: Vec<ObjectId> = handles.iter().map(|h| h.object_id()).collect();

        Ok(fields
            .iter()
            .filter(|field| field.selected_by(key))
            .map(|field| {
                Control::new(field.name.as_str(), field.widget.as_str())
                    .bound_to(bindings.clone())
                    .with_value(shared_value(handles, &field.name))
            })
            .collect())
    }
}

fn shared_value(handles: &[Handle], field: &str) -> ControlValue {
    handles
        .iter()
        .map(|handle| match handle.field_value(field) {
            Some(value) => ControlValue::Uniform(value),
            None => ControlValue::Unset,
        })
        .reduce(|acc, next| acc.combine(&next))
        .unwrap_or(ControlValue::Unset)
}

/// Plain editable object with a value map.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
    #[serde(skip)]
    signature: Option<TypeSignature>,
}

impl SceneObject {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(id),
            type_name: type_name.into(),
            include: None,
            exclude: None,
            values: BTreeMap::new(),
            signature: None,
        }
    }

    pub fn with_value(mut self, field: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(field.into(), value);
        self
    }

    fn resolve_signature(&mut self) -> Result<(), SheetError> {
        let mut signature = TypeSignature::new(self.type_name.as_str());
        if let Some(names) = &self.include {
            signature.include = parse_flags(names)?;
        }
        if let Some(names) = &self.exclude {
            signature.exclude = parse_flags(names)?;
        }
        self.signature = Some(signature);
        Ok(())
    }
}

impl Inspectable for SceneObject {
    fn object_id(&self) -> ObjectId {
        self.id.clone()
    }

    fn type_signature(&self) -> TypeSignature {
        self.signature
            .clone()
            .unwrap_or_else(|| TypeSignature::new(self.type_name.as_str()))
    }

    fn field_value(&self, field: &str) -> Option<serde_json::Value> {
        self.values.get(field).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct FieldDef {
    name: String,
    widget: String,
    #[serde(default)]
    flags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TypeDef {
    #[serde(default)]
    fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    types: BTreeMap<String, TypeDef>,
    #[serde(default)]
    objects: Vec<SceneObject>,
}

/// Schemas plus the objects that can be selected.
pub struct Scene {
    registry: Arc<SchemaRegistry>,
    objects: Vec<Arc<SceneObject>>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SheetError::InvalidScene(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, SheetError> {
        let file: SceneFile = toml::from_str(text)?;

        let mut registry = SchemaRegistry::new();
        for (type_name, def) in file.types {
            let mut fields = Vec::with_capacity(def.fields.len());
            for field in def.fields {
                let mut spec = FieldSpec::new(field.name, field.widget);
                if let Some(names) = &field.flags {
                    spec.flags = parse_flags(names)?;
                }
                fields.push(spec);
            }
            registry.register(type_name, fields);
        }

        let mut objects = Vec::with_capacity(file.objects.len());
        let mut seen = std::collections::HashSet::new();
        for mut object in file.objects {
            if !registry.contains(&object.type_name) {
                return Err(SheetError::InvalidScene(format!(
                    "Object {} has unknown type {}",
                    object.id, object.type_name
                )));
            }
            if !seen.insert(object.id.clone()) {
                return Err(SheetError::InvalidScene(format!(
                    "Duplicate object id {}",
                    object.id
                )));
            }
            object.resolve_signature()?;
            objects.push(Arc::new(object));
        }

        Ok(Self {
            registry: Arc::new(registry),
            objects,
        })
    }

    pub fn registry(&self) -> Arc<SchemaRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn objects(&self) -> &[Arc<SceneObject>] {
        &self.objects
    }

    /// Resolve object ids to handles, keeping the given order.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Handle>, SheetError> {
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                self.objects
                    .iter()
                    .find(|object| object.id.as_str() == id)
                    .map(|object| Arc::clone(object) as Handle)
                    .ok_or_else(|| SheetError::UnknownObject(id.to_string()))
            })
            .collect()
    }
}

fn parse_flags(names: &[String]) -> Result<FieldFlags, SheetError> {
    names.iter().try_fold(FieldFlags::NONE, |acc, name| {
        let flag = match name.trim().to_ascii_lowercase().as_str() {
            "visible" => FieldFlags::VISIBLE,
            "editable" => FieldFlags::EDITABLE,
            "advanced" => FieldFlags::ADVANCED,
            "hidden" => FieldFlags::HIDDEN,
            other => {
                return Err(SheetError::InvalidScene(format!(
                    "Unknown field flag: {}",
                    other
                )))
            }
        };
        Ok(acc | flag)
    })
}
