// ── Schema registry ──
//
// Loads the declarative export schema once and resolves it into a tree of
// `SchemaEntry` values. Every `class` is checked against the type catalog
// and every child reference against the `children` table at load time, so
// extraction never meets an unknown type.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::{self, TypeDescriptor};
use crate::error::SchemaError;

/// How records of one type are ordered before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Keep device order.
    Preserve,
    /// Stable ascending sort on this field.
    Field(String),
}

/// One object type to export, with its nested child types.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub name: String,
    pub descriptor: &'static TypeDescriptor,
    /// Output field order.
    pub fields: Vec<String>,
    /// Host-context relation for top-level entries; `None` for child entries,
    /// which always read from their enclosing instance.
    pub parent_relation: Option<String>,
    pub sort_key: SortKey,
    pub children: Vec<SchemaEntry>,
    pub skip: bool,
}

impl SchemaEntry {
    /// Depth of the declared child tree (0 for a leaf).
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// The loaded schema: top-level entries grouped by module, in document order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    modules: IndexMap<String, IndexMap<String, SchemaEntry>>,
}

// ── Document shape ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    modules: IndexMap<String, IndexMap<String, RawEntry>>,
    #[serde(default)]
    children: IndexMap<String, RawChildDef>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    class: String,
    parent: String,
    #[serde(default)]
    params: Vec<String>,
    #[serde(default)]
    sort_param: Option<String>,
    #[serde(default)]
    skip: bool,
    #[serde(default)]
    children: Vec<RawChildRef>,
}

#[derive(Debug, Deserialize)]
struct RawChildDef {
    class: String,
    #[serde(default)]
    params: Vec<String>,
    #[serde(default)]
    sort_param: Option<String>,
    #[serde(default)]
    skip: bool,
    #[serde(default)]
    children: Vec<RawChildRef>,
}

#[derive(Debug, Deserialize)]
struct RawChildRef {
    name: String,
    /// Overrides the definition's own `children` when present.
    #[serde(default)]
    children: Option<Vec<RawChildRef>>,
}

// ── Loading ─────────────────────────────────────────────────────────

impl SchemaRegistry {
    /// Load and validate a schema file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_yaml_str(&text)?;
        debug!(
            path = %path.display(),
            entries = registry.top_level().count(),
            "schema loaded"
        );
        Ok(registry)
    }

    /// Parse and validate a schema document.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let doc: RawDocument = serde_yaml::from_str(text)?;

        let mut modules = IndexMap::with_capacity(doc.modules.len());
        for (module, entries) in &doc.modules {
            let mut resolved = IndexMap::with_capacity(entries.len());
            for (name, raw) in entries {
                let path = format!("{module}/{name}");
                let descriptor = resolve_class(&raw.class)?;
                let sort_key = parse_sort_key(&path, raw.sort_param.as_deref(), &raw.params)?;
                let mut stack = Vec::new();
                let children =
                    resolve_children(&path, descriptor, &raw.children, &doc.children, &mut stack)?;

                resolved.insert(
                    name.clone(),
                    SchemaEntry {
                        name: name.clone(),
                        descriptor,
                        fields: raw.params.clone(),
                        parent_relation: Some(raw.parent.clone()),
                        sort_key,
                        children,
                        skip: raw.skip,
                    },
                );
            }
            modules.insert(module.clone(), resolved);
        }

        Ok(Self { modules })
    }

    /// Return the first candidate path that exists.
    pub fn locate(candidates: &[PathBuf]) -> Result<PathBuf, SchemaError> {
        candidates
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| SchemaError::NotFound {
                searched: candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Look up a top-level entry by `"module/object_type"`.
    pub fn lookup(&self, path: &str) -> Result<&SchemaEntry, SchemaError> {
        path.split_once('/')
            .and_then(|(module, name)| self.modules.get(module)?.get(name))
            .ok_or_else(|| SchemaError::UnknownType {
                name: path.to_owned(),
            })
    }

    /// Every top-level entry as `(module, entry)`, in document order.
    pub fn top_level(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
        self.modules.iter().flat_map(|(module, entries)| {
            entries
                .values()
                .map(move |entry| (module.as_str(), entry))
        })
    }
}

fn resolve_class(class: &str) -> Result<&'static TypeDescriptor, SchemaError> {
    catalog::lookup(class).ok_or_else(|| SchemaError::UnknownType {
        name: class.to_owned(),
    })
}

fn parse_sort_key(
    entry: &str,
    sort_param: Option<&str>,
    params: &[String],
) -> Result<SortKey, SchemaError> {
    match sort_param {
        None => Ok(SortKey::Preserve),
        Some(key) if params.iter().any(|p| p == key) => Ok(SortKey::Field(key.to_owned())),
        Some(key) => Err(SchemaError::Invalid {
            entry: entry.to_owned(),
            reason: format!("sort_param '{key}' is not listed in params"),
        }),
    }
}

fn resolve_children(
    entry: &str,
    parent: &'static TypeDescriptor,
    refs: &[RawChildRef],
    table: &IndexMap<String, RawChildDef>,
    stack: &mut Vec<String>,
) -> Result<Vec<SchemaEntry>, SchemaError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(refs.len());

    for child_ref in refs {
        if !seen.insert(child_ref.name.as_str()) {
            return Err(SchemaError::Invalid {
                entry: entry.to_owned(),
                reason: format!("child '{}' listed more than once", child_ref.name),
            });
        }
        if stack.contains(&child_ref.name) {
            return Err(SchemaError::Invalid {
                entry: entry.to_owned(),
                reason: format!("child '{}' nests itself", child_ref.name),
            });
        }

        let def = table.get(&child_ref.name).ok_or_else(|| SchemaError::Invalid {
            entry: entry.to_owned(),
            reason: format!("child '{}' is not defined in the children table", child_ref.name),
        })?;

        let path = format!("{entry}/{}", child_ref.name);
        let descriptor = resolve_class(&def.class)?;
        if !parent.has_child_type(descriptor) {
            warn!(
                entry = %path,
                parent = parent.name,
                class = descriptor.name,
                "child class is never nested under its parent class; this slot will stay empty"
            );
        }

        let sort_key = parse_sort_key(&path, def.sort_param.as_deref(), &def.params)?;
        let grandchildren = child_ref.children.as_deref().unwrap_or(def.children.as_slice());

        stack.push(child_ref.name.clone());
        let children = resolve_children(&path, descriptor, grandchildren, table, stack)?;
        stack.pop();

        resolved.push(SchemaEntry {
            name: child_ref.name.clone(),
            descriptor,
            fields: def.params.clone(),
            parent_relation: None,
            sort_key,
            children,
            skip: def.skip,
        });
    }

    Ok(resolved)
}
