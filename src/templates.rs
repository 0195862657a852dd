//! Per-account target templates persisted in `target_templates.json`
//!
//! File layout is `{ "<phone>": { "<template>": [Target, ...] } }`. Files from
//! single-account versions hold the inner map directly; they are migrated to
//! the first phone that loads them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::target::Target;

/// Template name to ordered target list.
pub type Templates = BTreeMap<String, Vec<Target>>;

#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
}

/// A flat file maps names straight to target arrays.
fn is_legacy_layout(root: &serde_json::Map<String, Value>) -> bool {
    root.values().next().is_some_and(Value::is_array)
}

impl TemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(config: &Config) -> Self {
        Self::new(&config.templates_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole file as a JSON object; missing or unreadable files are empty.
    fn read_root(&self) -> serde_json::Map<String, Value> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return serde_json::Map::new();
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(path = %self.path.display(), "Templates file is not an object, ignoring");
                serde_json::Map::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable templates file");
                serde_json::Map::new()
            }
        }
    }

    fn write_root(&self, root: &serde_json::Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(root)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Templates belonging to `phone`.
    pub fn load(&self, phone: &str) -> Result<Templates> {
        let root = self.read_root();

        if is_legacy_layout(&root) {
            let templates: Templates = serde_json::from_value(Value::Object(root))?;
            info!(phone, count = templates.len(), "Migrating single-account templates");
            self.save(phone, &templates)?;
            return Ok(templates);
        }

        match root.get(phone) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Templates::new()),
        }
    }

    /// Replace `phone`'s templates, leaving other accounts untouched.
    pub fn save(&self, phone: &str, templates: &Templates) -> Result<()> {
        let mut root = self.read_root();
        if is_legacy_layout(&root) {
            root.clear();
        }
        root.insert(phone.to_string(), serde_json::to_value(templates)?);
        self.write_root(&root)
    }
}

/// Insert `target` unless an equivalent destination is already listed.
pub fn push_unique(targets: &mut Vec<Target>, target: Target) -> bool {
    if targets.iter().any(|t| t.same_destination(&target)) {
        return false;
    }
    targets.push(target);
    true
}

/// Create or overwrite a template.
pub fn create(templates: &mut Templates, name: &str, targets: Vec<Target>, force: bool) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("template name is empty".to_string()));
    }
    if templates.contains_key(name) && !force {
        return Err(Error::InvalidArgument(format!(
            "template '{}' already exists",
            name
        )));
    }
    if targets.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "template '{}' has no targets",
            name
        )));
    }

    let mut unique = Vec::with_capacity(targets.len());
    for target in targets {
        push_unique(&mut unique, target);
    }
    templates.insert(name.to_string(), unique);
    Ok(())
}

pub fn get<'a>(templates: &'a Templates, name: &str) -> Result<&'a [Target]> {
    templates
        .get(name)
        .map(Vec::as_slice)
        .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
}

/// Append a target; returns false when it was already present.
pub fn add_target(templates: &mut Templates, name: &str, target: Target) -> Result<bool> {
    let targets = templates
        .get_mut(name)
        .ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
    Ok(push_unique(targets, target))
}

/// Remove the target at a 1-based position.
pub fn remove_target(templates: &mut Templates, name: &str, position: usize) -> Result<Target> {
    let targets = templates
        .get_mut(name)
        .ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
    let index = position
        .checked_sub(1)
        .filter(|i| *i < targets.len())
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "target #{} does not exist in '{}' ({} targets)",
                position,
                name,
                targets.len()
            ))
        })?;
    Ok(targets.remove(index))
}

pub fn delete(templates: &mut Templates, name: &str) -> Result<Vec<Target>> {
    templates
        .remove(name)
        .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
}
