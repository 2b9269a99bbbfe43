//! Boundary traits for the collaborators the resolver consumes
//!
//! The plugin registry and the configuration store are owned elsewhere; the
//! resolver only sees them through these traits, passed in explicitly.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::domain::{ActionDescriptor, OptionSpec};
use crate::infrastructure::{InfraError, InfraResult};

/// Plugin registry: faces and the actions they expose.
pub trait ActionRegistry: Send + Sync {
    /// Names of all registered faces.
    fn faces(&self) -> Vec<String>;

    /// One-line description of a face.
    fn face_summary(&self, face: &str) -> Option<String>;

    /// Options every action of the face accepts.
    fn face_options(&self, face: &str) -> Vec<OptionSpec>;

    /// Current action set of a face.
    fn actions(&self, face: &str) -> Vec<Arc<ActionDescriptor>>;

    /// One action by name.
    fn find_action(&self, face: &str, action: &str) -> Option<Arc<ActionDescriptor>>;

    /// The action used when the command line names none.
    fn default_action(&self, face: &str) -> Option<Arc<ActionDescriptor>>;
}

/// A setting as exposed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDescriptor {
    pub name: String,
    /// Booleans are spelled `--[no-]name` and take no argument
    pub boolean: bool,
    pub summary: String,
}

impl SettingDescriptor {
    pub fn value(name: &str, summary: &str) -> Self {
        Self {
            name: name.to_string(),
            boolean: false,
            summary: summary.to_string(),
        }
    }

    pub fn boolean(name: &str, summary: &str) -> Self {
        Self {
            name: name.to_string(),
            boolean: true,
            summary: summary.to_string(),
        }
    }
}

/// Configuration store: named settings and their current values.
pub trait SettingsCatalog: Send + Sync {
    fn settings(&self) -> Vec<SettingDescriptor>;

    fn value(&self, name: &str) -> Option<Value>;
}

// ============================================================
// IN-MEMORY IMPLEMENTATIONS
// ============================================================

/// A resource type plugin: face-level options plus named actions.
#[derive(Debug, Clone)]
pub struct Face {
    pub name: String,
    pub summary: String,
    pub options: Vec<OptionSpec>,
    actions: IndexMap<String, Arc<ActionDescriptor>>,
}

impl Face {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            summary: String::new(),
            options: Vec::new(),
            actions: IndexMap::new(),
        }
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Add an action. Names are unique and at most one action is the default.
    pub fn action(mut self, action: ActionDescriptor) -> InfraResult<Self> {
        if self.actions.contains_key(&action.name) {
            return Err(InfraError::DuplicateAction {
                face: self.name,
                action: action.name,
            });
        }
        if action.default {
            if let Some(existing) = self.actions.values().find(|a| a.default) {
                return Err(InfraError::MultipleDefaults {
                    face: self.name,
                    first: existing.name.clone(),
                    second: action.name,
                });
            }
        }
        self.actions.insert(action.name.clone(), Arc::new(action));
        Ok(self)
    }
}

/// In-memory plugin registry.
#[derive(Debug, Clone, Default)]
pub struct FaceRegistry {
    faces: IndexMap<String, Face>,
}

impl FaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, face: Face) -> InfraResult<Self> {
        if self.faces.contains_key(&face.name) {
            return Err(InfraError::DuplicateFace(face.name));
        }
        debug!("register: face '{}' with {} actions", face.name, face.actions.len());
        self.faces.insert(face.name.clone(), face);
        Ok(self)
    }
}

impl ActionRegistry for FaceRegistry {
    fn faces(&self) -> Vec<String> {
        self.faces.keys().cloned().collect()
    }

    fn face_summary(&self, face: &str) -> Option<String> {
        self.faces.get(face).map(|f| f.summary.clone())
    }

    fn face_options(&self, face: &str) -> Vec<OptionSpec> {
        self.faces
            .get(face)
            .map(|f| f.options.clone())
            .unwrap_or_default()
    }

    fn actions(&self, face: &str) -> Vec<Arc<ActionDescriptor>> {
        self.faces
            .get(face)
            .map(|f| f.actions.values().cloned().collect())
            .unwrap_or_default()
    }

    fn find_action(&self, face: &str, action: &str) -> Option<Arc<ActionDescriptor>> {
        self.faces.get(face)?.actions.get(action).cloned()
    }

    fn default_action(&self, face: &str) -> Option<Arc<ActionDescriptor>> {
        self.faces
            .get(face)?
            .actions
            .values()
            .find(|a| a.default)
            .cloned()
    }
}
