//! Name-keyed registry of pose estimator constructors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::capability::PoseModel;
use super::mediapipe::MediaPipePoseModel;
use super::openpose::OpenPoseModel;

/// Constructor for a fresh, unloaded estimator.
pub type ModelFactory = Arc<dyn Fn() -> Box<dyn PoseModel> + Send + Sync>;

/// Returned by [`ModelRegistry::create`] for names nobody registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported pose model '{name}'. Supported: {}", supported.join(", "))]
pub struct UnsupportedModelError {
    pub name: String,
    /// Registered names at the time of the lookup, sorted.
    pub supported: Vec<String>,
}

/// Maps lowercase model names to constructors.
///
/// Names are case-insensitive: registration and lookup both lowercase the
/// name. Every [`create`](Self::create) call builds and loads a new instance,
/// so concurrent runs never share estimator state.
///
/// # Examples
///
/// ```rust
/// use betagen::models::ModelRegistry;
///
/// let registry = ModelRegistry::with_builtin_models();
/// assert_eq!(registry.supported_models(), vec!["mediapipe", "openpose"]);
///
/// let model = registry.create("MediaPipe").unwrap();
/// assert_eq!(model.name(), "mediapipe");
/// ```
#[derive(Clone, Default)]
pub struct ModelRegistry {
    factories: BTreeMap<String, ModelFactory>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding the estimators shipped with betagen.
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::new();
        registry.register("mediapipe", || Box::new(MediaPipePoseModel::new()));
        registry.register("openpose", || Box::new(OpenPoseModel::new()));
        registry
    }

    /// Add a constructor, replacing any previous one under the same name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn PoseModel> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_lowercase(), Arc::new(factory));
    }

    /// Instantiate and load the estimator registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn PoseModel>, UnsupportedModelError> {
        let factory = self
            .factories
            .get(&name.to_lowercase())
            .ok_or_else(|| UnsupportedModelError {
                name: name.to_string(),
                supported: self.supported_models(),
            })?;

        let mut model = factory();
        model.load();
        Ok(model)
    }

    /// Whether `name` (case-insensitive) is registered.
    pub fn supports(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted.
    pub fn supported_models(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.supported_models())
            .finish()
    }
}
