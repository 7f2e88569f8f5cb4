pub mod minijinja;

use std::fmt::Debug;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

pub trait EngineInit {
    type Engine: Engine + 'static;

    /// Initializes an engine loading templates from `root` with `globals`
    /// available to every template as `G`.
    fn init<G: Serialize>(root: &Path, globals: G) -> Self::Engine;
}

pub trait Engine: Send + Sync + Debug {
    fn render(&self, name: &str, context: &dyn Context) -> Result<String>;
}

/// A template context: anything that serializes to a map.
pub trait Context {
    fn to_value(&self) -> ::minijinja::value::Value;
}

impl<T: Serialize> Context for T {
    fn to_value(&self) -> ::minijinja::value::Value {
        ::minijinja::value::Value::from_serializable(self)
    }
}
