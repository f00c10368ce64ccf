// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The ordered, de-duplicated collection of loadable model names.

use crate::error::RegistryError;

/// Tracks which surface models are loadable and which one is active.
///
/// Names are kept in registration order and de-duplicated. A non-empty
/// selection is always a member of the list; selection of an unknown name
/// is rejected atomically, leaving the previous selection intact.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    names: Vec<String>,
    current: Option<usize>,
}

impl ModelRegistry {
    /// Creates an empty registry with no selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model name. Returns `true` if the name was newly added,
    /// `false` if it was already present (the list stays de-duplicated).
    pub fn register(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.names.iter().any(|existing| *existing == name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// The loadable model names, in registration order.
    pub fn models(&self) -> &[String] {
        &self.names
    }

    /// The currently selected model name, or `None` when nothing is
    /// loaded.
    pub fn current(&self) -> Option<&str> {
        self.current.map(|index| self.names[index].as_str())
    }

    /// Selects a model by name.
    ///
    /// Replace-or-reject: an unknown name returns
    /// [`RegistryError::ModelNotFound`] and the previous selection is
    /// untouched.
    pub fn set_current(&mut self, name: &str) -> Result<(), RegistryError> {
        match self.names.iter().position(|existing| existing == name) {
            Some(index) => {
                self.current = Some(index);
                Ok(())
            }
            None => Err(RegistryError::ModelNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Clears the selection back to "none loaded".
    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no models are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_preserves_order_and_deduplicates() {
        let mut registry = ModelRegistry::new();
        assert!(registry.register("cube"));
        assert!(registry.register("torus"));
        assert!(!registry.register("cube"));
        assert_eq!(registry.models(), ["cube".to_string(), "torus".to_string()]);
    }

    #[test]
    fn selecting_a_known_name_is_reflected_on_next_read() {
        let mut registry = ModelRegistry::new();
        registry.register("cube");
        registry.register("torus");
        registry.set_current("torus").unwrap();
        assert_eq!(registry.current(), Some("torus"));
    }

    #[test]
    fn selecting_an_unknown_name_is_rejected_and_state_preserved() {
        let mut registry = ModelRegistry::new();
        registry.register("cube");
        registry.set_current("cube").unwrap();

        let err = registry.set_current("teapot").unwrap_err();
        assert_eq!(
            err,
            RegistryError::ModelNotFound {
                name: "teapot".to_string()
            }
        );
        assert_eq!(registry.current(), Some("cube"));
    }

    #[test]
    fn empty_registry_has_no_selection() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.current(), None);
    }

    #[test]
    fn clearing_the_selection_returns_to_none() {
        let mut registry = ModelRegistry::new();
        registry.register("cube");
        registry.set_current("cube").unwrap();
        registry.clear_selection();
        assert_eq!(registry.current(), None);
        assert_eq!(registry.len(), 1);
    }
}
