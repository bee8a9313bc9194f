use std::sync::{Arc, PoisonError, RwLock};

use super::navigation::NavigationContext;

/// Session state shared between the read loop and the completer.
///
/// The read loop is the only writer; the completer reads snapshots.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Current position in the root/domain/action hierarchy
    navigation: Arc<RwLock<NavigationContext>>,

    /// Namespace used when the input does not name one
    namespace: Arc<RwLock<String>>,

    /// Color output setting
    color_enabled: Arc<RwLock<bool>>,
}

impl SessionState {
    /// Create a new session state at the root.
    ///
    /// * `namespace` - Initial default namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            navigation: Arc::new(RwLock::new(NavigationContext::new())),
            namespace: Arc::new(RwLock::new(namespace.into())),
            color_enabled: Arc::new(RwLock::new(true)),
        }
    }

    /// Snapshot of the navigation context.
    pub fn navigation(&self) -> NavigationContext {
        self.navigation
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate the navigation context.
    ///
    /// # Arguments
    /// * `f` - Mutation applied under the write lock
    ///
    /// # Returns
    /// * `R` - Whatever the mutation returns
    pub fn update_navigation<R>(&self, f: impl FnOnce(&mut NavigationContext) -> R) -> R {
        let mut ctx = self
            .navigation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut ctx)
    }

    /// Get the default namespace.
    pub fn namespace(&self) -> String {
        self.namespace
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set the default namespace.
    pub fn set_namespace(&self, namespace: impl Into<String>) {
        *self
            .namespace
            .write()
            .unwrap_or_else(PoisonError::into_inner) = namespace.into();
    }

    /// Get current color setting.
    pub fn color_enabled(&self) -> bool {
        *self
            .color_enabled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Set color output.
    pub fn set_color_enabled(&self, enabled: bool) {
        *self
            .color_enabled
            .write()
            .unwrap_or_else(PoisonError::into_inner) = enabled;
    }
}
