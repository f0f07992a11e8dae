//! Store configuration.

/// Configuration for creating a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name reported in tracing events.
    pub name: String,

    /// Number of values the reverse map is pre-sized for.
    pub initial_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "multistore".to_string(),
            initial_capacity: 0,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store name used in log events.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the initial value capacity.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
