//! Viewport registry - tracks the view handles registered on a router node

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use vista_types::Instruction;

/// Capability set of a view handle mounted in a named slot
#[async_trait]
pub trait ViewPort: Send + Sync {
    /// Show the component described by `instruction`
    async fn activate(&self, instruction: &Instruction) -> anyhow::Result<()>;

    /// Whether the view currently showing `current` may be replaced.
    ///
    /// `next` is the instruction headed for this slot, if the new tree has one.
    /// Returning `Ok(false)` or an error vetoes the whole navigation.
    async fn can_deactivate(
        &self,
        _current: &Instruction,
        _next: Option<&Instruction>,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Whether `instruction` may be shown in this slot
    async fn can_activate(&self, _instruction: &Instruction) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Tear down the view showing `current` before the next activation
    async fn deactivate(&self, _current: &Instruction) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Registered port with the instruction it currently shows
#[derive(Clone)]
pub struct PortEntry {
    pub name: String,
    pub port: Arc<dyn ViewPort>,
    pub current: Option<Arc<Instruction>>,
}

#[derive(Default)]
struct Slots {
    ports: HashMap<String, Arc<dyn ViewPort>>,
    active: HashMap<String, Arc<Instruction>>,
}

/// Per-node registry of view handles keyed by viewport name
#[derive(Default)]
pub struct ViewportRegistry {
    slots: RwLock<Slots>,
}

impl ViewportRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a port, replacing any handle previously stored under `name`
    pub fn register(&self, name: &str, port: Arc<dyn ViewPort>) {
        let mut slots = self.slots.write();
        if slots.ports.insert(name.to_string(), port).is_some() {
            // The new handle has not shown anything yet
            slots.active.remove(name);
            debug!(viewport = %name, "Viewport handle replaced");
        } else {
            debug!(viewport = %name, "Viewport registered");
        }
    }

    /// Remove a port and forget what it was showing
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn ViewPort>> {
        let mut slots = self.slots.write();
        slots.active.remove(name);
        let removed = slots.ports.remove(name);
        if removed.is_some() {
            debug!(viewport = %name, "Viewport unregistered");
        }
        removed
    }

    /// Port registered under `name`
    pub fn get(&self, name: &str) -> Option<Arc<dyn ViewPort>> {
        self.slots.read().ports.get(name).cloned()
    }

    /// Instruction currently shown under `name`
    pub fn current(&self, name: &str) -> Option<Arc<Instruction>> {
        self.slots.read().active.get(name).cloned()
    }

    /// Record what a port is showing after a successful activation
    pub fn set_current(&self, name: &str, instruction: Arc<Instruction>) {
        self.slots.write().active.insert(name.to_string(), instruction);
    }

    /// Copy of every registered port, sorted by name
    pub fn entries(&self) -> Vec<PortEntry> {
        let slots = self.slots.read();
        let mut entries: Vec<PortEntry> = slots
            .ports
            .iter()
            .map(|(name, port)| PortEntry {
                name: name.clone(),
                port: port.clone(),
                current: slots.active.get(name).cloned(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    #[cfg(test)]
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.read().ports.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered ports
    pub fn len(&self) -> usize {
        self.slots.read().ports.len()
    }

    /// Check if no port is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
