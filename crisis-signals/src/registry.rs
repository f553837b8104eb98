//! Name-keyed registry of boxed `SignalSource`s. Adding a source is a
//! matter of providing the wrapper and registering it here; no consensus
//! code needs to change.

use crate::sources::{EmotionSource, IronySource, PrimarySource, SentimentSource};
use crate::SignalSource;
use crisis_common::SourceName;
use std::collections::HashMap;
use std::sync::Arc;

pub struct SourceRegistry {
    handlers: HashMap<SourceName, Arc<dyn SignalSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        let mut handlers: HashMap<SourceName, Arc<dyn SignalSource>> = HashMap::new();
        handlers.insert(SourceName::Primary, Arc::new(PrimarySource));
        handlers.insert(SourceName::Sentiment, Arc::new(SentimentSource));
        handlers.insert(SourceName::Irony, Arc::new(IronySource));
        handlers.insert(SourceName::Emotion, Arc::new(EmotionSource));
        Self { handlers }
    }

    pub fn get(&self, name: SourceName) -> Option<Arc<dyn SignalSource>> {
        self.handlers.get(&name).cloned()
    }

    pub fn all(&self) -> impl Iterator<Item = (&SourceName, &Arc<dyn SignalSource>)> {
        self.handlers.iter()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_all_four_sources() {
        let registry = SourceRegistry::new();
        for name in SourceName::ALL {
            assert!(registry.get(name).is_some());
        }
    }
}
