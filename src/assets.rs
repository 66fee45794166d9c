//! Image and sound catalog
//!
//! Loading happens in the browser; this module only tracks status. Anything
//! not `Ready` is drawn with a flat fallback or stays silent.

use std::collections::HashMap;

use serde::Serialize;

use crate::sim::ItemKind;

/// Catch clip volume
pub const CATCH_VOLUME: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetId {
    Item(ItemKind),
    Basket,
    CatchSound,
    /// Synthesized at play time, never fetched
    BombSound,
}

impl AssetId {
    /// Every fetchable asset, items first
    pub fn all() -> impl Iterator<Item = AssetId> {
        ItemKind::ALL
            .into_iter()
            .map(AssetId::Item)
            .chain([AssetId::Basket, AssetId::CatchSound])
    }

    /// URL path, `None` for synthesized sounds
    pub fn path(&self) -> Option<String> {
        match self {
            AssetId::Item(kind) => Some(format!("/{}.svg", kind.name())),
            AssetId::Basket => Some("/basket.svg".to_string()),
            AssetId::CatchSound => Some("/catch-the-stuff.wav".to_string()),
            AssetId::BombSound => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, AssetId::Item(_) | AssetId::Basket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AssetStatus {
    Pending,
    Ready,
    Failed(String),
}

/// Load status per asset
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    status: HashMap<AssetId, AssetStatus>,
}

impl AssetRegistry {
    /// Everything pending except the synthesized bomb sound
    pub fn new() -> Self {
        let mut status: HashMap<_, _> = AssetId::all().map(|id| (id, AssetStatus::Pending)).collect();
        status.insert(AssetId::BombSound, AssetStatus::Ready);
        Self { status }
    }

    pub fn status(&self, id: AssetId) -> AssetStatus {
        self.status.get(&id).cloned().unwrap_or(AssetStatus::Pending)
    }

    pub fn is_ready(&self, id: AssetId) -> bool {
        matches!(self.status.get(&id), Some(AssetStatus::Ready))
    }

    pub fn mark_ready(&mut self, id: AssetId) {
        log::debug!("asset ready: {:?}", id);
        self.status.insert(id, AssetStatus::Ready);
    }

    pub fn mark_failed(&mut self, id: AssetId, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("asset {:?} failed to load, using fallback: {}", id, reason);
        self.status.insert(id, AssetStatus::Failed(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        let ids: Vec<_> = AssetId::all().collect();
        assert_eq!(ids.len(), 13);
        assert_eq!(
            AssetId::Item(ItemKind::Champagne).path().as_deref(),
            Some("/champagne.svg")
        );
        assert_eq!(AssetId::CatchSound.path().as_deref(), Some("/catch-the-stuff.wav"));
        assert_eq!(AssetId::BombSound.path(), None);
        assert_eq!(ids.iter().filter(|id| id.is_image()).count(), 12);
    }

    #[test]
    fn test_status_transitions() {
        let mut registry = AssetRegistry::new();
        assert!(registry.is_ready(AssetId::BombSound));
        assert!(!registry.is_ready(AssetId::Basket));
        assert_eq!(registry.status(AssetId::Basket), AssetStatus::Pending);

        registry.mark_ready(AssetId::Basket);
        registry.mark_failed(AssetId::CatchSound, "404");
        assert!(registry.is_ready(AssetId::Basket));
        assert_eq!(
            registry.status(AssetId::CatchSound),
            AssetStatus::Failed("404".into())
        );

        // Failed assets can still recover on a later load
        registry.mark_ready(AssetId::CatchSound);
        assert!(registry.is_ready(AssetId::CatchSound));
    }
}
