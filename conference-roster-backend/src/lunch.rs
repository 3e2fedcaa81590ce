//! Which lunch a participant eats at.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::{Lazy, OnceCell};
use tracing::debug;

use crate::model::{Conference, Lunch, Participant};

static PLACEHOLDER: Lazy<Lunch> = Lazy::new(Lunch::placeholder);

/// Indexes into `Conference::lunches`. When two lunches list the same class
/// or unit type the later one wins.
#[derive(Debug, Default)]
struct LunchMaps {
    by_class: HashMap<i32, usize>,
    by_unit_type: HashMap<String, usize>,
}

impl LunchMaps {
    fn build(lunches: &[Lunch]) -> Self {
        debug!("building lunch maps for {} lunches", lunches.len());
        let mut maps = Self::default();
        for (index, lunch) in lunches.iter().enumerate() {
            for &class in &lunch.classes {
                maps.by_class.insert(class, index);
            }
            for unit_type in &lunch.unit_types {
                maps.by_unit_type.insert(unit_type.clone(), index);
            }
        }
        maps
    }
}

/// Lunch lookup for one version of the conference. The maps are built on
/// first use, exactly once even if several threads get there together.
#[derive(Debug)]
pub struct LunchResolver {
    conference: Arc<Conference>,
    maps: OnceCell<LunchMaps>,
}

impl LunchResolver {
    #[must_use]
    pub const fn new(conference: Arc<Conference>) -> Self {
        Self {
            conference,
            maps: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.conference.version
    }

    /// First enrolled class with a lunch, in class number order, then the unit
    /// type, then the default lunch.
    pub fn resolve(&self, participant: &Participant) -> &Lunch {
        let lunches = &self.conference.lunches;
        let maps = self.maps.get_or_init(|| LunchMaps::build(lunches));
        participant
            .classes
            .iter()
            .find_map(|class| maps.by_class.get(class))
            .or_else(|| maps.by_unit_type.get(&participant.unit_type))
            .and_then(|&index| lunches.get(index))
            .or_else(|| lunches.first())
            .unwrap_or(&*PLACEHOLDER)
    }
}

/// Hands out the resolver for the current conference version, replacing it
/// when the conference has been edited.
#[derive(Debug, Default)]
pub struct LunchCache {
    current: RwLock<Option<Arc<LunchResolver>>>,
}

impl LunchCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolver(&self, conference: &Arc<Conference>) -> Arc<LunchResolver> {
        let fresh = |resolver: &Option<Arc<LunchResolver>>| {
            resolver
                .as_ref()
                .filter(|resolver| resolver.version() == conference.version)
                .cloned()
        };

        let cached = fresh(&self.current.read().unwrap_or_else(PoisonError::into_inner));
        if let Some(resolver) = cached {
            return resolver;
        }
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(resolver) = fresh(&current) {
            return resolver;
        }
        debug!(version = conference.version, "replacing lunch resolver");
        let resolver = Arc::new(LunchResolver::new(Arc::clone(conference)));
        *current = Some(Arc::clone(&resolver));
        resolver
    }
}
