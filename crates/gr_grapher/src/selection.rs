use ahash::HashSet;
use indexmap::IndexMap;
use nohash_hasher::IntMap;

use gr_types::{Entity, EntityCode, EntityId, EntityName};

use crate::memo::Revision;

/// Tracks which entities are selected, independent of any chart type.
///
/// The single source of truth for selection state: chart states read it and
/// never hold a private copy. Every public mutating method is one atomic
/// state transition — there is no observable partially-updated state, and
/// each bumps the revision exactly once.
///
/// Selected names that are not (or not yet) among the available entities
/// are tolerated, not an error: a URL can mention an entity whose data
/// arrives later.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionManager {
    /// Every entity ever seen, in first-seen order, with id/code lookups.
    available: IndexMap<EntityName, Entity>,

    by_id: IntMap<EntityId, EntityName>,
    by_code: ahash::HashMap<EntityCode, EntityName>,

    /// The selection, order-preserving, no duplicates.
    selected: Vec<EntityName>,

    revision: Revision,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The revision bumps on every mutation; derived values key off it.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    // --- Availability ---

    /// Register entities as available. Extends the ever-seen set; never
    /// removes anything, and never touches the selection.
    pub fn set_available_entities(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            if let Some(id) = entity.id {
                self.by_id.insert(id, entity.name.clone());
            }
            if let Some(code) = &entity.code {
                self.by_code.insert(code.clone(), entity.name.clone());
            }
            self.available.entry(entity.name.clone()).or_insert(entity);
        }
        self.revision += 1;
    }

    pub fn available_entity_names(&self) -> impl Iterator<Item = &EntityName> {
        self.available.keys()
    }

    pub fn num_available_entities(&self) -> usize {
        self.available.len()
    }

    pub fn is_available(&self, name: &EntityName) -> bool {
        self.available.contains_key(name)
    }

    // --- Lookups ---

    pub fn name_for_id(&self, id: EntityId) -> Option<&EntityName> {
        self.by_id.get(&id)
    }

    pub fn name_for_code(&self, code: &EntityCode) -> Option<&EntityName> {
        self.by_code.get(code)
    }

    pub fn id_for_name(&self, name: &EntityName) -> Option<EntityId> {
        self.available.get(name).and_then(|entity| entity.id)
    }

    pub fn code_for_name(&self, name: &EntityName) -> Option<&EntityCode> {
        self.available.get(name).and_then(|entity| entity.code.as_ref())
    }

    /// Resolve a name-or-code (as found in URLs) to an entity name.
    pub fn resolve(&self, name_or_code: &str) -> EntityName {
        self.by_code
            .get(&EntityCode::new(name_or_code))
            .cloned()
            .unwrap_or_else(|| EntityName::from(name_or_code))
    }

    // --- Selection ---

    #[inline]
    pub fn selected_entity_names(&self) -> &[EntityName] {
        &self.selected
    }

    pub fn is_selected(&self, name: &EntityName) -> bool {
        self.selected.contains(name)
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Available entities that are not selected, in availability order.
    /// Recomputed on demand; never cached across mutations.
    pub fn unselected_entity_names(&self) -> Vec<EntityName> {
        let selected: HashSet<&EntityName> = self.selected.iter().collect();
        self.available
            .keys()
            .filter(|name| !selected.contains(name))
            .cloned()
            .collect()
    }

    /// Append to the selection (no-op if already selected).
    pub fn select_entity(&mut self, name: EntityName) {
        if !self.selected.contains(&name) {
            self.selected.push(name);
        }
        self.revision += 1;
    }

    pub fn deselect_entity(&mut self, name: &EntityName) {
        self.selected.retain(|selected| selected != name);
        self.revision += 1;
    }

    pub fn toggle_selection(&mut self, name: EntityName) {
        if self.selected.contains(&name) {
            self.selected.retain(|selected| selected != &name);
        } else {
            self.selected.push(name);
        }
        self.revision += 1;
    }

    /// Replace the whole selection: clear-then-set as one atomic
    /// transition. Order is preserved; duplicates collapse to their first
    /// occurrence.
    pub fn set_selected_entities(&mut self, names: impl IntoIterator<Item = EntityName>) {
        use itertools::Itertools as _;
        self.selected = names.into_iter().unique().collect();
        self.revision += 1;
    }

    /// Select every available entity, in availability order.
    pub fn select_all(&mut self) {
        self.selected = self.available.keys().cloned().collect();
        self.revision += 1;
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.revision += 1;
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SelectionManager {
        let mut manager = SelectionManager::new();
        manager.set_available_entities([
            Entity {
                name: EntityName::from("USA"),
                id: Some(EntityId(840)),
                code: Some(EntityCode::from("USA")),
            },
            Entity::named("Canada"),
            Entity::named("France"),
        ]);
        manager
    }

    #[test]
    fn set_selected_preserves_order_and_dedups() {
        let mut manager = manager();
        manager.set_selected_entities(
            ["France", "USA", "France", "Canada", "USA"]
                .into_iter()
                .map(EntityName::from),
        );
        assert_eq!(
            manager.selected_entity_names(),
            &[
                EntityName::from("France"),
                EntityName::from("USA"),
                EntityName::from("Canada"),
            ]
        );
    }

    #[test]
    fn toggle_and_deselect() {
        let mut manager = manager();
        manager.toggle_selection(EntityName::from("USA"));
        assert!(manager.is_selected(&EntityName::from("USA")));
        manager.toggle_selection(EntityName::from("USA"));
        assert!(!manager.is_selected(&EntityName::from("USA")));

        manager.select_entity(EntityName::from("Canada"));
        manager.select_entity(EntityName::from("Canada")); // no duplicate
        assert_eq!(manager.selected_entity_names().len(), 1);

        manager.deselect_entity(&EntityName::from("Canada"));
        assert!(!manager.has_selection());
    }

    #[test]
    fn unselected_is_recomputed_set_difference() {
        let mut manager = manager();
        manager.set_selected_entities([EntityName::from("Canada")]);
        assert_eq!(
            manager.unselected_entity_names(),
            vec![EntityName::from("USA"), EntityName::from("France")]
        );

        manager.clear_selection();
        assert_eq!(manager.unselected_entity_names().len(), 3);
    }

    #[test]
    fn selecting_the_unavailable_is_tolerated() {
        let mut manager = manager();
        manager.select_entity(EntityName::from("Atlantis"));
        assert!(manager.is_selected(&EntityName::from("Atlantis")));
        assert!(!manager.is_available(&EntityName::from("Atlantis")));
    }

    #[test]
    fn id_and_code_lookups() {
        let manager = manager();
        assert_eq!(manager.name_for_id(EntityId(840)), Some(&EntityName::from("USA")));
        assert_eq!(
            manager.name_for_code(&EntityCode::from("USA")),
            Some(&EntityName::from("USA"))
        );
        assert_eq!(manager.id_for_name(&EntityName::from("Canada")), None);

        // URL values resolve codes first, then fall back to plain names.
        assert_eq!(manager.resolve("USA"), EntityName::from("USA"));
        assert_eq!(manager.resolve("Canada"), EntityName::from("Canada"));
    }

    #[test]
    fn every_mutation_bumps_the_revision_once() {
        let mut manager = manager();
        let r0 = manager.revision();
        manager.select_entity(EntityName::from("USA"));
        assert_eq!(manager.revision(), r0 + 1);
        manager.select_all();
        assert_eq!(manager.revision(), r0 + 2);
        manager.clear_selection();
        assert_eq!(manager.revision(), r0 + 3);
    }
}
