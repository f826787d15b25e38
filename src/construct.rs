// attributes are kept ordered so entities print and list deterministically
use std::collections::BTreeMap;

// the keeper is a HashMap keyed by entity name
use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use seahash::SeaHasher;

// used to print out readable forms of a construct
use std::fmt;

use tracing::{debug, info, warn};

// our own stuff that we need
use crate::datatype::Value;
use crate::error::{EavError, Result};
use crate::load::{self, EntityRecord};
use crate::persist::Persistor;
use crate::settings::{MissingEntityPolicy, PersistenceMode, StoreConfig};

pub type NameHasher = BuildHasherDefault<SeaHasher>;

// ------------- Entity -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    name: String,
    attributes: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(name: String) -> Self {
        Self {
            name,
            attributes: BTreeMap::new(),
        }
    }
    // The name is only exposed through a getter so that an entity can
    // never be renamed while it is kept.
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }
    /// Last write wins, the previous value is handed back.
    pub fn set(&mut self, attribute: String, value: Value) -> Option<Value> {
        self.attributes.insert(attribute, value)
    }
    /// Attribute and value pairs in attribute name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(a, v)| (a.as_str(), v))
    }
    pub fn len(&self) -> usize {
        self.attributes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (attribute, value)) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{attribute}={value}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Default)]
pub struct EntityKeeper {
    kept: HashMap<String, Entity, NameHasher>,
}

impl EntityKeeper {
    pub fn new() -> Self {
        Self {
            kept: HashMap::default(),
        }
    }
    /// Returns the kept entity and whether it was already kept.
    pub fn keep(&mut self, name: String) -> (&mut Entity, bool) {
        match self.kept.entry(name) {
            Entry::Occupied(e) => (e.into_mut(), true),
            Entry::Vacant(e) => {
                let entity = Entity::new(e.key().clone());
                (e.insert(entity), false)
            }
        }
    }
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.kept.get(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.kept.contains_key(name)
    }
    pub fn remove(&mut self, name: &str) -> Option<Entity> {
        self.kept.remove(name)
    }
    /// All names, sorted so that two keepers holding the same entities agree.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.kept.keys().cloned().collect();
        names.sort();
        names
    }
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        let mut entities: Vec<&Entity> = self.kept.values().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        entities.into_iter()
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Database -------------
/// The attribute store.
///
/// Reads are served from the keeper. Writes go to the persistor first (when
/// there is one) and only touch the keeper once the durable write succeeded,
/// so a failed write leaves both sides as they were.
///
/// There is no internal locking: mutation takes `&mut self`, and callers that
/// share a store between threads wrap it in their own `Mutex`.
#[derive(Debug)]
pub struct Database {
    entity_keeper: EntityKeeper,
    persistor: Option<Persistor>,
    missing_entity: MissingEntityPolicy,
}

impl Database {
    pub fn new(persistence: PersistenceMode) -> Result<Self> {
        Self::with_config(StoreConfig::new(persistence))
    }
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        let mut entity_keeper = EntityKeeper::new();
        let persistor = match &config.persistence {
            PersistenceMode::InMemory => None,
            PersistenceMode::File(path) => {
                let mut persistor = Persistor::open(path)?;
                // Restore the existing database
                persistor.restore(&mut entity_keeper)?;
                Some(persistor)
            }
        };
        info!(
            durable = persistor.is_some(),
            policy = ?config.missing_entity,
            entities = entity_keeper.len(),
            "store ready"
        );
        Ok(Self {
            entity_keeper,
            persistor,
            missing_entity: config.missing_entity,
        })
    }
    pub fn is_durable(&self) -> bool {
        self.persistor.is_some()
    }
    pub fn missing_entity_policy(&self) -> MissingEntityPolicy {
        self.missing_entity
    }
    /// Creates the entity unless it is already kept. Returns whether it existed.
    pub fn create_entity(&mut self, name: &str) -> Result<bool> {
        load::validate_name("entity", name)?;
        if self.entity_keeper.contains(name) {
            return Ok(true);
        }
        if let Some(persistor) = self.persistor.as_mut() {
            persistor.persist_entity(name)?;
        }
        self.entity_keeper.keep(name.to_owned());
        debug!(entity = name, "created entity");
        Ok(false)
    }
    /// Sets the attribute, returning the value it replaced.
    ///
    /// Under [`MissingEntityPolicy::Strict`] an unknown entity is an
    /// [`EavError::UnknownEntity`], otherwise the entity is created on the fly.
    pub fn set_attribute(
        &mut self,
        entity: &str,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        load::validate_name("entity", entity)?;
        load::validate_name("attribute", attribute)?;
        let value = value.into();
        if !self.entity_keeper.contains(entity)
            && self.missing_entity == MissingEntityPolicy::Strict
        {
            warn!(entity, attribute, "write to unknown entity rejected");
            return Err(EavError::UnknownEntity(entity.to_owned()));
        }
        if let Some(persistor) = self.persistor.as_mut() {
            persistor.persist_fact(entity, attribute, &value)?;
        }
        let (kept, _) = self.entity_keeper.keep(entity.to_owned());
        let previous = kept.set(attribute.to_owned(), value);
        debug!(entity, attribute, replaced = previous.is_some(), "set attribute");
        Ok(previous)
    }
    /// A missing entity or attribute is simply `None`.
    pub fn get_attribute(&self, entity: &str, attribute: &str) -> Option<Value> {
        self.entity_keeper
            .get(entity)
            .and_then(|e| e.get(attribute))
            .cloned()
    }
    pub fn list_entities(&self) -> Vec<String> {
        self.entity_keeper.names()
    }
    /// Removes the entity and all of its facts. Returns whether it existed.
    pub fn delete_entity(&mut self, entity: &str) -> Result<bool> {
        if !self.entity_keeper.contains(entity) {
            return Ok(false);
        }
        if let Some(persistor) = self.persistor.as_mut() {
            persistor.remove_entity(entity)?;
        }
        self.entity_keeper.remove(entity);
        debug!(entity, "deleted entity");
        Ok(true)
    }
    pub fn contains_entity(&self, name: &str) -> bool {
        self.entity_keeper.contains(name)
    }
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entity_keeper.get(name)
    }
    /// Attribute and value pairs of one entity in attribute name order.
    pub fn attributes(&self, name: &str) -> Option<impl Iterator<Item = (&str, &Value)>> {
        self.entity_keeper.get(name).map(Entity::attributes)
    }
    /// Entities in name order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entity_keeper.iter()
    }
    pub fn len(&self) -> usize {
        self.entity_keeper.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entity_keeper.is_empty()
    }
    /// Applies a batch of records and returns the number of facts written.
    ///
    /// The whole batch is validated before anything is written, and in
    /// durable mode it is persisted in a single transaction. Records always
    /// create their entity, regardless of the missing entity policy.
    pub fn load(&mut self, records: Vec<EntityRecord>) -> Result<usize> {
        let facts = load::validate_all(&records)?;
        if let Some(persistor) = self.persistor.as_mut() {
            persistor.persist_records(&records)?;
        }
        let count = records.len();
        for record in records {
            let (kept, _) = self.entity_keeper.keep(record.name);
            for fact in record.attributes {
                kept.set(fact.attribute, fact.value);
            }
        }
        info!(records = count, facts, "bulk load applied");
        Ok(facts)
    }
    /// Releases the backing connection, if any. Dropping the store releases it
    /// as well, but only `close` reports a failure to do so.
    pub fn close(self) -> Result<()> {
        match self.persistor {
            Some(persistor) => persistor.close(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_displays_attributes_in_name_order() {
        let mut entity = Entity::new("Chair".to_string());
        entity.set("material".to_string(), Value::from("wood"));
        entity.set("legs".to_string(), Value::from(4));
        entity.set("backrest".to_string(), Value::from("yes"));
        assert_eq!(entity.to_string(), "Chair(backrest=yes, legs=4, material=wood)");
        assert_eq!(Entity::new("Empty".to_string()).to_string(), "Empty()");
    }

    #[test]
    fn keeper_reports_previously_kept() {
        let mut keeper = EntityKeeper::new();
        let (_, existed) = keeper.keep("Person".to_string());
        assert!(!existed);
        let (entity, existed) = keeper.keep("Person".to_string());
        assert!(existed);
        assert_eq!(entity.name(), "Person");
        assert_eq!(keeper.len(), 1);
    }

    #[test]
    fn keeper_names_are_sorted() {
        let mut keeper = EntityKeeper::new();
        for name in ["Product", "Customer", "Item1"] {
            keeper.keep(name.to_string());
        }
        assert_eq!(keeper.names(), ["Customer", "Item1", "Product"]);
        let names: Vec<&str> = keeper.iter().map(Entity::name).collect();
        assert_eq!(names, ["Customer", "Item1", "Product"]);
    }

    #[test]
    fn set_returns_replaced_value() {
        let mut entity = Entity::new("Person".to_string());
        assert_eq!(entity.set("Age".to_string(), Value::from("30")), None);
        assert_eq!(
            entity.set("Age".to_string(), Value::from("31")),
            Some(Value::from("30"))
        );
        assert_eq!(entity.len(), 1);
    }
}
