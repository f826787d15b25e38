//! Eavclad – a small Entity-Attribute-Value store.
//!
//! Facts are triples `(entity, attribute, value)`:
//! * An entity is identified by its name and owns a map of attributes.
//! * An attribute name is unique within its entity, so setting it again
//!   replaces the previous value (last write wins, no history).
//! * A [`datatype::Value`] is an opaque string. Numbers, booleans and JSON
//!   scalars are accepted and kept in their textual form.
//!
//! ## Modules
//! * [`construct`] – [`construct::Entity`], the [`construct::EntityKeeper`] that
//!   owns all entities, and the [`construct::Database`] store facade.
//! * [`datatype`] – the [`datatype::Value`] type and its SQLite/serde bindings.
//! * [`persist`] – SQLite schema creation, write-through and restoration.
//! * [`load`] – validated bulk loading of [`load::EntityRecord`] batches.
//! * [`settings`] – per-store configuration, optionally read from a file.
//!
//! ## Persistence
//! A store is either in memory or backed by a SQLite file. In file mode every
//! write reaches the table before the call returns, and opening an existing
//! file restores every entity and fact. The schema is created with
//! `create table if not exists`, so reopening never fails on existing tables.
//!
//! ## Missing entities
//! By default `set_attribute` creates an unknown entity on the fly. A store
//! configured with [`settings::MissingEntityPolicy::Strict`] rejects such
//! writes with [`EavError::UnknownEntity`] instead.
//!
//! ## Quick Start
//! ```
//! use eavclad::construct::Database;
//! use eavclad::settings::PersistenceMode;
//! let mut db = Database::new(PersistenceMode::InMemory).unwrap();
//! db.create_entity("Person").unwrap();
//! db.set_attribute("Person", "Name", "John Doe").unwrap();
//! db.set_attribute("Person", "Age", 30).unwrap();
//! assert_eq!(db.list_entities(), ["Person"]);
//! assert_eq!(db.get_attribute("Person", "Age").unwrap().as_str(), "30");
//! assert!(db.get_attribute("Person", "Email").is_none());
//! db.close().unwrap();
//! ```

pub mod construct;
pub mod datatype;
pub mod error;
pub mod load;
pub mod persist;
pub mod settings;

pub use error::{EavError, Result};
