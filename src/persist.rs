// used for persistence
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::construct::EntityKeeper;
use crate::datatype::Value;
use crate::error::Result;
use crate::load::EntityRecord;

// ------------- Persistence -------------
//
// One row per entity so that entities without any attributes survive a
// restart, and one row per fact keyed on (entity_name, attribute_name) so
// that a repeated write replaces the previous value.
//
// An eav_data table may already exist without that key, written by older
// tools that insert a row per write and mark bare entities with a NULL
// attribute. Such a table is brought in line on open: duplicates keep their
// latest row, the unique index is added, and every entity it mentions gets
// its eav_entity row.
const SCHEMA: &str = "
    create table if not exists eav_entity (
        entity_name text not null,
        constraint referenceable_entity_name primary key (
            entity_name
        )
    );
    create table if not exists eav_data (
        entity_name text not null,
        attribute_name text not null,
        value text not null,
        constraint unique_fact primary key (
            entity_name,
            attribute_name
        )
    );
    delete from eav_data
        where attribute_name is not null
        and rowid not in (
            select max(rowid)
                from eav_data
                where attribute_name is not null
                group by entity_name, attribute_name
        );
    create unique index if not exists unique_eav_data_fact on eav_data (
        entity_name,
        attribute_name
    );
    insert into eav_entity (
        entity_name
    )
    select distinct entity_name
        from eav_data
        where entity_name is not null
    on conflict (entity_name) do nothing;
";

const ADD_ENTITY: &str = "
    insert into eav_entity (
        entity_name
    ) values (?1)
    on conflict (entity_name) do nothing
";

const UPSERT_FACT: &str = "
    insert into eav_data (
        entity_name,
        attribute_name,
        value
    ) values (?1, ?2, ?3)
    on conflict (entity_name, attribute_name) do update
        set value = excluded.value
";

const REMOVE_FACTS: &str = "
    delete from eav_data
        where entity_name = ?1
";

const REMOVE_ENTITY: &str = "
    delete from eav_entity
        where entity_name = ?1
";

const ALL_ENTITIES: &str = "
    select entity_name
        from eav_entity
";

// Rows without an attribute only mark an entity, which eav_entity covers.
const ALL_FACTS: &str = "
    select entity_name,
           attribute_name,
           value
        from eav_data
        where entity_name is not null
        and attribute_name is not null
        and value is not null
";

/// Owns the SQLite connection of exactly one store.
///
/// The connection is opened in [`Persistor::open`] and released either by
/// [`Persistor::close`] or when the persistor is dropped, whichever comes
/// first. Statements go through the connection's statement cache.
pub struct Persistor {
    connection: Connection,
    path: PathBuf,
}

impl Persistor {
    pub fn open(path: &Path) -> Result<Self> {
        let connection = Connection::open(path)?;
        // The schema is created idempotently, so opening an existing file is fine.
        connection.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "opened fact table");
        Ok(Self {
            connection,
            path: path.to_path_buf(),
        })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn persist_entity(&mut self, entity: &str) -> Result<()> {
        self.connection
            .prepare_cached(ADD_ENTITY)?
            .execute(params![entity])?;
        debug!(entity, "persisted entity");
        Ok(())
    }
    /// Writes a single fact together with its entity row, so a fact is never
    /// stored for an entity the table does not know about.
    pub fn persist_fact(&mut self, entity: &str, attribute: &str, value: &Value) -> Result<()> {
        let tx = self.connection.transaction()?;
        tx.prepare_cached(ADD_ENTITY)?.execute(params![entity])?;
        tx.prepare_cached(UPSERT_FACT)?
            .execute(params![entity, attribute, value])?;
        tx.commit()?;
        debug!(entity, attribute, "persisted fact");
        Ok(())
    }
    /// Writes a whole batch in one transaction; either every record lands or none does.
    pub fn persist_records(&mut self, records: &[EntityRecord]) -> Result<()> {
        let tx = self.connection.transaction()?;
        for record in records {
            tx.prepare_cached(ADD_ENTITY)?.execute(params![record.name])?;
            for fact in &record.attributes {
                tx.prepare_cached(UPSERT_FACT)?
                    .execute(params![record.name, fact.attribute, fact.value])?;
            }
        }
        tx.commit()?;
        debug!(records = records.len(), "persisted records");
        Ok(())
    }
    pub fn remove_entity(&mut self, entity: &str) -> Result<()> {
        let tx = self.connection.transaction()?;
        let facts = tx.prepare_cached(REMOVE_FACTS)?.execute(params![entity])?;
        tx.prepare_cached(REMOVE_ENTITY)?.execute(params![entity])?;
        tx.commit()?;
        debug!(entity, facts, "removed entity");
        Ok(())
    }
    /// Loads every stored entity and fact into the keeper.
    pub fn restore(&mut self, keeper: &mut EntityKeeper) -> Result<()> {
        let mut entities = 0;
        let mut facts = 0;
        {
            let mut statement = self.connection.prepare_cached(ALL_ENTITIES)?;
            let mut rows = statement.query([])?;
            while let Some(row) = rows.next()? {
                let name: String = row.get(0)?;
                keeper.keep(name);
                entities += 1;
            }
        }
        {
            let mut statement = self.connection.prepare_cached(ALL_FACTS)?;
            let mut rows = statement.query([])?;
            while let Some(row) = rows.next()? {
                let entity: String = row.get(0)?;
                let attribute: String = row.get(1)?;
                let value: Value = row.get(2)?;
                let (kept, _) = keeper.keep(entity);
                kept.set(attribute, value);
                facts += 1;
            }
        }
        info!(entities, facts, path = %self.path.display(), "restored fact table");
        Ok(())
    }
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.connection.close().map_err(|(_, e)| e)?;
        info!(path = %path.display(), "closed fact table");
        Ok(())
    }
}

impl std::fmt::Debug for Persistor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Persistor").field("path", &self.path).finish()
    }
}
