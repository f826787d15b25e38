//! Bulk loading of entity records.
//!
//! A batch is validated as a whole before anything is written, so a
//! malformed record never leaves half a batch behind.
//!
//! ```
//! use eavclad::load::EntityRecord;
//! let records = EntityRecord::parse_json(r#"[
//!     {"name": "Product", "attributes": [
//!         {"attribute": "name", "value": "T-Shirt"},
//!         {"attribute": "price", "value": 19.99}
//!     ]}
//! ]"#).unwrap();
//! assert_eq!(records[0].attributes[1].value.as_str(), "19.99");
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::datatype::Value;
use crate::error::{EavError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub attribute: String,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeRecord>,
}

impl EntityRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push(AttributeRecord {
            attribute: attribute.into(),
            value: value.into(),
        });
        self
    }
    pub fn parse_json(text: &str) -> Result<Vec<EntityRecord>> {
        Ok(serde_json::from_str(text)?)
    }
    /// Rejects empty names and attributes repeated within the record.
    pub fn validate(&self) -> Result<()> {
        validate_name("entity", &self.name)?;
        let mut seen = HashSet::with_capacity(self.attributes.len());
        for fact in &self.attributes {
            if fact.attribute.is_empty() {
                return Err(EavError::Validation(format!(
                    "entity '{}' has an attribute with an empty name",
                    self.name
                )));
            }
            if !seen.insert(fact.attribute.as_str()) {
                return Err(EavError::Validation(format!(
                    "entity '{}' sets attribute '{}' more than once",
                    self.name, fact.attribute
                )));
            }
        }
        Ok(())
    }
}

/// Entity and attribute names must not be empty, whichever path writes them.
pub(crate) fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(EavError::Validation(format!("{kind} name must not be empty")));
    }
    Ok(())
}

pub(crate) fn validate_all(records: &[EntityRecord]) -> Result<usize> {
    let mut facts = 0;
    for record in records {
        if let Err(e) = record.validate() {
            warn!(entity = %record.name, error = %e, "rejected bulk load");
            return Err(e);
        }
        facts += record.attributes.len();
    }
    Ok(facts)
}
