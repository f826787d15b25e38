use eavclad::EavError;
use eavclad::construct::Database;
use eavclad::load::EntityRecord;
use eavclad::settings::{PersistenceMode, StoreConfig};

const CATALOGUE: &str = r#"[
    {
        "name": "Customer",
        "attributes": [
            {"attribute": "name", "value": "John Doe"},
            {"attribute": "email", "value": "john.doe@example.com"}
        ]
    },
    {
        "name": "Product",
        "attributes": [
            {"attribute": "name", "value": "T-Shirt"},
            {"attribute": "price", "value": 19.99}
        ]
    }
]"#;

#[test]
fn loads_json_records() {
    let mut db = Database::new(PersistenceMode::InMemory).expect("db");
    let written = db.load(EntityRecord::parse_json(CATALOGUE).unwrap()).unwrap();
    assert_eq!(written, 4);
    assert_eq!(db.list_entities(), ["Customer", "Product"]);
    assert_eq!(db.get_attribute("Customer", "email").unwrap().as_str(), "john.doe@example.com");
    assert_eq!(db.get_attribute("Product", "price").unwrap().as_str(), "19.99");
}

#[test]
fn duplicate_attribute_rejects_the_whole_batch() {
    let mut db = Database::new(PersistenceMode::InMemory).expect("db");
    let records = vec![
        EntityRecord::new("Customer").with("name", "John Doe"),
        EntityRecord::new("Product").with("name", "T-Shirt").with("name", "Hoodie"),
    ];
    assert!(matches!(db.load(records), Err(EavError::Validation(_))));
    assert!(db.list_entities().is_empty());
}

#[test]
fn later_records_overwrite_earlier_ones() {
    let mut db = Database::new(PersistenceMode::InMemory).expect("db");
    let records = vec![
        EntityRecord::new("Product").with("price", "19.99"),
        EntityRecord::new("Product").with("price", "17.99"),
    ];
    assert_eq!(db.load(records).unwrap(), 2);
    assert_eq!(db.get_attribute("Product", "price").unwrap().as_str(), "17.99");
}

#[test]
fn bulk_load_creates_entities_even_when_strict() {
    let mut db = Database::with_config(StoreConfig::in_memory().strict()).expect("db");
    db.load(vec![EntityRecord::new("Chair").with("legs", 4)]).unwrap();
    assert_eq!(db.get_attribute("Chair", "legs").unwrap().as_str(), "4");
}

#[test]
fn durable_bulk_load_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eav.db");

    let mut db = Database::with_config(StoreConfig::file(&path)).expect("db");
    db.load(EntityRecord::parse_json(CATALOGUE).unwrap()).unwrap();
    let rejected = vec![EntityRecord::new("Broken").with("a", "1").with("a", "2")];
    assert!(db.load(rejected).is_err());
    db.close().unwrap();

    let db = Database::with_config(StoreConfig::file(&path)).expect("reopen");
    assert_eq!(db.list_entities(), ["Customer", "Product"]);
    assert_eq!(db.get_attribute("Customer", "name").unwrap().as_str(), "John Doe");
}
