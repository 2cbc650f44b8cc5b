//! Tests for extraction normalization through the public API.

use schema_forge::model::{
    ExtractionResult, Participation, RawAttribute, RawEntity, RawRelationship, ReferentialAction,
    RelationshipType,
};
use schema_forge::normalize::{normalize, NormalizeConfig, NormalizeOptions, NormalizeWarning, Normalizer};

fn extraction(entities: Vec<RawEntity>, relationships: Vec<RawRelationship>) -> ExtractionResult {
    ExtractionResult {
        entities,
        relationships,
    }
}

fn column_names(schema: &schema_forge::Schema, table: &str) -> Vec<String> {
    schema
        .get_table(table)
        .unwrap()
        .columns
        .iter()
        .map(|c| c.name.clone())
        .collect()
}

#[test]
fn test_book_gets_key_and_audit_columns() {
    let input = extraction(
        vec![RawEntity::named("Book").with_attributes(vec![RawAttribute::typed(
            "title",
            "VARCHAR(255)",
        )])],
        vec![],
    );
    let schema = normalize(&input, &NormalizeOptions::named("library")).schema;

    assert_eq!(schema.name, "library");
    assert_eq!(
        column_names(&schema, "book"),
        vec!["id", "title", "created_at", "updated_at"]
    );
    let book = schema.get_table("book").unwrap();
    assert!(book.columns[0].is_primary_key);
    assert_eq!(book.columns[0].data_type, "INTEGER");
    assert_eq!(book.columns[1].data_type, "VARCHAR(255)");
    assert_eq!(book.columns[2].data_type, "TIMESTAMP");
    assert_eq!(book.columns[3].data_type, "TIMESTAMP");
    assert_eq!(book.columns[3].default_value.as_deref(), Some("CURRENT_TIMESTAMP"));
}

#[test]
fn test_one_to_many_adds_foreign_key_to_target() {
    let input = extraction(
        vec![RawEntity::named("Author"), RawEntity::named("Book")],
        vec![RawRelationship::between("Author", "Book", "ONE_TO_MANY")],
    );
    let normalized = normalize(&input, &NormalizeOptions::default());
    let schema = &normalized.schema;
    assert!(!normalized.has_warnings());

    let book = schema.get_table("book").unwrap();
    let fk = book.get_column("author_id").expect("author_id column");
    assert_eq!(fk.data_type, "INTEGER");
    assert!(fk.is_nullable);
    assert!(fk.is_foreign_key);
    let target = fk.references.as_ref().unwrap();
    assert_eq!(target.table, "author");
    assert_eq!(target.column, "id");
    assert_eq!(target.on_delete, ReferentialAction::Cascade);
    assert_eq!(target.on_update, ReferentialAction::Cascade);

    assert!(!schema.get_table("author").unwrap().has_column("book_id"));
    assert_eq!(schema.relationships[0].rel_type, RelationshipType::OneToMany);
}

#[test]
fn test_many_to_one_puts_key_on_source() {
    let input = extraction(
        vec![RawEntity::named("Order"), RawEntity::named("Customer")],
        vec![RawRelationship::between("Order", "Customer", "N:1")],
    );
    let schema = normalize(&input, &NormalizeOptions::default()).schema;
    assert!(schema.get_table("order").unwrap().has_column("customer_id"));
    assert!(!schema.get_table("customer").unwrap().has_column("order_id"));
}

#[test]
fn test_many_to_many_adds_no_columns() {
    let input = extraction(
        vec![RawEntity::named("Student"), RawEntity::named("Course")],
        vec![RawRelationship::between("Student", "Course", "many-to-many")],
    );
    let schema = normalize(&input, &NormalizeOptions::default()).schema;
    assert!(!schema.get_table("student").unwrap().has_column("course_id"));
    assert!(!schema.get_table("course").unwrap().has_column("student_id"));
    assert_eq!(schema.relationships[0].rel_type, RelationshipType::ManyToMany);
}

#[test]
fn test_identifying_relationship_makes_composite_key() {
    let mut room = RawEntity::named("Room");
    room.is_weak_entity = Some(true);
    let input = extraction(
        vec![RawEntity::named("Building"), room],
        vec![RawRelationship::between("Building", "Room", "1:N")],
    );
    let schema = normalize(&input, &NormalizeOptions::default()).schema;

    let room = schema.get_table("room").unwrap();
    let keys: Vec<&str> = room
        .primary_key_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(keys, vec!["id", "building_id"]);
    assert!(room.is_weak_entity);
    let rel = &schema.relationships[0];
    assert!(rel.is_identifying);
    assert_eq!(rel.target_participation, Participation::Total);
}

#[test]
fn test_reference_into_weak_entity_is_unique() {
    let mut room = RawEntity::named("Room");
    room.is_weak_entity = Some(true);
    let input = extraction(
        vec![RawEntity::named("Building"), room, RawEntity::named("Booking")],
        vec![
            RawRelationship::between("Building", "Room", "1:N"),
            RawRelationship::between("Room", "Booking", "1:N"),
        ],
    );
    let schema = normalize(&input, &NormalizeOptions::default()).schema;

    let booking_fk = schema
        .get_table("booking")
        .unwrap()
        .get_column("room_id")
        .unwrap()
        .references
        .clone()
        .unwrap();
    assert_eq!((booking_fk.table.as_str(), booking_fk.column.as_str()), ("room", "id"));

    let room = schema.get_table("room").unwrap();
    assert!(room.get_column("id").unwrap().is_unique);
    assert!(!room.get_column("building_id").unwrap().is_unique);
    assert!(!schema.get_table("building").unwrap().get_column("id").unwrap().is_unique);
}

#[test]
fn test_inferred_types() {
    let input = extraction(
        vec![RawEntity::named("Product").with_attributes(vec![
            RawAttribute::named("price"),
            RawAttribute::named("contact_email"),
            RawAttribute::named("is_active"),
            RawAttribute::named("notes"),
            RawAttribute::named("nickname"),
        ])],
        vec![],
    );
    let schema = normalize(&input, &NormalizeOptions::default()).schema;
    let product = schema.get_table("product").unwrap();
    assert_eq!(product.get_column("price").unwrap().data_type, "DECIMAL(10,2)");
    assert_eq!(product.get_column("contact_email").unwrap().data_type, "VARCHAR(255)");
    assert_eq!(product.get_column("is_active").unwrap().data_type, "BOOLEAN");
    assert_eq!(product.get_column("notes").unwrap().data_type, "TEXT");
    assert_eq!(product.get_column("nickname").unwrap().data_type, "VARCHAR(255)");
}

#[test]
fn test_entity_without_attributes_gets_defaults() {
    let input = extraction(vec![RawEntity::named("Publisher")], vec![]);
    let schema = normalize(&input, &NormalizeOptions::default()).schema;
    assert_eq!(
        column_names(&schema, "publisher"),
        vec!["id", "name", "created_at", "updated_at"]
    );
    assert_eq!(schema.name, "generated_schema");
    assert_eq!(schema.version, "1.0.0");
}

#[test]
fn test_unresolved_relationship_is_dropped_with_warning() {
    let input = extraction(
        vec![RawEntity::named("Author")],
        vec![RawRelationship::between("Author", "Ghost", "1:N")],
    );
    let normalized = normalize(&input, &NormalizeOptions::default());
    assert!(normalized.schema.relationships.is_empty());
    assert!(matches!(
        normalized.warnings[0],
        NormalizeWarning::UnresolvedRelationship { .. }
    ));
}

#[test]
fn test_lookup_detection_uses_config() {
    let input = extraction(
        vec![RawEntity::named("OrderStatus").with_attributes(vec![RawAttribute::named("name")])],
        vec![],
    );
    let schema = normalize(&input, &NormalizeOptions::default()).schema;
    assert!(schema.get_table("order_status").unwrap().is_lookup_table);

    let config = NormalizeConfig::from_yaml("lookup:\n  keywords: []\n  max_columns: 0\n").unwrap();
    let schema = Normalizer::new(config)
        .normalize(&input, &NormalizeOptions::default())
        .schema;
    assert!(!schema.get_table("order_status").unwrap().is_lookup_table);
}

#[test]
fn test_schema_json_round_trip_uses_camel_case() {
    let input = extraction(vec![RawEntity::named("Book")], vec![]);
    let schema = normalize(&input, &NormalizeOptions::named("s")).schema;
    let json = serde_json::to_value(&schema).unwrap();
    assert!(json.get("createdAt").is_some());
    assert_eq!(json["tables"][0]["columns"][0]["isPrimaryKey"], true);

    let back: schema_forge::Schema = serde_json::from_value(json).unwrap();
    assert_eq!(back, schema);
}
