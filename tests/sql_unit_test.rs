//! Tests for DDL generation across dialects.

use schema_forge::model::{ExtractionResult, RawAttribute, RawEntity, RawRelationship};
use schema_forge::normalize::{normalize, NormalizeOptions};
use schema_forge::sql::{creation_order, generate_sql, generate_sql_for, SqlDialect, SqlGenerator};
use schema_forge::{GenerateError, Schema};

fn normalized(entities: Vec<RawEntity>, relationships: Vec<RawRelationship>) -> Schema {
    let input = ExtractionResult {
        entities,
        relationships,
    };
    normalize(&input, &NormalizeOptions::named("test")).schema
}

fn library() -> Schema {
    normalized(
        vec![
            RawEntity::named("Author"),
            RawEntity::named("Book").with_attributes(vec![
                RawAttribute::typed("title", "VARCHAR(255)"),
                RawAttribute::named("price"),
            ]),
        ],
        vec![RawRelationship::between("Author", "Book", "ONE_TO_MANY")],
    )
}

fn enrollment() -> Schema {
    normalized(
        vec![RawEntity::named("Student"), RawEntity::named("Course")],
        vec![RawRelationship::between("Student", "Course", "MANY_TO_MANY")],
    )
}

const ALL_DIALECTS: [SqlDialect; 4] = [
    SqlDialect::MySql,
    SqlDialect::Postgres,
    SqlDialect::Sqlite,
    SqlDialect::MsSql,
];

#[test]
fn test_many_to_many_becomes_junction_table() {
    let schema = enrollment();
    let sql = generate_sql(&schema, SqlDialect::MySql).unwrap();

    assert!(sql.contains("CREATE TABLE student_course ("));
    assert!(sql.contains("PRIMARY KEY (student_id, course_id)"));
    assert!(sql.contains("REFERENCES student(id)"));
    assert!(sql.contains("REFERENCES course(id)"));

    // Neither side gains a direct key
    let course = sql
        .split("CREATE TABLE course (")
        .nth(1)
        .and_then(|rest| rest.split(';').next())
        .unwrap();
    assert!(!course.contains("student_id"));

    // The caller's schema is untouched
    assert_eq!(schema.tables.len(), 2);
}

#[test]
fn test_junction_created_after_both_parents() {
    let sql = generate_sql(&enrollment(), SqlDialect::Postgres).unwrap();
    let junction = sql.find("CREATE TABLE student_course").unwrap();
    assert!(sql.find("CREATE TABLE student (").unwrap() < junction);
    assert!(sql.find("CREATE TABLE course (").unwrap() < junction);
}

#[test]
fn test_unknown_dialect_uses_mysql() {
    let schema = library();
    let fallback = generate_sql_for(&schema, "oracle").unwrap();
    assert!(fallback.contains("ENGINE=InnoDB"));
    assert!(fallback.contains("-- Dialect: MySQL"));
}

#[test]
fn test_parents_created_first_and_dropped_last() {
    let sql = generate_sql(&library(), SqlDialect::Postgres).unwrap();
    assert!(sql.find("CREATE TABLE author").unwrap() < sql.find("CREATE TABLE book").unwrap());
    assert!(
        sql.find("DROP TABLE IF EXISTS book").unwrap()
            < sql.find("DROP TABLE IF EXISTS author").unwrap()
    );
}

#[test]
fn test_dialect_specific_syntax() {
    let schema = library();

    let mysql = generate_sql(&schema, SqlDialect::MySql).unwrap();
    assert!(mysql.contains("id INT NOT NULL AUTO_INCREMENT"));
    assert!(mysql.contains("ON UPDATE CURRENT_TIMESTAMP"));
    assert!(mysql.contains("CONSTRAINT fk_book_author_id FOREIGN KEY (author_id) REFERENCES author(id)"));

    let pg = generate_sql(&schema, SqlDialect::Postgres).unwrap();
    assert!(pg.contains("id SERIAL"));
    assert!(pg.trim_end().ends_with("COMMIT;"));

    let sqlite = generate_sql(&schema, SqlDialect::Sqlite).unwrap();
    assert!(sqlite.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
    assert!(sqlite.contains("PRAGMA foreign_keys = OFF;"));

    let mssql = generate_sql(&schema, SqlDialect::MsSql).unwrap();
    assert!(mssql.contains("IDENTITY(1,1)"));
    assert!(mssql.contains("ALTER TABLE book ADD CONSTRAINT fk_book_author_id"));
}

#[test]
fn test_foreign_key_index_per_dialect() {
    for dialect in ALL_DIALECTS {
        let sql = generate_sql(&library(), dialect).unwrap();
        assert!(
            sql.contains("CREATE INDEX idx_book_author_id"),
            "{} is missing the FK index",
            dialect
        );
    }
}

#[test]
fn test_lookup_table_is_seeded() {
    let schema = normalized(
        vec![RawEntity::named("OrderStatus").with_attributes(vec![RawAttribute::named("name")])],
        vec![],
    );
    assert!(schema.tables[0].is_lookup_table);

    for dialect in ALL_DIALECTS {
        let sql = generate_sql(&schema, dialect).unwrap();
        assert!(sql.contains("INSERT INTO order_status (name) VALUES"), "{}", dialect);
        assert!(sql.contains("('Active')"), "{}", dialect);
    }
}

#[test]
fn test_output_is_rerunnable_and_tidy() {
    for dialect in ALL_DIALECTS {
        let sql = SqlGenerator::new(dialect)
            .without_timestamp()
            .generate(&library())
            .unwrap();
        assert!(sql.ends_with('\n') && !sql.ends_with("\n\n"), "{}", dialect);
        assert!(!sql.contains("\n\n\n"), "{}", dialect);
        assert!(sql.contains("IF EXISTS") || sql.contains("IS NOT NULL"), "{}", dialect);
    }
}

#[test]
fn test_dangling_foreign_key_is_an_error() {
    let mut schema = library();
    schema.tables.retain(|t| t.name != "author");
    schema.relationships.clear();

    let err = creation_order(&schema).unwrap_err();
    assert!(matches!(err, GenerateError::DanglingForeignKey { .. }));
    assert!(generate_sql(&schema, SqlDialect::MySql).is_err());
}

#[test]
fn test_missing_relationship_table_is_an_error() {
    let mut schema = enrollment();
    schema.tables.retain(|t| t.name != "course");

    let err = generate_sql(&schema, SqlDialect::MySql).unwrap_err();
    assert!(matches!(err, GenerateError::MissingTable { .. }));
}

/// Building owns Room (composite key); Booking and Teacher reference Room
fn campus() -> Schema {
    let mut owns = RawRelationship::between("Building", "Room", "ONE_TO_MANY");
    owns.is_identifying = Some(true);
    normalized(
        vec![
            RawEntity::named("Building"),
            RawEntity::named("Room"),
            RawEntity::named("Booking"),
            RawEntity::named("Teacher"),
        ],
        vec![
            owns,
            RawRelationship::between("Room", "Booking", "ONE_TO_MANY"),
            RawRelationship::between("Teacher", "Room", "MANY_TO_MANY"),
        ],
    )
}

/// The definition line of `column` inside `CREATE TABLE table`
fn column_line(sql: &str, table: &str, column: &str) -> String {
    let body = sql
        .split(&format!("CREATE TABLE {} (", table))
        .nth(1)
        .and_then(|rest| rest.split(';').next())
        .unwrap();
    body.lines()
        .map(|l| l.trim().trim_end_matches(','))
        .find(|l| l.starts_with(&format!("{} ", column)))
        .unwrap()
        .to_string()
}

#[test]
fn test_reference_into_composite_key_is_unique() {
    let schema = campus();
    let room = schema.get_table("room").unwrap();
    assert!(room.has_composite_key());
    assert!(room.get_column("id").unwrap().is_unique);

    let pg = generate_sql(&schema, SqlDialect::Postgres).unwrap();
    assert_eq!(column_line(&pg, "room", "id"), "id INTEGER NOT NULL UNIQUE");
    assert_eq!(column_line(&pg, "room", "building_id"), "building_id INTEGER NOT NULL");
    assert!(pg.contains("PRIMARY KEY (id, building_id)"));
    assert!(pg.contains("CONSTRAINT fk_booking_room_id FOREIGN KEY (room_id) REFERENCES room(id)"));
    assert!(pg.contains(
        "CONSTRAINT fk_teacher_room_room_id FOREIGN KEY (room_id) REFERENCES room(id)"
    ));

    let mysql = generate_sql(&schema, SqlDialect::MySql).unwrap();
    assert_eq!(column_line(&mysql, "room", "id"), "id INT NOT NULL UNIQUE");
    let mssql = generate_sql(&schema, SqlDialect::MsSql).unwrap();
    assert_eq!(column_line(&mssql, "room", "id"), "id INT NOT NULL UNIQUE");
    let sqlite = generate_sql(&schema, SqlDialect::Sqlite).unwrap();
    assert_eq!(column_line(&sqlite, "room", "id"), "id INTEGER NOT NULL UNIQUE");
}

#[test]
fn test_junction_into_composite_key_table_is_unique() {
    let mut owns = RawRelationship::between("Building", "Room", "ONE_TO_MANY");
    owns.is_identifying = Some(true);
    let schema = normalized(
        vec![
            RawEntity::named("Building"),
            RawEntity::named("Room"),
            RawEntity::named("Teacher"),
        ],
        vec![owns, RawRelationship::between("Teacher", "Room", "MANY_TO_MANY")],
    );
    // Only the junction references room, and it exists only in the DDL
    assert!(!schema.get_table("room").unwrap().get_column("id").unwrap().is_unique);

    let sql = generate_sql(&schema, SqlDialect::Postgres).unwrap();
    assert_eq!(column_line(&sql, "room", "id"), "id INTEGER NOT NULL UNIQUE");
    assert!(sql.contains("REFERENCES room(id)"));
}

#[test]
fn test_expression_defaults_are_not_quoted() {
    let mut joined = RawAttribute::typed("joined_on", "DATE");
    joined.default_value = Some("CURRENT_DATE".to_string());
    let mut token = RawAttribute::typed("token", "UUID");
    token.default_value = Some("gen_random_uuid()".to_string());
    let mut state = RawAttribute::typed("state", "VARCHAR(20)");
    state.default_value = Some("pending".to_string());
    let schema = normalized(
        vec![RawEntity::named("Member").with_attributes(vec![joined, token, state])],
        vec![],
    );

    let pg = generate_sql(&schema, SqlDialect::Postgres).unwrap();
    assert_eq!(column_line(&pg, "member", "joined_on"), "joined_on DATE DEFAULT CURRENT_DATE");
    assert_eq!(column_line(&pg, "member", "token"), "token UUID DEFAULT gen_random_uuid()");
    assert_eq!(column_line(&pg, "member", "state"), "state VARCHAR(20) DEFAULT 'pending'");

    let mysql = generate_sql(&schema, SqlDialect::MySql).unwrap();
    assert_eq!(
        column_line(&mysql, "member", "joined_on"),
        "joined_on DATE DEFAULT (CURRENT_DATE)"
    );
    assert_eq!(
        column_line(&mysql, "member", "token"),
        "token CHAR(36) DEFAULT (gen_random_uuid())"
    );

    let mssql = generate_sql(&schema, SqlDialect::MsSql).unwrap();
    assert_eq!(
        column_line(&mssql, "member", "joined_on"),
        "joined_on DATE DEFAULT CAST(GETDATE() AS DATE)"
    );
}

#[test]
fn test_mssql_cascades_once_per_parent() {
    let schema = normalized(
        vec![RawEntity::named("User")],
        vec![RawRelationship::between("User", "User", "MANY_TO_MANY")],
    );

    let mssql = generate_sql(&schema, SqlDialect::MsSql).unwrap();
    assert!(mssql.contains(
        "CONSTRAINT fk_user_user_user_id FOREIGN KEY (user_id) REFERENCES [user](id) ON DELETE CASCADE ON UPDATE CASCADE"
    ));
    assert!(mssql.contains(
        "CONSTRAINT fk_user_user_related_user_id FOREIGN KEY (related_user_id) REFERENCES [user](id) ON DELETE NO ACTION ON UPDATE NO ACTION"
    ));

    // Other dialects keep both cascades
    let pg = generate_sql(&schema, SqlDialect::Postgres).unwrap();
    assert!(pg.contains(
        "FOREIGN KEY (related_user_id) REFERENCES \"user\"(id) ON DELETE CASCADE ON UPDATE CASCADE"
    ));
}
