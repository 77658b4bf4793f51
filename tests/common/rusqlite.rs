use ::rusqlite::{
    Connection, params_from_iter,
    types::{Value as SqlValue, ValueRef},
};
use lattice::prelude::*;

/// In-memory SQLite database with the `world` tables and rows.
pub fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    conn.execute_batch(
        "
        CREATE TABLE country (id INTEGER PRIMARY KEY, name TEXT);
        CREATE TABLE city (id INTEGER PRIMARY KEY, name TEXT, country_id INTEGER, population INTEGER);
        CREATE TABLE address (id INTEGER PRIMARY KEY, street TEXT, city_id INTEGER);
        CREATE TABLE customer (id INTEGER PRIMARY KEY, name TEXT, address_id INTEGER);
        CREATE TABLE actor (id INTEGER PRIMARY KEY, name TEXT);
        CREATE TABLE film (id INTEGER PRIMARY KEY, title TEXT, release_year INTEGER, rating INTEGER, length INTEGER);
        CREATE TABLE film_actor (actor_id INTEGER, film_id INTEGER);

        INSERT INTO country (id, name) VALUES (1, 'Switzerland'), (2, 'Iceland'), (3, 'Atlantis');
        INSERT INTO city (id, name, country_id, population) VALUES
            (1, 'Bern', 1, 133000),
            (2, 'Zurich', 1, 421000),
            (3, 'Geneva', 1, 203000),
            (4, 'Basel', 1, 173000),
            (5, 'Lausanne', 1, 140000),
            (6, 'Reykjavik', 2, 131000),
            (7, 'Nowhere', NULL, NULL);
        INSERT INTO address (id, street, city_id) VALUES (1, 'Bundesplatz 3', 1), (2, 'Laugavegur 1', 6);
        INSERT INTO customer (id, name, address_id) VALUES (1, 'Anna', 1), (2, 'Jon', 2);
        INSERT INTO actor (id, name) VALUES (1, 'Penelope'), (2, 'Nick');
        INSERT INTO film (id, title, release_year, rating, length) VALUES
            (1, 'Academy Dinosaur', 2006, 3, 5160),
            (2, 'Ace Goldfinger', 2006, NULL, 2880),
            (3, 'Adaptation Holes', 2006, 5, 3000);
        INSERT INTO film_actor (actor_id, film_id) VALUES (1, 1), (1, 2), (2, 1);
        ",
    )
    .expect("Failed to seed database");
    conn
}

/// [`Executor`] over a rusqlite connection, returning rows keyed by column
/// alias.
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn seeded() -> Self {
        Self::new(setup_db())
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_json().to_string()),
    }
}

fn to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => i.into(),
        ValueRef::Real(f) => f.into(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned().into(),
        ValueRef::Blob(bytes) => bytes.to_vec().into(),
    }
}

impl Executor for SqliteExecutor {
    type Error = ::rusqlite::Error;

    fn query(&self, sql: &str, params: &[Value]) -> std::result::Result<Vec<Row>, Self::Error> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt.query_map(params_from_iter(params.iter().map(to_sql_value)), |row| {
            let mut record = Row::new();
            for (index, name) in names.iter().enumerate() {
                record.insert(name.clone(), to_json(row.get_ref(index)?));
            }
            Ok(record)
        })?;
        rows.collect()
    }
}
