//! Shared fixtures: an in-memory SQLite database and three related entities
#![allow(dead_code)]

use quarry_orm::once_cell::sync::Lazy;
use quarry_orm::{
    ConnectionConfig, DatabaseConfig, DatabaseManager, EntityState, Model, ModelDescriptor, OrmResult, PoolConfig,
    QueryBuilder, Record, RelationProvider, RelationRegistry,
};
use serde_json::Value;

pub const SCHEMA: [&str; 3] = [
    "CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT,
        password TEXT,
        settings TEXT,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT
    )",
    "CREATE TABLE orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER,
        total INTEGER,
        status TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id INTEGER,
        name TEXT
    )",
];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory SQLite connection; one pooled connection keeps the database alive
pub fn memory_connection() -> ConnectionConfig {
    ConnectionConfig::Sqlite {
        url: "sqlite::memory:".to_string(),
        pool: PoolConfig {
            max_connections: 1,
            min_connections: 1,
            idle_timeout: None,
            max_lifetime: None,
            ..Default::default()
        },
    }
}

pub async fn create_schema(db: &DatabaseManager, connection: Option<&str>) {
    let adapter = db.sql(connection).unwrap();
    for statement in SCHEMA {
        adapter.execute(statement, &[]).await.unwrap();
    }
}

pub async fn sqlite_db() -> DatabaseManager {
    init_tracing();
    let db = DatabaseManager::from_config(&DatabaseConfig::single("main", memory_connection()))
        .await
        .unwrap();
    create_schema(&db, None).await;
    db
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

#[derive(Debug, Clone)]
pub struct User {
    state: EntityState,
}

static USER: Lazy<ModelDescriptor> = Lazy::new(|| {
    ModelDescriptor::new("User")
        .fillable(&["name", "email", "password", "settings"])
        .hidden(&["password"])
        .soft_deletes(true)
        .cast("settings", quarry_orm::Cast::Object)
        .accessor("name", |value| match value {
            Value::String(name) => Value::String(name.trim().to_string()),
            other => other,
        })
        .mutator("email", |value| match value {
            Value::String(email) => Value::String(email.to_lowercase()),
            other => other,
        })
});

impl Model for User {
    fn descriptor() -> &'static ModelDescriptor {
        &USER
    }

    fn from_state(state: EntityState) -> Self {
        Self { state }
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl User {
    pub fn orders(&self) -> OrmResult<QueryBuilder<Order>> {
        self.has_many(Some("user_id"))
    }
}

impl RelationProvider for User {
    fn register_relations(registry: &mut RelationRegistry<Self>) {
        registry.register("orders", User::orders);
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    state: EntityState,
}

static ORDER: Lazy<ModelDescriptor> = Lazy::new(|| ModelDescriptor::new("Order").fillable(&["total", "status"]));

impl Model for Order {
    fn descriptor() -> &'static ModelDescriptor {
        &ORDER
    }

    fn from_state(state: EntityState) -> Self {
        Self { state }
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl Order {
    pub fn items(&self) -> OrmResult<QueryBuilder<Item>> {
        self.has_many(Some("order_id"))
    }
}

impl RelationProvider for Order {
    fn register_relations(registry: &mut RelationRegistry<Self>) {
        registry.register("items", Order::items);
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    state: EntityState,
}

static ITEM: Lazy<ModelDescriptor> = Lazy::new(|| {
    ModelDescriptor::new("Item")
        .guarded(&["id"])
        .timestamps(false)
});

impl Model for Item {
    fn descriptor() -> &'static ModelDescriptor {
        &ITEM
    }

    fn from_state(state: EntityState) -> Self {
        Self { state }
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl RelationProvider for Item {}

/// Entity with neither fillable nor guarded columns
#[derive(Debug, Clone)]
pub struct AuditLog {
    state: EntityState,
}

static AUDIT_LOG: Lazy<ModelDescriptor> = Lazy::new(|| ModelDescriptor::new("AuditLog"));

impl Model for AuditLog {
    fn descriptor() -> &'static ModelDescriptor {
        &AUDIT_LOG
    }

    fn from_state(state: EntityState) -> Self {
        Self { state }
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

pub async fn create_order(db: &DatabaseManager, user_id: &Value, total: i64) -> Order {
    let mut order = Order::make(record(serde_json::json!({"total": total, "status": "pending"}))).unwrap();
    order.set_raw_attribute("user_id", user_id.clone());
    order.save(db).await.unwrap();
    order
}
