//! End-to-end behavior against an in-memory SQLite database

mod common;

use common::{create_order, create_schema, memory_connection, record, sqlite_db, Item, Order, User};
use quarry_orm::{DatabaseConfig, DatabaseManager, Model, ModelError, RelationProvider, ResultEnvelope};
use serde_json::{json, Value};

#[tokio::test]
async fn test_order_create_assigns_backend_key() {
    let db = sqlite_db().await;

    let order = Order::create(&db, record(json!({"total": 42, "status": "pending"})))
        .await
        .unwrap();

    assert!(!order.get_key().is_null());
    assert!(order.is_persisted());
    assert_eq!(order.get_raw_attribute("total"), json!(42));

    let stored = Order::find_or_fail(&db, order.get_key()).await.unwrap();
    assert_eq!(stored.get_attribute("status"), json!("pending"));
    assert!(!stored.get_attribute("created_at").is_null());
}

#[tokio::test]
async fn test_nested_eager_loading() {
    let db = sqlite_db().await;

    let mut user_ids = Vec::new();
    for name in ["ada", "lin", "sam"] {
        let user = User::create(&db, record(json!({"name": name}))).await.unwrap();
        user_ids.push(user.get_key());
    }

    let with_items = create_order(&db, &user_ids[0], 30).await;
    create_order(&db, &user_ids[0], 5).await;
    create_order(&db, &user_ids[1], 12).await;

    for name in ["pen", "ink"] {
        let mut item = Item::make(record(json!({"name": name}))).unwrap();
        item.set_attribute("order_id", with_items.get_key()).unwrap();
        item.save(&db).await.unwrap();
    }

    let users = User::query()
        .order_by_asc("id")
        .with(&["orders.items"])
        .get(&db)
        .await
        .unwrap();

    assert_eq!(users.len(), 3);
    let with_orders: Vec<_> = users.iter().filter(|user| user.contains_key("orders")).collect();
    assert_eq!(with_orders.len(), 2);
    assert!(!users[2].contains_key("orders"));

    let orders: Vec<&Value> = with_orders
        .iter()
        .flat_map(|user| user["orders"].as_array().unwrap())
        .collect();
    assert_eq!(orders.len(), 3);
    for order in orders {
        if order["id"] == with_items.get_key() {
            assert_eq!(order["items"].as_array().unwrap().len(), 2);
        } else {
            assert!(order.get("items").is_none());
        }
    }

    // hidden columns never reach the plain rows
    assert!(users.iter().all(|user| !user.contains_key("password")));
}

#[tokio::test]
async fn test_eager_loading_composes_with_root_filters() {
    let db = sqlite_db().await;
    let ada = User::create(&db, record(json!({"name": "ada"}))).await.unwrap();
    let lin = User::create(&db, record(json!({"name": "lin"}))).await.unwrap();
    create_order(&db, &ada.get_key(), 7).await;
    create_order(&db, &lin.get_key(), 9).await;

    let user = User::where_eq("name", "lin")
        .with(&["orders:id,total,user_id"])
        .first(&db)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user["name"], json!("lin"));
    let orders = user["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["total"], json!(9));
    assert!(orders[0].get("status").is_none());

    assert!(User::where_eq("name", "nobody").with(&["orders"]).first(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_select_is_classified_as_rows() {
    let db = sqlite_db().await;
    let adapter = db.sql(None).unwrap();
    User::create(&db, record(json!({"name": "ada"}))).await.unwrap();

    let envelope = adapter.execute("SELECT * FROM users", &[]).await.unwrap();
    assert!(matches!(envelope, ResultEnvelope::Rows(ref rows) if rows.len() == 1));
    assert_eq!(envelope.affected(), None);

    let envelope = adapter
        .execute("WITH named AS (SELECT name FROM users) SELECT name FROM named", &[])
        .await
        .unwrap();
    assert_eq!(envelope.into_rows()[0]["name"], json!("ada"));
}

#[tokio::test]
async fn test_insert_identifier_recovery() {
    let db = sqlite_db().await;
    let adapter = db.sql(None).unwrap();

    adapter
        .execute("CREATE TABLE tags (label TEXT PRIMARY KEY) WITHOUT ROWID", &[])
        .await
        .unwrap();
    let envelope = adapter
        .execute("INSERT INTO tags (label) VALUES (?)", &["rust".into()])
        .await
        .unwrap();
    assert!(matches!(envelope, ResultEnvelope::Mutation { affected: 1, .. }));
    assert_eq!(envelope.last_insert_row_id(), None);

    let envelope = adapter
        .execute("INSERT INTO items (name) VALUES (?)", &["pen".into()])
        .await
        .unwrap();
    assert_eq!(envelope.last_insert_row_id(), Some(&json!(1)));

    let envelope = adapter
        .execute("INSERT INTO items (name) VALUES (?) RETURNING id", &["ink".into()])
        .await
        .unwrap();
    assert_eq!(envelope.last_insert_row_id(), Some(&json!(2)));

    let envelope = adapter.execute("DROP TABLE tags", &[]).await.unwrap();
    assert!(matches!(envelope, ResultEnvelope::Definition { ref message, .. } if message == "Executed"));
}

#[tokio::test]
async fn test_backend_failure_carries_statement() {
    let db = sqlite_db().await;
    let adapter = db.sql(None).unwrap();

    let error = adapter
        .execute("SELECT * FROM missing WHERE id = ?", &[7i64.into()])
        .await
        .unwrap_err();

    match error {
        ModelError::Backend { statement, params, .. } => {
            assert_eq!(statement, "SELECT * FROM missing WHERE id = ?");
            assert_eq!(params, vec!["Int64(7)".to_string()]);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_update_soft_delete_and_restore() {
    let db = sqlite_db().await;
    let mut user = User::create(&db, record(json!({"name": "ada", "email": "ADA@Example.com"})))
        .await
        .unwrap();
    assert_eq!(user.get_raw_attribute("email"), json!("ada@example.com"));

    user.set_attribute("name", "  ada lovelace ").unwrap();
    user.soft_delete().unwrap();
    user.save(&db).await.unwrap();

    let stored = User::find_or_fail(&db, user.get_key()).await.unwrap();
    assert_eq!(stored.get_attribute("name"), json!("ada lovelace"));
    assert!(stored.is_trashed().unwrap());

    let mut stored = stored;
    stored.restore().unwrap();
    stored.save(&db).await.unwrap();
    assert!(!User::find_or_fail(&db, user.get_key()).await.unwrap().is_trashed().unwrap());

    let mut order = Order::new();
    assert!(matches!(order.soft_delete(), Err(ModelError::Configuration(_))));
}

#[tokio::test]
async fn test_queries_count_and_pluck() {
    let db = sqlite_db().await;
    let user = User::create(&db, record(json!({"name": "ada"}))).await.unwrap();
    for total in [5, 15, 25] {
        create_order(&db, &user.get_key(), total).await;
    }

    assert_eq!(Order::query().count(&db).await.unwrap(), 3);
    assert_eq!(Order::where_between("total", 10, 30).count(&db).await.unwrap(), 2);

    let totals = Order::where_in("total", vec![5, 25])
        .order_by_desc("total")
        .get(&db)
        .await
        .unwrap()
        .pluck("total");
    assert_eq!(totals, vec![json!(25), json!(5)]);

    let missing = Order::find_or_fail(&db, 999).await;
    assert!(matches!(missing, Err(ModelError::NotFound(_))));
    assert!(Order::where_null("status").first(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_connection_scope_writes_to_named_connection() {
    let mut config = DatabaseConfig::single("main", memory_connection());
    config.connections.insert("archive".to_string(), memory_connection());
    let db = DatabaseManager::from_config(&config).await.unwrap();
    create_schema(&db, None).await;
    create_schema(&db, Some("archive")).await;

    let order = Order::on("archive")
        .create(&db, record(json!({"total": 3, "status": "archived"})))
        .await
        .unwrap();

    assert_eq!(order.get_connection(), Some("archive"));
    assert!(Order::on("archive").find(&db, order.get_key()).await.unwrap().is_some());
    assert_eq!(Order::query().count(&db).await.unwrap(), 0);

    db.close().await;
}

#[tokio::test]
async fn test_relation_accessor_queries_children() {
    let db = sqlite_db().await;
    let user = User::create(&db, record(json!({"name": "ada"}))).await.unwrap();
    create_order(&db, &user.get_key(), 11).await;

    let orders = user.orders().unwrap().get(&db).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].get_attribute("user_id"), user.get_key());

    assert_eq!(User::relations().names(), vec!["orders"]);
}
