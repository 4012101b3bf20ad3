use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread")]
async fn products_survive_a_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("storefront.db");
    let db_path = db_path.to_string_lossy().to_string();

    {
        let db = surrealdb::Surreal::new::<surrealdb::engine::local::RocksDb>(db_path.as_str())
            .await
            .expect("open");
        db.use_ns("a").use_db("b").await.expect("ns");
        db.query(
            "DEFINE INDEX IF NOT EXISTS user_email ON TABLE user FIELDS email UNIQUE;
             DEFINE INDEX IF NOT EXISTS order_guest_email ON TABLE order FIELDS owner.guest.email;
             DEFINE INDEX IF NOT EXISTS order_owner_user ON TABLE order FIELDS owner.registered.user;
             DEFINE INDEX IF NOT EXISTS route_driver ON TABLE delivery_route FIELDS driver;",
        ).await.expect("indexes");
        db.query("CREATE product SET name = 'Widget'").await.expect("create");
        drop(db);
    }
    eprintln!("dropped first handle");
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    let db = surrealdb::Surreal::new::<surrealdb::engine::local::RocksDb>(db_path.as_str())
        .await
        .expect("reopen");
    db.use_ns("a").use_db("b").await.expect("ns2");
    eprintln!("reopened OK");
}
