use pretty_assertions::assert_eq;
use seed_dump::prelude::*;
use sqlx::any::AnyPoolOptions;

fn sqlite_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("test.sqlite3").display())
}

fn seed(url: &str, statements: &[&str]) {
    sqlx::any::install_default_drivers();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .unwrap();
        for sql in statements {
            sqlx::query(sql).execute(&pool).await.unwrap();
        }
        pool.close().await;
    });
}

fn users_db(dir: &tempfile::TempDir) -> String {
    let url = sqlite_url(dir);
    seed(
        &url,
        &[
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER, score REAL)",
            "INSERT INTO users VALUES (3, 'Cy', 40, 2.25)",
            "INSERT INTO users VALUES (1, 'Al', 5, 1.5)",
            "INSERT INTO users VALUES (2, 'Bo', NULL, NULL)",
        ],
    );
    url
}

#[test]
fn test_pages_in_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let url = users_db(&dir);

    let table = Paged::new(SqlTable::connect(&url, "users").unwrap());
    assert_eq!(table.model_name(), "User");
    assert_eq!(
        table.attribute_names().unwrap(),
        vec!["id", "name", "age", "score"]
    );

    let options = DumpOptions::new().with_batch_size(2);
    assert_eq!(
        seed_dump::dump(&table, &options).unwrap().as_deref(),
        Some(
            "User.create!([
  {name: \"Al\", age: 5, score: 1.5},
  {name: \"Bo\", age: nil, score: nil},
  {name: \"Cy\", age: 40, score: 2.25}
])
"
        )
    );
}

#[test]
fn test_filter_limit_and_model() {
    let dir = tempfile::tempdir().unwrap();
    let url = users_db(&dir);

    let query = SqlTable::connect(&url, "users")
        .unwrap()
        .with_model("Member")
        .with_filter("age IS NOT NULL")
        .with_order_by("age")
        .unwrap();
    let table = Paged::new(query);
    assert_eq!(table.count(None).unwrap(), 2);

    let options = DumpOptions::new()
        .with_limit(1)
        .with_import(ImportOptions::new())
        .with_exclude(vec!["id".to_string(), "score".to_string()]);
    assert_eq!(
        seed_dump::dump(&table, &options).unwrap().as_deref(),
        Some("Member.import([:name, :age], [\n  [\"Al\", 5]\n])\n")
    );
}

fn rails_db(dir: &tempfile::TempDir) -> String {
    let url = sqlite_url(dir);
    seed(
        &url,
        &[
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name varchar, price decimal(8,2), \
             active boolean, avatar blob, born_on date, \
             created_at datetime(6) NOT NULL, updated_at datetime(6) NOT NULL)",
            "INSERT INTO users VALUES (1, 'Al', 19.99, 1, x'00ff', '1990-05-17', \
             '2020-01-01 00:00:00.000000', '2020-01-01 00:00:00.000000')",
            "INSERT INTO users VALUES (2, 'Bo', 5, 0, NULL, NULL, \
             '2020-01-02 00:00:00.000000', '2020-01-02 00:00:00.000000')",
        ],
    );
    url
}

#[test]
fn test_rails_column_types_keep_their_values() {
    let dir = tempfile::tempdir().unwrap();
    let url = rails_db(&dir);

    let table = Paged::new(SqlTable::connect(&url, "users").unwrap());
    assert_eq!(
        seed_dump::dump(&table, &DumpOptions::default()).unwrap().as_deref(),
        Some(
            "User.create!([
  {name: \"Al\", price: \"19.99\", active: true, avatar: \"\\x00\\xFF\".b, born_on: \"1990-05-17\"},
  {name: \"Bo\", price: \"5\", active: false, avatar: nil, born_on: nil}
])
"
        )
    );
}

#[test]
fn test_timestamps_decode_when_kept() {
    let dir = tempfile::tempdir().unwrap();
    let url = rails_db(&dir);

    let query = SqlTable::connect(&url, "users")
        .unwrap()
        .with_filter("id = 1");
    let options = DumpOptions::new().with_exclude(["id", "name", "price", "active", "avatar", "born_on"]);
    assert_eq!(
        seed_dump::dump(&Paged::new(query), &options).unwrap().as_deref(),
        Some(
            "User.create!([
  {created_at: \"2020-01-01 00:00:00\", updated_at: \"2020-01-01 00:00:00\"}
])
"
        )
    );
}

#[test]
fn test_excluded_columns_are_not_selected() {
    let dir = tempfile::tempdir().unwrap();
    let url = rails_db(&dir);

    let query = SqlTable::connect(&url, "users")
        .unwrap()
        .without_columns(["id", "created_at", "updated_at"]);
    let names: Vec<&str> = query.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["name", "price", "active", "avatar", "born_on"]);

    let options = DumpOptions::new().with_import(ImportOptions::new());
    assert_eq!(
        seed_dump::dump(&Paged::new(query), &options).unwrap().as_deref(),
        Some(
            "User.import([:name, :price, :active, :avatar, :born_on], [
  [\"Al\", \"19.99\", true, \"\\x00\\xFF\".b, \"1990-05-17\"],
  [\"Bo\", \"5\", false, nil, nil]
])
"
        )
    );
}

#[test]
fn test_values_follow_their_runtime_type() {
    let dir = tempfile::tempdir().unwrap();
    let url = sqlite_url(&dir);
    seed(
        &url,
        &[
            "CREATE TABLE readings (id INTEGER PRIMARY KEY, value, note TEXT, ratio REAL)",
            "INSERT INTO readings VALUES (1, 7, 'ok', 0.1)",
            "INSERT INTO readings VALUES (2, 2.5, 'x', 3)",
            "INSERT INTO readings VALUES (3, 'n/a', NULL, NULL)",
        ],
    );

    let table = Paged::new(SqlTable::connect(&url, "readings").unwrap());
    assert_eq!(
        seed_dump::dump(&table, &DumpOptions::default()).unwrap().as_deref(),
        Some(
            "Reading.create!([
  {value: 7, note: \"ok\", ratio: 0.1},
  {value: 2.5, note: \"x\", ratio: 3.0},
  {value: \"n/a\", note: nil, ratio: nil}
])
"
        )
    );
}

#[test]
fn test_unknown_table() {
    let dir = tempfile::tempdir().unwrap();
    let url = sqlite_url(&dir);
    seed(&url, &["CREATE TABLE posts (id INTEGER PRIMARY KEY)"]);
    assert!(matches!(
        SqlTable::connect(&url, "missing"),
        Err(DumpError::Config(_))
    ));
}

#[test]
fn test_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let url = sqlite_url(&dir);
    seed(&url, &["CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT)"]);

    let table = Paged::new(SqlTable::connect(&url, "posts").unwrap());
    assert_eq!(seed_dump::dump(&table, &DumpOptions::default()).unwrap(), None);
}

#[test]
fn test_rejects_unsafe_table_name() {
    let dir = tempfile::tempdir().unwrap();
    let url = sqlite_url(&dir);
    assert!(matches!(
        SqlTable::connect(&url, "users; DROP TABLE users"),
        Err(DumpError::Config(_))
    ));
}
