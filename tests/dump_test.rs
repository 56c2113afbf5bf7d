use pretty_assertions::assert_eq;
use seed_dump::prelude::*;
use std::fs;

fn users() -> Collection {
    Collection::new(
        "User",
        vec![
            Record::new()
                .with("id", 1)
                .with("name", "Al")
                .with("admin", true)
                .with("created_at", "2020-01-01 00:00:00"),
            Record::new()
                .with("id", 2)
                .with("name", "Bo \"the\" builder")
                .with("admin", Value::Null)
                .with("created_at", "2020-01-02 00:00:00"),
        ],
    )
}

#[test]
fn test_in_memory_dump() {
    let code = seed_dump::dump(&users(), &DumpOptions::default()).unwrap();
    assert_eq!(
        code.as_deref(),
        Some(
            "User.create!([
  {name: \"Al\", admin: true},
  {name: \"Bo \\\"the\\\" builder\", admin: nil}
])
"
        )
    );
}

#[test]
fn test_empty_source_does_no_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeds.rb");
    let empty = Collection::new("User", vec![]);

    assert_eq!(seed_dump::dump(&empty, &DumpOptions::default()).unwrap(), None);

    let options = DumpOptions::new().with_file(&path);
    assert_eq!(seed_dump::dump(&empty, &options).unwrap(), None);
    assert!(!path.exists());
}

#[test]
fn test_file_dump_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeds.rb");
    let options = DumpOptions::new().with_file(&path);

    assert_eq!(seed_dump::dump(&users(), &options).unwrap(), None);
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("User.create!([\n  {name: \"Al\""));
    assert!(written.ends_with("\n])\n"));
}

#[test]
fn test_append_keeps_prior_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeds.rb");
    fs::write(&path, "# existing\n").unwrap();

    let append = DumpOptions::new().with_file(&path).with_append(true);
    seed_dump::dump(&users(), &append).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# existing\nUser.create!(["));

    let truncate = DumpOptions::new().with_file(&path);
    seed_dump::dump(&users(), &truncate).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("User.create!(["));
    assert!(!content.contains("# existing"));
}

#[test]
fn test_import_form() {
    let source = Collection::new(
        "Model",
        vec![Record::new().with("name", "Al").with("age", 5)],
    );
    let options = DumpOptions::new().with_import(ImportOptions::new());
    assert_eq!(
        seed_dump::dump(&source, &options).unwrap().as_deref(),
        Some("Model.import([:name, :age], [\n  [\"Al\", 5]\n])\n")
    );
}

#[test]
fn test_import_with_parsed_options() {
    let options = DumpOptions::new()
        .with_import(ImportOptions::parse("validate: false, on_duplicate_key_ignore: true").unwrap());
    let code = seed_dump::dump(&users(), &options).unwrap().unwrap();
    assert_eq!(
        code,
        "User.import([:name, :admin], [
  [\"Al\", true],
  [\"Bo \\\"the\\\" builder\", nil]
], validate: false, on_duplicate_key_ignore: true)
"
    );
}

#[test]
fn test_migration_requires_file() {
    let options = DumpOptions::new().as_migration();
    assert!(matches!(
        seed_dump::dump(&users(), &options),
        Err(DumpError::Config(_))
    ));
}

#[test]
fn test_migration_with_and_without_guard() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeds.rb");

    let plain = DumpOptions::new().with_file(&path).as_migration();
    seed_dump::dump(&users(), &plain).unwrap();
    let unguarded = fs::read_to_string(&path).unwrap();
    assert_eq!(
        unguarded,
        "class Seed < ActiveRecord::Migration
  def change
    User.create!([
      {name: \"Al\", admin: true},
      {name: \"Bo \\\"the\\\" builder\", admin: nil}
    ])
  end
end
"
    );

    let guarded = plain.clone().with_query("active: true");
    seed_dump::dump(&users(), &guarded).unwrap();
    let guarded = fs::read_to_string(&path).unwrap();
    assert!(guarded.contains("    if User.where(active: true).empty?\n"));
    assert!(guarded.contains("\n    end\n  end\nend\n"));

    // Statement lines sit two columns deeper inside the guard
    let statement_line = |text: &str| {
        text.lines()
            .find(|l| l.trim_start().starts_with("User.create!"))
            .map(|l| l.len() - l.trim_start().len())
            .unwrap()
    };
    assert_eq!(statement_line(&unguarded), 4);
    assert_eq!(statement_line(&guarded), 6);
}

#[test]
fn test_limit_and_batches() {
    let records: Vec<Record> = (1..=7).map(|i| Record::new().with("n", i)).collect();
    let source = Collection::new("Item", records);
    let options = DumpOptions::new().with_batch_size(3).with_limit(5);
    assert_eq!(
        seed_dump::dump(&source, &options).unwrap().as_deref(),
        Some("Item.create!([\n  {n: 1},\n  {n: 2},\n  {n: 3},\n  {n: 4},\n  {n: 5}\n])\n")
    );
}

#[test]
fn test_rich_values() {
    use chrono::NaiveDate;
    use std::net::Ipv4Addr;

    let record = Record::new()
        .with("born_on", NaiveDate::from_ymd_opt(1990, 5, 17).unwrap())
        .with("ip", Ipv4Addr::new(10, 0, 0, 1))
        .with("price", "19.99".parse::<rust_decimal::Decimal>().unwrap())
        .with("ages", Value::range(Some(18.into()), None, true))
        .with("location", Value::geometry("POINT (-71.06 42.36)"))
        .with("tags", Value::Array(vec!["a".into(), "b".into()]))
        .with("score", 0.5);
    let source = Collection::new("Person", vec![record]);

    assert_eq!(
        seed_dump::dump(&source, &DumpOptions::default()).unwrap().as_deref(),
        Some(
            "Person.create!([
  {born_on: \"1990-05-17\", ip: \"10.0.0.1\", price: \"19.99\", ages: \"[18,)\", location: \"POINT (-71.06 42.36)\", tags: [\"a\", \"b\"], score: 0.5}
])
"
        )
    );
}

#[test]
fn test_paged_source_matches_collection() {
    struct Table(Vec<Record>);

    impl PagedQuery for Table {
        fn model_name(&self) -> String {
            "User".into()
        }
        fn attribute_names(&self) -> DumpResult<Vec<String>> {
            Ok(vec!["id".into(), "name".into(), "admin".into(), "created_at".into()])
        }
        fn count(&self) -> DumpResult<usize> {
            Ok(self.0.len())
        }
        fn fetch_page(&self, offset: usize, limit: usize) -> DumpResult<Vec<Record>> {
            Ok(self.0.iter().skip(offset).take(limit).cloned().collect())
        }
    }

    let collection = users();
    let paged = Paged::new(Table(collection.records().to_vec()));
    let options = DumpOptions::new().with_batch_size(1);
    assert_eq!(
        seed_dump::dump(&paged, &options).unwrap(),
        seed_dump::dump(&collection, &DumpOptions::default()).unwrap()
    );
}

#[test]
fn test_json_source() {
    let source = Collection::from_json(
        "Product",
        r#"[{"id": 1, "title": "Mug", "price": 4.5, "meta": {"color": "red"}}]"#,
    )
    .unwrap();
    assert_eq!(
        seed_dump::dump(&source, &DumpOptions::default()).unwrap().as_deref(),
        Some("Product.create!([\n  {title: \"Mug\", price: 4.5, meta: {\"color\" => \"red\"}}\n])\n")
    );
}

#[test]
fn test_dump_records_reports_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeds.rb");
    let empty = Collection::new("User", vec![]);

    assert_eq!(
        seed_dump::dump_records(&empty, &DumpOptions::new().with_file(&path)).unwrap(),
        Dumped::Empty
    );
    assert_eq!(
        seed_dump::dump_records(&users(), &DumpOptions::new().with_file(&path)).unwrap(),
        Dumped::File { records: 2 }
    );
    assert!(matches!(
        seed_dump::dump_records(&users(), &DumpOptions::new().with_limit(1)).unwrap(),
        Dumped::Code { records: 1, .. }
    ));
}

#[test]
fn test_import_json_rows_with_mixed_key_order() {
    let source = Collection::from_json(
        "Item",
        r#"[{"a": 1, "b": 2}, {"b": 3, "a": 4}, {"a": 5}]"#,
    )
    .unwrap();
    let options = DumpOptions::new().with_import(ImportOptions::new());
    assert_eq!(
        seed_dump::dump(&source, &options).unwrap().as_deref(),
        Some("Item.import([:a, :b], [\n  [1, 2],\n  [4, 3],\n  [5, nil]\n])\n")
    );
}
