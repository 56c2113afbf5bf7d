//! Migration scaffold around an insertion statement.
//!
//! ```text
//! class Seed < ActiveRecord::Migration
//!   def change
//!     if User.where(active: true).empty?
//!       User.create!([
//!         {name: "Al"}
//!       ])
//!     end
//!   end
//! end
//! ```

use std::io::Write;
use std::path::Path;

use crate::error::{DumpError, DumpResult};
use crate::inflect::classify;
use crate::options::DumpOptions;
use crate::source::RecordSource;
use crate::statement::write_statement;

/// Statement indentation inside `def change`.
const BODY_INDENT: usize = 4;
/// Statement indentation inside the emptiness guard.
const GUARDED_INDENT: usize = 6;

/// Class name for a migration file: `db/seeds.rb` -> `Seed`. A leading
/// version prefix (`20240101_`) is not part of the name.
pub fn migration_class_name(path: &Path) -> DumpResult<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            DumpError::config(format!(
                "cannot derive a class name from '{}'",
                path.display()
            ))
        })?;
    let name = match stem.split_once('_') {
        Some((version, rest))
            if !version.is_empty()
                && !rest.is_empty()
                && version.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest
        }
        _ => stem,
    };
    Ok(classify(name))
}

/// Write a migration class whose `change` method inserts every record.
pub fn write_migration<S, W>(
    source: &S,
    options: &DumpOptions,
    path: &Path,
    out: &mut W,
) -> DumpResult<()>
where
    S: RecordSource + ?Sized,
    W: Write + ?Sized,
{
    let class_name = migration_class_name(path)?;

    writeln!(out, "class {} < {}", class_name, options.migration_base)?;
    writeln!(out, "  def change")?;

    match &options.query {
        Some(query) => {
            writeln!(
                out,
                "    if {}.where({}).empty?",
                source.model_name(),
                query
            )?;
            write_statement(source, options, out, GUARDED_INDENT)?;
            writeln!(out, "    end")?;
        }
        None => write_statement(source, options, out, BODY_INDENT)?,
    }

    writeln!(out, "  end")?;
    writeln!(out, "end")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::source::Collection;
    use pretty_assertions::assert_eq;

    fn render(options: &DumpOptions, path: &str) -> String {
        let source = Collection::new("User", vec![Record::new().with("id", 1).with("name", "Al")]);
        let mut buf = Vec::new();
        write_migration(&source, options, Path::new(path), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_unguarded() {
        assert_eq!(
            render(&DumpOptions::default(), "db/seeds.rb"),
            "class Seed < ActiveRecord::Migration
  def change
    User.create!([
      {name: \"Al\"}
    ])
  end
end
"
        );
    }

    #[test]
    fn test_guarded() {
        let options = DumpOptions::new()
            .with_query("active: true")
            .with_migration_base("ActiveRecord::Migration[7.1]");
        assert_eq!(
            render(&options, "db/migrate/20240101_seed_users.rb"),
            "class SeedUser < ActiveRecord::Migration[7.1]
  def change
    if User.where(active: true).empty?
      User.create!([
        {name: \"Al\"}
      ])
    end
  end
end
"
        );
    }

    #[test]
    fn test_class_name_needs_a_stem() {
        assert!(migration_class_name(Path::new("/")).is_err());
        assert_eq!(migration_class_name(Path::new("user_roles.rb")).unwrap(), "UserRole");
        assert_eq!(
            migration_class_name(Path::new("db/migrate/20240101_add_seeds.rb")).unwrap(),
            "AddSeed"
        );
    }
}
