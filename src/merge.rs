use toml::{Table, Value};

/// Lower-case every key of `table`, recursing into nested tables.
/// When two keys collide after lower-casing, the one visited last wins.
pub fn lowercase_keys(table: Table) -> Table {
    table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Table(inner) => Value::Table(lowercase_keys(inner)),
                other => other,
            };
            (key.to_lowercase(), value)
        })
        .collect()
}

/// Deep-merge `overlay` into `base` in place.
/// Tables on both sides merge recursively; any other overlay value replaces.
pub fn merge_into(base: &mut Table, overlay: Table) {
    for (key, overlay_val) in overlay {
        match (base.get_mut(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                merge_into(base_tbl, overlay_tbl);
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
}

/// Navigate a table by dotted key path (e.g. `"database.url"`).
///
/// A key may itself contain dots, so the whole path is tried first, then
/// ever shorter prefixes as table names.
pub fn table_get<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    if let Some(value) = table.get(dotted_key) {
        return Some(value);
    }
    let mut end = dotted_key.len();
    while let Some(dot) = dotted_key[..end].rfind('.') {
        if let Some(Value::Table(inner)) = table.get(&dotted_key[..dot])
            && let Some(value) = table_get(inner, &dotted_key[dot + 1..])
        {
            return Some(value);
        }
        end = dot;
    }
    None
}

/// Insert `value` at a dotted key path, creating intermediate tables.
/// A scalar sitting where a table is needed is replaced by a table.
pub fn table_set(table: &mut Table, dotted_key: &str, value: Value) {
    match dotted_key.split_once('.') {
        None => {
            table.insert(dotted_key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = table
                .entry(head)
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            if let Value::Table(inner) = entry {
                table_set(inner, rest, value);
            }
        }
    }
}

/// Every leaf key of `table` as a dotted path.
pub fn leaf_keys(table: &Table) -> Vec<String> {
    let mut keys = Vec::new();
    collect_leaves(table, "", &mut keys);
    keys
}

fn collect_leaves(table: &Table, prefix: &str, keys: &mut Vec<String>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(inner) if !inner.is_empty() => collect_leaves(inner, &dotted, keys),
            _ => keys.push(dotted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(toml_str: &str) -> Table {
        toml_str.parse::<Table>().unwrap()
    }

    #[test]
    fn lowercase_nested_keys() {
        let t = lowercase_keys(table("Host = \"a\"\n[Database]\nURL = \"pg://\"\n"));
        assert_eq!(t["host"].as_str(), Some("a"));
        assert_eq!(t["database"]["url"].as_str(), Some("pg://"));
    }

    #[test]
    fn merge_overlay_scalar_wins() {
        let mut base = table("port = 8080\nhost = \"localhost\"");
        merge_into(&mut base, table("port = 3000"));
        assert_eq!(base["port"].as_integer(), Some(3000));
        assert_eq!(base["host"].as_str(), Some("localhost"));
    }

    #[test]
    fn merge_nested_tables_recurse() {
        let mut base = table("[database]\nurl = \"pg://old\"\npool_size = 5\n");
        merge_into(&mut base, table("[database]\npool_size = 20\n"));
        let db = base["database"].as_table().unwrap();
        assert_eq!(db["url"].as_str(), Some("pg://old"));
        assert_eq!(db["pool_size"].as_integer(), Some(20));
    }

    #[test]
    fn merge_scalar_replaces_table() {
        let mut base = table("[database]\nurl = \"x\"\n");
        merge_into(&mut base, table("database = \"flat\""));
        assert_eq!(base["database"].as_str(), Some("flat"));
    }

    #[test]
    fn get_flat_and_nested() {
        let t = table("port = 1\n[a.b]\nc = \"deep\"\n");
        assert_eq!(table_get(&t, "port").and_then(Value::as_integer), Some(1));
        assert_eq!(table_get(&t, "a.b.c").and_then(Value::as_str), Some("deep"));
        assert!(table_get(&t, "a.missing").is_none());
        assert!(table_get(&t, "port.inner").is_none());
    }

    #[test]
    fn get_key_containing_dots() {
        let t = table("\"database.url\" = \"flat\"\n[a]\n\"b.c\" = 2\n[a.b]\nd = 3\n");
        assert_eq!(table_get(&t, "database.url").and_then(Value::as_str), Some("flat"));
        assert_eq!(table_get(&t, "a.b.c").and_then(Value::as_integer), Some(2));
        assert_eq!(table_get(&t, "a.b.d").and_then(Value::as_integer), Some(3));
        assert!(table_get(&t, "database").is_none());
    }

    #[test]
    fn set_creates_intermediate_tables() {
        let mut t = Table::new();
        table_set(&mut t, "database.url", Value::String("pg://".into()));
        table_set(&mut t, "database.pool_size", Value::Integer(5));
        assert_eq!(t["database"]["url"].as_str(), Some("pg://"));
        assert_eq!(t["database"]["pool_size"].as_integer(), Some(5));
    }

    #[test]
    fn set_replaces_scalar_in_the_way() {
        let mut t = table("database = \"flat\"");
        table_set(&mut t, "database.url", Value::String("pg://".into()));
        assert_eq!(t["database"]["url"].as_str(), Some("pg://"));
    }

    #[test]
    fn leaf_keys_are_dotted() {
        let t = table("port = 1\nempty = {}\n[database]\nurl = \"x\"\n");
        let mut keys = leaf_keys(&t);
        keys.sort();
        assert_eq!(keys, vec!["database.url", "empty", "port"]);
    }
}
