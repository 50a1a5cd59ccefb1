//! `structgraph config get/set`: read and modify configuration.

use std::path::Path;
use structgraph_core::StructgraphConfig;

fn load_or_default(path: &Path) -> anyhow::Result<StructgraphConfig> {
    if path.exists() {
        Ok(StructgraphConfig::load(path)?)
    } else {
        Ok(StructgraphConfig::default())
    }
}

pub(crate) fn cmd_config_get(path: &Path, key: &str) -> anyhow::Result<()> {
    let config = load_or_default(path)?;
    let json = serde_json::to_value(&config)?;

    let value = navigate_json(&json, key);
    match value {
        Some(v) => {
            let pretty = serde_json::to_string_pretty(v)?;
            println!("{pretty}");
        }
        None => {
            anyhow::bail!("Unknown config key: {key}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_config_set(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = load_or_default(path)?;
    let mut json = serde_json::to_value(&config)?;

    // Parse the value as JSON first, fall back to string
    let new_value: serde_json::Value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    set_json_path(&mut json, key, new_value)?;

    // Deserialize back into config to validate
    let config: StructgraphConfig = serde_json::from_value(json)?;
    config.save(path)?;
    eprintln!("Updated {key} and saved to {}", path.display());
    Ok(())
}

/// Navigate a JSON value by a dot-separated path.
fn navigate_json<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Set a value at a dot-separated JSON path. Only existing keys can be set.
fn set_json_path(
    root: &mut serde_json::Value,
    path: &str,
    value: serde_json::Value,
) -> anyhow::Result<()> {
    let parts: Vec<&str> = path.split('.').collect();
    let Some((last, sections)) = parts.split_last() else {
        anyhow::bail!("Empty key path");
    };

    let mut current = root;
    for part in sections {
        current = current
            .get_mut(*part)
            .ok_or_else(|| anyhow::anyhow!("Unknown config section: {part}"))?;
    }

    let Some(obj) = current.as_object_mut() else {
        anyhow::bail!("Config path does not lead to an object");
    };
    if !obj.contains_key(*last) {
        anyhow::bail!("Unknown config key: {last}");
    }
    obj.insert((*last).to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_nested() {
        let json = serde_json::to_value(StructgraphConfig::default()).unwrap();
        let v = navigate_json(&json, "output.pretty").unwrap();
        assert_eq!(v.as_bool(), Some(true));
        assert!(navigate_json(&json, "walk.exclude").unwrap().is_array());
    }

    #[test]
    fn navigate_missing() {
        let json = serde_json::json!({"walk": {}});
        assert!(navigate_json(&json, "walk.nonexistent").is_none());
        assert!(navigate_json(&json, "").is_none());
    }

    #[test]
    fn set_unset_option() {
        let mut json = serde_json::to_value(StructgraphConfig::default()).unwrap();
        set_json_path(&mut json, "walk.max_depth", serde_json::json!(3)).unwrap();
        let config: StructgraphConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.walk.max_depth, Some(3));
    }

    #[test]
    fn set_unknown_key_errors() {
        let mut json = serde_json::to_value(StructgraphConfig::default()).unwrap();
        let err = set_json_path(&mut json, "walk.nonexistent", serde_json::json!(1)).unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));

        let err = set_json_path(&mut json, "nowhere.key", serde_json::json!(1)).unwrap_err();
        assert!(err.to_string().contains("Unknown config section"));
    }

    #[test]
    fn set_then_get_roundtrips_through_file() {
        let dir = tempfile::Builder::new()
            .prefix("structgraph")
            .tempdir()
            .unwrap();
        let path = dir.path().join("config.toml");

        cmd_config_set(&path, "paths.system_root", "/usr/local/go/src").unwrap();
        cmd_config_set(&path, "walk.exclude", "[\"fmt\"]").unwrap();

        let config = StructgraphConfig::load(&path).unwrap();
        assert_eq!(config.paths.system_root.as_deref(), Some("/usr/local/go/src"));
        assert_eq!(config.walk.exclude, vec!["fmt".to_string()]);
        assert!(cmd_config_get(&path, "walk.include_tests").is_ok());
        assert!(cmd_config_get(&path, "walk.bogus").is_err());
    }
}
