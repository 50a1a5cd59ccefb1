//! `go.mod` parsing.
//!
//! Only the directives that matter for locating imported packages are read:
//! `module`, `go` and `require` (single-line and block form, with `// indirect`
//! markers). Everything else is skipped.

use std::path::{Path, PathBuf};

/// A parsed `go.mod` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoModule {
    /// Module path declared by the `module` directive.
    pub module: String,
    /// Language version from the `go` directive.
    pub go_version: Option<String>,
    pub requires: Vec<Requirement>,
    /// Directory containing the `go.mod` file.
    pub root: PathBuf,
}

/// One `require` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
    pub indirect: bool,
}

impl GoModule {
    /// The import path relative to this module, if the import belongs to it.
    pub fn strip_module<'a>(&self, import_path: &'a str) -> Option<&'a str> {
        if import_path == self.module {
            return Some("");
        }
        import_path
            .strip_prefix(self.module.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    }

    /// The requirement providing an import path (longest module prefix wins).
    pub fn requirement_for(&self, import_path: &str) -> Option<&Requirement> {
        self.requires
            .iter()
            .filter(|req| {
                import_path == req.path
                    || import_path
                        .strip_prefix(req.path.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|req| req.path.len())
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────

/// Parse a `go.mod` file. Returns `None` if it cannot be read or declares no module.
pub fn parse_go_mod(path: &Path) -> Option<GoModule> {
    let content = std::fs::read_to_string(path).ok()?;
    let mut module = parse_go_mod_str(&content)?;
    module.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Some(module)
}

/// Parse `go.mod` content.
pub fn parse_go_mod_str(content: &str) -> Option<GoModule> {
    let mut module = GoModule::default();
    let mut in_require_block = false;
    let mut in_other_block = false;

    for raw_line in content.lines() {
        let (line, comment) = split_comment(raw_line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if in_require_block || in_other_block {
            if line == ")" {
                in_require_block = false;
                in_other_block = false;
            } else if in_require_block {
                push_requirement(&mut module, line, comment);
            }
            continue;
        }

        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match directive {
            "module" => module.module = unquote_path(rest),
            "go" => module.go_version = Some(rest.to_string()),
            "require" if rest == "(" => in_require_block = true,
            "require" => push_requirement(&mut module, rest, comment),
            _ if rest.ends_with('(') => in_other_block = true,
            _ => {}
        }
    }

    if module.module.is_empty() {
        return None;
    }
    Some(module)
}

fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.find("//") {
        Some(pos) => (&line[..pos], Some(line[pos + 2..].trim())),
        None => (line, None),
    }
}

fn push_requirement(module: &mut GoModule, spec: &str, comment: Option<&str>) {
    let mut parts = spec.split_whitespace();
    let (Some(path), Some(version)) = (parts.next(), parts.next()) else {
        return;
    };
    module.requires.push(Requirement {
        path: unquote_path(path),
        version: version.to_string(),
        indirect: comment.is_some_and(|c| c.split(';').any(|m| m.trim() == "indirect")),
    });
}

fn unquote_path(text: &str) -> String {
    text.trim().trim_matches(|c| c == '"' || c == '`').to_string()
}

/// Find the nearest `go.mod` in `start` or one of its ancestors.
pub fn find_go_mod(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("go.mod"))
        .find(|candidate| candidate.is_file())
}

// ── Module Cache Paths ───────────────────────────────────────────────────

/// Escape a module path for the module cache: upper-case letters become
/// `!` followed by the lower-case letter.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Reverse of [`escape_module_path`].
pub fn unescape_module_path(path: &str) -> String {
    let mut unescaped = String::with_capacity(path.len());
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        if c == '!' {
            if let Some(next) = chars.next() {
                unescaped.push(next.to_ascii_uppercase());
            }
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GO_MOD: &str = r#"module github.com/acme/shop // storefront

go 1.21

require github.com/go-openapi/strfmt v0.21.7

require (
	github.com/BurntSushi/toml v1.3.2
	golang.org/x/text v0.14.0 // indirect
	gopkg.in/mgo.v2 v2.0.0-20190816093944-a6b53ec6cb22
)

replace (
	golang.org/x/text => ../text
)

exclude github.com/old/thing v1.0.0
"#;

    #[test]
    fn parses_module_go_and_requires() {
        let module = parse_go_mod_str(GO_MOD).unwrap();
        assert_eq!(module.module, "github.com/acme/shop");
        assert_eq!(module.go_version.as_deref(), Some("1.21"));
        assert_eq!(module.requires.len(), 4);

        assert_eq!(module.requires[0].path, "github.com/go-openapi/strfmt");
        assert_eq!(module.requires[0].version, "v0.21.7");
        assert!(!module.requires[0].indirect);

        let text = &module.requires[2];
        assert_eq!(text.path, "golang.org/x/text");
        assert!(text.indirect);
    }

    #[test]
    fn missing_module_directive_is_none() {
        assert!(parse_go_mod_str("go 1.21\n").is_none());
        assert!(parse_go_mod(Path::new("/nonexistent/go.mod")).is_none());
    }

    #[test]
    fn strip_module_prefix() {
        let module = parse_go_mod_str(GO_MOD).unwrap();
        assert_eq!(module.strip_module("github.com/acme/shop/models"), Some("models"));
        assert_eq!(module.strip_module("github.com/acme/shop"), Some(""));
        assert_eq!(module.strip_module("github.com/acme/shopping"), None);
    }

    #[test]
    fn requirement_lookup_uses_longest_prefix() {
        let mut module = parse_go_mod_str(GO_MOD).unwrap();
        module.requires.push(Requirement {
            path: "gopkg.in/mgo.v2/bson".to_string(),
            version: "v1.0.0".to_string(),
            indirect: false,
        });
        let req = module.requirement_for("gopkg.in/mgo.v2/bson").unwrap();
        assert_eq!(req.version, "v1.0.0");
        let req = module.requirement_for("gopkg.in/mgo.v2/txn").unwrap();
        assert_eq!(req.path, "gopkg.in/mgo.v2");
        assert!(module.requirement_for("gopkg.in/mgo.v20").is_none());
    }

    #[test]
    fn module_path_escaping() {
        assert_eq!(
            escape_module_path("github.com/BurntSushi/toml"),
            "github.com/!burnt!sushi/toml"
        );
        assert_eq!(
            unescape_module_path("github.com/!burnt!sushi/toml@v1.3.2"),
            "github.com/BurntSushi/toml@v1.3.2"
        );
    }

    #[test]
    fn find_go_mod_searches_ancestors() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("internal").join("models");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/app\n").unwrap();

        let found = find_go_mod(&nested).unwrap();
        assert_eq!(found, dir.path().join("go.mod"));

        let module = parse_go_mod(&found).unwrap();
        assert_eq!(module.root, dir.path());
    }
}
