//! Struct field tag parsing.
//!
//! Scans a tag the way Go's `reflect.StructTag` does: space separated
//! `key:"value"` pairs, each value unquoted and split on commas.

use crate::unquote::unquote;
use std::collections::BTreeMap;
use structgraph_core::StructgraphError;

/// Tags of one field plus the pairs whose value failed to unquote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTags {
    pub tags: BTreeMap<String, Vec<String>>,
    pub malformed: Vec<MalformedTag>,
}

/// A `key:"value"` pair dropped because its value is mis-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTag {
    pub key: String,
    pub raw: String,
    pub reason: String,
}

/// Parse a raw tag literal (quotes included).
///
/// Failing to unquote the literal itself is fatal; a mis-escaped value only
/// drops that key.
pub fn parse_tags(literal: &str) -> Result<ParsedTags, StructgraphError> {
    let tag = unquote(literal)?;
    let mut parsed = ParsedTags::default();
    let mut rest = tag.as_str();

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        let key_end = rest
            .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\x7f')
            .unwrap_or(rest.len());
        if key_end == 0 || !rest[key_end..].starts_with(":\"") {
            break;
        }
        let key = &rest[..key_end];
        rest = &rest[key_end + 1..];

        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let quoted = &rest[..=i];
        rest = &rest[i + 1..];

        match unquote(quoted) {
            Ok(value) => {
                let entry = parsed.tags.entry(key.to_string()).or_default();
                entry.extend(value.split(',').map(|arg| arg.trim_matches(' ').to_string()));
            }
            Err(err) => parsed.malformed.push(MalformedTag {
                key: key.to_string(),
                raw: quoted.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(literal: &str) -> BTreeMap<String, Vec<String>> {
        parse_tags(literal).unwrap().tags
    }

    #[test]
    fn json_and_bson() {
        let parsed = tags(r#"`json:"id" bson:"_id"`"#);
        assert_eq!(parsed["json"], vec!["id".to_string()]);
        assert_eq!(parsed["bson"], vec!["_id".to_string()]);
    }

    #[test]
    fn comma_separated_values_keep_order() {
        let parsed = tags(r#"`json:"groupId,omitempty" validate:"min=1, max=3"`"#);
        assert_eq!(
            parsed["json"],
            vec!["groupId".to_string(), "omitempty".to_string()]
        );
        assert_eq!(
            parsed["validate"],
            vec!["min=1".to_string(), "max=3".to_string()]
        );
    }

    #[test]
    fn interpreted_tag_literal() {
        let parsed = tags(r#""json:\"name\"""#);
        assert_eq!(parsed["json"], vec!["name".to_string()]);
    }

    #[test]
    fn escaped_quote_inside_value() {
        let parsed = tags(r#"`doc:"say \"hi\""`"#);
        assert_eq!(parsed["doc"], vec!["say \"hi\"".to_string()]);
    }

    #[test]
    fn malformed_value_drops_only_that_key() {
        let parsed = parse_tags(r#"`bad:"\q" json:"ok"`"#).unwrap();
        assert!(!parsed.tags.contains_key("bad"));
        assert_eq!(parsed.tags["json"], vec!["ok".to_string()]);
        assert_eq!(parsed.malformed.len(), 1);
        assert_eq!(parsed.malformed[0].key, "bad");
    }

    #[test]
    fn malformed_structure_stops_scanning() {
        let parsed = tags(r#"`json:"a" novalue other:"b"`"#);
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains_key("json"));
    }

    #[test]
    fn unquotable_literal_is_fatal() {
        assert!(parse_tags("`unterminated").is_err());
    }

    #[test]
    fn empty_tag() {
        assert!(tags("``").is_empty());
    }
}
