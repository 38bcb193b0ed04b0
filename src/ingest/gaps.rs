//! Gap detection and key-name-driven gap filling.
//!
//! [`detect_gaps`] reports every structurally defective slot. [`fill_gaps`]
//! rewrites the `null` and empty-string slots of mappings with a value chosen
//! by [`infer_value`]; empty collections and placeholder text are reported
//! only. No imputed value is itself `null` or empty-string, so filling a filled
//! payload is a no-op.

use chrono::{DateTime, Utc};

use super::ident;
use super::payload::Payload;
use super::types::{Fill, Gap, GapKind, SourceLocator};

const PLACEHOLDER_TOKENS: [&str; 3] = ["...", "TODO", "FIXME"];

/// Walk the tree and report every gap, in walk order.
pub fn detect_gaps(payload: &Payload) -> Vec<Gap> {
    let mut gaps = Vec::new();
    match payload {
        Payload::Map(map) if map.is_empty() => gaps.push(Gap {
            path: String::new(),
            kind: GapKind::EmptyMap,
            key_or_index: None,
        }),
        Payload::Seq(items) if items.is_empty() => gaps.push(Gap {
            path: String::new(),
            kind: GapKind::EmptySeq,
            key_or_index: None,
        }),
        Payload::Str(s) if is_placeholder(s) => gaps.push(Gap {
            path: String::new(),
            kind: GapKind::PlaceholderText,
            key_or_index: None,
        }),
        _ => scan(payload, "", &mut gaps),
    }
    gaps
}

fn scan(node: &Payload, path: &str, gaps: &mut Vec<Gap>) {
    match node {
        Payload::Map(map) => {
            for (key, value) in map {
                let locator = SourceLocator::Key(key.clone());
                if let Some(kind) = slot_gap(value) {
                    gaps.push(Gap {
                        path: path.to_string(),
                        kind,
                        key_or_index: Some(locator),
                    });
                } else if value.is_container() {
                    scan(value, &format!("{path}.{key}"), gaps);
                }
            }
        }
        Payload::Seq(items) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Payload::Str(s) if is_placeholder(s) => gaps.push(Gap {
                        path: path.to_string(),
                        kind: GapKind::PlaceholderText,
                        key_or_index: Some(SourceLocator::Index(i)),
                    }),
                    _ if item.is_container() => scan(item, &format!("{path}[{i}]"), gaps),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// Gap kind for a mapping value, if it is one.
fn slot_gap(value: &Payload) -> Option<GapKind> {
    match value {
        Payload::Null => Some(GapKind::NullSlot),
        Payload::Str(s) if s.is_empty() => Some(GapKind::EmptyString),
        Payload::Str(s) if is_placeholder(s) => Some(GapKind::PlaceholderText),
        Payload::Map(map) if map.is_empty() => Some(GapKind::EmptyMap),
        Payload::Seq(items) if items.is_empty() => Some(GapKind::EmptySeq),
        _ => None,
    }
}

fn is_placeholder(s: &str) -> bool {
    PLACEHOLDER_TOKENS.iter().any(|t| s.contains(t))
}

/// Replace every fillable mapping slot, returning the new tree and the fills
/// made. `root_context` seeds the context used for hash-derived values.
pub fn fill_gaps(payload: &Payload, root_context: &str) -> (Payload, Vec<Fill>) {
    fill_gaps_at(payload, root_context, Utc::now())
}

/// [`fill_gaps`] with an explicit clock for time-like keys.
pub fn fill_gaps_at(
    payload: &Payload,
    root_context: &str,
    now: DateTime<Utc>,
) -> (Payload, Vec<Fill>) {
    let mut fills = Vec::new();
    let filled = fill_node(payload, root_context, "", now, &mut fills);
    (filled, fills)
}

fn fill_node(
    node: &Payload,
    context: &str,
    path: &str,
    now: DateTime<Utc>,
    fills: &mut Vec<Fill>,
) -> Payload {
    match node {
        Payload::Map(map) => Payload::Map(
            map.iter()
                .map(|(key, value)| {
                    let fillable = slot_gap(value).is_some_and(|k| k.is_fillable());
                    let new_value = if fillable {
                        let imputed = infer_value(key, context, now);
                        fills.push(Fill {
                            path: path.to_string(),
                            key: key.clone(),
                            original_value: value.clone(),
                            imputed_value: imputed.clone(),
                        });
                        imputed
                    } else {
                        fill_node(
                            value,
                            &format!("{context}.{key}"),
                            &format!("{path}.{key}"),
                            now,
                            fills,
                        )
                    };
                    (key.clone(), new_value)
                })
                .collect(),
        ),
        Payload::Seq(items) => Payload::Seq(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    fill_node(
                        item,
                        &format!("{context}[{i}]"),
                        &format!("{path}[{i}]"),
                        now,
                        fills,
                    )
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Choose a replacement value from the key name. First match wins.
pub fn infer_value(key: &str, context: &str, now: DateTime<Utc>) -> Payload {
    let key_lower = key.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| key_lower.contains(n));

    if has(&["count", "number"]) {
        Payload::Int(0)
    } else if has(&["list", "items"]) {
        Payload::Seq(Vec::new())
    } else if has(&["enabled", "active"]) {
        Payload::Bool(true)
    } else if has(&["timestamp", "time", "date"]) {
        Payload::Str(now.to_rfc3339())
    } else if has(&["id"]) {
        Payload::Str(ident::imputed_token(key, context))
    } else if has(&["name"]) {
        Payload::Str(format!("auto_generated_{key}"))
    } else if has(&["description", "desc"]) {
        Payload::Str(format!("Auto-generated description for {key}"))
    } else if has(&["config", "settings"]) {
        Payload::Map(Default::default())
    } else {
        Payload::Str(ident::imputed_token(key, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: serde_json::Value) -> Payload {
        Payload::from_json(v).unwrap()
    }

    #[test]
    fn empty_root_map_is_one_gap() {
        let gaps = detect_gaps(&payload(json!({})));
        assert_eq!(
            gaps,
            vec![Gap {
                path: String::new(),
                kind: GapKind::EmptyMap,
                key_or_index: None
            }]
        );
    }

    #[test]
    fn detects_each_kind() {
        let p = payload(json!({
            "a": null,
            "b": "",
            "c": {},
            "d": [],
            "e": "write this TODO",
            "f": {"g": ["ok", "wait..."]},
            "h": false,
        }));
        let kinds: Vec<(String, GapKind)> = detect_gaps(&p)
            .into_iter()
            .map(|g| (format!("{}/{}", g.path, g.key_or_index.unwrap()), g.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("/a".to_string(), GapKind::NullSlot),
                ("/b".to_string(), GapKind::EmptyString),
                ("/c".to_string(), GapKind::EmptyMap),
                ("/d".to_string(), GapKind::EmptySeq),
                ("/e".to_string(), GapKind::PlaceholderText),
                (".f.g/[1]".to_string(), GapKind::PlaceholderText),
            ]
        );
    }

    #[test]
    fn classifier_table_order() {
        let now = Utc::now();
        assert_eq!(infer_value("item_count", "c", now), Payload::Int(0));
        assert_eq!(infer_value("todo_list", "c", now), Payload::Seq(vec![]));
        assert_eq!(infer_value("isActive", "c", now), Payload::Bool(true));
        assert_eq!(infer_value("created_date", "c", now), Payload::Str(now.to_rfc3339()));
        assert_eq!(
            infer_value("user_id", "c", now),
            Payload::Str(ident::imputed_token("user_id", "c"))
        );
        assert_eq!(infer_value("Name", "c", now), Payload::Str("auto_generated_Name".into()));
        assert_eq!(
            infer_value("desc", "c", now),
            Payload::Str("Auto-generated description for desc".into())
        );
        assert_eq!(infer_value("settings", "c", now), Payload::Map(Default::default()));
        // "count" beats "name"
        assert_eq!(infer_value("name_count", "c", now), Payload::Int(0));
        let fallback = infer_value("zzz", "c", now);
        assert_eq!(fallback, Payload::Str(ident::imputed_token("zzz", "c")));
    }

    #[test]
    fn fills_null_and_empty_string_only() {
        let p = payload(json!({"count": null, "title": "", "tags": [], "notes": "TODO"}));
        let (filled, fills) = fill_gaps(&p, "doc");
        assert_eq!(fills.len(), 2);
        let map = filled.as_map().unwrap();
        assert_eq!(map["count"], Payload::Int(0));
        assert_eq!(map["title"], Payload::Str(ident::imputed_token("title", "doc")));
        assert_eq!(map["tags"], Payload::Seq(vec![]));
        assert_eq!(map["notes"], Payload::Str("TODO".into()));
        assert_eq!(fills[0].original_value, Payload::Null);
        assert_eq!(fills[1].original_value, Payload::Str(String::new()));
    }

    #[test]
    fn nested_fill_uses_nested_context() {
        let p = payload(json!({"outer": {"ref": null}, "list": [{"x": ""}]}));
        let (filled, fills) = fill_gaps(&p, "root");
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].path, ".list[0]");
        assert_eq!(fills[1].path, ".outer");
        let outer = filled.as_map().unwrap()["outer"].as_map().unwrap();
        assert_eq!(outer["ref"], Payload::Str(ident::imputed_token("ref", "root.outer")));
    }

    #[test]
    fn refilling_is_a_no_op() {
        let p = payload(json!({"a": null, "items": null, "config": "", "n": {"enabled": null}}));
        let now = Utc::now();
        let (once, fills) = fill_gaps_at(&p, "x", now);
        assert_eq!(fills.len(), 4);
        let (twice, refills) = fill_gaps_at(&once, "x", now);
        assert!(refills.is_empty());
        assert_eq!(once, twice);
        let remaining: Vec<GapKind> = detect_gaps(&once).into_iter().map(|g| g.kind).collect();
        assert!(remaining.iter().all(|k| !k.is_fillable()));
    }
}
