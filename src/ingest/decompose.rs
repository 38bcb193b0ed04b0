//! Decomposer: walks a payload and emits one [`Component`] per slot.
//!
//! The walk is depth-first: a slot's component is emitted before the
//! components of anything nested under it. Scalars at the root emit nothing;
//! they are only visible as properties of their parent slot.

use chrono::{DateTime, Utc};

use super::ident;
use super::payload::Payload;
use super::types::{Component, Level, SourceLocator};

/// Decompose `payload` at one granularity level, stamping components with the
/// current time.
pub fn decompose(payload: &Payload, level: Level, context_path: &str) -> Vec<Component> {
    decompose_at(payload, level, context_path, Utc::now())
}

/// Decompose with an explicit timestamp. For equal inputs the output is
/// identical, timestamps included.
pub fn decompose_at(
    payload: &Payload,
    level: Level,
    context_path: &str,
    stamped_at: DateTime<Utc>,
) -> Vec<Component> {
    let timestamp = stamped_at.to_rfc3339();
    let mut components = Vec::new();
    walk(payload, level, context_path, &timestamp, &mut components);
    components
}

fn walk(
    node: &Payload,
    level: Level,
    context: &str,
    timestamp: &str,
    out: &mut Vec<Component>,
) {
    match node {
        Payload::Map(map) => {
            for (key, value) in map {
                out.push(component(
                    value,
                    level,
                    context,
                    SourceLocator::Key(key.clone()),
                    timestamp,
                ));
                if value.is_container() {
                    walk(value, level, &format!("{context}.{key}"), timestamp, out);
                }
            }
        }
        Payload::Seq(items) => {
            for (i, item) in items.iter().enumerate() {
                out.push(component(item, level, context, SourceLocator::Index(i), timestamp));
                if item.is_container() {
                    walk(item, level, &format!("{context}[{i}]"), timestamp, out);
                }
            }
        }
        _ => {}
    }
}

fn component(
    value: &Payload,
    level: Level,
    context: &str,
    locator: SourceLocator,
    timestamp: &str,
) -> Component {
    Component {
        id: ident::component_id(context, &locator, level),
        level,
        kind: value.kind().to_string(),
        source_locator: locator,
        context: context.to_string(),
        value_fingerprint: ident::value_fingerprint(&value.to_string()),
        timestamp: timestamp.to_string(),
        flags: level.flags(),
    }
}

/// Maximum nesting depth of a payload: scalars and empty containers sit at the
/// depth of their slot; each non-empty container adds one.
pub fn nesting_complexity(payload: &Payload) -> usize {
    complexity_at(payload, 0)
}

fn complexity_at(node: &Payload, depth: usize) -> usize {
    match node {
        Payload::Map(map) => map
            .values()
            .map(|v| complexity_at(v, depth + 1))
            .max()
            .unwrap_or(depth),
        Payload::Seq(items) => items
            .iter()
            .map(|v| complexity_at(v, depth + 1))
            .max()
            .unwrap_or(depth),
        _ => depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn payload(v: serde_json::Value) -> Payload {
        Payload::from_json(v).unwrap()
    }

    /// Every (context, locator) slot reachable from the root.
    fn slots(node: &Payload, context: &str, out: &mut BTreeSet<(String, String)>) {
        match node {
            Payload::Map(map) => {
                for (k, v) in map {
                    out.insert((context.to_string(), k.clone()));
                    slots(v, &format!("{context}.{k}"), out);
                }
            }
            Payload::Seq(items) => {
                for (i, v) in items.iter().enumerate() {
                    out.insert((context.to_string(), format!("[{i}]")));
                    slots(v, &format!("{context}[{i}]"), out);
                }
            }
            _ => {}
        }
    }

    #[test]
    fn single_key_emits_one_component() {
        let components = decompose(&payload(json!({"a": 1})), Level::Macro, "");
        assert_eq!(components.len(), 1);
        let c = &components[0];
        assert_eq!(c.kind, "integer");
        assert_eq!(c.context, "");
        assert_eq!(c.source_locator, SourceLocator::Key("a".into()));
        assert_eq!(c.id.len(), 12);
        assert_eq!(c.value_fingerprint.len(), 8);
        assert_eq!(c.value_fingerprint, ident::value_fingerprint("1"));
    }

    #[test]
    fn scalar_root_emits_nothing() {
        for level in Level::ALL {
            assert!(decompose(&Payload::Int(7), level, "").is_empty());
            assert!(decompose(&Payload::Str("x".into()), level, "").is_empty());
        }
    }

    #[test]
    fn walk_is_depth_first_with_paths() {
        let p = payload(json!({"a": {"b": [10, {"c": null}]}, "z": true}));
        let components = decompose(&p, Level::Atomic, "");
        let visited: Vec<(String, String)> = components
            .iter()
            .map(|c| (c.context.clone(), c.source_locator.to_string()))
            .collect();
        assert_eq!(
            visited,
            vec![
                ("".to_string(), "a".to_string()),
                (".a".to_string(), "b".to_string()),
                (".a.b".to_string(), "[0]".to_string()),
                (".a.b".to_string(), "[1]".to_string()),
                (".a.b[1]".to_string(), "c".to_string()),
                ("".to_string(), "z".to_string()),
            ]
        );
        assert_eq!(components[1].kind, "sequence");
        assert_eq!(components[4].kind, "null");
    }

    #[test]
    fn components_cover_every_slot() {
        let p = payload(json!({"x": [[1, 2], {"y": {"z": []}}], "w": {}}));
        let mut expected = BTreeSet::new();
        slots(&p, "", &mut expected);
        for level in Level::ALL {
            let got: BTreeSet<(String, String)> = decompose(&p, level, "")
                .iter()
                .map(|c| (c.context.clone(), c.source_locator.to_string()))
                .collect();
            assert_eq!(got, expected, "level {level}");
        }
    }

    #[test]
    fn decomposition_is_deterministic() {
        let p = payload(json!({"k": [1, {"m": "v"}], "n": 2.5}));
        let now = Utc::now();
        for level in Level::ALL {
            assert_eq!(decompose_at(&p, level, "", now), decompose_at(&p, level, "", now));
        }
    }

    #[test]
    fn level_flags_attached() {
        let p = payload(json!({"a": 1}));
        let planck = &decompose(&p, Level::Planckments, "")[0];
        assert_eq!(planck.flags.planck_scale, Some(true));
        assert_eq!(planck.flags.fundamental_limit, Some(true));
        let micro = &decompose(&p, Level::Micro, "")[0];
        assert_eq!(micro.flags, Default::default());
    }

    #[test]
    fn complexity_measures_depth() {
        assert_eq!(nesting_complexity(&Payload::Int(1)), 0);
        assert_eq!(nesting_complexity(&payload(json!({}))), 0);
        assert_eq!(nesting_complexity(&payload(json!({"a": 1}))), 1);
        assert_eq!(nesting_complexity(&payload(json!({"a": {"b": [1]}}))), 3);
        assert_eq!(nesting_complexity(&payload(json!({"a": {"b": []}, "c": 1}))), 2);
    }
}
