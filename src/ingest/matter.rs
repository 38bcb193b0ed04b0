//! Matter-form tagger: matches top-level mapping keys against a fixed vocabulary.

use std::collections::BTreeSet;

use super::payload::Payload;

pub const MATTER_FORMS: [&str; 12] = [
    "solid",
    "liquid",
    "gas",
    "plasma",
    "bose-einstein-condensate",
    "fermionic-condensate",
    "quark-gluon-plasma",
    "degenerate-matter",
    "dark-matter-analog",
    "quantum-superposition-states",
    "entangled-matter",
    "exotic-matter-forms",
];

/// Added whenever the payload carries any data.
pub const DEFAULT_FORMS: [&str; 2] = ["solid", "quantum-superposition-states"];

/// Lowercase and strip `-`, `_`, and whitespace.
fn normalise(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Sorted set of matter forms whose normalised name appears in a normalised
/// top-level key, plus [`DEFAULT_FORMS`] when the payload has data.
pub fn identify_matter_forms(payload: &Payload) -> Vec<String> {
    let mut forms = BTreeSet::new();

    if let Some(map) = payload.as_map() {
        for key in map.keys() {
            let key_norm = normalise(key);
            for form in MATTER_FORMS {
                if key_norm.contains(&normalise(form)) {
                    forms.insert(form);
                }
            }
        }
    }

    if payload.has_data() {
        forms.extend(DEFAULT_FORMS);
    }

    forms.into_iter().map(str::to_string).collect()
}
