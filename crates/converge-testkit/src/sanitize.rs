//! Deterministic sanitization of convergence action messages.
//!
//! Messages are arbitrary `serde_json::Value` trees with no fixed schema.
//! Sanitization walks the whole tree once, redacting named keys and
//! rewriting every UUID-shaped substring to a synthetic id assigned in
//! first-seen order, so two runs that take the same actions produce
//! byte-identical sanitized logs.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// 8-4-4-4-12 hex, version nibble fixed to 4, variant nibble in [89ab].
// Hyphens are optional so ids embedded in compact forms still match.
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("[a-f0-9]{8}-?[a-f0-9]{4}-?4[a-f0-9]{3}-?[89ab][a-f0-9]{3}-?[a-f0-9]{12}")
        .expect("uuid pattern")
});

// Every replacement id shares this prefix; the low 12 digits carry the
// zero-padded first-seen sequence number, starting at 1.
const REPLACEMENT_PREFIX: &str = "2b47ba9b-761a-492d-9a0c-";

/// Keys blanked out of sanitized log entries: volatile fields that differ
/// between runs without the effective state differing.
pub const IGNORED_KEYS: &[&str] = &["created_at", "version"];

/// Rewrites UUID-shaped substrings to stable synthetic ids and redacts
/// named keys.
///
/// The memo table is shared, process-lifetime state: the same source uuid
/// maps to the same replacement everywhere it appears until
/// [`Sanitizer::reset`] is called. Inputs are deep-copied before rewriting;
/// the caller's tree is never mutated.
#[derive(Debug, Default)]
pub struct Sanitizer {
    uuids: IndexMap<String, String>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct source uuids seen since the last reset.
    pub fn seen(&self) -> usize {
        self.uuids.len()
    }

    /// Clears the memo table; sequence numbers restart at 1.
    pub fn reset(&mut self) {
        self.uuids.clear();
    }

    /// Rewrites every UUID-shaped substring in a deep copy of `message`.
    pub fn normalize(&mut self, message: &Value) -> Value {
        self.sanitize(message, &[])
    }

    /// Redacts `keys` and normalizes uuids in one traversal over a deep
    /// copy of `message`. A redacted key short-circuits: its value is
    /// replaced with the `___<key>___` sentinel and never recursed into.
    pub fn sanitize(&mut self, message: &Value, keys: &[&str]) -> Value {
        let mut copy = message.clone();
        self.walk(&mut copy, keys);
        copy
    }

    fn walk(&mut self, node: &mut Value, keys: &[&str]) {
        match node {
            Value::Array(items) => {
                for item in items {
                    self.walk(item, keys);
                }
            }
            Value::Object(map) => {
                for (key, value) in map.iter_mut() {
                    if keys.contains(&key.as_str()) {
                        *value = Value::String(format!("___{key}___"));
                    } else {
                        self.walk(value, keys);
                    }
                }
            }
            Value::String(text) => {
                if UUID_RE.is_match(text) {
                    *text = self.replace_uuids(text);
                }
            }
            _ => {}
        }
    }

    fn replace_uuids(&mut self, input: &str) -> String {
        // Matches are collected against the original text: replacement ids
        // are themselves UUID-shaped and must not feed back into the scan.
        let found: Vec<String> = UUID_RE
            .find_iter(input)
            .map(|m| m.as_str().to_string())
            .collect();

        let mut out = input.to_string();
        for uuid in found {
            let next = self.uuids.len() + 1;
            let replacement = self
                .uuids
                .entry(uuid.clone())
                .or_insert_with(|| format!("{REPLACEMENT_PREFIX}{next:012}"));
            out = out.replace(&uuid, replacement);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UUID_A: &str = "a1b2c3d4-0000-4000-8000-000000000000";
    const UUID_B: &str = "deadbeef-cafe-4aaa-9bbb-000000000001";

    #[test]
    fn same_uuid_maps_to_same_replacement() {
        let mut s = Sanitizer::new();
        let first = s.normalize(&json!({ "id": UUID_A }));
        let second = s.normalize(&json!({ "nested": { "ref": UUID_A } }));
        assert_eq!(first["id"], "2b47ba9b-761a-492d-9a0c-000000000001");
        assert_eq!(second["nested"]["ref"], first["id"]);
    }

    #[test]
    fn sequence_follows_first_seen_order() {
        let mut s = Sanitizer::new();
        let out = s.normalize(&json!([UUID_B, UUID_A, UUID_B]));
        assert_eq!(out[0], "2b47ba9b-761a-492d-9a0c-000000000001");
        assert_eq!(out[1], "2b47ba9b-761a-492d-9a0c-000000000002");
        assert_eq!(out[2], out[0]);
    }

    #[test]
    fn sequence_follows_document_key_order_not_sorted_order() {
        // Key order in the parsed document, not alphabetical order, decides
        // which uuid is seen first.
        let message: Value = serde_json::from_str(&format!(
            r#"{{ "z_id": "{UUID_B}", "a_id": "{UUID_A}" }}"#
        ))
        .unwrap();
        let mut s = Sanitizer::new();
        let out = s.normalize(&message);
        assert_eq!(out["z_id"], "2b47ba9b-761a-492d-9a0c-000000000001");
        assert_eq!(out["a_id"], "2b47ba9b-761a-492d-9a0c-000000000002");
    }

    #[test]
    fn uuid_embedded_in_text_keeps_surroundings() {
        let mut s = Sanitizer::new();
        let out = s.normalize(&json!({ "uri": format!("/apis/{UUID_A}/plugins") }));
        assert_eq!(
            out["uri"],
            "/apis/2b47ba9b-761a-492d-9a0c-000000000001/plugins"
        );
    }

    #[test]
    fn multiple_uuids_in_one_string_normalize_independently() {
        let mut s = Sanitizer::new();
        let out = s.normalize(&json!(format!("{UUID_A} -> {UUID_B}")));
        assert_eq!(
            out,
            json!(
                "2b47ba9b-761a-492d-9a0c-000000000001 -> 2b47ba9b-761a-492d-9a0c-000000000002"
            )
        );
    }

    #[test]
    fn hyphenless_uuid_matches() {
        let mut s = Sanitizer::new();
        let out = s.normalize(&json!("a1b2c3d400004000800000000000000 0"));
        // 31 hex chars + space: not a match, left alone.
        assert_eq!(out, json!("a1b2c3d400004000800000000000000 0"));
        let out = s.normalize(&json!("a1b2c3d40000400080000000000000aa"));
        assert_eq!(out, json!("2b47ba9b-761a-492d-9a0c-000000000001"));
    }

    #[test]
    fn wrong_version_nibble_is_not_rewritten() {
        let mut s = Sanitizer::new();
        let not_v4 = "a1b2c3d4-0000-5000-8000-000000000000";
        let out = s.normalize(&json!({ "id": not_v4 }));
        assert_eq!(out["id"], not_v4);
        assert_eq!(s.seen(), 0);
    }

    #[test]
    fn non_string_scalars_untouched() {
        let mut s = Sanitizer::new();
        let input = json!({ "n": 17000, "b": true, "x": null });
        assert_eq!(s.sanitize(&input, IGNORED_KEYS), input);
    }

    #[test]
    fn redaction_replaces_value_with_sentinel() {
        let mut s = Sanitizer::new();
        let out = s.sanitize(
            &json!({ "created_at": 17000, "version": "1.2.3", "name": "mockbin" }),
            IGNORED_KEYS,
        );
        assert_eq!(out["created_at"], "___created_at___");
        assert_eq!(out["version"], "___version___");
        assert_eq!(out["name"], "mockbin");
    }

    #[test]
    fn redaction_applies_at_any_depth() {
        let mut s = Sanitizer::new();
        let out = s.sanitize(
            &json!({ "api": { "plugins": [{ "created_at": 1 }] } }),
            IGNORED_KEYS,
        );
        assert_eq!(out["api"]["plugins"][0]["created_at"], "___created_at___");
    }

    #[test]
    fn redaction_is_idempotent() {
        let mut s = Sanitizer::new();
        let once = s.sanitize(&json!({ "created_at": 17000 }), IGNORED_KEYS);
        let twice = s.sanitize(&once, IGNORED_KEYS);
        assert_eq!(once, twice);
    }

    #[test]
    fn redacted_key_shields_uuid_value_from_normalization() {
        let mut s = Sanitizer::new();
        let out = s.sanitize(&json!({ "created_at": UUID_A }), IGNORED_KEYS);
        assert_eq!(out["created_at"], "___created_at___");
        assert_eq!(s.seen(), 0);
    }

    #[test]
    fn input_tree_is_never_mutated() {
        let mut s = Sanitizer::new();
        let input = json!({ "id": UUID_A, "created_at": 1 });
        let before = input.clone();
        let _ = s.sanitize(&input, IGNORED_KEYS);
        assert_eq!(input, before);
    }

    #[test]
    fn reset_restarts_sequence_at_one() {
        let mut s = Sanitizer::new();
        let _ = s.normalize(&json!(UUID_B));
        let _ = s.normalize(&json!(UUID_A));
        assert_eq!(s.seen(), 2);
        s.reset();
        let out = s.normalize(&json!(UUID_A));
        assert_eq!(out, json!("2b47ba9b-761a-492d-9a0c-000000000001"));
    }
}
