use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RepairError;

/// A longer discarded tail points at a different failure than length truncation.
const MAX_DISCARDED_TAIL: usize = 500;

/// Extracts the JSON object from a raw response, repairing truncation when possible.
pub fn repair_response(raw: &str) -> Result<Value, RepairError> {
    let candidate = json_candidate(raw).ok_or(RepairError::NoJsonFound)?;

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => return Ok(value),
        Err(error) => warn!(
            %error,
            len = candidate.len(),
            "analysis JSON did not parse, attempting repair"
        ),
    }

    if let Some(start) = scan(candidate).partial_element_start() {
        let discarded = candidate.len() - start;
        if discarded < MAX_DISCARDED_TAIL {
            let kept = candidate[..start].trim_end();
            let kept = kept.strip_suffix(',').unwrap_or(kept);
            if let Some(value) = close_and_parse(kept) {
                debug!(discarded, "analysis JSON repaired by dropping a partial trailing entry");
                return Ok(value);
            }
        } else {
            debug!(discarded, "trailing fragment too long to drop");
        }
    }

    if let Some(value) = close_and_parse(candidate) {
        debug!("analysis JSON repaired by closing open brackets");
        return Ok(value);
    }

    Err(RepairError::UnrepairableJson {
        raw: raw.to_owned(),
    })
}

fn json_candidate(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn close_and_parse(text: &str) -> Option<Value> {
    let suffix = closing_suffix(text)?;
    let mut closed = String::with_capacity(text.len() + suffix.len());
    closed.push_str(text);
    closed.push_str(&suffix);
    serde_json::from_str(&closed).ok()
}

/// Closers that balance `text`, innermost first. `None` when the text ends
/// inside a string or contains a mismatched closer.
fn closing_suffix(text: &str) -> Option<String> {
    let scanned = scan(text);
    if scanned.in_string || scanned.mismatched {
        return None;
    }

    Some(
        scanned
            .open
            .iter()
            .rev()
            .map(|bracket| if bracket.byte == b'{' { '}' } else { ']' })
            .collect(),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenBracket {
    byte: u8,
    at: usize,
}

#[derive(Debug, Default)]
struct Scan {
    open: Vec<OpenBracket>,
    in_string: bool,
    string_start: usize,
    mismatched: bool,
}

impl Scan {
    /// Offset of the outermost array element still open at the end of the text.
    ///
    /// Any closer for that element would have to come from the repair suffix,
    /// so the element was cut off mid-write.
    fn partial_element_start(&self) -> Option<usize> {
        let nested = self
            .open
            .windows(2)
            .find(|pair| pair[0].byte == b'[')
            .map(|pair| pair[1].at);

        nested.or_else(|| {
            (self.in_string && self.open.last().is_some_and(|top| top.byte == b'['))
                .then_some(self.string_start)
        })
    }
}

fn scan(text: &str) -> Scan {
    let mut state = Scan::default();
    let mut escaped = false;

    for (index, byte) in text.bytes().enumerate() {
        if state.in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => state.in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => {
                state.in_string = true;
                state.string_start = index;
            }
            b'{' | b'[' => state.open.push(OpenBracket { byte, at: index }),
            b'}' | b']' => {
                let expected = if byte == b'}' { b'{' } else { b'[' };
                if state.open.pop().map(|bracket| bracket.byte) != Some(expected) {
                    state.mismatched = true;
                }
            }
            _ => {}
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn well_formed_json_is_returned_as_is() {
        let raw = r#"Here is the analysis: {"nodes":[{"id":"1"}],"edges":[]} Hope it helps."#;
        assert_eq!(
            repair_response(raw).unwrap(),
            json!({"nodes":[{"id":"1"}],"edges":[]})
        );
    }

    #[test]
    fn text_without_braces_is_not_json() {
        assert_eq!(
            repair_response("Sorry, I cannot help with that."),
            Err(RepairError::NoJsonFound)
        );
        assert_eq!(repair_response("} backwards {"), Err(RepairError::NoJsonFound));
    }

    #[test]
    fn truncated_edge_is_discarded() {
        let raw = r#"{"nodes":[{"id":"1","label":"A"},{"id":"2","label":"B"}],"edges":[{"source":"1","target":"2","strength":8},{"source":"2","target":"1","str"#;
        let value = repair_response(raw).unwrap();

        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            value["edges"],
            json!([{"source":"1","target":"2","strength":8}])
        );
    }

    #[test]
    fn truncation_right_after_first_array_keeps_complete_nodes() {
        let raw = r#"{"nodes":[{"id":"1","label":"A"}],"edges":[{"source":"1","target":"2","str"#;
        let value = repair_response(raw).unwrap();

        assert_eq!(value, json!({"nodes":[{"id":"1","label":"A"}]}));
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let raw = r#"{"nodes":[{"id":"1","justification":"uses {curly}, and [square] text"},{"id":"2"}],"edges":[{"source":"1","target":"2","description":"a } b"#;
        let value = repair_response(raw).unwrap();

        assert_eq!(
            value["nodes"][0]["justification"],
            json!("uses {curly}, and [square] text")
        );
    }

    #[test]
    fn partial_entry_ending_inside_string_is_dropped() {
        let raw = r#"{"nodes":[{"id":"1"},{"id":"2"}],"edges":[{"source":"1","target":"2"},{"source":"2","target":"1","description":"with a } brace and then cut"#;
        let value = repair_response(raw).unwrap();

        assert_eq!(value["edges"], json!([{"source":"1","target":"2"}]));
    }

    #[test]
    fn long_discarded_tail_is_not_truncated() {
        let filler = "x".repeat(MAX_DISCARDED_TAIL + 10);
        let raw = format!(
            r#"{{"nodes":[{{"id":"1"}},{{"id":"2","justification":"{filler}}}"#
        );

        assert!(matches!(
            repair_response(&raw),
            Err(RepairError::UnrepairableJson { .. })
        ));
    }

    #[test]
    fn unrepairable_json_carries_raw_text() {
        let raw = "{\"nodes\": [1, 2 } oops }";
        assert_eq!(
            repair_response(raw),
            Err(RepairError::UnrepairableJson {
                raw: raw.to_owned()
            })
        );
    }

    #[test]
    fn edge_cut_after_an_inline_endpoint_is_dropped() {
        let raw = r#"{"nodes":[{"id":"1"},{"id":"2"}],"edges":[{"source":"1","target":"2","strength":9,"type":"thematic"},{"source":"2","target":{"id":"1"}"#;
        let value = repair_response(raw).unwrap();

        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            value["edges"],
            json!([{"source":"1","target":"2","strength":9,"type":"thematic"}])
        );
    }

    #[test]
    fn partial_first_entry_leaves_an_empty_array() {
        let raw = r#"{"nodes":[{"id":"1"},{"id":"2"}],"edges":[{"source":{"id":"1"}"#;
        let value = repair_response(raw).unwrap();

        assert_eq!(value, json!({"nodes":[{"id":"1"},{"id":"2"}],"edges":[]}));
    }

    #[test]
    fn open_element_is_found_at_array_depth() {
        let scanned = scan("{\"edges\":[{\"id\":\"1\"} ,\n {\"source\":{\"id\"");
        assert_eq!(scanned.partial_element_start(), Some(24));
        assert!(!scanned.in_string);

        let complete = scan(r#"{"nodes":[{"id":"1"},{"id":"2"}"#);
        assert_eq!(complete.partial_element_start(), None);
    }

    #[test]
    fn closers_follow_nesting_order() {
        assert_eq!(closing_suffix(r#"{"a":[{"b":[1"#).as_deref(), Some("]}]}"));
        assert_eq!(closing_suffix(r#"{"a":"unterminated"#), None);
    }
}
