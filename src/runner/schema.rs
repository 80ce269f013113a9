//! Decoding of the analyzer's `--json` output
//!
//! The payload is a JSON array with one object per input path, in input
//! order. The whole batch is rejected if any element is malformed.
//!
//! There is no version field. Keys this module doesn't know about are
//! ignored so the analyzer can add fields without breaking older bridges.

use crate::error::Malformed;
use crate::model::AnalysisResult;
use serde_json::Value;

/// Keys every element must carry
pub const REQUIRED_KEYS: [&str; 7] = [
    "file",
    "key",
    "camelot",
    "lufs",
    "replayGain",
    "introSecs",
    "outroSecs",
];

/// Decode analyzer stdout into exactly `expected` results
pub fn parse_batch(stdout: &[u8], expected: usize) -> Result<Vec<AnalysisResult>, Malformed> {
    let text = std::str::from_utf8(stdout).map_err(|_| Malformed::NotUtf8)?;

    let value: Value =
        serde_json::from_str(text).map_err(|e| Malformed::InvalidJson(e.to_string()))?;

    let elements = match value {
        Value::Array(elements) => elements,
        _ => return Err(Malformed::NotAnArray),
    };

    if elements.len() != expected {
        return Err(Malformed::LengthMismatch {
            expected,
            actual: elements.len(),
        });
    }

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| parse_element(index, element))
        .collect()
}

fn parse_element(index: usize, element: Value) -> Result<AnalysisResult, Malformed> {
    let object = element.as_object().ok_or_else(|| Malformed::InvalidElement {
        index,
        reason: format!("expected an object, got {}", type_name(&element)),
    })?;

    if let Some(field) = REQUIRED_KEYS.into_iter().find(|k| !object.contains_key(*k)) {
        return Err(Malformed::MissingField { index, field });
    }

    let result: AnalysisResult =
        serde_json::from_value(element).map_err(|e| Malformed::InvalidElement {
            index,
            reason: e.to_string(),
        })?;

    result
        .check_invariants()
        .map_err(|reason| Malformed::InvariantViolated { index, reason })?;

    Ok(result)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn element(file: &str) -> Value {
        json!({
            "file": file,
            "bpm": 128.0,
            "key": "A minor",
            "camelot": "8A",
            "lufs": -14.2,
            "replayGain": -1.1,
            "introSecs": 12.0,
            "outroSecs": 180.5,
            "beatgrid": [0.47, 0.94, 1.41]
        })
    }

    fn payload(elements: Vec<Value>) -> Vec<u8> {
        serde_json::to_vec(&Value::Array(elements)).unwrap()
    }

    #[test]
    fn test_scenario_single_file() {
        let results = parse_batch(&payload(vec![element("/tmp/a.mp3")]), 1).unwrap();
        assert_eq!(results.len(), 1);

        let r = &results[0];
        assert_eq!(r.file, "/tmp/a.mp3");
        assert_eq!(r.bpm, Some(128.0));
        assert_eq!(r.key, "A minor");
        assert_eq!(r.camelot, "8A");
        assert_eq!(r.lufs, -14.2);
        assert_eq!(r.replay_gain, -1.1);
        assert_eq!(r.intro_secs, 12.0);
        assert_eq!(r.outro_secs, 180.5);
        assert_eq!(r.beatgrid, vec![0.47, 0.94, 1.41]);
        for (key, value) in r.tags.iter() {
            assert_eq!(value, "", "{}", key);
        }
    }

    #[test]
    fn test_order_follows_array_position() {
        let files = ["/c.mp3", "/a.mp3", "/b.mp3"];
        let elements = files.iter().map(|f| element(f)).collect();
        let results = parse_batch(&payload(elements), 3).unwrap();
        let got: Vec<&str> = results.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(got, files);
    }

    #[test]
    fn test_missing_required_key_identifies_index_and_key() {
        let mut broken = element("/x.mp3");
        broken.as_object_mut().unwrap().remove("lufs");

        let err = parse_batch(&payload(vec![broken]), 1).unwrap_err();
        assert_eq!(
            err,
            Malformed::MissingField {
                index: 0,
                field: "lufs"
            }
        );
    }

    #[test]
    fn test_one_bad_element_fails_whole_batch() {
        let mut broken = element("/b.mp3");
        broken.as_object_mut().unwrap().remove("camelot");

        let err = parse_batch(&payload(vec![element("/a.mp3"), broken]), 2).unwrap_err();
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn test_length_mismatch() {
        let elements = vec![element("/a.mp3"), element("/b.mp3")];
        let err = parse_batch(&payload(elements), 3).unwrap_err();
        assert_eq!(
            err,
            Malformed::LengthMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_not_json_or_not_array() {
        assert!(matches!(
            parse_batch(b"BPM: 128", 1),
            Err(Malformed::InvalidJson(_))
        ));
        assert_eq!(
            parse_batch(br#"{"file": "/a.mp3"}"#, 1).unwrap_err(),
            Malformed::NotAnArray
        );
        assert_eq!(parse_batch(&[0xff, 0xfe], 1).unwrap_err(), Malformed::NotUtf8);
    }

    #[test]
    fn test_null_required_field_is_invalid() {
        let mut broken = element("/x.mp3");
        broken["lufs"] = Value::Null;
        assert!(matches!(
            parse_batch(&payload(vec![broken]), 1),
            Err(Malformed::InvalidElement { index: 0, .. })
        ));
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        let mut broken = element("/x.mp3");
        broken["replayGain"] = json!("-1.1");
        assert!(matches!(
            parse_batch(&payload(vec![broken]), 1),
            Err(Malformed::InvalidElement { index: 0, .. })
        ));

        assert!(matches!(
            parse_batch(b"[42]", 1),
            Err(Malformed::InvalidElement { index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_optionals_default() {
        let mut minimal = element("/x.mp3");
        let obj = minimal.as_object_mut().unwrap();
        obj.remove("bpm");
        obj.remove("beatgrid");

        let results = parse_batch(&payload(vec![minimal]), 1).unwrap();
        assert_eq!(results[0].bpm, None);
        assert!(results[0].beatgrid.is_empty());
    }

    #[test]
    fn test_beatgrid_without_bpm_is_rejected() {
        let mut broken = element("/x.mp3");
        broken.as_object_mut().unwrap().remove("bpm");
        assert!(matches!(
            parse_batch(&payload(vec![broken]), 1),
            Err(Malformed::InvariantViolated { index: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut extended = element("/x.mp3");
        extended["schemaVersion"] = json!(3);
        extended["energy"] = json!(0.8);
        extended["title"] = json!("Track");
        extended["trackNumber"] = json!("4");

        let results = parse_batch(&payload(vec![extended]), 1).unwrap();
        assert_eq!(results[0].tags.title, "Track");
        assert_eq!(results[0].tags.track_number, "4");
    }

    #[test]
    fn test_decode_encode_decode_is_lossless() {
        let mut full = element("/music/Artist - Track.flac");
        for (i, key) in crate::model::Tags::KEYS.iter().enumerate() {
            full[*key] = json!(format!("value {}", i));
        }
        let first = parse_batch(&payload(vec![full.clone()]), 1).unwrap();

        let encoded = serde_json::to_vec(&first).unwrap();
        let second = parse_batch(&encoded, 1).unwrap();
        assert_eq!(first, second);

        // Every input key survives re-serialization with the same value
        let reencoded: Value = serde_json::from_slice(&encoded).unwrap();
        for (key, value) in full.as_object().unwrap() {
            assert_eq!(&reencoded[0][key], value, "{}", key);
        }
    }
}
