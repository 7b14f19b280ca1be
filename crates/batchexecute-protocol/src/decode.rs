//! Response decoding.
//!
//! Both supported formats yield response envelope tuples. A tuple is a data
//! envelope when it has at least seven elements and element 0 is `"wrb.fr"`;
//! any other tuple is skipped without error. Data envelopes are checked once
//! here and turned into [`DecodedResult`]s:
//!
//! ```text
//! ["wrb.fr", "<rpc id>", "<JSON payload>", _, _, _, "generic" | "<index>", ...]
//! ```

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ProtocolError, ProtocolResult};
use crate::framing::CompressedChunks;
use crate::types::{DecodedResult, ResponseFormat};
use crate::{DATA_ENVELOPE_MARKER, GENERIC_TAG};

/// Minimum number of elements in a data envelope.
const MIN_ENVELOPE_LEN: usize = 7;

/// Number of leading framing lines in the default format.
const DEFAULT_FRAMING_LINES: usize = 2;

/// Decodes a raw batchexecute response.
///
/// Results are sorted by index. With `strict`, null payloads are rejected
/// and the distinct returned rpc ids must match the distinct
/// `expected_ids`, with the same total count.
///
/// # Example
///
/// ```rust
/// use batchexecute_protocol::{ResponseFormat, decode};
///
/// let raw = "1\n2\n[[\"wrb.fr\",\"Abc\",\"[1,2]\",null,null,null,\"generic\"]]";
/// let results = decode::<&str>(raw, ResponseFormat::Default, false, &[]).unwrap();
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].index, 1);
/// ```
pub fn decode<S: AsRef<str>>(
    raw: &str,
    format: ResponseFormat,
    strict: bool,
    expected_ids: &[S],
) -> ProtocolResult<Vec<DecodedResult>> {
    let mut decoded = match format {
        ResponseFormat::Default => decode_default(raw, strict)?,
        ResponseFormat::Compressed => decode_compressed(raw, strict)?,
        ResponseFormat::Protobuf => {
            return Err(ProtocolError::NotImplemented(format.tag().to_string()));
        }
    };

    if decoded.is_empty() {
        return Err(ProtocolError::NoEnvelopes);
    }

    decoded.sort_by_key(|result| result.index);

    if strict {
        check_rpc_ids(&decoded, expected_ids)?;
    }

    debug!(format = %format, strict, count = decoded.len(), "decoded batchexecute response");
    Ok(decoded)
}

/// Decodes a raw response selecting the format by its wire tag
/// (`""`, `"c"` or `"b"`).
pub fn decode_tagged<S: AsRef<str>>(
    raw: &str,
    tag: &str,
    strict: bool,
    expected_ids: &[S],
) -> ProtocolResult<Vec<DecodedResult>> {
    let format: ResponseFormat = tag.parse()?;
    decode(raw, format, strict, expected_ids)
}

/// Returns the sorted distinct values of `items`.
pub fn sorted_set<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn decode_default(raw: &str, strict: bool) -> ProtocolResult<Vec<DecodedResult>> {
    let lines: Vec<&str> = raw.split('\n').collect();
    if lines.len() <= DEFAULT_FRAMING_LINES {
        return Err(ProtocolError::InvalidResponse(format!(
            "expected at least {} lines, got {}",
            DEFAULT_FRAMING_LINES + 1,
            lines.len()
        )));
    }

    let body = lines[DEFAULT_FRAMING_LINES..].concat();
    let envelopes: Vec<Vec<Value>> =
        serde_json::from_str(&body).map_err(ProtocolError::InvalidEnvelope)?;

    let mut decoded = Vec::with_capacity(envelopes.len());
    for envelope in &envelopes {
        if let Some(result) = parse_envelope(envelope, strict)? {
            decoded.push(result);
        }
    }
    Ok(decoded)
}

fn decode_compressed(raw: &str, strict: bool) -> ProtocolResult<Vec<DecodedResult>> {
    let chunks = CompressedChunks::new(raw);
    if !chunks.has_marker() {
        return Err(ProtocolError::InvalidResponse(
            "no envelopes found".to_string(),
        ));
    }

    let mut decoded = Vec::new();
    for chunk in chunks {
        let envelope: Vec<Value> =
            serde_json::from_str(chunk.body).map_err(ProtocolError::InvalidEnvelope)?;
        if let Some(result) = parse_envelope(&envelope, strict)? {
            decoded.push(result);
        }
    }
    Ok(decoded)
}

/// Returns true if `envelope` carries call data.
fn is_data_envelope(envelope: &[Value]) -> bool {
    envelope.len() >= MIN_ENVELOPE_LEN
        && envelope[0].as_str() == Some(DATA_ENVELOPE_MARKER)
}

/// Turns one envelope tuple into a result, or `None` if it is not a data
/// envelope.
fn parse_envelope(envelope: &[Value], strict: bool) -> ProtocolResult<Option<DecodedResult>> {
    if !is_data_envelope(envelope) {
        trace!(
            len = envelope.len(),
            tag = ?envelope.first(),
            "skipping non-data envelope"
        );
        return Ok(None);
    }

    let index = parse_index(&envelope[6])?;

    let rpc_id = envelope[1]
        .as_str()
        .ok_or(ProtocolError::UnexpectedShape {
            field: "rpc id (element 1)",
            expected: "string",
        })?;

    let encoded = envelope[2].as_str().ok_or_else(|| {
        ProtocolError::InvalidData(format!(
            "envelope {index} ({rpc_id}): element 2 is not a string"
        ))
    })?;
    let data: Value = serde_json::from_str(encoded)
        .map_err(|e| ProtocolError::InvalidData(format!("envelope {index} ({rpc_id}): {e}")))?;

    if strict && data.is_null() {
        return Err(ProtocolError::EmptyPayload {
            index,
            rpc_id: rpc_id.to_string(),
        });
    }

    Ok(Some(DecodedResult::new(index, rpc_id, data)))
}

fn parse_index(value: &Value) -> ProtocolResult<i64> {
    match value.as_str() {
        Some(GENERIC_TAG) => Ok(1),
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| ProtocolError::InvalidIndex(s.to_string())),
        None => Err(ProtocolError::InvalidIndex(value.to_string())),
    }
}

fn check_rpc_ids<S: AsRef<str>>(decoded: &[DecodedResult], expected_ids: &[S]) -> ProtocolResult<()> {
    let got: Vec<&str> = decoded.iter().map(|r| r.rpc_id.as_str()).collect();

    if expected_ids.len() != got.len() {
        return Err(ProtocolError::CountMismatch {
            expected: expected_ids.len(),
            got: got.len(),
        });
    }

    let expected_set = sorted_set(expected_ids);
    let got_set = sorted_set(&got);
    if expected_set != got_set {
        return Err(ProtocolError::IdMismatch {
            expected: expected_set,
            got: got_set,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::request::BatchRequest;
    use crate::types::RpcCall;
    use serde_json::json;

    const NONE: &[&str] = &[];

    fn envelope(rpc_id: &str, data: &str, tag: &str) -> Value {
        json!(["wrb.fr", rpc_id, data, null, null, null, tag])
    }

    fn default_raw(envelopes: &[Value]) -> String {
        format!(")]}}'\n\n{}", Value::Array(envelopes.to_vec()))
    }

    fn compressed_raw(envelopes: &[Value]) -> String {
        let mut raw = String::from(")]}'\n\n");
        for envelope in envelopes {
            let body = envelope.to_string();
            raw.push_str(&format!("{}\n{}\n", body.len(), body));
        }
        raw
    }

    #[test]
    fn single_generic_envelope() {
        let raw = "1\n2\n[[\"wrb.fr\",\"Abc\",\"[1,2]\",null,null,null,\"generic\"]]";
        let results = decode(raw, ResponseFormat::Default, false, NONE).unwrap();
        assert_eq!(results, vec![DecodedResult::new(1, "Abc", json!([1, 2]))]);
    }

    #[test]
    fn decoded_output_shape() {
        let raw = default_raw(&[
            envelope("Def", r#"{"a":true}"#, "2"),
            envelope("Abc", "[1,2]", "1"),
        ]);
        let results = decode(&raw, ResponseFormat::Default, true, &["Abc", "Def"]).unwrap();
        insta::assert_json_snapshot!(results, @r#"
        [
          {
            "index": 1,
            "id": "Abc",
            "data": [
              1,
              2
            ]
          },
          {
            "index": 2,
            "id": "Def",
            "data": {
              "a": true
            }
          }
        ]
        "#);
    }

    #[test]
    fn line_splitting_inside_json_is_irrelevant() {
        let compact = "1\n2\n[[\"wrb.fr\",\"Abc\",\"[1,2]\",null,null,null,\"generic\"]]";
        let split = "1\n2\n[[\"wrb.fr\",\n\"Abc\",\"[1,2]\",\nnull,null,null,\"generic\"]\n]";
        assert_eq!(
            decode(compact, ResponseFormat::Default, false, NONE).unwrap(),
            decode(split, ResponseFormat::Default, false, NONE).unwrap()
        );
    }

    #[test]
    fn results_are_sorted_by_index() {
        let raw = default_raw(&[
            envelope("C", "3", "3"),
            envelope("A", "1", "1"),
            envelope("B", "2", "2"),
        ]);
        let results = decode(&raw, ResponseFormat::Default, false, NONE).unwrap();
        let indexes: Vec<i64> = results.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
        assert_eq!(results[0].rpc_id, "A");
        assert_eq!(results[2].rpc_id, "C");
    }

    #[test]
    fn equal_indexes_keep_extraction_order() {
        let raw = default_raw(&[
            envelope("Second", "2", "2"),
            envelope("FirstA", "1", "1"),
            envelope("FirstB", "1", "generic"),
        ]);
        let results = decode(&raw, ResponseFormat::Default, false, NONE).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.rpc_id.as_str()).collect();
        assert_eq!(ids, vec!["FirstA", "FirstB", "Second"]);
    }

    #[test]
    fn non_data_envelopes_are_skipped() {
        let raw = default_raw(&[
            json!(["di", 42]),
            json!(["af.httprm", 41, "-123", 7, null, null, "x"]),
            envelope("Abc", "[1]", "generic"),
        ]);
        let results = decode(&raw, ResponseFormat::Default, false, NONE).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rpc_id, "Abc");
    }

    #[test]
    fn short_tuple_is_skipped() {
        let raw = default_raw(&[
            json!(["wrb.fr", "Short", "[1]", null, null]),
            envelope("Abc", "[1]", "generic"),
        ]);
        let results = decode(&raw, ResponseFormat::Default, false, NONE).unwrap();
        assert_eq!(results, vec![DecodedResult::new(1, "Abc", json!([1]))]);
    }

    #[test]
    fn nothing_usable_is_an_empty_result() {
        let raw = default_raw(&[json!(["di", 42]), json!(["e", 4, null, null, 12])]);
        let err = decode(&raw, ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::NoEnvelopes));
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn unparsable_body_is_malformed_input() {
        let err = decode("1\n2\n[[\"wrb.fr\",", ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidEnvelope(_)));
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn too_few_lines() {
        let err = decode("only\none", ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidResponse(_)));
    }

    #[test]
    fn invalid_index() {
        let raw = default_raw(&[envelope("Abc", "[1]", "first")]);
        let err = decode(&raw, ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidIndex(ref s) if s == "first"));

        let raw = default_raw(&[json!(["wrb.fr", "Abc", "[1]", null, null, null, 3])]);
        let err = decode(&raw, ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidIndex(_)));
    }

    #[test]
    fn negative_and_wide_indexes() {
        let raw = default_raw(&[
            envelope("Wide", "[3]", "4294967296"),
            envelope("Plain", "[2]", "2"),
            envelope("Negative", "[1]", "-1"),
        ]);
        let results = decode(&raw, ResponseFormat::Default, false, NONE).unwrap();
        let indexes: Vec<i64> = results.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![-1, 2, 4_294_967_296]);
        assert_eq!(results[0].rpc_id, "Negative");
        assert_eq!(results[2].rpc_id, "Wide");

        let raw = default_raw(&[envelope("Abc", "[1]", "9223372036854775808")]);
        let err = decode(&raw, ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidIndex(_)));
    }

    #[test]
    fn non_string_rpc_id() {
        let raw = default_raw(&[json!(["wrb.fr", 7, "[1]", null, null, null, "generic"])]);
        let err = decode(&raw, ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedShape { .. }));
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn invalid_payload() {
        let raw = default_raw(&[envelope("Abc", "[1,", "generic")]);
        let err = decode(&raw, ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidData(_)));

        let raw = default_raw(&[json!(["wrb.fr", "Abc", [1], null, null, null, "generic"])]);
        let err = decode(&raw, ResponseFormat::Default, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidData(_)));
    }

    #[test]
    fn null_payload_allowed_unless_strict() {
        let raw = default_raw(&[envelope("Abc", "null", "generic")]);
        let results = decode(&raw, ResponseFormat::Default, false, NONE).unwrap();
        assert_eq!(results[0].data, Value::Null);

        let err = decode(&raw, ResponseFormat::Default, true, &["Abc"]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::EmptyPayload { index: 1, ref rpc_id } if rpc_id == "Abc"
        ));
        assert_eq!(err.kind(), ErrorKind::StrictEmptyPayload);
    }

    #[test]
    fn strict_count_mismatch() {
        let raw = default_raw(&[envelope("Abc", "[1]", "1")]);
        let err = decode(&raw, ResponseFormat::Default, true, &["Abc", "Def"]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::CountMismatch {
                expected: 2,
                got: 1
            }
        ));
        assert_eq!(err.kind(), ErrorKind::StrictMismatch);
    }

    #[test]
    fn strict_membership_mismatch() {
        let raw = default_raw(&[envelope("Abc", "[1]", "1"), envelope("Xyz", "[2]", "2")]);
        let err = decode(&raw, ResponseFormat::Default, true, &["Abc", "Def"]).unwrap_err();
        match err {
            ProtocolError::IdMismatch { expected, got } => {
                assert_eq!(expected, vec!["Abc", "Def"]);
                assert_eq!(got, vec!["Abc", "Xyz"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_membership_is_case_sensitive() {
        let raw = default_raw(&[envelope("abc", "[1]", "generic")]);
        let err = decode(&raw, ResponseFormat::Default, true, &["Abc"]).unwrap_err();
        assert!(matches!(err, ProtocolError::IdMismatch { .. }));
    }

    #[test]
    fn strict_compares_distinct_ids() {
        let raw = default_raw(&[
            envelope("Abc", "[1]", "1"),
            envelope("Abc", "[2]", "2"),
            envelope("Def", "[3]", "3"),
        ]);
        let results = decode(&raw, ResponseFormat::Default, true, &["Def", "Abc", "Def"]).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn strict_roundtrip_with_request() {
        let calls = vec![
            RpcCall::new("Qxytce", "[]"),
            RpcCall::new("EAfJqe", "[]"),
        ];
        let request = BatchRequest::build("example.com", "App", &calls).unwrap();
        let raw = default_raw(&[
            envelope("EAfJqe", "[\"b\"]", "2"),
            envelope("Qxytce", "[\"a\"]", "1"),
        ]);
        let results = decode(&raw, ResponseFormat::Default, true, request.rpc_ids()).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.rpc_id.as_str()).collect();
        assert_eq!(sorted_set(&ids), sorted_set(request.rpc_ids()));
    }

    #[test]
    fn protobuf_is_not_implemented() {
        for raw in ["", "1\n2\n[]", "\u{0}\u{1}binary"] {
            let err = decode(raw, ResponseFormat::Protobuf, false, NONE).unwrap_err();
            assert!(matches!(err, ProtocolError::NotImplemented(ref tag) if tag == "b"));
            assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        }
    }

    #[test]
    fn tagged_formats() {
        let raw = "1\n2\n[[\"wrb.fr\",\"Abc\",\"[1,2]\",null,null,null,\"generic\"]]";
        assert_eq!(decode_tagged(raw, "", false, NONE).unwrap().len(), 1);
        assert!(matches!(
            decode_tagged(raw, "b", false, NONE),
            Err(ProtocolError::NotImplemented(_))
        ));
        assert!(matches!(
            decode_tagged(raw, "z", false, NONE),
            Err(ProtocolError::InvalidFormat(ref tag)) if tag == "z"
        ));
    }

    #[test]
    fn compressed_format() {
        let raw = compressed_raw(&[
            envelope("Def", "[2]", "2"),
            json!(["di", 42]),
            envelope("Abc", "[1]", "1"),
        ]);
        let results = decode(&raw, ResponseFormat::Compressed, true, &["Abc", "Def"]).unwrap();
        assert_eq!(
            results,
            vec![
                DecodedResult::new(1, "Abc", json!([1])),
                DecodedResult::new(2, "Def", json!([2])),
            ]
        );
    }

    #[test]
    fn compressed_without_markers() {
        let err = decode("[\"wrb.fr\"]", ResponseFormat::Compressed, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidResponse(_)));
    }

    #[test]
    fn compressed_invalid_chunk() {
        let err = decode("5\n[\"wrb", ResponseFormat::Compressed, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidEnvelope(_)));
    }

    #[test]
    fn compressed_only_skipped_chunks() {
        let raw = compressed_raw(&[json!(["di", 42]), json!(["af.httprm", 41])]);
        let err = decode(&raw, ResponseFormat::Compressed, false, NONE).unwrap_err();
        assert!(matches!(err, ProtocolError::NoEnvelopes));
    }

    #[test]
    fn sorted_set_dedups_and_sorts() {
        assert_eq!(sorted_set(&["b", "a", "b", "c"]), vec!["a", "b", "c"]);
        assert!(sorted_set(NONE).is_empty());
    }
}
