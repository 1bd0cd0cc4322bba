//! Edits of a `(Buffer, Description)` pair.
//!
//! Every edit replaces one contiguous span of JSON text and one contiguous
//! run of records. The replacement text and records are encoded up front,
//! then [`commit`] applies both splices and reconciles the rest of the index:
//! records after the edit are shifted by the byte delta, and every enclosing
//! container's JSON length and index length absorb the change. The text is
//! edited in place when the buffer is the sole owner of its allocation and
//! copied otherwise.
//!
//! Record offsets passed to these functions must point at the start of a
//! record. For object members, `remove` takes the key record while `rewrite`
//! takes the value record.

use alloc::vec::Vec;
use core::ops::Range;

use crate::{
    Bounds, Buffer, Description, JsonType, ReadIndex, Value,
    description::{CONTAINER_RECORD_LEN, fits_record_field, signed},
    value::encode_string,
};

/// A staged edit: the text and records that replace a span.
struct Splice {
    text: Range<usize>,
    json: Vec<u8>,
    records: Range<usize>,
    description: Description,
}

/// Record offsets of every container enclosing `target`, outermost first.
fn ancestors(reader: &ReadIndex<'_>, target: usize) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut at = 0;
    while at != target {
        debug_assert!(
            reader.json_type(at).is_some_and(JsonType::is_container),
            "record {target} is not inside the value at {at}"
        );
        chain.push(at);
        let mut child = at + CONTAINER_RECORD_LEN;
        loop {
            let end = child + reader.index_length(child);
            if target < end {
                break;
            }
            child = end;
        }
        at = child;
    }
    chain
}

/// The text span and record count of the member starting at `at`. For an
/// object member the span runs from the key's opening quote through the end
/// of the value.
fn member(reader: &ReadIndex<'_>, parent: JsonType, at: usize) -> (Bounds, usize) {
    let start = reader.raw_bounds(at);
    if parent == JsonType::Object {
        let value = at + reader.index_length(at);
        let end = reader.raw_bounds(value).end();
        let records = reader.index_length(at) + reader.index_length(value);
        (Bounds::new(start.offset, end - start.offset), records)
    } else {
        (start, reader.index_length(at))
    }
}

/// Removes the member whose first record is at `at`, together with one
/// adjoining separator.
///
/// # Panics
///
/// Panics if `at` is the root record.
pub(crate) fn remove(buffer: &mut Buffer, description: &mut Description, at: usize) {
    let reader = description.reader();
    let enclosing = ancestors(&reader, at);
    let Some(&parent) = enclosing.last() else {
        panic!("the root value cannot be removed");
    };
    let parent_type = reader.record_type(parent);
    let (span, record_len) = member(&reader, parent_type, at);

    let mut children = reader.children(parent);
    let previous = children.by_ref().take_while(|&child| child != at).last();
    let next = children.next();

    // Prefer the separator after the member so the remaining text keeps its
    // leading layout; the last member takes the separator before it.
    let text = match (previous, next) {
        (_, Some(next)) => span.offset..reader.raw_bounds(next).offset,
        (Some(previous), None) => member(&reader, parent_type, previous).0.end()..span.end(),
        (None, None) => span.range(),
    };

    crate::trace!(
        record = at,
        text_start = text.start,
        text_end = text.end,
        records = record_len,
        "removing member"
    );

    commit(
        buffer,
        description,
        Splice {
            text,
            json: Vec::new(),
            records: at..at + record_len,
            description: Description::new(),
        },
        &enclosing,
        -1,
    );
}

/// Replaces the value whose record is at `at` with `value`.
pub(crate) fn rewrite(buffer: &mut Buffer, description: &mut Description, value: &Value, at: usize) {
    let reader = description.reader();
    let enclosing = ancestors(&reader, at);
    let old = reader.raw_bounds(at);
    let records = at..at + reader.index_length(at);

    let mut json = Vec::new();
    let mut encoded = Description::new();
    value.encode_into(&mut json, &mut encoded, old.offset);

    crate::trace!(
        record = at,
        old_length = old.length,
        new_length = json.len(),
        old_records = records.len(),
        new_records = encoded.len(),
        "rewriting value"
    );

    commit(
        buffer,
        description,
        Splice {
            text: old.range(),
            json,
            records,
            description: encoded,
        },
        &enclosing,
        0,
    );
}

/// Inserts `value` into the container at `container` so that it becomes the
/// `position`th child. Object members need a `key`; array elements must not
/// have one.
///
/// # Panics
///
/// Panics if `position` is greater than the container's child count.
pub(crate) fn insert(
    buffer: &mut Buffer,
    description: &mut Description,
    value: &Value,
    container: usize,
    position: usize,
    key: Option<&str>,
) {
    let reader = description.reader();
    let container_type = reader.record_type(container);
    debug_assert_eq!(key.is_some(), container_type == JsonType::Object);

    let count = reader.child_count(container);
    assert!(
        position <= count,
        "insertion index (is {position}) should be <= len (is {count})"
    );

    let encode_member = |json: &mut Vec<u8>, records: &mut Description, origin: usize| {
        if let Some(key) = key {
            encode_string(key, json, records, origin);
            json.push(b':');
        }
        value.encode_into(json, records, origin);
    };

    let mut json = Vec::new();
    let mut encoded = Description::new();
    let (offset, record_at) = if count == 0 {
        let offset = reader.data_bounds(container).end() - 1;
        encode_member(&mut json, &mut encoded, offset);
        (offset, container + CONTAINER_RECORD_LEN)
    } else if position < count {
        let Some(before) = reader.children(container).nth(position) else {
            unreachable!("position {position} is below the child count {count}");
        };
        let offset = reader.raw_bounds(before).offset;
        encode_member(&mut json, &mut encoded, offset);
        json.push(b',');
        (offset, before)
    } else {
        let Some(last) = reader.children(container).last() else {
            unreachable!("container with {count} children has no last child");
        };
        let offset = member(&reader, container_type, last).0.end();
        json.push(b',');
        encode_member(&mut json, &mut encoded, offset);
        (offset, container + reader.index_length(container))
    };

    let mut enclosing = ancestors(&reader, container);
    enclosing.push(container);

    crate::trace!(
        container,
        position,
        offset,
        length = json.len(),
        records = encoded.len(),
        "inserting member"
    );

    commit(
        buffer,
        description,
        Splice {
            text: offset..offset,
            json,
            records: record_at..record_at,
            description: encoded,
        },
        &enclosing,
        1,
    );
}

/// Applies a staged edit. `enclosing` lists every container around the
/// edited span, outermost first; the innermost one's child count changes by
/// `count_delta`.
///
/// # Panics
///
/// Panics before touching either half if the edited document no longer fits
/// the index's `u32` fields.
fn commit(
    buffer: &mut Buffer,
    description: &mut Description,
    splice: Splice,
    enclosing: &[usize],
    count_delta: isize,
) {
    let json_len = buffer.len() - splice.text.len() + splice.json.len();
    let index_len = description.len() - splice.records.len() + splice.description.len();
    assert!(
        fits_record_field(json_len) && fits_record_field(index_len),
        "edited document ({json_len} bytes of text, {index_len} bytes of index) does not fit the index"
    );

    let byte_delta = signed(splice.json.len()) - signed(splice.text.len());
    let record_delta = signed(splice.description.len()) - signed(splice.records.len());

    buffer.splice(splice.text, &splice.json);
    description.splice(splice.records.clone(), splice.description.as_bytes());

    let after = splice.records.start + splice.description.len();
    description.shift_json_offsets(after..description.len(), byte_delta);
    for &container in enclosing {
        description.adjust_json_length(container, byte_delta);
        description.adjust_index_length(container, record_delta);
    }
    if let Some(&parent) = enclosing.last() {
        if count_delta != 0 {
            description.adjust_child_count(parent, count_delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use rstest::rstest;

    use super::*;
    use crate::{ParseOptions, scan};

    fn scanned(json: &str) -> (Buffer, Description) {
        scan(json.as_bytes(), &ParseOptions::default()).unwrap()
    }

    fn text(buffer: &Buffer) -> String {
        String::from_utf8(buffer.as_bytes().to_vec()).unwrap()
    }

    /// Asserts that `description` is exactly what a fresh scan of `buffer`
    /// would produce.
    fn assert_rescans(buffer: &Buffer, description: &Description) {
        let (_, fresh) = scan(buffer.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(description, &fresh, "index drifted for {}", text(buffer));
        assert_eq!(description.check_consistency(buffer.len()), Ok(()));
    }

    #[test]
    fn ancestors_lists_enclosing_containers() {
        let (_, description) = scanned(r#"[1, {"a": [true]}]"#);
        let reader = description.reader();
        let object = reader.offset_for_index(1);
        let array = object + CONTAINER_RECORD_LEN + 9;
        let leaf = array + CONTAINER_RECORD_LEN;
        assert_eq!(reader.json_type(leaf), Some(JsonType::BoolTrue));
        assert_eq!(ancestors(&reader, leaf), [0, object, array]);
        assert_eq!(ancestors(&reader, object), [0]);
        assert!(ancestors(&reader, 0).is_empty());
    }

    #[rstest]
    #[case("[1, 2, 3]", 0, "[2, 3]")]
    #[case("[1, 2, 3]", 1, "[1, 3]")]
    #[case("[1, 2, 3]", 2, "[1, 2]")]
    #[case("[ 1 ]", 0, "[  ]")]
    #[case(r#"["a", ["b", "c"]]"#, 1, r#"["a"]"#)]
    #[case(r#"{"a": 1, "b": [2]}"#, 0, r#"{"b": [2]}"#)]
    #[case(r#"{"a": 1, "b": [2]}"#, 1, r#"{"a": 1}"#)]
    #[case(r#"{"only": "x"}"#, 0, "{}")]
    fn remove_takes_one_separator(#[case] json: &str, #[case] index: usize, #[case] expected: &str) {
        let (mut buffer, mut description) = scanned(json);
        let at = description.reader().offset_for_index(index);
        remove(&mut buffer, &mut description, at);
        assert_eq!(text(&buffer), expected);
        assert_rescans(&buffer, &description);
    }

    #[test]
    fn remove_inside_nested_container_updates_every_ancestor() {
        let (mut buffer, mut description) = scanned(r#"[[1, [2, 3]], "tail"]"#);
        let reader = description.reader();
        let outer = reader.offset_for_index(0);
        let inner = reader.children(outer).nth(1).unwrap();
        let two = reader.children(inner).next().unwrap();

        remove(&mut buffer, &mut description, two);
        assert_eq!(text(&buffer), r#"[[1, [3]], "tail"]"#);
        assert_eq!(description.reader().child_count(inner), 1);
        assert_rescans(&buffer, &description);
    }

    #[rstest]
    #[case(Value::Integer(10), "[1, 10, 3]")]
    #[case(Value::from("two"), r#"[1, "two", 3]"#)]
    #[case(Value::from("tab\there"), r#"[1, "tab\there", 3]"#)]
    #[case(Value::Null, "[1, null, 3]")]
    #[case(Value::Double(2.5), "[1, 2.5, 3]")]
    fn rewrite_scalar(#[case] value: Value, #[case] expected: &str) {
        let (mut buffer, mut description) = scanned("[1, 2, 3]");
        let at = description.reader().offset_for_index(1);
        rewrite(&mut buffer, &mut description, &value, at);
        assert_eq!(text(&buffer), expected);
        assert_rescans(&buffer, &description);
    }

    #[test]
    fn rewrite_scalar_with_container_keeps_the_count() {
        let (mut buffer, mut description) = scanned(r#"{"a": 1, "b": 2}"#);
        let replacement: Value = crate::JsonObject::from_bytes(br#"{"x": [1, 2]}"#)
            .unwrap()
            .into();
        let at = description.reader().offset_for_index(0) + 9;
        rewrite(&mut buffer, &mut description, &replacement, at);

        assert_eq!(text(&buffer), r#"{"a": {"x": [1, 2]}, "b": 2}"#);
        assert_eq!(description.reader().array_object_count(), 2);
        assert_rescans(&buffer, &description);
    }

    #[test]
    fn rewrite_root_replaces_the_document() {
        let (mut buffer, mut description) = scanned("[1]");
        rewrite(&mut buffer, &mut description, &Value::Bool(false), 0);
        assert_eq!(text(&buffer), "false");
        assert_rescans(&buffer, &description);
    }

    #[rstest]
    #[case("[]", 0, "[7]")]
    #[case("[ ]", 0, "[ 7]")]
    #[case("[1, 2]", 0, "[7,1, 2]")]
    #[case("[1, 2]", 1, "[1, 7,2]")]
    #[case("[1, 2]", 2, "[1, 2,7]")]
    fn insert_into_array(#[case] json: &str, #[case] position: usize, #[case] expected: &str) {
        let (mut buffer, mut description) = scanned(json);
        insert(&mut buffer, &mut description, &Value::Integer(7), 0, position, None);
        assert_eq!(text(&buffer), expected);
        assert_rescans(&buffer, &description);
    }

    #[test]
    fn insert_object_member_in_nested_container() {
        let (mut buffer, mut description) = scanned(r#"[{"a": 1}, {}]"#);
        let reader = description.reader();
        let first = reader.offset_for_index(0);
        insert(&mut buffer, &mut description, &Value::from("v"), first, 1, Some("k\""));
        assert_eq!(text(&buffer), r#"[{"a": 1,"k\"":"v"}, {}]"#);
        assert_rescans(&buffer, &description);

        let second = description.reader().offset_for_index(1);
        insert(&mut buffer, &mut description, &Value::Null, second, 0, Some("z"));
        assert_eq!(text(&buffer), r#"[{"a": 1,"k\"":"v"}, {"z":null}]"#);
        assert_rescans(&buffer, &description);
    }

    #[test]
    #[should_panic(expected = "insertion index (is 3) should be <= len (is 2)")]
    fn insert_past_the_end_panics() {
        let (mut buffer, mut description) = scanned("[1, 2]");
        insert(&mut buffer, &mut description, &Value::Null, 0, 3, None);
    }

    #[test]
    fn edits_do_not_leak_into_shared_buffers() {
        let (original, description) = scanned("[1, 2]");
        let mut buffer = original.clone();
        let mut edited = description.clone();
        remove(&mut buffer, &mut edited, 17);
        assert_eq!(original.as_bytes(), b"[1, 2]");
        assert_eq!(text(&buffer), "[2]");
    }
}
