#![no_main]

use arbitrary::Arbitrary;
use lazyjson::{Buffer, Description, JsonArray, JsonObject, ParseOptions, Value, scan};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Edit {
    Remove(usize),
    Set(usize, Scalar),
    Insert(usize, Scalar),
    /// Replaces an element with a copy of another one, containers included.
    Copy(usize, usize),
    SetKey(String, Scalar),
    RemoveKey(String),
}

#[derive(Debug, Arbitrary)]
enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(boolean) => Value::Bool(boolean),
            Scalar::Integer(integer) => Value::Integer(integer),
            Scalar::Double(double) => Value::Double(double),
            Scalar::String(text) => Value::String(text),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    json: &'a [u8],
    edits: Vec<Edit>,
}

fn check(buffer: &Buffer, description: &Description, reference_accepts: bool) {
    description
        .check_consistency(buffer.len())
        .unwrap_or_else(|reason| panic!("inconsistent index: {reason}"));
    let (_, fresh) = scan(buffer.as_bytes(), &ParseOptions { max_depth: 1024 })
        .expect("edited text no longer scans");
    assert_eq!(description, &fresh, "index drifted from the text");
    if reference_accepts {
        serde_json::from_slice::<serde_json::Value>(buffer.as_bytes())
            .expect("edited text rejected by serde_json");
    }
}

fn edit_array(array: &mut JsonArray, edit: Edit) {
    let len = array.len();
    match edit {
        Edit::Remove(index) if len > 0 => array.remove(index % len),
        Edit::Set(index, scalar) if len > 0 => array.set(index % len, scalar),
        Edit::Insert(index, scalar) => array.insert(index % (len + 1), scalar),
        Edit::Copy(from, to) if len > 0 => {
            let value = array.get(from % len);
            array.set(to % len, value);
        }
        _ => {}
    }
}

fn edit_object(object: &mut JsonObject, edit: Edit) {
    match edit {
        Edit::SetKey(key, scalar) => object.set(&key, scalar),
        Edit::RemoveKey(key) => {
            let present = object.contains_key(&key);
            assert_eq!(object.remove(&key), present);
        }
        Edit::Remove(index) if !object.is_empty() => {
            if let Some(key) = object.keys().nth(index % object.len()) {
                assert!(object.remove(&key));
            }
        }
        Edit::Copy(from, to) if !object.is_empty() => {
            let keys: Vec<_> = object.keys().collect();
            let value = object.get(&keys[from % keys.len()]);
            object.set(&keys[to % keys.len()], value);
        }
        _ => {}
    }
}

fuzz_target!(|input: Input<'_>| {
    let options = ParseOptions { max_depth: 1024 };
    let reference = serde_json::from_slice::<serde_json::Value>(input.json);
    let scanned = scan(input.json, &options);

    // The scanner also accepts unpaired surrogate escapes, so agreement is
    // only required in one direction.
    if reference.is_ok() {
        assert!(scanned.is_ok(), "rejected valid JSON: {scanned:?}");
    }
    let Ok((buffer, description)) = scanned else {
        return;
    };
    check(&buffer, &description, reference.is_ok());

    if let Ok(mut array) = JsonArray::from_parts(buffer.clone(), description.clone()) {
        for edit in input.edits {
            edit_array(&mut array, edit);
            check(array.buffer(), array.description(), reference.is_ok());
        }
    } else if let Ok(mut object) = JsonObject::from_parts(buffer, description) {
        for edit in input.edits {
            edit_object(&mut object, edit);
            check(object.buffer(), object.description(), reference.is_ok());
        }
    }
});
