use alloc::{string::String, vec::Vec};

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use super::{
    arbitrary::{ArrayDocument, Document, ObjectDocument, from_serde, render, to_serde},
    property_roundtrip::tests,
};
use crate::{Buffer, Description, JsonArray, JsonObject, ParseOptions, Value, scan};

#[derive(Debug, Clone)]
enum ArrayEdit {
    Remove(usize),
    Set(usize, Document),
    Insert(usize, Document),
}

impl Arbitrary for ArrayEdit {
    fn arbitrary(g: &mut Gen) -> Self {
        match usize::arbitrary(g) % 3 {
            0 => Self::Remove(usize::arbitrary(g)),
            1 => Self::Set(usize::arbitrary(g), Document::arbitrary(g)),
            _ => Self::Insert(usize::arbitrary(g), Document::arbitrary(g)),
        }
    }
}

#[derive(Debug, Clone)]
enum ObjectEdit {
    Remove(usize),
    Set(usize, Document),
    Append(String, Document),
}

impl Arbitrary for ObjectEdit {
    fn arbitrary(g: &mut Gen) -> Self {
        match usize::arbitrary(g) % 3 {
            0 => Self::Remove(usize::arbitrary(g)),
            1 => Self::Set(usize::arbitrary(g), Document::arbitrary(g)),
            _ => Self::Append(String::arbitrary(g), Document::arbitrary(g)),
        }
    }
}

/// The index after an edit must be exactly what a fresh scan of the edited
/// text produces.
fn index_is_fresh(buffer: &Buffer, description: &Description) -> bool {
    let Ok((_, fresh)) = scan(buffer.as_bytes(), &ParseOptions::default()) else {
        return false;
    };
    description == &fresh && description.check_consistency(buffer.len()).is_ok()
}

/// Property: any sequence of array edits keeps the text valid, the index in
/// sync with the text, and the contents equal to a plain `Vec` model.
#[test]
fn array_edits_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(document: ArrayDocument, edits: Vec<ArrayEdit>, pretty: bool) -> bool {
        let mut model = document.0;
        let text = render(&serde_json::Value::Array(model.clone()), pretty);
        let mut array = JsonArray::from_bytes(text.as_bytes()).unwrap();

        for edit in edits {
            match edit {
                ArrayEdit::Remove(index) if !model.is_empty() => {
                    let index = index % model.len();
                    model.remove(index);
                    array.remove(index);
                }
                ArrayEdit::Set(index, value) if !model.is_empty() => {
                    let index = index % model.len();
                    array.set(index, from_serde(&value.0));
                    model[index] = value.0;
                }
                ArrayEdit::Insert(index, value) => {
                    let index = index % (model.len() + 1);
                    array.insert(index, from_serde(&value.0));
                    model.insert(index, value.0);
                }
                ArrayEdit::Remove(_) | ArrayEdit::Set(..) => {}
            }

            let expected = serde_json::Value::Array(model.clone());
            let reread: serde_json::Value = serde_json::from_slice(array.as_bytes()).unwrap();
            if reread != expected
                || to_serde(&Value::Array(array.clone())) != expected
                || !index_is_fresh(array.buffer(), array.description())
            {
                return false;
            }
        }
        true
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(ArrayDocument, Vec<ArrayEdit>, bool) -> bool);
}

/// Property: object edits by key behave like an insertion-ordered map.
#[test]
fn object_edits_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(document: ObjectDocument, edits: Vec<ObjectEdit>) -> TestResult {
        let mut model = document.0;
        let text = render(&serde_json::Value::Object(model.clone()), true);
        let mut object = JsonObject::from_bytes(text.as_bytes()).unwrap();

        for edit in edits {
            match edit {
                ObjectEdit::Remove(index) if !model.is_empty() => {
                    let Some(key) = model.keys().nth(index % model.len()).cloned() else {
                        return TestResult::error("model lost a key");
                    };
                    model.shift_remove(&key);
                    if !object.remove(&key) {
                        return TestResult::failed();
                    }
                }
                ObjectEdit::Set(index, value) if !model.is_empty() => {
                    let Some(key) = model.keys().nth(index % model.len()).cloned() else {
                        return TestResult::error("model lost a key");
                    };
                    object.set(&key, from_serde(&value.0));
                    model.insert(key, value.0);
                }
                ObjectEdit::Append(key, value) => {
                    object.set(&key, from_serde(&value.0));
                    model.insert(key, value.0);
                }
                ObjectEdit::Remove(_) | ObjectEdit::Set(..) => {}
            }

            let expected = serde_json::Value::Object(model.clone());
            let reread: serde_json::Value = serde_json::from_slice(object.as_bytes()).unwrap();
            if reread != expected
                || object.len() != model.len()
                || !index_is_fresh(object.buffer(), object.description())
            {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(ObjectDocument, Vec<ObjectEdit>) -> TestResult);
}

/// Property: a view taken before an edit keeps reading its own snapshot.
#[test]
fn child_views_are_snapshots_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(document: ArrayDocument, value: Document) -> TestResult {
        if document.0.is_empty() {
            return TestResult::discard();
        }
        let text = render(&serde_json::Value::Array(document.0.clone()), false);
        let mut array = JsonArray::from_bytes(text.as_bytes()).unwrap();
        let snapshot = array.get(0);

        array.set(0, from_serde(&value.0));
        array.remove(0);
        TestResult::from_bool(to_serde(&snapshot) == document.0[0])
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(ArrayDocument, Document) -> TestResult);
}
