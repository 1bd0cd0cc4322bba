//! Patches a configuration document without re-serializing it.
//!
//! Only the edited spans change: the indentation, member order and number
//! formatting of everything else are kept byte for byte, which matters when
//! the document is checked into version control or signed.
//!
//! Run with
//!
//! ```bash
//! cargo run -p lazyjson --example patch_document
//! ```

#![allow(clippy::needless_raw_string_hashes)]

use lazyjson::{JsonArray, JsonObject, Value};

const DOCUMENT: &str = r#"{
  "version": 1,
  "features": ["search", "export"],
  "limits": {
    "requests_per_minute": 60,
    "burst": 1.5e1
  },
  "maintainer": "ops@example.com"
}"#;

fn main() -> Result<(), lazyjson::Error> {
    let mut document: JsonObject = DOCUMENT.parse()?;

    document.set("version", 2);

    if let Some(Value::Object(mut limits)) = document.get("limits") {
        limits.set("requests_per_minute", 120);
        document.set("limits", limits);
    }

    let mut features = match document.get("features") {
        Some(Value::Array(features)) => features,
        _ => JsonArray::new(),
    };
    if !features.iter().any(|feature| feature.as_str() == Some("audit")) {
        features.push("audit");
    }
    document.set("features", features);

    document.remove("maintainer");

    println!("{document}");
    Ok(())
}
