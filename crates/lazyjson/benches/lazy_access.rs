#![allow(missing_docs)]
//! Lazy access against a full `serde_json` parse.
//!
//! Each dataset is a generated array of records. The benchmarks either read
//! one field of one record, or rewrite one record and take the resulting
//! text, which is what a patch-and-forward service does.

use std::{fmt::Write, hint::black_box, time::Duration};

use criterion::{BenchmarkGroup, Criterion, criterion_group, criterion_main, measurement::WallTime};
use lazyjson::{JsonArray, ParseOptions, Value, scan};
use serde_json::Value as SerdeValue;

fn records(count: usize) -> String {
    let mut json = String::from("[");
    for i in 0..count {
        if i > 0 {
            json.push(',');
        }
        write!(
            json,
            r#"{{"id":{i},"name":"record \"{i}\"","score":{}.5,"tags":["a","b","c"],"active":{}}}"#,
            i % 97,
            i % 2 == 0
        )
        .unwrap();
    }
    json.push(']');
    json
}

fn bench_read(json: &str, group: &mut BenchmarkGroup<'_, WallTime>) {
    let bytes = json.as_bytes();

    group.bench_function("lazyjson_scan", |b| {
        b.iter(|| scan(black_box(bytes), &ParseOptions::default()).unwrap());
    });

    group.bench_function("lazyjson_middle_field", |b| {
        b.iter(|| {
            let array = JsonArray::from_bytes(black_box(bytes)).unwrap();
            let record = array.get(array.len() / 2);
            record.as_object().and_then(|record| record.get("name"))
        });
    });

    group.bench_function("serde_value_middle_field", |b| {
        b.iter(|| {
            let value: SerdeValue = serde_json::from_slice(black_box(bytes)).unwrap();
            let records = value.as_array().unwrap();
            records[records.len() / 2]["name"].clone()
        });
    });
}

fn bench_patch(json: &str, group: &mut BenchmarkGroup<'_, WallTime>) {
    let bytes = json.as_bytes();

    group.bench_function("lazyjson_patch", |b| {
        b.iter(|| {
            let mut array = JsonArray::from_bytes(black_box(bytes)).unwrap();
            let middle = array.len() / 2;
            array.set(middle, Value::Null);
            array.remove(0);
            array.to_vec()
        });
    });

    group.bench_function("serde_value_patch", |b| {
        b.iter(|| {
            let mut value: SerdeValue = serde_json::from_slice(black_box(bytes)).unwrap();
            let records = value.as_array_mut().unwrap();
            let middle = records.len() / 2;
            records[middle] = SerdeValue::Null;
            records.remove(0);
            serde_json::to_vec(&value).unwrap()
        });
    });
}

fn lazy_access_benches(c: &mut Criterion) {
    for count in [10, 1_000, 20_000] {
        let json = records(count);
        let mut group = c.benchmark_group(format!("records_{count}"));
        group.measurement_time(Duration::from_secs(3));
        bench_read(&json, &mut group);
        bench_patch(&json, &mut group);
        group.finish();
    }
}

criterion_group!(benches, lazy_access_benches);
criterion_main!(benches);
