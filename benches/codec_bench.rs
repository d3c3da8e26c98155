use criterion::{black_box, criterion_group, criterion_main, Criterion};

use monotone::prelude::*;

fn coin_schema() -> DynSchema {
    monotone::record(
        "Coin",
        vec![
            ("value", monotone::u64().to_dynamic()),
            ("owner", monotone::string().to_dynamic()),
            ("is_locked", monotone::bool().to_dynamic()),
        ],
    )
}

fn coin_value() -> Value {
    let mut fields = Fields::new();
    fields.insert("value".into(), Value::U64(412412400000));
    fields.insert("owner".into(), Value::Text("Big Wallet Guy".into()));
    fields.insert("is_locked".into(), Value::Bool(false));
    Value::Record(fields)
}

fn serialize_bench(c: &mut Criterion) {
    let byte_vector = monotone::vector(monotone::u8());
    let payload = vec![0xffu8; 1000];
    c.bench_function("serialize_vector_u8_1000", |b| {
        b.iter(|| black_box(byte_vector.serialize(black_box(&payload)).unwrap()))
    });

    let coin = coin_schema();
    let value = coin_value();
    c.bench_function("serialize_coin", |b| {
        b.iter(|| black_box(coin.serialize(black_box(&value)).unwrap()))
    });
}

fn parse_bench(c: &mut Criterion) {
    let byte_vector = monotone::vector(monotone::u8());
    let bytes = byte_vector.to_bytes(&vec![0xffu8; 1000]).unwrap();
    c.bench_function("parse_vector_u8_1000", |b| {
        b.iter(|| black_box(byte_vector.parse(black_box(&bytes)).unwrap()))
    });

    let coin = coin_schema();
    let bytes = coin.to_bytes(&coin_value()).unwrap();
    c.bench_function("parse_coin", |b| {
        b.iter(|| black_box(coin.parse(black_box(&bytes)).unwrap()))
    });
}

criterion_group!(benches, serialize_bench, parse_bench);
criterion_main!(benches);
