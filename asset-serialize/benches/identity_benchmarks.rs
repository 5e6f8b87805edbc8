use std::collections::HashMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use indexmap::IndexMap;
use redlilium_asset_serialize::{
    AssetDeserialize, AssetSerialize, DeserializeContext, ItemIdRegistry, SerializeContext,
    SerializerSettings, Tracked, Value, load_asset, save_asset,
};

fn sample_dictionary(len: usize) -> Tracked<IndexMap<String, u64>> {
    Tracked::new((0..len).map(|i| (format!("entry_{i}"), i as u64)).collect())
}

fn sample_list(len: usize) -> Tracked<Vec<String>> {
    Tracked::new((0..len).map(|i| format!("item {i}")).collect())
}

fn serialized<T: AssetSerialize>(asset: &T, registry: &mut ItemIdRegistry) -> Value {
    asset
        .serialize_asset(&mut SerializeContext::new(registry))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Value tree
// ---------------------------------------------------------------------------

fn bench_serialize_dictionary_first_save(c: &mut Criterion) {
    let dict = sample_dictionary(1000);
    c.bench_function("serialize_dictionary_1000_fresh_ids", |b| {
        b.iter(|| {
            let mut registry = ItemIdRegistry::new();
            black_box(serialized(black_box(&dict), &mut registry))
        });
    });
}

fn bench_serialize_dictionary_resave(c: &mut Criterion) {
    let dict = sample_dictionary(1000);
    let mut registry = ItemIdRegistry::new();
    serialized(&dict, &mut registry);
    c.bench_function("serialize_dictionary_1000_known_ids", |b| {
        b.iter(|| black_box(serialized(black_box(&dict), &mut registry)));
    });
}

fn bench_serialize_list_resave(c: &mut Criterion) {
    let list = sample_list(1000);
    let mut registry = ItemIdRegistry::new();
    serialized(&list, &mut registry);
    c.bench_function("serialize_list_1000_known_ids", |b| {
        b.iter(|| black_box(serialized(black_box(&list), &mut registry)));
    });
}

fn bench_deserialize_dictionary(c: &mut Criterion) {
    let mut registry = ItemIdRegistry::new();
    let value = serialized(&sample_dictionary(1000), &mut registry);
    c.bench_function("deserialize_dictionary_1000", |b| {
        b.iter(|| {
            let mut ctx = DeserializeContext::new(&mut registry);
            black_box(
                Tracked::<IndexMap<String, u64>>::deserialize_asset(value.clone(), &mut ctx)
                    .unwrap(),
            )
        });
    });
}

fn bench_deserialize_with_tombstones(c: &mut Criterion) {
    let mut registry = ItemIdRegistry::new();
    let mut dict: Tracked<HashMap<u32, u32>> = Tracked::new((0..1000).map(|i| (i, i)).collect());
    serialized(&dict, &mut registry);
    dict.retain(|key, _| key % 2 == 0);
    let value = serialized(&dict, &mut registry);
    c.bench_function("deserialize_dictionary_500_live_500_deleted", |b| {
        b.iter(|| {
            let mut ctx = DeserializeContext::new(&mut registry);
            black_box(
                Tracked::<HashMap<u32, u32>>::deserialize_asset(value.clone(), &mut ctx).unwrap(),
            )
        });
    });
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

fn bench_document_round_trip(c: &mut Criterion) {
    let settings = SerializerSettings::default();
    let list = sample_list(1000);
    let mut registry = ItemIdRegistry::new();
    c.bench_function("document_round_trip_list_1000", |b| {
        b.iter(|| {
            let bytes = save_asset(black_box(&list), &mut registry, &settings).unwrap();
            black_box(load_asset::<Tracked<Vec<String>>>(&bytes, &mut registry, &settings).unwrap())
        });
    });
}

criterion_group!(
    value_tree,
    bench_serialize_dictionary_first_save,
    bench_serialize_dictionary_resave,
    bench_serialize_list_resave,
    bench_deserialize_dictionary,
    bench_deserialize_with_tombstones,
);

criterion_group!(documents, bench_document_round_trip);

criterion_main!(value_tree, documents);
