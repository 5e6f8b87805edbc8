//! Documents written before ids moved into the wire keys.
//!
//! Old documents store an item's id as a `~Id` member inside the item and
//! encode collections in their plain shape.

use indexmap::IndexMap;
use redlilium_asset_serialize::{
    AssetDeserialize, AssetSerialize, DeserializeContext, DeserializeError, ItemId,
    ItemIdRegistry, SerializeContext, SerializerSettings, Tracked, Value,
    wrappers::LEGACY_DELETED_SENTINEL,
};
use rstest::rstest;
use serde::{Deserialize, Serialize};

fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Weapon {
    name: String,
    damage: u32,
}

fn weapon_members(weapon: &Weapon) -> Vec<(String, Value)> {
    vec![
        ("name".into(), Value::String(weapon.name.clone())),
        ("damage".into(), Value::U64(weapon.damage.into())),
    ]
}

fn legacy_weapon(id: &str, weapon: &Weapon) -> Value {
    let mut members = vec![("~Id".to_string(), Value::String(id.into()))];
    members.extend(weapon_members(weapon));
    Value::Map(members)
}

fn armory() -> Vec<(String, Weapon)> {
    vec![
        (
            "sword".into(),
            Weapon {
                name: "Long Sword".into(),
                damage: 12,
            },
        ),
        (
            "bow".into(),
            Weapon {
                name: "Yew Bow".into(),
                damage: 8,
            },
        ),
    ]
}

fn load<T: AssetDeserialize>(
    value: Value,
    registry: &mut ItemIdRegistry,
    settings: SerializerSettings,
) -> Result<(T, Vec<DeserializeError>), DeserializeError> {
    let mut ctx = DeserializeContext::with_settings(registry, settings);
    let asset = T::deserialize_asset(value, &mut ctx)?;
    Ok((asset, ctx.take_reports()))
}

#[test]
fn legacy_dictionary_matches_current_layout() {
    init_logging();
    let ids = [ItemId::new(), ItemId::new()];
    let items = armory();

    let legacy = Value::Map(
        items
            .iter()
            .zip(ids)
            .map(|((key, weapon), id)| (key.clone(), legacy_weapon(&id.to_string(), weapon)))
            .collect(),
    );
    let current = Value::Map(
        items
            .iter()
            .zip(ids)
            .map(|((key, weapon), id)| (format!("{id}~{key}"), Value::Map(weapon_members(weapon))))
            .collect(),
    );

    let mut registry = ItemIdRegistry::new();
    let settings = SerializerSettings::default();
    let (from_legacy, legacy_reports): (Tracked<IndexMap<String, Weapon>>, _) =
        load(legacy, &mut registry, settings.clone()).unwrap();
    let (from_current, current_reports): (Tracked<IndexMap<String, Weapon>>, _) =
        load(current, &mut registry, settings).unwrap();

    assert!(legacy_reports.is_empty());
    assert!(current_reports.is_empty());
    assert_eq!(from_legacy, from_current);
    assert_eq!(from_legacy.ids(&registry), from_current.ids(&registry));
    assert_eq!(from_legacy.ids(&registry).unwrap().get("bow"), Some(ids[1]));
}

#[test]
fn legacy_list_matches_current_layout() {
    init_logging();
    let ids = [ItemId::new(), ItemId::new()];
    let weapons: Vec<Weapon> = armory().into_iter().map(|(_, weapon)| weapon).collect();

    let legacy = Value::List(
        weapons
            .iter()
            .zip(ids)
            .map(|(weapon, id)| legacy_weapon(&id.to_string(), weapon))
            .collect(),
    );
    let current = Value::Map(
        weapons
            .iter()
            .zip(ids)
            .map(|(weapon, id)| (id.to_string(), Value::Map(weapon_members(weapon))))
            .collect(),
    );

    let mut registry = ItemIdRegistry::new();
    let settings = SerializerSettings::default();
    let (from_legacy, _): (Tracked<Vec<Weapon>>, _) =
        load(legacy, &mut registry, settings.clone()).unwrap();
    let (from_current, _): (Tracked<Vec<Weapon>>, _) =
        load(current, &mut registry, settings).unwrap();

    assert_eq!(*from_legacy, weapons);
    assert_eq!(from_legacy, from_current);
    assert_eq!(from_legacy.ids(&registry), from_current.ids(&registry));
}

#[test]
fn resaving_a_legacy_document_uses_wrapped_keys() {
    init_logging();
    let id = ItemId::new();
    let (key, weapon) = armory().remove(0);
    let legacy = Value::Map(vec![(key.clone(), legacy_weapon(&id.to_string(), &weapon))]);

    let mut registry = ItemIdRegistry::new();
    let (loaded, _): (Tracked<IndexMap<String, Weapon>>, _) =
        load(legacy, &mut registry, SerializerSettings::default()).unwrap();
    let saved = loaded
        .serialize_asset(&mut SerializeContext::new(&mut registry))
        .unwrap();

    assert_eq!(
        saved,
        Value::Map(vec![(format!("{id}~{key}"), Value::Map(weapon_members(&weapon)))])
    );
}

#[rstest]
#[case::missing_member(None)]
#[case::empty_id(Some("00000000000000000000000000000000"))]
fn items_without_an_id_get_a_fresh_one(#[case] raw_id: Option<&str>) {
    init_logging();
    let (key, weapon) = armory().remove(0);
    let item = match raw_id {
        Some(raw) => legacy_weapon(raw, &weapon),
        None => Value::Map(weapon_members(&weapon)),
    };

    let mut registry = ItemIdRegistry::new();
    let (loaded, reports): (Tracked<IndexMap<String, Weapon>>, _) = load(
        Value::Map(vec![(key.clone(), item)]),
        &mut registry,
        SerializerSettings::default(),
    )
    .unwrap();

    assert!(reports.is_empty());
    assert_eq!(loaded.get(&key), Some(&weapon));
    let id = loaded.ids(&registry).unwrap().get(&key).unwrap();
    assert!(!id.is_empty());
}

#[test]
fn unparsable_legacy_id_is_reported() {
    init_logging();
    let (_, weapon) = armory().remove(0);
    let legacy = Value::List(vec![legacy_weapon("not-an-id", &weapon)]);

    let mut registry = ItemIdRegistry::new();
    let (loaded, reports): (Tracked<Vec<Weapon>>, _) =
        load(legacy, &mut registry, SerializerSettings::default()).unwrap();

    assert_eq!(*loaded, vec![weapon]);
    assert!(loaded.ids(&registry).unwrap().get(&0).is_some());
    assert_eq!(
        reports,
        vec![DeserializeError::InvalidItemId {
            text: "not-an-id".into()
        }]
    );
}

#[test]
fn legacy_documents_can_be_refused() {
    init_logging();
    let (key, weapon) = armory().remove(0);
    let legacy = Value::Map(vec![(key, legacy_weapon(&ItemId::new().to_string(), &weapon))]);
    let settings = SerializerSettings {
        accept_legacy_ids: false,
        ..SerializerSettings::default()
    };

    let mut registry = ItemIdRegistry::new();
    let result = load::<Tracked<IndexMap<String, Weapon>>>(legacy, &mut registry, settings);
    assert!(matches!(
        result,
        Err(DeserializeError::TypeMismatch { .. })
    ));
}

#[test]
fn legacy_dictionary_with_an_id_shaped_key_loads() {
    init_logging();
    let guid_key = "0123456789abcdef0123456789abcdef".to_string();
    let ids = [ItemId::new(), ItemId::new()];
    let mut items = armory();
    items[1].0 = guid_key.clone();

    let legacy = Value::Map(
        items
            .iter()
            .zip(ids)
            .map(|((key, weapon), id)| (key.clone(), legacy_weapon(&id.to_string(), weapon)))
            .collect(),
    );

    let mut registry = ItemIdRegistry::new();
    let (loaded, reports): (Tracked<IndexMap<String, Weapon>>, _) =
        load(legacy, &mut registry, SerializerSettings::default()).unwrap();

    assert!(reports.is_empty());
    assert_eq!(loaded.len(), 2);
    let loaded_ids = loaded.ids(&registry).unwrap();
    assert_eq!(loaded_ids.get("sword"), Some(ids[0]));
    assert_eq!(loaded_ids.get(&guid_key), Some(ids[1]));
}

#[test]
fn legacy_dictionary_keyed_by_item_ids_loads() {
    init_logging();
    let (keys, ids) = ([ItemId::new(), ItemId::new()], [ItemId::new(), ItemId::new()]);
    let weapons: Vec<Weapon> = armory().into_iter().map(|(_, weapon)| weapon).collect();

    let legacy = Value::Map(
        keys.iter()
            .zip(&weapons)
            .zip(ids)
            .map(|((key, weapon), id)| (key.to_string(), legacy_weapon(&id.to_string(), weapon)))
            .collect(),
    );

    let mut registry = ItemIdRegistry::new();
    let (loaded, reports): (Tracked<IndexMap<ItemId, Weapon>>, _) =
        load(legacy, &mut registry, SerializerSettings::default()).unwrap();

    assert!(reports.is_empty());
    assert_eq!(loaded.get(&keys[0]), Some(&weapons[0]));
    assert_eq!(loaded.ids(&registry).unwrap().get(&keys[1]), Some(ids[1]));
}

#[test]
fn legacy_deleted_sentinel_is_a_tombstone() {
    init_logging();
    let (live, gone) = (ItemId::new(), ItemId::new());
    let value = Value::Map(vec![
        (format!("{live}~a"), Value::I64(1)),
        (
            format!("~{gone}"),
            Value::String(LEGACY_DELETED_SENTINEL.into()),
        ),
    ]);

    let mut registry = ItemIdRegistry::new();
    let (loaded, reports): (Tracked<IndexMap<String, i64>>, _) =
        load(value, &mut registry, SerializerSettings::default()).unwrap();
    assert!(reports.is_empty());
    let ids = loaded.ids(&registry).unwrap();
    assert_eq!(ids.get("a"), Some(live));
    assert!(ids.is_deleted(gone));
}

#[cfg(feature = "serialize-ron")]
#[test]
fn legacy_text_document_loads() {
    use redlilium_asset_serialize::load_asset;

    init_logging();
    let id = ItemId::new();
    let text = format!(
        r#"(
    version: 1,
    data: Map([
        ("sword", Map([
            ("~Id", String("{id}")),
            ("name", String("Long Sword")),
            ("damage", U64(12)),
        ])),
    ]),
)"#
    );

    let mut registry = ItemIdRegistry::new();
    let loaded = load_asset::<Tracked<IndexMap<String, Weapon>>>(
        text.as_bytes(),
        &mut registry,
        &SerializerSettings::default(),
    )
    .unwrap();

    assert!(loaded.reports.is_empty());
    assert_eq!(loaded.asset["sword"].damage, 12);
    assert_eq!(loaded.asset.ids(&registry).unwrap().get("sword"), Some(id));
}
