//! MessagePack serialization properties over real diffs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};
use tessera::{apply_patch, diff, Patch};
use tessera_msgpack::{marshal, unmarshal};

fn random_value(rng: &mut StdRng, fuel: usize) -> Value {
    match rng.gen_range(0..if fuel > 1 { 10 } else { 6 }) {
        0 => json!(null),
        1 => json!(rng.gen_bool(0.5)),
        2 => json!(rng.gen_range(-1000i64..1000)),
        3 => json!(rng.gen_range(-50i64..50) as f64 + 0.25),
        4 | 5 => {
            let len = rng.gen_range(0..10);
            Value::String((0..len).map(|_| char::from(rng.gen_range(b'a'..=b'z'))).collect())
        }
        n if n % 2 == 0 => {
            let len = rng.gen_range(0..4);
            Value::Array((0..len).map(|_| random_value(rng, fuel / 2)).collect())
        }
        _ => {
            let len = rng.gen_range(0..4);
            let mut map = Map::new();
            for _ in 0..len {
                let key: String = (0..rng.gen_range(1..4))
                    .map(|_| char::from(rng.gen_range(b'a'..=b'e')))
                    .collect();
                map.insert(key, random_value(rng, fuel / 2));
            }
            Value::Object(map)
        }
    }
}

#[test]
fn random_patches_roundtrip_through_msgpack() {
    let mut rng = StdRng::seed_from_u64(0x6d7067);
    for round in 0..200 {
        let left = random_value(&mut rng, 16);
        let right = random_value(&mut rng, 16);
        let patch = diff(&left, &right).unwrap();

        let bytes = marshal(&patch).unwrap();
        let decoded = unmarshal(&bytes).unwrap();
        assert_eq!(decoded, patch, "round {round}");
        assert_eq!(apply_patch(&left, &decoded), right, "round {round}");
    }
}

#[test]
fn msgpack_and_json_agree() {
    let left = json!({"a": ["a", "b", "c"], "s": "abcdefghijk"});
    let right = json!({"a": ["a", "b"], "s": "abcdehijk", "n": 1});
    let patch = diff(&left, &right).unwrap();

    let json_decoded: Patch =
        serde_json::from_str(&serde_json::to_string(&patch).unwrap()).unwrap();
    let msgpack_decoded = unmarshal(&marshal(&patch).unwrap()).unwrap();
    assert_eq!(json_decoded, msgpack_decoded);
}
