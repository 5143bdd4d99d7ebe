#![allow(dead_code)]

//! Random document generation and mutation for the property tests.

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::{json, Map, Value};

/// Generate a random document. `fuel` bounds the node count so documents
/// stay small enough to debug when a property fails.
pub fn random_value(rng: &mut StdRng, fuel: usize) -> Value {
    let container_odds = if fuel > 1 { 4 } else { 0 };
    match rng.gen_range(0..(8 + container_odds)) {
        0 => json!(null),
        1 => json!(rng.gen_bool(0.5)),
        2 | 3 => random_number(rng),
        4..=7 => json!(random_string(rng)),
        n if n % 2 == 0 => {
            let len = rng.gen_range(0..=fuel.min(5));
            let values: Vec<Value> = (0..len)
                .map(|_| random_value(rng, fuel / 2))
                .collect();
            Value::Array(values)
        }
        _ => {
            let len = rng.gen_range(0..=fuel.min(5));
            let mut map = Map::new();
            for _ in 0..len {
                map.insert(random_key(rng), random_value(rng, fuel / 2));
            }
            Value::Object(map)
        }
    }
}

/// Integers and fractional floats are kept in distinct value ranges so a
/// value never appears in both `i64` and `f64` representations.
fn random_number(rng: &mut StdRng) -> Value {
    if rng.gen_bool(0.5) {
        json!(rng.gen_range(-100i64..100))
    } else {
        json!(rng.gen_range(-100i64..100) as f64 + 0.5)
    }
}

fn random_key(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..=6);
    (0..len)
        .map(|_| char::from(rng.gen_range(b'a'..=b'f')))
        .collect()
}

fn random_string(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..=12);
    if rng.gen_bool(0.2) {
        // Multi-byte content to exercise code-point handling.
        let alphabet = ['汉', 'é', 'Ʌ', '✓', 'a', '0'];
        (0..len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect()
    } else {
        (0..len)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect()
    }
}

/// Produce a related document by applying a handful of random edits:
/// replacing sub-values, inserting or removing map fields, pushing or
/// truncating array elements, tweaking strings.
pub fn mutate(rng: &mut StdRng, value: &Value) -> Value {
    let mut result = value.clone();
    let edits = rng.gen_range(1..=3);
    for _ in 0..edits {
        mutate_in_place(rng, &mut result);
    }
    result
}

fn mutate_in_place(rng: &mut StdRng, value: &mut Value) {
    match value {
        Value::Object(map) if !map.is_empty() && rng.gen_bool(0.7) => {
            let keys: Vec<String> = map.keys().cloned().collect();
            let key = &keys[rng.gen_range(0..keys.len())];
            match rng.gen_range(0..4) {
                0 => {
                    map.remove(key);
                }
                1 => {
                    let fresh = random_value(rng, 3);
                    map.insert(random_key(rng), fresh);
                }
                _ => mutate_in_place(rng, map.get_mut(key).unwrap()),
            }
        }
        Value::Array(values) if !values.is_empty() && rng.gen_bool(0.7) => {
            match rng.gen_range(0..4) {
                0 => {
                    values.truncate(values.len() - 1);
                }
                1 => {
                    let fresh = random_value(rng, 3);
                    let at = rng.gen_range(0..=values.len());
                    values.insert(at, fresh);
                }
                2 => values.rotate_left(1),
                _ => {
                    let idx = rng.gen_range(0..values.len());
                    mutate_in_place(rng, &mut values[idx]);
                }
            }
        }
        Value::String(s) if !s.is_empty() && rng.gen_bool(0.5) => {
            // Edit in the middle, keeping prefix and suffix.
            let mid = s.chars().count() / 2;
            let insert: String = random_string(rng);
            *s = s
                .chars()
                .take(mid)
                .chain(insert.chars())
                .chain(s.chars().skip(mid))
                .collect();
        }
        other => *other = random_value(rng, 4),
    }
}
