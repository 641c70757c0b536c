//! Header merge tests.

use netlayer::http::headers::HeaderSet;

fn set(pairs: &[(&str, &str)]) -> HeaderSet {
    pairs.iter().copied().collect()
}

/// Reference merge: the last layer that defines a key wins.
fn expected(layers: &[&HeaderSet], key: &str) -> Option<String> {
    layers
        .iter()
        .rev()
        .find_map(|layer| layer.get(key).map(str::to_string))
}

#[test]
fn test_merge_precedence_over_combinations() {
    let keys = ["Content-Type", "Accept", "Authorization", "X-Trace"];
    let bases = [
        HeaderSet::defaults(),
        set(&[]),
        set(&[("Accept", "text/plain")]),
    ];
    let explicits = [
        set(&[]),
        set(&[("Accept", "application/xml"), ("X-Trace", "1")]),
        set(&[("Authorization", "Basic x"), ("Content-Type", "text/csv")]),
    ];
    let auths = [
        set(&[]),
        set(&[("Authorization", "Bearer t")]),
        set(&[("X-Trace", "auth"), ("Accept", "*/*")]),
    ];

    for base in &bases {
        for explicit in &explicits {
            for auth in &auths {
                let merged = HeaderSet::merged(base, explicit, auth);
                for key in keys {
                    assert_eq!(
                        merged.get(key).map(str::to_string),
                        expected(&[base, explicit, auth], key),
                        "key {key} for {base:?} / {explicit:?} / {auth:?}"
                    );
                }
                // Nothing appears that no layer defined.
                for (name, _) in merged.iter() {
                    assert!(
                        base.get(name).is_some()
                            || explicit.get(name).is_some()
                            || auth.get(name).is_some()
                    );
                }
            }
        }
    }
}

#[test]
fn test_merge_keys_are_case_sensitive() {
    let merged = HeaderSet::merged(
        &HeaderSet::defaults(),
        &set(&[("accept", "text/html")]),
        &set(&[]),
    );
    assert_eq!(merged.get("Accept"), Some("application/json"));
    assert_eq!(merged.get("accept"), Some("text/html"));
    assert_eq!(merged.len(), 3);
}

#[test]
fn test_header_map_lowering_rejects_bad_values() {
    let bad = set(&[("X-Bad", "line\r\nbreak")]);
    assert!(matches!(
        bad.to_header_map(),
        Err(netlayer::ApiError::StringConversionFailed(_))
    ));
}

#[test]
fn test_header_map_lowering_keeps_every_header() {
    let map = HeaderSet::merged(
        &HeaderSet::defaults(),
        &set(&[("X-Trace", "abc")]),
        &set(&[("Authorization", "Bearer t")]),
    )
    .to_header_map()
    .unwrap();
    assert_eq!(map.len(), 4);
    assert_eq!(map["authorization"], "Bearer t");
    assert_eq!(map["x-trace"], "abc");
}

#[test]
fn test_layered_lowering_follows_layer_precedence_across_case() {
    let explicit = set(&[("accept", "explicit/x"), ("authorization", "Basic old")]);
    let auth = set(&[("Accept", "auth/y"), ("Authorization", "Bearer new")]);

    let map = HeaderSet::layered_header_map(&HeaderSet::defaults(), &explicit, &auth).unwrap();
    assert_eq!(map["accept"], "auth/y");
    assert_eq!(map["authorization"], "Bearer new");
    assert_eq!(map["content-type"], "application/json");
    assert_eq!(map.len(), 3);

    let map = HeaderSet::layered_header_map(
        &HeaderSet::defaults(),
        &set(&[("content-type", "text/csv")]),
        &set(&[]),
    )
    .unwrap();
    assert_eq!(map["content-type"], "text/csv");
}
