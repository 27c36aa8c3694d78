//! Behavioral properties of the reconciliation engine.
//!
//! Each `#[case]` is isolated — no shared state.

use std::collections::BTreeMap;

use rstest::rstest;
use serde_json::json;

use flagsync_core::{
    diff_keys, reconcile, Archive, EnvMetadata, Environment, Fallthrough, Flag, Payload, SdkKey,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn boolean_flag(key: &str, on: bool) -> Flag {
    Flag {
        key: key.to_string(),
        on,
        variations: vec![json!(true), json!(false)],
        off_variation: Some(1),
        fallthrough: Fallthrough {
            variation: Some(0),
            rollout: None,
        },
        salt: key.to_string(),
        version: 0,
        deleted: false,
    }
}

fn environment(key: &str, flags: Vec<Flag>) -> Environment {
    Environment {
        metadata: EnvMetadata {
            env_id: format!("{key}-id"),
            env_key: key.to_string(),
            env_name: key.to_string(),
            mob_key: format!("mob-{key}"),
            proj_key: "demo".to_string(),
            proj_name: "Demo".to_string(),
            sdk_key: SdkKey {
                value: format!("sdk-{key}"),
            },
            default_ttl: 5,
            secure_mode: false,
            version: 0,
            data_id: String::new(),
        },
        payload: Payload {
            segments: BTreeMap::new(),
            flags: flags.into_iter().map(|f| (f.key.clone(), f)).collect(),
        },
    }
}

fn rendered(envs: Vec<Environment>) -> Archive {
    Archive {
        environments: envs
            .into_iter()
            .map(|e| (e.metadata.env_key.clone(), e))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[rstest]
#[case::single_env(vec![("production", vec!["boolean1"])])]
#[case::multi_env(vec![("production", vec!["a", "b"]), ("staging", vec!["a"])])]
#[case::flagless_env(vec![("production", vec![])])]
fn first_publish_yields_version_one_everywhere(#[case] layout: Vec<(&str, Vec<&str>)>) {
    let archive = rendered(
        layout
            .into_iter()
            .map(|(env, flags)| {
                environment(env, flags.into_iter().map(|k| boolean_flag(k, true)).collect())
            })
            .collect(),
    );

    let out = reconcile(&Archive::new_empty(), archive).expect("reconcile");
    for env in out.environments.values() {
        assert_eq!(env.metadata.version, 1);
        for flag in env.payload.flags.values() {
            assert_eq!(flag.version, 1);
            assert!(!flag.deleted);
        }
        assert_eq!(env.metadata.data_id, env.derived_data_id());
    }
}

#[test]
fn rerunning_with_no_changes_is_idempotent() {
    let authored = || {
        rendered(vec![
            environment("production", vec![boolean_flag("a", true), boolean_flag("b", false)]),
            environment("staging", vec![boolean_flag("a", true)]),
        ])
    };

    let first = reconcile(&Archive::new_empty(), authored()).expect("first publish");
    let second = reconcile(&first, authored()).expect("re-run");
    assert_eq!(second, first, "no-op re-run must not bump any version or data id");

    let third = reconcile(&second, authored()).expect("re-run again");
    assert_eq!(third, first);
}

#[test]
fn concrete_scenario_from_the_relay_contract() {
    // Old: production/boolean1 at version 3, serving false.
    let mut old_env = environment("production", vec![boolean_flag("boolean1", false)]);
    old_env.metadata.version = 1;
    old_env.payload.flags.get_mut("boolean1").expect("flag").version = 3;
    old_env.metadata.data_id = old_env.derived_data_id();
    let old = Archive {
        environments: [("production".to_string(), old_env)].into(),
    };
    let old_data_id = old.environments["production"].metadata.data_id.clone();

    // New: same flag re-rendered with the variation flipped, version-naive.
    let new = rendered(vec![environment(
        "production",
        vec![boolean_flag("boolean1", true)],
    )]);

    let out = reconcile(&old, new).expect("reconcile");
    let env = &out.environments["production"];
    let flag = &env.payload.flags["boolean1"];
    assert_eq!(flag.version, 4);
    assert!(flag.on);
    assert_ne!(env.metadata.data_id, old_data_id);
    assert_eq!(env.metadata.data_id, "5"); // env 1 + flag 4
}

#[test]
fn deletion_carries_the_tombstone_forward_on_every_run() {
    let full = rendered(vec![environment(
        "production",
        vec![boolean_flag("keep", true), boolean_flag("drop", true)],
    )]);
    let published = reconcile(&Archive::new_empty(), full).expect("publish");

    let trimmed = || rendered(vec![environment("production", vec![boolean_flag("keep", true)])]);

    let after_delete = reconcile(&published, trimmed()).expect("delete run");
    let dead = &after_delete.environments["production"].payload.flags["drop"];
    assert!(dead.deleted);
    assert_eq!(dead.version, 2);

    // The next run sees the tombstone in `old` but no authored flag: the
    // tombstone is carried forward again, versioned up once more.
    let next = reconcile(&after_delete, trimmed()).expect("second delete run");
    let dead = &next.environments["production"].payload.flags["drop"];
    assert!(dead.deleted);
    assert_eq!(dead.version, 3);
}

#[rstest]
#[case::disjoint(&["a", "b"], &["c", "d"])]
#[case::identical(&["a", "b"], &["a", "b"])]
#[case::overlap(&["a", "b"], &["b", "c"])]
#[case::one_empty(&[], &["a"])]
fn differ_is_total_and_disjoint(#[case] old_keys: &[&str], #[case] new_keys: &[&str]) {
    let old: BTreeMap<String, ()> = old_keys.iter().map(|k| (k.to_string(), ())).collect();
    let new: BTreeMap<String, ()> = new_keys.iter().map(|k| (k.to_string(), ())).collect();
    let diff = diff_keys(&old, &new);

    let mut union: Vec<String> = old.keys().chain(new.keys()).cloned().collect();
    union.sort();
    union.dedup();

    let mut covered: Vec<String> = diff
        .added
        .iter()
        .chain(diff.existing.iter())
        .chain(diff.removed.iter())
        .cloned()
        .collect();
    covered.sort();
    assert_eq!(covered, union, "sets must cover the union without overlap");

    assert!(diff.added.is_disjoint(&diff.existing));
    assert!(diff.added.is_disjoint(&diff.removed));
    assert!(diff.existing.is_disjoint(&diff.removed));
}
