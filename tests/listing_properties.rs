//! Property tests for the listing filter against real directories.

use std::collections::HashSet;
use std::fs;

use proptest::prelude::*;
use source_file_scanner::scanner::listing::{ListingRequest, try_list_source_files};
use tempfile::TempDir;

// ──────────────────── strategies ────────────────────

fn arb_name() -> impl Strategy<Value = String> {
    ("[a-z0-9_]{1,8}", prop_oneof![
        Just(".xlsx"),
        Just(".csv"),
        Just(".xlsx.bak"),
        Just(""),
    ])
        .prop_map(|(stem, ext)| format!("{stem}{ext}"))
}

fn arb_names() -> impl Strategy<Value = HashSet<String>> {
    prop::collection::hash_set(arb_name(), 0..16)
}

fn populate(names: &HashSet<String>) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in names {
        fs::write(tmp.path().join(name), b"").unwrap();
    }
    tmp
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Output is exactly the names ending in the extension, minus the template.
    #[test]
    fn listing_equals_filtered_directory(
        names in arb_names(),
        template_pick in any::<prop::sample::Index>(),
    ) {
        let tmp = populate(&names);
        let ordered: Vec<&String> = names.iter().collect();
        let template = if ordered.is_empty() {
            None
        } else {
            Some(ordered[template_pick.index(ordered.len())].clone())
        };

        let mut request = ListingRequest::default()
            .with_directory(format!("{}/", tmp.path().display()))
            .with_full_path(false);
        request.exclude_name.clone_from(&template);

        let got: HashSet<String> = try_list_source_files(&request).unwrap().into_iter().collect();
        let expected: HashSet<String> = names
            .iter()
            .filter(|n| n.ends_with(".xlsx") && Some(*n) != template.as_ref())
            .cloned()
            .collect();

        prop_assert_eq!(got, expected);
    }

    /// Full-path output is the bare output with the directory string prepended.
    #[test]
    fn full_path_is_prefixed_bare(names in arb_names()) {
        let tmp = populate(&names);
        let dir = format!("{}/", tmp.path().display());
        let request = ListingRequest::default().with_directory(dir.clone());

        let full: HashSet<String> = try_list_source_files(&request).unwrap().into_iter().collect();
        let bare: HashSet<String> = try_list_source_files(&request.with_full_path(false))
            .unwrap()
            .into_iter()
            .map(|name| format!("{dir}{name}"))
            .collect();

        prop_assert_eq!(full, bare);
    }
}
