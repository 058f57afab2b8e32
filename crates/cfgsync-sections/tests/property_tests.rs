//! Property tests: merging a body and extracting it again is lossless, and
//! merging never touches lines outside the section body.

use cfgsync_sections::{
    ConfigDocument, MissingSectionPolicy, extract, locate, merge, validate_section,
};
use proptest::prelude::*;

/// A body line that can never be mistaken for a header or closing line.
fn body_line() -> impl Strategy<Value = String> {
    ("[ \t]{0,6}", "[a-z0-9\"(): ,]{0,24}", prop_oneof![Just("\n"), Just("\r\n")]).prop_filter_map(
        "must not close the section",
        |(indent, text, eol)| {
            let line = format!("{indent}({text}){eol}");
            (line.trim() != "],").then_some(line)
        },
    )
}

/// Lines surrounding a section that never look like a `tags` header.
fn other_line() -> impl Strategy<Value = String> {
    ("[ ]{0,4}", "[a-z_]{1,12}", "[a-z0-9\" ]{0,12}").prop_map(|(indent, key, value)| {
        format!("{indent}{key}_x: {value},\n")
    })
}

fn document(
    before: &[String],
    body: &[String],
    after: &[String],
) -> ConfigDocument {
    let mut lines = before.to_vec();
    lines.push("  tags: [\n".to_string());
    lines.extend_from_slice(body);
    lines.push("  ],\n".to_string());
    lines.extend_from_slice(after);
    ConfigDocument::from_lines("config.prop.ron", lines)
}

proptest! {
    #[test]
    fn extract_after_merge_round_trips(
        active_body in prop::collection::vec(body_line(), 0..12),
        target_body in prop::collection::vec(body_line(), 0..12),
        before in prop::collection::vec(other_line(), 0..6),
        after in prop::collection::vec(other_line(), 0..6),
    ) {
        let active = document(&[], &active_body, &[]);
        let target = document(&before, &target_body, &after);

        let extracted = extract(&active, "tags").unwrap();
        let merged = merge(&target, "tags", &extracted, MissingSectionPolicy::Skip).unwrap();

        prop_assert_eq!(extract(&merged.document, "tags").unwrap(), extracted);
        prop_assert!(validate_section(&active, &merged.document, "tags").is_none());
    }

    #[test]
    fn merge_never_touches_lines_outside_the_body(
        new_body in prop::collection::vec(body_line(), 0..12),
        target_body in prop::collection::vec(body_line(), 0..12),
        before in prop::collection::vec(other_line(), 0..6),
        after in prop::collection::vec(other_line(), 0..6),
    ) {
        let target = document(&before, &target_body, &after);
        let merged = merge(&target, "tags", &new_body, MissingSectionPolicy::Skip)
            .unwrap()
            .document;

        let old = locate(&target, "tags").unwrap();
        let new = locate(&merged, "tags").unwrap();

        prop_assert_eq!(&target.lines()[..old.start], &merged.lines()[..new.start]);
        prop_assert_eq!(&target.lines()[old.end..], &merged.lines()[new.end..]);
    }

    #[test]
    fn merging_twice_is_idempotent(
        new_body in prop::collection::vec(body_line(), 0..12),
        target_body in prop::collection::vec(body_line(), 0..12),
    ) {
        let target = document(&[], &target_body, &[]);
        let once = merge(&target, "tags", &new_body, MissingSectionPolicy::Skip).unwrap().document;
        let twice = merge(&once, "tags", &new_body, MissingSectionPolicy::Skip).unwrap();

        prop_assert!(!twice.outcome.changed());
        prop_assert_eq!(twice.document, once);
    }
}
