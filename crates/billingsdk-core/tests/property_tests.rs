//! Property-based tests for path containment and env merging

use billingsdk_core::scaffold::{merge_env, ProjectRoot};
use proptest::prelude::*;

/// Path segments mixing normal names, `.` and `..`
fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,6}(\\.ts)?",
        1 => Just("..".to_string()),
        1 => Just(".".to_string()),
        1 => Just("(paypal)".to_string()),
    ]
}

fn target_strategy() -> impl Strategy<Value = String> {
    (any::<bool>(), prop::collection::vec(segment_strategy(), 1..8)).prop_map(|(absolute, parts)| {
        let joined = parts.join("/");
        if absolute {
            format!("/{}", joined)
        } else {
            joined
        }
    })
}

fn env_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => ("[A-E]{1,2}", "[a-z0-9]{0,4}").prop_map(|(k, v)| format!("{}={}", k, v)),
        1 => "# [a-z ]{0,10}",
        1 => Just(String::new()),
        1 => ("[A-E]{1,2}", "[a-z]{0,3}").prop_map(|(k, v)| format!("export {}={}", k, v)),
    ]
}

fn env_content_strategy() -> impl Strategy<Value = String> {
    (prop::collection::vec(env_line_strategy(), 0..10), any::<bool>()).prop_map(
        |(lines, trailing_newline)| {
            let mut content = lines.join("\n");
            if trailing_newline && !content.is_empty() {
                content.push('\n');
            }
            content
        },
    )
}

proptest! {
    /// Any accepted target resolves to a descendant of the project root
    #[test]
    fn resolved_paths_stay_inside_root(target in target_strategy(), with_src in any::<bool>()) {
        let dir = tempfile::tempdir().unwrap();
        if with_src {
            std::fs::create_dir(dir.path().join("src")).unwrap();
        }
        let project = ProjectRoot::open(dir.path()).unwrap();

        if let Ok(destination) = project.resolve(&target) {
            prop_assert!(destination.starts_with(project.root()));
            prop_assert_ne!(destination.as_path(), project.root());
        }
        if target.starts_with('/') {
            prop_assert!(project.resolve(&target).is_err());
        }
    }

    /// Merging the same content twice appends nothing the second time
    #[test]
    fn env_merge_is_idempotent(existing in env_content_strategy(), incoming in env_content_strategy()) {
        let once = merge_env(&existing, &incoming);
        let twice = merge_env(&once.content, &incoming);
        prop_assert!(twice.is_unchanged());
        prop_assert_eq!(twice.content, once.content);
    }

    /// Every existing line survives a merge, in order, at the start of the result
    #[test]
    fn env_merge_keeps_existing_lines(existing in env_content_strategy(), incoming in env_content_strategy()) {
        let merged = merge_env(&existing, &incoming);
        let before: Vec<&str> = existing.lines().collect();
        let after: Vec<&str> = merged.content.lines().take(before.len()).collect();
        prop_assert_eq!(before, after);
    }
}
