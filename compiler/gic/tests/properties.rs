// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Properties of the session that hold for any input.

use gi_ir::StringInterner;
use gi_parse::Classifier;
use gic::{IncrementalSession, SessionResult};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_blank_lines_are_empty(line in "[ \t\r]{0,20}") {
        let mut session = IncrementalSession::default();
        prop_assert_eq!(session.submit(&line), Ok(SessionResult::Translated(String::new())));
        prop_assert!(!session.is_continuation());
    }

    #[test]
    fn prop_buffer_only_survives_waiting(
        lines in prop::collection::vec("[a-z0-9 +*(){}:=,`]{0,12}", 1..5)
    ) {
        let mut session = IncrementalSession::default();
        for line in &lines {
            let result = session.submit(line);
            if result == Ok(SessionResult::Waiting) {
                prop_assert!(!session.pending().is_empty());
                prop_assert!(session.is_continuation());
            } else {
                prop_assert_eq!(session.pending(), "");
                prop_assert!(!session.is_continuation());
            }
        }
    }

    #[test]
    fn prop_classification_does_not_depend_on_history(
        first in "[a-z0-9 +*(){}:=,]{0,12}",
        second in "[a-z0-9 +*(){}:=,]{0,12}",
    ) {
        let interner = StringInterner::new();
        let classifier = Classifier::go();
        let before = classifier.classify(&second, &interner);
        let _ = classifier.classify(&first, &interner);
        let after = classifier.classify(&second, &interner);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_translate_one_never_leaves_pending(src in "[a-z0-9 +*(){}:=,\n]{0,24}") {
        let mut session = IncrementalSession::default();
        let _ = session.translate_one(&src);
        prop_assert_eq!(session.pending(), "");
        prop_assert!(!session.is_continuation());
    }
}
