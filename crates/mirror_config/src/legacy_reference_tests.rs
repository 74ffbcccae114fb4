//! Tests for the deprecated `{{ section_option }}` reference resolver.

use crate::errors::ConfigurationError;
use crate::legacy_reference::{
    eval_legacy_reference, eval_legacy_reference_or, has_legacy_reference,
};
use crate::source::ConfigSource;

fn source_from(content: &str) -> ConfigSource {
    let mut source = ConfigSource::new();
    source.read_string(content).expect("test configuration parses");
    source
}

mod detection_tests {
    use super::*;

    #[test]
    fn detects_brace_pairs() {
        assert!(has_legacy_reference("{{ mirror_directory }}"));
        assert!(has_legacy_reference("/var/{{ mirror_directory }}/diff"));
        assert!(has_legacy_reference("{{x}}"));
    }

    #[test]
    fn ignores_values_without_a_complete_pair() {
        assert!(!has_legacy_reference("/srv/pypi"));
        assert!(!has_legacy_reference("{{ unterminated"));
        assert!(!has_legacy_reference("no opener }}"));
        assert!(!has_legacy_reference("{{}}"));
    }
}

mod evaluation_tests {
    use super::*;

    #[test]
    fn resolves_whole_value_reference() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        let resolved = eval_legacy_reference(&source, "{{ mirror_directory }}").unwrap();
        assert_eq!(resolved, "/srv/pypi");
    }

    #[test]
    fn keeps_surrounding_text() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        let resolved =
            eval_legacy_reference(&source, "pre-{{ mirror_directory }}/new-files").unwrap();
        assert_eq!(resolved, "pre-/srv/pypi/new-files");
    }

    #[test]
    fn tolerates_missing_inner_whitespace() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        let resolved = eval_legacy_reference(&source, "{{mirror_directory}}").unwrap();
        assert_eq!(resolved, "/srv/pypi");
    }

    #[test]
    fn referenced_value_is_interpolated() {
        let source = source_from(
            "[paths]\nbase = /var/log\n[test]\nexample = ${paths:base}/mirror\n",
        );
        let resolved = eval_legacy_reference(&source, "{{ test_example }}/diffs").unwrap();
        assert_eq!(resolved, "/var/log/mirror/diffs");
    }

    #[test]
    fn underscore_separates_section_from_option() {
        // The section name ends at the first underscore; the rest is the
        // option, which may itself contain underscores.
        let source = source_from("[test]\nmay_have_underscores = ok\n");
        let resolved =
            eval_legacy_reference(&source, "{{ test_may_have_underscores }}").unwrap();
        assert_eq!(resolved, "ok");
    }

    #[test]
    fn value_without_reference_is_a_syntax_error() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        let error = eval_legacy_reference(&source, "/srv/pypi").unwrap_err();
        assert!(matches!(error, ConfigurationError::ReferenceSyntax { .. }));
        assert!(error
            .to_string()
            .contains("Unable to parse config option reference from '/srv/pypi'"));
    }

    #[test]
    fn single_character_section_is_a_syntax_error() {
        // Section names are at least two characters long.
        let source = source_from("[m]\ndirectory = /srv/pypi\n");
        let error = eval_legacy_reference(&source, "{{ m_directory }}").unwrap_err();
        assert!(matches!(error, ConfigurationError::ReferenceSyntax { .. }));
    }

    #[test]
    fn reference_without_separator_is_a_syntax_error() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        let error = eval_legacy_reference(&source, "{{ nounderscore }}").unwrap_err();
        assert!(matches!(error, ConfigurationError::ReferenceSyntax { .. }));
    }

    #[test]
    fn missing_target_is_reported_with_section_and_option() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        let error = eval_legacy_reference(&source, "{{ mirror_woops }}").unwrap_err();
        match error {
            ConfigurationError::ReferenceNotFound { section, option } => {
                assert_eq!(section, "mirror");
                assert_eq!(option, "woops");
            }
            other => panic!("expected ReferenceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_section_is_also_not_found() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        let error = eval_legacy_reference(&source, "{{ nowhere_directory }}").unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::ReferenceNotFound { .. }
        ));
    }
}

mod fallback_tests {
    use super::*;

    #[test]
    fn falls_back_on_any_failure() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        assert_eq!(
            eval_legacy_reference_or(&source, "{{ mirror_woops }}", "/tmp/default"),
            "/tmp/default"
        );
        assert_eq!(
            eval_legacy_reference_or(&source, "not a reference", "/tmp/default"),
            "/tmp/default"
        );
    }

    #[test]
    fn passes_through_resolved_values() {
        let source = source_from("[mirror]\ndirectory = /srv/pypi\n");
        assert_eq!(
            eval_legacy_reference_or(&source, "{{ mirror_directory }}", "/tmp/default"),
            "/srv/pypi"
        );
    }
}
