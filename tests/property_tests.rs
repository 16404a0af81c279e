//! Property-based tests for logger_factory using proptest

use chrono::{Local, TimeZone};
use logger_factory::prelude::*;
use proptest::prelude::*;
use std::io;
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warning),
        Just(LogLevel::Error),
        Just(LogLevel::Critical),
    ]
}

fn fixed_record(name: &str, level: LogLevel, message: &str) -> LogRecord {
    LogRecord::new(name, level, message)
        .with_thread_name("worker-1")
        .with_timestamp(Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap())
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Level names parse back to the same level
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
        prop_assert_eq!(level.to_string(), level.to_str());
    }

    /// Ordering follows the numeric severity
    #[test]
    fn test_log_level_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, (a as u8) <= (b as u8));
        prop_assert_eq!(a < b, (a as u8) < (b as u8));
    }

    /// Parsing ignores case
    #[test]
    fn test_log_level_case_insensitive(level in any_level()) {
        let lower: LogLevel = level.to_str().to_lowercase().parse().unwrap();
        prop_assert_eq!(level, lower);
    }
}

// ============================================================================
// Formatter Tests
// ============================================================================

proptest! {
    /// Rendering the same record twice yields the same text
    #[test]
    fn test_formatter_is_deterministic(
        name in "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}",
        message in "[ -~]{0,64}",
        level in any_level(),
    ) {
        let formatter = Formatter::default_file();
        let record = fixed_record(&name, level, &message);

        prop_assert_eq!(formatter.render(&record), formatter.render(&record));
    }

    /// The default layout places each field in its slot
    #[test]
    fn test_default_layout_fields(
        name in "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}",
        message in "[a-zA-Z0-9 ]{0,64}",
        level in any_level(),
    ) {
        let record = fixed_record(&name, level, &message);

        prop_assert_eq!(
            Formatter::default_file().render(&record),
            format!("{} worker-1; 2024-03-09 14:05:07; {}; {}", name, level, message)
        );
        prop_assert_eq!(
            Formatter::default_stream().render(&record),
            format!("{} worker-1; 14:05:07; {}; {}", name, level, message)
        );
    }

    /// Text without placeholders renders verbatim
    #[test]
    fn test_literal_pattern(pattern in "[^{}]{0,40}") {
        let formatter = Formatter::new(pattern.clone(), "%H");
        let record = fixed_record("x", LogLevel::Info, "ignored");
        prop_assert_eq!(formatter.render(&record), pattern);
    }

    /// Rendered messages never span more than one line
    #[test]
    fn test_message_stays_on_one_line(message in "\\PC{0,32}(\n\\PC{0,32}){0,3}") {
        let record = fixed_record("x", LogLevel::Error, &message);
        let rendered = Formatter::default_file().render(&record);
        prop_assert!(!rendered.contains('\n'));
    }
}

// ============================================================================
// Logger Construction Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// After any sequence of requests the level is the most verbose one asked for
    #[test]
    fn test_level_only_widens(levels in prop::collection::vec(any_level(), 1..8)) {
        let dir = tempfile::tempdir().unwrap();
        let factory = LoggerFactory::builder(dir.path().join("prop").display().to_string())
            .console(ConsoleTarget::writer(io::sink()))
            .registry(Arc::new(LoggerRegistry::new()))
            .build()
            .unwrap();

        let mut expected = levels[0];
        for &level in &levels {
            let logger = factory.get_logger("prop", level).unwrap();
            expected = expected.min(level);
            prop_assert_eq!(logger.level(), expected);
            prop_assert_eq!(logger.sink_count(), 3);
        }
    }

    /// Dotted names with empty segments are rejected
    #[test]
    fn test_invalid_names_rejected(
        head in "[a-z]{0,4}",
        tail in "[a-z]{0,4}",
    ) {
        let registry = LoggerRegistry::new();
        let name = format!("{head}..{tail}");
        let err = registry.get_or_create(&name).unwrap_err();
        prop_assert!(err.is_configuration());
        prop_assert!(registry.is_empty());
    }

    /// A logger's parent is its nearest registered ancestor whatever the creation order
    #[test]
    fn test_parent_is_nearest_ancestor(order in Just(vec!["a", "a.b", "a.b.c.d", "a.b.c"]).prop_shuffle()) {
        let registry = LoggerRegistry::new();
        for name in &order {
            registry.get_or_create(name).unwrap();
        }

        let parent_of = |name: &str| registry.get(name).unwrap().parent().map(|p| p.name().to_string());
        prop_assert_eq!(parent_of("a"), None);
        prop_assert_eq!(parent_of("a.b"), Some("a".to_string()));
        prop_assert_eq!(parent_of("a.b.c"), Some("a.b".to_string()));
        prop_assert_eq!(parent_of("a.b.c.d"), Some("a.b.c".to_string()));
    }
}
