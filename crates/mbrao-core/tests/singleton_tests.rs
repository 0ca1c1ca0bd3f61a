//! Shared parser instance tests
//!
//! These mutate the process-wide instance and use `#[serial]`.

use mbrao_core::{Locals, ParseOptions, Parser, ParserConfig, RenderOptions};
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_instance_is_shared() {
    let first = Parser::instance();
    let second = Parser::instance();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
#[serial]
fn test_force_new_leaves_shared_instance() {
    let cached = Parser::instance();
    cached.set_locale(Some("it"));

    let fresh = Parser::instance_with(true);
    assert!(!Arc::ptr_eq(&cached, &fresh));
    assert_eq!(fresh.locale(), "en");
    assert!(Arc::ptr_eq(&cached, &Parser::instance()));
    assert_eq!(Parser::instance().locale(), "it");

    cached.set_locale(None);
}

#[test]
#[serial]
fn test_set_instance_adopts_forced_parser() {
    let fresh = Parser::instance_with(true);
    fresh.set_locale(Some("fr"));
    assert!(!Arc::ptr_eq(&fresh, &Parser::instance()));

    let installed = Parser::set_instance(Parser::new(fresh.config()));
    assert!(Arc::ptr_eq(&installed, &Parser::instance()));
    assert_eq!(Parser::instance().locale(), "fr");

    Parser::set_instance(Parser::default());
}

#[test]
#[serial]
fn test_set_instance_drives_free_functions() {
    let config = ParserConfig::new().with_rendering_engine("html_pipeline");
    Parser::set_instance(Parser::new(config));

    let content = mbrao_core::parse("---\ntitle: Hi\n---\n_body_", ParseOptions::new()).unwrap();
    let html = mbrao_core::render(&content, RenderOptions::new(), &Locals::new()).unwrap();
    assert_eq!(html, "<p><em>body</em></p>\n");

    Parser::set_instance(Parser::new(ParserConfig::new().with_parsing_engine("missing")));
    assert!(mbrao_core::parse("x", ParseOptions::new()).is_err());

    Parser::set_instance(Parser::default());
}
