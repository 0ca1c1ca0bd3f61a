use mbrao_core::validation::{is_email, is_url, value_is_email, value_is_url};
use proptest::prelude::*;
use serde_json::{json, Value};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn well_formed_emails_are_accepted(
        local in "[a-z0-9][a-z0-9._+-]{0,15}",
        domain in "[a-z0-9]{1,12}",
        tld in "[a-z]{2,6}",
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_email(&email), "rejected {}", email);
    }

    #[test]
    fn emails_without_dotted_domain_are_rejected(
        local in "[a-z0-9]{1,10}",
        host in "[a-z0-9]{1,12}",
    ) {
        let email = format!("{}@{}", local, host);
        prop_assert!(!is_email(&email));
    }

    #[test]
    fn strings_with_whitespace_are_never_urls(
        host in "[a-z]{1,10}",
        gap in "[ \t]{1,3}",
    ) {
        let url = format!("http://{}{}.com", host, gap);
        prop_assert!(!is_url(&url));
    }

    #[test]
    fn allowed_schemes_with_host_are_urls(
        scheme in prop::sample::select(vec!["http", "https", "ftp", "ftps"]),
        host in "[a-z]{1,10}\\.[a-z]{2,5}",
        path in "(/[a-z0-9]{1,8}){0,3}",
    ) {
        let url = format!("{}://{}{}", scheme, host, path);
        prop_assert!(is_url(&url), "rejected {}", url);
    }

    #[test]
    fn other_schemes_are_rejected(
        scheme in "(gopher|mailto|file|ws)",
        host in "[a-z]{1,10}\\.com",
    ) {
        let url = format!("{}://{}", scheme, host);
        prop_assert!(!is_url(&url));
    }

    #[test]
    fn numbers_are_neither(n in any::<i64>()) {
        prop_assert!(!value_is_email(&json!(n)));
        prop_assert!(!value_is_url(&json!(n)));
    }
}

#[test]
fn non_string_values_are_rejected() {
    for value in [Value::Null, json!([]), json!({}), json!(["http://a.com"]), json!(true)] {
        assert!(!value_is_email(&value), "{value}");
        assert!(!value_is_url(&value), "{value}");
    }
}
