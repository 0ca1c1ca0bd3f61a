use crate::cli::ValidateKind;
use anyhow::{bail, Result};
use mbrao_core::Parser;
use std::io::Write;

/// Print one verdict per value; fails if any value is invalid
pub fn execute(kind: ValidateKind, values: &[String], out: &mut dyn Write) -> Result<()> {
    let check: fn(&str) -> bool = match kind {
        ValidateKind::Email => Parser::is_email,
        ValidateKind::Url => Parser::is_url,
    };

    let mut invalid = 0;
    for value in values {
        let valid = check(value);
        if !valid {
            invalid += 1;
        }
        writeln!(out, "{}\t{}", if valid { "valid" } else { "invalid" }, value)?;
    }

    if invalid > 0 {
        bail!("{} of {} values are invalid", invalid, values.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_each_value() {
        let mut out = Vec::new();
        let result = execute(
            ValidateKind::Email,
            &["a@b.co.uk".to_string(), "a@localhost".to_string()],
            &mut out,
        );

        assert!(result.is_err());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "valid\ta@b.co.uk\ninvalid\ta@localhost\n"
        );
    }

    #[test]
    fn test_all_valid_urls() {
        let mut out = Vec::new();
        execute(ValidateKind::Url, &["ftp://files.example.com".to_string()], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "valid\tftp://files.example.com\n");
    }
}
