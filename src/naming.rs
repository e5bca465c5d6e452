//! DMARC report filename grammar.
//!
//! Report names follow the convention
//! `policy-domain!reporting-org!begin-epoch!end-epoch[!extra].xml[.gz]`
//! (or `.zip` for archives). Both validators share one stem pattern and
//! differ only in the extensions they accept.

use std::sync::LazyLock;

use regex::Regex;

/// Extensions accepted for the filename of an email attachment.
const ATTACHMENT_SUFFIXES: &[&str] = &[".xml", ".xml.gz", ".zip"];

/// Extensions accepted for member names inside a zip archive.
const MEMBER_SUFFIXES: &[&str] = &[".xml"];

/// Shared stem: two dot-segmented alphanumeric/hyphen tokens, two 10-digit
/// epochs, optional `!extra` token. Purely syntactic; epoch ordering is
/// not checked.
static STEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9-]+\.?)+!([A-Za-z0-9-]+\.?)+![0-9]{10}![0-9]{10}(![A-Za-z0-9-]+)?$")
        .expect("stem pattern compiles")
});

/// Check `name` against the stem grammar plus one of `suffixes`
/// (case-sensitive, exact).
fn matches_report_name(name: &str, suffixes: &[&str]) -> bool {
    suffixes
        .iter()
        .any(|suffix| matches!(name.strip_suffix(suffix), Some(stem) if STEM.is_match(stem)))
}

/// Whether `name` is a valid report attachment filename
/// (`.xml`, `.xml.gz` or `.zip`).
pub fn is_valid_attachment_name(name: &str) -> bool {
    matches_report_name(name, ATTACHMENT_SUFFIXES)
}

/// Whether `name` is a valid report filename inside a zip archive
/// (`.xml` only).
pub fn is_valid_member_name(name: &str) -> bool {
    matches_report_name(name, MEMBER_SUFFIXES)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "example.com!google.com!1609459200!1609545600.xml";

    #[test]
    fn test_valid_attachment_names() {
        assert!(is_valid_attachment_name(VALID));
        assert!(is_valid_attachment_name(
            "example.com!google.com!1609459200!1609545600.xml.gz"
        ));
        assert!(is_valid_attachment_name(
            "example.com!google.com!1609459200!1609545600.zip"
        ));
        // Optional extra token before the extension
        assert!(is_valid_attachment_name(
            "example.com!google.com!1609459200!1609545600!af4b2.xml"
        ));
        // Hyphens and multiple dot segments in either domain
        assert!(is_valid_attachment_name(
            "sub.mail-host.example.com!report-org.net!0000000000!0000000001.zip"
        ));
    }

    #[test]
    fn test_single_character_perturbations() {
        // 9-digit epoch
        assert!(!is_valid_attachment_name(
            "example.com!google.com!160945920!1609545600.xml"
        ));
        // 11-digit epoch
        assert!(!is_valid_attachment_name(
            "example.com!google.com!16094592000!1609545600.xml"
        ));
        // Missing a separator
        assert!(!is_valid_attachment_name(
            "example.com!google.com!16094592001609545600.xml"
        ));
        // Wrong extension
        assert!(!is_valid_attachment_name(
            "example.com!google.com!1609459200!1609545600.txt"
        ));
        // Case-sensitive extension
        assert!(!is_valid_attachment_name(
            "example.com!google.com!1609459200!1609545600.XML"
        ));
        // Underscore is not in the token alphabet
        assert!(!is_valid_attachment_name(
            "example_com!google.com!1609459200!1609545600.xml"
        ));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(!is_valid_attachment_name(""));
        assert!(!is_valid_attachment_name(".xml"));
        assert!(!is_valid_attachment_name("weird-name.xml"));
        assert!(!is_valid_attachment_name("report.zip"));
        // Extra token after the extension
        assert!(!is_valid_attachment_name(
            "example.com!google.com!1609459200!1609545600.xml.extra"
        ));
    }

    #[test]
    fn test_member_names_xml_only() {
        assert!(is_valid_member_name(VALID));
        assert!(is_valid_member_name(
            "example.com!google.com!1609459200!1609545600!af4b2.xml"
        ));
        // Zip members must be bare .xml
        assert!(!is_valid_member_name(
            "example.com!google.com!1609459200!1609545600.xml.gz"
        ));
        assert!(!is_valid_member_name(
            "example.com!google.com!1609459200!1609545600.zip"
        ));
        assert!(!is_valid_member_name("report.txt"));
    }

    #[test]
    fn test_no_epoch_order_check() {
        // begin > end is syntactically fine
        assert!(is_valid_attachment_name(
            "example.com!google.com!1609545600!1609459200.xml"
        ));
    }
}
