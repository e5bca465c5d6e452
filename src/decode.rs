//! Payload decoding: turn one attachment into zero or more report documents.
//!
//! All failures here are scoped to the attachment (or zip member) being
//! processed: they are logged and skipped, never aborting the run.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{FetchError, Result};
use crate::model::attachment::Attachment;
use crate::model::report::DecodedReport;
use crate::naming;

/// How an attachment payload is packaged, decided from its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Bare XML document (`.xml`).
    Xml,
    /// Gzip-compressed XML document (`.xml.gz`).
    GzipXml,
    /// Zip archive of one or more XML members (`.zip`).
    ZipArchive,
    /// Filename fails the attachment-level grammar.
    Invalid,
}

/// Classify an attachment filename. The grammar check runs first, so the
/// suffix dispatch below only ever sees the three valid extensions.
pub fn classify(filename: &str) -> PayloadKind {
    if !naming::is_valid_attachment_name(filename) {
        PayloadKind::Invalid
    } else if filename.ends_with(".xml.gz") {
        PayloadKind::GzipXml
    } else if filename.ends_with(".zip") {
        PayloadKind::ZipArchive
    } else {
        PayloadKind::Xml
    }
}

/// Decode one attachment into report documents.
///
/// Never fails: malformed input is logged with the originating message's
/// date and subject, and yields nothing.
pub fn decode_attachment(attachment: &Attachment) -> Vec<DecodedReport> {
    match classify(&attachment.filename) {
        PayloadKind::Invalid => {
            tracing::warn!(
                filename = %attachment.filename,
                received = %attachment.received,
                subject = %attachment.subject,
                "Invalid attachment name format"
            );
            Vec::new()
        }
        PayloadKind::GzipXml => match decode_gzip(attachment) {
            Ok(report) => vec![report],
            Err(e) => {
                tracing::warn!(
                    received = %attachment.received,
                    subject = %attachment.subject,
                    error = %e,
                    "Failed to decode gzip attachment"
                );
                Vec::new()
            }
        },
        PayloadKind::ZipArchive => decode_zip(attachment),
        PayloadKind::Xml => match std::str::from_utf8(&attachment.data) {
            Ok(xml) => vec![report(attachment, attachment.filename.clone(), xml)],
            Err(_) => {
                tracing::warn!(
                    received = %attachment.received,
                    subject = %attachment.subject,
                    error = %FetchError::NotText { filename: attachment.filename.clone() },
                    "Failed to decode xml attachment"
                );
                Vec::new()
            }
        },
    }
}

/// Decompress a `.xml.gz` payload. The report filename is the attachment
/// name with the trailing `.gz` removed.
fn decode_gzip(attachment: &Attachment) -> Result<DecodedReport> {
    let mut decoder = GzDecoder::new(attachment.data.as_slice());
    let mut xml = String::new();
    decoder
        .read_to_string(&mut xml)
        .map_err(|source| FetchError::Gzip {
            filename: attachment.filename.clone(),
            source,
        })?;

    let filename = attachment
        .filename
        .strip_suffix(".gz")
        .unwrap_or(&attachment.filename)
        .to_string();
    Ok(report(attachment, filename, &xml))
}

/// Unpack a `.zip` payload: every member whose name passes the member-level
/// grammar becomes one report. Invalid or unreadable members are skipped
/// individually.
fn decode_zip(attachment: &Attachment) -> Vec<DecodedReport> {
    let cursor = std::io::Cursor::new(attachment.data.as_slice());
    let mut archive = match zip::ZipArchive::new(cursor) {
        Ok(archive) => archive,
        Err(source) => {
            tracing::warn!(
                received = %attachment.received,
                subject = %attachment.subject,
                error = %FetchError::Zip { filename: attachment.filename.clone(), source },
                "Invalid zip file"
            );
            return Vec::new();
        }
    };

    let mut reports = Vec::new();
    for index in 0..archive.len() {
        let mut member = match archive.by_index(index) {
            Ok(member) => member,
            Err(e) => {
                tracing::warn!(
                    filename = %attachment.filename,
                    index,
                    error = %e,
                    "Unreadable zip member"
                );
                continue;
            }
        };

        let member_name = member.name().to_string();
        if !naming::is_valid_member_name(&member_name) {
            tracing::warn!(
                member = %member_name,
                filename = %attachment.filename,
                received = %attachment.received,
                subject = %attachment.subject,
                "Invalid report filename in zip attachment"
            );
            continue;
        }

        let mut xml = String::new();
        if let Err(e) = member.read_to_string(&mut xml) {
            tracing::warn!(
                member = %member_name,
                filename = %attachment.filename,
                error = %e,
                "Failed to read zip member"
            );
            continue;
        }
        reports.push(report(attachment, member_name, &xml));
    }
    reports
}

/// Build a report record attributed to the attachment's message.
fn report(attachment: &Attachment, filename: String, xml: &str) -> DecodedReport {
    DecodedReport {
        filename,
        xml: xml.trim().to_string(),
        uid: attachment.uid,
        received: attachment.received,
        subject: attachment.subject.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const XML_NAME: &str = "example.com!google.com!1609459200!1609545600.xml";
    const GZ_NAME: &str = "a.b!c.d!0000000000!0000000001.xml.gz";

    fn attachment(filename: &str, data: Vec<u8>) -> Attachment {
        Attachment {
            filename: filename.to_string(),
            data,
            uid: 5,
            received: DateTime::parse_from_rfc3339("2021-01-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            subject: "Report Domain: example.com".to_string(),
        }
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn zip_of(members: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for (name, content) in members {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(XML_NAME), PayloadKind::Xml);
        assert_eq!(classify(GZ_NAME), PayloadKind::GzipXml);
        assert_eq!(
            classify("example.com!google.com!1609459200!1609545600.zip"),
            PayloadKind::ZipArchive
        );
        assert_eq!(classify("weird-name.xml"), PayloadKind::Invalid);
        assert_eq!(classify("report.zip"), PayloadKind::Invalid);
    }

    #[test]
    fn test_raw_xml_is_trimmed() {
        let att = attachment(XML_NAME, b"  <feedback/>\n\n".to_vec());
        let reports = decode_attachment(&att);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].filename, XML_NAME);
        assert_eq!(reports[0].xml, "<feedback/>");
    }

    #[test]
    fn test_gzip_strips_gz_suffix() {
        let att = attachment(GZ_NAME, gzip(b"<feedback/>\n"));
        let reports = decode_attachment(&att);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].filename, "a.b!c.d!0000000000!0000000001.xml");
        assert_eq!(reports[0].xml, "<feedback/>");
    }

    #[test]
    fn test_malformed_gzip_yields_nothing() {
        let att = attachment(GZ_NAME, b"not gzip at all".to_vec());
        assert!(decode_attachment(&att).is_empty());
    }

    #[test]
    fn test_zip_keeps_valid_members_only() {
        let data = zip_of(&[
            (XML_NAME, "<feedback/>"),
            ("report.txt", "not a report"),
        ]);
        let att = attachment("example.com!google.com!1609459200!1609545600.zip", data);
        let reports = decode_attachment(&att);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].filename, XML_NAME);
        assert_eq!(reports[0].xml, "<feedback/>");
    }

    #[test]
    fn test_zip_with_several_valid_members() {
        let data = zip_of(&[
            ("one.com!a.org!1111111111!1111111112.xml", "<a/>"),
            ("two.com!a.org!1111111111!1111111112.xml", "<b/>"),
        ]);
        let att = attachment("one.com!a.org!1111111111!1111111112.zip", data);
        let reports = decode_attachment(&att);
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_structurally_invalid_zip_yields_nothing() {
        let att = attachment(
            "example.com!google.com!1609459200!1609545600.zip",
            b"PK\x03\x04 broken".to_vec(),
        );
        assert!(decode_attachment(&att).is_empty());
    }

    #[test]
    fn test_invalid_attachment_name_yields_nothing() {
        let att = attachment("weird-name.xml", b"<feedback/>".to_vec());
        assert!(decode_attachment(&att).is_empty());
    }

    #[test]
    fn test_non_utf8_xml_yields_nothing() {
        let att = attachment(XML_NAME, vec![0xff, 0xfe, 0x00]);
        assert!(decode_attachment(&att).is_empty());
    }
}
