/*!
    Revocation check for keybox attestation bundles.

    A bundle is an XML document holding certificate chains as PEM text in
    `Certificate` elements. By convention the first element is the EC leaf
    and the fourth the RSA leaf. Their serial numbers, as lowercase hex
    without leading zeros, are looked up in a revocation set supplied by a
    [`RevocationSource`].

    Structural problems with the bundle are reported as a [`BundleStatus`],
    not as errors. Only I/O failures are errors.
*/

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use drm_core::{FieldValue, FileKind, Record};
use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;
use walkdir::WalkDir;

use crate::error::{KeyboxError, KeyboxResult};

const CERTIFICATE_TAG: &[u8] = b"Certificate";
const MIN_CERTIFICATES: usize = 4;
const EC_CERTIFICATE_INDEX: usize = 0;
const RSA_CERTIFICATE_INDEX: usize = 3;

/**
    Revoked certificate serials, lowercase hex.
*/
pub type RevocationSet = HashSet<String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("revocation list unavailable: {0}")]
pub struct RevocationUnavailable(pub String);

/**
    Provider of the current revocation set.
*/
pub trait RevocationSource {
    fn fetch(&self) -> impl Future<Output = Result<RevocationSet, RevocationUnavailable>> + Send;
}

/**
    Fixed in-memory revocation source.
*/
#[derive(Debug, Clone)]
pub struct StaticRevocationSource {
    result: Result<RevocationSet, RevocationUnavailable>,
}

impl StaticRevocationSource {
    pub fn new<I, T>(serials: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            result: Ok(serials.into_iter().map(Into::into).collect()),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty::<String>())
    }

    /**
        A source whose every fetch fails with `reason`.
    */
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            result: Err(RevocationUnavailable(reason.into())),
        }
    }
}

impl RevocationSource for StaticRevocationSource {
    fn fetch(&self) -> impl Future<Output = Result<RevocationSet, RevocationUnavailable>> + Send {
        std::future::ready(self.result.clone())
    }
}

/**
    Why a bundle could not be checked.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleStatus {
    /// Fewer than four `Certificate` elements.
    InvalidXml,
    /// The document is not well-formed XML.
    MalformedXml(String),
    /// A certificate did not decode to a serial number.
    MissingSerial,
    /// No bundle file was found in the given directory.
    NoBundle,
}

impl BundleStatus {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidXml => "Invalid XML",
            Self::MalformedXml(_) => "Malformed XML",
            Self::MissingSerial => "Missing Serial",
            Self::NoBundle => "No Bundle",
        }
    }

    pub fn to_record(&self) -> Record {
        Record::new().with("Status", FieldValue::Text(self.message().to_owned()))
    }
}

impl fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedXml(reason) => write!(f, "{}: {reason}", self.message()),
            _ => f.write_str(self.message()),
        }
    }
}

/**
    Serial numbers of the two leaf certificates of a bundle.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSerials {
    pub ec: String,
    pub rsa: String,
}

impl BundleSerials {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("EC Cert SN", FieldValue::Text(self.ec.clone()))
            .with("RSA Cert SN", FieldValue::Text(self.rsa.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderState {
    Available,
    Unavailable(String),
}

impl ProviderState {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::Unavailable(reason) => write!(f, "unavailable: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationReport {
    pub serials: BundleSerials,
    /// Either serial is in the revocation set. An unavailable
    /// provider counts as an empty set here.
    pub revoked: bool,
    pub provider: ProviderState,
}

impl RevocationReport {
    /**
        Revocation verdict that treats an unavailable provider as revoked.
    */
    pub fn revoked_fail_closed(&self) -> bool {
        self.revoked || !self.provider.is_available()
    }

    pub fn to_record(&self) -> Record {
        let status = if self.revoked { "Revoked" } else { "Valid" };
        self.serials
            .to_record()
            .with("Revoked Status", FieldValue::Text(status.to_owned()))
            .with("Revocation List", FieldValue::Text(self.provider.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationOutcome {
    Checked(RevocationReport),
    Status(BundleStatus),
}

impl RevocationOutcome {
    pub fn report(&self) -> Option<&RevocationReport> {
        match self {
            Self::Checked(report) => Some(report),
            Self::Status(_) => None,
        }
    }

    pub fn status(&self) -> Option<&BundleStatus> {
        match self {
            Self::Checked(_) => None,
            Self::Status(status) => Some(status),
        }
    }

    pub fn to_record(&self) -> Record {
        match self {
            Self::Checked(report) => report.to_record(),
            Self::Status(status) => status.to_record(),
        }
    }
}

/**
    Decode the serial number of a PEM certificate.

    Each line is trimmed first, so PEM text indented inside an XML
    element decodes as-is. Returns `None` for anything that is not a
    parseable X.509 certificate.
*/
pub fn serial_from_pem(text: &str) -> Option<String> {
    let pem: String = text
        .trim()
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    let (_, pem) = x509_parser::pem::parse_x509_pem(pem.as_bytes()).ok()?;
    let cert = pem.parse_x509().ok()?;
    Some(cert.tbs_certificate.serial.to_str_radix(16))
}

/**
    Leading text content of every `Certificate` element, in document order.
    Text after the first child element is not collected. Namespace prefixes
    are ignored.
*/
fn certificate_texts(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);

    let mut certificates = Vec::new();
    let mut current: Option<String> = None;
    let mut inner_depth = 0usize;
    let mut saw_child = false;
    let mut open = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                open += 1;
                seen_root = true;
                if current.is_some() {
                    inner_depth += 1;
                    saw_child = true;
                } else if e.local_name().as_ref() == CERTIFICATE_TAG {
                    current = Some(String::new());
                    saw_child = false;
                }
            }
            Ok(Event::Empty(e)) => {
                seen_root = true;
                if current.is_some() {
                    saw_child = true;
                } else if e.local_name().as_ref() == CERTIFICATE_TAG {
                    certificates.push(String::new());
                }
            }
            Ok(Event::End(_)) => {
                open = open.saturating_sub(1);
                if inner_depth > 0 {
                    inner_depth -= 1;
                } else if let Some(text) = current.take() {
                    certificates.push(text);
                }
            }
            Ok(Event::Text(e)) if !saw_child => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&e.unescape().map_err(|e| e.to_string())?);
                }
            }
            Ok(Event::CData(e)) if !saw_child => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }

    if !seen_root {
        return Err("no element found".to_owned());
    }
    if open > 0 {
        return Err(format!("{open} unclosed element(s) at end of document"));
    }

    Ok(certificates)
}

/**
    Extract the EC and RSA leaf serials from bundle XML.
*/
pub fn extract_serials(xml: &str) -> Result<BundleSerials, BundleStatus> {
    let certificates = certificate_texts(xml).map_err(BundleStatus::MalformedXml)?;
    if certificates.len() < MIN_CERTIFICATES {
        tracing::debug!(
            "bundle has {} certificate(s), need {MIN_CERTIFICATES}",
            certificates.len()
        );
        return Err(BundleStatus::InvalidXml);
    }

    let ec = serial_from_pem(&certificates[EC_CERTIFICATE_INDEX]);
    let rsa = serial_from_pem(&certificates[RSA_CERTIFICATE_INDEX]);
    match (ec, rsa) {
        (Some(ec), Some(rsa)) => Ok(BundleSerials { ec, rsa }),
        _ => Err(BundleStatus::MissingSerial),
    }
}

/**
    First bundle file under `dir`, walking recursively. At each level the
    directory's own files are checked, in name order, before its subdirectories.
*/
pub fn find_bundle(dir: impl AsRef<Path>) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {e}");
                None
            }
        })
        .find(|entry| {
            entry.file_type().is_file()
                && FileKind::from_path(entry.path()) == FileKind::KeyboxBundle
        })
        .map(walkdir::DirEntry::into_path)
}

/**
    Checks keybox bundles against a [`RevocationSource`].
*/
#[derive(Debug, Clone)]
pub struct RevocationChecker<S> {
    source: S,
}

impl<S: RevocationSource> RevocationChecker<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /**
        Check a bundle file, or the first bundle found under a directory.

        A file is checked whatever its extension.
    */
    pub async fn check_path(&self, path: impl AsRef<Path>) -> KeyboxResult<RevocationOutcome> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| KeyboxError::io(path, e))?;

        let file = if metadata.is_dir() {
            match find_bundle(path) {
                Some(file) => file,
                None => {
                    tracing::info!("no keybox bundle under {}", path.display());
                    return Ok(RevocationOutcome::Status(BundleStatus::NoBundle));
                }
            }
        } else {
            path.to_path_buf()
        };

        tracing::debug!("checking keybox bundle {}", file.display());
        let data = std::fs::read(&file).map_err(|e| KeyboxError::io(&file, e))?;
        match String::from_utf8(data) {
            Ok(xml) => Ok(self.check_xml(&xml).await),
            Err(e) => Ok(RevocationOutcome::Status(BundleStatus::MalformedXml(
                e.to_string(),
            ))),
        }
    }

    /**
        Check bundle XML. The revocation source is only queried once both
        serials are known.
    */
    pub async fn check_xml(&self, xml: &str) -> RevocationOutcome {
        let serials = match extract_serials(xml) {
            Ok(serials) => serials,
            Err(status) => return RevocationOutcome::Status(status),
        };

        let (revoked_set, provider) = match self.source.fetch().await {
            Ok(set) => (set, ProviderState::Available),
            Err(RevocationUnavailable(reason)) => {
                tracing::warn!("revocation list unavailable, treating as empty: {reason}");
                (RevocationSet::new(), ProviderState::Unavailable(reason))
            }
        };

        let revoked =
            revoked_set.contains(&serials.ec) || revoked_set.contains(&serials.rsa);

        RevocationOutcome::Checked(RevocationReport {
            serials,
            revoked,
            provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = include_str!("../testfiles/keybox.xml");
    const EC_SERIAL: &str = "1f2e3d4c5b6a7988";
    const RSA_SERIAL: &str = "a1b2c3d4e5f60718";

    fn checker(source: StaticRevocationSource) -> RevocationChecker<StaticRevocationSource> {
        RevocationChecker::new(source)
    }

    #[test]
    fn extracts_leaf_serials() {
        let serials = extract_serials(BUNDLE).unwrap();
        assert_eq!(serials.ec, EC_SERIAL);
        assert_eq!(serials.rsa, RSA_SERIAL);
    }

    #[test]
    fn serial_rejects_non_pem() {
        assert_eq!(serial_from_pem("not a certificate"), None);
        assert_eq!(
            serial_from_pem("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----"),
            None
        );
    }

    #[tokio::test]
    async fn valid_bundle() {
        let outcome = checker(StaticRevocationSource::new(["deadbeef"]))
            .check_xml(BUNDLE)
            .await;
        let report = outcome.report().unwrap();
        assert!(!report.revoked);
        assert!(!report.revoked_fail_closed());
        assert_eq!(report.provider, ProviderState::Available);

        let record = outcome.to_record();
        assert_eq!(
            record.get("Revoked Status"),
            Some(&FieldValue::Text("Valid".into()))
        );
        assert_eq!(
            record.get("Revocation List"),
            Some(&FieldValue::Text("available".into()))
        );
    }

    #[tokio::test]
    async fn revoked_by_either_serial() {
        for serial in [EC_SERIAL, RSA_SERIAL] {
            let outcome = checker(StaticRevocationSource::new([serial]))
                .check_xml(BUNDLE)
                .await;
            assert!(outcome.report().unwrap().revoked, "{serial}");
            assert_eq!(
                outcome.to_record().get("Revoked Status"),
                Some(&FieldValue::Text("Revoked".into()))
            );
        }
    }

    #[tokio::test]
    async fn unavailable_provider_fails_open() {
        let outcome = checker(StaticRevocationSource::unavailable("timed out"))
            .check_xml(BUNDLE)
            .await;
        let report = outcome.report().unwrap();
        assert!(!report.revoked);
        assert!(report.revoked_fail_closed());
        assert_eq!(
            report.provider,
            ProviderState::Unavailable("timed out".into())
        );
        assert_eq!(
            outcome.to_record().get("Revocation List"),
            Some(&FieldValue::Text("unavailable: timed out".into()))
        );
    }

    #[tokio::test]
    async fn too_few_certificates() {
        let xml = "<Keybox><Certificate>a</Certificate><Certificate>b</Certificate>\
                   <Certificate>c</Certificate></Keybox>";
        let outcome = checker(StaticRevocationSource::empty()).check_xml(xml).await;
        assert_eq!(outcome.status(), Some(&BundleStatus::InvalidXml));
        assert_eq!(
            outcome.to_record().get("Status"),
            Some(&FieldValue::Text("Invalid XML".into()))
        );

        let outcome = checker(StaticRevocationSource::empty())
            .check_xml("<Keybox/>")
            .await;
        assert_eq!(outcome.status(), Some(&BundleStatus::InvalidXml));
    }

    #[tokio::test]
    async fn broken_xml() {
        for xml in [
            "<Keybox><Certificate>x</Keybox>",
            "<Keybox><Certificate>x</Certificate>",
            "",
        ] {
            let outcome = checker(StaticRevocationSource::empty()).check_xml(xml).await;
            assert!(
                matches!(outcome.status(), Some(BundleStatus::MalformedXml(_))),
                "{xml:?}: {outcome:?}"
            );
        }
    }

    #[tokio::test]
    async fn non_pem_certificates() {
        let xml = "<Keybox>\
                   <Certificate>one</Certificate><Certificate>two</Certificate>\
                   <Certificate>three</Certificate><Certificate>four</Certificate>\
                   </Keybox>";
        let outcome = checker(StaticRevocationSource::empty()).check_xml(xml).await;
        assert_eq!(outcome.status(), Some(&BundleStatus::MissingSerial));
    }

    #[test]
    fn namespaced_and_cdata_certificates() {
        let xml = "<a:Root xmlns:a=\"urn:test\">\
                   <a:Certificate><![CDATA[1]]></a:Certificate>\
                   <a:Certificate>2</a:Certificate>\
                   <Certificate/>\
                   <Certificate>4<b>inner</b></Certificate>\
                   </a:Root>";
        let texts = certificate_texts(xml).unwrap();
        assert_eq!(texts, ["1", "2", "", "4"]);
    }

    #[test]
    fn text_after_child_element_is_ignored() {
        let xml = "<Root>\
                   <Certificate>head<b>x</b>tail</Certificate>\
                   <Certificate>a<br/>b</Certificate>\
                   <Certificate>next</Certificate>\
                   </Root>";
        let texts = certificate_texts(xml).unwrap();
        assert_eq!(texts, ["head", "a", "next"]);
    }

    #[tokio::test]
    async fn directory_lookup_finds_nested_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("device").join("attestation");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(nested.join("keybox.xml"), BUNDLE).unwrap();

        assert_eq!(find_bundle(dir.path()), Some(nested.join("keybox.xml")));

        let outcome = checker(StaticRevocationSource::empty())
            .check_path(dir.path())
            .await
            .unwrap();
        assert_eq!(outcome.report().unwrap().serials.ec, EC_SERIAL);
    }

    #[tokio::test]
    async fn directory_lookup_prefers_shallow_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("nested.xml"), "<Keybox/>").unwrap();
        std::fs::write(dir.path().join("z.xml"), BUNDLE).unwrap();

        assert_eq!(find_bundle(dir.path()), Some(dir.path().join("z.xml")));

        let outcome = checker(StaticRevocationSource::empty())
            .check_path(dir.path())
            .await
            .unwrap();
        assert_eq!(outcome.report().unwrap().serials.ec, EC_SERIAL);
    }

    #[tokio::test]
    async fn directory_without_bundle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("keybox.kbox"), [0u8; 128]).unwrap();
        let outcome = checker(StaticRevocationSource::empty())
            .check_path(dir.path())
            .await
            .unwrap();
        assert_eq!(outcome.status(), Some(&BundleStatus::NoBundle));
    }

    #[tokio::test]
    async fn missing_path_is_io_error() {
        let err = checker(StaticRevocationSource::empty())
            .check_path("/nonexistent/bundle.xml")
            .await
            .unwrap_err();
        assert!(matches!(err, KeyboxError::Io { .. }));
    }
}
