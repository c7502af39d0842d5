//! Terraform installer handler
//!
//! Installs and tests versioned Terraform binaries from HashiCorp's release
//! site. This is the reference implementation of the
//! [`DependencyHandler`](crate::handler::DependencyHandler) contract the
//! dispatcher relies on: version-pinned, idempotent, and side-effect only.
//!
//! # Record fields used
//!
//! - `version` (required): exact semantic version to install, e.g. `"1.2.0"`
//! - `target` (optional): extraction directory; defaults to a per-user data
//!   directory
//! - `source` (optional): explicit download URL, overriding the computed
//!   HashiCorp release URL
//! - `add_to_path` (optional): prepend the target directory to `PATH`
//!
//! # Accepted parameters
//!
//! - `architecture`: artifact architecture, default `"amd64"`
//!
//! # Behavior
//!
//! The handler probes the search path for an existing `terraform` executable
//! and parses its reported version. Installation is needed when no executable
//! is found or its version differs from the requested one; `Test` returns the
//! negation of that. `Install` downloads
//! `terraform_<version>_<os>_<arch>.zip` to the system temp directory
//! (skipping the download when the artifact is already cached there),
//! extracts it into the target directory, and optionally prepends the target
//! to `PATH`. Installing an already-satisfied dependency is a no-op.
//!
//! Import has no meaning for a binary install and keeps the trait's default
//! rejection.

use crate::core::{DependError, Result};
use crate::handler::{ACTION_PARAMETER, DependencyHandler, InvocationParameters};
use crate::models::DependencyRecord;
use crate::utils::platform::{ensure_dir, hashicorp_os, prepend_to_path};
use regex::Regex;
use semver::Version;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Default artifact architecture when the record supplies none
pub const DEFAULT_ARCHITECTURE: &str = "amd64";

/// Base URL of HashiCorp's Terraform releases
const RELEASES_BASE: &str = "https://releases.hashicorp.com/terraform";

/// Probe used to discover the currently installed Terraform version
///
/// `Ok(None)` means "not installed". Injectable so the install/test decision
/// logic is exercisable without a terraform binary on the machine.
type VersionProbe = Box<dyn Fn() -> Result<Option<Version>> + Send + Sync>;

/// Handler for the `Terraform` dependency type
///
/// # Examples
///
/// ```rust,no_run
/// use depend::dispatch::Dispatcher;
/// use depend::models::DependencyRecord;
/// use depend::registry::HandlerRegistry;
///
/// let mut record = DependencyRecord::new("terraform", "Terraform");
/// record.version = Some("1.2.0".to_string());
/// record.add_to_path = true;
///
/// let dispatcher = Dispatcher::new(HandlerRegistry::with_defaults());
/// let report = dispatcher.install(&[record]);
/// assert!(!report.has_failures());
/// ```
pub struct TerraformHandler {
    probe: VersionProbe,
}

impl Default for TerraformHandler {
    fn default() -> Self {
        Self {
            probe: Box::new(probe_installed_version),
        }
    }
}

impl TerraformHandler {
    /// A handler with a custom installed-version probe
    ///
    /// Used by tests to simulate machines with or without an existing
    /// installation.
    #[must_use]
    pub fn with_probe(
        probe: impl Fn() -> Result<Option<Version>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            probe: Box::new(probe),
        }
    }

    /// Parse and validate the record's requested version
    fn requested_version(dep: &DependencyRecord) -> Result<Version> {
        let raw = dep.version.as_deref().unwrap_or_default();
        Version::parse(raw).map_err(|source| DependError::InvalidVersion {
            name: dep.name.clone(),
            version: raw.to_string(),
            source,
        })
    }

    /// Whether an install is needed for the requested version
    fn needs_install(&self, requested: &Version) -> Result<bool> {
        match (self.probe)()? {
            Some(installed) if installed == *requested => {
                debug!(%installed, "terraform already at requested version");
                Ok(false)
            }
            Some(installed) => {
                debug!(%installed, %requested, "installed terraform version differs");
                Ok(true)
            }
            None => {
                debug!("no terraform installation found on PATH");
                Ok(true)
            }
        }
    }
}

impl DependencyHandler for TerraformHandler {
    fn accepted_parameters(&self) -> &'static [&'static str] {
        &[ACTION_PARAMETER, "architecture"]
    }

    fn install(&self, dep: &DependencyRecord, params: &InvocationParameters) -> Result<()> {
        let requested = Self::requested_version(dep)?;
        if !self.needs_install(&requested)? {
            info!(dependency = %dep.name, version = %requested, "already satisfied, skipping");
            return Ok(());
        }

        let architecture = params.str_param("architecture").unwrap_or(DEFAULT_ARCHITECTURE);
        let artifact = artifact_name(&requested, architecture);
        let url = download_url(&requested, dep.source.as_deref(), &artifact);

        let archive = std::env::temp_dir().join(&artifact);
        if archive.exists() {
            debug!(archive = %archive.display(), "artifact already downloaded, skipping");
        } else {
            download(&url, &archive)?;
        }

        let target = dep
            .target
            .clone()
            .unwrap_or_else(default_target);
        ensure_dir(&target)?;
        extract_zip(&archive, &target)?;
        info!(
            dependency = %dep.name,
            version = %requested,
            target = %target.display(),
            "installed terraform"
        );

        if dep.add_to_path {
            prepend_to_path(&target)?;
        }
        Ok(())
    }

    fn test(&self, dep: &DependencyRecord, _params: &InvocationParameters) -> Result<bool> {
        let requested = Self::requested_version(dep)?;
        Ok(!self.needs_install(&requested)?)
    }
}

/// Release artifact file name: `terraform_<version>_<os>_<arch>.zip`
#[must_use]
pub fn artifact_name(version: &Version, architecture: &str) -> String {
    format!("terraform_{version}_{}_{architecture}.zip", hashicorp_os())
}

/// Download URL: an explicit source overrides the computed release URL
#[must_use]
pub fn download_url(version: &Version, source: Option<&str>, artifact: &str) -> String {
    source.map_or_else(
        || format!("{RELEASES_BASE}/{version}/{artifact}"),
        ToString::to_string,
    )
}

/// Probe the search path for an installed terraform and parse its version
///
/// A missing executable yields `Ok(None)`. An executable whose version output
/// cannot be obtained or parsed yields [`DependError::ProbeFailed`].
fn probe_installed_version() -> Result<Option<Version>> {
    let Ok(executable) = which::which("terraform") else {
        return Ok(None);
    };
    let output = Command::new(&executable).arg("version").output().map_err(|e| {
        DependError::ProbeFailed {
            tool: "terraform".to_string(),
            reason: format!("cannot run {}: {e}", executable.display()),
        }
    })?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version_output(&stdout).map(Some)
}

/// Extract `X.Y.Z[-pre]` from `terraform version` output
///
/// The first line reads `Terraform vX.Y.Z` (older releases append platform
/// details on later lines, which are ignored).
fn parse_version_output(output: &str) -> Result<Version> {
    // Panic-free: the pattern is a compile-time constant
    let pattern = Regex::new(r"Terraform v(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)")
        .map_err(|e| DependError::ProbeFailed {
            tool: "terraform".to_string(),
            reason: e.to_string(),
        })?;
    let captured = pattern
        .captures(output)
        .and_then(|c| c.get(1))
        .ok_or_else(|| DependError::ProbeFailed {
            tool: "terraform".to_string(),
            reason: format!("unrecognized version output: {}", output.lines().next().unwrap_or("")),
        })?;
    Version::parse(captured.as_str()).map_err(|e| DependError::ProbeFailed {
        tool: "terraform".to_string(),
        reason: format!("cannot parse version '{}': {e}", captured.as_str()),
    })
}

/// Default extraction target when the record supplies none
fn default_target() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("depend")
        .join("terraform")
}

/// Download a release artifact to the given path
fn download(url: &str, destination: &Path) -> Result<()> {
    info!(%url, destination = %destination.display(), "downloading");
    let response = reqwest::blocking::get(url).map_err(|e| DependError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !response.status().is_success() {
        return Err(DependError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP status {}", response.status()),
        });
    }
    let bytes = response.bytes().map_err(|e| DependError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    // Write then atomically move into place so an interrupted download never
    // poisons the artifact cache.
    let mut temp = tempfile::NamedTempFile::new_in(
        destination.parent().unwrap_or_else(|| Path::new(".")),
    )?;
    temp.write_all(&bytes)?;
    temp.persist(destination).map_err(|e| {
        warn!(destination = %destination.display(), "failed to persist download");
        DependError::IoError(e.error)
    })?;
    Ok(())
}

/// Extract a zip archive into the target directory
fn extract_zip(archive: &Path, target: &Path) -> Result<()> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|source| DependError::ExtractionFailed {
        archive: archive.to_path_buf(),
        source,
    })?;
    zip.extract(target).map_err(|source| DependError::ExtractionFailed {
        archive: archive.to_path_buf(),
        source,
    })?;
    debug!(archive = %archive.display(), target = %target.display(), "extracted archive");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionVerb;

    fn terraform_record(version: &str) -> DependencyRecord {
        let mut record = DependencyRecord::new("terraform", "Terraform");
        record.version = Some(version.to_string());
        record
    }

    fn params_for(record: &DependencyRecord, handler: &TerraformHandler) -> InvocationParameters {
        InvocationParameters::filtered(record, handler.accepted_parameters(), ActionVerb::Test)
    }

    #[test]
    fn test_artifact_and_url_naming() {
        let version = Version::parse("1.2.0").unwrap();
        let artifact = artifact_name(&version, "amd64");
        assert_eq!(artifact, format!("terraform_1.2.0_{}_amd64.zip", hashicorp_os()));

        let url = download_url(&version, None, &artifact);
        assert_eq!(
            url,
            format!("https://releases.hashicorp.com/terraform/1.2.0/{artifact}")
        );
    }

    #[test]
    fn test_explicit_source_overrides_release_url() {
        let version = Version::parse("1.2.0").unwrap();
        let url = download_url(
            &version,
            Some("https://mirror.internal/terraform.zip"),
            "terraform_1.2.0_linux_amd64.zip",
        );
        assert_eq!(url, "https://mirror.internal/terraform.zip");
    }

    #[test]
    fn test_parse_version_output_variants() {
        let version = parse_version_output("Terraform v1.2.0\non linux_amd64").unwrap();
        assert_eq!(version, Version::parse("1.2.0").unwrap());

        let prerelease = parse_version_output("Terraform v1.3.0-beta1").unwrap();
        assert_eq!(prerelease, Version::parse("1.3.0-beta1").unwrap());

        assert!(parse_version_output("no terraform here").is_err());
    }

    #[test]
    fn test_invalid_requested_version_is_fatal_for_the_dependency() {
        let handler = TerraformHandler::with_probe(|| Ok(None));
        let record = terraform_record("not-a-version");
        let params = params_for(&record, &handler);

        let err = handler.test(&record, &params).unwrap_err();
        assert!(matches!(err, DependError::InvalidVersion { .. }));
    }

    #[test]
    fn test_missing_version_is_rejected() {
        let handler = TerraformHandler::with_probe(|| Ok(None));
        let record = DependencyRecord::new("terraform", "Terraform");
        let params = params_for(&record, &handler);
        assert!(handler.test(&record, &params).is_err());
    }

    #[test]
    fn test_not_installed_means_unsatisfied() {
        let handler = TerraformHandler::with_probe(|| Ok(None));
        let record = terraform_record("1.2.0");
        let params = params_for(&record, &handler);
        assert!(!handler.test(&record, &params).unwrap());
    }

    #[test]
    fn test_matching_installed_version_is_satisfied() {
        let handler =
            TerraformHandler::with_probe(|| Ok(Some(Version::parse("1.2.0").unwrap())));
        let record = terraform_record("1.2.0");
        let params = params_for(&record, &handler);
        assert!(handler.test(&record, &params).unwrap());
    }

    #[test]
    fn test_version_mismatch_is_unsatisfied() {
        let handler =
            TerraformHandler::with_probe(|| Ok(Some(Version::parse("1.1.9").unwrap())));
        let record = terraform_record("1.2.0");
        let params = params_for(&record, &handler);
        assert!(!handler.test(&record, &params).unwrap());
    }

    #[test]
    fn test_install_is_a_no_op_when_satisfied() {
        // Repeated installs against a satisfying installation never download;
        // both calls succeed without touching the network.
        let handler =
            TerraformHandler::with_probe(|| Ok(Some(Version::parse("1.2.0").unwrap())));
        let record = terraform_record("1.2.0");
        let params = params_for(&record, &handler);

        handler.install(&record, &params).unwrap();
        handler.install(&record, &params).unwrap();
    }

    #[test]
    fn test_import_is_rejected() {
        let handler = TerraformHandler::with_probe(|| Ok(None));
        let record = terraform_record("1.2.0");
        let params = params_for(&record, &handler);

        let err = handler.import(&record, &params).unwrap_err();
        assert!(matches!(err, DependError::UnsupportedAction { .. }));
    }

    #[test]
    fn test_extract_zip_unpacks_binary() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("terraform_1.2.0_linux_amd64.zip");

        // Build a minimal archive standing in for a release artifact
        let file = std::fs::File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("terraform", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"#!/bin/sh\n").unwrap();
        writer.finish().unwrap();

        let target = dir.path().join("bin");
        ensure_dir(&target).unwrap();
        extract_zip(&archive_path, &target).unwrap();
        assert!(target.join("terraform").is_file());
    }
}
