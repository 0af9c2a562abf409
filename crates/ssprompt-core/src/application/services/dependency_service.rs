//! Dependency Service - package index queries and installation.
//!
//! Decides whether a declared dependency is already satisfied, picks the
//! version to install from the index, and drives the installer.

use std::fmt;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    application::ports::{PackageIndex, PackageInstaller, PackageVersions},
    domain::{DependencySpec, DomainValidator},
    error::SspromptResult,
};

/// What happened to one dependency during [`DependencyService::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOutcome {
    /// Already installed at a compatible version.
    Satisfied { installed: String },
    /// Installed during this run.
    Installed { version: String },
    /// No compatible version could be determined.
    Unresolvable { reason: String },
    /// The installer failed.
    InstallFailed { version: String },
}

impl DependencyOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Satisfied { .. } | Self::Installed { .. })
    }
}

impl fmt::Display for DependencyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfied { installed } => write!(f, "satisfied ({installed})"),
            Self::Installed { version } => write!(f, "installed {version}"),
            Self::Unresolvable { reason } => write!(f, "unresolvable: {reason}"),
            Self::InstallFailed { version } => write!(f, "install of {version} failed"),
        }
    }
}

/// Per-dependency outcomes, in input order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DependencyReport {
    pub entries: Vec<(DependencySpec, DependencyOutcome)>,
}

impl DependencyReport {
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, outcome)| outcome.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &(DependencySpec, DependencyOutcome)> {
        self.entries.iter().filter(|(_, outcome)| !outcome.is_ok())
    }
}

/// Installed state of a dependency, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStatus {
    pub spec: DependencySpec,
    pub installed: Option<String>,
    pub satisfied: bool,
}

/// Service for package queries and installs.
pub struct DependencyService {
    index: Box<dyn PackageIndex>,
    installer: Box<dyn PackageInstaller>,
}

impl DependencyService {
    pub fn new(index: Box<dyn PackageIndex>, installer: Box<dyn PackageInstaller>) -> Self {
        Self { index, installer }
    }

    /// Whether the index knows `name` (at `version`, if given).
    ///
    /// Only a definitive "not found" yields `false`; when the index can't
    /// be asked, the package is assumed to exist.
    pub fn package_exists(&self, name: &str, version: Option<&str>) -> bool {
        match self.index.package_exists(name, version) {
            Ok(exists) => exists,
            Err(e) => {
                warn!(package = name, error = %e, "index unreachable, assuming package exists");
                true
            }
        }
    }

    /// Installed version of `name`, or `None`.
    ///
    /// An installer that cannot be queried counts as "not installed".
    pub fn installed_version(&self, name: &str) -> Option<String> {
        match self.installer.installed_version(name) {
            Ok(version) => version,
            Err(e) => {
                warn!(package = name, error = %e, "could not query installed version");
                None
            }
        }
    }

    /// Whether `name` is installed, and compatible with `constraint` when
    /// one is given. Errors only on a malformed constraint.
    pub fn is_installed(&self, name: &str, constraint: Option<&str>) -> SspromptResult<bool> {
        let constraint = constraint
            .map(DomainValidator::validate_constraint)
            .transpose()?;
        let Some(installed) = self.installed_version(name) else {
            return Ok(false);
        };
        Ok(constraint.is_none_or(|c| c.matches(&installed)))
    }

    /// Latest and all published versions of `name`.
    pub fn available_versions(&self, name: &str) -> SspromptResult<PackageVersions> {
        self.index.available_versions(name)
    }

    /// Install `name`, pinned to `version` when given. Failures are
    /// logged and reported as `false`.
    #[instrument(skip(self))]
    pub fn install(&self, name: &str, version: Option<&str>) -> bool {
        match self.installer.install(name, version) {
            Ok(()) => {
                info!("Installed {}", display_pin(name, version));
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to install {}", display_pin(name, version));
                false
            }
        }
    }

    /// Installed state of each spec, without touching the network.
    pub fn status(&self, specs: &[DependencySpec]) -> SspromptResult<Vec<DependencyStatus>> {
        specs
            .iter()
            .map(|spec| {
                let constraint = spec.version_constraint()?;
                let installed = self.installed_version(spec.package());
                let satisfied = installed.as_deref().is_some_and(|v| constraint.matches(v));
                Ok(DependencyStatus {
                    spec: spec.clone(),
                    installed,
                    satisfied,
                })
            })
            .collect()
    }

    /// Make every spec satisfied, installing where needed.
    ///
    /// Each spec is handled independently; one failure does not stop the
    /// rest.
    #[instrument(skip_all, fields(count = specs.len()))]
    pub fn ensure(&self, specs: &[DependencySpec]) -> DependencyReport {
        let entries = specs
            .iter()
            .map(|spec| (spec.clone(), self.ensure_one(spec)))
            .collect();
        DependencyReport { entries }
    }

    fn ensure_one(&self, spec: &DependencySpec) -> DependencyOutcome {
        let name = spec.package();
        let constraint = match spec.version_constraint() {
            Ok(c) => c,
            Err(e) => {
                return DependencyOutcome::Unresolvable {
                    reason: e.to_string(),
                };
            }
        };

        if let Some(installed) = self.installed_version(name) {
            if constraint.matches(&installed) {
                debug!(package = name, %installed, "already satisfied");
                return DependencyOutcome::Satisfied { installed };
            }
            info!(package = name, %installed, wanted = %constraint, "installed version incompatible");
        }

        if !self.package_exists(name, None) {
            return DependencyOutcome::Unresolvable {
                reason: format!("package '{name}' not found on the index"),
            };
        }

        let versions = match self.available_versions(name) {
            Ok(v) => v,
            Err(e) => {
                return DependencyOutcome::Unresolvable {
                    reason: e.to_string(),
                };
            }
        };

        let Some(version) = constraint.select(&versions.all, &versions.latest) else {
            return DependencyOutcome::Unresolvable {
                reason: format!("no published version of '{name}' matches {constraint}"),
            };
        };

        if self.install(name, Some(&version)) {
            DependencyOutcome::Installed { version }
        } else {
            DependencyOutcome::InstallFailed { version }
        }
    }
}

fn display_pin(name: &str, version: Option<&str>) -> String {
    match version {
        Some(v) => format!("{name}=={v}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        ApplicationError,
        ports::{MockPackageIndex, MockPackageInstaller},
    };

    fn versions() -> PackageVersions {
        PackageVersions {
            latest: "0.1.0".into(),
            all: vec![
                "0.0.265".into(),
                "0.0.266".into(),
                "0.0.267".into(),
                "0.1.0".into(),
            ],
        }
    }

    #[test]
    fn index_failure_is_optimistic() {
        let mut index = MockPackageIndex::new();
        index
            .expect_package_exists()
            .returning(|_, _| Err(ApplicationError::transport("pypi", None, "timeout").into()));
        let svc = DependencyService::new(Box::new(index), Box::new(MockPackageInstaller::new()));
        assert!(svc.package_exists("langchain", None));
    }

    #[test]
    fn definitive_not_found_is_false() {
        let mut index = MockPackageIndex::new();
        index.expect_package_exists().returning(|_, _| Ok(false));
        let svc = DependencyService::new(Box::new(index), Box::new(MockPackageInstaller::new()));
        assert!(!svc.package_exists("no-such-pkg", Some("1.0")));
    }

    #[test]
    fn is_installed_checks_constraint() {
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_installed_version()
            .returning(|_| Ok(Some("0.0.266".into())));
        let svc = DependencyService::new(Box::new(MockPackageIndex::new()), Box::new(installer));

        assert!(svc.is_installed("langchain", None).unwrap());
        assert!(svc.is_installed("langchain", Some("^0.0.200")).unwrap());
        assert!(!svc.is_installed("langchain", Some("~0.1.0")).unwrap());
        assert!(svc.is_installed("langchain", Some("^^")).is_err());
    }

    #[test]
    fn satisfied_dependency_is_not_reinstalled() {
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_installed_version()
            .returning(|_| Ok(Some("0.0.266".into())));
        installer.expect_install().never();
        let mut index = MockPackageIndex::new();
        index.expect_package_exists().never();

        let svc = DependencyService::new(Box::new(index), Box::new(installer));
        let report = svc.ensure(&[DependencySpec::new("langchain", "^0.0.266")]);

        assert!(report.is_complete());
        assert_eq!(
            report.entries[0].1,
            DependencyOutcome::Satisfied {
                installed: "0.0.266".into()
            }
        );
    }

    #[test]
    fn installs_first_compatible_version() {
        let mut installer = MockPackageInstaller::new();
        installer.expect_installed_version().returning(|_| Ok(None));
        installer
            .expect_install()
            .withf(|name, version| name == "langchain" && *version == Some("0.0.266"))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut index = MockPackageIndex::new();
        index.expect_package_exists().returning(|_, _| Ok(true));
        index
            .expect_available_versions()
            .returning(|_| Ok(versions()));

        let svc = DependencyService::new(Box::new(index), Box::new(installer));
        let report = svc.ensure(&[DependencySpec::new("langchain", "^0.0.266")]);

        assert_eq!(
            report.entries[0].1,
            DependencyOutcome::Installed {
                version: "0.0.266".into()
            }
        );
    }

    #[test]
    fn latest_installs_index_latest() {
        let mut installer = MockPackageInstaller::new();
        installer.expect_installed_version().returning(|_| Ok(None));
        installer
            .expect_install()
            .withf(|_, version| *version == Some("0.1.0"))
            .returning(|_, _| Ok(()));
        let mut index = MockPackageIndex::new();
        index.expect_package_exists().returning(|_, _| Ok(true));
        index
            .expect_available_versions()
            .returning(|_| Ok(versions()));

        let svc = DependencyService::new(Box::new(index), Box::new(installer));
        let report = svc.ensure(&[DependencySpec::new("langchain", "latest")]);
        assert!(report.is_complete());
    }

    #[test]
    fn failures_do_not_stop_other_specs() {
        let mut installer = MockPackageInstaller::new();
        installer.expect_installed_version().returning(|_| Ok(None));
        installer.expect_install().returning(|name, _| {
            if name == "broken" {
                Err(ApplicationError::InstallFailed {
                    package: name.into(),
                    reason: "exit status 1".into(),
                }
                .into())
            } else {
                Ok(())
            }
        });
        let mut index = MockPackageIndex::new();
        index
            .expect_package_exists()
            .returning(|name, _| Ok(name != "ghost"));
        index
            .expect_available_versions()
            .returning(|_| Ok(versions()));

        let svc = DependencyService::new(Box::new(index), Box::new(installer));
        let report = svc.ensure(&[
            DependencySpec::new("ghost", "latest"),
            DependencySpec::new("broken", "latest"),
            DependencySpec::new("fine", "~0.0.267"),
            DependencySpec::new("nomatch", "^2.0"),
        ]);

        let outcomes: Vec<_> = report.entries.iter().map(|(_, o)| o.clone()).collect();
        assert!(matches!(outcomes[0], DependencyOutcome::Unresolvable { .. }));
        assert!(matches!(outcomes[1], DependencyOutcome::InstallFailed { .. }));
        assert_eq!(
            outcomes[2],
            DependencyOutcome::Installed {
                version: "0.0.267".into()
            }
        );
        assert!(matches!(outcomes[3], DependencyOutcome::Unresolvable { .. }));
        assert_eq!(report.failures().count(), 3);
    }
}
