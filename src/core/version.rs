//! Tooling version requirements
//!
//! Before any build work starts the project must depend on a recent enough
//! framework and compiler. The versions are read from the packages installed
//! under the project's `node_modules` directory.

use std::path::{Path, PathBuf};

use semver::{Version, VersionReq};
use serde::Deserialize;
use thiserror::Error;

use crate::config::defaults;

/// Errors related to version checking
#[derive(Error, Debug, PartialEq)]
pub enum VersionError {
    /// Installed version does not satisfy the required constraint
    #[error("Installed {package} version {installed} does not satisfy '{constraint}'. Please update {package} to continue.")]
    VersionMismatch {
        package: String,
        installed: String,
        constraint: String,
    },

    /// Package is not installed in the project
    #[error("You seem to not be depending on \"{package}\" (nothing installed under '{}'). This is an error.", .root.display())]
    PackageMissing { package: String, root: PathBuf },

    /// Invalid version constraint format
    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    /// Invalid version format
    #[error("Invalid version '{version}' for {package}: {reason}")]
    InvalidVersion {
        package: String,
        version: String,
        reason: String,
    },
}

/// Minimum tooling checks run before a build
pub trait VersionGuard: Send + Sync {
    /// Fail if the installed framework is older than required
    fn assert_minimum_framework_version(&self, project_root: &Path) -> Result<(), VersionError>;

    /// Fail if the installed compiler is older than required
    fn assert_minimum_compiler_version(&self, project_root: &Path) -> Result<(), VersionError>;
}

/// A package that must be installed at a minimum version
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRequirement {
    /// Package name as published (e.g. `@angular/core`)
    pub package: String,
    /// Semver constraint the installed version must satisfy
    pub constraint: String,
}

impl PackageRequirement {
    /// Create a new requirement
    pub fn new(package: &str, constraint: &str) -> Self {
        Self {
            package: package.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Check the version installed under `project_root`
    pub fn check(&self, project_root: &Path) -> Result<(), VersionError> {
        let installed = installed_version(project_root, &self.package)?;
        check_version_constraint(&self.package, &installed, &self.constraint)
    }
}

/// Version guard backed by `node_modules/<package>/package.json`
#[derive(Debug, Clone)]
pub struct InstalledPackageGuard {
    framework: PackageRequirement,
    compiler: PackageRequirement,
}

impl InstalledPackageGuard {
    /// Create a guard from explicit requirements
    pub fn new(framework: PackageRequirement, compiler: PackageRequirement) -> Self {
        Self {
            framework,
            compiler,
        }
    }
}

impl Default for InstalledPackageGuard {
    fn default() -> Self {
        Self::new(
            PackageRequirement::new(defaults::FRAMEWORK_PACKAGE, defaults::FRAMEWORK_CONSTRAINT),
            PackageRequirement::new(defaults::COMPILER_PACKAGE, defaults::COMPILER_CONSTRAINT),
        )
    }
}

impl VersionGuard for InstalledPackageGuard {
    fn assert_minimum_framework_version(&self, project_root: &Path) -> Result<(), VersionError> {
        self.framework.check(project_root)
    }

    fn assert_minimum_compiler_version(&self, project_root: &Path) -> Result<(), VersionError> {
        self.compiler.check(project_root)
    }
}

#[derive(Deserialize)]
struct PackageJson {
    version: Option<String>,
}

/// Read the installed version of `package` from the project's `node_modules`
pub fn installed_version(project_root: &Path, package: &str) -> Result<String, VersionError> {
    let manifest_path = project_root
        .join("node_modules")
        .join(package)
        .join("package.json");

    let missing = || VersionError::PackageMissing {
        package: package.to_string(),
        root: project_root.to_path_buf(),
    };

    let content = std::fs::read_to_string(&manifest_path).map_err(|_| missing())?;
    let manifest: PackageJson = serde_json::from_str(&content).map_err(|e| {
        VersionError::InvalidVersion {
            package: package.to_string(),
            version: "<unreadable package.json>".to_string(),
            reason: e.to_string(),
        }
    })?;

    manifest.version.ok_or_else(missing)
}

/// Check if a version satisfies a constraint
///
/// Prerelease tags are stripped before matching, so a release candidate of a
/// new major counts as that major.
pub fn check_version_constraint(
    package: &str,
    version: &str,
    constraint: &str,
) -> Result<(), VersionError> {
    let mut parsed_version =
        Version::parse(version.trim()).map_err(|e| VersionError::InvalidVersion {
            package: package.to_string(),
            version: version.to_string(),
            reason: e.to_string(),
        })?;
    parsed_version.pre = semver::Prerelease::EMPTY;
    parsed_version.build = semver::BuildMetadata::EMPTY;

    let version_req = parse_constraint(constraint)?;

    if version_req.matches(&parsed_version) {
        Ok(())
    } else {
        Err(VersionError::VersionMismatch {
            package: package.to_string(),
            installed: version.to_string(),
            constraint: constraint.to_string(),
        })
    }
}

/// Parse and validate a semver version constraint
pub fn parse_constraint(constraint: &str) -> Result<VersionReq, VersionError> {
    VersionReq::parse(constraint).map_err(|e| VersionError::InvalidConstraint {
        constraint: constraint.to_string(),
        reason: e.to_string(),
    })
}
