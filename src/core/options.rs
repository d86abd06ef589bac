//! Build options
//!
//! The flat option record handed to every build task. Parsing and defaulting
//! happen in the CLI layer; the core only normalizes the deploy URL and
//! derives the per-stage copies.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::selector::AppSelector;

/// Build target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Development build
    #[default]
    Development,
    /// Production build
    Production,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!(
                "invalid target '{other}': must be one of development, production"
            )),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Which emitted files get a content hash in their name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputHashing {
    None,
    All,
    Media,
    Bundles,
}

impl FromStr for OutputHashing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "all" => Ok(Self::All),
            "media" => Ok(Self::Media),
            "bundles" => Ok(Self::Bundles),
            other => Err(format!(
                "invalid output hashing '{other}': must be one of none, all, media, bundles"
            )),
        }
    }
}

/// Build parameters for one run
///
/// `None` means "not set by the caller"; the build task applies its own
/// default in that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    pub target: Target,
    pub environment: Option<String>,
    pub output_path: Option<PathBuf>,
    /// Ahead-of-time compilation; unset is distinct from `false`
    pub aot: Option<bool>,
    pub sourcemaps: Option<bool>,
    pub vendor_chunk: Option<bool>,
    pub common_chunk: Option<bool>,
    pub base_href: Option<String>,
    pub deploy_url: Option<String>,
    pub verbose: bool,
    pub progress: Option<bool>,
    pub i18n_file: Option<String>,
    pub i18n_format: Option<String>,
    pub locale: Option<String>,
    pub missing_translation: Option<String>,
    pub extract_css: Option<bool>,
    pub output_hashing: Option<OutputHashing>,
    /// Application selector; unset selects the first application
    pub app: Option<AppSelector>,
    pub delete_output_path: Option<bool>,
    pub preserve_symlinks: Option<bool>,
    pub extract_licenses: Option<bool>,
    pub show_circular_dependencies: Option<bool>,
    pub build_optimizer: Option<bool>,
    pub named_chunks: Option<bool>,
    pub subresource_integrity: Option<bool>,
    pub service_worker: Option<bool>,
    pub skip_app_shell: bool,
    pub bundle_dependencies: Option<String>,
    pub stats_json: bool,
    pub fork_type_checker: Option<bool>,
}

impl BuildOptions {
    /// Create options for a target with everything else unset
    pub fn new(target: Target) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Return these options with the deploy URL normalized
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.deploy_url = self.deploy_url.map(normalize_deploy_url);
        self
    }

    /// Copy of these options targeting a different application
    ///
    /// Every other field, including the normalized deploy URL, is unchanged.
    #[must_use]
    pub fn for_app(&self, app: AppSelector) -> Self {
        Self {
            app: Some(app),
            ..self.clone()
        }
    }

    /// Whether a declared app shell should be rendered for these options
    ///
    /// AOT left unset counts as enabled here, even though the build task may
    /// treat an unset AOT flag as disabled.
    pub fn shell_eligible(&self) -> bool {
        self.target == Target::Production && self.aot != Some(false) && !self.skip_app_shell
    }

    /// Fill unset fields from project-level defaults
    #[must_use]
    pub fn with_defaults(mut self, defaults: &BuildDefaults) -> Self {
        fill(&mut self.sourcemaps, defaults.sourcemaps);
        fill(&mut self.output_hashing, defaults.output_hashing);
        fill(&mut self.base_href, defaults.base_href.clone());
        fill(&mut self.deploy_url, defaults.deploy_url.clone());
        fill(&mut self.progress, defaults.progress);
        fill(&mut self.delete_output_path, defaults.delete_output_path);
        fill(&mut self.preserve_symlinks, defaults.preserve_symlinks);
        fill(&mut self.common_chunk, defaults.common_chunk);
        fill(&mut self.named_chunks, defaults.named_chunks);
        fill(
            &mut self.show_circular_dependencies,
            defaults.show_circular_dependencies,
        );
        self
    }
}

fn fill<T>(slot: &mut Option<T>, default: Option<T>) {
    if slot.is_none() {
        *slot = default;
    }
}

/// Project-level defaults for build flags (`[defaults.build]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildDefaults {
    pub sourcemaps: Option<bool>,
    pub output_hashing: Option<OutputHashing>,
    pub base_href: Option<String>,
    pub deploy_url: Option<String>,
    pub progress: Option<bool>,
    pub delete_output_path: Option<bool>,
    pub preserve_symlinks: Option<bool>,
    pub common_chunk: Option<bool>,
    pub named_chunks: Option<bool>,
    pub show_circular_dependencies: Option<bool>,
}

/// Append a trailing `/` to a deploy URL that lacks one
///
/// Build tasks concatenate the deploy URL directly with relative asset
/// paths. An empty URL keeps those paths relative and is left empty.
/// Idempotent.
pub fn normalize_deploy_url(mut url: String) -> String {
    if !url.is_empty() && !url.ends_with('/') {
        url.push('/');
    }
    url
}
