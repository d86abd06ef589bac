//! Default configuration values

/// Workspace configuration file name
pub const WORKSPACE_FILE: &str = "appshell.toml";

/// Default source root of an application
pub const DEFAULT_APP_ROOT: &str = "src";

/// Default output directory of an application
pub const DEFAULT_OUT_DIR: &str = "dist";

/// Default index document of an application
pub const DEFAULT_INDEX: &str = "index.html";

/// Framework package whose installed version is checked before building
pub const FRAMEWORK_PACKAGE: &str = "@angular/core";

/// Minimum framework version
pub const FRAMEWORK_CONSTRAINT: &str = ">=2.3.1";

/// Compiler package whose installed version is checked before building
pub const COMPILER_PACKAGE: &str = "typescript";

/// Minimum compiler version
pub const COMPILER_CONSTRAINT: &str = ">=2.0.2";

/// Environment variable carrying the JSON-encoded build options
pub const BUILD_OPTIONS_ENV: &str = "APPSHELL_BUILD_OPTIONS";

/// Environment variables carrying the render inputs
pub const RENDER_INPUT_INDEX_ENV: &str = "APPSHELL_INPUT_INDEX";
pub const RENDER_ROUTE_ENV: &str = "APPSHELL_ROUTE";
pub const RENDER_SERVER_OUT_DIR_ENV: &str = "APPSHELL_SERVER_OUT_DIR";
pub const RENDER_OUTPUT_INDEX_ENV: &str = "APPSHELL_OUTPUT_INDEX";

/// Number of trailing stderr lines kept in task failure messages
pub const STDERR_TAIL_LINES: usize = 20;

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
