//! Default configuration values

/// Directory under the project root that marks a pinsync project
pub const PROJECT_DIR_NAME: &str = "pinsync";

/// Cache directory under the project directory
pub const CACHE_DIR_NAME: &str = "_cache";

/// Source tree inside the cache directory
pub const CACHE_SRC_DIR_NAME: &str = "src";

/// Pin file name inside the project directory
pub const PINLIST_NAME: &str = "deps.json";

/// Project configuration file name inside the project directory
pub const CONFIG_NAME: &str = "config.toml";

/// Project source tree scanned for the project's own packages
pub const SOURCE_DIR_NAME: &str = "src";

/// Build tool the passthrough path hands off to
pub const BUILD_TOOL: &str = "go";

/// Library search path variable set for the build tool
pub const SEARCH_PATH_VAR: &str = "GOPATH";

/// Build tool subcommands that would bypass pinning
pub const DISABLED_COMMANDS: &[&str] = &["install", "get"];

/// Environment variable overriding the build tool
pub const ENV_BUILD_TOOL: &str = "PINSYNC_BUILD_TOOL";
