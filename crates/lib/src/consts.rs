pub const APP_NAME: &str = "strata";

/// Store directory for immutable packages.
pub const STORE_ENV: &str = "STRATA_STORE";

/// Sandbox (project) directory.
pub const SANDBOX_ENV: &str = "STRATA_SANDBOX";

pub const BUILD_PLATFORM_ENV: &str = "STRATA_BUILD_PLATFORM";

/// Replaces the default `PATH` seed of composed environments.
pub const BASE_PATH_ENV: &str = "STRATA_BASE_PATH";

/// Length of the truncated hash used in content-addressed ids.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Store of mutable packages, relative to the sandbox.
pub const SANDBOX_STORE_DIR: [&str; 2] = ["_strata", "store"];

pub const BUILD_DIR: &str = "b";
pub const INSTALL_DIR: &str = "i";
pub const STAGE_DIR: &str = "s";

pub const DEFAULT_BASE_PATH: &[&str] = &["/usr/local/bin", "/usr/bin", "/bin", "/usr/sbin", "/sbin"];

/// Prefix of the built-in variables describing the package being built.
pub const BUILTIN_PREFIX: &str = "cur__";
