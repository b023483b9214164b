//! External command execution and process environment queries.

pub mod command;
pub mod mock;
pub mod platform;
pub mod probe;

pub use command::{
    elevated_argv, plan_elevation, CancelToken, CommandOutcome, CommandRunner, CommandSpec,
    Elevation, ElevationPlan, ExecContext, ExecError, ProcessRunner, ASKPASS_ENV,
    DEFAULT_TIMEOUT,
};
pub use mock::{MockRunner, RecordedCommand};
pub use platform::{current_username, is_ci, is_elevated, sudo_credentials_cached};
pub use probe::{is_executable, parse_system_path, resolve_tool_path};
