pub mod capture_source;
pub mod host_manager;
pub mod remote_shell;
