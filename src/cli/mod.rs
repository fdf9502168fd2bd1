pub mod config_cmd;
pub mod files_cmd;
pub mod output;
pub mod renderer;
pub mod show_cmd;
pub mod watch_cmd;
