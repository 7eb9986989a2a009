pub mod browser;
pub mod college;
pub mod compare;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod session;
pub mod source;
pub mod stderr_buffer;
pub mod tui;
