pub mod app;
pub mod config;
pub mod input;
pub mod keybinds;
pub mod logging;
pub mod presenter;

pub use config::Config;
pub use presenter::TerminalPresenter;
