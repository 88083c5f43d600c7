mod path_processing;
pub mod settings;

pub use path_processing::expand_tilde;
pub use settings::{Settings, SettingsError, default_log_path, default_settings_path};
