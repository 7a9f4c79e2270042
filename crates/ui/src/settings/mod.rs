pub mod state;

pub use state::{ClientSettings, Environment, SettingsError, SettingsResult};
