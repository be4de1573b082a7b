mod settings;

pub use settings::{
    Command, Config, ScanSettings, SessionSettings, Settings, ShellSetting, WatchSettings,
};
