use clap::Subcommand;
use deskclock_core::{Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting, e.g. `timer.default_minutes`
    Get {
        /// Dotted key: timer.*, notifications.* or ticker.*
        key: String,
    },
    /// Change one setting and write config.toml
    Set {
        /// Dotted key, e.g. `notifications.timeout_secs`
        key: String,
        /// New value; an empty string clears `notifications.custom_sound`
        value: String,
    },
    /// Print every setting
    List {
        /// Print the file as TOML instead of JSON
        #[arg(long)]
        toml: bool,
    },
    /// Print where config.toml lives
    Path,
    /// Overwrite config.toml with the built-in defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let stored = config.get(&key).unwrap_or_default();
            println!("{key} = {stored}");
        }
        ConfigAction::List { toml } => {
            let config = Config::load()?;
            let rendered = if toml {
                toml::to_string_pretty(&config)?
            } else {
                serde_json::to_string_pretty(&config)?
            };
            println!("{rendered}");
        }
        ConfigAction::Path => {
            println!("{}", Config::file_path()?.display());
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("wrote defaults to {}", Config::file_path()?.display());
        }
    }
    Ok(())
}
