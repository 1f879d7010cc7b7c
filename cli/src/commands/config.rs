//! Config commands

use crate::config::Config;
use crate::ConfigCommands;

pub async fn handle(action: ConfigCommands, profile: Option<&str>) -> Result<(), String> {
    match action {
        ConfigCommands::Init => {
            let path = Config::config_path(profile)?;
            Config::default().save(profile)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(profile).unwrap_or_default();
            config.set(&key, value)?;
            config.save(profile)?;
            println!("Set {} successfully", key);
        }
        ConfigCommands::Get { key } => {
            let config = Config::load(profile).unwrap_or_default();
            let value = config.get(&key)?;
            println!("{}: {}", key, value.unwrap_or("(not set)"));
        }
        ConfigCommands::List => {
            let config = Config::load(profile).unwrap_or_default();
            for key in Config::KEYS {
                println!("{}: {}", key, config.get(key)?.unwrap_or("(not set)"));
            }
        }
    }
    Ok(())
}
