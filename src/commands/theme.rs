use std::sync::Arc;

use colored::Colorize;

use crate::cli::ThemeCommand;
use crate::config::Config;
use crate::error::Result;
use crate::storage::LocalStore;
use crate::theme::{Theme, ThemeStore};

/// Handle theme commands
pub fn handle_theme(config: &Config, command: ThemeCommand) -> Result<()> {
    let store = Arc::new(LocalStore::open_default(config)?);
    let themes = ThemeStore::new(store);

    let theme = match command {
        ThemeCommand::Show => themes.load()?,
        ThemeCommand::Toggle => themes.toggle()?,
        ThemeCommand::Set { theme } => {
            let theme: Theme = theme.parse()?;
            themes.set(theme)?;
            theme
        }
    };

    println!("Theme: {}", theme.to_string().cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());
        config
    }

    #[test]
    fn test_set_then_show() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let config = config_in(&dir);
        handle_theme(&config, ThemeCommand::Set { theme: "light".into() }).unwrap();

        let store = Arc::new(LocalStore::open_default(&config).unwrap());
        assert_eq!(ThemeStore::new(store).load().unwrap(), Theme::Light);
    }

    #[test]
    fn test_set_rejects_unknown_theme() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let config = config_in(&dir);
        assert!(handle_theme(&config, ThemeCommand::Set { theme: "neon".into() }).is_err());
    }
}
