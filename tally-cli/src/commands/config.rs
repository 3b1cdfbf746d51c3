//! Config command - show and change settings.json

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::get_data_dir;
use tally_core::config::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one setting, e.g. `tally config set editColor #22c55e`
    Set { key: String, value: String },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&data_dir)?;
            let settings = serde_json::json!({
                "defaultViewType": config.default_view_type.as_str(),
                "defaultChartType": config.default_chart_type.as_str(),
                "editColor": config.edit_color,
                "reviewColor": config.review_color,
                "language": config.language,
                "backend": config.backend.as_str(),
                "remote.url": config.remote.url,
                "remote.folder": config.remote.folder,
                "remote.username": config.remote.username,
            });

            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
                return Ok(());
            }

            println!("{}", "Settings".bold());
            if let Some(map) = settings.as_object() {
                for (key, value) in map {
                    let shown = match value {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Null => "-".dimmed().to_string(),
                        other => other.to_string(),
                    };
                    println!("  {:<18} {}", key, shown);
                }
            }
            println!();
            println!("{}", format!("Stored in {}", data_dir.join("settings.json").display()).dimmed());
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(&data_dir)?;
            config.set(&key, &value)?;
            config.save(&data_dir)?;
            println!("{} {} = {}", "✓".green(), key, value.trim());
        }
    }

    Ok(())
}
