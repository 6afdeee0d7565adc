use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use std::fs;
use std::path::Path;
use tracing::info;

use storefront_application::error::{AppError, AppResult};
use storefront_application::infrastructure_config::Config;

const ENV_PREFIX: &str = "STOREFRONT_";

pub fn load_config() -> AppResult<Config> {
    generate_env_template_if_missing(Path::new("."))?;
    dotenvy::dotenv().ok();

    let config: Config = layered_figment(Path::new("."))
        .extract()
        .map_err(|e| AppError::ConfigError {
            message: format!("Failed to load configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}

fn layered_figment(dir: &Path) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    let toml_file = dir.join("config.toml");
    if toml_file.exists() {
        figment = figment.merge(Toml::file(toml_file));
    }

    let json_file = dir.join("config.json");
    if json_file.exists() {
        figment = figment.merge(Json::file(json_file));
    }

    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

fn generate_env_template_if_missing(dir: &Path) -> AppResult<()> {
    let env_file = dir.join(".env");
    let template_file = dir.join(".env.example");

    if env_file.exists() || !template_file.exists() {
        return Ok(());
    }

    fs::copy(&template_file, &env_file).map_err(|e| AppError::ConfigError {
        message: format!("Failed to generate .env file from template: {e}"),
    })?;

    info!("Generated .env from template. Set the provider URL and anon key before signing in.");

    Ok(())
}
