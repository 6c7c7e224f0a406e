use crate::error::{ErrorKind, Result};
use crate::settings::{Config, project_dirs};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "BESTPUB_";
const FILE_STEM: &str = "bestpub";

/// Config files picked up from the platform config directory, in merge order.
pub fn default_files() -> Vec<PathBuf> {
    match project_dirs() {
        Some(dirs) => ["toml", "yaml", "json"].iter().map(|ext| dirs.config_dir().join(format!("{FILE_STEM}.{ext}"))).collect(),
        None => Vec::new(),
    }
}

/// Build the layered [`Figment`] without extracting it: defaults, then each
/// of `files` that exists, then the environment.
pub fn figment(files: &[PathBuf]) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    for file in files {
        figment = match extension(file).as_str() {
            "toml" => figment.merge(Toml::file(file)),
            "yaml" | "yml" => figment.merge(Yaml::file(file)),
            "json" => figment.merge(Json::file(file)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(file.clone())),
        };
    }
    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
}

/// Load and validate the configuration.
///
/// An explicit file replaces the default file lookup and must exist.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let files = match explicit {
        Some(path) => {
            if !path.is_file() {
                exn::bail!(ErrorKind::Invalid { field: "config file", reason: format!("{} does not exist", path.display()) });
            }
            vec![path.to_path_buf()]
        },
        None => default_files(),
    };
    for file in files.iter().filter(|f| f.is_file()) {
        tracing::debug!(path = %file.display(), "Loading configuration file");
    }
    let config: Config = figment(&files)?.extract().or_raise(|| ErrorKind::Load)?;
    config.validate()?;
    Ok(config)
}

fn extension(path: &Path) -> String {
    path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase).unwrap_or_default()
}
