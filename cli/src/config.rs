use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::nutritionix::Credentials;

const DATA_DIR_ENV: &str = "FITSPHERE_DATA_DIR";
const APP_ID_ENV: &str = "NUTRITIONIX_APP_ID";
const APP_KEY_ENV: &str = "NUTRITIONIX_APP_KEY";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    /// `None` skips the remote seed; first-run data comes from the food table.
    pub nutritionix: Option<Credentials>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let data_dir = match non_empty_env(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("", "", "fitsphere")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("fitsphere.db");
        let nutritionix = credentials_from(non_empty_env(APP_ID_ENV), non_empty_env(APP_KEY_ENV));

        Ok(Config {
            db_path,
            data_dir,
            nutritionix,
        })
    }

    /// Load the API key from disk, or generate a new one.
    pub fn load_or_create_api_key(&self) -> Result<String> {
        use rand::Rng;
        use std::fmt::Write;

        let path = self.data_dir.join("api_key");

        if path.exists() {
            let key = std::fs::read_to_string(&path).context("Failed to read API key file")?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        let bytes: [u8; 32] = rand::rng().random();
        let key = bytes
            .iter()
            .fold(String::with_capacity(64), |mut acc: String, b| {
                let _ = write!(acc, "{b:02x}");
                acc
            });
        std::fs::write(&path, &key).context("Failed to write API key file")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to set API key file permissions")?;
        }
        eprintln!("Generated new API key: {key}");
        eprintln!("Include in requests: Authorization: Bearer {key}");
        Ok(key)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn credentials_from(app_id: Option<String>, app_key: Option<String>) -> Option<Credentials> {
    Some(Credentials {
        app_id: app_id?,
        app_key: app_key?,
    })
}
