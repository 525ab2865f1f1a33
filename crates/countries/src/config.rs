use crate::prelude::{println, *};
use crate::repository::CountryRepository;
use countries_core::session::SessionStore;
use countries_core::storage::FileStore;
use std::path::PathBuf;

/// Runtime configuration resolved from global flags and environment
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        let data_dir = match &global.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };

        let config = Self {
            api_base: global.api_base.clone(),
            data_dir,
        };

        if global.verbose {
            println!("REST Countries API Base: {}", config.api_base);
            println!("Data directory: {}", config.data_dir.display());
            println!();
        }

        Ok(config)
    }

    pub fn repository(&self) -> Result<CountryRepository> {
        CountryRepository::new(&self.api_base)
    }

    /// Open the session store and resolve the persisted identity
    pub fn open_session(&self) -> SessionStore<FileStore> {
        let mut session = SessionStore::new(FileStore::new(&self.data_dir));
        session.initialize();
        session
    }
}

fn default_data_dir() -> Result<PathBuf> {
    Ok(dirs_next::data_dir()
        .ok_or_else(|| eyre!("Unable to determine data directory, pass --data-dir"))?
        .join("countries"))
}

/// Route guard: commands behind login need a resolved, authenticated session
pub fn require_login(session: &SessionStore<FileStore>) -> Result<()> {
    if session.is_initializing() {
        return Err(eyre!("Session is still initializing"));
    }
    if !session.is_authenticated() {
        return Err(Error::NotAuthenticated.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn global(data_dir: Option<PathBuf>) -> crate::Global {
        crate::Global {
            api_base: "http://localhost:8080".to_string(),
            data_dir,
            verbose: false,
        }
    }

    #[test]
    fn test_from_global_uses_explicit_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_global(&global(Some(temp_dir.path().to_path_buf()))).unwrap();

        assert_eq!(config.data_dir, temp_dir.path());
        assert_eq!(config.api_base, "http://localhost:8080");
    }

    #[test]
    fn test_require_login_rejects_anonymous_session() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_global(&global(Some(temp_dir.path().to_path_buf()))).unwrap();
        let session = config.open_session();

        let err = require_login(&session).unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
    }

    #[test]
    fn test_require_login_rejects_uninitialized_session() {
        let temp_dir = TempDir::new().unwrap();
        let session = SessionStore::new(FileStore::new(temp_dir.path()));

        let err = require_login(&session).unwrap_err();
        assert!(err.to_string().contains("initializing"));
    }

    #[test]
    fn test_require_login_accepts_persisted_session() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_global(&global(Some(temp_dir.path().to_path_buf()))).unwrap();

        let mut session = config.open_session();
        session.login("a@x.com", "secret").unwrap();

        let session = config.open_session();
        assert!(require_login(&session).is_ok());
    }
}
