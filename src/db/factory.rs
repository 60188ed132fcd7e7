//! Repository factory for dependency injection.
//!
//! The factory is the single place a store handle is constructed. The
//! returned `Arc<dyn FullRepository>` is passed explicitly into each
//! manager; nothing in this crate stashes it in a global.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
#[cfg(feature = "local-repo")]
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::{PostgresConfig, PostgresRepository};
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to Postgres if a database URL is
    /// present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Factory for creating repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a Postgres repository (opens the pool, runs migrations).
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let repo = PostgresRepository::new(config.clone())?;
        Ok(Arc::new(repo))
    }

    /// Create an in-memory local repository.
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a repository from environment configuration.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Postgres => Self::postgres_from_env().await,
            RepositoryType::Local => Self::local_or_error(),
        }
    }

    /// Create a repository from a TOML configuration file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Create a repository from a loaded `RepositoryConfig`.
    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::ConfigurationError(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let pg_config = config.to_postgres_config()?.ok_or_else(|| {
                        RepositoryError::ConfigurationError(
                            "Postgres repository requires database configuration".to_string(),
                        )
                    })?;
                    let pg = Self::create_postgres(&pg_config).await?;
                    Ok(pg as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Err(RepositoryError::ConfigurationError(
                        "Postgres repository feature not enabled".to_string(),
                    ))
                }
            }
            RepositoryType::Local => Self::local_or_error(),
        }
    }

    async fn postgres_from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        #[cfg(feature = "postgres-repo")]
        {
            let config = PostgresConfig::from_env().map_err(RepositoryError::ConfigurationError)?;
            let pg = Self::create_postgres(&config).await?;
            Ok(pg as Arc<dyn FullRepository>)
        }
        #[cfg(not(feature = "postgres-repo"))]
        {
            Err(RepositoryError::ConfigurationError(
                "Postgres repository feature not enabled".to_string(),
            ))
        }
    }

    fn local_or_error() -> RepositoryResult<Arc<dyn FullRepository>> {
        #[cfg(feature = "local-repo")]
        {
            Ok(Self::create_local())
        }
        #[cfg(not(feature = "local-repo"))]
        {
            Err(RepositoryError::ConfigurationError(
                "Local repository feature not enabled".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "local-repo")]
    use crate::db::repository::StoreLifecycle;

    #[test]
    fn repository_type_from_str() {
        assert_eq!(RepositoryType::from_str("local").unwrap(), RepositoryType::Local);
        assert_eq!(RepositoryType::from_str("postgres").unwrap(), RepositoryType::Postgres);
        assert_eq!(RepositoryType::from_str("Pg").unwrap(), RepositoryType::Postgres);
        assert!(RepositoryType::from_str("invalid").is_err());
    }

    #[cfg(feature = "local-repo")]
    #[tokio::test]
    async fn create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[cfg(feature = "local-repo")]
    #[tokio::test]
    async fn local_config_builds_local_repository() {
        let config: RepositoryConfig = toml::from_str(
            r#"
[repository]
type = "local"
"#,
        )
        .unwrap();
        let repo = RepositoryFactory::from_repository_config(&config).await.unwrap();
        assert!(repo.health_check().await.unwrap());
    }
}
