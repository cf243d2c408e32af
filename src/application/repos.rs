//! Directory traits describing the upstream business directory.
//!
//! The directory owns companies and services; this crate only reads them.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{CompanyRecord, ServiceRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("directory error: {0}")]
    Persistence(String),
    #[error("directory timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    /// Resolve a company by its primary slug, falling back to the alternate public slug.
    async fn resolve_by_slug(&self, slug: &str) -> Result<Option<CompanyRecord>, RepoError>;
}

#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// List the company's services, excluding inactive entries.
    async fn list_by_company(&self, company_id: &str) -> Result<Vec<ServiceRecord>, RepoError>;
}
