//! Business directory adapters.
//!
//! `SnapshotDirectory` serves companies and services from a JSON export of the
//! upstream directory; `StubDirectory` knows nothing and is used for
//! cold-start probing.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::{
    application::repos::{CompanyDirectory, RepoError, ServiceDirectory},
    config::{DirectoryMode, DirectorySettings},
    domain::entities::{CompanyRecord, ServiceRecord},
};

use super::error::InfraError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SnapshotFile {
    companies: Vec<CompanyRecord>,
    services: Vec<ServiceRecord>,
}

/// Read-only directory backed by an in-memory snapshot.
#[derive(Debug, Default)]
pub struct SnapshotDirectory {
    companies: Vec<CompanyRecord>,
    services: Vec<ServiceRecord>,
}

impl SnapshotDirectory {
    pub fn new(companies: Vec<CompanyRecord>, services: Vec<ServiceRecord>) -> Self {
        Self {
            companies,
            services,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, InfraError> {
        let file: SnapshotFile = serde_json::from_str(raw)
            .map_err(|err| InfraError::directory(format!("invalid snapshot: {err}")))?;
        Ok(Self::new(file.companies, file.services))
    }

    pub async fn load(path: &Path) -> Result<Self, InfraError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let directory = Self::from_json(&raw)?;
        info!(
            target = "vitrina::directory",
            path = %path.display(),
            companies = directory.companies.len(),
            services = directory.services.len(),
            "Loaded directory snapshot"
        );
        Ok(directory)
    }
}

fn same_slug(stored: &str, requested: &str) -> bool {
    let stored = stored.trim();
    !stored.is_empty() && stored.eq_ignore_ascii_case(requested)
}

#[async_trait]
impl CompanyDirectory for SnapshotDirectory {
    async fn resolve_by_slug(&self, slug: &str) -> Result<Option<CompanyRecord>, RepoError> {
        let requested = slug.trim();
        if requested.is_empty() {
            return Ok(None);
        }

        let primary = self
            .companies
            .iter()
            .find(|company| same_slug(&company.slug, requested));
        let company = primary.or_else(|| {
            self.companies.iter().find(|company| {
                company
                    .public_slug
                    .as_deref()
                    .is_some_and(|alternate| same_slug(alternate, requested))
            })
        });
        Ok(company.cloned())
    }
}

#[async_trait]
impl ServiceDirectory for SnapshotDirectory {
    async fn list_by_company(&self, company_id: &str) -> Result<Vec<ServiceRecord>, RepoError> {
        Ok(self
            .services
            .iter()
            .filter(|service| service.company_id == company_id && service.is_active())
            .cloned()
            .collect())
    }
}

/// Directory with no entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubDirectory;

#[async_trait]
impl CompanyDirectory for StubDirectory {
    async fn resolve_by_slug(&self, _slug: &str) -> Result<Option<CompanyRecord>, RepoError> {
        Ok(None)
    }
}

#[async_trait]
impl ServiceDirectory for StubDirectory {
    async fn list_by_company(&self, _company_id: &str) -> Result<Vec<ServiceRecord>, RepoError> {
        Ok(Vec::new())
    }
}

/// Company and service directories selected by `directory.mode`.
#[derive(Clone)]
pub struct Directories {
    pub companies: Arc<dyn CompanyDirectory>,
    pub services: Arc<dyn ServiceDirectory>,
}

pub async fn build_directories(settings: &DirectorySettings) -> Result<Directories, InfraError> {
    match settings.mode {
        DirectoryMode::Snapshot => {
            let snapshot = Arc::new(SnapshotDirectory::load(&settings.snapshot_path).await?);
            Ok(Directories {
                companies: snapshot.clone(),
                services: snapshot,
            })
        }
        DirectoryMode::Stub => {
            info!(target = "vitrina::directory", "Using stub directory");
            let stub = Arc::new(StubDirectory);
            Ok(Directories {
                companies: stub.clone(),
                services: stub,
            })
        }
    }
}
