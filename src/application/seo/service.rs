use std::{sync::Arc, time::Duration};

use metrics::counter;
use time::OffsetDateTime;
use tracing::{Instrument, debug, field, info_span};

use crate::{
    application::{
        error::AppError,
        repos::{CompanyDirectory, ServiceDirectory},
    },
    cache::{SeoCacheKey, SeoCacheStore, content_fingerprint},
    domain::{
        entities::{CompanyRecord, ServiceRecord},
        slug::slug_matches,
    },
};

use super::{
    strategy::{StrategyInput, StrategyRegistry},
    types::{RouteDescriptor, SeoDocument},
};

pub(crate) const METRIC_SEO_CACHE_HIT: &str = "vitrina_seo_cache_hit_total";
pub(crate) const METRIC_SEO_CACHE_MISS: &str = "vitrina_seo_cache_miss_total";
pub(crate) const METRIC_SEO_COMPUTE: &str = "vitrina_seo_compute_total";

/// Resolves directory entities and serves SEO documents through the cache.
#[derive(Clone)]
pub struct SeoService {
    companies: Arc<dyn CompanyDirectory>,
    services: Arc<dyn ServiceDirectory>,
    cache: Arc<dyn SeoCacheStore>,
    strategies: Arc<StrategyRegistry>,
    ttl: Duration,
}

impl SeoService {
    pub fn new(
        companies: Arc<dyn CompanyDirectory>,
        services: Arc<dyn ServiceDirectory>,
        cache: Arc<dyn SeoCacheStore>,
        strategies: Arc<StrategyRegistry>,
        ttl: Duration,
    ) -> Self {
        Self {
            companies,
            services,
            cache,
            strategies,
            ttl,
        }
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    /// Build (or fetch from cache) the document for one public page.
    ///
    /// `Ok(None)` covers every not-found reason alike: unknown slug, disabled
    /// public page, category mismatch, unknown service. Those outcomes never
    /// touch the cache. Directory failures are the only errors returned.
    pub async fn build_seo_data(
        &self,
        slug: &str,
        category: &str,
        route: &RouteDescriptor,
        service_slug: Option<&str>,
    ) -> Result<Option<SeoDocument>, AppError> {
        let Some(strategy) = self.strategies.get(category) else {
            return Ok(None);
        };

        let Some(company) = self.companies.resolve_by_slug(slug).await? else {
            return Ok(None);
        };
        if !company.public_enabled || !category_matches(&company, category) {
            debug!(
                target = "vitrina::seo",
                company_id = %company.id,
                category,
                "company not publishable under requested category"
            );
            return Ok(None);
        }

        let services: Vec<ServiceRecord> = self
            .services
            .list_by_company(&company.id)
            .await?
            .into_iter()
            .filter(ServiceRecord::is_active)
            .collect();

        let service = match service_slug {
            Some(requested) => match find_service(&services, requested) {
                Some(service) => Some(service),
                None => return Ok(None),
            },
            None => None,
        };

        let key = SeoCacheKey {
            company_id: company.id.clone(),
            category: category.to_string(),
            locale: route.locale.clone(),
            fingerprint: content_fingerprint(
                &company.id,
                latest_update(&company, &services),
                &route.path,
            ),
            path: route.path.clone(),
        }
        .to_string();

        let span = info_span!(
            "publicweb_seo.cache",
            cache.key = %key,
            cache.hit = field::Empty
        );
        let cached = self.cache.get(&key).instrument(span.clone()).await;
        span.record("cache.hit", cached.is_some());
        if let Some(document) = cached {
            counter!(METRIC_SEO_CACHE_HIT).increment(1);
            return Ok(Some(document));
        }
        counter!(METRIC_SEO_CACHE_MISS).increment(1);

        counter!(METRIC_SEO_COMPUTE).increment(1);
        let document = strategy.build_seo(&StrategyInput {
            company: &company,
            services: &services,
            route,
            service,
        });

        self.cache
            .set(&key, &document, self.ttl)
            .instrument(span)
            .await;
        Ok(Some(document))
    }
}

fn category_matches(company: &CompanyRecord, category: &str) -> bool {
    match company.category.as_deref().map(str::trim) {
        Some(declared) if !declared.is_empty() => declared == category,
        _ => true,
    }
}

/// Match by stored slug first, then by the slug derived from the name.
fn find_service<'a>(services: &'a [ServiceRecord], requested: &str) -> Option<&'a ServiceRecord> {
    services.iter().find(|service| {
        service
            .slug
            .as_deref()
            .is_some_and(|stored| slug_matches(stored, requested))
            || slug_matches(&service.name, requested)
    })
}

/// Latest modification across the company and all of its services.
pub fn latest_update(
    company: &CompanyRecord,
    services: &[ServiceRecord],
) -> Option<OffsetDateTime> {
    services
        .iter()
        .filter_map(|service| service.updated_at)
        .chain(company.updated_at)
        .max()
}

impl std::fmt::Debug for SeoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeoService")
            .field("strategies", &self.strategies)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
