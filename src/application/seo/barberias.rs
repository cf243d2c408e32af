//! SEO strategy for the `barberias` vertical.

use crate::domain::entities::{CompanyRecord, ServiceRecord};

use super::{
    schema,
    strategy::{SeoStrategy, StrategyInput},
    templates::{
        BODY_MAX_WORDS, BODY_MIN_WORDS, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS, fit_word_count,
        format_clp, location_label, sentence_list, truncate,
    },
    types::{
        Breadcrumb, DEFAULT_OG_IMAGE, DEFAULT_ROBOTS, OG_LOCALE, OpenGraph, SITE_NAME,
        SeoDocument, TWITTER_CARD, TwitterCard,
    },
};

pub const CATEGORY: &str = "barberias";

const TOP_SERVICES: usize = 3;
const OVERVIEW_H2: &str = "Agenda online y servicios destacados";
const DETAIL_H2: &str = "Detalle del servicio";
const FALLBACK_LOCATION: &str = "Chile";
const BODY_FILLER: &str = "Atendemos con cuidado cada detalle para que tu experiencia sea simple, ordenada y segura, desde la reserva hasta el último retoque.";

#[derive(Debug, Clone, Copy, Default)]
pub struct BarberiasStrategy;

impl SeoStrategy for BarberiasStrategy {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn build_seo(&self, input: &StrategyInput<'_>) -> SeoDocument {
        let StrategyInput {
            company,
            services,
            route,
            service,
        } = *input;
        let location = location_label(company.comuna.as_deref(), company.region.as_deref());
        let location = location.as_deref();
        let featured = top_services(services);

        let (title, description, h1, h2, body_text) = match service {
            Some(service) => (
                detail_title(company, service, location),
                detail_description(company, service, location),
                format!("{} – {}", service.name, company.name),
                DETAIL_H2,
                body_text(company, location, &[service]),
            ),
            None => (
                overview_title(company, location),
                overview_description(company, location, &featured),
                overview_h1(company, location),
                OVERVIEW_H2,
                body_text(company, location, &featured),
            ),
        };

        let canonical = route.canonical_url();
        let breadcrumbs = breadcrumbs(company, &route.path, service);

        let mut json_ld = vec![schema::business_schema(company, route, services)];
        if let Some(service) = service {
            json_ld.push(schema::service_schema(company, route, service));
        }
        json_ld.push(schema::breadcrumb_schema(route, &breadcrumbs));

        SeoDocument {
            keywords: keywords(company, location),
            robots: DEFAULT_ROBOTS.to_string(),
            h1,
            h2: Some(h2.to_string()),
            body_text,
            og: OpenGraph {
                title: title.clone(),
                description: description.clone(),
                kind: "website".to_string(),
                url: canonical.clone(),
                image: DEFAULT_OG_IMAGE.to_string(),
                site_name: SITE_NAME.to_string(),
                locale: OG_LOCALE.to_string(),
            },
            twitter: TwitterCard {
                card: TWITTER_CARD.to_string(),
                title: title.clone(),
                description: description.clone(),
                image: DEFAULT_OG_IMAGE.to_string(),
            },
            title,
            description,
            canonical,
            json_ld,
            breadcrumbs,
        }
    }
}

/// Most popular services first; listing order breaks ties.
fn top_services(services: &[ServiceRecord]) -> Vec<&ServiceRecord> {
    let mut ranked: Vec<&ServiceRecord> = services.iter().collect();
    ranked.sort_by_key(|service| std::cmp::Reverse(service.popularity.unwrap_or(0)));
    ranked.truncate(TOP_SERVICES);
    ranked
}

fn overview_title(company: &CompanyRecord, location: Option<&str>) -> String {
    let base = match location {
        Some(location) => format!("{} | Barbería en {location} – Reserva Online", company.name),
        None => format!("{} | Barbería – Reserva Online", company.name),
    };
    truncate(&base, TITLE_MAX_CHARS)
}

fn detail_title(company: &CompanyRecord, service: &ServiceRecord, location: Option<&str>) -> String {
    let location = location
        .map(|location| format!(" en {location}"))
        .unwrap_or_default();
    let base = format!(
        "{} en {} | Barbería{location} – Reserva Online",
        service.name, company.name
    );
    truncate(&base, TITLE_MAX_CHARS)
}

fn overview_description(
    company: &CompanyRecord,
    location: Option<&str>,
    featured: &[&ServiceRecord],
) -> String {
    let names: Vec<&str> = featured.iter().map(|service| service.name.as_str()).collect();
    let services = sentence_list(&names).unwrap_or_else(|| "Cortes, barba y estilismo.".to_string());
    let location = location
        .map(|location| format!(" ({location})"))
        .unwrap_or_default();
    let base = format!(
        "Reserva en {}{location}. {services} Horarios, precios y atención rápida. Agenda online en pymerp.",
        company.name
    );
    truncate(&base, DESCRIPTION_MAX_CHARS)
}

fn detail_description(
    company: &CompanyRecord,
    service: &ServiceRecord,
    location: Option<&str>,
) -> String {
    let location = location
        .map(|location| format!(" ({location})"))
        .unwrap_or_default();
    let mut base = format!(
        "Reserva {} en {}{location}. Agenda online con precios y duración estimada.",
        service.name, company.name
    );
    if let Some(price) = service.price {
        base.push_str(&format!(" Precio: {}.", format_clp(price)));
    }
    if let Some(minutes) = service.duration_minutes.filter(|minutes| *minutes > 0) {
        base.push_str(&format!(" Duración: {minutes} min."));
    }
    truncate(&base, DESCRIPTION_MAX_CHARS)
}

fn overview_h1(company: &CompanyRecord, location: Option<&str>) -> String {
    match location {
        Some(location) => format!("{} – Barbería en {location}", company.name),
        None => format!("{} – Barbería", company.name),
    }
}

fn keywords(company: &CompanyRecord, location: Option<&str>) -> Vec<String> {
    let location = location.unwrap_or(FALLBACK_LOCATION);
    vec![
        format!("barbería {location}"),
        format!("corte de pelo {location}"),
        format!("barba {location}"),
        format!("{} barbería", company.name),
        format!("reservar barbería online {location}"),
    ]
}

fn body_text(company: &CompanyRecord, location: Option<&str>, featured: &[&ServiceRecord]) -> String {
    let location = location
        .map(|location| format!("en {location}"))
        .unwrap_or_else(|| "en tu ciudad".to_string());
    let names: Vec<&str> = featured.iter().map(|service| service.name.as_str()).collect();
    let services = match sentence_list(&names) {
        Some(list) => format!("Servicios destacados: {list}"),
        None => "Cortes, barba y estilismo con profesionales locales.".to_string(),
    };

    let paragraphs = [
        format!(
            "{} es una barbería {location} con agenda online y atención personalizada. Aquí encuentras horarios claros, precios transparentes y una experiencia cómoda para planificar tu visita sin llamadas ni esperas innecesarias.",
            company.name
        ),
        format!(
            "{services} Cada servicio muestra su precio y duración estimada para que elijas con información completa."
        ),
        "Si buscas mantener tu estilo y ahorrar tiempo, puedes agendar de forma rápida y recibir confirmación directa. La información de contacto y ubicación está disponible para resolver cualquier duda antes de tu visita, y puedes revisar la disponibilidad de cada profesional en tiempo real desde cualquier dispositivo.".to_string(),
        "Agenda en pymerp y encuentra el servicio que mejor se adapte a tu rutina.".to_string(),
    ];

    fit_word_count(&paragraphs, BODY_FILLER, BODY_MIN_WORDS, BODY_MAX_WORDS)
}

fn breadcrumbs(
    company: &CompanyRecord,
    path: &str,
    service: Option<&ServiceRecord>,
) -> Vec<Breadcrumb> {
    let home = Breadcrumb {
        name: "Inicio".to_string(),
        url: format!("/{}", company.slug),
    };
    match service {
        Some(service) => vec![
            home,
            Breadcrumb {
                name: "Barberías".to_string(),
                url: format!("/{}/{CATEGORY}", company.slug),
            },
            Breadcrumb {
                name: service.name.clone(),
                url: path.to_string(),
            },
        ],
        None => vec![
            home,
            Breadcrumb {
                name: "Barberías".to_string(),
                url: path.to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::seo::templates::word_count;
    use crate::application::seo::types::RouteDescriptor;
    use crate::domain::entities::{ServiceStatus, WeeklyHours};
    use serde_json::json;

    fn company() -> CompanyRecord {
        CompanyRecord {
            id: "company-1".into(),
            name: "Barbería Central".into(),
            slug: "barberia-central".into(),
            public_slug: None,
            public_enabled: true,
            address: Some("Av. Principal 123".into()),
            comuna: Some("Providencia".into()),
            region: Some("Metropolitana".into()),
            phone: None,
            whatsapp: Some("+56912345678".into()),
            email: None,
            geo: None,
            hours: WeeklyHours::default(),
            social_links: vec![],
            category: None,
            updated_at: None,
        }
    }

    fn service(id: &str, name: &str, price: i64) -> ServiceRecord {
        ServiceRecord {
            id: id.into(),
            company_id: "company-1".into(),
            name: name.into(),
            description: None,
            price: Some(price),
            duration_minutes: None,
            status: ServiceStatus::Active,
            slug: None,
            popularity: None,
            updated_at: None,
        }
    }

    fn services() -> Vec<ServiceRecord> {
        vec![
            service("s1", "Corte clásico", 12000),
            service("s2", "Barba premium", 8000),
            service("s3", "Afeitado", 6000),
        ]
    }

    fn route(path: &str) -> RouteDescriptor {
        RouteDescriptor {
            slug: "barberia-central".into(),
            service_slug: None,
            locale: "es".into(),
            base_url: "https://pymerp.cl".into(),
            path: path.into(),
        }
    }

    fn overview(company: &CompanyRecord, services: &[ServiceRecord]) -> SeoDocument {
        let route = route("/barberia-central/barberias");
        BarberiasStrategy.build_seo(&StrategyInput {
            company,
            services,
            route: &route,
            service: None,
        })
    }

    #[test]
    fn overview_mentions_vertical_and_location() {
        let doc = overview(&company(), &services());
        assert_eq!(
            doc.title,
            "Barbería Central | Barbería en Providencia, Metropolitana – Reserva O…"
        );
        assert!(doc.title.contains("Barbería"));
        assert!(doc.description.contains("Barbería Central"));
        assert!(doc.description.contains("Corte clásico, Barba premium, Afeitado."));
        assert_eq!(doc.h1, "Barbería Central – Barbería en Providencia, Metropolitana");
        assert_eq!(doc.h2.as_deref(), Some(OVERVIEW_H2));
        assert_eq!(doc.robots, "index, follow");
        assert_eq!(doc.canonical, "https://pymerp.cl/barberia-central/barberias");
    }

    #[test]
    fn overview_includes_business_schema_and_breadcrumbs_last() {
        let doc = overview(&company(), &services());
        assert_eq!(doc.json_ld.len(), 2);
        assert_eq!(
            doc.json_ld[0]["@type"],
            json!(["HealthAndBeautyBusiness", "BeautySalon"])
        );
        assert_eq!(doc.json_ld[1]["@type"], json!("BreadcrumbList"));
        assert_eq!(doc.breadcrumbs.len(), 2);
        assert_eq!(doc.breadcrumbs[0].url, "/barberia-central");
    }

    #[test]
    fn detail_mode_specializes_around_service() {
        let company = company();
        let services = services();
        let route = route("/barberia-central/barberias/servicios/corte-clasico");
        let doc = BarberiasStrategy.build_seo(&StrategyInput {
            company: &company,
            services: &services,
            route: &route,
            service: Some(&services[0]),
        });

        assert!(doc.title.starts_with("Corte clásico"));
        assert!(doc.title.chars().count() <= TITLE_MAX_CHARS);
        assert!(doc.description.contains("$12.000"));
        assert_eq!(doc.h1, "Corte clásico – Barbería Central");
        assert_eq!(doc.h2.as_deref(), Some(DETAIL_H2));
        assert_eq!(doc.breadcrumbs.len(), 3);
        assert_eq!(doc.breadcrumbs[1].url, "/barberia-central/barberias");
        assert_eq!(doc.breadcrumbs[2].name, "Corte clásico");

        let types: Vec<_> = doc.json_ld.iter().map(|v| v["@type"].clone()).collect();
        assert_eq!(types[1], json!("Service"));
        assert_eq!(doc.json_ld[1]["name"], json!("Corte clásico"));
        assert_eq!(types[2], json!("BreadcrumbList"));
        let positions: Vec<_> = doc.json_ld[2]["itemListElement"]
            .as_array()
            .expect("items")
            .iter()
            .map(|item| item["position"].clone())
            .collect();
        assert_eq!(positions, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn output_is_deterministic() {
        let company = company();
        let services = services();
        let first = serde_json::to_string(&overview(&company, &services)).expect("json");
        let second = serde_json::to_string(&overview(&company, &services)).expect("json");
        assert_eq!(first, second);
    }

    #[test]
    fn tolerates_missing_location() {
        let mut company = company();
        company.comuna = None;
        company.region = Some("   ".into());
        let doc = overview(&company, &[]);
        assert_eq!(doc.title, "Barbería Central | Barbería – Reserva Online");
        assert_eq!(doc.h1, "Barbería Central – Barbería");
        assert!(doc.description.contains("Cortes, barba y estilismo."));
        assert!(doc.body_text.contains("en tu ciudad"));
        assert!(doc.keywords.contains(&"barbería Chile".to_string()));
    }

    #[test]
    fn length_bounds_hold_for_long_names() {
        let mut company = company();
        company.name = "Barbería y Peluquería Tradicional de Caballeros Don Francisco".into();
        let services = vec![service("s1", &"Servicio extraordinariamente largo ".repeat(10), 1)];
        let doc = overview(&company, &services);
        assert!(doc.title.chars().count() <= TITLE_MAX_CHARS);
        assert!(doc.title.ends_with('…'));
        assert!(doc.description.chars().count() <= DESCRIPTION_MAX_CHARS);
        let words = word_count(&doc.body_text);
        assert!((BODY_MIN_WORDS..=BODY_MAX_WORDS).contains(&words), "{words}");
    }

    #[test]
    fn short_body_is_padded_with_filler() {
        let doc = overview(&company(), &services());
        let words = word_count(&doc.body_text);
        assert!((BODY_MIN_WORDS..=BODY_MAX_WORDS).contains(&words), "{words}");
        assert!(doc.body_text.ends_with(BODY_FILLER));
        assert_eq!(doc.body_text.matches(BODY_FILLER).count(), 1);
    }

    #[test]
    fn body_in_range_is_left_untouched() {
        let services = vec![
            service("s1", "Corte de pelo clásico con tijera", 12000),
            service("s2", "Perfilado de barba con toalla caliente", 8000),
            service("s3", "Afeitado tradicional con navaja", 6000),
        ];
        let doc = overview(&company(), &services);
        let words = word_count(&doc.body_text);
        assert!((BODY_MIN_WORDS..=BODY_MAX_WORDS).contains(&words), "{words}");
        assert!(!doc.body_text.contains(BODY_FILLER));
    }

    #[test]
    fn oversized_body_is_cut_to_ceiling() {
        let services = vec![service("s1", &"palabra ".repeat(400), 1)];
        let doc = overview(&company(), &services);
        assert_eq!(word_count(&doc.body_text), BODY_MAX_WORDS);
    }

    #[test]
    fn featured_services_follow_popularity() {
        let mut services = services();
        services.push(ServiceRecord {
            popularity: Some(50),
            ..service("s4", "Tinte", 15000)
        });
        services[1].popularity = Some(10);
        let doc = overview(&company(), &services);
        assert!(doc.description.contains("Tinte, Barba premium, Corte clásico."));
    }

    #[test]
    fn social_blocks_mirror_title_and_description() {
        let doc = overview(&company(), &services());
        assert_eq!(doc.og.title, doc.title);
        assert_eq!(doc.og.description, doc.description);
        assert_eq!(doc.og.image, "/og-default.jpg");
        assert_eq!(doc.og.site_name, "pymerp");
        assert_eq!(doc.og.locale, "es_CL");
        assert_eq!(doc.twitter.card, "summary_large_image");
        assert_eq!(doc.twitter.title, doc.title);
    }
}
