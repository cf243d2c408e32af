//! schema.org JSON-LD builders.
//!
//! Optional fields are omitted rather than emitted as `null`.

use serde_json::{Map, Value, json};

use crate::domain::entities::{CompanyRecord, DayGroupHours, ServiceRecord};

use super::types::{Breadcrumb, RouteDescriptor};

const SCHEMA_CONTEXT: &str = "https://schema.org";
const CURRENCY: &str = "CLP";
const COUNTRY: &str = "CL";
const OFFER_CATALOG_NAME: &str = "Servicios de barbería";
const OFFER_CATALOG_LIMIT: usize = 10;
const IN_STOCK: &str = "https://schema.org/InStock";

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn non_blank(value: Option<&str>) -> Option<Value> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| Value::String(v.to_string()))
}

fn postal_address(company: &CompanyRecord) -> Option<Value> {
    let street = non_blank(company.address.as_deref());
    let locality = non_blank(company.comuna.as_deref());
    let region = non_blank(company.region.as_deref());
    if street.is_none() && locality.is_none() && region.is_none() {
        return None;
    }

    let mut map = Map::new();
    map.insert("@type".into(), json!("PostalAddress"));
    insert_opt(&mut map, "streetAddress", street);
    insert_opt(&mut map, "addressLocality", locality);
    insert_opt(&mut map, "addressRegion", region);
    map.insert("addressCountry".into(), json!(COUNTRY));
    Some(Value::Object(map))
}

fn geo_coordinates(company: &CompanyRecord) -> Option<Value> {
    company.geo.map(|geo| {
        json!({
            "@type": "GeoCoordinates",
            "latitude": geo.latitude,
            "longitude": geo.longitude,
        })
    })
}

fn opening_hours(company: &CompanyRecord) -> Option<Value> {
    let specs: Vec<Value> = [&company.hours.weekday, &company.hours.weekend]
        .into_iter()
        .filter(|group| group.is_complete())
        .map(opening_hours_spec)
        .collect();
    if specs.is_empty() {
        None
    } else {
        Some(Value::Array(specs))
    }
}

fn opening_hours_spec(group: &DayGroupHours) -> Value {
    json!({
        "@type": "OpeningHoursSpecification",
        "dayOfWeek": group.days,
        "opens": group.opens.as_deref().map(str::trim),
        "closes": group.closes.as_deref().map(str::trim),
    })
}

fn offer_catalog(services: &[ServiceRecord]) -> Option<Value> {
    if services.is_empty() {
        return None;
    }
    let items: Vec<Value> = services
        .iter()
        .take(OFFER_CATALOG_LIMIT)
        .map(|service| {
            let mut offered = Map::new();
            offered.insert("@type".into(), json!("Service"));
            offered.insert("name".into(), json!(service.name));
            insert_opt(&mut offered, "description", non_blank(service.description.as_deref()));

            let mut offer = Map::new();
            offer.insert("@type".into(), json!("Offer"));
            offer.insert("priceCurrency".into(), json!(CURRENCY));
            insert_opt(&mut offer, "price", service.price.map(Value::from));
            offer.insert("itemOffered".into(), Value::Object(offered));
            Value::Object(offer)
        })
        .collect();

    Some(json!({
        "@type": "OfferCatalog",
        "name": OFFER_CATALOG_NAME,
        "itemListElement": items,
    }))
}

/// Local-business schema describing the company and its offer catalog.
pub fn business_schema(
    company: &CompanyRecord,
    route: &RouteDescriptor,
    services: &[ServiceRecord],
) -> Value {
    let same_as: Vec<Value> = company
        .social_links
        .iter()
        .map(|link| link.trim())
        .filter(|link| !link.is_empty())
        .map(|link| Value::String(link.to_string()))
        .collect();

    let mut map = Map::new();
    map.insert("@context".into(), json!(SCHEMA_CONTEXT));
    map.insert(
        "@type".into(),
        json!(["HealthAndBeautyBusiness", "BeautySalon"]),
    );
    map.insert("name".into(), json!(company.name));
    map.insert("url".into(), json!(route.canonical_url()));
    insert_opt(&mut map, "telephone", company.telephone().map(Value::from));
    insert_opt(&mut map, "address", postal_address(company));
    insert_opt(&mut map, "geo", geo_coordinates(company));
    insert_opt(&mut map, "openingHoursSpecification", opening_hours(company));
    if !same_as.is_empty() {
        map.insert("sameAs".into(), Value::Array(same_as));
    }
    insert_opt(&mut map, "hasOfferCatalog", offer_catalog(services));
    Value::Object(map)
}

/// Service schema for a detail page, referencing the company as provider.
pub fn service_schema(
    company: &CompanyRecord,
    route: &RouteDescriptor,
    service: &ServiceRecord,
) -> Value {
    let mut map = Map::new();
    map.insert("@context".into(), json!(SCHEMA_CONTEXT));
    map.insert("@type".into(), json!("Service"));
    map.insert("name".into(), json!(service.name));
    insert_opt(&mut map, "description", non_blank(service.description.as_deref()));
    map.insert(
        "provider".into(),
        json!({
            "@type": "LocalBusiness",
            "name": company.name,
            "url": route.canonical_url(),
        }),
    );
    insert_opt(
        &mut map,
        "offers",
        service.price.map(|price| {
            json!({
                "@type": "Offer",
                "price": price,
                "priceCurrency": CURRENCY,
                "availability": IN_STOCK,
            })
        }),
    );
    Value::Object(map)
}

pub fn breadcrumb_schema(route: &RouteDescriptor, crumbs: &[Breadcrumb]) -> Value {
    let items: Vec<Value> = crumbs
        .iter()
        .enumerate()
        .map(|(index, crumb)| {
            json!({
                "@type": "ListItem",
                "position": index + 1,
                "name": crumb.name,
                "item": route.absolute(&crumb.url),
            })
        })
        .collect();

    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{GeoPoint, ServiceStatus, WeeklyHours};

    fn route() -> RouteDescriptor {
        RouteDescriptor {
            slug: "barberia-central".into(),
            service_slug: None,
            locale: "es".into(),
            base_url: "https://example.com".into(),
            path: "/barberia-central/barberias".into(),
        }
    }

    fn company() -> CompanyRecord {
        CompanyRecord {
            id: "c1".into(),
            name: "Barbería Central".into(),
            slug: "barberia-central".into(),
            public_slug: None,
            public_enabled: true,
            address: None,
            comuna: Some("Providencia".into()),
            region: None,
            phone: None,
            whatsapp: None,
            email: None,
            geo: None,
            hours: WeeklyHours::default(),
            social_links: vec![],
            category: None,
            updated_at: None,
        }
    }

    fn service(id: &str, price: Option<i64>) -> ServiceRecord {
        ServiceRecord {
            id: id.into(),
            company_id: "c1".into(),
            name: format!("Servicio {id}"),
            description: None,
            price,
            duration_minutes: None,
            status: ServiceStatus::Active,
            slug: None,
            popularity: None,
            updated_at: None,
        }
    }

    #[test]
    fn business_schema_omits_missing_parts() {
        let schema = business_schema(&company(), &route(), &[]);
        assert_eq!(schema["@type"], json!(["HealthAndBeautyBusiness", "BeautySalon"]));
        assert_eq!(schema["address"]["addressLocality"], json!("Providencia"));
        assert!(schema["address"].get("streetAddress").is_none());
        assert_eq!(schema["address"]["addressCountry"], json!("CL"));
        assert!(schema.get("geo").is_none());
        assert!(schema.get("telephone").is_none());
        assert!(schema.get("openingHoursSpecification").is_none());
        assert!(schema.get("sameAs").is_none());
        assert!(schema.get("hasOfferCatalog").is_none());
    }

    #[test]
    fn business_schema_includes_complete_hour_groups_only() {
        let mut company = company();
        company.geo = Some(GeoPoint {
            latitude: -33.42,
            longitude: -70.61,
        });
        company.hours.weekday = DayGroupHours {
            days: vec!["Monday".into(), "Tuesday".into()],
            opens: Some("10:00".into()),
            closes: Some("20:00".into()),
        };
        company.hours.weekend = DayGroupHours {
            days: vec!["Saturday".into()],
            opens: Some("10:00".into()),
            closes: None,
        };
        company.social_links = vec!["https://instagram.com/central".into(), " ".into()];

        let schema = business_schema(&company, &route(), &[]);
        let specs = schema["openingHoursSpecification"]
            .as_array()
            .expect("hours array");
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0]["dayOfWeek"], json!(["Monday", "Tuesday"]));
        assert_eq!(schema["geo"]["latitude"], json!(-33.42));
        assert_eq!(schema["sameAs"], json!(["https://instagram.com/central"]));
    }

    #[test]
    fn offer_catalog_caps_at_ten_entries() {
        let services: Vec<_> = (0..12).map(|i| service(&format!("s{i}"), Some(1000))).collect();
        let schema = business_schema(&company(), &route(), &services);
        let items = schema["hasOfferCatalog"]["itemListElement"]
            .as_array()
            .expect("catalog items");
        assert_eq!(items.len(), 10);
        assert_eq!(items[0]["priceCurrency"], json!("CLP"));
        assert_eq!(items[0]["itemOffered"]["name"], json!("Servicio s0"));
    }

    #[test]
    fn service_schema_adds_offer_only_with_price() {
        let with_price = service_schema(&company(), &route(), &service("s1", Some(12000)));
        assert_eq!(with_price["offers"]["price"], json!(12000));
        assert_eq!(with_price["provider"]["@type"], json!("LocalBusiness"));

        let without_price = service_schema(&company(), &route(), &service("s2", None));
        assert!(without_price.get("offers").is_none());
    }

    #[test]
    fn breadcrumb_positions_are_one_based() {
        let crumbs = vec![
            Breadcrumb {
                name: "Inicio".into(),
                url: "/barberia-central".into(),
            },
            Breadcrumb {
                name: "Barberías".into(),
                url: "/barberia-central/barberias".into(),
            },
        ];
        let schema = breadcrumb_schema(&route(), &crumbs);
        let items = schema["itemListElement"].as_array().expect("items");
        assert_eq!(items[0]["position"], json!(1));
        assert_eq!(items[1]["position"], json!(2));
        assert_eq!(
            items[1]["item"],
            json!("https://example.com/barberia-central/barberias")
        );
    }
}
