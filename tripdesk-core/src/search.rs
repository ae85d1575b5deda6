use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tripdesk_catalog::{PricingEngine, Product, Trip};

pub const DEFAULT_PER_PAGE: usize = 12;
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Title,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripSearchQuery {
    pub q: Option<String>,
    pub destination: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    #[serde(default)]
    pub available_only: bool,
    #[serde(default)]
    pub sort: SortOrder,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub sort: SortOrder,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

fn keyword(q: &Option<String>) -> Option<String> {
    q.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn same_text(a: &str, b: &Option<String>) -> bool {
    b.as_deref().map_or(true, |b| b.trim().is_empty() || a.eq_ignore_ascii_case(b.trim()))
}

fn in_range(price: i64, min: Option<i64>, max: Option<i64>) -> bool {
    min.map_or(true, |m| price >= m) && max.map_or(true, |m| price <= m)
}

fn paginate<T>(items: Vec<T>, page: Option<usize>, per_page: Option<usize>) -> SearchPage<T> {
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let page = page.unwrap_or(1).max(1);
    let total = items.len();
    let items = items.into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    SearchPage { items, total, page, per_page }
}

/// Filter, sort and page the trip catalog. Inactive trips never match.
pub fn search_trips(trips: Vec<Trip>, query: &TripSearchQuery, pricing: &PricingEngine) -> SearchPage<Trip> {
    let needle = keyword(&query.q);

    let mut matched: Vec<Trip> = trips.into_iter()
        .filter(|t| t.is_active)
        .filter(|t| match &needle {
            Some(n) => contains(&t.title, n)
                || contains(&t.destination, n)
                || t.description.as_deref().is_some_and(|d| contains(d, n)),
            None => true,
        })
        .filter(|t| same_text(&t.destination, &query.destination))
        .filter(|t| same_text(&t.category, &query.category))
        .filter(|t| in_range(pricing.listed_price(t), query.min_price, query.max_price))
        .filter(|t| !query.available_only || t.has_bookable_date())
        .collect();

    match query.sort {
        SortOrder::Newest => matched.sort_by_key(|t| Reverse(t.created_at)),
        SortOrder::PriceAsc => matched.sort_by_key(|t| pricing.listed_price(t)),
        SortOrder::PriceDesc => matched.sort_by_key(|t| Reverse(pricing.listed_price(t))),
        SortOrder::Title => matched.sort_by_key(|t| t.title.to_lowercase()),
    }

    paginate(matched, query.page, query.per_page)
}

pub fn search_products(products: Vec<Product>, query: &ProductSearchQuery) -> SearchPage<Product> {
    let needle = keyword(&query.q);

    let mut matched: Vec<Product> = products.into_iter()
        .filter(|p| p.is_active)
        .filter(|p| match &needle {
            Some(n) => contains(&p.name, n) || p.description.as_deref().is_some_and(|d| contains(d, n)),
            None => true,
        })
        .filter(|p| same_text(&p.category, &query.category))
        .filter(|p| in_range(p.price, query.min_price, query.max_price))
        .filter(|p| !query.in_stock || p.stock > 0)
        .collect();

    match query.sort {
        SortOrder::Newest => matched.sort_by_key(|p| Reverse(p.created_at)),
        SortOrder::PriceAsc => matched.sort_by_key(|p| p.price),
        SortOrder::PriceDesc => matched.sort_by_key(|p| Reverse(p.price)),
        SortOrder::Title => matched.sort_by_key(|p| p.name.to_lowercase()),
    }

    paginate(matched, query.page, query.per_page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tripdesk_catalog::TripDate;
    use uuid::Uuid;

    fn trip(id: &str, title: &str, destination: &str, base_price: i64, age_days: i64, open: bool) -> Trip {
        Trip {
            id: id.to_string(),
            title: title.to_string(),
            destination: destination.to_string(),
            category: "adventure".to_string(),
            description: Some(format!("{} getaway", destination)),
            itinerary: None,
            base_price,
            discount: 10,
            min_group_size: 1,
            max_group_size: 10,
            dates: vec![TripDate {
                id: format!("{}-d", id),
                start_date: Utc::now(),
                end_date: Utc::now() + Duration::days(3),
                is_available: open,
                available_slots: 5,
            }],
            is_active: true,
            created_at: Utc::now() - Duration::days(age_days),
            updated_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Trip> {
        let mut hidden = trip("T4", "Hidden Trip", "Accra", 100, 0, true);
        hidden.is_active = false;
        vec![
            trip("T1", "Kakum Canopy Walk", "Cape Coast", 300, 3, true),
            trip("T2", "Volta Lake Cruise", "Akosombo", 800, 1, false),
            trip("T3", "Accra City Tour", "Accra", 150, 2, true),
            hidden,
        ]
    }

    #[test]
    fn test_keyword_matches_title_destination_description() {
        let engine = PricingEngine::default();
        let query = TripSearchQuery { q: Some("ACCRA".to_string()), ..Default::default() };
        let page = search_trips(catalog(), &query, &engine);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "T3");
    }

    #[test]
    fn test_price_filter_uses_listed_price() {
        let engine = PricingEngine::default();
        // listed = base + discount(10)
        let query = TripSearchQuery { min_price: Some(160), max_price: Some(310), ..Default::default() };
        let page = search_trips(catalog(), &query, &engine);
        let ids: Vec<_> = page.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T3", "T1"]);

        let narrow = TripSearchQuery { max_price: Some(300), ..Default::default() };
        let page = search_trips(catalog(), &narrow, &engine);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "T3");
    }

    #[test]
    fn test_available_only_and_sort() {
        let engine = PricingEngine::default();
        let query = TripSearchQuery { available_only: true, sort: SortOrder::PriceDesc, ..Default::default() };
        let page = search_trips(catalog(), &query, &engine);
        let ids: Vec<_> = page.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T3"]);

        let newest = search_trips(catalog(), &TripSearchQuery::default(), &engine);
        let ids: Vec<_> = newest.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T2", "T3", "T1"]);
    }

    #[test]
    fn test_pagination_bounds() {
        let engine = PricingEngine::default();
        let query = TripSearchQuery { page: Some(2), per_page: Some(2), sort: SortOrder::Title, ..Default::default() };
        let page = search_trips(catalog(), &query, &engine);
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "T2");

        let huge = TripSearchQuery { per_page: Some(10_000), page: Some(0), ..Default::default() };
        let page = search_trips(catalog(), &huge, &engine);
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_product_search_in_stock() {
        let make = |name: &str, price: i64, stock: u32| Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: "gear".to_string(),
            description: None,
            price,
            stock,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let products = vec![make("Rain jacket", 400, 0), make("Water bottle", 60, 12), make("Headlamp", 90, 3)];

        let query = ProductSearchQuery { in_stock: true, sort: SortOrder::PriceAsc, ..Default::default() };
        let page = search_products(products, &query);
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Water bottle", "Headlamp"]);
    }
}
