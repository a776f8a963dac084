use super::*;
use chrono::NaiveDate;

use crate::catalog::CatalogItem;
use crate::config::ResolverConfig;
use crate::knowledge::KnowledgeStore;
use crate::matching::models::MatchedBy;
use crate::similarity::TextProfile;

fn wine(code: &str, local: &str, foreign: Option<&str>, producer: Option<&str>) -> CatalogItem {
    CatalogItem {
        item_code: code.to_string(),
        name_local: local.to_string(),
        name_foreign: foreign.map(str::to_string),
        producer: producer.map(str::to_string),
        varietals: Vec::new(),
        vintage: None,
        price: None,
        available: true,
        product_line: None,
    }
}

fn context<'a>(
    knowledge: &'a KnowledgeStore,
    config: &'a ResolverConfig,
    query: &str,
) -> RankContext<'a> {
    let profile = TextProfile::new(query);
    RankContext {
        query_tight: profile.tight.clone(),
        variants: vec![profile],
        vintage_hint: None,
        today: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
        knowledge,
        config,
    }
}

fn sample_catalog() -> CatalogCache {
    CatalogCache::new(vec![
        wine(
            "W001",
            "크루 와이너리 피노누아 몬테레이",
            Some("KRU Winery Pinot Noir Monterey"),
            Some("크루 와이너리"),
        ),
        wine(
            "W002",
            "크루 와이너리 피노누아 산타 루치아 하이랜즈 몬테레이",
            Some("KRU Winery Pinot Noir Santa Lucia Highlands Monterey"),
            Some("크루 와이너리"),
        ),
        wine(
            "W003",
            "빌라 엠 로쏘",
            Some("Villa M Rosso"),
            Some("빌라 엠"),
        ),
    ])
}

#[test]
fn test_detect_producer_by_containment() {
    let catalog = sample_catalog();
    let producer = detect_producer("크루와이너리산타루치아", Some("크루와이너리"), &catalog);
    assert_eq!(producer.as_deref(), Some("크루와이너리"));
}

#[test]
fn test_detect_producer_by_first_token_prefix() {
    let catalog = sample_catalog();
    // "빌라" is a prefix of producer "빌라엠".
    let producer = detect_producer("빌라로쏘", Some("빌라"), &catalog);
    assert_eq!(producer.as_deref(), Some("빌라엠"));
}

#[test]
fn test_producer_filter_narrows_pool() {
    let catalog = sample_catalog();
    let knowledge = KnowledgeStore::default();
    let config = ResolverConfig::default();
    let ctx = context(&knowledge, &config, "크루 와이너리 산타루치아 몬테레이");

    let results = search_catalog(&ctx, &catalog, None);
    assert!(!results.is_empty());
    // Producer filter keeps only 크루 와이너리 items.
    assert!(results.iter().all(|c| c.item_code != "W003"));
    // Compound-token match puts the Santa Lucia bottling on top.
    assert_eq!(results[0].item_code, "W002");
}

#[test]
fn test_compound_query_ranks_spaced_name_higher() {
    let catalog = sample_catalog();
    let knowledge = KnowledgeStore::default();
    let config = ResolverConfig::default();
    let ctx = context(&knowledge, &config, "크루 와이너리 산타루치아 몬테레이");

    let results = search_catalog(&ctx, &catalog, None);
    let w002 = results.iter().find(|c| c.item_code == "W002").expect("W002 scored");
    let w001 = results.iter().find(|c| c.item_code == "W001").expect("W001 scored");
    assert!(w002.final_score > w001.final_score);
}

#[test]
fn test_language_divergence_tag() {
    let catalog = CatalogCache::new(vec![wine(
        "W010",
        "끌라우디 베이 소비뇽 블랑",
        Some("Cloudy Bay Sauvignon Blanc"),
        None,
    )]);
    let knowledge = KnowledgeStore::default();
    let config = ResolverConfig::default();
    let ctx = context(&knowledge, &config, "cloudy bay sauvignon blanc");

    let results = search_catalog(&ctx, &catalog, None);
    assert_eq!(results[0].matched_by, Some(MatchedBy::Foreign));
}

#[test]
fn test_product_line_scopes_pool() {
    let mut wine_item = wine("W001", "샤토 마고", None, None);
    wine_item.product_line = Some("wine".to_string());
    let mut sake_item = wine("S001", "닷사이 준마이", None, None);
    sake_item.product_line = Some("sake".to_string());
    let catalog = CatalogCache::new(vec![wine_item, sake_item]);

    let knowledge = KnowledgeStore::default();
    let config = ResolverConfig::default();
    let ctx = context(&knowledge, &config, "닷사이");

    let scoped = search_catalog(&ctx, &catalog, Some("wine"));
    assert!(scoped.iter().all(|c| c.item_code != "S001"));

    let all = search_catalog(&ctx, &catalog, None);
    assert!(all.iter().any(|c| c.item_code == "S001"));
}

#[test]
fn test_empty_catalog_returns_nothing() {
    let catalog = CatalogCache::default();
    let knowledge = KnowledgeStore::default();
    let config = ResolverConfig::default();
    let ctx = context(&knowledge, &config, "샤토 마고");
    assert!(search_catalog(&ctx, &catalog, None).is_empty());
}
