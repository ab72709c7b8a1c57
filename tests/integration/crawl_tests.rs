//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small listing site and run the full
//! update cycle end-to-end against a SQLite file.

use car_harvest::config::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};
use car_harvest::crawler::{run_update, UpdateOptions};
use car_harvest::output::export_sheet;
use car_harvest::storage::{RunStatus, SqliteStorage, Storage};
use car_harvest::RecordState;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration against the mock server, using the default selectors
fn create_test_config(base_url: &str, db_path: &Path) -> Config {
    Config {
        site: SiteConfig {
            search_url: format!("{}/search?s=Car&fuels=ELECTRICITY", base_url),
            page_param: "pageNumber".to_string(),
            max_pages: None,
        },
        selectors: SelectorConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        crawler: CrawlerConfig {
            request_delay: 0,
            request_timeout: 5,
        },
        output: OutputConfig {
            database_path: db_path.display().to_string(),
            sheet_path: "./coches.csv".to_string(),
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn listing_page(ids: &[&str]) -> ResponseTemplate {
    let links: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<article><a class="BaseListing_containerLink__f00" href="/detail?id={}&amp;sb=doc&amp;ref=srp">{}</a></article>"#,
                id, id
            )
        })
        .collect();
    let pagination = r#"<ul class="pagination_Pagination__x1"><li>1</li><li>2</li><li>3</li><li>4</li><li>Siguiente</li></ul>"#;
    html(&format!("{}{}", links, pagination))
}

fn detail_page(title: &str, price: Option<&str>, features: &[(&str, &str)]) -> ResponseTemplate {
    let price = price
        .map(|p| format!(r#"<div class="MainPriceArea_mainPrice__p1">{}</div>"#, p))
        .unwrap_or_default();
    let panel: String = features
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="KeyFeatures_content__k9"><div>{}</div><div>{}</div></div>"#,
                label, value
            )
        })
        .collect();
    html(&format!(
        r#"<h2 class="typography_headline__h2">{}</h2>
           <div class="MainCtaBox_subTitle__s1">Eléctrico</div>
           {}
           <div class="priceRatingBadge_PriceRatingBadge--label_r1">Buen precio</div>
           {}"#,
        title, price, panel
    ))
}

/// Mounts the four-page listing site: pages 1-3 hold {A,B}, {A,C}, {A,B}
async fn mount_site(server: &MockServer) {
    for (page, ids) in [("1", vec!["A", "B"]), ("2", vec!["A", "C"]), ("3", vec!["A", "B"])] {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("pageNumber", page))
            .respond_with(listing_page(&ids))
            .mount(server)
            .await;
    }

    // Discovery must stop before the last page
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("pageNumber", "4"))
        .respond_with(listing_page(&["D"]))
        .expect(0)
        .mount(server)
        .await;

    // The search page itself, without a page number
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(listing_page(&["A", "B"]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/detail"))
        .and(query_param("id", "A"))
        .respond_with(detail_page(
            "Tesla Model 3",
            Some("38.900 €"),
            &[
                ("Kilometraje", "8.000 km"),
                ("Potencia", "150 kW (204 cv)"),
                ("Propietarios anteriores", "01"),
            ],
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/detail"))
        .and(query_param("id", "B"))
        .respond_with(detail_page("Kia EV6", None, &[]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/detail"))
        .and(query_param("id", "C"))
        .respond_with(detail_page(
            "Hyundai Ioniq 5",
            Some("41.500 €"),
            &[
                ("Autonomía (WLTP)", "481 km"),
                ("Tiempo de carga rápida", "18 Min."),
                ("Propietarios anteriores", "1"),
            ],
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_update_cycle() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("cars.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    let totals = run_update(config, "hash", UpdateOptions::default())
        .await
        .expect("update should succeed");

    assert_eq!(totals.new_records, 3);
    assert_eq!(totals.detailed_records, 2);
    assert_eq!(totals.failed_records, 1);

    let storage = SqliteStorage::new(&db_path).unwrap();
    let identity = |id: &str| format!("{}/detail?id={}", mock_server.uri(), id);

    let a = storage.get_record(&identity("A")).unwrap().unwrap();
    assert_eq!(a.state, RecordState::Completed);
    assert_eq!(a.title.as_deref(), Some("Tesla Model 3"));
    assert_eq!(a.subtitle.as_deref(), Some("Eléctrico"));
    assert_eq!(a.price, Some(38900));
    assert_eq!(a.price_fairness.as_deref(), Some("Buen precio"));
    assert_eq!(a.attributes.distance_km, Some(8000));
    assert_eq!(a.attributes.power_kw, Some(150));
    assert_eq!(a.attributes.power_raw_label.as_deref(), Some("150 kW (204 cv)"));
    assert_eq!(a.attributes.previous_owners, None);

    let b = storage.get_record(&identity("B")).unwrap().unwrap();
    assert_eq!(b.state, RecordState::Pending);
    assert_eq!(b.title, None);

    let c = storage.get_record(&identity("C")).unwrap().unwrap();
    assert_eq!(c.attributes.range_wltp_km, Some(481));
    assert_eq!(c.attributes.fast_charge_minutes, Some(18));
    assert_eq!(c.attributes.previous_owners, Some(1));

    assert!(storage.get_record(&identity("D")).unwrap().is_none());

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.totals, totals);
}

#[tokio::test]
async fn test_second_update_finds_nothing_new() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("cars.db");

    run_update(
        create_test_config(&mock_server.uri(), &db_path),
        "hash",
        UpdateOptions::default(),
    )
    .await
    .unwrap();
    let second = run_update(
        create_test_config(&mock_server.uri(), &db_path),
        "hash",
        UpdateOptions::default(),
    )
    .await
    .unwrap();

    // Only the listing without a price is retried
    assert_eq!(second.new_records, 0);
    assert_eq!(second.detailed_records, 0);
    assert_eq!(second.failed_records, 1);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_total_records().unwrap(), 3);
    assert_eq!(
        storage.count_records_by_state(RecordState::Completed).unwrap(),
        2
    );
}

#[tokio::test]
async fn test_skip_details_only_discovers() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("cars.db");
    let options = UpdateOptions {
        skip_search: false,
        skip_details: true,
    };

    let totals = run_update(create_test_config(&mock_server.uri(), &db_path), "hash", options)
        .await
        .unwrap();

    assert_eq!(totals.new_records, 3);
    assert_eq!(totals.detailed_records, 0);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(
        storage.count_records_by_state(RecordState::Pending).unwrap(),
        3
    );
}

#[tokio::test]
async fn test_unreachable_search_marks_run_failed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("cars.db");

    let result = run_update(
        create_test_config(&mock_server.uri(), &db_path),
        "hash",
        UpdateOptions::default(),
    )
    .await;
    assert!(result.is_err());

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(storage.count_total_records().unwrap(), 0);
}

#[tokio::test]
async fn test_sheet_export_after_update() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("cars.db");
    run_update(
        create_test_config(&mock_server.uri(), &db_path),
        "hash",
        UpdateOptions::default(),
    )
    .await
    .unwrap();

    let storage = SqliteStorage::new(&db_path).unwrap();
    let sheet_path = dir.path().join("coches.csv");
    let written = export_sheet(&storage, &sheet_path).unwrap();
    assert_eq!(written, 2);

    let sheet = std::fs::read_to_string(&sheet_path).unwrap();
    let lines: Vec<&str> = sheet.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("title,subtitle,price,price fairness,Kilometraje"));
    assert_eq!(
        lines[1],
        format!(
            "Tesla Model 3,Eléctrico,38900,Buen precio,8000,,150,150 kW (204 cv),,{}/detail?id=A",
            mock_server.uri()
        )
    );
}
