use async_trait::async_trait;
use etude_daily::daily::{execute_daily_tasks, DailyStatus, RunResultSet};
use etude_daily::etude::{DailyResource, EtudeDescriptor, EtudeError, MockEtude};
use etude_daily::fetcher::{FetchOutcome, Fetcher, MockFetcher};
use etude_daily::registry::EtudeRegistry;
use etude_daily::schema::Schema;
use serde_json::{json, Value};

/// Builds a mock etude whose resource list is produced fresh on every call.
fn scripted_etude<F>(name: &str, resources: F) -> MockEtude
where
    F: Fn() -> Vec<DailyResource> + Send + 'static,
{
    let mut etude = MockEtude::new();
    etude
        .expect_descriptor()
        .return_const(EtudeDescriptor::new(name, format!("{name} test etude")).unwrap());
    etude
        .expect_daily_resources()
        .returning(move || Ok(resources()));
    etude
}

fn fetcher_returning(outcome: FetchOutcome) -> Box<dyn Fetcher> {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().returning(move || outcome.clone());
    Box::new(fetcher)
}

fn ok(name: &str, value: Value) -> DailyResource {
    (name.to_string(), fetcher_returning(FetchOutcome::success(value)))
}

fn failing(name: &str, message: &str) -> DailyResource {
    (name.to_string(), fetcher_returning(FetchOutcome::failure(message)))
}

struct PanickingFetcher;

#[async_trait]
impl Fetcher for PanickingFetcher {
    async fn fetch(&self) -> FetchOutcome {
        panic!("connection pool exploded")
    }

    fn schema(&self) -> Schema {
        Schema::Unknown
    }
}

#[tokio::test]
async fn mixed_outcomes_produce_partial_success_with_ordered_log() {
    let mut registry = EtudeRegistry::new();
    registry.register(Box::new(scripted_etude("demo", || {
        vec![ok("a", json!(5)), failing("b", "boom")]
    })));

    let results = execute_daily_tasks(&registry).await;

    let expected = json!({
        "demo": {
            "status": "PARTIAL_SUCCESS",
            "data": {"a": 5, "b": null},
            "actions_log": [
                "Successfully fetched resource 'a'.",
                "Failed to fetch resource 'b': boom"
            ]
        }
    });
    assert_eq!(serde_json::to_value(&results).unwrap(), expected);
}

#[tokio::test]
async fn all_successful_resources_yield_ok() {
    let mut registry = EtudeRegistry::new();
    registry.register(Box::new(scripted_etude("weather", || {
        vec![ok("today", json!({"temp": 21})), ok("alerts", json!([]))]
    })));

    let results = execute_daily_tasks(&registry).await;
    let weather = results.get("weather").expect("weather result");

    assert_eq!(weather.status, DailyStatus::Ok);
    let data = weather.data.as_ref().expect("data present");
    assert_eq!(data.keys().collect::<Vec<_>>(), vec!["alerts", "today"]);
    assert_eq!(weather.actions_log.len(), 2);
}

#[tokio::test]
async fn all_failed_resources_yield_failed_with_null_data() {
    let mut registry = EtudeRegistry::new();
    registry.register(Box::new(scripted_etude("news", || {
        vec![failing("headlines", "HTTP error 503"), failing("sports", "timeout")]
    })));

    let results = execute_daily_tasks(&registry).await;
    let news = results.get("news").unwrap();

    assert_eq!(news.status, DailyStatus::Failed);
    let data = news.data.as_ref().unwrap();
    assert!(data.values().all(Value::is_null));
    assert_eq!(
        news.actions_log,
        vec![
            "Failed to fetch resource 'headlines': HTTP error 503",
            "Failed to fetch resource 'sports': timeout"
        ]
    );
}

#[tokio::test]
async fn etude_without_resources_is_no_op() {
    let mut registry = EtudeRegistry::new();
    registry.register(Box::new(scripted_etude("quiet", Vec::new)));

    let results = execute_daily_tasks(&registry).await;

    let expected = json!({
        "quiet": {
            "status": "NO_OP",
            "data": null,
            "actions_log": ["No daily resources defined for this etude."]
        }
    });
    assert_eq!(serde_json::to_value(&results).unwrap(), expected);
}

#[tokio::test]
async fn resource_list_error_fails_only_that_etude() {
    let mut broken = MockEtude::new();
    broken
        .expect_descriptor()
        .return_const(EtudeDescriptor::new("broken", "always errors").unwrap());
    broken
        .expect_daily_resources()
        .returning(|| Err(EtudeError::Resources("catalog offline".into())));

    let mut registry = EtudeRegistry::new();
    registry.register(Box::new(broken));
    registry.register(Box::new(scripted_etude("healthy", || vec![ok("x", json!(1))])));

    let results = execute_daily_tasks(&registry).await;

    let broken = results.get("broken").unwrap();
    assert_eq!(broken.status, DailyStatus::Failed);
    assert!(broken.data.is_none());
    assert_eq!(
        broken.actions_log,
        vec!["Failed to retrieve resource list: catalog offline"]
    );
    assert_eq!(results.get("healthy").unwrap().status, DailyStatus::Ok);
}

#[tokio::test]
async fn panicking_fetch_is_recorded_as_unexpected_error() {
    let mut registry = EtudeRegistry::new();
    registry.register(Box::new(scripted_etude("fragile", || {
        let bomb: Box<dyn Fetcher> = Box::new(PanickingFetcher);
        vec![("bomb".to_string(), bomb), ok("safe", json!("fine"))]
    })));

    let results = execute_daily_tasks(&registry).await;
    let fragile = results.get("fragile").unwrap();

    assert_eq!(fragile.status, DailyStatus::PartialSuccess);
    assert_eq!(fragile.data.as_ref().unwrap()["bomb"], Value::Null);
    assert_eq!(fragile.data.as_ref().unwrap()["safe"], json!("fine"));
    assert_eq!(
        fragile.actions_log[0],
        "Unexpected error fetching resource 'bomb': connection pool exploded"
    );
    assert_eq!(fragile.actions_log[1], "Successfully fetched resource 'safe'.");
}

#[tokio::test]
async fn results_follow_registry_order() {
    let mut registry = EtudeRegistry::new();
    for name in ["mango", "zero", "apple"] {
        registry.register(Box::new(scripted_etude(name, Vec::new)));
    }

    let results = execute_daily_tasks(&registry).await;

    assert_eq!(results.names(), vec!["zero", "apple", "mango"]);
    let json = results.to_json_pretty().unwrap();
    let zero = json.find("\"zero\"").unwrap();
    let apple = json.find("\"apple\"").unwrap();
    let mango = json.find("\"mango\"").unwrap();
    assert!(zero < apple && apple < mango, "artifact keys out of order: {json}");
}

#[tokio::test]
async fn empty_registry_produces_empty_artifact() {
    let results = execute_daily_tasks(&EtudeRegistry::new()).await;
    assert!(results.is_empty());
    assert_eq!(results.to_json_pretty().unwrap(), "{}");
}

#[tokio::test]
async fn artifact_written_to_disk_reads_back_identically() {
    let mut registry = EtudeRegistry::new();
    registry.register(Box::new(scripted_etude("demo", || {
        vec![ok("a", json!(5)), failing("b", "boom")]
    })));
    let results = execute_daily_tasks(&registry).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daily_etude_data.json");
    results.write_json(&path).unwrap();

    let loaded: RunResultSet =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, results);
}

#[test]
fn status_counts_map_to_the_four_daily_statuses() {
    assert_eq!(DailyStatus::from_counts(0, 0), DailyStatus::NoOp);
    assert_eq!(DailyStatus::from_counts(3, 0), DailyStatus::Ok);
    assert_eq!(DailyStatus::from_counts(0, 2), DailyStatus::Failed);
    assert_eq!(DailyStatus::from_counts(1, 1), DailyStatus::PartialSuccess);
}
