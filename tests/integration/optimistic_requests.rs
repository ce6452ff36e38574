use canopy::{
    ApiError, Fields, Forest, RequestConfig, RequestFacade, RequiredFields, RollbackPolicy,
    SimulatedBackend,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn fields(value: serde_json::Value) -> Fields {
    serde_json::from_value(value).unwrap()
}

fn person(first: &str, last: &str) -> Fields {
    fields(json!({"firstName": first, "lastName": last, "city": "", "state": ""}))
}

#[tokio::test(start_paused = true)]
async fn editing_session_against_simulated_backend() {
    let backend = Arc::new(SimulatedBackend::new(Duration::from_millis(1000)));
    let facade = RequestFacade::new(Forest::new(), backend.clone(), RequestConfig::default());
    facade.set_validator(RequiredFields::person_names());

    // Two managers, then a subordinate under the second.
    let first = facade.create(person("Ada", "Lovelace"), None).unwrap();
    let second = facade.create(person("Grace", "Hopper"), None).unwrap();
    let sub = facade.create(person("Alan", "Turing"), Some("2")).unwrap();
    assert_eq!(
        [first.record_id(), second.record_id(), sub.record_id()],
        [Some("1"), Some("2"), Some("2.1")]
    );
    assert_eq!(facade.status().pending, 3);
    let results = futures::future::join_all(vec![first.settled(), second.settled(), sub.settled()]).await;
    assert!(results.iter().all(Result::is_ok));
    assert!(!facade.status().is_saving());

    // Invalid edit never reaches the store.
    assert!(matches!(
        facade.update("2.1", fields(json!({"firstName": ""}))),
        Err(ApiError::Validation(_))
    ));
    assert_eq!(facade.find("2.1").unwrap().fields["firstName"], "Alan");

    facade
        .update("2.1", fields(json!({"city": "Wilmslow"})))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(facade.find("2.1").unwrap().fields["city"], "Wilmslow");

    facade.delete("2").unwrap().await.unwrap();
    assert!(facade.find("2.1").is_none());
    let loaded = facade.fetch().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "1");
    assert_eq!(facade.status().completed, 5);
}

#[tokio::test(start_paused = true)]
async fn failed_delete_is_reverted_in_place() {
    let backend = Arc::new(SimulatedBackend::new(Duration::from_millis(200)));
    let config = RequestConfig {
        rollback: RollbackPolicy::Revert,
        ..RequestConfig::default()
    };
    let mut forest = Forest::new();
    for parent in [None, Some("1"), Some("1"), Some("1")] {
        canopy::RecordStore::create(&mut forest, Fields::new(), parent).unwrap();
    }
    let facade = RequestFacade::new(forest, backend.clone(), config);

    backend.fail_next(1);
    let pending = facade.delete("1.2").unwrap();
    let ids = |f: &RequestFacade<Forest>| -> Vec<String> {
        f.find("1").unwrap().children.into_iter().map(|c| c.id).collect()
    };
    assert_eq!(ids(&facade), vec!["1.1", "1.3"]);
    assert!(matches!(pending.await, Err(ApiError::Settlement(_))));
    assert_eq!(ids(&facade), vec!["1.1", "1.2", "1.3"]);

    let status = facade.status();
    assert_eq!(status.failed, 1);
    assert_eq!(status.rolled_back, 1);
}
