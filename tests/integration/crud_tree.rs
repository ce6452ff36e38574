use canopy::store::search;
use canopy::{Fields, Forest, RecordStore};
use serde_json::json;

fn fields(value: serde_json::Value) -> Fields {
    serde_json::from_value(value).unwrap()
}

fn seeded() -> Forest {
    Forest::from_json(
        r#"[
            {"id": "1", "firstName": "Dylan", "lastName": "Murray", "city": "East Daphne", "state": "Kentucky",
             "children": [
                {"id": "1.1", "firstName": "Raquel", "lastName": "Kohler", "city": "Columbus", "state": "Ohio", "children": []}
             ]},
            {"id": "2", "firstName": "Ervin", "lastName": "Reinger", "city": "South Linda", "state": "West Virginia",
             "children": []}
        ]"#,
    )
    .unwrap()
}

#[test]
fn end_to_end_create_child_then_delete() {
    let mut forest = Forest::from_json(r#"[{"id": "1", "children": []}]"#).unwrap();

    forest
        .create(fields(json!({"firstName": "A"})), Some("1"))
        .unwrap();
    assert_eq!(
        serde_json::to_value(forest.roots()).unwrap(),
        json!([{"id": "1", "children": [{"id": "1.1", "firstName": "A", "children": []}]}])
    );

    forest.delete("1.1").unwrap();
    assert_eq!(
        serde_json::to_value(forest.roots()).unwrap(),
        json!([{"id": "1", "children": []}])
    );
}

#[test]
fn seeded_forest_continues_numbering() {
    let mut forest = seeded();
    assert_eq!(forest.create(Fields::new(), None).unwrap(), "3");
    assert_eq!(forest.create(Fields::new(), Some("1")).unwrap(), "1.2");
    assert_eq!(forest.create(Fields::new(), Some("1.1")).unwrap(), "1.1.1");
    assert_eq!(forest.len(), 6);
}

#[test]
fn update_merges_without_touching_structure() {
    let mut forest = seeded();
    forest
        .update("1", fields(json!({"city": "X"})))
        .unwrap();
    let record = forest.find("1").unwrap();
    assert_eq!(record.fields["city"], "X");
    assert_eq!(record.fields["firstName"], "Dylan");
    assert_eq!(record.children.len(), 1);
    assert_eq!(forest.find("2").unwrap().fields["city"], "South Linda");
}

#[test]
fn deleting_a_manager_drops_subordinates() {
    let mut forest = seeded();
    forest.delete("1").unwrap();
    assert!(search::find(forest.roots(), "1.1").is_none());
    assert_eq!(search::ids(forest.roots()), vec!["2"]);
}

#[test]
fn search_with_empty_id_is_not_found() {
    let forest = seeded();
    assert!(forest.find("").is_none());
}
