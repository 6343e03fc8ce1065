use chrono::{TimeZone, Utc};
use memoryforge_core::{
    Entry, EntryDetails, EntryDraft, EntryField, EntryType, GoalDetails, GoalStatus, Level,
};
use uuid::Uuid;

#[test]
fn entry_serialization_uses_flat_camel_case_fields() {
    let mut details = EntryDetails::empty(EntryType::Goal);
    details.set(EntryField::Priority, Some("high")).unwrap();
    details.set(EntryField::Status, Some("not_started")).unwrap();
    let created = Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap();
    let mut entry = Entry::from_draft(
        EntryDraft::new(EntryType::Goal, "Finish draft")
            .with_description("by spring")
            .with_tags(["deadline"])
            .with_details(details),
        created,
    );
    entry.id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["type"], "goal");
    assert_eq!(json["name"], "Finish draft");
    assert_eq!(json["description"], "by spring");
    assert_eq!(json["tags"], serde_json::json!(["deadline"]));
    assert_eq!(json["priority"], "high");
    assert_eq!(json["status"], "not_started");
    assert_eq!(json["createdAt"], "2024-03-09T08:30:00Z");
    assert_eq!(json["updatedAt"], "2024-03-09T08:30:00Z");
    assert!(json.get("deadline").is_none(), "unset fields are omitted");
    assert!(json.get("details").is_none(), "details are flattened");
}

#[test]
fn collection_round_trips_element_wise() {
    let now = Utc::now();
    let mut plot = EntryDetails::empty(EntryType::PlotPoint);
    plot.set(EntryField::Characters, Some("Aria, Bren")).unwrap();
    plot.set(EntryField::Importance, Some("low")).unwrap();

    let entries = EntryType::ALL
        .iter()
        .map(|kind| Entry::from_draft(EntryDraft::new(*kind, kind.singular()), now))
        .chain(std::iter::once(Entry::from_draft(
            EntryDraft::new(EntryType::PlotPoint, "Ambush").with_details(plot),
            now,
        )))
        .collect::<Vec<_>>();

    let raw = serde_json::to_string(&entries).unwrap();
    let decoded: Vec<Entry> = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded, entries);
}

#[test]
fn mirror_written_by_the_web_app_is_readable() {
    let raw = r#"[
        {
            "name": "Aria",
            "description": "Bard of the north",
            "tags": ["protagonist"],
            "appearance": "silver hair",
            "personality": "",
            "background": "",
            "relationships": "",
            "type": "character",
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
            "createdAt": "2024-02-01T10:15:30.123Z",
            "updatedAt": "2024-02-02T11:00:00.000Z"
        },
        {
            "name": "Finish act one",
            "description": "",
            "tags": [],
            "deadline": "",
            "priority": "",
            "status": "in_progress",
            "steps": "",
            "type": "goal",
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "createdAt": "2024-02-03T09:00:00.000Z",
            "updatedAt": "2024-02-03T09:00:00.000Z"
        }
    ]"#;

    let entries: Vec<Entry> = serde_json::from_str(raw).unwrap();
    assert_eq!(entries.len(), 2);

    let aria = &entries[0];
    assert_eq!(aria.entry_type(), EntryType::Character);
    assert_eq!(aria.details.get(EntryField::Appearance).as_deref(), Some("silver hair"));
    assert_eq!(
        aria.created_at,
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 15, 30).unwrap() + chrono::Duration::milliseconds(123)
    );

    assert_eq!(
        entries[1].details,
        EntryDetails::Goal(GoalDetails {
            deadline: Some(String::new()),
            priority: None,
            status: Some(GoalStatus::InProgress),
            steps: Some(String::new()),
        })
    );
}

#[test]
fn missing_description_and_tags_default_to_empty() {
    let raw = r#"{
        "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
        "name": "Ruined Keep",
        "type": "place",
        "createdAt": "2024-02-01T10:15:30Z",
        "updatedAt": "2024-02-01T10:15:30Z"
    }"#;

    let entry: Entry = serde_json::from_str(raw).unwrap();
    assert_eq!(entry.description, "");
    assert!(entry.tags.is_empty());
    assert_eq!(entry.details, EntryDetails::empty(EntryType::Place));
}

#[test]
fn unknown_type_or_bad_choice_is_rejected() {
    let unknown_type = r#"{
        "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
        "name": "Starship",
        "type": "vehicle",
        "createdAt": "2024-02-01T10:15:30Z",
        "updatedAt": "2024-02-01T10:15:30Z"
    }"#;
    assert!(serde_json::from_str::<Entry>(unknown_type).is_err());

    let bad_choice = r#"{
        "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
        "name": "Twist",
        "type": "plotpoint",
        "importance": "critical",
        "createdAt": "2024-02-01T10:15:30Z",
        "updatedAt": "2024-02-01T10:15:30Z"
    }"#;
    assert!(serde_json::from_str::<Entry>(bad_choice).is_err());
}

#[test]
fn level_serializes_as_lowercase_word() {
    assert_eq!(serde_json::to_value(Level::Medium).unwrap(), "medium");
}
