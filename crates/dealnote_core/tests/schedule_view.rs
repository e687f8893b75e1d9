use dealnote_core::db::open_db_in_memory;
use dealnote_core::{
    DeliverableRepository, NewDeliverable, ScheduleService, SqliteDeliverableRepository,
};

#[test]
fn view_project_orders_dated_rows_and_trails_undated_ones() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeliverableRepository::new(&conn);

    repo.insert(&NewDeliverable::placeholder("Titan", "Draft NDA"))
        .unwrap();
    repo.insert(&NewDeliverable::new(
        "Titan",
        "File NDA",
        Some("2025-02-01".to_string()),
        None,
        None,
    ))
    .unwrap();
    repo.insert(&NewDeliverable::new(
        "Titan",
        "Sign NDA",
        Some("2025-01-10".to_string()),
        None,
        None,
    ))
    .unwrap();

    let service = ScheduleService::new(SqliteDeliverableRepository::new(&conn));
    let lines = service.view_project("Titan").unwrap();

    assert_eq!(
        lines,
        vec![
            "2025-01-10: Sign NDA".to_string(),
            "2025-02-01: File NDA".to_string(),
            "No date: Draft NDA".to_string(),
        ]
    );
}

#[test]
fn view_project_renders_dependency_labels_by_description() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeliverableRepository::new(&conn);

    let draft = repo
        .insert(&NewDeliverable::placeholder("Titan", "Draft NDA"))
        .unwrap();
    repo.insert(&NewDeliverable::new(
        "Titan",
        "Sign NDA",
        Some("2025-01-10".to_string()),
        None,
        Some(draft),
    ))
    .unwrap();

    let service = ScheduleService::new(SqliteDeliverableRepository::new(&conn));
    let lines = service.view_project("Titan").unwrap();

    assert_eq!(
        lines,
        vec![
            "2025-01-10: Sign NDA  <- depends on: Draft NDA".to_string(),
            "No date: Draft NDA".to_string(),
        ]
    );
}

#[test]
fn view_project_renders_unknown_for_links_outside_the_loaded_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeliverableRepository::new(&conn);

    // A link into another project's row is outside the per-project lookup.
    let other = repo
        .insert(&NewDeliverable::placeholder("Atlas", "Site survey"))
        .unwrap();
    repo.insert(&NewDeliverable::new(
        "Titan",
        "Grid study",
        Some("2025-03-01".to_string()),
        None,
        Some(other),
    ))
    .unwrap();

    let service = ScheduleService::new(SqliteDeliverableRepository::new(&conn));
    let lines = service.view_project("Titan").unwrap();

    assert_eq!(
        lines,
        vec!["2025-03-01: Grid study  <- depends on: Unknown".to_string()]
    );
}

#[test]
fn view_project_on_unknown_project_returns_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = ScheduleService::new(SqliteDeliverableRepository::new(&conn));

    assert!(service.view_project("Ghost").unwrap().is_empty());
}

#[test]
fn view_all_projects_groups_rows_and_keeps_undated_out_of_charting() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeliverableRepository::new(&conn);

    repo.insert(&NewDeliverable::new(
        "Titan",
        "Sign NDA",
        Some("2025-01-10".to_string()),
        None,
        None,
    ))
    .unwrap();
    repo.insert(&NewDeliverable::placeholder("Titan", "Draft NDA"))
        .unwrap();
    repo.insert(&NewDeliverable::new(
        "Atlas",
        "Site survey",
        Some("2025-01-05".to_string()),
        Some("Bo".to_string()),
        None,
    ))
    .unwrap();

    let service = ScheduleService::new(SqliteDeliverableRepository::new(&conn));
    let table = service.view_all_projects().unwrap();

    let grouped = table
        .rows
        .iter()
        .map(|row| (row.project_name.as_str(), row.description.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        grouped,
        vec![
            ("Atlas", "Site survey"),
            ("Titan", "Sign NDA"),
            ("Titan", "Draft NDA"),
        ]
    );

    let charted = table.charted_rows();
    assert_eq!(charted.len(), 2);
    assert!(charted.iter().all(|row| row.due_date.is_some()));
}
