use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pawlog_core::gateway::MemoryGateway;
use pawlog_core::models::{
    BodyCondition, LogEntry, NewPet, PetAge, PetForm, PetId, RecordedCondition,
};
use pawlog_core::{Error, ErrorKind, PetRecords};
use pretty_assertions::assert_eq;

fn setup(owner: &str) -> (Arc<MemoryGateway>, PetRecords) {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.sign_in_as(owner);
    let records = PetRecords::new(gateway.clone());
    (gateway, records)
}

fn rex_form() -> PetForm {
    PetForm {
        name: "Rex".to_string(),
        species: "Dog".to_string(),
        breed: String::new(),
        age: "3".to_string(),
    }
}

#[tokio::test]
async fn created_pet_is_listed_once_for_owner_only() {
    let (gateway, records) = setup("owner-a");

    let rex = records.create_pet_for_current_user(rex_form()).await.unwrap();
    assert_eq!(rex.owner_id, "owner-a");

    let pets = records.list_pets().await.unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].name, "Rex");
    assert_eq!(pets[0].id, rex.id);

    gateway.sign_in_as("owner-b");
    assert!(records.list_pets().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_pets_is_newest_first() {
    let (_, records) = setup("owner-a");
    for name in ["Rex", "Tom", "Kiwi"] {
        records
            .create_pet_for_current_user(PetForm {
                name: name.to_string(),
                ..rex_form()
            })
            .await
            .unwrap();
    }

    let names: Vec<String> = records
        .list_pets()
        .await
        .unwrap()
        .into_iter()
        .map(|pet| pet.name)
        .collect();
    assert_eq!(names, vec!["Kiwi", "Tom", "Rex"]);
}

#[tokio::test]
async fn list_pets_requires_a_principal() {
    let (gateway, records) = setup("owner-a");
    gateway.sign_out();
    let error = records.list_pets().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotAuthenticated);
    assert_eq!(gateway.round_trips(), 0);
}

#[tokio::test]
async fn create_pet_for_current_user_fails_fast_when_signed_out() {
    let (gateway, records) = setup("owner-a");
    gateway.sign_out();
    let error = records
        .create_pet_for_current_user(rex_form())
        .await
        .unwrap_err();
    assert!(matches!(error, Error::NotAuthenticated));
    assert_eq!(gateway.row_count("pets"), 0);
}

#[tokio::test]
async fn create_pet_surfaces_backend_message() {
    let (gateway, records) = setup("owner-a");
    let draft = NewPet {
        name: "Rex".to_string(),
        species: "Dog".to_string(),
        breed: Some("Beagle".to_string()),
        age: PetAge::from_input("3"),
        owner_id: "someone-else".to_string(),
    };
    let error = records.create_pet(&draft).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Gateway);
    assert!(error.to_string().contains("row-level security"));
    assert_eq!(gateway.row_count("pets"), 0);
}

#[tokio::test]
async fn pet_without_logs_has_empty_collections() {
    let (_, records) = setup("owner-a");
    let rex = records.create_pet_for_current_user(rex_form()).await.unwrap();

    let fetched = records.get_pet(rex.id).await.unwrap().unwrap();
    assert!(fetched.weight_logs.is_empty());
    assert!(fetched.body_condition_logs.is_empty());
    assert!(fetched.vet_visit_logs.is_empty());
}

#[tokio::test]
async fn get_pet_conflates_missing_and_foreign() {
    let (gateway, records) = setup("owner-a");
    let rex = records.create_pet_for_current_user(rex_form()).await.unwrap();

    assert!(records.get_pet(PetId::new()).await.unwrap().is_none());

    gateway.sign_in_as("owner-b");
    assert!(records.get_pet(rex.id).await.unwrap().is_none());
}

#[tokio::test]
async fn get_pet_propagates_gateway_failures() {
    let (gateway, records) = setup("owner-a");
    let rex = records.create_pet_for_current_user(rex_form()).await.unwrap();
    gateway.fail_next("connection reset");
    let error = records.get_pet(rex.id).await.unwrap_err();
    assert_eq!(error.to_string(), "connection reset");
}

#[tokio::test]
async fn weight_log_scenario() {
    let (_, records) = setup("owner-a");
    let rex = records.create_pet_for_current_user(rex_form()).await.unwrap();
    let observed_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let entry = records
        .append_weight_log(rex.id, "4.2", observed_at)
        .await
        .unwrap();
    assert_eq!(entry.pet_id(), rex.id);

    let fetched = records.get_pet(rex.id).await.unwrap().unwrap();
    assert_eq!(fetched.weight_logs.len(), 1);
    assert_eq!(fetched.weight_logs[0].weight, "4.2");
    assert_eq!(fetched.weight_logs[0].date, observed_at);
}

#[tokio::test]
async fn each_append_grows_exactly_its_collection() {
    let (_, records) = setup("owner-a");
    let rex = records.create_pet_for_current_user(rex_form()).await.unwrap();
    let observed_at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap();

    records
        .append_body_condition_log(rex.id, BodyCondition::Ideal, observed_at)
        .await
        .unwrap();
    let after_body = records.get_pet(rex.id).await.unwrap().unwrap();
    assert_eq!(after_body.body_condition_logs.len(), 1);
    assert_eq!(
        after_body.body_condition_logs[0].body_condition,
        RecordedCondition::Known(BodyCondition::Ideal)
    );
    assert!(after_body.weight_logs.is_empty());
    assert!(after_body.vet_visit_logs.is_empty());

    let entry = records
        .append_vet_visit_log(rex.id, "Annual checkup", observed_at)
        .await
        .unwrap();
    assert!(matches!(entry, LogEntry::VetVisit(ref log) if log.notes == "Annual checkup"));
    let after_vet = records.get_pet(rex.id).await.unwrap().unwrap();
    assert_eq!(after_vet.vet_visit_logs.len(), 1);
    assert_eq!(after_vet.body_condition_logs.len(), 1);
}

#[tokio::test]
async fn append_against_unknown_pet_fails_without_writing() {
    let (gateway, records) = setup("owner-a");
    let observed_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let weight = records
        .append_weight_log(PetId::new(), "4.2", observed_at)
        .await
        .unwrap_err();
    let body = records
        .append_body_condition_log(PetId::new(), BodyCondition::Obese, observed_at)
        .await
        .unwrap_err();
    let vet = records
        .append_vet_visit_log(PetId::new(), "Vaccines", observed_at)
        .await
        .unwrap_err();

    for error in [weight, body, vet] {
        assert_eq!(error.kind(), ErrorKind::Gateway);
    }
    assert_eq!(gateway.row_count("weight_logs"), 0);
    assert_eq!(gateway.row_count("body_condition_logs"), 0);
    assert_eq!(gateway.row_count("vet_visit_logs"), 0);
}
