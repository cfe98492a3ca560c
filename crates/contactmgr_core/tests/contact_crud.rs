use contactmgr_core::{
    Contact, ContactBuilder, ContactRepository, ContactService, RepoError, SessionFactory,
    SqliteContactRepository,
};
use std::collections::HashSet;

fn chris() -> Contact {
    ContactBuilder::new("Chris", "Ramacciotti")
        .unwrap()
        .with_email("rama@teamtreehouse.com")
        .with_phone(7_735_556_666)
        .build()
}

#[test]
fn save_and_find_roundtrip() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let mut contact = chris();
    let id = repo.save(&mut contact).unwrap();
    assert_eq!(contact.id(), Some(id));

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, contact);
}

#[test]
fn save_assigns_fresh_ids() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let mut first = chris();
    let mut second = ContactBuilder::new("Ada", "Lovelace").unwrap().build();
    let first_id = repo.save(&mut first).unwrap();
    let second_id = repo.save(&mut second).unwrap();

    assert_eq!(first_id, 1);
    assert_ne!(first_id, second_id);
}

#[test]
fn save_rejects_already_persisted_contact() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let mut contact = chris();
    let id = repo.save(&mut contact).unwrap();

    let err = repo.save(&mut contact).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyPersisted(existing) if existing == id));
    assert_eq!(repo.fetch_all().unwrap().len(), 1);
}

#[test]
fn find_unknown_id_returns_none() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    assert!(repo.find_by_id(42).unwrap().is_none());
    assert!(repo.find_by_id(-1).unwrap().is_none());
}

#[test]
fn fetch_all_returns_every_saved_contact() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let mut saved_ids = HashSet::new();
    for (first, last) in [("Chris", "Ramacciotti"), ("Ada", "Lovelace"), ("Alan", "Turing")] {
        let mut contact = ContactBuilder::new(first, last).unwrap().build();
        saved_ids.insert(repo.save(&mut contact).unwrap());
    }

    let listed = repo.fetch_all().unwrap();
    assert_eq!(listed.len(), 3);
    let listed_ids: HashSet<_> = listed.iter().filter_map(Contact::id).collect();
    assert_eq!(listed_ids, saved_ids);
}

#[test]
fn update_changes_first_name_only() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let mut contact = chris();
    let id = repo.save(&mut contact).unwrap();

    let mut fetched = repo.find_by_id(id).unwrap().unwrap();
    fetched.set_first_name("Mike").unwrap();
    repo.update(&fetched).unwrap();

    let reloaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.first_name(), "Mike");
    assert_eq!(reloaded.last_name(), contact.last_name());
    assert_eq!(reloaded.email(), contact.email());
    assert_eq!(reloaded.phone(), contact.phone());
    assert_eq!(reloaded.created_at(), contact.created_at());
}

#[test]
fn update_can_clear_optional_fields() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let mut contact = chris();
    let id = repo.save(&mut contact).unwrap();
    contact.set_email(None);
    contact.set_phone(None);
    repo.update(&contact).unwrap();

    let reloaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.email(), None);
    assert_eq!(reloaded.phone(), None);
}

#[test]
fn update_and_delete_require_saved_contact() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let unsaved = chris();
    assert!(matches!(repo.update(&unsaved).unwrap_err(), RepoError::Unsaved));
    assert!(matches!(repo.delete(&unsaved).unwrap_err(), RepoError::Unsaved));
}

#[test]
fn update_and_delete_missing_row_return_not_found() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let mut contact = chris();
    let id = repo.save(&mut contact).unwrap();
    repo.delete(&contact).unwrap();

    let err = repo.update(&contact).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
    let err = repo.delete(&contact).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn delete_removes_row_and_ids_are_not_reused() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&factory);

    let mut contact = chris();
    let id = repo.save(&mut contact).unwrap();
    repo.delete(&contact).unwrap();

    assert!(repo.find_by_id(id).unwrap().is_none());
    assert!(repo.fetch_all().unwrap().iter().all(|c| c.id() != Some(id)));

    let mut next = chris();
    let next_id = repo.save(&mut next).unwrap();
    assert!(next_id > id);
}

#[test]
fn separate_in_memory_factories_do_not_share_rows() {
    let first = SessionFactory::open_in_memory().unwrap();
    let second = SessionFactory::open_in_memory().unwrap();

    let mut contact = chris();
    SqliteContactRepository::new(&first).save(&mut contact).unwrap();

    assert!(SqliteContactRepository::new(&second)
        .fetch_all()
        .unwrap()
        .is_empty());
}

#[test]
fn corrupted_row_is_reported_as_invalid_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");
    let factory = SessionFactory::open(&path).unwrap();

    {
        let session = factory.open_session().unwrap();
        session
            .connection()
            .execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 INSERT INTO contacts (first_name, last_name, created_at) VALUES ('', 'Nobody', 0);",
            )
            .unwrap();
        session.close().unwrap();
    }

    let repo = SqliteContactRepository::new(&factory);
    let err = repo.fetch_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn service_delete_by_id_reports_missing_contact() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::new(&factory));

    let created = service
        .create(ContactBuilder::new("Ada", "Lovelace").unwrap())
        .unwrap();
    let id = created.id().unwrap();

    let removed = service.delete_by_id(id).unwrap();
    assert_eq!(removed, created);
    assert!(matches!(
        service.delete_by_id(id).unwrap_err(),
        RepoError::NotFound(missing) if missing == id
    ));
}

#[test]
fn end_to_end_save_update_delete_scenario() {
    let factory = SessionFactory::open_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::new(&factory));

    let mut contact = chris();
    let id = service.save(&mut contact).unwrap();
    assert_eq!(id, 1);
    assert_eq!(service.fetch_all().unwrap().len(), 1);

    let mut fetched = service.find_by_id(id).unwrap().unwrap();
    fetched.set_first_name("Mike").unwrap();
    service.update(&fetched).unwrap();

    let listed = service.fetch_all().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(
        format!("{} {}", listed[0].first_name(), listed[0].last_name()),
        "Mike Ramacciotti"
    );

    let to_delete = service.find_by_id(1).unwrap().unwrap();
    service.delete(&to_delete).unwrap();
    assert!(service.fetch_all().unwrap().is_empty());

    factory.close().unwrap();
}
