use memoboard_core::db::open_db_in_memory;
use memoboard_core::{Device, DeviceRepository, DeviceService, RepoError, SqliteDeviceRepository};
use uuid::Uuid;

#[test]
fn register_and_resolve_owner_by_token() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();
    let service = DeviceService::new(repo);
    let owner = Uuid::new_v4();

    let device = Device::new(owner, "desk display", "tok-abc123");
    service.register_device(&device).unwrap();

    let resolved = service.resolve_owner("tok-abc123").unwrap();
    assert_eq!(resolved, Some(owner));

    assert_eq!(service.resolve_owner("tok-unknown").unwrap(), None);
}

#[test]
fn resolution_marks_device_online() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();
    let service = DeviceService::new(repo);
    let owner = Uuid::new_v4();

    let device = Device::new(owner, "kitchen panel", "tok-kitchen");
    service.register_device(&device).unwrap();

    let before = service.list_devices(owner).unwrap();
    assert_eq!(before[0].last_online, None);

    service.resolve_owner("tok-kitchen").unwrap();

    let after = service.list_devices(owner).unwrap();
    assert!(after[0].last_online.is_some());
}

#[test]
fn disabled_devices_do_not_resolve() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();

    let mut device = Device::new(owner, "retired badge", "tok-retired");
    device.enabled = false;
    repo.register_device(&device).unwrap();

    let service = DeviceService::new(SqliteDeviceRepository::try_new(&conn).unwrap());
    assert_eq!(service.resolve_owner("tok-retired").unwrap(), None);
}

#[test]
fn list_is_scoped_to_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();

    repo.register_device(&Device::new(owner_a, "a1", "tok-a1"))
        .unwrap();
    repo.register_device(&Device::new(owner_a, "a2", "tok-a2"))
        .unwrap();
    repo.register_device(&Device::new(owner_b, "b1", "tok-b1"))
        .unwrap();

    assert_eq!(repo.list_by_owner(owner_a).unwrap().len(), 2);
    assert_eq!(repo.list_by_owner(owner_b).unwrap().len(), 1);
}

#[test]
fn deleted_device_stops_resolving() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();
    let service = DeviceService::new(repo);
    let owner = Uuid::new_v4();

    let device = Device::new(owner, "loaner", "tok-loaner");
    service.register_device(&device).unwrap();

    service.delete_device(device.id).unwrap();
    assert_eq!(service.resolve_owner("tok-loaner").unwrap(), None);

    let err = service.delete_device(device.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn duplicate_token_is_rejected_by_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();

    repo.register_device(&Device::new(owner, "first", "tok-dup"))
        .unwrap();
    let err = repo
        .register_device(&Device::new(owner, "second", "tok-dup"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn blank_registration_fields_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDeviceRepository::try_new(&conn).unwrap();

    let err = repo
        .register_device(&Device::new(Uuid::new_v4(), "  ", "tok-x"))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
