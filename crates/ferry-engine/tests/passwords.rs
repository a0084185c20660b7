mod support;

use ferry_core::SourceShape;
use ferry_engine::{Migrator, RecordSet};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{Call, FakeDestination, options, rate_limited, record};

fn export() -> RecordSet {
    RecordSet::new(
        vec![
            record(json!({"email": "ann@example.com", "passwordHash": "$2b$10$hash"})),
            record(json!({"email": "bob@example.com"})),
            record(json!({"user_id": "auth0|nomail", "passwordHash": "$2b$10$other"})),
        ],
        SourceShape::File,
    )
}

#[tokio::test]
async fn hashes_are_imported_and_missing_ones_counted() {
    let destination = FakeDestination::new();
    let migrator = Migrator::new(&destination, options(50));

    let counters = migrator.migrate_passwords(&export()).await;

    assert_eq!(counters.found, 3);
    assert_eq!(counters.succeeded, 2);
    assert_eq!(counters.without_hash, 1);
    assert_eq!(counters.failed, vec!["auth0|nomail"]);
    assert_eq!(counters.batches, 1);
    assert_eq!(destination.calls(), vec![Call::InviteBatch(2)]);
    assert!(destination.account("bob@example.com").is_some());
}

#[tokio::test]
async fn rejected_batch_fails_every_account_in_it() {
    let destination = FakeDestination::new().script_invites(vec![Err(rate_limited()); 4]);
    let migrator = Migrator::new(&destination, options(50));

    let counters = migrator.migrate_passwords(&export()).await;

    assert_eq!(counters.succeeded, 0);
    assert_eq!(counters.failed.len(), 3);
    assert!(counters.failed[1].starts_with("ann@example.com Reason: "));
    assert_eq!(destination.count(|call| matches!(call, Call::InviteBatch(_))), 4);
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let destination = FakeDestination::new();
    let mut opts = options(2);
    opts.dry_run = true;
    let migrator = Migrator::new(&destination, opts);

    let counters = migrator
        .migrate_passwords(&export().with_malformed(vec!["line 4: EOF while parsing".into()]))
        .await;

    assert!(destination.calls().is_empty());
    assert_eq!(counters.found, 4);
    assert_eq!(counters.succeeded, 2);
    assert_eq!(counters.failed.len(), 2);
    assert_eq!(counters.batches, 2);
}
