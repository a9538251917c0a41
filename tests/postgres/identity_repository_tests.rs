//! Identity resolution against the `PostgreSQL` user repository.

use eyre::Result;
use futures::future::try_join_all;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use taskrelay::identity::{
    domain::{DisplayName, ExternalUserId, NewUser, User, UserId},
    ports::{UserRepository, UserRepositoryError},
};

use super::helpers::{PgRelay, test_runtime};

fn new_user(external_id: &str, display_name: &str) -> NewUser {
    NewUser::new(
        ExternalUserId::new(external_id).expect("valid external id"),
        DisplayName::new(display_name).expect("valid display name"),
        &DefaultClock,
    )
}

#[rstest]
fn ensure_user_keeps_the_first_record(shared_test_cluster: &'static TestCluster) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        let identity = relay.store.identity();
        let first = identity.ensure_user("u1", "Ada").await?;
        let second = identity.ensure_user("u1", "Ada Lovelace").await?;

        assert_eq!(second.id(), first.id());
        assert_eq!(second.display_name().as_str(), "Ada");
        let stored = relay.users.find_by_id(first.id()).await?;
        assert_eq!(stored.map(|user| user.display_name().to_string()).as_deref(), Some("Ada"));
        Ok(())
    })
}

#[rstest]
fn concurrent_first_contact_yields_one_user(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        let identity = relay.store.identity();
        let attempts = (0..8).map(|_| identity.ensure_user("u-race", "Racer"));

        let users = try_join_all(attempts).await?;

        let mut ids: Vec<UserId> = users.iter().map(User::id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 1);
        let external_id = ExternalUserId::new("u-race")?;
        let stored = relay.users.find_by_external_id(&external_id).await?;
        assert_eq!(stored.as_ref().map(User::id), ids.first().copied());
        Ok(())
    })
}

#[rstest]
fn duplicate_external_id_maps_to_conflict(
    shared_test_cluster: &'static TestCluster,
) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        relay.users.insert(new_user("u1", "Ada")).await?;

        let result = relay.users.insert(new_user("u1", "Imposter")).await;

        assert!(matches!(
            result,
            Err(UserRepositoryError::DuplicateExternalId(ref id)) if id.as_str() == "u1"
        ));
        Ok(())
    })
}

#[rstest]
fn display_names_are_not_identity_keys(shared_test_cluster: &'static TestCluster) -> Result<()> {
    let relay = PgRelay::start(shared_test_cluster).expect("test database");
    test_runtime().block_on(async {
        let first = relay.users.insert(new_user("u1", "Ada")).await?;
        let second = relay.users.insert(new_user("u2", "Ada")).await?;

        assert_ne!(first.id(), second.id());
        let missing = UserId::new(second.id().value() + 100)?;
        assert_eq!(relay.users.find_by_id(missing).await?, None);
        Ok(())
    })
}
