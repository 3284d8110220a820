//! Executor parity specs
//!
//! The same scenarios run against the in-process executor and, when asked
//! for with `--ignored`, against the Lua scripts on the Redis server named
//! by `BAKERY_REDIS_URL`. Keys and ids carry a per-run namespace so a shared
//! server can be reused; index checks are membership checks for the same
//! reason.

use crate::prelude::*;

type Pair<E, C> = (BakeStore<E, C>, BakeStore<E, C>);

struct Names {
    ns: String,
}

impl Names {
    fn key(&self, name: &str) -> BakeKey {
        BakeKey::new(format!("{}:{name}@us-east-1", self.ns))
    }

    fn id(&self, name: &str) -> BakeId {
        BakeId::new(format!("{}-{name}", self.ns))
    }
}

async fn incomplete<E: ScriptExecutor, C: Clock>(store: &BakeStore<E, C>, id: &BakeId) -> bool {
    store.get_incomplete_bake_ids().await.unwrap().contains(id)
}

async fn lock_is_exclusive_and_token_checked<E: ScriptExecutor, C: Clock>(
    (a, b): &Pair<E, C>,
    names: &Names,
) {
    let key = names.key("lock");
    assert!(a.acquire_bake_lock(&key).await.unwrap());
    assert!(!b.acquire_bake_lock(&key).await.unwrap());
    assert!(!b.release_bake_lock(&key).await.unwrap());
    assert!(a.release_bake_lock(&key).await.unwrap());
    assert!(b.acquire_bake_lock(&key).await.unwrap());
    assert!(b.release_bake_lock(&key).await.unwrap());
}

async fn lifecycle_is_mirrored_and_indexed<E: ScriptExecutor, C: Clock>(
    (a, _): &Pair<E, C>,
    names: &Names,
) {
    let key = names.key("life");
    let id = names.id("life");
    assert!(a.acquire_bake_lock(&key).await.unwrap());
    let created = a.create_bake(&key, "us-east-1", &sample_request("app"), &id).await.unwrap();
    assert_eq!(created, BakeStatus::pending(id.clone()));
    assert!(incomplete(a, &id).await);
    assert!(!a.release_bake_lock(&key).await.unwrap(), "creation should have released the lock");

    let details = BakeDetails::new(id.clone()).ami("ami-123");
    a.update_bake_details(&id, &details).await.unwrap();
    a.store_bake_error(&id, "retrying").await.unwrap();
    let done = BakeStatus::completed(id.clone(), BakeResult::Success);
    a.update_bake_status(&id, &done, &sample_logs("ok")).await.unwrap();

    assert!(!incomplete(a, &id).await);
    assert_eq!(a.retrieve_bake_status_by_id(&id).await.unwrap(), Some(done.clone()));
    assert_eq!(a.retrieve_bake_status_by_key(&key).await.unwrap(), Some(done));
    assert_eq!(a.retrieve_bake_details_by_id(&id).await.unwrap(), Some(details));
    assert_eq!(a.retrieve_bake_logs_by_id(&id).await.unwrap(), Some(sample_logs("ok")));
    assert_eq!(a.retrieve_bake_error_by_id(&id).await.unwrap().as_deref(), Some("retrying"));
    assert_eq!(a.retrieve_bake_request_by_id(&id).await.unwrap(), Some(sample_request("app")));
    assert_eq!(a.retrieve_region_by_id(&id).await.unwrap().as_deref(), Some("us-east-1"));

    assert!(a.delete_bake_by_key(&key).await.unwrap());
    assert!(!a.delete_bake_by_key(&key).await.unwrap());
    assert_eq!(a.retrieve_bake_status_by_id(&id).await.unwrap(), None);
}

async fn second_creation_returns_winner<E: ScriptExecutor, C: Clock>(
    (a, b): &Pair<E, C>,
    names: &Names,
) {
    let key = names.key("race");
    let winner = names.id("race-1");
    let loser = names.id("race-2");

    let first = a.create_bake(&key, "us-east-1", &sample_request("app"), &winner).await.unwrap();
    let second = b.create_bake(&key, "us-east-1", &sample_request("app"), &loser).await.unwrap();

    assert_eq!(second, first);
    assert_eq!(b.retrieve_bake_status_by_id(&loser).await.unwrap(), None);
    assert!(!incomplete(b, &loser).await);
    assert!(a.delete_bake_by_key(&key).await.unwrap());
}

async fn late_creation_keeps_new_holder_lock<E: ScriptExecutor, C: Clock>(
    (a, b): &Pair<E, C>,
    names: &Names,
) {
    let key = names.key("held");
    assert!(b.acquire_bake_lock(&key).await.unwrap());
    a.create_bake(&key, "us-east-1", &sample_request("app"), &names.id("held")).await.unwrap();

    assert!(b.release_bake_lock(&key).await.unwrap(), "b's lock was released by a's creation");
    assert!(a.delete_bake_by_key(&key).await.unwrap());
}

async fn retried_creation_stays_writable<E: ScriptExecutor, C: Clock>(
    (a, _): &Pair<E, C>,
    names: &Names,
) {
    let key = names.key("retry");
    let id = names.id("retry");
    a.create_bake(&key, "us-east-1", &sample_request("app"), &id).await.unwrap();
    let again = a.create_bake(&key, "us-east-1", &sample_request("app"), &id).await.unwrap();
    assert_eq!(again, BakeStatus::pending(id.clone()));

    let done = BakeStatus::completed(id.clone(), BakeResult::Failure);
    a.update_bake_status(&id, &done, &BakeLogs::new()).await.unwrap();

    assert_eq!(a.retrieve_bake_status_by_id(&id).await.unwrap(), Some(done.clone()));
    assert_eq!(a.retrieve_bake_status_by_key(&key).await.unwrap(), Some(done));
    assert!(!incomplete(a, &id).await);
    assert!(a.delete_bake_by_key(&key).await.unwrap());
}

async fn cancel_rewrites_status_and_frees_key<E: ScriptExecutor, C: Clock>(
    (a, _): &Pair<E, C>,
    names: &Names,
) {
    let key = names.key("cancel");
    let id = names.id("cancel");
    a.create_bake(&key, "us-east-1", &sample_request("app"), &id).await.unwrap();
    let running = BakeStatus::running(id.clone()).resource_id("i-0abc");
    a.update_bake_status(&id, &running, &BakeLogs::new()).await.unwrap();

    assert!(a.cancel_bake_by_id(&id).await.unwrap());
    let cancelled = a.retrieve_bake_status_by_id(&id).await.unwrap().unwrap();
    assert_eq!(cancelled.state, BakeState::Cancelled);
    assert_eq!(cancelled.result, Some(BakeResult::Failure));
    assert_eq!(cancelled.resource_id.as_deref(), Some("i-0abc"));
    assert!(!incomplete(a, &id).await);
    assert_eq!(a.retrieve_bake_status_by_key(&key).await.unwrap(), None);

    assert!(!a.cancel_bake_by_id(&id).await.unwrap());
    assert_eq!(a.retrieve_bake_status_by_id(&id).await.unwrap(), Some(cancelled));

    let fresh = names.id("cancel-2");
    assert!(a.acquire_bake_lock(&key).await.unwrap());
    let status = a.create_bake(&key, "us-east-1", &sample_request("app"), &fresh).await.unwrap();
    assert_eq!(status, BakeStatus::pending(fresh));
    assert!(a.delete_bake_by_key(&key).await.unwrap());
}

async fn writes_to_unknown_id_are_dropped<E: ScriptExecutor, C: Clock>(
    (a, _): &Pair<E, C>,
    names: &Names,
) {
    let ghost = names.id("ghost");
    a.update_bake_status(&ghost, &BakeStatus::running(ghost.clone()), &BakeLogs::new())
        .await
        .unwrap();
    a.store_bake_error(&ghost, "lost").await.unwrap();

    assert_eq!(a.retrieve_bake_status_by_id(&ghost).await.unwrap(), None);
    assert!(!incomplete(a, &ghost).await);
}

async fn run_scenarios<E: ScriptExecutor, C: Clock>(pair: Pair<E, C>, ns: &str) {
    let names = Names { ns: ns.to_string() };
    lock_is_exclusive_and_token_checked(&pair, &names).await;
    lifecycle_is_mirrored_and_indexed(&pair, &names).await;
    second_creation_returns_winner(&pair, &names).await;
    late_creation_keeps_new_holder_lock(&pair, &names).await;
    retried_creation_stays_writable(&pair, &names).await;
    cancel_rewrites_status_and_frees_key(&pair, &names).await;
    writes_to_unknown_id_are_dropped(&pair, &names).await;
}

#[tokio::test]
async fn scenarios_hold_in_memory() {
    let cluster = Cluster::new();
    run_scenarios((cluster.instance("a"), cluster.instance("b")), "mem").await;
}

#[tokio::test]
#[ignore = "needs a Redis server at BAKERY_REDIS_URL"]
async fn scenarios_hold_against_redis() {
    let base = StoreConfig::from_env().unwrap();
    let ns = BakeId::generate().to_string();
    let connect = |suffix: &str| {
        let config = StoreConfig { instance_id: format!("{ns}-{suffix}"), ..base.clone() };
        BakeStore::connect(&config).unwrap()
    };
    run_scenarios((connect("a"), connect("b")), &ns).await;
}
