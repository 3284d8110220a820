//! Lock manager specs
//!
//! At most one instance holds the lock for a bake key until it is released
//! by creation or expires.

use crate::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_acquire_has_exactly_one_winner() {
    let cluster = Cluster::new();
    let key = BakeKey::new("ubuntu-1804-app@us-east-1");

    let mut handles = Vec::new();
    for n in 0..16 {
        let store = cluster.instance(&format!("instance-{n}"));
        let key = key.clone();
        handles.push(tokio::spawn(async move { store.acquire_bake_lock(&key).await.unwrap() }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn contended_caller_observes_winner_status() {
    let cluster = Cluster::new();
    let a = cluster.instance("a");
    let b = cluster.instance("b");
    let key = BakeKey::new("ubuntu-1804-app@us-east-1");

    assert!(a.acquire_bake_lock(&key).await.unwrap());
    assert!(!b.acquire_bake_lock(&key).await.unwrap());
    assert_eq!(b.retrieve_bake_status_by_key(&key).await.unwrap(), None);

    a.create_bake(&key, "us-east-1", &sample_request("app"), &BakeId::new("b-1001")).await.unwrap();

    let seen = b.retrieve_bake_status_by_key(&key).await.unwrap().unwrap();
    assert_eq!(seen, BakeStatus::pending("b-1001"));
}

#[tokio::test]
async fn crashed_holder_lock_self_expires() {
    let cluster = Cluster::new();
    let a = cluster.instance("a");
    let b = cluster.instance("b");
    let key = BakeKey::new("k");

    assert!(a.acquire_bake_lock(&key).await.unwrap());
    cluster.clock.advance(Duration::from_millis(4_999));
    assert!(!b.acquire_bake_lock(&key).await.unwrap());
    cluster.clock.advance(Duration::from_millis(1));
    assert!(b.acquire_bake_lock(&key).await.unwrap());
    assert!(cluster.executor.contains_key(&keys::lock_key(&key)));
}
