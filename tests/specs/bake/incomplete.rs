//! Incomplete-index specs
//!
//! After any sequence of writes, the index holds exactly the live ids whose
//! latest status is non-terminal.

use crate::prelude::*;
use bakery_core::test_support::strategies::arb_bake_state;
use proptest::prelude::*;
use std::collections::BTreeMap;

const BAKES: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Status(usize, BakeState),
    Cancel(usize),
    Delete(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..BAKES, arb_bake_state()).prop_map(|(n, state)| Op::Status(n, state)),
        1 => (0..BAKES).prop_map(Op::Cancel),
        1 => (0..BAKES).prop_map(Op::Delete),
    ]
}

/// Id and key record presence plus incompleteness, tracked outside the store.
#[derive(Default)]
struct Model {
    incomplete: BTreeMap<usize, bool>,
    keyed: BTreeMap<usize, bool>,
}

impl Model {
    fn apply(&mut self, op: &Op) {
        match op {
            Op::Status(n, state) => {
                if let Some(flag) = self.incomplete.get_mut(n) {
                    *flag = !state.is_terminal();
                }
            }
            Op::Cancel(n) => {
                if let Some(flag) = self.incomplete.get_mut(n) {
                    *flag = false;
                    self.keyed.remove(n);
                }
            }
            Op::Delete(n) => {
                if self.keyed.remove(n).is_some() {
                    self.incomplete.remove(n);
                }
            }
        }
    }

    fn expected(&self) -> BTreeSet<BakeId> {
        self.incomplete.iter().filter(|(_, open)| **open).map(|(n, _)| id(*n)).collect()
    }
}

fn id(n: usize) -> BakeId {
    BakeId::new(format!("b-{n}"))
}

fn key(n: usize) -> String {
    format!("app-{n}@us-east-1")
}

async fn run(ops: &[Op]) -> (BTreeSet<BakeId>, BTreeSet<BakeId>) {
    let store = Cluster::new().instance("a");
    let mut model = Model::default();
    for n in 0..BAKES {
        start_bake(&store, &key(n), id(n).as_str()).await;
        model.incomplete.insert(n, true);
        model.keyed.insert(n, true);
    }

    for op in ops {
        match op {
            Op::Status(n, state) => {
                let status = BakeStatus::new(id(*n), state.clone());
                store.update_bake_status(&id(*n), &status, &BakeLogs::new()).await.unwrap();
            }
            Op::Cancel(n) => {
                store.cancel_bake_by_id(&id(*n)).await.unwrap();
            }
            Op::Delete(n) => {
                store.delete_bake_by_key(&BakeKey::new(key(*n))).await.unwrap();
            }
        }
        model.apply(op);
    }

    (store.get_incomplete_bake_ids().await.unwrap(), model.expected())
}

proptest! {
    #[test]
    fn index_matches_latest_status(ops in proptest::collection::vec(arb_op(), 0..24)) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let (actual, expected) = runtime.block_on(run(&ops));
        prop_assert_eq!(actual, expected);
    }
}

#[tokio::test]
async fn running_and_pending_are_both_incomplete() {
    let store = Cluster::new().instance("a");
    start_bake(&store, "a", "b-a").await;
    start_bake(&store, "b", "b-b").await;
    store
        .update_bake_status(&BakeId::new("b-b"), &BakeStatus::running("b-b"), &BakeLogs::new())
        .await
        .unwrap();

    assert_eq!(store.get_incomplete_bake_ids().await.unwrap(), ids(&["b-a", "b-b"]));
}
