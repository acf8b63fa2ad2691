use crate::tests::RecordingSink;
use crate::BroadcastManager;

use std::collections::HashSet;

use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![(0u8..8).prop_map(Op::Add), (0u8..8).prop_map(Op::Remove)]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn given_any_add_remove_sequence_when_applied_then_registry_matches_model(
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        runtime().block_on(async {
            let manager = BroadcastManager::default();
            let mut live = HashSet::new();
            let mut adds = 0u64;

            for op in &ops {
                match op {
                    Op::Add(n) => {
                        let id = format!("tab-{n}");
                        manager.add_client(id.clone(), RecordingSink::new()).await;
                        live.insert(id);
                        adds += 1;
                    }
                    Op::Remove(n) => {
                        let id = format!("tab-{n}");
                        let removed = manager.remove_client(&id).await;
                        assert_eq!(removed, live.remove(&id));
                    }
                }

                let metrics = manager.metrics().await;
                assert_eq!(manager.client_count().await, live.len());
                assert_eq!(metrics.active_connections, live.len());
                assert_eq!(metrics.total_connections_served, adds);
                assert!(metrics.total_connections_served >= metrics.active_connections as u64);
            }

            for id in &live {
                assert!(manager.has_client(id).await);
            }
        });
    }

    #[test]
    fn given_random_failing_sinks_when_broadcast_then_only_healthy_remain(
        failing in prop::collection::vec(any::<bool>(), 1..16),
    ) {
        runtime().block_on(async {
            let manager = BroadcastManager::default();
            for (i, fail) in failing.iter().enumerate() {
                let sink = RecordingSink::new();
                manager.add_client(format!("tab-{i}"), sink.clone()).await;
                sink.set_fail_writes(*fail);
            }

            let delivered = manager
                .broadcast(crate::EventType::MeetingStatusChanged, None)
                .await;

            let healthy = failing.iter().filter(|f| !**f).count();
            assert_eq!(delivered, healthy);
            assert_eq!(manager.client_count().await, healthy);
            for (i, fail) in failing.iter().enumerate() {
                assert_eq!(manager.has_client(&format!("tab-{i}")).await, !*fail);
            }
        });
    }
}
