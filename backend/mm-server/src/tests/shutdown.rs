use crate::ShutdownCoordinator;

use std::time::Duration;

use tokio::time::timeout;

#[tokio::test]
async fn given_new_coordinator_when_checked_then_not_shutdown() {
    let coordinator = ShutdownCoordinator::new();

    assert!(!coordinator.is_shutdown());
    assert!(!coordinator.subscribe_guard().poll_shutdown());
}

#[tokio::test]
async fn given_waiting_guard_when_shutdown_triggered_then_wait_resolves() {
    // Given
    let coordinator = ShutdownCoordinator::new();
    let mut guard = coordinator.subscribe_guard();
    let waiter = tokio::spawn(async move { guard.wait().await });

    // When
    coordinator.shutdown();

    // Then
    timeout(Duration::from_secs(1), waiter)
        .await
        .expect("guard resolved")
        .unwrap();
    assert!(coordinator.is_shutdown());
}

#[tokio::test]
async fn given_triggered_coordinator_when_new_guard_waits_then_resolves_immediately() {
    let coordinator = ShutdownCoordinator::new();
    coordinator.shutdown();

    let mut late = coordinator.subscribe_guard();

    assert!(late.poll_shutdown());
    timeout(Duration::from_millis(100), late.wait())
        .await
        .expect("late guard resolved");
}

#[tokio::test]
async fn given_triggered_coordinator_when_triggered_again_then_still_shutdown() {
    let coordinator = ShutdownCoordinator::new();
    let clone = coordinator.clone();

    coordinator.shutdown();
    clone.shutdown();

    assert!(coordinator.is_shutdown());
}
