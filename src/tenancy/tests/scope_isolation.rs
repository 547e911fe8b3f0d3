//! Concurrency guarantees of the tenant scope.
//!
//! Two scopes with interleaved execution must never observe each other's
//! tenant id, whether the tasks share one thread or hop between workers.

use tessera_tenancy::{current_tenant_id, current_tenant_id_opt, TenantScope};
use tokio::task::yield_now;

async fn observe(tenant: &str, rounds: usize) {
    for _ in 0..rounds {
        assert_eq!(current_tenant_id().unwrap(), tenant);
        yield_now().await;
    }
}

#[tokio::test(flavor = "current_thread")]
async fn interleaved_scopes_on_one_thread_stay_isolated() {
    // join! polls both futures on the same thread, interleaving them at every
    // yield point.
    tokio::join!(
        TenantScope::run("tenant-a", observe("tenant-a", 32)),
        TenantScope::run("tenant-b", observe("tenant-b", 32)),
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_tasks_stay_isolated_across_threads() {
    let mut handles = Vec::new();

    for i in 0..8 {
        let tenant = format!("tenant-{i}");
        handles.push(tokio::spawn(async move {
            TenantScope::run(tenant.clone(), async {
                for _ in 0..16 {
                    assert_eq!(current_tenant_id().unwrap(), tenant);
                    yield_now().await;
                }
            })
            .await;
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sibling_task_outside_scope_sees_nothing() {
    TenantScope::run("tenant-a", async {
        // A task spawned from inside a scope does not inherit it; the scope
        // belongs to the spawning task alone.
        let outside = tokio::spawn(async { current_tenant_id_opt() })
            .await
            .unwrap();
        assert!(outside.is_none());

        assert_eq!(current_tenant_id().unwrap(), "tenant-a");
    })
    .await;
}
