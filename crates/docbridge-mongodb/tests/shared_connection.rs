//! Shared connection behavior that needs no server.
//!
//! The process-wide registry can only be initialized once, so these tests
//! live in their own binary.

use docbridge_mongodb::{ConnectionConfig, ConnectionRegistry, DocumentModel, ModelConfig};
use std::sync::atomic::{AtomicUsize, Ordering};

static CONFIG_CALLS: AtomicUsize = AtomicUsize::new(0);

fn lazy_config() -> docbridge_mongodb::Result<ConnectionConfig> {
    CONFIG_CALLS.fetch_add(1, Ordering::SeqCst);
    Ok(ConnectionConfig {
        verify_on_connect: false,
        ..ConnectionConfig::new("mongodb://127.0.0.1:1")
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_caller_gets_the_same_connection() {
    let mut handles = Vec::new();
    for _ in 0..16 {
        handles.push(tokio::spawn(async {
            ConnectionRegistry::get_or_connect(lazy_config).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id());
    }
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert!(ConnectionRegistry::is_initialized());

    // Later callers and the model's shared path reuse it without new config.
    let again = ConnectionRegistry::get_instance().await.unwrap();
    assert_eq!(again.id(), ids[0]);
    assert_eq!(again.config().uri, "mongodb://127.0.0.1:1");

    let model = DocumentModel::shared(ModelConfig::default()).await.unwrap();
    assert_eq!(model.store().id(), ids[0]);

    assert_eq!(CONFIG_CALLS.load(Ordering::SeqCst), 1);
}
