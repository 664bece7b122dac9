//! End-to-end tests for a satellite node.
//!
//! Each test spins up a code server and a satellite on random ports and talks
//! to the satellite over real TCP connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Value, json};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use satellite::config::{AddressRecord, ErrorReplyPolicy, NodeConfig};
use satellite::distribution::server::serve;
use satellite::distribution::{
    CapabilityDefinition, CodeSource, DefinitionStore, HttpCodeSource,
};
use satellite::error::{FetchError, NodeError, ProtocolError};
use satellite::protocol::{ErrorReply, read_value, write_frame};
use satellite::{Job, JobClient, Satellite};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wraps another source and counts fetches.
struct CountingSource {
    inner: HttpCodeSource,
    fetches: AtomicUsize,
}

#[async_trait]
impl CodeSource for CountingSource {
    fn label(&self) -> String {
        format!("counting {}", self.inner.label())
    }

    async fn fetch(&self, id: &str) -> Result<CapabilityDefinition, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(id).await
    }
}

/// Start a code server with the stock definitions, return its port.
async fn start_code_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(serve(listener, Arc::new(DefinitionStore::with_defaults())));
    port
}

fn node_config(code_server_port: u16) -> NodeConfig {
    NodeConfig::new(
        AddressRecord::new("127.0.0.1", 0).with_name("test-satellite"),
        AddressRecord::new("127.0.0.1", code_server_port),
    )
}

/// Start a satellite backed by a counting HTTP source.
async fn start_satellite(config: NodeConfig) -> (SocketAddr, Arc<CountingSource>) {
    let inner = HttpCodeSource::new(&config.code_server, Duration::from_secs(5)).unwrap();
    let source = Arc::new(CountingSource {
        inner,
        fetches: AtomicUsize::new(0),
    });
    let node = Satellite::bind(config, source.clone()).await.unwrap();
    let addr = node.spawn().unwrap();
    (addr, source)
}

async fn start_default() -> (SocketAddr, Arc<CountingSource>) {
    let code_port = start_code_server().await;
    start_satellite(node_config(code_port)).await
}

async fn fib(client: &JobClient<SocketAddr>, n: u64) -> Result<Value, ProtocolError> {
    client.submit(&Job::new("fibonacci", json!(n))).await
}

#[tokio::test]
async fn fibonacci_of_zero_is_zero() {
    timeout(TEST_TIMEOUT, async {
        let (addr, _) = start_default().await;
        let client = JobClient::new(addr);
        assert_eq!(fib(&client, 0).await.unwrap(), json!(0));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn fibonacci_of_ten_is_fifty_five() {
    timeout(TEST_TIMEOUT, async {
        let (addr, _) = start_default().await;
        let client = JobClient::new(addr);
        assert_eq!(fib(&client, 10).await.unwrap(), json!(55));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn repeated_jobs_fetch_once() {
    timeout(TEST_TIMEOUT, async {
        let (addr, source) = start_default().await;
        let client = JobClient::new(addr);

        for n in [1u64, 2, 3, 20] {
            fib(&client, n).await.unwrap();
        }
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn concurrent_first_jobs_fetch_once() {
    timeout(TEST_TIMEOUT, async {
        let (addr, source) = start_default().await;
        let client = JobClient::new(addr);

        let results = join_all((0..20u64).map(|n| {
            let client = client.clone();
            async move { fib(&client, n).await }
        }))
        .await;

        let expected = [0u64, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610, 987, 1597, 2584, 4181];
        for (result, want) in results.into_iter().zip(expected) {
            assert_eq!(result.unwrap(), json!(want));
        }
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_capability_closes_without_hurting_others() {
    timeout(TEST_TIMEOUT, async {
        let (addr, _) = start_default().await;
        let client = JobClient::new(addr);

        let unknown = Job::new("no-such-tool", json!(1));
        let (bad, good) = tokio::join!(client.submit(&unknown), fib(&client, 10));

        assert!(matches!(bad, Err(ProtocolError::ConnectionClosed)));
        assert_eq!(good.unwrap(), json!(55));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failing_job_does_not_stop_the_node() {
    timeout(TEST_TIMEOUT, async {
        let (addr, _) = start_default().await;
        let client = JobClient::new(addr);

        let bad = client
            .submit(&Job::new("fibonacci", json!({"n": "ten"})))
            .await;
        assert!(matches!(bad, Err(ProtocolError::ConnectionClosed)));

        assert_eq!(fib(&client, 12).await.unwrap(), json!(144));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn garbage_and_early_close_are_isolated() {
    timeout(TEST_TIMEOUT, async {
        let (addr, _) = start_default().await;

        // Not an envelope at all.
        let mut garbage = TcpStream::connect(addr).await.unwrap();
        write_frame(&mut garbage, b"\x00\x01 definitely not json").await.unwrap();
        let reply = read_value(&mut garbage, 1024).await;
        assert!(matches!(reply, Err(ProtocolError::ConnectionClosed)));

        // Unsupported kind.
        let mut register = TcpStream::connect(addr).await.unwrap();
        let body = br#"{"kind": "REGISTER_SATELLITE", "content": {"host": null, "port": 1, "name": null}}"#;
        write_frame(&mut register, body).await.unwrap();
        assert!(read_value(&mut register, 1024).await.is_err());

        // Half a frame, then hang up.
        let mut partial = TcpStream::connect(addr).await.unwrap();
        partial.write_all(&[0, 0, 0, 50, b'{']).await.unwrap();
        drop(partial);

        let client = JobClient::new(addr);
        assert_eq!(fib(&client, 10).await.unwrap(), json!(55));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn explicit_error_replies() {
    timeout(TEST_TIMEOUT, async {
        let code_port = start_code_server().await;
        let mut config = node_config(code_port);
        config.error_replies = ErrorReplyPolicy::Explicit;
        let (addr, _) = start_satellite(config).await;
        let client = JobClient::new(addr);

        let reply = client
            .submit(&Job::new("no-such-tool", json!(1)))
            .await
            .unwrap();
        let reply = ErrorReply::from_value(&reply).expect("expected an error reply");
        assert_eq!(reply.error.kind, "load_failure");

        let reply = client.submit(&Job::new("", json!(1))).await.unwrap();
        assert_eq!(
            ErrorReply::from_value(&reply).unwrap().error.kind,
            "unknown_capability"
        );

        assert_eq!(fib(&client, 10).await.unwrap(), json!(55));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bounded_connections_still_serve_everyone() {
    timeout(TEST_TIMEOUT, async {
        let code_port = start_code_server().await;
        let mut config = node_config(code_port);
        config.max_connections = Some(2);
        let (addr, _) = start_satellite(config).await;
        let client = JobClient::new(addr);

        let results = join_all((0..8u64).map(|_| {
            let client = client.clone();
            async move {
                client
                    .submit(&Job::new("plus_one", json!(41)))
                    .await
            }
        }))
        .await;
        for result in results {
            assert_eq!(result.unwrap(), json!(42));
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn nodes_in_one_process_have_separate_caches() {
    timeout(TEST_TIMEOUT, async {
        let code_port = start_code_server().await;
        let (addr_a, source_a) = start_satellite(node_config(code_port)).await;
        let (addr_b, source_b) = start_satellite(node_config(code_port)).await;

        fib(&JobClient::new(addr_a), 5).await.unwrap();
        fib(&JobClient::new(addr_a), 6).await.unwrap();
        fib(&JobClient::new(addr_b), 7).await.unwrap();

        assert_eq!(source_a.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(source_b.fetches.load(Ordering::SeqCst), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bind_conflict_is_bind_error() {
    timeout(TEST_TIMEOUT, async {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let config = NodeConfig::new(
            AddressRecord::new("127.0.0.1", port),
            AddressRecord::new("127.0.0.1", 1),
        );
        let source = HttpCodeSource::new(&config.code_server, Duration::from_secs(1)).unwrap();
        let err = Satellite::bind(config, Arc::new(source)).await.err().unwrap();
        assert!(matches!(err, NodeError::Bind { .. }));
    })
    .await
    .expect("test timed out");
}
