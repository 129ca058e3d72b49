//! Registry resolution against a throwaway HTTP responder and local directories

use billingsdk_core::registry::{DescriptorOrigin, Framework, Provider, RegistryResolver};
use billingsdk_core::BillingError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

const REMOTE_DESCRIPTOR: &str =
    r#"{"files":[{"target":"lib/paypal.ts","content":"remote"}],"dependencies":["@paypal/paypal-server-sdk"]}"#;

/// Serve every request with a fixed status and body; returns the base URL and a hit counter
async fn serve(status: &'static str, body: &'static str) -> (Url, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf[read..]).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => read += n,
                }
                if read == buf.len() {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    let url = Url::parse(&format!("http://{}/tr", addr)).unwrap();
    (url, hits)
}

/// A base URL nothing listens on
async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/tr", addr)).unwrap()
}

fn write_descriptor(dir: &Path, name: &str, content: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn local_descriptor(marker: &str) -> String {
    format!(
        r#"{{"files":[{{"target":"lib/paypal.ts","content":"{}"}}]}}"#,
        marker
    )
}

fn resolver(remote: Option<Url>, local: Vec<PathBuf>) -> RegistryResolver {
    RegistryResolver::new(remote, local, "billingsdk-test", Duration::from_secs(5))
}

#[tokio::test]
async fn remote_descriptor_wins_over_local() {
    let (url, hits) = serve("200 OK", REMOTE_DESCRIPTOR).await;
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "nextjs-paypal.json", &local_descriptor("local"));

    let resolved = resolver(Some(url.clone()), vec![dir.path().to_path_buf()])
        .resolve(Framework::Nextjs, Provider::Paypal)
        .await
        .unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(resolved.descriptor.files[0].content, "remote");
    assert_eq!(
        resolved.origin,
        DescriptorOrigin::Remote(Url::parse(&format!("{}/nextjs-paypal.json", url)).unwrap())
    );
}

#[tokio::test]
async fn http_error_falls_back_to_local() {
    let (url, hits) = serve("404 Not Found", r#"{"error":"missing"}"#).await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_descriptor(dir.path(), "express-paypal.json", &local_descriptor("local"));

    let resolved = resolver(Some(url), vec![dir.path().to_path_buf()])
        .resolve(Framework::Express, Provider::Paypal)
        .await
        .unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(resolved.origin, DescriptorOrigin::Local(path));
    assert_eq!(resolved.descriptor.files[0].content, "local");
}

#[tokio::test]
async fn invalid_remote_body_falls_back_to_local() {
    let (url, _) = serve("200 OK", "<html>maintenance</html>").await;
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "react-paypal.json", &local_descriptor("local"));

    let resolved = resolver(Some(url), vec![dir.path().to_path_buf()])
        .resolve(Framework::React, Provider::Paypal)
        .await
        .unwrap();

    assert!(matches!(resolved.origin, DescriptorOrigin::Local(_)));
}

#[tokio::test]
async fn network_failure_uses_first_valid_local_candidate() {
    let url = unreachable_url().await;
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("missing");
    let broken = root.path().join("broken");
    let first = root.path().join("first");
    let second = root.path().join("second");
    write_descriptor(&broken, "nextjs-paypal.json", "{ not json");
    let first_path = write_descriptor(&first, "nextjs-paypal.json", &local_descriptor("first"));
    write_descriptor(&second, "nextjs-paypal.json", &local_descriptor("second"));

    let resolved = resolver(Some(url), vec![missing, broken, first, second])
        .resolve(Framework::Nextjs, Provider::Paypal)
        .await
        .unwrap();

    assert_eq!(resolved.origin, DescriptorOrigin::Local(first_path));
    assert_eq!(resolved.descriptor.files[0].content, "first");
}

#[tokio::test]
async fn local_only_never_contacts_remote() {
    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "hono-stripe.json", &local_descriptor("local"));

    let resolved = resolver(None, vec![dir.path().to_path_buf()])
        .resolve(Framework::Hono, Provider::Stripe)
        .await
        .unwrap();

    assert!(matches!(resolved.origin, DescriptorOrigin::Local(_)));
}

#[tokio::test]
async fn everything_failing_is_fatal_and_descriptive() {
    let url = unreachable_url().await;
    let dir = tempfile::tempdir().unwrap();

    let err = resolver(Some(url), vec![dir.path().to_path_buf()])
        .resolve(Framework::Fastify, Provider::Dodopayments)
        .await
        .unwrap_err();

    match &err {
        BillingError::RegistryUnavailable { filename, attempts } => {
            assert_eq!(filename, "fastify-dodopayments.json");
            assert_eq!(attempts.len(), 2);
            assert!(attempts[1].ends_with("not found"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("BILLINGSDK_REGISTRY_LOCAL_PATH"));
}
