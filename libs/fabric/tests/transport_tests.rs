use serde::{Deserialize, Serialize};
use std::time::Duration;
use tablewire_fabric::{
    channel::Channel,
    codec::BincodeCodec,
    error::Error,
    transport::{TcpTransport, TcpTransportListener, Transport, TransportListener},
};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TestMessage {
    id: u32,
    data: String,
}

/// Helper to get a free port
async fn get_listener() -> (TcpTransportListener, std::net::SocketAddr) {
    let listener = TcpTransportListener::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

#[tokio::test]
async fn tcp_send_receive_single_message() {
    let (listener, addr) = get_listener().await;

    tokio::spawn(async move {
        let (mut transport, _addr) = listener.accept().await.unwrap();
        let received = transport.receive().await.unwrap();
        transport.send(&received).await.unwrap(); // Echo back
    });

    let mut client = TcpTransport::connect(addr.to_string()).await.unwrap();
    let msg = b"hello world";
    client.send(msg).await.unwrap();
    let response = client.receive().await.unwrap();

    assert_eq!(response, msg);
}

#[tokio::test]
async fn tcp_multiple_messages_preserve_boundaries() {
    let (listener, addr) = get_listener().await;

    tokio::spawn(async move {
        let (mut transport, _addr) = listener.accept().await.unwrap();
        for _ in 0..3 {
            let msg = transport.receive().await.unwrap();
            transport.send(&msg).await.unwrap();
        }
    });

    let mut client = TcpTransport::connect(addr.to_string()).await.unwrap();
    let messages = vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()];

    for msg in &messages {
        client.send(msg).await.unwrap();
        let response = client.receive().await.unwrap();
        assert_eq!(&response, msg);
    }
}

#[tokio::test]
async fn small_buffer_still_carries_large_frames() {
    let (listener, addr) = get_listener().await;

    tokio::spawn(async move {
        let (mut transport, _addr) = listener.accept().await.unwrap();
        let msg = transport.receive().await.unwrap();
        transport.send(&msg).await.unwrap();
    });

    let mut client = TcpTransport::builder()
        .address(addr.to_string())
        .buffer_size(16)
        .connect()
        .await
        .unwrap();

    let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    client.send(&payload).await.unwrap();
    assert_eq!(client.receive().await.unwrap(), payload);
}

#[tokio::test]
async fn tcp_receive_timeout_fires() {
    let (listener, addr) = get_listener().await;

    // Server that never responds
    tokio::spawn(async move {
        let (_transport, _addr) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let mut client = TcpTransport::builder()
        .address(addr.to_string())
        .receive_timeout(Duration::from_millis(100))
        .connect()
        .await
        .unwrap();

    client.send(b"hello").await.unwrap();

    let result = client.receive().await;
    match result.unwrap_err() {
        Error::Timeout(op) => assert_eq!(op, "Receive"),
        e => panic!("Expected timeout error, got {:?}", e),
    }
}

#[tokio::test]
async fn tcp_rejects_oversized_frame() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Server that sends a frame header claiming 200MB (over the 100MB default)
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_u32(200 * 1024 * 1024).await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut client = TcpTransport::connect(addr.to_string()).await.unwrap();

    match client.receive().await.unwrap_err() {
        Error::InvalidFrame(msg) => assert!(msg.contains("too large")),
        e => panic!("Expected InvalidFrame error, got {:?}", e),
    }
}

#[tokio::test]
async fn configured_frame_limit_applies_to_sends() {
    let (listener, addr) = get_listener().await;

    tokio::spawn(async move {
        let (_transport, _addr) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut client = TcpTransport::builder()
        .address(addr.to_string())
        .max_frame_len(8)
        .connect()
        .await
        .unwrap();

    match client.send(b"more than eight bytes").await.unwrap_err() {
        Error::InvalidFrame(msg) => assert!(msg.contains("too large")),
        e => panic!("Expected InvalidFrame error, got {:?}", e),
    }
}

#[tokio::test]
async fn connect_to_closed_port_fails() {
    // Bind then drop to obtain a port nobody listens on
    let (listener, addr) = get_listener().await;
    drop(listener);

    let result = TcpTransport::connect_timeout(addr.to_string(), Duration::from_secs(2)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn channel_with_codec_roundtrip() {
    let (listener, addr) = get_listener().await;

    let expected_msg = TestMessage {
        id: 42,
        data: "test data".to_string(),
    };
    let expected_clone = expected_msg.clone();

    tokio::spawn(async move {
        let (transport, _addr) = listener.accept().await.unwrap();
        let mut channel = Channel::from_transport(transport, BincodeCodec);

        let msg: TestMessage = channel.receive().await.unwrap();
        channel.send(&msg).await.unwrap(); // Echo back
    });

    let builder = TcpTransport::builder().address(addr.to_string());
    let mut channel = Channel::tcp(builder, BincodeCodec).await.unwrap();

    let response: TestMessage = channel.request(&expected_msg).await.unwrap();

    assert_eq!(response, expected_clone);
    channel.close().await.unwrap();
}

#[tokio::test]
async fn connection_closed_error() {
    let (listener, addr) = get_listener().await;

    // Server that immediately closes
    tokio::spawn(async move {
        let (mut transport, _addr) = listener.accept().await.unwrap();
        transport.close().await.unwrap();
    });

    let mut client = TcpTransport::connect(addr.to_string()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    match client.receive().await.unwrap_err() {
        Error::ConnectionClosed => {}
        e => panic!("Expected ConnectionClosed, got {:?}", e),
    }
}

#[tokio::test]
async fn transport_listener_trait_usage() {
    let (mut listener, addr) = get_listener().await;

    async fn accept_generic<L: TransportListener>(listener: &L) -> Result<L::Transport, Error> {
        listener.accept().await
    }

    tokio::spawn(async move {
        let mut client = TcpTransport::connect(addr.to_string()).await.unwrap();
        client.send(b"test").await.unwrap();
    });

    let mut transport = accept_generic(&listener).await.unwrap();
    let msg = transport.receive().await.unwrap();
    assert_eq!(msg, b"test");

    TransportListener::close(&mut listener).await.unwrap();
}

#[tokio::test]
async fn interrupted_receive_resumes_mid_frame() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (resume_tx, resume_rx) = tokio::sync::oneshot::channel::<()>();

    // Server that sends a frame in two halves, the second only when told to
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_u32(10).await.unwrap();
        stream.write_all(b"hello").await.unwrap();
        stream.flush().await.unwrap();
        resume_rx.await.unwrap();
        stream.write_all(b"world").await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut client = TcpTransport::connect(addr.to_string()).await.unwrap();

    let first = tokio::time::timeout(Duration::from_millis(100), client.receive()).await;
    assert!(first.is_err());

    resume_tx.send(()).unwrap();
    assert_eq!(client.receive().await.unwrap(), b"helloworld");
}

#[tokio::test]
async fn receive_timeout_keeps_the_frame_in_progress() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_u32(3).await.unwrap();
        stream.write_all(b"a").await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        stream.write_all(b"bc").await.unwrap();
        stream.write_u32(1).await.unwrap();
        stream.write_all(b"d").await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut client = TcpTransport::builder()
        .address(addr.to_string())
        .receive_timeout(Duration::from_millis(100))
        .connect()
        .await
        .unwrap();

    match client.receive().await.unwrap_err() {
        Error::Timeout(op) => assert_eq!(op, "Receive"),
        e => panic!("Expected timeout error, got {:?}", e),
    }

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(client.receive().await.unwrap(), b"abc");
    assert_eq!(client.receive().await.unwrap(), b"d");
}

#[tokio::test]
async fn frame_limit_is_capped_at_the_prefix_range() {
    let (listener, addr) = get_listener().await;

    tokio::spawn(async move {
        let (_transport, _addr) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let client = TcpTransport::builder()
        .address(addr.to_string())
        .max_frame_len(usize::MAX)
        .connect()
        .await
        .unwrap();

    assert_eq!(client.max_frame_len(), u32::MAX as usize);
}
