/// End-to-end TCP integration test for Aux transactions.
///
/// A simulated device sits behind a `TcpListener`, decodes the request with
/// the crate's own reader, and answers the way a device behind a network
/// bridge does: sometimes with traffic for other listeners first.

use aux_protocol::codec::{Address, Command, PacketReader};
use aux_protocol::session::{LinkConfig, SessionConfig};
use aux_protocol::{AuxError, AuxTransport, Packet, Session, TcpTransport};
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

fn spawn_device<F>(handler: F) -> (u16, thread::JoinHandle<()>)
where
    F: FnOnce(TcpTransport) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut device = TcpTransport::new(stream);
        device.set_read_timeout(Duration::from_secs(5)).unwrap();
        handler(device);
    });
    (port, handle)
}

fn tcp_config(port: u16, timeout_ms: u64) -> SessionConfig {
    SessionConfig {
        tcp_timeout_ms: timeout_ms,
        link: Some(LinkConfig::Tcp { host: "127.0.0.1".to_string(), port }),
        ..SessionConfig::default()
    }
}

#[test]
fn test_tcp_get_version_round_trip() {
    let (port, device) = spawn_device(|mut device| {
        let mut reader = PacketReader::new();
        let request = reader.read_packet(&mut device).unwrap().expect("request");
        assert_eq!(request.source_address(), 0x20);
        assert_eq!(request.receiver_address(), u8::from(Address::FocuserTemp));
        assert_eq!(request.command(), u8::from(Command::GetVersion));
        assert_eq!(request.is_checksum_ok(), Some(true));

        // Chatter addressed to the hand controller comes first
        let other = Packet::new(0x12, Address::HandController.into(), 0x01, vec![0x00, 0x00, 0x01]).unwrap();
        device.write_bytes(&other.encode()).unwrap();

        let reply = Packet::new(0x12, request.source_address(), request.command(), vec![0x01, 0x05]).unwrap();
        device.write_bytes(&reply.encode()).unwrap();
    });

    let mut session = Session::open_tcp("127.0.0.1", port).unwrap();
    assert!(!session.uses_arbitration());

    let response = session
        .send_receive(Address::FocuserTemp.into(), Command::GetVersion.into(), &[])
        .unwrap()
        .expect("device should answer");
    assert_eq!(response.receiver_address(), 0x20);
    assert_eq!(response.data(), &[0x01, 0x05]);
    assert_eq!(response.is_checksum_ok(), Some(true));

    device.join().unwrap();
    session.close().unwrap();
}

#[test]
fn test_tcp_silent_device_times_out() {
    let (port, device) = spawn_device(|mut device| {
        // Swallow the request and never answer
        let mut reader = PacketReader::new();
        let _ = reader.read_packet(&mut device);
        thread::sleep(Duration::from_millis(500));
    });

    let mut session = Session::open(&tcp_config(port, 150)).unwrap();
    let started = Instant::now();
    let response = session.send_receive(0x12, 0x01, &[]).unwrap();
    assert!(response.is_none());
    assert!(started.elapsed() < Duration::from_secs(2));

    device.join().unwrap();
}

#[test]
fn test_tcp_device_hangup_is_an_error() {
    let (port, device) = spawn_device(|mut device| {
        let mut reader = PacketReader::new();
        let _ = reader.read_packet(&mut device);
        device.close().unwrap();
    });

    let mut session = Session::open(&tcp_config(port, 2000)).unwrap();
    let err = session.send_receive(0x12, 0x01, &[]).unwrap_err();
    assert!(matches!(err, AuxError::Io(_)));

    device.join().unwrap();
}

#[test]
fn test_open_without_link_is_config_error() {
    let Err(err) = Session::open(&SessionConfig::default()) else {
        panic!("opening without a link should fail");
    };
    assert!(matches!(err, AuxError::Config(_)));
}

#[test]
fn test_session_settings_from_config() {
    let (port, device) = spawn_device(|_device| {});
    let config = SessionConfig {
        my_address: 0x21,
        debug: true,
        abort_on_timeout: false,
        ..tcp_config(port, 100)
    };

    let session = Session::open(&config).unwrap();
    assert_eq!(session.my_address(), 0x21);
    assert!(session.debug());
    assert!(!session.abort_on_timeout());

    device.join().unwrap();
    session.close().unwrap();
}
