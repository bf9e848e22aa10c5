#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use bytes::BytesMut;
use proxynvm_frame::{
    decode_request, encode_response, Command as Verb, Request, Status, REQUEST_HEADER_SIZE,
};
use proxynvm_transport::{Link, LinkListener, StreamLink};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/pnvm-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// Storage peer on a socket: serves `connections` clients one after the
/// other, then returns every request it saw.
struct Peer {
    store: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<Vec<Request>>,
}

impl Peer {
    fn spawn(path: &Path, store: Vec<u8>, connections: usize) -> Self {
        let listener = LinkListener::bind(path).expect("peer should bind");
        let store = Arc::new(Mutex::new(store));
        let shared = Arc::clone(&store);
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for _ in 0..connections {
                let mut link = listener.accept().expect("peer should accept");
                serve(&mut link, &shared, &mut seen);
            }
            seen
        });
        Self { store, handle }
    }

    fn finish(self) -> (Vec<u8>, Vec<Request>) {
        let requests = self.handle.join().expect("peer thread should not panic");
        let store = self.store.lock().expect("store lock").clone();
        (store, requests)
    }
}

fn serve<S>(link: &mut StreamLink<S>, store: &Mutex<Vec<u8>>, seen: &mut Vec<Request>)
where
    S: std::io::Read + std::io::Write,
{
    loop {
        let mut frame = vec![0u8; 1];
        if link.receive(&mut frame).expect("peer receive") == 0 {
            return;
        }
        if frame[0] != Verb::GetSize.as_byte() {
            frame.resize(REQUEST_HEADER_SIZE, 0);
            link.receive(&mut frame[1..]).expect("peer receive header");
            if frame[0] == Verb::Write.as_byte() {
                let len = u32::from_be_bytes([frame[5], frame[6], frame[7], frame[8]]) as usize;
                frame.resize(REQUEST_HEADER_SIZE + len, 0);
                link.receive(&mut frame[REQUEST_HEADER_SIZE..])
                    .expect("peer receive payload");
            }
        }

        let request = decode_request(&frame).expect("client should send valid frames");
        let mut out = BytesMut::new();
        {
            let mut data = store.lock().expect("store lock");
            let start = request.address as usize;
            let end = start + request.length as usize;
            let oob = Status::AddressOutOfBounds.code();
            match request.command {
                Verb::GetSize => {
                    encode_response(Verb::GetSize, 0, data.len() as u32, &[], &mut out)
                }
                Verb::Write if end <= data.len() => {
                    data[start..end].copy_from_slice(&request.payload);
                    encode_response(Verb::Write, 0, request.length, &[], &mut out);
                }
                Verb::Read if end <= data.len() => {
                    encode_response(Verb::Read, 0, request.length, &data[start..end], &mut out);
                }
                command => {
                    encode_response(command, oob, 0, &[], &mut out);
                    if command == Verb::Read {
                        out.resize(out.len() + request.length as usize, 0);
                    }
                }
            }
        }
        link.send(&out).expect("peer send");
        seen.push(request);
    }
}

fn proxynvm(args: &[&str], socket: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_proxynvm"))
        .args(["--log-level", "error"])
        .args(args)
        .env("PROXYNVM_SOCKET", socket)
        .env_remove("PROXYNVM_CONFIG")
        .output()
        .expect("proxynvm should run")
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn size_reports_capacity() {
    let dir = unique_temp_dir("size");
    let sock = dir.join("nvm.sock");
    let peer = Peer::spawn(&sock, vec![0; 1024], 1);

    let out = json(&proxynvm(&["--format", "json", "size"], &sock));
    assert_eq!(out["capacity"], 1024);
    assert!(out["schema_id"]
        .as_str()
        .is_some_and(|id| id.ends_with("device-size.schema.json")));

    let (_, requests) = peer.finish();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].command, Verb::GetSize);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn write_then_read_raw() {
    let dir = unique_temp_dir("rw");
    let sock = dir.join("nvm.sock");
    let peer = Peer::spawn(&sock, vec![0; 256], 2);

    let out = json(&proxynvm(
        &["--format", "json", "write", "--offset", "0x10", "--data", "hello nvm"],
        &sock,
    ));
    assert_eq!(out["bytes_written"], 9);
    assert_eq!(out["offset"], 16);

    let read = proxynvm(
        &["--format", "raw", "read", "--offset", "16", "--length", "9"],
        &sock,
    );
    assert!(read.status.success());
    assert_eq!(read.stdout, b"hello nvm");

    let (store, _) = peer.finish();
    assert_eq!(&store[16..25], b"hello nvm");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn small_frames_split_writes_into_chunks() {
    let dir = unique_temp_dir("chunks");
    let sock = dir.join("nvm.sock");
    let payload = dir.join("payload.bin");
    let data: Vec<u8> = (0..50u8).collect();
    std::fs::write(&payload, &data).expect("payload should be writable");
    let peer = Peer::spawn(&sock, vec![0; 128], 1);

    // MTU 32 leaves 23 payload bytes per write frame.
    let out = json(&proxynvm(
        &[
            "--format",
            "json",
            "--frame-buffer-size",
            "42",
            "write",
            "--file",
            payload.to_str().expect("utf-8 path"),
        ],
        &sock,
    ));
    assert_eq!(out["bytes_written"], 50);

    let (store, requests) = peer.finish();
    let chunks: Vec<(u32, u32)> = requests
        .iter()
        .filter(|r| r.command == Verb::Write)
        .map(|r| (r.address, r.length))
        .collect();
    assert_eq!(chunks, vec![(0, 23), (23, 23), (46, 4)]);
    assert_eq!(&store[..50], &data[..]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn erase_fills_with_ff() {
    let dir = unique_temp_dir("erase");
    let sock = dir.join("nvm.sock");
    let peer = Peer::spawn(&sock, vec![0; 64], 1);

    let out = json(&proxynvm(
        &["--format", "json", "erase", "--offset", "8", "--length", "16"],
        &sock,
    ));
    assert_eq!(out["bytes_erased"], 16);

    let (store, _) = peer.finish();
    assert!(store[..8].iter().all(|&b| b == 0));
    assert!(store[8..24].iter().all(|&b| b == 0xFF));
    assert!(store[24..].iter().all(|&b| b == 0));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn out_of_bounds_read_exits_60_without_chunks() {
    let dir = unique_temp_dir("oob");
    let sock = dir.join("nvm.sock");
    let peer = Peer::spawn(&sock, vec![0; 64], 1);

    let output = proxynvm(&["read", "--offset", "60", "--length", "5"], &sock);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("out of bounds"));

    let (_, requests) = peer.finish();
    assert!(requests.iter().all(|r| r.command == Verb::GetSize));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn info_reports_budgets() {
    let dir = unique_temp_dir("info");
    let sock = dir.join("nvm.sock");
    let peer = Peer::spawn(&sock, vec![0; 2048], 1);

    let out = json(&proxynvm(&["--format", "json", "info"], &sock));
    assert_eq!(out["capacity"], 2048);
    assert_eq!(out["mtu"], 4086);
    assert_eq!(out["write_chunk"], 4077);
    assert_eq!(out["read_chunk"], 4080);
    assert_eq!(out["link"], "stream");

    peer.finish();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_socket_exits_1() {
    let dir = unique_temp_dir("missing");
    let output = proxynvm(&["size"], &dir.join("absent.sock"));
    assert_eq!(output.status.code(), Some(1));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn bad_config_file_exits_64() {
    let dir = unique_temp_dir("config");
    let config = dir.join("driver.json");
    std::fs::write(&config, r#"{"frame_buffer_size": 4096, "bogus": true}"#)
        .expect("config should be writable");

    let output = proxynvm(
        &["--config", config.to_str().expect("utf-8 path"), "size"],
        &dir.join("unused.sock"),
    );
    assert_eq!(output.status.code(), Some(64));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_proxynvm"))
        .arg("version")
        .env_remove("PROXYNVM_CONFIG")
        .output()
        .expect("version should run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("proxynvm {}", env!("CARGO_PKG_VERSION"))
    );
}
