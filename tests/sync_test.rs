use chrono::{Days, Local};
use fs2::FileExt;
use predicates::prelude::*;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use tempfile::tempdir;

const BODY: &str = r#"{"content":[
  {"path":"/blog/foo/","host":"example.com","views":5},
  {"path":"/","host":"example.com","views":50},
  {"path":"/blog/foo","host":"other.com","views":50}
]}"#;

fn spawn_stub_server(expected_requests: usize) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    let handle = thread::spawn(move || {
        let mut request_lines = Vec::new();
        for _ in 0..expected_requests {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).expect("read request");
            let raw = String::from_utf8_lossy(&buf[..n]);
            request_lines.push(raw.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                BODY.len(),
                BODY
            );
            stream.write_all(response.as_bytes()).expect("write response");
        }
        request_lines
    });

    (format!("http://{addr}"), handle)
}

#[test]
fn sync_fetches_missing_days_and_merges_filtered_totals() {
    let tmp = tempdir().expect("tempdir");
    let cache_dir = tmp.path().join(".page_views");
    let today = Local::now().date_naive();
    let signup = today.checked_sub_days(Days::new(2)).expect("signup");
    let (base_url, server) = spawn_stub_server(2);

    assert_cmd::cargo::cargo_bin_cmd!("popsync")
        .current_dir(tmp.path())
        .env("POPSYNC_CACHE_DIR", &cache_dir)
        .args([
            "init",
            "--token",
            "tok",
            "--gauge-id",
            "g123",
            "--host",
            "http://example.com",
            "--signup-date",
            &signup.to_string(),
        ])
        .assert()
        .success();

    assert_cmd::cargo::cargo_bin_cmd!("popsync")
        .current_dir(tmp.path())
        .env("POPSYNC_CACHE_DIR", &cache_dir)
        .env("POPSYNC_API_BASE", &base_url)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "fetching views for {signup}"
        )));

    let requests = server.join().expect("server");
    assert_eq!(requests.len(), 2);
    assert!(requests[0].contains(&format!("/g123/content?date={signup}")));

    // 5 views/day over two days, with root and foreign-host noise dropped.
    assert_cmd::cargo::cargo_bin_cmd!("popsync")
        .current_dir(tmp.path())
        .env("POPSYNC_CACHE_DIR", &cache_dir)
        .arg("rank")
        .assert()
        .success()
        .stdout(predicate::str::contains("10  /blog/foo"));

    // Same-day rerun performs zero fetches: no stub server is even running.
    assert_cmd::cargo::cargo_bin_cmd!("popsync")
        .current_dir(tmp.path())
        .env("POPSYNC_CACHE_DIR", &cache_dir)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("already synced today"));
}

#[test]
fn sync_refuses_cache_dir_held_by_another_run() {
    let tmp = tempdir().expect("tempdir");
    let cache_dir = tmp.path().join(".page_views");

    assert_cmd::cargo::cargo_bin_cmd!("popsync")
        .current_dir(tmp.path())
        .env("POPSYNC_CACHE_DIR", &cache_dir)
        .args([
            "init",
            "--token",
            "tok",
            "--gauge-id",
            "g123",
            "--host",
            "example.com",
        ])
        .assert()
        .success();

    // Stand in for a concurrent sync by holding the exclusive lock ourselves.
    let lock = fs::File::create(cache_dir.join(".lock")).expect("create lock");
    lock.try_lock_exclusive().expect("acquire lock");

    assert_cmd::cargo::cargo_bin_cmd!("popsync")
        .current_dir(tmp.path())
        .env("POPSYNC_CACHE_DIR", &cache_dir)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked by another sync run"));
}

#[test]
fn sync_without_config_fails_with_init_hint() {
    let tmp = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("popsync")
        .current_dir(tmp.path())
        .env("POPSYNC_CACHE_DIR", tmp.path().join(".page_views"))
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `popsync init` first"));
}
