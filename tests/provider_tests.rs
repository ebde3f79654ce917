#[cfg(test)]
mod provider_tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use netassign::config::Range;
    use netassign::error::AssignError;
    use netassign::provider::{ConfigProvider, HttpConfigProvider};

    const BODY: &str = r#"[{"network": {
        "server": {"from": 2, "to": 9},
        "pos": {"from": 10, "to": 49},
        "kds": {"from": 50, "to": 69},
        "failover": {"from": 70, "to": 79},
        "nameservers": ["10.8.0.1"],
        "subnet": {"ip": "10.8.0.0", "mask": 24},
        "gateway": "10.8.0.1",
        "dhcp": false
    }}]"#;

    /// Serve a single HTTP response on loopback, returning the base URL and a
    /// handle yielding the raw request
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}/stores/", addr), handle)
    }

    #[test]
    fn test_fetch_sends_store_and_api_key() {
        let (base_url, handle) = serve_once("HTTP/1.1 200 OK", BODY);
        let provider = HttpConfigProvider::with_timeout(&base_url, "secret-token", Duration::from_secs(5));

        let info = provider.fetch("0042").unwrap();
        let request = handle.join().unwrap();

        assert!(request.starts_with("GET /stores/0042 HTTP/1.1"));
        assert!(request.to_lowercase().contains("x-api-key: secret-token"));
        assert_eq!(info.failover, Range { from: 70, to: 79 });
        assert_eq!(info.nameservers, vec!["10.8.0.1"]);
    }

    #[test]
    fn test_http_error_status_is_fetch_error() {
        let (base_url, handle) = serve_once("HTTP/1.1 500 Internal Server Error", "oops");
        let provider = HttpConfigProvider::with_timeout(&base_url, "secret-token", Duration::from_secs(5));

        let err = provider.fetch("0042").unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, AssignError::ConfigFetch(msg) if msg.contains("500")));
    }

    #[test]
    fn test_empty_response_is_fetch_error() {
        let (base_url, handle) = serve_once("HTTP/1.1 200 OK", "[]");
        let provider = HttpConfigProvider::with_timeout(&base_url, "secret-token", Duration::from_secs(5));

        let err = provider.fetch("0042").unwrap_err();
        handle.join().unwrap();

        assert_eq!(err, AssignError::ConfigFetch("no data received from API".to_string()));
    }

    #[test]
    fn test_unreachable_service_is_fetch_error() {
        // Bind then release a port so nothing is listening on it
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let provider = HttpConfigProvider::with_timeout(
            &format!("http://127.0.0.1:{}/stores/", port),
            "secret-token",
            Duration::from_secs(2),
        );

        assert!(matches!(provider.fetch("0042"), Err(AssignError::ConfigFetch(_))));
    }
}
