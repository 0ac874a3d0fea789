/*!
 * End-to-end pipeline tests
 *
 * The gzip'd index fixture is written to a temp directory and the lookup
 * endpoint is either a stub fetcher or a loopback HTTP server, so no test
 * touches the real network.
 */

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;

use flate2::write::GzEncoder;
use flate2::Compression;

use mrf_sieve::config::ConfigBuilder;
use mrf_sieve::data_types::{LookupDocument, LookupFile};
use mrf_sieve::pipeline;
use mrf_sieve::resolver::{DisplayNameResolver, FetchLookup};
use mrf_sieve::{Result, SieveError};

const INDEX_JSON: &str = r#"{
    "reporting_entity_name": "ACME Health",
    "reporting_entity_type": "health insurance issuer",
    "reporting_structure": [
        {
            "in_network_files": [
                {"location": "https://mrf.example.com/anthem/NY_111_a.json.gz"},
                {"location": "https://mrf.example.com/anthem/NY_111_b.json.gz"}
            ],
            "reporting_plans": [
                {"plan_id_type": "HIOS", "plan_id": "98765"},
                {"plan_id_type": "EIN", "plan_id": "111"}
            ]
        },
        {
            "in_network_files": [
                {"location": "https://mrf.example.com/anthem/CA_333_a.json.gz"}
            ],
            "reporting_plans": [
                {"plan_id_type": "EIN", "plan_id": "333"}
            ]
        },
        {
            "in_network_files": [
                {"location": "https://mrf.example.com/anthem/NY_222_a.json.gz"}
            ],
            "reporting_plans": [
                {"plan_id_type": "EIN", "plan_id": "222"}
            ]
        }
    ]
}"#;

fn write_gzip_index(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("index.json.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(INDEX_JSON.as_bytes()).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

fn lookup_file(url: &str, displayname: &str) -> LookupFile {
    LookupFile {
        url: url.to_string(),
        displayname: displayname.to_string(),
    }
}

/// Lookup documents for the two NY EINs in the fixture index
fn fixture_documents() -> HashMap<String, Vec<LookupFile>> {
    let mut documents = HashMap::new();
    documents.insert(
        "111".to_string(),
        vec![
            lookup_file(
                "https://mrf.example.com/anthem/NY_111_a.json.gz",
                "2024-01_NY_PPO_in-network-rates",
            ),
            lookup_file(
                "https://mrf.example.com/anthem/NY_111_b.json.gz",
                "2024-01_NY_EPO_in-network-rates",
            ),
        ],
    );
    documents.insert(
        "222".to_string(),
        vec![lookup_file(
            "https://mrf.example.com/anthem/NY_222_a.json.gz",
            "2024-01_NY_PPO_in-network-rates",
        )],
    );
    documents
}

/// In-memory fetcher keyed by EIN (expects `stub/{ein}.json` URLs)
struct StubFetcher {
    documents: HashMap<String, Vec<LookupFile>>,
}

impl FetchLookup for StubFetcher {
    fn fetch(&self, url: &str) -> Result<LookupDocument> {
        let ein = url
            .trim_start_matches("stub/")
            .trim_end_matches(".json");
        self.documents
            .get(ein)
            .map(|files| LookupDocument {
                in_network_files: files.clone(),
            })
            .ok_or_else(|| SieveError::Http {
                message: "HTTP 404 fetching lookup document".to_string(),
                url: Some(url.to_string()),
            })
    }
}

#[test]
fn test_end_to_end_with_stub_fetcher() {
    let dir = tempfile::tempdir().unwrap();
    let index = write_gzip_index(dir.path());
    let output = dir.path().join("urls.txt");

    let config = ConfigBuilder::new(&index, "NY", "PPO", &output)
        .lookup_url_template("stub/{ein}.json")
        .progress(false)
        .build()
        .unwrap();
    let resolver = DisplayNameResolver::new(
        StubFetcher {
            documents: fixture_documents(),
        },
        config.lookup_url_template.as_str(),
    )
    .unwrap()
    .with_progress_bar(false);

    let summary = pipeline::run_with_resolver(&config, &resolver).unwrap();

    assert_eq!(summary.elements_scanned, 3);
    assert_eq!(summary.urls_matched, 3);
    assert_eq!(summary.eins, 2);
    assert_eq!(summary.urls_resolved, 3);
    assert_eq!(summary.lookup_failures, 0);
    assert_eq!(summary.result_urls, 2);

    // EPO file filtered out; CA element never matched at all.
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "https://mrf.example.com/anthem/NY_111_a.json.gz\n\
         https://mrf.example.com/anthem/NY_222_a.json.gz"
    );
}

#[test]
fn test_end_to_end_respects_first_n() {
    let dir = tempfile::tempdir().unwrap();
    let index = write_gzip_index(dir.path());
    let output = dir.path().join("urls.txt");

    let config = ConfigBuilder::new(&index, "NY", "PPO", &output)
        .lookup_url_template("stub/{ein}.json")
        .first_n(1)
        .progress(false)
        .build()
        .unwrap();
    let resolver = DisplayNameResolver::new(
        StubFetcher {
            documents: fixture_documents(),
        },
        config.lookup_url_template.as_str(),
    )
    .unwrap()
    .with_progress_bar(false);

    let summary = pipeline::run_with_resolver(&config, &resolver).unwrap();

    // Only the first element is scanned, so EIN 222 never appears.
    assert_eq!(summary.elements_scanned, 1);
    assert_eq!(summary.eins, 1);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "https://mrf.example.com/anthem/NY_111_a.json.gz"
    );
}

#[test]
fn test_lookup_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let index = write_gzip_index(dir.path());
    let output = dir.path().join("urls.txt");

    let mut documents = fixture_documents();
    documents.remove("111");

    let config = ConfigBuilder::new(&index, "NY", "PPO", &output)
        .lookup_url_template("stub/{ein}.json")
        .progress(false)
        .build()
        .unwrap();
    let resolver = DisplayNameResolver::new(StubFetcher { documents }, config.lookup_url_template.as_str())
        .unwrap()
        .with_progress_bar(false);

    let summary = pipeline::run_with_resolver(&config, &resolver).unwrap();

    assert_eq!(summary.lookup_failures, 1);
    assert_eq!(summary.result_urls, 1);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "https://mrf.example.com/anthem/NY_222_a.json.gz"
    );
}

/// Serve `count` HTTP/1.1 requests on a loopback listener, answering each
/// with a canned body chosen by request path.
fn serve_lookups(
    listener: TcpListener,
    bodies: HashMap<String, String>,
    count: usize,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for _ in 0..count {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            loop {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let request = String::from_utf8_lossy(&request);
            let path = request
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or("/")
                .to_string();
            let response = match bodies.get(&path) {
                Some(body) => format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                ),
                None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_string(),
            };
            stream.write_all(response.as_bytes()).unwrap();
        }
    })
}

#[test]
fn test_end_to_end_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let index = write_gzip_index(dir.path());
    let output = dir.path().join("urls.txt");

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let mut bodies = HashMap::new();
    for (ein, files) in fixture_documents() {
        let doc = serde_json::json!({ "In-Network Negotiated Rates Files": files });
        bodies.insert(format!("/anthem/{}.json", ein), doc.to_string());
    }
    let server = serve_lookups(listener, bodies, 2);

    let config = ConfigBuilder::new(&index, "NY", "PPO", &output)
        .lookup_url_template(format!("http://{}/anthem/{{ein}}.json", addr))
        .progress(false)
        .build()
        .unwrap();

    let summary = pipeline::run(&config).unwrap();
    server.join().unwrap();

    assert_eq!(summary.urls_resolved, 3);
    assert_eq!(summary.lookup_failures, 0);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "https://mrf.example.com/anthem/NY_111_a.json.gz\n\
         https://mrf.example.com/anthem/NY_222_a.json.gz"
    );
}
