fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use resumable_protocol::{ApiResponse, MergeRequest, VerifyData, VerifyRequest};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (key order independent).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  client: {fixture}\n  server: {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_verify_request() {
        let req = roundtrip_test::<VerifyRequest>("verify_request.json");
        assert_eq!(req.file_name, "holiday.mp4");
    }

    #[test]
    fn fixture_verify_response_pending() {
        let resp = roundtrip_test::<ApiResponse<VerifyData>>("verify_response_pending.json");
        let data = resp.data.expect("pending response carries data");
        assert!(data.should_upload);
        assert_eq!(data.exist_chunks.map(|c| c.len()), Some(2));
    }

    #[test]
    fn fixture_verify_response_complete() {
        let resp = roundtrip_test::<ApiResponse<VerifyData>>("verify_response_complete.json");
        assert_eq!(resp.data, Some(VerifyData::complete()));
    }

    #[test]
    fn fixture_merge_request() {
        let req = roundtrip_test::<MergeRequest>("merge_request.json");
        assert_eq!(req.size, 10 * 1024 * 1024);
    }

    #[test]
    fn fixture_merge_response() {
        let resp = roundtrip_test::<ApiResponse<()>>("merge_response.json");
        assert!(resp.ok);
    }

    #[test]
    fn fixture_failure_response() {
        let resp = roundtrip_test::<ApiResponse<()>>("failure_response.json");
        assert!(!resp.ok);
        assert!(resp.msg.unwrap().contains("re-upload"));
    }
}
