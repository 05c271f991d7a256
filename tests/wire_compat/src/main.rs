fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chino_protocol::messages::{CommitResponse, UploadResponse};
    use chino_protocol::{Envelope, ListResult, Paging, ResultKind};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture as raw text.
    fn load_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn load_envelope(name: &str) -> Envelope {
        serde_json::from_str(&load_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse envelope {name}: {e}"))
    }

    /// Drops `null` members so optional fields compare equal whether the
    /// server sent `null` or omitted them.
    fn strip_nulls(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), strip_nulls(v)))
                    .collect(),
            ),
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(strip_nulls).collect())
            }
            _ => v.clone(),
        }
    }

    /// Parses the envelope `data` into `T`, re-serializes it and compares
    /// with the fixture's `data`.
    fn data_roundtrip<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let envelope = load_envelope(name);
        assert!(envelope.is_success(), "{name} is not a success envelope");
        let parsed: T = envelope
            .require_data()
            .unwrap_or_else(|e| panic!("failed to deserialize data of {name}: {e}"));

        let fixture: serde_json::Value = serde_json::from_str(&load_fixture(name)).unwrap();
        let reserialized = serde_json::to_value(&parsed).unwrap();
        assert_eq!(
            strip_nulls(&fixture["data"]),
            strip_nulls(&reserialized),
            "roundtrip mismatch for {name}"
        );
        parsed
    }

    #[test]
    fn fixture_blob_start() {
        let resp: UploadResponse = data_roundtrip("blob_start.json");
        assert_eq!(resp.blob.upload_id, "5d3ad7ac-1f4c-4e38-8f7a-b1ad3d2f9e0c");
        assert!(resp.blob.expire_date.is_some());
    }

    #[test]
    fn fixture_blob_commit() {
        let resp: CommitResponse = data_roundtrip("blob_commit.json");
        assert_eq!(resp.blob.byte_count, 32);
        assert_eq!(resp.blob.sha1.len(), 40);
        assert_eq!(resp.blob.document_id, "8c1e3f0a-5b2d-4c7e-9f1a-2d3e4f5a6b7c");
    }

    #[test]
    fn fixture_error_envelope() {
        let env = load_envelope("error_envelope.json");
        assert_eq!(env.result, ResultKind::Error);
        assert_eq!(env.result_code, Some(401));
        assert_eq!(env.failure_message(), "Invalid credentials given.");
    }

    #[test]
    fn fixture_fail_envelope() {
        let env = load_envelope("fail_envelope.json");
        assert_eq!(env.result, ResultKind::Fail);
        assert_eq!(
            env.failure_message(),
            "upload_id: unknown upload, offset: does not match uploaded length"
        );
    }

    #[test]
    fn fixture_document_page() {
        let env = load_envelope("document_page.json");
        let data: serde_json::Value = env.require_data().unwrap();
        let page: ListResult<serde_json::Value> = ListResult::from_data(data, "documents").unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1]["document_id"], "d2");
        assert_eq!(page.paging.total_count, 5);
        assert_eq!(page.paging.next(), Some(Paging::new(2, 2)));
    }

    #[test]
    fn envelope_reserializes_without_absent_fields() {
        let env = load_envelope("error_envelope.json");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["result"], "error");
        assert!(json.get("data").is_none());
    }
}
