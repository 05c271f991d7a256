use serde::{Deserialize, Serialize};

/// Identifies one in-flight blob upload.
///
/// Returned by the start call and consumed by commit or abort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHandle {
    pub upload_id: String,
    pub document_id: String,
    pub field: String,
    pub file_name: String,
}

/// Server record of a committed blob.
///
/// `sha1` is the server's digest over the bytes it received and is the
/// value checked against the locally computed digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    #[serde(default)]
    pub blob_id: String,
    #[serde(default, rename = "bytes")]
    pub byte_count: u64,
    #[serde(default)]
    pub sha1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default)]
    pub document_id: String,
}

/// A downloaded blob: the file name from the response header plus the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobDetail {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Paging window for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_count: u64,
}

fn default_limit() -> u64 {
    100
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
            count: 0,
            total_count: 0,
        }
    }
}

impl Paging {
    /// Creates a request window.
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit,
            ..Self::default()
        }
    }

    /// Query parameters for a list request.
    pub fn as_query(&self) -> Vec<(String, String)> {
        vec![
            ("offset".into(), self.offset.to_string()),
            ("limit".into(), self.limit.to_string()),
        ]
    }

    /// Window for the page after this one, or `None` when exhausted.
    pub fn next(&self) -> Option<Paging> {
        let next_offset = self.offset + self.count;
        if self.count == 0 || next_offset >= self.total_count {
            None
        } else {
            Some(Paging::new(next_offset, self.limit))
        }
    }
}

/// One page of a list endpoint.
///
/// The items array lives under a resource-specific key (`documents`,
/// `repositories`, ...), so it is extracted by name rather than by serde.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub paging: Paging,
    pub items: Vec<T>,
}

impl<T: for<'de> Deserialize<'de>> ListResult<T> {
    /// Builds a page from the envelope `data` object.
    pub fn from_data(data: serde_json::Value, items_key: &str) -> Result<Self, serde_json::Error> {
        let mut data = data;
        let items = match data.get_mut(items_key) {
            Some(v) => serde_json::from_value(v.take())?,
            None => Vec::new(),
        };
        let paging: Paging = serde_json::from_value(data)?;
        Ok(Self { paging, items })
    }
}

/// Flags accepted by delete endpoints.
///
/// Serialized as lowercase `"true"` query literals; false flags are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub force: bool,
    pub consistent: bool,
}

impl DeleteOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn as_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if self.force {
            params.push(("force".into(), "true".into()));
        }
        if self.consistent {
            params.push(("consistent".into(), "true".into()));
        }
        params
    }
}
