// In-memory multipart/form-data body carrying a single zip file part.
//
// The body is assembled by hand instead of through reqwest's streaming
// form so the exact byte length is known up front and can be sent as an
// explicit Content-Length.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Form field the admin API expects the archive under.
pub const FILE_FIELD: &str = "file";

const BOUNDARY_PREFIX: &str = "----FormBoundary";
const BOUNDARY_SUFFIX_LEN: usize = 16;

/// A fully assembled multipart body and its boundary.
#[derive(Debug, Clone)]
pub struct MultipartPayload {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartPayload {
    /// Build a payload for `data` with a fresh random boundary.
    pub fn new(file_name: &str, data: &[u8]) -> Self {
        Self::with_boundary(random_boundary(), file_name, data)
    }

    /// Build a payload using a caller-chosen boundary.
    pub fn with_boundary(boundary: String, file_name: &str, data: &[u8]) -> Self {
        let head = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{FILE_FIELD}\"; filename=\"{}\"\r\n\
             Content-Type: application/zip\r\n\r\n",
            escape_quotes(file_name)
        );
        let tail = format!("\r\n--{boundary}--\r\n");

        let mut body = Vec::with_capacity(head.len() + data.len() + tail.len());
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(tail.as_bytes());

        MultipartPayload { boundary, body }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's Content-Type header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

fn random_boundary() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{BOUNDARY_PREFIX}{suffix}")
}

fn escape_quotes(name: &str) -> String {
    name.replace('"', "%22")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_form_data() {
        let payload = MultipartPayload::with_boundary("XYZ".into(), "shipmas.zip", b"PK");
        let expected = "--XYZ\r\n\
                        Content-Disposition: form-data; name=\"file\"; filename=\"shipmas.zip\"\r\n\
                        Content-Type: application/zip\r\n\r\n\
                        PK\r\n--XYZ--\r\n";
        assert_eq!(payload.as_bytes(), expected.as_bytes());
        assert_eq!(payload.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn length_tracks_data_size() {
        let empty = MultipartPayload::with_boundary("B".into(), "a.zip", &[]);
        let one = MultipartPayload::with_boundary("B".into(), "a.zip", &[7]);
        let big = MultipartPayload::with_boundary("B".into(), "a.zip", &vec![0u8; 1_500_000]);

        assert_eq!(one.len(), empty.len() + 1);
        assert_eq!(big.len(), empty.len() + 1_500_000);
        assert_eq!(big.len(), big.as_bytes().len());
    }

    #[test]
    fn boundaries_are_random() {
        let a = MultipartPayload::new("a.zip", b"x");
        let b = MultipartPayload::new("a.zip", b"x");
        assert_ne!(a.boundary(), b.boundary());
        assert!(a.boundary().starts_with(BOUNDARY_PREFIX));
        assert_eq!(a.boundary().len(), BOUNDARY_PREFIX.len() + BOUNDARY_SUFFIX_LEN);
    }

    #[test]
    fn quotes_in_file_name_are_escaped() {
        let payload = MultipartPayload::with_boundary("B".into(), "a\"b.zip", b"");
        let text = String::from_utf8(payload.into_bytes()).unwrap();
        assert!(text.contains("filename=\"a%22b.zip\""));
    }
}
