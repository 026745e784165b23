//! In-memory transport and archive fixtures used by unit tests.

use crate::core::transport::{RemoteBody, Transport};
use crate::error::{FetchError, Result};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Ok(Vec<u8>),
    Status(u16),
    /// Serves `bytes` while announcing `announced` as the length, then ends.
    Short { bytes: Vec<u8>, announced: u64 },
    /// Serves `bytes` and then fails the read.
    BrokenAfter(Vec<u8>),
}

#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, MockResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, response: MockResponse) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    pub fn ok(self, url: &str, body: &[u8]) -> Self {
        self.with(url, MockResponse::Ok(body.to_vec()))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str) -> Result<RemoteBody> {
        self.requests.lock().unwrap().push(url.to_string());

        match self.routes.get(url).cloned() {
            None => Err(FetchError::Http {
                url: url.to_string(),
                status: 404,
            }),
            Some(MockResponse::Status(status)) => Err(FetchError::Http {
                url: url.to_string(),
                status,
            }),
            Some(MockResponse::Ok(bytes)) => Ok(RemoteBody {
                content_length: Some(bytes.len() as u64),
                reader: Box::new(io::Cursor::new(bytes)),
            }),
            Some(MockResponse::Short { bytes, announced }) => Ok(RemoteBody {
                content_length: Some(announced),
                reader: Box::new(io::Cursor::new(bytes)),
            }),
            Some(MockResponse::BrokenAfter(bytes)) => {
                let announced = bytes.len() as u64 * 2;
                Ok(RemoteBody {
                    content_length: Some(announced),
                    reader: Box::new(BrokenReader {
                        inner: io::Cursor::new(bytes),
                    }),
                })
            }
        }
    }
}

struct BrokenReader {
    inner: io::Cursor<Vec<u8>>,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf)? {
            0 => Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
            n => Ok(n),
        }
    }
}

/// Zip archive holding `entries`; names ending in `/` become directories.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

pub fn tar_gz_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, data.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}
