use std::{
    fs::OpenOptions,
    io::{ErrorKind, Read, Write},
    path::Path,
};

use tracing::debug;

use crate::{
    error::{Error, Result},
    outside::{Body, HttpClient, RequestHeaders},
    progress::ProgressSink,
};

/// Size of the buffer the body is copied through
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Download `url` into the new file `dest`, reporting progress to `sink`.
///
/// Return the number of bytes written. On error the partial file is left
/// on disk for the caller to deal with.
pub fn fetch(
    http: &dyn HttpClient,
    url: &str,
    dest: &Path,
    cookie: Option<&str>,
    sink: &dyn ProgressSink,
) -> Result<u64> {
    let body = http.open(
        url,
        RequestHeaders {
            cookie,
            ..Default::default()
        },
    )?;

    write_body(body, url, dest, CHUNK_SIZE, sink)
}

/// Copy a response body into `dest` one chunk at a time.
///
/// The file must not exist yet. After every chunk, if the total size is
/// known, the completion percentage is sent to `sink`.
pub fn write_body(
    body: Body,
    url: &str,
    dest: &Path,
    chunk_size: usize,
    sink: &dyn ProgressSink,
) -> Result<u64> {
    let Body {
        content_length,
        mut reader,
    } = body;
    let total = content_length.filter(|&total| total > 0);

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|err| Error::io(format!("Could not create {}", dest.display()), err))?;

    let transport_error = |reason: String| Error::Transport {
        url: url.to_owned(),
        reason,
    };

    let mut buffer = vec![0; chunk_size];
    let mut written: u64 = 0;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                return Err(transport_error(format!(
                    "connection lost after {written} bytes: {err}"
                )))
            }
        };

        file.write_all(&buffer[..read])
            .map_err(|err| Error::io(format!("Could not write to {}", dest.display()), err))?;
        written += read as u64;

        if let Some(total) = total {
            sink.progress(percent(written, total));
        }
    }

    if let Some(total) = total {
        if written < total {
            return Err(transport_error(format!(
                "body ended after {written} of {total} bytes"
            )));
        }
    }

    debug!("{written} bytes written to {}", dest.display());
    Ok(written)
}

fn percent(written: u64, total: u64) -> u8 {
    (written.saturating_mul(100) / total).min(100) as u8
}
