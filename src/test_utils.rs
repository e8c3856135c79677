//! Stubs shared by the unit tests

use std::{
    io::{Cursor, Read},
    sync::Mutex,
};

use crate::{
    error::{Error, Result},
    job::JobState,
    outside::{Body, HttpClient, RequestHeaders},
    progress::ProgressSink,
};

/// A recorded request
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub cookie: Option<String>,
    pub referer: Option<String>,
}

enum Route {
    Text(String),
    Body(Vec<u8>, Option<u64>),
}

/// Serve canned responses for every URL containing a given fragment.
///
/// Routes are matched in insertion order; the first match wins.
#[derive(Default)]
pub struct StubHttp {
    routes: Mutex<Vec<(String, Route)>>,
    requests: Mutex<Vec<Request>>,
}

impl StubHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, fragment: &str, body: impl Into<String>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((fragment.to_owned(), Route::Text(body.into())));
        self
    }

    pub fn body(self, fragment: &str, body: Vec<u8>) -> Self {
        let len = Some(body.len() as u64);
        self.body_with_length(fragment, body, len)
    }

    /// Serve `body` while announcing `content_length`, which may lie
    pub fn body_with_length(
        self,
        fragment: &str,
        body: Vec<u8>,
        content_length: Option<u64>,
    ) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((fragment.to_owned(), Route::Body(body, content_length)));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// URLs requested so far, in order
    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn route(&self, url: &str, headers: RequestHeaders<'_>) -> Result<Route> {
        self.requests.lock().unwrap().push(Request {
            url: url.to_owned(),
            cookie: headers.cookie.map(str::to_owned),
            referer: headers.referer.map(str::to_owned),
        });

        let routes = self.routes.lock().unwrap();
        let route = routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, route)| match route {
                Route::Text(text) => Route::Text(text.clone()),
                Route::Body(body, len) => Route::Body(body.clone(), *len),
            });

        route.ok_or_else(|| Error::Transport {
            url: url.to_owned(),
            reason: "no stub route".to_owned(),
        })
    }
}

impl HttpClient for StubHttp {
    fn get_text(&self, url: &str, headers: RequestHeaders<'_>) -> Result<String> {
        match self.route(url, headers)? {
            Route::Text(text) => Ok(text),
            Route::Body(body, _) => Ok(String::from_utf8_lossy(&body).into_owned()),
        }
    }

    fn open(&self, url: &str, headers: RequestHeaders<'_>) -> Result<Body> {
        let (bytes, content_length) = match self.route(url, headers)? {
            Route::Text(text) => (text.into_bytes(), None),
            Route::Body(body, len) => (body, len),
        };
        let reader: Box<dyn Read + Send> = Box::new(Cursor::new(bytes));
        Ok(Body {
            content_length,
            reader,
        })
    }
}

/// Keep every callback for later inspection
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Mutex<Vec<String>>,
    pub percents: Mutex<Vec<u8>>,
    pub states: Mutex<Vec<JobState>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.percents.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<JobState> {
        self.states.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn status(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_owned());
    }

    fn progress(&self, percent: u8) {
        self.percents.lock().unwrap().push(percent);
    }

    fn state(&self, state: &JobState) {
        self.states.lock().unwrap().push(state.clone());
    }
}
