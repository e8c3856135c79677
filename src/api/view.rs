use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{Error, Result},
    outside::{HttpClient, RequestHeaders},
    types::{BvId, VideoMetadata},
};

use super::{parse_data, API_URL};

/// `-404`: no such video. `62002`: the video was made invisible.
const NOT_FOUND_CODES: [i64; 2] = [-404, 62002];

#[derive(Debug, Deserialize)]
struct ViewData {
    title: String,
    aid: u64,
    cid: u64,
}

/// Ask the platform for the title and internal ids of a video.
///
/// Fails with `NotFound` for a missing video and with `Unknown` for
/// anything else, unreadable answers and network errors included.
pub fn get_metadata(
    http: &dyn HttpClient,
    id: &BvId,
    cookie: Option<&str>,
) -> Result<VideoMetadata> {
    let url = format!("{API_URL}/x/web-interface/view?bvid={id}");
    let headers = RequestHeaders {
        cookie,
        ..Default::default()
    };

    let data: ViewData = http
        .get_text(&url, headers)
        .and_then(|body| {
            parse_data("view", &body, |code, message| {
                if NOT_FOUND_CODES.contains(&code) {
                    Error::NotFound { id: id.to_string() }
                } else {
                    Error::Unknown {
                        code: Some(code),
                        message,
                    }
                }
            })
        })
        .map_err(|err| match err {
            Error::Transport { .. } | Error::ResponseParse { .. } => Error::Unknown {
                code: None,
                message: err.to_string(),
            },
            err => err,
        })?;

    debug!("{id}: aid={} cid={} title={:?}", data.aid, data.cid, data.title);

    Ok(VideoMetadata {
        title: data.title,
        aid: data.aid,
        cid: data.cid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, test_utils::StubHttp};

    fn bvid() -> BvId {
        "BV1xx411c7mD".parse().unwrap()
    }

    #[test]
    fn returns_title_and_ids() {
        let http = StubHttp::new().text(
            "web-interface/view",
            r#"{"code":0,"message":"0","ttl":1,"data":{
                "bvid":"BV1xx411c7mD","aid":2,"cid":62131,
                "title":"字幕君交流场所","pic":"http://i0.hdslb.com/x.jpg"}}"#,
        );

        let metadata = get_metadata(&http, &bvid(), Some("SESSDATA=abc")).unwrap();
        assert_eq!(
            metadata,
            VideoMetadata {
                title: "字幕君交流场所".to_owned(),
                aid: 2,
                cid: 62131,
            }
        );

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://api.bilibili.com/x/web-interface/view?bvid=BV1xx411c7mD"
        );
        assert_eq!(requests[0].cookie.as_deref(), Some("SESSDATA=abc"));
    }

    #[test]
    fn missing_video_is_not_found() {
        for code in NOT_FOUND_CODES {
            let http = StubHttp::new().text(
                "web-interface/view",
                format!(r#"{{"code":{code},"message":"啥都木有","ttl":1}}"#),
            );

            let err = get_metadata(&http, &bvid(), None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
    }

    #[test]
    fn other_codes_are_unknown() {
        let http = StubHttp::new().text(
            "web-interface/view",
            r#"{"code":-400,"message":"请求错误","ttl":1}"#,
        );

        match get_metadata(&http, &bvid(), None).unwrap_err() {
            Error::Unknown { code, message } => {
                assert_eq!(code, Some(-400));
                assert_eq!(message, "请求错误");
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn network_errors_are_unknown() {
        let http = StubHttp::new();
        match get_metadata(&http, &bvid(), None).unwrap_err() {
            Error::Unknown { code, message } => {
                assert_eq!(code, None);
                assert!(message.contains("web-interface/view"), "{message}");
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn unreadable_answers_are_unknown() {
        let http = StubHttp::new().text("web-interface/view", "<html>412</html>");
        let err = get_metadata(&http, &bvid(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.to_string().starts_with("Unexpected failure"));
    }
}
