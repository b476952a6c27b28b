use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use video_browser_types::{VIDEOS_API_PATH, VideoListResponse};

/// Upper bound on a whole list request, connect to last body byte.
pub(crate) const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP agent for server calls. Non-2xx responses are returned, not raised.
pub(crate) fn http_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    ureq::Agent::new_with_config(config)
}

/// Fetch the list of uploaded videos, in server order.
pub(crate) fn list_videos(agent: &ureq::Agent, server: &str) -> Result<VideoListResponse> {
    let url = format!("{}{}", server.trim_end_matches('/'), VIDEOS_API_PATH);
    let resp = agent
        .get(&url)
        .call()
        .context("request /api/videos")?;
    if !resp.status().is_success() {
        return Err(anyhow::anyhow!("HTTP error! status: {}", resp.status()));
    }
    read_json(resp, "api/videos")
}

fn read_json<T: DeserializeOwned>(
    mut resp: ureq::http::Response<ureq::Body>,
    label: &str,
) -> Result<T> {
    let body = resp
        .body_mut()
        .read_to_string()
        .with_context(|| format!("read /{label} response body"))?;
    serde_json::from_str(&body).with_context(|| format!("decode /{label} response"))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use std::time::Duration;

    use video_browser_types::VideoFile;

    use super::{FETCH_TIMEOUT, http_agent, list_videos};

    fn fetch(server: &str) -> anyhow::Result<Vec<VideoFile>> {
        list_videos(&http_agent(FETCH_TIMEOUT), server)
    }

    /// Serve exactly one canned HTTP response on an ephemeral port.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let mut seen = Vec::new();
            while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&buf[..n]);
            }
            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(resp.as_bytes()).unwrap();
        });
        format!("http://{addr}/")
    }

    #[test]
    fn list_videos_decodes_array_in_order() {
        let server = serve_once("200 OK", r#"["b.mp4","a b.mkv"]"#);
        let files = fetch(&server).unwrap();
        assert_eq!(files, vec![VideoFile::new("b.mp4"), VideoFile::new("a b.mkv")]);
    }

    #[test]
    fn list_videos_rejects_server_error() {
        let server = serve_once("500 Internal Server Error", "Internal Server Error");
        let err = fetch(&server).unwrap_err();
        assert!(format!("{err:#}").contains("HTTP error! status: 500"));
    }

    #[test]
    fn list_videos_rejects_non_array_body() {
        let server = serve_once("200 OK", r#"{"videos":[]}"#);
        let err = fetch(&server).unwrap_err();
        assert!(format!("{err:#}").contains("decode /api/videos response"));
    }

    #[test]
    fn list_videos_reports_unreachable_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = fetch(&format!("http://{addr}")).unwrap_err();
        assert!(format!("{err:#}").contains("request /api/videos"));
    }

    #[test]
    fn list_videos_gives_up_on_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_secs(5));
            drop(stream);
        });
        let agent = http_agent(Duration::from_millis(300));
        let err = list_videos(&agent, &format!("http://{addr}")).unwrap_err();
        assert!(format!("{err:#}").contains("request /api/videos"));
    }
}
