// src/fetch/mod.rs

use anyhow::Context;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Result, SheetError};

const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d/";

/// The gviz JSON export URL for a spreadsheet key, optionally for one tab.
pub fn gviz_url(key: &str, sheet: Option<&str>) -> anyhow::Result<Url> {
    let key = key.trim().trim_matches('/');
    anyhow::ensure!(!key.is_empty(), "spreadsheet key is empty");

    let mut url = Url::parse(SHEETS_BASE)?
        .join(&format!("{}/gviz/tq", key))
        .with_context(|| format!("building gviz URL for key {}", key))?;
    {
        let mut q = url.query_pairs_mut();
        q.append_pair("tqx", "out:json");
        if let Some(sheet) = sheet.filter(|s| !s.is_empty()) {
            q.append_pair("sheet", sheet);
        }
    }
    Ok(url)
}

/// Spreadsheet key from a `.../spreadsheets/d/<key>/...` URL.
pub fn spreadsheet_key(url: &Url) -> Option<&str> {
    let mut segments = url.path_segments()?;
    segments.find(|s| *s == "d")?;
    segments.next().filter(|s| !s.is_empty())
}

/// One GET; the body comes back as text. Non-success statuses are errors.
#[instrument(level = "info", skip(client, url), fields(url = %url))]
pub async fn fetch_sheet(client: &Client, url: &Url) -> Result<String> {
    let network = |source| SheetError::Network {
        url: url.to_string(),
        source,
    };

    debug!("requesting sheet");
    let resp = client.get(url.clone()).send().await.map_err(network)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SheetError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.text().await.map_err(network)?;
    debug!(bytes = body.len(), %status, "received body");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    /// Serve one canned HTTP response on a loopback port.
    async fn serve_once(status: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let resp = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/javascript\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
        });
        Url::parse(&format!("http://{}/gviz/tq?tqx=out:json", addr)).unwrap()
    }

    #[test]
    fn test_gviz_url() {
        let url = gviz_url("1axUmdj7sbmA7wn0gTVU", None).unwrap();
        assert_eq!(url.host_str(), Some("docs.google.com"));
        assert_eq!(url.path(), "/spreadsheets/d/1axUmdj7sbmA7wn0gTVU/gviz/tq");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("tqx".to_string(), "out:json".to_string())]);

        let url = gviz_url("abc", Some("Form Responses 1")).unwrap();
        let sheet = url
            .query_pairs()
            .find(|(k, _)| k == "sheet")
            .map(|(_, v)| v.into_owned());
        assert_eq!(sheet.as_deref(), Some("Form Responses 1"));

        assert!(gviz_url("  ", None).is_err());
    }

    #[test]
    fn test_spreadsheet_key() {
        let url = Url::parse("https://docs.google.com/spreadsheets/d/KEY123/edit#gid=0").unwrap();
        assert_eq!(spreadsheet_key(&url), Some("KEY123"));
        let url = Url::parse("https://example.com/nothing/here").unwrap();
        assert_eq!(spreadsheet_key(&url), None);
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let url = serve_once("200 OK", "/*O_o*/\nsetResponse({});").await;
        let body = fetch_sheet(&client(), &url).await.unwrap();
        assert_eq!(body, "/*O_o*/\nsetResponse({});");
    }

    #[tokio::test]
    async fn test_fetch_status_error() {
        let url = serve_once("404 Not Found", "missing").await;
        let err = fetch_sheet(&client(), &url).await.unwrap_err();
        match err {
            SheetError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let err = fetch_sheet(&client(), &url).await.unwrap_err();
        assert!(err.is_network());
        assert!(matches!(err, SheetError::Network { .. }));
    }
}
