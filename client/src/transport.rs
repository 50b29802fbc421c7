//! HTTP transport bound to the dashcam's base address.
//!
//! Issues GET requests and hands back the body in one of three shapes:
//! parsed JSON, an in-memory buffer, or a chunk stream.  Device `result`
//! fields are not interpreted here.

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

/// Body chunks of a streamed response.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Query string of a request.
#[derive(Debug, Clone, Copy)]
pub enum Query<'a> {
    None,
    /// `key=value` pairs, form-encoded.
    Pairs(&'a [(&'a str, &'a str)]),
    /// Appended as-is.  Only characters that are illegal in a query are
    /// escaped, so `/` in device paths stays literal.
    Raw(&'a str),
}

#[derive(Debug, Clone)]
pub struct Transport {
    base: Url,
    http: reqwest::Client,
}

impl Transport {
    /// `host` may omit the scheme, in which case `http://` is assumed.  It
    /// must be an origin: device endpoints are absolute paths, so a path
    /// prefix such as `http://proxy/cam` is rejected.
    pub fn new(host: &str, http: reqwest::Client) -> Result<Self> {
        let base = parse_base(host)?;
        Ok(Self { base, http })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for `endpoint` (an API endpoint or a device file path).
    pub fn url(&self, endpoint: &str, query: Query<'_>) -> Result<Url> {
        let mut url = self.base.join(endpoint).map_err(|e| Error::InvalidHost {
            host: self.base.to_string(),
            reason: format!("cannot join '{endpoint}': {e}"),
        })?;

        match query {
            Query::None => {}
            Query::Pairs(pairs) => {
                url.query_pairs_mut().extend_pairs(pairs.iter());
            }
            Query::Raw(raw) => url.set_query(Some(raw)),
        }
        Ok(url)
    }

    /// GET and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Query<'_>,
    ) -> Result<T> {
        let url = self.url(endpoint, query)?;
        let body = self.fetch(url.clone()).await?;
        serde_json::from_slice(&body).map_err(|source| Error::MalformedResponse {
            url: url.to_string(),
            source,
        })
    }

    /// GET the whole body into memory.
    pub async fn get_bytes(&self, endpoint: &str, query: Query<'_>) -> Result<Bytes> {
        let url = self.url(endpoint, query)?;
        self.fetch(url).await
    }

    /// GET the body as a stream of chunks.  Nothing beyond the current
    /// chunk is held in memory.
    pub async fn get_stream(&self, endpoint: &str, query: Query<'_>) -> Result<ByteStream> {
        let url = self.url(endpoint, query)?;
        let resp = self.send(url.clone()).await?;
        let url = url.to_string();
        Ok(resp
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|source| Error::Transport {
                    url: url.clone(),
                    source,
                })
            })
            .boxed())
    }

    async fn fetch(&self, url: Url) -> Result<Bytes> {
        let resp = self.send(url.clone()).await?;
        resp.bytes().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response> {
        debug!("GET {url}");
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(resp)
    }
}

fn parse_base(host: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidHost {
        host: host.to_string(),
        reason,
    };

    let host = host.trim();
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };

    let url = Url::parse(&with_scheme).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("not a base URL".into()));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must be an origin without path or query".into()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(host: &str) -> Transport {
        Transport::new(host, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn test_base_without_scheme() {
        let t = transport("192.168.169.1");
        assert_eq!(t.base().as_str(), "http://192.168.169.1/");
    }

    #[test]
    fn test_invalid_host() {
        let err = Transport::new("http://", reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidHost { .. }));
    }

    #[test]
    fn test_host_with_path_prefix_rejected() {
        for host in ["http://proxy/cam", "192.168.169.1/app", "http://192.168.169.1/?x=1"] {
            let err = Transport::new(host, reqwest::Client::new()).unwrap_err();
            assert!(matches!(err, Error::InvalidHost { .. }), "{host}");
        }
        assert_eq!(
            transport("http://192.168.169.1/").base().as_str(),
            "http://192.168.169.1/"
        );
        assert_eq!(transport("127.0.0.1:8169").base().as_str(), "http://127.0.0.1:8169/");
    }

    #[test]
    fn test_url_with_pairs() {
        let t = transport("http://192.168.169.1");
        let url = t
            .url(
                "/app/getfilelist",
                Query::Pairs(&[("folder", "loop"), ("start", "0"), ("end", "99")]),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://192.168.169.1/app/getfilelist?folder=loop&start=0&end=99"
        );
    }

    #[test]
    fn test_raw_query_keeps_slashes() {
        let t = transport("http://192.168.169.1");
        let url = t
            .url(
                "/app/getthumbnail",
                Query::Raw("file=/mnt/card/video_front/20250101_000000_f.ts"),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://192.168.169.1/app/getthumbnail?file=/mnt/card/video_front/20250101_000000_f.ts"
        );
    }

    #[test]
    fn test_device_path_is_url_path() {
        let t = transport("http://127.0.0.1:8169");
        let url = t
            .url("/mnt/card/video_front/20250101_000000_f.ts", Query::None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8169/mnt/card/video_front/20250101_000000_f.ts"
        );
    }
}
