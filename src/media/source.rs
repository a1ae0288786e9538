use crate::config::Config;
use crate::error::BotError;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

/// Where random media comes from.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// File names directly under `path`.
    async fn list(&self, path: &str) -> Result<Vec<String>, BotError>;
    /// Public URL for one of the names returned by [`list`](Self::list).
    fn resolve(&self, path: &str, name: &str) -> String;
}

/// Storage-zone style CDN: a JSON listing endpoint plus a public pull zone.
pub struct CdnSource {
    http: reqwest::Client,
    list_url: String,
    public_url: String,
    access_key: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingEntry {
    Name(String),
    Object {
        #[serde(rename = "ObjectName", alias = "name")]
        name: String,
        #[serde(rename = "IsDirectory", alias = "is_directory", default)]
        is_directory: bool,
    },
}

impl CdnSource {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            list_url: config.cdn_list_url.clone(),
            public_url: config.cdn_public_url.clone(),
            access_key: config.cdn_access_key.clone(),
        }
    }
}

#[async_trait]
impl MediaSource for CdnSource {
    async fn list(&self, path: &str) -> Result<Vec<String>, BotError> {
        let url = join_url(&self.list_url, &[path], true);
        debug!("CDN: listing {}", url);

        let mut request = self.http.get(&url);
        if let Some(key) = &self.access_key {
            request = request.header("AccessKey", key);
        }
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BotError::not_found("media pool", path));
        }
        let entries: Vec<ListingEntry> = response.error_for_status()?.json().await?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry {
                ListingEntry::Name(name) => Some(name),
                ListingEntry::Object { name, is_directory } => (!is_directory).then_some(name),
            })
            .filter(|name| !name.ends_with('/'))
            .collect())
    }

    fn resolve(&self, path: &str, name: &str) -> String {
        join_url(&self.public_url, &[path, name], false)
    }
}

/// Append path segments to `base`, percent-encoding each one.
pub fn join_url(base: &str, segments: &[&str], trailing_slash: bool) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .flat_map(|s| s.split('/'))
        .filter(|s| !s.is_empty())
        .collect();

    if let Ok(mut url) = Url::parse(base) {
        let joined = url
            .path_segments_mut()
            .map(|mut path| {
                path.pop_if_empty().extend(&parts);
                if trailing_slash {
                    path.push("");
                }
            })
            .is_ok();
        if joined {
            return url.to_string();
        }
    }

    let mut joined = base.trim_end_matches('/').to_string();
    for part in parts {
        joined.push('/');
        joined.push_str(part);
    }
    if trailing_slash {
        joined.push('/');
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::get, Json, Router};

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://cdn.example", &["clips", "a b.mp4"], false),
            "https://cdn.example/clips/a%20b.mp4"
        );
        assert_eq!(
            join_url("https://storage.example/zone/", &["memes/cats"], true),
            "https://storage.example/zone/memes/cats/"
        );
        assert_eq!(join_url("not a url", &["x", "y.png"], false), "not a url/x/y.png");
        // Cannot-be-a-base URLs fall back to plain string joining
        assert_eq!(join_url("mailto:cdn", &["x"], true), "mailto:cdn/x/");
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn source(list_url: String, access_key: Option<&str>) -> CdnSource {
        let mut config = crate::config::test_config();
        config.cdn_list_url = list_url;
        config.cdn_access_key = access_key.map(str::to_string);
        CdnSource::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn test_list_storage_objects() {
        let app = Router::new().route(
            "/clips/",
            get(|headers: HeaderMap| async move {
                assert_eq!(headers.get("AccessKey").unwrap(), "k");
                Json(serde_json::json!([
                    { "ObjectName": "a.mp4", "IsDirectory": false, "Length": 10 },
                    { "ObjectName": "old", "IsDirectory": true },
                    { "ObjectName": "b.png", "IsDirectory": false }
                ]))
            }),
        );
        let base = serve(app).await;

        let names = source(base, Some("k")).list("clips").await.unwrap();
        assert_eq!(names, vec!["a.mp4", "b.png"]);
    }

    #[tokio::test]
    async fn test_list_plain_names() {
        let app = Router::new().route(
            "/memes/",
            get(|| async { Json(serde_json::json!(["x.gif", "sub/", "y.jpg"])) }),
        );
        let base = serve(app).await;

        let names = source(base, None).list("memes").await.unwrap();
        assert_eq!(names, vec!["x.gif", "y.jpg"]);
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let base = serve(Router::new()).await;
        assert!(matches!(
            source(base, None).list("nope").await,
            Err(BotError::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_uses_public_url() {
        let src = source("https://storage.example".to_string(), None);
        assert_eq!(src.resolve("booba", "one.png"), "https://cdn.example/booba/one.png");
    }
}
