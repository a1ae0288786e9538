use crate::error::BotError;
use tracing::debug;

pub struct MediaFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Download `url` for re-upload, refusing anything over `limit` bytes.
///
/// The declared `Content-Length` is checked first; the body is then read in
/// chunks so a server that lies about (or omits) the length still cannot
/// push more than `limit` bytes into memory.
pub async fn fetch_attachment(
    http: &reqwest::Client,
    url: &str,
    limit: u64,
) -> Result<MediaFile, BotError> {
    let mut response = http.get(url).send().await?.error_for_status()?;

    if let Some(size) = response.content_length() {
        if size > limit {
            return Err(too_large(size, limit, url));
        }
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        bytes.extend_from_slice(&chunk);
        if bytes.len() as u64 > limit {
            return Err(too_large(bytes.len() as u64, limit, url));
        }
    }

    debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(MediaFile {
        filename: filename_from_url(url),
        bytes,
    })
}

fn too_large(size: u64, limit: u64, url: &str) -> BotError {
    BotError::UpstreamTooLarge {
        size,
        limit,
        url: url.to_string(),
    }
}

pub fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .unwrap_or("media")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};

    async fn serve() -> String {
        let app = Router::new()
            .route("/small.png", get(|| async { vec![7u8; 512] }))
            .route("/big.mp4", get(|| async { vec![0u8; 4096] }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_within_limit() {
        let base = serve().await;
        let file = fetch_attachment(&reqwest::Client::new(), &format!("{}/small.png", base), 1024)
            .await
            .unwrap();
        assert_eq!(file.filename, "small.png");
        assert_eq!(file.bytes.len(), 512);
    }

    #[tokio::test]
    async fn test_fetch_over_limit() {
        let base = serve().await;
        let url = format!("{}/big.mp4", base);
        match fetch_attachment(&reqwest::Client::new(), &url, 1024).await {
            Err(BotError::UpstreamTooLarge { size, limit, url: reported }) => {
                assert!(size > limit);
                assert_eq!(limit, 1024);
                assert_eq!(reported, url);
            }
            other => panic!("expected UpstreamTooLarge, got {:?}", other.map(|f| f.filename)),
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let base = serve().await;
        let result =
            fetch_attachment(&reqwest::Client::new(), &format!("{}/gone.png", base), 1024).await;
        assert!(matches!(result, Err(BotError::Upstream(_))));
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(filename_from_url("https://cdn.example/clips/a.mp4"), "a.mp4");
        assert_eq!(filename_from_url("https://cdn.example/clips/a.mp4?v=2"), "a.mp4");
        assert_eq!(filename_from_url("https://cdn.example/"), "media");
    }
}
