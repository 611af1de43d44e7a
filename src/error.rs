use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("geolocation lookup failed: {0}")]
    Geolocation(String),

    #[error("no image found for {0:?}")]
    NoImage(String),

    #[error("{url} did not return an image (content type {content_type:?})")]
    NotAnImage { url: String, content_type: Option<String> },

    #[error("cannot draw highlight overlay: {0}")]
    Overlay(String),

    #[error("failed to render panel: {0}")]
    Render(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn http(url: &str) -> impl FnOnce(reqwest::Error) -> Error + use<> {
        let url = url.to_string();
        move |source| Error::Http { url, source }
    }
}
