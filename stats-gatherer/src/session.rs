use crate::error::{
    BoxError,
    CollectError,
};
use reqwest::cookie::{
    CookieStore as _,
    Jar,
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};
use support_stats_config::Config;
use url::Url;

/// WordPress sets `wordpress_logged_in_<hash>` only when the credentials were accepted; a rejected login is
/// still answered with 200.
const LOGGED_IN_COOKIE: &str = "wordpress_logged_in";

/// An authenticated GET of one admin page.
pub trait PageFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> Pin<Box<dyn Future<Output = Result<String, CollectError>> + Send + 'a>>;
}

/// A logged-in HTTP session. Cookies handed out by the login form ride along on every later request.
///
/// Sessions are never reused across collection cycles.
#[derive(Debug)]
pub struct Session {
    client: reqwest::Client,
}

impl Session {
    pub async fn authenticate(config: &Config) -> Result<Self, CollectError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(config.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CollectError::Client)?;

        let credentials = config.credentials();
        debug!(url = %config.login_url, username = %credentials.username, "logging in");

        let login_error = |source: reqwest::Error| CollectError::Login {
            url: config.login_url.clone(),
            source: Box::new(source),
        };
        let response = client
            .post(config.login_url.clone())
            .form(&[
                ("log", credentials.username.as_str()),
                ("pwd", credentials.password.expose()),
            ])
            .send()
            .await
            .map_err(login_error)?
            .error_for_status()
            .map_err(login_error)?;

        let logged_in = jar
            .cookies(&config.login_url)
            .and_then(|cookies| cookies.to_str().map(|cookies| cookies.contains(LOGGED_IN_COOKIE)).ok())
            .unwrap_or(false);
        if !logged_in {
            return Err(CollectError::Login {
                url: config.login_url.clone(),
                source: "no session cookie was issued, check the username and password".into(),
            });
        }

        debug!(status = %response.status(), "login form accepted");
        Ok(Self { client })
    }

    pub async fn get(&self, url: &Url) -> Result<String, CollectError> {
        let fetch_error = |source: reqwest::Error| CollectError::Fetch {
            url: url.clone(),
            source: Box::new(source) as BoxError,
        };

        let body = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?
            .text()
            .await
            .map_err(fetch_error)?;

        debug!(%url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}

impl PageFetcher for Session {
    fn fetch<'a>(&'a self, url: &'a Url) -> Pin<Box<dyn Future<Output = Result<String, CollectError>> + Send + 'a>> {
        Box::pin(self.get(url))
    }
}
