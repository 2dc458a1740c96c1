// API key generation
//
// `type=keygen` exchanges an administrator's username/password for a
// long-lived API key. The credentials go in a POST form body so they
// never appear in URLs or access logs.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{XmlApiClient, parse_envelope};
use crate::error::Error;

impl XmlApiClient {
    /// Generate an API key for `username`.
    ///
    /// `POST /api/` with `type=keygen&user=...&password=...`
    pub async fn generate_api_key(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        let url = self.api_url()?;
        debug!(username, "generating API key at {url}");

        let resp = self
            .http()
            .post(url)
            .form(&[
                ("type", "keygen"),
                ("user", username),
                ("password", password.expose_secret()),
            ])
            .send()
            .await?;

        let result = match parse_envelope(resp).await {
            Ok(result) => result,
            Err(Error::InvalidApiKey) => {
                return Err(Error::Authentication {
                    message: format!("device rejected credentials for '{username}'"),
                });
            }
            Err(e) => return Err(e),
        };

        let key = result
            .text_at("key")
            .ok_or_else(|| Error::UnexpectedResponse("keygen response has no <key>".into()))?;

        debug!("API key generated");
        Ok(SecretString::from(key.trim().to_owned()))
    }
}
