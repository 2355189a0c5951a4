//! HTTPS GET over the ESP-IDF client.

use core::time::Duration;

use embedded_svc::http::client::Client;
use embedded_svc::http::{Headers, Method};
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use satori_screen::sources::{FetchError, HttpClient, MAX_RESPONSE_BYTES};

/// Kept below the watchdog period so a stalled socket cannot reset the chip
const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

pub struct EspFetcher {
    client: Client<EspHttpConnection>,
}

impl EspFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let config = HttpConfiguration {
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            timeout: Some(REQUEST_TIMEOUT),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&config)
            .map_err(|e| FetchError::Transport(format!("{:?}", e)))?;
        Ok(Self {
            client: Client::wrap(conn),
        })
    }
}

impl HttpClient for EspFetcher {
    fn get(&mut self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        let request = self
            .client
            .request(Method::Get, url, headers)
            .map_err(|e| FetchError::Transport(format!("{:?}", e)))?;

        let mut response = request
            .submit()
            .map_err(|e| FetchError::Transport(format!("{:?}", e)))?;

        let status = response.status();
        if status != 200 {
            return Err(FetchError::Status(status));
        }

        let content_length = response.content_len().unwrap_or(0) as usize;
        if content_length > MAX_RESPONSE_BYTES {
            return Err(FetchError::ResponseTooLarge(content_length));
        }

        let mut body = Vec::with_capacity(content_length.clamp(512, MAX_RESPONSE_BYTES));
        let mut buf = [0u8; 4096];
        loop {
            let read = response
                .read(&mut buf)
                .map_err(|e| FetchError::Transport(format!("{:?}", e)))?;
            if read == 0 {
                break;
            }
            if body.len() + read > MAX_RESPONSE_BYTES {
                return Err(FetchError::ResponseTooLarge(body.len() + read));
            }
            body.extend_from_slice(&buf[..read]);
        }

        log::debug!("GET {} -> {} bytes", url, body.len());
        Ok(body)
    }
}
