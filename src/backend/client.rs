use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::error::{server_message, BackendError};
use crate::models::account::{Credentials, Registration, TokenResponse};
use crate::models::parcel::{CreatedParcel, NewParcel, Parcel, ParcelUpdate};
use crate::models::status::Status;
use crate::observability::metrics::Metrics;
use crate::session::store::SessionStore;

/// How a 401 is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    /// The stored credential was refused: the caller is sent back to login.
    Session,
    /// The submitted credentials were refused: the server's text is kept for the form.
    SignIn,
}

/// REST client for the courier backend.
///
/// The bearer credential is read from the session store on every call, and
/// every response passes through [`BackendClient::send`]: a 401 anywhere
/// clears the slot there and nowhere else.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<dyn SessionStore>,
    metrics: Metrics,
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        store: Arc<dyn SessionStore>,
        metrics: Metrics,
    ) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| BackendError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            store,
            metrics,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, BackendError> {
        let request = self.request(Method::POST, &["auth", "login"])?.json(credentials);
        let response = self.send(request, Rejection::SignIn).await?;
        Ok(response.json().await?)
    }

    pub async fn register(&self, registration: &Registration) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["auth", "register"])?
            .json(registration);
        self.send(request, Rejection::SignIn).await?;
        Ok(())
    }

    pub async fn customer_parcels(&self) -> Result<Vec<Parcel>, BackendError> {
        let request = self.request(Method::GET, &["customer", "my-parcels"])?;
        self.json(request).await
    }

    pub async fn staff_parcels(&self) -> Result<Vec<Parcel>, BackendError> {
        let request = self.request(Method::GET, &["staff", "parcels"])?;
        self.json(request).await
    }

    pub async fn rider_parcels(&self) -> Result<Vec<Parcel>, BackendError> {
        let request = self.request(Method::GET, &["rider", "my-parcels"])?;
        self.json(request).await
    }

    pub async fn staff_parcel(&self, parcel_id: i64) -> Result<Parcel, BackendError> {
        let id = parcel_id.to_string();
        let request = self.request(Method::GET, &["staff", "parcel", &id])?;
        self.json(request).await
    }

    pub async fn track(&self, tracking_number: &str) -> Result<Parcel, BackendError> {
        let request = self.request(
            Method::GET,
            &["customer", "parcel", "track", tracking_number],
        )?;
        self.json(request).await
    }

    pub async fn create_customer_parcel(
        &self,
        parcel: &NewParcel,
    ) -> Result<CreatedParcel, BackendError> {
        let request = self
            .request(Method::POST, &["customer", "parcel", "create"])?
            .json(parcel);
        self.json(request).await
    }

    pub async fn create_staff_parcel(
        &self,
        customer_email: &str,
        parcel: &NewParcel,
    ) -> Result<CreatedParcel, BackendError> {
        let request = self
            .request(Method::POST, &["staff", "parcel", "create"])?
            .query(&[("customer_email", customer_email)])
            .json(parcel);
        self.json(request).await
    }

    pub async fn update_parcel(
        &self,
        parcel_id: i64,
        update: &ParcelUpdate,
    ) -> Result<(), BackendError> {
        let id = parcel_id.to_string();
        let request = self
            .request(Method::PUT, &["staff", "parcel", &id])?
            .json(update);
        self.unit(request).await
    }

    pub async fn update_status(&self, parcel_id: i64, status: Status) -> Result<(), BackendError> {
        let id = parcel_id.to_string();
        let request = self
            .request(Method::PUT, &["rider", "update-status", &id])?
            .query(&[("new_status", status.as_str())]);
        self.unit(request).await
    }

    pub async fn assign_rider(&self, parcel_id: i64, rider_id: i64) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["staff", "assign-rider"])?
            .query(&[("parcel_id", parcel_id), ("rider_id", rider_id)]);
        self.unit(request).await
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(self.http.request(method, url))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = self.send(request, Rejection::Session).await?;
        Ok(response.json::<T>().await?)
    }

    async fn unit(&self, request: RequestBuilder) -> Result<(), BackendError> {
        self.send(request, Rejection::Session).await?;
        Ok(())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        rejection: Rejection,
    ) -> Result<Response, BackendError> {
        let request = match self.store.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let start = Instant::now();
        let result = self.dispatch(request, rejection).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.outcome(),
        };

        self.metrics
            .backend_latency_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());
        self.metrics
            .backend_requests_total
            .with_label_values(&[outcome])
            .inc();

        result
    }

    async fn dispatch(
        &self,
        request: RequestBuilder,
        rejection: Rejection,
    ) -> Result<Response, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "backend response");

        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected credential; purging session");
            if let Err(err) = self.store.clear() {
                warn!(error = %err, "failed to purge credential");
            }
            return match rejection {
                Rejection::Session => Err(BackendError::Unauthorized),
                Rejection::SignIn => {
                    let body = response.text().await.unwrap_or_default();
                    Err(BackendError::Status {
                        status: status.as_u16(),
                        message: server_message(&body),
                    })
                }
            };
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        Ok(response)
    }
}
