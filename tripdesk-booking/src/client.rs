use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use tripdesk_catalog::Trip;
use uuid::Uuid;

use crate::error::BookingError;
use crate::membership::{ConfirmMembershipRequest, ConfirmMembershipResponse};
use crate::models::{Booking, CreateBookingRequest};
use crate::wizard::BookingApi;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// [`BookingApi`] over the TripDesk REST API
#[derive(Clone)]
pub struct HttpBookingClient {
    base_url: String,
    http: Client,
}

impl HttpBookingClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BookingError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, BookingError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BookingError::Api(format!("{}: {}", status, body)));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl BookingApi for HttpBookingClient {
    async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, BookingError> {
        debug!("GET trip {}", trip_id);
        let resp = self.http.get(self.url(&format!("/v1/trips/{}", trip_id))).send().await?;
        Self::decode(resp).await
    }

    async fn confirm_membership(
        &self,
        req: &ConfirmMembershipRequest,
    ) -> Result<ConfirmMembershipResponse, BookingError> {
        let resp = self.http.post(self.url("/v1/memberships/confirm")).json(req).send().await?;
        Self::decode(resp).await
    }

    async fn create_booking(
        &self,
        req: &CreateBookingRequest,
        idempotency_key: Uuid,
    ) -> Result<Booking, BookingError> {
        debug!("POST booking for trip {} (key {})", req.trip_id, idempotency_key);
        let resp = self.http
            .post(self.url("/v1/bookings"))
            .header(IDEMPOTENCY_HEADER, idempotency_key.to_string())
            .json(req)
            .send()
            .await?;
        Self::decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = HttpBookingClient::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/v1/trips/T1"), "http://localhost:8080/v1/trips/T1");
    }
}
