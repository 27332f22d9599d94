use super::bridge_request::{
    BridgeRequestType, EventFindRequest, EventTriggerRequest, SimVarGetRequest, SimVarPutRequest,
    ValueBody,
};
use super::{Dispatch, SimEvent, SimVar, VehicleError, VehicleInterface};
use crate::event;
use async_trait::async_trait;

/// A thin wrapper around `reqwest::Client` bound to the base URL of the
/// simulator bridge.
///
/// The bridge exposes simulation variables under `/simvar/{NAME}` and
/// discrete events under `/event/{NAME}`. Requests time out after
/// `REQUEST_TIMEOUT` so a stalled bridge shows up as an unavailable read
/// rather than a hung control loop.
#[derive(Debug)]
pub(crate) struct BridgeClient {
    /// The underlying `reqwest::Client` used to perform HTTP requests.
    client: reqwest::Client,
    /// Base URL of the bridge, prepended to all endpoint paths.
    base_url: String,
}

impl BridgeClient {
    const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);

    /// Constructs a new `BridgeClient` for the given base URL.
    pub(crate) fn new(base_url: &str) -> Result<BridgeClient, VehicleError> {
        let client = reqwest::Client::builder().timeout(Self::REQUEST_TIMEOUT).build()?;
        Ok(BridgeClient { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub(super) fn client(&self) -> &reqwest::Client { &self.client }
    pub(crate) fn url(&self) -> &str { self.base_url.as_str() }
}

#[async_trait]
impl VehicleInterface for BridgeClient {
    async fn get(&self, var: SimVar) -> Option<f64> {
        match (SimVarGetRequest { var }).send_request(self).await {
            Ok(resp) => resp.value(),
            Err(e) => {
                event!("{var} unavailable: {e}");
                None
            }
        }
    }

    async fn set(&self, var: SimVar, value: f64) -> Result<(), VehicleError> {
        SimVarPutRequest { var, body: ValueBody { value } }.send_request(self).await?;
        event!("{var} <- {value}");
        Ok(())
    }

    async fn find(&self, event: SimEvent) -> bool {
        (EventFindRequest { event }).send_request(self).await.is_ok()
    }

    async fn trigger(&self, event: SimEvent, arg: Option<i32>) -> Result<Dispatch, VehicleError> {
        let req = EventTriggerRequest { event, body: ValueBody { value: arg } };
        match req.send_request(self).await {
            Ok(_) => {
                event!("{event}({arg:?})");
                Ok(Dispatch::Sent)
            }
            Err(VehicleError::NotFound) => Ok(Dispatch::Unbound),
            Err(e) => Err(e),
        }
    }
}
