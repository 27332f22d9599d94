use super::bridge_client::BridgeClient;
use super::bridge_response::{Ack, BridgeResponseType, SimVarResponse, VehicleError};
use super::sim_names::{SimEvent, SimVar};
use crate::event;

pub(crate) enum BridgeRequestMethod {
    Get,
    Put,
    Post,
}

/// A typed request against the simulator bridge.
pub(crate) trait BridgeRequestType {
    /// Type of the expected response.
    type Response: BridgeResponseType;
    /// Type of the json body, `()` for bodyless requests.
    type Body: serde::Serialize;

    fn endpoint(&self) -> String;
    fn request_method(&self) -> BridgeRequestMethod;
    fn body(&self) -> Option<&Self::Body> { None }

    async fn send_request(&self, client: &BridgeClient) -> Result<Self::Response, VehicleError> {
        let url = format!("{}{}", client.url(), self.endpoint());
        let builder = match self.request_method() {
            BridgeRequestMethod::Get => client.client().get(&url),
            BridgeRequestMethod::Put => client.client().put(&url),
            BridgeRequestMethod::Post => client.client().post(&url),
        };
        let builder = match self.body() {
            Some(body) => builder.json(body),
            None => builder,
        };
        event!("-> {url}");
        let response = builder.send().await?;
        Self::Response::read_response(response).await
    }
}

#[derive(serde::Serialize, Debug)]
pub(crate) struct ValueBody<T: serde::Serialize> {
    pub(crate) value: T,
}

/// `GET /simvar/{NAME}`
#[derive(Debug)]
pub(crate) struct SimVarGetRequest {
    pub(crate) var: SimVar,
}

impl BridgeRequestType for SimVarGetRequest {
    type Response = SimVarResponse;
    type Body = ();
    fn endpoint(&self) -> String { format!("/simvar/{}", self.var) }
    fn request_method(&self) -> BridgeRequestMethod { BridgeRequestMethod::Get }
}

/// `PUT /simvar/{NAME}` with `{"value": number}`
#[derive(Debug)]
pub(crate) struct SimVarPutRequest {
    pub(crate) var: SimVar,
    pub(crate) body: ValueBody<f64>,
}

impl BridgeRequestType for SimVarPutRequest {
    type Response = Ack;
    type Body = ValueBody<f64>;
    fn endpoint(&self) -> String { format!("/simvar/{}", self.var) }
    fn request_method(&self) -> BridgeRequestMethod { BridgeRequestMethod::Put }
    fn body(&self) -> Option<&Self::Body> { Some(&self.body) }
}

/// `GET /event/{NAME}`, answered with 404 when the event is unbound.
#[derive(Debug)]
pub(crate) struct EventFindRequest {
    pub(crate) event: SimEvent,
}

impl BridgeRequestType for EventFindRequest {
    type Response = Ack;
    type Body = ();
    fn endpoint(&self) -> String { format!("/event/{}", self.event) }
    fn request_method(&self) -> BridgeRequestMethod { BridgeRequestMethod::Get }
}

/// `POST /event/{NAME}` with `{"value": int|null}`
#[derive(Debug)]
pub(crate) struct EventTriggerRequest {
    pub(crate) event: SimEvent,
    pub(crate) body: ValueBody<Option<i32>>,
}

impl BridgeRequestType for EventTriggerRequest {
    type Response = Ack;
    type Body = ValueBody<Option<i32>>;
    fn endpoint(&self) -> String { format!("/event/{}", self.event) }
    fn request_method(&self) -> BridgeRequestMethod { BridgeRequestMethod::Post }
    fn body(&self) -> Option<&Self::Body> { Some(&self.body) }
}
