use std::fmt::{Display, Formatter};

/// Errors raised while talking to the simulator bridge.
#[derive(Debug)]
pub(crate) enum VehicleError {
    /// The bridge reported a failure on its side (5xx).
    InternalServer,
    /// The bridge refused the request (4xx other than 404).
    BadRequest(String),
    /// The named variable or event does not exist in the simulator.
    NotFound,
    /// The bridge could not be reached.
    NoConnection,
    /// The bridge did not answer in time.
    Timeout,
    /// The bridge answered with a body that could not be decoded.
    Decode(String),
    Unknown,
}

impl Display for VehicleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleError::InternalServer => write!(f, "simulator bridge internal error"),
            VehicleError::BadRequest(detail) => write!(f, "bridge rejected request: {detail}"),
            VehicleError::NotFound => write!(f, "unknown simulator name"),
            VehicleError::NoConnection => write!(f, "simulator bridge unreachable"),
            VehicleError::Timeout => write!(f, "simulator bridge timed out"),
            VehicleError::Decode(detail) => write!(f, "undecodable bridge response: {detail}"),
            VehicleError::Unknown => write!(f, "unknown bridge error"),
        }
    }
}

impl std::error::Error for VehicleError {}

impl From<reqwest::Error> for VehicleError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            VehicleError::Timeout
        } else if value.is_connect() {
            VehicleError::NoConnection
        } else if value.is_decode() {
            VehicleError::Decode(value.to_string())
        } else if value.is_request() || value.is_builder() {
            VehicleError::BadRequest(value.to_string())
        } else if value.is_redirect() {
            VehicleError::InternalServer
        } else {
            VehicleError::Unknown
        }
    }
}

/// Maps the status line of a bridge response onto `VehicleError`.
pub(crate) async fn unwrap_return_code(
    response: reqwest::Response,
) -> Result<reqwest::Response, VehicleError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status == reqwest::StatusCode::NOT_FOUND {
        Err(VehicleError::NotFound)
    } else if status.is_server_error() {
        Err(VehicleError::InternalServer)
    } else if status.is_client_error() {
        let detail = response.text().await.unwrap_or_default();
        Err(VehicleError::BadRequest(format!("{status}: {detail}")))
    } else {
        Err(VehicleError::Unknown)
    }
}

pub(crate) trait BridgeResponseType: Sized {
    async fn read_response(response: reqwest::Response) -> Result<Self, VehicleError>;
}

/// Body of `GET`/`PUT /simvar/{NAME}`.
#[derive(serde::Deserialize, Debug)]
pub(crate) struct SimVarResponse {
    /// The current value, `null` while the simulator cannot deliver it.
    value: Option<f64>,
}

impl SimVarResponse {
    /// The value if the simulator delivered a finite number.
    pub(crate) fn value(&self) -> Option<f64> { self.value.filter(|v| v.is_finite()) }
}

impl BridgeResponseType for SimVarResponse {
    async fn read_response(response: reqwest::Response) -> Result<Self, VehicleError> {
        let resp = unwrap_return_code(response).await?;
        Ok(resp.json::<SimVarResponse>().await?)
    }
}

/// Acknowledgement of an event request. The body is ignored.
#[derive(Debug)]
pub(crate) struct Ack;

impl BridgeResponseType for Ack {
    async fn read_response(response: reqwest::Response) -> Result<Self, VehicleError> {
        unwrap_return_code(response).await?;
        Ok(Ack)
    }
}
