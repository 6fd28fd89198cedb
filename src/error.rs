use crate::{data::student::StudentId, gateway::GatewayAction};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::{fmt::Display, net::AddrParseError};
use uuid::Uuid;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

pub const UNKNOWN_ERROR_MESSAGE: &str = "an unknown error occurred";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DirectoryError {
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse server address {:?}", original))]
    ParseServerAddr {
        source: AddrParseError,
        original: String,
    },
    #[snafu(display("Invalid students API URL {:?}: {}", url, source))]
    InvalidBaseUrl {
        source: url::ParseError,
        url: String,
    },
    #[snafu(display("Students API URL {:?} cannot hold a student ID", url))]
    BaseUrlNotHierarchical { url: String },
    #[snafu(display("Request did not say which directory it belongs to, reload the page"))]
    MissingClient,
    #[snafu(display("Unable to parse directory client ID {:?}", original))]
    ParseClientId {
        source: uuid::Error,
        original: String,
    },
    #[snafu(display("Directory {} is no longer mounted, reload the page", id))]
    UnknownClient { id: Uuid },
    #[snafu(display("Unable to {}: {}", action, source))]
    Request {
        source: reqwest::Error,
        action: GatewayAction,
    },
    #[snafu(display("{} ({})", action.failure_message(), status))]
    UnsuccessfulStatus {
        action: GatewayAction,
        status: StatusCode,
    },
    #[snafu(display("Unable to read the students list: {}", source))]
    DecodeStudents { source: reqwest::Error },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: StudentId },
}

/// Reduces any failure to the single line shown in the error banner.
pub fn banner_message(failure: &impl Display) -> String {
    let message = failure.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

impl DirectoryError {
    pub fn banner_message(&self) -> String {
        banner_message(self)
    }
}

impl IntoResponse for DirectoryError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BG: StatusCode = StatusCode::BAD_GATEWAY; //upstream said no
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Directory Error "}
                    span {(desc)}
                }
            }
        };

        let status_code = match &self {
            Self::BadEnvVar { .. } | Self::ParseServerAddr { .. } => ISE,
            Self::InvalidBaseUrl { .. } | Self::BaseUrlNotHierarchical { .. } => ISE,
            Self::MissingClient | Self::ParseClientId { .. } => BI,
            Self::UnknownClient { .. } => NF,
            Self::Request { .. } | Self::UnsuccessfulStatus { .. } => BG,
            Self::DecodeStudents { .. } => BG,
            Self::MissingStudent { .. } => NF,
        };

        error!(?self, "Error!");
        (status_code, Html(basic_error(self.banner_message()))).into_response()
    }
}
