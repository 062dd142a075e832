/*
This module is home to everything related to the remote telemetry
service holding the asset models, assets and computed property values
this program orchestrates.

It provides a thin typed HTTP client, the AssetApi trait the rest of
the program is written against (and that test doubles implement), and
the reqwest-backed implementation of that trait.
*/

mod api;
mod http;

pub use api::{
    ApiError, AssetApi, AssetDescription, AssetSummary, BatchEntry, BatchPutRequest,
    BatchPutResponse, EntryFailure, HttpApi, ModelDescription, ModelSummary, PropertyRole,
    PropertySummary,
};
pub use http::{Auth, Client, ClientError, StatusCode};
