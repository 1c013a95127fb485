// Library for tests to access modules

pub mod bucketizer;
pub mod config;
pub mod error;
pub mod geojson;
pub mod models;
pub mod panel;
pub mod projection;
pub mod query;
pub mod routes;
pub mod worker;
