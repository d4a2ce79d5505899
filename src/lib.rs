pub mod channel;
pub mod client;
pub mod collaborators;
pub mod config;
pub mod delivery;
pub mod error;
pub mod events;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod presence;
pub mod registry;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
