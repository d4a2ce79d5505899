pub mod api;
pub mod reconciler;
