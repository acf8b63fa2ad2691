pub mod events;
pub mod events_query;
pub mod publish_request;
pub mod publish_response;
pub mod stream_guard;
