// Integration API (`/integration/v1/`): API-key client and the few wire
// types it has to inspect.

pub mod client;
pub mod types;
