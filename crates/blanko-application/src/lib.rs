//! Application layer: wires conversation events from a transport frontend
//! into the engine with per-conversation ordering guarantees.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
