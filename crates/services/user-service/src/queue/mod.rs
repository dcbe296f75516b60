//! Message queue consumers.

mod validation_responder;

pub use validation_responder::UserValidationResponder;
