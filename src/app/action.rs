use crate::api::Request;

#[derive(Debug, PartialEq)]
pub enum Action {
    /// Spawn a request against the server.
    Api(Request),
    /// Persist the remembered login name.
    SaveUsername(String),
    Quit,
}
