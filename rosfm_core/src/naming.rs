//! Canonical names of the events and automata generated by the desugaring.
//!
//! Automata synchronize on event names matched literally by the model checker,
//! so every name produced here is part of the output format and must not change.

use thiserror::Error;

/// Prefix of the name of service-arbiter automata.
pub const SRV_PREFIX: &str = "srv_handler_";

/// Prefix of the events triggered by ROS timers.
pub const TIMER_PREFIX: &str = "ros_time_rate.";

/// Violations of the ROS interface naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The name is empty (possibly after removing the leading slash).
    #[error("interface name is empty")]
    Empty,
    /// The name contains whitespace.
    #[error("interface name `{0}` contains whitespace")]
    Whitespace(String),
}

/// Turns a ROS interface name into a string usable inside event and automaton names:
/// the leading slash is removed and each remaining `/` becomes `__`.
///
/// ```
/// # use rosfm_core::naming::sanitize_interface_name;
/// assert_eq!(sanitize_interface_name("/robot/set_bool").unwrap(), "robot__set_bool");
/// assert!(sanitize_interface_name("/").is_err());
/// assert!(sanitize_interface_name("set bool").is_err());
/// ```
pub fn sanitize_interface_name(name: &str) -> Result<String, NamingError> {
    let name = name.strip_prefix('/').unwrap_or(name);
    if name.is_empty() {
        Err(NamingError::Empty)
    } else if name.chars().any(char::is_whitespace) {
        Err(NamingError::Whitespace(name.to_owned()))
    } else {
        Ok(name.replace('/', "__"))
    }
}

/// Event sent by `automaton` (a client) to request the service.
pub fn srv_request_event(service: &str, automaton: &str) -> Result<String, NamingError> {
    Ok(format!(
        "srv_{}_req_client_{automaton}",
        sanitize_interface_name(service)?
    ))
}

/// Event relaying the response of the service to `automaton` (a client).
pub fn srv_response_event(service: &str, automaton: &str) -> Result<String, NamingError> {
    Ok(format!(
        "srv_{}_response_client_{automaton}",
        sanitize_interface_name(service)?
    ))
}

/// Event relaying a request to the server of the service.
pub fn srv_server_request_event(service: &str) -> Result<String, NamingError> {
    Ok(format!("srv_{}_request", sanitize_interface_name(service)?))
}

/// Event carrying the response of the server of the service.
pub fn srv_server_response_event(service: &str) -> Result<String, NamingError> {
    Ok(format!("srv_{}_response", sanitize_interface_name(service)?))
}

/// Event carrying a message published on the topic.
pub fn topic_event(topic: &str) -> Result<String, NamingError> {
    Ok(format!("topic_{}_msg", sanitize_interface_name(topic)?))
}

/// Event triggered by the timer at its rate.
pub fn timer_event(timer: &str) -> String {
    format!("{TIMER_PREFIX}{timer}")
}

/// Name of the arbiter automaton of the service.
pub fn srv_handler_name(service: &str) -> Result<String, NamingError> {
    Ok(format!("{SRV_PREFIX}{}", sanitize_interface_name(service)?))
}
