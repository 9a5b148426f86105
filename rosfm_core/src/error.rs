use crate::{
    declarations::Role, expression::ExpressionError, naming::NamingError,
    statechart::StructuralError,
};
use thiserror::Error;

/// The reasons why a set of service registrations is not a valid service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// Registrants disagree on the service type.
    #[error("type `{found}` does not match previously registered type `{expected}`")]
    TypeMismatch {
        /// Type set by the first registrant.
        expected: String,
        /// Type of the offending registrant.
        found: String,
    },
    /// More than one automaton serves the service.
    #[error("automata `{first}` and `{second}` both serve the service")]
    MultipleServers {
        /// Server registered first.
        first: String,
        /// Server registered second.
        second: String,
    },
    /// No automaton serves the service.
    #[error("no server registered")]
    NoServer,
    /// No automaton is a client of the service.
    #[error("no client registered")]
    NoClients,
    /// The same automaton registered twice as a client.
    #[error("client `{0}` registered more than once")]
    DuplicateClient(String),
    /// The same automaton declares itself both server and client.
    #[error("automaton `{0}` is both server and client")]
    ClientAndServer(String),
    /// Name and type were never set.
    #[error("service name and type not set")]
    Unset,
}

/// The error type of the compilation pipeline.
///
/// Every error is fatal for the whole compilation run:
/// no partial output is produced once one is detected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// The statechart is malformed.
    #[error("malformed statechart `{automaton}`")]
    Structural {
        /// Name of the offending automaton.
        automaton: String,
        /// The violated structural rule.
        #[source]
        source: StructuralError,
    },
    /// A ROS action or callback references a resource not declared with a compatible role.
    #[error("automaton `{automaton}` uses {role} `{resource}` without declaring it")]
    UnresolvedReference {
        /// Name of the offending automaton.
        automaton: String,
        /// Name of the referenced resource.
        resource: String,
        /// Role the resource is required to be declared with.
        role: Role,
    },
    /// The same resource is declared twice with the same role.
    #[error("automaton `{automaton}` declares {role} `{resource}` more than once")]
    DuplicateDeclaration {
        /// Name of the offending automaton.
        automaton: String,
        /// Name of the declared resource.
        resource: String,
        /// Role of the duplicated declaration.
        role: Role,
    },
    /// The declared interface type is not known.
    #[error("automaton `{automaton}` declares `{resource}` with unknown type `{interface_type}`")]
    UnknownInterfaceType {
        /// Name of the offending automaton.
        automaton: String,
        /// Name of the declared resource.
        resource: String,
        /// The unknown type.
        interface_type: String,
    },
    /// A topic, service or timer name cannot be turned into a canonical name.
    #[error("automaton `{automaton}` declares an invalid interface name")]
    InvalidInterfaceName {
        /// Name of the offending automaton.
        automaton: String,
        /// The naming rule that was violated.
        #[source]
        source: NamingError,
    },
    /// Some fields required by the interface type are not supplied.
    #[error("automaton `{automaton}` does not supply fields {missing_fields:?} of `{resource}`")]
    MissingField {
        /// Name of the offending automaton.
        automaton: String,
        /// Name of the resource the fields belong to.
        resource: String,
        /// Fields of the schema that were not supplied.
        missing_fields: Vec<String>,
    },
    /// Some supplied fields do not belong to the interface type.
    #[error("automaton `{automaton}` supplies fields {unknown_fields:?} unknown to `{resource}`")]
    UnknownField {
        /// Name of the offending automaton.
        automaton: String,
        /// Name of the resource the fields are sent to.
        resource: String,
        /// Supplied fields not in the schema.
        unknown_fields: Vec<String>,
    },
    /// The same field is supplied more than once.
    #[error("automaton `{automaton}` supplies field `{field}` of `{resource}` more than once")]
    DuplicateField {
        /// Name of the offending automaton.
        automaton: String,
        /// Name of the resource the field is sent to.
        resource: String,
        /// The repeated field.
        field: String,
    },
    /// The registrations of a service violate the one-server/many-clients contract.
    #[error("invalid service `{service_name}`: {reason}")]
    ServiceContract {
        /// Name of the service.
        service_name: String,
        /// What went wrong.
        reason: ContractViolation,
    },
    /// A timer rate is not a positive number.
    #[error("automaton `{automaton}` declares timer `{name}` with invalid rate {rate_hz}")]
    InvalidTimerRate {
        /// Name of the offending automaton.
        automaton: String,
        /// Name of the timer.
        name: String,
        /// The invalid rate.
        rate_hz: f64,
    },
    /// Two automata declare timers with the same name.
    #[error("timer `{name}` declared more than once")]
    DuplicateTimer {
        /// Name of the timer.
        name: String,
    },
    /// Two automata share the same name.
    #[error("automaton `{name}` defined more than once")]
    DuplicateAutomaton {
        /// Name of the automaton.
        name: String,
    },
    /// Error raised by the expression interpreter.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}
