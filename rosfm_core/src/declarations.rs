use crate::{
    error::{CompileError, ContractViolation},
    interfaces::{message_fields, service_fields},
    naming::sanitize_interface_name,
    statechart::{RosDeclaration, Statechart},
};
use log::trace;
use serde::Serialize;
use std::fmt;

/// The role an automaton plays with respect to a ROS resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Owner of a timer.
    Timer,
    /// Publisher on a topic.
    TopicPublisher,
    /// Subscriber to a topic.
    TopicSubscriber,
    /// Server of a service.
    ServiceServer,
    /// Client of a service.
    ServiceClient,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Timer => write!(f, "timer"),
            Role::TopicPublisher => write!(f, "topic publisher"),
            Role::TopicSubscriber => write!(f, "topic subscriber"),
            Role::ServiceServer => write!(f, "service server"),
            Role::ServiceClient => write!(f, "service client"),
        }
    }
}

/// A timer, ticking periodically at the given rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosTimer {
    /// Name of the timer, unique across all automata.
    pub name: String,
    /// Rate in Hertz.
    pub rate_hz: f64,
}

impl RosTimer {
    /// Creates a new [`RosTimer`].
    pub fn new(name: impl Into<String>, rate_hz: f64) -> Self {
        Self {
            name: name.into(),
            rate_hz,
        }
    }
}

/// The ROS resources declared by a single automaton, indexed by role and name.
///
/// A registry only lives for the desugaring of its automaton.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationsRegistry {
    automaton: String,
    timers: Vec<RosTimer>,
    // (role, resource name, interface type)
    interfaces: Vec<(Role, String, String)>,
}

impl DeclarationsRegistry {
    /// The registry of an automaton declaring nothing.
    pub fn empty(automaton: impl Into<String>) -> Self {
        Self {
            automaton: automaton.into(),
            timers: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    /// Collects and checks the declarations of the statechart.
    ///
    /// Fails if a resource is declared twice with the same role,
    /// if an interface type or name is not valid,
    /// if a timer rate is not positive,
    /// or if the automaton is both server and client of the same service.
    pub fn from_statechart(statechart: &Statechart) -> Result<Self, CompileError> {
        let mut registry = Self::empty(statechart.name());
        for declaration in statechart.ros_declarations() {
            let role = declaration.role();
            let resource = declaration.resource();
            if registry.contains(role, resource) {
                return Err(CompileError::DuplicateDeclaration {
                    automaton: registry.automaton.clone(),
                    resource: resource.to_owned(),
                    role,
                });
            }
            match declaration {
                RosDeclaration::Timer { name, rate_hz } => {
                    if !rate_hz.is_finite() || *rate_hz <= 0.0 {
                        return Err(CompileError::InvalidTimerRate {
                            automaton: registry.automaton.clone(),
                            name: name.clone(),
                            rate_hz: *rate_hz,
                        });
                    }
                    registry.timers.push(RosTimer::new(name.clone(), *rate_hz));
                }
                RosDeclaration::TopicPublisher {
                    topic: resource,
                    interface_type,
                }
                | RosDeclaration::TopicSubscriber {
                    topic: resource,
                    interface_type,
                } => {
                    registry.check_name(resource)?;
                    if message_fields(interface_type).is_none() {
                        return Err(registry.unknown_type(resource, interface_type));
                    }
                    registry.push(role, resource, interface_type);
                }
                RosDeclaration::ServiceServer {
                    service: resource,
                    interface_type,
                }
                | RosDeclaration::ServiceClient {
                    service: resource,
                    interface_type,
                } => {
                    registry.check_name(resource)?;
                    if service_fields(interface_type).is_none() {
                        return Err(registry.unknown_type(resource, interface_type));
                    }
                    let other = if role == Role::ServiceServer {
                        Role::ServiceClient
                    } else {
                        Role::ServiceServer
                    };
                    if registry.contains(other, resource) {
                        return Err(CompileError::ServiceContract {
                            service_name: resource.clone(),
                            reason: ContractViolation::ClientAndServer(registry.automaton.clone()),
                        });
                    }
                    registry.push(role, resource, interface_type);
                }
            }
        }
        trace!(
            target: "desugar",
            "automaton `{}` declares {} timers and {} interfaces",
            registry.automaton,
            registry.timers.len(),
            registry.interfaces.len()
        );
        Ok(registry)
    }

    fn push(&mut self, role: Role, resource: &str, interface_type: &str) {
        self.interfaces
            .push((role, resource.to_owned(), interface_type.to_owned()));
    }

    fn check_name(&self, resource: &str) -> Result<(), CompileError> {
        sanitize_interface_name(resource)
            .map(|_| ())
            .map_err(|source| CompileError::InvalidInterfaceName {
                automaton: self.automaton.clone(),
                source,
            })
    }

    fn unknown_type(&self, resource: &str, interface_type: &str) -> CompileError {
        CompileError::UnknownInterfaceType {
            automaton: self.automaton.clone(),
            resource: resource.to_owned(),
            interface_type: interface_type.to_owned(),
        }
    }

    /// Name of the automaton owning the declarations.
    pub fn automaton(&self) -> &str {
        &self.automaton
    }

    /// Whether the resource is declared with the given role.
    pub fn contains(&self, role: Role, resource: &str) -> bool {
        match role {
            Role::Timer => self.timers.iter().any(|timer| timer.name == resource),
            _ => self.interface_type(role, resource).is_some(),
        }
    }

    /// The interface type of a topic or service declared with the given role.
    pub fn interface_type(&self, role: Role, resource: &str) -> Option<&str> {
        self.interfaces
            .iter()
            .find(|(r, name, _)| *r == role && name == resource)
            .map(|(_, _, interface_type)| interface_type.as_str())
    }

    /// Fails with [`CompileError::UnresolvedReference`] unless the resource is declared with the given role.
    pub fn require(&self, role: Role, resource: &str) -> Result<(), CompileError> {
        if self.contains(role, resource) {
            Ok(())
        } else {
            Err(CompileError::UnresolvedReference {
                automaton: self.automaton.clone(),
                resource: resource.to_owned(),
                role,
            })
        }
    }

    /// The declared timers, in declaration order.
    pub fn timers(&self) -> &[RosTimer] {
        &self.timers
    }

    fn by_role(&self, role: Role) -> impl Iterator<Item = (&str, &str)> {
        self.interfaces
            .iter()
            .filter(move |(r, _, _)| *r == role)
            .map(|(_, name, interface_type)| (name.as_str(), interface_type.as_str()))
    }

    /// Name and type of the services served by the automaton, in declaration order.
    pub fn service_servers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_role(Role::ServiceServer)
    }

    /// Name and type of the services the automaton is a client of, in declaration order.
    pub fn service_clients(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_role(Role::ServiceClient)
    }

    /// Nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty() && self.interfaces.is_empty()
    }
}
