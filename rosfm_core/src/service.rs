//! Synthesis of the arbiter automata of ROS services.
//!
//! A service has exactly one server and any positive number of clients,
//! possibly living in different automata.
//! Clients and server never communicate directly:
//! each service is mediated by an arbiter automaton, named after [`SRV_PREFIX`],
//! which forwards one client request at a time to the server
//! and routes the response back to the client that sent the request.
//!
//! The arbiter has a `waiting` state, accepting requests from any client,
//! and a `processing_client_<client>` state per client,
//! accepting only the response of the server.
//! No request is accepted while processing another one.

use crate::{
    error::{CompileError, ContractViolation},
    expression::{ExpressionError, ExpressionInterpreter},
    interfaces::{Field, service_fields},
    naming::{self, NamingError, SRV_PREFIX},
    statechart::{Data, Executable, Param, State, Statechart, StatechartBuilder, Transition, Trigger},
};
use log::{debug, info};
use std::collections::HashMap;

const WAITING: &str = "waiting";

fn processing_state(client: &str) -> String {
    format!("processing_client_{client}")
}

/// A ROS service, with its server and clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosService {
    name: String,
    interface_type: Option<String>,
    server: Option<String>,
    clients: Vec<String>,
}

impl RosService {
    /// Creates a service with the given name, and no server or client yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface_type: None,
            server: None,
            clients: Vec::new(),
        }
    }

    /// Name of the service.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of the service, once set by the first registration.
    pub fn interface_type(&self) -> Option<&str> {
        self.interface_type.as_deref()
    }

    /// The automaton serving the service, if registered.
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// The client automata, in registration order.
    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    fn violation(&self, reason: ContractViolation) -> CompileError {
        CompileError::ServiceContract {
            service_name: self.name.clone(),
            reason,
        }
    }

    fn set_type(&mut self, interface_type: &str) -> Result<(), CompileError> {
        match &self.interface_type {
            None => {
                self.interface_type = Some(interface_type.to_owned());
                Ok(())
            }
            Some(expected) if expected == interface_type => Ok(()),
            Some(expected) => Err(self.violation(ContractViolation::TypeMismatch {
                expected: expected.clone(),
                found: interface_type.to_owned(),
            })),
        }
    }

    /// Registers `automaton` as the server of the service.
    ///
    /// Fails if the type differs from that of previous registrations,
    /// if a server is already registered,
    /// or if `automaton` is already a client.
    pub fn set_server(&mut self, interface_type: &str, automaton: &str) -> Result<(), CompileError> {
        self.set_type(interface_type)?;
        if let Some(first) = &self.server {
            return Err(self.violation(ContractViolation::MultipleServers {
                first: first.clone(),
                second: automaton.to_owned(),
            }));
        }
        if self.clients.iter().any(|client| client == automaton) {
            return Err(self.violation(ContractViolation::ClientAndServer(automaton.to_owned())));
        }
        self.server = Some(automaton.to_owned());
        Ok(())
    }

    /// Registers `automaton` as a client of the service.
    ///
    /// Fails if the type differs from that of previous registrations,
    /// if `automaton` is already a client,
    /// or if it is the server.
    pub fn append_client(
        &mut self,
        interface_type: &str,
        automaton: &str,
    ) -> Result<(), CompileError> {
        self.set_type(interface_type)?;
        if self.clients.iter().any(|client| client == automaton) {
            return Err(self.violation(ContractViolation::DuplicateClient(automaton.to_owned())));
        }
        if self.server.as_deref() == Some(automaton) {
            return Err(self.violation(ContractViolation::ClientAndServer(automaton.to_owned())));
        }
        self.clients.push(automaton.to_owned());
        Ok(())
    }

    /// Checks that type, server and at least one client are registered.
    pub fn check_contract(&self) -> Result<(), CompileError> {
        if self.interface_type.is_none() {
            Err(self.violation(ContractViolation::Unset))
        } else if self.server.is_none() {
            Err(self.violation(ContractViolation::NoServer))
        } else if self.clients.is_empty() {
            Err(self.violation(ContractViolation::NoClients))
        } else {
            Ok(())
        }
    }

    /// Synthesizes the arbiter automaton of the service.
    ///
    /// The default value of each scratch variable is checked through `interpreter`.
    pub fn to_statechart(
        &self,
        interpreter: &dyn ExpressionInterpreter,
    ) -> Result<Statechart, CompileError> {
        self.check_contract()?;
        let interface_type = self.interface_type.as_deref().unwrap_or_default();
        let (request, response) =
            service_fields(interface_type).ok_or_else(|| CompileError::UnknownInterfaceType {
                automaton: self.server.clone().unwrap_or_default(),
                resource: self.name.clone(),
                interface_type: interface_type.to_owned(),
            })?;
        let name = naming::srv_handler_name(&self.name).map_err(|source| {
            CompileError::InvalidInterfaceName {
                automaton: self.server.clone().unwrap_or_default(),
                source,
            }
        })?;
        let naming_error = |source: NamingError| CompileError::InvalidInterfaceName {
            automaton: name.clone(),
            source,
        };

        let mut builder = StatechartBuilder::new(name.as_str()).initial(WAITING);
        let bindings = HashMap::new();
        let mut scratch: Vec<&str> = Vec::new();
        for field in request.iter().chain(response) {
            // Request and response may share field names.
            if scratch.contains(&field.name) {
                continue;
            }
            let default_expr = field.field_type.default_expr();
            let value = interpreter.evaluate(default_expr, &bindings)?;
            if !field.field_type.admits(&value) {
                return Err(CompileError::Expression(ExpressionError::Type {
                    expr: default_expr.to_owned(),
                }));
            }
            builder = builder.data(
                Data::new(field.name)
                    .expr(default_expr)
                    .typed(field.field_type.ros_name()),
            );
            scratch.push(field.name);
        }

        let server_request =
            naming::srv_server_request_event(&self.name).map_err(naming_error)?;
        let server_response =
            naming::srv_server_response_event(&self.name).map_err(naming_error)?;
        let mut waiting = State::new(WAITING);
        let mut processing = Vec::with_capacity(self.clients.len());
        for client in &self.clients {
            let client_request =
                naming::srv_request_event(&self.name, client).map_err(naming_error)?;
            let client_response =
                naming::srv_response_event(&self.name, client).map_err(naming_error)?;
            waiting = waiting.transition(relay(
                processing_state(client),
                client_request,
                request,
                server_request.clone(),
            ));
            processing.push(State::new(processing_state(client)).transition(relay(
                WAITING.to_owned(),
                server_response.clone(),
                response,
                client_response,
            )));
        }
        let statechart = builder.state(waiting).states(processing).build()?;
        debug_assert!(statechart.is_plain());
        info!(
            target: "sync",
            "synthesized arbiter `{}` for {} clients",
            statechart.name(),
            self.clients.len()
        );
        Ok(statechart)
    }
}

/// Transition on `trigger` copying `fields` from the event into the scratch variables
/// and then sending them on `event`.
fn relay(target: String, trigger: String, fields: &[Field], event: String) -> Transition {
    let transition = fields
        .iter()
        .fold(Transition::new(target).trigger(Trigger::event(trigger)), |t, field| {
            t.action(Executable::Assign {
                location: field.name.to_owned(),
                expr: format!("_event.{}", field.name),
            })
        });
    transition.action(Executable::Send {
        event,
        params: fields
            .iter()
            .map(|field| Param::new(field.name, field.name))
            .collect(),
    })
}

/// Removes the empty self-loops of arbiter automata,
/// and leaves any other automaton unchanged.
///
/// See [`Statechart::without_empty_self_loops`].
pub fn remove_empty_self_loops(statechart: &Statechart) -> Statechart {
    if statechart.name().starts_with(SRV_PREFIX) {
        debug!(target: "sync", "removing empty self-loops from `{}`", statechart.name());
        statechart.without_empty_self_loops()
    } else {
        statechart.clone()
    }
}
