//! Object model of (ROS-extended) statecharts.
//!
//! A [`Statechart`] is an event-driven automaton given by:
//!
//! - an ordered, non-empty list of [`State`]s, one of which is the _initial state_;
//! - a _data model_ of named variables with an optional initial expression;
//! - for each state, the executable content run on entry and on exit,
//!   and an ordered list of [`Transition`]s, each with a [`Trigger`], an optional guard and a body;
//! - a list of [`RosDeclaration`]s of the timers, topics and services the automaton uses.
//!
//! A statechart with no ROS declarations is _plain_,
//! and it contains no ROS-specific triggers or actions.
//!
//! A [`Statechart`] is defined through a [`StatechartBuilder`],
//! which validates it on construction:
//! once built, its structure can no longer be altered.

mod builder;

use crate::{
    declarations::{DeclarationsRegistry, Role},
    error::CompileError,
};
pub use builder::*;
use thiserror::Error;

/// Violations of the structural rules of statecharts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// The statechart has an empty name.
    #[error("statechart name is empty")]
    EmptyName,
    /// The statechart name contains whitespace or path separators.
    #[error("statechart name `{0}` contains whitespace or `/`")]
    InvalidName(String),
    /// The statechart has no states.
    #[error("statechart has no states")]
    NoStates,
    /// The initial state is not among the states.
    #[error("initial state `{0}` does not exist")]
    MissingInitial(String),
    /// A state has an empty id.
    #[error("state with empty id")]
    EmptyStateId,
    /// Two states share the same id.
    #[error("state `{0}` defined more than once")]
    DuplicateState(String),
    /// A transition targets a state that does not exist.
    #[error("transition from state `{state}` targets unknown state `{target}`")]
    DanglingTarget {
        /// Source state of the transition.
        state: String,
        /// The unknown target.
        target: String,
    },
    /// A data element has an empty name.
    #[error("data element with empty name")]
    EmptyData,
    /// Two data elements share the same name.
    #[error("data element `{0}` defined more than once")]
    DuplicateData(String),
    /// A `send` action or an event trigger has an empty event name.
    #[error("empty event name")]
    EmptyEvent,
    /// An `if` action has no branches.
    #[error("conditional with no branches")]
    EmptyIf,
    /// A condition or guard is empty.
    #[error("empty condition")]
    EmptyCondition,
    /// A ROS action, trigger or declaration names no resource.
    #[error("ROS construct with empty resource name")]
    EmptyResource,
}

/// A variable of the data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    /// Name of the variable.
    pub id: String,
    /// Initial value of the variable, as an expression.
    pub expr: Option<String>,
    /// Type annotation, carried through verbatim.
    pub r#type: Option<String>,
}

impl Data {
    /// Creates a variable with no initial value or type.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expr: None,
            r#type: None,
        }
    }

    /// Sets the initial value.
    pub fn expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    /// Sets the type annotation.
    pub fn typed(mut self, r#type: impl Into<String>) -> Self {
        self.r#type = Some(r#type.into());
        self
    }
}

/// Declaration of a ROS resource used by an automaton.
#[derive(Debug, Clone, PartialEq)]
pub enum RosDeclaration {
    /// A timer ticking at the given rate.
    Timer {
        /// Name of the timer.
        name: String,
        /// Rate in Hertz.
        rate_hz: f64,
    },
    /// The automaton publishes on the topic.
    TopicPublisher {
        /// Name of the topic.
        topic: String,
        /// Message type.
        interface_type: String,
    },
    /// The automaton subscribes to the topic.
    TopicSubscriber {
        /// Name of the topic.
        topic: String,
        /// Message type.
        interface_type: String,
    },
    /// The automaton serves the service.
    ServiceServer {
        /// Name of the service.
        service: String,
        /// Service type.
        interface_type: String,
    },
    /// The automaton is a client of the service.
    ServiceClient {
        /// Name of the service.
        service: String,
        /// Service type.
        interface_type: String,
    },
}

impl RosDeclaration {
    /// The role of the declared resource.
    pub fn role(&self) -> Role {
        match self {
            RosDeclaration::Timer { .. } => Role::Timer,
            RosDeclaration::TopicPublisher { .. } => Role::TopicPublisher,
            RosDeclaration::TopicSubscriber { .. } => Role::TopicSubscriber,
            RosDeclaration::ServiceServer { .. } => Role::ServiceServer,
            RosDeclaration::ServiceClient { .. } => Role::ServiceClient,
        }
    }

    /// The name of the declared resource.
    pub fn resource(&self) -> &str {
        match self {
            RosDeclaration::Timer { name, .. } => name,
            RosDeclaration::TopicPublisher { topic, .. }
            | RosDeclaration::TopicSubscriber { topic, .. } => topic,
            RosDeclaration::ServiceServer { service, .. }
            | RosDeclaration::ServiceClient { service, .. } => service,
        }
    }
}

/// What makes a transition fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Any of the listed events; an empty list makes the transition eventless.
    Events(Vec<String>),
    /// A tick of the timer.
    RosRateCallback {
        /// Name of the timer.
        timer: String,
    },
    /// A message received on the topic.
    RosTopicCallback {
        /// Name of the topic.
        topic: String,
    },
    /// A request received by the server of the service.
    RosServiceHandleRequest {
        /// Name of the service.
        service: String,
    },
    /// A response received by a client of the service.
    RosServiceHandleResponse {
        /// Name of the service.
        service: String,
    },
}

impl Trigger {
    /// Trigger firing on a single event.
    pub fn event(event: impl Into<String>) -> Self {
        Trigger::Events(vec![event.into()])
    }

    /// The trigger is a ROS callback.
    pub fn is_ros(&self) -> bool {
        !matches!(self, Trigger::Events(_))
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::Events(Vec::new())
    }
}

/// Parameter of a `send` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Name of the parameter.
    pub name: String,
    /// Value of the parameter, as an expression.
    pub expr: String,
}

impl Param {
    /// Creates a new [`Param`].
    pub fn new(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: expr.into(),
        }
    }
}

/// Field of a ROS message, request or response, as supplied by an action.
pub type RosField = Param;

/// Executable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Executable {
    /// Assigns the value of the expression to the location.
    Assign {
        /// The assigned variable.
        location: String,
        /// The assigned value.
        expr: String,
    },
    /// Sends the event with the given parameters.
    Send {
        /// Name of the event.
        event: String,
        /// Parameters carried by the event.
        params: Vec<Param>,
    },
    /// Runs the body of the first branch whose condition holds,
    /// or `otherwise` if none does.
    If {
        /// Conditions with their bodies, in order.
        branches: Vec<(String, Vec<Executable>)>,
        /// Body run when no condition holds.
        otherwise: Vec<Executable>,
    },
    /// Publishes a message on the topic.
    RosTopicPublish {
        /// Name of the topic.
        topic: String,
        /// Fields of the message.
        fields: Vec<RosField>,
    },
    /// Sends a request to the service.
    RosServiceSendRequest {
        /// Name of the service.
        service: String,
        /// Fields of the request.
        fields: Vec<RosField>,
    },
    /// Sends the response of the service.
    RosServiceSendResponse {
        /// Name of the service.
        service: String,
        /// Fields of the response.
        fields: Vec<RosField>,
    },
}

impl Executable {
    fn validate(&self) -> Result<(), StructuralError> {
        match self {
            Executable::Assign { location, .. } if location.is_empty() => {
                Err(StructuralError::EmptyData)
            }
            Executable::Assign { .. } => Ok(()),
            Executable::Send { event, .. } if event.is_empty() => Err(StructuralError::EmptyEvent),
            Executable::Send { .. } => Ok(()),
            Executable::If {
                branches,
                otherwise,
            } => {
                if branches.is_empty() {
                    return Err(StructuralError::EmptyIf);
                }
                for (cond, body) in branches {
                    if cond.trim().is_empty() {
                        return Err(StructuralError::EmptyCondition);
                    }
                    body.iter().try_for_each(Executable::validate)?;
                }
                otherwise.iter().try_for_each(Executable::validate)
            }
            Executable::RosTopicPublish { topic: name, .. }
            | Executable::RosServiceSendRequest { service: name, .. }
            | Executable::RosServiceSendResponse { service: name, .. } => {
                if name.is_empty() {
                    Err(StructuralError::EmptyResource)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Whether the action, or any action nested in it, is ROS-specific.
    pub fn is_ros(&self) -> bool {
        match self {
            Executable::Assign { .. } | Executable::Send { .. } => false,
            Executable::If {
                branches,
                otherwise,
            } => branches
                .iter()
                .flat_map(|(_, body)| body)
                .chain(otherwise)
                .any(Executable::is_ros),
            Executable::RosTopicPublish { .. }
            | Executable::RosServiceSendRequest { .. }
            | Executable::RosServiceSendResponse { .. } => true,
        }
    }

    fn check_ros_instantiations(
        &self,
        registry: &DeclarationsRegistry,
    ) -> Result<(), CompileError> {
        match self {
            Executable::Assign { .. } | Executable::Send { .. } => Ok(()),
            Executable::If {
                branches,
                otherwise,
            } => branches
                .iter()
                .flat_map(|(_, body)| body)
                .chain(otherwise)
                .try_for_each(|exec| exec.check_ros_instantiations(registry)),
            Executable::RosTopicPublish { topic, .. } => {
                registry.require(Role::TopicPublisher, topic)
            }
            Executable::RosServiceSendRequest { service, .. } => {
                registry.require(Role::ServiceClient, service)
            }
            Executable::RosServiceSendResponse { service, .. } => {
                registry.require(Role::ServiceServer, service)
            }
        }
    }
}

/// A transition of a [`State`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Id of the target state.
    pub target: String,
    /// What makes the transition fire.
    pub trigger: Trigger,
    /// Condition required for the transition to fire.
    pub guard: Option<String>,
    /// Executable content run when the transition fires.
    pub body: Vec<Executable>,
}

impl Transition {
    /// Creates an eventless, unguarded transition to `target` with empty body.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    /// Sets the trigger.
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Sets the guard.
    pub fn guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    /// Appends an action to the body.
    pub fn action(mut self, action: Executable) -> Self {
        self.body.push(action);
        self
    }

    fn validate(&self, state: &str, ids: &[&str]) -> Result<(), StructuralError> {
        if !ids.contains(&self.target.as_str()) {
            return Err(StructuralError::DanglingTarget {
                state: state.to_owned(),
                target: self.target.clone(),
            });
        }
        match &self.trigger {
            Trigger::Events(events) if events.iter().any(String::is_empty) => {
                return Err(StructuralError::EmptyEvent);
            }
            Trigger::Events(_) => {}
            Trigger::RosRateCallback { timer: name }
            | Trigger::RosTopicCallback { topic: name }
            | Trigger::RosServiceHandleRequest { service: name }
            | Trigger::RosServiceHandleResponse { service: name } => {
                if name.is_empty() {
                    return Err(StructuralError::EmptyResource);
                }
            }
        }
        if self
            .guard
            .as_ref()
            .is_some_and(|guard| guard.trim().is_empty())
        {
            return Err(StructuralError::EmptyCondition);
        }
        self.body.iter().try_for_each(Executable::validate)
    }

    fn check_ros_instantiations(
        &self,
        registry: &DeclarationsRegistry,
    ) -> Result<(), CompileError> {
        match &self.trigger {
            Trigger::Events(_) => {}
            Trigger::RosRateCallback { timer } => registry.require(Role::Timer, timer)?,
            Trigger::RosTopicCallback { topic } => registry.require(Role::TopicSubscriber, topic)?,
            Trigger::RosServiceHandleRequest { service } => {
                registry.require(Role::ServiceServer, service)?
            }
            Trigger::RosServiceHandleResponse { service } => {
                registry.require(Role::ServiceClient, service)?
            }
        }
        self.body
            .iter()
            .try_for_each(|exec| exec.check_ros_instantiations(registry))
    }
}

/// A state of a [`Statechart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// Id of the state, unique within the statechart.
    pub id: String,
    /// Executable content run when entering the state.
    pub on_entry: Vec<Executable>,
    /// Executable content run when exiting the state.
    pub on_exit: Vec<Executable>,
    /// Outgoing transitions, by priority.
    pub transitions: Vec<Transition>,
}

impl State {
    /// Creates a state with no transitions or executable content.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            on_entry: Vec::new(),
            on_exit: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Appends an action to the entry content.
    pub fn on_entry(mut self, action: Executable) -> Self {
        self.on_entry.push(action);
        self
    }

    /// Appends an action to the exit content.
    pub fn on_exit(mut self, action: Executable) -> Self {
        self.on_exit.push(action);
        self
    }

    /// Appends a transition, with lower priority than those already present.
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }
}

/// A validated statechart.
///
/// See the [module documentation](self) for details.
#[derive(Debug, Clone, PartialEq)]
pub struct Statechart {
    name: String,
    initial_state: String,
    data_model: Vec<Data>,
    ros_declarations: Vec<RosDeclaration>,
    states: Vec<State>,
}

impl Statechart {
    /// Name of the automaton.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the initial state.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// The variables of the data model, in declaration order.
    pub fn data_model(&self) -> &[Data] {
        &self.data_model
    }

    /// The ROS declarations, in declaration order.
    pub fn ros_declarations(&self) -> &[RosDeclaration] {
        &self.ros_declarations
    }

    /// The states, in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The state with the given id, if any.
    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|state| state.id == id)
    }

    /// The statechart uses no ROS construct.
    pub fn is_plain(&self) -> bool {
        self.ros_declarations.is_empty()
    }

    /// Checks the structural rules of statecharts.
    pub fn validate(&self) -> Result<(), StructuralError> {
        if self.name.is_empty() {
            return Err(StructuralError::EmptyName);
        }
        // The name ends up in event names, state ids and file names.
        if self
            .name
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(StructuralError::InvalidName(self.name.clone()));
        }
        if self.states.is_empty() {
            return Err(StructuralError::NoStates);
        }
        let mut ids: Vec<&str> = Vec::with_capacity(self.states.len());
        for state in &self.states {
            if state.id.is_empty() {
                return Err(StructuralError::EmptyStateId);
            } else if ids.contains(&state.id.as_str()) {
                return Err(StructuralError::DuplicateState(state.id.clone()));
            }
            ids.push(&state.id);
        }
        if !ids.contains(&self.initial_state.as_str()) {
            return Err(StructuralError::MissingInitial(self.initial_state.clone()));
        }
        let mut data_ids: Vec<&str> = Vec::with_capacity(self.data_model.len());
        for data in &self.data_model {
            if data.id.is_empty() {
                return Err(StructuralError::EmptyData);
            } else if data_ids.contains(&data.id.as_str()) {
                return Err(StructuralError::DuplicateData(data.id.clone()));
            }
            data_ids.push(&data.id);
        }
        if self
            .ros_declarations
            .iter()
            .any(|decl| decl.resource().is_empty())
        {
            return Err(StructuralError::EmptyResource);
        }
        for state in &self.states {
            state
                .on_entry
                .iter()
                .chain(&state.on_exit)
                .try_for_each(Executable::validate)?;
            state
                .transitions
                .iter()
                .try_for_each(|transition| transition.validate(&state.id, &ids))?;
        }
        Ok(())
    }

    /// A copy of the statechart without the transitions that target their own source state,
    /// have an empty body, and leave from a state with no entry or exit content.
    ///
    /// Such transitions have no observable effect, so removing them is idempotent
    /// and preserves validity.
    pub fn without_empty_self_loops(&self) -> Statechart {
        let states = self
            .states
            .iter()
            .map(|state| {
                let mut state = state.clone();
                if state.on_entry.is_empty() && state.on_exit.is_empty() {
                    let id = state.id.clone();
                    state
                        .transitions
                        .retain(|transition| transition.target != id || !transition.body.is_empty());
                }
                state
            })
            .collect();
        Statechart {
            states,
            ..self.clone()
        }
    }

    /// Checks that every ROS trigger and action references a resource
    /// declared in `registry` with a compatible role.
    pub fn check_valid_ros_instantiations(
        &self,
        registry: &DeclarationsRegistry,
    ) -> Result<(), CompileError> {
        for state in &self.states {
            state
                .on_entry
                .iter()
                .chain(&state.on_exit)
                .try_for_each(|exec| exec.check_ros_instantiations(registry))?;
            state
                .transitions
                .iter()
                .try_for_each(|transition| transition.check_ros_instantiations(registry))?;
        }
        Ok(())
    }
}
