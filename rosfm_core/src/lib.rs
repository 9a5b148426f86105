//! Desugaring and synchronization-synthesis engine for ROS-extended SCXML models.
//!
//! The crate turns a set of statecharts written in the ROS-SCXML dialect
//! into _plain_ statecharts, i.e., event-driven automata without any ROS-specific construct,
//! suitable to be assembled into a model-checker input:
//!
//! - a [`Statechart`] is defined through a [`StatechartBuilder`] and validated on construction;
//! - [`to_plain`] projects timers, topics and services onto plain send/event pairs,
//!   resolving resources through a per-automaton [`DeclarationsRegistry`];
//! - a [`RosService`] collects the server and clients of a service across automata
//!   and synthesizes the arbiter automaton serializing the clients' requests;
//! - the [`Orchestrator`] drives the whole pipeline over an ordered list of statecharts.
//!
//! ```
//! # use rosfm_core::*;
//! let statechart = StatechartBuilder::new("blinker")
//!     .ros_declaration(RosDeclaration::Timer { name: "tick".into(), rate_hz: 2.0 })
//!     .state(State::new("on").transition(
//!         Transition::new("off").trigger(Trigger::RosRateCallback { timer: "tick".into() }),
//!     ))
//!     .state(State::new("off").transition(
//!         Transition::new("on").trigger(Trigger::RosRateCallback { timer: "tick".into() }),
//!     ))
//!     .build()
//!     .expect("well-formed statechart");
//!
//! let interpreter = EcmaScriptInterpreter::new();
//! let output = Orchestrator::new(&interpreter)
//!     .compile(&[statechart])
//!     .expect("compilation succeeds");
//! assert!(output.statecharts.iter().all(Statechart::is_plain));
//! assert_eq!(output.timers, vec![RosTimer::new("tick", 2.0)]);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod declarations;
mod desugar;
mod error;
pub mod expression;
pub mod interfaces;
pub mod naming;
mod orchestrator;
mod service;
mod statechart;

pub use declarations::*;
pub use desugar::to_plain;
pub use error::*;
pub use expression::{EcmaScriptInterpreter, ExpressionError, ExpressionInterpreter, Value};
pub use orchestrator::*;
pub use service::*;
pub use statechart::*;
