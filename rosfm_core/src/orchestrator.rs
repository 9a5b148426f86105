use crate::{
    declarations::{DeclarationsRegistry, RosTimer},
    desugar::to_plain,
    error::CompileError,
    expression::ExpressionInterpreter,
    naming::sanitize_interface_name,
    service::{RosService, remove_empty_self_loops},
    statechart::Statechart,
};
use hashbrown::{HashMap, HashSet};
use log::{info, trace};
use rayon::prelude::*;

/// The result of a successful compilation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationOutput {
    /// The plain statecharts, in input order, followed by the synthesized arbiters.
    pub statecharts: Vec<Statechart>,
    /// The timers declared across all automata, in declaration order.
    pub timers: Vec<RosTimer>,
}

/// Drives the compilation of a network of ROS statecharts into plain statecharts.
///
/// Each statechart is desugared independently (in parallel);
/// timers and service registrations are then aggregated in input order,
/// so that errors are reported deterministically,
/// and an arbiter automaton is synthesized for each service.
///
/// The first error met aborts the compilation, and no partial output is produced.
#[derive(Clone, Copy)]
pub struct Orchestrator<'a> {
    interpreter: &'a dyn ExpressionInterpreter,
}

impl<'a> Orchestrator<'a> {
    /// Creates an [`Orchestrator`] checking default values with the given interpreter.
    pub fn new(interpreter: &'a dyn ExpressionInterpreter) -> Self {
        Self { interpreter }
    }

    /// Compiles the statecharts into plain statecharts and the list of timers.
    pub fn compile(&self, statecharts: &[Statechart]) -> Result<CompilationOutput, CompileError> {
        info!(target: "orchestrator", "compiling {} statecharts", statecharts.len());
        let desugared: Vec<_> = statecharts.par_iter().map(to_plain).collect();
        let acc = desugared
            .into_iter()
            .try_fold(Accumulator::default(), |acc, result| acc.register(result?))?;
        acc.finish(self.interpreter)
    }
}

/// State of the aggregation of the desugared statecharts, threaded through the inputs.
#[derive(Debug, Default)]
struct Accumulator {
    statecharts: Vec<Statechart>,
    names: HashSet<String>,
    timers: Vec<RosTimer>,
    services: Vec<RosService>,
    // sanitized service name -> index in `services`
    service_index: HashMap<String, usize>,
}

impl Accumulator {
    fn register(
        mut self,
        (statechart, registry): (Statechart, DeclarationsRegistry),
    ) -> Result<Self, CompileError> {
        let automaton = statechart.name().to_owned();
        trace!(target: "orchestrator", "registering automaton `{automaton}`");
        if !self.names.insert(automaton.clone()) {
            return Err(CompileError::DuplicateAutomaton { name: automaton });
        }
        for timer in registry.timers() {
            if self.timers.iter().any(|t| t.name == timer.name) {
                return Err(CompileError::DuplicateTimer {
                    name: timer.name.clone(),
                });
            }
            self.timers.push(timer.clone());
        }
        for (service, interface_type) in registry.service_servers() {
            self.service(&automaton, service)?
                .set_server(interface_type, &automaton)?;
        }
        for (service, interface_type) in registry.service_clients() {
            self.service(&automaton, service)?
                .append_client(interface_type, &automaton)?;
        }
        self.statecharts.push(statechart);
        Ok(self)
    }

    fn service(&mut self, automaton: &str, name: &str) -> Result<&mut RosService, CompileError> {
        let key =
            sanitize_interface_name(name).map_err(|source| CompileError::InvalidInterfaceName {
                automaton: automaton.to_owned(),
                source,
            })?;
        let idx = *self.service_index.entry(key).or_insert_with(|| {
            self.services.push(RosService::new(name));
            self.services.len() - 1
        });
        Ok(&mut self.services[idx])
    }

    fn finish(
        mut self,
        interpreter: &dyn ExpressionInterpreter,
    ) -> Result<CompilationOutput, CompileError> {
        for service in &self.services {
            let arbiter = service.to_statechart(interpreter)?;
            if !self.names.insert(arbiter.name().to_owned()) {
                return Err(CompileError::DuplicateAutomaton {
                    name: arbiter.name().to_owned(),
                });
            }
            self.statecharts.push(arbiter);
        }
        info!(
            target: "orchestrator",
            "compiled {} automata ({} arbiters) and {} timers",
            self.statecharts.len(),
            self.services.len(),
            self.timers.len()
        );
        Ok(CompilationOutput {
            statecharts: self
                .statecharts
                .iter()
                .map(remove_empty_self_loops)
                .collect(),
            timers: self.timers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expression::EcmaScriptInterpreter,
        statechart::{RosDeclaration, State, StatechartBuilder, Transition, Trigger},
    };

    fn timer(automaton: &str, name: &str, rate_hz: f64) -> Statechart {
        StatechartBuilder::new(automaton)
            .ros_declaration(RosDeclaration::Timer {
                name: name.into(),
                rate_hz,
            })
            .state(State::new("s").transition(
                Transition::new("s").trigger(Trigger::RosRateCallback { timer: name.into() }),
            ))
            .build()
            .expect("valid statechart")
    }

    #[test]
    fn timers_in_order() -> Result<(), CompileError> {
        let interpreter = EcmaScriptInterpreter::new();
        let output = Orchestrator::new(&interpreter).compile(&[
            timer("a", "fast", 10.0),
            timer("b", "slow", 0.5),
        ])?;
        assert_eq!(
            output.timers,
            vec![RosTimer::new("fast", 10.0), RosTimer::new("slow", 0.5)]
        );
        assert_eq!(output.statecharts.len(), 2);
        assert_eq!(output.statecharts[0].name(), "a");
        Ok(())
    }

    #[test]
    fn duplicate_automaton() {
        let interpreter = EcmaScriptInterpreter::new();
        let result =
            Orchestrator::new(&interpreter).compile(&[timer("a", "t1", 1.0), timer("a", "t2", 1.0)]);
        assert_eq!(
            result,
            Err(CompileError::DuplicateAutomaton { name: "a".into() })
        );
    }

    #[test]
    fn empty_input() -> Result<(), CompileError> {
        let interpreter = EcmaScriptInterpreter::new();
        let output = Orchestrator::new(&interpreter).compile(&[])?;
        assert!(output.statecharts.is_empty());
        assert!(output.timers.is_empty());
        Ok(())
    }
}
