use crate::{
    declarations::{DeclarationsRegistry, Role},
    error::CompileError,
    interfaces::{Field, message_fields, service_fields},
    naming::{self, NamingError},
    statechart::{Executable, RosField, State, Statechart, StatechartBuilder, Transition, Trigger},
};
use log::{info, trace};

/// Projects a ROS statechart onto a plain one.
///
/// Timers, topics and services are replaced by `send` actions and event triggers
/// named after the canonical scheme of [`naming`].
/// A statechart that is already plain is returned unchanged, together with an empty registry.
/// The input is never modified.
///
/// Along with the plain statechart,
/// returns the registry of the declarations the ROS constructs were resolved against.
pub fn to_plain(
    statechart: &Statechart,
) -> Result<(Statechart, DeclarationsRegistry), CompileError> {
    if statechart.is_plain() {
        trace!(target: "desugar", "statechart `{}` is already plain", statechart.name());
        // ROS constructs without declarations cannot resolve.
        let registry = DeclarationsRegistry::empty(statechart.name());
        statechart.check_valid_ros_instantiations(&registry)?;
        return Ok((statechart.clone(), registry));
    }
    let registry = DeclarationsRegistry::from_statechart(statechart)?;
    statechart.check_valid_ros_instantiations(&registry)?;
    let desugarer = Desugarer {
        registry: &registry,
    };
    let states = statechart
        .states()
        .iter()
        .map(|state| desugarer.state(state))
        .collect::<Result<Vec<_>, _>>()?;
    let plain = statechart
        .data_model()
        .iter()
        .cloned()
        .fold(
            StatechartBuilder::new(statechart.name()).initial(statechart.initial_state()),
            StatechartBuilder::data,
        )
        .states(states)
        .build()?;
    debug_assert!(plain.is_plain());
    info!(target: "desugar", "desugared statechart `{}`", plain.name());
    Ok((plain, registry))
}

struct Desugarer<'a> {
    registry: &'a DeclarationsRegistry,
}

impl Desugarer<'_> {
    fn automaton(&self) -> &str {
        self.registry.automaton()
    }

    fn naming_error(&self, source: NamingError) -> CompileError {
        CompileError::InvalidInterfaceName {
            automaton: self.automaton().to_owned(),
            source,
        }
    }

    fn state(&self, state: &State) -> Result<State, CompileError> {
        Ok(State {
            id: state.id.clone(),
            on_entry: self.block(&state.on_entry)?,
            on_exit: self.block(&state.on_exit)?,
            transitions: state
                .transitions
                .iter()
                .map(|transition| self.transition(transition))
                .collect::<Result<_, _>>()?,
        })
    }

    fn transition(&self, transition: &Transition) -> Result<Transition, CompileError> {
        let event = match &transition.trigger {
            Trigger::Events(_) => None,
            Trigger::RosRateCallback { timer } => Some(naming::timer_event(timer)),
            Trigger::RosTopicCallback { topic } => {
                Some(naming::topic_event(topic).map_err(|err| self.naming_error(err))?)
            }
            Trigger::RosServiceHandleRequest { service } => Some(
                naming::srv_server_request_event(service).map_err(|err| self.naming_error(err))?,
            ),
            Trigger::RosServiceHandleResponse { service } => Some(
                naming::srv_response_event(service, self.automaton())
                    .map_err(|err| self.naming_error(err))?,
            ),
        };
        let trigger = event.map_or_else(|| transition.trigger.clone(), Trigger::event);
        Ok(Transition {
            target: transition.target.clone(),
            trigger,
            guard: transition.guard.clone(),
            body: self.block(&transition.body)?,
        })
    }

    fn block(&self, block: &[Executable]) -> Result<Vec<Executable>, CompileError> {
        block.iter().map(|exec| self.executable(exec)).collect()
    }

    fn executable(&self, executable: &Executable) -> Result<Executable, CompileError> {
        match executable {
            Executable::Assign { .. } | Executable::Send { .. } => Ok(executable.clone()),
            Executable::If {
                branches,
                otherwise,
            } => Ok(Executable::If {
                branches: branches
                    .iter()
                    .map(|(cond, body)| self.block(body).map(|body| (cond.clone(), body)))
                    .collect::<Result<_, _>>()?,
                otherwise: self.block(otherwise)?,
            }),
            Executable::RosTopicPublish { topic, fields } => {
                let schema = self
                    .registry
                    .interface_type(Role::TopicPublisher, topic)
                    .and_then(message_fields);
                let event = naming::topic_event(topic).map_err(|err| self.naming_error(err))?;
                self.send(topic, Role::TopicPublisher, event, schema, fields)
            }
            Executable::RosServiceSendRequest { service, fields } => {
                let schema = self
                    .registry
                    .interface_type(Role::ServiceClient, service)
                    .and_then(service_fields)
                    .map(|(request, _)| request);
                let event = naming::srv_request_event(service, self.automaton())
                    .map_err(|err| self.naming_error(err))?;
                self.send(service, Role::ServiceClient, event, schema, fields)
            }
            Executable::RosServiceSendResponse { service, fields } => {
                let schema = self
                    .registry
                    .interface_type(Role::ServiceServer, service)
                    .and_then(service_fields)
                    .map(|(_, response)| response);
                let event = naming::srv_server_response_event(service)
                    .map_err(|err| self.naming_error(err))?;
                self.send(service, Role::ServiceServer, event, schema, fields)
            }
        }
    }

    fn send(
        &self,
        resource: &str,
        role: Role,
        event: String,
        schema: Option<&[Field]>,
        fields: &[RosField],
    ) -> Result<Executable, CompileError> {
        // Declarations have been checked against the catalogue already.
        let schema = schema.ok_or_else(|| CompileError::UnresolvedReference {
            automaton: self.automaton().to_owned(),
            resource: resource.to_owned(),
            role,
        })?;
        check_fields(self.automaton(), resource, schema, fields)?;
        trace!(target: "desugar", "`{}` sends event `{event}`", self.automaton());
        Ok(Executable::Send {
            event,
            params: fields.to_vec(),
        })
    }
}

/// The supplied fields must be exactly those of the schema, each supplied once.
fn check_fields(
    automaton: &str,
    resource: &str,
    schema: &[Field],
    fields: &[RosField],
) -> Result<(), CompileError> {
    let unknown_fields: Vec<String> = fields
        .iter()
        .filter(|field| !schema.iter().any(|f| f.name == field.name))
        .map(|field| field.name.clone())
        .collect();
    if !unknown_fields.is_empty() {
        return Err(CompileError::UnknownField {
            automaton: automaton.to_owned(),
            resource: resource.to_owned(),
            unknown_fields,
        });
    }
    for (idx, field) in fields.iter().enumerate() {
        if fields[..idx].iter().any(|f| f.name == field.name) {
            return Err(CompileError::DuplicateField {
                automaton: automaton.to_owned(),
                resource: resource.to_owned(),
                field: field.name.clone(),
            });
        }
    }
    let missing_fields: Vec<String> = schema
        .iter()
        .filter(|f| !fields.iter().any(|field| field.name == f.name))
        .map(|f| f.name.to_owned())
        .collect();
    if !missing_fields.is_empty() {
        return Err(CompileError::MissingField {
            automaton: automaton.to_owned(),
            resource: resource.to_owned(),
            missing_fields,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statechart::{Data, Param, RosDeclaration};

    fn client(fields: Vec<RosField>) -> Result<Statechart, CompileError> {
        StatechartBuilder::new("client")
            .data(Data::new("done").expr("false"))
            .ros_declaration(RosDeclaration::ServiceClient {
                service: "/set_bool".into(),
                interface_type: "std_srvs/SetBool".into(),
            })
            .state(
                State::new("idle").transition(
                    Transition::new("waiting")
                        .action(Executable::RosServiceSendRequest {
                            service: "/set_bool".into(),
                            fields,
                        }),
                ),
            )
            .state(
                State::new("waiting").transition(
                    Transition::new("idle")
                        .trigger(Trigger::RosServiceHandleResponse {
                            service: "/set_bool".into(),
                        })
                        .guard("_res.success")
                        .action(Executable::Assign {
                            location: "done".into(),
                            expr: "true".into(),
                        }),
                ),
            )
            .build()
    }

    #[test]
    fn plain_is_identity() -> Result<(), CompileError> {
        let statechart = StatechartBuilder::new("plain")
            .state(State::new("a").transition(Transition::new("a").trigger(Trigger::event("e"))))
            .build()?;
        let (plain, registry) = to_plain(&statechart)?;
        assert_eq!(plain, statechart);
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn undeclared_callback() -> Result<(), CompileError> {
        let statechart = StatechartBuilder::new("orphan")
            .state(State::new("a").transition(Transition::new("a").trigger(
                Trigger::RosRateCallback {
                    timer: "tick".into(),
                },
            )))
            .build()?;
        assert!(statechart.is_plain());
        assert_eq!(
            to_plain(&statechart),
            Err(CompileError::UnresolvedReference {
                automaton: "orphan".into(),
                resource: "tick".into(),
                role: Role::Timer,
            })
        );
        Ok(())
    }

    #[test]
    fn service_client() -> Result<(), CompileError> {
        let statechart = client(vec![RosField::new("data", "true")])?;
        let (plain, registry) = to_plain(&statechart)?;
        assert!(plain.is_plain());
        assert!(!statechart.is_plain());
        assert_eq!(registry.service_clients().count(), 1);
        assert_eq!(plain.data_model(), statechart.data_model());
        assert_eq!(
            plain.states()[0].transitions[0].body,
            vec![Executable::Send {
                event: "srv_set_bool_req_client_client".into(),
                params: vec![Param::new("data", "true")],
            }]
        );
        let response = &plain.states()[1].transitions[0];
        assert_eq!(
            response.trigger,
            Trigger::event("srv_set_bool_response_client_client")
        );
        assert_eq!(response.guard.as_deref(), Some("_res.success"));
        assert_eq!(response.body, statechart.states()[1].transitions[0].body);
        Ok(())
    }

    #[test]
    fn fields() {
        assert!(matches!(
            client(Vec::new()).and_then(|sc| to_plain(&sc)),
            Err(CompileError::MissingField { missing_fields, .. }) if missing_fields == ["data"]
        ));
        assert!(matches!(
            client(vec![RosField::new("data", "true"), RosField::new("force", "true")])
                .and_then(|sc| to_plain(&sc)),
            Err(CompileError::UnknownField { unknown_fields, .. }) if unknown_fields == ["force"]
        ));
        assert!(matches!(
            client(vec![RosField::new("data", "true"), RosField::new("data", "false")])
                .and_then(|sc| to_plain(&sc)),
            Err(CompileError::DuplicateField { field, .. }) if field == "data"
        ));
    }

    #[test]
    fn nested_publish() -> Result<(), CompileError> {
        let statechart = StatechartBuilder::new("pub")
            .ros_declaration(RosDeclaration::TopicPublisher {
                topic: "/ns/level".into(),
                interface_type: "std_msgs/msg/Int32".into(),
            })
            .ros_declaration(RosDeclaration::Timer {
                name: "tick".into(),
                rate_hz: 1.0,
            })
            .state(
                State::new("s").transition(
                    Transition::new("s")
                        .trigger(Trigger::RosRateCallback {
                            timer: "tick".into(),
                        })
                        .action(Executable::If {
                            branches: vec![(
                                "true".into(),
                                vec![Executable::RosTopicPublish {
                                    topic: "/ns/level".into(),
                                    fields: vec![RosField::new("data", "1")],
                                }],
                            )],
                            otherwise: Vec::new(),
                        }),
                ),
            )
            .build()?;
        let (plain, registry) = to_plain(&statechart)?;
        assert_eq!(registry.timers().len(), 1);
        let transition = &plain.states()[0].transitions[0];
        assert_eq!(transition.trigger, Trigger::event("ros_time_rate.tick"));
        assert!(!transition.body.iter().any(Executable::is_ros));
        assert_eq!(
            transition.body,
            vec![Executable::If {
                branches: vec![(
                    "true".into(),
                    vec![Executable::Send {
                        event: "topic_ns__level_msg".into(),
                        params: vec![Param::new("data", "1")],
                    }],
                )],
                otherwise: Vec::new(),
            }]
        );
        Ok(())
    }
}
