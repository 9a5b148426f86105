use rosfm_core::*;

const SET_BOOL: &str = "std_srvs/SetBool";

fn server(name: &str) -> Result<Statechart, CompileError> {
    StatechartBuilder::new(name)
        .ros_declaration(RosDeclaration::ServiceServer {
            service: "set_bool".into(),
            interface_type: SET_BOOL.into(),
        })
        .state(
            State::new("idle").transition(
                Transition::new("idle")
                    .trigger(Trigger::RosServiceHandleRequest {
                        service: "set_bool".into(),
                    })
                    .action(Executable::RosServiceSendResponse {
                        service: "set_bool".into(),
                        fields: vec![
                            RosField::new("success", "true"),
                            RosField::new("message", "''"),
                        ],
                    }),
            ),
        )
        .build()
}

fn client(name: &str) -> Result<Statechart, CompileError> {
    StatechartBuilder::new(name)
        .ros_declaration(RosDeclaration::ServiceClient {
            service: "set_bool".into(),
            interface_type: SET_BOOL.into(),
        })
        .state(
            State::new("start").transition(Transition::new("wait").action(
                Executable::RosServiceSendRequest {
                    service: "set_bool".into(),
                    fields: vec![RosField::new("data", "true")],
                },
            )),
        )
        .state(
            State::new("wait").transition(Transition::new("done").trigger(
                Trigger::RosServiceHandleResponse {
                    service: "set_bool".into(),
                },
            )),
        )
        .state(State::new("done"))
        .build()
}

fn compile(statecharts: &[Statechart]) -> Result<CompilationOutput, CompileError> {
    let interpreter = EcmaScriptInterpreter::new();
    Orchestrator::new(&interpreter).compile(statecharts)
}

fn events(transition: &Transition) -> &[String] {
    match &transition.trigger {
        Trigger::Events(events) => events,
        trigger => panic!("unexpected trigger {trigger:?}"),
    }
}

fn sent_events(body: &[Executable]) -> Vec<&str> {
    body.iter()
        .filter_map(|exec| match exec {
            Executable::Send { event, .. } => Some(event.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn set_bool_scenario() -> Result<(), CompileError> {
    let output = compile(&[server("A")?, client("B")?, client("C")?])?;
    assert!(output.timers.is_empty());
    assert_eq!(
        output
            .statecharts
            .iter()
            .map(Statechart::name)
            .collect::<Vec<_>>(),
        ["A", "B", "C", "srv_handler_set_bool"]
    );
    assert!(output.statecharts.iter().all(Statechart::is_plain));

    let arbiter = &output.statecharts[3];
    assert_eq!(arbiter.states().len(), 3);
    let waiting = arbiter.state("waiting").expect("waiting state");
    assert_eq!(waiting.transitions.len(), 2);
    assert!(arbiter.state("processing_client_B").is_some());
    assert!(arbiter.state("processing_client_C").is_some());

    // Clients and server talk with the arbiter only.
    let b = &output.statecharts[1];
    assert_eq!(
        sent_events(&b.states()[0].transitions[0].body),
        ["srv_set_bool_req_client_B"]
    );
    assert_eq!(
        events(&b.states()[1].transitions[0]),
        ["srv_set_bool_response_client_B"]
    );
    let a = &output.statecharts[0];
    assert_eq!(events(&a.states()[0].transitions[0]), ["srv_set_bool_request"]);
    assert_eq!(
        sent_events(&a.states()[0].transitions[0].body),
        ["srv_set_bool_response"]
    );
    Ok(())
}

#[test]
fn mutual_exclusion_and_routing() -> Result<(), CompileError> {
    let clients = ["c0", "c1", "c2", "c3"];
    let mut statecharts = vec![server("srv")?];
    for name in clients {
        statecharts.push(client(name)?);
    }
    let output = compile(&statecharts)?;
    let arbiter = output.statecharts.last().expect("arbiter");
    assert_eq!(arbiter.states().len(), 1 + clients.len());

    let request_events: Vec<String> = clients
        .iter()
        .map(|c| format!("srv_set_bool_req_client_{c}"))
        .collect();
    for state in arbiter.states().iter().filter(|s| s.id != "waiting") {
        for transition in &state.transitions {
            assert!(events(transition).iter().all(|e| !request_events.contains(e)));
        }
    }

    for (idx, client) in clients.iter().enumerate() {
        let waiting = arbiter.state("waiting").expect("waiting state");
        let accept = &waiting.transitions[idx];
        assert_eq!(events(accept), [request_events[idx].as_str()]);
        assert_eq!(accept.target, format!("processing_client_{client}"));

        let processing = arbiter.state(&accept.target).expect("processing state");
        assert_eq!(processing.transitions.len(), 1);
        let reply = &processing.transitions[0];
        assert_eq!(reply.target, "waiting");
        // Only the response fields are written on the way back.
        let assigned: Vec<&str> = reply
            .body
            .iter()
            .filter_map(|exec| match exec {
                Executable::Assign { location, .. } => Some(location.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(assigned, ["success", "message"]);
        assert_eq!(
            sent_events(&reply.body),
            [format!("srv_set_bool_response_client_{client}").as_str()]
        );
    }
    Ok(())
}

#[test]
fn duplicate_tick() -> Result<(), CompileError> {
    let ticking = |name: &str, rate_hz: f64| {
        StatechartBuilder::new(name)
            .ros_declaration(RosDeclaration::Timer {
                name: "tick".into(),
                rate_hz,
            })
            .state(State::new("s"))
            .build()
    };
    assert_eq!(
        compile(&[ticking("a", 1.0)?, ticking("b", 2.0)?]),
        Err(CompileError::DuplicateTimer {
            name: "tick".into()
        })
    );
    Ok(())
}

#[test]
fn service_cardinality() -> Result<(), CompileError> {
    assert!(matches!(
        compile(&[client("B")?]),
        Err(CompileError::ServiceContract {
            reason: ContractViolation::NoServer,
            ..
        })
    ));
    assert!(matches!(
        compile(&[server("A")?]),
        Err(CompileError::ServiceContract {
            reason: ContractViolation::NoClients,
            ..
        })
    ));
    assert!(matches!(
        compile(&[server("A")?, server("A2")?, client("B")?]),
        Err(CompileError::ServiceContract {
            reason: ContractViolation::MultipleServers { .. },
            ..
        })
    ));
    Ok(())
}

#[test]
fn type_mismatch_fails_fast() -> Result<(), CompileError> {
    let trigger_client = StatechartBuilder::new("T")
        .ros_declaration(RosDeclaration::ServiceClient {
            service: "/set_bool".into(),
            interface_type: "std_srvs/Trigger".into(),
        })
        .state(State::new("s"))
        .build()?;
    assert_eq!(
        compile(&[server("A")?, trigger_client, client("B")?]),
        Err(CompileError::ServiceContract {
            service_name: "set_bool".into(),
            reason: ContractViolation::TypeMismatch {
                expected: SET_BOOL.into(),
                found: "std_srvs/Trigger".into(),
            },
        })
    );
    Ok(())
}

#[test]
fn errors_follow_input_order() -> Result<(), CompileError> {
    let unresolved = StatechartBuilder::new("U")
        .ros_declaration(RosDeclaration::Timer {
            name: "tick".into(),
            rate_hz: 1.0,
        })
        .state(State::new("s").transition(Transition::new("s").trigger(
            Trigger::RosTopicCallback {
                topic: "/missing".into(),
            },
        )))
        .build()?;
    let result = compile(&[client("B")?, client("B")?, unresolved.clone()]);
    assert_eq!(
        result,
        Err(CompileError::DuplicateAutomaton { name: "B".into() })
    );
    let result = compile(&[unresolved, client("B")?, client("B")?]);
    assert!(matches!(
        result,
        Err(CompileError::UnresolvedReference {
            role: Role::TopicSubscriber,
            ..
        })
    ));
    Ok(())
}

#[test]
fn desugaring_is_idempotent() -> Result<(), CompileError> {
    let (plain, registry) = to_plain(&client("B")?)?;
    assert!(plain.is_plain());
    assert_eq!(registry.service_clients().count(), 1);
    let (again, registry) = to_plain(&plain)?;
    assert_eq!(again, plain);
    assert!(registry.is_empty());
    Ok(())
}

#[test]
fn transition_order_is_preserved() -> Result<(), CompileError> {
    let statechart = StatechartBuilder::new("prio")
        .ros_declaration(RosDeclaration::TopicSubscriber {
            topic: "/cmd".into(),
            interface_type: "std_msgs/Int32".into(),
        })
        .state(
            State::new("s")
                .transition(
                    Transition::new("s")
                        .trigger(Trigger::RosTopicCallback {
                            topic: "/cmd".into(),
                        })
                        .guard("_msg.data > 0"),
                )
                .transition(Transition::new("t").trigger(Trigger::event("stop")))
                .transition(
                    Transition::new("t").trigger(Trigger::RosTopicCallback {
                        topic: "/cmd".into(),
                    }),
                ),
        )
        .state(State::new("t"))
        .build()?;
    let output = compile(&[statechart])?;
    let transitions = &output.statecharts[0].states()[0].transitions;
    assert_eq!(
        transitions
            .iter()
            .map(|t| (t.target.as_str(), events(t)[0].as_str()))
            .collect::<Vec<_>>(),
        [
            ("s", "topic_cmd_msg"),
            ("t", "stop"),
            ("t", "topic_cmd_msg")
        ]
    );
    assert_eq!(transitions[0].guard.as_deref(), Some("_msg.data > 0"));
    Ok(())
}
