use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rosfm_core::*;

#[inline(always)]
fn server(service: &str) -> Statechart {
    StatechartBuilder::new("server")
        .ros_declaration(RosDeclaration::ServiceServer {
            service: service.into(),
            interface_type: "std_srvs/SetBool".into(),
        })
        .state(
            State::new("idle").transition(
                Transition::new("idle")
                    .trigger(Trigger::RosServiceHandleRequest {
                        service: service.into(),
                    })
                    .action(Executable::RosServiceSendResponse {
                        service: service.into(),
                        fields: vec![
                            RosField::new("success", "true"),
                            RosField::new("message", "'done'"),
                        ],
                    }),
            ),
        )
        .build()
        .unwrap()
}

#[inline(always)]
fn client(service: &str, idx: usize) -> Statechart {
    StatechartBuilder::new(format!("client_{idx}"))
        .ros_declaration(RosDeclaration::ServiceClient {
            service: service.into(),
            interface_type: "std_srvs/SetBool".into(),
        })
        .ros_declaration(RosDeclaration::Timer {
            name: format!("tick_{idx}"),
            rate_hz: 1.0 + idx as f64,
        })
        .state(
            State::new("idle").transition(
                Transition::new("waiting")
                    .trigger(Trigger::RosRateCallback {
                        timer: format!("tick_{idx}"),
                    })
                    .action(Executable::RosServiceSendRequest {
                        service: service.into(),
                        fields: vec![RosField::new("data", "true")],
                    }),
            ),
        )
        .state(
            State::new("waiting").transition(Transition::new("idle").trigger(
                Trigger::RosServiceHandleResponse {
                    service: service.into(),
                },
            )),
        )
        .build()
        .unwrap()
}

fn network(clients: usize) -> Vec<Statechart> {
    std::iter::once(server("/set_bool"))
        .chain((0..clients).map(|idx| client("/set_bool", idx)))
        .collect()
}

fn compile(c: &mut Criterion) {
    let interpreter = EcmaScriptInterpreter::new();
    let orchestrator = Orchestrator::new(&interpreter);
    for clients in [1, 10, 100] {
        let statecharts = network(clients);
        c.bench_with_input(
            BenchmarkId::new("compile", clients),
            &statecharts,
            |b, statecharts| {
                b.iter(|| orchestrator.compile(statecharts).unwrap());
            },
        );
    }
}

fn desugar(c: &mut Criterion) {
    let statechart = client("/set_bool", 0);
    c.bench_function("desugar client", |b| {
        b.iter(|| to_plain(&statechart).unwrap());
    });
}

criterion_group!(benches, compile, desugar);
criterion_main!(benches);
