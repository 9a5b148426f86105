use crate::vocabulary::*;
use log::trace;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};
use rosfm_core::{Executable, Param, RosDeclaration, State, Statechart, Transition, Trigger};
use std::io::Write;

/// Writes the statechart as a ROS-SCXML document.
///
/// Plain statecharts produce plain SCXML.
pub fn write<W: Write>(statechart: &Statechart, writer: W) -> anyhow::Result<()> {
    let mut writer = ScxmlWriter {
        writer: Writer::new_with_indent(writer, b' ', 4),
    };
    writer.statechart(statechart)?;
    trace!(target: "parser", "written statechart `{}`", statechart.name());
    Ok(())
}

/// Renders the statechart as a ROS-SCXML document.
///
/// ```
/// # use rosfm_core::*;
/// let statechart = StatechartBuilder::new("idle")
///     .state(State::new("s"))
///     .build()
///     .unwrap();
/// let text = rosfm_fmt_scxml::to_string(&statechart).unwrap();
/// assert!(text.contains(r#"<state id="s"/>"#));
/// assert_eq!(rosfm_fmt_scxml::parse_str(&text).unwrap(), statechart);
/// ```
pub fn to_string(statechart: &Statechart) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    write(statechart, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

struct ScxmlWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> ScxmlWriter<W> {
    fn start(&mut self, tag: &str, attrs: &[(&str, &str)]) -> anyhow::Result<()> {
        let mut elem = BytesStart::new(tag);
        elem.extend_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(elem))?;
        Ok(())
    }

    fn end(&mut self, tag: &str) -> anyhow::Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) -> anyhow::Result<()> {
        let mut elem = BytesStart::new(tag);
        elem.extend_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(elem))?;
        Ok(())
    }

    fn statechart(&mut self, statechart: &Statechart) -> anyhow::Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.start(
            TAG_SCXML,
            &[
                (ATTR_NAME, statechart.name()),
                (ATTR_VERSION, SCXML_VERSION),
                (ATTR_MODEL_SRC, ""),
                (ATTR_INITIAL, statechart.initial_state()),
                (ATTR_XMLNS, SCXML_NAMESPACE),
                (ATTR_DATAMODEL, DATAMODEL_ECMASCRIPT),
            ],
        )?;
        if !statechart.data_model().is_empty() {
            self.start(TAG_DATAMODEL, &[])?;
            for data in statechart.data_model() {
                let mut attrs = vec![(ATTR_ID, data.id.as_str())];
                if let Some(expr) = &data.expr {
                    attrs.push((ATTR_EXPR, expr.as_str()));
                }
                if let Some(r#type) = &data.r#type {
                    attrs.push((ATTR_TYPE, r#type.as_str()));
                }
                self.empty(TAG_DATA, &attrs)?;
            }
            self.end(TAG_DATAMODEL)?;
        }
        for declaration in statechart.ros_declarations() {
            self.declaration(declaration)?;
        }
        for state in statechart.states() {
            self.state(state)?;
        }
        self.end(TAG_SCXML)
    }

    fn declaration(&mut self, declaration: &RosDeclaration) -> anyhow::Result<()> {
        match declaration {
            RosDeclaration::Timer { name, rate_hz } => self.empty(
                TAG_ROS_TIME_RATE,
                &[(ATTR_NAME, name.as_str()), (ATTR_RATE_HZ, rate_hz.to_string().as_str())],
            ),
            RosDeclaration::TopicPublisher {
                topic,
                interface_type,
            } => self.empty(
                TAG_ROS_TOPIC_PUBLISHER,
                &[(ATTR_TOPIC, topic.as_str()), (ATTR_TYPE, interface_type.as_str())],
            ),
            RosDeclaration::TopicSubscriber {
                topic,
                interface_type,
            } => self.empty(
                TAG_ROS_TOPIC_SUBSCRIBER,
                &[(ATTR_TOPIC, topic.as_str()), (ATTR_TYPE, interface_type.as_str())],
            ),
            RosDeclaration::ServiceServer {
                service,
                interface_type,
            } => self.empty(
                TAG_ROS_SERVICE_SERVER,
                &[(ATTR_SERVICE_NAME, service.as_str()), (ATTR_TYPE, interface_type.as_str())],
            ),
            RosDeclaration::ServiceClient {
                service,
                interface_type,
            } => self.empty(
                TAG_ROS_SERVICE_CLIENT,
                &[(ATTR_SERVICE_NAME, service.as_str()), (ATTR_TYPE, interface_type.as_str())],
            ),
        }
    }

    fn state(&mut self, state: &State) -> anyhow::Result<()> {
        let attrs = [(ATTR_ID, state.id.as_str())];
        if state.on_entry.is_empty() && state.on_exit.is_empty() && state.transitions.is_empty() {
            return self.empty(TAG_STATE, &attrs);
        }
        self.start(TAG_STATE, &attrs)?;
        if !state.on_entry.is_empty() {
            self.start(TAG_ONENTRY, &[])?;
            self.block(&state.on_entry)?;
            self.end(TAG_ONENTRY)?;
        }
        for transition in &state.transitions {
            self.transition(transition)?;
        }
        if !state.on_exit.is_empty() {
            self.start(TAG_ONEXIT, &[])?;
            self.block(&state.on_exit)?;
            self.end(TAG_ONEXIT)?;
        }
        self.end(TAG_STATE)
    }

    fn transition(&mut self, transition: &Transition) -> anyhow::Result<()> {
        let events;
        let (tag, mut attrs) = match &transition.trigger {
            Trigger::Events(list) if list.is_empty() => (TAG_TRANSITION, Vec::new()),
            Trigger::Events(list) => {
                events = list.join(" ");
                (TAG_TRANSITION, vec![(ATTR_EVENT, events.as_str())])
            }
            Trigger::RosRateCallback { timer } => {
                (TAG_ROS_RATE_CALLBACK, vec![(ATTR_NAME, timer.as_str())])
            }
            Trigger::RosTopicCallback { topic } => {
                (TAG_ROS_TOPIC_CALLBACK, vec![(ATTR_TOPIC, topic.as_str())])
            }
            Trigger::RosServiceHandleRequest { service } => (
                TAG_ROS_SERVICE_HANDLE_REQUEST,
                vec![(ATTR_SERVICE_NAME, service.as_str())],
            ),
            Trigger::RosServiceHandleResponse { service } => (
                TAG_ROS_SERVICE_HANDLE_RESPONSE,
                vec![(ATTR_SERVICE_NAME, service.as_str())],
            ),
        };
        attrs.push((ATTR_TARGET, transition.target.as_str()));
        if let Some(guard) = &transition.guard {
            attrs.push((ATTR_COND, guard.as_str()));
        }
        if transition.body.is_empty() {
            self.empty(tag, &attrs)
        } else {
            self.start(tag, &attrs)?;
            self.block(&transition.body)?;
            self.end(tag)
        }
    }

    fn block(&mut self, block: &[Executable]) -> anyhow::Result<()> {
        block.iter().try_for_each(|exec| self.executable(exec))
    }

    fn executable(&mut self, executable: &Executable) -> anyhow::Result<()> {
        match executable {
            Executable::Assign { location, expr } => self.empty(
                TAG_ASSIGN,
                &[(ATTR_LOCATION, location.as_str()), (ATTR_EXPR, expr.as_str())],
            ),
            Executable::Send { event, params } => {
                self.message(TAG_SEND, (ATTR_EVENT, event.as_str()), TAG_PARAM, params)
            }
            Executable::If {
                branches,
                otherwise,
            } => {
                let mut branches = branches.iter();
                if let Some((cond, body)) = branches.next() {
                    self.start(TAG_IF, &[(ATTR_COND, cond.as_str())])?;
                    self.block(body)?;
                    for (cond, body) in branches {
                        self.empty(TAG_ELSEIF, &[(ATTR_COND, cond.as_str())])?;
                        self.block(body)?;
                    }
                    if !otherwise.is_empty() {
                        self.empty(TAG_ELSE, &[])?;
                        self.block(otherwise)?;
                    }
                    self.end(TAG_IF)?;
                }
                Ok(())
            }
            Executable::RosTopicPublish { topic, fields } => {
                self.message(TAG_ROS_TOPIC_PUBLISH, (ATTR_TOPIC, topic.as_str()), TAG_FIELD, fields)
            }
            Executable::RosServiceSendRequest { service, fields } => self.message(
                TAG_ROS_SERVICE_SEND_REQUEST,
                (ATTR_SERVICE_NAME, service.as_str()),
                TAG_FIELD,
                fields,
            ),
            Executable::RosServiceSendResponse { service, fields } => self.message(
                TAG_ROS_SERVICE_SEND_RESPONSE,
                (ATTR_SERVICE_NAME, service.as_str()),
                TAG_FIELD,
                fields,
            ),
        }
    }

    fn message(
        &mut self,
        tag: &str,
        attr: (&str, &str),
        param_tag: &str,
        params: &[Param],
    ) -> anyhow::Result<()> {
        if params.is_empty() {
            return self.empty(tag, &[attr]);
        }
        self.start(tag, &[attr])?;
        for param in params {
            self.empty(param_tag, &[(ATTR_NAME, param.name.as_str()), (ATTR_EXPR, param.expr.as_str())])?;
        }
        self.end(tag)
    }
}
