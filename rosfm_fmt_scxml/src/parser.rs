use crate::vocabulary::*;
use anyhow::{Context, bail};
use log::{error, info, trace, warn};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use rosfm_core::{
    Data, Executable, Param, RosDeclaration, State, Statechart, StatechartBuilder, Transition,
    Trigger,
};
use std::{collections::HashMap, path::Path, str};
use thiserror::Error;

/// Errors in the structure of a ROS-SCXML document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// Start tag not allowed in its position.
    #[error("unknown or unexpected start tag `{0}`")]
    UnexpectedStartTag(String),
    /// End tag not matching the open tag.
    #[error("unknown or unexpected end tag `{0}`")]
    UnexpectedEndTag(String),
    /// A required attribute is missing.
    #[error("missing required attribute `{0}`")]
    MissingAttr(String),
    /// The tag does not accept the attribute.
    #[error("unknown or unexpected attribute key `{0}`")]
    UnknownAttrKey(String),
    /// An attribute has a value of the wrong kind.
    #[error("invalid value `{value}` for attribute `{key}`")]
    InvalidAttrValue {
        /// The attribute.
        key: String,
        /// Its value.
        value: String,
    },
    /// The document ended with open tags.
    #[error("open tags have not been closed")]
    UnclosedTags,
    /// The document has no `scxml` root element.
    #[error("missing `scxml` root element")]
    MissingRoot,
}

/// The element being parsed, together with the content collected so far.
#[derive(Debug)]
enum Frame {
    Scxml,
    Datamodel,
    Data(Data),
    Declaration(RosDeclaration),
    State(State),
    OnEntry(Vec<Executable>),
    OnExit(Vec<Executable>),
    Transition(&'static str, Transition),
    // `send`, `assign` and the ROS actions
    Action(&'static str, Executable),
    If {
        branches: Vec<(String, Vec<Executable>)>,
        otherwise: Option<Vec<Executable>>,
    },
    ElseIf(String),
    Else,
    Param(&'static str, Param),
}

impl Frame {
    fn tag(&self) -> &'static str {
        match self {
            Frame::Scxml => TAG_SCXML,
            Frame::Datamodel => TAG_DATAMODEL,
            Frame::Data(_) => TAG_DATA,
            Frame::Declaration(declaration) => match declaration {
                RosDeclaration::Timer { .. } => TAG_ROS_TIME_RATE,
                RosDeclaration::TopicPublisher { .. } => TAG_ROS_TOPIC_PUBLISHER,
                RosDeclaration::TopicSubscriber { .. } => TAG_ROS_TOPIC_SUBSCRIBER,
                RosDeclaration::ServiceServer { .. } => TAG_ROS_SERVICE_SERVER,
                RosDeclaration::ServiceClient { .. } => TAG_ROS_SERVICE_CLIENT,
            },
            Frame::State(_) => TAG_STATE,
            Frame::OnEntry(_) => TAG_ONENTRY,
            Frame::OnExit(_) => TAG_ONEXIT,
            Frame::Transition(tag, _) | Frame::Action(tag, _) | Frame::Param(tag, _) => *tag,
            Frame::If { .. } => TAG_IF,
            Frame::ElseIf(_) => TAG_ELSEIF,
            Frame::Else => TAG_ELSE,
        }
    }

    fn is_executable(&self) -> bool {
        matches!(
            self,
            Frame::OnEntry(_) | Frame::OnExit(_) | Frame::Transition(..) | Frame::If { .. }
        )
    }
}

fn attrs(
    tag: &BytesStart<'_>,
    keys: &[&str],
    opt_keys: &[&str],
) -> anyhow::Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in tag.attributes() {
        let attr = attr?;
        let key = String::from_utf8(attr.key.into_inner().to_vec())?;
        if keys.contains(&key.as_str()) || opt_keys.contains(&key.as_str()) {
            let val = attr.unescape_value()?.into_owned();
            attrs.insert(key, val);
        } else {
            error!(target: "parser", "found unknown attribute '{key}'");
            bail!(ParserError::UnknownAttrKey(key));
        }
    }
    for key in keys {
        if !attrs.contains_key(*key) {
            error!(target: "parser", "missing required attribute '{key}'");
            bail!(ParserError::MissingAttr(key.to_string()));
        }
    }
    Ok(attrs)
}

// Only called on keys checked to be present by `attrs`.
fn take(attrs: &mut HashMap<String, String>, key: &str) -> String {
    attrs.remove(key).unwrap_or_default()
}

/// Reads a statechart from the content of a ROS-SCXML document.
pub fn parse_str(text: &str) -> anyhow::Result<Statechart> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut parser = ScxmlParser::default();
    loop {
        let position = reader.buffer_position() as u64;
        match reader
            .read_event()
            .with_context(|| format!("malformed XML at byte {position}"))?
        {
            Event::Start(tag) => {
                let tag_name = tag.name();
                let tag_name = str::from_utf8(tag_name.as_ref())?;
                trace!(target: "parser", "'{tag_name}' open tag");
                let frame = parser
                    .open(&tag)
                    .with_context(|| format!("failed to parse `{tag_name}` at byte {position}"))?;
                parser.stack.push(frame);
            }
            Event::Empty(tag) => {
                let tag_name = tag.name();
                let tag_name = str::from_utf8(tag_name.as_ref())?;
                trace!(target: "parser", "'{tag_name}' empty tag");
                parser
                    .open(&tag)
                    .and_then(|frame| parser.close(frame))
                    .with_context(|| format!("failed to parse `{tag_name}` at byte {position}"))?;
            }
            Event::End(tag) => {
                let tag_name = tag.name();
                let tag_name = str::from_utf8(tag_name.as_ref())?;
                match parser.stack.pop() {
                    Some(frame) if frame.tag() == tag_name => {
                        trace!(target: "parser", "'{tag_name}' end tag");
                        parser.close(frame).with_context(|| {
                            format!("failed to parse `{tag_name}` at byte {position}")
                        })?;
                    }
                    _ => {
                        error!(target: "parser", "unexpected end tag {tag_name}");
                        return Err(anyhow::Error::new(ParserError::UnexpectedEndTag(
                            tag_name.to_owned(),
                        ))
                        .context(format!("at byte {position}")));
                    }
                }
            }
            Event::Text(_) | Event::Comment(_) | Event::Decl(_) => continue,
            Event::CData(_) | Event::PI(_) | Event::DocType(_) => {
                warn!(target: "parser", "skipping unsupported XML content at byte {position}");
            }
            Event::Eof => {
                if !parser.stack.is_empty() {
                    bail!(ParserError::UnclosedTags);
                }
                break;
            }
        }
    }
    parser.build()
}

/// Reads a statechart from a ROS-SCXML file.
pub fn parse_file(path: &Path) -> anyhow::Result<Statechart> {
    info!(target: "parser", "parsing file '{}'", path.display());
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file '{}'", path.display()))?;
    parse_str(&text).with_context(|| format!("failed to parse file '{}'", path.display()))
}

#[derive(Debug, Default)]
struct ScxmlParser {
    name: Option<String>,
    initial: Option<String>,
    data_model: Vec<Data>,
    declarations: Vec<RosDeclaration>,
    states: Vec<State>,
    stack: Vec<Frame>,
}

impl ScxmlParser {
    fn open(&mut self, tag: &BytesStart<'_>) -> anyhow::Result<Frame> {
        let tag_name = tag.name();
        let tag_name = str::from_utf8(tag_name.as_ref())?;
        let parent = self.stack.last();
        let in_root = matches!(parent, Some(Frame::Scxml));
        let in_state = matches!(parent, Some(Frame::State(_)));
        let in_executable = parent.is_some_and(Frame::is_executable);
        let frame = match tag_name {
            TAG_SCXML if parent.is_none() && self.name.is_none() => {
                let mut attrs = attrs(
                    tag,
                    &[ATTR_NAME],
                    &[
                        ATTR_INITIAL,
                        ATTR_VERSION,
                        ATTR_MODEL_SRC,
                        ATTR_XMLNS,
                        ATTR_DATAMODEL,
                    ],
                )?;
                self.name = Some(take(&mut attrs, ATTR_NAME));
                self.initial = attrs.remove(ATTR_INITIAL);
                Frame::Scxml
            }
            TAG_DATAMODEL if in_root => Frame::Datamodel,
            TAG_DATA if matches!(parent, Some(Frame::Datamodel)) => {
                let mut attrs = attrs(tag, &[ATTR_ID], &[ATTR_EXPR, ATTR_TYPE])?;
                Frame::Data(Data {
                    id: take(&mut attrs, ATTR_ID),
                    expr: attrs.remove(ATTR_EXPR),
                    r#type: attrs.remove(ATTR_TYPE),
                })
            }
            TAG_ROS_TIME_RATE if in_root => {
                let mut attrs = attrs(tag, &[ATTR_NAME, ATTR_RATE_HZ], &[])?;
                let rate = take(&mut attrs, ATTR_RATE_HZ);
                let rate_hz = rate.trim().parse::<f64>().map_err(|_| {
                    ParserError::InvalidAttrValue {
                        key: ATTR_RATE_HZ.to_owned(),
                        value: rate.clone(),
                    }
                })?;
                Frame::Declaration(RosDeclaration::Timer {
                    name: take(&mut attrs, ATTR_NAME),
                    rate_hz,
                })
            }
            TAG_ROS_TOPIC_PUBLISHER | TAG_ROS_TOPIC_SUBSCRIBER if in_root => {
                let mut attrs = attrs(tag, &[ATTR_TOPIC, ATTR_TYPE], &[ATTR_NAME])?;
                let topic = take(&mut attrs, ATTR_TOPIC);
                let interface_type = take(&mut attrs, ATTR_TYPE);
                Frame::Declaration(if tag_name == TAG_ROS_TOPIC_PUBLISHER {
                    RosDeclaration::TopicPublisher {
                        topic,
                        interface_type,
                    }
                } else {
                    RosDeclaration::TopicSubscriber {
                        topic,
                        interface_type,
                    }
                })
            }
            TAG_ROS_SERVICE_SERVER | TAG_ROS_SERVICE_CLIENT if in_root => {
                let mut attrs = attrs(tag, &[ATTR_SERVICE_NAME, ATTR_TYPE], &[ATTR_NAME])?;
                let service = take(&mut attrs, ATTR_SERVICE_NAME);
                let interface_type = take(&mut attrs, ATTR_TYPE);
                Frame::Declaration(if tag_name == TAG_ROS_SERVICE_SERVER {
                    RosDeclaration::ServiceServer {
                        service,
                        interface_type,
                    }
                } else {
                    RosDeclaration::ServiceClient {
                        service,
                        interface_type,
                    }
                })
            }
            TAG_STATE if in_root => {
                let mut attrs = attrs(tag, &[ATTR_ID], &[])?;
                Frame::State(State::new(take(&mut attrs, ATTR_ID)))
            }
            TAG_ONENTRY if in_state => Frame::OnEntry(Vec::new()),
            TAG_ONEXIT if in_state => Frame::OnExit(Vec::new()),
            TAG_TRANSITION if in_state => {
                let mut attrs = attrs(tag, &[ATTR_TARGET], &[ATTR_EVENT, ATTR_COND])?;
                let events = attrs
                    .remove(ATTR_EVENT)
                    .map(|events| events.split_whitespace().map(String::from).collect())
                    .unwrap_or_default();
                Frame::Transition(
                    TAG_TRANSITION,
                    Transition {
                        target: take(&mut attrs, ATTR_TARGET),
                        trigger: Trigger::Events(events),
                        guard: attrs.remove(ATTR_COND),
                        body: Vec::new(),
                    },
                )
            }
            TAG_ROS_RATE_CALLBACK if in_state => {
                let mut attrs = attrs(tag, &[ATTR_NAME, ATTR_TARGET], &[ATTR_COND])?;
                let trigger = Trigger::RosRateCallback {
                    timer: take(&mut attrs, ATTR_NAME),
                };
                Frame::Transition(TAG_ROS_RATE_CALLBACK, callback(attrs, trigger))
            }
            TAG_ROS_TOPIC_CALLBACK if in_state => {
                let mut attrs = attrs(tag, &[ATTR_TOPIC, ATTR_TARGET], &[ATTR_COND])?;
                let trigger = Trigger::RosTopicCallback {
                    topic: take(&mut attrs, ATTR_TOPIC),
                };
                Frame::Transition(TAG_ROS_TOPIC_CALLBACK, callback(attrs, trigger))
            }
            TAG_ROS_SERVICE_HANDLE_REQUEST if in_state => {
                let mut attrs = attrs(tag, &[ATTR_SERVICE_NAME, ATTR_TARGET], &[ATTR_COND])?;
                let trigger = Trigger::RosServiceHandleRequest {
                    service: take(&mut attrs, ATTR_SERVICE_NAME),
                };
                Frame::Transition(TAG_ROS_SERVICE_HANDLE_REQUEST, callback(attrs, trigger))
            }
            TAG_ROS_SERVICE_HANDLE_RESPONSE if in_state => {
                let mut attrs = attrs(tag, &[ATTR_SERVICE_NAME, ATTR_TARGET], &[ATTR_COND])?;
                let trigger = Trigger::RosServiceHandleResponse {
                    service: take(&mut attrs, ATTR_SERVICE_NAME),
                };
                Frame::Transition(TAG_ROS_SERVICE_HANDLE_RESPONSE, callback(attrs, trigger))
            }
            TAG_ASSIGN if in_executable => {
                let mut attrs = attrs(tag, &[ATTR_LOCATION, ATTR_EXPR], &[])?;
                Frame::Action(
                    TAG_ASSIGN,
                    Executable::Assign {
                        location: take(&mut attrs, ATTR_LOCATION),
                        expr: take(&mut attrs, ATTR_EXPR),
                    },
                )
            }
            TAG_SEND if in_executable => {
                let mut attrs = attrs(tag, &[ATTR_EVENT], &[])?;
                Frame::Action(
                    TAG_SEND,
                    Executable::Send {
                        event: take(&mut attrs, ATTR_EVENT),
                        params: Vec::new(),
                    },
                )
            }
            TAG_ROS_TOPIC_PUBLISH if in_executable => {
                let mut attrs = attrs(tag, &[ATTR_TOPIC], &[])?;
                Frame::Action(
                    TAG_ROS_TOPIC_PUBLISH,
                    Executable::RosTopicPublish {
                        topic: take(&mut attrs, ATTR_TOPIC),
                        fields: Vec::new(),
                    },
                )
            }
            TAG_ROS_SERVICE_SEND_REQUEST if in_executable => {
                let mut attrs = attrs(tag, &[ATTR_SERVICE_NAME], &[])?;
                Frame::Action(
                    TAG_ROS_SERVICE_SEND_REQUEST,
                    Executable::RosServiceSendRequest {
                        service: take(&mut attrs, ATTR_SERVICE_NAME),
                        fields: Vec::new(),
                    },
                )
            }
            TAG_ROS_SERVICE_SEND_RESPONSE if in_executable => {
                let mut attrs = attrs(tag, &[ATTR_SERVICE_NAME], &[])?;
                Frame::Action(
                    TAG_ROS_SERVICE_SEND_RESPONSE,
                    Executable::RosServiceSendResponse {
                        service: take(&mut attrs, ATTR_SERVICE_NAME),
                        fields: Vec::new(),
                    },
                )
            }
            TAG_PARAM if matches!(parent, Some(Frame::Action(TAG_SEND, _))) => {
                let mut attrs = attrs(tag, &[ATTR_NAME, ATTR_EXPR], &[])?;
                Frame::Param(
                    TAG_PARAM,
                    Param::new(take(&mut attrs, ATTR_NAME), take(&mut attrs, ATTR_EXPR)),
                )
            }
            TAG_FIELD
                if matches!(
                    parent,
                    Some(Frame::Action(
                        TAG_ROS_TOPIC_PUBLISH
                            | TAG_ROS_SERVICE_SEND_REQUEST
                            | TAG_ROS_SERVICE_SEND_RESPONSE,
                        _
                    ))
                ) =>
            {
                let mut attrs = attrs(tag, &[ATTR_NAME, ATTR_EXPR], &[])?;
                Frame::Param(
                    TAG_FIELD,
                    Param::new(take(&mut attrs, ATTR_NAME), take(&mut attrs, ATTR_EXPR)),
                )
            }
            TAG_IF if in_executable => {
                let mut attrs = attrs(tag, &[ATTR_COND], &[])?;
                Frame::If {
                    branches: vec![(take(&mut attrs, ATTR_COND), Vec::new())],
                    otherwise: None,
                }
            }
            TAG_ELSEIF if matches!(parent, Some(Frame::If { otherwise: None, .. })) => {
                let mut attrs = attrs(tag, &[ATTR_COND], &[])?;
                Frame::ElseIf(take(&mut attrs, ATTR_COND))
            }
            TAG_ELSE if matches!(parent, Some(Frame::If { otherwise: None, .. })) => {
                attrs(tag, &[], &[])?;
                Frame::Else
            }
            _ => {
                error!(target: "parser", "unknown or unexpected tag {tag_name}");
                bail!(ParserError::UnexpectedStartTag(tag_name.to_owned()));
            }
        };
        Ok(frame)
    }

    fn close(&mut self, frame: Frame) -> anyhow::Result<()> {
        let tag = frame.tag();
        match (frame, self.stack.last_mut()) {
            (Frame::Scxml | Frame::Datamodel, _) => {}
            (Frame::Data(data), _) => self.data_model.push(data),
            (Frame::Declaration(declaration), _) => self.declarations.push(declaration),
            (Frame::State(state), _) => self.states.push(state),
            (Frame::OnEntry(body), Some(Frame::State(state))) => state.on_entry.extend(body),
            (Frame::OnExit(body), Some(Frame::State(state))) => state.on_exit.extend(body),
            (Frame::Transition(_, transition), Some(Frame::State(state))) => {
                state.transitions.push(transition)
            }
            (Frame::Action(_, action), Some(parent)) => push_executable(parent, action, tag)?,
            (
                Frame::If {
                    branches,
                    otherwise,
                },
                Some(parent),
            ) => push_executable(
                parent,
                Executable::If {
                    branches,
                    otherwise: otherwise.unwrap_or_default(),
                },
                tag,
            )?,
            (Frame::ElseIf(cond), Some(Frame::If { branches, .. })) => {
                branches.push((cond, Vec::new()))
            }
            (Frame::Else, Some(Frame::If { otherwise, .. })) => *otherwise = Some(Vec::new()),
            (
                Frame::Param(_, param),
                Some(Frame::Action(
                    _,
                    Executable::Send { params: fields, .. }
                    | Executable::RosTopicPublish { fields, .. }
                    | Executable::RosServiceSendRequest { fields, .. }
                    | Executable::RosServiceSendResponse { fields, .. },
                )),
            ) => fields.push(param),
            _ => bail!(ParserError::UnexpectedEndTag(tag.to_owned())),
        }
        Ok(())
    }

    fn build(self) -> anyhow::Result<Statechart> {
        let name = self.name.ok_or(ParserError::MissingRoot)?;
        let builder = self
            .data_model
            .into_iter()
            .fold(StatechartBuilder::new(name.as_str()), StatechartBuilder::data);
        let builder = self
            .declarations
            .into_iter()
            .fold(builder, StatechartBuilder::ros_declaration)
            .states(self.states);
        let builder = match self.initial {
            Some(initial) => builder.initial(initial),
            None => builder,
        };
        let statechart = builder
            .build()
            .with_context(|| format!("invalid statechart `{name}`"))?;
        info!(target: "parser", "parsed statechart `{name}`");
        Ok(statechart)
    }
}

fn callback(mut attrs: HashMap<String, String>, trigger: Trigger) -> Transition {
    Transition {
        target: take(&mut attrs, ATTR_TARGET),
        trigger,
        guard: attrs.remove(ATTR_COND),
        body: Vec::new(),
    }
}

fn push_executable(parent: &mut Frame, executable: Executable, tag: &str) -> anyhow::Result<()> {
    match parent {
        Frame::OnEntry(body) | Frame::OnExit(body) | Frame::Transition(_, Transition { body, .. }) => {
            body.push(executable)
        }
        Frame::If {
            otherwise: Some(body),
            ..
        } => body.push(executable),
        Frame::If { branches, .. } => {
            let (_, body) = branches
                .last_mut()
                .ok_or_else(|| ParserError::UnexpectedStartTag(tag.to_owned()))?;
            body.push(executable)
        }
        _ => bail!(ParserError::UnexpectedEndTag(tag.to_owned())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<scxml name="client" initial="idle" version="1.0" xmlns="http://www.w3.org/2005/07/scxml">
    <datamodel>
        <data id="count" expr="0" type="int32"/>
    </datamodel>
    <ros_time_rate name="tick" rate_hz="2.5"/>
    <ros_service_client service_name="/set_bool" type="std_srvs/SetBool"/>
    <state id="idle">
        <ros_rate_callback name="tick" target="waiting" cond="count &lt; 10">
            <assign location="count" expr="count + 1"/>
            <ros_service_send_request service_name="/set_bool">
                <field name="data" expr="count % 2 == 0"/>
            </ros_service_send_request>
        </ros_rate_callback>
    </state>
    <state id="waiting">
        <ros_service_handle_response service_name="/set_bool" target="idle"/>
        <transition event="abort reset" target="idle">
            <if cond="count > 5">
                <send event="aborted"><param name="at" expr="count"/></send>
            <elseif cond="count > 2"/>
                <assign location="count" expr="0"/>
            <else/>
            </if>
        </transition>
    </state>
</scxml>
"#;

    #[test]
    fn ros_statechart() -> anyhow::Result<()> {
        let statechart = parse_str(CLIENT)?;
        assert_eq!(statechart.name(), "client");
        assert_eq!(statechart.initial_state(), "idle");
        assert_eq!(
            statechart.data_model(),
            &[Data::new("count").expr("0").typed("int32")]
        );
        assert_eq!(
            statechart.ros_declarations()[0],
            RosDeclaration::Timer {
                name: "tick".into(),
                rate_hz: 2.5
            }
        );
        let idle = &statechart.states()[0];
        assert_eq!(idle.transitions[0].guard.as_deref(), Some("count < 10"));
        assert_eq!(
            idle.transitions[0].body[1],
            Executable::RosServiceSendRequest {
                service: "/set_bool".into(),
                fields: vec![Param::new("data", "count % 2 == 0")],
            }
        );
        let abort = &statechart.states()[1].transitions[1];
        assert_eq!(
            abort.trigger,
            Trigger::Events(vec!["abort".into(), "reset".into()])
        );
        assert_eq!(
            abort.body,
            vec![Executable::If {
                branches: vec![
                    (
                        "count > 5".into(),
                        vec![Executable::Send {
                            event: "aborted".into(),
                            params: vec![Param::new("at", "count")],
                        }]
                    ),
                    (
                        "count > 2".into(),
                        vec![Executable::Assign {
                            location: "count".into(),
                            expr: "0".into(),
                        }]
                    ),
                ],
                otherwise: Vec::new(),
            }]
        );
        Ok(())
    }

    #[test]
    fn structure_errors() {
        let err = parse_str(r#"<scxml name="a"><state id="s"><param name="x" expr="1"/></state></scxml>"#)
            .unwrap_err();
        assert_eq!(
            err.root_cause().downcast_ref::<ParserError>(),
            Some(&ParserError::UnexpectedStartTag("param".into()))
        );
        let err = parse_str(r#"<scxml name="a"><state/></scxml>"#).unwrap_err();
        assert_eq!(
            err.root_cause().downcast_ref::<ParserError>(),
            Some(&ParserError::MissingAttr("id".into()))
        );
        let err = parse_str(r#"<scxml name="a"><state id="s" kind="x"/></scxml>"#).unwrap_err();
        assert_eq!(
            err.root_cause().downcast_ref::<ParserError>(),
            Some(&ParserError::UnknownAttrKey("kind".into()))
        );
        assert!(parse_str(r#"<scxml name="a"><state id="s">"#).is_err());
        let err = parse_str(r#"<scxml name="a"><ros_time_rate name="t" rate_hz="fast"/></scxml>"#)
            .unwrap_err();
        assert!(matches!(
            err.root_cause().downcast_ref::<ParserError>(),
            Some(ParserError::InvalidAttrValue { .. })
        ));
    }

    #[test]
    fn invalid_statechart() {
        let err = parse_str(r#"<scxml name="a"><state id="s"><transition target="t"/></state></scxml>"#)
            .unwrap_err();
        assert!(
            err.chain()
                .any(|cause| cause.downcast_ref::<rosfm_core::CompileError>().is_some())
        );
        for name in ["my client", "../../escape"] {
            let err = parse_str(&format!(r#"<scxml name="{name}"><state id="s"/></scxml>"#))
                .unwrap_err();
            assert!(err.chain().any(|cause| matches!(
                cause.downcast_ref::<rosfm_core::StructuralError>(),
                Some(rosfm_core::StructuralError::InvalidName(_))
            )));
        }
    }
}
