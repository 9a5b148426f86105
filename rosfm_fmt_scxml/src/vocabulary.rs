// Plain SCXML
pub(crate) const TAG_SCXML: &str = "scxml";
pub(crate) const TAG_DATAMODEL: &str = "datamodel";
pub(crate) const TAG_DATA: &str = "data";
pub(crate) const TAG_STATE: &str = "state";
pub(crate) const TAG_ONENTRY: &str = "onentry";
pub(crate) const TAG_ONEXIT: &str = "onexit";
pub(crate) const TAG_TRANSITION: &str = "transition";
pub(crate) const TAG_SEND: &str = "send";
pub(crate) const TAG_PARAM: &str = "param";
pub(crate) const TAG_ASSIGN: &str = "assign";
pub(crate) const TAG_IF: &str = "if";
pub(crate) const TAG_ELSEIF: &str = "elseif";
pub(crate) const TAG_ELSE: &str = "else";

// ROS declarations
pub(crate) const TAG_ROS_TIME_RATE: &str = "ros_time_rate";
pub(crate) const TAG_ROS_TOPIC_PUBLISHER: &str = "ros_topic_publisher";
pub(crate) const TAG_ROS_TOPIC_SUBSCRIBER: &str = "ros_topic_subscriber";
pub(crate) const TAG_ROS_SERVICE_SERVER: &str = "ros_service_server";
pub(crate) const TAG_ROS_SERVICE_CLIENT: &str = "ros_service_client";

// ROS callbacks
pub(crate) const TAG_ROS_RATE_CALLBACK: &str = "ros_rate_callback";
pub(crate) const TAG_ROS_TOPIC_CALLBACK: &str = "ros_topic_callback";
pub(crate) const TAG_ROS_SERVICE_HANDLE_REQUEST: &str = "ros_service_handle_request";
pub(crate) const TAG_ROS_SERVICE_HANDLE_RESPONSE: &str = "ros_service_handle_response";

// ROS actions
pub(crate) const TAG_ROS_TOPIC_PUBLISH: &str = "ros_topic_publish";
pub(crate) const TAG_ROS_SERVICE_SEND_REQUEST: &str = "ros_service_send_request";
pub(crate) const TAG_ROS_SERVICE_SEND_RESPONSE: &str = "ros_service_send_response";
pub(crate) const TAG_FIELD: &str = "field";

pub(crate) const ATTR_NAME: &str = "name";
pub(crate) const ATTR_INITIAL: &str = "initial";
pub(crate) const ATTR_VERSION: &str = "version";
pub(crate) const ATTR_MODEL_SRC: &str = "model_src";
pub(crate) const ATTR_XMLNS: &str = "xmlns";
pub(crate) const ATTR_DATAMODEL: &str = "datamodel";
pub(crate) const ATTR_ID: &str = "id";
pub(crate) const ATTR_EXPR: &str = "expr";
pub(crate) const ATTR_TYPE: &str = "type";
pub(crate) const ATTR_TARGET: &str = "target";
pub(crate) const ATTR_EVENT: &str = "event";
pub(crate) const ATTR_COND: &str = "cond";
pub(crate) const ATTR_LOCATION: &str = "location";
pub(crate) const ATTR_RATE_HZ: &str = "rate_hz";
pub(crate) const ATTR_TOPIC: &str = "topic";
pub(crate) const ATTR_SERVICE_NAME: &str = "service_name";

pub(crate) const SCXML_VERSION: &str = "1.0";
pub(crate) const SCXML_NAMESPACE: &str = "http://www.w3.org/2005/07/scxml";
pub(crate) const DATAMODEL_ECMASCRIPT: &str = "ecmascript";
