use super::*;
use log::trace;

/// Defines and builds a [`Statechart`].
///
/// States are kept in insertion order.
/// Unless set through [`StatechartBuilder::initial`],
/// the initial state is the first state added.
#[derive(Debug, Clone, Default)]
pub struct StatechartBuilder {
    name: String,
    initial_state: Option<String>,
    data_model: Vec<Data>,
    ros_declarations: Vec<RosDeclaration>,
    states: Vec<State>,
}

impl StatechartBuilder {
    /// Creates a new builder for a statechart with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the initial state.
    pub fn initial(mut self, id: impl Into<String>) -> Self {
        self.initial_state = Some(id.into());
        self
    }

    /// Appends a variable to the data model.
    pub fn data(mut self, data: Data) -> Self {
        self.data_model.push(data);
        self
    }

    /// Appends a ROS declaration.
    pub fn ros_declaration(mut self, declaration: RosDeclaration) -> Self {
        self.ros_declarations.push(declaration);
        self
    }

    /// Appends a state.
    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Appends a sequence of states.
    pub fn states(mut self, states: impl IntoIterator<Item = State>) -> Self {
        self.states.extend(states);
        self
    }

    /// Builds the statechart, checking its structural validity.
    pub fn build(self) -> Result<Statechart, CompileError> {
        let initial_state = self
            .initial_state
            .or_else(|| self.states.first().map(|state| state.id.clone()))
            .unwrap_or_default();
        let statechart = Statechart {
            name: self.name,
            initial_state,
            data_model: self.data_model,
            ros_declarations: self.ros_declarations,
            states: self.states,
        };
        statechart
            .validate()
            .map_err(|source| CompileError::Structural {
                automaton: statechart.name.clone(),
                source,
            })?;
        trace!(
            "built statechart `{}` with {} states",
            statechart.name,
            statechart.states.len()
        );
        Ok(statechart)
    }
}
