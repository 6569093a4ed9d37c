use crate::parser::ConfigError;

/// A named set of options, declared via
/// [`CommandLineParser::group`](./struct.CommandLineParser.html#method.group).
///
/// An *exclusive* group allows at most one of its options to be used.
/// A *required* group demands at least one of its options to be given a value.
///
/// ### Example
/// ```
/// # use argot_builder as argot;
/// use argot::Group;
///
/// let group = Group::new("mode")
///     .title("Modes")
///     .description("How to run.")
///     .exclusive()
///     .required();
/// assert!(group.is_exclusive());
/// assert!(group.is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    title: Option<String>,
    description: Option<String>,
    exclusive: bool,
    required: bool,
}

impl Group {
    /// Create a (non-exclusive, optional) group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            exclusive: false,
            required: false,
        }
    }

    /// The heading of the group in help.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The description of the group in help.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Allow at most one option of the group to be used.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Demand at least one option of the group to be given a value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The heading in help, defaulting to the name.
    pub fn heading(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// The description in help.
    pub fn about(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether at most one option of the group may be used.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Whether at least one option of the group must be given a value.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Merge a re-declaration of this group.
    pub(crate) fn merge(&mut self, other: Group) -> Result<(), ConfigError> {
        if self.exclusive != other.exclusive {
            return Err(ConfigError(format!(
                "group '{}' is declared both exclusive and non-exclusive.",
                self.name
            )));
        }

        self.required |= other.required;

        if other.title.is_some() {
            self.title = other.title;
        }

        if other.description.is_some() {
            self.description = other.description;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let group = Group::new("g");
        assert_eq!(group.name(), "g");
        assert_eq!(group.heading(), "g");
        assert_eq!(group.about(), None);
        assert!(!group.is_exclusive());
        assert!(!group.is_required());
    }

    #[test]
    fn merge() {
        let mut group = Group::new("g").title("G");
        group
            .merge(Group::new("g").required().description("about"))
            .unwrap();
        assert_eq!(group.heading(), "G");
        assert_eq!(group.about(), Some("about"));
        assert!(group.is_required());

        // Required accumulates; it is never withdrawn.
        group.merge(Group::new("g")).unwrap();
        assert!(group.is_required());
    }

    #[test]
    fn merge_exclusive_mismatch() {
        let mut group = Group::new("g").exclusive();
        assert_matches!(group.merge(Group::new("g")), Err(ConfigError(_)));
    }
}
