use std::{collections::BTreeMap, fmt};

///
/// ErrorTree
/// Route-aware error aggregation; routes are declaration paths.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    pub messages: Vec<String>,
    pub children: BTreeMap<String, Self>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Add a message; an identical message on the same route is kept once.
    pub fn add(&mut self, message: impl ToString) {
        let message = message.to_string();
        if !self.messages.contains(&message) {
            self.messages.push(message);
        }
    }

    /// Add a message under a child route.
    pub fn add_for(&mut self, route: impl Into<String>, message: impl ToString) {
        self.children.entry(route.into()).or_default().add(message);
    }

    pub fn merge(&mut self, other: Self) {
        for message in other.messages {
            self.add(message);
        }
        for (route, child) in other.children {
            self.children.entry(route).or_default().merge(child);
        }
    }

    pub fn merge_for(&mut self, route: impl Into<String>, other: Self) {
        if !other.is_empty() {
            self.children.entry(route.into()).or_default().merge(other);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Total number of messages in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Top-level routes that carry at least one message.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.children
            .iter()
            .filter(|(_, child)| !child.is_empty())
            .map(|(route, _)| route.as_str())
    }

    /// Flatten into `(route, message)` pairs; nested routes are joined with ` > `.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for message in &self.messages {
            out.push((prefix.to_string(), message.clone()));
        }
        for (route, child) in &self.children {
            let route = if prefix.is_empty() {
                route.clone()
            } else {
                format!("{prefix} > {route}")
            };
            child.flatten_into(&route, out);
        }
    }

    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (route, message)) in self.flatten().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if route.is_empty() {
                write!(f, "{message}")?;
            } else {
                write!(f, "{route}: {message}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

impl From<String> for ErrorTree {
    fn from(message: String) -> Self {
        let mut tree = Self::new();
        tree.add(message);

        tree
    }
}

/// Push a formatted message onto an `ErrorTree`.
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {{
        $errs.add(format!($($arg)*));
    }};
}

///
/// Warning
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Warning {
    pub route: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.route, self.message)
    }
}

///
/// Reporter
/// Diagnostics accumulated over one generation pass.
///

#[derive(Clone, Debug, Default)]
pub struct Reporter {
    errors: ErrorTree,
    warnings: Vec<Warning>,
}

impl Reporter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: ErrorTree::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, route: impl Into<String>, message: impl ToString) {
        let route = route.into();
        let message = message.to_string();
        tracing::error!(route = %route, "{message}");

        self.errors.add_for(route, message);
    }

    /// Attach a whole tree of errors to the pass; the tree is already routed.
    pub fn errors(&mut self, errors: ErrorTree) {
        for (route, message) in errors.flatten() {
            tracing::error!(route = %route, "{message}");
        }

        self.errors.merge(errors);
    }

    pub fn warn(&mut self, route: impl Into<String>, message: impl ToString) {
        let warning = Warning {
            route: route.into(),
            message: message.to_string(),
        };
        tracing::warn!(route = %warning.route, "{}", warning.message);

        self.warnings.push(warning);
    }

    #[must_use]
    pub const fn error_tree(&self) -> &ErrorTree {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fail with every error reported so far.
    pub fn result(&self) -> Result<(), ErrorTree> {
        self.errors.clone().result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_is_ok() {
        assert!(ErrorTree::new().result().is_ok());

        let mut tree = ErrorTree::new();
        tree.merge_for("crate::model::Animal", ErrorTree::new());
        assert!(tree.is_empty(), "empty children must not count as errors");
    }

    #[test]
    fn flatten_joins_nested_routes() {
        let mut inner = ErrorTree::new();
        err!(inner, "accessor `{}` must take `&self`", "name");

        let mut tree = ErrorTree::new();
        tree.add("top level");
        tree.merge_for("crate::model::Animal", inner);

        assert_eq!(tree.len(), 2);
        assert_eq!(
            tree.flatten(),
            vec![
                (String::new(), "top level".to_string()),
                (
                    "crate::model::Animal".to_string(),
                    "accessor `name` must take `&self`".to_string()
                ),
            ]
        );
        assert_eq!(tree.routes().collect::<Vec<_>>(), vec!["crate::model::Animal"]);
    }

    #[test]
    fn reporter_keeps_warnings_apart_from_errors() {
        let mut reporter = Reporter::new();
        reporter.warn("crate::model::Animal::getName", "not snake_case");
        assert!(!reporter.has_errors());
        assert_eq!(reporter.warnings().len(), 1);

        reporter.error("crate::model::Animal", "broken");
        assert!(reporter.result().is_err());
    }
}
