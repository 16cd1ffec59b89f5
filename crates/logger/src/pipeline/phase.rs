//! Pipeline phases and their interceptor lists

use super::Interceptor;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A named, orderable stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phase {
    name: Cow<'static, str>,
}

impl Phase {
    /// Creates a phase with a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
        }
    }

    /// Creates a phase with a runtime name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
        }
    }

    /// The phase name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// How a phase is ordered relative to the others.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseRelation {
    /// No constraint; registration order applies.
    #[default]
    Unordered,
    /// Runs before the given phase.
    Before(Phase),
    /// Runs after the given phase.
    After(Phase),
    /// Runs after every phase that is not `Last`.
    Last,
}

impl PhaseRelation {
    /// The phase this relation points at, if any.
    #[must_use]
    pub const fn reference(&self) -> Option<&Phase> {
        match self {
            Self::Before(phase) | Self::After(phase) => Some(phase),
            Self::Unordered | Self::Last => None,
        }
    }
}

#[derive(Clone)]
pub(crate) struct Registered {
    pub(crate) owner: Option<&'static str>,
    pub(crate) interceptor: Arc<dyn Interceptor>,
}

/// The interceptors registered for one phase, in registration order.
#[derive(Clone)]
pub struct PhaseContent {
    phase: Phase,
    relation: PhaseRelation,
    interceptors: Vec<Registered>,
}

impl PhaseContent {
    pub(crate) const fn new(phase: Phase, relation: PhaseRelation) -> Self {
        Self {
            phase,
            relation,
            interceptors: Vec::new(),
        }
    }

    /// The phase.
    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The phase's relation to other phases.
    #[must_use]
    pub const fn relation(&self) -> &PhaseRelation {
        &self.relation
    }

    pub(crate) fn set_relation(&mut self, relation: PhaseRelation) -> PhaseRelation {
        std::mem::replace(&mut self.relation, relation)
    }

    /// Whether no interceptor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Number of registered interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub(crate) fn add_interceptor(
        &mut self,
        owner: Option<&'static str>,
        interceptor: Arc<dyn Interceptor>,
    ) {
        self.interceptors.push(Registered { owner, interceptor });
    }

    /// Removes the interceptors registered by `owner`, returning how many.
    pub(crate) fn remove_owned_by(&mut self, owner: &str) -> usize {
        let before = self.interceptors.len();
        self.interceptors
            .retain(|registered| registered.owner != Some(owner));
        before - self.interceptors.len()
    }

    pub(crate) fn add_to(&self, destination: &mut Vec<Arc<dyn Interceptor>>) {
        destination.extend(
            self.interceptors
                .iter()
                .map(|registered| registered.interceptor.clone()),
        );
    }
}

impl fmt::Debug for PhaseContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseContent")
            .field("phase", &self.phase)
            .field("relation", &self.relation)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl fmt::Display for PhaseContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase `{}`, {} handlers", self.phase, self.len())
    }
}
