//! Phase-ordered interceptor pipeline
//!
//! A [`Pipeline`] keeps its phases in registration order together with the
//! relation each phase declared (`Before`, `After`, `Last` or none). The
//! execution order is a topological sort of those relations in which ties are
//! broken by registration order, so the same configuration always runs the
//! same way. Every mutation re-resolves the order and rebuilds the flattened
//! interceptor list, which keeps [`Pipeline::execute`] free of any sorting.

mod chain;
mod phase;

pub use chain::{Chain, Interceptor, Outcome};
pub use phase::{Phase, PhaseContent, PhaseRelation};

use crate::{Error, LogRecord, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// An ordered set of phases and the interceptors registered into them.
#[derive(Clone, Default)]
pub struct Pipeline {
    /// Phases in registration order
    phases: Vec<PhaseContent>,
    /// Indices into `phases` in execution order
    order: Vec<usize>,
    /// All interceptors in execution order
    flattened: Vec<Arc<dyn Interceptor>>,
}

impl Pipeline {
    /// Filtering that decides whether a record is processed at all.
    pub const SETUP: Phase = Phase::new("Setup");
    /// Content conversion (structured values to text, pretty printing).
    pub const TRANSFORM: Phase = Phase::new("Transform");
    /// Hand-off to loggers.
    pub const OUTPUT: Phase = Phase::new("Output");
    /// Hand-off to stores. Always runs last.
    pub const STORAGE: Phase = Phase::new("Storage");

    /// Creates a pipeline without phases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the logging pipeline: `Setup`, `Transform`, `Output`, then
    /// `Storage` as the last phase.
    #[must_use]
    pub fn logging() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_phase(Self::SETUP);
        pipeline.add_phase(Self::TRANSFORM);
        pipeline.add_phase(Self::OUTPUT);
        pipeline.add_phase_last(Self::STORAGE);
        pipeline
    }

    /// Registers an unconstrained phase. Adding a known phase does nothing.
    pub fn add_phase(&mut self, phase: Phase) {
        self.push_phase(phase, PhaseRelation::Unordered);
    }

    /// Registers a phase that runs after every non-`Last` phase.
    pub fn add_phase_last(&mut self, phase: Phase) {
        self.push_phase(phase, PhaseRelation::Last);
    }

    fn push_phase(&mut self, phase: Phase, relation: PhaseRelation) {
        if self.index_of(&phase).is_some() {
            return;
        }
        tracing::trace!(phase = %phase, "adding pipeline phase");
        self.phases.push(PhaseContent::new(phase, relation));
        // A phase nothing refers to cannot close a cycle.
        let _ = self.refresh();
    }

    /// Declares how `phase` is ordered, registering it if it is new.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPhase`] if the relation references a phase that
    /// was never added, and [`Error::CyclicPhases`] if the relation makes a
    /// total order impossible. On error the pipeline is left unchanged.
    pub fn insert_phase_relation(&mut self, phase: Phase, relation: PhaseRelation) -> Result<()> {
        if let Some(reference) = relation.reference() {
            if self.index_of(reference).is_none() {
                return Err(Error::UnknownPhase(reference.name().to_string()));
            }
        }

        let previous = match self.index_of(&phase) {
            Some(index) => Some((index, self.phases[index].set_relation(relation))),
            None => {
                self.phases.push(PhaseContent::new(phase, relation));
                None
            }
        };

        if let Err(e) = self.refresh() {
            match previous {
                Some((index, relation)) => {
                    self.phases[index].set_relation(relation);
                }
                None => {
                    self.phases.pop();
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Registers `phase` so that it runs after `reference`.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::insert_phase_relation`].
    pub fn insert_phase_after(&mut self, reference: &Phase, phase: Phase) -> Result<()> {
        self.insert_phase_relation(phase, PhaseRelation::After(reference.clone()))
    }

    /// Registers `phase` so that it runs before `reference`.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::insert_phase_relation`].
    pub fn insert_phase_before(&mut self, reference: &Phase, phase: Phase) -> Result<()> {
        self.insert_phase_relation(phase, PhaseRelation::Before(reference.clone()))
    }

    /// Whether `phase` has been added.
    #[must_use]
    pub fn has_phase(&self, phase: &Phase) -> bool {
        self.index_of(phase).is_some()
    }

    /// Appends an interceptor to `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPhase`] if the phase was never added.
    pub fn add_interceptor(&mut self, phase: &Phase, interceptor: impl Interceptor) -> Result<()> {
        self.add_owned_interceptor(phase, None, Arc::new(interceptor))
    }

    /// Appends a closure interceptor to `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPhase`] if the phase was never added.
    pub fn intercept<F>(&mut self, phase: &Phase, f: F) -> Result<()>
    where
        F: Fn(Chain<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.add_interceptor(phase, f)
    }

    pub(crate) fn add_owned_interceptor(
        &mut self,
        phase: &Phase,
        owner: Option<&'static str>,
        interceptor: Arc<dyn Interceptor>,
    ) -> Result<()> {
        let index = self
            .index_of(phase)
            .ok_or_else(|| Error::UnknownPhase(phase.name().to_string()))?;
        self.phases[index].add_interceptor(owner, interceptor);
        self.rebuild_interceptors();
        Ok(())
    }

    /// Removes every interceptor registered by `owner`.
    pub(crate) fn remove_owned_by(&mut self, owner: &str) -> usize {
        let removed = self
            .phases
            .iter_mut()
            .map(|content| content.remove_owned_by(owner))
            .sum();
        if removed > 0 {
            self.rebuild_interceptors();
        }
        removed
    }

    /// Phases in execution order.
    #[must_use]
    pub fn phases(&self) -> Vec<&Phase> {
        self.order
            .iter()
            .map(|&index| self.phases[index].phase())
            .collect()
    }

    /// Phase contents in execution order.
    pub fn contents(&self) -> impl Iterator<Item = &PhaseContent> {
        self.order.iter().map(|&index| &self.phases[index])
    }

    /// Total number of interceptors.
    #[must_use]
    pub fn interceptor_count(&self) -> usize {
        self.flattened.len()
    }

    /// Whether no interceptor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flattened.is_empty()
    }

    /// Runs `subject` through every interceptor in order.
    ///
    /// Returns `Ok(None)` when an interceptor halted the chain.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by an interceptor; the rest of the
    /// chain does not run.
    pub fn execute(&self, subject: LogRecord) -> Outcome {
        Chain::new(subject, &self.flattened).proceed()
    }

    fn index_of(&self, phase: &Phase) -> Option<usize> {
        self.phases
            .iter()
            .position(|content| content.phase() == phase)
    }

    fn refresh(&mut self) -> Result<()> {
        self.order = self.resolve_order()?;
        self.rebuild_interceptors();
        Ok(())
    }

    fn rebuild_interceptors(&mut self) {
        let mut flattened = Vec::with_capacity(self.phases.iter().map(PhaseContent::len).sum());
        for &index in &self.order {
            self.phases[index].add_to(&mut flattened);
        }
        self.flattened = flattened;
    }

    /// Kahn's algorithm. Among ready phases the one placed earliest wins: by
    /// registration index, with a related phase sitting right before or
    /// after the phase it references.
    fn resolve_order(&self) -> Result<Vec<usize>> {
        let count = self.phases.len();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];
        let mut add_edge = |from: usize, to: usize| {
            successors[from].push(to);
            in_degree[to] += 1;
        };

        for (index, content) in self.phases.iter().enumerate() {
            match content.relation() {
                PhaseRelation::Unordered => {}
                PhaseRelation::After(reference) => {
                    let reference = self
                        .index_of(reference)
                        .ok_or_else(|| Error::UnknownPhase(reference.name().to_string()))?;
                    add_edge(reference, index);
                }
                PhaseRelation::Before(reference) => {
                    let reference = self
                        .index_of(reference)
                        .ok_or_else(|| Error::UnknownPhase(reference.name().to_string()))?;
                    add_edge(index, reference);
                }
                PhaseRelation::Last => {
                    for (other, other_content) in self.phases.iter().enumerate() {
                        if *other_content.relation() != PhaseRelation::Last {
                            add_edge(other, index);
                        }
                    }
                }
            }
        }

        let keys: Vec<Vec<isize>> = (0..count).map(|i| self.placement_key(i, 0)).collect();
        let mut ready: BTreeSet<(&[isize], usize)> = (0..count)
            .filter(|&i| in_degree[i] == 0)
            .map(|i| (keys[i].as_slice(), i))
            .collect();
        let mut order = Vec::with_capacity(count);
        while let Some((_, index)) = ready.pop_first() {
            order.push(index);
            for &next in &successors[index] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.insert((keys[next].as_slice(), next));
                }
            }
        }

        if order.len() < count {
            let stuck = (0..count)
                .filter(|index| !order.contains(index))
                .map(|index| self.phases[index].phase().name().to_string())
                .collect();
            return Err(Error::CyclicPhases(stuck));
        }
        Ok(order)
    }

    /// Lexicographic placement of a phase. A phase related to a reference
    /// extends the reference's key, so it sorts next to it.
    fn placement_key(&self, index: usize, depth: usize) -> Vec<isize> {
        let anchor = match self.phases[index].relation() {
            PhaseRelation::After(reference) => Some((reference, 1)),
            PhaseRelation::Before(reference) => Some((reference, -1)),
            PhaseRelation::Unordered | PhaseRelation::Last => None,
        };
        // Depth bounds the walk when relations form a cycle.
        let anchor = anchor
            .filter(|_| depth < self.phases.len())
            .and_then(|(reference, side)| Some((self.index_of(reference)?, side)));

        let mut key = match anchor {
            Some((reference, side)) => {
                let mut key = self.placement_key(reference, depth + 1);
                key.pop();
                key.push(side);
                key
            }
            None => Vec::new(),
        };
        key.push(index as isize);
        key.push(0);
        key
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.contents()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use parking_lot::Mutex;

    const A: Phase = Phase::new("A");
    const B: Phase = Phase::new("B");
    const C: Phase = Phase::new("C");

    fn record() -> LogRecord {
        LogRecord::new(Level::Info, "test", "content")
    }

    fn recorder(pipeline: &mut Pipeline, phase: &Phase, seen: &Arc<Mutex<Vec<String>>>) {
        let seen = seen.clone();
        let name = phase.name().to_string();
        pipeline
            .intercept(phase, move |chain| {
                seen.lock().push(name.clone());
                chain.proceed()
            })
            .unwrap();
    }

    #[test]
    fn test_relations_order_every_registration_order() {
        let registrations: [[u8; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        for registration in registrations {
            let mut pipeline = Pipeline::new();
            for phase in registration {
                match phase {
                    0 => pipeline.add_phase(A),
                    1 => pipeline.add_phase(B),
                    _ => pipeline.add_phase_last(C),
                }
            }
            pipeline.insert_phase_after(&A, B).unwrap();

            let seen = Arc::new(Mutex::new(Vec::new()));
            for phase in [&A, &B, &C] {
                recorder(&mut pipeline, phase, &seen);
            }

            let delivered = pipeline.execute(record()).unwrap();
            assert!(delivered.is_some());
            assert_eq!(*seen.lock(), vec!["A", "B", "C"], "{registration:?}");
        }
    }

    #[test]
    fn test_last_phase_runs_after_later_registrations() {
        let mut pipeline = Pipeline::new();
        pipeline.add_phase_last(C);
        pipeline.add_phase(A);
        pipeline.add_phase(B);

        assert_eq!(pipeline.phases(), vec![&A, &B, &C]);
    }

    #[test]
    fn test_before_relation() {
        let mut pipeline = Pipeline::new();
        pipeline.add_phase(A);
        pipeline.add_phase(B);
        pipeline.insert_phase_before(&A, C).unwrap();

        assert_eq!(pipeline.phases(), vec![&C, &A, &B]);
    }

    #[test]
    fn test_related_phase_sits_next_to_reference() {
        let d = Phase::new("D");
        let mut pipeline = Pipeline::new();
        pipeline.add_phase(A);
        pipeline.add_phase(B);
        pipeline.add_phase(C);
        pipeline.insert_phase_after(&A, d.clone()).unwrap();

        assert_eq!(pipeline.phases(), vec![&A, &d, &B, &C]);

        let e = Phase::new("E");
        pipeline.insert_phase_before(&C, e.clone()).unwrap();
        assert_eq!(pipeline.phases(), vec![&A, &d, &B, &e, &C]);
    }

    #[test]
    fn test_unknown_phase_is_rejected() {
        let mut pipeline = Pipeline::new();
        assert!(matches!(
            pipeline.insert_phase_after(&A, B),
            Err(Error::UnknownPhase(name)) if name == "A"
        ));
        assert!(!pipeline.has_phase(&B));
        assert!(matches!(
            pipeline.intercept(&A, |chain| chain.proceed()),
            Err(Error::UnknownPhase(_))
        ));
    }

    #[test]
    fn test_cycle_is_rejected_and_rolled_back() {
        let mut pipeline = Pipeline::new();
        pipeline.add_phase(A);
        pipeline.insert_phase_after(&A, B).unwrap();

        let result = pipeline.insert_phase_relation(A.clone(), PhaseRelation::After(B.clone()));
        assert!(matches!(result, Err(Error::CyclicPhases(_))));
        assert_eq!(pipeline.phases(), vec![&A, &B]);
        assert_eq!(
            pipeline.contents().next().unwrap().relation(),
            &PhaseRelation::Unordered
        );
    }

    #[test]
    fn test_short_circuit_stops_peers_and_later_phases() {
        let mut pipeline = Pipeline::new();
        pipeline.add_phase(A);
        pipeline.add_phase(B);

        let seen = Arc::new(Mutex::new(Vec::new()));
        pipeline.intercept(&A, |chain| chain.finish()).unwrap();
        recorder(&mut pipeline, &A, &seen);
        recorder(&mut pipeline, &B, &seen);

        assert!(pipeline.execute(record()).unwrap().is_none());
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_proceed_with_substitutes_subject() {
        let mut pipeline = Pipeline::new();
        pipeline.add_phase(A);
        pipeline
            .intercept(&A, |chain| {
                let replacement = LogRecord::new(Level::Error, "other", "replaced");
                chain.proceed_with(replacement)
            })
            .unwrap();
        pipeline
            .intercept(&A, |mut chain| {
                let text = format!("{}!", chain.subject().content_text());
                chain.subject_mut().set_text_content(text);
                chain.proceed()
            })
            .unwrap();

        let delivered = pipeline.execute(record()).unwrap().unwrap();
        assert_eq!(delivered.tag, "other");
        assert_eq!(delivered.level, Level::Error);
        assert_eq!(delivered.content_text(), "replaced!");
    }

    #[test]
    fn test_interceptor_error_propagates() {
        let mut pipeline = Pipeline::new();
        pipeline.add_phase(A);
        pipeline
            .intercept(&A, |_chain| Err(Error::interceptor("boom")))
            .unwrap();

        let error = pipeline.execute(record()).unwrap_err();
        assert!(matches!(error, Error::Interceptor(_)));
    }

    #[test]
    fn test_remove_owned_by() {
        let mut pipeline = Pipeline::logging();
        pipeline
            .add_owned_interceptor(
                &Pipeline::OUTPUT,
                Some("Owner"),
                Arc::new(|chain: Chain<'_>| chain.proceed()),
            )
            .unwrap();
        pipeline
            .add_interceptor(&Pipeline::OUTPUT, |chain: Chain<'_>| chain.proceed())
            .unwrap();
        assert_eq!(pipeline.interceptor_count(), 2);

        assert_eq!(pipeline.remove_owned_by("Owner"), 1);
        assert_eq!(pipeline.interceptor_count(), 1);
    }

    #[test]
    fn test_logging_phases() {
        let pipeline = Pipeline::logging();
        assert_eq!(
            pipeline.phases(),
            vec![
                &Pipeline::SETUP,
                &Pipeline::TRANSFORM,
                &Pipeline::OUTPUT,
                &Pipeline::STORAGE
            ]
        );
        assert!(pipeline.execute(record()).unwrap().is_some());
    }
}
