//! Transitive closure of classes reachable from a root set.
//!
//! Two kinds of edges are followed. Hierarchy edges (superclass and
//! interfaces) are pushed to the front of the work queue so a class's
//! ancestors always land right behind it; reference edges (types named by
//! the constant pool) are pushed to the back and handled afterwards.
//!
//! Classes missing from the classpath are assumed to come from the platform
//! and are dropped without error, except for roots: a missing root fails the
//! whole pass. A class file that is present but corrupt or unreadable always
//! fails the pass.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;
use tracing::{debug, info};

use crate::classpath::ClassPath;
use crate::error::{Error, Result};
use crate::name::UnitName;
use crate::references::extract_references;
use crate::unit::BinaryUnit;

/// Ordered result of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Closure {
    units: Vec<UnitName>,
}

impl Closure {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, name: &UnitName) -> bool {
        self.units.contains(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnitName> {
        self.units.iter()
    }

    pub fn as_slice(&self) -> &[UnitName] {
        &self.units
    }
}

impl IntoIterator for Closure {
    type Item = UnitName;
    type IntoIter = std::vec::IntoIter<UnitName>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}

impl<'a> IntoIterator for &'a Closure {
    type Item = &'a UnitName;
    type IntoIter = std::slice::Iter<'a, UnitName>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Resolves the closure of `roots` and closes `classpath`, whatever the outcome.
pub fn resolve_closure<I>(roots: I, mut classpath: ClassPath) -> Result<Closure>
where
    I: IntoIterator<Item = UnitName>,
{
    let result = ClosureResolver::new(&mut classpath).resolve(roots);
    classpath.close();
    result
}

pub struct ClosureResolver<'cp> {
    classpath: &'cp mut ClassPath,
}

impl<'cp> ClosureResolver<'cp> {
    pub fn new(classpath: &'cp mut ClassPath) -> Self {
        Self { classpath }
    }

    pub fn resolve<I>(&mut self, roots: I) -> Result<Closure>
    where
        I: IntoIterator<Item = UnitName>,
    {
        let start = Instant::now();
        let mut state = ClosureState::default();
        let mut root_set = HashSet::new();
        for root in roots {
            if root_set.insert(root.clone()) {
                state.push_back(root);
            }
        }

        while let Some(name) = state.pop_front() {
            if state.is_resolved(&name) {
                continue;
            }

            let Some(unit) = self.load(&name, &mut state)? else {
                if root_set.contains(&name) {
                    return Err(Error::MissingRoot(name));
                }
                debug!(unit = %name, "not on the classpath, assuming a library class");
                continue;
            };

            state.mark_resolved(name);
            self.walk_hierarchy(&unit, &mut state, &mut HashSet::new())?;
            for reference in extract_references(&unit)? {
                state.push_back(reference);
            }
        }

        info!(
            roots = root_set.len(),
            classes = state.resolved.len(),
            missing = state.missing.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "resolved main dex closure"
        );
        Ok(Closure {
            units: state.resolved,
        })
    }

    /// Moves every loadable ancestor of `unit` to the front of the queue,
    /// deepest ancestors first.
    fn walk_hierarchy(
        &mut self,
        unit: &BinaryUnit,
        state: &mut ClosureState,
        visited: &mut HashSet<UnitName>,
    ) -> Result<()> {
        for ancestor in unit.ancestors() {
            if state.is_resolved(ancestor) || !visited.insert(ancestor.clone()) {
                continue;
            }

            let Some(ancestor_unit) = self.load(ancestor, state)? else {
                debug!(unit = %ancestor, child = %unit.name(), "ancestor not on the classpath");
                continue;
            };

            state.push_front(ancestor.clone());
            self.walk_hierarchy(&ancestor_unit, state, visited)?;
            state.loaded.insert(ancestor.clone(), ancestor_unit);
        }
        Ok(())
    }

    /// Takes `name` from the units already decoded in this pass, or loads it.
    /// `None` means the classpath does not have it; the miss is remembered so
    /// the classpath is searched for each name at most once per pass.
    fn load(&mut self, name: &UnitName, state: &mut ClosureState) -> Result<Option<BinaryUnit>> {
        if let Some(unit) = state.loaded.remove(name) {
            return Ok(Some(unit));
        }
        if state.missing.contains(name) {
            return Ok(None);
        }

        match self.classpath.get_unit(name) {
            Ok(unit) => Ok(Some(unit)),
            Err(Error::UnitNotFound(_)) => {
                state.missing.insert(name.clone());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Work queue plus result set. `queued` mirrors `pending` exactly, so a name
/// is never pending twice.
#[derive(Default)]
struct ClosureState {
    resolved: Vec<UnitName>,
    resolved_set: HashSet<UnitName>,
    pending: VecDeque<UnitName>,
    queued: HashSet<UnitName>,
    loaded: HashMap<UnitName, BinaryUnit>,
    missing: HashSet<UnitName>,
}

impl ClosureState {
    fn is_resolved(&self, name: &UnitName) -> bool {
        self.resolved_set.contains(name)
    }

    fn mark_resolved(&mut self, name: UnitName) {
        if self.resolved_set.insert(name.clone()) {
            self.resolved.push(name);
        }
    }

    fn pop_front(&mut self) -> Option<UnitName> {
        let name = self.pending.pop_front()?;
        self.queued.remove(&name);
        Some(name)
    }

    fn push_front(&mut self, name: UnitName) {
        if self.queued.contains(&name) {
            if let Some(pos) = self.pending.iter().position(|pending| *pending == name) {
                self.pending.remove(pos);
            }
        } else {
            self.queued.insert(name.clone());
        }
        self.pending.push_front(name);
    }

    fn push_back(&mut self, name: UnitName) {
        if self.is_resolved(&name) || self.queued.contains(&name) {
            return;
        }
        self.queued.insert(name.clone());
        self.pending.push_back(name);
    }
}
