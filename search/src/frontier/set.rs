//! The owned set of frontier instances of one run.
//!
//! The global frontier always exists. A local frontier is created on demand
//! by the tactics that restrict expansion to a neighbourhood, and is merged
//! back before it is dropped. Which one receives new entries is an explicit
//! [`ActiveFrontier`] tag.

use std::collections::HashSet;

use pathwise_kernel::StateHandle;

use super::{build_frontier, Frontier, FrontierEntry};
use crate::config::FrontierKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFrontier {
    Global,
    Local,
}

/// Shape shared by every frontier the set builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierShape {
    pub kind: FrontierKind,
    pub priority_evaluators: usize,
    pub with_preferred: bool,
    pub boost: i64,
}

impl FrontierShape {
    fn build(self) -> Box<dyn Frontier> {
        build_frontier(
            self.kind,
            self.priority_evaluators,
            self.with_preferred,
            self.boost,
        )
    }
}

#[derive(Debug)]
pub struct FrontierSet {
    shape: FrontierShape,
    global: Box<dyn Frontier>,
    local: Option<Box<dyn Frontier>>,
    active: ActiveFrontier,
}

impl FrontierSet {
    #[must_use]
    pub fn new(shape: FrontierShape) -> Self {
        Self {
            global: shape.build(),
            shape,
            local: None,
            active: ActiveFrontier::Global,
        }
    }

    #[must_use]
    pub fn active(&self) -> ActiveFrontier {
        self.active
    }

    /// Select the frontier new entries go to. Selecting `Local` creates it
    /// if needed.
    pub fn activate(&mut self, which: ActiveFrontier) {
        if which == ActiveFrontier::Local && self.local.is_none() {
            self.local = Some(self.shape.build());
        }
        self.active = which;
    }

    pub fn global(&self) -> &dyn Frontier {
        self.global.as_ref()
    }

    pub fn global_mut(&mut self) -> &mut dyn Frontier {
        self.global.as_mut()
    }

    /// The local frontier, if one exists.
    pub fn local_mut(&mut self) -> Option<&mut (dyn Frontier + 'static)> {
        self.local.as_deref_mut()
    }

    pub fn get_mut(&mut self, which: ActiveFrontier) -> &mut dyn Frontier {
        match which {
            ActiveFrontier::Global => self.global.as_mut(),
            ActiveFrontier::Local => self.local.get_or_insert_with(|| self.shape.build()).as_mut(),
        }
    }

    pub fn active_mut(&mut self) -> &mut dyn Frontier {
        self.get_mut(self.active)
    }

    /// Insert into the active frontier.
    pub fn insert(&mut self, entry: FrontierEntry) {
        self.active_mut().insert(entry);
    }

    pub fn local_len(&self) -> usize {
        self.local.as_ref().map_or(0, |l| l.len())
    }

    /// Move every live local entry back into the global frontier and drop the
    /// local frontier. An entry is live when `is_live` says so; a handle held
    /// several times is re-inserted once, with its first-drained keys.
    ///
    /// Returns the number of entries re-inserted.
    pub fn merge_local(&mut self, is_live: impl Fn(StateHandle) -> bool) -> usize {
        self.active = ActiveFrontier::Global;
        let Some(mut local) = self.local.take() else {
            return 0;
        };
        self.reinsert(local.drain(), is_live)
    }

    /// Re-insert `entries` into the global frontier, skipping dead and
    /// duplicate handles.
    pub fn reinsert(
        &mut self,
        entries: impl IntoIterator<Item = FrontierEntry>,
        is_live: impl Fn(StateHandle) -> bool,
    ) -> usize {
        let mut seen = HashSet::new();
        let mut merged = 0;
        for entry in entries {
            if is_live(entry.handle) && seen.insert(entry.handle) {
                self.global.insert(entry);
                merged += 1;
            }
        }
        merged
    }
}
