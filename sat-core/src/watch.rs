//! Per-literal watchlists, the index propagation uses to avoid scanning every clause.
//!
//! Each two-watched clause appears in exactly two watchlists: the one for the negation of each of
//! its watched literals. When a literal becomes falsified, only the clauses in its watchlist can
//! possibly need a new watch; every other clause is untouched. As an optimization, following
//! Sörensson & Eén's MiniSat 2.1 blocking literals, each entry also stores a literal of the clause
//! other than the watched one; when that literal is satisfied the clause is already satisfied and
//! the watch can be skipped without touching the clause store at all.
use sat_formula::Lit;

use crate::clause::ClauseId;

/// One clause's watch on a literal, with its blocking literal.
#[derive(Copy, Clone)]
pub struct WatchEntry {
    pub clause: ClauseId,
    pub blocking: Lit,
}

/// Per-literal index of which clauses watch that literal.
#[derive(Default)]
pub struct Watchlists {
    watches: Vec<Vec<WatchEntry>>,
}

impl Watchlists {
    pub fn new() -> Watchlists {
        Watchlists::default()
    }

    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Registers a clause's two watched literals, `lits[0]` and `lits[1]`.
    pub fn watch_clause(&mut self, clause: ClauseId, lits: [Lit; 2]) {
        for i in 0..2 {
            let entry = WatchEntry {
                clause,
                blocking: lits[i ^ 1],
            };
            self.watches[(!lits[i]).code()].push(entry);
        }
    }

    /// Entries for clauses watching `!lit`, i.e. the clauses to examine when `lit` becomes
    /// satisfied (exactly when `!lit` becomes falsified).
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<WatchEntry> {
        &mut self.watches[lit.code()]
    }

    /// Adds a single watch entry for `lit`, used when `Watcher::replace` moves a watch there.
    pub fn add_watch(&mut self, lit: Lit, entry: WatchEntry) {
        self.watches[lit.code()].push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sat_formula::Var;

    #[test]
    fn watch_clause_indexes_by_negated_literal() {
        let mut watchlists = Watchlists::new();
        watchlists.set_var_count(2);

        let a = Var::from_index(0).positive();
        let b = Var::from_index(1).positive();

        let clause: ClauseId = {
            let mut store = crate::clause::ClauseStore::new();
            store.insert(vec![a, b], false)
        };

        watchlists.watch_clause(clause, [a, b]);

        assert_eq!(watchlists.watched_by_mut(!a).len(), 1);
        assert_eq!(watchlists.watched_by_mut(!b).len(), 1);
        assert_eq!(watchlists.watched_by_mut(a).len(), 0);

        assert_eq!(watchlists.watched_by_mut(!a)[0].blocking, b);
        assert_eq!(watchlists.watched_by_mut(!b)[0].blocking, a);
    }
}
