//! Helpers for assembling positional-parameter SQL (`$1`, `$2`, ...).
//!
//! Column names passed here are interpolated into the statement text, so they
//! must come from trusted identifiers (e.g. [`crate::features::reports::models::EVENT_NAMES`]),
//! never from request input. Values always travel as bound parameters.

/// A `SET` fragment together with the values for its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetClause<V> {
    /// `"a = $3,b = $4"`
    pub sql: String,
    /// Values aligned 1:1 with the placeholders in `sql`
    pub values: Vec<V>,
    /// First placeholder index not used by this clause
    pub next_index: usize,
}

impl<V> SetClause<V> {
    /// An empty clause must not be sent to the database (`SET` with no assignments)
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build `"<name> = $<n>"` assignments for exactly the given fields, in iteration order,
/// numbering placeholders from `start_index`.
pub fn build_set_clause<K, V, I>(fields: I, start_index: usize) -> SetClause<V>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
{
    let mut assignments = Vec::new();
    let mut values = Vec::new();
    let mut index = start_index;

    for (name, value) in fields {
        assignments.push(format!("{} = ${}", name.as_ref(), index));
        values.push(value);
        index += 1;
    }

    SetClause {
        sql: assignments.join(","),
        values,
        next_index: index,
    }
}

/// `"$2, $3, $4"` for `placeholders(2, 3)`
pub fn placeholders(start_index: usize, count: usize) -> String {
    (start_index..start_index + count)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ")
}
