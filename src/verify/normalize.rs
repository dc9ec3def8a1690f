//! Pattern normalization.

use crate::pattern::Pattern;

/// Rewrites anonymous statement subjects into explicit, returned variables.
///
/// The generated name is kept, so the rewritten statement still equals the
/// original; only its rendering changes from `$_` to `$anon-…`. Variables
/// inside properties are left as they are.
#[must_use]
pub fn make_anonymous_explicit(pattern: &Pattern) -> Pattern {
    pattern
        .iter()
        .map(|statement| {
            let subject = statement.subject();
            if subject.is_returned() {
                statement.clone()
            } else {
                statement.with_subject(subject.as_returned())
            }
        })
        .collect()
}
