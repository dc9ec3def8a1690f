//! Inference relation building.
//!
//! Renders one rule application ("rule R fired, consuming these facts,
//! producing those") as ordinary queryable statements: the reified premise
//! facts, the reified conclusion facts, and a `resolution` relation linking
//! them.

use crate::pattern::{Pattern, Statement};
use crate::value::Literal;
use crate::verify::reify::{reify_statement, Fact, FreshVars};
use crate::verify::vocab::{BODY, HEAD, RESOLUTION, RULE_LABEL};

/// Reifies `when` and `then` and links them with a `resolution` fact.
///
/// Body edges follow the order the premise facts were produced, head edges
/// the order of the conclusion facts. The resolution fact takes the next
/// fresh variable after all reified facts.
///
/// # Examples
///
/// ```
/// use resolution_verify::{build_inference_facts, FreshVars, Pattern, Statement, Variable};
///
/// let when = Pattern::from(vec![Statement::new(Variable::named("a")).isa("person")]);
/// let then = Pattern::from(vec![Statement::new(Variable::named("a")).isa("adult")]);
/// let mut fresh = FreshVars::new("f");
/// let facts = build_inference_facts(&when, &then, "adulthood", &mut fresh);
/// assert_eq!(facts.len(), 3);
/// ```
pub fn build_inference_facts(when: &Pattern, then: &Pattern, rule_label: &str, fresh: &mut FreshVars) -> Pattern {
    let body: Vec<Fact> = when.iter().flat_map(|s| reify_statement(s, fresh)).collect();
    let head: Vec<Fact> = then.iter().flat_map(|s| reify_statement(s, fresh)).collect();

    let mut resolution = Statement::new(fresh.next_var())
        .isa(RESOLUTION)
        .has(RULE_LABEL, Literal::from(rule_label));
    for fact in &body {
        resolution = resolution.rel(BODY, fact.variable.clone());
    }
    for fact in &head {
        resolution = resolution.rel(HEAD, fact.variable.clone());
    }

    tracing::trace!(
        rule = rule_label,
        body = body.len(),
        head = head.len(),
        "built inference relation"
    );

    let mut facts: Pattern = body.into_iter().chain(head).map(|f| f.statement).collect();
    facts.insert(resolution);
    facts
}
