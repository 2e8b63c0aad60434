//! Text form of subgoal plans.
//!
//! A plan is a list of entries in execution order. Each entry names a
//! subgoal kind and, for `GoNextToSubgoal`, the cell to go next to:
//!
//! ```text
//! (GoNextToSubgoal, (3, 5))
//! (PickupSubgoal)
//! OpenSubgoal
//! ```
//!
//! The outer parentheses are optional. A position given to any other kind
//! is accepted and ignored.

use babybot_types::GridPosition;
use tracing::debug;

use crate::error::PlannerError;
use crate::subgoal::{Subgoal, SubgoalKind};

/// Parse a plan, keeping entry order.
///
/// # Errors
///
/// Returns [`PlannerError::PlanParse`] for the first entry that is
/// malformed, names an unknown kind, or is a `GoNextToSubgoal` without a
/// two-number position.
pub fn parse_subgoal_plan<S: AsRef<str>>(entries: &[S]) -> Result<Vec<Subgoal>, PlannerError> {
    entries.iter().map(|entry| parse_entry(entry.as_ref())).collect()
}

fn parse_error(entry: &str, reason: impl Into<String>) -> PlannerError {
    PlannerError::PlanParse {
        entry: entry.to_owned(),
        reason: reason.into(),
    }
}

fn strip_parens(text: &str) -> Option<&str> {
    text.strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
}

fn parse_entry(entry: &str) -> Result<Subgoal, PlannerError> {
    let trimmed = entry.trim();
    let body = strip_parens(trimmed).unwrap_or(trimmed);

    let (name, datum) = match body.split_once(',') {
        Some((name, rest)) => {
            let inner = strip_parens(rest.trim())
                .ok_or_else(|| parse_error(entry, "expected a parenthesized tuple after the comma"))?;
            if inner.contains(['(', ')']) {
                return Err(parse_error(entry, "nested tuples are not supported"));
            }
            let numbers = inner
                .split(',')
                .map(|part| {
                    let part = part.trim();
                    part.parse::<i32>()
                        .map_err(|err| parse_error(entry, format!("invalid integer {part:?}: {err}")))
                })
                .collect::<Result<Vec<i32>, PlannerError>>()?;
            (name.trim(), Some(numbers))
        }
        None => (body, None),
    };

    let kind = SubgoalKind::from_name(name)
        .ok_or_else(|| parse_error(entry, format!("unknown subgoal type {name:?}")))?;

    match (kind, datum.as_deref()) {
        (SubgoalKind::GoNextTo, Some(&[col, row])) => Ok(Subgoal::go_to_pos(GridPosition::new(col, row))),
        (SubgoalKind::GoNextTo, _) => Err(parse_error(entry, "GoNextToSubgoal needs a position (x, y)")),
        (SubgoalKind::Pickup, datum) => Ok(ignoring(Subgoal::pickup(), datum)),
        (SubgoalKind::Drop, datum) => Ok(ignoring(Subgoal::drop(), datum)),
        (SubgoalKind::Open, datum) => Ok(ignoring(Subgoal::open(None), datum)),
        (SubgoalKind::Close, datum) => Ok(ignoring(Subgoal::close(), datum)),
        (SubgoalKind::Explore, datum) => Ok(ignoring(Subgoal::explore(), datum)),
    }
}

fn ignoring(subgoal: Subgoal, datum: Option<&[i32]>) -> Subgoal {
    if let Some(datum) = datum {
        debug!(subgoal = %subgoal, ?datum, "ignoring position");
    }
    subgoal
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::subgoal::Target;

    #[test]
    fn parses_all_accepted_forms() {
        let plan = parse_subgoal_plan(&[
            "(GoNextToSubgoal, (3,5))",
            "  GoNextToSubgoal ,( 4 , -1 ) ",
            "(PickupSubgoal)",
            "OpenSubgoal",
            "(DropSubgoal, (1, 1))",
        ])
        .unwrap();
        assert_eq!(plan.len(), 5);
        assert_eq!(
            plan.first().unwrap().target,
            Some(Target::Position(GridPosition::new(3, 5)))
        );
        assert_eq!(
            plan.get(1).unwrap().target,
            Some(Target::Position(GridPosition::new(4, -1)))
        );
        assert_eq!(plan.get(2), Some(&Subgoal::pickup()));
        assert_eq!(plan.get(3), Some(&Subgoal::open(None)));
        assert_eq!(plan.get(4), Some(&Subgoal::drop()));
    }

    #[test]
    fn empty_plan_is_fine() {
        let entries: [&str; 0] = [];
        assert!(parse_subgoal_plan(&entries).unwrap().is_empty());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = parse_subgoal_plan(&["(JumpSubgoal)"]).unwrap_err();
        assert!(matches!(err, PlannerError::PlanParse { ref entry, .. } if entry == "(JumpSubgoal)"));
    }

    #[test]
    fn go_next_to_needs_two_numbers() {
        assert!(parse_subgoal_plan(&["GoNextToSubgoal"]).is_err());
        assert!(parse_subgoal_plan(&["(GoNextToSubgoal, (3))"]).is_err());
        assert!(parse_subgoal_plan(&["(GoNextToSubgoal, (3, x))"]).is_err());
        assert!(parse_subgoal_plan(&["(GoNextToSubgoal, 3, 5)"]).is_err());
    }
}
