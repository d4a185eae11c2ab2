use std::collections::{BTreeSet, HashMap};

use crate::model::{Outcome, Pick, UserId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureVerdict {
    pub correct: BTreeSet<UserId>,
}

impl FixtureVerdict {
    /// Exactly one user called it. No population floor is applied here.
    pub fn is_unicorn(&self) -> bool {
        self.correct.len() == 1
    }

    pub fn unicorn_owner(&self) -> Option<&UserId> {
        if self.is_unicorn() {
            self.correct.iter().next()
        } else {
            None
        }
    }
}

/// Evaluate the picks for one decided fixture.
///
/// Callers only invoke this for fixtures with a resolved outcome. A user with
/// several picks for the fixture is judged on the last one seen.
pub fn evaluate_fixture<'a, I>(outcome: Outcome, picks: I) -> FixtureVerdict
where
    I: IntoIterator<Item = &'a Pick>,
{
    let mut latest: HashMap<&str, Outcome> = HashMap::new();
    for pick in picks {
        latest.insert(pick.user_id.as_str(), pick.choice);
    }

    let correct = latest
        .into_iter()
        .filter(|(_, choice)| *choice == outcome)
        .map(|(user, _)| user.to_string())
        .collect();

    FixtureVerdict { correct }
}
