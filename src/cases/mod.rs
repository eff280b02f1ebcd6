//! # Case Providers
//!
//! Parameter tuples that drive each scenario. Literal providers encode known
//! fixtures; [`IdSource`] produces ids in `[0, 10)` from an explicit seed or
//! fixture list so any run can be replayed.

use std::fmt::{self, Display};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::domain::Message;

/// Upper bound (exclusive) of generated message ids.
pub const MAX_ID: i64 = 10;

/// Inputs for the send endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCase {
    pub id: Option<i64>,
    pub text: String,
    pub important: bool,
}

impl SendCase {
    pub fn message(&self) -> Message {
        Message::new(self.id, self.text.clone(), self.important)
    }
}

/// One parameter tuple handed to a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Case {
    Send(SendCase),
    Id(i64),
}

impl Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Case::Send(case) => match case.id {
                Some(id) => write!(
                    f,
                    "(id={id}, text={:?}, important={})",
                    case.text, case.important
                ),
                None => write!(f, "(text={:?}, important={})", case.text, case.important),
            },
            Case::Id(id) => write!(f, "(id={id})"),
        }
    }
}

/// The known-good send fixture.
pub fn send_success_cases() -> Vec<Case> {
    vec![Case::Send(SendCase {
        id: Some(1),
        text: "Some text".to_string(),
        important: false,
    })]
}

/// Send cases that leave out the required `id`.
pub fn send_missing_field_cases() -> Vec<Case> {
    vec![Case::Send(SendCase {
        id: None,
        text: "value1".to_string(),
        important: false,
    })]
}

/// Restartable source of message ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    /// `count` draws in `[0, MAX_ID)` from a PRNG seeded with `seed`.
    Seeded { seed: u64, count: usize },
    Fixed(Vec<i64>),
    /// `0`, `1` and `MAX_ID - 1`.
    Boundary,
}

impl IdSource {
    /// Seeded source with a fresh seed from OS entropy. The seed is logged so
    /// a failing run can be repeated.
    pub fn random(count: usize) -> Self {
        let seed = rand::random::<u64>();
        info!(seed, count, "drawing message ids from a fresh seed");
        IdSource::Seeded { seed, count }
    }

    /// Produce the id sequence. Calling this again yields the same ids.
    pub fn ids(&self) -> Vec<i64> {
        match self {
            IdSource::Seeded { seed, count } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                (0..*count).map(|_| rng.gen_range(0..MAX_ID)).collect()
            }
            IdSource::Fixed(ids) => ids.clone(),
            IdSource::Boundary => vec![0, 1, MAX_ID - 1],
        }
    }

    pub fn cases(&self) -> Vec<Case> {
        self.ids().into_iter().map(Case::Id).collect()
    }
}

impl Default for IdSource {
    fn default() -> Self {
        IdSource::random(1)
    }
}
