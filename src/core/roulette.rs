//! The randomization engine.
//!
//! Turns a delimited list of names plus a [`Mode`] into either a shuffled
//! list or a single pick. Every call builds its own seeded generator, and
//! the instant is always passed in by the caller, so the same inputs give
//! the same [`Outcome`] on every machine.

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::fmt;

/// Characters that separate names in the raw input.
pub const DELIMITERS: &[char] = &[',', ';'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouletteError {
    #[error("no names provided")]
    EmptyInput,
}

/// A non-empty, ordered list of names.
#[allow(clippy::len_without_is_empty)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameList(Vec<String>);

impl NameList {
    /// Split `raw` on `,` and `;`, dropping empty fields.
    pub fn parse(raw: &str) -> Result<Self, RouletteError> {
        Self::new(
            raw.split(DELIMITERS)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn new(names: Vec<String>) -> Result<Self, RouletteError> {
        if names.is_empty() {
            return Err(RouletteError::EmptyInput);
        }
        Ok(NameList(names))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[serde(rename = "shuffle")]
    ShuffleNow,
    #[serde(rename = "shuffle-today")]
    ShuffleDaily,
    #[serde(rename = "pick")]
    PickNow,
    #[serde(rename = "pick-today")]
    PickDaily,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::ShuffleNow,
        Mode::ShuffleDaily,
        Mode::PickNow,
        Mode::PickDaily,
    ];

    /// Path segment this mode is served under.
    pub fn route(self) -> &'static str {
        match self {
            Mode::ShuffleNow => "shuffle",
            Mode::ShuffleDaily => "shuffle-today",
            Mode::PickNow => "pick",
            Mode::PickDaily => "pick-today",
        }
    }

    pub fn from_route(s: &str) -> Option<Self> {
        Mode::ALL.into_iter().find(|m| m.route() == s)
    }

    pub fn from_flags(pick: bool, daily: bool) -> Self {
        match (pick, daily) {
            (false, false) => Mode::ShuffleNow,
            (false, true) => Mode::ShuffleDaily,
            (true, false) => Mode::PickNow,
            (true, true) => Mode::PickDaily,
        }
    }

    pub fn is_daily(self) -> bool {
        matches!(self, Mode::ShuffleDaily | Mode::PickDaily)
    }

    pub fn is_pick(self) -> bool {
        matches!(self, Mode::PickNow | Mode::PickDaily)
    }
}

/// Seed for `mode` at instant `now`.
///
/// Now-modes use the instant in nanoseconds. Daily modes use the Unix
/// seconds of the most recent midnight in `day_offset`.
pub fn derive_seed(mode: Mode, now: DateTime<Utc>, day_offset: FixedOffset) -> i64 {
    if mode.is_daily() {
        start_of_day(now, day_offset)
    } else {
        // Outside 1677..2262 nanos overflow i64; fall back to seconds.
        now.timestamp_nanos_opt().unwrap_or(now.timestamp())
    }
}

fn start_of_day(now: DateTime<Utc>, day_offset: FixedOffset) -> i64 {
    let local_midnight = now
        .with_timezone(&day_offset)
        .date_naive()
        .and_time(NaiveTime::MIN);
    local_midnight.and_utc().timestamp() - i64::from(day_offset.local_minus_utc())
}

fn rng_for(seed: i64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed as u64)
}

/// Fisher-Yates shuffle of a copy of `list`.
pub fn shuffle(list: &NameList, seed: i64) -> Vec<String> {
    let mut rng = rng_for(seed);
    let mut out = list.as_slice().to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.gen_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// Select one name. Returns the name and its index in `list`.
pub fn pick(list: &NameList, seed: i64) -> (String, usize) {
    let mut rng = rng_for(seed);
    let index = rng.gen_range(0..list.len());
    (list.as_slice()[index].clone(), index)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Shuffled {
        mode: Mode,
        seed: i64,
        names: Vec<String>,
    },
    Picked {
        mode: Mode,
        seed: i64,
        name: String,
        index: usize,
    },
}

impl Outcome {
    pub fn mode(&self) -> Mode {
        match self {
            Outcome::Shuffled { mode, .. } | Outcome::Picked { mode, .. } => *mode,
        }
    }

    pub fn seed(&self) -> i64 {
        match self {
            Outcome::Shuffled { seed, .. } | Outcome::Picked { seed, .. } => *seed,
        }
    }
}

/// Parse `raw`, derive the seed for `mode` at `now`, and run the operation.
pub fn spin(
    raw: &str,
    mode: Mode,
    now: DateTime<Utc>,
    day_offset: FixedOffset,
) -> Result<Outcome, RouletteError> {
    let list = NameList::parse(raw)?;
    let seed = derive_seed(mode, now, day_offset);
    let outcome = if mode.is_pick() {
        let (name, index) = pick(&list, seed);
        Outcome::Picked {
            mode,
            seed,
            name,
            index,
        }
    } else {
        Outcome::Shuffled {
            mode,
            seed,
            names: shuffle(&list, seed),
        }
    };
    Ok(outcome)
}
