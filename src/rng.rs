use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::array::IntoIter;
use std::num::Wrapping;

type State = [Wrapping<u64>; 2];
type Iter = IntoIter<u64, 64>;

/// XorShift128+ with a 64-value lookahead buffer.
///
/// The whole generator state (including the unread part of the buffer) serializes, so a saved
/// `GameState` resumes the exact same stream of games.
#[derive(Debug, Deserialize, Serialize)]
pub struct Rng {
    state: State,
    #[serde(
        deserialize_with = "deserialize_iter",
        serialize_with = "serialize_iter"
    )]
    iter: Iter,
}

impl Rng {
    pub fn new() -> Rng {
        let mut state = rand_state();
        let iter = next_buf(&mut state);
        Rng { state, iter }
    }

    /// An all-zero seed would lock the generator at zero, so it is nudged off it.
    pub fn seeded(s0: u64, s1: u64) -> Rng {
        let s1 = if s0 == 0 && s1 == 0 {
            0x9e37_79b9_7f4a_7c15
        } else {
            s1
        };
        let mut state = [Wrapping(s0), Wrapping(s1)];
        let iter = next_buf(&mut state);
        Rng { state, iter }
    }

    pub fn next_f64(&mut self) -> f64 {
        let s0_shifted = if let Some(n) = self.iter.next_back() {
            n
        } else {
            self.iter = next_buf(&mut self.state);
            self.iter
                .next_back()
                .expect("next_buf always produces a 64-element iterator")
        };
        f64::from_bits(s0_shifted | 0x3ff0_0000_0000_0000) - 1.0
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_f64() * 4_294_967_296.0) as u32
    }

    /// `true` with probability `p` (clamped to `0.0..=1.0`).
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Uniform integer in `lo..hi`. Returns `lo` for an empty range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn range(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        let span = f64::from(hi - lo);
        lo + (self.next_f64() * span).floor() as u32
    }

    /// Number of successes in `n` independent trials of probability `p`.
    pub fn binomial(&mut self, n: u32, p: f64) -> u32 {
        let mut hits = 0;
        for _ in 0..n {
            if self.chance(p) {
                hits += 1;
            }
        }
        hits
    }

    pub fn choose<I>(&mut self, choices: I) -> Option<I::Item>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
    {
        let mut choices = choices.into_iter();
        #[allow(clippy::cast_precision_loss)]
        let len = choices.len() as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = (self.next_f64() * len).floor() as usize;
        choices.nth(n)
    }

    /// Fisher-Yates, back to front.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            #[allow(clippy::cast_precision_loss)]
            let bound = (i + 1) as f64;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let j = (self.next_f64() * bound).floor() as usize;
            items.swap(i, j);
        }
    }
}

fn rand_state() -> State {
    let mut buf = [0; 16];
    getrandom::getrandom(&mut buf).expect("failed to get random seed");
    let (lo, hi) = buf.split_at(8);
    let mut s0 = [0; 8];
    let mut s1 = [0; 8];
    s0.copy_from_slice(lo);
    s1.copy_from_slice(hi);
    [
        Wrapping(u64::from_le_bytes(s0)),
        Wrapping(u64::from_le_bytes(s1)),
    ]
}

fn next_buf(state: &mut State) -> Iter {
    fn next(state: &mut State) -> u64 {
        let [mut s1, s0] = *state;
        state[0] = s0;
        s1 ^= s1 << 23;
        s1 ^= s1 >> 17;
        s1 ^= s0;
        s1 ^= s0 >> 26;
        *state = [state[1], s1];
        (s0 >> 12).0
    }

    let iter = std::array::from_fn(|_| next(state)).into_iter();
    debug_assert!(iter.size_hint().0 == 64);
    iter
}

impl Default for Rng {
    fn default() -> Rng {
        Rng::new()
    }
}

impl Iterator for Rng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

fn deserialize_iter<'de, D>(deserializer: D) -> Result<Iter, D::Error>
where
    D: Deserializer<'de>,
{
    let mut buf = [0; 64];
    let v: Vec<u64> = Vec::deserialize(deserializer)?;
    let len = buf.len().min(v.len());
    buf[..len].copy_from_slice(&v[..len]);
    let mut iter = buf.into_iter();
    if let Some(n) = (64 - len).checked_sub(1) {
        iter.nth_back(n);
    }
    Ok(iter)
}

fn serialize_iter<S>(iter: &Iter, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    iter.as_slice().serialize(serializer)
}
