use crate::error::SubcueError;

use std::time::Duration;

/// A single timed subtitle entry. Visible on the half-open interval
/// `[show_at, hide_at)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub(crate) index: usize,
    pub(crate) show_at: Duration,
    pub(crate) hide_at: Duration,
    pub(crate) text: String,
}

impl Cue {
    pub fn new(index: usize, show_at: Duration, hide_at: Duration, text: impl Into<String>) -> Self {
        Self {
            index,
            show_at,
            hide_at,
            text: text.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn show_at(&self) -> Duration {
        self.show_at
    }

    pub fn hide_at(&self) -> Duration {
        self.hide_at
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn contains(&self, time: Duration) -> bool {
        self.show_at <= time && time < self.hide_at
    }
}

/// Returns the cue visible at `time`, if any.
///
/// `cues` must be sorted by start time and must not overlap. Input that
/// breaks this is handled on a best-effort basis: the lookup never panics,
/// but which cue (if any) comes back is unspecified. Use [`CueTrack`] to
/// reject such input up front.
pub fn find_current_cue(cues: &[Cue], time: Duration) -> Option<&Cue> {
    locate(cues, time, |_| ()).map(|i| &cues[i])
}

/// Same as [`find_current_cue`], for a clock expressed in float seconds.
/// Negative or non-finite times never match.
pub fn find_current_cue_secs(cues: &[Cue], seconds: f64) -> Option<&Cue> {
    let time = Duration::try_from_secs_f64(seconds).ok()?;
    find_current_cue(cues, time)
}

// Binary search for the last cue starting at or before `time`, then check
// that `time` falls before its end. `visit` is called with every position
// the search inspects.
fn locate<F>(cues: &[Cue], time: Duration, mut visit: F) -> Option<usize>
where
    F: FnMut(usize),
{
    let (mut lo, mut hi) = (0, cues.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        visit(mid);
        if cues[mid].show_at <= time {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    let candidate = lo.checked_sub(1)?;
    if time < cues[candidate].hide_at {
        Some(candidate)
    } else {
        None
    }
}

/// The cues of one subtitle source: sorted, non-overlapping and immutable.
#[derive(Debug, Clone, Default)]
pub struct CueTrack {
    cues: Vec<Cue>,
}

impl CueTrack {
    pub fn new(cues: Vec<Cue>) -> Result<Self, SubcueError> {
        for (position, cue) in cues.iter().enumerate() {
            if cue.index != position {
                return Err(SubcueError::BadIndex {
                    position,
                    index: cue.index,
                });
            }
            if cue.show_at >= cue.hide_at {
                return Err(SubcueError::EmptyInterval {
                    index: cue.index,
                    show_at: cue.show_at,
                    hide_at: cue.hide_at,
                });
            }
        }
        for pair in cues.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if cur.show_at < prev.show_at {
                return Err(SubcueError::Unsorted { index: cur.index });
            }
            if cur.show_at < prev.hide_at {
                return Err(SubcueError::Overlap { index: cur.index });
            }
        }
        Ok(Self { cues })
    }

    pub fn find(&self, time: Duration) -> Option<&Cue> {
        find_current_cue(&self.cues, time)
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// End of the last cue, or zero for an empty track.
    pub fn end(&self) -> Duration {
        self.cues.last().map_or(Duration::ZERO, |c| c.hide_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn cue(index: usize, show: u64, hide: u64, text: &str) -> Cue {
        Cue::new(index, ms(show), ms(hide), text)
    }

    fn sample() -> Vec<Cue> {
        vec![cue(0, 0, 2000, "a"), cue(1, 2000, 4000, "b")]
    }

    fn gapped() -> Vec<Cue> {
        vec![
            cue(0, 1000, 2000, "one"),
            cue(1, 3000, 4500, "two"),
            cue(2, 4500, 5000, "three"),
            cue(3, 8000, 9000, "four"),
        ]
    }

    #[test]
    fn resolves_scenario() {
        let cues = sample();
        assert_eq!(find_current_cue_secs(&cues, 1.0).map(Cue::text), Some("a"));
        assert_eq!(find_current_cue_secs(&cues, 2.0).map(Cue::text), Some("b"));
        assert_eq!(find_current_cue_secs(&cues, 5.0), None);
    }

    #[test]
    fn empty_sequence_never_matches() {
        assert_eq!(find_current_cue(&[], ms(0)), None);
        assert_eq!(find_current_cue(&[], ms(12_345)), None);
    }

    macro_rules! test_lookup {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (time, expected): (u64, Option<&str>) = $value;

                let cues = gapped();
                let found = find_current_cue(&cues, ms(time)).map(Cue::text);

                assert_eq!(found, expected);
            }
        )*
        }
    }

    test_lookup! {
        test_lookup_before_first: (0, None),
        test_lookup_just_before_first: (999, None),
        test_lookup_first_start: (1000, Some("one")),
        test_lookup_first_inside: (1500, Some("one")),
        test_lookup_first_end: (2000, None),
        test_lookup_gap: (2500, None),
        test_lookup_second_start: (3000, Some("two")),
        test_lookup_adjacent_boundary: (4500, Some("three")),
        test_lookup_last_inside: (8999, Some("four")),
        test_lookup_last_end: (9000, None),
        test_lookup_after_last: (60_000, None),
    }

    #[test]
    fn agrees_with_linear_scan() {
        let cues = gapped();
        for time in (0..10_000).step_by(7) {
            let expected = cues.iter().find(|c| c.contains(ms(time)));
            assert_eq!(find_current_cue(&cues, ms(time)), expected, "at {}ms", time);
        }
    }

    #[test]
    fn rejects_invalid_float_times() {
        let cues = sample();
        assert_eq!(find_current_cue_secs(&cues, -0.5), None);
        assert_eq!(find_current_cue_secs(&cues, f64::NAN), None);
        assert_eq!(find_current_cue_secs(&cues, f64::INFINITY), None);
    }

    #[test]
    fn lookup_cost_is_logarithmic() {
        let cues: Vec<Cue> = (0..1024u64)
            .map(|i| cue(i as usize, i * 1000, i * 1000 + 800, "x"))
            .collect();
        for time in (0..1_030_000).step_by(997) {
            let mut visits = 0;
            locate(&cues, ms(time), |_| visits += 1);
            assert!(visits <= 11, "{} visits at {}ms", visits, time);
        }
    }

    #[test]
    fn unsorted_input_does_not_panic() {
        let cues = vec![cue(0, 5000, 6000, "late"), cue(1, 0, 1000, "early")];
        for time in (0..7000).step_by(250) {
            let _ = find_current_cue(&cues, ms(time));
        }
    }

    #[test]
    fn track_accepts_valid_cues() {
        let track = CueTrack::new(gapped()).unwrap();
        assert_eq!(track.len(), 4);
        assert_eq!(track.end(), ms(9000));
        assert_eq!(track.find(ms(4700)).map(Cue::index), Some(2));
        assert_eq!(track.get(3).map(Cue::text), Some("four"));
    }

    #[test]
    fn track_rejects_overlap() {
        let cues = vec![cue(0, 0, 3000, "a"), cue(1, 2000, 4000, "b")];
        assert!(matches!(
            CueTrack::new(cues),
            Err(SubcueError::Overlap { index: 1 })
        ));
    }

    #[test]
    fn track_rejects_unsorted() {
        let cues = vec![cue(0, 3000, 4000, "a"), cue(1, 1000, 2000, "b")];
        assert!(matches!(
            CueTrack::new(cues),
            Err(SubcueError::Unsorted { index: 1 })
        ));
    }

    #[test]
    fn track_rejects_empty_interval() {
        let cues = vec![cue(0, 3000, 3000, "a")];
        assert!(matches!(
            CueTrack::new(cues),
            Err(SubcueError::EmptyInterval { index: 0, .. })
        ));
    }

    #[test]
    fn track_rejects_bad_index() {
        let cues = vec![cue(0, 0, 1000, "a"), cue(5, 1000, 2000, "b")];
        assert!(matches!(
            CueTrack::new(cues),
            Err(SubcueError::BadIndex {
                position: 1,
                index: 5
            })
        ));
    }
}
