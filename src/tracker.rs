use crate::cue::{find_current_cue, Cue};

use std::time::Duration;

use tracing::debug;

const LOG_TEXT_CHARS: usize = 40;

/// What the display layer has to do after a clock update.
#[derive(Debug, PartialEq, Eq)]
pub enum CueChange<'a> {
    Show(&'a Cue),
    Hide,
}

/// Debounces cue lookups: remembers which cue was last shown and only
/// reports a change when the resolved cue is a different one.
#[derive(Debug, Default)]
pub struct CueTracker {
    last_index: Option<usize>,
}

impl CueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<'a>(&mut self, cues: &'a [Cue], time: Duration) -> Option<CueChange<'a>> {
        let current = find_current_cue(cues, time);
        let index = current.map(Cue::index);
        if index == self.last_index {
            return None;
        }
        self.last_index = index;

        match current {
            Some(cue) => {
                debug!(
                    index = cue.index(),
                    time = %format!("{:.1}", time.as_secs_f64()),
                    text = %cue.text().chars().take(LOG_TEXT_CHARS).collect::<String>(),
                    "show_cue"
                );
                Some(CueChange::Show(cue))
            }
            None => Some(CueChange::Hide),
        }
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Forget the last shown cue. Call when the subtitle source changes.
    pub fn reset(&mut self) {
        self.last_index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn cues() -> Vec<Cue> {
        vec![
            Cue::new(0, ms(1000), ms(2000), "first"),
            Cue::new(1, ms(2000), ms(3000), "second"),
            Cue::new(2, ms(5000), ms(6000), "third"),
        ]
    }

    #[test]
    fn nothing_before_first_cue() {
        let cues = cues();
        let mut tracker = CueTracker::new();
        assert_eq!(tracker.update(&cues, ms(0)), None);
        assert_eq!(tracker.update(&cues, ms(500)), None);
        assert_eq!(tracker.last_index(), None);
    }

    #[test]
    fn emits_only_on_identity_change() {
        let cues = cues();
        let mut tracker = CueTracker::new();

        assert_eq!(tracker.update(&cues, ms(1000)), Some(CueChange::Show(&cues[0])));
        assert_eq!(tracker.update(&cues, ms(1100)), None);
        assert_eq!(tracker.update(&cues, ms(1999)), None);
        assert_eq!(tracker.update(&cues, ms(2000)), Some(CueChange::Show(&cues[1])));
        assert_eq!(tracker.update(&cues, ms(3000)), Some(CueChange::Hide));
        assert_eq!(tracker.update(&cues, ms(4000)), None);
        assert_eq!(tracker.update(&cues, ms(5500)), Some(CueChange::Show(&cues[2])));
        assert_eq!(tracker.last_index(), Some(2));
    }

    #[test]
    fn seeking_backwards_is_a_change() {
        let cues = cues();
        let mut tracker = CueTracker::new();
        tracker.update(&cues, ms(5500));
        assert_eq!(tracker.update(&cues, ms(1500)), Some(CueChange::Show(&cues[0])));
    }

    #[test]
    fn reset_reemits_current_cue() {
        let cues = cues();
        let mut tracker = CueTracker::new();
        tracker.update(&cues, ms(1500));
        tracker.reset();
        assert_eq!(tracker.last_index(), None);
        assert_eq!(tracker.update(&cues, ms(1500)), Some(CueChange::Show(&cues[0])));
    }
}
