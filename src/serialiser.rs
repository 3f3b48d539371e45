use crate::cue::Cue;
use crate::tracker::CueChange;

use std::io::Write;
use std::time::Duration;

use anyhow::Result;

/// Writes the text of a cue as it would be shown on screen.
pub fn write_cue<W: Write>(buf: &mut W, cue: &Cue) -> Result<()> {
    writeln!(buf, "{}", cue.text())?;
    Ok(())
}

/// Writes one line of a playback trace: the clock, followed by what changed.
/// Multi-line cue text is flattened with ` / `.
pub fn write_change<W: Write>(buf: &mut W, time: Duration, change: &CueChange) -> Result<()> {
    write_ts(buf, time)?;
    match change {
        CueChange::Show(cue) => {
            let text = cue.text().lines().collect::<Vec<_>>().join(" / ");
            writeln!(buf, " show #{} {}", cue.index(), text)?;
        }
        CueChange::Hide => writeln!(buf, " hide")?,
    }
    Ok(())
}

fn write_ts<W: Write>(buf: &mut W, timestamp: Duration) -> Result<()> {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.subsec_millis();
    write!(
        buf,
        "{:02}:{:02}:{:02}.{:03}",
        hours, minutes, seconds, millis
    )?;
    Ok(())
}
