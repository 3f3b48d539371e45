use crate::cue::Cue;
use crate::error::SubcueError;
use crate::processor::{self, TextCleaner};

use std::time::Duration;

use anyhow::{Context, Result};
use nom::bytes::complete::{tag, take_while1, take_while_m_n};
use nom::character::complete::{
    digit1, line_ending, multispace0, multispace1, not_line_ending, space0, space1,
};
use nom::combinator::{map_res, opt, rest};
use nom::error::{convert_error, ErrorKind, VerboseError, VerboseErrorKind};
use nom::multi::many_till;
use nom::sequence::{preceded, terminated};
use nom::{branch::alt, error_position, Err, IResult};
use tracing::debug;

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// A subtitle block as it appears in the source, before cleanup.
#[derive(Debug)]
pub struct Entry {
    pub(crate) show_at: Duration,
    pub(crate) hide_at: Duration,
    pub(crate) text: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Srt,
    WebVtt,
}

impl Format {
    pub fn detect(input: &str) -> Self {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        if input.starts_with("WEBVTT") {
            Format::WebVtt
        } else {
            Format::Srt
        }
    }
}

pub struct Parser {
    cleaner: TextCleaner,
}

impl Parser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cleaner: TextCleaner::new()?,
        })
    }

    pub fn parse(&mut self, input: &str) -> Result<Vec<Cue>> {
        let format = Format::detect(input);
        let parsed = match format {
            Format::Srt => srt_file(input),
            Format::WebVtt => vtt_file(input),
        };
        let entries = match parsed {
            Ok((_, entries)) => entries,
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                let conv = convert_error(input, err);
                return Err(SubcueError::ParseError(conv))
                    .context(format!("Failed to parse {:?} subtitles", format));
            }
            Err(Err::Incomplete(_)) => {
                unreachable!("Incomplete data received by non-streaming parser.")
            }
        };
        debug!(?format, entries = entries.len(), "Parsed subtitle source");
        Ok(processor::process(entries, &self.cleaner))
    }
}

fn optional_bom(input: &str) -> ParseResult<Option<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn srt_file(input: &str) -> ParseResult<Vec<Entry>> {
    let (input, _) = optional_bom(input)?;
    let (input, subs) = all_subtitles(input)?;
    let (input, _) = end_of_file(input)?;
    Ok((input, subs))
}

fn all_subtitles(input: &str) -> ParseResult<Vec<Entry>> {
    let mut parsed_subs = Vec::new();
    let mut input = input;
    loop {
        match subtitle(input) {
            Ok((rem_input, subtitle)) => {
                parsed_subs.push(subtitle);
                input = rem_input;
                let (rem_input, _) = multispace0(input)?;
                input = rem_input;
            }
            Err(err) => {
                if input.is_empty() {
                    return Ok((input, parsed_subs));
                } else {
                    return Err(err);
                }
            }
        }
    }
}

fn subtitle(input: &str) -> ParseResult<Entry> {
    let (input, _) = multispace0(input)?;
    let (input, _) = terminated(seq_num, multispace1)(input)?;
    let (input, (show_at, hide_at)) = terminated(show_hide, line_ending)(input)?;
    let (input, text) = sub_text(input)?;

    Ok((
        input,
        Entry {
            show_at,
            hide_at,
            text: text.into_iter().map(String::from).collect(),
        },
    ))
}

fn vtt_file(input: &str) -> ParseResult<Vec<Entry>> {
    let (input, _) = optional_bom(input)?;
    let (input, _) = tag("WEBVTT")(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, _) = alt((line_ending, end_of_file))(input)?;
    // Header lines run up to the first blank line.
    let (mut input, _) = sub_text(input)?;

    let mut entries = Vec::new();
    loop {
        let (rem_input, _) = multispace0(input)?;
        input = rem_input;
        if input.is_empty() {
            return Ok((input, entries));
        }
        let (rem_input, lines) = sub_text(input)?;
        input = rem_input;
        if let Some(entry) = vtt_block(&lines)? {
            entries.push(entry);
        }
    }
}

fn vtt_block<'a>(lines: &[&'a str]) -> Result<Option<Entry>, Err<VerboseError<&'a str>>> {
    let first = match lines.first() {
        Some(line) => *line,
        None => return Ok(None),
    };
    if ["NOTE", "STYLE", "REGION"]
        .iter()
        .any(|kw| first.starts_with(*kw))
    {
        return Ok(None);
    }

    // An optional cue identifier may precede the timing line.
    let timing_at = if first.contains("-->") { 0 } else { 1 };
    let timing = match lines.get(timing_at) {
        Some(line) => *line,
        None => {
            return Err(Err::Error(VerboseError {
                errors: vec![(
                    first,
                    VerboseErrorKind::Context("cue identifier without a timing line"),
                )],
            }))
        }
    };
    let (_, (show_at, hide_at)) = vtt_timing(timing)?;

    Ok(Some(Entry {
        show_at,
        hide_at,
        text: lines
            .iter()
            .skip(timing_at + 1)
            .map(|l| l.to_string())
            .collect(),
    }))
}

fn vtt_timing(input: &str) -> ParseResult<(Duration, Duration)> {
    let (input, show_at) = vtt_timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, hide_at) = vtt_timestamp(input)?;
    // Cue settings (position, align, ...) have no meaning here.
    let (input, _) = rest(input)?;

    Ok((input, (show_at, hide_at)))
}

fn end_of_file(input: &str) -> ParseResult<&str> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        std::result::Result::Err(Err::Error(error_position!(input, ErrorKind::Eof)))
    }
}

fn sub_text(input: &str) -> ParseResult<Vec<&str>> {
    let line = terminated(
        take_while1(|c: char| c != '\n' && c != '\r'),
        alt((line_ending, end_of_file)),
    );

    let (input, (vec, _)) = many_till(line, alt((line_ending, end_of_file)))(input)?;

    Ok((input, vec))
}

fn show_hide(input: &str) -> ParseResult<(Duration, Duration)> {
    let (input, show_at) = timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, hide_at) = timestamp(input)?;
    let (input, _) = space0(input)?;

    Ok((input, (show_at, hide_at)))
}

fn millis(input: &str) -> ParseResult<u64> {
    const MILLIS_MIN: usize = 0;
    const MILLIS_MAX: usize = 3;
    map_res(
        take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
        |s: &str| {
            // Sometimes, a milliseconds value like `,2` may be encountered.
            // This is not valid SRT, but we must be able to handle it anyway.
            // We choose to interpret this as `,200`. In other words, we right-pad
            // every string until it reaches a length of 3 characters.
            format!("{:0<3}", s).parse::<u64>()
        },
    )(input)
}

fn timestamp(start: &str) -> ParseResult<Duration> {
    const HMS_MIN: usize = 0;
    const HMS_MAX: usize = 2;
    let take_hms = || {
        map_res(
            take_while_m_n(HMS_MIN, HMS_MAX, |c: char| c.is_ascii_digit()),
            |s: &str| {
                // Unlike in the previous situation, here we left-pad the value instead,
                // because it makes more sense to treat 1:13:45 as 01:13:45 than as 10:13:45.
                format!("{:0>2}", s).parse::<u64>()
            },
        )
    };

    let (input, hours) = take_hms()(start)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = take_hms()(input)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = millis(input)?;

    to_duration(start, hours, minutes, seconds, millis).map(|d| (input, d))
}

// WebVTT: `[hh:]mm:ss.ttt`, hours may run past two digits.
fn vtt_timestamp(start: &str) -> ParseResult<Duration> {
    let (input, first) = number(start)?;
    let (input, _) = tag(":")(input)?;
    let (input, second) = number(input)?;
    let (input, third) = opt(preceded(tag(":"), number))(input)?;
    let (input, _) = tag(".")(input)?;
    let (input, millis) = millis(input)?;

    let (hours, minutes, seconds) = match third {
        Some(seconds) => (first, second, seconds),
        None => (0, first, second),
    };
    to_duration(start, hours, minutes, seconds, millis).map(|d| (input, d))
}

// Fails with `TooLarge` at `start` when the total does not fit in a u64 of milliseconds.
fn to_duration<'a>(
    start: &'a str,
    hours: u64,
    minutes: u64,
    seconds: u64,
    millis: u64,
) -> std::result::Result<Duration, Err<VerboseError<&'a str>>> {
    hours
        .checked_mul(60)
        .and_then(|m| m.checked_add(minutes))
        .and_then(|m| m.checked_mul(60))
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(1000))
        .and_then(|ms| ms.checked_add(millis))
        .map(Duration::from_millis)
        .ok_or_else(|| Err::Error(error_position!(start, ErrorKind::TooLarge)))
}

fn number(input: &str) -> ParseResult<u64> {
    map_res(digit1, |s: &str| s.parse())(input)
}

fn seq_num(input: &str) -> ParseResult<usize> {
    map_res(digit1, |s: &str| s.parse())(input)
}
