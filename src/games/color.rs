use crate::games::TerminalGuard;
use crate::rgb::{ANSI_RESET, Rgb, ansi_bg, ansi_fg};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use rand::{Rng, thread_rng};
use std::io::{Stdout, Write};
use std::time::Duration;

const DEFAULT_STEP: u8 = 5;
const MIN_STEP: u8 = 1;
const MAX_STEP: u8 = 64;
const POLL_MS: u64 = 100;
const SWATCH_WIDTH: usize = 16;
const SWATCH_HEIGHT: usize = 3;
const BAR_WIDTH: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel
{
    Red,
    Green,
    Blue,
}

impl Channel
{
    fn label(self) -> &'static str
    {
        match self {
            Channel::Red => "Red",
            Channel::Green => "Green",
            Channel::Blue => "Blue",
        }
    }

    fn tint(self) -> Rgb
    {
        match self {
            Channel::Red => Rgb { r: 220, g: 60, b: 60 },
            Channel::Green => Rgb { r: 60, g: 200, b: 60 },
            Channel::Blue => Rgb { r: 80, g: 120, b: 255 },
        }
    }

    fn next(self) -> Self
    {
        match self {
            Channel::Red => Channel::Green,
            Channel::Green => Channel::Blue,
            Channel::Blue => Channel::Red,
        }
    }

    fn prev(self) -> Self
    {
        match self {
            Channel::Red => Channel::Blue,
            Channel::Green => Channel::Red,
            Channel::Blue => Channel::Green,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus
{
    InProgress,
    Matched,
}

pub struct ColorRound
{
    target: Rgb,
    mix: Rgb,
    selected: Channel,
    checks: u32,
    status: MatchStatus,
}

impl ColorRound
{
    pub fn new(rng: &mut impl Rng) -> Self
    {
        Self::with_target(Rgb::random(rng))
    }

    fn with_target(target: Rgb) -> Self
    {
        Self {
            target,
            mix: Rgb::BLACK,
            selected: Channel::Red,
            checks: 0,
            status: MatchStatus::InProgress,
        }
    }

    pub fn target(&self) -> Rgb
    {
        self.target
    }

    pub fn mix(&self) -> Rgb
    {
        self.mix
    }

    pub fn selected(&self) -> Channel
    {
        self.selected
    }

    pub fn checks(&self) -> u32
    {
        self.checks
    }

    pub fn status(&self) -> MatchStatus
    {
        self.status
    }

    pub fn is_matched(&self) -> bool
    {
        self.status == MatchStatus::Matched
    }

    pub fn select(&mut self, channel: Channel)
    {
        self.selected = channel;
    }

    pub fn select_next(&mut self)
    {
        self.selected = self.selected.next();
    }

    pub fn select_prev(&mut self)
    {
        self.selected = self.selected.prev();
    }

    pub fn channel_value(&self, channel: Channel) -> u8
    {
        match channel {
            Channel::Red => self.mix.r,
            Channel::Green => self.mix.g,
            Channel::Blue => self.mix.b,
        }
    }

    // Sliders are range-constrained by construction; values clamp to 0..=255.
    pub fn adjust(&mut self, delta: i32)
    {
        if self.is_matched() {
            return;
        }
        let value = (self.channel_value(self.selected) as i32 + delta).clamp(0, 255) as u8;
        match self.selected {
            Channel::Red => self.mix.r = value,
            Channel::Green => self.mix.g = value,
            Channel::Blue => self.mix.b = value,
        }
    }

    pub fn check(&mut self) -> bool
    {
        if self.is_matched() {
            return true;
        }
        self.checks += 1;
        if self.mix == self.target {
            self.status = MatchStatus::Matched;
        }
        self.is_matched()
    }

    pub fn restart(&mut self, rng: &mut impl Rng)
    {
        *self = Self::new(rng);
    }
}

pub struct ColorConfig
{
    step: u8,
}

impl ColorConfig
{
    pub fn from_args(args: &[String]) -> Result<Self, String>
    {
        let mut step: Option<u8> = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--step" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --step".to_string())?;
                step = Some(parse_step(value)?);
            } else if let Some(rest) = arg.strip_prefix("--step=") {
                step = Some(parse_step(rest)?);
            } else {
                return Err(format!("Unknown color option '{arg}'"));
            }
        }

        Ok(Self {
            step: step.unwrap_or(DEFAULT_STEP).clamp(MIN_STEP, MAX_STEP),
        })
    }
}

impl Default for ColorConfig
{
    fn default() -> Self
    {
        Self { step: DEFAULT_STEP }
    }
}

fn parse_step(value: &str) -> Result<u8, String>
{
    let parsed = value
        .parse::<u8>()
        .map_err(|_| "step must be a number between 1 and 255".to_string())?;
    if parsed == 0 {
        return Err("step must be positive".to_string());
    }
    Ok(parsed)
}

pub fn run_with_config(config: ColorConfig) -> Result<(), String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = thread_rng();
    let mut round = ColorRound::new(&mut rng);
    log::debug!("color target: {}", round.target().hex());

    let mut message: Option<String> = None;

    draw_ui(term.stdout(), &round, &message)?;
    loop {
        if !event::poll(Duration::from_millis(POLL_MS)).map_err(|err| err.to_string())? {
            continue;
        }
        match event::read().map_err(|err| err.to_string())? {
            Event::Key(KeyEvent { code, modifiers, .. }) => match code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Up => round.select_prev(),
                KeyCode::Down => round.select_next(),
                KeyCode::Left => {
                    let step = adjust_step(&config, modifiers);
                    round.adjust(-step);
                }
                KeyCode::Right => {
                    let step = adjust_step(&config, modifiers);
                    round.adjust(step);
                }
                KeyCode::Enter => {
                    message = Some(if round.check() {
                        "Congratulations! You matched the color!".to_string()
                    } else {
                        "Try again! Keep adjusting.".to_string()
                    });
                }
                KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
                    'r' => round.select(Channel::Red),
                    'g' => round.select(Channel::Green),
                    'b' => round.select(Channel::Blue),
                    'n' => {
                        round.restart(&mut rng);
                        log::debug!("color target: {}", round.target().hex());
                        message = None;
                    }
                    _ => {}
                },
                _ => {}
            },
            _ => {}
        }
        draw_ui(term.stdout(), &round, &message)?;
    }
}

fn adjust_step(config: &ColorConfig, modifiers: KeyModifiers) -> i32
{
    if modifiers.contains(KeyModifiers::SHIFT) {
        config.step as i32
    } else {
        1
    }
}

fn draw_ui(stdout: &mut Stdout, round: &ColorRound, message: &Option<String>) -> Result<(), String>
{
    let mut lines = Vec::new();
    lines.push("Match Games - Color".to_string());
    lines.push(format!(
        "Your Color Hex: {}  Checks: {}",
        round.mix().hex(),
        round.checks()
    ));
    lines.push(String::new());

    lines.push(format!(
        "{:<width$}  {}",
        "Match This Color",
        "Your Color",
        width = SWATCH_WIDTH
    ));
    for _ in 0..SWATCH_HEIGHT {
        lines.push(format!(
            "{}{}{}  {}{}{}",
            ansi_bg(round.target()),
            " ".repeat(SWATCH_WIDTH),
            ANSI_RESET,
            ansi_bg(round.mix()),
            " ".repeat(SWATCH_WIDTH),
            ANSI_RESET
        ));
    }
    lines.push(String::new());

    for channel in [Channel::Red, Channel::Green, Channel::Blue] {
        let mut row = render_channel_row(round, channel);
        if channel == round.selected() {
            row.push_str("  <");
        }
        lines.push(row);
    }

    lines.push(String::new());
    if let Some(msg) = message {
        lines.push(msg.clone());
    } else {
        lines.push("Adjust the sliders until the swatches match.".to_string());
    }
    lines.push(help_line(round).to_string());

    let output = format!("{}\r\n", lines.join("\r\n"));
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))
        .map_err(|err| err.to_string())?;
    stdout.write_all(output.as_bytes()).map_err(|err| err.to_string())?;
    stdout.flush().map_err(|err| err.to_string())?;
    Ok(())
}

fn render_channel_row(round: &ColorRound, channel: Channel) -> String
{
    let value = round.channel_value(channel);
    let filled = (value as usize * BAR_WIDTH) / 255;
    format!(
        "{:<5} [{}{}{}{}] {:>3}",
        channel.label(),
        ansi_fg(channel.tint()),
        "#".repeat(filled),
        ANSI_RESET,
        "-".repeat(BAR_WIDTH - filled),
        value
    )
}

fn help_line(round: &ColorRound) -> &'static str
{
    match round.status() {
        MatchStatus::Matched => "Press N for a new round. Esc quits.",
        MatchStatus::InProgress => {
            "Up/Down or R/G/B select. Left/Right adjust (Shift for big steps). Enter checks. N restarts. Esc quits."
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn adjust_moves_only_the_selected_channel()
    {
        let mut round = ColorRound::with_target(Rgb { r: 1, g: 2, b: 3 });
        round.select(Channel::Green);
        round.adjust(42);
        assert_eq!(round.mix(), Rgb { r: 0, g: 42, b: 0 });
    }

    #[test]
    fn adjust_clamps_to_channel_range()
    {
        let mut round = ColorRound::with_target(Rgb { r: 1, g: 2, b: 3 });
        round.select(Channel::Red);
        round.adjust(-10);
        assert_eq!(round.channel_value(Channel::Red), 0);
        round.adjust(300);
        assert_eq!(round.channel_value(Channel::Red), 255);
        round.adjust(1);
        assert_eq!(round.channel_value(Channel::Red), 255);
    }

    #[test]
    fn check_requires_all_three_channels_to_match()
    {
        let mut round = ColorRound::with_target(Rgb { r: 5, g: 0, b: 0 });
        round.select(Channel::Red);
        round.adjust(5);
        assert!(round.check());
        assert_eq!(round.status(), MatchStatus::Matched);

        let mut near_miss = ColorRound::with_target(Rgb { r: 5, g: 0, b: 1 });
        near_miss.select(Channel::Red);
        near_miss.adjust(5);
        assert!(!near_miss.check());
        assert_eq!(near_miss.status(), MatchStatus::InProgress);
    }

    #[test]
    fn mismatched_checks_accumulate()
    {
        let mut round = ColorRound::with_target(Rgb { r: 9, g: 9, b: 9 });
        assert!(!round.check());
        assert!(!round.check());
        assert_eq!(round.checks(), 2);
    }

    #[test]
    fn matched_round_accepts_no_further_input()
    {
        let mut round = ColorRound::with_target(Rgb::BLACK);
        assert!(round.check());
        assert_eq!(round.checks(), 1);

        round.adjust(10);
        assert_eq!(round.mix(), Rgb::BLACK);
        assert!(round.check());
        assert_eq!(round.checks(), 1);
    }

    #[test]
    fn restart_resets_mix_and_counter()
    {
        let mut rng = thread_rng();
        let mut round = ColorRound::with_target(Rgb::BLACK);
        round.check();
        round.restart(&mut rng);
        assert_eq!(round.status(), MatchStatus::InProgress);
        assert_eq!(round.mix(), Rgb::BLACK);
        assert_eq!(round.checks(), 0);
        assert_eq!(round.selected(), Channel::Red);
    }

    #[test]
    fn channel_selection_cycles()
    {
        let mut round = ColorRound::with_target(Rgb::BLACK);
        round.select_next();
        assert_eq!(round.selected(), Channel::Green);
        round.select_next();
        assert_eq!(round.selected(), Channel::Blue);
        round.select_next();
        assert_eq!(round.selected(), Channel::Red);
        round.select_prev();
        assert_eq!(round.selected(), Channel::Blue);
    }

    #[test]
    fn config_clamps_step()
    {
        let args: Vec<String> = vec!["--step=200".into()];
        let config = ColorConfig::from_args(&args).expect("valid args");
        assert_eq!(config.step, MAX_STEP);
        assert!(ColorConfig::from_args(&["--bogus".to_string()]).is_err());
    }
}
