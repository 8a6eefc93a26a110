use crate::games::TerminalGuard;
use crate::rgb::{ANSI_RESET, Rgb, ansi_bg};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use rand::{Rng, thread_rng};
use std::io::{Stdout, Write};
use std::time::Duration;

const DEFAULT_LENGTH: usize = 5;
const DEFAULT_ATTEMPTS: usize = 6;
const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 9;
const MIN_ATTEMPTS: usize = 1;
const MAX_ATTEMPTS: usize = 10;
const POLL_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigitState
{
    Correct,
    Present,
    Absent,
}

#[derive(Debug)]
pub struct Attempt
{
    pub guess: String,
    pub states: Vec<DigitState>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus
{
    InProgress,
    Won,
    Lost,
}

pub struct Round
{
    target: String,
    history: Vec<Attempt>,
    max_attempts: usize,
    status: RoundStatus,
}

impl Round
{
    pub fn new(length: usize, max_attempts: usize, rng: &mut impl Rng) -> Self
    {
        Self::with_target(random_target(length, rng), max_attempts)
    }

    fn with_target(target: String, max_attempts: usize) -> Self
    {
        Self {
            target,
            history: Vec::new(),
            max_attempts,
            status: RoundStatus::InProgress,
        }
    }

    pub fn target(&self) -> &str
    {
        &self.target
    }

    pub fn length(&self) -> usize
    {
        self.target.len()
    }

    pub fn status(&self) -> RoundStatus
    {
        self.status
    }

    pub fn is_over(&self) -> bool
    {
        self.status != RoundStatus::InProgress
    }

    pub fn attempts_used(&self) -> usize
    {
        self.history.len()
    }

    pub fn max_attempts(&self) -> usize
    {
        self.max_attempts
    }

    pub fn history(&self) -> &[Attempt]
    {
        &self.history
    }

    // Invalid guesses never touch the attempt counter.
    pub fn submit(&mut self, guess: &str) -> Result<RoundStatus, String>
    {
        if self.is_over() {
            return Err("The round is over. Restart to play again.".to_string());
        }

        let guess = guess.trim();
        if guess.len() != self.target.len() || !guess.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(format!(
                "Invalid input! Enter a {}-digit number.",
                self.target.len()
            ));
        }

        let states = score_guess(&self.target, guess);
        let is_win = guess == self.target;
        self.history.push(Attempt {
            guess: guess.to_string(),
            states,
        });

        if is_win {
            self.status = RoundStatus::Won;
        } else if self.history.len() >= self.max_attempts {
            self.status = RoundStatus::Lost;
        }

        Ok(self.status)
    }

    pub fn restart(&mut self, rng: &mut impl Rng)
    {
        *self = Self::new(self.target.len(), self.max_attempts, rng);
    }
}

// Simplified rule: a non-exact digit is Present whenever the target contains
// it anywhere, with no duplicate-consumption bookkeeping.
pub fn score_guess(target: &str, guess: &str) -> Vec<DigitState>
{
    guess
        .chars()
        .zip(target.chars())
        .map(|(g, t)| {
            if g == t {
                DigitState::Correct
            } else if target.contains(g) {
                DigitState::Present
            } else {
                DigitState::Absent
            }
        })
        .collect()
}

fn random_target(length: usize, rng: &mut impl Rng) -> String
{
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub struct DigitsConfig
{
    length: usize,
    attempts: usize,
}

impl DigitsConfig
{
    pub fn from_args(args: &[String]) -> Result<Self, String>
    {
        let mut length: Option<usize> = None;
        let mut attempts: Option<usize> = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--length" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --length".to_string())?;
                length = Some(parse_count(value, "length")?);
            } else if let Some(rest) = arg.strip_prefix("--length=") {
                length = Some(parse_count(rest, "length")?);
            } else if arg == "--attempts" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --attempts".to_string())?;
                attempts = Some(parse_count(value, "attempts")?);
            } else if let Some(rest) = arg.strip_prefix("--attempts=") {
                attempts = Some(parse_count(rest, "attempts")?);
            } else {
                return Err(format!("Unknown digits option '{arg}'"));
            }
        }

        Ok(Self {
            length: length.unwrap_or(DEFAULT_LENGTH).clamp(MIN_LENGTH, MAX_LENGTH),
            attempts: attempts
                .unwrap_or(DEFAULT_ATTEMPTS)
                .clamp(MIN_ATTEMPTS, MAX_ATTEMPTS),
        })
    }
}

impl Default for DigitsConfig
{
    fn default() -> Self
    {
        Self {
            length: DEFAULT_LENGTH,
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

fn parse_count(value: &str, what: &str) -> Result<usize, String>
{
    let parsed = value
        .parse::<usize>()
        .map_err(|_| format!("{what} must be a number"))?;
    if parsed == 0 {
        return Err(format!("{what} must be positive"));
    }
    Ok(parsed)
}

pub fn run_with_config(config: DigitsConfig) -> Result<(), String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = thread_rng();
    let mut round = Round::new(config.length, config.attempts, &mut rng);
    log::debug!("digits target: {}", round.target());

    let mut input = String::new();
    let mut message: Option<String> = None;

    draw_ui(term.stdout(), &round, &input, &message)?;
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
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Enter => {
                    if !round.is_over() {
                        match round.submit(&input) {
                            Ok(_) => {
                                input.clear();
                                message = None;
                            }
                            Err(err) => message = Some(err),
                        }
                    }
                }
                KeyCode::Char(ch) => {
                    if ch.eq_ignore_ascii_case(&'n') && round.is_over() {
                        round.restart(&mut rng);
                        log::debug!("digits target: {}", round.target());
                        input.clear();
                        message = None;
                    } else if ch.is_ascii_digit()
                        && !round.is_over()
                        && input.len() < round.length()
                    {
                        input.push(ch);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        draw_ui(term.stdout(), &round, &input, &message)?;
    }
}

fn draw_ui(
    stdout: &mut Stdout,
    round: &Round,
    input: &str,
    message: &Option<String>,
) -> Result<(), String>
{
    let mut lines = Vec::new();
    lines.push("Match Games - Digits".to_string());
    lines.push(format!(
        "Attempts: {}/{}  Guess the {}-digit number",
        round.attempts_used(),
        round.max_attempts(),
        round.length()
    ));
    lines.push(String::new());

    for attempt in round.history() {
        lines.push(render_attempt(attempt));
    }
    if !round.is_over() {
        lines.push(render_input_row(input, round.length()));
    }

    lines.push(String::new());
    lines.push(status_line(round));
    if let Some(msg) = message {
        lines.push(msg.clone());
    }
    lines.push(help_line(round).to_string());

    let output = format!("{}\r\n", lines.join("\r\n"));
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))
        .map_err(|err| err.to_string())?;
    stdout.write_all(output.as_bytes()).map_err(|err| err.to_string())?;
    stdout.flush().map_err(|err| err.to_string())?;
    Ok(())
}

fn render_attempt(attempt: &Attempt) -> String
{
    let mut row = String::new();
    for (ch, state) in attempt.guess.chars().zip(attempt.states.iter()) {
        let color = match state {
            DigitState::Correct => Rgb { r: 0, g: 150, b: 70 },
            DigitState::Present => Rgb { r: 180, g: 130, b: 0 },
            DigitState::Absent => Rgb { r: 110, g: 110, b: 110 },
        };
        row.push_str(&format!("{} {} {}", ansi_bg(color), ch, ANSI_RESET));
    }
    row
}

fn render_input_row(input: &str, length: usize) -> String
{
    if input.is_empty() {
        return "(type a guess)".to_string();
    }
    let cell = Rgb { r: 40, g: 40, b: 40 };
    let mut row = String::new();
    for ch in input.chars() {
        row.push_str(&format!("{} {} {}", ansi_bg(cell), ch, ANSI_RESET));
    }
    for _ in input.len()..length {
        row.push_str(&format!("{} _ {}", ansi_bg(cell), ANSI_RESET));
    }
    row
}

fn status_line(round: &Round) -> String
{
    match round.status() {
        RoundStatus::Won => format!(
            "Congratulations! You guessed the number in {} attempts!",
            round.attempts_used()
        ),
        RoundStatus::Lost => format!("Game over! The number was {}.", round.target()),
        RoundStatus::InProgress if round.attempts_used() == 0 => {
            "Focus and guess the number!".to_string()
        }
        RoundStatus::InProgress => "Keep going! You're getting closer!".to_string(),
    }
}

fn help_line(round: &Round) -> &'static str
{
    if round.is_over() {
        "Press N to restart. Esc quits."
    } else {
        "Type digits. Enter submits. Backspace edits. Esc quits."
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::DigitState::{Absent as A, Correct as C, Present as P};

    #[test_case("12345", "15243", &[C, P, P, P, P]; "displaced digits are present")]
    #[test_case("11111", "21111", &[A, C, C, C, C]; "digit missing from target is absent")]
    #[test_case("12345", "12345", &[C, C, C, C, C]; "exact match is all correct")]
    #[test_case("12345", "67890", &[A, A, A, A, A]; "disjoint digits are all absent")]
    #[test_case("10203", "00000", &[P, C, P, C, P]; "repeated guess digit scored per position")]
    fn scores_per_position(target: &str, guess: &str, expected: &[DigitState])
    {
        assert_eq!(score_guess(target, guess), expected);
    }

    #[test]
    fn score_length_matches_target_length()
    {
        assert_eq!(score_guess("123", "321").len(), 3);
        assert_eq!(score_guess("1234567", "7654321").len(), 7);
    }

    #[test]
    fn rejects_malformed_guesses_without_consuming_attempts()
    {
        let mut round = Round::with_target("12345".to_string(), 6);
        for bad in ["12a45", "1234", "123456", "", "12 45"] {
            assert!(round.submit(bad).is_err(), "accepted {bad:?}");
        }
        assert_eq!(round.attempts_used(), 0);
        assert_eq!(round.status(), RoundStatus::InProgress);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed()
    {
        let mut round = Round::with_target("12345".to_string(), 6);
        assert_eq!(round.submit(" 12345 "), Ok(RoundStatus::Won));
    }

    #[test]
    fn winning_guess_ends_the_round()
    {
        let mut round = Round::with_target("12345".to_string(), 6);
        assert_eq!(round.submit("54321"), Ok(RoundStatus::InProgress));
        assert_eq!(round.submit("12345"), Ok(RoundStatus::Won));
        assert!(round.is_over());
        assert!(round.submit("12345").is_err());
        assert_eq!(round.attempts_used(), 2);
    }

    #[test]
    fn exhausting_attempts_loses_the_round()
    {
        let mut round = Round::with_target("12345".to_string(), 6);
        for _ in 0..5 {
            assert_eq!(round.submit("00000"), Ok(RoundStatus::InProgress));
        }
        assert_eq!(round.submit("00000"), Ok(RoundStatus::Lost));
        assert!(round.submit("12345").is_err());
        assert_eq!(round.attempts_used(), round.max_attempts());
        assert_eq!(round.target(), "12345");
    }

    #[test]
    fn history_is_append_only_and_ordered()
    {
        let mut round = Round::with_target("12345".to_string(), 6);
        round.submit("11111").expect("valid guess");
        round.submit("22222").expect("valid guess");
        let guesses: Vec<&str> = round.history().iter().map(|a| a.guess.as_str()).collect();
        assert_eq!(guesses, vec!["11111", "22222"]);
    }

    #[test]
    fn restart_resets_the_round()
    {
        let mut rng = thread_rng();
        let mut round = Round::with_target("12345".to_string(), 3);
        for _ in 0..3 {
            round.submit("00000").expect("valid guess");
        }
        assert_eq!(round.status(), RoundStatus::Lost);

        round.restart(&mut rng);
        assert_eq!(round.status(), RoundStatus::InProgress);
        assert_eq!(round.attempts_used(), 0);
        assert!(round.history().is_empty());
        assert_eq!(round.length(), 5);
        assert!(round.target().chars().all(|ch| ch.is_ascii_digit()));
    }

    #[test]
    fn random_targets_are_well_formed()
    {
        let mut rng = thread_rng();
        for length in MIN_LENGTH..=MAX_LENGTH {
            let target = random_target(length, &mut rng);
            assert_eq!(target.len(), length);
            assert!(target.chars().all(|ch| ch.is_ascii_digit()));
        }
    }

    #[test]
    fn config_clamps_out_of_range_values()
    {
        let args: Vec<String> = vec!["--length=99".into(), "--attempts=99".into()];
        let config = DigitsConfig::from_args(&args).expect("valid args");
        assert_eq!(config.length, MAX_LENGTH);
        assert_eq!(config.attempts, MAX_ATTEMPTS);
    }

    #[test]
    fn config_rejects_unknown_options()
    {
        let args: Vec<String> = vec!["--bogus".into()];
        assert!(DigitsConfig::from_args(&args).is_err());
    }
}
