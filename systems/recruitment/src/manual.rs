//! Manual entry of combatant stats through a line-oriented input source.

use skirmish_core::{CombatantProfile, Health, Speed, Stealth, Strength, Traits};
use tracing::warn;

/// Answers that fail to parse are asked again at most this many times in total.
pub const MAX_ATTEMPTS: usize = 3;

/// Source of answers to prompts, one line at a time.
pub trait LineInput {
    /// Shows `prompt` and returns the next answer, or `None` when input ended.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Walks through every editable field of a combatant.
///
/// Empty answers keep the current value. Numbers are clamped by the attribute
/// types, never rejected; an answer that is not a number is asked again until
/// [`MAX_ATTEMPTS`] is reached, after which the current value is kept.
#[derive(Debug)]
pub struct ManualEntry<'a, I: ?Sized> {
    input: &'a mut I,
}

impl<'a, I: LineInput + ?Sized> ManualEntry<'a, I> {
    /// Creates an entry session reading from `input`.
    pub fn new(input: &'a mut I) -> Self {
        Self { input }
    }

    /// Prompts for each field of `current` and returns the edited profile.
    pub fn edit(&mut self, current: &CombatantProfile) -> CombatantProfile {
        let name = self.text("name", current.name.as_deref());
        let health = Health::new(self.number("health", current.health.get()));
        let strength = Strength::new(self.number("strength", current.strength.get()));
        let speed = Speed::new(self.number("speed", current.speed.get()));

        let traits = match current.traits {
            Traits::Hobbit { stealth } => Traits::Hobbit {
                stealth: Stealth::new(self.number("stealth", stealth.get())),
            },
            Traits::Wizard { stealth } => Traits::Wizard {
                stealth: Stealth::new(self.number("stealth", stealth.get())),
            },
            Traits::Orc { has_axe, has_fury } => Traits::Orc {
                has_axe: self.flag("axe", has_axe),
                has_fury: self.flag("fury", has_fury),
            },
            Traits::Nazgul {
                has_ring_of_power,
                has_hell_hawks,
            } => Traits::Nazgul {
                has_ring_of_power: self.flag("ring of power", has_ring_of_power),
                has_hell_hawks: self.flag("hell hawks", has_hell_hawks),
            },
        };

        CombatantProfile {
            name,
            health,
            strength,
            speed,
            traits,
        }
    }

    fn text(&mut self, label: &str, current: Option<&str>) -> Option<String> {
        let prompt = format!("{label} [{}]: ", current.unwrap_or(""));
        match self.input.read_line(&prompt) {
            Some(answer) if !answer.trim().is_empty() => Some(answer.trim().to_owned()),
            _ => current.map(str::to_owned),
        }
    }

    fn number(&mut self, label: &str, current: f64) -> f64 {
        self.ask(label, &current.to_string(), |answer| {
            answer.parse::<f64>().ok().filter(|value| value.is_finite())
        })
        .unwrap_or(current)
    }

    fn flag(&mut self, label: &str, current: bool) -> bool {
        self.ask(label, if current { "yes" } else { "no" }, parse_flag)
            .unwrap_or(current)
    }

    fn ask<T>(
        &mut self,
        label: &str,
        shown: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let prompt = format!("{label} [{shown}]: ");
        for attempt in 1..=MAX_ATTEMPTS {
            let answer = self.input.read_line(&prompt)?;
            let answer = answer.trim();
            if answer.is_empty() {
                return None;
            }
            if let Some(value) = parse(answer) {
                return Some(value);
            }
            warn!(field = label, attempt, answer, "could not parse answer");
        }
        None
    }
}

/// Parses `true/false/yes/no/y/n`, ignoring case.
#[must_use]
pub fn parse_flag(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" => Some(true),
        "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
