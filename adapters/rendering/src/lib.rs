#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for skirmish adapters.
//!
//! The simulation never draws anything itself. Adapters implement
//! [`PositionSink`] and feed world events through a [`Presenter`], which turns
//! them into placement, animation and removal requests.

use std::{collections::BTreeMap, time::Duration};

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use skirmish_core::{
    AvatarColor, AvatarDescriptor, BattleView, CombatantId, CombatantKind, CombatantSnapshot,
    Event, Position, SideId,
};

/// Amount hidden combatants are faded towards white.
pub const HIDDEN_FADE: f32 = 0.6;

/// RGBA color used when presenting combatants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

impl From<AvatarColor> for Color {
    fn from(color: AvatarColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Converts a battlefield position into presentation space.
#[must_use]
pub fn to_screen(position: Position) -> Vec2 {
    Vec2::new(position.x() as f32, position.y() as f32)
}

/// Everything a presentation layer needs to draw one combatant.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayDescriptor {
    /// Identifier allocated by the world.
    pub id: CombatantId,
    /// Side the combatant fights for.
    pub side: SideId,
    /// Variant of the combatant.
    pub kind: CombatantKind,
    /// Display name.
    pub name: String,
    /// Current health.
    pub health: f64,
    /// Current strength.
    pub strength: f64,
    /// Current speed.
    pub speed: f64,
    /// Current location.
    pub position: Vec2,
    /// Whether opponents can currently target the combatant.
    pub visible: bool,
    /// Shape and size of the avatar.
    pub avatar: AvatarDescriptor,
    /// Fill color, faded when the combatant is hidden.
    pub color: Color,
}

impl DisplayDescriptor {
    /// Builds the descriptor for a combatant snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &CombatantSnapshot) -> Self {
        let avatar = snapshot.avatar();
        let visible = snapshot.is_visible();
        let color = Color::from(avatar.color);

        Self {
            id: snapshot.id,
            side: snapshot.side,
            kind: snapshot.kind(),
            name: snapshot.name.clone(),
            health: snapshot.health.get(),
            strength: snapshot.strength.get(),
            speed: snapshot.speed.get(),
            position: to_screen(snapshot.position),
            visible,
            avatar,
            color: if visible {
                color
            } else {
                color.lighten(HIDDEN_FADE)
            },
        }
    }
}

/// Receives presentation requests for combatants.
///
/// Implementations own every on-screen object. Completion of an animation is
/// reported back to the world as `Command::CompleteMovement` by whoever drives
/// the sink, or left to the world's own clock.
pub trait PositionSink {
    /// Shows a combatant, or refreshes it when it is already shown.
    fn show(&mut self, descriptor: &DisplayDescriptor) -> AnyResult<()>;

    /// Animates a shown combatant towards `target` over `duration`.
    fn animate_to(
        &mut self,
        combatant: CombatantId,
        target: Vec2,
        duration: Duration,
    ) -> AnyResult<()>;

    /// Removes a combatant from the presentation.
    fn hide(&mut self, combatant: CombatantId) -> AnyResult<()>;
}

/// Forwards world events to a [`PositionSink`].
#[derive(Debug, Default)]
pub struct Presenter {
    shown: BTreeMap<CombatantId, SideId>,
}

impl Presenter {
    /// Creates a presenter with nothing shown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of combatants currently shown.
    #[must_use]
    pub fn shown(&self) -> usize {
        self.shown.len()
    }

    /// Translates a batch of events using the battle view captured after it.
    pub fn present<S>(
        &mut self,
        events: &[Event],
        battle: &BattleView,
        sink: &mut S,
    ) -> AnyResult<()>
    where
        S: PositionSink + ?Sized,
    {
        for event in events {
            match event {
                Event::CombatantEnlisted { combatant, .. }
                | Event::CombatantRestored { combatant, .. }
                | Event::CombatantEdited { combatant } => {
                    self.show(*combatant, battle, sink)?;
                }
                Event::CombatResolved {
                    attacker, defender, ..
                } => {
                    self.refresh(*attacker, battle, sink)?;
                    self.refresh(*defender, battle, sink)?;
                }
                Event::MovementStarted {
                    combatant,
                    to,
                    duration,
                    ..
                } => {
                    if self.shown.contains_key(combatant) {
                        sink.animate_to(*combatant, to_screen(*to), *duration)
                            .with_context(|| {
                                format!("failed to animate combatant {}", combatant.get())
                            })?;
                    }
                }
                Event::CombatantDied { combatant, .. } => self.hide(*combatant, sink)?,
                Event::SideCleared { side } => {
                    let cleared: Vec<CombatantId> = self
                        .shown
                        .iter()
                        .filter(|(_, owner)| *owner == side)
                        .map(|(id, _)| *id)
                        .collect();
                    for combatant in cleared {
                        self.hide(combatant, sink)?;
                    }
                }
                Event::BattleRestored => {
                    let everyone: Vec<CombatantId> = self.shown.keys().copied().collect();
                    for combatant in everyone {
                        self.hide(combatant, sink)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn show<S>(
        &mut self,
        combatant: CombatantId,
        battle: &BattleView,
        sink: &mut S,
    ) -> AnyResult<()>
    where
        S: PositionSink + ?Sized,
    {
        // Combatants that already fell within the same batch have no snapshot.
        let Some(snapshot) = battle.combatant(combatant) else {
            return Ok(());
        };

        sink.show(&DisplayDescriptor::from_snapshot(snapshot))
            .with_context(|| format!("failed to show combatant {}", combatant.get()))?;
        let _ = self.shown.insert(combatant, snapshot.side);
        Ok(())
    }

    fn refresh<S>(
        &mut self,
        combatant: CombatantId,
        battle: &BattleView,
        sink: &mut S,
    ) -> AnyResult<()>
    where
        S: PositionSink + ?Sized,
    {
        if self.shown.contains_key(&combatant) {
            self.show(combatant, battle, sink)?;
        }
        Ok(())
    }

    fn hide<S>(&mut self, combatant: CombatantId, sink: &mut S) -> AnyResult<()>
    where
        S: PositionSink + ?Sized,
    {
        if self.shown.remove(&combatant).is_some() {
            sink.hide(combatant)
                .with_context(|| format!("failed to hide combatant {}", combatant.get()))?;
        }
        Ok(())
    }
}
