//! Terminal collaborators: line input, a logging position sink and the
//! interactive control shell.

use std::{
    io::{self, BufRead, Write},
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec2;
use skirmish_core::{BattleView, CombatantId, KindSelection};
use skirmish_rendering::{DisplayDescriptor, PositionSink};
use skirmish_system_recruitment::LineInput;
use tracing::{debug, warn};

use crate::simulator::Simulator;

/// Line input backed by a reader, prompting on a writer.
pub(crate) struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub(crate) fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> LineInput for Prompter<R, W> {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if write!(self.writer, "{prompt}")
            .and_then(|()| self.writer.flush())
            .is_err()
        {
            return None;
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_owned()),
            Err(error) => {
                warn!(%error, "failed to read input");
                None
            }
        }
    }
}

/// Prompter over the process's standard streams.
pub(crate) fn stdio() -> Prompter<io::StdinLock<'static>, io::Stdout> {
    Prompter::new(io::stdin().lock(), io::stdout())
}

/// Position sink that reports presentation requests through tracing.
#[derive(Debug, Default)]
pub(crate) struct LogSink;

impl PositionSink for LogSink {
    fn show(&mut self, descriptor: &DisplayDescriptor) -> Result<()> {
        debug!(
            combatant = descriptor.id.get(),
            name = %descriptor.name,
            kind = descriptor.kind.label(),
            health = descriptor.health,
            x = descriptor.position.x,
            y = descriptor.position.y,
            visible = descriptor.visible,
            size = descriptor.avatar.size,
            "show"
        );
        Ok(())
    }

    fn animate_to(
        &mut self,
        combatant: CombatantId,
        target: Vec2,
        duration: Duration,
    ) -> Result<()> {
        debug!(
            combatant = combatant.get(),
            x = target.x,
            y = target.y,
            secs = duration.as_secs_f64(),
            "animate"
        );
        Ok(())
    }

    fn hide(&mut self, combatant: CombatantId) -> Result<()> {
        debug!(combatant = combatant.get(), "hide");
        Ok(())
    }
}

const HELP: &str = "\
commands:
  populate <side> <kind|random> <count>
  run | suspend | clear
  suspend-side <side> | resume-side <side> | clear-side <side>
  step <seconds> | play
  edit <id>
  save | restore
  status | help | quit";

/// One line of the control shell.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ShellCommand {
    Populate {
        side: String,
        selection: KindSelection,
        count: usize,
    },
    Run,
    Suspend,
    SuspendSide(String),
    ResumeSide(String),
    Clear,
    ClearSide(String),
    Step(Duration),
    Play,
    Edit(CombatantId),
    Save,
    Restore,
    Status,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parses a non-empty line; blank lines yield `None`.
    pub(crate) fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let mut arg = |name: &str| {
            words
                .next()
                .map(str::to_owned)
                .ok_or_else(|| anyhow!("`{verb}` expects <{name}>"))
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "populate" => {
                let side = arg("side")?;
                let selection = arg("kind")?.parse::<KindSelection>()?;
                let count = arg("count")?
                    .parse::<usize>()
                    .context("count must be a whole number")?;
                Self::Populate {
                    side,
                    selection,
                    count,
                }
            }
            "run" => Self::Run,
            "suspend" => Self::Suspend,
            "suspend-side" => Self::SuspendSide(arg("side")?),
            "resume-side" => Self::ResumeSide(arg("side")?),
            "clear" => Self::Clear,
            "clear-side" => Self::ClearSide(arg("side")?),
            "step" => {
                let secs = arg("seconds")?
                    .parse::<f64>()
                    .context("seconds must be a number")?;
                Self::Step(Duration::try_from_secs_f64(secs).context("seconds out of range")?)
            }
            "play" => Self::Play,
            "edit" => {
                let id = arg("id")?
                    .parse::<u32>()
                    .context("id must be a whole number")?;
                Self::Edit(CombatantId::new(id))
            }
            "save" => Self::Save,
            "restore" => Self::Restore,
            "status" => Self::Status,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command `{other}`; try `help`"),
        };
        Ok(Some(command))
    }
}

/// Reads commands until input ends or `quit` is entered.
pub(crate) fn run_shell<S, I>(sim: &mut Simulator<S>, input: &mut I) -> Result<()>
where
    S: PositionSink,
    I: LineInput + ?Sized,
{
    println!("{HELP}");
    while let Some(line) = input.read_line("> ") {
        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                eprintln!("{error:#}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(error) = dispatch(sim, input, command) {
            eprintln!("{error:#}");
        }
    }
    Ok(())
}

fn dispatch<S, I>(sim: &mut Simulator<S>, input: &mut I, command: ShellCommand) -> Result<()>
where
    S: PositionSink,
    I: LineInput + ?Sized,
{
    match command {
        ShellCommand::Populate {
            side,
            selection,
            count,
        } => {
            let side = sim.resolve_side(&side)?;
            sim.populate(side, selection, count)
        }
        ShellCommand::Run => sim.run(),
        ShellCommand::Suspend => sim.suspend(),
        ShellCommand::SuspendSide(side) => {
            let side = sim.resolve_side(&side)?;
            sim.suspend_side(side)
        }
        ShellCommand::ResumeSide(side) => {
            let side = sim.resolve_side(&side)?;
            sim.resume_side(side)
        }
        ShellCommand::Clear => sim.clear(),
        ShellCommand::ClearSide(side) => {
            let side = sim.resolve_side(&side)?;
            sim.clear_side(side)
        }
        ShellCommand::Step(span) => sim.step(span),
        ShellCommand::Play => {
            let state = sim.play_out()?;
            println!("{state:?}");
            Ok(())
        }
        ShellCommand::Edit(id) => sim.edit(id, input),
        ShellCommand::Save => sim.save(),
        ShellCommand::Restore => sim.restore(),
        ShellCommand::Status => {
            print!("{}", status(&sim.view(), sim.elapsed()));
            Ok(())
        }
        ShellCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        ShellCommand::Quit => Ok(()),
    }
}

/// Renders the battle as a plain-text table.
pub(crate) fn status(view: &BattleView, elapsed: Duration) -> String {
    let mut out = format!("{:?} at {:.1}s\n", view.state(), elapsed.as_secs_f64());
    for side in view.sides() {
        let paused = if side.suspended { " (suspended)" } else { "" };
        out.push_str(&format!("{}{paused}: {} standing\n", side.name, side.roster.len()));
        for combatant in side.roster.iter() {
            out.push_str(&format!(
                "  #{:<4} {:<12} {:<7} hp {:>5.1} str {:>5.1} spd {:>5.1} at ({:.0}, {:.0}){}\n",
                combatant.id.get(),
                combatant.name,
                combatant.kind().label(),
                combatant.health.get(),
                combatant.strength.get(),
                combatant.speed.get(),
                combatant.position.x(),
                combatant.position.y(),
                if combatant.is_visible() { "" } else { " hidden" },
            ));
        }
    }
    out
}
