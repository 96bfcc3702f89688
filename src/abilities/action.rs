// In: src/abilities/action.rs

use crate::character::Character;
use crate::errors::{ActionError, ActionResult, BusResult};
use crate::events::{EventBus, Notification, Payload};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// The concrete behavior behind an ability. Effects never touch character
/// state directly; they publish `Damage`, `Heal` or `EnergyRestore` and the
/// owning properties apply them.
pub trait AbilityEffect {
    fn name(&self) -> &str;

    fn energy_cost(&self) -> u32;

    /// Rounds the ability stays blocked after use.
    fn cooldown(&self) -> u32 {
        0
    }

    fn priority(&self) -> i32 {
        0
    }

    /// Default rule: the source is alive, can pay, and every target is alive.
    fn is_available(&self, source: &Character, targets: &[Rc<Character>]) -> bool {
        source.is_alive()
            && source.energy().can_afford(self.energy_cost())
            && targets.iter().all(|t| t.is_alive())
    }

    fn apply(&self, bus: &EventBus, source: &Character, targets: &[Rc<Character>]) -> BusResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Unexecuted,
    Executed,
}

/// One use of an ability by one source against a target list. Runs at most once.
pub struct Action {
    name: String,
    effect: Box<dyn AbilityEffect>,
    source: Rc<Character>,
    targets: Vec<Rc<Character>>,
    state: ActionState,
}

impl Action {
    /// `name` is the registry name, which is what cooldowns and notifications use.
    pub fn new(name: impl Into<String>, effect: Box<dyn AbilityEffect>, source: Rc<Character>) -> Self {
        Self {
            name: name.into(),
            effect,
            source,
            targets: Vec::new(),
            state: ActionState::Unexecuted,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn energy_cost(&self) -> u32 {
        self.effect.energy_cost()
    }

    pub fn cooldown(&self) -> u32 {
        self.effect.cooldown()
    }

    pub fn priority(&self) -> i32 {
        self.effect.priority()
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn source(&self) -> &Rc<Character> {
        &self.source
    }

    pub fn targets(&self) -> &[Rc<Character>] {
        &self.targets
    }

    pub fn set_targets(&mut self, targets: Vec<Rc<Character>>) {
        self.targets = targets;
    }

    pub fn add_target(&mut self, target: Rc<Character>) {
        self.targets.push(target);
    }

    pub fn is_available(&self) -> bool {
        self.effect.is_available(&self.source, &self.targets)
    }

    /// Spends the energy cost, runs the effect, then announces `AbilityUsed`
    /// with the cooldown length.
    pub fn execute(&mut self) -> ActionResult<()> {
        let ability = self.name.clone();
        if self.state == ActionState::Executed {
            return Err(ActionError::AlreadyExecuted { ability });
        }
        if self.targets.is_empty() {
            return Err(ActionError::NoTarget { ability });
        }
        if !self.is_available() {
            return Err(ActionError::Unavailable { ability });
        }
        self.state = ActionState::Executed;

        let bus = self.source.bus();
        let character = self.source.id();
        let cost = self.effect.energy_cost();
        if cost > 0 {
            bus.publish(&Notification::broadcast(Payload::EnergySpent {
                character,
                amount: cost,
                reason: ability.clone(),
            }))?;
        }

        self.effect.apply(bus, &self.source, &self.targets)?;

        debug!(
            character = %self.source.name(),
            ability = %ability,
            targets = self.targets.len(),
            "Ability executed"
        );
        bus.publish(&Notification::broadcast(Payload::AbilityUsed {
            character,
            ability,
            cooldown: self.effect.cooldown(),
        }))?;
        Ok(())
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("ability", &self.name)
            .field("source", &self.source.name())
            .field(
                "targets",
                &self.targets.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("state", &self.state)
            .finish()
    }
}
