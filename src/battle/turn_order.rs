// In: src/battle/turn_order.rs

use crate::character::Character;
use std::cmp::Ordering;
use std::rc::Rc;

/// Decides who acts when within a round. Only living characters are returned.
pub trait TurnOrder {
    fn order(&self, players: &[Rc<Character>], enemies: &[Rc<Character>]) -> Vec<Rc<Character>>;
}

fn living<'a>(
    players: &'a [Rc<Character>],
    enemies: &'a [Rc<Character>],
) -> impl Iterator<Item = &'a Rc<Character>> {
    players.iter().chain(enemies).filter(|c| c.is_alive())
}

/// Living players in list order, then living enemies in list order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PartyOrder;

impl TurnOrder for PartyOrder {
    fn order(&self, players: &[Rc<Character>], enemies: &[Rc<Character>]) -> Vec<Rc<Character>> {
        living(players, enemies).cloned().collect()
    }
}

/// Living characters stably sorted by a comparator; equal characters keep
/// party order (players before enemies).
pub struct InitiativeOrder {
    compare: Box<dyn Fn(&Character, &Character) -> Ordering>,
}

impl InitiativeOrder {
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&Character, &Character) -> Ordering + 'static,
    {
        Self {
            compare: Box::new(compare),
        }
    }

    /// Highest agility first.
    pub fn by_agility() -> Self {
        Self::new(|a, b| b.stats().agility().cmp(&a.stats().agility()))
    }
}

impl Default for InitiativeOrder {
    fn default() -> Self {
        Self::by_agility()
    }
}

impl TurnOrder for InitiativeOrder {
    fn order(&self, players: &[Rc<Character>], enemies: &[Rc<Character>]) -> Vec<Rc<Character>> {
        let mut order: Vec<Rc<Character>> = living(players, enemies).cloned().collect();
        order.sort_by(|a, b| (self.compare)(a.as_ref(), b.as_ref()));
        order
    }
}
