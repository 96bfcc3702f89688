pub mod common;

#[cfg(test)]
mod test_damage;


#[cfg(test)]
mod test_cooldowns;



#[cfg(test)]
mod test_battle;
