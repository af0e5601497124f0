//! Player domain type.

use serde::Serialize;
use snake_shop_core::{Coins, CoinsError, ItemId};

/// Coins earned per full 10 points of score.
pub const COINS_PER_TEN_POINTS: u64 = 2;

/// Errors from equipping a skin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EquipError {
    #[error("skin not owned")]
    NotOwned,
}

/// The player's wallet and inventory.
///
/// Invariants: the balance never goes negative (it is a [`Coins`]), and the
/// equipped skin is always one of the owned skins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Player {
    balance: Coins,
    /// Owned skins in acquisition order.
    owned_skins: Vec<ItemId>,
    equipped_skin: ItemId,
    extra_lives: u32,
}

impl Player {
    /// A fresh player owning only the default skin.
    #[must_use]
    pub fn new(starting_balance: Coins) -> Self {
        let default_skin = ItemId::new(ItemId::DEFAULT_SKIN);
        Self {
            balance: starting_balance,
            owned_skins: vec![default_skin.clone()],
            equipped_skin: default_skin,
            extra_lives: 0,
        }
    }

    #[must_use]
    pub const fn balance(&self) -> Coins {
        self.balance
    }

    #[must_use]
    pub fn owned_skins(&self) -> &[ItemId] {
        &self.owned_skins
    }

    #[must_use]
    pub const fn equipped_skin(&self) -> &ItemId {
        &self.equipped_skin
    }

    #[must_use]
    pub const fn extra_lives(&self) -> u32 {
        self.extra_lives
    }

    /// Returns `true` if the player owns the skin `id`.
    #[must_use]
    pub fn owns(&self, id: &str) -> bool {
        self.owned_skins.iter().any(|s| s.as_str() == id)
    }

    /// Credit coins for a finished game and return how many were earned.
    ///
    /// # Errors
    ///
    /// Returns [`CoinsError::Overflow`] if the balance would overflow.
    pub fn earn_from_score(&mut self, score: u64) -> Result<Coins, CoinsError> {
        let earned = Coins::new((score / 10).saturating_mul(COINS_PER_TEN_POINTS));
        self.balance = self.balance.checked_add(earned)?;
        Ok(earned)
    }

    /// Equip an owned skin.
    ///
    /// # Errors
    ///
    /// Returns [`EquipError::NotOwned`] if the skin is not owned.
    pub fn equip(&mut self, id: &str) -> Result<(), EquipError> {
        let skin = self
            .owned_skins
            .iter()
            .find(|s| s.as_str() == id)
            .ok_or(EquipError::NotOwned)?;
        self.equipped_skin = skin.clone();
        Ok(())
    }

    /// Remove `amount` from the balance. Returns `false` (and leaves the
    /// balance untouched) if the balance does not cover it.
    #[must_use]
    pub fn debit(&mut self, amount: Coins) -> bool {
        match self.balance.checked_sub(amount) {
            Some(rest) => {
                self.balance = rest;
                true
            }
            None => false,
        }
    }

    /// Add a skin to the inventory. Returns `false` if it was already owned.
    pub fn grant_skin(&mut self, id: &ItemId) -> bool {
        if self.owns(id.as_str()) {
            return false;
        }
        self.owned_skins.push(id.clone());
        true
    }

    /// Equip a skin that was just granted.
    ///
    /// Silently ignored for skins that are not owned, so the equipped skin
    /// stays a member of the owned set.
    pub fn equip_granted(&mut self, id: &ItemId) {
        if self.owns(id.as_str()) {
            self.equipped_skin = id.clone();
        }
    }

    pub const fn add_extra_lives(&mut self, lives: u32) {
        self.extra_lives = self.extra_lives.saturating_add(lives);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_owns_and_equips_default() {
        let player = Player::new(Coins::new(200));
        assert_eq!(player.balance(), Coins::new(200));
        assert_eq!(player.owned_skins(), [ItemId::new("default")]);
        assert_eq!(player.equipped_skin().as_str(), "default");
        assert_eq!(player.extra_lives(), 0);
    }

    #[test]
    fn test_earn_from_score() {
        let mut player = Player::new(Coins::ZERO);
        assert_eq!(player.earn_from_score(95).unwrap(), Coins::new(18));
        assert_eq!(player.earn_from_score(9).unwrap(), Coins::ZERO);
        assert_eq!(player.balance(), Coins::new(18));
    }

    #[test]
    fn test_equip_requires_ownership() {
        let mut player = Player::new(Coins::ZERO);
        assert_eq!(player.equip("skin_gold"), Err(EquipError::NotOwned));
        assert_eq!(player.equipped_skin().as_str(), "default");

        player.grant_skin(&ItemId::new("skin_gold"));
        player.equip("skin_gold").unwrap();
        assert_eq!(player.equipped_skin().as_str(), "skin_gold");
    }

    #[test]
    fn test_debit_never_goes_negative() {
        let mut player = Player::new(Coins::new(40));
        assert!(!player.debit(Coins::new(50)));
        assert_eq!(player.balance(), Coins::new(40));
        assert!(player.debit(Coins::new(40)));
        assert_eq!(player.balance(), Coins::ZERO);
    }

    #[test]
    fn test_grant_skin_is_unique_and_ordered() {
        let mut player = Player::new(Coins::ZERO);
        assert!(player.grant_skin(&ItemId::new("skin_ice")));
        assert!(player.grant_skin(&ItemId::new("skin_fire")));
        assert!(!player.grant_skin(&ItemId::new("skin_ice")));
        assert_eq!(
            player.owned_skins(),
            [
                ItemId::new("default"),
                ItemId::new("skin_ice"),
                ItemId::new("skin_fire")
            ]
        );
    }

    #[test]
    fn test_player_wire_format() {
        let player = Player::new(Coins::new(200));
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Balance": 200,
                "OwnedSkins": ["default"],
                "EquippedSkin": "default",
                "ExtraLives": 0
            })
        );
    }
}
