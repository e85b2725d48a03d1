//! Game definition bundle
//!
//! A game is pure data: catalog, paytable, strips, paylines and the handful
//! of rules that differ between titles. One engine serves all of them.

use serde::{Deserialize, Serialize};

use crate::cascade::CascadeConfig;
use crate::config::GameRules;
use crate::error::ConfigError;
use crate::paytable::{Payline, Paytable, standard_20_paylines};
use crate::reels::{ReelSet, generate_balanced_strips};
use crate::symbols::{SymbolCatalog, SymbolId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDefinition {
    pub name: String,
    pub catalog: SymbolCatalog,
    pub paytable: Paytable,
    pub reels: ReelSet,
    pub paylines: Vec<Payline>,
    #[serde(default)]
    pub rules: GameRules,
}

impl GameDefinition {
    /// Number of reels (taken from the base strip set)
    pub fn reel_count(&self) -> usize {
        self.reels.base.len()
    }

    pub fn rows(&self) -> usize {
        self.rules.window_rows
    }

    pub fn scatter_id(&self) -> Option<SymbolId> {
        self.catalog.scatter_id()
    }

    pub fn is_cascading(&self) -> bool {
        self.rules.cascade.is_some()
    }

    /// Check every data invariant once, at load time
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.catalog.validate()?;
        self.rules.validate()?;

        let reel_count = self.reel_count();
        if reel_count == 0 {
            return Err(ConfigError::InvalidRule("game has no reels".into()));
        }
        self.reels
            .validate(&self.catalog, reel_count, self.rules.window_rows)?;
        self.paytable.validate(&self.catalog, reel_count)?;

        if self.paylines.is_empty() {
            return Err(ConfigError::InvalidRule("game defines no paylines".into()));
        }
        for (line, payline) in self.paylines.iter().enumerate() {
            payline.validate(line, reel_count, self.rules.window_rows)?;
        }

        if self.rules.scatter_bias && self.scatter_id().is_none() {
            return Err(ConfigError::MissingScatter);
        }
        Ok(())
    }

    /// Classic 5×3, 20 lines: ten regular symbols, a wild and a scatter
    pub fn classic_5x3() -> Self {
        let catalog = SymbolCatalog::standard();
        let base = generate_balanced_strips(&catalog, 5, 64);
        let bonus = generate_balanced_strips(&catalog, 5, 48);

        Self {
            name: "Classic 5x3".into(),
            paytable: standard_paytable(),
            reels: ReelSet::new(base).with_bonus(bonus),
            paylines: standard_20_paylines(),
            catalog,
            rules: GameRules::default(),
        }
    }

    /// Classic layout with tumbling reels
    pub fn cascading_5x3() -> Self {
        let mut game = Self::classic_5x3();
        game.name = "Cascading 5x3".into();
        game.rules.cascade = Some(CascadeConfig::default());
        game
    }
}

/// Paytable for [`SymbolCatalog::standard`]
fn standard_paytable() -> Paytable {
    Paytable::new()
        // High payers
        .with_pays(0, &[0.0, 0.0, 5.0, 50.0, 100.0, 1000.0])
        .with_pays(1, &[0.0, 0.0, 3.0, 30.0, 80.0, 500.0])
        .with_pays(2, &[0.0, 0.0, 2.0, 25.0, 60.0, 300.0])
        .with_pays(3, &[0.0, 0.0, 2.0, 20.0, 50.0, 200.0])
        // Low payers
        .with_pays(4, &[0.0, 0.0, 0.0, 10.0, 25.0, 100.0])
        .with_pays(5, &[0.0, 0.0, 0.0, 8.0, 20.0, 80.0])
        .with_pays(6, &[0.0, 0.0, 0.0, 5.0, 15.0, 60.0])
        .with_pays(7, &[0.0, 0.0, 0.0, 5.0, 10.0, 50.0])
        .with_pays(8, &[0.0, 0.0, 0.0, 4.0, 8.0, 40.0])
        .with_pays(9, &[0.0, 0.0, 0.0, 3.0, 6.0, 30.0])
        // Wild, scatter
        .with_pays(10, &[0.0, 0.0, 0.0, 50.0, 200.0, 1500.0])
        .with_pays(11, &[0.0, 0.0, 0.0, 2.0, 5.0, 20.0])
}
