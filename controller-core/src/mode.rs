//! Game mode identifiers and the mode selector.

use heapless::Vec;

use crate::config::{Config, GameModeConfig, MAX_GAME_MODES};
use crate::types::{Buttons, InputState};

/// A game mode: the button layout profile for one target game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GameModeId {
    Melee = 0,
    ProjectM = 1,
    Ultimate = 2,
    Fgc = 3,
    RivalsOfAether = 4,
}

impl TryFrom<u8> for GameModeId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Melee),
            1 => Ok(Self::ProjectM),
            2 => Ok(Self::Ultimate),
            3 => Ok(Self::Fgc),
            4 => Ok(Self::RivalsOfAether),
            other => Err(other),
        }
    }
}

/// A button combination that forces a game mode while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActivationBinding {
    pub buttons: Buttons,
    pub mode: GameModeId,
}

/// Result of one selection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeSelection {
    /// Active mode after this step.
    pub mode: GameModeId,
    /// `true` if this step changed the active mode (including the first
    /// assignment out of the unset state).
    pub changed: bool,
}

/// Decides which game mode is active.
///
/// Starts unset. The first selection, made at boot, assigns the configured
/// default mode unless a binding is already held. A held binding switches to its mode,
/// and the mode then sticks after release until another binding is held.
/// When several bindings are held the first registered one wins.
#[derive(Debug, Default)]
pub struct ModeSelector {
    bindings: Vec<ActivationBinding, MAX_GAME_MODES>,
    current: Option<GameModeId>,
}

impl ModeSelector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
            current: None,
        }
    }

    /// Register the activation bindings of `game_modes`, in order.
    ///
    /// Replaces any previous registration. Modes without a binding are
    /// skipped: an empty combination would always be held.
    pub fn register_bindings(&mut self, game_modes: &[GameModeConfig]) {
        self.bindings.clear();
        for gm in game_modes {
            if gm.activation_binding.is_empty() {
                continue;
            }
            let binding = ActivationBinding {
                buttons: gm.activation_binding,
                mode: gm.mode,
            };
            if self.bindings.push(binding).is_err() {
                warn!("Too many activation bindings, ignoring {:?}", gm.mode);
                break;
            }
        }
        debug!("Registered {} activation bindings", self.bindings.len());
    }

    /// Registered bindings in priority order.
    #[must_use]
    pub fn bindings(&self) -> &[ActivationBinding] {
        &self.bindings
    }

    /// Active mode, or `None` before the first selection.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<GameModeId> {
        self.current
    }

    /// Run one selection step against the current input.
    pub fn select(&mut self, inputs: &InputState, config: &Config) -> ModeSelection {
        let held = self
            .bindings
            .iter()
            .find(|b| inputs.buttons.contains(b.buttons))
            .map(|b| b.mode);

        let next = match (held, self.current) {
            (Some(mode), _) => mode,
            (None, Some(mode)) => mode,
            (None, None) => config.default_mode,
        };

        let changed = self.current != Some(next);
        self.current = Some(next);
        ModeSelection {
            mode: next,
            changed,
        }
    }
}
