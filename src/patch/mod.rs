//! Persisted parameter state.
//!
//! Only the three parameter values are stored. Oscillator and filter state
//! never leave the engine, so a loaded patch always starts from silence.

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::synth::{
    params::{ParamSnapshot, SharedParams},
    poly::PolySynth,
    sound::SoundFilter,
};

/// Bumped whenever the stored layout changes.
pub const PATCH_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchState {
    pub version: u32,
    #[serde(rename = "gain")]
    pub gain_db: f32,
    #[serde(rename = "pulseWidth")]
    pub pulse_width: f32,
    #[serde(rename = "filterCutoff")]
    pub filter_amount: f32,
}

#[derive(Debug)]
pub enum StateError {
    /// Bytes were not a valid patch document.
    Json(serde_json::Error),
    /// Written by a layout this build does not understand.
    UnsupportedVersion(u32),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Json(err) => write!(f, "malformed patch state: {err}"),
            StateError::UnsupportedVersion(v) => {
                write!(f, "unsupported patch version {v} (expected {PATCH_VERSION})")
            }
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Json(err) => Some(err),
            StateError::UnsupportedVersion(_) => None,
        }
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Json(err)
    }
}

impl Default for PatchState {
    fn default() -> Self {
        ParamSnapshot::default().into()
    }
}

impl From<ParamSnapshot> for PatchState {
    fn from(snapshot: ParamSnapshot) -> Self {
        Self {
            version: PATCH_VERSION,
            gain_db: snapshot.gain_db,
            pulse_width: snapshot.pulse_width,
            filter_amount: snapshot.filter_amount,
        }
    }
}

impl From<PatchState> for ParamSnapshot {
    fn from(state: PatchState) -> Self {
        Self {
            gain_db: state.gain_db,
            pulse_width: state.pulse_width,
            filter_amount: state.filter_amount,
        }
    }
}

impl PatchState {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StateError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse and version-check. Values are not range-checked here; they are
    /// constrained when applied to [`SharedParams`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        let state: PatchState = serde_json::from_slice(bytes)?;
        if state.version != PATCH_VERSION {
            return Err(StateError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }

    pub fn capture(params: &SharedParams) -> Self {
        params.snapshot().into()
    }

    /// Store into `params`, clamping and snapping each value.
    pub fn apply_to(&self, params: &SharedParams) {
        params.apply((*self).into());
    }
}

impl<S: SoundFilter> PolySynth<S> {
    pub fn save_state(&self) -> Result<Vec<u8>, StateError> {
        let state = PatchState::capture(self.params());
        let bytes = state.to_bytes()?;
        debug!("saved patch state ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Restore parameters from `bytes`.
    ///
    /// On any error the parameters are reset to their defaults and the error
    /// is returned for the caller to report.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        match PatchState::from_bytes(bytes) {
            Ok(state) => {
                state.apply_to(self.params());
                debug!("loaded patch state {state:?}");
                Ok(())
            }
            Err(err) => {
                warn!("rejected patch state, using defaults: {err}");
                self.params().reset_to_defaults();
                Err(err)
            }
        }
    }
}
