//! src/app/reglages.rs
//!
//! Document de réglages (possédé par le shell, lu seulement ici).
//!
//! Clés lues : `angle_mode`, `decimal_places`, `history_enabled`.
//! Les autres (theme, fullscreen, calculation_mode…) sont ignorées.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noyau::format::DECIMALES_MAX;
use crate::noyau::trig::ModeAngle;

/// Précision par défaut (FIX 10).
pub const DECIMALES_DEFAUT: usize = 10;

#[derive(Debug, Error)]
pub enum ErreurReglages {
    #[error("lecture de {chemin} impossible : {source}")]
    Lecture {
        chemin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("réglages illisibles : {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reglages {
    pub angle_mode: ModeAngle,
    pub decimal_places: usize,
    pub history_enabled: bool,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            angle_mode: ModeAngle::Deg,
            decimal_places: DECIMALES_DEFAUT,
            history_enabled: true,
        }
    }
}

impl Reglages {
    /// Clés absentes = valeur par défaut ; précision bornée à [0, 15].
    pub fn depuis_json(texte: &str) -> Result<Self, ErreurReglages> {
        let mut r: Reglages = serde_json::from_str(texte)?;
        r.decimal_places = r.decimal_places.min(DECIMALES_MAX);
        Ok(r)
    }

    pub fn charger(chemin: &Path) -> Result<Self, ErreurReglages> {
        let texte = fs::read_to_string(chemin).map_err(|source| ErreurReglages::Lecture {
            chemin: chemin.display().to_string(),
            source,
        })?;
        Self::depuis_json(&texte)
    }
}
