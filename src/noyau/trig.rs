// src/noyau/trig.rs
//
// Mode d’angle + angles spéciaux pour sin/cos/tan
// -----------------------------------------------
// - La conversion DEG/GRAD -> radians se fait au point d’appel trig,
//   sur l’argument déjà évalué (jamais par réécriture du texte).
// - En DEG/GRAD, les multiples exacts d’un quart de tour sont reconnus
//   (sin(180) = 0 exactement, tan(90) indéfini) au lieu du bruit flottant.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unité d’interprétation des angles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModeAngle {
    #[default]
    Deg,
    Rad,
    Grad,
}

impl ModeAngle {
    /// Un tour complet dans l’unité du mode.
    pub fn tour(self) -> f64 {
        match self {
            ModeAngle::Deg => 360.0,
            ModeAngle::Rad => 2.0 * PI,
            ModeAngle::Grad => 400.0,
        }
    }

    /// Argument utilisateur -> radians (DEG: ×π/180, GRAD: ×π/200).
    pub fn vers_radians(self, x: f64) -> f64 {
        match self {
            ModeAngle::Deg => x.to_radians(),
            ModeAngle::Rad => x,
            ModeAngle::Grad => x * PI / 200.0,
        }
    }

    /// Radians -> unité du mode (résultats de asin/acos/atan, arg…).
    pub fn depuis_radians(self, x: f64) -> f64 {
        match self {
            ModeAngle::Deg => x.to_degrees(),
            ModeAngle::Rad => x,
            ModeAngle::Grad => x * 200.0 / PI,
        }
    }

    /// Facteur multiplicatif unité -> radians (pour les arguments complexes).
    pub fn facteur_radians(self) -> f64 {
        self.vers_radians(1.0)
    }
}

impl fmt::Display for ModeAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModeAngle::Deg => "DEG",
            ModeAngle::Rad => "RAD",
            ModeAngle::Grad => "GRAD",
        };
        f.write_str(s)
    }
}

impl FromStr for ModeAngle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEG" | "D" => Ok(ModeAngle::Deg),
            "RAD" | "R" => Ok(ModeAngle::Rad),
            "GRAD" | "G" | "GON" => Ok(ModeAngle::Grad),
            autre => Err(format!("mode d’angle inconnu : {autre}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrigOutcome {
    Valeur(f64),
    Indefini,
}

/// Reconnaît les quarts de tour exacts en DEG/GRAD.
///
/// Retour:
/// - Some(Valeur(v)) si l’angle est k·(tour/4) à 1e-12 près
/// - Some(Indefini) pour tan(90°), tan(270°), tan(100 grad)…
/// - None sinon (et toujours en RAD : π n’est pas représentable exactement)
pub fn trig_special(x: f64, f: TrigFn, mode: ModeAngle) -> Option<TrigOutcome> {
    if mode == ModeAngle::Rad || !x.is_finite() {
        return None;
    }

    let quart = mode.tour() / 4.0;
    let k = x.rem_euclid(mode.tour()) / quart;
    let k_rond = k.round();
    if (k - k_rond).abs() > 1e-12 {
        return None;
    }

    // k_rond ∈ {0,1,2,3,4} (4 = tour complet par arrondi)
    let q = (k_rond as i64).rem_euclid(4);

    let out = match f {
        TrigFn::Sin => TrigOutcome::Valeur([0.0, 1.0, 0.0, -1.0][q as usize]),
        TrigFn::Cos => TrigOutcome::Valeur([1.0, 0.0, -1.0, 0.0][q as usize]),
        TrigFn::Tan => {
            if q % 2 == 0 {
                TrigOutcome::Valeur(0.0)
            } else {
                TrigOutcome::Indefini
            }
        }
    };
    Some(out)
}

/// sin/cos/tan d’un argument réel exprimé dans l’unité du mode.
pub fn trig_reel(x: f64, f: TrigFn, mode: ModeAngle) -> TrigOutcome {
    if let Some(o) = trig_special(x, f, mode) {
        return o;
    }
    let r = mode.vers_radians(x);
    let v = match f {
        TrigFn::Sin => r.sin(),
        TrigFn::Cos => r.cos(),
        TrigFn::Tan => r.tan(),
    };
    TrigOutcome::Valeur(v)
}
