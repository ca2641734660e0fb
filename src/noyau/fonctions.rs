// src/noyau/fonctions.rs
//
// Liste blanche des fonctions et constantes.
// - Nom -> Fonction : table statique (enum fermé), aucun nom dynamique.
// - Chaque Fonction a son arité et son application.
// - Les fonctions “réelles” refusent un argument complexe (Domaine), pas de coercition.

use std::f64::consts::{E, LN_10, LN_2};

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::{One, ToPrimitive};

use super::erreurs::ErreurEval;
use super::trig::{trig_reel, ModeAngle, TrigFn, TrigOutcome};

/// Tolérance pour considérer une partie imaginaire comme nulle.
const TOL_REEL: f64 = 1e-12;

/// Garde-fou : nombre maximal de facteurs pour la combinatoire exacte.
const FACTEURS_MAX: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Ln,
    Log,
    Log2,
    Logb,
    Exp,
    Exp2,
    Exp10,
    Sqrt,
    Cbrt,
    Fact,
    Perm,
    Comb,
    Gcd,
    Lcm,
    Floor,
    Ceil,
    Round,
    Abs,
    Arg,
    Conj,
    Re,
    Im,
    Pol,
    Rec,
}

/// Table statique nom -> fonction (noms en minuscules, après tokenize).
const TABLE: &[(&str, Fonction)] = &[
    ("sin", Fonction::Sin),
    ("cos", Fonction::Cos),
    ("tan", Fonction::Tan),
    ("asin", Fonction::Asin),
    ("acos", Fonction::Acos),
    ("atan", Fonction::Atan),
    ("sinh", Fonction::Sinh),
    ("cosh", Fonction::Cosh),
    ("tanh", Fonction::Tanh),
    ("asinh", Fonction::Asinh),
    ("acosh", Fonction::Acosh),
    ("atanh", Fonction::Atanh),
    ("ln", Fonction::Ln),
    ("log", Fonction::Log),
    ("log10", Fonction::Log),
    ("log2", Fonction::Log2),
    ("logb", Fonction::Logb),
    ("exp", Fonction::Exp),
    ("exp2", Fonction::Exp2),
    ("exp10", Fonction::Exp10),
    ("sqrt", Fonction::Sqrt),
    ("cbrt", Fonction::Cbrt),
    ("fact", Fonction::Fact),
    ("npr", Fonction::Perm),
    ("perm", Fonction::Perm),
    ("ncr", Fonction::Comb),
    ("comb", Fonction::Comb),
    ("gcd", Fonction::Gcd),
    ("lcm", Fonction::Lcm),
    ("floor", Fonction::Floor),
    ("ceil", Fonction::Ceil),
    ("round", Fonction::Round),
    ("abs", Fonction::Abs),
    ("arg", Fonction::Arg),
    ("conj", Fonction::Conj),
    ("re", Fonction::Re),
    ("im", Fonction::Im),
    ("pol", Fonction::Pol),
    ("rec", Fonction::Rec),
];

/// Constantes nommées (π a son propre jeton).
pub fn constante(nom: &str) -> Option<Complex64> {
    match nom {
        "e" => Some(Complex64::new(E, 0.0)),
        "i" => Some(Complex64::i()),
        _ => None,
    }
}

impl Fonction {
    pub fn depuis_nom(nom: &str) -> Option<Fonction> {
        TABLE.iter().find(|(n, _)| *n == nom).map(|(_, f)| *f)
    }

    /// Nom canonique (premier nom de la table).
    pub fn nom(self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    /// Arité (min, max).
    pub fn arite(self) -> (usize, usize) {
        use Fonction::*;
        match self {
            Logb | Perm | Comb | Gcd | Lcm | Pol | Rec => (2, 2),
            Round => (1, 2),
            _ => (1, 1),
        }
    }

    /// Applique la fonction à des arguments déjà évalués.
    /// L’arité est garantie par le parse (rpn.rs).
    /// Résultat complexe susceptible de porter du bruit d’arrondi.
    pub fn bruitee(self) -> bool {
        use Fonction::*;
        matches!(
            self,
            Sin | Cos
                | Tan
                | Sinh
                | Cosh
                | Tanh
                | Ln
                | Log
                | Log2
                | Logb
                | Exp
                | Exp2
                | Exp10
                | Sqrt
                | Cbrt
                | Rec
        )
    }

    pub fn appliquer(self, args: &[Complex64], mode: ModeAngle) -> Result<Complex64, ErreurEval> {
        use Fonction::*;

        let nom = self.nom();
        let z = args[0];

        let out = match self {
            Sin | Cos | Tan => {
                let f = match self {
                    Sin => TrigFn::Sin,
                    Cos => TrigFn::Cos,
                    _ => TrigFn::Tan,
                };
                trig(z, f, mode, nom)?
            }

            Asin | Acos => {
                let x = reel(z, nom)?;
                if !(-1.0..=1.0).contains(&x) {
                    return Err(hors_domaine(nom, x));
                }
                let r = if self == Asin { x.asin() } else { x.acos() };
                reel_c(mode.depuis_radians(r))
            }
            Atan => reel_c(mode.depuis_radians(reel(z, nom)?.atan())),

            Sinh => z.sinh(),
            Cosh => z.cosh(),
            Tanh => z.tanh(),
            Asinh => reel_c(reel(z, nom)?.asinh()),
            Acosh => {
                let x = reel(z, nom)?;
                if x < 1.0 {
                    return Err(hors_domaine(nom, x));
                }
                reel_c(x.acosh())
            }
            Atanh => {
                let x = reel(z, nom)?;
                if x.abs() >= 1.0 {
                    return Err(hors_domaine(nom, x));
                }
                reel_c(x.atanh())
            }

            Ln => logarithme(z, 1.0, nom)?,
            Log => logarithme(z, LN_10, nom)?,
            Log2 => logarithme(z, LN_2, nom)?,
            Logb => {
                let base = reel(args[1], nom)?;
                if base <= 0.0 || base == 1.0 {
                    return Err(ErreurEval::Domaine(format!("{nom} : base {base} invalide")));
                }
                logarithme(z, base.ln(), nom)?
            }

            Exp => z.exp(),
            Exp2 => (z * LN_2).exp(),
            Exp10 => (z * LN_10).exp(),

            Sqrt => match reel_opt(z) {
                Some(x) if x >= 0.0 => reel_c(x.sqrt()),
                Some(x) => Complex64::new(0.0, (-x).sqrt()),
                None => z.sqrt(),
            },
            Cbrt => match reel_opt(z) {
                Some(x) => reel_c(x.cbrt()),
                None => z.cbrt(),
            },

            Fact => {
                let n = entier_naturel(z, nom)?;
                if n > 170 {
                    return Err(ErreurEval::Domaine(format!("{nom}({n}) dépasse la capacité")));
                }
                reel_c(big_vers_f64(&produit(1, n), nom)?)
            }
            Perm => {
                let n = entier_naturel(z, nom)?;
                let k = entier_naturel(args[1], nom)?;
                if k > n {
                    reel_c(0.0)
                } else {
                    garde_facteurs(k, nom)?;
                    reel_c(big_vers_f64(&produit(n - k + 1, n), nom)?)
                }
            }
            Comb => {
                let n = entier_naturel(z, nom)?;
                let k = entier_naturel(args[1], nom)?;
                if k > n {
                    reel_c(0.0)
                } else {
                    let k = k.min(n - k);
                    garde_facteurs(k, nom)?;
                    let num = produit(n - k + 1, n);
                    let den = produit(1, k);
                    reel_c(big_vers_f64(&(num / den), nom)?)
                }
            }
            Gcd | Lcm => {
                let a = entier_relatif(z, nom)?.unsigned_abs();
                let b = entier_relatif(args[1], nom)?.unsigned_abs();
                let g = gcd_u64(a, b);
                let v = if self == Gcd {
                    g as f64
                } else if g == 0 {
                    0.0
                } else {
                    ((a / g) as u128 * b as u128) as f64
                };
                reel_c(v)
            }

            Floor => reel_c(reel(z, nom)?.floor()),
            Ceil => reel_c(reel(z, nom)?.ceil()),
            Round => {
                let x = reel(z, nom)?;
                let n = match args.get(1) {
                    Some(d) => entier_relatif(*d, nom)?,
                    None => 0,
                };
                if !(-15..=15).contains(&n) {
                    return Err(ErreurEval::Domaine(format!("{nom} : {n} décimales")));
                }
                let p = 10f64.powi(n as i32);
                let y = x * p;
                // au-delà de 2⁵², x est déjà entier à cette précision
                if !y.is_finite() || y.abs() >= 2f64.powi(52) {
                    reel_c(x)
                } else {
                    reel_c(y.round() / p)
                }
            }

            Abs => reel_c(z.norm()),
            Arg => {
                if z == Complex64::new(0.0, 0.0) {
                    return Err(ErreurEval::Domaine(format!("{nom}(0) indéfini")));
                }
                reel_c(mode.depuis_radians(z.arg()))
            }
            Conj => z.conj(),
            Re => reel_c(z.re),
            Im => reel_c(z.im),

            Pol => {
                let x = reel(z, nom)?;
                let y = reel(args[1], nom)?;
                reel_c(x.hypot(y))
            }
            Rec => {
                let r = reel(z, nom)?;
                let theta = mode.vers_radians(reel(args[1], nom)?);
                Complex64::from_polar(r, theta)
            }
        };

        if !out.re.is_finite() || !out.im.is_finite() {
            return Err(ErreurEval::Domaine(format!("{nom} : résultat non fini")));
        }
        Ok(out)
    }
}

/* ------------------------ Outils ------------------------ */

fn reel_c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

fn reel_opt(z: Complex64) -> Option<f64> {
    if z.im.abs() <= TOL_REEL * (1.0 + z.re.abs()) {
        Some(z.re)
    } else {
        None
    }
}

/// Exige un argument réel.
fn reel(z: Complex64, nom: &str) -> Result<f64, ErreurEval> {
    reel_opt(z).ok_or_else(|| ErreurEval::Domaine(format!("{nom} : argument complexe")))
}

fn hors_domaine(nom: &str, x: f64) -> ErreurEval {
    ErreurEval::Domaine(format!("{nom}({x}) hors domaine"))
}

/// Entier relatif (tolérance 1e-9 sur la partie fractionnaire).
fn entier_relatif(z: Complex64, nom: &str) -> Result<i64, ErreurEval> {
    let x = reel(z, nom)?;
    let r = x.round();
    if (x - r).abs() > 1e-9 || r.abs() > 9.007_199_254_740_992e15 {
        return Err(ErreurEval::Domaine(format!("{nom} : {x} n’est pas entier")));
    }
    Ok(r as i64)
}

fn entier_naturel(z: Complex64, nom: &str) -> Result<u64, ErreurEval> {
    let n = entier_relatif(z, nom)?;
    if n < 0 {
        return Err(ErreurEval::Domaine(format!("{nom} : {n} est négatif")));
    }
    Ok(n as u64)
}

fn garde_facteurs(k: u64, nom: &str) -> Result<(), ErreurEval> {
    if k > FACTEURS_MAX {
        return Err(ErreurEval::Domaine(format!("{nom} : résultat hors capacité")));
    }
    Ok(())
}

/// Produit exact de..=a (1 si vide).
fn produit(de: u64, a: u64) -> BigInt {
    let mut acc = BigInt::one();
    let mut k = de;
    while k <= a {
        acc *= k;
        k += 1;
    }
    acc
}

fn big_vers_f64(n: &BigInt, nom: &str) -> Result<f64, ErreurEval> {
    match n.to_f64() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ErreurEval::Domaine(format!("{nom} : résultat hors capacité"))),
    }
}

fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// ln(z)/ln_base : réel > 0 => réel ; réel <= 0 => Domaine ; complexe => branche principale.
fn logarithme(z: Complex64, ln_base: f64, nom: &str) -> Result<Complex64, ErreurEval> {
    match reel_opt(z) {
        Some(x) if x > 0.0 => Ok(reel_c(x.ln() / ln_base)),
        Some(x) => Err(hors_domaine(nom, x)),
        None => Ok(z.ln() / ln_base),
    }
}

fn trig(z: Complex64, f: TrigFn, mode: ModeAngle, nom: &str) -> Result<Complex64, ErreurEval> {
    if let Some(x) = reel_opt(z) {
        return match trig_reel(x, f, mode) {
            TrigOutcome::Valeur(v) => Ok(reel_c(v)),
            TrigOutcome::Indefini => Err(ErreurEval::Domaine(format!("{nom}({x}) indéfini"))),
        };
    }

    let r = z * mode.facteur_radians();
    Ok(match f {
        TrigFn::Sin => r.sin(),
        TrigFn::Cos => r.cos(),
        TrigFn::Tan => r.tan(),
    })
}
