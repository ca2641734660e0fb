//! Noyau : résolution d’équations
//!
//! - Linéaire `a·x + b = 0`
//! - Quadratique `a·x² + b·x + c = 0` (formule stable, discriminant à tolérance relative)
//! - Cubique `a·x³ + b·x² + c·x + d = 0` (cubique réduite + polissage de Newton)
//! - Systèmes 2×2 / 3×3 `A·x = B` (Gauss-Jordan du moteur de matrices)
//!
//! Cas dégénérés :
//! - a = 0 : on descend d’un degré (quadratique -> linéaire, cubique -> quadratique).
//! - système singulier : rang(A) = rang([A|B]) -> infinité, sinon aucune solution.
//!
//! Ordre des racines : réelles décroissantes, puis paire conjuguée (+i d’abord).

use std::cmp::Ordering;
use std::f64::consts::PI;

use num_complex::Complex64;
use tracing::{debug, warn};

use super::erreurs::{ErreurEquation, ErreurMatrice};
use super::format::{format_nombre, format_reel};
use super::matrices::{rang, resoudre as resoudre_matrice, Matrice};
use super::session::Session;

/// Tolérance relative des tests « nul » (discriminants).
const TOL: f64 = 1e-12;

/// Itérations max du polissage de Newton.
const NEWTON_MAX: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeEquation {
    Lineaire,
    Quadratique,
    Cubique,
    Systeme2,
    Systeme3,
}

impl TypeEquation {
    pub const TOUS: [TypeEquation; 5] = [
        TypeEquation::Lineaire,
        TypeEquation::Quadratique,
        TypeEquation::Cubique,
        TypeEquation::Systeme2,
        TypeEquation::Systeme3,
    ];

    pub fn nb_coefficients(self) -> usize {
        match self {
            TypeEquation::Lineaire => 2,
            TypeEquation::Quadratique => 3,
            TypeEquation::Cubique => 4,
            TypeEquation::Systeme2 => 6,
            TypeEquation::Systeme3 => 12,
        }
    }

    pub fn nom(self) -> &'static str {
        match self {
            TypeEquation::Lineaire => "Linéaire",
            TypeEquation::Quadratique => "Quadratique",
            TypeEquation::Cubique => "Cubique",
            TypeEquation::Systeme2 => "Système 2×2",
            TypeEquation::Systeme3 => "Système 3×3",
        }
    }

    /// Accepte les noms courts français ou anglais (casse ignorée).
    pub fn depuis_nom(s: &str) -> Option<TypeEquation> {
        match s.trim().to_lowercase().as_str() {
            "lineaire" | "linéaire" | "linear" | "lin" => Some(TypeEquation::Lineaire),
            "quadratique" | "quadratic" | "quad" => Some(TypeEquation::Quadratique),
            "cubique" | "cubic" | "cub" => Some(TypeEquation::Cubique),
            "systeme2" | "système2" | "system2" | "sys2" => Some(TypeEquation::Systeme2),
            "systeme3" | "système3" | "system3" | "sys3" => Some(TypeEquation::Systeme3),
            _ => None,
        }
    }

    /// Texte de l’équation, ex. "x² - 3x + 2 = 0" ou "2x + y = 3, x + 3y = 5".
    pub fn enonce(self, coefs: &[f64], decimales: usize) -> String {
        match self {
            TypeEquation::Lineaire => format!("{} = 0", membre(coefs, &["x", ""], decimales)),
            TypeEquation::Quadratique => {
                format!("{} = 0", membre(coefs, &["x²", "x", ""], decimales))
            }
            TypeEquation::Cubique => {
                format!("{} = 0", membre(coefs, &["x³", "x²", "x", ""], decimales))
            }
            TypeEquation::Systeme2 => lignes_systeme(coefs, &["x", "y"], decimales),
            TypeEquation::Systeme3 => lignes_systeme(coefs, &["x", "y", "z"], decimales),
        }
    }
}

fn membre(coefs: &[f64], inconnues: &[&str], decimales: usize) -> String {
    let mut s = String::new();
    for (k, (c, v)) in coefs.iter().zip(inconnues).enumerate() {
        if k == 0 {
            if *c < 0.0 {
                s.push('-');
            }
        } else {
            s.push_str(if *c < 0.0 { " - " } else { " + " });
        }
        s.push_str(&format_reel(c.abs(), decimales));
        s.push_str(v);
    }
    s
}

fn lignes_systeme(coefs: &[f64], inconnues: &[&str], decimales: usize) -> String {
    let n = inconnues.len();
    coefs
        .chunks(n + 1)
        .map(|l| format!("{} = {}", membre(&l[..n], inconnues, decimales), format_reel(l[n], decimales)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug, PartialEq)]
pub enum Solution {
    /// Racines d’un polynôme (partie imaginaire nulle pour les réelles).
    Racines(Vec<Complex64>),
    RacineDouble(f64),
    /// Solution unique (x, y[, z]).
    Systeme(Vec<f64>),
    InfiniteDeSolutions,
    AucuneSolution,
}

impl Solution {
    pub fn texte(&self, decimales: usize) -> String {
        match self {
            Solution::Racines(r) if r.len() == 1 => {
                format!("x = {}", format_nombre(r[0], decimales))
            }
            Solution::Racines(r) => r
                .iter()
                .enumerate()
                .map(|(k, z)| format!("x{} = {}", indice(k + 1), format_nombre(*z, decimales)))
                .collect::<Vec<_>>()
                .join("; "),
            Solution::RacineDouble(x) => {
                format!("x = {} (racine double)", format_reel(*x, decimales))
            }
            Solution::Systeme(v) => ["x", "y", "z"]
                .iter()
                .zip(v)
                .map(|(n, x)| format!("{n} = {}", format_reel(*x, decimales)))
                .collect::<Vec<_>>()
                .join("; "),
            Solution::InfiniteDeSolutions => "infinité de solutions".to_string(),
            Solution::AucuneSolution => "aucune solution".to_string(),
        }
    }

    fn est_finie(&self) -> bool {
        match self {
            Solution::Racines(r) => r.iter().all(|z| z.re.is_finite() && z.im.is_finite()),
            Solution::RacineDouble(x) => x.is_finite(),
            Solution::Systeme(v) => v.iter().all(|x| x.is_finite()),
            Solution::InfiniteDeSolutions | Solution::AucuneSolution => true,
        }
    }
}

fn indice(k: usize) -> char {
    ['₀', '₁', '₂', '₃'].get(k).copied().unwrap_or('?')
}

/* ------------------------ Saisie ------------------------ */

/// Champs texte -> coefficients. Champ vide = 0 ; le moins typographique est accepté.
pub fn parse_coefficients(
    kind: TypeEquation,
    champs: &[&str],
) -> Result<Vec<f64>, ErreurEquation> {
    let attendu = kind.nb_coefficients();
    if champs.len() != attendu {
        return Err(ErreurEquation::NombreCoefficients {
            attendu,
            recu: champs.len(),
        });
    }
    champs.iter().map(|c| parse_coefficient(c)).collect()
}

fn parse_coefficient(champ: &str) -> Result<f64, ErreurEquation> {
    let t = champ.trim();
    if t.is_empty() {
        return Ok(0.0);
    }
    let t = t.replace('−', "-");
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ErreurEquation::CoefficientInvalide(champ.to_string())),
    }
}

/* ------------------------ Résolution ------------------------ */

pub fn resoudre(kind: TypeEquation, coefs: &[f64]) -> Result<Solution, ErreurEquation> {
    let attendu = kind.nb_coefficients();
    if coefs.len() != attendu {
        return Err(ErreurEquation::NombreCoefficients {
            attendu,
            recu: coefs.len(),
        });
    }
    if let Some(c) = coefs.iter().find(|c| !c.is_finite()) {
        return Err(ErreurEquation::CoefficientInvalide(c.to_string()));
    }

    let sol = match kind {
        TypeEquation::Lineaire => lineaire(coefs[0], coefs[1]),
        TypeEquation::Quadratique => quadratique(coefs[0], coefs[1], coefs[2]),
        TypeEquation::Cubique => cubique(coefs[0], coefs[1], coefs[2], coefs[3])?,
        TypeEquation::Systeme2 => systeme(coefs, 2),
        TypeEquation::Systeme3 => systeme(coefs, 3),
    };

    if !sol.est_finie() {
        return Err(ErreurEquation::NonFini);
    }
    Ok(sol)
}

/// Parse + résout + consigne dans l’historique (Ans inchangé). Tout ou rien.
pub fn resoudre_dans_session(
    session: &mut Session,
    kind: TypeEquation,
    champs: &[&str],
    decimales: usize,
) -> Result<(Solution, String), ErreurEquation> {
    let res = parse_coefficients(kind, champs)
        .and_then(|coefs| resoudre(kind, &coefs).map(|sol| (coefs, sol)));

    match res {
        Ok((coefs, sol)) => {
            let texte = sol.texte(decimales);
            let enonce = format!("{}: {}", kind.nom(), kind.enonce(&coefs, decimales));
            session.consigner(None, &enonce, &texte);
            debug!(equation = %enonce, solution = %texte, "équation consignée");
            Ok((sol, texte))
        }
        Err(e) => {
            warn!(type_equation = kind.nom(), erreur = %e, "équation refusée");
            Err(e)
        }
    }
}

fn lineaire(a: f64, b: f64) -> Solution {
    if a == 0.0 {
        return if b == 0.0 {
            Solution::InfiniteDeSolutions
        } else {
            Solution::AucuneSolution
        };
    }
    Solution::Racines(vec![Complex64::new(-b / a, 0.0)])
}

fn quadratique(a: f64, b: f64, c: f64) -> Solution {
    if a == 0.0 {
        return lineaire(b, c);
    }

    // coefficients ramenés vers 1 : b² et 4ac restent dans la plage des f64
    let m = puissance_de_deux(a.abs().max(b.abs()).max(c.abs()));
    let (sa, sb, sc) = (a / m, b / m, c / m);

    let d = sb * sb - 4.0 * sa * sc;
    let echelle = (sb * sb).max((4.0 * sa * sc).abs());
    if d.abs() <= TOL * echelle {
        return Solution::RacineDouble(-b / (2.0 * a));
    }

    if d > 0.0 {
        // q ne s’annule pas ici : d > 0
        let q = -0.5 * (sb + sb.signum() * d.sqrt());
        let mut r = [q / sa, sc / q];
        r.sort_by(|x, y| y.total_cmp(x));
        Solution::Racines(r.iter().map(|x| Complex64::new(*x, 0.0)).collect())
    } else {
        let re = -b / (2.0 * a);
        let im = ((-d).sqrt() / (2.0 * sa)).abs();
        Solution::Racines(vec![Complex64::new(re, im), Complex64::new(re, -im)])
    }
}

fn cubique(a: f64, b: f64, c: f64, d: f64) -> Result<Solution, ErreurEquation> {
    if a == 0.0 {
        return Ok(quadratique(b, c, d));
    }

    // x = t - b/3 : t³ + p·t + q = 0
    let (b1, c1, d1) = (b / a, c / a, d / a);
    let decalage = b1 / 3.0;
    let p = c1 - b1 * b1 / 3.0;
    let q = 2.0 * b1 * b1 * b1 / 27.0 - b1 * c1 / 3.0 + d1;
    if !(p.is_finite() && q.is_finite() && decalage.is_finite()) {
        return Err(ErreurEquation::NonFini);
    }

    let mut reelles: Vec<f64>;
    let mut complexes: Vec<Complex64> = Vec::new();

    // t = σ·s : s³ + p'·s + q' = 0 avec max(|p'|, |q'|) de l’ordre de 1
    if p == 0.0 && q == 0.0 {
        reelles = vec![-decalage; 3];
    } else {
        let sigma = puissance_de_deux(p.abs().sqrt().max(q.abs().cbrt()));
        let ps = p / sigma / sigma;
        let qs = q / sigma / sigma / sigma;

        let q2 = qs / 2.0;
        let p3 = ps / 3.0;
        let delta = q2 * q2 + p3 * p3 * p3;
        let tol = TOL * (q2 * q2).max((p3 * p3 * p3).abs());

        if delta.abs() <= tol {
            // racine multiple : 2u, -u, -u
            let u = (-q2).cbrt() * sigma;
            reelles = vec![2.0 * u - decalage, -u - decalage, -u - decalage];
        } else if delta > 0.0 {
            // u du côté sans annulation, puis v = -p/(3u)
            let s = delta.sqrt();
            let u = -q2.signum() * (q2.abs() + s).cbrt();
            let v = if u == 0.0 { 0.0 } else { -p3 / u };
            reelles = vec![(u + v) * sigma - decalage];
            let re = -(u + v) / 2.0 * sigma - decalage;
            let im = (3.0_f64.sqrt() / 2.0 * (u - v) * sigma).abs();
            complexes.push(Complex64::new(re, im));
            complexes.push(Complex64::new(re, -im));
        } else {
            // trois réelles distinctes (p < 0 ici)
            let r = 2.0 * (-p3).sqrt();
            let cos_arg = ((3.0 * qs) / (2.0 * ps) * (-1.0 / p3).sqrt()).clamp(-1.0, 1.0);
            let phi = cos_arg.acos() / 3.0;
            reelles = (0..3)
                .map(|k| r * (phi - 2.0 * PI * k as f64 / 3.0).cos() * sigma - decalage)
                .collect();
        }
    }

    let poly = [a, b, c, d];
    for x in reelles.iter_mut() {
        *x = polir(&poly, Complex64::new(*x, 0.0)).re;
    }
    if let [z1, z2] = complexes.as_mut_slice() {
        *z1 = polir(&poly, *z1);
        *z2 = z1.conj();
    }
    reelles.sort_by(|x, y| y.total_cmp(x));

    let mut racines: Vec<Complex64> = reelles.into_iter().map(|x| Complex64::new(x, 0.0)).collect();
    racines.extend(complexes);
    Ok(Solution::Racines(racines))
}

/// Puissance de 2 la plus proche par défaut : division exacte, sans arrondi.
fn puissance_de_deux(x: f64) -> f64 {
    2f64.powi(x.log2().floor().clamp(-1022.0, 1022.0) as i32)
}

fn horner(poly: &[f64], z: Complex64) -> (Complex64, Complex64) {
    let mut f = Complex64::new(0.0, 0.0);
    let mut fp = Complex64::new(0.0, 0.0);
    for c in poly {
        fp = fp * z + f;
        f = f * z + *c;
    }
    (f, fp)
}

/// Newton tant que le résidu diminue.
fn polir(poly: &[f64], mut z: Complex64) -> Complex64 {
    let (mut f, mut fp) = horner(poly, z);
    for _ in 0..NEWTON_MAX {
        if f.norm() == 0.0 || fp.norm() == 0.0 {
            break;
        }
        let suivant = z - f / fp;
        let (f2, fp2) = horner(poly, suivant);
        if f2.norm().partial_cmp(&f.norm()) != Some(Ordering::Less) {
            break;
        }
        z = suivant;
        f = f2;
        fp = fp2;
    }
    z
}

/// Coefficients par ligne : a1 b1 [c1] rhs1, a2 b2 [c2] rhs2…
fn systeme(coefs: &[f64], n: usize) -> Solution {
    let mut a = Matrice::zeros(n, n);
    let mut b = Matrice::zeros(n, 1);
    let mut augmentee = Matrice::zeros(n, n + 1);
    for (i, ligne) in coefs.chunks(n + 1).enumerate() {
        for (j, v) in ligne.iter().enumerate() {
            if j < n {
                a.set(i, j, *v);
            } else {
                b.set(i, 0, *v);
            }
            augmentee.set(i, j, *v);
        }
    }

    match resoudre_matrice(&a, &b, 'A') {
        Ok(x) => Solution::Systeme((0..n).map(|i| x.get(i, 0)).collect()),
        Err(ErreurMatrice::Singuliere) => {
            if rang(&a) == rang(&augmentee) {
                Solution::InfiniteDeSolutions
            } else {
                Solution::AucuneSolution
            }
        }
        // forme construite ici : toujours carrée et compatible
        Err(_) => Solution::AucuneSolution,
    }
}
