//! Noyau : évaluation (pipeline réel)
//!
//! tokenize -> RPN -> Expr -> interprétation (mode d’angle au point d’appel trig)
//!        -> nettoyage (bruit imaginaire) -> formatage -> consignation session
//!
//! Remarque : `Ans` est lu dans le contexte (valeur exacte, jamais le texte arrondi).

use num_complex::Complex64;
use tracing::{debug, trace, warn};

use super::erreurs::ErreurEval;
use super::expr::{Expr, Operateur};
use super::fonctions::Fonction;
use super::format::format_nombre;
use super::jetons::{format_tokens, tokenize};
use super::rpn::{from_rpn, to_rpn};
use super::session::Session;
use super::trig::ModeAngle;

/// Seuil relatif sous lequel une composante est du bruit d’arrondi.
const BRUIT_RELATIF: f64 = 1e-14;

/// Contexte d’interprétation : tout ce que l’AST ne porte pas lui-même.
#[derive(Clone, Copy, Debug)]
pub struct Contexte {
    pub mode: ModeAngle,
    pub ans: Complex64,
}

/// Parse seul : texte -> AST (les symboles inconnus sont refusés ici).
pub fn parse_expression(expr_str: &str) -> Result<Expr, ErreurEval> {
    let jetons = tokenize(expr_str.trim())?;
    trace!(jetons = %format_tokens(&jetons), "tokenize");

    let rpn = to_rpn(&jetons)?;
    let expr = from_rpn(&rpn)?;
    trace!(ast = %expr, "parse");
    Ok(expr)
}

/// API publique : évalue une expression, sans toucher à aucune session.
pub fn eval_expression(
    expr_str: &str,
    mode: ModeAngle,
    ans: Complex64,
) -> Result<Complex64, ErreurEval> {
    let expr = parse_expression(expr_str)?;
    let z = evaluer(&expr, &Contexte { mode, ans })?;
    fini(z)?;
    // -0.0 -> 0.0
    Ok(Complex64::new(z.re + 0.0, z.im + 0.0))
}

/// Évalue, formate, puis consigne (Ans + historique), tout ou rien.
///
/// En cas d’erreur : session intacte.
pub fn eval_dans_session(
    session: &mut Session,
    expr_str: &str,
    mode: ModeAngle,
    decimales: usize,
) -> Result<(Complex64, String), ErreurEval> {
    match eval_expression(expr_str, mode, session.ans()) {
        Ok(z) => {
            let texte = format_nombre(z, decimales);
            session.consigner(Some(z), expr_str.trim(), &texte);
            debug!(expression = expr_str, resultat = %texte, %mode, "évaluation consignée");
            Ok((z, texte))
        }
        Err(e) => {
            warn!(expression = expr_str, erreur = %e, "évaluation refusée");
            Err(e)
        }
    }
}

/// Interpréteur récursif (profondeur bornée par from_rpn).
pub fn evaluer(expr: &Expr, ctx: &Contexte) -> Result<Complex64, ErreurEval> {
    match expr {
        Expr::Nombre(z) => Ok(*z),
        Expr::Ans => Ok(ctx.ans),

        Expr::Neg(x) => Ok(-evaluer(x, ctx)?),

        Expr::Fact(x) => {
            let v = evaluer(x, ctx)?;
            Fonction::Fact.appliquer(&[v], ctx.mode)
        }

        Expr::Bin(op, a, b) => {
            let a = evaluer(a, ctx)?;
            let b = evaluer(b, ctx)?;
            binaire(*op, a, b)
        }

        Expr::Appel(f, args) => {
            let mut valeurs = Vec::with_capacity(args.len());
            for a in args {
                valeurs.push(evaluer(a, ctx)?);
            }
            let z = f.appliquer(&valeurs, ctx.mode)?;
            Ok(if f.bruitee() { nettoyer(z) } else { z })
        }
    }
}

fn est_zero(z: Complex64) -> bool {
    z.re == 0.0 && z.im == 0.0
}

fn binaire(op: Operateur, a: Complex64, b: Complex64) -> Result<Complex64, ErreurEval> {
    match op {
        Operateur::Add => Ok(a + b),
        Operateur::Sub => Ok(a - b),
        Operateur::Mul => Ok(a * b),
        Operateur::Div => {
            if est_zero(b) {
                return Err(ErreurEval::DivisionParZero);
            }
            Ok(a / b)
        }
        Operateur::Mod => {
            if a.im != 0.0 || b.im != 0.0 {
                return Err(ErreurEval::Domaine("% : opérandes complexes".into()));
            }
            if b.re == 0.0 {
                return Err(ErreurEval::DivisionParZero);
            }
            // signe du diviseur (convention calculatrice) : a - b*floor(a/b)
            let r = a.re - b.re * (a.re / b.re).floor();
            Ok(Complex64::new(r, 0.0))
        }
        Operateur::Pow => puissance(a, b),
    }
}

fn puissance(a: Complex64, b: Complex64) -> Result<Complex64, ErreurEval> {
    if est_zero(a) {
        // 0^x : 0 si Re(x) > 0, 1 si x = 0, sinon division par zéro
        if est_zero(b) {
            return Ok(Complex64::new(1.0, 0.0));
        }
        if b.im == 0.0 && b.re > 0.0 {
            return Ok(Complex64::new(0.0, 0.0));
        }
        return Err(ErreurEval::DivisionParZero);
    }

    if b.im == 0.0 {
        let n = b.re;
        // exposant entier : powi (exact pour les petits entiers, complexe compris)
        if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 {
            if a.im == 0.0 {
                return Ok(Complex64::new(a.re.powi(n as i32), 0.0));
            }
            return Ok(nettoyer(a.powi(n as i32)));
        }
        if a.im == 0.0 && a.re > 0.0 {
            return Ok(Complex64::new(a.re.powf(n), 0.0));
        }
    }

    // base négative à exposant non entier, ou complexe : branche principale
    Ok(nettoyer(a.powc(b)))
}

fn fini(z: Complex64) -> Result<(), ErreurEval> {
    if z.re.is_finite() && z.im.is_finite() {
        Ok(())
    } else {
        Err(ErreurEval::Domaine("résultat non fini".into()))
    }
}

/// Supprime le bruit d’arrondi sur une composante négligeable.
/// (ex: e^(iπ) par powc => -1 + 1.2e-16i)
///
/// Appliqué au seul résultat d’une opération bruitée (powc, fonction transcendante),
/// jamais à une composante saisie : 1e15+0.001i garde sa partie imaginaire.
fn nettoyer(z: Complex64) -> Complex64 {
    let n = z.norm();
    let re = if z.re.abs() <= BRUIT_RELATIF * n { 0.0 } else { z.re };
    let im = if z.im.abs() <= BRUIT_RELATIF * n { 0.0 } else { z.im };
    Complex64::new(re, im)
}
