// src/noyau/format.rs
//
// Affichage numérique (précision FIX n).
// - |x| > 1e10 ou 0 < |x| < 1e-4 : scientifique normalisé, n décimales, exposant signé 2 chiffres
// - sinon : virgule fixe n décimales, zéros de fin retirés (et le point s’il devient inutile)
// - complexe : "{re} + {im}i" / "{re} - {im}i"
// - non fini : marqueur explicite ("NaN", "∞", "-∞"), jamais de panique

use num_complex::Complex64;

/// Borne haute de la précision d’affichage.
pub const DECIMALES_MAX: usize = 15;

/// Formate un réel selon la politique d’affichage.
pub fn format_reel(x: f64, decimales: usize) -> String {
    let d = decimales.min(DECIMALES_MAX);

    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "∞".into() } else { "-∞".into() };
    }

    let a = x.abs();
    if a > 1e10 || (a > 0.0 && a < 1e-4) {
        return format_scientifique(x, d);
    }

    let s = format!("{x:.d$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };

    // "-0" (ex: -0.00001 arrondi, ou -0.0) -> "0"
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

/// 12345678901 -> "1.2345678901e+10" (exposant signé, au moins 2 chiffres).
fn format_scientifique(x: f64, d: usize) -> String {
    let s = format!("{x:.d$e}");
    match s.split_once('e') {
        Some((mantisse, exp)) => {
            let (signe, chiffres) = match exp.strip_prefix('-') {
                Some(c) => ('-', c),
                None => ('+', exp),
            };
            format!("{mantisse}e{signe}{chiffres:0>2}")
        }
        None => s,
    }
}

/// Formate un nombre réel ou complexe.
pub fn format_nombre(z: Complex64, decimales: usize) -> String {
    if z.im == 0.0 {
        return format_reel(z.re, decimales);
    }
    let re = format_reel(z.re, decimales);
    let im = format_reel(z.im.abs(), decimales);
    let signe = if z.im < 0.0 { '-' } else { '+' };
    format!("{re} {signe} {im}i")
}

/// Formate les lignes d’une matrice : "[1, 2]" par ligne.
pub fn format_lignes(lignes: &[Vec<f64>], decimales: usize) -> Vec<String> {
    lignes
        .iter()
        .map(|ligne| {
            let cellules: Vec<String> = ligne.iter().map(|v| format_reel(*v, decimales)).collect();
            format!("[{}]", cellules.join(", "))
        })
        .collect()
}
