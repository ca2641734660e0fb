// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use super::erreurs::ErreurEval;

/// Garde-fou : exposant décimal maximal d’un littéral (1e4000 et au-delà refusés).
const EXPOSANT_MAX: i64 = 4000;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    /// Littéral lu exactement (12, 0.25, 1.5e-3).
    Num(BigRational),
    Pi,

    // Fonctions, constantes et `Ans` (tout ce qui n’est pas π / opérateur / nombre).
    // NOTE: le parse (rpn.rs) décide si c’est une fonction, une constante, ou un symbole inconnu.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret,   // ^
    Percent, // % (modulo)
    Bang,    // ! (factorielle postfixe)
    Comma,

    LPar,
    RPar,
}

/// Tokenize une chaîne en notation d’affichage.
/// Supporte:
/// - littéraux décimaux : 12, 3.5, .5, 1e10, 2.5E-3
/// - opérateurs + - * / ^ % ! et leurs formes d’affichage × ÷ − ·
/// - `**` comme puissance
/// - parenthèses ( ) et virgule d’arguments
/// - π ou pi
/// - √ (équivaut à ident("sqrt"))
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (normalisés en minuscules, donc `Ans` → "ans")
pub fn tokenize(s: &str) -> Result<Vec<Tok>, ErreurEval> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Opérateurs (ASCII + symboles d’affichage)
        let op = match c {
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            ',' => Some(Tok::Comma),
            '+' => Some(Tok::Plus),
            '-' | '−' => Some(Tok::Minus),
            '×' | '·' => Some(Tok::Star),
            '÷' | '/' => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            '%' => Some(Tok::Percent),
            '!' => Some(Tok::Bang),
            '*' => {
                // `**` = puissance (saisie clavier courante)
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                    Some(Tok::Caret)
                } else {
                    Some(Tok::Star)
                }
            }
            _ => None,
        };
        if let Some(t) = op {
            out.push(t);
            i += 1;
            continue;
        }

        if c == 'π' {
            out.push(Tok::Pi);
            i += 1;
            continue;
        }

        // Racine carrée unicode : √  => ident("sqrt")
        if c == '√' {
            out.push(Tok::Ident("sqrt".to_string()));
            i += 1;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let w = word.to_lowercase();

            if w == "pi" {
                out.push(Tok::Pi);
            } else {
                out.push(Tok::Ident(w));
            }
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let (rat, suite) = lire_nombre(&chars, i)?;
            out.push(Tok::Num(rat));
            i = suite;
            continue;
        }

        return Err(ErreurEval::Syntaxe(format!("caractère inattendu: '{c}'")));
    }

    Ok(out)
}

/// Lit un littéral décimal à partir de `debut` et renvoie (valeur exacte, index suivant).
///
/// Mantisse `123.45` => 12345 / 10^2, puis × 10^exposant.
/// Un `e` non suivi d’un chiffre (ex: "2e", "2e+") n’est pas un exposant : il reste
/// pour l’identifiant `e` (multiplication implicite).
fn lire_nombre(chars: &[char], debut: usize) -> Result<(BigRational, usize), ErreurEval> {
    let mut i = debut;
    let mut chiffres = String::new();
    let mut decimales: i64 = 0;
    let mut vu_point = false;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            chiffres.push(c);
            if vu_point {
                decimales += 1;
            }
        } else if c == '.' && !vu_point {
            vu_point = true;
        } else {
            break;
        }
        i += 1;
    }

    if chiffres.is_empty() {
        return Err(ErreurEval::Syntaxe("point décimal isolé".into()));
    }

    // exposant éventuel : e / E, signe optionnel, au moins un chiffre
    let mut exposant: i64 = 0;
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        let mut negatif = false;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-' || chars[j] == '−') {
            negatif = chars[j] != '+';
            j += 1;
        }
        let start_e = j;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > start_e {
            let txt: String = chars[start_e..j].iter().collect();
            let e: i64 = txt
                .parse()
                .map_err(|_| ErreurEval::Syntaxe("exposant invalide".into()))?;
            if e > EXPOSANT_MAX {
                return Err(ErreurEval::Syntaxe("exposant hors limites".into()));
            }
            exposant = if negatif { -e } else { e };
            i = j;
        }
    }

    let mantisse = BigInt::parse_bytes(chiffres.as_bytes(), 10)
        .ok_or_else(|| ErreurEval::Syntaxe("nombre invalide".into()))?;

    let puissance = exposant - decimales;
    let dix = BigInt::from(10);
    let rat = if puissance >= 0 {
        BigRational::from_integer(mantisse * dix.pow(puissance as u32))
    } else {
        BigRational::new(mantisse, dix.pow((-puissance) as u32))
    };

    Ok((rat, i))
}

/// Format utilitaire (debug/trace) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    fn format_rat(r: &BigRational) -> String {
        let n = r.numer();
        let d = r.denom();
        if d.is_one() {
            format!("{n}")
        } else if n.is_zero() {
            "0".to_string()
        } else {
            format!("{n}/{d}")
        }
    }

    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(r) => format_rat(r),
            Tok::Pi => "π".to_string(),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Caret => "^".to_string(),
            Tok::Percent => "%".to_string(),
            Tok::Bang => "!".to_string(),
            Tok::Comma => ",".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> Tok {
        Tok::Num(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    #[test]
    fn symboles_affichage_normalises() {
        let t = tokenize("2×3÷4−1").unwrap();
        assert_eq!(
            t,
            vec![
                rat(2, 1),
                Tok::Star,
                rat(3, 1),
                Tok::Slash,
                rat(4, 1),
                Tok::Minus,
                rat(1, 1)
            ]
        );
    }

    #[test]
    fn litteraux_decimaux_exacts() {
        assert_eq!(tokenize("0.25").unwrap(), vec![rat(1, 4)]);
        assert_eq!(tokenize(".5").unwrap(), vec![rat(1, 2)]);
        assert_eq!(tokenize("1.5e3").unwrap(), vec![rat(1500, 1)]);
        assert_eq!(tokenize("25E-2").unwrap(), vec![rat(1, 4)]);
    }

    #[test]
    fn e_sans_chiffre_reste_identifiant() {
        let t = tokenize("2e").unwrap();
        assert_eq!(t, vec![rat(2, 1), Tok::Ident("e".into())]);
    }

    #[test]
    fn ans_et_double_etoile() {
        let t = tokenize("Ans**2").unwrap();
        assert_eq!(t, vec![Tok::Ident("ans".into()), Tok::Caret, rat(2, 1)]);
    }

    #[test]
    fn caractere_inattendu() {
        assert!(matches!(tokenize("2 $ 3"), Err(ErreurEval::Syntaxe(_))));
        assert!(matches!(tokenize("."), Err(ErreurEval::Syntaxe(_))));
        assert!(matches!(tokenize("1e9999"), Err(ErreurEval::Syntaxe(_))));
    }

    #[test]
    fn format_tokens_lisible() {
        let t = tokenize("√(2)+π").unwrap();
        assert_eq!(format_tokens(&t), "sqrt ( 2 ) + π");
    }
}
