// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis reconstruire Expr
//
// Règles:
// - Ident(name):
//    - "ans"                 => dernier résultat
//    - constante (e, i)      => valeur
//    - fonction (liste blanche) => appel, DOIT être suivi de '('
//    - sinon                 => SymboleInconnu (refus au parse, jamais à l’exécution)
// - Moins unaire : opérateur préfixe Neg, plus fort que * / mais plus faible que ^
//   (-2^2 = -4 ; 2*-3 = -6 ; 2^-1 = 0.5)
// - Factorielle postfixe : sortie directe (colle à la valeur qui précède)
// - Multiplication implicite : 2π, 3(4+1), (1+i)(1-i), 2sin(30)
//
// NOTE:
// - Les fonctions sont sorties après leur parenthèse fermante, avec leur nombre d’arguments.

use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::ToPrimitive;

use std::f64::consts::PI;

use super::erreurs::ErreurEval;
use super::expr::{Expr, Operateur};
use super::fonctions::{constante, Fonction};
use super::jetons::Tok;

/// Garde-fou : profondeur maximale de l’AST (évaluation récursive).
const PROFONDEUR_MAX: usize = 1000;

/// Élément de sortie RPN.
#[derive(Clone, Debug, PartialEq)]
pub enum Rpn {
    Valeur(Complex64),
    Ans,
    Op(Operateur),
    Neg,
    Fact,
    Appel(Fonction, usize),
}

/// Élément de la pile d’opérateurs.
#[derive(Clone, Copy, Debug)]
enum Pile {
    Op(Operateur),
    Neg,
    Fonction(Fonction),
    LPar { appel: bool },
}

fn precedence(p: &Pile) -> i32 {
    match p {
        Pile::Op(Operateur::Add) | Pile::Op(Operateur::Sub) => 1,
        Pile::Op(Operateur::Mul) | Pile::Op(Operateur::Div) | Pile::Op(Operateur::Mod) => 2,
        Pile::Neg => 3,
        Pile::Op(Operateur::Pow) => 4,
        _ => 0,
    }
}

fn is_right_associative(op: Operateur) -> bool {
    matches!(op, Operateur::Pow)
}

fn syntaxe(msg: &str) -> ErreurEval {
    ErreurEval::Syntaxe(msg.to_string())
}

fn rat_vers_f64(r: &BigRational) -> Result<f64, ErreurEval> {
    match r.to_f64() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ErreurEval::Domaine("littéral hors capacité".into())),
    }
}

struct Convertisseur {
    out: Vec<Rpn>,
    ops: Vec<Pile>,
    // nombre d’arguments de chaque appel ouvert
    compteurs: Vec<usize>,
    // “valeur” = un atome ou une expression fermée (sert au moins unaire et au produit implicite)
    prev_was_value: bool,
    prev_was_num: bool,
    // fonction lue, '(' obligatoire ensuite
    attend_lpar: Option<Fonction>,
}

impl Convertisseur {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            ops: Vec::new(),
            compteurs: Vec::new(),
            prev_was_value: false,
            prev_was_num: false,
            attend_lpar: None,
        }
    }

    /// Dépile tant que la priorité l’exige, puis empile l’opérateur binaire.
    fn pousser_binaire(&mut self, op: Operateur) -> Result<(), ErreurEval> {
        if !self.prev_was_value {
            return Err(ErreurEval::Syntaxe(format!(
                "opérateur '{}' sans opérande gauche",
                op.symbole()
            )));
        }

        let p_tok = precedence(&Pile::Op(op));
        while let Some(top) = self.ops.last() {
            if matches!(top, Pile::LPar { .. } | Pile::Fonction(_)) {
                break;
            }
            let p_top = precedence(top);
            let doit_pop = if is_right_associative(op) {
                p_top > p_tok
            } else {
                p_top >= p_tok
            };
            if !doit_pop {
                break;
            }
            match self.ops.pop() {
                Some(Pile::Op(o)) => self.out.push(Rpn::Op(o)),
                Some(Pile::Neg) => self.out.push(Rpn::Neg),
                _ => unreachable!(),
            }
        }

        self.ops.push(Pile::Op(op));
        self.prev_was_value = false;
        self.prev_was_num = false;
        Ok(())
    }

    /// Début d’un opérande : insère le produit implicite si une valeur précède.
    fn debut_valeur(&mut self, est_nombre: bool) -> Result<(), ErreurEval> {
        if self.prev_was_value {
            if est_nombre && self.prev_was_num {
                return Err(syntaxe("deux nombres juxtaposés"));
            }
            self.pousser_binaire(Operateur::Mul)?;
        }
        Ok(())
    }

    fn valeur(&mut self, r: Rpn, est_nombre: bool) -> Result<(), ErreurEval> {
        self.debut_valeur(est_nombre)?;
        self.out.push(r);
        self.prev_was_value = true;
        self.prev_was_num = est_nombre;
        Ok(())
    }

    fn fermer(&mut self) -> Result<(), ErreurEval> {
        if !self.prev_was_value {
            return Err(syntaxe("argument ou expression vide avant ')'"));
        }

        loop {
            match self.ops.pop() {
                None => return Err(syntaxe("parenthèse fermante sans ouvrante")),
                Some(Pile::LPar { appel }) => {
                    if appel {
                        let n = self.compteurs.pop().unwrap_or(1);
                        match self.ops.pop() {
                            Some(Pile::Fonction(f)) => {
                                let (min, max) = f.arite();
                                if n < min || n > max {
                                    return Err(ErreurEval::Syntaxe(format!(
                                        "{} attend {} argument(s), {n} reçu(s)",
                                        f.nom(),
                                        if min == max {
                                            min.to_string()
                                        } else {
                                            format!("{min} à {max}")
                                        }
                                    )));
                                }
                                self.out.push(Rpn::Appel(f, n));
                            }
                            _ => return Err(syntaxe("appel de fonction mal formé")),
                        }
                    }
                    break;
                }
                Some(Pile::Op(o)) => self.out.push(Rpn::Op(o)),
                Some(Pile::Neg) => self.out.push(Rpn::Neg),
                Some(Pile::Fonction(_)) => return Err(syntaxe("appel de fonction mal formé")),
            }
        }

        self.prev_was_value = true;
        self.prev_was_num = false;
        Ok(())
    }

    fn virgule(&mut self) -> Result<(), ErreurEval> {
        if !self.prev_was_value {
            return Err(syntaxe("argument vide"));
        }
        loop {
            match self.ops.last() {
                Some(Pile::LPar { appel: true }) => break,
                Some(Pile::LPar { appel: false }) | None => {
                    return Err(syntaxe("virgule hors d’un appel de fonction"))
                }
                Some(Pile::Op(o)) => {
                    let o = *o;
                    self.ops.pop();
                    self.out.push(Rpn::Op(o));
                }
                Some(Pile::Neg) => {
                    self.ops.pop();
                    self.out.push(Rpn::Neg);
                }
                Some(Pile::Fonction(_)) => return Err(syntaxe("appel de fonction mal formé")),
            }
        }
        if let Some(n) = self.compteurs.last_mut() {
            *n += 1;
        }
        self.prev_was_value = false;
        self.prev_was_num = false;
        Ok(())
    }
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Num(30), RPar, Star, Num(2)]
///   rpn:    [Valeur(30), Appel(Sin, 1), Valeur(2), Op(Mul)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Rpn>, ErreurEval> {
    if tokens.is_empty() {
        return Err(syntaxe("entrée vide"));
    }

    let mut c = Convertisseur::new();

    for tok in tokens {
        if let Some(f) = c.attend_lpar.take() {
            if !matches!(tok, Tok::LPar) {
                return Err(ErreurEval::Syntaxe(format!("{} doit être suivi de '('", f.nom())));
            }
            c.ops.push(Pile::LPar { appel: true });
            c.compteurs.push(1);
            c.prev_was_value = false;
            c.prev_was_num = false;
            continue;
        }

        match tok {
            Tok::Num(r) => {
                let v = rat_vers_f64(r)?;
                c.valeur(Rpn::Valeur(Complex64::new(v, 0.0)), true)?;
            }
            Tok::Pi => c.valeur(Rpn::Valeur(Complex64::new(PI, 0.0)), false)?,

            Tok::Ident(name) => {
                if name == "ans" {
                    c.valeur(Rpn::Ans, false)?;
                } else if let Some(z) = constante(name) {
                    c.valeur(Rpn::Valeur(z), false)?;
                } else if let Some(f) = Fonction::depuis_nom(name) {
                    c.debut_valeur(false)?;
                    c.ops.push(Pile::Fonction(f));
                    c.attend_lpar = Some(f);
                    c.prev_was_value = false;
                    c.prev_was_num = false;
                } else {
                    return Err(ErreurEval::SymboleInconnu(name.clone()));
                }
            }

            Tok::LPar => {
                c.debut_valeur(false)?;
                c.ops.push(Pile::LPar { appel: false });
                c.prev_was_value = false;
                c.prev_was_num = false;
            }
            Tok::RPar => c.fermer()?,
            Tok::Comma => c.virgule()?,

            Tok::Plus => {
                // plus unaire : neutre
                if c.prev_was_value {
                    c.pousser_binaire(Operateur::Add)?;
                }
            }
            Tok::Minus => {
                if c.prev_was_value {
                    c.pousser_binaire(Operateur::Sub)?;
                } else {
                    // préfixe : rien à dépiler
                    c.ops.push(Pile::Neg);
                }
            }
            Tok::Star => c.pousser_binaire(Operateur::Mul)?,
            Tok::Slash => c.pousser_binaire(Operateur::Div)?,
            Tok::Percent => c.pousser_binaire(Operateur::Mod)?,
            Tok::Caret => c.pousser_binaire(Operateur::Pow)?,

            Tok::Bang => {
                if !c.prev_was_value {
                    return Err(syntaxe("'!' sans opérande"));
                }
                c.out.push(Rpn::Fact);
                c.prev_was_num = false;
            }
        }
    }

    if let Some(f) = c.attend_lpar {
        return Err(ErreurEval::Syntaxe(format!("{} doit être suivi de '('", f.nom())));
    }
    if !c.prev_was_value {
        return Err(syntaxe("expression incomplète"));
    }

    // vide la pile ops
    while let Some(op) = c.ops.pop() {
        match op {
            Pile::LPar { .. } | Pile::Fonction(_) => {
                return Err(syntaxe("parenthèses non fermées"))
            }
            Pile::Op(o) => c.out.push(Rpn::Op(o)),
            Pile::Neg => c.out.push(Rpn::Neg),
        }
    }

    Ok(c.out)
}

/// Construit une Expr à partir d’une RPN.
/// Garde-fou : profondeur bornée (l’évaluation est récursive).
pub fn from_rpn(rpn: &[Rpn]) -> Result<Expr, ErreurEval> {
    let mut st: Vec<(Expr, usize)> = Vec::new();

    let invalide = || syntaxe("expression invalide");

    for item in rpn {
        let (e, prof) = match item {
            Rpn::Valeur(z) => (Expr::Nombre(*z), 1),
            Rpn::Ans => (Expr::Ans, 1),

            Rpn::Op(op) => {
                let (b, pb) = st.pop().ok_or_else(invalide)?;
                let (a, pa) = st.pop().ok_or_else(invalide)?;
                (Expr::bin(*op, a, b), pa.max(pb) + 1)
            }

            Rpn::Neg => {
                let (x, p) = st.pop().ok_or_else(invalide)?;
                (Expr::Neg(Box::new(x)), p + 1)
            }
            Rpn::Fact => {
                let (x, p) = st.pop().ok_or_else(invalide)?;
                (Expr::Fact(Box::new(x)), p + 1)
            }

            Rpn::Appel(f, n) => {
                if st.len() < *n {
                    return Err(ErreurEval::Syntaxe(format!("{} sans argument", f.nom())));
                }
                let args: Vec<(Expr, usize)> = st.split_off(st.len() - n);
                let p = args.iter().map(|(_, p)| *p).max().unwrap_or(0);
                (Expr::Appel(*f, args.into_iter().map(|(e, _)| e).collect()), p + 1)
            }
        };

        if prof > PROFONDEUR_MAX {
            return Err(syntaxe("imbrication trop profonde"));
        }
        st.push((e, prof));
    }

    if st.len() != 1 {
        return Err(invalide());
    }
    st.pop().map(|(e, _)| e).ok_or_else(invalide)
}
