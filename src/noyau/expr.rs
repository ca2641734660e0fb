// src/noyau/expr.rs
//
// AST numérique (réel ou complexe).
// - Nombre : valeur déjà résolue (littéral, π, e, i)
// - Ans    : dernier résultat, lu dans le contexte au moment de l’évaluation
// - Appel  : fonction de la liste blanche + arguments
//
// IMPORTANT (SAFE):
// - aucun identifiant libre : tout nom a été résolu (ou refusé) au parse.

use std::fmt;

use num_complex::Complex64;

use super::fonctions::Fonction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operateur {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl Operateur {
    pub fn symbole(self) -> &'static str {
        match self {
            Operateur::Add => "+",
            Operateur::Sub => "-",
            Operateur::Mul => "*",
            Operateur::Div => "/",
            Operateur::Mod => "%",
            Operateur::Pow => "^",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Nombre(Complex64),
    Ans,

    Neg(Box<Expr>),
    Fact(Box<Expr>), // x!

    Bin(Operateur, Box<Expr>, Box<Expr>),
    Appel(Fonction, Vec<Expr>),
}

impl Expr {
    pub fn bin(op: Operateur, a: Expr, b: Expr) -> Expr {
        Expr::Bin(op, Box::new(a), Box::new(b))
    }
}

/// Affichage parenthésé complet (trace/debug) : aucune ambiguïté de priorité.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nombre(z) if z.im == 0.0 => write!(f, "{}", z.re),
            Expr::Nombre(z) => write!(f, "({}+{}i)", z.re, z.im),
            Expr::Ans => f.write_str("Ans"),
            Expr::Neg(x) => write!(f, "(-{x})"),
            Expr::Fact(x) => write!(f, "({x})!"),
            Expr::Bin(op, a, b) => write!(f, "({a}{}{b})", op.symbole()),
            Expr::Appel(fonction, args) => {
                write!(f, "{}(", fonction.nom())?;
                for (k, a) in args.iter().enumerate() {
                    if k > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
        }
    }
}
