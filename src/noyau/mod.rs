//! Noyau de calcul (aucune E/S)
//!
//! Organisation interne :
//! - jetons.rs     : tokenisation (notation d’affichage ×, ÷, −, π, √, Ans)
//! - rpn.rs        : shunting-yard + construction Expr (liste blanche au parse)
//! - expr.rs       : AST sur les complexes
//! - fonctions.rs  : fonctions et constantes autorisées
//! - trig.rs       : modes d’angle + angles spéciaux
//! - eval.rs       : interprétation + consignation session
//! - format.rs     : affichage FIX n / scientifique
//! - session.rs    : Ans, mémoires, historique borné
//! - equations.rs  : degrés 1 à 3, systèmes 2×2 et 3×3
//! - matrices.rs   : matrices A/B/C + moteur (det, inverse, transposée, produit, résolution)
//! - erreurs.rs    : taxonomie des erreurs

pub mod equations;
pub mod erreurs;
pub mod eval;
pub mod expr;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod matrices;
pub mod rpn;
pub mod session;
pub mod trig;

#[cfg(test)]
mod tests_proprietes;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique
pub use equations::{parse_coefficients, resoudre, Solution, TypeEquation};
pub use erreurs::{ErreurEquation, ErreurEval, ErreurMatrice};
pub use eval::{eval_dans_session, eval_expression};
pub use format::{format_nombre, format_reel};
pub use matrices::{MagasinMatrices, Matrice, NomMatrice, OperationMatrice, ResultatMatrice};
pub use session::{EntreeHistorique, Registre, Session};
pub use trig::ModeAngle;
