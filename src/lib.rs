//! Calculatrice scientifique : noyau de calcul + façade pour le shell.
//!
//! - `noyau` : expressions (modes DEG/RAD/GRAD), formatage, session, équations, matrices.
//! - `app`   : façade `Calculatrice` et document de réglages.

pub mod app;
pub mod noyau;
