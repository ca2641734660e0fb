// src/app.rs
//
// Calculatrice scientifique : module App (racine)
// ------------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + reglages.rs)
// - Ré-exporter la façade (pour main.rs: use calculatrice_sci::app::Calculatrice;)
//
// Important:
// - Aucun rendu ici : le shell (GUI ou ligne de commande) ne voit que du texte et des nombres.

pub mod etat;
pub mod reglages;

// Ré-exports pratiques
pub use etat::{Affichage, AffichageMatrice, AffichageOperation, Calculatrice, TEXTE_ERREUR};
pub use reglages::{ErreurReglages, Reglages};
