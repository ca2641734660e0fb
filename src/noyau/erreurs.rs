// src/noyau/erreurs.rs
//
// Taxonomie des erreurs du noyau.
// - Aucune erreur ne fait planter : tout remonte en Result structuré.
// - Le shell décide de la présentation ("Error" en ligne ou modale).

use thiserror::Error;

/// Erreurs d’évaluation d’une expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErreurEval {
    /// Entrée mal formée (parenthèses, opérateur orphelin, littéral invalide…).
    #[error("erreur de syntaxe : {0}")]
    Syntaxe(String),

    /// Identifiant hors de la liste blanche (détecté au parse).
    #[error("symbole inconnu : {0}")]
    SymboleInconnu(String),

    /// Appel hors domaine : asin(2), 3.5!, ln(0), résultat non fini…
    #[error("erreur de domaine : {0}")]
    Domaine(String),

    /// Division par zéro via l’opérateur `/` ou `%`.
    #[error("division par zéro")]
    DivisionParZero,
}

/// Erreurs du solveur d’équations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErreurEquation {
    #[error("coefficient invalide : {0:?}")]
    CoefficientInvalide(String),

    #[error("{attendu} coefficients attendus, {recu} reçus")]
    NombreCoefficients { attendu: usize, recu: usize },

    /// Débordement flottant pendant la résolution (coefficients trop grands).
    #[error("résultat non fini")]
    NonFini,
}

/// Erreurs du moteur de matrices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErreurMatrice {
    #[error("la matrice {0} n’est pas carrée")]
    NonCarree(char),

    #[error("matrice singulière")]
    Singuliere,

    #[error("dimensions incompatibles : {0}")]
    DimensionsIncompatibles(String),

    #[error("dimension hors bornes : {lignes}×{colonnes} (1 à 4)")]
    DimensionInvalide { lignes: usize, colonnes: usize },

    #[error("valeur non finie refusée dans la matrice {0}")]
    ValeurNonFinie(char),
}
