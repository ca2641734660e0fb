//! src/app/etat.rs
//!
//! Façade de la calculatrice (ce que le shell consomme).
//!
//! Rôle : posséder la session (Ans, mémoires, historique), les matrices A/B/C,
//! le mode d’angle et la précision, et rendre des résultats d’affichage prêts à poser.
//!
//! Contrats :
//! - Aucun type d’interface graphique ne traverse la frontière (texte + nombres seulement).
//! - Un échec ne modifie ni Ans ni l’historique ; le shell affiche "Error".

use num_complex::Complex64;
use tracing::{debug, info, warn};

use crate::noyau::equations::{resoudre_dans_session, TypeEquation};
use crate::noyau::erreurs::ErreurMatrice;
use crate::noyau::eval::eval_dans_session;
use crate::noyau::format::{format_lignes, format_reel, DECIMALES_MAX};
use crate::noyau::matrices::{MagasinMatrices, Matrice, NomMatrice, OperationMatrice, ResultatMatrice};
use crate::noyau::session::{EntreeHistorique, Registre, Session};
use crate::noyau::trig::ModeAngle;

use super::reglages::{Reglages, DECIMALES_DEFAUT};

/// Texte sentinelle posé sur l’écran en cas d’échec.
pub const TEXTE_ERREUR: &str = "Error";

/// Résultat d’affichage simple (expression, équation, scalaire de matrice).
#[derive(Clone, Debug, PartialEq)]
pub struct Affichage {
    pub brut: String,
    pub texte: String,
    pub succes: bool,
    /// Message détaillé (si échec) pour une éventuelle modale.
    pub erreur: Option<String>,
}

impl Affichage {
    fn ok(brut: impl Into<String>, texte: impl Into<String>) -> Self {
        Self {
            brut: brut.into(),
            texte: texte.into(),
            succes: true,
            erreur: None,
        }
    }

    fn echec(brut: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            brut: brut.into(),
            texte: TEXTE_ERREUR.to_string(),
            succes: false,
            erreur: Some(msg.into()),
        }
    }
}

/// Résultat matriciel complet (inverse, transposée, produit, résolution).
#[derive(Clone, Debug, PartialEq)]
pub struct AffichageMatrice {
    pub titre: String,
    pub lignes: Vec<String>,
    pub valeurs: Matrice,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AffichageOperation {
    Simple(Affichage),
    Matrice(AffichageMatrice),
}

#[derive(Clone, Debug)]
pub struct Calculatrice {
    session: Session,
    matrices: MagasinMatrices,
    mode: ModeAngle,
    decimales: usize,
}

impl Default for Calculatrice {
    fn default() -> Self {
        Self {
            session: Session::default(),
            matrices: MagasinMatrices::default(),
            mode: ModeAngle::default(),
            decimales: DECIMALES_DEFAUT,
        }
    }
}

impl Calculatrice {
    pub fn depuis_reglages(r: &Reglages) -> Self {
        let mut c = Self::default();
        c.set_mode(r.angle_mode);
        c.set_decimales(r.decimal_places);
        c.session.set_historique_actif(r.history_enabled);
        c
    }

    /* ------------------------ Réglages ------------------------ */

    pub fn mode(&self) -> ModeAngle {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ModeAngle) {
        if mode != self.mode {
            info!(ancien = %self.mode, nouveau = %mode, "mode d’angle");
        }
        self.mode = mode;
    }

    pub fn decimales(&self) -> usize {
        self.decimales
    }

    /// Garde-fou : précision bornée à [0, 15].
    pub fn set_decimales(&mut self, decimales: usize) {
        self.decimales = decimales.min(DECIMALES_MAX);
    }

    pub fn set_historique_actif(&mut self, actif: bool) {
        self.session.set_historique_actif(actif);
    }

    /* ------------------------ Calculs ------------------------ */

    /// Évalue dans le mode d’angle courant.
    pub fn evaluer(&mut self, texte: &str) -> Affichage {
        self.evaluer_en(texte, self.mode)
    }

    pub fn evaluer_en(&mut self, texte: &str, mode: ModeAngle) -> Affichage {
        match eval_dans_session(&mut self.session, texte, mode, self.decimales) {
            Ok((_, rendu)) => Affichage::ok(texte, rendu),
            Err(e) => Affichage::echec(texte, e.to_string()),
        }
    }

    /// Champs de coefficients (texte) -> solution affichable.
    pub fn resoudre(&mut self, kind: TypeEquation, champs: &[&str]) -> Affichage {
        let brut = champs.join(", ");
        match resoudre_dans_session(&mut self.session, kind, champs, self.decimales) {
            Ok((_, texte)) => Affichage::ok(brut, texte),
            Err(e) => Affichage::echec(brut, e.to_string()),
        }
    }

    /// Opération matricielle ; ni Ans ni l’historique ne sont touchés.
    pub fn operation_matrice(&self, op: OperationMatrice) -> AffichageOperation {
        let titre = op.libelle();
        match self.matrices.executer(op) {
            Ok(ResultatMatrice::Scalaire(v)) => {
                debug!(operation = %titre, valeur = v, "opération matricielle");
                AffichageOperation::Simple(Affichage::ok(titre, format_reel(v, self.decimales)))
            }
            Ok(ResultatMatrice::Matrice(m)) => {
                debug!(operation = %titre, dimension = ?m.dimension(), "opération matricielle");
                AffichageOperation::Matrice(AffichageMatrice {
                    lignes: format_lignes(&m.vers_lignes(), self.decimales),
                    titre,
                    valeurs: m,
                })
            }
            Err(e) => {
                warn!(operation = %titre, erreur = %e, "opération matricielle refusée");
                AffichageOperation::Simple(Affichage::echec(titre, e.to_string()))
            }
        }
    }

    /* ------------------------ Matrices ------------------------ */

    pub fn matrices(&self) -> &MagasinMatrices {
        &self.matrices
    }

    pub fn redimensionner(
        &mut self,
        nom: NomMatrice,
        lignes: usize,
        colonnes: usize,
    ) -> Result<(), ErreurMatrice> {
        self.matrices.redimensionner(nom, lignes, colonnes)
    }

    pub fn remplir_matrice(
        &mut self,
        nom: NomMatrice,
        lignes: &[Vec<f64>],
    ) -> Result<(), ErreurMatrice> {
        self.matrices.remplir(nom, lignes)
    }

    /// Cellule hors bornes = panique (erreur de programmation du shell).
    /// Valeur non finie = erreur, cellule inchangée.
    pub fn set_cellule(
        &mut self,
        nom: NomMatrice,
        i: usize,
        j: usize,
        v: f64,
    ) -> Result<(), ErreurMatrice> {
        self.matrices.set(nom, i, j, v)
    }

    /* ------------------------ Session ------------------------ */

    pub fn ans(&self) -> Complex64 {
        self.session.ans()
    }

    /// Entrées de la plus ancienne à la plus récente.
    pub fn historique(&self) -> Vec<EntreeHistorique> {
        self.session.historique().entrees().cloned().collect()
    }

    pub fn clear_historique(&mut self) {
        self.session.vider_historique();
    }

    pub fn memoire(&self, r: Registre) -> Complex64 {
        self.session.memoire().lire(r)
    }

    pub fn set_memoire(&mut self, r: Registre, v: Complex64) {
        self.session.memoire_mut().stocker(r, v);
    }

    /// STO : Ans -> registre.
    pub fn stocker_ans(&mut self, r: Registre) {
        let ans = self.ans();
        self.set_memoire(r, ans);
    }

    /// M+ : M += Ans.
    pub fn memoire_plus(&mut self) {
        let ans = self.ans();
        self.session.memoire_mut().ajouter(Registre::M, ans);
    }

    /// M− : M −= Ans.
    pub fn memoire_moins(&mut self) {
        let ans = self.ans();
        self.session.memoire_mut().soustraire(Registre::M, ans);
    }

    /// MC
    pub fn effacer_memoires(&mut self) {
        self.session.memoire_mut().effacer();
    }
}
